use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::channel::oneshot;
use tokio::spawn;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::bridge::worker::{Command, Worker};
use crate::device::capability::DeviceCapability;
use crate::device::constants::OPERATION_DEADLINE;
use crate::device::types::{BreathTestResult, ConnectionEvent};
use crate::error::BridgeError;

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Watchdog for dispatched device operations. `None` trusts the vendor
    /// SDK to always call back, which matches the original platform bindings
    /// but leaves a caller hanging forever if it does not.
    pub operation_timeout: Option<Duration>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            operation_timeout: Some(Duration::from_millis(OPERATION_DEADLINE)),
        }
    }
}

/**
 * The request/response surface handed to the host. Cloneable; every clone
 * talks to the same control loop, so requests from any number of host tasks
 * are serialized against the one physical device.
 */
#[derive(Clone)]
pub struct BridgeHandle {
    commands: UnboundedSender<Command>,
    cancel: CancellationToken,
}

/**
 * Start a bridge around the given vendor capability. Returns the host-facing
 * handle plus the join handle of the control-loop task; the task exits when
 * shutdown() is called or every BridgeHandle clone has been dropped.
 */
pub fn spawn_bridge<C: DeviceCapability>(
    capability: C,
    config: BridgeConfig,
) -> (BridgeHandle, JoinHandle<()>) {
    let (command_tx, command_rx) = unbounded();
    let cancel = CancellationToken::new();
    let worker = Worker::new(capability, config, command_rx, cancel.clone());
    let join_handle = spawn(worker.run());

    (BridgeHandle { commands: command_tx, cancel }, join_handle)
}

impl BridgeHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, BridgeError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .unbounded_send(make(reply_tx))
            .map_err(|_| BridgeError::BridgeClosed)?;
        reply_rx.await.map_err(|_| BridgeError::BridgeClosed)
    }

    /// Begin scanning and connecting. The returned boolean only acknowledges
    /// that a scan started; the actual outcome arrives later on the event
    /// stream. Idempotent while a scan or connection is already underway.
    pub async fn scan_and_connect(&self) -> Result<bool, BridgeError> {
        self.request(|reply| Command::ScanAndConnect { reply }).await
    }

    /// Tear down the connection. Resolves once the vendor disconnect call
    /// completed; the session is Disconnected afterwards regardless of its
    /// prior state.
    pub async fn disconnect(&self) -> Result<(), BridgeError> {
        self.request(|reply| Command::Disconnect { reply }).await
    }

    /// Current operability, answered from the session state machine. Never
    /// dispatches a device operation and never waits behind one.
    pub async fn get_is_connected(&self) -> Result<bool, BridgeError> {
        self.request(|reply| Command::QueryConnected { reply }).await
    }

    pub async fn start_breath_test(&self) -> Result<BreathTestResult, BridgeError> {
        self.request(|reply| Command::StartBreathTest { reply }).await?
    }

    pub async fn start_breath_test_no_recovery(&self) -> Result<BreathTestResult, BridgeError> {
        self.request(|reply| Command::StartBreathTestNoRecovery { reply }).await?
    }

    pub async fn handle_recovery(&self) -> Result<(), BridgeError> {
        self.request(|reply| Command::HandleRecovery { reply }).await?
    }

    /// Attach as the event-stream listener, replacing any previous one.
    /// Events pushed while nobody is subscribed are dropped.
    pub fn subscribe(&self) -> Result<UnboundedReceiver<ConnectionEvent>, BridgeError> {
        let (sink, events) = unbounded();
        self.commands
            .unbounded_send(Command::AttachEvents { sink })
            .map_err(|_| BridgeError::BridgeClosed)?;
        Ok(events)
    }

    pub fn unsubscribe(&self) -> Result<(), BridgeError> {
        self.commands
            .unbounded_send(Command::DetachEvents)
            .map_err(|_| BridgeError::BridgeClosed)
    }

    /// Stop the control loop. Pending requests resolve with BridgeClosed.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
