use std::collections::VecDeque;

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::channel::oneshot;
use futures::future::pending;
use futures::StreamExt;
use log::{debug, info, warn};
use tokio::time::{sleep_until, Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::bridge::events::{EventMux, EventSink};
use crate::bridge::handle::BridgeConfig;
use crate::device::capability::{
    Completion, DeviceCapability, VendorBreathOutcome, VendorError, VendorRecoveryOutcome,
    VendorStatus,
};
use crate::device::constants::DEVICE_NAME_FILTERS;
use crate::device::normalize::{normalize_breath, normalize_recovery, normalize_status};
use crate::device::session::Session;
use crate::device::types::BreathTestResult;
use crate::error::BridgeError;

pub(crate) type BreathReply = oneshot::Sender<Result<BreathTestResult, BridgeError>>;
pub(crate) type RecoveryReply = oneshot::Sender<Result<(), BridgeError>>;

/// One host call, as queued onto the control loop by the facade.
pub(crate) enum Command {
    ScanAndConnect { reply: oneshot::Sender<bool> },
    Disconnect { reply: oneshot::Sender<()> },
    QueryConnected { reply: oneshot::Sender<bool> },
    StartBreathTest { reply: BreathReply },
    StartBreathTestNoRecovery { reply: BreathReply },
    HandleRecovery { reply: RecoveryReply },
    AttachEvents { sink: EventSink },
    DetachEvents,
}

/// A vendor callback, marshaled from whatever thread it fired on.
enum Callback {
    Status(VendorStatus),
    BreathTestDone {
        seq: u64,
        outcome: Result<VendorBreathOutcome, VendorError>,
    },
    RecoveryDone {
        seq: u64,
        outcome: Result<VendorRecoveryOutcome, VendorError>,
    },
}

/// An operation waiting for the serializer slot. QueryConnected never queues;
/// it is answered from cached state the moment it arrives.
enum Operation {
    ScanAndConnect { reply: oneshot::Sender<bool> },
    Disconnect { reply: oneshot::Sender<()> },
    BreathTest { no_recovery: bool, reply: BreathReply },
    Recovery { reply: RecoveryReply },
}

enum InFlightKind {
    BreathTest { reply: BreathReply },
    Recovery { reply: RecoveryReply },
}

struct InFlight {
    seq: u64,
    deadline: Option<Instant>,
    kind: InFlightKind,
}

/**
 * The control loop owning all session state. Exactly one of these runs per
 * bridge, as a single spawned task; vendor callbacks and host calls both
 * reach it through channels, which is what makes the vendor SDK's
 * thread-ambiguous callbacks safe to consume.
 *
 * Doubles as the request serializer: operations other than QueryConnected
 * are dispatched from a FIFO queue, at most one occupying the device at a
 * time (policy A, queue rather than fail fast).
 */
pub(crate) struct Worker<C: DeviceCapability> {
    capability: C,
    session: Session,
    events: EventMux,
    commands: UnboundedReceiver<Command>,
    callbacks: UnboundedReceiver<Callback>,
    callback_tx: UnboundedSender<Callback>,
    queue: VecDeque<Operation>,
    in_flight: Option<InFlight>,
    seq: u64,
    operation_timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl<C: DeviceCapability> Worker<C> {
    pub(crate) fn new(
        capability: C,
        config: BridgeConfig,
        commands: UnboundedReceiver<Command>,
        cancel: CancellationToken,
    ) -> Worker<C> {
        let (callback_tx, callbacks) = unbounded();

        Worker {
            capability,
            session: Session::new(),
            events: EventMux::new(),
            commands,
            callbacks,
            callback_tx,
            queue: VecDeque::new(),
            in_flight: None,
            seq: 0,
            operation_timeout: config.operation_timeout,
            cancel,
        }
    }

    pub(crate) async fn run(mut self) {
        'mainloop: loop {
            let deadline = self.in_flight.as_ref().and_then(|op| op.deadline);

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    break 'mainloop;
                },
                command = self.commands.next() => match command {
                    // All handles dropped; nobody is left to answer.
                    None => break 'mainloop,
                    Some(command) => self.handle_command(command),
                },
                Some(callback) = self.callbacks.next() => {
                    self.handle_callback(callback);
                },
                _ = watchdog(deadline) => {
                    self.handle_timeout();
                },
            }

            self.pump();
        }

        debug!("Bridge worker stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::ScanAndConnect { reply } => {
                self.queue.push_back(Operation::ScanAndConnect { reply });
            },
            Command::Disconnect { reply } => {
                self.queue.push_back(Operation::Disconnect { reply });
            },
            Command::QueryConnected { reply } => {
                // Answered from cached state, bypassing the queue, so a long
                // breath test never delays a connectivity probe.
                let _ = reply.send(self.session.is_operable());
            },
            Command::StartBreathTest { reply } => {
                if self.session.is_operable() {
                    self.queue.push_back(Operation::BreathTest { no_recovery: false, reply });
                } else {
                    let _ = reply.send(Err(BridgeError::NotConnected));
                }
            },
            Command::StartBreathTestNoRecovery { reply } => {
                if self.session.is_operable() {
                    self.queue.push_back(Operation::BreathTest { no_recovery: true, reply });
                } else {
                    let _ = reply.send(Err(BridgeError::NotConnected));
                }
            },
            Command::HandleRecovery { reply } => {
                if self.session.is_operable() {
                    self.queue.push_back(Operation::Recovery { reply });
                } else {
                    let _ = reply.send(Err(BridgeError::NotConnected));
                }
            },
            Command::AttachEvents { sink } => {
                self.events.attach(sink);
            },
            Command::DetachEvents => {
                self.events.detach();
            },
        }
    }

    fn handle_callback(&mut self, callback: Callback) {
        match callback {
            Callback::Status(status) => {
                let event = normalize_status(status);
                self.session.apply(&event);
                self.events.emit(event);
            },
            Callback::BreathTestDone { seq, outcome } => match self.in_flight.take() {
                Some(InFlight {
                    seq: expected,
                    kind: InFlightKind::BreathTest { reply },
                    ..
                }) if expected == seq => {
                    let result = match outcome {
                        Ok(raw) => Ok(normalize_breath(raw)),
                        Err(err) => Err(BridgeError::BreathTest { message: err.0 }),
                    };
                    let _ = reply.send(result);
                },
                other => {
                    self.in_flight = other;
                    warn!("Ignoring stale breath test completion (seq {})", seq);
                },
            },
            Callback::RecoveryDone { seq, outcome } => match self.in_flight.take() {
                Some(InFlight {
                    seq: expected,
                    kind: InFlightKind::Recovery { reply },
                    ..
                }) if expected == seq => {
                    let result = match outcome {
                        Ok(raw) => normalize_recovery(raw),
                        Err(err) => Err(BridgeError::Recovery { message: err.0 }),
                    };
                    let _ = reply.send(result);
                },
                other => {
                    self.in_flight = other;
                    warn!("Ignoring stale recovery completion (seq {})", seq);
                },
            },
        }
    }

    /// The vendor never called back within the deadline. Resolve the caller
    /// and free the slot; the late completion, if any, is dropped by the
    /// sequence check in handle_callback.
    fn handle_timeout(&mut self) {
        if let Some(op) = self.in_flight.take() {
            warn!("Device operation timed out, releasing the slot (seq {})", op.seq);
            match op.kind {
                InFlightKind::BreathTest { reply } => {
                    let _ = reply.send(Err(BridgeError::Timeout));
                },
                InFlightKind::Recovery { reply } => {
                    let _ = reply.send(Err(BridgeError::Timeout));
                },
            }
        }
    }

    /// Dispatch queued operations until one occupies the device slot or the
    /// queue runs dry. Scan and disconnect complete synchronously from the
    /// bridge's point of view and never hold the slot.
    fn pump(&mut self) {
        while self.in_flight.is_none() {
            let Some(operation) = self.queue.pop_front() else {
                break;
            };

            match operation {
                Operation::ScanAndConnect { reply } => {
                    let tx = self.callback_tx.clone();
                    let started = self.capability.scan_and_connect(
                        &DEVICE_NAME_FILTERS,
                        Box::new(move |status| {
                            let _ = tx.unbounded_send(Callback::Status(status));
                        }),
                    );

                    if started {
                        self.session.begin_scan();
                        info!("Scan started");
                    } else {
                        warn!("Vendor SDK declined to start a scan");
                    }

                    let _ = reply.send(started);
                },
                Operation::Disconnect { reply } => {
                    self.capability.disconnect();
                    self.session.force_disconnected();
                    info!("Disconnected from device");
                    let _ = reply.send(());
                },
                Operation::BreathTest { no_recovery, reply } => {
                    // Re-check: the connection may have dropped while this
                    // request sat behind another operation.
                    if !self.session.is_operable() {
                        let _ = reply.send(Err(BridgeError::NotConnected));
                        continue;
                    }

                    let seq = self.next_seq();
                    let tx = self.callback_tx.clone();
                    let on_result: Completion<Result<VendorBreathOutcome, VendorError>> =
                        Box::new(move |outcome| {
                            let _ = tx.unbounded_send(Callback::BreathTestDone { seq, outcome });
                        });

                    if no_recovery {
                        self.capability.start_breath_test_no_recovery(on_result);
                    } else {
                        self.capability.start_breath_test(on_result);
                    }

                    self.in_flight = Some(InFlight {
                        seq,
                        deadline: self.deadline_from_now(),
                        kind: InFlightKind::BreathTest { reply },
                    });
                },
                Operation::Recovery { reply } => {
                    if !self.session.is_operable() {
                        let _ = reply.send(Err(BridgeError::NotConnected));
                        continue;
                    }

                    let seq = self.next_seq();
                    let tx = self.callback_tx.clone();
                    self.capability.handle_recovery(Box::new(move |outcome| {
                        let _ = tx.unbounded_send(Callback::RecoveryDone { seq, outcome });
                    }));

                    self.in_flight = Some(InFlight {
                        seq,
                        deadline: self.deadline_from_now(),
                        kind: InFlightKind::Recovery { reply },
                    });
                },
            }
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn deadline_from_now(&self) -> Option<Instant> {
        self.operation_timeout.map(|timeout| Instant::now() + timeout)
    }
}

async fn watchdog(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending::<()>().await,
    }
}
