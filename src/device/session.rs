use log::info;

use crate::device::types::{ConnectionEvent, ConnectionState, DeviceIdentity};

/**
 * Tracks the connection lifecycle of the single device session. The next
 * state is a pure function of the current state and the incoming normalized
 * event, so any push sequence is replayable. Only the bridge control loop
 * mutates this; vendor callbacks never touch it directly.
 */
pub struct Session {
    state: ConnectionState,
    identity: Option<DeviceIdentity>,
}

impl Session {
    pub fn new() -> Session {
        Session {
            state: ConnectionState::Disconnected,
            identity: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn identity(&self) -> Option<&DeviceIdentity> {
        self.identity.as_ref()
    }

    /// Whether a device operation (breath test, recovery) is legal right now.
    pub fn is_operable(&self) -> bool {
        self.state.is_operable()
    }

    /// Note that a scan was started. Idempotent while already scanning,
    /// connecting or connected; the vendor deduplicates in-flight scans.
    pub fn begin_scan(&mut self) {
        if self.state == ConnectionState::Disconnected {
            self.state = ConnectionState::Scanning;
        }
    }

    /// Explicit teardown: back to the initial state regardless of where we
    /// were, identity cleared. The machine is reusable for the next session.
    pub fn force_disconnected(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.identity = None;
    }

    /// Advance the machine for one normalized vendor push and return the
    /// resulting state.
    pub fn apply(&mut self, event: &ConnectionEvent) -> ConnectionState {
        match event {
            ConnectionEvent::Success { data } => {
                self.identity = Some(data.clone());
                self.state = ConnectionState::ConnectedReady;
                info!("Device session ready: {} ({})", data.name, data.id);
            },
            ConnectionEvent::SuccessNeedsRecovery { data } => {
                self.identity = Some(data.clone());
                self.state = ConnectionState::ConnectedNeedsRecovery;
                info!("Device session ready, recovery needed: {} ({})", data.name, data.id);
            },
            ConnectionEvent::Zeroing => {
                // Intermediate calibration phase; the next push advances it.
                self.state = ConnectionState::Zeroing;
            },
            ConnectionEvent::Connected { data } => {
                // Peripheral-level connect arrives before the session is
                // finalized by a success push.
                self.identity = Some(data.clone());
                if self.state == ConnectionState::Scanning {
                    self.state = ConnectionState::Connecting;
                }
            },
            ConnectionEvent::Disconnected { .. } | ConnectionEvent::Failure { .. } => {
                self.force_disconnected();
            },
            ConnectionEvent::BluetoothAvailability { .. } | ConnectionEvent::Unknown => {
                // No bearing on the session state.
            },
        }

        self.state
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}
