use serde::Serialize;

/**
 * Connection lifecycle as tracked by the session state machine. Zeroing is an
 * intermediate calibration phase during connection setup; the next vendor
 * push advances it to one of the connected states.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Scanning,
    Connecting,
    ConnectedReady,
    ConnectedNeedsRecovery,
    Zeroing,
}

impl ConnectionState {
    /// Whether a device operation (breath test, recovery) may be dispatched.
    pub fn is_operable(&self) -> bool {
        matches!(self, ConnectionState::ConnectedReady | ConnectionState::ConnectedNeedsRecovery)
    }
}

/**
 * Name and unique identifier of the peripheral, as reported by the vendor
 * SDK. The identifier is opaque: a MAC address on some platforms, a UUID on
 * others.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    pub name: String,
    pub id: String,
}

impl DeviceIdentity {
    /// Placeholder for vendor pushes that omit the peripheral identity.
    pub fn unknown() -> DeviceIdentity {
        DeviceIdentity {
            name: String::from("UNKNOWN"),
            id: String::from("UNKNOWN"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BluetoothAvailability {
    pub available: bool,
}

/**
 * A normalized connection status push, delivered to the host over the event
 * stream. The serde tags are the wire event types the host matches on.
 */
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ConnectionEvent {
    /// Connected and ready for breath tests.
    #[serde(rename = "SUCCESS")]
    Success { data: DeviceIdentity },

    /// Connected, but the device requires recovery before tests are trustworthy.
    #[serde(rename = "SUCCESS_NEEDS_RECOVERY")]
    SuccessNeedsRecovery { data: DeviceIdentity },

    /// Sensor is zeroing as part of connection setup.
    #[serde(rename = "ZEROING")]
    Zeroing,

    #[serde(rename = "CONNECTION_BLUETOOTH_AVAILABLE")]
    BluetoothAvailability { data: BluetoothAvailability },

    /// Peripheral-level connect, before the session is finalized.
    #[serde(rename = "CONNECTION_CONNECTED")]
    Connected { data: DeviceIdentity },

    #[serde(rename = "CONNECTION_DISCONNECTED")]
    Disconnected { data: DeviceIdentity },

    #[serde(rename = "FAILURE")]
    Failure { error: String },

    /// A vendor status code this crate does not recognize.
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreathReading {
    /// Carbon monoxide reading in parts per million.
    pub latest: f64,
    /// The vendor reports a single reading with no separate maximum, so this
    /// always mirrors `latest`. Kept as its own field for wire stability.
    pub max: f64,
    /// Device-reported status label, forwarded without interpretation.
    pub state: String,
}

/**
 * Outcome of one breath test, in the wire shape the host expects:
 * `{"status": "success"|"failure", "data": {"latest", "max", "state"}}`.
 */
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreathTestResult {
    pub status: TestStatus,
    pub data: BreathReading,
}
