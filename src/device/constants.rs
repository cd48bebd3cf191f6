/**
 * Device name prefixes the vendor SDK matches against while scanning.
 * Older units advertise as "Compact", newer ones as "iCOquit".
 */
pub const DEVICE_NAME_FILTERS: [&str; 2] = ["Compact", "iCOquit"];

/**
 * How long (milliseconds) a dispatched device operation may take before the
 * watchdog resolves the caller with a timeout and frees the serializer slot.
 * A breath test involves a 15 second exhale plus firmware settling time, so
 * this is deliberately generous.
 */
pub const OPERATION_DEADLINE: u64 = 120_000;

/**
 * Connection status codes pushed by the vendor SDK during and after
 * scan_and_connect. Codes 0..=5 mirror the connect-code constants of the
 * Android SDK; 6..=8 mirror the iOS connection-observer pushes. Anything
 * else is an unseen firmware revision and normalizes to an Unknown event.
 */
pub const CONNECT_SUCCESS: u32 = 0;
pub const CONNECT_SUCCESS_NEEDS_RECOVERY: u32 = 1;
pub const CONNECT_ZEROING: u32 = 2;
pub const CONNECT_ERROR_FAILED_TO_FINALIZE: u32 = 3;
pub const CONNECT_ERROR_FAILED_TO_CONNECT: u32 = 4;
pub const CONNECT_ERROR_SCAN_FAILED: u32 = 5;
pub const CONNECT_BLUETOOTH_AVAILABLE: u32 = 6;
pub const CONNECT_PERIPHERAL_CONNECTED: u32 = 7;
pub const CONNECT_PERIPHERAL_DISCONNECTED: u32 = 8;
