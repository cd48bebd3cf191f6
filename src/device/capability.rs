use std::fmt;

use crate::device::types::DeviceIdentity;

/// Completion callback for a single vendor operation. Fires exactly once per
/// invocation, possibly from an arbitrary vendor thread.
pub type Completion<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// Status push callback registered through scan_and_connect. May fire any
/// number of times for the lifetime of one scan, from an arbitrary thread.
pub type StatusCallback = Box<dyn Fn(VendorStatus) + Send + Sync + 'static>;

/**
 * One connection status push as delivered by the vendor SDK. `code` is one of
 * the CONNECT_* constants, or anything else for firmware revisions this crate
 * does not know about. Which of the optional fields are populated depends on
 * the code; the normalizer fills in placeholders for anything missing.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct VendorStatus {
    pub code: u32,
    pub device: Option<DeviceIdentity>,
    pub available: Option<bool>,
    pub detail: Option<String>,
}

impl VendorStatus {
    pub fn from_code(code: u32) -> VendorStatus {
        VendorStatus { code, device: None, available: None, detail: None }
    }
}

/// Error description reported by the vendor SDK, forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorError(pub String);

impl fmt::Display for VendorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/**
 * Raw outcome of a breath test. A failed measurement (`successful == false`)
 * still carries a reading; a vendor error instead arrives as a VendorError
 * through the completion's Result.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct VendorBreathOutcome {
    pub successful: bool,
    pub ppm: f64,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorRecoveryOutcome {
    pub complete: bool,
    pub detail: Option<String>,
}

/**
 * Contract a vendor SDK must satisfy to sit behind the bridge. Every
 * completion fires exactly once; callbacks may run on any thread, so
 * implementations hand results to whatever the caller provided without
 * assuming an execution context.
 */
pub trait DeviceCapability: Send + 'static {
    /// Begin scanning for a peripheral whose name matches one of
    /// `name_filters` and connect to the first match. Returns whether a scan
    /// was started. Deduplicating an already-running scan is the vendor's
    /// job, not the caller's.
    fn scan_and_connect(&mut self, name_filters: &[&str], on_status: StatusCallback) -> bool;

    fn disconnect(&mut self);

    /// Vendor-side connectivity probe. The bridge answers getIsConnected from
    /// its own session state and does not normally route through this, but
    /// the SDK surface includes it and mocks must provide it.
    fn get_is_connected(&mut self, on_result: Completion<bool>);

    fn start_breath_test(
        &mut self,
        on_result: Completion<Result<VendorBreathOutcome, VendorError>>,
    );

    fn start_breath_test_no_recovery(
        &mut self,
        on_result: Completion<Result<VendorBreathOutcome, VendorError>>,
    );

    fn handle_recovery(
        &mut self,
        on_result: Completion<Result<VendorRecoveryOutcome, VendorError>>,
    );
}
