use log::warn;

use crate::device::capability::{VendorBreathOutcome, VendorRecoveryOutcome, VendorStatus};
use crate::device::constants::{
    CONNECT_BLUETOOTH_AVAILABLE, CONNECT_ERROR_FAILED_TO_CONNECT, CONNECT_ERROR_FAILED_TO_FINALIZE,
    CONNECT_ERROR_SCAN_FAILED, CONNECT_PERIPHERAL_CONNECTED, CONNECT_PERIPHERAL_DISCONNECTED,
    CONNECT_SUCCESS, CONNECT_SUCCESS_NEEDS_RECOVERY, CONNECT_ZEROING,
};
use crate::device::types::{
    BluetoothAvailability, BreathReading, BreathTestResult, ConnectionEvent, DeviceIdentity,
    TestStatus,
};
use crate::error::BridgeError;

fn device_or_unknown(device: Option<DeviceIdentity>) -> DeviceIdentity {
    device.unwrap_or_else(DeviceIdentity::unknown)
}

fn failure_message(detail: Option<String>, fallback: &str) -> String {
    detail.unwrap_or_else(|| String::from(fallback))
}

/**
 * Map one vendor status push onto the canonical event. Exhaustive over the
 * CONNECT_* table; any code outside it becomes Unknown rather than an error,
 * so a newer firmware can never crash the bridge.
 */
pub fn normalize_status(status: VendorStatus) -> ConnectionEvent {
    match status.code {
        CONNECT_SUCCESS => ConnectionEvent::Success {
            data: device_or_unknown(status.device),
        },
        CONNECT_SUCCESS_NEEDS_RECOVERY => ConnectionEvent::SuccessNeedsRecovery {
            data: device_or_unknown(status.device),
        },
        CONNECT_ZEROING => ConnectionEvent::Zeroing,
        CONNECT_ERROR_FAILED_TO_FINALIZE => ConnectionEvent::Failure {
            error: failure_message(status.detail, "Failed to finalize connection"),
        },
        CONNECT_ERROR_FAILED_TO_CONNECT => ConnectionEvent::Failure {
            error: failure_message(status.detail, "Failed to connect"),
        },
        CONNECT_ERROR_SCAN_FAILED => ConnectionEvent::Failure {
            error: failure_message(status.detail, "Scan failed"),
        },
        CONNECT_BLUETOOTH_AVAILABLE => ConnectionEvent::BluetoothAvailability {
            data: BluetoothAvailability {
                available: status.available.unwrap_or(false),
            },
        },
        CONNECT_PERIPHERAL_CONNECTED => ConnectionEvent::Connected {
            data: device_or_unknown(status.device),
        },
        CONNECT_PERIPHERAL_DISCONNECTED => ConnectionEvent::Disconnected {
            data: device_or_unknown(status.device),
        },
        code => {
            warn!("Unrecognized vendor connection code {}", code);
            ConnectionEvent::Unknown
        },
    }
}

/**
 * Map a raw breath outcome onto the wire result. The vendor reports a single
 * reading and no separate maximum, so `max` mirrors `latest`; this is a
 * documented lossy mapping, not a reconstruction to attempt here.
 */
pub fn normalize_breath(outcome: VendorBreathOutcome) -> BreathTestResult {
    BreathTestResult {
        status: if outcome.successful { TestStatus::Success } else { TestStatus::Failure },
        data: BreathReading {
            latest: outcome.ppm,
            max: outcome.ppm,
            state: outcome.state,
        },
    }
}

/// An incomplete recovery is a reported error, not a crash.
pub fn normalize_recovery(outcome: VendorRecoveryOutcome) -> Result<(), BridgeError> {
    if outcome.complete {
        Ok(())
    } else {
        Err(BridgeError::RecoveryFailed)
    }
}
