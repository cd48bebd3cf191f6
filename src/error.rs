use thiserror::Error;

/**
 * Errors surfaced to the host. Each carries a stable code string alongside
 * the human-readable Display message; none are fatal to the bridge, which
 * stays usable after any single operation's failure.
 */
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Not connected to a device")]
    NotConnected,

    #[error("Breath test failed: {message}")]
    BreathTest { message: String },

    #[error("Recovery failed")]
    RecoveryFailed,

    #[error("Recovery failed: {message}")]
    Recovery { message: String },

    #[error("Device operation timed out")]
    Timeout,

    #[error("The bridge worker is no longer running")]
    BridgeClosed,
}

impl BridgeError {
    /// Stable code string sent to the host alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::NotConnected => "NOT_CONNECTED",
            BridgeError::BreathTest { .. } => "BREATH_TEST_ERROR",
            BridgeError::RecoveryFailed => "RECOVERY_FAILED",
            BridgeError::Recovery { .. } => "RECOVERY_ERROR",
            BridgeError::Timeout => "TIMEOUT",
            BridgeError::BridgeClosed => "BRIDGE_CLOSED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(BridgeError::NotConnected.code(), "NOT_CONNECTED");
        assert_eq!(
            BridgeError::BreathTest { message: String::from("x") }.code(),
            "BREATH_TEST_ERROR",
        );
        assert_eq!(BridgeError::RecoveryFailed.code(), "RECOVERY_FAILED");
        assert_eq!(BridgeError::Recovery { message: String::from("x") }.code(), "RECOVERY_ERROR");
        assert_eq!(BridgeError::Timeout.code(), "TIMEOUT");
        assert_eq!(BridgeError::BridgeClosed.code(), "BRIDGE_CLOSED");
    }

    #[test]
    fn not_connected_message_matches_wire_contract() {
        assert_eq!(BridgeError::NotConnected.to_string(), "Not connected to a device");
    }
}
