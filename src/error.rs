use std::fmt;

/// Error types for the failure classes callers need to tell apart.
///
/// Operational errors (HTTP failures, malformed bus payloads) travel as
/// `anyhow::Error` and are handled at the boundary that produced them; the
/// variants here are the ones that change caller behavior: startup aborts on
/// configuration errors, and bridge callers distinguish a timed-out call
/// from a scheduler that is no longer running.
#[derive(Debug)]
pub enum RelayError {
    /// Required environment variable is missing.
    MissingEnvVar { var_name: String },

    /// Environment variable is present but cannot be parsed.
    InvalidEnvVar {
        var_name: String,
        value: String,
        reason: String,
    },

    /// The scheduler owning the chat client has shut down; bridged calls
    /// can no longer be delivered.
    SchedulerUnavailable,

    /// A bridged call was not answered within the wait window. The
    /// submitted work is not cancelled; its eventual result is discarded.
    BridgeTimeout { timeout_seconds: u64 },
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::MissingEnvVar { var_name } => {
                write!(f, "Required environment variable '{}' is not set", var_name)
            }
            RelayError::InvalidEnvVar {
                var_name,
                value,
                reason,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for environment variable '{}': {}",
                    value, var_name, reason
                )
            }
            RelayError::SchedulerUnavailable => {
                write!(f, "Bot scheduler is not running")
            }
            RelayError::BridgeTimeout { timeout_seconds } => {
                write!(
                    f,
                    "Bridged call timed out after {} seconds",
                    timeout_seconds
                )
            }
        }
    }
}

impl std::error::Error for RelayError {}
