use thiserror::Error;

/// RestoreError
///
/// Why a session restore ended in logout. Every variant is handled the same way
/// (clear local auth state); they are kept apart so callers and tests can tell
/// which path was taken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestoreError {
    #[error("request to the current-user endpoint failed: {0}")]
    Transport(String),
    #[error("current-user endpoint answered with status {0}")]
    Status(u16),
    #[error("current-user response could not be decoded: {0}")]
    Decode(String),
    #[error("backend reported success: false")]
    Rejected,
    #[error("backend reported success without a user")]
    MissingUser,
}
