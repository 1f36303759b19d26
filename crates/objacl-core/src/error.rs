//! Shared error type across objacl crates.

use thiserror::Error;

/// Machine-readable error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Target object does not exist in the backing store.
    ObjectNotFound,
    /// Stored policy is corrupt or fails validation.
    PolicyCorrupt,
    /// A rule references a group type nobody registered.
    UnknownGroupType,
    /// Object path or name is malformed.
    InvalidPath,
    /// Invalid input / configuration.
    BadRequest,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Backing store I/O failed.
    Storage,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs, metrics labels and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ObjectNotFound => "OBJECT_NOT_FOUND",
            ErrorCode::PolicyCorrupt => "POLICY_CORRUPT",
            ErrorCode::UnknownGroupType => "UNKNOWN_GROUP_TYPE",
            ErrorCode::InvalidPath => "INVALID_PATH",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Storage => "STORAGE",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, AclError>;

/// Unified error type used by core and engine.
///
/// A normal deny is never an error: evaluation returns `false` for that.
/// Every variant here means the answer could not be computed safely.
#[derive(Debug, Error)]
pub enum AclError {
    #[error("object not found: {0}")]
    ObjectNotFound(String),
    #[error("policy deserialization failed: {0}")]
    PolicyDeserialization(String),
    #[error("unknown access group type: {0}")]
    UnknownGroupType(String),
    #[error("invalid object path: {0}")]
    InvalidPath(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("storage: {0}")]
    Storage(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl AclError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            AclError::ObjectNotFound(_) => ErrorCode::ObjectNotFound,
            AclError::PolicyDeserialization(_) => ErrorCode::PolicyCorrupt,
            AclError::UnknownGroupType(_) => ErrorCode::UnknownGroupType,
            AclError::InvalidPath(_) => ErrorCode::InvalidPath,
            AclError::BadRequest(_) => ErrorCode::BadRequest,
            AclError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            AclError::Storage(_) => ErrorCode::Storage,
            AclError::Internal(_) => ErrorCode::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(AclError::ObjectNotFound("a".into()).code().as_str(), "OBJECT_NOT_FOUND");
        assert_eq!(AclError::PolicyDeserialization("x".into()).code().as_str(), "POLICY_CORRUPT");
        assert_eq!(AclError::UnknownGroupType("team".into()).code().as_str(), "UNKNOWN_GROUP_TYPE");
        assert_eq!(AclError::UnsupportedVersion.code(), ErrorCode::UnsupportedVersion);
    }

    #[test]
    fn display_carries_context() {
        let e = AclError::UnknownGroupType("team".into());
        assert_eq!(e.to_string(), "unknown access group type: team");
    }
}
