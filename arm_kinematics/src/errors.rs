use thiserror::Error;

/// Errors raised by the kinematics solver and its configuration layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// A 4x4 inversion was asked of a matrix whose determinant is below the
    /// configured epsilon (or NaN).
    #[error("singular matrix: determinant={determinant:.6e}")]
    SingularMatrix { determinant: f64 },

    /// The target pose lies outside the arm's workspace; the closed-form
    /// solution has no real root.
    #[error("unreachable pose: {reason}")]
    UnreachablePose { reason: String },

    #[error("invalid robot configuration: {0}")]
    InvalidConfig(String),

    #[error("could not read robot configuration {path}: {message}")]
    ConfigIo { path: String, message: String },

    #[error("could not parse robot configuration: {0}")]
    ConfigParse(String),
}

impl KinematicsError {
    /// Numeric code used on the simulator wire (`0` is reserved for success).
    pub fn error_id(&self) -> u32 {
        match self {
            KinematicsError::SingularMatrix { .. } => 2,
            KinematicsError::UnreachablePose { .. } => 3,
            KinematicsError::InvalidConfig(_)
            | KinematicsError::ConfigIo { .. }
            | KinematicsError::ConfigParse(_) => 4,
        }
    }
}

impl From<serde_json::Error> for KinematicsError {
    fn from(err: serde_json::Error) -> Self {
        KinematicsError::ConfigParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_matrix_message_carries_determinant() {
        let err = KinematicsError::SingularMatrix { determinant: 1.5e-9 };
        assert_eq!(err.to_string(), "singular matrix: determinant=1.500000e-9");
        assert_eq!(err.error_id(), 2);
    }

    #[test]
    fn test_parse_error_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: KinematicsError = parse.unwrap_err().into();
        assert!(matches!(err, KinematicsError::ConfigParse(_)));
        assert_eq!(err.error_id(), 4);
    }
}
