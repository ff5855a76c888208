//! Registration error types
//!
//! Registration failures are reported, never fatal: the offending body is
//! simply not added and level construction carries on without it.

use std::fmt;

use crate::body::BlockKey;

/// Error returned when a body cannot be registered with the physics world
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationError {
    /// The world has been destroyed and no longer accepts bodies
    WorldEnded,
    /// The body has non-finite or inverted geometry
    InvalidGeometry(String),
    /// The key does not refer to a registered block
    UnknownBlock(BlockKey),
    /// The block has no scripted motion and cannot be updated
    NotKinematic(BlockKey),
    /// The block is already in the updatable registry
    AlreadyUpdatable(BlockKey),
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::WorldEnded => write!(f, "Cannot register body: world has ended"),
            RegistrationError::InvalidGeometry(msg) => write!(f, "Invalid body geometry: {}", msg),
            RegistrationError::UnknownBlock(key) => write!(f, "Unknown block: {:?}", key),
            RegistrationError::NotKinematic(key) => {
                write!(f, "Block {:?} has no update capability", key)
            }
            RegistrationError::AlreadyUpdatable(key) => {
                write!(f, "Block {:?} is already registered as updatable", key)
            }
        }
    }
}

impl std::error::Error for RegistrationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_ended_display() {
        let msg = format!("{}", RegistrationError::WorldEnded);
        assert!(msg.contains("world has ended"));
    }

    #[test]
    fn test_invalid_geometry_display() {
        let err = RegistrationError::InvalidGeometry("size is NaN".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid body geometry"));
        assert!(msg.contains("size is NaN"));
    }

    #[test]
    fn test_block_key_variants_display() {
        let key = BlockKey::default();
        assert!(format!("{}", RegistrationError::UnknownBlock(key)).contains("Unknown block"));
        assert!(format!("{}", RegistrationError::NotKinematic(key)).contains("no update capability"));
        assert!(format!("{}", RegistrationError::AlreadyUpdatable(key)).contains("already registered"));
    }

    #[test]
    fn test_error_has_no_source() {
        use std::error::Error;
        assert!(RegistrationError::WorldEnded.source().is_none());
    }
}
