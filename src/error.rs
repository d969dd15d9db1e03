//! Error type shared by every container.
//!
//! All failures are local misuse conditions detectable from the arguments
//! and the container state at the call site. A failing call leaves the
//! container exactly as it was.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ContainerError {
    /// Popping from, or erasing in, a container with no elements.
    #[error("container is empty")]
    Empty,

    /// Dereferencing `end()`, stepping past `end()` or before `begin()`.
    #[error("position is outside the valid range")]
    OutOfBounds,

    /// A position minted by another container, or one whose element has
    /// since been removed.
    #[error("position does not belong to this container or no longer denotes a live element")]
    ForeignPosition,

    /// Map lookup that must hit, but missed.
    #[error("key not found")]
    KeyNotFound,

    /// Map configured with a load factor that is not a finite value above zero.
    #[error("invalid load factor {0}: must be finite and greater than zero")]
    InvalidLoadFactor(f64),
}

pub type Result<T> = core::result::Result<T, ContainerError>;

#[cfg(test)]
mod tests {
    use super::ContainerError;

    #[test]
    fn messages_name_the_condition() {
        assert_eq!(ContainerError::Empty.to_string(), "container is empty");
        assert_eq!(ContainerError::KeyNotFound.to_string(), "key not found");
        assert!(ContainerError::InvalidLoadFactor(-1.0)
            .to_string()
            .contains("-1"));
    }
}
