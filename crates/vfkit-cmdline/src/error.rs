//! Error types for vfkit-cmdline.

use thiserror::Error;
use vfkit_client::VmError;

/// Result type alias for vfkit-cmdline operations.
pub type Result<T> = std::result::Result<T, CmdlineError>;

/// Errors raised while turning command-line values into a virtual machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CmdlineError {
    /// A specification string had no elements at all
    #[error("empty {0} specification")]
    EmptySpec(&'static str),

    /// The leading tag does not name a known variant
    #[error("unknown {kind} type: {name}")]
    UnknownVariant {
        /// `device` or `bootloader`
        kind: &'static str,
        /// Tag found on the command line
        name: String,
    },

    /// An option the component does not understand
    #[error("{component}: unknown option '{option}'")]
    UnknownOption { component: String, option: String },

    /// A `key=value` option given as a bare word
    #[error("{component}: option '{option}' needs a value")]
    MissingValue { component: String, option: String },

    /// A bare-word option given as `key=value`
    #[error("{component}: option '{option}' does not take a value")]
    UnexpectedValue { component: String, option: String },

    /// Two options that cannot be combined
    #[error("{component}: options '{first}' and '{second}' are mutually exclusive")]
    ConflictingOptions {
        component: String,
        first: String,
        second: String,
    },

    /// A value that could not be converted
    #[error("{component}: invalid value '{value}' for '{option}'")]
    InvalidValue {
        component: String,
        option: String,
        value: String,
    },

    /// Error from vfkit-client
    #[error("VM error: {0}")]
    Vm(#[from] VmError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CmdlineError::UnknownOption {
            component: "virtio-blk".into(),
            option: "size".into(),
        };
        assert_eq!(err.to_string(), "virtio-blk: unknown option 'size'");

        let err = CmdlineError::UnknownVariant {
            kind: "device",
            name: "virtio-gpu".into(),
        };
        assert_eq!(err.to_string(), "unknown device type: virtio-gpu");
    }

    #[test]
    fn test_from_vm_error() {
        let err: CmdlineError = VmError::MissingBootloader.into();
        assert_eq!(err.to_string(), "VM error: missing bootloader configuration");
    }
}
