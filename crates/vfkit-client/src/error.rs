//! Error types for vfkit-client.

use thiserror::Error;

/// Result type alias for vfkit-client operations.
pub type Result<T> = std::result::Result<T, VmError>;

/// Errors that can occur while validating or rendering a virtual machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    /// A required field of a bootloader or device is empty or zero
    #[error("{component}: missing {field}")]
    MissingField {
        /// Variant tag of the component, e.g. `virtio-vsock`
        component: &'static str,
        /// Human readable name of the absent field
        field: &'static str,
    },

    /// The virtual machine has no bootloader attached
    #[error("missing bootloader configuration")]
    MissingBootloader,

    /// A MAC address string could not be parsed
    #[error("invalid hardware address: {0}")]
    InvalidHardwareAddress(String),

    /// A field combination the variant does not support
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),
}

impl VmError {
    pub(crate) fn missing(component: &'static str, field: &'static str) -> Self {
        VmError::MissingField { component, field }
    }

    /// Check if this error reports an absent required field.
    pub fn is_missing_field(&self) -> bool {
        matches!(self, VmError::MissingField { .. })
    }
}
