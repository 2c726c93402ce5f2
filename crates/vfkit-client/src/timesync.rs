//! Guest time synchronization after the host wakes up from sleep.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Syncs the host time to the Linux guest after the host was suspended.
///
/// This needs qemu-guest-agent running in the guest and listening on the
/// configured vsock port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSync {
    /// vsock port of the guest agent, 0 when unset
    #[serde(default)]
    pub vsock_port: u32,
}

impl TimeSync {
    pub fn new(vsock_port: u32) -> Self {
        Self { vsock_port }
    }

    /// Render as `--timesync [vsockPort=N]`.
    ///
    /// An unset port still emits the flag, with an empty value.
    pub fn to_cmdline(&self) -> Result<Vec<String>> {
        let value = if self.vsock_port != 0 {
            format!("vsockPort={}", self.vsock_port)
        } else {
            String::new()
        };
        Ok(vec!["--timesync".to_string(), value])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timesync_with_port() {
        assert_eq!(
            TimeSync::new(1234).to_cmdline().unwrap(),
            vec!["--timesync", "vsockPort=1234"]
        );
    }

    #[test]
    fn test_timesync_without_port() {
        assert_eq!(
            TimeSync::default().to_cmdline().unwrap(),
            vec!["--timesync", ""]
        );
    }
}
