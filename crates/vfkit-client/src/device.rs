//! Virtio devices attached to the guest.
//!
//! Every device renders to a `--device` flag followed by one comma-joined
//! value: the variant tag first, then its options in a fixed order.

use crate::error::{Result, VmError};
use crate::mac::MacAddress;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEVICE_FLAG: &str = "--device";

fn device_args(value: String) -> Vec<String> {
    vec![DEVICE_FLAG.to_string(), value]
}

/// virtio-vsock device for 2-way communication between host and guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtioVsock {
    /// vsock port used by this device, see `man vsock`
    pub port: u32,
    /// Unix socket on the host used for the communication with the guest
    pub socket_url: PathBuf,
    /// When true the host listens for connections coming from the guest,
    /// otherwise the guest is the listening side
    #[serde(default)]
    pub listen: bool,
}

impl VirtioVsock {
    pub const TAG: &'static str = "virtio-vsock";

    pub fn to_cmdline(&self) -> Result<Vec<String>> {
        if self.port == 0 {
            return Err(VmError::missing(Self::TAG, "port"));
        }
        if self.socket_url.as_os_str().is_empty() {
            return Err(VmError::missing(Self::TAG, "socket URL"));
        }
        let direction = if self.listen { "listen" } else { "connect" };

        Ok(device_args(format!(
            "{},port={},socketURL={},{}",
            Self::TAG,
            self.port,
            self.socket_url.display(),
            direction
        )))
    }
}

/// Disk device backed by a raw image file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtioBlk {
    pub image_path: PathBuf,
}

impl VirtioBlk {
    pub const TAG: &'static str = "virtio-blk";

    pub fn to_cmdline(&self) -> Result<Vec<String>> {
        if self.image_path.as_os_str().is_empty() {
            return Err(VmError::missing(Self::TAG, "disk image path"));
        }
        Ok(device_args(format!(
            "{},path={}",
            Self::TAG,
            self.image_path.display()
        )))
    }
}

/// Random number generator feeding entropy into the guest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtioRng {}

impl VirtioRng {
    pub const TAG: &'static str = "virtio-rng";

    pub fn to_cmdline(&self) -> Result<Vec<String>> {
        Ok(device_args(Self::TAG.to_string()))
    }
}

/// Network device. Only NAT networking is supported by the launcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtioNet {
    #[serde(default = "default_nat")]
    pub nat: bool,
    /// Guest MAC address, generated by the launcher when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<MacAddress>,
}

fn default_nat() -> bool {
    true
}

impl Default for VirtioNet {
    fn default() -> Self {
        Self {
            nat: true,
            mac_address: None,
        }
    }
}

impl VirtioNet {
    pub const TAG: &'static str = "virtio-net";

    /// Create a NAT network device. An empty `mac_address` leaves the
    /// address unset.
    ///
    /// # Errors
    /// Returns [`VmError::InvalidHardwareAddress`] if the address does not parse.
    pub fn new(mac_address: &str) -> Result<Self> {
        let mac_address = if mac_address.is_empty() {
            None
        } else {
            Some(mac_address.parse()?)
        };
        Ok(Self {
            nat: true,
            mac_address,
        })
    }

    pub fn to_cmdline(&self) -> Result<Vec<String>> {
        if !self.nat {
            return Err(VmError::UnsupportedConfiguration(format!(
                "{} only supports 'nat' networking",
                Self::TAG
            )));
        }

        let mut value = format!("{},nat", Self::TAG);
        if let Some(mac) = &self.mac_address {
            value.push_str(&format!(",mac={mac}"));
        }
        Ok(device_args(value))
    }
}

/// Serial port whose guest output is written to a log file on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtioSerial {
    pub log_file_path: PathBuf,
}

impl VirtioSerial {
    pub const TAG: &'static str = "virtio-serial";

    pub fn to_cmdline(&self) -> Result<Vec<String>> {
        if self.log_file_path.as_os_str().is_empty() {
            return Err(VmError::missing(Self::TAG, "log file path"));
        }
        Ok(device_args(format!(
            "{},logFilePath={}",
            Self::TAG,
            self.log_file_path.display()
        )))
    }
}

/// Directory shared between host and guest.
///
/// The guest mounts it with `mount -t virtiofs <mount tag> /some/dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtioFs {
    pub shared_dir: PathBuf,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mount_tag: String,
}

impl VirtioFs {
    pub const TAG: &'static str = "virtio-fs";

    pub fn to_cmdline(&self) -> Result<Vec<String>> {
        if self.shared_dir.as_os_str().is_empty() {
            return Err(VmError::missing(Self::TAG, "shared directory path"));
        }

        let mut value = format!("{},sharedDir={}", Self::TAG, self.shared_dir.display());
        if !self.mount_tag.is_empty() {
            value.push_str(&format!(",mountTag={}", self.mount_tag));
        }
        Ok(device_args(value))
    }
}

/// A device attached to the virtual machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Device {
    VirtioVsock(VirtioVsock),
    VirtioBlk(VirtioBlk),
    VirtioRng(VirtioRng),
    VirtioNet(VirtioNet),
    VirtioSerial(VirtioSerial),
    VirtioFs(VirtioFs),
}

impl Device {
    /// virtio-vsock device on `port`, using the unix socket at `socket_url`
    /// on the host. When `listen` is true the host listens for connections.
    pub fn vsock(port: u32, socket_url: impl Into<PathBuf>, listen: bool) -> Self {
        Device::VirtioVsock(VirtioVsock {
            port,
            socket_url: socket_url.into(),
            listen,
        })
    }

    /// Disk backed by the raw image at `image_path`.
    pub fn blk(image_path: impl Into<PathBuf>) -> Self {
        Device::VirtioBlk(VirtioBlk {
            image_path: image_path.into(),
        })
    }

    pub fn rng() -> Self {
        Device::VirtioRng(VirtioRng {})
    }

    /// NAT network device, see [`VirtioNet::new`].
    pub fn net(mac_address: &str) -> Result<Self> {
        VirtioNet::new(mac_address).map(Device::VirtioNet)
    }

    /// Serial port logging guest output to `log_file_path`.
    pub fn serial(log_file_path: impl Into<PathBuf>) -> Self {
        Device::VirtioSerial(VirtioSerial {
            log_file_path: log_file_path.into(),
        })
    }

    /// Share `shared_dir` with the guest under `mount_tag` (may be empty).
    pub fn fs(shared_dir: impl Into<PathBuf>, mount_tag: impl Into<String>) -> Self {
        Device::VirtioFs(VirtioFs {
            shared_dir: shared_dir.into(),
            mount_tag: mount_tag.into(),
        })
    }

    /// Variant tag as it appears on the command line.
    pub fn tag(&self) -> &'static str {
        match self {
            Device::VirtioVsock(_) => VirtioVsock::TAG,
            Device::VirtioBlk(_) => VirtioBlk::TAG,
            Device::VirtioRng(_) => VirtioRng::TAG,
            Device::VirtioNet(_) => VirtioNet::TAG,
            Device::VirtioSerial(_) => VirtioSerial::TAG,
            Device::VirtioFs(_) => VirtioFs::TAG,
        }
    }

    /// Validate and render the device into launcher arguments.
    pub fn to_cmdline(&self) -> Result<Vec<String>> {
        match self {
            Device::VirtioVsock(dev) => dev.to_cmdline(),
            Device::VirtioBlk(dev) => dev.to_cmdline(),
            Device::VirtioRng(dev) => dev.to_cmdline(),
            Device::VirtioNet(dev) => dev.to_cmdline(),
            Device::VirtioSerial(dev) => dev.to_cmdline(),
            Device::VirtioFs(dev) => dev.to_cmdline(),
        }
    }
}

macro_rules! impl_from_device {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Device {
                fn from(dev: $variant) -> Self {
                    Device::$variant(dev)
                }
            }
        )*
    };
}

impl_from_device!(
    VirtioVsock,
    VirtioBlk,
    VirtioRng,
    VirtioNet,
    VirtioSerial,
    VirtioFs
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vsock_cmdline() {
        assert_eq!(
            Device::vsock(1024, "/tmp/vsock.sock", true)
                .to_cmdline()
                .unwrap(),
            vec![
                "--device",
                "virtio-vsock,port=1024,socketURL=/tmp/vsock.sock,listen"
            ]
        );
        assert_eq!(
            Device::vsock(1024, "/tmp/vsock.sock", false)
                .to_cmdline()
                .unwrap(),
            vec![
                "--device",
                "virtio-vsock,port=1024,socketURL=/tmp/vsock.sock,connect"
            ]
        );
    }

    #[test]
    fn test_vsock_requires_port_and_socket() {
        let err = Device::vsock(0, "/tmp/vsock.sock", false)
            .to_cmdline()
            .unwrap_err();
        assert_eq!(err, VmError::missing("virtio-vsock", "port"));

        let err = Device::vsock(1024, "", false).to_cmdline().unwrap_err();
        assert_eq!(err, VmError::missing("virtio-vsock", "socket URL"));
    }

    #[test]
    fn test_blk_cmdline() {
        assert_eq!(
            Device::blk("/vm/disk.img").to_cmdline().unwrap(),
            vec!["--device", "virtio-blk,path=/vm/disk.img"]
        );
        assert!(Device::blk("").to_cmdline().unwrap_err().is_missing_field());
    }

    #[test]
    fn test_rng_cmdline() {
        assert_eq!(
            Device::rng().to_cmdline().unwrap(),
            vec!["--device", "virtio-rng"]
        );
    }

    #[test]
    fn test_net_cmdline() {
        assert_eq!(
            Device::net("").unwrap().to_cmdline().unwrap(),
            vec!["--device", "virtio-net,nat"]
        );
        assert_eq!(
            Device::net("5A:94:EF:E4:0C:EE").unwrap().to_cmdline().unwrap(),
            vec!["--device", "virtio-net,nat,mac=5a:94:ef:e4:0c:ee"]
        );
    }

    #[test]
    fn test_net_invalid_mac() {
        let err = Device::net("5a:94:ef").unwrap_err();
        assert_eq!(err, VmError::InvalidHardwareAddress("5a:94:ef".into()));
    }

    #[test]
    fn test_net_without_nat() {
        let dev = Device::VirtioNet(VirtioNet {
            nat: false,
            mac_address: None,
        });
        assert!(matches!(
            dev.to_cmdline(),
            Err(VmError::UnsupportedConfiguration(_))
        ));
    }

    #[test]
    fn test_serial_cmdline() {
        assert_eq!(
            Device::serial("/tmp/console.log").to_cmdline().unwrap(),
            vec!["--device", "virtio-serial,logFilePath=/tmp/console.log"]
        );
        assert!(Device::serial("").to_cmdline().is_err());
    }

    #[test]
    fn test_fs_cmdline() {
        assert_eq!(
            Device::fs("/host/share", "").to_cmdline().unwrap(),
            vec!["--device", "virtio-fs,sharedDir=/host/share"]
        );
        assert_eq!(
            Device::fs("/host/share", "share0").to_cmdline().unwrap(),
            vec!["--device", "virtio-fs,sharedDir=/host/share,mountTag=share0"]
        );
        assert_eq!(
            Device::fs("", "share0").to_cmdline().unwrap_err(),
            VmError::missing("virtio-fs", "shared directory path")
        );
    }

    #[test]
    fn test_tag() {
        assert_eq!(Device::rng().tag(), "virtio-rng");
        assert_eq!(Device::blk("/a").tag(), "virtio-blk");
        assert_eq!(Device::from(VirtioNet::default()).tag(), "virtio-net");
    }

    #[test]
    fn test_serde_tagged() {
        let json = r#"{"type":"virtio-net","mac_address":"5a:94:ef:e4:0c:ee"}"#;
        let dev: Device = serde_json::from_str(json).unwrap();
        assert_eq!(dev, Device::net("5a:94:ef:e4:0c:ee").unwrap());

        let json = serde_json::to_string(&Device::rng()).unwrap();
        assert_eq!(json, r#"{"type":"virtio-rng"}"#);
    }
}
