//! Decoding of raw component specifications into typed components.
//!
//! A specification is a variant tag followed by options, for example
//! `virtio-fs,sharedDir=/Users/me,mountTag=home`. Options are either
//! `key=value` pairs or bare words such as `nat` or `listen`. Values may be
//! double-quoted to carry commas: `sharedDir="/a,b"`.

use crate::error::{CmdlineError, Result};
use crate::list_value::{split_list, unquote};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use vfkit_client::{
    Bootloader, Device, EfiBootloader, LinuxBootloader, TimeSync, VirtioBlk, VirtioFs,
    VirtioNet, VirtioRng, VirtioSerial, VirtioVsock,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionKind {
    /// `key=value`
    Value,
    /// bare word
    Flag,
}

#[derive(Debug)]
struct OptionValue {
    kind: OptionKind,
    value: Option<String>,
}

/// Collects the options accepted by one component.
#[derive(Debug)]
struct OptionParser {
    component: String,
    options: HashMap<&'static str, OptionValue>,
}

impl OptionParser {
    fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            options: HashMap::new(),
        }
    }

    fn insert(&mut self, option: &'static str, kind: OptionKind) -> &mut Self {
        self.options
            .insert(option, OptionValue { kind, value: None });
        self
    }

    fn add(&mut self, option: &'static str) -> &mut Self {
        self.insert(option, OptionKind::Value)
    }

    fn add_flag(&mut self, flag: &'static str) -> &mut Self {
        self.insert(flag, OptionKind::Flag)
    }

    fn parse(&mut self, elements: &[String]) -> Result<()> {
        for element in elements.iter().filter(|e| !e.is_empty()) {
            let (name, value) = match element.split_once('=') {
                Some((name, value)) => (name, Some(unquote(value))),
                None => (element.as_str(), None),
            };

            let option = self
                .options
                .get_mut(name)
                .ok_or_else(|| CmdlineError::UnknownOption {
                    component: self.component.clone(),
                    option: name.to_string(),
                })?;

            match (option.kind, value) {
                (OptionKind::Value, Some(value)) => option.value = Some(value),
                (OptionKind::Flag, None) => option.value = Some(String::new()),
                (OptionKind::Value, None) => {
                    return Err(CmdlineError::MissingValue {
                        component: self.component.clone(),
                        option: name.to_string(),
                    })
                }
                (OptionKind::Flag, Some(_)) => {
                    return Err(CmdlineError::UnexpectedValue {
                        component: self.component.clone(),
                        option: name.to_string(),
                    })
                }
            }
        }
        Ok(())
    }

    fn get(&self, option: &str) -> Option<String> {
        self.options.get(option).and_then(|v| v.value.clone())
    }

    fn get_path(&self, option: &str) -> PathBuf {
        self.get(option).map(PathBuf::from).unwrap_or_default()
    }

    fn is_set(&self, option: &str) -> bool {
        self.options
            .get(option)
            .and_then(|v| v.value.as_ref())
            .is_some()
    }

    fn convert<T: FromStr>(&self, option: &str) -> Result<Option<T>> {
        match self.get(option) {
            None => Ok(None),
            Some(value) => value.parse().map(Some).map_err(|_| CmdlineError::InvalidValue {
                component: self.component.clone(),
                option: option.to_string(),
                value,
            }),
        }
    }

    fn exclusive(&self, first: &str, second: &str) -> Result<()> {
        if self.is_set(first) && self.is_set(second) {
            return Err(CmdlineError::ConflictingOptions {
                component: self.component.clone(),
                first: first.to_string(),
                second: second.to_string(),
            });
        }
        Ok(())
    }
}

/// Build a device from one `--device` value.
///
/// Required fields are not checked here; an incomplete device fails when the
/// virtual machine is rendered.
pub fn parse_device(raw: &str) -> Result<Device> {
    let elements = split_list(raw);
    let (tag, options) = elements
        .split_first()
        .ok_or(CmdlineError::EmptySpec("device"))?;
    let mut parser = OptionParser::new(tag);

    let device: Device = match tag.as_str() {
        VirtioVsock::TAG => {
            parser
                .add("port")
                .add("socketURL")
                .add_flag("listen")
                .add_flag("connect")
                .parse(options)?;
            parser.exclusive("listen", "connect")?;
            VirtioVsock {
                port: parser.convert("port")?.unwrap_or(0),
                socket_url: parser.get_path("socketURL"),
                listen: parser.is_set("listen"),
            }
            .into()
        }
        VirtioBlk::TAG => {
            parser.add("path").parse(options)?;
            VirtioBlk {
                image_path: parser.get_path("path"),
            }
            .into()
        }
        VirtioRng::TAG => {
            parser.parse(options)?;
            VirtioRng {}.into()
        }
        VirtioNet::TAG => {
            parser.add_flag("nat").add("mac").parse(options)?;
            let mut net = VirtioNet::new(&parser.get("mac").unwrap_or_default())?;
            net.nat = parser.is_set("nat");
            net.into()
        }
        VirtioSerial::TAG => {
            parser.add("logFilePath").parse(options)?;
            VirtioSerial {
                log_file_path: parser.get_path("logFilePath"),
            }
            .into()
        }
        VirtioFs::TAG => {
            parser.add("sharedDir").add("mountTag").parse(options)?;
            VirtioFs {
                shared_dir: parser.get_path("sharedDir"),
                mount_tag: parser.get("mountTag").unwrap_or_default(),
            }
            .into()
        }
        other => {
            return Err(CmdlineError::UnknownVariant {
                kind: "device",
                name: other.to_string(),
            })
        }
    };

    tracing::debug!(device = device.tag(), "Parsed device");
    Ok(device)
}

/// Build a bootloader from the elements of the `--bootloader` list.
///
/// Accepts `efi,variable-store=P[,create]` and
/// `linux,kernel=P,initrd=P,cmdline=S`.
pub fn parse_bootloader(elements: &[String]) -> Result<Bootloader> {
    let (tag, options) = elements
        .split_first()
        .ok_or(CmdlineError::EmptySpec("bootloader"))?;
    let mut parser = OptionParser::new(tag);

    let bootloader: Bootloader = match tag.as_str() {
        "efi" => {
            parser
                .add("variable-store")
                .add_flag("create")
                .parse(options)?;
            EfiBootloader {
                variable_store_path: parser.get_path("variable-store"),
                create_variable_store: parser.is_set("create"),
            }
            .into()
        }
        "linux" => {
            parser
                .add("kernel")
                .add("initrd")
                .add("cmdline")
                .parse(options)?;
            LinuxBootloader {
                kernel_path: parser.get_path("kernel"),
                kernel_cmdline: parser.get("cmdline").unwrap_or_default(),
                initrd_path: parser.get_path("initrd"),
            }
            .into()
        }
        other => {
            return Err(CmdlineError::UnknownVariant {
                kind: "bootloader",
                name: other.to_string(),
            })
        }
    };

    tracing::debug!(bootloader = %tag, "Parsed bootloader");
    Ok(bootloader)
}

/// Build the time sync component from a `--timesync` value.
pub fn parse_timesync(raw: &str) -> Result<TimeSync> {
    let mut parser = OptionParser::new("timesync");
    parser.add("vsockPort").parse(&split_list(raw))?;
    Ok(TimeSync::new(parser.convert("vsockPort")?.unwrap_or(0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vfkit_client::VmError;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_vsock() {
        let dev = parse_device("virtio-vsock,port=1024,socketURL=/tmp/vsock.sock,listen").unwrap();
        assert_eq!(dev, Device::vsock(1024, "/tmp/vsock.sock", true));

        let dev = parse_device("virtio-vsock,port=1024,socketURL=/tmp/vsock.sock").unwrap();
        assert_eq!(dev, Device::vsock(1024, "/tmp/vsock.sock", false));
    }

    #[test]
    fn test_parse_vsock_conflicting_direction() {
        let err = parse_device("virtio-vsock,port=1,socketURL=/s,listen,connect").unwrap_err();
        assert!(matches!(err, CmdlineError::ConflictingOptions { .. }));
    }

    #[test]
    fn test_parse_vsock_invalid_port() {
        let err = parse_device("virtio-vsock,port=ssh,socketURL=/s").unwrap_err();
        assert_eq!(
            err,
            CmdlineError::InvalidValue {
                component: "virtio-vsock".into(),
                option: "port".into(),
                value: "ssh".into(),
            }
        );
    }

    #[test]
    fn test_parse_simple_devices() {
        assert_eq!(
            parse_device("virtio-blk,path=/vm/disk.img").unwrap(),
            Device::blk("/vm/disk.img")
        );
        assert_eq!(parse_device("virtio-rng").unwrap(), Device::rng());
        assert_eq!(
            parse_device("virtio-serial,logFilePath=/tmp/console.log").unwrap(),
            Device::serial("/tmp/console.log")
        );
    }

    #[test]
    fn test_parse_fs_with_quoted_path() {
        assert_eq!(
            parse_device(r#"virtio-fs,sharedDir="/Users/me/a,b",mountTag=home"#).unwrap(),
            Device::fs("/Users/me/a,b", "home")
        );
        assert_eq!(
            parse_device("virtio-fs,sharedDir=/host/share").unwrap(),
            Device::fs("/host/share", "")
        );
    }

    #[test]
    fn test_parse_net() {
        assert_eq!(
            parse_device("virtio-net,nat,mac=5a:94:ef:e4:0c:ee").unwrap(),
            Device::net("5a:94:ef:e4:0c:ee").unwrap()
        );

        let err = parse_device("virtio-net,nat,mac=5a:94").unwrap_err();
        assert_eq!(
            err,
            CmdlineError::Vm(VmError::InvalidHardwareAddress("5a:94".into()))
        );
    }

    #[test]
    fn test_parse_net_without_nat_fails_on_render() {
        let dev = parse_device("virtio-net").unwrap();
        assert!(matches!(
            dev.to_cmdline(),
            Err(VmError::UnsupportedConfiguration(_))
        ));
    }

    #[test]
    fn test_parse_device_errors() {
        assert_eq!(
            parse_device("").unwrap_err(),
            CmdlineError::EmptySpec("device")
        );
        assert!(matches!(
            parse_device("virtio-gpu,width=800").unwrap_err(),
            CmdlineError::UnknownVariant { kind: "device", .. }
        ));
        assert!(matches!(
            parse_device("virtio-blk,size=10G").unwrap_err(),
            CmdlineError::UnknownOption { .. }
        ));
        assert!(matches!(
            parse_device("virtio-blk,path").unwrap_err(),
            CmdlineError::MissingValue { .. }
        ));
        assert!(matches!(
            parse_device("virtio-net,nat=yes").unwrap_err(),
            CmdlineError::UnexpectedValue { .. }
        ));
    }

    #[test]
    fn test_parse_device_ignores_empty_options() {
        assert_eq!(parse_device("virtio-rng,").unwrap(), Device::rng());
    }

    #[test]
    fn test_parse_incomplete_device_fails_on_render() {
        let dev = parse_device("virtio-blk").unwrap();
        assert!(dev.to_cmdline().unwrap_err().is_missing_field());
    }

    #[test]
    fn test_parse_efi_bootloader() {
        let bootloader =
            parse_bootloader(&strings(&["efi", "variable-store=/vm/store", "create"])).unwrap();
        assert_eq!(bootloader, Bootloader::efi("/vm/store", true));
    }

    #[test]
    fn test_parse_linux_bootloader() {
        let bootloader = parse_bootloader(&strings(&[
            "linux",
            "kernel=/vm/vmlinuz",
            "initrd=/vm/initrd",
            r#"cmdline="console=hvc0 root=/dev/vda""#,
        ]))
        .unwrap();
        assert_eq!(
            bootloader,
            Bootloader::linux("/vm/vmlinuz", "console=hvc0 root=/dev/vda", "/vm/initrd")
        );
    }

    #[test]
    fn test_parse_bootloader_errors() {
        assert_eq!(
            parse_bootloader(&[]).unwrap_err(),
            CmdlineError::EmptySpec("bootloader")
        );
        assert!(matches!(
            parse_bootloader(&strings(&["bios"])).unwrap_err(),
            CmdlineError::UnknownVariant {
                kind: "bootloader",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_timesync() {
        assert_eq!(parse_timesync("vsockPort=1234").unwrap(), TimeSync::new(1234));
        assert_eq!(parse_timesync("").unwrap(), TimeSync::default());
        assert!(parse_timesync("port=1").is_err());
    }
}
