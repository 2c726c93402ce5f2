//! The vfkit command-line surface.

use crate::config::LauncherConfig;
use crate::error::Result;
use crate::list_value::{split_list, ListValue};
use crate::parse::{parse_bootloader, parse_device, parse_timesync};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use vfkit_client::{Bootloader, LinuxBootloader, VirtualMachine};

/// Options accepted by the `vfkit` launcher.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Path to the virtual machine linux kernel
    #[arg(
        short = 'k',
        long,
        value_name = "PATH",
        conflicts_with = "bootloader",
        requires_all = ["initrd", "kernel_cmdline"]
    )]
    pub kernel: Option<PathBuf>,

    /// Linux kernel command line
    #[arg(
        short = 'C',
        long,
        conflicts_with = "bootloader",
        requires_all = ["kernel", "initrd"]
    )]
    pub kernel_cmdline: Option<String>,

    /// Path to the virtual machine initrd
    #[arg(
        short = 'i',
        long,
        value_name = "PATH",
        conflicts_with = "bootloader",
        requires_all = ["kernel", "kernel_cmdline"]
    )]
    pub initrd: Option<PathBuf>,

    /// Bootloader configuration, e.g. `efi,variable-store=PATH,create`
    #[arg(short = 'b', long, value_name = "LIST", action = ArgAction::Append)]
    pub bootloader: Vec<String>,

    /// Number of virtual CPUs
    #[arg(short = 'c', long = "cpus", default_value_t = 1)]
    pub vcpus: u32,

    /// Virtual machine RAM size in mebibytes
    #[arg(short = 'm', long = "memory", default_value_t = 512)]
    pub memory_mib: u64,

    /// Sync guest time when host wakes up from sleep, e.g. `vsockPort=1234`
    #[arg(short = 't', long)]
    pub timesync: Option<String>,

    /// Devices, e.g. `virtio-net,nat`; repeat for each device
    #[arg(short = 'd', long = "device", value_name = "SPEC", action = ArgAction::Append)]
    pub devices: Vec<String>,
}

impl Options {
    /// Accumulate the `--bootloader` occurrences on top of the configured
    /// default.
    pub fn bootloader_list(&self, config: &LauncherConfig) -> ListValue {
        let mut list = match &config.default_bootloader {
            Some(default) => ListValue::with_default(split_list(default)),
            None => ListValue::new(),
        };
        for raw in &self.bootloader {
            list.set(raw);
        }
        list
    }

    fn resolve_bootloader(&self, config: &LauncherConfig) -> Result<Option<Bootloader>> {
        if self.kernel.is_some() || self.initrd.is_some() || self.kernel_cmdline.is_some() {
            return Ok(Some(
                LinuxBootloader {
                    kernel_path: self.kernel.clone().unwrap_or_default(),
                    kernel_cmdline: self.kernel_cmdline.clone().unwrap_or_default(),
                    initrd_path: self.initrd.clone().unwrap_or_default(),
                }
                .into(),
            ));
        }

        let list = self.bootloader_list(config);
        if list.is_empty() {
            return Ok(None);
        }
        parse_bootloader(list.values()).map(Some)
    }

    /// Build the virtual machine these options describe.
    ///
    /// The memory size is passed through unchanged, so rendering the result
    /// reproduces `--memory` as given. A missing bootloader is reported when
    /// the virtual machine is rendered.
    pub fn to_virtual_machine(&self, config: &LauncherConfig) -> Result<VirtualMachine> {
        let mut vm = VirtualMachine::default();
        vm.set_vcpus(self.vcpus);
        vm.set_memory(self.memory_mib);

        if let Some(bootloader) = self.resolve_bootloader(config)? {
            vm.set_bootloader(bootloader);
        }

        for raw in &self.devices {
            vm.add_device(parse_device(raw)?);
        }

        if let Some(raw) = &self.timesync {
            vm.set_timesync(parse_timesync(raw)?);
        }

        tracing::debug!(devices = vm.devices().len(), "Built virtual machine from options");
        Ok(vm)
    }
}
