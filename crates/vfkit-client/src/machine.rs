//! VirtualMachine type - the top-level description rendered for the launcher.

use crate::bootloader::Bootloader;
use crate::device::Device;
use crate::error::{Result, VmError};
use crate::timesync::TimeSync;
use serde::{Deserialize, Serialize};

/// Describes a virtual machine: resources, bootloader and devices.
///
/// Rendering with [`VirtualMachine::to_cmdline`] does not modify the
/// description, so the same value can be rendered any number of times.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualMachine {
    /// Number of virtual CPUs, 0 lets the launcher pick its default
    #[serde(default)]
    vcpus: u32,
    /// Guest RAM size, 0 lets the launcher pick its default
    #[serde(default)]
    memory: u64,
    #[serde(default)]
    bootloader: Option<Bootloader>,
    #[serde(default)]
    devices: Vec<Device>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timesync: Option<TimeSync>,
}

impl VirtualMachine {
    /// Create a virtual machine with `vcpus` virtual CPUs, `memory` of RAM
    /// (passed to the launcher's `--memory` as is) and the given bootloader.
    pub fn new(vcpus: u32, memory: u64, bootloader: Bootloader) -> Self {
        Self {
            vcpus,
            memory,
            bootloader: Some(bootloader),
            devices: Vec::new(),
            timesync: None,
        }
    }

    pub fn vcpus(&self) -> u32 {
        self.vcpus
    }

    pub fn memory(&self) -> u64 {
        self.memory
    }

    pub fn bootloader(&self) -> Option<&Bootloader> {
        self.bootloader.as_ref()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn timesync(&self) -> Option<&TimeSync> {
        self.timesync.as_ref()
    }

    pub fn set_vcpus(&mut self, vcpus: u32) {
        self.vcpus = vcpus;
    }

    pub fn set_memory(&mut self, memory: u64) {
        self.memory = memory;
    }

    /// Replace the bootloader.
    pub fn set_bootloader(&mut self, bootloader: Bootloader) {
        self.bootloader = Some(bootloader);
    }

    /// Append a device. Devices are rendered in insertion order.
    pub fn add_device(&mut self, device: impl Into<Device>) {
        self.devices.push(device.into());
    }

    pub fn set_timesync(&mut self, timesync: TimeSync) {
        self.timesync = Some(timesync);
    }

    /// Generate the launcher argument list for this virtual machine.
    ///
    /// Arguments come in a fixed order: `--cpus`, `--memory`, bootloader,
    /// devices in insertion order, then time sync.
    ///
    /// # Errors
    /// Returns [`VmError::MissingBootloader`] when no bootloader is set, or the
    /// first validation error of the bootloader or a device. No arguments are
    /// returned on error.
    pub fn to_cmdline(&self) -> Result<Vec<String>> {
        tracing::debug!(
            vcpus = self.vcpus,
            memory = self.memory,
            devices = self.devices.len(),
            "Rendering virtual machine arguments"
        );

        let mut args = Vec::new();

        if self.vcpus != 0 {
            args.push("--cpus".to_string());
            args.push(self.vcpus.to_string());
        }
        if self.memory != 0 {
            args.push("--memory".to_string());
            args.push(self.memory.to_string());
        }

        let bootloader = self.bootloader.as_ref().ok_or(VmError::MissingBootloader)?;
        args.extend(bootloader.to_cmdline()?);

        for (index, device) in self.devices.iter().enumerate() {
            let device_args = device.to_cmdline().map_err(|e| {
                tracing::debug!(index, device = device.tag(), error = %e, "Invalid device");
                e
            })?;
            tracing::trace!(index, device = device.tag(), ?device_args, "Rendered device");
            args.extend(device_args);
        }

        if let Some(timesync) = &self.timesync {
            args.extend(timesync.to_cmdline()?);
        }

        tracing::debug!(count = args.len(), "Rendered virtual machine arguments");
        Ok(args)
    }
}
