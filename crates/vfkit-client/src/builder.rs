//! Builder pattern for ergonomic VirtualMachine configuration.

use crate::bootloader::Bootloader;
use crate::device::Device;
use crate::error::Result;
use crate::timesync::TimeSync;
use crate::VirtualMachine;
use std::path::PathBuf;

/// Fluent builder for VirtualMachine descriptions.
///
/// # Example
///
/// ```
/// use vfkit_client::{Device, VmBuilder};
///
/// # fn example() -> vfkit_client::Result<()> {
/// let args = VmBuilder::new()
///     .vcpus(2)
///     .memory(1024)
///     .efi_boot("/vm/efi-variable-store", true)
///     .with_device(Device::blk("/vm/disk.img"))
///     .with_device(Device::net("")?)
///     .to_cmdline()?;
///
/// assert_eq!(args[0], "--cpus");
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct VmBuilder {
    vm: VirtualMachine,
}

impl VmBuilder {
    /// Create a builder with no resources, bootloader or devices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of virtual CPUs.
    pub fn vcpus(mut self, count: u32) -> Self {
        self.vm.set_vcpus(count);
        self
    }

    /// Set the guest memory, passed verbatim to `--memory`.
    pub fn memory(mut self, memory: u64) -> Self {
        self.vm.set_memory(memory);
        self
    }

    /// Set the bootloader.
    pub fn bootloader(mut self, bootloader: Bootloader) -> Self {
        self.vm.set_bootloader(bootloader);
        self
    }

    /// Boot a Linux kernel directly.
    pub fn linux_boot(
        self,
        kernel: impl Into<PathBuf>,
        cmdline: impl Into<String>,
        initrd: impl Into<PathBuf>,
    ) -> Self {
        self.bootloader(Bootloader::linux(kernel, cmdline, initrd))
    }

    /// Boot through EFI with the given variable store.
    pub fn efi_boot(self, variable_store: impl Into<PathBuf>, create: bool) -> Self {
        self.bootloader(Bootloader::efi(variable_store, create))
    }

    /// Append a device.
    pub fn with_device(mut self, device: impl Into<Device>) -> Self {
        self.vm.add_device(device);
        self
    }

    /// Enable guest time sync through the agent on `vsock_port` (0 = unset).
    pub fn timesync(mut self, vsock_port: u32) -> Self {
        self.vm.set_timesync(TimeSync::new(vsock_port));
        self
    }

    /// Return the configured description.
    pub fn build(self) -> VirtualMachine {
        self.vm
    }

    /// Render the configured description without consuming it further.
    pub fn to_cmdline(&self) -> Result<Vec<String>> {
        self.vm.to_cmdline()
    }
}
