//! Bootloader configuration: how the guest kernel or firmware is started.

use crate::error::{Result, VmError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Boots a Linux kernel directly with the given initrd and command line.
///
/// On ARM64 the kernel must be uncompressed, otherwise the guest fails to boot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinuxBootloader {
    /// Path to the kernel image
    pub kernel_path: PathBuf,
    /// Kernel command line
    pub kernel_cmdline: String,
    /// Path to the initrd
    pub initrd_path: PathBuf,
}

impl LinuxBootloader {
    pub fn new(
        kernel_path: impl Into<PathBuf>,
        kernel_cmdline: impl Into<String>,
        initrd_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            kernel_path: kernel_path.into(),
            kernel_cmdline: kernel_cmdline.into(),
            initrd_path: initrd_path.into(),
        }
    }

    /// Render as `--kernel P --initrd P --kernel-cmdline S`.
    pub fn to_cmdline(&self) -> Result<Vec<String>> {
        if self.kernel_path.as_os_str().is_empty() {
            return Err(VmError::missing("linux", "kernel path"));
        }
        if self.initrd_path.as_os_str().is_empty() {
            return Err(VmError::missing("linux", "initrd path"));
        }
        if self.kernel_cmdline.is_empty() {
            return Err(VmError::missing("linux", "kernel command line"));
        }

        Ok(vec![
            "--kernel".to_string(),
            self.kernel_path.display().to_string(),
            "--initrd".to_string(),
            self.initrd_path.display().to_string(),
            "--kernel-cmdline".to_string(),
            self.kernel_cmdline.clone(),
        ])
    }
}

/// Boots through EFI firmware, keeping EFI variables in a file on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EfiBootloader {
    /// Path to the EFI variable store
    pub variable_store_path: PathBuf,
    /// Create the variable store file if it does not exist
    #[serde(default)]
    pub create_variable_store: bool,
}

impl EfiBootloader {
    pub fn new(variable_store_path: impl Into<PathBuf>, create: bool) -> Self {
        Self {
            variable_store_path: variable_store_path.into(),
            create_variable_store: create,
        }
    }

    /// Render as `--bootloader efi,variable-store=P[,create]`.
    pub fn to_cmdline(&self) -> Result<Vec<String>> {
        if self.variable_store_path.as_os_str().is_empty() {
            return Err(VmError::missing("efi", "variable store path"));
        }

        let mut value = format!(
            "efi,variable-store={}",
            self.variable_store_path.display()
        );
        if self.create_variable_store {
            value.push_str(",create");
        }

        Ok(vec!["--bootloader".to_string(), value])
    }
}

/// Specifies how to boot the virtual machine.
///
/// A virtual machine without a bootloader cannot be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Bootloader {
    Linux(LinuxBootloader),
    Efi(EfiBootloader),
}

impl Bootloader {
    /// Create a Linux direct-boot bootloader.
    pub fn linux(
        kernel_path: impl Into<PathBuf>,
        kernel_cmdline: impl Into<String>,
        initrd_path: impl Into<PathBuf>,
    ) -> Self {
        Bootloader::Linux(LinuxBootloader::new(
            kernel_path,
            kernel_cmdline,
            initrd_path,
        ))
    }

    /// Create an EFI bootloader. `create` controls whether the variable store
    /// file is created by the launcher.
    pub fn efi(variable_store_path: impl Into<PathBuf>, create: bool) -> Self {
        Bootloader::Efi(EfiBootloader::new(variable_store_path, create))
    }

    /// Validate and render the bootloader into launcher arguments.
    pub fn to_cmdline(&self) -> Result<Vec<String>> {
        match self {
            Bootloader::Linux(linux) => linux.to_cmdline(),
            Bootloader::Efi(efi) => efi.to_cmdline(),
        }
    }
}

impl From<LinuxBootloader> for Bootloader {
    fn from(linux: LinuxBootloader) -> Self {
        Bootloader::Linux(linux)
    }
}

impl From<EfiBootloader> for Bootloader {
    fn from(efi: EfiBootloader) -> Self {
        Bootloader::Efi(efi)
    }
}
