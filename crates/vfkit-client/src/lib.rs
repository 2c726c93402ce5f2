//! # vfkit-client
//!
//! Typed description of a vfkit virtual machine, rendered into the argument
//! list the `vfkit` launcher expects.
//!
//! ## Quick Start
//!
//! ```
//! use vfkit_client::{Bootloader, Device, VirtualMachine};
//!
//! # fn example() -> vfkit_client::Result<()> {
//! let bootloader = Bootloader::linux("/vm/vmlinuz", "console=hvc0", "/vm/initrd");
//! let mut vm = VirtualMachine::new(2, 1024, bootloader);
//! vm.add_device(Device::blk("/vm/disk.img"));
//! vm.add_device(Device::vsock(1024, "/tmp/vsock.sock", true));
//!
//! // Hand these to std::process::Command::args
//! let args = vm.to_cmdline()?;
//! assert_eq!(&args[..2], &["--cpus", "2"]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Components
//!
//! - **Bootloaders**: Linux direct boot or EFI
//! - **Devices**: virtio-vsock, virtio-blk, virtio-rng, virtio-net,
//!   virtio-serial and virtio-fs
//! - **Time sync**: host time propagation after sleep
//!
//! Each component validates its own required fields when rendered. Rendering
//! a virtual machine is all-or-nothing: the first invalid component aborts it.

mod bootloader;
mod builder;
mod device;
mod error;
mod mac;
mod machine;
mod timesync;

pub use bootloader::{Bootloader, EfiBootloader, LinuxBootloader};
pub use builder::VmBuilder;
pub use device::{Device, VirtioBlk, VirtioFs, VirtioNet, VirtioRng, VirtioSerial, VirtioVsock};
pub use error::{Result, VmError};
pub use mac::MacAddress;
pub use machine::VirtualMachine;
pub use timesync::TimeSync;
