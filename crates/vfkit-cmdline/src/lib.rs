//! # vfkit-cmdline
//!
//! Command-line layer for the vfkit launcher: list-valued flags, device and
//! bootloader specifications, and the option set that turns into a
//! [`vfkit_client::VirtualMachine`].
//!
//! ## Quick Start
//!
//! ```
//! use clap::Parser;
//! use vfkit_cmdline::{LauncherConfig, Options};
//!
//! # fn example() -> anyhow::Result<()> {
//! let opts = Options::try_parse_from([
//!     "vfkit",
//!     "--bootloader",
//!     "efi,variable-store=/vm/efi-store,create",
//!     "--device",
//!     "virtio-blk,path=/vm/disk.img",
//! ])?;
//!
//! let vm = opts.to_virtual_machine(&LauncherConfig::default())?;
//! let args = vm.to_cmdline()?;
//! assert_eq!(args[4], "--bootloader");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## List values
//!
//! [`ListValue`] splits `a,b,"c,d"` into `a`, `b` and `c,d`, accumulates
//! repeated flag occurrences, and renders back to the same syntax.

mod config;
mod error;
mod list_value;
mod options;
mod parse;

pub use config::{ConfigError, LauncherConfig};
pub use error::{CmdlineError, Result};
pub use list_value::{split_list, ListValue};
pub use options::Options;
pub use parse::{parse_bootloader, parse_device, parse_timesync};
