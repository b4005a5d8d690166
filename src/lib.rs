//! Interpretation of Growatt inverter Modbus registers through declarative register profiles.
//!
//! ```
//! use growatt_profile_tools::registers::Bank;
//! use growatt_profile_tools::registry::Registry;
//!
//! let registry = Registry::builtin()?;
//! let values = registry.decode("WIT_4000_15000TL3", Bank::Input, 31200, &[0, 121])?;
//! assert_eq!(values["battery_power"].value, 121.0);
//! assert_eq!(values["battery_power"].unit, "W");
//! let write = registry.encode("WIT_4000_15000TL3", Bank::Holding, "vpp_remote_enable", "Enabled")?;
//! assert_eq!((write.addresses, write.words), (vec![202], vec![1]));
//! # Ok::<(), growatt_profile_tools::Error>(())
//! ```

pub mod codec;
pub mod commands;
pub mod error;
pub mod output;
pub mod profile;
pub mod profiles;
pub mod read_plan;
pub mod registers;
pub mod registry;

pub use error::Error;
