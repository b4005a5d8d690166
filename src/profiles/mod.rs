//! Built-in register profiles.

use crate::profile::ProfileDeclaration;

mod wit;

pub use wit::WIT_4000_15000TL3;

/// Every profile the [`Registry`](crate::registry::Registry) is populated with.
pub static BUILTIN: &[&ProfileDeclaration] = &[&WIT_4000_15000TL3];
