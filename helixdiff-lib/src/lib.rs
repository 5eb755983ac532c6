mod base;
mod compare;
mod config;
mod diff;
mod error;
mod helix;
mod sex;
mod telomere;

pub use crate::base::*;
pub use crate::compare::*;
pub use crate::config::*;
pub use crate::diff::*;
pub use crate::error::*;
pub use crate::helix::*;
pub use crate::sex::*;
pub use crate::telomere::*;
