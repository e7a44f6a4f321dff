//! params/mod.rs
//! Parameter domains, the staged parameter set, the option applier and
//! configuration overrides.

pub mod env;
pub mod options;
pub mod set;
pub mod types;

pub use env::EnvOverrides;
pub use options::{apply_options, Capabilities, ParameterTarget, QzOption, SessionParams, TargetRole};
pub use set::{Explicit, ParameterSet};
pub use types::*;
pub use crate::types::ParamError;
