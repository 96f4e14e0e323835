//! nodefit-core — parameter types shared by every nodefit crate.
//!
//! Inputs arrive as loosely-typed [`RawInputs`] (CLI flags, `nodefit.toml`,
//! interactive edits) and are coerced into an immutable
//! [`AllocationParams`] snapshot before anything else sees them.

pub mod config;
pub mod error;
pub mod params;

pub use config::NodefitConfig;
pub use error::{ConfigError, ConfigResult};
pub use params::{AllocationParams, RawInputs, DEFAULT_OVERHEAD_FACTOR, DEFAULT_TARGET_MAX_NODES};
