// src/config/mod.rs

//! Configuration loading and validation for bootwatch.
//!
//! - `model.rs` defines the TOML-backed data model.
//! - `loader.rs` loads a config file from disk.
//! - `validate.rs` turns a `RawConfigFile` into a checked `ConfigFile`.
//! - `duration.rs` parses the compact duration strings used in `[launch]`.

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{
    ConfigFile, ExecutableSection, FrontendSection, LaunchSection, LaunchTimings,
    RawConfigFile, ServerSection,
};
pub use validate::parse_launch_timings;
