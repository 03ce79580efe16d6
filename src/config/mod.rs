//! Configuration loading and management for the payroll engine.
//!
//! This module loads payroll policy from YAML files: the overtime divisor,
//! statutory fund rates, leave treatment and effective-dated tax tables.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/standard").unwrap();
//! println!("Loaded policy: {}", config.config().settings().version);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    LeavePolicy, PayrollPolicy, PolicyConfig, PolicySettings, TaxBracket, TaxTable,
};
