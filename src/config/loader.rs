//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! policy from YAML files.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{PayrollPolicy, PolicyConfig, PolicySettings, TaxTable};

/// Loads and provides access to payroll policy configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/standard/
/// ├── policy.yaml            # Overtime divisor, fund rates, leave treatment
/// └── tax_tables/
///     └── 2000-01-01.yaml    # Tax brackets effective from this date
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/standard").unwrap();
/// let policy = loader
///     .policy_for(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
///     .unwrap();
/// println!("Using policy {}", policy.version());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PolicyConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if any required file is missing, contains invalid
    /// YAML, or describes an invalid policy or tax table.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let policy_path = path.join("policy.yaml");
        let settings = Self::load_yaml::<PolicySettings>(&policy_path)?;
        settings
            .validate()
            .map_err(|message| EngineError::ConfigParseError {
                path: policy_path.display().to_string(),
                message,
            })?;

        let tables_dir = path.join("tax_tables");
        let tax_tables = Self::load_tax_tables(&tables_dir)?;

        Ok(Self {
            config: PolicyConfig::new(settings, tax_tables),
        })
    }

    /// A loader carrying the built-in policy, with no files involved.
    pub fn built_in() -> Self {
        Self {
            config: PolicyConfig::new(PolicySettings::default(), vec![TaxTable::default()]),
        }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads and validates all tax tables from the tables directory.
    fn load_tax_tables(tables_dir: &Path) -> EngineResult<Vec<TaxTable>> {
        let tables_dir_str = tables_dir.display().to_string();

        let entries = fs::read_dir(tables_dir).map_err(|_| EngineError::ConfigNotFound {
            path: tables_dir_str.clone(),
        })?;

        let mut tables = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: tables_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let table = Self::load_yaml::<TaxTable>(&path)?;
                table
                    .validate()
                    .map_err(|message| EngineError::ConfigParseError {
                        path: path.display().to_string(),
                        message,
                    })?;
                tables.push(table);
            }
        }

        if tables.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no tax tables found)", tables_dir_str),
            });
        }

        Ok(tables)
    }

    /// Returns the underlying policy configuration.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Gets the tax table in force on a given date.
    ///
    /// The most recent table effective on or before the date wins.
    pub fn tax_table_for(&self, date: NaiveDate) -> EngineResult<&TaxTable> {
        self.config
            .tax_tables()
            .iter()
            .rev()
            .find(|table| table.effective_date <= date)
            .ok_or(EngineError::TaxTableNotFound { date })
    }

    /// Assembles the complete policy for a pay period starting on `date`.
    pub fn policy_for(&self, date: NaiveDate) -> EngineResult<PayrollPolicy> {
        let table = self.tax_table_for(date)?;
        Ok(PayrollPolicy::new(
            self.config.settings().clone(),
            table.clone(),
        ))
    }
}
