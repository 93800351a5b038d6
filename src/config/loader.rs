//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading statutory
//! tables from YAML files.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineConfig, JurisdictionMetadata, TaxYearConfig};

/// Loads and provides access to statutory configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory,
/// checks every rate table, and resolves the constants for a tax year.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/uk/
/// ├── jurisdiction.yaml    # Metadata and default tax year
/// └── tax_years/
///     ├── 2024-25.yaml     # Constants for the 2024-25 tax year
///     └── 2025-26.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use statutory_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/uk").unwrap();
///
/// let year = loader.get_tax_year("2025-26").unwrap();
/// println!("SMP cap: £{}", year.statutory_pay.weekly_cap);
///
/// let date = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
/// let year = loader.tax_year_for_date(date).unwrap();
/// assert_eq!(year.tax_year, "2025-26");
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/uk")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - Any rate table is not contiguous from zero
    /// - The default tax year is not among the loaded years
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<JurisdictionMetadata>(&path.join("jurisdiction.yaml"))?;
        let tax_years = Self::load_tax_years(&path.join("tax_years"))?;

        for year in &tax_years {
            year.check()?;
        }

        let config = EngineConfig::new(metadata, tax_years);
        let loader = Self { config };

        // The default must resolve, or every defaulted calculation would fail later.
        loader.default_tax_year()?;

        info!(
            jurisdiction = %loader.jurisdiction().code,
            version = %loader.jurisdiction().version,
            tax_years = loader.config.tax_years().len(),
            "Loaded statutory configuration"
        );

        Ok(loader)
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

    /// Loads all tax year files from the tax_years directory.
    fn load_tax_years(dir: &Path) -> EngineResult<Vec<TaxYearConfig>> {
        let dir_str = dir.display().to_string();

        if !dir.exists() {
            return Err(EngineError::ConfigNotFound { path: dir_str });
        }

        let entries = fs::read_dir(dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut years = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                years.push(Self::load_yaml::<TaxYearConfig>(&path)?);
            }
        }

        if years.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no tax year files found)", dir_str),
            });
        }

        Ok(years)
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the jurisdiction metadata.
    pub fn jurisdiction(&self) -> &JurisdictionMetadata {
        self.config.jurisdiction()
    }

    /// Returns the identifiers of every loaded tax year, oldest first.
    pub fn tax_year_ids(&self) -> Vec<&str> {
        self.config
            .tax_years()
            .iter()
            .map(|y| y.tax_year.as_str())
            .collect()
    }

    /// Gets the constants for a tax year by identifier (e.g. "2025-26").
    pub fn get_tax_year(&self, tax_year: &str) -> EngineResult<&TaxYearConfig> {
        self.config
            .tax_years()
            .iter()
            .find(|y| y.tax_year == tax_year)
            .ok_or_else(|| EngineError::TaxYearNotFound {
                tax_year: tax_year.to_string(),
            })
    }

    /// Gets the constants in force on a date.
    ///
    /// Finds the most recent tax year starting on or before the date, so dates
    /// after the last configured year use the latest known constants.
    pub fn tax_year_for_date(&self, date: NaiveDate) -> EngineResult<&TaxYearConfig> {
        self.config
            .tax_years()
            .iter()
            .rfind(|y| y.starts_on <= date)
            .ok_or(EngineError::NoTaxYearForDate { date })
    }

    /// Gets the constants for the configured default tax year.
    pub fn default_tax_year(&self) -> EngineResult<&TaxYearConfig> {
        self.get_tax_year(&self.jurisdiction().default_tax_year)
    }

    /// Resolves an optional tax year identifier, falling back to the default.
    pub fn resolve_tax_year(&self, tax_year: Option<&str>) -> EngineResult<&TaxYearConfig> {
        match tax_year {
            Some(id) => self.get_tax_year(id),
            None => self.default_tax_year(),
        }
    }
}
