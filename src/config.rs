//! Generator configuration: defaults, TOML profile files, and validation.
//!
//! A profile file may override any subset of the defaults:
//!
//! ```toml
//! start = "2019-01-01"
//! days = 2000
//! seed = 7
//!
//! [steel]
//! base_low = 50000.0
//! base_high = 65000.0
//! noise_sd = 800.0
//! ```

use std::fs;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::Material;
use crate::error::{AppError, EstimateError};

/// Default length of the historical window.
pub const DEFAULT_DAYS: usize = 2000;

/// Default series start (the reference data set's epoch).
pub fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Linear baseline and Gaussian noise for one material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialProfile {
    /// Baseline value on day 0.
    pub base_low: f64,
    /// Baseline value on the last day.
    pub base_high: f64,
    /// Standard deviation of the per-day noise.
    pub noise_sd: f64,
}

impl MaterialProfile {
    pub const fn new(base_low: f64, base_high: f64, noise_sd: f64) -> Self {
        Self {
            base_low,
            base_high,
            noise_sd,
        }
    }

    /// Default profile per material.
    pub fn default_for(material: Material) -> Self {
        match material {
            Material::Cement => Self::new(300.0, 500.0, 3.0),
            Material::Steel => Self::new(50_000.0, 65_000.0, 800.0),
            Material::Brick => Self::new(6.5, 9.5, 0.1),
            Material::Sand => Self::new(800.0, 1200.0, 15.0),
        }
    }

    /// Same baseline with the noise switched off.
    pub fn noiseless(self) -> Self {
        Self { noise_sd: 0.0, ..self }
    }
}

/// Profiles for every material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialProfiles {
    pub cement: MaterialProfile,
    pub steel: MaterialProfile,
    pub brick: MaterialProfile,
    pub sand: MaterialProfile,
}

impl Default for MaterialProfiles {
    fn default() -> Self {
        Self {
            cement: MaterialProfile::default_for(Material::Cement),
            steel: MaterialProfile::default_for(Material::Steel),
            brick: MaterialProfile::default_for(Material::Brick),
            sand: MaterialProfile::default_for(Material::Sand),
        }
    }
}

impl MaterialProfiles {
    pub fn get(&self, material: Material) -> MaterialProfile {
        match material {
            Material::Cement => self.cement,
            Material::Steel => self.steel,
            Material::Brick => self.brick,
            Material::Sand => self.sand,
        }
    }

    pub fn get_mut(&mut self, material: Material) -> &mut MaterialProfile {
        match material {
            Material::Cement => &mut self.cement,
            Material::Steel => &mut self.steel,
            Material::Brick => &mut self.brick,
            Material::Sand => &mut self.sand,
        }
    }
}

/// Everything the series generator needs.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub start: NaiveDate,
    pub days: usize,
    pub profiles: MaterialProfiles,
    /// Fixed RNG seed; `None` draws one from OS entropy.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start: default_start(),
            days: DEFAULT_DAYS,
            profiles: MaterialProfiles::default(),
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Disable noise for every material (useful for golden tests).
    pub fn noiseless(mut self) -> Self {
        for m in Material::ALL {
            let p = self.profiles.get_mut(m);
            *p = p.noiseless();
        }
        self
    }

    /// Date of the final generated row, if it is representable.
    pub fn last_date(&self) -> Option<NaiveDate> {
        let offset = i64::try_from(self.days.checked_sub(1)?).ok()?;
        self.start.checked_add_signed(Duration::try_days(offset)?)
    }

    pub fn validate(&self) -> Result<(), EstimateError> {
        if self.days == 0 {
            return Err(EstimateError::InvalidSeries("day count must be > 0".to_string()));
        }
        if self.last_date().is_none() {
            return Err(EstimateError::InvalidSeries(format!(
                "{} days from {} runs past the last representable date",
                self.days, self.start
            )));
        }
        for m in Material::ALL {
            let p = self.profiles.get(m);
            if !(p.base_low.is_finite() && p.base_high.is_finite() && p.base_low >= 0.0 && p.base_high >= 0.0) {
                return Err(EstimateError::InvalidSeries(format!(
                    "{} baseline must be finite and nonnegative",
                    m.display_name()
                )));
            }
            if !(p.noise_sd.is_finite() && p.noise_sd >= 0.0) {
                return Err(EstimateError::InvalidSeries(format!(
                    "{} noise_sd must be finite and nonnegative",
                    m.display_name()
                )));
            }
        }
        Ok(())
    }
}

/// On-disk shape of a profile file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileFile {
    start: Option<NaiveDate>,
    days: Option<usize>,
    seed: Option<u64>,
    cement: Option<MaterialProfile>,
    steel: Option<MaterialProfile>,
    brick: Option<MaterialProfile>,
    sand: Option<MaterialProfile>,
}

/// Parse a TOML profile document on top of the defaults.
pub fn parse_generator_config(content: &str) -> Result<GeneratorConfig, String> {
    let file: ProfileFile = toml::from_str(content).map_err(|e| format!("parse profile TOML: {e}"))?;

    let mut config = GeneratorConfig::default();
    if let Some(start) = file.start {
        config.start = start;
    }
    if let Some(days) = file.days {
        config.days = days;
    }
    config.seed = file.seed;

    let overrides = [
        (Material::Cement, file.cement),
        (Material::Steel, file.steel),
        (Material::Brick, file.brick),
        (Material::Sand, file.sand),
    ];
    for (material, profile) in overrides {
        if let Some(profile) = profile {
            *config.profiles.get_mut(material) = profile;
        }
    }

    Ok(config)
}

/// Load a TOML profile file.
pub fn load_generator_config(path: &Path) -> Result<GeneratorConfig, AppError> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read profile file '{}': {e}", path.display())))?;
    let config = parse_generator_config(&content)
        .map_err(|e| AppError::new(2, format!("Invalid profile file '{}': {e}", path.display())))?;
    tracing::debug!(path = %path.display(), days = config.days, "loaded generator profiles");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_profile_file_keeps_defaults() {
        let config = parse_generator_config("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn partial_overrides_apply() {
        let config = parse_generator_config(
            r#"
            start = "2020-06-01"
            days = 30
            seed = 9

            [brick]
            base_low = 1.0
            base_high = 2.0
            noise_sd = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(config.start, NaiveDate::from_ymd_opt(2020, 6, 1).unwrap());
        assert_eq!(config.days, 30);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.profiles.brick, MaterialProfile::new(1.0, 2.0, 0.0));
        assert_eq!(config.profiles.cement, MaterialProfile::default_for(Material::Cement));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_generator_config("dayz = 3").unwrap_err();
        assert!(err.contains("parse profile TOML"));
    }

    #[test]
    fn validation_catches_bad_profiles() {
        let mut config = GeneratorConfig::default();
        config.days = 0;
        assert!(config.validate().is_err());

        let mut config = GeneratorConfig::default();
        config.profiles.sand.noise_sd = -1.0;
        assert!(config.validate().is_err());

        assert!(GeneratorConfig::default().noiseless().validate().is_ok());
    }

    #[test]
    fn unrepresentable_day_counts_are_rejected() {
        for days in [1usize << 40, usize::MAX] {
            let config = GeneratorConfig {
                days,
                ..GeneratorConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(EstimateError::InvalidSeries(ref msg)) if msg.contains("representable")),
                "days={days}"
            );
        }

        let config = GeneratorConfig {
            days: DEFAULT_DAYS,
            ..GeneratorConfig::default()
        };
        assert_eq!(config.last_date(), NaiveDate::from_ymd_opt(2024, 6, 22));
    }
}
