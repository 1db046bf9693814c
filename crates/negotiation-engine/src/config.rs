//! Scheduling configuration.
//!
//! Business hours, the reference timezone and the search granularity are all
//! configuration rather than constants, so one engine serves any office. The
//! on-disk format is TOML:
//!
//! ```toml
//! timezone = "Europe/Berlin"
//! business_start_hour = 8
//! business_end_hour = 16
//! slot_step_minutes = 15
//! ```
//!
//! Omitted keys fall back to [`SchedulingConfig::default`].

use std::fs;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::hours::BusinessHours;

pub const DEFAULT_TIMEZONE: &str = "America/New_York";
pub const DEFAULT_BUSINESS_START_HOUR: u32 = 9;
pub const DEFAULT_BUSINESS_END_HOUR: u32 = 17;
pub const DEFAULT_SLOT_STEP_MINUTES: u32 = 30;
pub const DEFAULT_RELOCATION_HORIZON_DAYS: u32 = 7;
pub const DEFAULT_MAX_PROPOSALS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulingConfig {
    /// IANA timezone used for all business-hour comparisons.
    pub timezone: String,
    pub business_start_hour: u32,
    pub business_end_hour: u32,
    /// Increment between candidate start times.
    pub slot_step_minutes: u32,
    /// How far past a conflict's original start the relocator may look.
    pub relocation_horizon_days: u32,
    /// Cap on negotiable proposals returned by a search.
    pub max_proposals: usize,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            business_start_hour: DEFAULT_BUSINESS_START_HOUR,
            business_end_hour: DEFAULT_BUSINESS_END_HOUR,
            slot_step_minutes: DEFAULT_SLOT_STEP_MINUTES,
            relocation_horizon_days: DEFAULT_RELOCATION_HORIZON_DAYS,
            max_proposals: DEFAULT_MAX_PROPOSALS,
        }
    }
}

impl SchedulingConfig {
    /// Default configuration pinned to another timezone.
    pub fn with_timezone(timezone: &str) -> Self {
        Self {
            timezone: timezone.to_string(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.business_hours()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Validate the configuration and build the business-hours calendar.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidTimezone` if `timezone` is not a valid IANA
    /// identifier, and the matching range error for any out-of-range number.
    pub fn business_hours(&self) -> Result<BusinessHours, ConfigError> {
        let tz: chrono_tz::Tz = self
            .timezone
            .parse()
            .map_err(|_| ConfigError::InvalidTimezone(self.timezone.clone()))?;

        if self.business_start_hour >= self.business_end_hour || self.business_end_hour > 24 {
            return Err(ConfigError::InvalidBusinessHours {
                start: self.business_start_hour,
                end: self.business_end_hour,
            });
        }
        if self.slot_step_minutes == 0 || self.slot_step_minutes > 24 * 60 {
            return Err(ConfigError::InvalidStep(self.slot_step_minutes));
        }
        if self.relocation_horizon_days == 0 {
            return Err(ConfigError::InvalidHorizon(self.relocation_horizon_days));
        }
        if self.max_proposals == 0 {
            return Err(ConfigError::InvalidMaxProposals);
        }

        Ok(BusinessHours {
            tz,
            start_hour: self.business_start_hour,
            end_hour: self.business_end_hour,
            step: Duration::minutes(i64::from(self.slot_step_minutes)),
            relocation_horizon: Duration::days(i64::from(self.relocation_horizon_days)),
            max_proposals: self.max_proposals,
        })
    }
}
