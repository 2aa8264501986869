//! Engine configuration loaded from TOML.
//!
//! ```toml
//! default_timezone = "America/New_York"
//! stepping = "fixed_grid"          # or "pack_around_bookings"
//! dst_policy = "shift_forward"     # or "skip"
//! ```
//!
//! Every key is optional.

use std::path::Path;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;
use crate::error::{Result, SlotError};
use crate::records::parse_timezone;
use crate::slots::{SlotOptions, SteppingPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Zone used for availability records that do not carry their own.
    pub default_timezone: String,
    pub stepping: SteppingPolicy,
    pub dst_policy: DstPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_timezone: "UTC".to_string(),
            stepping: SteppingPolicy::default(),
            dst_policy: DstPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| SlotError::Config(e.to_string()))?;
        config.timezone()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SlotError::Config(format!("{}: {}", path.display(), e)))?;
        log::debug!("loading engine config from {}", path.display());
        Self::from_toml_str(&contents)
    }

    pub fn timezone(&self) -> Result<Tz> {
        parse_timezone(&self.default_timezone)
    }

    /// Slot options for one request. `not_before` is the caller's "now", if any.
    pub fn slot_options(&self, not_before: Option<DateTime<Utc>>) -> SlotOptions {
        SlotOptions {
            stepping: self.stepping,
            not_before,
            dst_policy: self.dst_policy,
        }
    }
}
