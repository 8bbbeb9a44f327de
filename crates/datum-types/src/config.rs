use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};

/// Session-level settings consulted by the conversion engine.
///
/// Missing fields deserialize to their defaults, so an empty document is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// IANA zone name used for "current date" lookups and timezone shifts.
    pub time_zone: String,
    /// Charset assumed for string targets whose descriptor leaves the charset empty.
    pub default_charset: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            time_zone: "UTC".to_string(),
            default_charset: datum_charset::CHARSET_UTF8MB4.to_string(),
        }
    }
}

/// Validated configuration plus the clock used by conversions that need "now"
/// (Duration to Datetime anchoring, Duration to YEAR).
#[derive(Debug, Clone)]
pub struct ConvertContext {
    config: ConvertConfig,
    tz: Tz,
    default_charset: &'static str,
    now: Option<DateTime<Utc>>,
}

impl ConvertContext {
    pub fn new(config: ConvertConfig) -> TypeResult<Self> {
        let tz: Tz = config
            .time_zone
            .parse()
            .map_err(|_| TypeError::malformed("time zone", config.time_zone.clone()))?;
        let default_charset = datum_charset::charset_desc(&config.default_charset)?.name;
        log::debug!(
            "conversion context resolved: time_zone={tz} default_charset={default_charset}"
        );
        Ok(Self {
            config,
            tz,
            default_charset,
            now: None,
        })
    }

    /// Pins the clock to `now`. Used by tests and by callers that need a
    /// statement-stable timestamp.
    #[must_use]
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    pub fn time_zone(&self) -> Tz {
        self.tz
    }

    pub fn default_charset(&self) -> &'static str {
        self.default_charset
    }

    pub fn now_utc(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    /// Today's date in the configured zone.
    pub fn current_date(&self) -> NaiveDate {
        self.now_utc().with_timezone(&self.tz).date_naive()
    }

    pub fn current_year(&self) -> i32 {
        self.current_date().year()
    }
}

impl Default for ConvertContext {
    fn default() -> Self {
        Self {
            config: ConvertConfig::default(),
            tz: Tz::UTC,
            default_charset: datum_charset::CHARSET_UTF8MB4,
            now: None,
        }
    }
}
