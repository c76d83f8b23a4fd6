use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tally_core::{CyclePolicy, MonthLength, NOMINAL_MONTH_DAYS};

use crate::state::ensure_tally_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub advisor: AdvisorSection,
    pub cycle: CycleSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdvisorSection {
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    /// Falls back to GEMINI_API_KEY, then API_KEY, when unset.
    pub api_key: Option<String>,
}

impl Default for AdvisorSection {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            temperature: 0.4,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CycleSection {
    /// Month length for distances that wrap past the month end.
    pub month_days: u32,
    /// Use the real length of the current month instead of `month_days`.
    pub calendar_months: bool,
    pub optimal_window_days: u32,
    pub payment_warning_days: u32,
}

impl Default for CycleSection {
    fn default() -> Self {
        let policy = CyclePolicy::default();
        Self {
            month_days: NOMINAL_MONTH_DAYS,
            calendar_months: false,
            optimal_window_days: policy.optimal_window_days,
            payment_warning_days: policy.payment_warning_days,
        }
    }
}

impl CycleSection {
    /// Month lengths a real calendar can produce.
    const MONTH_DAYS: std::ops::RangeInclusive<u32> = 28..=31;

    pub fn validate(&self) -> Result<()> {
        if !Self::MONTH_DAYS.contains(&self.month_days) {
            bail!(
                "cycle.month_days must be between 28 and 31, got {}",
                self.month_days
            );
        }
        // Calendar months can be as short as February.
        let shortest = if self.calendar_months {
            *Self::MONTH_DAYS.start()
        } else {
            self.month_days
        };
        for (name, days) in [
            ("optimal_window_days", self.optimal_window_days),
            ("payment_warning_days", self.payment_warning_days),
        ] {
            if days >= shortest {
                bail!("cycle.{name} must be shorter than a month ({shortest} days), got {days}");
            }
        }
        Ok(())
    }
}

impl Config {
    pub fn cycle_policy(&self, today: NaiveDate) -> CyclePolicy {
        let base = if self.cycle.calendar_months {
            CyclePolicy::for_month_of(today)
        } else {
            CyclePolicy {
                month_length: MonthLength::Fixed(self.cycle.month_days),
                ..CyclePolicy::default()
            }
        };
        CyclePolicy {
            optimal_window_days: self.cycle.optimal_window_days,
            payment_warning_days: self.cycle.payment_warning_days,
            ..base
        }
    }

    pub fn api_key(&self) -> Option<String> {
        self.advisor
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("invalid config {}", p.display()))
}

fn parse_config(s: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(s)?;
    cfg.cycle.validate()?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg = parse_config("[cycle]\npayment_warning_days = 3\n").unwrap();
        assert_eq!(cfg.cycle.payment_warning_days, 3);
        assert_eq!(cfg.cycle.month_days, 30);
        assert_eq!(cfg.advisor.model, "gemini-2.5-flash");
    }

    #[test]
    fn default_policy_is_thirty_day_months() {
        let policy = Config::default().cycle_policy(date(2026, 2, 10));
        assert_eq!(policy, CyclePolicy::default());
    }

    #[test]
    fn calendar_months_use_real_length() {
        let mut cfg = Config::default();
        cfg.cycle.calendar_months = true;
        cfg.cycle.optimal_window_days = 5;
        let policy = cfg.cycle_policy(date(2026, 2, 10));
        assert_eq!(policy.month_length, MonthLength::Fixed(28));
        assert_eq!(policy.optimal_window_days, 5);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let cfg = Config::default();
        let s = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(parse_config(&s).unwrap(), cfg);
    }

    #[test]
    fn month_days_outside_calendar_range_rejected() {
        for bad in [0, 27, 32, 365] {
            let err = parse_config(&format!("[cycle]\nmonth_days = {bad}\n")).unwrap_err();
            assert!(err.to_string().contains("month_days"), "{bad}: {err}");
        }
        for ok in 28..=31 {
            assert!(parse_config(&format!("[cycle]\nmonth_days = {ok}\n")).is_ok());
        }
    }

    #[test]
    fn windows_must_fit_in_a_month() {
        let err = parse_config("[cycle]\nmonth_days = 28\noptimal_window_days = 28\n").unwrap_err();
        assert!(err.to_string().contains("optimal_window_days"));
        let err = parse_config("[cycle]\npayment_warning_days = 40\n").unwrap_err();
        assert!(err.to_string().contains("payment_warning_days"));
        assert!(parse_config("[cycle]\npayment_warning_days = 29\n").is_ok());
        let err = parse_config("[cycle]\ncalendar_months = true\npayment_warning_days = 29\n")
            .unwrap_err();
        assert!(err.to_string().contains("(28 days)"));
    }
}
