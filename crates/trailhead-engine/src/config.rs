//! Typed configuration and catalog loading for the campaign engine.
//!
//! Engine tuning lives in `trailhead-config.yaml` at the project root; the
//! event and prompt catalogs are JSON documents under `data/`. This module
//! defines strongly-typed structs mirroring the YAML structure with serde
//! defaults for every knob, plus loaders for the JSON catalogs.

use std::path::Path;

use serde::Deserialize;
use trailhead_types::{EventCatalog, PromptCatalog};

use crate::error::ConfigError;

/// Top-level engine configuration.
///
/// Mirrors the structure of `trailhead-config.yaml`. All fields have
/// defaults matching the shipped campaign balance.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CampaignConfig {
    /// Campaign balance knobs (resources, costs, probabilities, caps).
    #[serde(default)]
    pub campaign: CampaignTuning,

    /// Remote service endpoints.
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CampaignConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for endpoints:
    /// - `TRAILHEAD_TELEMETRY_ENDPOINT` overrides `endpoints.telemetry_url`
    /// - `TRAILHEAD_LEADERBOARD_ENDPOINT` overrides `endpoints.leaderboard_url`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.endpoints.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.endpoints.apply_env_overrides();
        Ok(config)
    }
}

/// Campaign balance configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CampaignTuning {
    /// Number of campuses in the rollout; reaching it completes the campaign.
    #[serde(default = "default_total_campuses")]
    pub total_campuses: u32,

    /// Budget granted on reset and on role selection.
    #[serde(default = "default_starting_budget")]
    pub starting_budget: u32,

    /// Goodwill granted on reset.
    #[serde(default = "default_starting_goodwill")]
    pub starting_goodwill: u32,

    /// Morale granted on reset.
    #[serde(default = "default_starting_morale")]
    pub starting_morale: u32,

    /// Engagement label applied on reset.
    #[serde(default = "default_starting_engagement")]
    pub starting_engagement: String,

    /// Pace label applied on reset.
    #[serde(default = "default_starting_pace")]
    pub starting_pace: String,

    /// Budget spent by each turn before events fire.
    #[serde(default = "default_turn_budget_cost")]
    pub turn_budget_cost: u32,

    /// Morale lost by each turn before events fire.
    #[serde(default = "default_turn_morale_cost")]
    pub turn_morale_cost: u32,

    /// Goodwill lost by each turn before events fire.
    #[serde(default = "default_turn_goodwill_cost")]
    pub turn_goodwill_cost: u32,

    /// Probability that a turn with eligible events triggers one.
    #[serde(default = "default_event_probability")]
    pub event_probability: f64,

    /// Maximum retained travel log entries; older entries are dropped.
    #[serde(default = "default_travel_log_cap")]
    pub travel_log_cap: usize,

    /// Maximum teammates recorded per campaign.
    #[serde(default = "default_max_teammates")]
    pub max_teammates: usize,

    /// Users added per growth advancement.
    #[serde(default = "default_users_increment")]
    pub users_increment: u64,

    /// Calendar days a growth advancement moves the derived timeline.
    #[serde(default = "default_progress_day_increment")]
    pub progress_day_increment: u64,

    /// Calendar year the timeline starts in.
    #[serde(default = "default_start_year")]
    pub start_year: i32,

    /// Last year the rollout may still be running; past it the campaign
    /// fails on time.
    #[serde(default = "default_deadline_year")]
    pub deadline_year: i32,
}

impl Default for CampaignTuning {
    fn default() -> Self {
        Self {
            total_campuses: default_total_campuses(),
            starting_budget: default_starting_budget(),
            starting_goodwill: default_starting_goodwill(),
            starting_morale: default_starting_morale(),
            starting_engagement: default_starting_engagement(),
            starting_pace: default_starting_pace(),
            turn_budget_cost: default_turn_budget_cost(),
            turn_morale_cost: default_turn_morale_cost(),
            turn_goodwill_cost: default_turn_goodwill_cost(),
            event_probability: default_event_probability(),
            travel_log_cap: default_travel_log_cap(),
            max_teammates: default_max_teammates(),
            users_increment: default_users_increment(),
            progress_day_increment: default_progress_day_increment(),
            start_year: default_start_year(),
            deadline_year: default_deadline_year(),
        }
    }
}

/// Remote service endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EndpointsConfig {
    /// Telemetry ingestion URL (empty = telemetry disabled).
    #[serde(default)]
    pub telemetry_url: String,

    /// Leaderboard service URL (empty = derived from `telemetry_url`).
    #[serde(default)]
    pub leaderboard_url: String,
}

impl EndpointsConfig {
    /// Override endpoint URLs with environment variables when set.
    ///
    /// This lets deployments point at a different collector without
    /// modifying the YAML config file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TRAILHEAD_TELEMETRY_ENDPOINT") {
            self.telemetry_url = val;
        }
        if let Ok(val) = std::env::var("TRAILHEAD_LEADERBOARD_ENDPOINT") {
            self.leaderboard_url = val;
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Load the event catalog from a JSON file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, or
/// [`ConfigError::Json`] if the content is not a valid event catalog.
pub fn load_event_catalog(path: &Path) -> Result<EventCatalog, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Load the prompt catalog from a JSON file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, or
/// [`ConfigError::Json`] if the content is not a valid prompt catalog.
pub fn load_prompt_catalog(path: &Path) -> Result<PromptCatalog, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_total_campuses() -> u32 {
    23
}

const fn default_starting_budget() -> u32 {
    800
}

const fn default_starting_goodwill() -> u32 {
    100
}

const fn default_starting_morale() -> u32 {
    70
}

fn default_starting_engagement() -> String {
    "filling".to_owned()
}

fn default_starting_pace() -> String {
    "steady".to_owned()
}

const fn default_turn_budget_cost() -> u32 {
    40
}

const fn default_turn_morale_cost() -> u32 {
    4
}

const fn default_turn_goodwill_cost() -> u32 {
    2
}

const fn default_event_probability() -> f64 {
    0.65
}

const fn default_travel_log_cap() -> usize {
    12
}

const fn default_max_teammates() -> usize {
    4
}

const fn default_users_increment() -> u64 {
    1000
}

const fn default_progress_day_increment() -> u64 {
    31
}

const fn default_start_year() -> i32 {
    2025
}

const fn default_deadline_year() -> i32 {
    2025
}

fn default_log_level() -> String {
    "info".to_owned()
}
