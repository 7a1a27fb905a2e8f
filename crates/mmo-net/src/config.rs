//! Process configuration: defaults baked in, overridden by a TOML file and
//! then by `MMO_SIM_`-prefixed environment variables, in that order.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

fn default_tick_hz() -> u32 {
    20
}
fn default_grid_cell_size() -> f32 {
    100.0
}
fn default_world_bounds() -> f32 {
    10_000.0
}
fn default_aggro_range() -> f32 {
    30.0
}
fn default_leash_range() -> f32 {
    60.0
}
fn default_cc_dr_window_s() -> f32 {
    18.0
}
fn default_cc_immunity_s() -> f32 {
    2.0
}
fn default_match_k_factor() -> f32 {
    32.0
}
fn default_placement_k_factor() -> f32 {
    64.0
}
fn default_match_countdown_s() -> f32 {
    10.0
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SimConfig {
    pub tick_hz: u32,
    pub grid_cell_size: f32,
    pub world_bounds: f32,
    pub aggro_default: f32,
    pub leash_default: f32,
    pub cc_dr_window_s: f32,
    pub cc_immunity_s: f32,
    pub match_k_factor: f32,
    pub placement_k_factor: f32,
    pub match_countdown_s: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_hz: default_tick_hz(),
            grid_cell_size: default_grid_cell_size(),
            world_bounds: default_world_bounds(),
            aggro_default: default_aggro_range(),
            leash_default: default_leash_range(),
            cc_dr_window_s: default_cc_dr_window_s(),
            cc_immunity_s: default_cc_immunity_s(),
            match_k_factor: default_match_k_factor(),
            placement_k_factor: default_placement_k_factor(),
            match_countdown_s: default_match_countdown_s(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    OutOfRange { field: &'static str, reason: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config file: {e}"),
            ConfigError::Toml(e) => write!(f, "failed to parse config: {e}"),
            ConfigError::OutOfRange { field, reason } => write!(f, "invalid config field `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

const ENV_PREFIX: &str = "MMO_SIM_";

/// Loads `SimConfig` from `path` (if it exists), then applies any
/// `MMO_SIM_*` environment overrides, then validates. Fails process
/// startup on an unknown TOML key, a malformed file, or an out-of-range
/// value (`tick_hz == 0`).
pub fn load_config(path: &Path) -> Result<SimConfig, ConfigError> {
    let mut config = if path.exists() {
        let text = fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&text).map_err(ConfigError::Toml)?
    } else {
        SimConfig::default()
    };

    apply_env_overrides(&mut config);
    validate(&config)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut SimConfig) {
    macro_rules! override_field {
        ($field:ident) => {
            if let Ok(value) = env::var(format!("{ENV_PREFIX}{}", stringify!($field).to_uppercase())) {
                if let Ok(parsed) = value.parse() {
                    config.$field = parsed;
                }
            }
        };
    }
    override_field!(tick_hz);
    override_field!(grid_cell_size);
    override_field!(world_bounds);
    override_field!(aggro_default);
    override_field!(leash_default);
    override_field!(cc_dr_window_s);
    override_field!(cc_immunity_s);
    override_field!(match_k_factor);
    override_field!(placement_k_factor);
    override_field!(match_countdown_s);
}

fn validate(config: &SimConfig) -> Result<(), ConfigError> {
    if config.tick_hz == 0 {
        return Err(ConfigError::OutOfRange { field: "tick_hz", reason: "must be nonzero" });
    }
    if config.grid_cell_size <= 0.0 {
        return Err(ConfigError::OutOfRange { field: "grid_cell_size", reason: "must be positive" });
    }
    if config.world_bounds <= 0.0 {
        return Err(ConfigError::OutOfRange { field: "world_bounds", reason: "must be positive" });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_process_configuration() {
        let config = SimConfig::default();
        assert_eq!(config.tick_hz, 20);
        assert_eq!(config.grid_cell_size, 100.0);
        assert_eq!(config.match_k_factor, 32.0);
        assert_eq!(config.placement_k_factor, 64.0);
    }

    #[test]
    fn zero_tick_hz_fails_validation() {
        let mut config = SimConfig::default();
        config.tick_hz = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn env_override_takes_priority_over_file_default() {
        env::set_var("MMO_SIM_TICK_HZ", "30");
        let mut config = SimConfig::default();
        apply_env_overrides(&mut config);
        assert_eq!(config.tick_hz, 30);
        env::remove_var("MMO_SIM_TICK_HZ");
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let config = load_config(Path::new("/nonexistent/path/for/test.toml")).unwrap();
        assert_eq!(config.tick_hz, 20);
    }
}
