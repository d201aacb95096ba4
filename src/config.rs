use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_STATE_SIZE: usize = 64;
pub const DEFAULT_P_RANDOM: f64 = 0.01;
pub const DEFAULT_LENGTH_RANDOM: u32 = 10;

/// Fixed parameters of a closest-pallet policy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Side of the square view the engine hands the policy.
    pub state_size: usize,
    /// Chance per greedy step of breaking off into a random walk.
    pub p_random: f64,
    /// Steps a random walk keeps the same target.
    pub length_random: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            state_size: DEFAULT_STATE_SIZE,
            p_random: DEFAULT_P_RANDOM,
            length_random: DEFAULT_LENGTH_RANDOM,
        }
    }
}

impl PolicyConfig {
    /// Defaults overlaid with `PALLET_STATE_SIZE`, `PALLET_P_RANDOM` and
    /// `PALLET_LENGTH_RANDOM`. Unparsable values are ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            state_size: read_env_usize("PALLET_STATE_SIZE", defaults.state_size),
            p_random: read_env_f64("PALLET_P_RANDOM", defaults.p_random),
            length_random: read_env_u32("PALLET_LENGTH_RANDOM", defaults.length_random),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.state_size == 0 {
            return Err(anyhow!("state_size must be > 0"));
        }
        if !self.p_random.is_finite() || !(0.0..=1.0).contains(&self.p_random) {
            return Err(anyhow!(
                "p_random must be within [0, 1], got {}",
                self.p_random
            ));
        }
        if self.length_random == 0 {
            return Err(anyhow!("length_random must be >= 1"));
        }
        Ok(())
    }
}

pub(crate) fn read_env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

pub(crate) fn read_env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

pub(crate) fn read_env_f64(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = PolicyConfig::default();
        assert_eq!(cfg.state_size, 64);
        assert_eq!(cfg.p_random, 0.01);
        assert_eq!(cfg.length_random, 10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_contract_values() {
        let base = PolicyConfig::default();
        assert!(PolicyConfig { state_size: 0, ..base }.validate().is_err());
        assert!(PolicyConfig { p_random: 1.5, ..base }.validate().is_err());
        assert!(PolicyConfig { p_random: -0.1, ..base }.validate().is_err());
        assert!(PolicyConfig { p_random: f64::NAN, ..base }.validate().is_err());
        assert!(PolicyConfig { length_random: 0, ..base }.validate().is_err());
        assert!(PolicyConfig { p_random: 1.0, ..base }.validate().is_ok());
    }

    #[test]
    fn env_reader_falls_back_on_garbage() {
        let name = "PALLET_TEST_ONLY_GARBAGE_VALUE";
        env::set_var(name, "not-a-number");
        assert_eq!(read_env_usize(name, 12), 12);
        assert_eq!(read_env_f64(name, 0.5), 0.5);
        env::set_var(name, " 0.25 ");
        assert_eq!(read_env_f64(name, 0.5), 0.25);
        env::remove_var(name);
        assert_eq!(read_env_u32(name, 3), 3);
    }
}
