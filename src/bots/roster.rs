use super::*;
use crate::config::DEFAULT_LENGTH_RANDOM;

#[derive(Clone, Copy, Debug)]
struct ClosestPreset {
    id: &'static str,
    description: &'static str,
    /// `None` reads the value from the environment.
    p_random: Option<f64>,
    length_random: Option<u32>,
}

fn closest_presets() -> &'static [ClosestPreset] {
    &[
        ClosestPreset {
            id: "closest",
            description: "Baseline: nearest pallet, 1% chance of a 10-step random walk.",
            p_random: None,
            length_random: None,
        },
        ClosestPreset {
            id: "closest-greedy",
            description: "Never wanders on its own; walks only when no pallet is visible.",
            p_random: Some(0.0),
            length_random: Some(DEFAULT_LENGTH_RANDOM),
        },
        ClosestPreset {
            id: "closest-wanderer",
            description: "Breaks off into short random walks five times as often.",
            p_random: Some(0.05),
            length_random: Some(DEFAULT_LENGTH_RANDOM),
        },
        ClosestPreset {
            id: "closest-long-walk",
            description: "Rare but long random walks for sparse worlds.",
            p_random: Some(0.01),
            length_random: Some(30),
        },
    ]
}

fn find_preset(id: &str) -> Option<&'static ClosestPreset> {
    closest_presets().iter().find(|preset| preset.id == id)
}

impl ClosestPreset {
    fn policy_config(&self, state_size: usize) -> PolicyConfig {
        let env = PolicyConfig::from_env();
        let config = PolicyConfig {
            state_size,
            p_random: self.p_random.unwrap_or(env.p_random),
            length_random: self.length_random.unwrap_or(env.length_random),
        };
        if let Err(err) = config.validate() {
            tracing::warn!(bot = self.id, "{err:#}. Falling back to defaults.");
            return PolicyConfig {
                state_size,
                ..PolicyConfig::default()
            };
        }
        config
    }
}

pub fn bot_ids() -> Vec<&'static str> {
    closest_presets().iter().map(|preset| preset.id).collect()
}

pub fn describe_bots() -> Vec<(&'static str, &'static str)> {
    closest_presets()
        .iter()
        .map(|preset| (preset.id, preset.description))
        .collect()
}

/// Instantiates a roster bot for views of `state_size` cells. `None` for an
/// unknown id.
pub fn create_bot(id: &str, state_size: usize) -> Option<Box<dyn PalletBot>> {
    let preset = find_preset(id)?;
    Some(Box::new(ClosestBot::new(
        preset.id,
        preset.description,
        preset.policy_config(state_size),
        shared_index(state_size),
    )))
}

pub fn bot_manifest_entries(state_size: usize) -> Vec<BotManifestEntry> {
    closest_presets()
        .iter()
        .map(|preset| BotManifestEntry {
            id: preset.id.to_string(),
            family: "closest".to_string(),
            description: preset.description.to_string(),
            config: preset.policy_config(state_size),
        })
        .collect()
}
