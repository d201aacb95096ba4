use crate::bots::{create_bot, PalletBot};
use crate::game::{GameConfig, GameEngine, PalletGame};
use crate::policy::ControlVector;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_MAX_STEPS: u32 = 200;

#[derive(Clone, Copy, Debug)]
pub struct RunConfig {
    pub game: GameConfig,
    pub max_steps: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RunMetrics {
    pub bot_id: String,
    pub seed: u32,
    pub max_steps: u32,
    /// Steps played; equals `max_steps` unless every pallet was collected.
    pub termination_step: u32,
    pub total_reward: f64,
    pub initial_pallets: usize,
    pub remaining_pallets: usize,
    pub collected_pallets: usize,
    pub completed: bool,
    pub exploring_steps: u32,
    pub greedy_steps: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunArtifact {
    pub metrics: RunMetrics,
    pub actions: Vec<ControlVector>,
}

pub fn run_bot(bot_id: &str, seed: u32, config: &RunConfig) -> Result<RunArtifact> {
    let mut bot = create_bot(bot_id, config.game.state_size)
        .ok_or_else(|| anyhow!("unknown bot '{bot_id}'"))?;
    run_bot_instance(bot.as_mut(), seed, config)
}

pub fn run_bot_instance(
    bot: &mut dyn PalletBot,
    seed: u32,
    config: &RunConfig,
) -> Result<RunArtifact> {
    if config.max_steps == 0 {
        return Err(anyhow!("max_steps must be > 0"));
    }
    config.game.validate().context("invalid game config")?;

    bot.reset(seed);
    let mut game = PalletGame::new(config.game, seed);
    let initial_pallets = game.remaining_pallets();

    let mut actions = Vec::with_capacity(config.max_steps as usize);
    let mut total_reward = 0.0;
    let mut exploring_steps = 0u32;

    while (actions.len() as u32) < config.max_steps && !game.is_terminal() {
        let frame = game.frame();
        let action = bot.next_action(&frame);
        if bot.last_action_was_random() {
            exploring_steps += 1;
        }
        let outcome = game.step(action);
        total_reward += outcome.reward;
        actions.push(action);
    }

    let termination_step = actions.len() as u32;
    let remaining_pallets = game.remaining_pallets();
    let completed = game.is_terminal();

    tracing::debug!(
        bot = bot.id(),
        seed = %format!("{seed:#010x}"),
        steps = termination_step,
        reward = total_reward,
        remaining = remaining_pallets,
        completed,
        "game finished"
    );

    Ok(RunArtifact {
        metrics: RunMetrics {
            bot_id: bot.id().to_string(),
            seed,
            max_steps: config.max_steps,
            termination_step,
            total_reward,
            initial_pallets,
            remaining_pallets,
            collected_pallets: initial_pallets - remaining_pallets,
            completed,
            exploring_steps,
            greedy_steps: termination_step - exploring_steps,
        },
        actions,
    })
}

pub fn write_trajectory(path: &Path, artifact: &RunArtifact) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    let encoded =
        serde_json::to_vec_pretty(artifact).context("failed to serialize trajectory")?;
    fs::write(path, encoded).with_context(|| format!("failed writing {}", path.display()))
}
