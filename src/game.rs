use crate::frame::GridFrame;
use crate::policy::ControlVector;
use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WORLD_SIZE: usize = 64;
pub const DEFAULT_PALLETS: usize = 20;
pub const DEFAULT_AGENT_SPEED: f64 = 3.0;
pub const DEFAULT_PICKUP_RADIUS: f64 = 1.0;
pub const PALLET_REWARD: f64 = 1.0;

/// What a bot plays against: an agent-centered occupancy view in, a control
/// vector out.
pub trait GameEngine {
    fn frame(&self) -> GridFrame;
    fn step(&mut self, action: ControlVector) -> StepOutcome;
    fn remaining_pallets(&self) -> usize;
    fn is_terminal(&self) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub reward: f64,
    pub is_terminal: bool,
    pub remaining_pallets: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Side of the view handed to the bot.
    pub state_size: usize,
    /// Side of the square world the agent moves in.
    pub world_size: usize,
    pub n_pallets: usize,
    /// Cells moved per step at full control magnitude.
    pub agent_speed: f64,
    pub pickup_radius: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            state_size: crate::config::DEFAULT_STATE_SIZE,
            world_size: DEFAULT_WORLD_SIZE,
            n_pallets: DEFAULT_PALLETS,
            agent_speed: DEFAULT_AGENT_SPEED,
            pickup_radius: DEFAULT_PICKUP_RADIUS,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        if self.state_size == 0 {
            return Err(anyhow!("game state_size must be > 0"));
        }
        if self.world_size == 0 {
            return Err(anyhow!("game world_size must be > 0"));
        }
        if self.n_pallets == 0 {
            return Err(anyhow!("game needs at least one pallet"));
        }
        if !(self.agent_speed.is_finite() && self.agent_speed > 0.0) {
            return Err(anyhow!("agent_speed must be > 0, got {}", self.agent_speed));
        }
        if !(self.pickup_radius.is_finite() && self.pickup_radius > 0.0) {
            return Err(anyhow!(
                "pickup_radius must be > 0, got {}",
                self.pickup_radius
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub row: f64,
    pub col: f64,
}

/// Reference engine: one agent collecting pallets scattered over a bounded
/// square world. Fully determined by its config and seed.
#[derive(Clone, Debug)]
pub struct PalletGame {
    config: GameConfig,
    agent: Position,
    pallets: Vec<Position>,
    step_count: u32,
}

impl PalletGame {
    pub fn new(config: GameConfig, seed: u32) -> Self {
        let mut rng = StdRng::seed_from_u64(u64::from(seed));
        let extent = config.world_size as f64;
        let pallets = (0..config.n_pallets)
            .map(|_| Position {
                row: rng.gen_range(0.0..extent),
                col: rng.gen_range(0.0..extent),
            })
            .collect();

        Self {
            config,
            agent: Position {
                row: extent / 2.0,
                col: extent / 2.0,
            },
            pallets,
            step_count: 0,
        }
    }

    /// Builds a game with hand-placed pallets; mostly for tests.
    pub fn with_layout(config: GameConfig, agent: Position, pallets: Vec<Position>) -> Self {
        Self {
            config,
            agent,
            pallets,
            step_count: 0,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn agent(&self) -> Position {
        self.agent
    }

    pub fn pallets(&self) -> &[Position] {
        &self.pallets
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    fn collect_pallets(&mut self) -> usize {
        let radius_sq = self.config.pickup_radius * self.config.pickup_radius;
        let agent = self.agent;
        let before = self.pallets.len();
        self.pallets.retain(|pallet| {
            let dr = pallet.row - agent.row;
            let dc = pallet.col - agent.col;
            dr * dr + dc * dc > radius_sq
        });
        before - self.pallets.len()
    }
}

impl GameEngine for PalletGame {
    /// A pallet at world offset `(dr, dc)` from the agent lands on view cell
    /// `(round(dr) + N/2, round(dc) + N/2)`, so the agent sits on cell `N/2`.
    fn frame(&self) -> GridFrame {
        let size = self.config.state_size;
        let half = (size / 2) as i64;
        let mut frame = GridFrame::empty(size);
        for pallet in &self.pallets {
            let row = (pallet.row - self.agent.row).round() as i64 + half;
            let col = (pallet.col - self.agent.col).round() as i64 + half;
            if (0..size as i64).contains(&row) && (0..size as i64).contains(&col) {
                frame.set(row as usize, col as usize, 1);
            }
        }
        frame
    }

    fn step(&mut self, action: ControlVector) -> StepOutcome {
        if self.is_terminal() {
            return StepOutcome {
                reward: 0.0,
                is_terminal: true,
                remaining_pallets: 0,
            };
        }

        let action = action.clamped();
        let extent = self.config.world_size as f64;
        let speed = self.config.agent_speed;
        self.agent.col = (self.agent.col + action.input_x * speed).clamp(0.0, extent);
        self.agent.row = (self.agent.row + action.input_y * speed).clamp(0.0, extent);
        self.step_count += 1;

        let collected = self.collect_pallets();
        StepOutcome {
            reward: collected as f64 * PALLET_REWARD,
            is_terminal: self.is_terminal(),
            remaining_pallets: self.pallets.len(),
        }
    }

    fn remaining_pallets(&self) -> usize {
        self.pallets.len()
    }

    fn is_terminal(&self) -> bool {
        self.pallets.is_empty()
    }
}
