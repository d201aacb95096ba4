use super::{SpatialIndex, Target};
use crate::config::PolicyConfig;
use crate::frame::GridFrame;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Random-walk bookkeeping owned by a single agent for one game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplorationState {
    pub is_exploring: bool,
    pub target: Option<Target>,
    pub remaining_steps: u32,
}

impl ExplorationState {
    fn start<R: Rng + ?Sized>(size: usize, length: u32, rng: &mut R) -> (Target, Self) {
        let high = size.saturating_sub(1) as f64;
        let target = Target {
            row: rng.gen_range(0.0..=high),
            col: rng.gen_range(0.0..=high),
        };
        let remaining_steps = length.saturating_sub(1);
        let state = Self {
            is_exploring: remaining_steps > 0,
            target: Some(target),
            remaining_steps,
        };
        (target, state)
    }
}

/// Picks this step's target and returns the agent's next exploration state.
///
/// An in-progress random walk keeps its target until its countdown runs out.
/// Otherwise a new walk starts with probability `p_random`, or whenever the
/// frame is empty; failing both, the pallet nearest the view center wins.
pub fn decide_target<R: Rng + ?Sized>(
    frame: &GridFrame,
    state: ExplorationState,
    index: &SpatialIndex,
    config: &PolicyConfig,
    rng: &mut R,
) -> (Target, ExplorationState) {
    if state.is_exploring {
        if let Some(target) = state.target {
            let remaining_steps = state.remaining_steps.saturating_sub(1);
            let next = ExplorationState {
                is_exploring: remaining_steps > 0,
                target: Some(target),
                remaining_steps,
            };
            return (target, next);
        }
    }

    let coin_flip = rng.gen_bool(config.p_random);
    if !coin_flip {
        if let Some(cell) = index.nearest_occupied(frame) {
            return (cell.into(), state);
        }
    }

    ExplorationState::start(config.state_size, config.length_random, rng)
}
