mod roster;

use crate::config::PolicyConfig;
use crate::frame::GridFrame;
use crate::policy::{next_action, ControlVector, ExplorationState, SpatialIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub use roster::{bot_ids, bot_manifest_entries, create_bot, describe_bots};

pub trait PalletBot: Send {
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn reset(&mut self, seed: u32);
    fn next_action(&mut self, frame: &GridFrame) -> ControlVector;
    /// Whether the last action steered toward a random-walk target.
    fn last_action_was_random(&self) -> bool {
        false
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct BotManifestEntry {
    pub id: String,
    pub family: String,
    pub description: String,
    pub config: PolicyConfig,
}

/// Greedy nearest-pallet bot with random-walk escapes.
pub struct ClosestBot {
    id: &'static str,
    description: &'static str,
    config: PolicyConfig,
    index: Arc<SpatialIndex>,
    state: ExplorationState,
    last_random: bool,
    rng: StdRng,
}

impl ClosestBot {
    pub fn new(
        id: &'static str,
        description: &'static str,
        config: PolicyConfig,
        index: Arc<SpatialIndex>,
    ) -> Self {
        debug_assert_eq!(index.size(), config.state_size);
        Self {
            id,
            description,
            config,
            index,
            state: ExplorationState::default(),
            last_random: false,
            rng: StdRng::seed_from_u64(0),
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn exploration(&self) -> ExplorationState {
        self.state
    }
}

impl PalletBot for ClosestBot {
    fn id(&self) -> &'static str {
        self.id
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn reset(&mut self, seed: u32) {
        let hash = self
            .id
            .bytes()
            .fold(0u32, |acc, b| acc.rotate_left(5) ^ (b as u32));
        let mixed = u64::from(seed ^ hash ^ 0xBADC_0DED);
        self.rng = StdRng::seed_from_u64(mixed);
        self.state = ExplorationState::default();
        self.last_random = false;
    }

    fn next_action(&mut self, frame: &GridFrame) -> ControlVector {
        let (action, next) =
            next_action(frame, self.state, &self.index, &self.config, &mut self.rng);
        // Greedy steps hand the state back untouched.
        self.last_random = self.state.is_exploring || next != self.state;
        self.state = next;
        action
    }

    fn last_action_was_random(&self) -> bool {
        self.last_random
    }
}

/// Spatial indexes keyed by grid size, built on first use.
pub fn shared_index(size: usize) -> Arc<SpatialIndex> {
    static CACHE: Mutex<Option<HashMap<usize, Arc<SpatialIndex>>>> = Mutex::new(None);

    let mut guard = match CACHE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    guard
        .get_or_insert_with(HashMap::new)
        .entry(size)
        .or_insert_with(|| Arc::new(SpatialIndex::new(size)))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_index_is_reused_per_size() {
        let a = shared_index(12);
        let b = shared_index(12);
        let c = shared_index(13);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(c.len(), 169);
    }

    #[test]
    fn reset_makes_runs_reproducible() {
        let config = PolicyConfig {
            state_size: 10,
            p_random: 0.5,
            length_random: 3,
        };
        let mut bot = ClosestBot::new("test-bot", "", config, shared_index(10));
        let mut frame = GridFrame::empty(10);
        frame.set(1, 8, 1);

        bot.reset(0x1234);
        let first: Vec<ControlVector> = (0..40).map(|_| bot.next_action(&frame)).collect();
        bot.reset(0x1234);
        let second: Vec<ControlVector> = (0..40).map(|_| bot.next_action(&frame)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn random_walk_steps_are_flagged() {
        let config = PolicyConfig {
            state_size: 6,
            p_random: 0.0,
            length_random: 3,
        };
        let mut bot = ClosestBot::new("walker", "", config, shared_index(6));
        bot.reset(1);

        let empty = GridFrame::empty(6);
        let mut with_pallet = GridFrame::empty(6);
        with_pallet.set(0, 0, 1);

        let first = bot.next_action(&empty);
        assert!(bot.last_action_was_random());
        for _ in 0..2 {
            assert_eq!(bot.next_action(&with_pallet), first);
            assert!(bot.last_action_was_random());
        }
        assert!(!bot.exploration().is_exploring);

        bot.next_action(&with_pallet);
        assert!(!bot.last_action_was_random());
    }
}
