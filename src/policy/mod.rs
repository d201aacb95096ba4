//! Nearest-pallet policy with occasional random walks.
//!
//! Each step the policy picks a target point in the agent-centered view, either
//! the visible pallet closest to the view center or the destination of a
//! fixed-length random walk, and turns it into a bounded control vector.

mod exploration;
mod projection;
mod spatial;

pub use exploration::{decide_target, ExplorationState};
pub use projection::{project, ControlVector};
pub use spatial::SpatialIndex;

use crate::config::PolicyConfig;
use crate::frame::GridFrame;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

/// A point in view coordinates. Greedy targets sit on whole cells; random-walk
/// targets can land anywhere in `[0, N-1]` on each axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub row: f64,
    pub col: f64,
}

impl From<GridCell> for Target {
    fn from(cell: GridCell) -> Self {
        Self {
            row: cell.row as f64,
            col: cell.col as f64,
        }
    }
}

impl Target {
    /// Columns drive `input_x` and rows drive `input_y`.
    pub fn to_control(self, size: usize) -> ControlVector {
        project(self.col, self.row, size)
    }
}

/// One full decision: target selection followed by projection.
pub fn next_action<R: Rng + ?Sized>(
    frame: &GridFrame,
    state: ExplorationState,
    index: &SpatialIndex,
    config: &PolicyConfig,
    rng: &mut R,
) -> (ControlVector, ExplorationState) {
    let (target, next) = decide_target(frame, state, index, config, rng);
    (target.to_control(config.state_size), next)
}
