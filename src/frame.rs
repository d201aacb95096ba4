use serde::{Deserialize, Serialize};

/// Square occupancy grid handed to a bot every step. Cells are stored
/// row-major; any nonzero cell holds a pallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridFrame {
    size: usize,
    cells: Vec<u8>,
}

impl GridFrame {
    pub fn empty(size: usize) -> Self {
        Self {
            size,
            cells: vec![0; size * size],
        }
    }

    /// Returns `None` when `cells` is not `size * size` long.
    pub fn from_cells(size: usize, cells: Vec<u8>) -> Option<Self> {
        if cells.len() != size * size {
            return None;
        }
        Some(Self { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row * self.size + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.cells[row * self.size + col] = value;
    }

    pub fn is_occupied_at(&self, index: usize) -> bool {
        self.cells[index] != 0
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell != 0).count()
    }

    pub fn has_targets(&self) -> bool {
        self.cells.iter().any(|cell| *cell != 0)
    }
}
