use super::GridCell;
use crate::frame::GridFrame;

/// Distance from every cell of an `N x N` grid to the grid's geometric center
/// `((N-1)/2, (N-1)/2)`, enumerated row-major. Built once per grid size and
/// shared read-only between agents.
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    size: usize,
    cells: Vec<GridCell>,
    distances: Vec<f64>,
}

impl SpatialIndex {
    pub fn new(size: usize) -> Self {
        let center = Self::center_of(size);
        let mut cells = Vec::with_capacity(size * size);
        let mut distances = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                let dr = row as f64 - center;
                let dc = col as f64 - center;
                cells.push(GridCell { row, col });
                distances.push((dr * dr + dc * dc).sqrt());
            }
        }

        Self {
            size,
            cells,
            distances,
        }
    }

    /// Midpoint between cell indices; not a cell itself when `size` is even.
    pub fn center_of(size: usize) -> f64 {
        (size as f64 - 1.0) / 2.0
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, index: usize) -> GridCell {
        self.cells[index]
    }

    pub fn distance(&self, index: usize) -> f64 {
        self.distances[index]
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Occupied cell closest to the center. Exact ties go to the first cell in
    /// row-major order. `None` when the frame holds no pallets.
    pub fn nearest_occupied(&self, frame: &GridFrame) -> Option<GridCell> {
        debug_assert_eq!(frame.size(), self.size);

        let mut best: Option<usize> = None;
        let mut best_distance = f64::INFINITY;
        for (index, distance) in self.distances.iter().enumerate() {
            if !frame.is_occupied_at(index) {
                continue;
            }
            if best.is_none() || *distance < best_distance {
                best = Some(index);
                best_distance = *distance;
            }
        }

        best.map(|index| self.cells[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_one_entry_per_cell_in_row_major_order() {
        for size in [1usize, 2, 5, 8] {
            let index = SpatialIndex::new(size);
            assert_eq!(index.len(), size * size);
            for i in 0..index.len() {
                assert_eq!(index.cell(i), GridCell { row: i / size, col: i % size });
                assert!(index.distance(i) >= 0.0);
            }
        }
    }

    #[test]
    fn odd_grid_has_a_single_zero_distance_cell() {
        let index = SpatialIndex::new(5);
        let zeros: Vec<usize> = (0..index.len())
            .filter(|i| index.distance(*i) == 0.0)
            .collect();
        assert_eq!(zeros, vec![12]);
        assert_eq!(index.cell(12), GridCell { row: 2, col: 2 });
    }

    #[test]
    fn even_grid_minimum_is_shared_by_the_four_middle_cells() {
        let index = SpatialIndex::new(4);
        let min = index.distances().iter().cloned().fold(f64::INFINITY, f64::min);
        assert!((min - 0.5f64.sqrt()).abs() < 1e-12);
        let at_min: Vec<GridCell> = (0..index.len())
            .filter(|i| (index.distance(*i) - min).abs() < 1e-12)
            .map(|i| index.cell(i))
            .collect();
        assert_eq!(
            at_min,
            vec![
                GridCell { row: 1, col: 1 },
                GridCell { row: 1, col: 2 },
                GridCell { row: 2, col: 1 },
                GridCell { row: 2, col: 2 },
            ]
        );
    }

    #[test]
    fn nearest_occupied_breaks_ties_in_row_major_order() {
        let index = SpatialIndex::new(4);
        let mut frame = GridFrame::empty(4);
        frame.set(2, 2, 1);
        frame.set(1, 2, 1);
        frame.set(2, 1, 1);
        assert_eq!(
            index.nearest_occupied(&frame),
            Some(GridCell { row: 1, col: 2 })
        );
    }

    #[test]
    fn nearest_occupied_accepts_the_exact_center_cell() {
        let index = SpatialIndex::new(5);
        let mut frame = GridFrame::empty(5);
        frame.set(2, 2, 1);
        frame.set(0, 0, 1);
        assert_eq!(
            index.nearest_occupied(&frame),
            Some(GridCell { row: 2, col: 2 })
        );
    }

    #[test]
    fn nearest_occupied_is_none_on_empty_frame() {
        let index = SpatialIndex::new(6);
        assert_eq!(index.nearest_occupied(&GridFrame::empty(6)), None);
    }
}
