use pallet_autopilot::config::PolicyConfig;
use pallet_autopilot::frame::GridFrame;
use pallet_autopilot::policy::{
    decide_target, next_action, project, ExplorationState, GridCell, SpatialIndex, Target,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const EPS: f64 = 1e-12;

fn greedy(state_size: usize) -> PolicyConfig {
    PolicyConfig {
        state_size,
        p_random: 0.0,
        length_random: 10,
    }
}

#[test]
fn index_minimum_sits_next_to_the_geometric_center() {
    for size in 1..=9usize {
        let index = SpatialIndex::new(size);
        assert_eq!(index.len(), size * size);

        let center = SpatialIndex::center_of(size);
        let min = index
            .distances()
            .iter()
            .cloned()
            .fold(f64::INFINITY, f64::min);
        for i in 0..index.len() {
            let cell = index.cell(i);
            let dr = cell.row as f64 - center;
            let dc = cell.col as f64 - center;
            assert!((index.distance(i) - (dr * dr + dc * dc).sqrt()).abs() < EPS);
            if (index.distance(i) - min).abs() < EPS {
                assert!(dr.abs() <= 0.5 && dc.abs() <= 0.5, "size={size} cell={cell:?}");
            }
        }
    }
}

#[test]
fn single_pallet_on_a_five_grid_is_always_chosen() {
    let config = greedy(5);
    let index = SpatialIndex::new(5);
    let mut rng = StdRng::seed_from_u64(0x5EED);
    for row in 0..5 {
        for col in 0..5 {
            let mut frame = GridFrame::empty(5);
            frame.set(row, col, 1);
            let (target, state) =
                decide_target(&frame, ExplorationState::default(), &index, &config, &mut rng);
            assert_eq!(target, Target::from(GridCell { row, col }));
            assert!(!state.is_exploring);
        }
    }
}

#[test]
fn any_nonzero_cell_counts_as_a_pallet() {
    let config = greedy(5);
    let index = SpatialIndex::new(5);
    let mut frame = GridFrame::empty(5);
    frame.set(0, 4, 255);
    let mut rng = StdRng::seed_from_u64(1);
    let (target, _) =
        decide_target(&frame, ExplorationState::default(), &index, &config, &mut rng);
    assert_eq!(target, Target { row: 0.0, col: 4.0 });
}

#[test]
fn empty_frame_never_panics_and_starts_a_walk() {
    for size in [1usize, 2, 5, 64] {
        let config = greedy(size);
        let index = SpatialIndex::new(size);
        let frame = GridFrame::empty(size);
        let mut rng = StdRng::seed_from_u64(size as u64);
        let (target, state) =
            decide_target(&frame, ExplorationState::default(), &index, &config, &mut rng);
        let high = (size - 1) as f64;
        assert!((0.0..=high).contains(&target.row), "size={size}");
        assert!((0.0..=high).contains(&target.col), "size={size}");
        assert!(state.is_exploring);
        assert_eq!(state.target, Some(target));
    }
}

#[test]
fn walk_length_matches_config_across_lengths() {
    for length in [2u32, 5, 10, 25] {
        let config = PolicyConfig {
            state_size: 9,
            p_random: 0.0,
            length_random: length,
        };
        let index = SpatialIndex::new(9);
        let empty = GridFrame::empty(9);
        let mut busy = GridFrame::empty(9);
        busy.set(4, 7, 1);
        let mut rng = StdRng::seed_from_u64(u64::from(length));

        let (first, mut state) =
            decide_target(&empty, ExplorationState::default(), &index, &config, &mut rng);
        let mut calls = 1;
        while state.is_exploring {
            let (target, next) = decide_target(&busy, state, &index, &config, &mut rng);
            assert_eq!(target, first);
            calls += 1;
            state = next;
        }
        assert_eq!(calls, length);

        let (target, _) = decide_target(&busy, state, &index, &config, &mut rng);
        assert_eq!(target, Target { row: 4.0, col: 7.0 });
    }
}

#[test]
fn projection_worked_example() {
    let v = project(3.0, 3.0, 4);
    assert!((v.input_x - 2f64.sqrt() / 2.0).abs() < EPS);
    assert!((v.input_y - 2f64.sqrt() / 2.0).abs() < EPS);
}

#[test]
fn projection_stays_bounded_for_every_cell_and_random_walks() {
    for size in [3usize, 8, 33, 64] {
        let config = PolicyConfig {
            state_size: size,
            p_random: 0.3,
            length_random: 4,
        };
        let index = SpatialIndex::new(size);
        let mut frame = GridFrame::empty(size);
        frame.set(size - 1, 0, 1);
        let mut rng = StdRng::seed_from_u64(77);
        let mut state = ExplorationState::default();
        for _ in 0..300 {
            let (action, next) = next_action(&frame, state, &index, &config, &mut rng);
            assert!((-1.0..=1.0).contains(&action.input_x), "size={size}");
            assert!((-1.0..=1.0).contains(&action.input_y), "size={size}");
            state = next;
        }
    }
}

#[test]
fn greedy_target_is_projected_column_first() {
    let config = greedy(8);
    let index = SpatialIndex::new(8);
    let mut frame = GridFrame::empty(8);
    // Two rows below the view center, one column right.
    frame.set(6, 5, 1);
    let mut rng = StdRng::seed_from_u64(3);
    let (action, _) = next_action(&frame, ExplorationState::default(), &index, &config, &mut rng);
    let expected = project(5.0, 6.0, 8);
    assert_eq!(action, expected);
    assert!(action.input_y > action.input_x);
}
