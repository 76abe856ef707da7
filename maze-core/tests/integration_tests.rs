// maze-core/tests/integration_tests.rs
use maze_core::{
    generate, CarveEvent, Coord, GeneratedMaze, GenerationSettings, MazeError, MazeGenerator,
    MazeGrid, WalkPhase,
};
use proptest::prelude::*;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

const AMPLE_BUDGET_MS: u64 = 10_000;

fn settings(nrows: usize, ncols: usize, walks: u32, coverage: f64, seed: u64) -> GenerationSettings {
    GenerationSettings::builder()
        .dimensions(nrows, ncols)
        .random_walks(walks)
        .allotted_time_ms(AMPLE_BUDGET_MS)
        .desired_coverage(coverage)
        .seed(seed)
        .build()
        .expect("test settings should be valid")
}

// Runs generation and collects the carve events of the successful attempt.
fn generate_recorded(settings: GenerationSettings) -> (GeneratedMaze, Vec<CarveEvent>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let mut generator = MazeGenerator::new(settings)
        .unwrap()
        .with_carve_callback(Box::new(move |event| sink.lock().unwrap().push(*event)));
    let maze = generator.generate().expect("generation should succeed");
    let attempt = maze.stats.solve_attempts;
    let events = events
        .lock()
        .unwrap()
        .iter()
        .copied()
        .filter(|e| e.attempt == attempt)
        .collect();
    (maze, events)
}

// Open cells reachable from `from` through open cells.
fn reachable_open_cells(grid: &MazeGrid, from: Coord) -> HashSet<Coord> {
    let mut seen = HashSet::from([from]);
    let mut queue = VecDeque::from([from]);
    while let Some(coord) = queue.pop_front() {
        for n in grid.neighbors(coord) {
            if grid.is_open(n) && seen.insert(n) {
                queue.push_back(n);
            }
        }
    }
    seen
}

fn assert_maze_invariants(maze: &GeneratedMaze, events: &[CarveEvent]) {
    let grid = &maze.grid;
    let start = grid.start().expect("maze has a start");
    let finish = grid.finish().expect("maze has a finish");

    // Exactly one of each marker, player on the start.
    assert_ne!(start, finish);
    assert_eq!(grid.cells().iter().filter(|c| c.is_start()).count(), 1);
    assert_eq!(grid.cells().iter().filter(|c| c.is_finish()).count(), 1);
    assert_eq!(grid.player(), Some(start));
    assert!(!grid.is_corner(finish));

    // One connected component containing start and finish.
    let reachable = reachable_open_cells(grid, start);
    assert!(reachable.contains(&finish), "finish unreachable from start");
    assert_eq!(reachable.len(), grid.open_cell_count());

    // Boundary cells stay walls, except the endpoints and cells carved out of a corner start.
    for coord in grid.all_open_cells() {
        if grid.is_edge(coord) && coord != start && coord != finish {
            assert!(
                grid.is_corner(start) && grid.neighbors(start).any(|n| n == coord),
                "{coord} is an open edge cell"
            );
        }
    }

    // Replay the carve order: every cell is carved once, and only touches the
    // cell it was carved from unless it borders the finish.
    let mut replay = MazeGrid::new(grid.nrows(), grid.ncols()).unwrap();
    replay.carve(start).unwrap();
    replay.set_start(start).unwrap();
    replay.carve(finish).unwrap();
    replay.set_finish(finish).unwrap();
    for event in events {
        assert!(replay.cell_at(event.coord.x, event.coord.y).unwrap().is_wall());
        if !replay.is_adjacent_to_finish(event.coord) {
            let open_neighbors = replay
                .neighbors(event.coord)
                .filter(|&n| replay.is_open(n))
                .count();
            assert_eq!(open_neighbors, 1, "{} merged two paths", event.coord);
        }
        replay.carve(event.coord).unwrap();
    }
    assert_eq!(replay.all_open_cells(), grid.all_open_cells());
}

#[test]
fn test_small_maze_scenario() {
    let (maze, events) = generate_recorded(settings(10, 10, 5, 1.0, 42));
    assert_maze_invariants(&maze, &events);
    assert!(maze.stats.enrichment_walks <= 5);
}

#[test]
fn test_zero_budget_never_panics() {
    let settings = GenerationSettings::builder()
        .dimensions(10, 10)
        .allotted_time_ms(0)
        .max_solve_attempts(2)
        .build()
        .unwrap();
    assert_eq!(
        generate(&settings).unwrap_err(),
        MazeError::GenerationFailed { attempts: 2 }
    );
}

#[test]
fn test_no_walks_no_coverage() {
    let (maze, events) = generate_recorded(settings(12, 12, 0, 0.0, 3));
    assert_eq!(maze.stats.enrichment_walks, 0);
    assert!(events.iter().all(|e| e.phase == WalkPhase::Solve));
    assert_maze_invariants(&maze, &events);
}

#[test]
fn test_same_seed_same_maze() {
    let first = generate(&settings(15, 20, 20, 0.6, 777)).unwrap();
    let second = generate(&settings(15, 20, 20, 0.6, 777)).unwrap();
    assert_eq!(first.grid, second.grid);
    assert_eq!(first.stats.enrichment_walks, second.stats.enrichment_walks);
}

#[test]
fn test_coverage_stops_enrichment_early() {
    let maze = generate(&settings(20, 20, 500, 0.2, 9)).unwrap();
    assert!(maze.stats.coverage >= 0.2);
    assert!(maze.stats.enrichment_walks < 500);
}

#[test]
fn test_non_square_grid() {
    let (maze, events) = generate_recorded(settings(10, 40, 30, 0.5, 2024));
    assert_eq!(maze.grid.ncols(), 40);
    assert_eq!(maze.grid.nrows(), 10);
    assert_maze_invariants(&maze, &events);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_generated_mazes_hold_invariants(
        seed in any::<u64>(),
        nrows in 10usize..24,
        ncols in 10usize..24,
        walks in 0u32..40,
        coverage in 0.0f64..=1.0,
    ) {
        let (maze, events) = generate_recorded(settings(nrows, ncols, walks, coverage, seed));
        assert_maze_invariants(&maze, &events);
        prop_assert!(maze.stats.enrichment_walks <= walks);
        prop_assert!(
            maze.stats.enrichment_walks == walks || maze.stats.coverage >= coverage,
            "enrichment stopped early below the coverage target"
        );
    }
}
