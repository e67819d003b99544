//! Property tests over generated mazes and destructible walls.

use maze_core::config::MazeSettings;
use maze_core::grid::{CellKind, GridPos};
use maze_core::maze::{Maze, SpawnSlot};
use maze_test_utils::determinism::strategies::{
    arb_damage, arb_generator_config, arb_multiplayer_config, arb_world_point,
};
use maze_test_utils::determinism::verify_generation_determinism;
use maze_test_utils::fixtures::{center, maze_from_rows};
use maze_test_utils::proptest::prelude::*;

fn generate(config: &maze_core::generator::GeneratorConfig) -> Maze {
    Maze::generate(config, MazeSettings::default()).unwrap()
}

proptest! {
    /// Every generated maze connects its start (or both spawns) to the exit.
    #[test]
    fn prop_generated_maze_is_connected(config in arb_generator_config()) {
        let maze = generate(&config);
        let exit = maze.exit().unwrap();

        if config.multiplayer {
            prop_assert!(maze.start().is_none());
            for slot in [SpawnSlot::First, SpawnSlot::Second] {
                let spawn = maze.spawn(slot).unwrap();
                prop_assert!(!maze.find_path(spawn, exit).is_empty());
            }
        } else {
            let start = maze.start().unwrap();
            prop_assert!(!maze.find_path(start, exit).is_empty());
        }
    }

    /// Same seed and parameters give byte-identical text.
    #[test]
    fn prop_generation_is_deterministic(config in arb_generator_config()) {
        let result = verify_generation_determinism(&config, 2);
        prop_assert!(result.is_deterministic);
    }

    /// Generated text reloads to the same text.
    #[test]
    fn prop_generated_text_reloads(config in arb_generator_config()) {
        let maze = generate(&config);
        let reloaded = Maze::from_text(&maze.to_text(), MazeSettings::default()).unwrap();
        prop_assert_eq!(reloaded.to_text(), maze.to_text());
        prop_assert_eq!(reloaded.state_hash(), maze.state_hash());
    }

    /// The exit is never much closer to one spawn than the other.
    #[test]
    fn prop_multiplayer_exit_is_fair(config in arb_multiplayer_config()) {
        let maze = generate(&config);
        let exit = maze.exit_cell().unwrap();
        let first = maze.spawn_cell(SpawnSlot::First).unwrap();
        let second = maze.spawn_cell(SpawnSlot::Second).unwrap();

        let d1 = exit.manhattan(first);
        let d2 = exit.manhattan(second);
        prop_assert!(
            d1.abs_diff(d2) <= 3u32.max(d1.min(d2) / 3),
            "exit {:?} unfair: d1={} d2={}", exit, d1, d2
        );
    }

    /// Positive damage strictly lowers health until the wall is gone.
    #[test]
    fn prop_hits_are_monotone(damages in prop::collection::vec(arb_damage(), 1..20)) {
        let mut maze = maze_from_rows(&["#*#"]);
        let pos = GridPos::new(1, 0);
        let at = center(&maze, 1, 0);

        for damage in damages {
            let before = maze.cell(pos).unwrap().health();
            let was_wall = maze.kind_at(pos) == Some(CellKind::Destructible);
            let hit = maze.resolve_bullet_hit(at, damage);

            prop_assert_eq!(hit.contacted, was_wall);
            if !was_wall {
                continue;
            }
            if hit.destroyed {
                prop_assert_eq!(maze.kind_at(pos), Some(CellKind::Empty));
                prop_assert!(maze.is_walkable(pos));
            } else {
                prop_assert!(maze.cell(pos).unwrap().health() < before);
            }
        }
    }

    /// Hits anywhere other than a destructible wall leave the maze untouched.
    #[test]
    fn prop_non_destructible_hits_change_nothing(
        point in arb_world_point(250),
        damage in arb_damage(),
    ) {
        let mut maze = maze_from_rows(&["#.*.#", ".E.#.", "*.#.*", "#...#", "..*.."]);
        let pos = maze.world_to_grid(point);
        prop_assume!(maze.kind_at(pos) != Some(CellKind::Destructible));

        let before = maze.state_hash();
        let hit = maze.resolve_bullet_hit(point, damage);
        prop_assert!(!hit.destroyed);
        prop_assert_eq!(hit.contacted, maze.kind_at(pos) == Some(CellKind::Solid));
        prop_assert_eq!(maze.state_hash(), before);
    }

    /// Points in the wall's central band collide whatever the rounding.
    #[test]
    fn prop_inside_wall_always_collides(dx in 10i32..40, dy in 2i32..48) {
        let maze = maze_from_rows(&["...", ".#.", "..."]);
        let point = maze_core::math::Vec2Fixed::from_int(50 + dx, 50 + dy);
        prop_assert!(maze.check_collision(point, maze_test_utils::fixtures::fixed(1)));
    }
}
