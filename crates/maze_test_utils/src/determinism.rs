//! Determinism testing utilities.
//!
//! Provides a harness for verifying that generation and destruction
//! produce identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! A multiplayer host generates a maze once and sends its text to the
//! peer; both sides then apply the same bullet hits. Sources of divergence
//! include:
//!
//! - **Floating-point math**: Geometry uses [`maze_core::math::Fixed`].
//!
//! - **Unseeded randomness**: Generation draws from an owned, seeded
//!   ChaCha stream. Same seed, same maze.
//!
//! - **Iteration order**: Cell scans are row-major; A* breaks ties on
//!   coordinates.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual operations (carving, hits, searches)
//! 2. **Property tests**: Random configs must still produce identical output
//! 3. **Parallel tests**: Generating N mazes on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use maze_core::generator::{GeneratorConfig, MazeGenerator};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps applied per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic runs).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Maze state is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a scenario multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the scenario
/// * `steps` - Number of steps to apply per run
/// * `setup` - Function to create initial state
/// * `step` - Function applying step `n` to the state
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```ignore
/// use maze_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(
///     3,
///     20,
///     || Maze::generate(&config, MazeSettings::default()).unwrap(),
///     |maze, n| { let _ = maze.resolve_bullet_hit(target(n), damage); },
///     Maze::state_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, u64),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for n in 0..steps {
            step(&mut state, n);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Generate the same configuration `runs` times and compare the text.
///
/// # Panics
///
/// Panics if the configuration is invalid.
#[must_use]
pub fn verify_generation_determinism(config: &GeneratorConfig, runs: usize) -> DeterminismResult {
    verify_determinism(
        runs,
        0,
        || generate_text(config),
        |_, _| {},
        compute_hash,
    )
}

/// Generate the same configuration on `num_threads` threads at once.
///
/// This catches divergence that only shows up under scheduling or memory
/// layout differences.
///
/// # Panics
///
/// Panics if the configuration is invalid or a thread panics.
#[must_use]
pub fn run_parallel_generations(config: &GeneratorConfig, num_threads: usize) -> DeterminismResult {
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_threads)
            .map(|_| s.spawn(|| compute_hash(&generate_text(config))))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("generation thread panicked"))
            .collect()
    });

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
        steps: 0,
    }
}

/// Compare two runs step by step, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs stay identical, `Some(step)` if they diverge after
/// that many steps (0 meaning the initial states already differ).
pub fn find_first_divergence<S, Setup, Step, HashFn>(
    setup: Setup,
    steps: u64,
    step: Step,
    hash: HashFn,
) -> Option<u64>
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, u64),
    HashFn: Fn(&S) -> u64,
{
    let mut a = setup();
    let mut b = setup();

    if hash(&a) != hash(&b) {
        return Some(0);
    }

    for n in 0..steps {
        step(&mut a, n);
        step(&mut b, n);

        if hash(&a) != hash(&b) {
            return Some(n + 1);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn generate_text(config: &GeneratorConfig) -> String {
    match MazeGenerator::new(config.clone()) {
        Ok(mut generator) => generator.generate().to_text(),
        Err(e) => panic!("invalid generator config {config:?}: {e}"),
    }
}

/// Proptest strategies for maze testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing.
pub mod strategies {
    use maze_core::generator::GeneratorConfig;
    use maze_core::math::{Fixed, Vec2Fixed};
    use proptest::prelude::*;

    /// Generate a maze dimension, odd or even.
    ///
    /// Range: 5 to 41 cells
    pub fn arb_dimension() -> impl Strategy<Value = u32> {
        5u32..=41
    }

    /// Generate a destructible wall ratio in steps of 0.05.
    pub fn arb_ratio() -> impl Strategy<Value = f32> {
        (0u32..=20).prop_map(|n| n as f32 / 20.0)
    }

    /// Generate a seeded generator configuration.
    pub fn arb_generator_config() -> impl Strategy<Value = GeneratorConfig> {
        (
            arb_dimension(),
            arb_dimension(),
            any::<u64>(),
            0u32..12,
            arb_ratio(),
            any::<bool>(),
        )
            .prop_map(|(width, height, seed, enemies, ratio, multiplayer)| {
                GeneratorConfig::default()
                    .with_size(width, height)
                    .with_seed(seed)
                    .with_enemy_count(enemies)
                    .with_destructible_ratio(ratio)
                    .with_multiplayer(multiplayer)
            })
    }

    /// Generate a seeded multiplayer configuration large enough for a
    /// central spawn region.
    pub fn arb_multiplayer_config() -> impl Strategy<Value = GeneratorConfig> {
        (13u32..=41, 13u32..=41, any::<u64>(), arb_ratio()).prop_map(
            |(width, height, seed, ratio)| {
                GeneratorConfig::default()
                    .with_size(width, height)
                    .with_seed(seed)
                    .with_destructible_ratio(ratio)
                    .with_multiplayer(true)
            },
        )
    }

    /// Generate positive bullet damage.
    ///
    /// Range: 1 to 150
    pub fn arb_damage() -> impl Strategy<Value = Fixed> {
        (1i32..=150).prop_map(Fixed::from_num)
    }

    /// Generate a world point, possibly outside the maze.
    ///
    /// Range: -100 to `extent + 100` on each axis
    pub fn arb_world_point(extent: i32) -> impl Strategy<Value = Vec2Fixed> {
        (-100..extent + 100, -100..extent + 100).prop_map(|(x, y)| Vec2Fixed::from_int(x, y))
    }
}
