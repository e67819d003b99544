//! Tank Maze - Development Tools

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use maze_core::config::{EngineConfig, MazeSettings};
use maze_core::generator::GeneratorConfig;
use maze_core::maze::Maze;
use maze_tools::error::Result;
use maze_tools::generate::OutputFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "maze-tools")]
#[command(about = "Development tools for Tank Maze")]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// RON engine configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Generator overrides applied on top of the configuration file.
#[derive(Args)]
struct GeneratorArgs {
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    #[arg(long)]
    enemies: Option<u32>,
    #[arg(long)]
    ratio: Option<f32>,
    #[arg(long)]
    multiplayer: bool,
}

impl GeneratorArgs {
    fn apply(&self, mut config: GeneratorConfig) -> GeneratorConfig {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(enemies) = self.enemies {
            config.enemy_count = enemies;
        }
        if let Some(ratio) = self.ratio {
            config.destructible_ratio = ratio;
        }
        config.multiplayer |= self.multiplayer;
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a maze
    Generate {
        #[command(flatten)]
        generator: GeneratorArgs,
        /// Seed (random if omitted)
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate maze files
    Validate {
        /// Maze text files
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Inspect the route between two cells of a maze file
    Path {
        /// Maze text file
        maze: PathBuf,
        /// Origin cell as col,row
        #[arg(long)]
        from: String,
        /// Target cell as col,row
        #[arg(long)]
        to: String,
        /// Step cost of a destructible wall
        #[arg(long, default_value = "3")]
        destructible_cost: u32,
    },
    /// Generate and validate many seeds in parallel
    Batch {
        #[command(flatten)]
        generator: GeneratorArgs,
        #[arg(long, default_value = "0")]
        first_seed: u64,
        #[arg(long, default_value = "100")]
        count: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(2);
        }
    }
}

/// Returns `Ok(false)` when the command ran but found problems.
fn run(cli: Cli) -> Result<bool> {
    let engine = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Generate {
            generator,
            seed,
            format,
            output,
        } => {
            let mut config = generator.apply(engine.generator);
            if seed.is_some() {
                config.seed = seed;
            }
            let generated = maze_tools::generate::generate(&config)?;
            let rendered = maze_tools::generate::render(&generated, &config, format)?;
            maze_tools::generate::write_output(output.as_deref(), &rendered)?;
            Ok(true)
        }
        Commands::Validate { paths } => {
            let mut all_valid = true;
            for path in &paths {
                let report = maze_tools::validate::validate_file(path, engine.maze)?;
                if report.is_valid() {
                    tracing::info!("{}: ok", path.display());
                } else {
                    all_valid = false;
                    for issue in &report.issues {
                        tracing::warn!("{}: {issue}", path.display());
                    }
                }
                println!("{}", serde_json::to_string(&report)?);
            }
            Ok(all_valid)
        }
        Commands::Path {
            maze,
            from,
            to,
            destructible_cost,
        } => {
            let text = std::fs::read_to_string(&maze).map_err(|e| {
                maze_tools::error::ToolError::Io {
                    path: maze.display().to_string(),
                    source: e,
                }
            })?;
            let loaded = Maze::from_text(&text, engine.maze)?;
            let report = maze_tools::query::inspect_route(
                &loaded,
                maze_tools::query::parse_cell(&from)?,
                maze_tools::query::parse_cell(&to)?,
                maze_tools::query::parse_cost(destructible_cost)?,
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(!report.route.is_empty())
        }
        Commands::Batch {
            generator,
            first_seed,
            count,
        } => {
            let config = generator.apply(engine.generator);
            let settings: MazeSettings = engine.maze;
            let summary = maze_tools::batch::run_batch(&config, settings, first_seed, count)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(summary.all_valid())
        }
    }
}
