//! Maze generation to text or JSON.

use std::io::Write;
use std::path::Path;

use clap::ValueEnum;
use maze_core::generator::{GeneratedMaze, GeneratorConfig, MazeGenerator};
use serde::Serialize;

use crate::error::{Result, ToolError};

/// How generated mazes are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// The textual maze format, one row per line.
    #[default]
    Text,
    /// JSON object with rows and named points.
    Json,
}

/// JSON form of a generated maze.
#[derive(Debug, Serialize)]
struct GeneratedJson<'a> {
    seed: Option<u64>,
    width: usize,
    height: usize,
    #[serde(flatten)]
    maze: &'a GeneratedMaze,
}

/// Generate one maze from `config`.
pub fn generate(config: &GeneratorConfig) -> Result<GeneratedMaze> {
    let mut generator = MazeGenerator::new(config.clone())?;
    let generated = generator.generate();
    tracing::info!(
        rows = generated.rows.len(),
        multiplayer = config.multiplayer,
        "Generated maze"
    );
    Ok(generated)
}

/// Render a generated maze in the requested format.
pub fn render(
    generated: &GeneratedMaze,
    config: &GeneratorConfig,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(generated.to_text()),
        OutputFormat::Json => {
            let json = GeneratedJson {
                seed: config.seed,
                width: generated.rows.first().map_or(0, String::len),
                height: generated.rows.len(),
                maze: generated,
            };
            Ok(serde_json::to_string_pretty(&json)?)
        }
    }
}

/// Write `content` to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, format!("{content}\n")).map_err(|e| ToolError::io(path, e))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{content}").map_err(|e| ToolError::io(Path::new("<stdout>"), e))?;
        }
    }
    Ok(())
}
