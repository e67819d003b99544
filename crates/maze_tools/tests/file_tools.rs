//! File-based tool tests: write mazes to disk, read them back.

use maze_core::config::MazeSettings;
use maze_core::generator::GeneratorConfig;
use maze_tools::error::ToolError;
use maze_tools::generate::{generate, render, write_output, OutputFormat};
use maze_tools::validate::validate_file;
use maze_test_utils::fixtures::{walled_room, BLOCKED_CORRIDOR};
use tempfile::TempDir;

#[test]
fn test_generated_file_validates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("maze.txt");

    let config = GeneratorConfig::default()
        .with_size(31, 21)
        .with_seed(5)
        .with_multiplayer(true);
    let generated = generate(&config).unwrap();
    let text = render(&generated, &config, OutputFormat::Text).unwrap();
    write_output(Some(&path), &text).unwrap();

    let report = validate_file(&path, MazeSettings::default()).unwrap();
    assert!(report.is_valid(), "{:?}", report.issues);
    assert_eq!(report.rows, 21);
    assert_eq!(report.cols, 31);
    assert_eq!(report.spawns, 2);
    assert!(report.closed_border);
}

#[test]
fn test_hand_written_file_validates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("corridor.txt");
    std::fs::write(&path, BLOCKED_CORRIDOR.join("\n")).unwrap();

    let report = validate_file(&path, MazeSettings::default()).unwrap();
    // The only route runs through a destructible wall.
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.destructible_walls, 1);
}

#[test]
fn test_room_without_markers_is_invalid() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("room.txt");
    std::fs::write(&path, walled_room(4, 3).join("\n")).unwrap();

    let report = validate_file(&path, MazeSettings::default()).unwrap();
    assert!(!report.has_start);
    assert!(!report.has_exit);
    assert!(!report.is_valid());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = validate_file(&dir.path().join("absent.txt"), MazeSettings::default()).unwrap_err();
    assert!(matches!(err, ToolError::Io { .. }));
}

#[test]
fn test_empty_file_is_engine_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.txt");
    std::fs::write(&path, "").unwrap();
    let err = validate_file(&path, MazeSettings::default()).unwrap_err();
    assert!(matches!(err, ToolError::Maze(_)));
}
