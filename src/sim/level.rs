/// Layout loader.
///
/// ## Layout format
///
/// One string per maze row. Leading/trailing whitespace on each row is
/// trimmed and blank rows are skipped, so layouts can be written as an
/// indented raw string.
///
/// ## Legend
///   '%' = Wall        '.' = Food        'o' = Capsule
///   'G' = Adversary spawn               'P' = Player spawn
///   anything else = Empty
///
/// A layout with ragged rows, no player, or more than one player is
/// rejected: the game refuses to start.

use thiserror::Error;

use crate::config::GameConfig;
use crate::domain::geometry::Cell;
use crate::domain::grid::{Grid, MapCell};
use crate::sim::world::Maze;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("layout has no rows")]
    Empty,
    #[error("layout row {row} has {found} columns, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
    #[error("layout has no player spawn ('P')")]
    MissingPlayer,
    #[error("layout has more than one player spawn: ({}, {}) and ({}, {})", first.x, first.y, second.x, second.y)]
    DuplicatePlayer { first: Cell, second: Cell },
}

/// A parsed layout: the static grid plus spawn points.
#[derive(Clone, Debug)]
pub struct Layout {
    pub grid: Grid,
    pub player_spawn: Cell,
    /// Row-major order; this is also the adversaries' registration order.
    pub adversary_spawns: Vec<Cell>,
}

pub fn parse_layout<S: AsRef<str>>(raw_rows: &[S]) -> Result<Layout, LayoutError> {
    let rows: Vec<&str> = raw_rows
        .iter()
        .map(|r| r.as_ref().trim())
        .filter(|r| !r.is_empty())
        .collect();

    let width = match rows.first() {
        Some(first) => first.chars().count(),
        None => return Err(LayoutError::Empty),
    };
    for (row, line) in rows.iter().enumerate() {
        let found = line.chars().count();
        if found != width {
            return Err(LayoutError::RaggedRow { row, expected: width, found });
        }
    }

    let mut grid = Grid::new(width, rows.len());
    let mut player_spawn: Option<Cell> = None;
    let mut adversary_spawns = Vec::new();

    for (y, line) in rows.iter().enumerate() {
        for (x, ch) in line.chars().enumerate() {
            let cell = Cell::new(x as i32, y as i32);
            match ch {
                '%' => grid.set(cell, MapCell::Wall),
                '.' => grid.set(cell, MapCell::Food),
                'o' => grid.set(cell, MapCell::Capsule),
                'G' => adversary_spawns.push(cell),
                'P' => {
                    if let Some(first) = player_spawn {
                        return Err(LayoutError::DuplicatePlayer { first, second: cell });
                    }
                    player_spawn = Some(cell);
                }
                _ => {}
            }
        }
    }

    let player_spawn = player_spawn.ok_or(LayoutError::MissingPlayer)?;
    Ok(Layout { grid, player_spawn, adversary_spawns })
}

/// Build the maze for the built-in layout.
pub fn load_level(config: &GameConfig) -> Result<Maze, LayoutError> {
    let layout = parse_layout(BUILTIN_LAYOUT)?;
    tracing::info!(
        width = layout.grid.width(),
        height = layout.grid.height(),
        adversaries = layout.adversary_spawns.len(),
        food = layout.grid.count(MapCell::Food),
        "layout loaded"
    );
    Ok(Maze::from_layout(layout, config))
}

/// The fixed 31 × 15 maze.
pub const BUILTIN_LAYOUT: &[&str] = &[
    "%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%",
    "%.....%.................%.....%",
    "%o%%%.%.%%%.%%%%%%%.%%%.%.%%%o%",
    "%.%.....%......%......%.....%.%",
    "%...%%%.%.%%%%.%.%%%%.%.%%%...%",
    "%%%.%...%.%.........%.%...%.%%%",
    "%...%.%%%.%.%%% %%%.%.%%%.%...%",
    "%.%%%.......%GG GG%.......%%%.%",
    "%...%.%%%.%.%%%%%%%.%.%%%.%...%",
    "%%%.%...%.%.........%.%...%.%%%",
    "%...%%%.%.%%%%.%.%%%%.%.%%%...%",
    "%.%.....%......%......%.....%.%",
    "%o%%%.%.%%%.%%%%%%%.%%%.%.%%%o%",
    "%.....%........P........%.....%",
    "%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_layout_parses() {
        let layout = parse_layout(BUILTIN_LAYOUT).expect("built-in layout is valid");
        assert_eq!(layout.grid.width(), 31);
        assert_eq!(layout.grid.height(), 15);
        assert_eq!(layout.player_spawn, Cell::new(15, 13));
        assert_eq!(layout.adversary_spawns.len(), 4);
        assert_eq!(layout.grid.count(MapCell::Capsule), 4);
        assert!(layout.grid.count(MapCell::Food) > 0);
        // Spawn cells hold nothing.
        assert_eq!(layout.grid.object_at(layout.player_spawn), MapCell::Empty);
    }

    #[test]
    fn rows_are_trimmed_and_blank_rows_skipped() {
        let raw = "\n   %%%%\n   %P.%\n\n   %%%%\n";
        let rows: Vec<&str> = raw.split('\n').collect();
        let layout = parse_layout(&rows).expect("valid");
        assert_eq!(layout.grid.width(), 4);
        assert_eq!(layout.grid.height(), 3);
        assert_eq!(layout.player_spawn, Cell::new(1, 1));
        assert_eq!(layout.grid.object_at(Cell::new(2, 1)), MapCell::Food);
    }

    #[test]
    fn unknown_characters_are_empty() {
        let layout = parse_layout(&["P?x#"]).expect("valid");
        for x in 1..4 {
            assert_eq!(layout.grid.object_at(Cell::new(x, 0)), MapCell::Empty);
        }
    }

    #[test]
    fn empty_layout_is_rejected() {
        let rows: [&str; 2] = ["", "   "];
        assert_eq!(parse_layout(&rows).unwrap_err(), LayoutError::Empty);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = parse_layout(&["%%%%", "%P%", "%%%%"]).unwrap_err();
        assert_eq!(err, LayoutError::RaggedRow { row: 1, expected: 4, found: 3 });
    }

    #[test]
    fn missing_player_is_rejected() {
        assert_eq!(parse_layout(&["%G.%"]).unwrap_err(), LayoutError::MissingPlayer);
    }

    #[test]
    fn duplicate_player_is_rejected() {
        let err = parse_layout(&["P..P"]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::DuplicatePlayer { first: Cell::new(0, 0), second: Cell::new(3, 0) }
        );
        assert!(err.to_string().contains("(0, 0) and (3, 0)"));
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn load_level_logs_the_layout() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let maze = tracing::subscriber::with_default(subscriber, || {
            load_level(&GameConfig::default()).expect("built-in layout loads")
        });
        assert_eq!(maze.adversaries().count(), 4);

        let bytes = captured.0.lock().expect("log buffer").clone();
        let text = String::from_utf8(bytes).expect("utf-8 log");
        assert!(text.contains("layout loaded"));
        assert!(text.contains("width=31"));
    }
}
