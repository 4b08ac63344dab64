/// Player control rules. Pure functions with no maze side effects.
///
/// ## Key priority
///
/// ┌──────────┬────────────────────────────┐
/// │ Priority │ Key held → Intent           │
/// ├──────────┼────────────────────────────┤
/// │ 1        │ Left  → Move(Left)          │
/// │ 2        │ Right → Move(Right)         │
/// │ 3        │ Up    → Move(Up)            │
/// │ 4        │ Down  → Move(Down)          │
/// │ 5        │ Quit  → Quit                │
/// │ (none)   │ nothing → None              │
/// └──────────┴────────────────────────────┘
///
/// First match wins; recency of the press is irrelevant.
///
/// ## Move resolution
///
///   1. Requested direction blocked outright → no move this tick.
///   2. Off the grid line perpendicular to the request → the move becomes
///      a single-axis correction back onto that line (turns only happen at
///      intersections).
///   3. Otherwise → step in the requested direction.
///
/// The result is always passed through `physics::furthest_legal_move`.

use super::entity::{DirectionKey, Intent, Player, PressedKeys};
use super::geometry::{aligned_x, aligned_y, nearest_grid_point, Cell, Direction, Vec2};
use super::grid::Grid;
use super::physics;

/// Fraction of a tick's travel within which the player is "on" a grid point
/// for item pickup.
pub const PICKUP_TOLERANCE: f64 = 0.75;

const KEY_PRIORITY: [(DirectionKey, Intent); 5] = [
    (DirectionKey::Left, Intent::Move(Direction::Left)),
    (DirectionKey::Right, Intent::Move(Direction::Right)),
    (DirectionKey::Up, Intent::Move(Direction::Up)),
    (DirectionKey::Down, Intent::Move(Direction::Down)),
    (DirectionKey::Quit, Intent::Quit),
];

/// Map the held keys to a single intent by fixed priority.
pub fn intent_from_keys(keys: PressedKeys) -> Option<Intent> {
    if keys.is_empty() {
        return None;
    }
    KEY_PRIORITY
        .iter()
        .find(|(key, _)| keys.contains(*key))
        .map(|(_, intent)| *intent)
}

/// The legal displacement for a move request, including realignment.
pub fn plan_player_move(grid: &Grid, player: &Player, dir: Direction) -> Vec2 {
    let wanted = dir.unit();
    if physics::furthest_legal_move(grid, player.pos, player.speed, wanted).is_zero() {
        return Vec2::ZERO;
    }

    let pos = player.pos;
    let near = nearest_grid_point(pos);
    let request = if wanted.x != 0.0 && !aligned_y(pos) {
        Vec2::new(0.0, near.y as f64 - pos.y)
    } else if wanted.y != 0.0 && !aligned_x(pos) {
        Vec2::new(near.x as f64 - pos.x, 0.0)
    } else {
        wanted
    };

    physics::furthest_legal_move(grid, pos, player.speed, request)
}

/// The cell whose item the player is close enough to consume, if any.
pub fn pickup_cell(player: &Player) -> Option<Cell> {
    let near = nearest_grid_point(player.pos);
    let off = (player.pos - near.center()).manhattan();
    if off < player.speed * PICKUP_TOLERANCE {
        Some(near)
    } else {
        None
    }
}

/// Result of one player move step.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PlayerStep {
    pub displacement: Vec2,
    /// Cell to try consuming an item at.
    pub pickup: Option<Cell>,
}

/// Apply a move request to the player: position, facing, pickup cell.
/// A fully blocked request leaves the player untouched and checks no pickup.
pub fn move_player(grid: &Grid, player: &mut Player, dir: Direction) -> PlayerStep {
    let displacement = plan_player_move(grid, player, dir);
    if displacement.is_zero() {
        return PlayerStep { displacement, pickup: None };
    }
    player.pos = player.pos + displacement;
    if let Some(facing) = Direction::from_displacement(displacement) {
        player.facing = facing;
    }
    PlayerStep { displacement, pickup: pickup_cell(player) }
}
