/// Collision resolver, the single source of truth for "can I move here".
///
/// Every agent (player and adversaries alike) turns an intended
/// displacement into a legal one through `furthest_legal_move`. There is no
/// other wall check anywhere in the crate.
///
/// ## Resolution rules
///
/// Let `near` be the nearest grid point of the current position.
///
/// ┌───────────────┬─────────────────────┬──────────────────────────────┐
/// │ Axis / sign   │ Neighbour checked   │ Clamp when wall and …         │
/// ├───────────────┼─────────────────────┼──────────────────────────────┤
/// │ x > 0         │ near + (1, 0)       │ cur.x + dx > near.x → near.x │
/// │ x < 0         │ near − (1, 0)       │ cur.x + dx < near.x → near.x │
/// │ y > 0         │ near + (0, 1)       │ cur.y + dy > near.y → near.y │
/// │ y < 0         │ near − (0, 1)       │ cur.y + dy < near.y → near.y │
/// └───────────────┴─────────────────────┴──────────────────────────────┘
///
/// After wall clamping each axis is independently limited to ±speed.
/// Out-of-bounds neighbours are never walls (see `Grid::object_at`).

use super::geometry::{nearest_grid_point, Direction, Vec2};
use super::grid::Grid;

/// Largest displacement, per axis, that neither crosses into a wall cell
/// nor exceeds `speed`. Returns zero when fully blocked.
pub fn furthest_legal_move(grid: &Grid, pos: Vec2, speed: f64, desired: Vec2) -> Vec2 {
    let near = nearest_grid_point(pos);
    let near_x = near.x as f64;
    let near_y = near.y as f64;
    let mut mx = desired.x;
    let mut my = desired.y;

    if mx > 0.0 {
        if grid.is_wall(near.step(Direction::Right)) && pos.x + mx > near_x {
            mx = near_x - pos.x;
        }
    } else if mx < 0.0 {
        if grid.is_wall(near.step(Direction::Left)) && pos.x + mx < near_x {
            mx = near_x - pos.x;
        }
    }

    if my > 0.0 {
        if grid.is_wall(near.step(Direction::Down)) && pos.y + my > near_y {
            my = near_y - pos.y;
        }
    } else if my < 0.0 {
        if grid.is_wall(near.step(Direction::Up)) && pos.y + my < near_y {
            my = near_y - pos.y;
        }
    }

    Vec2::new(limit(mx, speed), limit(my, speed))
}

#[inline]
fn limit(v: f64, speed: f64) -> f64 {
    if v > speed {
        speed
    } else if v < -speed {
        -speed
    } else {
        v
    }
}

/// Would a unit step in `dir` move the agent at all?
pub fn can_move(grid: &Grid, pos: Vec2, speed: f64, dir: Direction) -> bool {
    !furthest_legal_move(grid, pos, speed, dir.unit()).is_zero()
}
