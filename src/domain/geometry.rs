/// Grid geometry: continuous positions, discrete cells, directions,
/// and the affine grid → screen transform.
///
/// Positions are measured in grid cells. `(3.0, 2.0)` is exactly on the
/// grid point of cell (3, 2); `(3.25, 2.0)` is a quarter of the way to (4, 2).
/// The y axis grows downwards, matching terminal rows.

use std::ops::{Add, Mul, Sub};

/// Continuous 2D vector. Used both for positions and displacements.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn length_sq(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Sum of absolute components.
    pub fn manhattan(self) -> f64 {
        self.x.abs() + self.y.abs()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, k: f64) -> Vec2 {
        Vec2::new(self.x * k, self.y * k)
    }
}

/// Discrete grid coordinate. Signed so neighbours of edge cells can be
/// expressed (and looked up as out-of-bounds).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    /// Continuous position of this cell's grid point.
    pub fn center(self) -> Vec2 {
        Vec2::new(self.x as f64, self.y as f64)
    }

    pub fn step(self, dir: Direction) -> Cell {
        let (dx, dy) = dir.offset();
        Cell::new(self.x + dx, self.y + dy)
    }
}

/// Nearest grid point of a position.
///
/// Ties round away from zero: 2.5 → 3, -2.5 → -3, 0.5 → 1.
pub fn nearest_grid_point(pos: Vec2) -> Cell {
    Cell::new(pos.x.round() as i32, pos.y.round() as i32)
}

/// Is the position exactly on its nearest grid point along x?
pub fn aligned_x(pos: Vec2) -> bool {
    pos.x == pos.x.round()
}

/// Is the position exactly on its nearest grid point along y?
pub fn aligned_y(pos: Vec2) -> bool {
    pos.y == pos.y.round()
}

// ── Directions ──

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Right,
    Left,
    Down,
    Up,
}

impl Direction {
    /// Evaluation order used wherever all four directions are scanned.
    pub const ALL: [Direction; 4] = [Direction::Right, Direction::Left, Direction::Down, Direction::Up];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Left  => (-1, 0),
            Direction::Down  => (0, 1),
            Direction::Up    => (0, -1),
        }
    }

    pub fn unit(self) -> Vec2 {
        let (dx, dy) = self.offset();
        Vec2::new(dx as f64, dy as f64)
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Right => Direction::Left,
            Direction::Left  => Direction::Right,
            Direction::Down  => Direction::Up,
            Direction::Up    => Direction::Down,
        }
    }

    /// Facing derived from an applied displacement.
    /// Checked in the order right, down, left, up; `None` for a zero move.
    pub fn from_displacement(d: Vec2) -> Option<Direction> {
        if d.x > 0.0 {
            Some(Direction::Right)
        } else if d.y > 0.0 {
            Some(Direction::Down)
        } else if d.x < 0.0 {
            Some(Direction::Left)
        } else if d.y < 0.0 {
            Some(Direction::Up)
        } else {
            None
        }
    }
}

// ── Screen transform ──

/// Terminal columns per grid cell.
pub const GRID_PITCH_X: f64 = 2.0;
/// Terminal rows per grid cell.
pub const GRID_PITCH_Y: f64 = 1.0;
/// Left margin in terminal columns.
pub const MARGIN_X: f64 = 2.0;
/// Top margin in terminal rows (HUD lives above the maze).
pub const MARGIN_Y: f64 = 2.0;

/// Screen coordinate in terminal units. May be fractional; the renderer
/// snaps to the nearest terminal cell.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Pure affine map from grid space to screen space.
pub fn grid_to_screen(pos: Vec2) -> ScreenPoint {
    ScreenPoint {
        x: pos.x * GRID_PITCH_X + MARGIN_X,
        y: pos.y * GRID_PITCH_Y + MARGIN_Y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_ties_go_away_from_zero() {
        assert_eq!(nearest_grid_point(Vec2::new(2.5, 0.5)), Cell::new(3, 1));
        assert_eq!(nearest_grid_point(Vec2::new(-2.5, -0.5)), Cell::new(-3, -1));
        assert_eq!(nearest_grid_point(Vec2::new(2.49, 1.51)), Cell::new(2, 2));
    }

    #[test]
    fn alignment_is_exact() {
        assert!(aligned_x(Vec2::new(4.0, 1.25)));
        assert!(!aligned_y(Vec2::new(4.0, 1.25)));
    }

    #[test]
    fn grid_to_screen_is_affine_and_repeatable() {
        let p = Vec2::new(3.25, 7.0);
        let a = grid_to_screen(p);
        let b = grid_to_screen(p);
        assert_eq!(a, b);
        assert_eq!(a, ScreenPoint { x: 3.25 * GRID_PITCH_X + MARGIN_X, y: 7.0 + MARGIN_Y });
        assert_eq!(grid_to_screen(Vec2::ZERO), ScreenPoint { x: MARGIN_X, y: MARGIN_Y });
    }

    #[test]
    fn facing_prefers_horizontal_then_down() {
        assert_eq!(Direction::from_displacement(Vec2::new(0.25, 0.0)), Some(Direction::Right));
        assert_eq!(Direction::from_displacement(Vec2::new(0.0, -0.25)), Some(Direction::Up));
        assert_eq!(Direction::from_displacement(Vec2::ZERO), None);
    }

    #[test]
    fn cell_step_and_opposite() {
        let c = Cell::new(2, 2);
        for dir in Direction::ALL {
            assert_eq!(c.step(dir).step(dir.opposite()), c);
        }
    }
}
