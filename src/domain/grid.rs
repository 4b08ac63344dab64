/// Static maze cells and the grid that owns them.
///
/// The grid is an arena: it is filled completely by the layout loader, and
/// derived data (wall links for drawing) is computed afterwards by read-only
/// lookups into the finished grid.

use super::geometry::{Cell, Direction};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum MapCell {
    #[default]
    Empty,
    Wall,
    Food,
    Capsule,
}

impl MapCell {
    pub fn is_wall(self) -> bool {
        matches!(self, MapCell::Wall)
    }
}

#[derive(Clone, Debug)]
pub struct Grid {
    cells: Vec<Vec<MapCell>>,
    width: usize,
    height: usize,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            cells: vec![vec![MapCell::Empty; width]; height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, cell: Cell) -> Option<(usize, usize)> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        let (x, y) = (cell.x as usize, cell.y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((x, y))
    }

    /// Bounds-checked lookup. Out of range is `Empty`, never `Wall`, so
    /// agents at the edge of an unbounded layout are not clamped.
    #[inline]
    pub fn object_at(&self, cell: Cell) -> MapCell {
        match self.index(cell) {
            Some((x, y)) => self.cells[y][x],
            None => MapCell::Empty,
        }
    }

    #[inline]
    pub fn is_wall(&self, cell: Cell) -> bool {
        self.object_at(cell).is_wall()
    }

    /// Write a cell. Ignored out of bounds.
    pub fn set(&mut self, cell: Cell, value: MapCell) {
        if let Some((x, y)) = self.index(cell) {
            self.cells[y][x] = value;
        }
    }

    pub fn count(&self, kind: MapCell) -> usize {
        self.cells.iter().flatten().filter(|c| **c == kind).count()
    }

    /// All cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, MapCell)> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, c)| (Cell::new(x as i32, y as i32), *c))
        })
    }
}

// ══════════════════════════════════════════════════════════════
// Derived wall geometry
// ══════════════════════════════════════════════════════════════

/// A link between two orthogonally adjacent wall cells.
/// `from` is always the left (or upper) cell of the pair.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct WallSegment {
    pub from: Cell,
    pub to: Cell,
}

impl WallSegment {
    pub fn is_horizontal(&self) -> bool {
        self.from.y == self.to.y
    }
}

/// Which neighbours of a wall cell are walls too.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct WallLinks {
    pub right: bool,
    pub left: bool,
    pub down: bool,
    pub up: bool,
}

/// Links of the wall at `cell` to neighbouring walls. All false if `cell`
/// is not a wall.
pub fn wall_links(grid: &Grid, cell: Cell) -> WallLinks {
    if !grid.is_wall(cell) {
        return WallLinks::default();
    }
    WallLinks {
        right: grid.is_wall(cell.step(Direction::Right)),
        left: grid.is_wall(cell.step(Direction::Left)),
        down: grid.is_wall(cell.step(Direction::Down)),
        up: grid.is_wall(cell.step(Direction::Up)),
    }
}

/// Every wall-to-wall link, each unordered pair exactly once.
pub fn wall_segments(grid: &Grid) -> Vec<WallSegment> {
    let mut segments = Vec::new();
    for (cell, kind) in grid.iter() {
        if !kind.is_wall() { continue; }
        for dir in [Direction::Right, Direction::Down] {
            let next = cell.step(dir);
            if grid.is_wall(next) {
                segments.push(WallSegment { from: cell, to: next });
            }
        }
    }
    segments
}
