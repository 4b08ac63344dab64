/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// The renderer is the production `Canvas`. The scene bridge tells it which
/// shapes exist and where; each frame it composes them into a buffer:
///   1. Build the next frame into `front` (HUD, shapes by layer, overlays)
///   2. Compare each cell with `back` (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back

use std::collections::{BTreeMap, HashMap};
use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{FearPhase, Paint};
use crate::domain::geometry::{Direction, ScreenPoint, GRID_PITCH_X, MARGIN_X, MARGIN_Y};
use crate::domain::grid::WallLinks;
use crate::sim::scene::{Canvas, Shape, ShapeId};
use crate::sim::world::{Maze, Phase};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every terminal cell, so the gap between
    /// rows matches the cell colour on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 10, g: 10, b: 24 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Glyphs and colours ──

pub fn paint_color(paint: Paint) -> Color {
    match paint {
        Paint::Red      => Color::Rgb { r: 255, g: 70, b: 70 },
        Paint::Green    => Color::Rgb { r: 80, g: 230, b: 90 },
        Paint::Blue     => Color::Rgb { r: 90, g: 140, b: 255 },
        Paint::Purple   => Color::Rgb { r: 190, g: 90, b: 255 },
        Paint::White    => Color::Rgb { r: 240, g: 240, b: 240 },
        Paint::Yellow   => Color::Rgb { r: 255, g: 220, b: 40 },
        Paint::PaleCyan => Color::Rgb { r: 140, g: 210, b: 225 },
    }
}

/// Box-drawing glyph for a wall cell from its links to neighbouring walls.
fn wall_glyph(links: WallLinks) -> char {
    let WallLinks { right, left, down, up } = links;
    match (up, down, left, right) {
        (true, true, true, true)     => '┼',
        (true, true, true, false)    => '┤',
        (true, true, false, true)    => '├',
        (false, true, true, true)    => '┬',
        (true, false, true, true)    => '┴',
        (false, true, false, true)   => '┌',
        (false, true, true, false)   => '┐',
        (true, false, false, true)   => '└',
        (true, false, true, false)   => '┘',
        (true, true, false, false)
        | (true, false, false, false)
        | (false, true, false, false) => '│',
        (false, false, true, true)
        | (false, false, true, false)
        | (false, false, false, true) => '─',
        (false, false, false, false) => '■',
    }
}

pub fn glyph(shape: Shape) -> char {
    match shape {
        Shape::Wall(links) => wall_glyph(links),
        Shape::WallLink => '─',
        Shape::Food => '·',
        Shape::Capsule => '●',
        Shape::PlayerBody => 'O',
        // Mouth opens toward the facing direction.
        Shape::PlayerMouth(Direction::Right) => '<',
        Shape::PlayerMouth(Direction::Left) => '>',
        Shape::PlayerMouth(Direction::Down) => '^',
        Shape::PlayerMouth(Direction::Up) => 'v',
        Shape::AdversaryBody(FearPhase::Normal) => 'Ω',
        Shape::AdversaryBody(FearPhase::Steady | FearPhase::Blinking) => 'ω',
    }
}

/// Nearest terminal cell of a screen point; `None` if left of or above the screen.
fn snap(at: ScreenPoint) -> Option<(usize, usize)> {
    let (x, y) = (at.x.round(), at.y.round());
    if x < 0.0 || y < 0.0 {
        None
    } else {
        Some((x as usize, y as usize))
    }
}

// ── Renderer ──

const HUD_ROW: usize = 0;
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    enhanced_keys: bool,

    // ── Canvas state ──
    /// Drawn shapes, iterated in layer order.
    shapes: BTreeMap<ShapeId, (ScreenPoint, Shape)>,
    /// Fill per shape id; survives undraw.
    fills: HashMap<ShapeId, Paint>,
}

impl Canvas for Renderer {
    fn draw_shape(&mut self, id: ShapeId, at: ScreenPoint, shape: Shape) {
        self.shapes.insert(id, (at, shape));
    }

    fn undraw_shape(&mut self, id: ShapeId) {
        self.shapes.remove(&id);
    }

    fn set_fill_color(&mut self, id: ShapeId, paint: Paint) {
        self.fills.insert(id, paint);
    }
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            enhanced_keys: false,
            shapes: BTreeMap::new(),
            fills: HashMap::new(),
        }
    }

    /// Enter raw mode and the alternate screen. Returns whether the terminal
    /// reports key releases.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keys = true;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);

        Ok(self.enhanced_keys)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, maze: &Maze) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_phase != Some(maze.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(maze.phase);
        }

        self.front.clear();
        self.compose(maze);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, maze: &Maze) {
        self.compose_hud(maze);
        self.compose_shapes();

        let msg_row = MARGIN_Y as usize + maze.grid.height() + 1;
        match maze.phase {
            Phase::Ready => self.compose_banner(maze, &["Press any key to start"], msg_row),
            Phase::Paused => self.compose_banner(maze, &["PAUSED", "F1 / P: Resume"], msg_row),
            Phase::Over => {
                let outcome = if maze.winner { "You Win!" } else if maze.quit { "Bye!" } else { "You Lose!" };
                self.compose_banner(maze, &[outcome, "Press any key to quit."], msg_row);
            }
            Phase::Playing => {
                if !maze.message.is_empty() && msg_row < self.front.height {
                    self.front.fill_row(msg_row, MSG_BG);
                    self.front.put_str(0, msg_row, &format!(" ◈ {} ", maze.message), Color::Black, MSG_BG);
                }
            }
        }

        let help_row = msg_row + 2;
        let help = " Arrows/WASD: Move  F1/P: Pause  Q/Esc: Quit  │  Pad: D-pad  Start: Pause  Select: Quit";
        self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
    }

    fn compose_hud(&mut self, maze: &Maze) {
        let fear = maze.max_fear_ticks();
        let fear_status = if fear > 0 { format!("Fear:{fear:<3}") } else { String::new() };
        let hud = format!(
            " MAZE CHASE  Food:{}/{}  {} ",
            maze.food_remaining, maze.food_total, fear_status,
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    fn compose_shapes(&mut self) {
        for (id, (at, shape)) in &self.shapes {
            let Some((x, y)) = snap(*at) else { continue };
            let fg = self.fills.get(id).copied().map_or(Color::White, paint_color);
            self.front.set(x, y, Cell::new(glyph(*shape), fg, Color::Reset));
        }
    }

    /// Centered box over the maze.
    fn compose_banner(&mut self, maze: &Maze, lines: &[&str], msg_row: usize) {
        let bg = Color::Rgb { r: 40, g: 40, b: 40 };
        let fg = Color::Rgb { r: 255, g: 220, b: 50 };
        let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
        let maze_cols = MARGIN_X as usize + maze.grid.width() * GRID_PITCH_X as usize;
        let box_x = maze_cols.saturating_sub(inner + 2) / 2;
        let box_y = (MARGIN_Y as usize + maze.grid.height() / 2).saturating_sub(lines.len() / 2 + 1);

        let top = format!("╔{}╗", "═".repeat(inner));
        let bottom = format!("╚{}╝", "═".repeat(inner));
        self.front.put_str(box_x, box_y, &top, fg, bg);
        for (i, line) in lines.iter().enumerate() {
            let pad = inner - line.chars().count();
            let text = format!("║{}{}{}║", " ".repeat(pad / 2), line, " ".repeat(pad - pad / 2));
            self.front.put_str(box_x, box_y + 1 + i, &text, fg, bg);
        }
        self.front.put_str(box_x, box_y + 1 + lines.len(), &bottom, fg, bg);

        if let Some(first) = lines.first() {
            if msg_row < self.front.height {
                self.front.fill_row(msg_row, MSG_BG);
                self.front.put_str(0, msg_row, &format!(" ◈ {first} "), Color::Black, MSG_BG);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::level::parse_layout;
    use crate::sim::scene::AgentPart;

    fn row_text(buf: &FrameBuffer, y: usize) -> String {
        (0..buf.width).map(|x| buf.get(x, y).ch).collect()
    }

    fn links(up: bool, down: bool, left: bool, right: bool) -> WallLinks {
        WallLinks { right, left, down, up }
    }

    #[test]
    fn wall_glyph_follows_links() {
        assert_eq!(wall_glyph(links(false, false, true, true)), '─');
        assert_eq!(wall_glyph(links(true, true, false, false)), '│');
        assert_eq!(wall_glyph(links(false, true, false, true)), '┌');
        assert_eq!(wall_glyph(links(true, true, true, true)), '┼');
        assert_eq!(wall_glyph(WallLinks::default()), '■');
    }

    #[test]
    fn mouth_opens_toward_facing() {
        assert_eq!(glyph(Shape::PlayerMouth(Direction::Right)), '<');
        assert_eq!(glyph(Shape::PlayerMouth(Direction::Up)), 'v');
        assert_ne!(
            glyph(Shape::AdversaryBody(FearPhase::Normal)),
            glyph(Shape::AdversaryBody(FearPhase::Blinking))
        );
    }

    #[test]
    fn snap_rounds_to_terminal_cells() {
        assert_eq!(snap(ScreenPoint { x: 4.5, y: 2.0 }), Some((5, 2)));
        assert_eq!(snap(ScreenPoint { x: 4.4, y: 2.6 }), Some((4, 3)));
        assert_eq!(snap(ScreenPoint { x: -1.0, y: 0.0 }), None);
    }

    #[test]
    fn canvas_keeps_fill_across_undraw() {
        let mut r = Renderer::new();
        let id = ShapeId::Agent(0, AgentPart::Accessory);
        r.set_fill_color(id, Paint::Yellow);
        r.draw_shape(id, ScreenPoint { x: 2.0, y: 2.0 }, Shape::PlayerMouth(Direction::Left));
        r.undraw_shape(id);
        assert!(r.shapes.is_empty());
        assert_eq!(r.fills.get(&id), Some(&Paint::Yellow));
    }

    #[test]
    fn shapes_compose_in_layer_order() {
        let mut r = Renderer::new();
        r.front.resize(10, 5);
        let at = ScreenPoint { x: 3.0, y: 2.0 };
        r.draw_shape(ShapeId::Agent(0, AgentPart::Accessory), at, Shape::PlayerMouth(Direction::Right));
        r.draw_shape(ShapeId::Agent(0, AgentPart::Body), at, Shape::PlayerBody);
        r.set_fill_color(ShapeId::Agent(0, AgentPart::Accessory), Paint::Yellow);
        r.compose_shapes();
        let cell = r.front.get(3, 2);
        assert_eq!(cell.ch, '<');
        assert_eq!(cell.fg, paint_color(Paint::Yellow));
    }

    #[test]
    fn later_agent_covers_open_mouth_in_same_cell() {
        let mut r = Renderer::new();
        r.front.resize(10, 5);
        let at = ScreenPoint { x: 3.0, y: 2.0 };
        r.draw_shape(ShapeId::Agent(1, AgentPart::Body), at, Shape::AdversaryBody(FearPhase::Normal));
        r.draw_shape(ShapeId::Agent(0, AgentPart::Body), at, Shape::PlayerBody);
        r.draw_shape(ShapeId::Agent(0, AgentPart::Accessory), at, Shape::PlayerMouth(Direction::Right));
        r.compose_shapes();
        assert_eq!(r.front.get(3, 2).ch, 'Ω');
    }

    #[test]
    fn playing_message_shows_once() {
        let config = GameConfig { seed: Some(1), ..GameConfig::default() };
        let mut maze = Maze::from_layout(parse_layout(&["P.G"]).expect("valid layout"), &config);
        maze.phase = Phase::Playing;
        maze.set_message("Power capsule!", 40);

        let mut r = Renderer::new();
        r.front.resize(80, 10);
        r.compose(&maze);
        let shown = (0..r.front.height)
            .filter(|&y| row_text(&r.front, y).contains("Power capsule!"))
            .count();
        assert_eq!(shown, 1);
        assert!(!row_text(&r.front, HUD_ROW).contains("Power capsule!"));
    }
}
