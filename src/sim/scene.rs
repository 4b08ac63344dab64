/// Scene bridge: turns maze state into shape commands for a canvas.
///
/// The core never draws. It decides which shapes exist, where they are
/// on screen, and what colour they are; a `Canvas` does the rest.
///
/// ## Shapes
///
/// ┌────────────────────────┬─────────────────────────────┬───────────────┐
/// │ ShapeId                │ Drawn                       │ Removed       │
/// ├────────────────────────┼─────────────────────────────┼───────────────┤
/// │ WallCell(cell)         │ build                       │ never         │
/// │ WallLink(a, b)         │ build (horizontal pairs)    │ never         │
/// │ Item(cell)             │ build                       │ when eaten    │
/// │ Agent(slot, Body)      │ build + every sync          │ never         │
/// │ Agent(0, Accessory)    │ sync, while mouth is open   │ mouth closed  │
/// └────────────────────────┴─────────────────────────────┴───────────────┘
///
/// Vertically adjacent walls touch on a terminal (one row per cell), so only
/// horizontal links need their own shape.

use crate::domain::entity::{
    Agent, FearPhase, Paint, Player, CAPSULE_PAINT, FOOD_PAINT, PLAYER_PAINT, WALL_PAINT,
};
use crate::domain::geometry::{grid_to_screen, nearest_grid_point, Cell, Direction, ScreenPoint};
use crate::domain::grid::{wall_links, MapCell, WallLinks};
use super::event::GameEvent;
use super::world::Maze;

/// Identity of a drawable. Ordered by drawing layer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ShapeId {
    WallCell(Cell),
    WallLink(Cell, Cell),
    Item(Cell),
    /// Slot in `Maze::agents`. Each agent's parts stack directly on its
    /// body, before any later agent is drawn.
    Agent(usize, AgentPart),
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum AgentPart {
    Body,
    Accessory,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Shape {
    Wall(WallLinks),
    WallLink,
    Food,
    Capsule,
    PlayerBody,
    PlayerMouth(Direction),
    AdversaryBody(FearPhase),
}

/// Drawing surface. A shape keeps its fill colour across redraws and
/// undraws of the same id.
pub trait Canvas {
    /// Draw (or move) the shape with this id.
    fn draw_shape(&mut self, id: ShapeId, at: ScreenPoint, shape: Shape);
    fn undraw_shape(&mut self, id: ShapeId);
    fn set_fill_color(&mut self, id: ShapeId, paint: Paint);
}

pub struct Scene {
    /// Last fill sent per agent slot (adversaries only).
    shown_paint: Vec<Option<Paint>>,
    mouth_open: bool,
}

impl Scene {
    /// Draw everything once.
    pub fn build(maze: &Maze, canvas: &mut dyn Canvas) -> Scene {
        for (cell, kind) in maze.grid.iter() {
            let (shape, paint) = match kind {
                MapCell::Wall => {
                    let id = ShapeId::WallCell(cell);
                    canvas.draw_shape(id, grid_to_screen(cell.center()), Shape::Wall(wall_links(&maze.grid, cell)));
                    canvas.set_fill_color(id, WALL_PAINT);
                    continue;
                }
                MapCell::Food => (Shape::Food, FOOD_PAINT),
                MapCell::Capsule => (Shape::Capsule, CAPSULE_PAINT),
                MapCell::Empty => continue,
            };
            let id = ShapeId::Item(cell);
            canvas.draw_shape(id, grid_to_screen(cell.center()), shape);
            canvas.set_fill_color(id, paint);
        }

        for seg in maze.segments.iter().filter(|s| s.is_horizontal()) {
            let a = grid_to_screen(seg.from.center());
            let b = grid_to_screen(seg.to.center());
            let mid = ScreenPoint { x: (a.x + b.x) / 2.0, y: (a.y + b.y) / 2.0 };
            let id = ShapeId::WallLink(seg.from, seg.to);
            canvas.draw_shape(id, mid, Shape::WallLink);
            canvas.set_fill_color(id, WALL_PAINT);
        }

        let mut scene = Scene {
            shown_paint: vec![None; maze.agents.len()],
            mouth_open: false,
        };
        for (slot, agent) in maze.agents.iter().enumerate() {
            if let Agent::Player(_) = agent {
                canvas.set_fill_color(ShapeId::Agent(slot, AgentPart::Body), PLAYER_PAINT);
                canvas.set_fill_color(ShapeId::Agent(slot, AgentPart::Accessory), PLAYER_PAINT);
            }
        }
        scene.sync_agents(maze, canvas);
        scene
    }

    /// Apply one tick's worth of changes.
    pub fn sync(&mut self, maze: &Maze, events: &[GameEvent], canvas: &mut dyn Canvas) {
        for event in events {
            if let GameEvent::FoodEaten { cell } | GameEvent::CapsuleEaten { cell } = event {
                canvas.undraw_shape(ShapeId::Item(*cell));
            }
        }
        self.sync_agents(maze, canvas);
    }

    fn sync_agents(&mut self, maze: &Maze, canvas: &mut dyn Canvas) {
        for (slot, agent) in maze.agents.iter().enumerate() {
            let at = grid_to_screen(agent.position());
            match agent {
                Agent::Player(player) => {
                    canvas.draw_shape(ShapeId::Agent(slot, AgentPart::Body), at, Shape::PlayerBody);
                    let accessory = ShapeId::Agent(slot, AgentPart::Accessory);
                    if mouth_open(player) {
                        canvas.draw_shape(accessory, at, Shape::PlayerMouth(player.facing));
                        self.mouth_open = true;
                    } else if self.mouth_open {
                        canvas.undraw_shape(accessory);
                        self.mouth_open = false;
                    }
                }
                Agent::Adversary(adv) => {
                    let id = ShapeId::Agent(slot, AgentPart::Body);
                    canvas.draw_shape(id, at, Shape::AdversaryBody(adv.fear_phase(maze.warn_ticks)));
                    if self.shown_paint[slot] != Some(adv.color) {
                        canvas.set_fill_color(id, adv.color);
                        self.shown_paint[slot] = Some(adv.color);
                    }
                }
            }
        }
    }
}

/// The mouth opens as the player leaves a grid point and closes on arrival.
fn mouth_open(player: &Player) -> bool {
    let off = (player.pos - nearest_grid_point(player.pos).center()).manhattan();
    off > player.speed / 4.0
}
