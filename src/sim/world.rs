/// Maze: the complete snapshot of a running game.
///
/// ## Ownership
///
///   - `grid`: static cells. Only the maze's item-removal operations
///                write it, and only to turn an item into `Empty`.
///   - `agents`: player first, then adversaries in spawn order. Each
///                agent's position is written only by its own move step.
///   - counters and flags (`food_remaining`, `game_over`, `winner`) are
///                written only by the operations below.
///
/// Cross-agent effects (fear broadcast, capture) are issued through the
/// maze and recorded as `GameEvent`s, which `step` drains once per tick.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::domain::entity::{Adversary, Agent, Player};
use crate::domain::geometry::{Cell, Vec2};
use crate::domain::grid::{wall_segments, Grid, MapCell, WallSegment};
use crate::sim::event::GameEvent;
use crate::sim::level::Layout;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Ready,
    Playing,
    Paused,
    Over,
}

pub struct Maze {
    // ── Static grid ──
    pub grid: Grid,
    /// Links between adjacent wall cells, computed once after load.
    pub segments: Vec<WallSegment>,

    // ── Agents ──
    pub agents: Vec<Agent>,

    // ── Game tracking ──
    pub food_remaining: usize,
    pub food_total: usize,
    pub game_over: bool,
    pub winner: bool,
    pub quit: bool,

    // ── Tuning ──
    pub fear_ticks: u32,
    pub warn_ticks: u32,
    pub capture_radius_sq: f64,

    /// The only source of non-determinism: adversary tie-breaks.
    pub rng: StdRng,

    // ── Meta ──
    pub phase: Phase,
    pub tick: u64,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,

    events: Vec<GameEvent>,
}

// ── Construction ──

impl Maze {
    /// Register the player first and the adversaries after it, numbering
    /// adversaries from 1 in spawn order.
    pub fn from_layout(layout: Layout, config: &GameConfig) -> Self {
        let Layout { grid, player_spawn, adversary_spawns } = layout;

        let mut agents = Vec::with_capacity(adversary_spawns.len() + 1);
        agents.push(Agent::Player(Player::new(player_spawn, config.speed.player_speed)));
        for (i, spawn) in adversary_spawns.into_iter().enumerate() {
            agents.push(Agent::Adversary(Adversary::new(
                i + 1,
                spawn,
                config.speed.adversary_speed,
            )));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let food = grid.count(MapCell::Food);
        let segments = wall_segments(&grid);
        let radius = config.fear.capture_radius;

        Maze {
            grid,
            segments,
            agents,
            food_remaining: food,
            food_total: food,
            game_over: false,
            winner: false,
            quit: false,
            fear_ticks: config.fear.fear_ticks,
            warn_ticks: config.fear.warn_ticks,
            capture_radius_sq: radius * radius,
            rng,
            phase: Phase::Ready,
            tick: 0,
            message: String::new(),
            message_timer: 0,
            events: Vec::new(),
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

// ── Queries ──

impl Maze {
    /// Out-of-range cells read as `Empty`, never `Wall`.
    #[inline]
    pub fn object_at(&self, cell: Cell) -> MapCell {
        self.grid.object_at(cell)
    }

    pub fn adversaries(&self) -> impl Iterator<Item = &Adversary> {
        self.agents.iter().filter_map(Agent::as_adversary)
    }

    /// Largest remaining fear timer across all adversaries.
    pub fn max_fear_ticks(&self) -> u32 {
        self.adversaries().map(|a| a.fear_ticks).max().unwrap_or(0)
    }
}

// ── Mutations ──

impl Maze {
    /// Consume whatever item sits at `cell`. Walls and empty cells are left alone.
    pub fn consume_at(&mut self, cell: Cell) {
        match self.object_at(cell) {
            MapCell::Food => self.remove_food(cell),
            MapCell::Capsule => self.remove_capsule(cell),
            MapCell::Empty | MapCell::Wall => {}
        }
    }

    pub fn remove_food(&mut self, cell: Cell) {
        if self.object_at(cell) != MapCell::Food {
            return;
        }
        self.grid.set(cell, MapCell::Empty);
        self.food_remaining -= 1;
        self.emit(GameEvent::FoodEaten { cell });

        if self.food_remaining == 0 {
            self.winner = true;
            self.game_over = true;
            tracing::info!(tick = self.tick, "all food eaten");
            self.emit(GameEvent::AllFoodEaten);
        }
    }

    pub fn remove_capsule(&mut self, cell: Cell) {
        if self.object_at(cell) != MapCell::Capsule {
            return;
        }
        self.grid.set(cell, MapCell::Empty);
        self.emit(GameEvent::CapsuleEaten { cell });
        tracing::info!(x = cell.x, y = cell.y, tick = self.tick, "capsule eaten");

        let fear = self.fear_ticks;
        for adv in self.agents.iter_mut().filter_map(Agent::as_adversary_mut) {
            adv.frighten(fear);
        }
    }

    /// Proximity check for every adversary against the player's position.
    /// Each adversary is resolved on its own: a feared one is sent home,
    /// a normal one ends the game.
    pub fn report_player_position(&mut self, pos: Vec2) {
        let threshold = self.capture_radius_sq;
        let mut captured = Vec::new();
        let mut caught_by = Vec::new();

        for adv in self.agents.iter_mut().filter_map(Agent::as_adversary_mut) {
            if adv.distance_sq(pos) >= threshold {
                continue;
            }
            if adv.is_feared() {
                adv.send_home();
                captured.push(adv.index);
            } else {
                caught_by.push(adv.index);
            }
        }

        for index in captured {
            tracing::info!(adversary = index, tick = self.tick, "adversary captured");
            self.emit(GameEvent::AdversaryCaptured { index });
        }
        for index in caught_by {
            self.emit(GameEvent::PlayerCaught { index });
            self.declare_loss();
        }
    }

    /// Game over without a win. A win recorded earlier in the same tick stands.
    pub fn declare_loss(&mut self) {
        if !self.game_over {
            tracing::info!(tick = self.tick, "player caught");
        }
        self.game_over = true;
    }

    /// Player asked to leave. Ends the game without declaring a loss.
    pub fn declare_quit(&mut self) {
        if self.quit {
            return;
        }
        tracing::info!(tick = self.tick, "quit requested");
        self.quit = true;
        self.game_over = true;
        self.emit(GameEvent::QuitRequested);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::parse_layout;

    fn maze(rows: &[&str]) -> Maze {
        let config = GameConfig { seed: Some(1), ..GameConfig::default() };
        Maze::from_layout(parse_layout(rows).expect("valid layout"), &config)
    }

    fn adversary(m: &Maze, index: usize) -> &Adversary {
        m.adversaries().find(|a| a.index == index).expect("adversary exists")
    }

    fn live_food(m: &Maze) -> usize {
        m.grid.count(MapCell::Food)
    }

    #[test]
    fn player_registers_before_adversaries() {
        let m = maze(&["%G.P.G%"]);
        assert!(matches!(m.agents[0], Agent::Player(_)));
        let indices: Vec<usize> = m.adversaries().map(|a| a.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(m.food_total, 2);
        assert_eq!(m.phase, Phase::Ready);
    }

    #[test]
    fn object_at_out_of_bounds_is_empty() {
        let m = maze(&["%P%"]);
        assert_eq!(m.object_at(Cell::new(-1, 0)), MapCell::Empty);
        assert_eq!(m.object_at(Cell::new(3, 0)), MapCell::Empty);
        assert_eq!(m.object_at(Cell::new(0, 0)), MapCell::Wall);
    }

    #[test]
    fn food_counter_tracks_grid() {
        let mut m = maze(&["P..."]);
        m.remove_food(Cell::new(1, 0));
        assert_eq!(m.food_remaining, live_food(&m));
        // Removing the same cell twice does not double count.
        m.remove_food(Cell::new(1, 0));
        assert_eq!(m.food_remaining, 2);
        assert_eq!(m.food_remaining, live_food(&m));
        assert!(!m.game_over);
    }

    #[test]
    fn last_food_wins() {
        let mut m = maze(&["P."]);
        m.consume_at(Cell::new(1, 0));
        assert!(m.game_over && m.winner);
        assert_eq!(m.food_remaining, 0);
        let events = m.take_events();
        assert_eq!(
            events,
            vec![GameEvent::FoodEaten { cell: Cell::new(1, 0) }, GameEvent::AllFoodEaten]
        );
    }

    #[test]
    fn capsule_frightens_every_adversary() {
        let mut m = maze(&["PoG.G"]);
        m.consume_at(Cell::new(1, 0));
        assert_eq!(m.object_at(Cell::new(1, 0)), MapCell::Empty);
        for a in m.adversaries() {
            assert_eq!(a.fear_ticks, m.fear_ticks);
        }
        assert_eq!(m.max_fear_ticks(), 100);
        assert_eq!(m.food_remaining, 1);
    }

    #[test]
    fn feared_adversary_is_captured_and_sent_home() {
        let mut m = maze(&["P..G"]);
        if let Some(a) = m.agents[1].as_adversary_mut() {
            a.frighten(100);
            a.pos = Vec2::new(0.0, 0.0);
        }
        m.report_player_position(Vec2::new(0.0, 0.0));
        let a = adversary(&m, 1);
        assert_eq!(a.pos, Vec2::new(3.0, 0.0));
        assert_eq!(a.fear_ticks, 0);
        assert_eq!(a.color, a.orig_color);
        assert!(!m.game_over);
        assert_eq!(m.take_events(), vec![GameEvent::AdversaryCaptured { index: 1 }]);
    }

    #[test]
    fn normal_adversary_catches_player() {
        let mut m = maze(&["P..G"]);
        if let Some(a) = m.agents[1].as_adversary_mut() {
            a.pos = Vec2::new(0.0, 0.0);
        }
        m.report_player_position(Vec2::new(0.0, 0.0));
        assert!(m.game_over);
        assert!(!m.winner);
        assert_eq!(m.take_events(), vec![GameEvent::PlayerCaught { index: 1 }]);
    }

    #[test]
    fn proximity_is_resolved_per_adversary() {
        let mut m = maze(&["P....GG"]);
        for agent in m.agents.iter_mut().skip(1) {
            if let Some(a) = agent.as_adversary_mut() {
                a.pos = Vec2::new(1.0, 0.0);
            }
        }
        if let Some(a) = m.agents[1].as_adversary_mut() {
            a.frighten(100);
        }
        m.report_player_position(Vec2::new(0.0, 0.0));
        assert_eq!(adversary(&m, 1).pos, Vec2::new(5.0, 0.0));
        assert!(m.game_over && !m.winner);
    }

    #[test]
    fn capture_threshold_is_strict() {
        let mut m = maze(&["P....G"]);
        if let Some(a) = m.agents[1].as_adversary_mut() {
            a.pos = Vec2::new(1.6, 0.0);
        }
        m.report_player_position(Vec2::new(0.0, 0.0));
        assert!(!m.game_over);
        if let Some(a) = m.agents[1].as_adversary_mut() {
            a.pos = Vec2::new(1.5, 0.0);
        }
        m.report_player_position(Vec2::new(0.0, 0.0));
        assert!(m.game_over);
    }

    #[test]
    fn quit_ends_without_loss_or_win() {
        let mut m = maze(&["P."]);
        m.declare_quit();
        m.declare_quit();
        assert!(m.game_over && m.quit && !m.winner);
        assert_eq!(m.take_events(), vec![GameEvent::QuitRequested]);
    }
}
