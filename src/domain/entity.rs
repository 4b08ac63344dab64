/// Agents: the player and the adversaries, as one closed variant type.
///
/// Each agent owns its position; only its own move step writes it.
/// Cross-agent effects (item removal, fear broadcast, capture) go
/// through the maze.

use super::geometry::{Cell, Direction, Vec2};

// ── Colours ──

/// Logical colours. The renderer maps them to terminal colours.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Paint {
    Red,
    Green,
    Blue,
    Purple,
    White,
    Yellow,
    PaleCyan,
}

pub const ADVERSARY_PALETTE: [Paint; 4] = [Paint::Red, Paint::Green, Paint::Blue, Paint::Purple];
pub const FEAR_PAINT: Paint = Paint::White;
pub const PLAYER_PAINT: Paint = Paint::Yellow;
pub const FOOD_PAINT: Paint = Paint::Red;
pub const CAPSULE_PAINT: Paint = Paint::White;
pub const WALL_PAINT: Paint = Paint::PaleCyan;

impl Paint {
    /// Identity colour for the adversary with spawn number `index` (1-based).
    pub fn for_adversary(index: usize) -> Paint {
        ADVERSARY_PALETTE[index % ADVERSARY_PALETTE.len()]
    }
}

// ── Input ──

/// Keys the core cares about, sampled once per tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DirectionKey {
    Left,
    Right,
    Up,
    Down,
    Quit,
}

impl DirectionKey {
    fn bit(self) -> u8 {
        match self {
            DirectionKey::Left  => 1 << 0,
            DirectionKey::Right => 1 << 1,
            DirectionKey::Up    => 1 << 2,
            DirectionKey::Down  => 1 << 3,
            DirectionKey::Quit  => 1 << 4,
        }
    }
}

/// Set of currently held keys.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct PressedKeys(u8);

impl PressedKeys {
    pub fn insert(&mut self, key: DirectionKey) {
        self.0 |= key.bit();
    }

    pub fn contains(&self, key: DirectionKey) -> bool {
        self.0 & key.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: PressedKeys) -> PressedKeys {
        PressedKeys(self.0 | other.0)
    }
}

impl FromIterator<DirectionKey> for PressedKeys {
    fn from_iter<I: IntoIterator<Item = DirectionKey>>(iter: I) -> Self {
        let mut keys = PressedKeys::default();
        for k in iter {
            keys.insert(k);
        }
        keys
    }
}

/// What the player wants this tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    Move(Direction),
    Quit,
}

// ── Player ──

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Vec2,
    pub speed: f64,
    pub facing: Direction,
}

impl Player {
    pub fn new(spawn: Cell, speed: f64) -> Self {
        Player {
            pos: spawn.center(),
            speed,
            facing: Direction::Right,
        }
    }
}

// ── Adversary ──

/// Rendering sub-phase of the fear state. Has no effect on movement.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FearPhase {
    Normal,
    Steady,
    Blinking,
}

#[derive(Clone, Debug)]
pub struct Adversary {
    /// Spawn number assigned by the maze (1-based). Picks the colour.
    pub index: usize,
    pub pos: Vec2,
    pub speed: f64,
    pub color: Paint,
    pub orig_color: Paint,
    /// Ticks of fear remaining; 0 = normal.
    pub fear_ticks: u32,
    /// Most recently committed direction; `None` before the first decision.
    pub movement: Option<Direction>,
    pub home: Cell,
    pub waypoint: Cell,
}

impl Adversary {
    pub fn new(index: usize, spawn: Cell, speed: f64) -> Self {
        let color = Paint::for_adversary(index);
        Adversary {
            index,
            pos: spawn.center(),
            speed,
            color,
            orig_color: color,
            fear_ticks: 0,
            movement: None,
            home: spawn,
            waypoint: spawn,
        }
    }

    pub fn is_feared(&self) -> bool {
        self.fear_ticks > 0
    }

    pub fn fear_phase(&self, warn_ticks: u32) -> FearPhase {
        if self.fear_ticks == 0 {
            FearPhase::Normal
        } else if self.fear_ticks < warn_ticks {
            FearPhase::Blinking
        } else {
            FearPhase::Steady
        }
    }

    /// Capsule eaten: (re)start the fear timer.
    pub fn frighten(&mut self, fear_ticks: u32) {
        self.fear_ticks = fear_ticks;
        self.color = FEAR_PAINT;
    }

    /// Advance the fear timer by one tick. During the warning window the
    /// colour alternates every tick; it lands on the original colour when the
    /// timer drains. Returns true on the tick fear ends.
    pub fn tick_fear(&mut self, warn_ticks: u32) -> bool {
        if self.fear_ticks == 0 {
            return false;
        }
        self.fear_ticks -= 1;
        if self.fear_ticks < warn_ticks {
            self.color = if self.fear_ticks % 2 == 0 { self.orig_color } else { FEAR_PAINT };
        }
        self.fear_ticks == 0
    }

    /// Eaten by the player: back home, calm, original colour.
    pub fn send_home(&mut self) {
        self.pos = self.home.center();
        self.fear_ticks = 0;
        self.color = self.orig_color;
        self.waypoint = self.home;
        self.movement = None;
    }

    /// Squared distance to a point.
    pub fn distance_sq(&self, to: Vec2) -> f64 {
        (self.pos - to).length_sq()
    }
}

// ── Agent ──

#[derive(Clone, Debug)]
pub enum Agent {
    Player(Player),
    Adversary(Adversary),
}

impl Agent {
    pub fn position(&self) -> Vec2 {
        match self {
            Agent::Player(p) => p.pos,
            Agent::Adversary(a) => a.pos,
        }
    }

    pub fn as_adversary(&self) -> Option<&Adversary> {
        match self {
            Agent::Adversary(a) => Some(a),
            Agent::Player(_) => None,
        }
    }

    pub fn as_adversary_mut(&mut self) -> Option<&mut Adversary> {
        match self {
            Agent::Adversary(a) => Some(a),
            Agent::Player(_) => None,
        }
    }
}
