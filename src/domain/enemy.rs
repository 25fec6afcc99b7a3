/// Enemies: one struct, a closed set of behaviors.
///
/// | Kind       | Movement                              | Hit test        |
/// |------------|---------------------------------------|-----------------|
/// | Plain      | none                                  | square          |
/// | Demo       | constant velocity, bounces off edges  | circle          |
/// | RandomWalk | ±5 per axis each tick                 | square          |
/// | Chasing    | 0.5 per tick straight at the player   | square          |
/// | Fencing    | ±5 per axis each tick (rectangle)     | square          |
/// | Stealth    | ±1/0 per axis, only while visible     | square (always) |
///
/// All randomness comes from the caller's RNG so that a seeded game
/// replays exactly.

use rand::Rng;

use super::canvas::{Canvas, Ink, ItemId};
use super::geometry::{Bounds, Position};

pub const RANDOM_WALK_STEP: f64 = 5.0;
pub const CHASE_STEP: f64 = 0.5;
pub const DEMO_SIZE: f64 = 20.0;
pub const DEMO_SPEED: f64 = 5.0;
pub const STEALTH_VISIBLE_TICKS: u32 = 100;
pub const STEALTH_HIDDEN_TICKS: u32 = 50;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EnemyKind {
    Plain,
    Demo,
    RandomWalk,
    Chasing,
    Fencing,
    Stealth,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 6] = [
        EnemyKind::Plain,
        EnemyKind::Demo,
        EnemyKind::RandomWalk,
        EnemyKind::Chasing,
        EnemyKind::Fencing,
        EnemyKind::Stealth,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Plain => "plain",
            EnemyKind::Demo => "demo",
            EnemyKind::RandomWalk => "random_walk",
            EnemyKind::Chasing => "chasing",
            EnemyKind::Fencing => "fencing",
            EnemyKind::Stealth => "stealth",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        EnemyKind::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn ink(self) -> Ink {
        match self {
            EnemyKind::Chasing => Ink::Blue,
            EnemyKind::Stealth => Ink::Green,
            _ => Ink::Red,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outline {
    Oval,
    Rectangle,
}

/// Visibility state machine of a stealth enemy.
#[derive(Clone, Debug)]
pub struct Cloak {
    pub visible: bool,
    pub timer: u32,
    /// Ticks spent visible before vanishing.
    pub duration: u32,
    /// Ticks spent hidden before reappearing.
    pub cooldown: u32,
}

impl Cloak {
    pub fn new() -> Self {
        Cloak {
            visible: true,
            timer: 0,
            duration: STEALTH_VISIBLE_TICKS,
            cooldown: STEALTH_HIDDEN_TICKS,
        }
    }

    fn tick(&mut self) {
        self.timer += 1;
        if self.visible && self.timer > self.duration {
            self.visible = false;
            self.timer = 0;
        } else if !self.visible && self.timer > self.cooldown {
            self.visible = true;
            self.timer = 0;
        }
    }
}

impl Default for Cloak {
    fn default() -> Self {
        Cloak::new()
    }
}

#[derive(Clone, Debug)]
pub enum Behavior {
    Plain,
    Demo { vx: f64, vy: f64 },
    RandomWalk,
    Chasing,
    Fencing,
    Stealth(Cloak),
}

/// What an enemy can see while it updates.
#[derive(Clone, Copy, Debug)]
pub struct Surroundings {
    pub player: Position,
    pub bounds: Bounds,
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: usize,
    pub pos: Position,
    pub size: f64,
    pub ink: Ink,
    pub outline: Outline,
    pub behavior: Behavior,
    canvas_item: Option<ItemId>,
}

impl Enemy {
    /// Build an enemy of `kind` at a uniformly random spot in
    /// `[size, dim - size]` on both axes.
    ///
    /// Callers must keep `size < min(width, height) / 2`; configuration
    /// validation enforces it. Demo enemies always use `DEMO_SIZE`.
    pub fn spawn<R: Rng + ?Sized>(
        id: usize,
        kind: EnemyKind,
        size: f64,
        bounds: Bounds,
        rng: &mut R,
    ) -> Self {
        let size = if kind == EnemyKind::Demo { DEMO_SIZE } else { size };
        debug_assert!(size > 0.0);
        let pos = Position::new(
            random_coord(rng, size, bounds.width),
            random_coord(rng, size, bounds.height),
        );
        let behavior = match kind {
            EnemyKind::Plain => Behavior::Plain,
            EnemyKind::Demo => Behavior::Demo {
                vx: random_sign(rng) * DEMO_SPEED,
                vy: random_sign(rng) * DEMO_SPEED,
            },
            EnemyKind::RandomWalk => Behavior::RandomWalk,
            EnemyKind::Chasing => Behavior::Chasing,
            EnemyKind::Fencing => Behavior::Fencing,
            EnemyKind::Stealth => Behavior::Stealth(Cloak::new()),
        };
        let outline = match kind {
            EnemyKind::Demo | EnemyKind::Fencing => Outline::Rectangle,
            _ => Outline::Oval,
        };
        Enemy { id, pos, size, ink: kind.ink(), outline, behavior, canvas_item: None }
    }

    pub fn kind(&self) -> EnemyKind {
        match self.behavior {
            Behavior::Plain => EnemyKind::Plain,
            Behavior::Demo { .. } => EnemyKind::Demo,
            Behavior::RandomWalk => EnemyKind::RandomWalk,
            Behavior::Chasing => EnemyKind::Chasing,
            Behavior::Fencing => EnemyKind::Fencing,
            Behavior::Stealth(_) => EnemyKind::Stealth,
        }
    }

    pub fn is_visible(&self) -> bool {
        match &self.behavior {
            Behavior::Stealth(cloak) => cloak.visible,
            _ => true,
        }
    }

    #[allow(dead_code)]
    pub fn canvas_item(&self) -> Option<ItemId> {
        self.canvas_item
    }

    pub fn update<R: Rng + ?Sized>(&mut self, around: &Surroundings, rng: &mut R) {
        match &mut self.behavior {
            Behavior::Plain => {}
            Behavior::Demo { vx, vy } => {
                self.pos.x += *vx;
                self.pos.y += *vy;
                if !around.bounds.within_x(self.pos.x, self.size) { *vx = -*vx; }
                if !around.bounds.within_y(self.pos.y, self.size) { *vy = -*vy; }
            }
            Behavior::RandomWalk | Behavior::Fencing => {
                self.pos.x += random_sign(rng) * RANDOM_WALK_STEP;
                self.pos.y += random_sign(rng) * RANDOM_WALK_STEP;
            }
            Behavior::Chasing => {
                let dx = around.player.x - self.pos.x;
                let dy = around.player.y - self.pos.y;
                let distance = (dx * dx + dy * dy).sqrt();
                if distance > 0.0 {
                    self.pos.x += dx / distance * CHASE_STEP;
                    self.pos.y += dy / distance * CHASE_STEP;
                }
            }
            Behavior::Stealth(cloak) => {
                cloak.tick();
                if cloak.visible {
                    self.pos.x += rng.gen_range(-1..=1) as f64;
                    self.pos.y += rng.gen_range(-1..=1) as f64;
                }
            }
        }
    }

    /// Collision with the player.
    ///
    /// Demo enemies treat both bodies as circles. Everything else checks
    /// whether the player's point lies strictly inside the square of
    /// half-extent `size / 2`. A hidden stealth enemy still collides.
    pub fn hits_player(&self, player: Position, player_size: f64) -> bool {
        match self.behavior {
            Behavior::Demo { .. } => {
                self.pos.distance_to(player) < (self.size + player_size) / 2.0
            }
            _ => {
                let half = self.size / 2.0;
                self.pos.x - half < player.x && player.x < self.pos.x + half
                    && self.pos.y - half < player.y && player.y < self.pos.y + half
            }
        }
    }

    fn bbox(&self) -> [f64; 4] {
        [
            self.pos.x - self.size,
            self.pos.y - self.size,
            self.pos.x + self.size,
            self.pos.y + self.size,
        ]
    }

    pub fn create(&mut self, canvas: &mut Canvas) {
        let id = match (self.outline, &self.behavior) {
            (Outline::Oval, _) => canvas.create_oval(self.bbox(), self.ink),
            (Outline::Rectangle, Behavior::Demo { .. }) => {
                canvas.create_rectangle(self.bbox(), self.ink, true)
            }
            (Outline::Rectangle, _) => canvas.create_rectangle(self.bbox(), self.ink, false),
        };
        self.canvas_item = Some(id);
    }

    pub fn render(&self, canvas: &mut Canvas) {
        let Some(id) = self.canvas_item else { return };
        canvas.set_coords(id, self.bbox());
        if let Behavior::Stealth(cloak) = &self.behavior {
            canvas.set_visible(id, cloak.visible);
        }
    }

    pub fn delete(&mut self, canvas: &mut Canvas) {
        if let Some(id) = self.canvas_item.take() {
            canvas.delete(id);
        }
    }
}

fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.gen_bool(0.5) { 1.0 } else { -1.0 }
}

/// Integer coordinate in `[size, dim - size]`. A degenerate range
/// collapses onto its lower end.
fn random_coord<R: Rng + ?Sized>(rng: &mut R, size: f64, dim: u32) -> f64 {
    let lo = size.ceil() as i64;
    let hi = (dim as f64 - size).floor() as i64;
    if hi < lo {
        return lo as f64;
    }
    rng.gen_range(lo..=hi) as f64
}
