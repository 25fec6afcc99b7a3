/// TurtleAdventureGame: the complete state of one running game.
///
/// Owns the singleton elements (waypoint, home, player), the enemy
/// registry, the enemy generator, the timer queue, the drawing surface and
/// the seeded random source. All mutation happens from `step`, one
/// scheduled task at a time.
///
/// Element registration order (which is also update/render order):
/// waypoint, home, player, then enemies in spawn order.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GameParams;
use crate::domain::canvas::{Canvas, ItemId};
use crate::domain::enemy::Enemy;
use crate::domain::entity::{Home, Player, Waypoint};
use crate::domain::geometry::{Bounds, Position};
use crate::domain::motion::Turtle;
use super::scheduler::{FrameClock, Scheduler, Task};
use super::spawner::EnemyGenerator;

/// Home sits this far from the right edge.
const HOME_INSET: f64 = 100.0;
/// Player starts this far from the left edge.
const PLAYER_INSET: f64 = 50.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Running,
    Won,
    Lost,
}

pub struct TurtleAdventureGame {
    pub params: GameParams,
    pub seed: u64,
    pub level: u32,
    pub bounds: Bounds,

    // ── Elements ──
    pub waypoint: Waypoint,
    pub home: Home,
    pub player: Player<Turtle>,
    /// Spawn order. Only grows while running.
    pub enemies: Vec<Enemy>,

    // ── Machinery ──
    pub generator: EnemyGenerator,
    pub scheduler: Scheduler,
    pub canvas: Canvas,
    pub rng: StdRng,

    // ── Meta ──
    pub phase: Phase,
    pub tick: u64,
    pub enemy_seq: usize,
    pub end_banner: Option<ItemId>,
}

impl TurtleAdventureGame {
    /// Build the playfield, create every element on the canvas and arm
    /// both timer chains (animation and enemy spawning).
    pub fn new(params: GameParams, seed: u64) -> Self {
        let bounds = params.bounds;
        let mid_y = (bounds.height / 2) as f64;
        let home = Home::new(Position::new(bounds.width as f64 - HOME_INSET, mid_y), params.home_size);
        let player = Player::new(
            Turtle::new(Position::new(PLAYER_INSET, mid_y)),
            params.player_speed,
            params.player_size,
        );
        let generator = EnemyGenerator::new(params.level, params.spawn, params.enemy_size);

        let mut world = TurtleAdventureGame {
            level: params.level,
            bounds,
            seed,
            waypoint: Waypoint::new(),
            home,
            player,
            enemies: Vec::new(),
            generator,
            scheduler: Scheduler::new(),
            canvas: Canvas::new(),
            rng: StdRng::seed_from_u64(seed),
            phase: Phase::Running,
            tick: 0,
            enemy_seq: 0,
            end_banner: None,
            params,
        };

        world.waypoint.create(&mut world.canvas);
        world.home.create(&mut world.canvas);
        world.player.create(&mut world.canvas);

        let clock = world.clock();
        world.scheduler.arm(&clock, Task::Animate);
        world.generator.schedule(&mut world.scheduler);

        tracing::info!(
            seed,
            level = world.level,
            width = bounds.width,
            height = bounds.height,
            "game started"
        );
        world
    }

    pub fn clock(&self) -> FrameClock {
        FrameClock { period_ms: self.params.tick_rate_ms }
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Pointer click in world coordinates: (re)target the waypoint.
    pub fn click(&mut self, x: f64, y: f64) {
        if !self.is_running() { return; }
        self.waypoint.activate(x, y);
        tracing::debug!(x, y, "waypoint set");
    }

    /// Change difficulty. The generator picks it up on its next re-arm.
    pub fn set_level(&mut self, level: u32) {
        let level = level.max(1);
        self.level = level;
        self.generator.set_level(level);
        tracing::debug!(level, "level changed");
    }

    /// Virtual time of the game, in milliseconds since start.
    pub fn elapsed_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::spawner::GeneratorState;

    #[test]
    fn new_game_layout() {
        let w = TurtleAdventureGame::new(GameParams::default(), 1);
        assert_eq!(w.home.pos, Position::new(700.0, 250.0));
        assert_eq!(w.home.size(), 20.0);
        assert_eq!(w.player.position(), Position::new(50.0, 250.0));
        assert!(!w.waypoint.is_active());
        assert!(w.enemies.is_empty());
        assert_eq!(w.phase, Phase::Running);
        // waypoint cross (2) + home + player
        assert_eq!(w.canvas.len(), 4);
    }

    #[test]
    fn both_chains_armed_on_construction() {
        let w = TurtleAdventureGame::new(GameParams::default(), 1);
        assert!(w.scheduler.is_pending(Task::Animate));
        assert!(w.scheduler.is_pending(Task::SpawnEnemy));
        assert_eq!(w.generator.state(), GeneratorState::Scheduled);
    }

    #[test]
    fn click_activates_waypoint() {
        let mut w = TurtleAdventureGame::new(GameParams::default(), 1);
        w.click(120.0, 80.0);
        assert!(w.waypoint.is_active());
        assert_eq!(w.waypoint.pos, Position::new(120.0, 80.0));
    }

    #[test]
    fn set_level_reaches_generator_and_clamps() {
        let mut w = TurtleAdventureGame::new(GameParams::default(), 1);
        w.set_level(6);
        assert_eq!(w.generator.level(), 6);
        assert_eq!(w.generator.interval_ms(), 400);
        w.set_level(0);
        assert_eq!(w.level, 1);
    }
}
