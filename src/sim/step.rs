/// Advancing the game: scheduler dispatch, the per-tick animate pass,
/// spawning, and the terminal win/lose transitions.
///
/// Animate order:
///   1. Waypoint, home, player: update then render (player may win here)
///   2. Enemies in spawn order: update then render
///   3. Collision scan, first hit loses (skipped once the game is over)
///
/// The enemy registry is only appended from `spawn_enemy`, which runs as
/// its own scheduled task, never in the middle of an animate pass.

use crate::domain::canvas::Ink;
use crate::domain::enemy::{Enemy, Surroundings};
use crate::domain::entity::PlayerStep;
use super::event::GameEvent;
use super::scheduler::Task;
use super::world::{Phase, TurtleAdventureGame};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

/// Run every task due up to virtual time `now_ms`, in due order.
pub fn advance(world: &mut TurtleAdventureGame, now_ms: u64) -> Vec<GameEvent> {
    let mut events = Vec::new();
    while let Some(task) = world.scheduler.pop_due(now_ms) {
        match task {
            Task::Animate => {
                animate(world, &mut events);
                let clock = world.clock();
                world.scheduler.arm(&clock, Task::Animate);
            }
            Task::SpawnEnemy => {
                spawn_enemy(world, &mut events);
                world.generator.schedule(&mut world.scheduler);
            }
        }
    }
    events
}

// ══════════════════════════════════════════════════════════════
// Animate
// ══════════════════════════════════════════════════════════════

pub fn animate(world: &mut TurtleAdventureGame, events: &mut Vec<GameEvent>) {
    if !world.is_running() { return; }
    world.tick += 1;
    tracing::trace!(tick = world.tick, enemies = world.enemies.len(), "animate");

    world.waypoint.update();
    world.waypoint.render(&mut world.canvas);
    world.home.update();
    world.home.render(&mut world.canvas);

    match world.player.update(&world.home, &mut world.waypoint) {
        PlayerStep::ArrivedHome => game_over_win(world, events),
        PlayerStep::ReachedWaypoint => events.push(GameEvent::WaypointReached),
        PlayerStep::Moved | PlayerStep::Idle => {}
    }
    world.player.render(&mut world.canvas);

    let around = Surroundings { player: world.player.position(), bounds: world.bounds };
    for enemy in world.enemies.iter_mut() {
        enemy.update(&around, &mut world.rng);
        enemy.render(&mut world.canvas);
    }

    if !world.is_running() { return; }
    let player = world.player.position();
    let player_size = world.player.size();
    let culprit = world.enemies.iter()
        .find(|e| e.hits_player(player, player_size))
        .map(|e| e.id);
    if let Some(id) = culprit {
        game_over_lose(world, id, events);
    }
}

// ══════════════════════════════════════════════════════════════
// Enemies
// ══════════════════════════════════════════════════════════════

/// One generator firing: build, create on the canvas, register.
pub fn spawn_enemy(world: &mut TurtleAdventureGame, events: &mut Vec<GameEvent>) {
    if !world.is_running() { return; }
    let id = world.enemy_seq;
    world.enemy_seq += 1;

    let mut enemy = world.generator.spawn(id, world.bounds, &mut world.rng);
    enemy.create(&mut world.canvas);
    let kind = enemy.kind();
    tracing::debug!(
        id,
        kind = kind.name(),
        x = enemy.pos.x,
        y = enemy.pos.y,
        level = world.generator.level(),
        "enemy spawned"
    );
    if add_enemy(world, enemy) {
        events.push(GameEvent::EnemySpawned { id, kind });
    }
}

/// Append to the registry (and so to the update/render pass).
/// Refused once the game is over; the enemy's canvas item is released.
pub fn add_enemy(world: &mut TurtleAdventureGame, mut enemy: Enemy) -> bool {
    if !world.is_running() {
        enemy.delete(&mut world.canvas);
        return false;
    }
    world.enemies.push(enemy);
    true
}

// ══════════════════════════════════════════════════════════════
// Game over
// ══════════════════════════════════════════════════════════════

/// Running → `outcome`, cancelling both timer chains. Returns false when
/// the game had already stopped.
pub fn stop(world: &mut TurtleAdventureGame, outcome: Phase) -> bool {
    if !world.is_running() || outcome == Phase::Running { return false; }
    world.phase = outcome;
    world.scheduler.halt();
    world.generator.stand_down();
    true
}

pub fn game_over_win(world: &mut TurtleAdventureGame, events: &mut Vec<GameEvent>) {
    if !stop(world, Phase::Won) { return; }
    tracing::info!(tick = world.tick, enemies = world.enemies.len(), "player reached home");
    show_banner(world, "You Win", Ink::Green);
    events.push(GameEvent::Won);
}

pub fn game_over_lose(world: &mut TurtleAdventureGame, enemy: usize, events: &mut Vec<GameEvent>) {
    if !stop(world, Phase::Lost) { return; }
    tracing::info!(tick = world.tick, enemy, enemies = world.enemies.len(), "player caught");
    show_banner(world, "You Lose", Ink::Red);
    events.push(GameEvent::Lost { enemy });
}

fn show_banner(world: &mut TurtleAdventureGame, text: &str, ink: Ink) {
    let at = world.bounds.center();
    world.end_banner = Some(world.canvas.create_text(at, text, ink));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameParams;
    use crate::domain::enemy::{Behavior, EnemyKind};
    use crate::domain::geometry::Position;
    use crate::sim::scheduler::{GameClock, MAX_CATCHUP_TICKS};
    use crate::sim::spawner::{GeneratorState, SpawnPolicy};
    use std::time::Duration;

    fn game() -> TurtleAdventureGame {
        TurtleAdventureGame::new(GameParams::default(), 42)
    }

    fn parked_enemy(world: &mut TurtleAdventureGame, kind: EnemyKind, at: Position) -> Enemy {
        let id = world.enemy_seq;
        world.enemy_seq += 1;
        let mut e = Enemy::spawn(id, kind, 20.0, world.bounds, &mut world.rng);
        e.pos = at;
        e.behavior = match kind {
            EnemyKind::Demo => Behavior::Demo { vx: 0.0, vy: 0.0 },
            _ => Behavior::Plain,
        };
        e.create(&mut world.canvas);
        e
    }

    /// Park the player out of reach so random spawns cannot end the game.
    fn out_of_reach(world: &mut TurtleAdventureGame) {
        world.player.set_position(Position::new(-1_000.0, -1_000.0));
    }

    #[test]
    fn first_spawn_at_level_interval() {
        let mut w = game();
        out_of_reach(&mut w);
        let events = advance(&mut w, 899);
        assert!(events.is_empty());
        assert!(w.enemies.is_empty());

        let events = advance(&mut w, 900);
        assert_eq!(events, vec![GameEvent::EnemySpawned { id: 0, kind: EnemyKind::RandomWalk }]);
        assert_eq!(w.enemies.len(), 1);
        assert!(w.enemies[0].canvas_item().is_some());
        assert_eq!(w.generator.state(), GeneratorState::Scheduled);
    }

    #[test]
    fn spawn_chain_rearms_with_fresh_interval() {
        let mut w = game();
        out_of_reach(&mut w);
        advance(&mut w, 900);
        assert_eq!(w.enemies.len(), 1);

        // Already armed for 900 ms; the new level picks the kind at firing
        // time and the interval from the next re-arm on.
        w.set_level(7);
        advance(&mut w, 1_799);
        assert_eq!(w.enemies.len(), 1);
        let events = advance(&mut w, 1_800);
        assert!(events.contains(&GameEvent::EnemySpawned { id: 1, kind: EnemyKind::Chasing }));
        advance(&mut w, 2_099);
        assert_eq!(w.enemies.len(), 2);
        advance(&mut w, 2_100);
        assert_eq!(w.enemies.len(), 3);
    }

    #[test]
    fn one_enemy_per_firing_in_spawn_order() {
        let mut params = GameParams::default();
        params.level = 10;
        params.spawn = SpawnPolicy::Fixed(EnemyKind::Plain);
        let mut w = TurtleAdventureGame::new(params, 3);
        out_of_reach(&mut w);
        advance(&mut w, 3_000);
        assert_eq!(w.enemies.len(), 10);
        let ids: Vec<usize> = w.enemies.iter().map(|e| e.id).collect();
        assert_eq!(ids, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn animate_ticks_at_frame_rate() {
        let mut w = game();
        advance(&mut w, 300);
        assert_eq!(w.tick, 10);
    }

    #[test]
    fn player_walks_to_click() {
        let mut w = game();
        w.click(100.0, 250.0);
        let events = advance(&mut w, 30 * 10);
        assert!(events.contains(&GameEvent::WaypointReached));
        assert!(!w.waypoint.is_active());
        assert!((w.player.position().x - 100.0).abs() < 1e-9);
    }

    #[test]
    fn player_at_home_wins_on_next_tick_and_ignores_collisions() {
        let mut w = game();
        let home = w.home.pos;
        w.player.set_position(home);
        assert!(w.home.contains(home.x, home.y));
        let enemy = parked_enemy(&mut w, EnemyKind::Plain, home);
        assert!(add_enemy(&mut w, enemy));

        let mut events = Vec::new();
        animate(&mut w, &mut events);
        assert_eq!(w.phase, Phase::Won);
        assert_eq!(events, vec![GameEvent::Won]);
        assert_eq!(w.canvas.texts(), vec!["You Win"]);

        // Nothing fires afterwards.
        assert_eq!(w.scheduler.pending(), 0);
        assert_eq!(w.generator.state(), GeneratorState::Idle);
        assert!(advance(&mut w, 100_000).is_empty());
        assert_eq!(w.tick, 1);
    }

    #[test]
    fn collision_loses_and_blames_first_enemy() {
        let mut w = game();
        let p = w.player.position();
        let far = parked_enemy(&mut w, EnemyKind::Plain, Position::new(400.0, 50.0));
        let first = parked_enemy(&mut w, EnemyKind::Plain, p);
        let second = parked_enemy(&mut w, EnemyKind::Plain, p);
        let first_id = first.id;
        add_enemy(&mut w, far);
        add_enemy(&mut w, first);
        add_enemy(&mut w, second);

        let mut events = Vec::new();
        animate(&mut w, &mut events);
        assert_eq!(w.phase, Phase::Lost);
        assert_eq!(events, vec![GameEvent::Lost { enemy: first_id }]);
        assert_eq!(w.canvas.texts(), vec!["You Lose"]);
    }

    #[test]
    fn demo_enemy_uses_circle_collision_in_game() {
        let mut w = game();
        let p = w.player.position();
        // 14 away: inside (20 + 10) / 2 but outside the 10-unit square.
        let demo = parked_enemy(&mut w, EnemyKind::Demo, Position::new(p.x + 14.0, p.y));
        add_enemy(&mut w, demo);
        let mut events = Vec::new();
        animate(&mut w, &mut events);
        assert_eq!(w.phase, Phase::Lost);
    }

    #[test]
    fn game_over_handlers_are_idempotent() {
        let mut w = game();
        let mut events = Vec::new();
        game_over_lose(&mut w, 0, &mut events);
        game_over_lose(&mut w, 0, &mut events);
        game_over_win(&mut w, &mut events);
        assert_eq!(w.phase, Phase::Lost);
        assert_eq!(events.len(), 1);
        assert_eq!(w.canvas.texts(), vec!["You Lose"]);
        assert!(!stop(&mut w, Phase::Won));
    }

    #[test]
    fn registry_frozen_after_game_over() {
        let mut w = game();
        let mut events = Vec::new();
        game_over_win(&mut w, &mut events);
        let items = w.canvas.len();
        let late = parked_enemy(&mut w, EnemyKind::Plain, Position::new(10.0, 10.0));
        assert!(!add_enemy(&mut w, late));
        assert!(w.enemies.is_empty());
        assert_eq!(w.canvas.len(), items, "refused enemy releases its canvas item");

        spawn_enemy(&mut w, &mut events);
        assert!(w.enemies.is_empty());
    }

    #[test]
    fn clicks_ignored_after_game_over() {
        let mut w = game();
        let mut events = Vec::new();
        game_over_lose(&mut w, 0, &mut events);
        w.click(10.0, 10.0);
        assert!(!w.waypoint.is_active());
    }

    #[test]
    fn invisible_stealth_enemy_still_ends_the_game() {
        let mut w = game();
        let p = w.player.position();
        let mut e = parked_enemy(&mut w, EnemyKind::Plain, p);
        let mut cloak = crate::domain::enemy::Cloak::new();
        cloak.visible = false;
        cloak.timer = 0;
        e.behavior = Behavior::Stealth(cloak);
        add_enemy(&mut w, e);

        let mut events = Vec::new();
        animate(&mut w, &mut events);
        assert!(!w.enemies[0].is_visible());
        assert_eq!(w.phase, Phase::Lost);
    }

    #[test]
    fn stalled_frame_runs_a_bounded_number_of_ticks() {
        let mut w = game();
        let mut clock = GameClock::new(w.params.tick_rate_ms);
        let now = clock.advance(Duration::from_secs(3));
        advance(&mut w, now);
        assert_eq!(w.tick, MAX_CATCHUP_TICKS);
        assert!(w.enemies.is_empty(), "no spawn burst after a stall");
    }

    #[test]
    fn same_seed_replays_identically() {
        let run = |seed| {
            let mut w = TurtleAdventureGame::new(GameParams::default(), seed);
            out_of_reach(&mut w);
            advance(&mut w, 5_000);
            w.enemies.iter().map(|e| (e.pos.x, e.pos.y)).collect::<Vec<_>>()
        };
        assert_eq!(run(9), run(9));
        assert_eq!(run(9).len(), 5);
    }
}
