/// Enemy generator: a timed chain that drops one enemy per firing.
///
/// The spawn interval and the enemy tier both derive from `level`, read
/// fresh every time the chain re-arms, so a level change takes effect on
/// the next spawn.

use rand::Rng;

use crate::domain::enemy::{Enemy, EnemyKind};
use crate::domain::geometry::Bounds;
use super::scheduler::{Recurring, Scheduler, Task};

const BASE_INTERVAL_MS: u64 = 1000;
const INTERVAL_STEP_MS: u64 = 100;
/// Spawn interval never drops below this.
pub const MIN_INTERVAL_MS: u64 = 300;

/// Which enemy a firing produces.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpawnPolicy {
    /// Level decides: RandomWalk below 5, Chasing below 10, Stealth after.
    Tiered,
    /// Always the same kind (practice / showcase games).
    Fixed(EnemyKind),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GeneratorState {
    Idle,
    Scheduled,
}

#[derive(Clone, Debug)]
pub struct EnemyGenerator {
    level: u32,
    policy: SpawnPolicy,
    enemy_size: f64,
    state: GeneratorState,
}

impl EnemyGenerator {
    pub fn new(level: u32, policy: SpawnPolicy, enemy_size: f64) -> Self {
        EnemyGenerator { level, policy, enemy_size, state: GeneratorState::Idle }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    #[allow(dead_code)]
    pub fn state(&self) -> GeneratorState {
        self.state
    }

    pub fn interval_ms(&self) -> u64 {
        let cut = (self.level as u64).saturating_mul(INTERVAL_STEP_MS);
        BASE_INTERVAL_MS.saturating_sub(cut).max(MIN_INTERVAL_MS)
    }

    pub fn select_kind(&self) -> EnemyKind {
        match self.policy {
            SpawnPolicy::Fixed(kind) => kind,
            SpawnPolicy::Tiered => tier_for_level(self.level),
        }
    }

    /// Register the next firing. Stays idle if the scheduler is halted.
    pub fn schedule(&mut self, scheduler: &mut Scheduler) {
        let armed = scheduler.arm(&*self, Task::SpawnEnemy);
        self.state = if armed {
            GeneratorState::Scheduled
        } else {
            GeneratorState::Idle
        };
    }

    /// Build the enemy for this firing. The caller adds it to the game
    /// and re-arms the chain.
    pub fn spawn<R: Rng + ?Sized>(&self, id: usize, bounds: Bounds, rng: &mut R) -> Enemy {
        Enemy::spawn(id, self.select_kind(), self.enemy_size, bounds, rng)
    }

    /// The owning game stopped; nothing is pending any more.
    pub fn stand_down(&mut self) {
        self.state = GeneratorState::Idle;
    }
}

impl Recurring for EnemyGenerator {
    fn next_delay_ms(&self) -> u64 {
        self.interval_ms()
    }
}

pub fn tier_for_level(level: u32) -> EnemyKind {
    if level < 5 {
        EnemyKind::RandomWalk
    } else if level < 10 {
        EnemyKind::Chasing
    } else {
        EnemyKind::Stealth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tiered(level: u32) -> EnemyGenerator {
        EnemyGenerator::new(level, SpawnPolicy::Tiered, 20.0)
    }

    #[test]
    fn interval_shrinks_with_level_down_to_floor() {
        assert_eq!(tiered(0).interval_ms(), 1000);
        assert_eq!(tiered(1).interval_ms(), 900);
        assert_eq!(tiered(6).interval_ms(), 400);
        assert_eq!(tiered(7).interval_ms(), 300);
        assert_eq!(tiered(8).interval_ms(), 300);
        assert_eq!(tiered(20).interval_ms(), 300);
        assert_eq!(tiered(u32::MAX).interval_ms(), MIN_INTERVAL_MS);
    }

    #[test]
    fn interval_is_monotonic_non_increasing() {
        let mut prev = u64::MAX;
        for level in 0..50 {
            let i = tiered(level).interval_ms();
            assert!(i <= prev);
            assert!(i >= MIN_INTERVAL_MS);
            prev = i;
        }
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(tiered(1).select_kind(), EnemyKind::RandomWalk);
        assert_eq!(tiered(3).select_kind(), EnemyKind::RandomWalk);
        assert_eq!(tiered(4).select_kind(), EnemyKind::RandomWalk);
        assert_eq!(tiered(5).select_kind(), EnemyKind::Chasing);
        assert_eq!(tiered(7).select_kind(), EnemyKind::Chasing);
        assert_eq!(tiered(9).select_kind(), EnemyKind::Chasing);
        assert_eq!(tiered(10).select_kind(), EnemyKind::Stealth);
        assert_eq!(tiered(15).select_kind(), EnemyKind::Stealth);
    }

    #[test]
    fn fixed_policy_ignores_level() {
        let g = EnemyGenerator::new(12, SpawnPolicy::Fixed(EnemyKind::Demo), 20.0);
        assert_eq!(g.select_kind(), EnemyKind::Demo);
    }

    #[test]
    fn level_change_applies_to_next_interval() {
        let mut g = tiered(1);
        g.set_level(5);
        assert_eq!(g.level(), 5);
        assert_eq!(g.interval_ms(), 500);
        assert_eq!(g.select_kind(), EnemyKind::Chasing);
    }

    #[test]
    fn schedule_arms_one_spawn_at_interval() {
        let mut s = Scheduler::new();
        let mut g = tiered(1);
        assert_eq!(g.state(), GeneratorState::Idle);
        g.schedule(&mut s);
        assert_eq!(g.state(), GeneratorState::Scheduled);
        assert_eq!(s.pop_due(899), None);
        assert_eq!(s.pop_due(900), Some(Task::SpawnEnemy));
    }

    #[test]
    fn schedule_on_halted_scheduler_stays_idle() {
        let mut s = Scheduler::new();
        s.halt();
        let mut g = tiered(1);
        g.schedule(&mut s);
        assert_eq!(g.state(), GeneratorState::Idle);
    }

    #[test]
    fn spawn_builds_selected_kind() {
        let mut rng = StdRng::seed_from_u64(21);
        let e = tiered(11).spawn(4, Bounds::new(800, 500), &mut rng);
        assert_eq!(e.kind(), EnemyKind::Stealth);
        assert_eq!(e.id, 4);
        assert_eq!(e.size, 20.0);
    }
}
