/// Events emitted while the scheduler advances.
/// The presentation layer consumes these for sound and the HUD.

use crate::domain::enemy::EnemyKind;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    EnemySpawned { id: usize, kind: EnemyKind },
    WaypointReached,
    Won,
    Lost { enemy: usize },
}
