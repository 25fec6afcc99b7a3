/// Singleton entities: Waypoint, Home, Player.
///
/// Each follows the element lifecycle used by the game loop:
/// `create` (allocate canvas items) → `update` → `render` → `delete`.

use super::canvas::{Canvas, Ink, ItemId};
use super::geometry::Position;
use super::motion::{MotionTarget, Turtle};

/// Half-length of each stroke of the waypoint cross.
const CROSS_ARM: f64 = 10.0;

// ── Waypoint ──

/// The point the player is currently walking to.
/// Inactive until the first click; the player deactivates it on arrival.
#[derive(Clone, Debug, Default)]
pub struct Waypoint {
    pub pos: Position,
    active: bool,
    strokes: Option<(ItemId, ItemId)>,
}

impl Waypoint {
    pub fn new() -> Self {
        Waypoint::default()
    }

    pub fn activate(&mut self, x: f64, y: f64) {
        self.active = true;
        self.pos = Position::new(x, y);
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn create(&mut self, canvas: &mut Canvas) {
        let a = canvas.create_line(Ink::Green);
        let b = canvas.create_line(Ink::Green);
        self.strokes = Some((a, b));
    }

    /// A waypoint never moves by itself.
    pub fn update(&mut self) {}

    pub fn render(&self, canvas: &mut Canvas) {
        let Some((a, b)) = self.strokes else { return };
        if self.active {
            let Position { x, y } = self.pos;
            canvas.set_visible(a, true);
            canvas.set_visible(b, true);
            canvas.raise(a);
            canvas.raise(b);
            canvas.set_coords(a, [x - CROSS_ARM, y - CROSS_ARM, x + CROSS_ARM, y + CROSS_ARM]);
            canvas.set_coords(b, [x - CROSS_ARM, y + CROSS_ARM, x + CROSS_ARM, y - CROSS_ARM]);
        } else {
            canvas.set_visible(a, false);
            canvas.set_visible(b, false);
        }
    }

    #[allow(dead_code)]
    pub fn delete(&mut self, canvas: &mut Canvas) {
        if let Some((a, b)) = self.strokes.take() {
            canvas.delete(a);
            canvas.delete(b);
        }
    }
}

// ── Home ──

/// Square goal region. `size` is the full side length.
#[derive(Clone, Debug)]
pub struct Home {
    pub pos: Position,
    size: f64,
    item: Option<ItemId>,
}

impl Home {
    pub fn new(pos: Position, size: f64) -> Self {
        Home { pos, size, item: None }
    }

    #[allow(dead_code)]
    pub fn size(&self) -> f64 {
        self.size
    }

    #[allow(dead_code)]
    pub fn set_size(&mut self, size: f64) {
        self.size = size;
    }

    /// Closed square test: points on any edge count as inside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let half = self.size / 2.0;
        let (x1, x2) = (self.pos.x - half, self.pos.x + half);
        let (y1, y2) = (self.pos.y - half, self.pos.y + half);
        x1 <= x && x <= x2 && y1 <= y && y <= y2
    }

    fn bbox(&self) -> [f64; 4] {
        let half = self.size / 2.0;
        [self.pos.x - half, self.pos.y - half, self.pos.x + half, self.pos.y + half]
    }

    pub fn create(&mut self, canvas: &mut Canvas) {
        self.item = Some(canvas.create_rectangle(self.bbox(), Ink::Brown, false));
    }

    pub fn update(&mut self) {}

    pub fn render(&self, canvas: &mut Canvas) {
        if let Some(id) = self.item {
            canvas.set_coords(id, self.bbox());
        }
    }

    #[allow(dead_code)]
    pub fn delete(&mut self, canvas: &mut Canvas) {
        if let Some(id) = self.item.take() {
            canvas.delete(id);
        }
    }
}

// ── Player ──

/// Outcome of one player update, consumed by the game loop.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlayerStep {
    /// Player stands inside Home: the game is won.
    ArrivedHome,
    /// Advanced toward the waypoint, still en route.
    Moved,
    /// Advanced and got within one step of the waypoint, which is now inactive.
    ReachedWaypoint,
    /// No active waypoint.
    Idle,
}

/// The turtle. Coordinates live in the motion backing object only.
#[derive(Clone, Debug)]
pub struct Player<M: MotionTarget = Turtle> {
    motion: M,
    speed: f64,
    size: f64,
    item: Option<ItemId>,
}

impl<M: MotionTarget> Player<M> {
    pub fn new(motion: M, speed: f64, size: f64) -> Self {
        Player { motion, speed, size, item: None }
    }

    pub fn position(&self) -> Position {
        self.motion.position()
    }

    #[allow(dead_code)]
    pub fn set_position(&mut self, pos: Position) {
        self.motion.set_position(pos);
    }

    #[allow(dead_code)]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[allow(dead_code)]
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn update(&mut self, home: &Home, waypoint: &mut Waypoint) -> PlayerStep {
        let here = self.motion.position();
        if home.contains(here.x, here.y) {
            return PlayerStep::ArrivedHome;
        }
        if !waypoint.is_active() {
            return PlayerStep::Idle;
        }

        self.motion.turn_toward(waypoint.pos);
        self.motion.advance(self.speed);
        // Snap arrival: within one step counts as there, even after an overshoot.
        if self.motion.distance_to(waypoint.pos) < self.speed {
            waypoint.deactivate();
            PlayerStep::ReachedWaypoint
        } else {
            PlayerStep::Moved
        }
    }

    pub fn create(&mut self, canvas: &mut Canvas) {
        self.item = Some(canvas.create_glyph(self.position(), '@', Ink::Green));
    }

    pub fn render(&self, canvas: &mut Canvas) {
        if let Some(id) = self.item {
            let Position { x, y } = self.position();
            canvas.set_coords(id, [x, y, x, y]);
            canvas.raise(id);
        }
    }

    #[allow(dead_code)]
    pub fn delete(&mut self, canvas: &mut Canvas) {
        if let Some(id) = self.item.take() {
            canvas.delete(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_at(x: f64, y: f64) -> Player {
        Player::new(Turtle::new(Position::new(x, y)), 5.0, 10.0)
    }

    #[test]
    fn home_contains_is_inclusive_on_every_edge() {
        let home = Home::new(Position::new(100.0, 50.0), 20.0);
        assert!(home.contains(90.0, 50.0));   // left edge
        assert!(home.contains(110.0, 50.0));  // right edge
        assert!(home.contains(100.0, 40.0));  // top edge
        assert!(home.contains(100.0, 60.0));  // bottom edge
        assert!(home.contains(90.0, 40.0));   // corner
        assert!(!home.contains(89.99, 50.0));
        assert!(!home.contains(100.0, 60.01));
    }

    #[test]
    fn home_resize_changes_region() {
        let mut home = Home::new(Position::new(0.0, 0.0), 20.0);
        assert!(!home.contains(15.0, 0.0));
        home.set_size(40.0);
        assert_eq!(home.size(), 40.0);
        assert!(home.contains(15.0, 0.0));
    }

    #[test]
    fn waypoint_state_tracks_latest_call() {
        let mut wp = Waypoint::new();
        assert!(!wp.is_active());
        wp.activate(3.0, 4.0);
        assert!(wp.is_active());
        assert_eq!(wp.pos, Position::new(3.0, 4.0));
        wp.deactivate();
        assert!(!wp.is_active());
        wp.deactivate();
        assert!(!wp.is_active());
        wp.activate(1.0, 1.0);
        assert!(wp.is_active());
    }

    #[test]
    fn waypoint_render_hides_cross_when_inactive() {
        let mut canvas = Canvas::new();
        let mut wp = Waypoint::new();
        wp.create(&mut canvas);
        wp.render(&mut canvas);
        assert!(canvas.stacked().iter().all(|i| !i.visible));

        wp.activate(50.0, 50.0);
        wp.render(&mut canvas);
        let items = canvas.stacked();
        assert!(items.iter().all(|i| i.visible));
        assert_eq!(items[0].coords, [40.0, 40.0, 60.0, 60.0]);
        assert_eq!(items[1].coords, [40.0, 60.0, 60.0, 40.0]);

        wp.delete(&mut canvas);
        assert_eq!(canvas.len(), 0);
    }

    #[test]
    fn player_idle_without_waypoint() {
        let home = Home::new(Position::new(500.0, 500.0), 20.0);
        let mut wp = Waypoint::new();
        let mut p = player_at(10.0, 10.0);
        assert_eq!(p.update(&home, &mut wp), PlayerStep::Idle);
        assert_eq!(p.position(), Position::new(10.0, 10.0));
    }

    #[test]
    fn player_closes_in_then_deactivates_waypoint() {
        let home = Home::new(Position::new(500.0, 500.0), 20.0);
        let mut wp = Waypoint::new();
        wp.activate(40.0, 10.0);
        let mut p = player_at(10.0, 10.0);

        let mut last = p.position().distance_to(wp.pos);
        let mut steps = 0;
        loop {
            let before = last;
            let outcome = p.update(&home, &mut wp);
            steps += 1;
            last = p.position().distance_to(wp.pos);
            assert!(last < before, "distance must shrink every tick");
            if outcome == PlayerStep::ReachedWaypoint {
                assert!(last < p.speed());
                assert!(!wp.is_active());
                break;
            }
            assert_eq!(outcome, PlayerStep::Moved);
            assert!(last >= p.speed());
            assert!(wp.is_active());
            assert!(steps < 100);
        }
        // 30 units at speed 5: the gap first drops below 5 on the sixth step
        assert_eq!(steps, 6);
        assert_eq!(p.update(&home, &mut wp), PlayerStep::Idle);
    }

    #[test]
    fn player_inside_home_reports_arrival_and_stays_put() {
        let home = Home::new(Position::new(100.0, 100.0), 20.0);
        let mut wp = Waypoint::new();
        wp.activate(0.0, 0.0);
        let mut p = player_at(100.0, 100.0);
        assert_eq!(p.update(&home, &mut wp), PlayerStep::ArrivedHome);
        assert_eq!(p.position(), Position::new(100.0, 100.0));
        assert!(wp.is_active());
    }

    #[test]
    fn player_speed_is_adjustable() {
        let home = Home::new(Position::new(500.0, 500.0), 20.0);
        let mut wp = Waypoint::new();
        wp.activate(100.0, 0.0);
        let mut p = player_at(0.0, 0.0);
        p.set_speed(20.0);
        p.update(&home, &mut wp);
        assert!((p.position().x - 20.0).abs() < 1e-9);
    }
}
