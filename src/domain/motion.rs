/// Motion backing objects.
///
/// The player does not own its coordinates: it steers a `MotionTarget`,
/// the same way a drawing turtle is steered with heading + forward.
/// Rendering backends and tests can swap the implementation freely.

use super::geometry::Position;

pub trait MotionTarget {
    fn position(&self) -> Position;
    #[allow(dead_code)]
    fn set_position(&mut self, pos: Position);
    /// Point the heading at `target`. A coincident target yields heading 0.
    fn turn_toward(&mut self, target: Position);
    /// Move `distance` units along the current heading.
    fn advance(&mut self, distance: f64);

    fn distance_to(&self, target: Position) -> f64 {
        self.position().distance_to(target)
    }
}

/// Headless turtle: a position plus a heading in degrees.
/// Heading 0 points toward +x; 90 points toward +y (down the screen).
#[derive(Clone, Debug, Default)]
pub struct Turtle {
    pos: Position,
    heading: f64,
}

impl Turtle {
    pub fn new(pos: Position) -> Self {
        Turtle { pos, heading: 0.0 }
    }

    #[allow(dead_code)]
    pub fn heading(&self) -> f64 {
        self.heading
    }
}

impl MotionTarget for Turtle {
    fn position(&self) -> Position {
        self.pos
    }

    fn set_position(&mut self, pos: Position) {
        self.pos = pos;
    }

    fn turn_toward(&mut self, target: Position) {
        let dy = target.y - self.pos.y;
        let dx = target.x - self.pos.x;
        self.heading = dy.atan2(dx).to_degrees().rem_euclid(360.0);
    }

    fn advance(&mut self, distance: f64) {
        let rad = self.heading.to_radians();
        self.pos.x += rad.cos() * distance;
        self.pos.y += rad.sin() * distance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_and_advance_reaches_target_direction() {
        let mut t = Turtle::new(Position::new(0.0, 0.0));
        t.turn_toward(Position::new(0.0, 10.0));
        assert!((t.heading() - 90.0).abs() < 1e-9);
        t.advance(4.0);
        let p = t.position();
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 4.0).abs() < 1e-9);
    }

    #[test]
    fn heading_is_normalized() {
        let mut t = Turtle::new(Position::new(5.0, 5.0));
        t.turn_toward(Position::new(5.0, 0.0));
        assert!((t.heading() - 270.0).abs() < 1e-9);
    }

    #[test]
    fn coincident_target_keeps_zero_heading() {
        let mut t = Turtle::new(Position::new(2.0, 2.0));
        t.turn_toward(Position::new(2.0, 2.0));
        assert_eq!(t.heading(), 0.0);
    }
}
