/// Plane geometry shared by every entity.
///
/// Screen coordinates: origin at the top-left corner, x grows right,
/// y grows down. Units are abstract "pixels"; the renderer scales them
/// to terminal cells.

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    pub fn distance_to(self, other: Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Playfield dimensions.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Bounds {
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub const fn new(width: u32, height: u32) -> Self {
        Bounds { width, height }
    }

    pub fn center(self) -> Position {
        Position::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Is `value` inside `[margin, dim - margin]` on the x axis?
    pub fn within_x(self, value: f64, margin: f64) -> bool {
        margin <= value && value <= self.width as f64 - margin
    }

    /// Is `value` inside `[margin, dim - margin]` on the y axis?
    pub fn within_y(self, value: f64, margin: f64) -> bool {
        margin <= value && value <= self.height as f64 - margin
    }
}
