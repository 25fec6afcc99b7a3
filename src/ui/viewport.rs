/// Viewport: maps world coordinates onto a rectangle of terminal cells.
///
/// The playfield is stretched to fill the area it is given; each cell
/// covers `world.width / cols` by `world.height / rows` world units.
/// Clicks map back to the world at the center of the clicked cell.

use crate::domain::geometry::{Bounds, Position};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Terminal column of the playfield's left edge
    pub col0: usize,
    /// Terminal row of the playfield's top edge
    pub row0: usize,
    pub cols: usize,
    pub rows: usize,
    pub world: Bounds,
}

impl Viewport {
    pub fn new(col0: usize, row0: usize, cols: usize, rows: usize, world: Bounds) -> Self {
        Viewport { col0, row0, cols: cols.max(1), rows: rows.max(1), world }
    }

    fn cell_w(&self) -> f64 {
        self.world.width as f64 / self.cols as f64
    }

    fn cell_h(&self) -> f64 {
        self.world.height as f64 / self.rows as f64
    }

    /// Unclipped column index (relative to the playfield) for world x.
    pub fn col_of(&self, x: f64) -> i64 {
        (x / self.cell_w()).floor() as i64
    }

    /// Unclipped row index (relative to the playfield) for world y.
    pub fn row_of(&self, y: f64) -> i64 {
        (y / self.cell_h()).floor() as i64
    }

    /// World position at the center of playfield cell (col, row).
    pub fn cell_center(&self, col: i64, row: i64) -> Position {
        Position::new(
            (col as f64 + 0.5) * self.cell_w(),
            (row as f64 + 0.5) * self.cell_h(),
        )
    }

    /// Is a playfield-relative cell inside the viewport?
    pub fn contains_cell(&self, col: i64, row: i64) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.cols && (row as usize) < self.rows
    }

    /// Terminal cell of a world position, if visible.
    #[allow(dead_code)]
    pub fn to_screen(&self, pos: Position) -> Option<(usize, usize)> {
        let (c, r) = (self.col_of(pos.x), self.row_of(pos.y));
        if self.contains_cell(c, r) {
            Some((self.col0 + c as usize, self.row0 + r as usize))
        } else {
            None
        }
    }

    /// World position under a terminal cell, if it is on the playfield.
    pub fn to_world(&self, column: u16, row: u16) -> Option<Position> {
        let c = column as i64 - self.col0 as i64;
        let r = row as i64 - self.row0 as i64;
        if self.contains_cell(c, r) {
            Some(self.cell_center(c, r))
        } else {
            None
        }
    }
}
