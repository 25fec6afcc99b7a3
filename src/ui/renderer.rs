/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Rasterize the canvas into the `front` buffer (array of Cell)
///   2. Compare each cell with the `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screen layout: HUD on the top row, help on the bottom row, the
/// playfield stretched over everything in between.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::canvas::{Ink, Item, Primitive};
use crate::domain::geometry::{Bounds, Position};
use crate::sim::world::{Phase, TurtleAdventureGame};
use super::viewport::Viewport;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for the area outside the playfield. Every cell
    /// carries an explicit color so the terminal default never shows.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };
    /// Playfield background.
    const FIELD_BG: Color = Color::Rgb { r: 238, g: 232, b: 213 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

fn ink_color(ink: Ink) -> Color {
    match ink {
        Ink::Red => Color::Rgb { r: 210, g: 40, b: 40 },
        Ink::Blue => Color::Rgb { r: 40, g: 80, b: 220 },
        Ink::Green => Color::Rgb { r: 20, g: 150, b: 60 },
        Ink::Brown => Color::Rgb { r: 140, g: 85, b: 40 },
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    /// Fill a whole row with `bg`, then write `s` from column 0.
    fn put_row(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', fg, bg));
        }
        self.put_str(0, y, s, fg, bg);
    }
}

// ── Rasterizer: canvas items onto playfield cells ──

/// Plot at a playfield-relative cell, clipped to the viewport.
fn plot(buf: &mut FrameBuffer, vp: &Viewport, col: i64, row: i64, cell: Cell) {
    if vp.contains_cell(col, row) {
        buf.set(vp.col0 + col as usize, vp.row0 + row as usize, cell);
    }
}

/// Cell span of a world box, ordered so that the first corner is top-left.
fn cell_box(vp: &Viewport, c: &[f64; 4]) -> (i64, i64, i64, i64) {
    let (x1, x2) = (c[0].min(c[2]), c[0].max(c[2]));
    let (y1, y2) = (c[1].min(c[3]), c[1].max(c[3]));
    (vp.col_of(x1), vp.row_of(y1), vp.col_of(x2), vp.row_of(y2))
}

fn draw_line(buf: &mut FrameBuffer, vp: &Viewport, c: &[f64; 4], fg: Color) {
    let (c1, r1) = (vp.col_of(c[0]), vp.row_of(c[1]));
    let (c2, r2) = (vp.col_of(c[2]), vp.row_of(c[3]));
    let (dc, dr) = (c2 - c1, r2 - r1);
    let ch = match (dc.signum(), dr.signum()) {
        (_, 0) => '─',
        (0, _) => '│',
        (a, b) if a == b => '╲',
        _ => '╱',
    };
    let steps = dc.abs().max(dr.abs()).max(1) * 2;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = c[0] + (c[2] - c[0]) * t;
        let y = c[1] + (c[3] - c[1]) * t;
        plot(buf, vp, vp.col_of(x), vp.row_of(y), Cell::new(ch, fg, Cell::FIELD_BG));
    }
}

fn draw_rectangle(buf: &mut FrameBuffer, vp: &Viewport, c: &[f64; 4], ink: Color, filled: bool) {
    let (c1, r1, c2, r2) = cell_box(vp, c);
    for row in r1..=r2 {
        for col in c1..=c2 {
            let cell = if filled {
                Cell::new(' ', ink, ink)
            } else {
                let ch = match (col == c1, col == c2, row == r1, row == r2) {
                    (true, _, true, _) => '┌',
                    (_, true, true, _) => '┐',
                    (true, _, _, true) => '└',
                    (_, true, _, true) => '┘',
                    (_, _, true, _) | (_, _, _, true) => '─',
                    (true, _, _, _) | (_, true, _, _) => '│',
                    _ => continue,
                };
                Cell::new(ch, ink, Cell::FIELD_BG)
            };
            plot(buf, vp, col, row, cell);
        }
    }
}

fn draw_oval(buf: &mut FrameBuffer, vp: &Viewport, c: &[f64; 4], ink: Color) {
    let (c1, r1, c2, r2) = cell_box(vp, c);
    let (cx, cy) = ((c[0] + c[2]) / 2.0, (c[1] + c[3]) / 2.0);
    let rx = ((c[2] - c[0]) / 2.0).abs().max(f64::EPSILON);
    let ry = ((c[3] - c[1]) / 2.0).abs().max(f64::EPSILON);
    let mut painted = false;
    for row in r1..=r2 {
        for col in c1..=c2 {
            let p = vp.cell_center(col, row);
            let (nx, ny) = ((p.x - cx) / rx, (p.y - cy) / ry);
            if nx * nx + ny * ny <= 1.0 {
                plot(buf, vp, col, row, Cell::new(' ', ink, ink));
                painted = true;
            }
        }
    }
    // Smaller than a cell: still show where it is.
    if !painted {
        let center = Position::new(cx, cy);
        plot(buf, vp, vp.col_of(center.x), vp.row_of(center.y), Cell::new('●', ink, Cell::FIELD_BG));
    }
}

fn draw_text(buf: &mut FrameBuffer, vp: &Viewport, at: Position, text: &str, fg: Color) {
    let len = text.chars().count() as i64;
    let col = vp.col_of(at.x) - len / 2;
    let row = vp.row_of(at.y);
    for (i, ch) in text.chars().enumerate() {
        plot(buf, vp, col + i as i64, row, Cell::new(ch, fg, Cell::FIELD_BG));
    }
}

fn draw_item(buf: &mut FrameBuffer, vp: &Viewport, item: &Item) {
    if !item.visible { return; }
    let ink = ink_color(item.ink);
    let c = &item.coords;
    match &item.primitive {
        Primitive::Line => draw_line(buf, vp, c, ink),
        Primitive::Rectangle { filled } => draw_rectangle(buf, vp, c, ink, *filled),
        Primitive::Oval => draw_oval(buf, vp, c, ink),
        Primitive::Text(text) => draw_text(buf, vp, Position::new(c[0], c[1]), text, ink),
        Primitive::Glyph(g) => {
            plot(buf, vp, vp.col_of(c[0]), vp.row_of(c[1]), Cell::new(*g, ink, Cell::FIELD_BG));
        }
    }
}

// ── Renderer ──

/// Vertical layout
const HUD_ROW: usize = 0;
const FIELD_ROW: usize = 1;
/// HUD + help
const RESERVED_ROWS: usize = 2;

const HUD_FG: Color = Color::Rgb { r: 230, g: 230, b: 240 };
const HUD_BG: Color = Color::Rgb { r: 40, g: 40, b: 70 };
const HELP_FG: Color = Color::Rgb { r: 150, g: 150, b: 170 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(world: Bounds) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            viewport: Viewport::new(0, FIELD_ROW, 1, 1, world),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.apply_size(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Current world <-> terminal mapping, for translating clicks.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn apply_size(&mut self, tw: usize, th: usize) {
        self.term_w = tw;
        self.term_h = th;
        self.front.resize(tw, th);
        self.back.resize(tw, th);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
        let rows = th.saturating_sub(RESERVED_ROWS);
        self.viewport = Viewport::new(0, FIELD_ROW, tw, rows, self.viewport.world);
    }

    pub fn render(&mut self, game: &TurtleAdventureGame, paused: bool) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.apply_size(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }
        if self.viewport.world != game.bounds {
            self.viewport.world = game.bounds;
        }

        self.front.clear();
        self.compose(game, paused);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, game: &TurtleAdventureGame, paused: bool) {
        let vp = self.viewport;
        compose_field(&mut self.front, &vp, game);

        if paused {
            let mid = Position::new(game.bounds.width as f64 / 2.0, game.bounds.height as f64 / 2.0);
            draw_text(&mut self.front, &vp, mid, " PAUSED ", HUD_BG);
        }

        let status = match (game.phase, paused) {
            (Phase::Won, _) => "YOU WIN",
            (Phase::Lost, _) => "YOU LOSE",
            (Phase::Running, true) => "PAUSED",
            (Phase::Running, false) => "RUNNING",
        };
        let hidden = game.enemies.iter().filter(|e| !e.is_visible()).count();
        let hud = format!(
            " Turtle's Adventure   Level {:<3} Enemies {:<4} Hidden {:<3} Time {:>6.1}s   {}",
            game.level,
            game.enemies.len(),
            hidden,
            game.elapsed_ms() as f64 / 1000.0,
            status,
        );
        self.front.put_row(HUD_ROW, &hud, HUD_FG, HUD_BG);

        if self.term_h > FIELD_ROW {
            let help = " click: set waypoint   +/-: level   p: pause   r: restart   q: quit";
            self.front.put_row(self.term_h - 1, help, HELP_FG, Cell::BASE_BG);
        }
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

/// Paint the playfield background, then every canvas item bottom-up.
fn compose_field(buf: &mut FrameBuffer, vp: &Viewport, game: &TurtleAdventureGame) {
    for row in 0..vp.rows {
        for col in 0..vp.cols {
            buf.set(vp.col0 + col, vp.row0 + row, Cell::new(' ', Color::Black, Cell::FIELD_BG));
        }
    }
    for item in game.canvas.stacked() {
        draw_item(buf, vp, item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::canvas::Canvas;

    /// 100x100 world on a 10x10 field at the buffer's origin.
    fn setup() -> (FrameBuffer, Viewport) {
        (FrameBuffer::new(10, 10), Viewport::new(0, 0, 10, 10, Bounds::new(100, 100)))
    }

    fn chars_in_row(buf: &FrameBuffer, y: usize) -> String {
        (0..buf.width).map(|x| buf.get(x, y).ch).collect()
    }

    #[test]
    fn outline_rectangle_draws_border_only() {
        let (mut buf, vp) = setup();
        draw_rectangle(&mut buf, &vp, &[20.0, 20.0, 55.0, 45.0], Color::Red, false);
        assert_eq!(chars_in_row(&buf, 2), "  ┌──┐    ");
        assert_eq!(chars_in_row(&buf, 3), "  │  │    ");
        assert_eq!(chars_in_row(&buf, 4), "  └──┘    ");
    }

    #[test]
    fn filled_rectangle_paints_background() {
        let (mut buf, vp) = setup();
        draw_rectangle(&mut buf, &vp, &[0.0, 0.0, 15.0, 15.0], Color::Red, true);
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(buf.get(x, y).bg, Color::Red);
        }
        assert_eq!(buf.get(2, 0), Cell::BLANK);
    }

    #[test]
    fn rectangle_corners_normalized() {
        let (mut a, vp) = setup();
        let (mut b, _) = setup();
        draw_rectangle(&mut a, &vp, &[20.0, 20.0, 55.0, 45.0], Color::Red, false);
        draw_rectangle(&mut b, &vp, &[55.0, 45.0, 20.0, 20.0], Color::Red, false);
        assert!(a.cells == b.cells);
    }

    #[test]
    fn oval_smaller_than_cell_still_visible() {
        let (mut buf, vp) = setup();
        draw_oval(&mut buf, &vp, &[41.0, 41.0, 43.0, 43.0], Color::Blue);
        assert_eq!(buf.get(4, 4).ch, '●');
    }

    #[test]
    fn oval_fills_interior() {
        let (mut buf, vp) = setup();
        draw_oval(&mut buf, &vp, &[20.0, 20.0, 60.0, 60.0], Color::Blue);
        assert_eq!(buf.get(3, 3).bg, Color::Blue);
        assert_eq!(buf.get(4, 4).bg, Color::Blue);
        // box corner lies outside the ellipse
        assert_eq!(buf.get(2, 2), Cell::BLANK);
    }

    #[test]
    fn diagonal_lines_pick_slant() {
        let (mut buf, vp) = setup();
        draw_line(&mut buf, &vp, &[15.0, 15.0, 75.0, 75.0], Color::Green);
        assert_eq!(buf.get(1, 1).ch, '╲');
        assert_eq!(buf.get(4, 4).ch, '╲');
        assert_eq!(buf.get(7, 7).ch, '╲');

        let (mut buf, vp) = setup();
        draw_line(&mut buf, &vp, &[15.0, 75.0, 75.0, 15.0], Color::Green);
        assert_eq!(buf.get(1, 7).ch, '╱');
        assert_eq!(buf.get(7, 1).ch, '╱');
    }

    #[test]
    fn text_is_centered_and_clipped() {
        let (mut buf, vp) = setup();
        draw_text(&mut buf, &vp, Position::new(50.0, 50.0), "You Win", Color::Green);
        assert_eq!(chars_in_row(&buf, 5), "  You Win ");

        let (mut buf, vp) = setup();
        draw_text(&mut buf, &vp, Position::new(5.0, 5.0), "abcdef", Color::Green);
        assert_eq!(chars_in_row(&buf, 0), "def       ");
    }

    #[test]
    fn hidden_items_are_skipped() {
        let (mut buf, vp) = setup();
        let mut canvas = Canvas::new();
        let id = canvas.create_oval([20.0, 20.0, 60.0, 60.0], Ink::Green);
        canvas.set_visible(id, false);
        for item in canvas.stacked() {
            draw_item(&mut buf, &vp, item);
        }
        assert!(buf.cells.iter().all(|c| *c == Cell::BLANK));
    }

    #[test]
    fn later_items_draw_over_earlier() {
        let (mut buf, vp) = setup();
        let mut canvas = Canvas::new();
        canvas.create_rectangle([0.0, 0.0, 95.0, 95.0], Ink::Red, true);
        canvas.create_glyph(Position::new(55.0, 55.0), '@', Ink::Green);
        for item in canvas.stacked() {
            draw_item(&mut buf, &vp, item);
        }
        assert_eq!(buf.get(5, 5).ch, '@');
        assert_eq!(buf.get(4, 4).bg, ink_color(Ink::Red));
    }

    #[test]
    fn playfield_offset_respected() {
        let mut buf = FrameBuffer::new(10, 12);
        let vp = Viewport::new(0, 1, 10, 10, Bounds::new(100, 100));
        draw_item_glyph_at(&mut buf, &vp, 5.0, 5.0);
        assert_eq!(buf.get(0, 1).ch, '@');
        assert_eq!(buf.get(0, 0), Cell::BLANK);
    }

    fn draw_item_glyph_at(buf: &mut FrameBuffer, vp: &Viewport, x: f64, y: f64) {
        let mut canvas = Canvas::new();
        canvas.create_glyph(Position::new(x, y), '@', Ink::Green);
        for item in canvas.stacked() {
            draw_item(buf, vp, item);
        }
    }
}
