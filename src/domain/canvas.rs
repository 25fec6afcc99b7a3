/// Retained-mode drawing surface.
///
/// Entities own handles (`ItemId`) to shape items and mutate them in place:
/// move (`set_coords`), show/hide, raise to top, delete. The terminal
/// renderer rasterizes whatever the canvas holds, in stacking order.
///
/// Coordinates are world coordinates: `[x1, y1, x2, y2]` for boxed shapes,
/// `[x, y, x, y]` for point-anchored text and glyphs.

use std::collections::HashMap;

use super::geometry::Position;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ItemId(u32);

/// Palette tag. The renderer picks the concrete terminal color.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Ink {
    Red,
    Blue,
    Green,
    Brown,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Primitive {
    Line,
    Rectangle { filled: bool },
    Oval,
    Text(String),
    Glyph(char),
}

#[derive(Clone, Debug)]
pub struct Item {
    pub primitive: Primitive,
    pub coords: [f64; 4],
    pub ink: Ink,
    pub visible: bool,
    z: u64,
}

#[derive(Default)]
pub struct Canvas {
    items: HashMap<ItemId, Item>,
    next_id: u32,
    next_z: u64,
}

impl Canvas {
    pub fn new() -> Self {
        Canvas::default()
    }

    fn insert(&mut self, primitive: Primitive, coords: [f64; 4], ink: Ink) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        let z = self.bump_z();
        self.items.insert(id, Item { primitive, coords, ink, visible: true, z });
        id
    }

    fn bump_z(&mut self) -> u64 {
        let z = self.next_z;
        self.next_z += 1;
        z
    }

    pub fn create_line(&mut self, ink: Ink) -> ItemId {
        self.insert(Primitive::Line, [0.0; 4], ink)
    }

    pub fn create_rectangle(&mut self, coords: [f64; 4], ink: Ink, filled: bool) -> ItemId {
        self.insert(Primitive::Rectangle { filled }, coords, ink)
    }

    pub fn create_oval(&mut self, coords: [f64; 4], ink: Ink) -> ItemId {
        self.insert(Primitive::Oval, coords, ink)
    }

    pub fn create_text(&mut self, at: Position, text: &str, ink: Ink) -> ItemId {
        self.insert(Primitive::Text(text.to_string()), [at.x, at.y, at.x, at.y], ink)
    }

    pub fn create_glyph(&mut self, at: Position, glyph: char, ink: Ink) -> ItemId {
        self.insert(Primitive::Glyph(glyph), [at.x, at.y, at.x, at.y], ink)
    }

    /// Move an item. Unknown handles are ignored (returns false).
    pub fn set_coords(&mut self, id: ItemId, coords: [f64; 4]) -> bool {
        match self.items.get_mut(&id) {
            Some(item) => {
                item.coords = coords;
                true
            }
            None => false,
        }
    }

    pub fn set_visible(&mut self, id: ItemId, visible: bool) {
        if let Some(item) = self.items.get_mut(&id) {
            item.visible = visible;
        }
    }

    /// Put the item on top of the stacking order.
    pub fn raise(&mut self, id: ItemId) {
        if !self.items.contains_key(&id) { return; }
        let z = self.bump_z();
        if let Some(item) = self.items.get_mut(&id) {
            item.z = z;
        }
    }

    pub fn delete(&mut self, id: ItemId) -> bool {
        self.items.remove(&id).is_some()
    }

    #[allow(dead_code)]
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items, bottom first.
    pub fn stacked(&self) -> Vec<&Item> {
        let mut out: Vec<&Item> = self.items.values().collect();
        out.sort_by_key(|item| item.z);
        out
    }

    /// Every text item currently on the canvas (end-of-game banners etc).
    #[allow(dead_code)]
    pub fn texts(&self) -> Vec<&str> {
        self.stacked()
            .into_iter()
            .filter_map(|item| match &item.primitive {
                Primitive::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}
