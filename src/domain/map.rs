/// Map: the grid state engine.
///
/// ## Layers
///
///   - `layer` : one `GameObject` per cell, indexed `[y][x]`. Never empty:
///                a cleared cell holds a fresh Floor.
///   - `glyphs`: display strings derived from `layer`. Kept in step by
///                `set()`, rebuilt wholesale by `undo()` / `initialize()`.
///
/// ## Placement
///
/// `set()` moves an object from its previous position to its current one.
/// The move is refused (nothing changes) when the destination holds a
/// Player, or holds a Box and the object is a Goal. Anything else at the
/// destination is overwritten. Off-grid coordinates are skipped one by one,
/// never reported.
///
/// ## History
///
/// `save()` pushes a deep copy of `layer`; `undo()` pops it back (LIFO).
/// Snapshots own their objects, so later edits never reach them.

use log::debug;

use super::object::GameObject;

type Layer = Vec<Vec<GameObject>>;

const DEFAULT_WIDTH: usize = 30;
const DEFAULT_HEIGHT: usize = 8;

#[derive(Clone, Debug)]
pub struct Map {
    width: usize,
    height: usize,
    layer: Layer,
    glyphs: Vec<Vec<String>>,
    level_name: String,
    history: Vec<Layer>,
}

impl Map {
    pub fn new(width: usize, height: usize) -> Self {
        let mut map = Map {
            width,
            height,
            layer: Vec::new(),
            glyphs: Vec::new(),
            level_name: String::new(),
            history: Vec::new(),
        };
        map.initialize();
        map
    }

    /// Fill every cell with Floor and drop the undo history.
    pub fn initialize(&mut self) {
        self.history.clear();
        self.layer = vec![vec![GameObject::floor(); self.width]; self.height];
        self.rebuild_glyphs();
    }

    /// Same as `initialize()` at the current size.
    pub fn reset(&mut self) {
        self.initialize();
    }

    // ── Dimensions (changing either one clears the board) ──

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set_width(&mut self, width: usize) {
        self.width = width;
        self.initialize();
    }

    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        self.initialize();
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.initialize();
    }

    pub fn level_name(&self) -> &str {
        &self.level_name
    }

    pub fn set_level_name(&mut self, name: impl Into<String>) {
        self.level_name = name.into();
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    // ── Cell access ──

    /// Occupant at `(x, y)`, or `None` off the grid.
    pub fn get(&self, x: i32, y: i32) -> Option<&GameObject> {
        if !self.in_bounds(x, y) { return None; }
        Some(&self.layer[y as usize][x as usize])
    }

    pub fn glyph(&self, x: i32, y: i32) -> Option<&str> {
        if !self.in_bounds(x, y) { return None; }
        Some(&self.glyphs[y as usize][x as usize])
    }

    /// All non-Floor occupants, row-major.
    pub fn occupants(&self) -> impl Iterator<Item = &GameObject> {
        self.layer.iter().flatten().filter(|o| !o.is_floor())
    }

    /// Place `object` at its current position, clearing its previous cell.
    ///
    /// Returns `false` only when the collision rule refused the move; the
    /// map is untouched in that case. Off-grid coordinates are ignored and
    /// still count as accepted.
    pub fn set(&mut self, object: GameObject) -> bool {
        let (x, y) = object.position();
        let (prev_x, prev_y) = object.prev_position();

        if let Some(occupant) = self.get(x, y) {
            let blocked = occupant.is_player() || (occupant.is_box() && object.is_goal());
            if blocked {
                debug!("set {} -> ({}, {}) refused: cell holds {}",
                    object.object_type(), x, y, occupant.object_type());
                return false;
            }
        }

        if self.in_bounds(prev_x, prev_y) {
            let floor = GameObject::floor().at(prev_x, prev_y);
            self.put(prev_x as usize, prev_y as usize, floor);
        }

        if self.in_bounds(x, y) {
            self.put(x as usize, y as usize, object);
        }

        true
    }

    // ── History ──

    /// Checkpoint the current layer.
    pub fn save(&mut self) {
        self.history.push(self.copy_layer());
    }

    /// Restore the latest checkpoint. Returns `false` when there is none.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(layer) => {
                self.layer = layer;
                self.rebuild_glyphs();
                debug!("undo: {} checkpoint(s) left", self.history.len());
                true
            }
            None => false,
        }
    }

    /// Drop the latest checkpoint without restoring it.
    pub fn discard_checkpoint(&mut self) -> bool {
        self.history.pop().is_some()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // ── Internal ──

    fn put(&mut self, x: usize, y: usize, object: GameObject) {
        self.glyphs[y][x] = object.glyph.clone();
        self.layer[y][x] = object;
    }

    /// Deep copy: every cell is cloned into a fresh row.
    fn copy_layer(&self) -> Layer {
        self.layer.iter().map(|row| row.to_vec()).collect()
    }

    fn rebuild_glyphs(&mut self) {
        self.glyphs = self.layer.iter()
            .map(|row| row.iter().map(|o| o.glyph.clone()).collect())
            .collect();
    }
}

impl Default for Map {
    fn default() -> Self {
        Map::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}
