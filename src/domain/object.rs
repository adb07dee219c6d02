/// Board occupants: walls, floor, player, boxes, goals, obstacles.
///
/// Objects are plain values. A `Map` owns the copy that sits on a cell;
/// gameplay keeps its own list and re-places clones after each move.
/// Type semantics are queried via methods, so they stay centralized here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::color::ObjectColor;

/// Previous position of an object that has never been placed.
/// Lies outside every map, so the first placement clears nothing.
pub const OFF_GRID: (i32, i32) = (-1, -1);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ObjectType {
    Wall,
    Floor,    // Empty cell occupant
    Player,
    Box,      // Pushable
    Goal,     // Box target
    Obstacle, // Walk-over hazard with a time effect
}

impl ObjectType {
    pub const ALL: [ObjectType; 6] = [
        ObjectType::Wall,
        ObjectType::Floor,
        ObjectType::Player,
        ObjectType::Box,
        ObjectType::Goal,
        ObjectType::Obstacle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ObjectType::Wall     => "Wall",
            ObjectType::Floor    => "Floor",
            ObjectType::Player   => "Player",
            ObjectType::Box      => "Box",
            ObjectType::Goal     => "Goal",
            ObjectType::Obstacle => "Obstacle",
        }
    }

    pub fn default_glyph(self) -> &'static str {
        match self {
            ObjectType::Wall     => "⬛",
            ObjectType::Floor    => " ",
            ObjectType::Player   => "☻",
            ObjectType::Box      => "▣",
            ObjectType::Goal     => "◎",
            ObjectType::Obstacle => "▲",
        }
    }

    pub fn default_color(self) -> ObjectColor {
        match self {
            ObjectType::Wall     => ObjectColor::Cyan,
            ObjectType::Floor    => ObjectColor::Black,
            ObjectType::Player   => ObjectColor::Yellow,
            ObjectType::Box      => ObjectColor::DarkYellow,
            ObjectType::Goal     => ObjectColor::Green,
            ObjectType::Obstacle => ObjectColor::Red,
        }
    }

    /// Blocks the player outright (cannot be walked onto or pushed).
    pub fn is_solid(self) -> bool {
        matches!(self, ObjectType::Wall)
    }

    /// A pushed box may come to rest on this occupant.
    pub fn accepts_box(self) -> bool {
        matches!(self, ObjectType::Floor | ObjectType::Goal)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectType::ALL.iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("unknown object type '{}'", s))
    }
}

/// Variant payload. Only obstacles carry extra data.
#[derive(Clone, PartialEq, Eq, Debug)]
enum ObjectKind {
    Plain(ObjectType),
    Obstacle { time_effect: i32, message: String },
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GameObject {
    kind: ObjectKind,
    pub x: i32,
    pub y: i32,
    prev_x: i32,
    prev_y: i32,
    pub glyph: String,
    pub color: ObjectColor,
}

impl GameObject {
    /// Build an object with the type's default glyph and color.
    /// Obstacles built this way have no time effect and no message.
    pub fn new(object_type: ObjectType) -> Self {
        let kind = match object_type {
            ObjectType::Obstacle => ObjectKind::Obstacle { time_effect: 0, message: String::new() },
            other => ObjectKind::Plain(other),
        };
        GameObject {
            kind,
            x: 0,
            y: 0,
            prev_x: OFF_GRID.0,
            prev_y: OFF_GRID.1,
            glyph: object_type.default_glyph().to_string(),
            color: object_type.default_color(),
        }
    }

    pub fn floor() -> Self {
        GameObject::new(ObjectType::Floor)
    }

    pub fn obstacle(time_effect: i32, message: impl Into<String>) -> Self {
        let mut obj = GameObject::new(ObjectType::Obstacle);
        obj.kind = ObjectKind::Obstacle { time_effect, message: message.into() };
        obj
    }

    // ── Builders ──

    /// Put the object at `(x, y)` without recording a move.
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_glyph(mut self, glyph: impl Into<String>) -> Self {
        self.glyph = glyph.into();
        self
    }

    pub fn with_color(mut self, color: ObjectColor) -> Self {
        self.color = color;
        self
    }

    // ── Movement ──

    /// Move to `(x, y)`, remembering where the object came from.
    pub fn move_to(&mut self, x: i32, y: i32) {
        self.prev_x = self.x;
        self.prev_y = self.y;
        self.x = x;
        self.y = y;
    }

    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.move_to(self.x + dx, self.y + dy);
    }

    /// Forget the previous position (object re-placed on its own cell).
    pub fn settle(&mut self) {
        self.prev_x = self.x;
        self.prev_y = self.y;
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn prev_position(&self) -> (i32, i32) {
        (self.prev_x, self.prev_y)
    }

    // ── Type queries ──

    pub fn object_type(&self) -> ObjectType {
        match &self.kind {
            ObjectKind::Plain(t) => *t,
            ObjectKind::Obstacle { .. } => ObjectType::Obstacle,
        }
    }

    pub fn is_player(&self) -> bool { self.object_type() == ObjectType::Player }
    pub fn is_box(&self) -> bool { self.object_type() == ObjectType::Box }
    pub fn is_goal(&self) -> bool { self.object_type() == ObjectType::Goal }
    pub fn is_floor(&self) -> bool { self.object_type() == ObjectType::Floor }
    pub fn is_obstacle(&self) -> bool { self.object_type() == ObjectType::Obstacle }

    /// Seconds added to the clock when the player walks over this obstacle.
    /// `None` for every other type.
    pub fn time_effect(&self) -> Option<i32> {
        match &self.kind {
            ObjectKind::Obstacle { time_effect, .. } => Some(*time_effect),
            ObjectKind::Plain(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match &self.kind {
            ObjectKind::Obstacle { message, .. } => Some(message),
            ObjectKind::Plain(_) => None,
        }
    }
}

impl Default for GameObject {
    fn default() -> Self {
        GameObject::floor()
    }
}
