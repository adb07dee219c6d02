/// Document schemas: level definitions, save snapshots, banner.
///
/// ## Level definition (`Levels/*.json`, read-only)
///   ```json
///   { "levelName": "Warehouse",
///     "map": { "width": 8, "height": 6 },
///     "gameObjects": [ { "Type": "Player", "PosX": 1, "PosY": 1 }, ... ] }
///   ```
///
/// ## Snapshot (`Saves/Save_NNN_Level_NNN.json`)
///   Same shape plus `levelNumber` (0-based) and `time` (elapsed seconds).
///   Every object carries `Color` and `CharRepresentation`; obstacles add
///   `TimeEffect` and `Message`.
///
/// `Type`, `PosX` and `PosY` are required on every object; a missing one is
/// a parse error. Color and glyph fall back to the type defaults.

use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::domain::color::ObjectColor;
use crate::domain::map::Map;
use crate::domain::object::{GameObject, ObjectType};
use super::codec::{self, DocumentError};

// ══════════════════════════════════════════════════════════════
// Objects
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    #[serde(rename = "Type")]
    pub object_type: ObjectType,
    #[serde(rename = "Color", default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ObjectColor>,
    #[serde(rename = "PosX")]
    pub x: i32,
    #[serde(rename = "PosY")]
    pub y: i32,
    #[serde(rename = "CharRepresentation", default, skip_serializing_if = "Option::is_none")]
    pub glyph: Option<String>,
    #[serde(rename = "TimeEffect", default, skip_serializing_if = "Option::is_none")]
    pub time_effect: Option<i32>,
    #[serde(rename = "Message", default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ObjectRecord {
    /// Build the in-game object. It starts unplaced (previous position off
    /// the grid), so the first `Map::set` clears nothing.
    pub fn to_object(&self) -> GameObject {
        let base = match self.object_type {
            ObjectType::Obstacle => GameObject::obstacle(
                self.time_effect.unwrap_or(0),
                self.message.clone().unwrap_or_default(),
            ),
            other => GameObject::new(other),
        };
        let mut obj = base.at(self.x, self.y);
        if let Some(color) = self.color {
            obj.color = color;
        }
        if let Some(glyph) = &self.glyph {
            obj.glyph = glyph.clone();
        }
        obj
    }
}

impl From<&GameObject> for ObjectRecord {
    fn from(obj: &GameObject) -> Self {
        ObjectRecord {
            object_type: obj.object_type(),
            color: Some(obj.color),
            x: obj.x,
            y: obj.y,
            glyph: Some(obj.glyph.clone()),
            time_effect: obj.time_effect(),
            message: obj.message().map(str::to_string),
        }
    }
}

/// Board dimensions. Deserializing checks them against `MAX_SIDE` and
/// `MAX_CELLS`, so every parsed document can be laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMapSize")]
pub struct MapSize {
    pub width: usize,
    pub height: usize,
}

#[derive(Deserialize)]
struct RawMapSize {
    width: usize,
    height: usize,
}

impl MapSize {
    pub const MAX_SIDE: usize = 512;
    pub const MAX_CELLS: usize = 65_536;

    pub fn checked(width: usize, height: usize) -> Result<Self, String> {
        let cells = width.checked_mul(height);
        if width > Self::MAX_SIDE || height > Self::MAX_SIDE {
            return Err(format!(
                "map {}x{} exceeds the {} cell side limit", width, height, Self::MAX_SIDE
            ));
        }
        match cells {
            Some(n) if n <= Self::MAX_CELLS => Ok(MapSize { width, height }),
            _ => Err(format!(
                "map {}x{} exceeds the {} cell limit", width, height, Self::MAX_CELLS
            )),
        }
    }
}

impl TryFrom<RawMapSize> for MapSize {
    type Error = String;

    fn try_from(raw: RawMapSize) -> Result<Self, Self::Error> {
        MapSize::checked(raw.width, raw.height)
    }
}

// ══════════════════════════════════════════════════════════════
// Level definition / snapshot
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDefinition {
    pub level_name: String,
    pub map: MapSize,
    pub game_objects: Vec<ObjectRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub level_number: usize,
    pub level_name: String,
    pub map: MapSize,
    pub time: i64,
    pub game_objects: Vec<ObjectRecord>,
}

impl Snapshot {
    /// Assemble a snapshot from live game state.
    pub fn capture(level_number: usize, map: &Map, objects: &[GameObject], elapsed: i64) -> Self {
        Snapshot {
            level_number,
            level_name: map.level_name().to_string(),
            map: MapSize { width: map.width(), height: map.height() },
            time: elapsed,
            game_objects: objects.iter().map(ObjectRecord::from).collect(),
        }
    }
}

/// Whatever a level source resolved to.
#[derive(Clone, Debug, PartialEq)]
pub enum LevelDocument {
    Definition(LevelDefinition),
    Snapshot(Snapshot),
}

impl LevelDocument {
    pub fn level_name(&self) -> &str {
        match self {
            LevelDocument::Definition(d) => &d.level_name,
            LevelDocument::Snapshot(s) => &s.level_name,
        }
    }

    pub fn size(&self) -> MapSize {
        match self {
            LevelDocument::Definition(d) => d.map,
            LevelDocument::Snapshot(s) => s.map,
        }
    }

    pub fn records(&self) -> &[ObjectRecord] {
        match self {
            LevelDocument::Definition(d) => &d.game_objects,
            LevelDocument::Snapshot(s) => &s.game_objects,
        }
    }

    /// Objects in document order.
    pub fn objects(&self) -> Vec<GameObject> {
        self.records().iter().map(ObjectRecord::to_object).collect()
    }

    /// Seconds already on the clock. Zero for a fresh level.
    pub fn elapsed(&self) -> i64 {
        match self {
            LevelDocument::Definition(_) => 0,
            LevelDocument::Snapshot(s) => s.time,
        }
    }

    pub fn is_snapshot(&self) -> bool {
        matches!(self, LevelDocument::Snapshot(_))
    }
}

// ══════════════════════════════════════════════════════════════
// Banner (`Config/config.json`, optional)
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    #[serde(rename = "MainTitle", default = "default_title")]
    pub main_title: String,
    #[serde(rename = "Subtitle", default = "default_subtitle")]
    pub subtitle: String,
}

fn default_title() -> String { "BOX RUNNER".into() }
fn default_subtitle() -> String { "Push every box onto a goal.".into() }

impl Default for Banner {
    fn default() -> Self {
        Banner { main_title: default_title(), subtitle: default_subtitle() }
    }
}

impl Banner {
    /// Read the banner under `root`; a missing file means defaults.
    pub fn load(root: &Path) -> Self {
        let path = root.join("Config").join("config.json");
        match codec::read_document::<Banner>(&path) {
            Ok(banner) => banner,
            Err(DocumentError::NotFound { .. }) => Banner::default(),
            Err(e) => {
                warn!("{e}; using default banner");
                Banner::default()
            }
        }
    }
}
