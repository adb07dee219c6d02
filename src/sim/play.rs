/// Gameplay on top of the map: one player step at a time.
///
/// Step order:
///   1. Checkpoint the map (undo restores to here)
///   2. Resolve the destination: wall / off-grid blocks, box is pushed,
///      obstacle applies its time effect
///   3. Move the player
///   4. Re-place goals (a goal under a box or the player stays hidden)
///   5. Refresh the object list, check for a win
///
/// A refused step drops its checkpoint, so undo only walks real moves.
/// Boxes do not push other boxes.

use std::time::Instant;

use log::debug;

use crate::domain::map::Map;
use crate::domain::object::GameObject;
use super::document::LevelDocument;
use super::event::GameEvent;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up    => (0, -1),
            Direction::Down  => (0, 1),
            Direction::Left  => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

pub struct Level {
    map: Map,
    objects: Vec<GameObject>,
    goals: Vec<GameObject>,
    origin: LevelDocument,
    started: Instant,
    base_elapsed: i64,
    time_adjustment: i64,
    message: String,
}

impl Level {
    /// Lay out the document's objects on a fresh map.
    pub fn from_document(doc: &LevelDocument) -> Self {
        let (map, goals) = build_map(doc);
        let mut level = Level {
            map,
            objects: Vec::new(),
            goals,
            origin: doc.clone(),
            started: Instant::now(),
            base_elapsed: doc.elapsed(),
            time_adjustment: 0,
            message: String::new(),
        };
        level.sync_objects();
        level
    }

    // ── Moves ──

    pub fn step(&mut self, dir: Direction) -> Vec<GameEvent> {
        let mut events = Vec::new();

        let mut player = match self.player() {
            Some(p) => p.clone(),
            None => return events,
        };
        let (dx, dy) = dir.delta();
        let (tx, ty) = (player.x + dx, player.y + dy);

        let target = match self.map.get(tx, ty) {
            Some(t) if !t.object_type().is_solid() => t.clone(),
            _ => {
                events.push(GameEvent::MoveBlocked);
                return events;
            }
        };

        self.map.save();

        if target.is_box() {
            let (bx, by) = (tx + dx, ty + dy);
            let lands = self.map.get(bx, by)
                .map_or(false, |o| o.object_type().accepts_box());
            if !lands {
                self.map.discard_checkpoint();
                debug!("push from ({}, {}) blocked at ({}, {})", tx, ty, bx, by);
                events.push(GameEvent::MoveBlocked);
                return events;
            }
            let mut pushed = target.clone();
            pushed.move_to(bx, by);
            self.map.set(pushed);
            events.push(GameEvent::BoxPushed { from: (tx, ty), to: (bx, by) });
            if self.is_goal_cell(bx, by) {
                events.push(GameEvent::GoalFilled { x: bx, y: by });
            }
        }

        if let Some(effect) = target.time_effect() {
            let message = target.message().unwrap_or_default().to_string();
            self.time_adjustment += effect as i64;
            self.message = message.clone();
            events.push(GameEvent::ObstacleHit { time_effect: effect, message });
        }

        let from = player.position();
        player.move_to(tx, ty);
        self.map.set(player);
        events.push(GameEvent::PlayerMoved { from, to: (tx, ty) });

        self.place_goals();
        self.sync_objects();

        if self.is_solved() {
            events.push(GameEvent::LevelCleared);
        }
        events
    }

    /// Take back the last move. Returns `false` with nothing to undo.
    /// The clock (including obstacle penalties) is not rewound. An obstacle
    /// the undone move stepped on comes back, and stepping on it again
    /// charges its time effect a second time.
    pub fn undo(&mut self) -> bool {
        if !self.map.undo() {
            return false;
        }
        self.sync_objects();
        true
    }

    /// Rebuild the board from the document this level came from.
    /// The clock keeps running.
    pub fn reset(&mut self) {
        let (map, goals) = build_map(&self.origin);
        self.map = map;
        self.goals = goals;
        self.message.clear();
        self.sync_objects();
    }

    // ── Queries ──

    pub fn map(&self) -> &Map {
        &self.map
    }

    /// Everything on the board plus all goals, for snapshots.
    pub fn objects(&self) -> &[GameObject] {
        &self.objects
    }

    pub fn player(&self) -> Option<&GameObject> {
        self.map.occupants().find(|o| o.is_player())
    }

    /// Every goal holds a box. A level without goals is never solved.
    pub fn is_solved(&self) -> bool {
        !self.goals.is_empty()
            && self.goals.iter().all(|g| self.map.get(g.x, g.y).map_or(false, |o| o.is_box()))
    }

    pub fn goals_filled(&self) -> usize {
        self.goals.iter()
            .filter(|g| self.map.get(g.x, g.y).map_or(false, |o| o.is_box()))
            .count()
    }

    pub fn goal_count(&self) -> usize {
        self.goals.len()
    }

    pub fn elapsed_secs(&self) -> i64 {
        let running = self.started.elapsed().as_secs() as i64;
        (self.base_elapsed + running + self.time_adjustment).max(0)
    }

    pub fn time_adjustment(&self) -> i64 {
        self.time_adjustment
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    // ── Internal ──

    fn is_goal_cell(&self, x: i32, y: i32) -> bool {
        self.goals.iter().any(|g| g.x == x && g.y == y)
    }

    fn place_goals(&mut self) {
        for goal in &self.goals {
            let mut g = goal.clone();
            g.settle();
            self.map.set(g);
        }
    }

    fn sync_objects(&mut self) {
        self.objects = self.map.occupants()
            .filter(|o| !o.is_goal())
            .cloned()
            .chain(self.goals.iter().cloned())
            .collect();
    }
}

/// Map sized and named from the document, every object placed. Goals go
/// last so they never hide a box or the player sharing their cell.
fn build_map(doc: &LevelDocument) -> (Map, Vec<GameObject>) {
    let size = doc.size();
    let mut map = Map::new(size.width, size.height);
    map.set_level_name(doc.level_name());

    let (goals, others): (Vec<GameObject>, Vec<GameObject>) =
        doc.objects().into_iter().partition(|o| o.is_goal());
    for obj in others {
        map.set(obj);
    }
    for goal in &goals {
        let mut g = goal.clone();
        g.settle();
        map.set(g);
    }
    (map, goals)
}
