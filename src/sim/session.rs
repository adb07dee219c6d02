/// Level session: which level is active, resuming from saves, writing saves.
///
/// ## Layout under the root
///   `Levels/`  level definitions; sorted file names give the play order
///   `Saves/`   snapshots, `Save_<seq>_Level_<n>.json` (both 3-digit)
///   `Config/config.json`  optional banner
///
/// ## Progression
///   The index starts before the first level. `advance_level()` steps it
///   forward, except right after a save was loaded: then the loaded level is
///   re-entered once (resume pending) and the flag clears.
///
/// Loading a save swaps the snapshot in for that level's source, so the next
/// `load_current_level()` yields the saved board instead of the level file.

use std::io;
use std::path::{Path, PathBuf};

use derive_more::{Display, Error};
use log::{info, warn};

use crate::domain::map::Map;
use crate::domain::object::GameObject;
use super::codec::{self, DocumentError};
use super::document::{Banner, LevelDefinition, LevelDocument, Snapshot};

pub const LEVELS_DIR: &str = "Levels";
pub const SAVES_DIR: &str = "Saves";

// ══════════════════════════════════════════════════════════════
// Errors
// ══════════════════════════════════════════════════════════════

#[derive(Debug, Display, Error)]
pub enum SessionError {
    #[display("level directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[display("{_0}")]
    Document(DocumentError),

    #[display("no level is active")]
    NoActiveLevel,

    #[display("save refers to level {} but only {count} level(s) exist", level + 1)]
    UnknownLevel { level: usize, count: usize },

    #[display("could not access {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl From<DocumentError> for SessionError {
    fn from(err: DocumentError) -> Self {
        SessionError::Document(err)
    }
}

/// Refused answer at the save prompt. Always retryable.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum SelectionError {
    #[display("'{input}' is not a number")]
    NotANumber { input: String },

    #[display("invalid input: enter a number between 1 and {max}, or 0 to just play")]
    OutOfRange { choice: i64, max: usize },
}

// ══════════════════════════════════════════════════════════════
// Save selection
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveChoice {
    /// Start from the first level without loading anything.
    Play,
    /// Load the save at this 0-based position of the list.
    Load(usize),
}

/// Interpret one answer: `0` plays, `1..=count` picks a save.
pub fn parse_choice(input: &str, count: usize) -> Result<SaveChoice, SelectionError> {
    let trimmed = input.trim();
    let choice: i64 = trimmed.parse()
        .map_err(|_| SelectionError::NotANumber { input: trimmed.to_string() })?;
    if choice == 0 {
        return Ok(SaveChoice::Play);
    }
    if choice > 0 && (choice as u64) <= count as u64 {
        Ok(SaveChoice::Load(choice as usize - 1))
    } else {
        Err(SelectionError::OutOfRange { choice, max: count })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveEntry {
    pub path: PathBuf,
    pub file_name: String,
}

/// The interactive side of save selection (terminal, test script, ...).
pub trait SavePrompt {
    /// `Saves/` holds nothing; play starts from the first level.
    fn no_saves(&mut self) {}

    /// Present the saves, numbered from 1.
    fn list(&mut self, saves: &[SaveEntry]);

    /// Next answer, or `None` once input is exhausted.
    fn read_choice(&mut self, count: usize) -> Option<String>;

    /// The last answer was refused; the prompt will ask again.
    fn reject(&mut self, reason: &str);
}

// ══════════════════════════════════════════════════════════════
// Session
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub enum LevelSource {
    File(PathBuf),
    Snapshot(Box<Snapshot>),
}

#[derive(Debug)]
pub struct LevelSession {
    root: PathBuf,
    sources: Vec<LevelSource>,
    index: Option<usize>, // None: before the first level
    resume_pending: bool,
}

impl LevelSession {
    /// Scan `root/Levels/` for the level sequence.
    pub fn initialize(root: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let root = root.into();
        let dir = root.join(LEVELS_DIR);
        if !dir.is_dir() {
            return Err(SessionError::DirectoryNotFound { path: dir });
        }

        let files = sorted_files(&dir)?;
        info!("{} level(s) under {}", files.len(), dir.display());

        Ok(LevelSession {
            root,
            sources: files.into_iter().map(|e| LevelSource::File(e.path)).collect(),
            index: None,
            resume_pending: false,
        })
    }

    // ── Progression ──

    pub fn has_more_levels(&self) -> bool {
        match self.index {
            None => true,
            Some(i) => i < self.sources.len(),
        }
    }

    /// Move to the next level and report whether one exists there.
    pub fn advance_level(&mut self) -> bool {
        if self.resume_pending {
            self.resume_pending = false;
            return self.has_more_levels();
        }
        let next = self.index.map_or(0, |i| i + 1);
        self.index = Some(next);
        if self.has_more_levels() {
            info!("advanced to level {}", next + 1);
        }
        self.has_more_levels()
    }

    /// Parse the document behind the current level.
    pub fn load_current_level(&self) -> Result<LevelDocument, SessionError> {
        let index = self.active_index().ok_or(SessionError::NoActiveLevel)?;
        match &self.sources[index] {
            LevelSource::File(path) => {
                let def: LevelDefinition = codec::read_document(path)?;
                Ok(LevelDocument::Definition(def))
            }
            LevelSource::Snapshot(snap) => Ok(LevelDocument::Snapshot((**snap).clone())),
        }
    }

    // ── Saves ──

    pub fn list_saves(&self) -> Result<Vec<SaveEntry>, SessionError> {
        let dir = self.saves_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        sorted_files(&dir)
    }

    /// Ask `prompt` which save to resume; loops until a usable answer.
    /// Returns the loaded save, or `None` to play from the start.
    pub fn select_save<P: SavePrompt + ?Sized>(
        &mut self,
        prompt: &mut P,
    ) -> Result<Option<PathBuf>, SessionError> {
        let saves = self.list_saves()?;
        if saves.is_empty() {
            prompt.no_saves();
            return Ok(None);
        }

        prompt.list(&saves);
        loop {
            let answer = match prompt.read_choice(saves.len()) {
                Some(a) => a,
                None => return Ok(None),
            };
            match parse_choice(&answer, saves.len()) {
                Ok(SaveChoice::Play) => return Ok(None),
                Ok(SaveChoice::Load(i)) => {
                    let path = &saves[i].path;
                    match self.load_save(path) {
                        Ok(()) => return Ok(Some(path.clone())),
                        Err(e) => {
                            warn!("could not resume {}: {e}", saves[i].file_name);
                            prompt.reject(&e.to_string());
                        }
                    }
                }
                Err(e) => prompt.reject(&e.to_string()),
            }
        }
    }

    /// Load a snapshot and make its level the one to resume.
    /// On error the session is left as it was.
    pub fn load_save(&mut self, path: &Path) -> Result<(), SessionError> {
        let snap: Snapshot = codec::read_document(path)?;
        let level = snap.level_number;
        if level >= self.sources.len() {
            return Err(SessionError::UnknownLevel { level, count: self.sources.len() });
        }
        info!("resuming level {} from {}", level + 1, path.display());
        self.sources[level] = LevelSource::Snapshot(Box::new(snap));
        self.index = Some(level);
        self.resume_pending = true;
        Ok(())
    }

    /// Write the current game state to a new file under `Saves/`.
    /// Returns the file name (not the full path).
    pub fn save_snapshot(
        &self,
        objects: &[GameObject],
        map: &Map,
        elapsed: i64,
    ) -> Result<String, SessionError> {
        let level = self.active_index().ok_or(SessionError::NoActiveLevel)?;
        let dir = self.saves_dir();
        std::fs::create_dir_all(&dir)
            .map_err(|e| SessionError::Io { path: dir.clone(), source: e })?;

        let existing = count_files(&dir)?;
        let name = save_file_name(existing + 1, level + 1);
        let snap = Snapshot::capture(level, map, objects, elapsed);
        codec::write_document(&snap, &dir.join(&name))?;
        info!("saved level {} to {}", level + 1, name);
        Ok(name)
    }

    // ── Accessors ──

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn levels_dir(&self) -> PathBuf {
        self.root.join(LEVELS_DIR)
    }

    pub fn saves_dir(&self) -> PathBuf {
        self.root.join(SAVES_DIR)
    }

    pub fn level_count(&self) -> usize {
        self.sources.len()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.index
    }

    pub fn resume_pending(&self) -> bool {
        self.resume_pending
    }

    pub fn source(&self, index: usize) -> Option<&LevelSource> {
        self.sources.get(index)
    }

    pub fn banner(&self) -> Banner {
        Banner::load(&self.root)
    }

    fn active_index(&self) -> Option<usize> {
        self.index.filter(|&i| i < self.sources.len())
    }
}

pub fn save_file_name(seq: usize, level_number: usize) -> String {
    format!("Save_{:03}_Level_{:03}.json", seq, level_number)
}

// ══════════════════════════════════════════════════════════════
// Directory helpers
// ══════════════════════════════════════════════════════════════

fn sorted_files(dir: &Path) -> Result<Vec<SaveEntry>, SessionError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| SessionError::Io { path: dir.to_path_buf(), source: e })?;

    let mut files: Vec<SaveEntry> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .map(|path| {
            let file_name = path.file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            SaveEntry { path, file_name }
        })
        .collect();
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(files)
}

fn count_files(dir: &Path) -> Result<usize, SessionError> {
    Ok(sorted_files(dir)?.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use tempfile::TempDir;

    use crate::domain::object::ObjectType;
    use crate::sim::document::{MapSize, ObjectRecord};

    // ── Fixtures ──

    fn level_def(name: &str) -> LevelDefinition {
        let player = GameObject::new(ObjectType::Player).at(1, 1);
        LevelDefinition {
            level_name: name.to_string(),
            map: MapSize { width: 4, height: 3 },
            game_objects: vec![ObjectRecord::from(&player)],
        }
    }

    /// Root with `Levels/` holding the given file names (each a valid level).
    fn root_with_levels(names: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let levels = dir.path().join(LEVELS_DIR);
        std::fs::create_dir(&levels).unwrap();
        for name in names {
            codec::write_document(&level_def(name), &levels.join(name)).unwrap();
        }
        dir
    }

    fn sample_state() -> (Map, Vec<GameObject>) {
        let mut map = Map::new(4, 3);
        map.set_level_name("b.json");
        let objects = vec![
            GameObject::new(ObjectType::Player).at(2, 1),
            GameObject::new(ObjectType::Box).at(1, 1),
            GameObject::obstacle(3, "Puddle").at(3, 2),
        ];
        for o in &objects {
            map.set(o.clone());
        }
        (map, objects)
    }

    struct ScriptedPrompt {
        answers: VecDeque<&'static str>,
        listed: Vec<String>,
        rejections: Vec<String>,
        told_empty: bool,
    }

    impl ScriptedPrompt {
        fn new(answers: &[&'static str]) -> Self {
            ScriptedPrompt {
                answers: answers.iter().copied().collect(),
                listed: vec![],
                rejections: vec![],
                told_empty: false,
            }
        }
    }

    impl SavePrompt for ScriptedPrompt {
        fn no_saves(&mut self) {
            self.told_empty = true;
        }
        fn list(&mut self, saves: &[SaveEntry]) {
            self.listed = saves.iter().map(|s| s.file_name.clone()).collect();
        }
        fn read_choice(&mut self, _count: usize) -> Option<String> {
            self.answers.pop_front().map(str::to_string)
        }
        fn reject(&mut self, reason: &str) {
            self.rejections.push(reason.to_string());
        }
    }

    // ── initialize ──

    #[test]
    fn missing_levels_dir_is_directory_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = LevelSession::initialize(dir.path()).unwrap_err();
        assert!(matches!(err, SessionError::DirectoryNotFound { .. }));
    }

    #[test]
    fn levels_are_sorted_by_name() {
        let root = root_with_levels(&["c.json", "a.json", "b.json"]);
        let s = LevelSession::initialize(root.path()).unwrap();
        let names: Vec<String> = (0..s.level_count())
            .map(|i| match s.source(i) {
                Some(LevelSource::File(p)) => p.file_name().unwrap().to_string_lossy().to_string(),
                _ => panic!("expected file source"),
            })
            .collect();
        assert_eq!(names, ["a.json", "b.json", "c.json"]);
    }

    // ── progression ──

    #[test]
    fn advance_walks_every_level_once() {
        let root = root_with_levels(&["a.json", "b.json"]);
        let mut s = LevelSession::initialize(root.path()).unwrap();
        assert!(s.has_more_levels());
        assert_eq!(s.current_index(), None);

        assert!(s.advance_level());
        assert_eq!(s.load_current_level().unwrap().level_name(), "a.json");
        assert!(s.advance_level());
        assert_eq!(s.load_current_level().unwrap().level_name(), "b.json");
        assert!(!s.advance_level());
        assert_eq!(s.current_index(), Some(2));
        assert!(!s.has_more_levels());
    }

    #[test]
    fn load_before_first_advance_has_no_level() {
        let root = root_with_levels(&["a.json"]);
        let s = LevelSession::initialize(root.path()).unwrap();
        assert!(matches!(s.load_current_level(), Err(SessionError::NoActiveLevel)));
    }

    #[test]
    fn broken_level_file_is_typed_error() {
        let root = root_with_levels(&[]);
        std::fs::write(root.path().join(LEVELS_DIR).join("a.json"), "[]").unwrap();
        let mut s = LevelSession::initialize(root.path()).unwrap();
        s.advance_level();
        assert!(matches!(
            s.load_current_level(),
            Err(SessionError::Document(DocumentError::Format { .. }))
        ));
    }

    #[test]
    fn oversized_level_is_format_error_not_panic() {
        let root = root_with_levels(&[]);
        std::fs::write(
            root.path().join(LEVELS_DIR).join("a.json"),
            r#"{ "levelName": "a", "map": { "width": 18446744073709551615, "height": 2 },
                 "gameObjects": [] }"#,
        ).unwrap();
        let mut s = LevelSession::initialize(root.path()).unwrap();
        s.advance_level();
        assert!(matches!(
            s.load_current_level(),
            Err(SessionError::Document(DocumentError::Format { .. }))
        ));
    }

    #[test]
    fn paths_hang_off_the_root() {
        let root = root_with_levels(&["a.json"]);
        let s = LevelSession::initialize(root.path()).unwrap();
        assert_eq!(s.root(), root.path());
        assert_eq!(s.levels_dir(), root.path().join(LEVELS_DIR));
        assert_eq!(s.saves_dir(), root.path().join(SAVES_DIR));
    }

    // ── save_snapshot ──

    #[test]
    fn snapshot_round_trip() {
        let root = root_with_levels(&["a.json", "b.json"]);
        let mut s = LevelSession::initialize(root.path()).unwrap();
        s.advance_level();
        s.advance_level();

        let (map, objects) = sample_state();
        let name = s.save_snapshot(&objects, &map, 42).unwrap();
        assert_eq!(name, "Save_001_Level_002.json");

        let back: Snapshot = codec::read_document(&s.saves_dir().join(&name)).unwrap();
        assert_eq!(back.level_number, 1);
        assert_eq!(back.level_name, "b.json");
        assert_eq!(back.map, MapSize { width: 4, height: 3 });
        assert_eq!(back.time, 42);
        let restored: Vec<GameObject> = back.game_objects.iter().map(ObjectRecord::to_object).collect();
        assert_eq!(restored, objects);
    }

    #[test]
    fn save_sequence_counts_existing_files() {
        let root = root_with_levels(&["a.json"]);
        let mut s = LevelSession::initialize(root.path()).unwrap();
        s.advance_level();
        let (map, objects) = sample_state();
        assert_eq!(s.save_snapshot(&objects, &map, 0).unwrap(), "Save_001_Level_001.json");
        assert_eq!(s.save_snapshot(&objects, &map, 0).unwrap(), "Save_002_Level_001.json");
        assert_eq!(s.list_saves().unwrap().len(), 2);
    }

    #[test]
    fn save_without_active_level_fails() {
        let root = root_with_levels(&["a.json"]);
        let s = LevelSession::initialize(root.path()).unwrap();
        let (map, objects) = sample_state();
        assert!(matches!(s.save_snapshot(&objects, &map, 0), Err(SessionError::NoActiveLevel)));
        assert!(!s.saves_dir().exists());
    }

    // ── load_save ──

    #[test]
    fn loaded_save_is_resumed_without_advancing() {
        let root = root_with_levels(&["a.json", "b.json", "c.json"]);
        let mut s = LevelSession::initialize(root.path()).unwrap();
        s.advance_level();
        s.advance_level();
        let (map, objects) = sample_state();
        let name = s.save_snapshot(&objects, &map, 9).unwrap();

        let mut fresh = LevelSession::initialize(root.path()).unwrap();
        fresh.load_save(&fresh.saves_dir().join(name)).unwrap();
        assert_eq!(fresh.current_index(), Some(1));
        assert!(fresh.resume_pending());

        assert!(fresh.advance_level());
        assert_eq!(fresh.current_index(), Some(1));
        assert!(!fresh.resume_pending());
        let doc = fresh.load_current_level().unwrap();
        assert!(doc.is_snapshot());
        assert_eq!(doc.elapsed(), 9);
        assert_eq!(doc.objects(), objects);

        assert!(fresh.advance_level());
        assert_eq!(fresh.current_index(), Some(2));
        assert!(!fresh.load_current_level().unwrap().is_snapshot());
    }

    #[test]
    fn save_for_unknown_level_leaves_session_alone() {
        let root = root_with_levels(&["a.json"]);
        let mut s = LevelSession::initialize(root.path()).unwrap();
        let (map, objects) = sample_state();
        let snap = Snapshot::capture(5, &map, &objects, 0);
        std::fs::create_dir(s.saves_dir()).unwrap();
        let path = s.saves_dir().join("Save_001_Level_006.json");
        codec::write_document(&snap, &path).unwrap();

        let err = s.load_save(&path).unwrap_err();
        assert!(matches!(err, SessionError::UnknownLevel { level: 5, count: 1 }));
        assert_eq!(s.current_index(), None);
        assert!(!s.resume_pending());
    }

    #[test]
    fn missing_save_is_not_found() {
        let root = root_with_levels(&["a.json"]);
        let mut s = LevelSession::initialize(root.path()).unwrap();
        let err = s.load_save(&root.path().join("Saves/none.json")).unwrap_err();
        assert!(matches!(err, SessionError::Document(DocumentError::NotFound { .. })));
    }

    // ── select_save ──

    #[test]
    fn parse_choice_cases() {
        assert_eq!(parse_choice("0", 3), Ok(SaveChoice::Play));
        assert_eq!(parse_choice(" 2 \n", 3), Ok(SaveChoice::Load(1)));
        assert_eq!(parse_choice("3", 3), Ok(SaveChoice::Load(2)));
        assert_eq!(parse_choice("4", 3), Err(SelectionError::OutOfRange { choice: 4, max: 3 }));
        assert_eq!(parse_choice("-1", 3), Err(SelectionError::OutOfRange { choice: -1, max: 3 }));
        assert_eq!(parse_choice("two", 3), Err(SelectionError::NotANumber { input: "two".into() }));
        assert_eq!(parse_choice("", 3), Err(SelectionError::NotANumber { input: String::new() }));
    }

    #[test]
    fn no_saves_skips_prompt() {
        let root = root_with_levels(&["a.json"]);
        let mut s = LevelSession::initialize(root.path()).unwrap();
        let mut prompt = ScriptedPrompt::new(&["1"]);
        assert_eq!(s.select_save(&mut prompt).unwrap(), None);
        assert!(prompt.told_empty);
        assert_eq!(prompt.answers.len(), 1);
        assert!(s.advance_level());
        assert_eq!(s.current_index(), Some(0));
    }

    #[test]
    fn bad_answers_are_reprompted_until_play() {
        let root = root_with_levels(&["a.json"]);
        let mut s = LevelSession::initialize(root.path()).unwrap();
        s.advance_level();
        let (map, objects) = sample_state();
        s.save_snapshot(&objects, &map, 0).unwrap();

        let mut fresh = LevelSession::initialize(root.path()).unwrap();
        let mut prompt = ScriptedPrompt::new(&["x", "7", "0", "1"]);
        assert_eq!(fresh.select_save(&mut prompt).unwrap(), None);
        assert_eq!(prompt.listed, ["Save_001_Level_001.json"]);
        assert_eq!(prompt.rejections.len(), 2);
        assert_eq!(fresh.current_index(), None);
        assert!(!fresh.resume_pending());
    }

    #[test]
    fn valid_answer_loads_save() {
        let root = root_with_levels(&["a.json", "b.json"]);
        let mut s = LevelSession::initialize(root.path()).unwrap();
        s.advance_level();
        s.advance_level();
        let (map, objects) = sample_state();
        s.save_snapshot(&objects, &map, 5).unwrap();

        let mut fresh = LevelSession::initialize(root.path()).unwrap();
        let mut prompt = ScriptedPrompt::new(&["1"]);
        let loaded = fresh.select_save(&mut prompt).unwrap();
        assert!(loaded.is_some());
        assert_eq!(fresh.current_index(), Some(1));
        assert!(fresh.resume_pending());
        assert!(prompt.rejections.is_empty());
    }

    #[test]
    fn unloadable_save_is_reported_and_reprompted() {
        let root = root_with_levels(&["a.json"]);
        let mut s = LevelSession::initialize(root.path()).unwrap();
        std::fs::create_dir(s.saves_dir()).unwrap();
        std::fs::write(s.saves_dir().join("Save_001_Level_001.json"), "garbage").unwrap();

        let mut prompt = ScriptedPrompt::new(&["1", "0"]);
        assert_eq!(s.select_save(&mut prompt).unwrap(), None);
        assert_eq!(prompt.rejections.len(), 1);
        assert_eq!(s.current_index(), None);
    }

    #[test]
    fn exhausted_input_plays_from_start() {
        let root = root_with_levels(&["a.json"]);
        let mut s = LevelSession::initialize(root.path()).unwrap();
        s.advance_level();
        let (map, objects) = sample_state();
        s.save_snapshot(&objects, &map, 0).unwrap();

        let mut fresh = LevelSession::initialize(root.path()).unwrap();
        let mut prompt = ScriptedPrompt::new(&[]);
        assert_eq!(fresh.select_save(&mut prompt).unwrap(), None);
        assert!(!fresh.resume_pending());
    }
}
