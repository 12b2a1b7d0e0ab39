//! Frecency store for `cd`.
//!
//! Every successful `cd` bumps the score of the directory it landed in. When a
//! `cd` argument does not exist on disk, [`DirectoryStore::resolve`] picks the
//! best-scored directory whose name (or, failing that, whose full path)
//! contains the argument.
//!
//! The collection is written to disk after every change. `exit` terminates the
//! process on the spot, so there is no later point at which to flush.

use crate::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One visited directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Canonical absolute path; unique within a store.
    pub path: PathBuf,
    /// Number of successful visits.
    pub score: f64,
    pub last_visit: DateTime<Utc>,
}

/// Persistent collection of [`DirectoryEntry`] values, in insertion order.
///
/// Entries are never evicted.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DirectoryStore {
    #[serde(default)]
    entries: Vec<DirectoryEntry>,
    #[serde(skip)]
    db_path: Option<PathBuf>,
}

impl DirectoryStore {
    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the store backed by `db_path`.
    ///
    /// A missing or unreadable file yields an empty store; later saves still
    /// target `db_path`.
    pub fn load(db_path: impl Into<PathBuf>) -> Self {
        let db_path = db_path.into();
        let entries = match fs::read_to_string(&db_path) {
            Ok(data) => match serde_json::from_str::<DirectoryStore>(&data) {
                Ok(stored) => stored.entries,
                Err(e) => {
                    warn!("ignoring unparsable directory store {}: {}", db_path.display(), e);
                    Vec::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!("cannot read directory store {}: {}", db_path.display(), e);
                Vec::new()
            }
        };
        debug!(
            "loaded {} directory entries from {}",
            entries.len(),
            db_path.display()
        );
        Self {
            entries,
            db_path: Some(db_path),
        }
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a visit to `path`, then persist.
    ///
    /// The path is made absolute and cleaned first so that `a/../b` and `b`
    /// land on the same entry. Persistence failures are ignored.
    pub fn record_visit(&mut self, path: &Path) {
        let path = match paths::absolutize(path) {
            Ok(p) => p,
            Err(e) => {
                debug!("not recording {}: {}", path.display(), e);
                return;
            }
        };
        self.record_canonical(path, Utc::now());
        if let Err(e) = self.save() {
            debug!("directory store not saved: {}", e);
        }
    }

    fn record_canonical(&mut self, path: PathBuf, now: DateTime<Utc>) {
        match self.entries.iter_mut().find(|e| e.path == path) {
            Some(entry) => {
                entry.score += 1.0;
                entry.last_visit = now;
            }
            None => self.entries.push(DirectoryEntry {
                path,
                score: 1.0,
                last_visit: now,
            }),
        }
    }

    /// Best stored match for a `cd` argument that does not exist on disk.
    ///
    /// Entries are ranked by score, ties keeping insertion order. The first
    /// entry whose last path component contains `partial` wins; failing that,
    /// the first whose full path contains it. With no match `partial` comes
    /// back unchanged.
    pub fn resolve(&self, partial: &str) -> PathBuf {
        let mut ranked: Vec<&DirectoryEntry> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        let by_name = ranked.iter().find(|entry| {
            entry
                .path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().contains(partial))
        });
        if let Some(entry) = by_name {
            return entry.path.clone();
        }

        let by_path = ranked
            .iter()
            .find(|entry| entry.path.to_string_lossy().contains(partial));
        if let Some(entry) = by_path {
            return entry.path.clone();
        }

        PathBuf::from(partial)
    }

    /// Write the whole collection as indented JSON.
    ///
    /// A store without a backing file has nothing to do.
    pub fn save(&self) -> io::Result<()> {
        let Some(db_path) = &self.db_path else {
            return Ok(());
        };
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(db_path, data)?;
        debug!("saved {} directory entries", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(path: &str, score: f64) -> DirectoryEntry {
        DirectoryEntry {
            path: PathBuf::from(path),
            score,
            last_visit: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    fn store_with(entries: Vec<DirectoryEntry>) -> DirectoryStore {
        DirectoryStore {
            entries,
            db_path: None,
        }
    }

    #[test]
    fn repeated_visits_keep_one_entry_per_path() {
        let mut store = DirectoryStore::in_memory();
        store.record_visit(Path::new("/srv/app"));
        store.record_visit(Path::new("/srv/logs"));
        store.record_visit(Path::new("/srv/app/"));
        store.record_visit(Path::new("/srv/./logs/../app"));

        assert_eq!(store.len(), 2);
        let app = &store.entries()[0];
        assert_eq!(app.path, PathBuf::from("/srv/app"));
        assert_eq!(app.score, 3.0);
        assert_eq!(store.entries()[1].score, 1.0);
    }

    #[test]
    fn visit_refreshes_timestamp() {
        let mut store = store_with(vec![entry("/srv/app", 2.0)]);
        let before = store.entries()[0].last_visit;
        store.record_visit(Path::new("/srv/app"));
        assert!(store.entries()[0].last_visit > before);
        assert_eq!(store.entries()[0].score, 3.0);
    }

    #[test]
    fn relative_visits_are_made_absolute() {
        let mut store = DirectoryStore::in_memory();
        store.record_visit(Path::new("some/where"));
        assert!(store.entries()[0].path.is_absolute());
        assert!(store.entries()[0].path.ends_with("some/where"));
    }

    #[test]
    fn higher_score_wins_on_leaf_name() {
        let store = store_with(vec![
            entry("/home/u/other-proj", 1.0),
            entry("/home/u/project", 5.0),
        ]);
        assert_eq!(store.resolve("proj"), PathBuf::from("/home/u/project"));
    }

    #[test]
    fn equal_scores_keep_insertion_order() {
        let store = store_with(vec![entry("/a/web-api", 2.0), entry("/b/web-ui", 2.0)]);
        for _ in 0..5 {
            assert_eq!(store.resolve("web"), PathBuf::from("/a/web-api"));
        }
    }

    #[test]
    fn leaf_match_beats_higher_scored_path_match() {
        let store = store_with(vec![
            entry("/work/notes/inbox", 10.0),
            entry("/tmp/notes-old", 1.0),
        ]);
        // "/work/notes/inbox" only contains "notes" in a parent segment.
        assert_eq!(store.resolve("notes"), PathBuf::from("/tmp/notes-old"));
    }

    #[test]
    fn falls_back_to_full_path_match() {
        let store = store_with(vec![entry("/work/notes/inbox", 1.0)]);
        assert_eq!(store.resolve("work/no"), PathBuf::from("/work/notes/inbox"));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let store = store_with(vec![entry("/home/u/Project", 1.0)]);
        assert_eq!(store.resolve("project"), PathBuf::from("project"));
    }

    #[test]
    fn no_match_returns_input() {
        let store = store_with(vec![entry("/home/u/project", 3.0)]);
        assert_eq!(store.resolve("zzz"), PathBuf::from("zzz"));
        assert_eq!(DirectoryStore::in_memory().resolve("zzz"), PathBuf::from("zzz"));
    }

    #[test]
    fn resolve_does_not_reorder_entries() {
        let store = store_with(vec![entry("/a", 1.0), entry("/b", 9.0)]);
        store.resolve("b");
        assert_eq!(store.entries()[0].path, PathBuf::from("/a"));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("directory.json");

        let mut store = DirectoryStore::load(&db);
        assert!(store.is_empty());
        store.record_visit(Path::new("/srv/app"));
        store.record_visit(Path::new("/srv/logs"));
        store.record_visit(Path::new("/srv/app"));

        let reloaded = DirectoryStore::load(&db);
        assert_eq!(reloaded.len(), store.len());
        for (a, b) in store.entries().iter().zip(reloaded.entries()) {
            assert_eq!(a.path, b.path);
            assert_eq!(a.score, b.score);
            assert_eq!(a.last_visit.timestamp(), b.last_visit.timestamp());
        }
    }

    #[test]
    fn file_format_is_indented_json() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("directory.json");
        let mut store = DirectoryStore::load(&db);
        store.record_visit(Path::new("/srv/app"));

        let text = fs::read_to_string(&db).unwrap();
        assert!(text.contains("\n  \"entries\""));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let first = &value["entries"][0];
        assert_eq!(first["path"], "/srv/app");
        assert_eq!(first["score"], 1.0);
        assert!(first["last_visit"].is_string());
    }

    #[test]
    fn loads_timestamps_with_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("directory.json");
        fs::write(
            &db,
            r#"{"entries":[{"path":"/x","score":4,"last_visit":"2024-03-02T10:00:00.123456+02:00"}]}"#,
        )
        .unwrap();
        let store = DirectoryStore::load(&db);
        assert_eq!(store.len(), 1);
        assert_eq!(store.entries()[0].score, 4.0);
        assert_eq!(
            store.entries()[0].last_visit.timestamp(),
            Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap().timestamp()
        );
    }

    #[test]
    fn garbage_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("directory.json");
        fs::write(&db, "not json").unwrap();
        assert!(DirectoryStore::load(&db).is_empty());
    }

    #[test]
    fn unwritable_location_degrades_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        // Parent "directory" is a regular file, so every save fails.
        let mut store = DirectoryStore::load(blocker.join("directory.json"));
        store.record_visit(Path::new("/srv/app"));
        store.record_visit(Path::new("/srv/app"));
        assert_eq!(store.entries()[0].score, 2.0);
        assert!(store.save().is_err());
    }
}
