//! Statistics document storage
//!
//! Reads and writes the JSON documents under the balancer directory.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::models::StatisticsStore;

/// Default directory, relative to the working directory
pub const DEFAULT_DIR: &str = ".test-balancer";

/// Name of the main document
pub const MAIN_FILE: &str = "main.json";

/// Storage for the main document and runner-scoped copies
#[derive(Clone, Debug)]
pub struct MapStorage {
    /// Directory holding every document
    base_dir: PathBuf,

    /// History limit applied when loading
    max_durations: usize,
}

impl MapStorage {
    pub fn new(base_dir: impl Into<PathBuf>, max_durations: usize) -> Self {
        Self {
            base_dir: base_dir.into(),
            max_durations,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the main document
    pub fn main_path(&self) -> PathBuf {
        self.base_dir.join(MAIN_FILE)
    }

    /// Path a document named `name` is saved to
    pub fn path_for(&self, name: &str) -> PathBuf {
        let mut name = name.to_string();
        while let Some(stripped) = name.strip_suffix(".json.json") {
            name = format!("{stripped}.json");
        }
        if !name.ends_with(".json") {
            name.push_str(".json");
        }

        let path = PathBuf::from(&name);
        if path.is_absolute() {
            path
        } else {
            self.base_dir.join(path)
        }
    }

    /// Create the directory and an empty main document.
    ///
    /// Existing ones are kept unless forced. Forcing the directory re-creates
    /// it without touching files already inside. Returns whether the directory
    /// and the main document were (re)created.
    pub fn initialize(&self, force_dir: bool, force_file: bool) -> Result<(bool, bool)> {
        let mut dir_created = false;
        if force_dir || !self.base_dir.exists() {
            fs::create_dir_all(&self.base_dir).with_context(|| {
                format!("Failed to create directory: {}", self.base_dir.display())
            })?;
            debug!("Created directory {} (force: {force_dir})", self.base_dir.display());
            dir_created = true;
        }

        let main = self.main_path();
        let mut file_created = false;
        if force_file || !main.exists() {
            self.write(&StatisticsStore::new(), &main)?;
            debug!("Initialized {} (force: {force_file})", main.display());
            file_created = true;
        }

        Ok((dir_created, file_created))
    }

    /// Load the main document, initializing it first when missing
    pub fn load(&self) -> Result<StatisticsStore> {
        self.initialize(false, false)?;
        self.load_from_path(&self.main_path())
    }

    /// Load any document, migrating legacy shapes
    pub fn load_from_path(&self, path: &Path) -> Result<StatisticsStore> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open statistics file: {}", path.display()))?;
        let reader = BufReader::new(file);

        let mut store: StatisticsStore = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse statistics file: {}", path.display()))?;
        store.recompute_all(self.max_durations);

        debug!("Loaded statistics from {}", path.display());
        Ok(store)
    }

    /// Save to the main document, or to `name` inside the directory
    pub fn save(&self, store: &StatisticsStore, name: Option<&str>) -> Result<PathBuf> {
        let path = match name {
            Some(name) => self.path_for(name),
            None => self.main_path(),
        };
        self.save_to_path(store, &path)?;
        Ok(path)
    }

    /// Save to an explicit path
    pub fn save_to_path(&self, store: &StatisticsStore, path: &Path) -> Result<()> {
        self.write(store, path)?;
        info!("Saved statistics to {}", path.display());
        Ok(())
    }

    /// Serialize next to `path`, then move into place; `path` is left intact
    /// on any failure.
    fn write(&self, store: &StatisticsStore, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

        let mut tmp = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, store)
                .with_context(|| format!("Failed to write statistics file: {}", path.display()))?;
            writer
                .flush()
                .with_context(|| format!("Failed to write statistics file: {}", path.display()))?;
        }

        tmp.persist(path)
            .with_context(|| format!("Failed to replace statistics file: {}", path.display()))?;
        Ok(())
    }

    /// Delete a document
    pub fn remove(&self, path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path)
                .with_context(|| format!("Failed to delete {}", path.display()))?;
            info!("Deleted {}", path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use tempfile::TempDir;

    fn storage(dir: &TempDir) -> MapStorage {
        MapStorage::new(dir.path().join(DEFAULT_DIR), 3)
    }

    #[test]
    fn test_initialize() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);

        assert_eq!(storage.initialize(false, false).unwrap(), (true, true));
        assert!(storage.main_path().exists());
        assert_eq!(storage.initialize(false, false).unwrap(), (false, false));
        assert_eq!(storage.initialize(false, true).unwrap(), (false, true));

        let content = fs::read_to_string(storage.main_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value, serde_json::json!({ "e2e": {}, "component": {} }));
    }

    #[test]
    fn test_initialize_force_dir_keeps_existing_files() {
        let dir = TempDir::new().unwrap();
        let storage = MapStorage::new(dir.path(), 3);
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        storage.initialize(false, false).unwrap();
        let runner_file = storage
            .save(&StatisticsStore::new(), Some("spec-map-1-2.json"))
            .unwrap();

        assert_eq!(storage.initialize(true, false).unwrap(), (true, false));
        assert!(runner_file.exists());
        assert!(storage.main_path().exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("package.json")).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_save_replaces_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        storage.initialize(false, false).unwrap();

        let mut store = StatisticsStore::new();
        store.ensure_entry(Category::E2e, "a.cy.ts", false);
        storage.save(&store, None).unwrap();
        storage.save(&store, None).unwrap();

        let names: Vec<_> = fs::read_dir(storage.base_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec![MAIN_FILE.to_string()]);
        assert_eq!(storage.load().unwrap(), store);
    }

    #[test]
    fn test_failed_save_keeps_target() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        storage.initialize(false, false).unwrap();

        // a non-empty directory cannot be replaced by a file
        let target = storage.base_dir().join("occupied.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), "keep").unwrap();

        assert!(storage.save_to_path(&StatisticsStore::new(), &target).is_err());
        assert_eq!(fs::read_to_string(target.join("keep.txt")).unwrap(), "keep");
        let entries = fs::read_dir(storage.base_dir()).unwrap().count();
        assert_eq!(entries, 2);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);

        let mut store = StatisticsStore::new();
        store.ensure_entry(Category::E2e, "a.cy.ts", false);
        store
            .record_duration(Category::E2e, "a.cy.ts", 120.0, 3)
            .unwrap();
        storage.save(&store, None).unwrap();

        assert_eq!(storage.load().unwrap(), store);
    }

    #[test]
    fn test_load_initializes_missing_file() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let store = storage.load().unwrap();
        assert!(store.is_empty());
        assert!(storage.main_path().exists());
    }

    #[test]
    fn test_load_migrates_legacy_document() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        storage.initialize(false, false).unwrap();
        fs::write(
            storage.main_path(),
            r#"{"e2e":{"a.cy.ts":{"stats":{"durations":[100,200,300,400],"average":250}}}}"#,
        )
        .unwrap();

        let store = storage.load().unwrap();
        let stats = &store.get(Category::E2e, "a.cy.ts").unwrap().stats;
        assert_eq!(stats.durations, vec![200.0, 300.0, 400.0]);
        assert_eq!(stats.median, 300.0);
        assert_eq!(stats.average, 300.0);
        assert_eq!(store.len(Category::Component), 0);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        storage.initialize(false, false).unwrap();
        fs::write(storage.main_path(), "not json").unwrap();
        assert!(storage.load().is_err());
    }

    #[test]
    fn test_path_for() {
        let storage = MapStorage::new("/tmp/balancer", 10);
        assert_eq!(
            storage.path_for("spec-map-1-2.json"),
            PathBuf::from("/tmp/balancer/spec-map-1-2.json")
        );
        assert_eq!(
            storage.path_for("backup.json.json"),
            PathBuf::from("/tmp/balancer/backup.json")
        );
        assert_eq!(
            storage.path_for("backup"),
            PathBuf::from("/tmp/balancer/backup.json")
        );
        assert_eq!(
            storage.path_for("/var/out/merged.json"),
            PathBuf::from("/var/out/merged.json")
        );
    }

    #[test]
    fn test_remove() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let path = storage.save(&StatisticsStore::new(), Some("peer")).unwrap();
        assert!(path.exists());
        storage.remove(&path).unwrap();
        assert!(!path.exists());
        storage.remove(&path).unwrap();
    }
}
