use potion_core::stats::{KeyValueStore, StoreError};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{Level, event};

/// Key-value store kept as a single JSON object on disk.
///
/// Writes are buffered until `commit`, which replaces the file through a
/// temporary sibling so a failed save never leaves a half-written document.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    dirty: bool,
    recovered_from: Option<PathBuf>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut recovered_from = None;
        let entries = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
                Ok(entries) => entries,
                Err(err) => {
                    let backup = backup_path(&path);
                    fs::rename(&path, &backup)?;
                    event!(
                        target: "potion_tracker::store",
                        Level::WARN,
                        path = %path.display(),
                        backup = %backup.display(),
                        error = %err,
                        "statistics file unreadable; starting empty"
                    );
                    recovered_from = Some(backup);
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path,
            entries,
            dirty: false,
            recovered_from,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unreadable document was moved when the store was opened.
    pub fn recovered_from(&self) -> Option<&Path> {
        self.recovered_from.as_deref()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        if self.entries.get(key) != Some(&value) {
            self.entries.insert(key.to_string(), value);
            self.dirty = true;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if !self.dirty && self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let document = serde_json::to_string_pretty(&self.entries)?;
        let staging = staging_path(&self.path);
        fs::write(&staging, document)?;
        fs::rename(&staging, &self.path)?;
        self.dirty = false;

        event!(
            target: "potion_tracker::store",
            Level::DEBUG,
            path = %self.path.display(),
            keys = self.entries.len(),
            "statistics file written"
        );
        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".corrupt");
    path.with_file_name(name)
}
