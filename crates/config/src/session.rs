use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Recent files kept in the session
const RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Session {
    pub version: u32,
    /// Folder holding the module files of the current project
    pub project_folder: Option<PathBuf>,
    pub current_file: Option<PathBuf>,
    pub recent_files: Vec<PathBuf>,
}

impl Session {
    pub fn path() -> PathBuf {
        crate::config_dir().join("session.json")
    }

    pub fn load() -> Option<Self> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        fs::read_to_string(path).ok()
            .and_then(|s| serde_json::from_str(&s).ok())
    }

    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Record an opened file; its folder becomes the project folder.
    pub fn opened(&mut self, file: &Path) {
        let file = file.to_path_buf();
        if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.project_folder = Some(parent.to_path_buf());
        }
        self.recent_files.retain(|f| *f != file);
        self.recent_files.insert(0, file.clone());
        self.recent_files.truncate(RECENT_LIMIT);
        self.current_file = Some(file);
    }
}
