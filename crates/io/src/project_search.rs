// Whole-project text search on a background thread
//
// Results stream back over a channel. The worker checks the cancel flag
// before each file and before each send, so a closed consumer stops it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

use walkdir::WalkDir;

use crate::csv::read_file_as_utf8;
use crate::dat::decode_latin1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Lowercase extensions without the dot
    pub extensions: Vec<String>,
    pub case_insensitive: bool,
    /// Stop after this many hits
    pub max_hits: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["dat".into(), "csv".into()],
            case_insensitive: true,
            max_hits: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub path: PathBuf,
    /// 1-based
    pub line: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    Hit(SearchHit),
    /// A file could not be read; the sweep goes on
    Skipped { path: PathBuf, reason: String },
    Finished { files: usize, hits: usize, cancelled: bool },
}

pub struct SearchHandle {
    cancel: Arc<AtomicBool>,
    events: Receiver<SearchEvent>,
    thread: Option<JoinHandle<()>>,
}

impl SearchHandle {
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> &Receiver<SearchEvent> {
        &self.events
    }

    /// Wait for the worker to finish
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("project search worker panicked");
            }
        }
    }
}

impl Drop for SearchHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Start searching `root` for `needle`.
pub fn spawn(root: PathBuf, needle: String, options: SearchOptions) -> SearchHandle {
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel();
    let flag = Arc::clone(&cancel);
    let thread = std::thread::spawn(move || run(&root, &needle, &options, &flag, &tx));
    SearchHandle { cancel, events: rx, thread: Some(thread) }
}

/// Search loop; runs on the calling thread. An empty needle matches nothing.
pub fn run(root: &Path, needle: &str, options: &SearchOptions, cancel: &AtomicBool, tx: &Sender<SearchEvent>) {
    if needle.is_empty() {
        let _ = tx.send(SearchEvent::Finished { files: 0, hits: 0, cancelled: false });
        return;
    }
    let wanted = if options.case_insensitive { needle.to_lowercase() } else { needle.to_string() };
    let mut files = 0;
    let mut hits = 0;
    let mut cancelled = false;

    'files: for entry in WalkDir::new(root).sort_by_file_name().into_iter().filter_map(Result::ok) {
        if cancel.load(Ordering::SeqCst) {
            cancelled = true;
            break;
        }
        if !entry.file_type().is_file() || !has_extension(entry.path(), &options.extensions) {
            continue;
        }
        files += 1;

        let content = match read_text(entry.path()) {
            Ok(content) => content,
            Err(reason) => {
                if !send(cancel, tx, SearchEvent::Skipped { path: entry.path().to_path_buf(), reason }) {
                    cancelled = true;
                    break;
                }
                continue;
            }
        };

        for (i, line) in content.lines().enumerate() {
            let found = if options.case_insensitive {
                line.to_lowercase().contains(&wanted)
            } else {
                line.contains(&wanted)
            };
            if !found {
                continue;
            }
            let hit = SearchHit {
                path: entry.path().to_path_buf(),
                line: i + 1,
                text: line.trim().to_string(),
            };
            if !send(cancel, tx, SearchEvent::Hit(hit)) {
                cancelled = true;
                break 'files;
            }
            hits += 1;
            if options.max_hits.is_some_and(|max| hits >= max) {
                break 'files;
            }
        }
    }

    log::info!("project search '{needle}': {hits} hits in {files} files");
    // Receiver may be gone already
    let _ = tx.send(SearchEvent::Finished { files, hits, cancelled });
}

/// Send unless cancelled. False means stop.
fn send(cancel: &AtomicBool, tx: &Sender<SearchEvent>, event: SearchEvent) -> bool {
    if cancel.load(Ordering::SeqCst) {
        return false;
    }
    tx.send(event).is_ok()
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| extensions.iter().any(|want| *want == ext))
}

fn read_text(path: &Path) -> Result<String, String> {
    let is_dat = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("dat"));
    if is_dat {
        std::fs::read(path).map(|b| decode_latin1(&b)).map_err(|e| e.to_string())
    } else {
        read_file_as_utf8(path).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn project() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("varexp.dat"), b"Nom,Desc\r\nPUMP_1,pompe \xe9tage\r\n").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("EVENT.DAT"), "EVT,pump_alarm\r\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "pump\n").unwrap();
        dir
    }

    fn collect(rx: &Receiver<SearchEvent>) -> Vec<SearchEvent> {
        rx.iter().collect()
    }

    #[test]
    fn test_finds_hits_in_matching_extensions() {
        let dir = project();
        let (tx, rx) = mpsc::channel();
        run(dir.path(), "PUMP", &SearchOptions::default(), &AtomicBool::new(false), &tx);
        drop(tx);

        let events = collect(&rx);
        let hits: Vec<&SearchHit> = events
            .iter()
            .filter_map(|e| match e {
                SearchEvent::Hit(h) => Some(h),
                _ => None,
            })
            .collect();
        assert_eq!(hits.len(), 2);
        let varexp = hits.iter().find(|h| h.path.ends_with("varexp.dat")).unwrap();
        assert_eq!(varexp.line, 2);
        assert!(varexp.text.contains("étage"));
        assert_eq!(
            events.last(),
            Some(&SearchEvent::Finished { files: 2, hits: 2, cancelled: false })
        );
    }

    #[test]
    fn test_case_sensitive_and_max_hits() {
        let dir = project();
        let (tx, rx) = mpsc::channel();
        let options = SearchOptions { case_insensitive: false, ..Default::default() };
        run(dir.path(), "pump", &options, &AtomicBool::new(false), &tx);
        drop(tx);
        assert!(matches!(collect(&rx).last(), Some(SearchEvent::Finished { hits: 1, .. })));

        let (tx, rx) = mpsc::channel();
        let options = SearchOptions { max_hits: Some(1), ..Default::default() };
        run(dir.path(), "pump", &options, &AtomicBool::new(false), &tx);
        drop(tx);
        assert!(matches!(collect(&rx).last(), Some(SearchEvent::Finished { hits: 1, .. })));
    }

    #[test]
    fn test_empty_needle_finds_nothing() {
        let dir = project();
        let (tx, rx) = mpsc::channel();
        run(dir.path(), "", &SearchOptions::default(), &AtomicBool::new(false), &tx);
        drop(tx);
        assert_eq!(
            collect(&rx),
            vec![SearchEvent::Finished { files: 0, hits: 0, cancelled: false }]
        );
    }

    #[test]
    fn test_cancelled_before_start_sends_nothing_else() {
        let dir = project();
        let (tx, rx) = mpsc::channel();
        run(dir.path(), "pump", &SearchOptions::default(), &AtomicBool::new(true), &tx);
        drop(tx);
        assert_eq!(
            collect(&rx),
            vec![SearchEvent::Finished { files: 0, hits: 0, cancelled: true }]
        );
    }

    #[test]
    fn test_spawned_search_completes() {
        let dir = project();
        let handle = spawn(dir.path().to_path_buf(), "pump".into(), SearchOptions::default());
        let mut finished = false;
        for event in handle.events().iter() {
            if let SearchEvent::Finished { cancelled, .. } = event {
                assert!(!cancelled);
                finished = true;
                break;
            }
        }
        assert!(finished);
        handle.join();
    }
}
