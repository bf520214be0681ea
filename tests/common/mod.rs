use metior::config::SessionConfig;
use metior::responder::CannedResponder;
use metior::session::{Chat, SessionStore};
use metior::storage::{ChatRepository, KeyValueStore, SnapshotRepository, SqliteStore};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[allow(dead_code)]
pub const REPLY: &str = "canned reply";

#[allow(dead_code)]
pub fn create_temp_kv() -> (Arc<dyn KeyValueStore>, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = SqliteStore::new_with_path(tmp.path().join("chats.db"))
        .expect("failed to create sqlite store with path");
    (Arc::new(store), tmp)
}

#[allow(dead_code)]
pub fn session_store(kv: Arc<dyn KeyValueStore>, delay_ms: u64) -> SessionStore {
    let repository = Arc::new(SnapshotRepository::new(kv, "meteior-chats"));
    let responder = Arc::new(CannedResponder::new(
        REPLY,
        Duration::from_millis(delay_ms),
    ));
    SessionStore::new(repository, responder, SessionConfig::default())
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Repository wrapper that counts snapshot writes
#[allow(dead_code)]
pub struct CountingRepository {
    inner: SnapshotRepository,
    saves: AtomicUsize,
}

#[allow(dead_code)]
impl CountingRepository {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: SnapshotRepository::new(kv, "meteior-chats"),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl ChatRepository for CountingRepository {
    fn load(&self) -> metior::Result<Vec<Chat>> {
        self.inner.load()
    }

    fn save(&self, chats: &[Chat]) -> metior::Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(chats)
    }
}
