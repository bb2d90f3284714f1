use async_trait::async_trait;
use std::{io::ErrorKind, path::PathBuf};
use tokio::sync::Mutex;

use super::{MessageStore, Result, WelcomeMessage};

/// Keeps the record as pretty-printed JSON in a single file.
pub struct FileMessageStore {
    path: PathBuf,
    /// Held for the whole write so concurrent writers never share the temp file.
    write_lock: Mutex<()>,
}

impl FileMessageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl MessageStore for FileMessageStore {
    async fn get(&self) -> Result<String> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(String::new()),
            Err(err) => return Err(err.into()),
        };
        let record: WelcomeMessage = serde_json::from_str(&raw)?;
        Ok(record.content)
    }

    async fn set(&self, message: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let raw = serde_json::to_string_pretty(&WelcomeMessage::new(message))?;

        let _guard = self.write_lock.lock().await;
        // Readers only ever see a complete record: the old one or the renamed new one.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        tracing::debug!(path = %self.path.display(), "welcome message written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MESSAGE_ID, StoreError};
    use tempfile::TempDir;

    fn create_test_store() -> (FileMessageStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileMessageStore::new(temp_dir.path().join("message.json"));
        (store, temp_dir)
    }

    #[tokio::test]
    async fn missing_record_reads_as_empty() {
        let (store, _temp) = create_test_store();
        assert_eq!(store.get().await.expect("get"), "");
    }

    #[tokio::test]
    async fn set_then_get_returns_latest() {
        let (store, _temp) = create_test_store();

        store.set("Exam week").await.expect("first set");
        store.set("Sommerfest am Freitag").await.expect("second set");

        assert_eq!(store.get().await.expect("get"), "Sommerfest am Freitag");
    }

    #[tokio::test]
    async fn record_keeps_fixed_id() {
        let (store, _temp) = create_test_store();
        store.set("Hallo").await.expect("set");

        let raw = std::fs::read_to_string(store.path()).expect("read record");
        let record: WelcomeMessage = serde_json::from_str(&raw).expect("parse record");
        assert_eq!(record, WelcomeMessage { id: MESSAGE_ID, content: "Hallo".into() });
    }

    #[tokio::test]
    async fn corrupt_record_is_an_error() {
        let (store, _temp) = create_test_store();
        std::fs::write(store.path(), "{ not json").expect("write garbage");

        assert!(matches!(store.get().await, Err(StoreError::Json(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writes_leave_a_whole_record() {
        let (store, _temp) = create_test_store();
        let store = std::sync::Arc::new(store);

        for round in 0..20 {
            let writers: Vec<_> = (1..=8)
                .map(|n| {
                    let store = std::sync::Arc::clone(&store);
                    tokio::spawn(async move { store.set(&"x".repeat(n * 10 + round)).await })
                })
                .collect();
            for writer in writers {
                writer.await.expect("writer task").expect("concurrent set");
            }

            let message = store.get().await.expect("get after concurrent writes");
            assert!(message.chars().all(|c| c == 'x'));
            assert_eq!((message.len() - round) % 10, 0);
        }
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn nested_directory_is_created_on_write() {
        let temp = TempDir::new().expect("temp dir");
        let store = FileMessageStore::new(temp.path().join("data").join("message.json"));

        store.set("Tag der offenen Tür").await.expect("set");
        assert_eq!(store.get().await.expect("get"), "Tag der offenen Tür");
    }
}
