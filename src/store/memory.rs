use async_trait::async_trait;
use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use super::{MessageStore, Result, StoreError};

/// In-process store with switchable failures.
#[derive(Default)]
pub struct MemoryMessageStore {
    message: Mutex<Option<String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryMessageStore {
    pub fn with_message(message: &str) -> Self {
        let store = Self::default();
        *store.message.lock().expect("store lock") = Some(message.to_string());
        store
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn injected() -> StoreError {
        StoreError::Io(std::io::Error::other("injected failure"))
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn get(&self) -> Result<String> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        Ok(self.message.lock().expect("store lock").clone().unwrap_or_default())
    }

    async fn set(&self, message: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        *self.message.lock().expect("store lock") = Some(message.to_string());
        Ok(())
    }
}
