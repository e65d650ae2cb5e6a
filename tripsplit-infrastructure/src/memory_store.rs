use std::sync::Mutex;

use tripsplit_application::{GroupStore, StoreError};

/// Keeps the snapshot in process memory.
#[derive(Default)]
pub struct MemoryGroupStore {
    snapshot: Mutex<Option<String>>,
}

impl MemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: impl Into<String>) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot.into())),
        }
    }

    pub fn snapshot(&self) -> Option<String> {
        self.snapshot
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl GroupStore for MemoryGroupStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        let guard = self
            .snapshot
            .lock()
            .map_err(|_| StoreError::Unavailable("snapshot lock poisoned".to_owned()))?;
        Ok(guard.clone())
    }

    fn save(&self, snapshot: &str) -> Result<(), StoreError> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|_| StoreError::Unavailable("snapshot lock poisoned".to_owned()))?;
        *guard = Some(snapshot.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_latest_snapshot() {
        let store = MemoryGroupStore::new();
        assert_eq!(store.load().unwrap(), None);

        store.save("{\"id\":\"g\"}").unwrap();
        store.save("{\"id\":\"h\"}").unwrap();

        assert_eq!(store.load().unwrap().as_deref(), Some("{\"id\":\"h\"}"));
        assert_eq!(store.snapshot().as_deref(), Some("{\"id\":\"h\"}"));
    }
}
