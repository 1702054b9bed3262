use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::sync::Mutex;

/// Result of an add request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyTracked,
}

/// Result of a remove request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// Durable, insertion-ordered list of tracked wallet addresses, stored as
/// a JSON array.
///
/// Addresses are normalized to lower case on the way in and deduplicated
/// at the add boundary. Every load, mutate, save sequence runs under one
/// mutex and the file is replaced through a temp-file rename, so command
/// handlers racing each other (or the poll loop reading mid-command) never
/// observe a torn list.
pub struct WalletStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl WalletStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Current tracked addresses, in insertion order.
    pub async fn snapshot(&self) -> Result<Vec<String>> {
        let _guard = self.lock.lock().await;
        self.load()
    }

    /// Track an address. Reports `AlreadyTracked` without touching the
    /// file when the normalized address is present.
    pub async fn add(&self, address: &str) -> Result<AddOutcome> {
        let address = normalize(address);
        let _guard = self.lock.lock().await;
        let mut wallets = self.load()?;
        if wallets.contains(&address) {
            return Ok(AddOutcome::AlreadyTracked);
        }
        wallets.push(address);
        self.save(&wallets)?;
        Ok(AddOutcome::Added)
    }

    /// Stop tracking an address. Reports `NotFound` without touching the
    /// file when the normalized address is absent.
    pub async fn remove(&self, address: &str) -> Result<RemoveOutcome> {
        let address = normalize(address);
        let _guard = self.lock.lock().await;
        let mut wallets = self.load()?;
        let Some(idx) = wallets.iter().position(|w| *w == address) else {
            return Ok(RemoveOutcome::NotFound);
        };
        wallets.remove(idx);
        self.save(&wallets)?;
        Ok(RemoveOutcome::Removed)
    }

    fn load(&self) -> Result<Vec<String>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            // A store that does not exist yet is an empty list.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read {}", self.path.display()));
            }
        };
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }

    fn save(&self, wallets: &[String]) -> Result<()> {
        let contents =
            serde_json::to_string(wallets).context("failed to serialize wallet list")?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

fn normalize(address: &str) -> String {
    address.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store backed by a unique file under the system temp dir, removed
    /// when the test finishes.
    struct TempStore {
        store: WalletStore,
        path: PathBuf,
    }

    impl TempStore {
        fn new(name: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "wallet_store_{name}_{}.json",
                std::process::id()
            ));
            let _ = std::fs::remove_file(&path);
            Self {
                store: WalletStore::new(&path),
                path,
            }
        }
    }

    impl Drop for TempStore {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty() {
        let t = TempStore::new("missing");
        assert!(t.store.snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_persists_in_insertion_order() {
        let t = TempStore::new("order");
        t.store.add("0xBBB").await.unwrap();
        t.store.add("0xAAA").await.unwrap();
        assert_eq!(t.store.snapshot().await.unwrap(), vec!["0xbbb", "0xaaa"]);
    }

    #[tokio::test]
    async fn duplicate_add_is_case_insensitive_and_leaves_list_unchanged() {
        let t = TempStore::new("dup");
        assert_eq!(t.store.add("0xabc").await.unwrap(), AddOutcome::Added);
        assert_eq!(
            t.store.add("0xABC").await.unwrap(),
            AddOutcome::AlreadyTracked
        );
        assert_eq!(t.store.snapshot().await.unwrap(), vec!["0xabc"]);
    }

    #[tokio::test]
    async fn remove_unknown_leaves_list_unchanged() {
        let t = TempStore::new("rm_unknown");
        t.store.add("0xabc").await.unwrap();
        assert_eq!(
            t.store.remove("0xdef").await.unwrap(),
            RemoveOutcome::NotFound
        );
        assert_eq!(t.store.snapshot().await.unwrap(), vec!["0xabc"]);
    }

    #[tokio::test]
    async fn remove_known_deletes_only_that_entry() {
        let t = TempStore::new("rm_known");
        t.store.add("0xabc").await.unwrap();
        t.store.add("0xdef").await.unwrap();
        assert_eq!(
            t.store.remove("0xABC").await.unwrap(),
            RemoveOutcome::Removed
        );
        assert_eq!(t.store.snapshot().await.unwrap(), vec!["0xdef"]);
    }

    #[tokio::test]
    async fn list_survives_reopening_the_store() {
        let t = TempStore::new("reopen");
        t.store.add("0xabc").await.unwrap();

        let reopened = WalletStore::new(&t.path);
        assert_eq!(reopened.snapshot().await.unwrap(), vec!["0xabc"]);
    }
}
