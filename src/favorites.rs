use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::warn;

use crate::utils;

/// Membership view handed to the filter engine.
pub type FavoritesSet = HashSet<String>;

#[derive(Debug, thiserror::Error)]
pub enum FavoritesError {
    #[error("favorites io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("favorites serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The user's favorited events, keyed by slug so the same event favorited
/// from any card, modal or deep link converges to one state.
///
/// Persisted as an ordered JSON array and rewritten on every mutation;
/// there is nothing to batch at this scale and an immediate write is what
/// keeps a second tab honest.
pub struct FavoritesStore {
    path: PathBuf,
    slugs: Mutex<Vec<String>>,
}

impl FavoritesStore {
    pub fn load_default() -> Self {
        Self::load(utils::favorites_path())
    }

    /// A missing or unreadable file starts an empty set; favorites are not
    /// worth failing startup over.
    pub fn load(path: PathBuf) -> Self {
        let slugs = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str::<Vec<String>>(&text).unwrap_or_else(|err| {
                warn!("discarding unreadable favorites file {:?}: {err}", path);
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };
        Self {
            path,
            slugs: Mutex::new(slugs),
        }
    }

    pub fn is_favorited(&self, slug: &str) -> bool {
        self.slugs
            .lock()
            .expect("favorites mutex poisoned")
            .iter()
            .any(|s| s == slug)
    }

    /// Flip the slug's membership, persist, and return the new state.
    pub fn toggle(&self, slug: &str) -> Result<bool, FavoritesError> {
        let mut guard = self.slugs.lock().expect("favorites mutex poisoned");
        let favorited = match guard.iter().position(|s| s == slug) {
            Some(index) => {
                guard.remove(index);
                false
            }
            None => {
                guard.push(slug.to_string());
                true
            }
        };
        self.persist(&guard)?;
        Ok(favorited)
    }

    /// Current membership, for filtering.
    pub fn snapshot(&self) -> FavoritesSet {
        self.slugs
            .lock()
            .expect("favorites mutex poisoned")
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slugs.lock().expect("favorites mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self, slugs: &[String]) -> Result<(), FavoritesError> {
        utils::ensure_parent(&self.path);
        let contents = serde_json::to_string_pretty(slugs)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn toggle_persists_and_reloads() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("favorites.json");

        let store = FavoritesStore::load(path.clone());
        assert!(store.toggle("na-pista").unwrap());
        assert!(store.toggle("beije").unwrap());
        assert!(store.is_favorited("na-pista"));

        let reloaded = FavoritesStore::load(path);
        assert!(reloaded.is_favorited("na-pista"));
        assert!(reloaded.is_favorited("beije"));
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn toggle_is_idempotent_per_slug() {
        let dir = tempdir().expect("temp dir");
        let store = FavoritesStore::load(dir.path().join("favorites.json"));

        assert!(store.toggle("na-pista").unwrap());
        assert!(!store.toggle("na-pista").unwrap());
        assert!(!store.is_favorited("na-pista"));
        assert!(store.is_empty());
    }

    #[test]
    fn persisted_order_follows_insertion() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("favorites.json");
        let store = FavoritesStore::load(path.clone());
        store.toggle("b").unwrap();
        store.toggle("a").unwrap();

        let text = std::fs::read_to_string(path).unwrap();
        let order: Vec<String> = serde_json::from_str(&text).unwrap();
        assert_eq!(order, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("favorites.json");
        std::fs::write(&path, "not json").unwrap();
        let store = FavoritesStore::load(path);
        assert!(store.is_empty());
    }
}
