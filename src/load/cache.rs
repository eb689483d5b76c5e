use crate::compile::Template;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError, RwLock},
};

/// Compiled templates by path.
///
/// Readers take a shared lock. Compiling a template takes a mutex held for
/// that path only, so two threads never compile the same file at once while
/// other files load in parallel.
#[derive(Debug, Default)]
pub struct Cache {
    entries: RwLock<HashMap<PathBuf, Arc<Template>>>,
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached [`Template`] compiled from the path.
    pub fn get(&self, path: &Path) -> Option<Arc<Template>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    /// Store the [`Template`], replacing any older one for the same path.
    pub fn insert(&self, path: PathBuf, template: Arc<Template>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, template);
    }

    /// Remove the [`Template`] compiled from the path.
    pub fn remove(&self, path: &Path) -> Option<Arc<Template>> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)
    }

    /// Return the mutex that serializes compiling the path.
    pub fn lock(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);

        Arc::clone(locks.entry(path.to_owned()).or_default())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::Cache;
    use crate::compile::Template;
    use std::{path::Path, sync::Arc};

    #[test]
    fn test_insert_replace_remove() {
        let cache = Cache::new();
        let path = Path::new("a.html");

        cache.insert(path.to_owned(), Arc::new(Template::default()));
        let first = cache.get(path).unwrap();
        cache.insert(path.to_owned(), Arc::new(Template::default()));

        assert_eq!(cache.len(), 1);
        assert!(!Arc::ptr_eq(&first, &cache.get(path).unwrap()));
        assert!(cache.remove(path).is_some());
        assert!(cache.get(path).is_none());
    }

    #[test]
    fn test_lock_is_per_path() {
        let cache = Cache::new();

        assert!(Arc::ptr_eq(&cache.lock(Path::new("a")), &cache.lock(Path::new("a"))));
        assert!(!Arc::ptr_eq(&cache.lock(Path::new("a")), &cache.lock(Path::new("b"))));
    }
}
