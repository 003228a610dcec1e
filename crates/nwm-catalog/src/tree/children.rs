//! Lazily populated child mapping shared by every container in the tree.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OnceCell, RwLock};

use crate::error::CatalogResult;

/// Independent snapshot iterator over a container's `(key, child)` pairs.
pub type Entries<K, V> = std::vec::IntoIter<(K, Arc<V>)>;

/// Child mapping that is fetched at most once.
///
/// The mapping stays unloaded until the first read or insert. Only one caller
/// runs the loader; concurrent callers wait for its result. A failed load leaves
/// the mapping unloaded so a later read may retry.
#[derive(Debug)]
pub(crate) struct Children<K, V> {
    cell: OnceCell<RwLock<HashMap<K, Arc<V>>>>,
    // Child count, kept in step with the map so it can be read without the lock
    count: AtomicUsize,
}

impl<K, V> Children<K, V>
where
    K: Eq + Hash + Ord + Clone + Send + Sync,
    V: Send + Sync,
{
    pub(crate) fn new() -> Self {
        Self {
            cell: OnceCell::new(),
            count: AtomicUsize::new(0),
        }
    }

    /// A mapping that is already loaded with the given children.
    pub(crate) fn loaded(children: HashMap<K, Arc<V>>) -> Self {
        Self {
            count: AtomicUsize::new(children.len()),
            cell: OnceCell::new_with(Some(RwLock::new(children))),
        }
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    async fn ensure<F, Fut>(&self, load: F) -> CatalogResult<&RwLock<HashMap<K, Arc<V>>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CatalogResult<HashMap<K, Arc<V>>>>,
    {
        self.cell
            .get_or_try_init(move || async move {
                load().await.map(|children| {
                    self.count.store(children.len(), Ordering::Release);
                    RwLock::new(children)
                })
            })
            .await
    }

    pub(crate) async fn get<Q, F, Fut>(&self, key: &Q, load: F) -> CatalogResult<Option<Arc<V>>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = CatalogResult<HashMap<K, Arc<V>>>>,
    {
        let children = self.ensure(load).await?.read().await;
        Ok(children.get(key).cloned())
    }

    pub(crate) async fn len<F, Fut>(&self, load: F) -> CatalogResult<usize>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CatalogResult<HashMap<K, Arc<V>>>>,
    {
        Ok(self.ensure(load).await?.read().await.len())
    }

    pub(crate) async fn entries<F, Fut>(&self, load: F) -> CatalogResult<Entries<K, V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CatalogResult<HashMap<K, Arc<V>>>>,
    {
        let children = self.ensure(load).await?.read().await;
        Ok(snapshot(&children))
    }

    /// Insert a child, marking the mapping as loaded if it was not yet.
    ///
    /// Returns the child previously stored under the key, if any.
    pub(crate) async fn insert(&self, key: K, value: Arc<V>) -> Option<Arc<V>> {
        let children = self
            .cell
            .get_or_init(|| async { RwLock::new(HashMap::new()) })
            .await;
        let mut children = children.write().await;
        let previous = children.insert(key, value);
        if previous.is_none() {
            self.count.fetch_add(1, Ordering::AcqRel);
        }
        previous
    }

    /// Number of children if the mapping is loaded, without waiting on the lock.
    pub(crate) fn loaded_len(&self) -> Option<usize> {
        if self.cell.initialized() {
            Some(self.count.load(Ordering::Acquire))
        } else {
            None
        }
    }

    /// Entries of an already loaded mapping, without triggering a load.
    pub(crate) async fn peek(&self) -> Option<Entries<K, V>> {
        match self.cell.get() {
            Some(children) => Some(snapshot(&*children.read().await)),
            None => None,
        }
    }
}

/// Copy the current children out so the caller iterates without holding the lock.
fn snapshot<K: Ord + Clone, V>(children: &HashMap<K, Arc<V>>) -> Entries<K, V> {
    let mut entries: Vec<_> = children
        .iter()
        .map(|(key, value)| (key.clone(), Arc::clone(value)))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries.into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HashMap<String, Arc<u32>> {
        HashMap::from([("a".to_string(), Arc::new(1)), ("b".to_string(), Arc::new(2))])
    }

    #[tokio::test]
    async fn test_loads_once() {
        let calls = AtomicUsize::new(0);
        let children: Children<String, u32> = Children::new();
        let counter = &calls;
        let load = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(sample())
        };

        assert!(!children.is_loaded());
        assert_eq!(children.len(load).await.unwrap(), 2);
        assert_eq!(children.len(load).await.unwrap(), 2);
        assert_eq!(*children.get("b", load).await.unwrap().unwrap(), 2);
        assert!(children.get("z", load).await.unwrap().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_can_retry() {
        let children: Children<String, u32> = Children::new();
        let failed = children
            .len(|| async {
                Err::<HashMap<String, Arc<u32>>, _>(crate::error::CatalogError::MissingAddress)
            })
            .await;
        assert!(failed.is_err());
        assert!(!children.is_loaded());
        assert_eq!(children.len(|| async { Ok(sample()) }).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_suppresses_load() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let load = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(sample())
        };

        let children: Children<String, u32> = Children::new();
        assert!(children.insert("x".to_string(), Arc::new(9)).await.is_none());
        assert!(children.is_loaded());

        assert_eq!(children.len(load).await.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_peek_does_not_load() {
        let children: Children<String, u32> = Children::new();
        assert!(children.peek().await.is_none());

        let loaded: Children<String, u32> = Children::loaded(sample());
        let keys: Vec<String> = loaded.peek().await.unwrap().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(loaded.loaded_len(), Some(2));
    }

    #[tokio::test]
    async fn test_loaded_len_while_writing() {
        let children: Children<String, u32> = Children::new();
        assert_eq!(children.loaded_len(), None);

        children.len(|| async { Ok(sample()) }).await.unwrap();
        children.insert("c".to_string(), Arc::new(3)).await;
        children.insert("a".to_string(), Arc::new(4)).await;

        let _writer = children.cell.get().unwrap().write().await;
        assert_eq!(children.loaded_len(), Some(3));
    }
}
