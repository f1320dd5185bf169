//! A tree shared between threads under one reentrant lock.

use std::sync::Arc;

use bough_core::TreeLock;

use crate::error::TreeResult;

use super::Tree;

/// A cloneable handle to a tree guarded by a single [`TreeLock`].
///
/// Every structural operation runs inside [`with`](Self::with), so a whole
/// mutation is atomic with respect to other threads. Re-entering from a
/// listener on the same thread is reported as an error instead of
/// deadlocking.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use bough::{HeadlessToolkit, SharedTree, Tree};
///
/// let shared = SharedTree::new(Tree::new(Arc::new(HeadlessToolkit::new())));
/// let leaf = shared.with(|tree| tree.create_component()).unwrap();
/// assert!(shared.read(|tree| tree.contains(leaf)).unwrap());
/// ```
#[derive(Clone)]
pub struct SharedTree {
    inner: Arc<TreeLock<Tree>>,
}

static_assertions::assert_impl_all!(SharedTree: Send, Sync);

impl SharedTree {
    /// Wrap a tree.
    pub fn new(tree: Tree) -> Self {
        Self {
            inner: Arc::new(TreeLock::new(tree)),
        }
    }

    /// Run `f` with exclusive access to the tree.
    pub fn with<R>(&self, f: impl FnOnce(&mut Tree) -> R) -> TreeResult<R> {
        Ok(self.inner.with(f)?)
    }

    /// Run `f` with shared access to the tree.
    pub fn read<R>(&self, f: impl FnOnce(&Tree) -> R) -> TreeResult<R> {
        Ok(self.inner.read(f)?)
    }

    /// Whether another thread currently holds the tree.
    pub fn is_held_elsewhere(&self) -> bool {
        self.inner.is_held_elsewhere()
    }
}

impl std::fmt::Debug for SharedTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedTree").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::headless::HeadlessToolkit;

    #[test]
    fn mutations_from_several_threads() {
        let shared = SharedTree::new(Tree::new(Arc::new(HeadlessToolkit::new())));
        let root = shared.with(|tree| tree.create_container()).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..10 {
                        shared
                            .with(|tree| {
                                let leaf = tree.create_component();
                                tree.add(root, leaf, None, None)
                            })
                            .unwrap()
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(shared.read(|tree| tree.child_count(root)).unwrap().unwrap(), 40);
    }

    #[test]
    fn reentry_is_an_error() {
        let shared = SharedTree::new(Tree::new(Arc::new(HeadlessToolkit::new())));
        let inner = shared.clone();
        let nested = shared.with(|_| inner.with(|tree| tree.len())).unwrap();
        assert!(nested.is_err());
    }
}
