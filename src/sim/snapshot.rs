//! Published state snapshots
//!
//! Engines never hand out field-level mutators. A transition clones the
//! current state, edits the copy and publishes it in one step; readers hold
//! an `Arc` to whichever complete snapshot they last took.

use std::sync::Arc;

#[derive(Debug)]
pub struct Published<S> {
    current: Arc<S>,
    version: u64,
}

impl<S: Clone + Default> Default for Published<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: Clone> Published<S> {
    pub fn new(initial: S) -> Self {
        Self {
            current: Arc::new(initial),
            version: 0,
        }
    }

    /// Borrow the current snapshot
    pub fn get(&self) -> &S {
        &self.current
    }

    /// Shared handle to the current snapshot (cheap, never torn)
    pub fn snapshot(&self) -> Arc<S> {
        Arc::clone(&self.current)
    }

    /// Bumped on every publish; renderers poll this to skip redundant frames
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Publish a complete replacement
    pub fn replace(&mut self, next: S) {
        self.current = Arc::new(next);
        self.version += 1;
    }

    /// Copy, edit, publish
    pub fn update<F: FnOnce(&mut S)>(&mut self, edit: F) {
        let mut next = (*self.current).clone();
        edit(&mut next);
        self.replace(next);
    }
}
