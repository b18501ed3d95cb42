// Path: crates/api/src/state/scoped.rs

//! A state view that confines a stage or handler to its own namespace.

use crate::state::{StateAccess, StateScanIter};
use fermion_types::error::StateError;
use fermion_types::keys::namespace_prefix;
use std::sync::Arc;

/// The part of the store a component is handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateScope {
    /// The whole store. Only components that wrap the store (checkpoints) use this.
    Root,
    /// Keys under `<namespace>::`.
    Namespace(&'static str),
}

/// A wrapper that provides namespaced, isolated access to a `StateAccess` object.
///
/// It enforces two policies:
/// 1.  **Namespacing:** every key is transparently prefixed with `<namespace>::`,
///     and keys returned by `prefix_scan` have that prefix stripped again.
/// 2.  **Allowlist:** a view of another namespace can only be opened through
///     [`ScopedState::granted`] when the owner declared that namespace in its
///     grant list. Anything else fails with `PermissionDenied`.
pub struct ScopedState<'a> {
    root: &'a mut dyn StateAccess,
    namespace: Option<&'static str>,
    prefix: Vec<u8>,
    grants: &'a [&'static str],
}

impl<'a> ScopedState<'a> {
    /// A view of the whole store with no grants.
    pub fn root(store: &'a mut dyn StateAccess) -> Self {
        Self {
            root: store,
            namespace: None,
            prefix: Vec::new(),
            grants: &[],
        }
    }

    /// A view confined to `namespace`, able to open views of `grants`.
    pub fn namespaced(
        store: &'a mut dyn StateAccess,
        namespace: &'static str,
        grants: &'a [&'static str],
    ) -> Self {
        Self {
            root: store,
            namespace: Some(namespace),
            prefix: namespace_prefix(namespace),
            grants,
        }
    }

    /// Opens the view described by `scope`.
    pub fn open(
        store: &'a mut dyn StateAccess,
        scope: StateScope,
        grants: &'a [&'static str],
    ) -> Self {
        match scope {
            StateScope::Root => Self::root(store),
            StateScope::Namespace(ns) => Self::namespaced(store, ns, grants),
        }
    }

    /// The namespace of this view, or `None` for the root view.
    pub fn namespace(&self) -> Option<&'static str> {
        self.namespace
    }

    /// Opens a view of another namespace this view was granted.
    pub fn granted(&mut self, namespace: &str) -> Result<ScopedState<'_>, StateError> {
        let Some(ns) = self.grants.iter().copied().find(|g| *g == namespace) else {
            return Err(StateError::PermissionDenied(format!(
                "'{}' has no grant for namespace '{}'",
                self.namespace.unwrap_or("root"),
                namespace
            )));
        };
        Ok(ScopedState::namespaced(&mut *self.root, ns, &[]))
    }

    /// The underlying store. Only available to the root view.
    pub fn unscoped(&mut self) -> Result<&mut dyn StateAccess, StateError> {
        match self.namespace {
            None => Ok(&mut *self.root),
            Some(ns) => Err(StateError::PermissionDenied(format!(
                "'{ns}' requested unscoped store access"
            ))),
        }
    }

    /// Read-only access to the underlying store. Only available to the root view.
    pub fn unscoped_ref(&self) -> Result<&dyn StateAccess, StateError> {
        match self.namespace {
            None => Ok(&*self.root),
            Some(ns) => Err(StateError::PermissionDenied(format!(
                "'{ns}' requested unscoped store access"
            ))),
        }
    }

    /// The underlying store, for the pipeline driver that re-scopes it per stage.
    pub(crate) fn root_mut(&mut self) -> &mut dyn StateAccess {
        &mut *self.root
    }

    #[inline]
    fn qualify(&self, key: &[u8]) -> Vec<u8> {
        [self.prefix.as_slice(), key].concat()
    }
}

impl<'a> StateAccess for ScopedState<'a> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        self.root.get(&self.qualify(key))
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        let key = self.qualify(key);
        self.root.insert(&key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        let key = self.qualify(key);
        self.root.delete(&key)
    }

    fn batch_set(&mut self, updates: &[(Vec<u8>, Vec<u8>)]) -> Result<(), StateError> {
        let mapped: Vec<(Vec<u8>, Vec<u8>)> = updates
            .iter()
            .map(|(k, v)| (self.qualify(k), v.clone()))
            .collect();
        self.root.batch_set(&mapped)
    }

    fn batch_get(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>, StateError> {
        let mapped: Vec<Vec<u8>> = keys.iter().map(|k| self.qualify(k)).collect();
        self.root.batch_get(&mapped)
    }

    fn batch_apply(
        &mut self,
        inserts: &[(Vec<u8>, Vec<u8>)],
        deletes: &[Vec<u8>],
    ) -> Result<(), StateError> {
        let mapped_inserts: Vec<(Vec<u8>, Vec<u8>)> = inserts
            .iter()
            .map(|(k, v)| (self.qualify(k), v.clone()))
            .collect();
        let mapped_deletes: Vec<Vec<u8>> = deletes.iter().map(|k| self.qualify(k)).collect();
        self.root.batch_apply(&mapped_inserts, &mapped_deletes)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        let strip = self.prefix.len();
        let iter = self.root.prefix_scan(&self.qualify(prefix))?;
        if strip == 0 {
            return Ok(iter);
        }
        Ok(Box::new(iter.map(move |res| {
            res.map(|(k, v)| (Arc::from(k.get(strip..).unwrap_or_default()), v))
        })))
    }
}
