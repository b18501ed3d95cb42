// Path: crates/api/src/state/test_store.rs
//! A minimal `BTreeMap` store for this crate's unit tests.

use crate::state::{StateAccess, StateScanIter};
use fermion_types::error::StateError;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default, Clone, Debug, PartialEq)]
pub(crate) struct MapStore(pub BTreeMap<Vec<u8>, Vec<u8>>);

impl MapStore {
    pub fn with(pairs: &[(&[u8], &[u8])]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(k, v)| (k.to_vec(), v.to_vec()))
                .collect(),
        )
    }
}

impl StateAccess for MapStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.0.get(key).cloned())
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.0.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        self.0.remove(key);
        Ok(())
    }

    fn batch_apply(
        &mut self,
        inserts: &[(Vec<u8>, Vec<u8>)],
        deletes: &[Vec<u8>],
    ) -> Result<(), StateError> {
        for k in deletes {
            self.0.remove(k);
        }
        for (k, v) in inserts {
            self.0.insert(k.clone(), v.clone());
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        let prefix = prefix.to_vec();
        let items: Vec<_> = self
            .0
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .map(|(k, v)| Ok((Arc::from(k.as_slice()), Arc::from(v.as_slice()))))
            .collect();
        Ok(Box::new(items.into_iter()))
    }
}
