//! Striped lock table for per-key mutual exclusion
//!
//! Keys hash onto a fixed set of `RwLock` stripes. Writers of one key
//! serialize; keys on different stripes proceed independently.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::app::models::ProfileInstanceKey;

#[derive(Debug)]
pub struct LockTable {
    stripes: Vec<RwLock<()>>,
}

impl LockTable {
    /// Create a table with `stripes` locks (at least one)
    pub fn new(stripes: usize) -> Self {
        Self {
            stripes: (0..stripes.max(1)).map(|_| RwLock::new(())).collect(),
        }
    }

    pub fn stripe_count(&self) -> usize {
        self.stripes.len()
    }

    /// Stripe index for a key
    pub fn stripe_of(&self, key: &ProfileInstanceKey) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.stripes.len() as u64) as usize
    }

    pub fn read(&self, key: &ProfileInstanceKey) -> RwLockReadGuard<'_, ()> {
        self.stripes[self.stripe_of(key)].read()
    }

    pub fn write(&self, key: &ProfileInstanceKey) -> RwLockWriteGuard<'_, ()> {
        self.stripes[self.stripe_of(key)].write()
    }
}
