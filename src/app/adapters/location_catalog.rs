//! Location catalog collaborator
//!
//! The registries only need to know whether a location exists in an office.
//! Master-data CRUD lives outside this crate; the in-memory catalog here
//! backs tests and the command line.

use parking_lot::RwLock;
use std::collections::BTreeSet;

use crate::Result;
use crate::app::models::LocationId;

/// Existence check against the location master data
pub trait LocationCatalog: Send + Sync {
    /// Returns whether `name` is a known location in `office`
    ///
    /// Implementations map transport failures to `UpstreamUnavailable`.
    fn location_exists(&self, office: &str, name: &str) -> Result<bool>;
}

/// In-memory catalog of known locations
#[derive(Debug, Default)]
pub struct InMemoryLocationCatalog {
    locations: RwLock<BTreeSet<LocationId>>,
}

impl InMemoryLocationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog pre-populated with locations
    pub fn with_locations<I>(locations: I) -> Self
    where
        I: IntoIterator<Item = LocationId>,
    {
        Self {
            locations: RwLock::new(locations.into_iter().collect()),
        }
    }

    pub fn register(&self, location: LocationId) {
        self.locations.write().insert(location);
    }

    pub fn unregister(&self, location: &LocationId) -> bool {
        self.locations.write().remove(location)
    }

    pub fn len(&self) -> usize {
        self.locations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.read().is_empty()
    }
}

impl LocationCatalog for InMemoryLocationCatalog {
    fn location_exists(&self, office: &str, name: &str) -> Result<bool> {
        Ok(self
            .locations
            .read()
            .contains(&LocationId::new(office, name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let catalog = InMemoryLocationCatalog::new();
        assert!(!catalog.location_exists("SWT", "KEYS").unwrap());

        catalog.register(LocationId::new("SWT", "KEYS"));
        assert!(catalog.location_exists("SWT", "KEYS").unwrap());
        assert!(!catalog.location_exists("HEC", "KEYS").unwrap());

        assert!(catalog.unregister(&LocationId::new("SWT", "KEYS")));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_prepopulated_catalog() {
        let catalog = InMemoryLocationCatalog::with_locations([
            LocationId::new("SWT", "KEYS"),
            LocationId::new("SWT", "TENK"),
        ]);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.location_exists("SWT", "TENK").unwrap());
    }
}
