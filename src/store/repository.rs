//! Persistence adapters
//!
//! The durable store is a single key-value slot holding the cart record.
//! Reads never fail: a missing or unparsable record degrades to an empty
//! cart. Writes can fail (disk full, storage unavailable) and surface a
//! [`RepositoryError`] for the store to report.

use std::{
    cell::{Cell, RefCell},
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::cart::Cart;

use super::record;

/// Errors from persisting the cart record.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The cart record could not be encoded.
    #[error("failed to encode cart record")]
    Encode(#[source] serde_json::Error),

    /// The cart record could not be written to its backing file.
    #[error("failed to write cart record to {path}")]
    Write {
        /// Path of the backing file.
        path: PathBuf,

        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The backing storage refused the write.
    #[error("cart storage is unavailable")]
    Unavailable,
}

/// Durable storage for the cart record.
///
/// `load` is infallible by design: corrupt or absent data is recovered
/// locally as an empty cart and never surfaced to the caller.
pub trait CartRepository {
    /// Read the persisted cart, or an empty cart if none parses.
    fn load(&self) -> Cart;

    /// Replace the persisted record with the given cart, in full.
    ///
    /// # Errors
    ///
    /// Returns a [`RepositoryError`] if the record cannot be encoded or the
    /// write does not complete.
    fn save(&self, cart: &Cart) -> Result<(), RepositoryError>;
}

/// Cart record persisted as a JSON file, one record per profile.
///
/// Writes replace the whole file; there is no merging. Two repositories
/// pointed at the same path are last-writer-wins, and neither observes the
/// other's writes until its next `load`.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    /// Create a repository backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartRepository for JsonFileRepository {
    fn load(&self) -> Cart {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            // First access: no durable record yet.
            return Cart::new();
        };

        record::decode(&raw).unwrap_or_else(|| {
            tracing::warn!(path = %self.path.display(), "corrupt cart record; starting empty");
            Cart::new()
        })
    }

    fn save(&self, cart: &Cart) -> Result<(), RepositoryError> {
        let encoded = record::encode(cart).map_err(RepositoryError::Encode)?;

        fs::write(&self.path, encoded).map_err(|source| RepositoryError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// In-process storage slot, for tests and demos.
///
/// Holds the encoded record string rather than the cart itself so the
/// serialize/deserialize path is exercised the same way as the file adapter.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    slot: RefCell<Option<String>>,
    fail_writes: Cell<bool>,
}

impl MemoryRepository {
    /// An empty in-memory slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot pre-seeded with a raw record, parsable or not.
    pub fn with_record(record: impl Into<String>) -> Self {
        Self {
            slot: RefCell::new(Some(record.into())),
            fail_writes: Cell::new(false),
        }
    }

    /// Make subsequent writes fail with [`RepositoryError::Unavailable`],
    /// simulating quota exhaustion or disabled storage.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// The currently stored raw record, if any.
    pub fn record(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl CartRepository for MemoryRepository {
    fn load(&self) -> Cart {
        self.slot
            .borrow()
            .as_deref()
            .and_then(record::decode)
            .unwrap_or_default()
    }

    fn save(&self, cart: &Cart) -> Result<(), RepositoryError> {
        if self.fail_writes.get() {
            return Err(RepositoryError::Unavailable);
        }

        let encoded = record::encode(cart).map_err(RepositoryError::Encode)?;
        *self.slot.borrow_mut() = Some(encoded);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::cart::{CartLine, ItemKind, LineId};

    use super::*;

    fn widget() -> CartLine {
        CartLine {
            id: LineId::from(1),
            kind: ItemKind::Product,
            name: "Widget".to_owned(),
            price: Decimal::new(10_00, 2),
            discount_price: None,
            image_url: None,
            qty: 2,
        }
    }

    #[test]
    fn file_repository_round_trips() -> TestResult {
        let dir = tempfile::tempdir()?;
        let repository = JsonFileRepository::new(dir.path().join("cart.json"));

        let cart = Cart::from_lines([widget()]);
        repository.save(&cart)?;

        assert_eq!(repository.load(), cart);

        Ok(())
    }

    #[test]
    fn missing_file_loads_as_empty_cart() -> TestResult {
        let dir = tempfile::tempdir()?;
        let repository = JsonFileRepository::new(dir.path().join("absent.json"));

        assert!(repository.load().is_empty());

        Ok(())
    }

    #[test]
    fn corrupt_file_loads_as_empty_cart() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cart.json");
        fs::write(&path, "{{{ not json")?;

        let repository = JsonFileRepository::new(&path);

        assert!(repository.load().is_empty());

        Ok(())
    }

    #[test]
    fn unwritable_path_surfaces_write_error() {
        let repository = JsonFileRepository::new("/nonexistent-dir/cart.json");

        let result = repository.save(&Cart::new());

        assert!(matches!(result, Err(RepositoryError::Write { .. })));
    }

    #[test]
    fn memory_repository_round_trips() -> TestResult {
        let repository = MemoryRepository::new();

        let cart = Cart::from_lines([widget()]);
        repository.save(&cart)?;

        assert_eq!(repository.load(), cart);

        Ok(())
    }

    #[test]
    fn memory_repository_failed_write_keeps_previous_record() -> TestResult {
        let repository = MemoryRepository::new();
        repository.save(&Cart::from_lines([widget()]))?;

        repository.set_fail_writes(true);
        let result = repository.save(&Cart::new());

        assert!(matches!(result, Err(RepositoryError::Unavailable)));
        assert_eq!(repository.load().total_item_count(), 2);

        Ok(())
    }
}
