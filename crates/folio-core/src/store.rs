#![forbid(unsafe_code)]

//! Position Store: persisted layout keyed by element identity.
//!
//! The whole layout lives under one key as a JSON array of
//! `{"id", "left", "top"}` records. Absent, unreadable or malformed content
//! reads as an empty layout; it is never an error for callers.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// One persisted element position.
///
/// `left`/`top` are inline style strings (`"42px"`) and may be empty when
/// the element was never moved before being released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPosition {
    pub id: String,
    #[serde(default)]
    pub left: String,
    #[serde(default)]
    pub top: String,
}

impl SavedPosition {
    #[must_use]
    pub fn new(id: impl Into<String>, left: impl Into<String>, top: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            left: left.into(),
            top: top.into(),
        }
    }
}

/// Durable key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No storage is available (e.g. blocked by privacy settings).
    Unavailable,
    /// Reading the key failed.
    Read(String),
    /// Writing the key failed (quota, security errors).
    Write(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage unavailable"),
            Self::Read(msg) => write!(f, "storage read failed: {msg}"),
            Self::Write(msg) => write!(f, "storage write failed: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Minimal string key-value store, the shape of `window.localStorage`.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store.
///
/// Clones share the same contents, which lets tests model a page reload:
/// a fresh controller built over a clone sees what the previous one wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
    fail_writes: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one raw value.
    #[must_use]
    pub fn with_raw(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        store
    }

    /// Make every subsequent write on this handle fail.
    #[must_use]
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Raw value under `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.raw(key))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Write("quota exceeded".to_owned()));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Result of a successful [`PositionStore::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No record had this identity; one was appended.
    Inserted,
    /// The record at `index` was overwritten.
    Replaced { index: usize },
}

/// Something saved positions can be applied to.
pub trait PositionTarget {
    /// Live element handle.
    type Element;

    /// Resolve a stored identity to a live element.
    fn resolve(&self, identity: &str) -> Option<Self::Element>;

    /// Apply the stored inline offsets verbatim.
    fn apply(&mut self, element: &Self::Element, left: &str, top: &str);
}

/// Summary of one [`PositionStore::restore_all`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestoreReport {
    pub applied: usize,
    pub skipped: usize,
}

/// Layout persistence over a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct PositionStore<S> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> PositionStore<S> {
    pub fn new(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Decode the stored layout; anything unusable reads as empty.
    #[must_use]
    pub fn load_all(&self) -> Vec<SavedPosition> {
        let raw = match self.backend.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(error) => {
                tracing::debug!(message = "position.store_unreadable", key = %self.key, %error);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<SavedPosition>>(&raw) {
            Ok(records) => records,
            Err(error) => {
                tracing::debug!(
                    message = "position.store_malformed",
                    key = %self.key,
                    %error
                );
                Vec::new()
            }
        }
    }

    /// Insert or overwrite the record for `position.id` and write the whole
    /// layout back.
    ///
    /// The record takes the slot of the first stored match; any further
    /// records with the same identity are dropped.
    pub fn save(&mut self, position: SavedPosition) -> Result<SaveOutcome, StoreError> {
        let mut records = self.load_all();
        let outcome = match records.iter().position(|p| p.id == position.id) {
            Some(index) => {
                records.retain(|p| p.id != position.id);
                records.insert(index, position);
                SaveOutcome::Replaced { index }
            }
            None => {
                records.push(position);
                SaveOutcome::Inserted
            }
        };
        let encoded =
            serde_json::to_string(&records).map_err(|e| StoreError::Write(e.to_string()))?;
        self.backend.set_item(&self.key, &encoded)?;
        Ok(outcome)
    }

    /// Apply every stored record, in stored order, to the elements `target`
    /// resolves. Values are applied without clamping.
    pub fn restore_all<T: PositionTarget>(&self, target: &mut T) -> RestoreReport {
        let mut report = RestoreReport::default();
        for record in self.load_all() {
            match target.resolve(&record.id) {
                Some(element) => {
                    target.apply(&element, &record.left, &record.top);
                    report.applied += 1;
                }
                None => report.skipped += 1,
            }
        }
        tracing::debug!(
            message = "position.restored",
            applied = report.applied,
            skipped = report.skipped
        );
        report
    }
}
