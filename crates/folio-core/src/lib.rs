#![forbid(unsafe_code)]

//! `folio-core` is the platform-independent half of the Folio drag layer.
//!
//! Design goals:
//! - **Host-driven**: the embedding page pushes pointer and keyboard input
//!   together with fresh element measurements, and applies the returned
//!   [`drag::DragCommand`]s to the DOM.
//! - **One session per page**: the controller owns at most one drag at a
//!   time, bound to the pointer that started it.
//! - **Forgiving persistence**: a missing or malformed saved layout reads as
//!   empty and never fails initialization.
//!
//! The browser binding lives in `folio-web`.

pub mod config;
pub mod drag;
pub mod event;
pub mod geometry;
pub mod identity;
pub mod store;

pub use config::{Appearance, ConfigError, DragConfig, DragGroup};
pub use drag::{
    CancelReason, DragCommand, DragController, DragDispatch, DragOutcome, DragPhase, DragVisual,
    ElementGeometry, IgnoredReason,
};
pub use event::{DragKey, Modifiers, PointerButton, PointerSample};
pub use geometry::{InlineOffset, Offset, Point, Rect, Size};
pub use identity::{ElementId, ElementIdentity, EnrolledElement, Registry};
pub use store::{
    KeyValueStore, MemoryStore, PositionStore, PositionTarget, RestoreReport, SaveOutcome,
    SavedPosition, StoreError,
};
