#![forbid(unsafe_code)]

//! Inline style declarations for enrolled elements.
//!
//! Pure mapping from controller state to CSS property/value pairs, so the
//! exact strings written to the page are testable off the browser.

use folio_core::{Appearance, DragVisual, Offset};

/// One inline style declaration. An empty value removes the property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: &'static str,
    pub value: String,
}

impl Declaration {
    fn new(property: &'static str, value: impl Into<String>) -> Self {
        Self {
            property,
            value: value.into(),
        }
    }
}

/// Declarations applied once when an element is enrolled.
#[must_use]
pub fn enrollment(appearance: &Appearance) -> Vec<Declaration> {
    vec![
        Declaration::new("cursor", appearance.idle_cursor.as_str()),
        Declaration::new("position", "relative"),
        Declaration::new("z-index", appearance.resting_z_index.to_string()),
        Declaration::new("touch-action", "none"),
    ]
}

/// Declarations for a visual tier.
#[must_use]
pub fn visual(appearance: &Appearance, visual: DragVisual) -> Vec<Declaration> {
    match visual {
        DragVisual::Lifted => vec![
            Declaration::new("cursor", appearance.active_cursor.as_str()),
            Declaration::new("z-index", appearance.lifted_z_index.to_string()),
            Declaration::new("box-shadow", appearance.lifted_shadow.as_str()),
            Declaration::new("transform", appearance.lifted_transform.as_str()),
        ],
        DragVisual::Resting => vec![
            Declaration::new("cursor", appearance.idle_cursor.as_str()),
            Declaration::new("z-index", appearance.resting_z_index.to_string()),
            Declaration::new("box-shadow", ""),
            Declaration::new("transform", ""),
        ],
    }
}

/// Inline `left`/`top` for a controller offset.
#[must_use]
pub fn offset(offset: Offset) -> [Declaration; 2] {
    let inline = offset.to_inline();
    [
        Declaration::new("left", inline.left),
        Declaration::new("top", inline.top),
    ]
}

/// Inline `left`/`top` taken verbatim from a saved record.
#[must_use]
pub fn saved_offset(left: &str, top: &str) -> [Declaration; 2] {
    [Declaration::new("left", left), Declaration::new("top", top)]
}
