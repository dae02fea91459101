#![forbid(unsafe_code)]

//! DOM plumbing: `localStorage`, element measurement and style writes.
//!
//! Only compiled on `wasm32` targets.

use folio_core::{
    ElementGeometry, InlineOffset, KeyValueStore, PositionTarget, Rect, Registry, Size, StoreError,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, DomRect, HtmlElement, Storage};

use crate::style::{self, Declaration};

/// [`KeyValueStore`] over `window.localStorage`.
///
/// Storage may be missing (blocked by privacy settings, sandboxed frames);
/// every access then reports [`StoreError::Unavailable`].
pub(crate) struct LocalStorage {
    storage: Option<Storage>,
}

impl LocalStorage {
    pub(crate) fn open() -> Self {
        let storage = web_sys::window().and_then(|window| window.local_storage().ok().flatten());
        if storage.is_none() {
            tracing::warn!(message = "position.storage_unavailable");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, StoreError> {
        self.storage.as_ref().ok_or(StoreError::Unavailable)
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage()?
            .get_item(key)
            .map_err(|err| StoreError::Read(js_error_text(&err)))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|err| StoreError::Write(js_error_text(&err)))
    }
}

/// Best-effort readable text for a thrown JS value.
pub(crate) fn js_error_text(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{value:?}")
}

fn rect_of(rect: &DomRect) -> Rect {
    Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
}

/// Measure an enrolled element against its parent.
///
/// Returns `None` for detached elements.
pub(crate) fn measure(element: &HtmlElement) -> Option<ElementGeometry> {
    let parent = element.parent_element()?;
    let style = element.style();
    Some(ElementGeometry {
        element_rect: rect_of(&element.get_bounding_client_rect()),
        element_size: Size::new(
            f64::from(element.offset_width()),
            f64::from(element.offset_height()),
        ),
        parent_rect: rect_of(&parent.get_bounding_client_rect()),
        inline: InlineOffset::new(
            style.get_property_value("left").unwrap_or_default(),
            style.get_property_value("top").unwrap_or_default(),
        ),
    })
}

/// Write declarations to the element's inline style.
pub(crate) fn apply_declarations(element: &HtmlElement, declarations: &[Declaration]) {
    let style = element.style();
    for declaration in declarations {
        let result = if declaration.value.is_empty() {
            style.remove_property(declaration.property).map(|_| ())
        } else {
            style.set_property(declaration.property, &declaration.value)
        };
        if let Err(err) = result {
            tracing::debug!(
                message = "style.write_failed",
                property = declaration.property,
                error = %js_error_text(&err)
            );
        }
    }
}

/// Restore target over the live document.
///
/// Identities resolve to an enrolled element first, then to an element with
/// that DOM `id`, then (legacy records) to the first element carrying every
/// class named by the identity.
pub(crate) struct DomPage<'a> {
    pub(crate) document: &'a Document,
    pub(crate) registry: &'a Registry,
    pub(crate) elements: &'a [HtmlElement],
}

impl DomPage<'_> {
    fn by_dom_id(&self, identity: &str) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(identity)?
            .dyn_into::<HtmlElement>()
            .ok()
    }

    fn by_legacy_classes(&self, identity: &str) -> Option<HtmlElement> {
        let selector = folio_core::ElementIdentity::new(identity).legacy_class_selector()?;
        self.document
            .query_selector(&selector)
            .ok()
            .flatten()?
            .dyn_into::<HtmlElement>()
            .ok()
    }
}

impl PositionTarget for DomPage<'_> {
    type Element = HtmlElement;

    fn resolve(&self, identity: &str) -> Option<HtmlElement> {
        self.registry
            .find(identity)
            .and_then(|entry| self.elements.get(entry.id.index()).cloned())
            .or_else(|| self.by_dom_id(identity))
            .or_else(|| self.by_legacy_classes(identity))
    }

    fn apply(&mut self, element: &HtmlElement, left: &str, top: &str) {
        apply_declarations(element, &style::saved_offset(left, top));
    }
}
