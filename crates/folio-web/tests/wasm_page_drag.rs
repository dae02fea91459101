#![cfg(target_arch = "wasm32")]
#![forbid(unsafe_code)]

use folio_web::PageDrag;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{
    Document, HtmlElement, KeyboardEvent, KeyboardEventInit, PointerEvent, PointerEventInit,
    Storage,
};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window()
        .and_then(|window| window.document())
        .expect("document should exist")
}

fn storage() -> Storage {
    web_sys::window()
        .and_then(|window| window.local_storage().ok().flatten())
        .expect("localStorage should exist")
}

fn div(document: &Document, class: &str, css: &str) -> HtmlElement {
    let element = document
        .create_element("div")
        .expect("create div")
        .dyn_into::<HtmlElement>()
        .expect("div is an HtmlElement");
    element.set_class_name(class);
    element
        .set_attribute("style", css)
        .expect("style attribute");
    element
}

/// A 300x200 parent holding `count` 50x50 cards with class `class`.
fn fixture(class: &str, count: usize) -> (HtmlElement, Vec<HtmlElement>) {
    let document = document();
    let parent = div(&document, "", "position:relative;width:300px;height:200px;");
    let cards = (0..count)
        .map(|_| {
            let card = div(&document, class, "width:50px;height:50px;");
            parent.append_child(&card).expect("append card");
            card
        })
        .collect();
    document
        .body()
        .expect("body should exist")
        .append_child(&parent)
        .expect("append parent");
    (parent, cards)
}

fn config(class: &str, key: &str) -> String {
    format!(r#"{{"storage_key":"{key}","groups":[{{"name":"card","selector":".{class}"}}]}}"#)
}

fn pointer(kind: &str, target: &HtmlElement, x: f64, y: f64) {
    let init = PointerEventInit::new();
    init.set_bubbles(true);
    init.set_cancelable(true);
    init.set_pointer_id(1);
    init.set_button(0);
    init.set_client_x(x as i32);
    init.set_client_y(y as i32);
    let event = PointerEvent::new_with_event_init_dict(kind, &init).expect("pointer event");
    target.dispatch_event(&event).expect("dispatch pointer event");
}

fn key(name: &str, shift: bool) {
    let init = KeyboardEventInit::new();
    init.set_bubbles(true);
    init.set_cancelable(true);
    init.set_key(name);
    init.set_shift_key(shift);
    let event = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init)
        .expect("keyboard event");
    document().dispatch_event(&event).expect("dispatch key event");
}

fn assert_resting(card: &HtmlElement) {
    let style = card.style();
    assert_eq!(style.get_property_value("cursor").ok().as_deref(), Some("grab"));
    assert_eq!(style.get_property_value("z-index").ok().as_deref(), Some("10"));
    assert_eq!(style.get_property_value("transform").ok().as_deref(), Some(""));
    assert_eq!(style.get_property_value("box-shadow").ok().as_deref(), Some(""));
}

#[wasm_bindgen_test]
fn init_enrolls_and_tags_elements() {
    let storage_key = "folio-test-enroll";
    storage().remove_item(storage_key).expect("clear key");
    let (parent, cards) = fixture("enroll-card", 2);
    cards[1].set_id("featured");

    let drag = PageDrag::init(Some(config("enroll-card", storage_key))).expect("init");
    assert_eq!(drag.enrolled_count(), 2);
    assert_eq!(
        cards[0].get_attribute("data-drag-id").as_deref(),
        Some("card:0")
    );
    assert_eq!(
        cards[1].get_attribute("data-drag-id").as_deref(),
        Some("featured")
    );
    assert_eq!(cards[0].style().get_property_value("cursor").ok().as_deref(), Some("grab"));
    assert!(!drag.is_dragging());
    parent.remove();
}

#[wasm_bindgen_test]
fn drag_clamps_and_persists() {
    let storage_key = "folio-test-drag";
    storage().remove_item(storage_key).expect("clear key");
    let (parent, cards) = fixture("drag-card", 1);
    let mut drag = PageDrag::init(Some(config("drag-card", storage_key))).expect("init");

    let card_rect = cards[0].get_bounding_client_rect();
    let parent_rect = parent.get_bounding_client_rect();
    pointer("pointerdown", &cards[0], card_rect.left() + 10.0, card_rect.top() + 10.0);
    assert!(drag.is_dragging());
    pointer(
        "pointermove",
        &cards[0],
        parent_rect.left() + 410.0,
        parent_rect.top() + 410.0,
    );
    assert_eq!(cards[0].style().get_property_value("left").ok().as_deref(), Some("250px"));
    pointer("pointerup", &cards[0], 0.0, 0.0);
    assert!(!drag.is_dragging());
    assert_resting(&cards[0]);

    let saved = storage().get_item(storage_key).expect("read key");
    assert_eq!(
        saved.as_deref(),
        Some(r#"[{"id":"card:0","left":"250px","top":"150px"}]"#)
    );
    drag.detach();
    parent.remove();
}

#[wasm_bindgen_test]
fn escape_reverts_without_saving() {
    let storage_key = "folio-test-escape";
    storage().remove_item(storage_key).expect("clear key");
    let (parent, cards) = fixture("escape-card", 1);
    let _drag = PageDrag::init(Some(config("escape-card", storage_key))).expect("init");

    let rect = cards[0].get_bounding_client_rect();
    pointer("pointerdown", &cards[0], rect.left() + 5.0, rect.top() + 5.0);
    key("ArrowRight", true);
    key("ArrowDown", false);
    key("Escape", false);
    assert_eq!(cards[0].style().get_property_value("left").ok().as_deref(), Some("0px"));
    assert_resting(&cards[0]);
    assert_eq!(storage().get_item(storage_key).expect("read key"), None);
    parent.remove();
}

#[wasm_bindgen_test]
fn escape_cancels_after_element_is_detached() {
    let storage_key = "folio-test-detached";
    storage().remove_item(storage_key).expect("clear key");
    let (parent, cards) = fixture("detached-card", 1);
    let drag = PageDrag::init(Some(config("detached-card", storage_key))).expect("init");

    let rect = cards[0].get_bounding_client_rect();
    pointer("pointerdown", &cards[0], rect.left() + 5.0, rect.top() + 5.0);
    assert!(drag.is_dragging());
    cards[0].remove();
    key("ArrowRight", false);
    assert!(drag.is_dragging());
    key("Escape", false);
    assert!(!drag.is_dragging());
    assert_resting(&cards[0]);
    assert_eq!(storage().get_item(storage_key).expect("read key"), None);
    parent.remove();
}

#[wasm_bindgen_test]
fn detach_cancels_active_drag_without_measurement() {
    let storage_key = "folio-test-detach";
    storage().remove_item(storage_key).expect("clear key");
    let (parent, cards) = fixture("detach-card", 1);
    let mut drag = PageDrag::init(Some(config("detach-card", storage_key))).expect("init");

    let rect = cards[0].get_bounding_client_rect();
    pointer("pointerdown", &cards[0], rect.left() + 5.0, rect.top() + 5.0);
    cards[0].remove();
    drag.detach();
    assert!(!drag.is_dragging());
    assert_resting(&cards[0]);
    assert_eq!(storage().get_item(storage_key).expect("read key"), None);
    parent.remove();
}

#[wasm_bindgen_test]
fn init_restores_saved_layout() {
    let storage_key = "folio-test-restore";
    storage()
        .set_item(
            storage_key,
            r#"[{"id":"card:1","left":"40px","top":"12px"},{"id":"missing","left":"1px","top":"1px"}]"#,
        )
        .expect("seed key");
    let (parent, cards) = fixture("restore-card", 2);
    let _drag = PageDrag::init(Some(config("restore-card", storage_key))).expect("init");
    assert_eq!(cards[1].style().get_property_value("left").ok().as_deref(), Some("40px"));
    assert_eq!(cards[1].style().get_property_value("top").ok().as_deref(), Some("12px"));
    assert_eq!(cards[0].style().get_property_value("left").ok().as_deref(), Some(""));
    parent.remove();
}

#[wasm_bindgen_test]
fn invalid_config_is_rejected() {
    assert!(PageDrag::init(Some(r#"{"fine_step": 0}"#.to_owned())).is_err());
    assert!(PageDrag::init(Some("{not json".to_owned())).is_err());
}
