//! Layout persistence across simulated page loads.
//!
//! A `MemoryStore` clone stands in for `localStorage` surviving a reload: each
//! "load" builds a fresh controller over it and restores into a fake page.

use std::collections::BTreeMap;

use folio_core::{
    DragConfig, DragController, ElementGeometry, ElementIdentity, InlineOffset, MemoryStore,
    Point, PointerButton, PointerSample, PositionTarget, Rect, SavedPosition, Size,
};
use pretty_assertions::assert_eq;

const KEY: &str = "elementPositions";

/// Elements keyed by identity, each with a class list and inline offsets.
#[derive(Default)]
struct FakePage {
    elements: BTreeMap<String, (Vec<&'static str>, InlineOffset)>,
}

impl FakePage {
    fn with(mut self, identity: &str, classes: &[&'static str]) -> Self {
        self.elements
            .insert(identity.to_owned(), (classes.to_vec(), InlineOffset::default()));
        self
    }

    fn inline(&self, identity: &str) -> InlineOffset {
        self.elements[identity].1.clone()
    }
}

impl PositionTarget for FakePage {
    type Element = String;

    fn resolve(&self, identity: &str) -> Option<String> {
        if self.elements.contains_key(identity) {
            return Some(identity.to_owned());
        }
        let legacy = ElementIdentity::new(identity);
        legacy.legacy_class_selector()?;
        self.elements
            .iter()
            .find(|(_, (classes, _))| legacy.class_names().all(|c| classes.contains(&c)))
            .map(|(key, _)| key.clone())
    }

    fn apply(&mut self, element: &String, left: &str, top: &str) {
        if let Some((_, inline)) = self.elements.get_mut(element) {
            *inline = InlineOffset::new(left, top);
        }
    }
}

fn page() -> FakePage {
    FakePage::default()
        .with("avatar", &["profile-image-wrapper"])
        .with("skill-card:0", &["skill-card", "fade-in"])
        .with("skill-card:1", &["skill-card", "fade-in", "visible"])
}

/// Parent 300x200 at (0, 0); element 50x50 resting at its origin.
fn resting() -> ElementGeometry {
    ElementGeometry {
        element_rect: Rect::new(0.0, 0.0, 50.0, 50.0),
        element_size: Size::new(50.0, 50.0),
        parent_rect: Rect::new(0.0, 0.0, 300.0, 200.0),
        inline: InlineOffset::default(),
    }
}

fn load(backend: &MemoryStore) -> DragController<MemoryStore> {
    let mut ctl = DragController::new(DragConfig::default(), backend.clone());
    ctl.enroll("profile-image", Some("avatar"));
    ctl.enroll("skill-card", None);
    ctl.enroll("skill-card", None);
    ctl
}

fn drag_to(ctl: &mut DragController<MemoryStore>, identity: &str, x: f64, y: f64) {
    let id = ctl
        .registry()
        .find(identity)
        .map(|entry| entry.id)
        .expect("identity should be enrolled");
    let press = PointerSample::new(1, PointerButton::Primary, Point::new(0.0, 0.0));
    assert!(ctl.pointer_down(id, press, &resting()).accepted());
    assert!(ctl.pointer_move(1, Point::new(x, y), &resting()).accepted());
    assert!(ctl.pointer_up(1, PointerButton::Primary).accepted());
}

#[test]
fn dragged_positions_survive_a_reload() {
    let backend = MemoryStore::new();
    let mut first = load(&backend);
    drag_to(&mut first, "skill-card:1", 120.0, 30.0);
    drag_to(&mut first, "avatar", 400.0, 400.0);

    let second = load(&backend);
    let mut target = page();
    let report = second.restore_saved_positions(&mut target);
    assert_eq!(report.applied, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(target.inline("skill-card:1"), InlineOffset::new("120px", "30px"));
    assert_eq!(target.inline("avatar"), InlineOffset::new("250px", "150px"));
    assert_eq!(target.inline("skill-card:0"), InlineOffset::default());
}

#[test]
fn last_write_wins_for_one_identity() {
    let backend = MemoryStore::new();
    let mut ctl = load(&backend);
    drag_to(&mut ctl, "skill-card:0", 10.0, 10.0);
    drag_to(&mut ctl, "skill-card:0", 90.0, 70.0);

    assert_eq!(
        ctl.store().load_all(),
        vec![SavedPosition::new("skill-card:0", "90px", "70px")]
    );
}

#[test]
fn generated_identities_keep_styling_twins_apart() {
    let backend = MemoryStore::new();
    let mut ctl = load(&backend);
    drag_to(&mut ctl, "skill-card:0", 10.0, 20.0);
    drag_to(&mut ctl, "skill-card:1", 30.0, 40.0);
    assert_eq!(ctl.store().load_all().len(), 2);
}

#[test]
fn legacy_class_list_records_still_restore() {
    let backend = MemoryStore::with_raw(
        KEY,
        r#"[{"id":"skill-card fade-in visible","left":"12px","top":"34px"},
            {"id":"gone-element","left":"1px","top":"1px"}]"#,
    );
    let ctl = load(&backend);
    let mut target = page();
    let report = ctl.restore_saved_positions(&mut target);
    assert_eq!(report.applied, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(target.inline("skill-card:1"), InlineOffset::new("12px", "34px"));
}

#[test]
fn malformed_layout_restores_nothing_and_is_replaced_on_save() {
    let backend = MemoryStore::with_raw(KEY, "{not json");
    let mut ctl = load(&backend);
    let mut target = page();
    assert_eq!(ctl.restore_saved_positions(&mut target).applied, 0);

    drag_to(&mut ctl, "avatar", 5.0, 5.0);
    assert_eq!(
        backend.raw(KEY).as_deref(),
        Some(r#"[{"id":"avatar","left":"5px","top":"5px"}]"#)
    );
}
