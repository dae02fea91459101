#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for the page drag layer.
//!
//! [`PageDrag`] enrolls the configured element groups, restores the saved
//! layout and attaches one set of document-level listeners that feed a
//! [`DragController`]. Controller commands are collected while the state is
//! borrowed and applied to the DOM after the borrow ends.
//!
//! Only compiled on `wasm32` targets.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use folio_core::{
    DragCommand, DragConfig, DragController, DragKey, ElementGeometry, ElementId, Modifiers, Point,
    PointerButton, PointerSample,
};
use js_sys::Reflect;
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, HtmlElement, KeyboardEvent, PointerEvent};

use crate::dom::{self, DomPage, LocalStorage};
use crate::style::{self, Declaration};

fn console_call(method: &str, msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(func) = Reflect::get(&console, &method.into()) else {
        return;
    };
    let Ok(func) = func.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = func.call1(&console, &JsValue::from_str(msg));
}

fn console_error(msg: &str) {
    console_call("error", msg);
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

/// Buffers one formatted event and hands it to `console.log` on drop.
#[derive(Default)]
struct ConsoleWriter {
    buffer: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            console_call("log", String::from_utf8_lossy(&self.buffer).trim_end());
        }
    }
}

struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::default()
    }
}

/// Route `tracing` events at or above `level` (default `"info"`) to the
/// browser console.
///
/// Returns `false` when a global subscriber was already installed.
#[wasm_bindgen(js_name = installConsoleLogging)]
pub fn install_console_logging(level: Option<String>) -> Result<bool, JsValue> {
    install_panic_hook();
    let level = match level.as_deref() {
        None | Some("") => tracing::Level::INFO,
        Some(raw) => raw
            .parse::<tracing::Level>()
            .map_err(|err| JsValue::from_str(&format!("invalid log level {raw:?}: {err}")))?,
    };
    Ok(tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_max_level(level)
        .with_ansi(false)
        .without_time()
        .try_init()
        .is_ok())
}

/// Side effect produced by a dispatch, resolved to live handles.
enum Effect {
    PreventDefault,
    AcquireCapture(HtmlElement, i32),
    ReleaseCapture(HtmlElement, i32),
    Style(HtmlElement, Vec<Declaration>),
}

struct PageState {
    controller: DragController<LocalStorage>,
    /// Enrolled elements, indexed by [`ElementId::index`].
    elements: Vec<HtmlElement>,
    combined_selector: String,
}

impl PageState {
    fn element(&self, id: ElementId) -> Option<&HtmlElement> {
        self.elements.get(id.index())
    }

    fn active_geometry(&self) -> Option<ElementGeometry> {
        let id = self.controller.active_element()?;
        dom::measure(self.element(id)?)
    }

    /// Enrolled element that is the nearest ancestor-or-self of `target`.
    fn enrolled_ancestor(&self, target: &Element) -> Option<ElementId> {
        let candidate = target.closest(&self.combined_selector).ok().flatten()?;
        let attribute = &self.controller.config().identity_attribute;
        let identity = candidate.get_attribute(attribute)?;
        let entry = self.controller.registry().find(&identity)?;
        let element = self.element(entry.id)?;
        (element.unchecked_ref::<Element>() == &candidate).then_some(entry.id)
    }

    fn resolve_effects(&self, commands: Vec<DragCommand>) -> Vec<Effect> {
        let appearance = &self.controller.config().appearance;
        commands
            .into_iter()
            .filter_map(|command| match command {
                DragCommand::PreventDefault => Some(Effect::PreventDefault),
                DragCommand::AcquireCapture {
                    element,
                    pointer_id,
                } => Some(Effect::AcquireCapture(
                    self.element(element)?.clone(),
                    pointer_id,
                )),
                DragCommand::ReleaseCapture {
                    element,
                    pointer_id,
                } => Some(Effect::ReleaseCapture(
                    self.element(element)?.clone(),
                    pointer_id,
                )),
                DragCommand::ApplyOffset { element, offset } => Some(Effect::Style(
                    self.element(element)?.clone(),
                    style::offset(offset).to_vec(),
                )),
                DragCommand::ApplyVisual { element, visual } => Some(Effect::Style(
                    self.element(element)?.clone(),
                    style::visual(appearance, visual),
                )),
            })
            .collect()
    }
}

/// Apply effects outside any state borrow.
fn run_effects(state: &RefCell<PageState>, event: &Event, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::PreventDefault => event.prevent_default(),
            Effect::AcquireCapture(element, pointer_id) => {
                match element.set_pointer_capture(pointer_id) {
                    Ok(()) => {
                        state.borrow_mut().controller.capture_acquired(pointer_id);
                    }
                    Err(err) => tracing::debug!(
                        message = "drag.capture_failed",
                        pointer_id,
                        error = %dom::js_error_text(&err)
                    ),
                }
            }
            Effect::ReleaseCapture(element, pointer_id) => {
                let _ = element.release_pointer_capture(pointer_id);
            }
            Effect::Style(element, declarations) => {
                dom::apply_declarations(&element, &declarations);
            }
        }
    }
}

fn on_pointer_down(state: &RefCell<PageState>, event: &Event) {
    let Some(pointer) = event.dyn_ref::<PointerEvent>() else {
        return;
    };
    let effects = {
        let mut page = state.borrow_mut();
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let Some(id) = page.enrolled_ancestor(&target) else {
            return;
        };
        let Some(geometry) = page.element(id).and_then(dom::measure) else {
            return;
        };
        let sample = PointerSample::new(
            pointer.pointer_id(),
            PointerButton::from_dom(pointer.button()),
            Point::new(f64::from(pointer.client_x()), f64::from(pointer.client_y())),
        );
        let dispatch = page.controller.pointer_down(id, sample, &geometry);
        page.resolve_effects(dispatch.commands)
    };
    run_effects(state, event, effects);
}

fn on_pointer_move(state: &RefCell<PageState>, event: &Event) {
    let Some(pointer) = event.dyn_ref::<PointerEvent>() else {
        return;
    };
    let effects = {
        let mut page = state.borrow_mut();
        let Some(geometry) = page.active_geometry() else {
            return;
        };
        let position = Point::new(f64::from(pointer.client_x()), f64::from(pointer.client_y()));
        let dispatch = page
            .controller
            .pointer_move(pointer.pointer_id(), position, &geometry);
        page.resolve_effects(dispatch.commands)
    };
    run_effects(state, event, effects);
}

fn on_pointer_up(state: &RefCell<PageState>, event: &Event) {
    let Some(pointer) = event.dyn_ref::<PointerEvent>() else {
        return;
    };
    let effects = {
        let mut page = state.borrow_mut();
        let dispatch = page.controller.pointer_up(
            pointer.pointer_id(),
            PointerButton::from_dom(pointer.button()),
        );
        page.resolve_effects(dispatch.commands)
    };
    run_effects(state, event, effects);
}

fn on_pointer_cancel(state: &RefCell<PageState>, event: &Event) {
    let Some(pointer) = event.dyn_ref::<PointerEvent>() else {
        return;
    };
    let effects = {
        let mut page = state.borrow_mut();
        let dispatch = page.controller.pointer_cancel(pointer.pointer_id());
        page.resolve_effects(dispatch.commands)
    };
    run_effects(state, event, effects);
}

fn on_lost_pointer_capture(state: &RefCell<PageState>, event: &Event) {
    let Some(pointer) = event.dyn_ref::<PointerEvent>() else {
        return;
    };
    let effects = {
        let mut page = state.borrow_mut();
        let dispatch = page.controller.lost_pointer_capture(pointer.pointer_id());
        page.resolve_effects(dispatch.commands)
    };
    run_effects(state, event, effects);
}

fn on_key_down(state: &RefCell<PageState>, event: &Event) {
    let Some(keyboard) = event.dyn_ref::<KeyboardEvent>() else {
        return;
    };
    let Some(key) = DragKey::from_dom_key(&keyboard.key()) else {
        return;
    };
    let modifiers = Modifiers::from_flags(
        keyboard.shift_key(),
        keyboard.alt_key(),
        keyboard.ctrl_key(),
        keyboard.meta_key(),
    );
    let effects = {
        let mut page = state.borrow_mut();
        // Escape cancels from session state; only nudges need a fresh measurement.
        let geometry = match page.active_geometry() {
            Some(geometry) => geometry,
            None if key == DragKey::Escape => ElementGeometry::default(),
            None => return,
        };
        let dispatch = page.controller.key_down(key, modifiers, &geometry);
        page.resolve_effects(dispatch.commands)
    };
    run_effects(state, event, effects);
}

type Handler = fn(&RefCell<PageState>, &Event);

const LISTENERS: [(&str, Handler); 6] = [
    ("pointerdown", on_pointer_down),
    ("pointermove", on_pointer_move),
    ("pointerup", on_pointer_up),
    ("pointercancel", on_pointer_cancel),
    ("lostpointercapture", on_lost_pointer_capture),
    ("keydown", on_key_down),
];

struct Listeners {
    document: Document,
    handlers: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
}

impl Listeners {
    fn attach(document: &Document, state: &Rc<RefCell<PageState>>) -> Result<Self, JsValue> {
        let mut listeners = Self {
            document: document.clone(),
            handlers: Vec::with_capacity(LISTENERS.len()),
        };
        for (kind, handler) in LISTENERS {
            let state = Rc::clone(state);
            let closure = Closure::wrap(Box::new(move |event: Event| {
                handler(&state, &event);
            }) as Box<dyn FnMut(Event)>);
            document.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
            listeners.handlers.push((kind, closure));
        }
        Ok(listeners)
    }

    fn detach(self) {
        for (kind, closure) in self.handlers {
            let _ = self
                .document
                .remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        }
    }
}

/// Enroll every element matched by the configured groups, once each.
fn enroll_page(
    document: &Document,
    controller: &mut DragController<LocalStorage>,
) -> Result<Vec<HtmlElement>, JsValue> {
    let config = controller.config().clone();
    let mut elements: Vec<HtmlElement> = Vec::new();
    for group in &config.groups {
        let matches = document.query_selector_all(&group.selector)?;
        for index in 0..matches.length() {
            let Some(element) = matches
                .item(index)
                .and_then(|node| node.dyn_into::<HtmlElement>().ok())
            else {
                continue;
            };
            if elements.contains(&element) {
                continue;
            }
            let dom_id = element.id();
            let entry = controller.enroll(&group.name, Some(dom_id.as_str()));
            element.set_attribute(&config.identity_attribute, entry.identity.as_str())?;
            dom::apply_declarations(&element, &style::enrollment(&config.appearance));
            elements.push(element);
        }
    }
    Ok(elements)
}

/// Drag-and-reposition layer attached to the current document.
#[wasm_bindgen]
pub struct PageDrag {
    state: Rc<RefCell<PageState>>,
    listeners: Option<Listeners>,
}

#[wasm_bindgen]
impl PageDrag {
    /// Enroll elements, restore the saved layout and attach listeners.
    ///
    /// `config_json` is an optional JSON `DragConfig`; omitted fields keep
    /// their defaults. An invalid config is thrown as an error.
    pub fn init(config_json: Option<String>) -> Result<PageDrag, JsValue> {
        install_panic_hook();
        let config = match config_json.as_deref() {
            None | Some("") => DragConfig::default(),
            Some(raw) => DragConfig::from_json_validated(raw)
                .map_err(|err| JsValue::from_str(&err.to_string()))?,
        };
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("no document available"))?;

        let combined_selector = config.combined_selector();
        let mut controller = DragController::new(config, LocalStorage::open());
        let elements = enroll_page(&document, &mut controller)?;

        let mut page = DomPage {
            document: &document,
            registry: controller.registry(),
            elements: &elements,
        };
        let report = controller.restore_saved_positions(&mut page);
        tracing::info!(
            message = "drag.initialized",
            enrolled = elements.len(),
            restored = report.applied,
            skipped = report.skipped
        );

        let state = Rc::new(RefCell::new(PageState {
            controller,
            elements,
            combined_selector,
        }));
        let listeners = Listeners::attach(&document, &state)?;
        Ok(PageDrag {
            state,
            listeners: Some(listeners),
        })
    }

    /// Remove the document listeners. An active drag reverts first.
    pub fn detach(&mut self) {
        let Some(listeners) = self.listeners.take() else {
            return;
        };
        let effects = {
            let mut page = self.state.borrow_mut();
            let dispatch = page.controller.key_down(
                DragKey::Escape,
                Modifiers::NONE,
                &ElementGeometry::default(),
            );
            page.resolve_effects(dispatch.commands)
        };
        for effect in effects {
            match effect {
                Effect::ReleaseCapture(element, pointer_id) => {
                    let _ = element.release_pointer_capture(pointer_id);
                }
                Effect::Style(element, declarations) => {
                    dom::apply_declarations(&element, &declarations);
                }
                Effect::PreventDefault | Effect::AcquireCapture(..) => {}
            }
        }
        listeners.detach();
    }

    #[wasm_bindgen(js_name = isDragging)]
    pub fn is_dragging(&self) -> bool {
        self.state.borrow().controller.is_dragging()
    }

    #[wasm_bindgen(js_name = enrolledCount)]
    pub fn enrolled_count(&self) -> u32 {
        u32::try_from(self.state.borrow().elements.len()).unwrap_or(u32::MAX)
    }

    /// Whether `element` was enrolled by this layer.
    #[wasm_bindgen(js_name = isEnrolled)]
    pub fn is_enrolled(&self, element: &HtmlElement) -> bool {
        self.state.borrow().elements.contains(element)
    }
}

impl Drop for PageDrag {
    fn drop(&mut self) {
        self.detach();
    }
}
