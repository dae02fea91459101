#![forbid(unsafe_code)]

//! Deterministic drag controller for free-form element repositioning.
//!
//! The controller owns the single drag session of a page and turns host
//! input (pointer lifecycle, keyboard) into [`DragCommand`]s that the host
//! applies to the DOM. It enforces:
//! - one active drag at a time, bound to the pointer that started it,
//! - offsets clamped so the element stays inside its parent,
//! - persistence on release and revert without persistence on cancel.
//!
//! ```text
//! Idle --press--> Dragging --release--> Idle   (persist)
//!                    |  ^
//!          move/nudge+--+   --escape/cancel--> Idle   (revert)
//! ```

use crate::config::DragConfig;
use crate::event::{DragKey, Modifiers, PointerButton, PointerSample};
use crate::geometry::{InlineOffset, Offset, Point, Rect, Size, clamp_offset};
use crate::identity::{ElementId, ElementIdentity, EnrolledElement, Registry};
use crate::store::{KeyValueStore, PositionStore, PositionTarget, RestoreReport, SavedPosition};

/// Measurements of one enrolled element taken by the host.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementGeometry {
    /// Element's viewport box (`getBoundingClientRect()`).
    pub element_rect: Rect,
    /// Untransformed layout size (`offsetWidth`/`offsetHeight`).
    pub element_size: Size,
    /// Parent's viewport box.
    pub parent_rect: Rect,
    /// Current inline `left`/`top`.
    pub inline: InlineOffset,
}

impl ElementGeometry {
    /// Element's current offset relative to its parent, as laid out.
    #[must_use]
    pub fn laid_out_offset(&self) -> Offset {
        let element = self.element_rect.origin();
        let parent = self.parent_rect.origin();
        Offset::new(element.x - parent.x, element.y - parent.y)
    }

    fn clamp(&self, candidate: Offset) -> Offset {
        clamp_offset(candidate, self.parent_rect.size(), self.element_size)
    }
}

/// Visual tier of an enrolled element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragVisual {
    /// Idle cursor, resting z-index, no feedback.
    Resting,
    /// Active cursor, lifted z-index, shadow and scale.
    Lifted,
}

/// Host command emitted by a dispatch, applied in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragCommand {
    /// Suppress the input's default action.
    PreventDefault,
    /// `element.setPointerCapture(pointer_id)`.
    AcquireCapture { element: ElementId, pointer_id: i32 },
    /// `element.releasePointerCapture(pointer_id)`.
    ReleaseCapture { element: ElementId, pointer_id: i32 },
    /// Write inline `left`/`top`.
    ApplyOffset { element: ElementId, offset: Offset },
    ApplyVisual { element: ElementId, visual: DragVisual },
}

/// Lifecycle phase recorded for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerCancel,
    LostPointerCapture,
    CaptureAcquired,
    KeyDown,
}

/// Why an incoming signal was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    UnknownElement,
    ButtonNotAllowed,
    ButtonMismatch,
    ActiveDragInProgress,
    NoActiveDrag,
    PointerMismatch,
}

/// How a drag session was canceled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    EscapeKey,
    PointerCancel,
    LostPointerCapture,
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    Started {
        element: ElementId,
        origin: Offset,
    },
    Moved {
        element: ElementId,
        offset: Offset,
    },
    Nudged {
        element: ElementId,
        offset: Offset,
    },
    Committed {
        element: ElementId,
        position: SavedPosition,
        /// Whether the store accepted the write.
        persisted: bool,
    },
    Canceled {
        element: ElementId,
        restored: Offset,
        reason: CancelReason,
    },
    CaptureAcquired {
        element: ElementId,
    },
    Ignored(IgnoredReason),
}

/// Result of one controller dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DragDispatch {
    pub phase: DragPhase,
    /// Sequence number of accepted dispatches; `None` when ignored.
    pub sequence: Option<u64>,
    pub outcome: DragOutcome,
    pub commands: Vec<DragCommand>,
}

impl DragDispatch {
    fn ignored(phase: DragPhase, reason: IgnoredReason) -> Self {
        tracing::trace!(message = "drag.ignored", ?phase, ?reason);
        Self {
            phase,
            sequence: None,
            outcome: DragOutcome::Ignored(reason),
            commands: Vec::new(),
        }
    }

    /// Whether the signal changed controller state.
    #[must_use]
    pub fn accepted(&self) -> bool {
        !matches!(self.outcome, DragOutcome::Ignored(_))
    }

    #[must_use]
    pub fn ignored_reason(&self) -> Option<IgnoredReason> {
        match self.outcome {
            DragOutcome::Ignored(reason) => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureState {
    Requested,
    Acquired,
}

#[derive(Debug, Clone, PartialEq)]
struct DragSession {
    element: ElementId,
    pointer_id: i32,
    capture: CaptureState,
    /// Pointer position minus the element's viewport top-left at press.
    pointer_offset: Point,
    /// Parent-relative offset at press; restored on cancel.
    original_offset: Offset,
    /// Inline offset as last written.
    inline: InlineOffset,
}

impl DragSession {
    fn release_command(&self) -> Option<DragCommand> {
        (self.capture == CaptureState::Acquired).then_some(DragCommand::ReleaseCapture {
            element: self.element,
            pointer_id: self.pointer_id,
        })
    }
}

/// Page-wide drag controller.
#[derive(Debug)]
pub struct DragController<S> {
    config: DragConfig,
    registry: Registry,
    store: PositionStore<S>,
    session: Option<DragSession>,
    next_sequence: u64,
}

impl<S: KeyValueStore> DragController<S> {
    /// Build a controller persisting through `backend` under the configured key.
    pub fn new(config: DragConfig, backend: S) -> Self {
        let store = PositionStore::new(backend, config.storage_key.clone());
        Self {
            config,
            registry: Registry::new(),
            store,
            session: None,
            next_sequence: 1,
        }
    }

    #[must_use]
    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn store(&self) -> &PositionStore<S> {
        &self.store
    }

    /// Persisted identity of an enrolled element.
    #[must_use]
    pub fn identity(&self, element: ElementId) -> Option<&ElementIdentity> {
        self.registry.get(element).map(|entry| &entry.identity)
    }

    /// Enroll one element of `group`; see [`Registry::enroll`].
    pub fn enroll(&mut self, group: &str, dom_id: Option<&str>) -> EnrolledElement {
        let entry = self.registry.enroll(group, dom_id).clone();
        tracing::debug!(
            message = "drag.enrolled",
            group,
            identity = %entry.identity,
            element = entry.id.get()
        );
        entry
    }

    /// Apply the saved layout; see [`PositionStore::restore_all`].
    pub fn restore_saved_positions<T: PositionTarget>(&self, target: &mut T) -> RestoreReport {
        self.store.restore_all(target)
    }

    /// Element currently being dragged.
    #[must_use]
    pub fn active_element(&self) -> Option<ElementId> {
        self.session.as_ref().map(|s| s.element)
    }

    #[must_use]
    pub fn active_pointer_id(&self) -> Option<i32> {
        self.session.as_ref().map(|s| s.pointer_id)
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Press on an enrolled element: begin a drag session.
    pub fn pointer_down(
        &mut self,
        element: ElementId,
        sample: PointerSample,
        geometry: &ElementGeometry,
    ) -> DragDispatch {
        let phase = DragPhase::PointerDown;
        if self.registry.get(element).is_none() {
            return DragDispatch::ignored(phase, IgnoredReason::UnknownElement);
        }
        if !sample.button.is_primary() {
            return DragDispatch::ignored(phase, IgnoredReason::ButtonNotAllowed);
        }
        if self.session.is_some() {
            return DragDispatch::ignored(phase, IgnoredReason::ActiveDragInProgress);
        }

        let origin = geometry.laid_out_offset();
        self.session = Some(DragSession {
            element,
            pointer_id: sample.pointer_id,
            capture: CaptureState::Requested,
            pointer_offset: Point::new(
                sample.position.x - geometry.element_rect.x,
                sample.position.y - geometry.element_rect.y,
            ),
            original_offset: origin,
            inline: geometry.inline.clone(),
        });
        tracing::debug!(
            message = "drag.started",
            element = element.get(),
            pointer_id = sample.pointer_id,
            left = origin.left,
            top = origin.top
        );
        self.accepted(
            phase,
            DragOutcome::Started { element, origin },
            vec![
                DragCommand::PreventDefault,
                DragCommand::AcquireCapture {
                    element,
                    pointer_id: sample.pointer_id,
                },
                DragCommand::ApplyVisual {
                    element,
                    visual: DragVisual::Lifted,
                },
            ],
        )
    }

    /// Host confirmation that pointer capture was acquired.
    pub fn capture_acquired(&mut self, pointer_id: i32) -> DragDispatch {
        let phase = DragPhase::CaptureAcquired;
        let Some(session) = self.session.as_mut() else {
            return DragDispatch::ignored(phase, IgnoredReason::NoActiveDrag);
        };
        if session.pointer_id != pointer_id {
            return DragDispatch::ignored(phase, IgnoredReason::PointerMismatch);
        }
        session.capture = CaptureState::Acquired;
        let element = session.element;
        self.accepted(phase, DragOutcome::CaptureAcquired { element }, Vec::new())
    }

    /// Pointer movement: follow the pointer, clamped to the parent.
    ///
    /// `geometry` must describe the active element.
    pub fn pointer_move(
        &mut self,
        pointer_id: i32,
        position: Point,
        geometry: &ElementGeometry,
    ) -> DragDispatch {
        let phase = DragPhase::PointerMove;
        let Some(session) = self.session.as_mut() else {
            return DragDispatch::ignored(phase, IgnoredReason::NoActiveDrag);
        };
        if session.pointer_id != pointer_id {
            return DragDispatch::ignored(phase, IgnoredReason::PointerMismatch);
        }

        let candidate = Offset::new(
            position.x - geometry.parent_rect.x - session.pointer_offset.x,
            position.y - geometry.parent_rect.y - session.pointer_offset.y,
        );
        let offset = geometry.clamp(candidate);
        session.inline = offset.to_inline();
        let element = session.element;
        self.accepted(
            phase,
            DragOutcome::Moved { element, offset },
            vec![DragCommand::ApplyOffset { element, offset }],
        )
    }

    /// Pointer release: end the session and persist the final offset.
    pub fn pointer_up(&mut self, pointer_id: i32, button: PointerButton) -> DragDispatch {
        let phase = DragPhase::PointerUp;
        let Some(session) = self.session.as_ref() else {
            return DragDispatch::ignored(phase, IgnoredReason::NoActiveDrag);
        };
        if session.pointer_id != pointer_id {
            return DragDispatch::ignored(phase, IgnoredReason::PointerMismatch);
        }
        if !button.is_primary() {
            return DragDispatch::ignored(phase, IgnoredReason::ButtonMismatch);
        }
        let Some(session) = self.session.take() else {
            return DragDispatch::ignored(phase, IgnoredReason::NoActiveDrag);
        };

        let element = session.element;
        let mut commands = vec![DragCommand::ApplyVisual {
            element,
            visual: DragVisual::Resting,
        }];
        commands.extend(session.release_command());

        let identity = self
            .identity(element)
            .map(ToString::to_string)
            .unwrap_or_default();
        let position = SavedPosition::new(identity, session.inline.left, session.inline.top);
        let persisted = match self.store.save(position.clone()) {
            Ok(outcome) => {
                tracing::debug!(
                    message = "position.saved",
                    id = %position.id,
                    left = %position.left,
                    top = %position.top,
                    ?outcome
                );
                true
            }
            Err(error) => {
                tracing::warn!(message = "position.save_failed", id = %position.id, %error);
                false
            }
        };
        tracing::debug!(message = "drag.committed", element = element.get(), persisted);
        self.accepted(
            phase,
            DragOutcome::Committed {
                element,
                position,
                persisted,
            },
            commands,
        )
    }

    /// Browser `pointercancel`: revert without persisting.
    pub fn pointer_cancel(&mut self, pointer_id: i32) -> DragDispatch {
        self.cancel_active(
            DragPhase::PointerCancel,
            Some(pointer_id),
            CancelReason::PointerCancel,
        )
    }

    /// `lostpointercapture` while a drag is still active: revert without
    /// persisting. After a normal release there is no session and this is
    /// ignored.
    pub fn lost_pointer_capture(&mut self, pointer_id: i32) -> DragDispatch {
        self.cancel_active(
            DragPhase::LostPointerCapture,
            Some(pointer_id),
            CancelReason::LostPointerCapture,
        )
    }

    /// Keyboard input during a drag: arrow nudges and Escape cancel.
    ///
    /// `geometry` must describe the active element.
    pub fn key_down(
        &mut self,
        key: DragKey,
        modifiers: Modifiers,
        geometry: &ElementGeometry,
    ) -> DragDispatch {
        let phase = DragPhase::KeyDown;
        let Some((dx, dy)) = key.direction() else {
            return self.cancel_active(phase, None, CancelReason::EscapeKey);
        };
        let step = if modifiers.contains(Modifiers::SHIFT) {
            self.config.coarse_step
        } else {
            self.config.fine_step
        };
        let Some(session) = self.session.as_mut() else {
            return DragDispatch::ignored(phase, IgnoredReason::NoActiveDrag);
        };

        let offset = geometry.clamp(session.inline.to_offset().translated(dx * step, dy * step));
        session.inline = offset.to_inline();
        let element = session.element;
        self.accepted(
            phase,
            DragOutcome::Nudged { element, offset },
            vec![
                DragCommand::PreventDefault,
                DragCommand::ApplyOffset { element, offset },
            ],
        )
    }

    fn cancel_active(
        &mut self,
        phase: DragPhase,
        pointer_id: Option<i32>,
        reason: CancelReason,
    ) -> DragDispatch {
        let Some(session) = self.session.as_ref() else {
            return DragDispatch::ignored(phase, IgnoredReason::NoActiveDrag);
        };
        if let Some(id) = pointer_id
            && id != session.pointer_id
        {
            return DragDispatch::ignored(phase, IgnoredReason::PointerMismatch);
        }
        let Some(session) = self.session.take() else {
            return DragDispatch::ignored(phase, IgnoredReason::NoActiveDrag);
        };

        let element = session.element;
        let restored = session.original_offset;
        let mut commands = vec![
            DragCommand::ApplyOffset {
                element,
                offset: restored,
            },
            DragCommand::ApplyVisual {
                element,
                visual: DragVisual::Resting,
            },
        ];
        // The browser already dropped capture when it reports the loss.
        if reason != CancelReason::LostPointerCapture {
            commands.extend(session.release_command());
        }
        tracing::debug!(message = "drag.canceled", element = element.get(), ?reason);
        self.accepted(
            phase,
            DragOutcome::Canceled {
                element,
                restored,
                reason,
            },
            commands,
        )
    }

    fn accepted(
        &mut self,
        phase: DragPhase,
        outcome: DragOutcome,
        commands: Vec<DragCommand>,
    ) -> DragDispatch {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        DragDispatch {
            phase,
            sequence: Some(sequence),
            outcome,
            commands,
        }
    }
}
