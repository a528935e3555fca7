//! The sticky note interaction state machine.
//!
//! A [`NoteWidget`] keeps a working copy of the note its owner handed it and
//! layers transient interaction state on top: an active drag, the color
//! picker, and the delete confirmation. Every edit to the working copy is
//! reported to the owner by value through [`NoteCallbacks`] in the same call
//! that made it.
//!
//! Owner handlers always run after the widget has released its state, so a
//! handler may call straight back into the widget (typically [`NoteWidget::sync`]).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::audio::{Cue, CueDone, CuePlayer};
use crate::callbacks::{NoteCallbacks, OwnerEvent};
use crate::config::{DeleteOnCueFailure, WidgetSettings};
use crate::error::CueResult;
use crate::{Coordinates, NoteDto, NoteId, NoteSnapshot, Rgb};

#[derive(Debug, Clone)]
struct WidgetState {
    generation: u64,
    note: NoteDto,
    readonly: bool,
    dragging: bool,
    color_picker_open: bool,
    delete_confirm_open: bool,
    deletion_pending: bool,
    removed: bool,
}

impl WidgetState {
    fn close_panels(&mut self) {
        self.color_picker_open = false;
        self.delete_confirm_open = false;
    }

    /// Whether editing inputs are accepted at all.
    fn editable(&self) -> bool {
        !self.readonly && !self.removed
    }
}

struct Shared {
    state: RefCell<WidgetState>,
    callbacks: RefCell<NoteCallbacks>,
    player: Rc<dyn CuePlayer>,
    settings: WidgetSettings,
}

impl Shared {
    /// Runs `step` against the state, then delivers whatever it emitted.
    fn transition<F>(&self, step: F)
    where
        F: FnOnce(&mut WidgetState, &WidgetSettings) -> Vec<OwnerEvent>,
    {
        let events = {
            let mut state = self.state.borrow_mut();
            step(&mut state, &self.settings)
        };
        self.emit(events);
    }

    fn emit(&self, events: Vec<OwnerEvent>) {
        if events.is_empty() {
            return;
        }
        let callbacks = self.callbacks.borrow().clone();
        for event in events {
            debug!(event = event.name(), "notifying owner");
            callbacks.dispatch(event);
        }
    }

    fn play(&self, cue: Cue, done: CueDone) {
        if self.settings.audio {
            self.player.play(cue, done);
        } else {
            trace!(%cue, "audio disabled; completing cue immediately");
            done(Ok(()));
        }
    }

    fn finish_delete(&self, outcome: CueResult) {
        let proceed = match outcome {
            Ok(()) => true,
            Err(error) => match self.settings.delete_on_cue_failure {
                DeleteOnCueFailure::Proceed => {
                    warn!(%error, "deletion cue failed; deleting anyway");
                    true
                }
                DeleteOnCueFailure::Drop => {
                    warn!(%error, "deletion cue failed; deletion dropped");
                    false
                }
            },
        };

        self.transition(|state, _| {
            if !state.deletion_pending {
                return vec![];
            }
            state.deletion_pending = false;
            if !proceed || !state.editable() {
                return vec![];
            }
            state.removed = true;
            state.dragging = true;
            state.close_panels();
            vec![OwnerEvent::Delete]
        });

        let callbacks = self.callbacks.borrow().clone();
        callbacks.redraw();
    }
}

/// Everything a renderer needs to paint a note. A pure function of the
/// widget's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteView {
    pub id: NoteId,
    pub position: Coordinates,
    pub background: String,
    pub text: String,
    pub placeholder: Option<String>,
    pub readonly: bool,
    pub dragging: bool,
    pub show_handle: bool,
    pub show_delete_icon: bool,
    pub show_palette_icon: bool,
    pub color_picker_shown: bool,
    pub delete_confirm_shown: bool,
    pub deletion_pending: bool,
}

impl NoteView {
    pub fn class_name(&self) -> &'static str {
        if self.dragging { "note move" } else { "note" }
    }
}

/// A mounted sticky note. Dropping it unmounts it: cue continuations still
/// in flight become no-ops.
pub struct NoteWidget {
    shared: Rc<Shared>,
}

impl NoteWidget {
    pub fn new(
        snapshot: NoteSnapshot,
        readonly: bool,
        player: Rc<dyn CuePlayer>,
        settings: WidgetSettings,
    ) -> Self {
        debug!(id = %snapshot.note.id, generation = snapshot.generation, readonly, "mounting note widget");
        let state = WidgetState {
            generation: snapshot.generation,
            note: snapshot.note,
            readonly,
            dragging: false,
            color_picker_open: false,
            delete_confirm_open: false,
            deletion_pending: false,
            removed: false,
        };
        Self {
            shared: Rc::new(Shared {
                state: RefCell::new(state),
                callbacks: RefCell::new(NoteCallbacks::new()),
                player,
                settings,
            }),
        }
    }

    pub fn with_callbacks(self, callbacks: NoteCallbacks) -> Self {
        self.set_callbacks(callbacks);
        self
    }

    pub fn set_callbacks(&self, callbacks: NoteCallbacks) {
        *self.shared.callbacks.borrow_mut() = callbacks;
    }

    pub fn settings(&self) -> &WidgetSettings {
        &self.shared.settings
    }

    /// The working copy.
    pub fn note(&self) -> NoteDto {
        self.shared.state.borrow().note.clone()
    }

    pub fn generation(&self) -> u64 {
        self.shared.state.borrow().generation
    }

    pub fn is_readonly(&self) -> bool {
        self.shared.state.borrow().readonly
    }

    pub fn is_dragging(&self) -> bool {
        self.shared.state.borrow().dragging
    }

    pub fn color_picker_open(&self) -> bool {
        self.shared.state.borrow().color_picker_open
    }

    pub fn delete_confirm_open(&self) -> bool {
        self.shared.state.borrow().delete_confirm_open
    }

    pub fn deletion_pending(&self) -> bool {
        self.shared.state.borrow().deletion_pending
    }

    pub fn view(&self) -> NoteView {
        let state = self.shared.state.borrow();
        let settings = &self.shared.settings;
        let editable = state.editable();
        NoteView {
            id: state.note.id.clone(),
            position: state.note.coordinates,
            background: state.note.color.unwrap_or(settings.default_color).to_string(),
            text: state.note.text.clone(),
            placeholder: (!state.readonly).then(|| settings.placeholder.clone()),
            readonly: state.readonly,
            dragging: state.dragging,
            show_handle: !state.readonly,
            show_delete_icon: !state.readonly,
            show_palette_icon: !state.readonly,
            color_picker_shown: editable && state.color_picker_open,
            delete_confirm_shown: editable && state.delete_confirm_open,
            deletion_pending: state.deletion_pending,
        }
    }

    pub fn drag_start(&self) {
        self.shared.transition(|state, _| {
            if !state.editable() {
                trace!("drag start ignored");
                return vec![];
            }
            state.dragging = true;
            state.close_panels();
            vec![]
        });
    }

    /// Moves the working copy to `raw` snapped to the grid. Positions that
    /// snap to the current cell are not reported again.
    pub fn drag_move(&self, raw: Coordinates) {
        self.shared.transition(|state, settings| {
            if !state.dragging || !state.editable() {
                trace!(?raw, "drag move ignored");
                return vec![];
            }
            let snapped = settings.grid.snap(raw);
            if snapped == state.note.coordinates {
                return vec![];
            }
            state.note.coordinates = snapped;
            vec![OwnerEvent::Change {
                note: state.note.clone(),
            }]
        });
    }

    pub fn drag_end(&self) {
        self.shared.transition(|state, _| {
            if !state.dragging || !state.editable() {
                trace!("drag end ignored");
                return vec![];
            }
            state.dragging = false;
            vec![OwnerEvent::Move {
                note: state.note.clone(),
            }]
        });
    }

    pub fn toggle_delete_confirm(&self) {
        self.shared.transition(|state, _| {
            if !state.editable() || state.deletion_pending {
                trace!("delete toggle ignored");
                return vec![];
            }
            state.delete_confirm_open = !state.delete_confirm_open;
            vec![]
        });
    }

    pub fn toggle_color_picker(&self) {
        self.shared.transition(|state, _| {
            if !state.editable() {
                trace!("palette toggle ignored");
                return vec![];
            }
            state.color_picker_open = !state.color_picker_open;
            vec![]
        });
    }

    /// Applies a picked color. The picker stays open.
    pub fn pick_color(&self, color: Rgb) {
        self.shared.transition(|state, _| {
            if !state.color_picker_open || !state.editable() {
                trace!(%color, "color pick ignored");
                return vec![];
            }
            state.note.color = Some(color);
            vec![OwnerEvent::Change {
                note: state.note.clone(),
            }]
        });
    }

    pub fn cancel_delete(&self) {
        self.shared.transition(|state, _| {
            state.delete_confirm_open = false;
            vec![]
        });
    }

    /// Starts the deletion cue. The owner hears about the deletion only once
    /// the cue completes.
    pub fn confirm_delete(&self) {
        let mut started = false;
        self.shared.transition(|state, _| {
            if !state.delete_confirm_open || !state.editable() || state.deletion_pending {
                trace!("delete confirmation ignored");
                return vec![];
            }
            state.delete_confirm_open = false;
            state.deletion_pending = true;
            started = true;
            vec![]
        });
        if !started {
            return;
        }

        debug!("deletion confirmed; playing cue");
        let weak: Weak<Shared> = Rc::downgrade(&self.shared);
        self.shared.play(
            Cue::Delete,
            Box::new(move |outcome| match weak.upgrade() {
                Some(shared) => shared.finish_delete(outcome),
                None => debug!("widget unmounted before deletion cue finished"),
            }),
        );
    }

    /// Replaces the text of the working copy. Every call is reported.
    pub fn edit_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.shared.transition(|state, _| {
            if !state.editable() {
                trace!("text edit ignored");
                return vec![];
            }
            state.note.text = text;
            vec![OwnerEvent::Change {
                note: state.note.clone(),
            }]
        });
    }

    pub fn click(&self) {
        self.shared.transition(|_, _| vec![OwnerEvent::Click]);
    }

    /// Accepts the owner's current props. The working copy is replaced only
    /// when the snapshot's generation differs from the one last accepted.
    pub fn sync(&self, snapshot: NoteSnapshot, readonly: bool) {
        let mut moved = false;
        self.shared.transition(|state, _| {
            if readonly && !state.readonly {
                debug!("switched to readonly");
                if !state.removed {
                    state.dragging = false;
                }
                state.close_panels();
            }
            state.readonly = readonly;

            if state.generation == snapshot.generation {
                return vec![];
            }
            debug!(
                from = state.generation,
                to = snapshot.generation,
                "resyncing working copy from owner"
            );
            moved = state.note.coordinates != snapshot.note.coordinates;
            state.generation = snapshot.generation;
            state.note = snapshot.note;
            vec![]
        });

        if moved {
            self.shared.play(
                Cue::Move,
                Box::new(|outcome| {
                    if let Err(error) = outcome {
                        debug!(%error, "move cue skipped");
                    }
                }),
            );
        }
    }
}

impl std::fmt::Debug for NoteWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteWidget")
            .field("state", &self.shared.state.borrow())
            .field("callbacks", &self.shared.callbacks.borrow())
            .finish()
    }
}
