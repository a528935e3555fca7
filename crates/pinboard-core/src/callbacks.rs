use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use tracing::trace;

use crate::NoteDto;

pub type NoteHandler = Rc<dyn Fn(NoteDto)>;
pub type Handler = Rc<dyn Fn()>;

/// A notification from a widget to the owner of its note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OwnerEvent {
    Change { note: NoteDto },
    Move { note: NoteDto },
    Delete,
    Click,
}

impl OwnerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OwnerEvent::Change { .. } => "change",
            OwnerEvent::Move { .. } => "move",
            OwnerEvent::Delete => "delete",
            OwnerEvent::Click => "click",
        }
    }
}

/// Owner handlers. Every handler is optional; a missing one means the
/// notification is skipped.
#[derive(Clone, Default)]
pub struct NoteCallbacks {
    on_change: Option<NoteHandler>,
    on_move: Option<NoteHandler>,
    on_delete: Option<Handler>,
    on_click: Option<Handler>,
    on_redraw: Option<Handler>,
}

impl NoteCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes every owner notification into one sink.
    pub fn forward_to<F>(sink: F) -> Self
    where
        F: Fn(OwnerEvent) + 'static,
    {
        let sink = Rc::new(sink);
        let change = Rc::clone(&sink);
        let moved = Rc::clone(&sink);
        let delete = Rc::clone(&sink);
        Self::new()
            .on_change(move |note| change(OwnerEvent::Change { note }))
            .on_move(move |note| moved(OwnerEvent::Move { note }))
            .on_delete(move || delete(OwnerEvent::Delete))
            .on_click(move || sink(OwnerEvent::Click))
    }

    pub fn on_change(mut self, handler: impl Fn(NoteDto) + 'static) -> Self {
        self.on_change = Some(Rc::new(handler));
        self
    }

    pub fn on_move(mut self, handler: impl Fn(NoteDto) + 'static) -> Self {
        self.on_move = Some(Rc::new(handler));
        self
    }

    pub fn on_delete(mut self, handler: impl Fn() + 'static) -> Self {
        self.on_delete = Some(Rc::new(handler));
        self
    }

    pub fn on_click(mut self, handler: impl Fn() + 'static) -> Self {
        self.on_click = Some(Rc::new(handler));
        self
    }

    /// Called after a transition that no direct call observed, such as a
    /// deletion cue finishing.
    pub fn on_redraw(mut self, handler: impl Fn() + 'static) -> Self {
        self.on_redraw = Some(Rc::new(handler));
        self
    }

    pub(crate) fn dispatch(&self, event: OwnerEvent) {
        let name = event.name();
        let delivered = match event {
            OwnerEvent::Change { note } => self.on_change.as_ref().map(|h| h(note)),
            OwnerEvent::Move { note } => self.on_move.as_ref().map(|h| h(note)),
            OwnerEvent::Delete => self.on_delete.as_ref().map(|h| h()),
            OwnerEvent::Click => self.on_click.as_ref().map(|h| h()),
        };
        if delivered.is_none() {
            trace!(event = name, "no owner handler; notification skipped");
        }
    }

    pub(crate) fn redraw(&self) {
        if let Some(handler) = &self.on_redraw {
            handler();
        }
    }
}

impl fmt::Debug for NoteCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoteCallbacks")
            .field("on_change", &self.on_change.is_some())
            .field("on_move", &self.on_move.is_some())
            .field("on_delete", &self.on_delete.is_some())
            .field("on_click", &self.on_click.is_some())
            .field("on_redraw", &self.on_redraw.is_some())
            .finish()
    }
}
