pub mod audio;
pub mod callbacks;
pub mod config;
pub mod error;
pub mod grid;
pub mod interaction;
pub mod widget;

pub use pinboard_gui_shared::{
  ColorParseError,
  Coordinates,
  NoteDto,
  NoteId,
  NoteSnapshot,
  Rgb
};

pub use audio::{
  Cue,
  CueDone,
  CuePlayer,
  DeferredPlayer,
  SilentPlayer
};
pub use callbacks::{
  NoteCallbacks,
  OwnerEvent
};
pub use config::{
  Config,
  DeleteOnCueFailure,
  WidgetSettings
};
pub use error::CueError;
pub use interaction::Interaction;
pub use widget::{
  NoteView,
  NoteWidget
};
