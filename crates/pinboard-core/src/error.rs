use thiserror::Error;

/// Why an audio cue did not play to completion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CueError {
    #[error("audio playback is not supported here")]
    Unsupported,

    #[error("audio playback rejected: {0}")]
    Rejected(String),
}

pub type CueResult = std::result::Result<(), CueError>;
