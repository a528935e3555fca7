use std::fmt;
use std::str::FromStr;

use serde::{
  Deserialize,
  Serialize
};
use thiserror::Error;

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
)]
#[serde(transparent)]
pub struct NoteId(pub String);

impl NoteId {
  pub fn new(
    id: impl Into<String>
  ) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for NoteId {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(&self.0)
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
  #[error(
    "expected rgb(r,g,b), got {0:?}"
  )]
  Syntax(String),
  #[error(
    "color channel {channel:?} is \
     not an integer in 0..=255"
  )]
  Channel { channel: String }
}

/// A note color. Serialized as the CSS
/// string `rgb(r,g,b)`.
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
)]
#[serde(
  try_from = "String",
  into = "String"
)]
pub struct Rgb {
  pub r: u8,
  pub g: u8,
  pub b: u8
}

impl Rgb {
  pub const fn new(
    r: u8,
    g: u8,
    b: u8
  ) -> Self {
    Self { r, g, b }
  }
}

impl fmt::Display for Rgb {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "rgb({},{},{})",
      self.r, self.g, self.b
    )
  }
}

impl FromStr for Rgb {
  type Err = ColorParseError;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let inner = s
      .trim()
      .strip_prefix("rgb(")
      .and_then(|rest| {
        rest.strip_suffix(')')
      })
      .ok_or_else(|| {
        ColorParseError::Syntax(
          s.to_string()
        )
      })?;

    let channels = inner
      .split(',')
      .map(|part| {
        let part = part.trim();
        part.parse::<u8>().map_err(
          |_| {
            ColorParseError::Channel {
              channel: part.to_string()
            }
          }
        )
      })
      .collect::<Result<Vec<_>, _>>()?;

    match channels.as_slice() {
      | [r, g, b] => {
        Ok(Self::new(*r, *g, *b))
      }
      | _ => {
        Err(ColorParseError::Syntax(
          s.to_string()
        ))
      }
    }
  }
}

impl TryFrom<String> for Rgb {
  type Error = ColorParseError;

  fn try_from(
    value: String
  ) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<Rgb> for String {
  fn from(value: Rgb) -> Self {
    value.to_string()
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
  Default,
)]
pub struct Coordinates {
  pub x: i32,
  pub y: i32
}

impl Coordinates {
  pub const fn new(
    x: i32,
    y: i32
  ) -> Self {
    Self { x, y }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct NoteDto {
  pub id:          NoteId,
  #[serde(default)]
  pub text:        String,
  #[serde(default)]
  pub color:       Option<Rgb>,
  #[serde(default)]
  pub coordinates: Coordinates
}

/// A note as pushed by its owner.
///
/// The owner bumps `generation` every
/// time it hands the widget a new note;
/// a widget resynchronizes only when the
/// generation differs from the last one
/// it accepted.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct NoteSnapshot {
  #[serde(default)]
  pub generation: u64,
  pub note:       NoteDto
}

impl NoteSnapshot {
  pub fn new(note: NoteDto) -> Self {
    Self {
      generation: 0,
      note
    }
  }

  pub fn successor(
    &self,
    note: NoteDto
  ) -> Self {
    Self {
      generation: self
        .generation
        .wrapping_add(1),
      note
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn note_deserializes_with_css_color()
  {
    let note: NoteDto =
      serde_json::from_value(json!({
        "id": "n1",
        "text": "",
        "color": "rgb(255, 255, 0)",
        "coordinates": { "x": 0, "y": 0 }
      }))
      .expect("note json");

    assert_eq!(note.id.as_str(), "n1");
    assert_eq!(
      note.color,
      Some(Rgb::new(255, 255, 0))
    );
    assert_eq!(
      serde_json::to_value(&note)
        .expect("serialize")["color"],
      json!("rgb(255,255,0)")
    );
  }

  #[test]
  fn missing_fields_fall_back_to_defaults(
  ) {
    let note: NoteDto =
      serde_json::from_value(
        json!({ "id": "bare" })
      )
      .expect("note json");

    assert!(note.text.is_empty());
    assert_eq!(note.color, None);
    assert_eq!(
      note.coordinates,
      Coordinates::new(0, 0)
    );
  }

  #[test]
  fn malformed_colors_are_rejected() {
    assert!(matches!(
      "#ffcc00".parse::<Rgb>(),
      Err(ColorParseError::Syntax(_))
    ));
    assert!(matches!(
      "rgb(1,2)".parse::<Rgb>(),
      Err(ColorParseError::Syntax(_))
    ));
    assert_eq!(
      "rgb(1,2,300)".parse::<Rgb>(),
      Err(ColorParseError::Channel {
        channel: "300".to_string()
      })
    );
    assert!(
      serde_json::from_value::<NoteDto>(
        json!({ "id": "x", "color": "blue" })
      )
      .is_err()
    );
  }

  #[test]
  fn successor_bumps_generation() {
    let first =
      NoteSnapshot::new(NoteDto {
        id:          NoteId::new("n1"),
        text:        String::new(),
        color:       None,
        coordinates: Coordinates::default()
      });
    let mut note = first.note.clone();
    note.text = "moved".to_string();
    let second = first.successor(note);

    assert_eq!(first.generation, 0);
    assert_eq!(second.generation, 1);
    assert_eq!(second.note.text, "moved");
  }
}
