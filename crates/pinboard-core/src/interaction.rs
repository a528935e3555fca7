use serde::{Deserialize, Serialize};

use crate::widget::NoteWidget;
use crate::{Coordinates, NoteSnapshot, Rgb};

/// One user or owner input, in a form that can be scripted.
///
/// ```json
/// {"action": "drag_move", "x": 53, "y": 101}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Interaction {
    DragStart,
    DragMove {
        x: i32,
        y: i32,
    },
    DragEnd,
    ToggleDeleteConfirm,
    ToggleColorPicker,
    PickColor {
        color: Rgb,
    },
    CancelDelete,
    ConfirmDelete,
    EditText {
        text: String,
    },
    Click,
    Sync {
        snapshot: NoteSnapshot,
        #[serde(default)]
        readonly: bool,
    },
}

impl Interaction {
    pub fn apply(self, widget: &NoteWidget) {
        match self {
            Interaction::DragStart => widget.drag_start(),
            Interaction::DragMove { x, y } => widget.drag_move(Coordinates::new(x, y)),
            Interaction::DragEnd => widget.drag_end(),
            Interaction::ToggleDeleteConfirm => widget.toggle_delete_confirm(),
            Interaction::ToggleColorPicker => widget.toggle_color_picker(),
            Interaction::PickColor { color } => widget.pick_color(color),
            Interaction::CancelDelete => widget.cancel_delete(),
            Interaction::ConfirmDelete => widget.confirm_delete(),
            Interaction::EditText { text } => widget.edit_text(text),
            Interaction::Click => widget.click(),
            Interaction::Sync { snapshot, readonly } => widget.sync(snapshot, readonly),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Interaction;
    use crate::Rgb;

    #[test]
    fn parses_tagged_actions() {
        let steps: Vec<Interaction> = serde_json::from_value(json!([
            { "action": "drag_start" },
            { "action": "drag_move", "x": 53, "y": 101 },
            { "action": "pick_color", "color": "rgb(0,128,255)" },
            {
                "action": "sync",
                "snapshot": { "generation": 2, "note": { "id": "n1" } }
            }
        ]))
        .expect("valid steps");

        assert_eq!(steps[0], Interaction::DragStart);
        assert_eq!(steps[1], Interaction::DragMove { x: 53, y: 101 });
        assert_eq!(
            steps[2],
            Interaction::PickColor {
                color: Rgb::new(0, 128, 255)
            }
        );
        assert!(matches!(
            &steps[3],
            Interaction::Sync { snapshot, readonly: false } if snapshot.generation == 2
        ));
    }
}
