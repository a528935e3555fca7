use std::cell::RefCell;
use std::rc::Rc;

use pinboard_core::{
    Coordinates, Cue, DeferredPlayer, Interaction, NoteCallbacks, NoteDto, NoteId, NoteSnapshot,
    NoteWidget, OwnerEvent, Rgb, WidgetSettings,
};

struct Harness {
    widget: NoteWidget,
    player: Rc<DeferredPlayer>,
    events: Rc<RefCell<Vec<OwnerEvent>>>,
}

impl Harness {
    fn mount(readonly: bool) -> Self {
        let player = Rc::new(DeferredPlayer::new());
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let widget = NoteWidget::new(
            NoteSnapshot::new(sample_note()),
            readonly,
            player.clone(),
            WidgetSettings::default(),
        )
        .with_callbacks(NoteCallbacks::forward_to(move |event| {
            sink.borrow_mut().push(event)
        }));
        Self {
            widget,
            player,
            events,
        }
    }

    fn events(&self) -> Vec<OwnerEvent> {
        self.events.borrow().clone()
    }

    fn count(&self, name: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|event| event.name() == name)
            .count()
    }
}

fn sample_note() -> NoteDto {
    NoteDto {
        id: NoteId::new("n1"),
        text: String::new(),
        color: Some(Rgb::new(255, 255, 0)),
        coordinates: Coordinates::new(0, 0),
    }
}

fn at(x: i32, y: i32) -> NoteDto {
    NoteDto {
        coordinates: Coordinates::new(x, y),
        ..sample_note()
    }
}

#[test]
fn drag_snaps_to_grid_and_reports_move_once() {
    let h = Harness::mount(false);
    h.widget.drag_start();
    h.widget.drag_move(Coordinates::new(53, 101));

    assert_eq!(h.widget.note().coordinates, Coordinates::new(50, 100));
    assert_eq!(h.events(), vec![OwnerEvent::Change { note: at(50, 100) }]);

    h.widget.drag_end();
    assert_eq!(h.count("move"), 1);
    assert_eq!(
        h.events().last(),
        Some(&OwnerEvent::Move { note: at(50, 100) })
    );
    assert!(!h.widget.is_dragging());
}

#[test]
fn final_move_matches_last_snapped_position() {
    let paths: [&[(i32, i32)]; 3] = [
        &[(1, 1), (260, -40), (-13, 37)],
        &[(400, 400), (399, 412), (387, 388)],
        &[(-100, 7)],
    ];
    for path in paths {
        let h = Harness::mount(false);
        h.widget.drag_start();
        for &(x, y) in path {
            h.widget.drag_move(Coordinates::new(x, y));
        }
        h.widget.drag_end();

        let &(x, y) = path.last().expect("non-empty path");
        let expected = WidgetSettings::default()
            .grid
            .snap(Coordinates::new(x, y));
        match h.events().last() {
            Some(OwnerEvent::Move { note }) => assert_eq!(note.coordinates, expected),
            other => panic!("expected a move notification, got {other:?}"),
        }
    }
}

#[test]
fn panels_toggle_independently() {
    let h = Harness::mount(false);
    h.widget.toggle_color_picker();
    h.widget.toggle_delete_confirm();
    assert!(h.widget.color_picker_open());
    assert!(h.widget.delete_confirm_open());

    h.widget.toggle_color_picker();
    assert!(!h.widget.color_picker_open());
    assert!(h.widget.delete_confirm_open());

    h.widget.toggle_delete_confirm();
    assert!(!h.widget.delete_confirm_open());
    assert!(h.events().is_empty());
}

#[test]
fn readonly_widget_only_reports_clicks() {
    let h = Harness::mount(true);
    let inputs = vec![
        Interaction::DragStart,
        Interaction::DragMove { x: 80, y: 80 },
        Interaction::DragEnd,
        Interaction::ToggleColorPicker,
        Interaction::PickColor {
            color: Rgb::new(0, 0, 0),
        },
        Interaction::EditText {
            text: "nope".to_string(),
        },
        Interaction::ToggleDeleteConfirm,
        Interaction::ConfirmDelete,
        Interaction::Click,
    ];
    for input in inputs {
        input.apply(&h.widget);
    }
    h.player.settle_all(Ok(()));

    assert_eq!(h.events(), vec![OwnerEvent::Click]);
    assert_eq!(h.widget.note(), sample_note());
    assert!(h.player.played().is_empty());
}

#[test]
fn moved_cue_plays_only_when_owner_moves_the_note() {
    let h = Harness::mount(false);
    let first = NoteSnapshot::new(sample_note());

    let mut retitled = sample_note();
    retitled.text = "renamed upstream".to_string();
    let second = first.successor(retitled);
    h.widget.sync(second.clone(), false);
    assert_eq!(h.widget.note().text, "renamed upstream");
    assert!(h.player.played().is_empty());

    let third = second.successor(at(75, 25));
    h.widget.sync(third, false);
    assert_eq!(h.player.played(), vec![Cue::Move]);
    assert_eq!(h.widget.note().coordinates, Coordinates::new(75, 25));
    assert!(h.events().is_empty());
}

#[test]
fn same_generation_resync_is_idempotent() {
    let h = Harness::mount(false);
    h.widget.edit_text("local edit");
    let before = h.events();

    // same generation, different content: the owner did not push anything new
    h.widget.sync(NoteSnapshot::new(at(500, 500)), false);
    h.widget.sync(NoteSnapshot::new(at(500, 500)), false);

    assert_eq!(h.events(), before);
    assert_eq!(h.widget.note().text, "local edit");
    assert!(h.player.played().is_empty());
}

#[test]
fn every_keystroke_is_reported() {
    let h = Harness::mount(false);
    for text in ["h", "hi", "hi!"] {
        h.widget.edit_text(text);
    }
    let texts: Vec<String> = h
        .events()
        .into_iter()
        .filter_map(|event| match event {
            OwnerEvent::Change { note } => Some(note.text),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["h", "hi", "hi!"]);
}

#[test]
fn cancelling_delete_never_deletes() {
    let h = Harness::mount(false);
    h.widget.toggle_delete_confirm();
    assert!(h.widget.view().delete_confirm_shown);

    h.widget.cancel_delete();
    assert!(!h.widget.view().delete_confirm_shown);
    assert_eq!(h.player.settle_all(Ok(())), 0);
    assert_eq!(h.count("delete"), 0);
}

#[test]
fn confirmed_delete_waits_for_the_cue() {
    let h = Harness::mount(false);
    h.widget.toggle_delete_confirm();
    h.widget.confirm_delete();

    assert_eq!(h.count("delete"), 0);
    assert!(!h.widget.view().delete_confirm_shown);
    assert!(h.widget.deletion_pending());

    // a second confirmation while the cue plays is refused
    h.widget.toggle_delete_confirm();
    h.widget.confirm_delete();
    assert_eq!(h.player.pending(), 1);

    h.player.settle_all(Ok(()));
    assert_eq!(h.count("delete"), 1);
    let view = h.widget.view();
    assert!(!view.delete_confirm_shown);
    assert!(view.dragging);
    assert_eq!(view.class_name(), "note move");
}

#[test]
fn unmounting_mid_cue_drops_the_deletion() {
    let h = Harness::mount(false);
    h.widget.toggle_delete_confirm();
    h.widget.confirm_delete();

    let Harness {
        widget,
        player,
        events,
    } = h;
    drop(widget);

    assert_eq!(player.settle_all(Ok(())), 1);
    assert!(events.borrow().is_empty());
}

#[test]
fn missing_handlers_still_transition() {
    let player = Rc::new(DeferredPlayer::new());
    let widget = NoteWidget::new(
        NoteSnapshot::new(sample_note()),
        false,
        player.clone(),
        WidgetSettings::default(),
    );
    widget.drag_start();
    widget.drag_move(Coordinates::new(25, 25));
    widget.drag_end();
    widget.toggle_delete_confirm();
    widget.confirm_delete();
    player.settle_all(Ok(()));

    assert_eq!(widget.note().coordinates, Coordinates::new(25, 25));
    assert!(widget.is_dragging());
    assert!(!widget.deletion_pending());
}
