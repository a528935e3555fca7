use std::rc::Rc;

use pinboard_core::{
  Coordinates,
  NoteCallbacks,
  NoteDto,
  NoteSnapshot,
  NoteWidget,
  Rgb,
  WidgetSettings
};
use web_sys::{
  Element,
  HtmlTextAreaElement,
  InputEvent,
  MouseEvent,
  PointerEvent
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  function_component,
  html,
  use_effect_with,
  use_force_update,
  use_mut_ref
};

use crate::audio::WebCuePlayer;

const SWATCHES: [Rgb; 10] = [
  Rgb::new(255, 105, 0),
  Rgb::new(252, 185, 0),
  Rgb::new(123, 220, 181),
  Rgb::new(0, 208, 132),
  Rgb::new(142, 209, 252),
  Rgb::new(6, 147, 227),
  Rgb::new(171, 184, 195),
  Rgb::new(235, 20, 76),
  Rgb::new(247, 141, 167),
  Rgb::new(153, 0, 239)
];

#[derive(Properties, PartialEq)]
pub struct NoteCardProps {
  pub note:      NoteSnapshot,
  #[prop_or_default]
  pub readonly:  bool,
  #[prop_or_default]
  pub z_index:   u32,
  #[prop_or_default]
  pub on_delete: Option<Callback<()>>,
  #[prop_or_default]
  pub on_change:
    Option<Callback<NoteDto>>,
  #[prop_or_default]
  pub on_move:
    Option<Callback<NoteDto>>,
  #[prop_or_default]
  pub on_click:  Option<Callback<()>>
}

#[derive(Clone, Copy)]
struct DragAnchor {
  pointer: (i32, i32),
  origin:  Coordinates
}

#[function_component(NoteCard)]
pub fn note_card(
  props: &NoteCardProps
) -> Html {
  let redraw = use_force_update();
  let widget = {
    let note = props.note.clone();
    let readonly = props.readonly;
    use_mut_ref(move || {
      let settings =
        WidgetSettings::default();
      let player = Rc::new(
        WebCuePlayer::new(
          settings.cues.clone()
        )
      );
      NoteWidget::new(
        note, readonly, player,
        settings
      )
    })
  };
  let anchor =
    use_mut_ref(|| None::<DragAnchor>);

  {
    let redraw = redraw.clone();
    widget.borrow().set_callbacks(
      owner_callbacks(props, move || {
        redraw.force_update()
      })
    );
  }

  {
    let widget = widget.clone();
    let redraw = redraw.clone();
    use_effect_with(
      (
        props.note.clone(),
        props.readonly
      ),
      move |(note, readonly)| {
        widget
          .borrow()
          .sync(note.clone(), *readonly);
        redraw.force_update();
        || ()
      }
    );
  }

  let view = widget.borrow().view();

  let act = |action: fn(&NoteWidget)| {
    let widget = widget.clone();
    let redraw = redraw.clone();
    Callback::from(
      move |_: MouseEvent| {
        action(&widget.borrow());
        redraw.force_update();
      }
    )
  };

  let onpointerdown = {
    let widget = widget.clone();
    let anchor = anchor.clone();
    let redraw = redraw.clone();
    Callback::from(
      move |event: PointerEvent| {
        let widget = widget.borrow();
        if widget.is_readonly() {
          return;
        }
        if let Some(target) = event
          .target_dyn_into::<Element>()
        {
          let _ = target
            .set_pointer_capture(
              event.pointer_id()
            );
        }
        *anchor.borrow_mut() =
          Some(DragAnchor {
            pointer: (
              event.client_x(),
              event.client_y()
            ),
            origin:  widget
              .note()
              .coordinates
          });
        widget.drag_start();
        redraw.force_update();
      }
    )
  };

  let onpointermove = {
    let widget = widget.clone();
    let anchor = anchor.clone();
    let redraw = redraw.clone();
    Callback::from(
      move |event: PointerEvent| {
        let Some(start) =
          *anchor.borrow()
        else {
          return;
        };
        let raw = Coordinates::new(
          start.origin.x
            + event.client_x()
            - start.pointer.0,
          start.origin.y
            + event.client_y()
            - start.pointer.1
        );
        widget.borrow().drag_move(raw);
        redraw.force_update();
      }
    )
  };

  let end_drag = {
    let widget = widget.clone();
    let anchor = anchor.clone();
    let redraw = redraw.clone();
    Callback::from(
      move |_: PointerEvent| {
        if anchor
          .borrow_mut()
          .take()
          .is_some()
        {
          widget.borrow().drag_end();
          redraw.force_update();
        }
      }
    )
  };

  let oninput = {
    let widget = widget.clone();
    let redraw = redraw.clone();
    Callback::from(
      move |event: InputEvent| {
        if let Some(area) = event
          .target_dyn_into::<
            HtmlTextAreaElement,
          >()
        {
          widget
            .borrow()
            .edit_text(area.value());
          redraw.force_update();
        }
      }
    )
  };

  let style = format!(
    "transform: translate({}px, \
     {}px); background-color: {}; \
     z-index: {};",
    view.position.x,
    view.position.y,
    view.background,
    props.z_index
  );

  html! {
      <div class={view.class_name()} {style} onclick={act(NoteWidget::click)}>
          {
              if view.show_handle {
                  html! {
                      <div
                          class="handle btn"
                          onpointerdown={onpointerdown}
                          onpointermove={onpointermove}
                          onpointerup={end_drag.clone()}
                          onpointercancel={end_drag}
                      >
                          { "..." }
                      </div>
                  }
              } else {
                  html! {}
              }
          }
          <textarea
              dir="auto"
              value={view.text.clone()}
              placeholder={view.placeholder.clone().unwrap_or_default()}
              readonly={view.readonly}
              {oninput}
          />
          {
              if view.show_delete_icon {
                  html! {
                      <div class="icon" title="Delete" onclick={act(NoteWidget::toggle_delete_confirm)}>{ "🗑" }</div>
                  }
              } else {
                  html! {}
              }
          }
          {
              if view.show_palette_icon {
                  html! {
                      <div class="icon palette" title="Color" onclick={act(NoteWidget::toggle_color_picker)}>{ "🎨" }</div>
                  }
              } else {
                  html! {}
              }
          }
          {
              if view.color_picker_shown {
                  html! {
                      <div class="color-picker">
                          {
                              for SWATCHES.iter().map(|swatch| {
                                  let swatch = *swatch;
                                  let widget = widget.clone();
                                  let redraw = redraw.clone();
                                  let onclick = Callback::from(move |_: MouseEvent| {
                                      widget.borrow().pick_color(swatch);
                                      redraw.force_update();
                                  });
                                  html! {
                                      <span
                                          class="swatch"
                                          style={format!("background-color: {swatch};")}
                                          {onclick}
                                      />
                                  }
                              })
                          }
                      </div>
                  }
              } else {
                  html! {}
              }
          }
          {
              if view.delete_confirm_shown {
                  html! {
                      <div class="confirm-popover">
                          <span class="d-block">{ "Are you sure you want to delete this note?" }</span>
                          <div class="btn-group" dir="ltr">
                              <button class="btn secondary" onclick={act(NoteWidget::cancel_delete)}>{ "No" }</button>
                              <button class="btn danger" onclick={act(NoteWidget::confirm_delete)}>{ "Yes" }</button>
                          </div>
                      </div>
                  }
              } else {
                  html! {}
              }
          }
      </div>
  }
}

fn owner_callbacks(
  props: &NoteCardProps,
  redraw: impl Fn() + 'static
) -> NoteCallbacks {
  let mut callbacks =
    NoteCallbacks::new().on_redraw(redraw);
  if let Some(on_change) =
    props.on_change.clone()
  {
    callbacks = callbacks.on_change(
      move |note| on_change.emit(note)
    );
  }
  if let Some(on_move) =
    props.on_move.clone()
  {
    callbacks = callbacks.on_move(
      move |note| on_move.emit(note)
    );
  }
  if let Some(on_delete) =
    props.on_delete.clone()
  {
    callbacks = callbacks
      .on_delete(move || on_delete.emit(()));
  }
  if let Some(on_click) =
    props.on_click.clone()
  {
    callbacks = callbacks
      .on_click(move || on_click.emit(()));
  }
  callbacks
}
