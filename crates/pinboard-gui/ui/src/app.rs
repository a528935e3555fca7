use pinboard_core::{
  Coordinates,
  NoteDto,
  NoteId,
  NoteSnapshot
};
use uuid::Uuid;
use yew::{
  Callback,
  Html,
  function_component,
  html,
  use_state
};

use crate::components::NoteCard;

#[derive(Clone, PartialEq)]
struct BoardNote {
  snapshot: NoteSnapshot,
  z:        u32
}

#[derive(Clone, PartialEq)]
struct Board {
  notes:    Vec<BoardNote>,
  readonly: bool,
  next_z:   u32
}

impl Default for Board {
  fn default() -> Self {
    let mut board = Self {
      notes:    Vec::new(),
      readonly: false,
      next_z:   1
    };
    board.add(Coordinates::new(50, 75));
    board
  }
}

impl Board {
  fn add(
    &mut self,
    at: Coordinates
  ) {
    let note = NoteDto {
      id:          NoteId::new(
        Uuid::new_v4().to_string()
      ),
      text:        String::new(),
      color:       None,
      coordinates: at
    };
    self.notes.push(BoardNote {
      snapshot: NoteSnapshot::new(note),
      z:        self.next_z
    });
    self.next_z += 1;
  }

  fn position(
    &self,
    id: &NoteId
  ) -> Option<usize> {
    self
      .notes
      .iter()
      .position(|entry| {
        &entry.snapshot.note.id == id
      })
  }

  /// Stores the widget's own edit
  /// without bumping the generation,
  /// so the card keeps its working
  /// copy.
  fn edited(
    &mut self,
    note: NoteDto
  ) {
    if let Some(idx) =
      self.position(&note.id)
    {
      self.notes[idx].snapshot.note =
        note;
    }
  }

  fn removed(
    &mut self,
    id: &NoteId
  ) {
    self.notes.retain(|entry| {
      &entry.snapshot.note.id != id
    });
  }

  fn raised(
    &mut self,
    id: &NoteId
  ) {
    if let Some(idx) = self.position(id)
    {
      self.notes[idx].z = self.next_z;
      self.next_z += 1;
    }
  }

  /// Pushes new positions from the
  /// owner side, which the cards pick
  /// up as a fresh generation.
  fn stacked(&mut self) {
    for (idx, entry) in
      self.notes.iter_mut().enumerate()
    {
      let step =
        i32::try_from(idx).unwrap_or(0)
          * 25;
      let mut note =
        entry.snapshot.note.clone();
      note.coordinates =
        Coordinates::new(
          50 + step,
          75 + step
        );
      entry.snapshot =
        entry.snapshot.successor(note);
    }
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let board = use_state(Board::default);

  let update = {
    let board = board.clone();
    move |change: Box<dyn FnOnce(&mut Board)>| {
      let mut next = (*board).clone();
      change(&mut next);
      board.set(next);
    }
  };

  let on_add = {
    let update = update.clone();
    Callback::from(move |_| {
      update(Box::new(|board: &mut Board| {
        let offset = i32::try_from(
          board.notes.len()
        )
        .unwrap_or(0)
          * 25;
        board.add(Coordinates::new(
          50 + offset,
          75 + offset
        ));
      }));
    })
  };

  let on_stack = {
    let update = update.clone();
    Callback::from(move |_| {
      update(Box::new(Board::stacked));
    })
  };

  let on_lock = {
    let update = update.clone();
    Callback::from(move |_| {
      update(Box::new(|board: &mut Board| {
        board.readonly = !board.readonly;
        tracing::info!(
          readonly = board.readonly,
          "board lock toggled"
        );
      }));
    })
  };

  let cards = board.notes.iter().map(|entry| {
    let id = entry.snapshot.note.id.clone();

    let on_change = {
      let update = update.clone();
      Callback::from(move |note: NoteDto| {
        update(Box::new(move |board: &mut Board| {
          board.edited(note)
        }));
      })
    };
    let on_move = {
      let update = update.clone();
      Callback::from(move |note: NoteDto| {
        tracing::debug!(
          id = %note.id,
          x = note.coordinates.x,
          y = note.coordinates.y,
          "note moved"
        );
        update(Box::new(move |board: &mut Board| {
          board.edited(note)
        }));
      })
    };
    let on_delete = {
      let update = update.clone();
      let id = id.clone();
      Callback::from(move |(): ()| {
        let id = id.clone();
        update(Box::new(move |board: &mut Board| {
          board.removed(&id)
        }));
      })
    };
    let on_click = {
      let update = update.clone();
      let id = id.clone();
      Callback::from(move |(): ()| {
        let id = id.clone();
        update(Box::new(move |board: &mut Board| {
          board.raised(&id)
        }));
      })
    };

    html! {
        <NoteCard
            key={id.to_string()}
            note={entry.snapshot.clone()}
            readonly={board.readonly}
            z_index={entry.z}
            on_change={Some(on_change)}
            on_move={Some(on_move)}
            on_delete={Some(on_delete)}
            on_click={Some(on_click)}
        />
    }
  });

  html! {
      <div class="board">
          <div class="toolbar">
              <button class="btn" onclick={on_add} disabled={board.readonly}>{ "Add note" }</button>
              <button class="btn" onclick={on_stack}>{ "Stack" }</button>
              <button class="btn" onclick={on_lock}>
                  { if board.readonly { "Unlock" } else { "Lock" } }
              </button>
          </div>
          <div class="pins">
              { for cards }
          </div>
      </div>
  }
}
