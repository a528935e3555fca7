use pinboard_core::config::CueSources;
use pinboard_core::{Cue, CueDone, CueError, CuePlayer};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::HtmlAudioElement;

/// Plays cues through a fresh `<audio>` element per request.
pub struct WebCuePlayer {
  sources: CueSources
}

impl WebCuePlayer {
  pub fn new(
    sources: CueSources
  ) -> Self {
    Self { sources }
  }

  fn source(
    &self,
    cue: Cue
  ) -> &str {
    match cue {
      | Cue::Delete => {
        &self.sources.delete
      }
      | Cue::Move => &self.sources.moved
    }
  }
}

impl CuePlayer for WebCuePlayer {
  fn play(
    &self,
    cue: Cue,
    done: CueDone
  ) {
    let audio =
      match HtmlAudioElement::new_with_src(
        self.source(cue)
      ) {
        | Ok(audio) => audio,
        | Err(error) => {
          tracing::warn!(
            %cue,
            error = %describe(&error),
            "audio element unavailable"
          );
          done(Err(
            CueError::Unsupported
          ));
          return;
        }
      };

    let promise = match audio.play() {
      | Ok(promise) => promise,
      | Err(error) => {
        done(Err(CueError::Rejected(
          describe(&error)
        )));
        return;
      }
    };

    spawn_local(async move {
      let outcome =
        JsFuture::from(promise)
          .await
          .map(|_| ())
          .map_err(|error| {
            CueError::Rejected(describe(
              &error
            ))
          });
      done(outcome);
    });
  }
}

fn describe(error: &JsValue) -> String {
  error
    .as_string()
    .unwrap_or_else(|| {
      format!("{error:?}")
    })
}
