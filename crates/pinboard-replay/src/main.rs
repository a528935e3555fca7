use std::cell::RefCell;
use std::fs;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, anyhow};
use clap::{ArgAction, Parser};
use pinboard_core::{
    Config, DeferredPlayer, Interaction, NoteCallbacks, NoteDto, NoteSnapshot, NoteView,
    NoteWidget, OwnerEvent, WidgetSettings,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "pinboard-replay",
    version,
    about = "Replays sticky note interaction scenarios and prints owner notifications"
)]
struct Args {
    #[arg(long, required = true)]
    scenario: Vec<PathBuf>,

    /// Mount every note readonly, whatever the scenario says.
    #[arg(long)]
    readonly: bool,

    /// Print the rendered view after the last step.
    #[arg(long)]
    final_view: bool,

    #[arg(long = "pinboardrc")]
    pinboardrc: Option<PathBuf>,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(parse_key_val),
        action = ArgAction::Append
    )]
    rc_overrides: Vec<(String, String)>,

    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    quiet: u8,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    note: NoteDto,
    #[serde(default)]
    readonly: bool,
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Step {
    Settle { settle_cues: CueOutcome },
    Input(Interaction),
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum CueOutcome {
    Ok,
    Fail,
}

#[derive(Debug, Serialize, PartialEq)]
struct Record {
    scenario: String,
    step: usize,
    #[serde(flatten)]
    event: OwnerEvent,
}

#[derive(Debug)]
struct Outcome {
    records: Vec<Record>,
    view: NoteView,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose, args.quiet)?;

    let mut cfg = Config::load(args.pinboardrc.as_deref())?;
    cfg.apply_overrides(args.rc_overrides.clone());
    let settings = WidgetSettings::from_config(&cfg).context("invalid widget settings")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for path in &args.scenario {
        let scenario = load_scenario(path)?;
        info!(scenario = %scenario.name, steps = scenario.steps.len(), "replaying scenario");

        let outcome = replay(scenario, args.readonly, &settings);
        for record in &outcome.records {
            writeln!(out, "{}", serde_json::to_string(record)?)?;
        }
        if args.final_view {
            writeln!(out, "{}", serde_json::to_string(&outcome.view)?)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 || verbose == 0 {
        "warn"
    } else if verbose == 1 {
        "info"
    } else if verbose == 2 {
        "debug"
    } else {
        "trace"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

fn parse_key_val(raw: &str) -> anyhow::Result<(String, String)> {
    let (k, v) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {raw}"))?;
    Ok((k.trim().to_string(), v.trim().to_string()))
}

fn load_scenario(path: &Path) -> anyhow::Result<Scenario> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading scenario {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed parsing scenario {}", path.display()))
}

fn replay(
    scenario: Scenario,
    force_readonly: bool,
    settings: &WidgetSettings,
) -> Outcome {
    let player = Rc::new(DeferredPlayer::new());
    let pending = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&pending);

    let widget = NoteWidget::new(
        NoteSnapshot::new(scenario.note),
        force_readonly || scenario.readonly,
        player.clone(),
        settings.clone(),
    )
    .with_callbacks(NoteCallbacks::forward_to(move |event| {
        sink.borrow_mut().push(event)
    }));

    let mut records = Vec::new();
    for (idx, step) in scenario.steps.into_iter().enumerate() {
        match step {
            Step::Input(Interaction::Sync { snapshot, readonly }) => {
                widget.sync(snapshot, force_readonly || readonly);
            }
            Step::Input(input) => input.apply(&widget),
            Step::Settle { settle_cues } => {
                let settled = match settle_cues {
                    CueOutcome::Ok => player.settle_all(Ok(())),
                    CueOutcome::Fail => player.fail_all("failed by scenario"),
                };
                if settled == 0 {
                    warn!(step = idx + 1, "settle_cues with no cue queued");
                }
            }
        }

        records.extend(pending.borrow_mut().drain(..).map(|event| Record {
            scenario: scenario.name.clone(),
            step: idx + 1,
            event,
        }));
    }

    if player.pending() > 0 {
        warn!(
            scenario = %scenario.name,
            pending = player.pending(),
            "scenario ended with unsettled cues"
        );
    }

    Outcome {
        records,
        view: widget.view(),
    }
}
