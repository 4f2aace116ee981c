use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use crawlboard_core::{update, AppState, AppViewModel, Effect, Msg, ViewState};
use engine_logging::{engine_info, engine_warn};

use super::cli::Cli;
use super::commands::{parse_command, Command, HELP};
use super::config::{load_config, save_config};
use super::effects::EffectRunner;
use super::ui;

/// Everything the main loop reacts to.
#[derive(Debug)]
pub enum Input {
    Line(String),
    Engine(Msg),
    EndOfInput,
}

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    engine_logging::initialize(cli.log.into(), cli.log_level(), &cli.log_file);

    let mut config = load_config(&cli.config);
    cli.apply_overrides(&mut config);
    if cli.write_config {
        save_config(&cli.config, &config)?;
        println!("Wrote {}", cli.config.display());
        return Ok(());
    }

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let mut runner = EffectRunner::start(config.engine_settings(), input_tx.clone())
        .context("start crawl engine")?;
    spawn_stdin_reader(input_tx);

    let mut session = Session::new(ViewState::with_rows_per_page(config.rows_per_page));
    let mut out = io::stdout();
    print_screen(&mut out, &session.state.view())?;

    while let Ok(input) = input_rx.recv() {
        let msg = match input {
            Input::Engine(msg) => msg,
            Input::EndOfInput => break,
            Input::Line(line) => match parse_command(&line, &session.state) {
                Ok(None) => {
                    prompt(&mut out)?;
                    continue;
                }
                Ok(Some(Command::Quit)) => break,
                Ok(Some(Command::Help)) => {
                    writeln!(out, "{HELP}")?;
                    prompt(&mut out)?;
                    continue;
                }
                Ok(Some(Command::Dispatch(msg))) => msg,
                Err(err) => {
                    writeln!(out, "{err}")?;
                    prompt(&mut out)?;
                    continue;
                }
            },
        };

        let (effects, view) = session.apply(msg);
        runner.enqueue(effects);
        if let Some(view) = view {
            print_screen(&mut out, &view)?;
        }
    }

    engine_info!("Shutting down");
    runner.shutdown();
    Ok(())
}

/// Owns the state between messages and remembers the last rendered view.
struct Session {
    state: AppState,
    last_view: Option<AppViewModel>,
}

impl Session {
    fn new(view: ViewState) -> Self {
        let state = AppState::with_view(view);
        let last_view = Some(state.view());
        Self { state, last_view }
    }

    /// Returns the effects to run and, when something visible changed, the
    /// view to draw.
    fn apply(&mut self, msg: Msg) -> (Vec<Effect>, Option<AppViewModel>) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;

        if !was_dirty {
            return (effects, None);
        }
        let view = self.state.view();
        if self.last_view.as_ref() == Some(&view) {
            return (effects, None);
        }
        self.last_view = Some(view.clone());
        (effects, Some(view))
    }
}

fn spawn_stdin_reader(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    engine_warn!("Failed to read input: {}", err);
                    break;
                }
            };
            if input_tx.send(Input::Line(line)).is_err() {
                return;
            }
        }
        let _ = input_tx.send(Input::EndOfInput);
    });
}

fn print_screen(out: &mut impl Write, view: &AppViewModel) -> io::Result<()> {
    writeln!(out)?;
    write!(out, "{}", ui::render::render(view))?;
    prompt(out)
}

fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crawlboard_core::{Record, RecordId, Status};

    fn record(id: &str, status: Status) -> Record {
        let mut record = Record::queued(id, format!("https://{id}.example"));
        record.status = status;
        record
    }

    #[test]
    fn identical_poll_does_not_redraw() {
        let mut session = Session::new(ViewState::default());
        let records = vec![record("1", Status::Done)];

        let (_, view) = session.apply(Msg::RecordsFetched(records.clone()));
        assert!(view.is_some());
        let (_, view) = session.apply(Msg::RecordsFetched(records));
        assert!(view.is_none());
    }

    #[test]
    fn change_off_page_does_not_redraw() {
        let mut session = Session::new(ViewState::with_rows_per_page(1));
        let (_, view) = session.apply(Msg::RecordsFetched(vec![
            record("1", Status::Done),
            record("2", Status::Running),
        ]));
        assert!(view.is_some());

        // Same counts and page; only the hidden second row changed.
        let (_, view) = session.apply(Msg::RecordsFetched(vec![
            record("1", Status::Done),
            record("2", Status::Done),
        ]));
        assert!(view.is_none());
    }

    #[test]
    fn confirmed_bulk_delete_yields_effect() {
        let mut session = Session::new(ViewState::default());
        session.apply(Msg::RecordsFetched(vec![
            record("1", Status::Done),
            record("2", Status::Done),
        ]));
        session.apply(Msg::SelectionToggled(RecordId::from("2")));
        let (effects, view) = session.apply(Msg::BulkDeleteClicked);
        assert!(effects.is_empty());
        assert!(view.and_then(|view| view.confirmation).is_some());

        let (effects, _) = session.apply(Msg::ConfirmationAnswered(true));
        assert_eq!(
            effects,
            vec![Effect::BulkDelete {
                ids: vec![RecordId::from("2")]
            }]
        );
    }
}
