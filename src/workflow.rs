use crate::cli::Cli;
use crate::error::PickError;
use crate::file_scanner::{MatchPattern, compile_patterns, discover};
use crate::runner::{CommandRunner, DryRunner, ProcessRunner};
use crate::selection::SelectionSet;
use crate::tui::{self, Outcome, ScrollSettings, TuiApp};
use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

struct CompiledPatterns {
    include: Vec<MatchPattern>,
    exclude: Vec<MatchPattern>,
    preselect: Vec<MatchPattern>,
}

fn compile_cli_patterns(cli_args: &Cli) -> Result<CompiledPatterns, PickError> {
    Ok(CompiledPatterns {
        include: compile_patterns(&cli_args.include_patterns())?,
        exclude: compile_patterns(&cli_args.ignores)?,
        preselect: compile_patterns(&cli_args.preselect)?,
    })
}

fn initial_selection(discovered: &[String], preselect: &[MatchPattern]) -> SelectionSet {
    let mut selection = SelectionSet::new();
    selection.select_all(
        discovered
            .iter()
            .filter(|path| preselect.iter().any(|pattern| pattern.matches(path))),
    );
    selection
}

/// Raised by SIGINT/SIGTERM. The loop polls it between inputs.
fn install_interrupt_flag() -> Arc<AtomicBool> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        warn!("could not install signal handler: {e}");
    }
    interrupted
}

/// Reports how a session ended and, on a non-empty confirmed selection,
/// hands the paths to `runner`. Returns the process exit code.
pub fn finish_session(
    outcome: Outcome,
    selected: &[String],
    runner: &mut dyn CommandRunner,
) -> i32 {
    if outcome == Outcome::Cancelled {
        println!("⏹️  Cancelled.");
        return 0;
    }
    if selected.is_empty() {
        println!("⚠️  No tests selected.");
        return 0;
    }

    println!("✅ {} test file(s) selected.", selected.len());
    match runner.run(selected) {
        Ok(0) => 0,
        Ok(code) => {
            let err = PickError::RunnerFailure { code };
            eprintln!("❌ {err}");
            err.exit_code()
        }
        Err(err) => {
            eprintln!("❌ {err}");
            err.exit_code()
        }
    }
}

/// Discovers, runs the picker and launches the command. Returns the exit code.
pub fn run_testpick(cli_args: Cli) -> Result<i32> {
    let patterns = match compile_cli_patterns(&cli_args) {
        Ok(patterns) => patterns,
        Err(err) => {
            eprintln!("❌ {err}");
            return Ok(err.exit_code());
        }
    };

    let discovered = discover(
        &cli_args.root,
        &patterns.include,
        &patterns.exclude,
        cli_args.include_ignored,
    );
    if discovered.is_empty() {
        let err = PickError::EmptyDiscovery {
            root: cli_args.root.clone(),
        };
        eprintln!("❌ {err}");
        return Ok(err.exit_code());
    }
    info!(files = discovered.len(), root = %cli_args.root.display(), "discovery finished");

    let selection = initial_selection(&discovered, &patterns.preselect);
    let scroll = ScrollSettings {
        rows: cli_args.scroll_rows.max(1),
        tick: Duration::from_millis(cli_args.scroll_tick_ms),
    };
    let strip = cli_args.strip_segment();
    let app = TuiApp::new(discovered, strip.as_deref(), selection, scroll);

    let interrupted = install_interrupt_flag();
    let app = tui::run_session(app, &interrupted)?;

    // The loop only returns once an outcome is set.
    let outcome = app.outcome().unwrap_or(Outcome::Cancelled);
    let selected = app.selected_paths();
    info!(?outcome, selected = selected.len(), "session ended");

    let template = cli_args.command_template();
    let code = if cli_args.dry_run {
        finish_session(outcome, &selected, &mut DryRunner::new(template, cli_args.env))
    } else {
        finish_session(outcome, &selected, &mut ProcessRunner::new(template, cli_args.env))
    };
    Ok(code)
}
