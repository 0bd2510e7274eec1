// src/runner.rs

use crate::cli::{Cli, Command};
use crate::client::HttpExecutionClient;
use crate::config::Config;
use crate::editor::BufferEditor;
use crate::engine::{CodeAdvisor, RunOutcome};
use crate::identity::{ensure_user_id, identity_cookie};
use crate::progress::{ProgressReport, ProgressTracker};
use crate::store::{FileStore, PreferenceStore};
use crate::terminal::TerminalSink;
use crate::util::{read_to_string, resolve_relative_to_config};
use crate::workbench::{Page, Workbench};

use anyhow::{bail, Context, Result};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::io::Write;
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Duration;

type CliWorkbench = Workbench<FileStore, BufferEditor, HttpExecutionClient, TerminalSink>;

/// Entry point from `main.rs`.
pub async fn run(cli: Cli) -> Result<()> {
    let Cli {
        config: config_path,
        server,
        command,
    } = cli;

    match command {
        Command::Init => init_scaffold(),

        Command::Run {
            problem,
            file,
            watch,
        } => {
            let (cfg, store) = prepare(&config_path, server)?;
            let wb = build_workbench(&cfg, store, &problem)?;
            wb.load()?;

            match file {
                Some(path) if watch => execute_with_watch(&wb, &path).await,
                Some(path) => finish(submit_file(&wb, &path).await?),
                None => finish(wb.run().await),
            }
        }

        Command::Reset { problem } => {
            let (cfg, store) = prepare(&config_path, server)?;
            let wb = build_workbench(&cfg, store, &problem)?;
            wb.load()?;
            wb.reset_code(true)?;
            eprintln!("Draft cleared for {}", problem);
            Ok(())
        }

        Command::Progress => {
            let (cfg, store) = prepare(&config_path, server)?;
            let tracker = ProgressTracker::new(PreferenceStore::new(store), cfg.sidebar_sections());
            print!("{}", format_report(&tracker.report()));
            Ok(())
        }

        Command::SwitchTrack { track } => {
            let (cfg, store) = prepare(&config_path, server)?;
            let wb = build_workbench(&cfg, store, "")?;
            if !wb.switch_track(&track).await {
                bail!("Could not switch to track {:?}", track);
            }
            Ok(())
        }

        Command::Whoami => {
            let (_, store) = prepare(&config_path, server)?;
            let user_id = ensure_user_id(&PreferenceStore::new(store))?;
            println!("{}", user_id);
            println!("{}", identity_cookie(&user_id));
            Ok(())
        }
    }
}

/// Load config (with CLI overrides applied) and open the client store.
fn prepare(config_path: &Path, server: Option<String>) -> Result<(Config, FileStore)> {
    let mut cfg = Config::load_or_default(config_path)?;

    // CLI overrides
    if let Some(url) = server {
        cfg.server.base_url = url;
    }

    let store_path = resolve_relative_to_config(config_path, &cfg.store.path);
    let store = FileStore::open(&store_path)?;

    Ok((cfg, store))
}

fn build_workbench(cfg: &Config, store: FileStore, problem_id: &str) -> Result<CliWorkbench> {
    if !problem_id.is_empty() && !cfg.sidebar.is_empty() && !cfg.knows_problem(problem_id) {
        tracing::warn!(problem_id, "Problem is not listed in the sidebar config");
    }

    // The cookie must exist before the client is built.
    let user_id = ensure_user_id(&PreferenceStore::new(store.clone()))?;
    let client = HttpExecutionClient::new(&cfg.server.base_url, &user_id)
        .context("Failed to build execution client")?;
    let advisor = CodeAdvisor::compile(&cfg.advisories)?;

    let page = Page {
        problem_id: problem_id.to_string(),
        initial_code: cfg.problem.initial_code.clone(),
        sidebar: cfg.sidebar_sections(),
        advisor,
    };

    Ok(Workbench::new(
        page,
        store,
        BufferEditor::new(cfg.editor.clone()),
        client,
        TerminalSink::new(),
    ))
}

/// Load the file into the editor (saving it as the draft) and run it.
async fn submit_file(wb: &CliWorkbench, path: &Path) -> Result<RunOutcome> {
    let code = read_to_string(path)?;
    wb.edit(&code)?;
    Ok(wb.run().await)
}

fn finish(outcome: RunOutcome) -> Result<()> {
    match outcome {
        RunOutcome::Passed => Ok(()),
        RunOutcome::Failed => bail!("Run failed"),
        RunOutcome::SystemError(e) => bail!("Run failed: {}", e),
        RunOutcome::Skipped => bail!("Run skipped"),
    }
}

/* ---------------- watch mode ---------------- */

async fn execute_with_watch(wb: &CliWorkbench, path: &Path) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher: RecommendedWatcher =
        Watcher::new(tx, notify::Config::default())
            .context("Failed to initialise file watcher")?;

    watcher.watch(path, RecursiveMode::NonRecursive)?;

    loop {
        clear_screen();

        match submit_file(wb, path).await {
            Ok(RunOutcome::Passed) => eprintln!("OK"),
            Ok(_) => eprintln!("Waiting for changes..."),
            Err(e) => eprintln!("Error: {e}"),
        }

        // Block until something changes
        if rx.recv().is_err() {
            return Ok(());
        }

        // Editors often write a file in several steps.
        while rx.recv_timeout(Duration::from_millis(100)).is_ok() {}
    }
}

fn clear_screen() {
    print!("\x1b[2J\x1b[H");
    let _ = std::io::stdout().flush();
}

/* ---------------- progress ---------------- */

fn format_report(report: &ProgressReport) -> String {
    let mut out = String::new();

    for section in &report.sections {
        out.push_str(&format!(
            "{:<24} {:>3}/{:<3} {:>3}%\n",
            section.title, section.solved, section.total, section.percent
        ));
    }

    out.push_str(&format!(
        "Solved {} of {} ({}%)\n",
        report.solved, report.total, report.overall_percent
    ));
    out.push_str(&format!(
        "Streak: {} day(s), best {}\n",
        report.streaks.current, report.streaks.best
    ));
    out
}

/* ---------------- init ---------------- */

fn init_scaffold() -> Result<()> {
    if !Path::new("config.yaml").exists() {
        std::fs::write("config.yaml", default_config_yaml())?;
        eprintln!("Created config.yaml");
    } else {
        eprintln!("config.yaml already exists (skipping)");
    }

    Ok(())
}

fn default_config_yaml() -> &'static str {
    r#"# codepad configuration

server:
  base_url: http://127.0.0.1:5000

store:
  path: .codepad/store.json

problem:
  initial_code: |
    def solve():
        pass

editor:
  language: python
  theme: vs-dark
  font_size: 15
  tab_size: 4
  insert_spaces: true
  word_wrap: true

advisories:
  - pattern: '\bprint\s*\('
    message: "⚠️ Use return instead of print() inside solve()"

sidebar:
  - title: Day 1
    problems:
      - id: two-sum
        title: Two Sum
"#
}
