//! Terminal status board for team task files.
//!
//! Reads task and epic JSON from `<root>/<team>/` and prints a formatted
//! overview, optionally re-rendering on an interval until interrupted.

mod render;
mod theme;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use taskdeck_core::store;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::theme::Theme;

#[derive(Parser, Debug)]
#[command(name = "taskdeck-board")]
#[command(about = "Status board for team task files", long_about = None)]
struct Args {
    /// Team whose board to show
    #[arg(default_value = "default")]
    team: String,

    /// Re-render every interval until interrupted
    #[arg(long)]
    watch: bool,

    /// Print the loaded board as pretty JSON instead of rendering
    #[arg(long)]
    json: bool,

    /// Seconds between refreshes in watch mode
    #[arg(long, default_value_t = 5)]
    interval: u64,

    /// Tasks root directory (falls back to TASKDECK_ROOT, then ~/.claude/tasks)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn resolve_tasks_root(flag: Option<PathBuf>) -> PathBuf {
    if let Some(root) = flag {
        return root;
    }
    if let Ok(root) = std::env::var("TASKDECK_ROOT") {
        let trimmed = root.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".claude")
        .join("tasks")
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let theme = Theme::detect(args.no_color);
    let root = resolve_tasks_root(args.root);
    debug!("board_start: team={} root={}", args.team, root.display());

    if args.json {
        let board = store::load_board(&root, &args.team);
        println!("{}", serde_json::to_string_pretty(&board)?);
        return Ok(());
    }

    if !args.watch {
        let board = store::load_board(&root, &args.team);
        println!("{}", render::render_board(&board, &theme));
        return Ok(());
    }

    let mut stdout = std::io::stdout();
    loop {
        execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
        let board = store::load_board(&root, &args.team);
        println!("{}", render::render_board(&board, &theme));
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\n{}Board stopped{}", theme.yellow, theme.reset);
                return Ok(());
            }
            _ = tokio::time::sleep(Duration::from_secs(args.interval)) => {}
        }
    }
}
