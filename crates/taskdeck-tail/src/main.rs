//! Stream filter for agent stream-json output.
//!
//! Reads JSON lines from stdin and prints a compact activity feed of tool
//! calls, errors, and the final run summary. Lines that do not parse, and
//! event types this filter does not know, are dropped silently so the feed
//! never breaks mid-run.

use std::io::{self, IsTerminal, Write};

use chrono::Local;
use clap::Parser;
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const SEPARATOR_WIDTH: usize = 60;

#[derive(Parser, Debug)]
#[command(name = "taskdeck-tail")]
#[command(about = "Filter agent stream-json output into an activity feed", long_about = None)]
struct Args {
    /// Also show text and thinking events
    #[arg(short, long)]
    verbose: bool,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,
}

#[derive(Debug, Clone, Copy)]
struct Theme {
    reset: &'static str,
    bold: &'static str,
    dim: &'static str,
    red: &'static str,
    green: &'static str,
    yellow: &'static str,
    blue: &'static str,
    magenta: &'static str,
    cyan: &'static str,
}

impl Theme {
    fn ansi() -> Self {
        Self {
            reset: "\x1b[0m",
            bold: "\x1b[1m",
            dim: "\x1b[2m",
            red: "\x1b[31m",
            green: "\x1b[32m",
            yellow: "\x1b[33m",
            blue: "\x1b[34m",
            magenta: "\x1b[35m",
            cyan: "\x1b[36m",
        }
    }

    fn plain() -> Self {
        Self {
            reset: "",
            bold: "",
            dim: "",
            red: "",
            green: "",
            yellow: "",
            blue: "",
            magenta: "",
            cyan: "",
        }
    }

    fn detect(no_color: bool) -> Self {
        if no_color || !std::io::stdout().is_terminal() {
            Self::plain()
        } else {
            Self::ansi()
        }
    }
}

/// One line of the agent stream. Unknown `type` tags land on `Other`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AgentEvent {
    ToolUse {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        #[serde(default)]
        content: Value,
    },
    Text {
        #[serde(default)]
        text: String,
    },
    Thinking {
        #[serde(default)]
        text: String,
    },
    Result {
        #[serde(default)]
        cost_usd: f64,
        #[serde(default)]
        duration_ms: f64,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default)]
struct Tally {
    tools: usize,
    errors: usize,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn timestamp(theme: &Theme) -> String {
    format!(
        "{}{}{}",
        theme.dim,
        Local::now().format("%H:%M:%S"),
        theme.reset
    )
}

fn truncate(text: &str, max_len: usize) -> String {
    let flat = text.replace('\n', " ");
    let flat = flat.trim();
    if flat.chars().count() > max_len {
        let clipped: String = flat.chars().take(max_len.saturating_sub(3)).collect();
        format!("{clipped}...")
    } else {
        flat.to_string()
    }
}

fn summarize_tool(name: &str, input: &Value) -> String {
    let field = |key: &str| input.get(key).and_then(Value::as_str).unwrap_or("");
    match name {
        "Bash" => truncate(field("command"), 120),
        "Read" | "Write" | "Edit" => field("file_path").to_string(),
        "Grep" => format!("/{}/", field("pattern")),
        "Glob" => field("pattern").to_string(),
        "Task" => field("description").to_string(),
        _ => truncate(&input.to_string(), 120),
    }
}

fn write_header(verbose: bool, theme: &Theme, out: &mut impl Write) -> io::Result<()> {
    let mode = if verbose { "(verbose)" } else { "(tools only)" };
    writeln!(out, "{}taskdeck tail{} {}", theme.bold, theme.reset, mode)?;
    writeln!(
        out,
        "{}{}{}",
        theme.dim,
        "-".repeat(SEPARATOR_WIDTH),
        theme.reset
    )
}

fn handle_line(
    line: &str,
    verbose: bool,
    tally: &mut Tally,
    theme: &Theme,
    out: &mut impl Write,
) -> io::Result<()> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }
    let Ok(event) = serde_json::from_str::<AgentEvent>(line) else {
        return Ok(());
    };

    match event {
        AgentEvent::ToolUse { name, input } => {
            tally.tools += 1;
            let name = name.as_deref().unwrap_or("unknown");
            writeln!(
                out,
                "{} {}{}{} {}",
                timestamp(theme),
                theme.cyan,
                name,
                theme.reset,
                summarize_tool(name, &input),
            )
        }
        AgentEvent::ToolResult { content } => {
            let Some(content) = content.as_str() else {
                return Ok(());
            };
            if !content.to_lowercase().contains("error") {
                return Ok(());
            }
            tally.errors += 1;
            writeln!(
                out,
                "{} {}! Error in tool result:{} {}",
                timestamp(theme),
                theme.red,
                theme.reset,
                truncate(content, 120),
            )
        }
        AgentEvent::Text { text } if verbose => {
            if text.trim().is_empty() {
                return Ok(());
            }
            writeln!(
                out,
                "{} {}text{} {}",
                timestamp(theme),
                theme.blue,
                theme.reset,
                truncate(&text, 200),
            )
        }
        AgentEvent::Thinking { text } if verbose => {
            if text.trim().is_empty() {
                return Ok(());
            }
            writeln!(
                out,
                "{} {}thinking{} {}",
                timestamp(theme),
                theme.magenta,
                theme.reset,
                truncate(&text, 100),
            )
        }
        AgentEvent::Result {
            cost_usd,
            duration_ms,
        } => {
            writeln!(out)?;
            writeln!(
                out,
                "{}{}{}",
                theme.dim,
                "-".repeat(SEPARATOR_WIDTH),
                theme.reset
            )?;
            writeln!(
                out,
                "{}Complete{} | Tools: {} | Errors: {}",
                theme.green, theme.reset, tally.tools, tally.errors,
            )?;
            if cost_usd != 0.0 {
                writeln!(
                    out,
                    "   Cost: ${:.4} | Duration: {:.1}s",
                    cost_usd,
                    duration_ms / 1000.0,
                )?;
            }
            Ok(())
        }
        AgentEvent::Text { .. } | AgentEvent::Thinking { .. } => Ok(()),
        AgentEvent::Other => Ok(()),
    }
}

/// Consume the rest of stdin so the producing pipeline is never hit with
/// a pipe error of its own.
async fn drain<R>(lines: &mut Lines<R>)
where
    R: AsyncBufRead + Unpin,
{
    while let Ok(Some(_)) = lines.next_line().await {}
}

#[tokio::main]
async fn main() {
    init_logging();
    let args = Args::parse();
    let theme = Theme::detect(args.no_color);
    debug!("tail_start: verbose={}", args.verbose);

    let mut tally = Tally::default();
    let mut out = io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if write_header(args.verbose, &theme, &mut out).is_err() {
        drain(&mut lines).await;
        return;
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                let _ = writeln!(
                    out,
                    "\n{}Interrupted{} | Tools: {} | Errors: {}",
                    theme.yellow, theme.reset, tally.tools, tally.errors,
                );
                return;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if let Err(err) =
                        handle_line(&line, args.verbose, &mut tally, &theme, &mut out)
                    {
                        if err.kind() == io::ErrorKind::BrokenPipe {
                            drain(&mut lines).await;
                        }
                        return;
                    }
                }
                Ok(None) | Err(_) => return,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_line(line: &str, verbose: bool, tally: &mut Tally) -> String {
        let mut out = Vec::new();
        handle_line(line, verbose, tally, &Theme::plain(), &mut out).expect("write to buffer");
        String::from_utf8(out).expect("utf8 output")
    }

    // ── truncate ──

    #[test]
    fn truncate_flattens_newlines_and_trims() {
        assert_eq!(truncate("  a\nb\nc  ", 120), "a b c");
    }

    #[test]
    fn truncate_clips_to_the_exact_limit() {
        let long = "x".repeat(130);
        let clipped = truncate(&long, 120);
        assert_eq!(clipped.chars().count(), 120);
        assert!(clipped.ends_with("..."));
    }

    #[test]
    fn truncate_leaves_text_at_the_limit_alone() {
        let exact = "y".repeat(120);
        assert_eq!(truncate(&exact, 120), exact);
    }

    // ── summarize_tool ──

    #[test]
    fn bash_summary_is_the_command() {
        let input = serde_json::json!({"command": "cargo test --workspace"});
        assert_eq!(summarize_tool("Bash", &input), "cargo test --workspace");
    }

    #[test]
    fn file_tools_summarize_to_the_path() {
        let input = serde_json::json!({"file_path": "/tmp/notes.md"});
        assert_eq!(summarize_tool("Read", &input), "/tmp/notes.md");
        assert_eq!(summarize_tool("Write", &input), "/tmp/notes.md");
        assert_eq!(summarize_tool("Edit", &input), "/tmp/notes.md");
    }

    #[test]
    fn grep_pattern_is_wrapped_in_slashes() {
        let input = serde_json::json!({"pattern": "fn main"});
        assert_eq!(summarize_tool("Grep", &input), "/fn main/");
    }

    #[test]
    fn glob_and_task_use_their_own_fields() {
        assert_eq!(
            summarize_tool("Glob", &serde_json::json!({"pattern": "**/*.rs"})),
            "**/*.rs"
        );
        assert_eq!(
            summarize_tool("Task", &serde_json::json!({"description": "Explore repo"})),
            "Explore repo"
        );
    }

    #[test]
    fn unknown_tool_dumps_its_input() {
        let input = serde_json::json!({"url": "https://example.com"});
        let summary = summarize_tool("WebFetch", &input);
        assert!(summary.contains("example.com"));
    }

    #[test]
    fn missing_fields_summarize_to_empty() {
        let input = serde_json::json!({});
        assert_eq!(summarize_tool("Bash", &input), "");
        assert_eq!(summarize_tool("Read", &input), "");
    }

    // ── tool events ──

    #[test]
    fn tool_use_prints_and_tallies() {
        let mut tally = Tally::default();
        let out = run_line(
            r#"{"type": "tool_use", "name": "Bash", "input": {"command": "ls -la"}}"#,
            false,
            &mut tally,
        );
        assert_eq!(tally.tools, 1);
        assert!(out.contains("Bash"));
        assert!(out.contains("ls -la"));
    }

    #[test]
    fn tool_use_without_name_prints_unknown() {
        let mut tally = Tally::default();
        let out = run_line(r#"{"type": "tool_use"}"#, false, &mut tally);
        assert_eq!(tally.tools, 1);
        assert!(out.contains("unknown"));
    }

    #[test]
    fn error_result_prints_and_tallies() {
        let mut tally = Tally::default();
        let out = run_line(
            r#"{"type": "tool_result", "content": "Error: connection refused"}"#,
            false,
            &mut tally,
        );
        assert_eq!(tally.errors, 1);
        assert!(out.contains("! Error in tool result:"));
        assert!(out.contains("connection refused"));
    }

    #[test]
    fn clean_result_is_silent() {
        let mut tally = Tally::default();
        let out = run_line(
            r#"{"type": "tool_result", "content": "wrote 3 files"}"#,
            false,
            &mut tally,
        );
        assert_eq!(tally.errors, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn non_string_result_content_is_ignored() {
        let mut tally = Tally::default();
        let out = run_line(
            r#"{"type": "tool_result", "content": {"error": "nested"}}"#,
            false,
            &mut tally,
        );
        assert_eq!(tally.errors, 0);
        assert!(out.is_empty());
    }

    // ── verbose gating ──

    #[test]
    fn text_is_hidden_without_verbose() {
        let mut tally = Tally::default();
        let line = r#"{"type": "text", "text": "working on it"}"#;
        assert!(run_line(line, false, &mut tally).is_empty());
        assert!(run_line(line, true, &mut tally).contains("working on it"));
    }

    #[test]
    fn thinking_is_labeled_in_verbose() {
        let mut tally = Tally::default();
        let out = run_line(
            r#"{"type": "thinking", "text": "considering options"}"#,
            true,
            &mut tally,
        );
        assert!(out.contains("thinking"));
        assert!(out.contains("considering options"));
    }

    #[test]
    fn blank_text_is_suppressed_even_in_verbose() {
        let mut tally = Tally::default();
        let out = run_line(r#"{"type": "text", "text": "  \n  "}"#, true, &mut tally);
        assert!(out.is_empty());
    }

    // ── run summary ──

    #[test]
    fn result_prints_tallies_cost_and_duration() {
        let mut tally = Tally::default();
        run_line(r#"{"type": "tool_use", "name": "Read"}"#, false, &mut tally);
        run_line(r#"{"type": "tool_use", "name": "Edit"}"#, false, &mut tally);
        let out = run_line(
            r#"{"type": "result", "cost_usd": 0.0123, "duration_ms": 4567}"#,
            false,
            &mut tally,
        );
        assert!(out.contains("Complete | Tools: 2 | Errors: 0"));
        assert!(out.contains("Cost: $0.0123"));
        assert!(out.contains("Duration: 4.6s"));
    }

    #[test]
    fn zero_cost_omits_the_cost_line() {
        let mut tally = Tally::default();
        let out = run_line(r#"{"type": "result"}"#, false, &mut tally);
        assert!(out.contains("Complete | Tools: 0 | Errors: 0"));
        assert!(!out.contains("Cost:"));
    }

    // ── malformed input ──

    #[test]
    fn malformed_json_is_dropped() {
        let mut tally = Tally::default();
        assert!(run_line("{ not json", false, &mut tally).is_empty());
        assert_eq!(tally.tools, 0);
    }

    #[test]
    fn unknown_event_types_are_dropped() {
        let mut tally = Tally::default();
        assert!(run_line(r#"{"type": "system_notice"}"#, false, &mut tally).is_empty());
        assert!(run_line(r#"{"no_type": true}"#, false, &mut tally).is_empty());
        assert_eq!(tally.tools, 0);
    }

    #[test]
    fn empty_lines_are_skipped() {
        let mut tally = Tally::default();
        assert!(run_line("   ", false, &mut tally).is_empty());
    }

    #[test]
    fn header_shows_the_mode() {
        let mut out = Vec::new();
        write_header(false, &Theme::plain(), &mut out).expect("write header");
        let text = String::from_utf8(out).expect("utf8 output");
        assert!(text.starts_with("taskdeck tail (tools only)\n"));

        let mut out = Vec::new();
        write_header(true, &Theme::plain(), &mut out).expect("write header");
        let text = String::from_utf8(out).expect("utf8 output");
        assert!(text.starts_with("taskdeck tail (verbose)\n"));
    }
}
