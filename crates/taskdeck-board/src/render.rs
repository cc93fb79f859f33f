//! Board rendering. Pure string assembly over a loaded [`Board`] so the
//! whole output surface is testable without a terminal.

use chrono::Local;
use taskdeck_core::rollup;
use taskdeck_core::store::Board;
use taskdeck_core::TaskStatus;

use crate::theme::{status_icon, Theme};

const SEPARATOR_WIDTH: usize = 60;
const TITLE_CLIP: usize = 40;
const SUMMARY_BAR_WIDTH: usize = 20;
const EPIC_BAR_WIDTH: usize = 15;

pub fn render_board(board: &Board, theme: &Theme) -> String {
    let mut lines = Vec::new();

    let now = Local::now().format("%H:%M:%S");
    lines.push(format!(
        "{}taskdeck board{}  {}team={}  {}{}",
        theme.bold, theme.reset, theme.dim, board.team, now, theme.reset
    ));
    lines.push(format!(
        "{}{}{}",
        theme.dim,
        "-".repeat(SEPARATOR_WIDTH),
        theme.reset
    ));

    if board.is_empty() {
        lines.push(format!(
            "{}No tasks found in {}/{}",
            theme.dim,
            board.dir.display(),
            theme.reset
        ));
        return lines.join("\n");
    }

    let counts = rollup::status_counts(&board.tasks);
    lines.push(format!(
        "  {} {} done  {} {} active  {} {} pending    {}",
        status_icon(TaskStatus::Completed, theme),
        counts.completed,
        status_icon(TaskStatus::InProgress, theme),
        counts.in_progress,
        status_icon(TaskStatus::Pending, theme),
        counts.pending,
        progress_bar(counts.completed, counts.total(), SUMMARY_BAR_WIDTH, theme),
    ));
    lines.push(String::new());

    if !board.epics.is_empty() {
        lines.push(format!("{}Epics{}", theme.bold, theme.reset));
        for epic in &board.epics {
            let icon = if epic.status.is_completed() {
                status_icon(TaskStatus::Completed, theme)
            } else {
                status_icon(TaskStatus::InProgress, theme)
            };
            let progress = rollup::epic_progress(&board.tasks, &epic.id);
            lines.push(format!(
                "  {} {}{}{} {}  {}",
                icon,
                theme.cyan,
                epic.id,
                theme.reset,
                epic.display_name(),
                progress_bar(progress.done, progress.total, EPIC_BAR_WIDTH, theme),
            ));
            if !epic.depends_on.is_empty() {
                lines.push(format!(
                    "      {}depends on: {}{}",
                    theme.dim,
                    epic.depends_on.join(", "),
                    theme.reset
                ));
            }
        }
        lines.push(String::new());
    }

    lines.push(format!("{}Tasks{}", theme.bold, theme.reset));
    for task in &board.tasks {
        let mut meta = Vec::new();
        if let Some(assignee) = task.assignee.as_deref().filter(|a| !a.is_empty()) {
            meta.push(format!("{}{}{}", theme.magenta, assignee, theme.reset));
        }
        if let Some(epic_id) = task.epic_id.as_deref().filter(|e| !e.is_empty()) {
            meta.push(format!("{}epic:{}{}", theme.dim, epic_id, theme.reset));
        }
        let commits = task.commit_count();
        if commits > 0 {
            meta.push(format!("{}{} commits{}", theme.dim, commits, theme.reset));
        }
        let meta_str = if meta.is_empty() {
            String::new()
        } else {
            format!("  {}", meta.join("  "))
        };
        lines.push(format!(
            "  {} {}{:<12}{} {}{}",
            status_icon(task.status, theme),
            theme.cyan,
            task.id,
            theme.reset,
            clip_title(task.display_title(), TITLE_CLIP),
            meta_str,
        ));
    }

    lines.join("\n")
}

fn progress_bar(done: usize, total: usize, width: usize, theme: &Theme) -> String {
    if total == 0 {
        return format!("{}[{}]{}", theme.dim, "-".repeat(width), theme.reset);
    }
    let filled = width * done / total;
    let pct = (100.0 * done as f64 / total as f64).round() as usize;
    format!(
        "[{}{}{}{}{}{}] {}%",
        theme.green,
        "#".repeat(filled),
        theme.reset,
        theme.dim,
        "-".repeat(width - filled),
        theme.reset,
        pct,
    )
}

fn clip_title(title: &str, max_len: usize) -> String {
    if title.chars().count() <= max_len {
        title.to_string()
    } else {
        let clipped: String = title.chars().take(max_len).collect();
        format!("{clipped}...")
    }
}
