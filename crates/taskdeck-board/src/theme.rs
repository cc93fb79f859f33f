//! ANSI palette for board output. Colors are resolved once at startup and
//! threaded through rendering so piped output stays clean.

use std::io::IsTerminal;

use taskdeck_core::TaskStatus;

pub mod icons {
    pub const CHECK: &str = "x";
    pub const IN_PROGRESS: &str = ">";
    pub const PENDING: &str = ".";
    pub const BLOCKED: &str = "!";
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub reset: &'static str,
    pub bold: &'static str,
    pub dim: &'static str,
    pub red: &'static str,
    pub green: &'static str,
    pub yellow: &'static str,
    pub blue: &'static str,
    pub magenta: &'static str,
    pub cyan: &'static str,
}

impl Theme {
    pub fn ansi() -> Self {
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

    pub fn plain() -> Self {
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

    pub fn detect(no_color: bool) -> Self {
        if no_color || !std::io::stdout().is_terminal() {
            Self::plain()
        } else {
            Self::ansi()
        }
    }
}

pub fn status_icon(status: TaskStatus, theme: &Theme) -> String {
    match status {
        TaskStatus::Pending => format!("{}{}{}", theme.yellow, icons::PENDING, theme.reset),
        TaskStatus::InProgress => format!("{}{}{}", theme.blue, icons::IN_PROGRESS, theme.reset),
        TaskStatus::Completed => format!("{}{}{}", theme.green, icons::CHECK, theme.reset),
        TaskStatus::Blocked => format!("{}{}{}", theme.red, icons::BLOCKED, theme.reset),
    }
}
