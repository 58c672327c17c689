use colored::{Color, ColoredString, Colorize};

use crate::analysis::Severity;

#[macro_export]
macro_rules! print_success {
    ($fmt:literal, $($e:tt)*) => {
        use ::colored::Colorize as _;
        println!("{}", format!($fmt, $($e)*).green())
    }
}

pub fn is_truecolor_supported() -> bool {
    let Ok(v) = std::env::var("COLORTERM") else {
        return false
    };
    matches!(v.as_str(), "truecolor" | "24bit")
}

pub trait ColorTheme {
    fn color(&self) -> Color;
}

impl ColorTheme for log::Level {
    fn color(&self) -> Color {
        use log::Level::*;
        match self {
            Error => Color::BrightRed,
            Warn => Color::BrightYellow,
            Info => Color::Cyan,
            Debug => Color::Magenta,
            Trace => Color::Blue,
        }
    }
}

impl ColorTheme for Severity {
    fn color(&self) -> Color {
        use Severity::*;
        if !self::is_truecolor_supported() {
            return match self {
                Success => Color::Green,
                Warning => Color::Yellow,
                Info => Color::Cyan,
            };
        }

        match self {
            Success => Color::TrueColor {
                r: 30,
                g: 180,
                b: 40,
            },
            Warning => Color::TrueColor {
                r: 210,
                g: 138,
                b: 4,
            },
            Info => Color::TrueColor {
                r: 40,
                g: 150,
                b: 210,
            },
        }
    }
}

fn icon_fg() -> Color {
    if is_truecolor_supported() {
        Color::TrueColor {
            r: 255,
            g: 255,
            b: 255,
        }
    } else {
        Color::BrightBlack
    }
}

/// ` PASS ` / ` FAIL ` badge for one test result.
pub fn verdict_icon(passed: bool) -> ColoredString {
    let (label, bg) = if passed {
        ("PASS", Severity::Success.color())
    } else {
        ("FAIL", Color::Red)
    };
    format!(" {} ", label).on_color(bg).bold().color(icon_fg())
}

pub fn severity_icon(severity: Severity) -> ColoredString {
    let label = match severity {
        Severity::Success => "  OK  ",
        Severity::Warning => " WARN ",
        Severity::Info => " INFO ",
    };
    label.on_color(severity.color()).bold().color(icon_fg())
}

/// Ten-cell gauge for a 1..=10 score.
pub fn score_bar(score: u8) -> String {
    let filled = score.min(10) as usize;
    let color = match score {
        8..=u8::MAX => Color::Green,
        5..=7 => Color::Yellow,
        _ => Color::Red,
    };
    format!(
        "{}{}",
        "■".repeat(filled).color(color),
        "□".repeat(10 - filled).bright_black()
    )
}
