// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal colors for help output and job IDs.

use std::io::IsTerminal;

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};

/// Steel blue: headers and job IDs
const HEADER: u8 = 74;
/// Light grey: literals in help
const LITERAL: u8 = 250;
/// Dark grey: object paths and placeholders
const MUTED: u8 = 240;

/// `NO_COLOR=1` wins over `COLOR=1`, which wins over the TTY check.
fn decide(no_color: Option<&str>, force: Option<&str>, tty: bool) -> bool {
    match (no_color, force) {
        (Some("1"), _) => false,
        (_, Some("1")) => true,
        _ => tty,
    }
}

pub fn should_colorize() -> bool {
    let no_color = std::env::var("NO_COLOR").ok();
    let force = std::env::var("COLOR").ok();
    decide(no_color.as_deref(), force.as_deref(), std::io::stdout().is_terminal())
}

fn fg(code: u8) -> Style {
    Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))))
}

/// clap help styles in the project palette.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled().header(fg(HEADER)).literal(fg(LITERAL)).placeholder(fg(MUTED))
}

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

pub fn header(text: &str) -> String {
    paint(HEADER, text)
}

pub fn muted(text: &str) -> String {
    paint(MUTED, text)
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
