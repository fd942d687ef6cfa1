//! Terminal colors for command output.
//!
//! The renderers in `backgammon` produce plain text; color is only added
//! here, on the way to the terminal. Everything goes through
//! `if_supports_color`, so piped output, `NO_COLOR` and `--no-color` print
//! the text unchanged.

use std::fmt::Display;

use owo_colors::{OwoColorize, Stream};

use backgammon::{Color, PLACEHOLDER_GLYPH};

pub fn success(text: impl Display) -> String {
    text.if_supports_color(Stream::Stdout, |text| text.green())
        .to_string()
}

pub fn warning(text: impl Display) -> String {
    text.if_supports_color(Stream::Stdout, |text| text.yellow())
        .to_string()
}

pub fn heading(text: impl Display) -> String {
    text.if_supports_color(Stream::Stdout, |text| text.bright_cyan())
        .to_string()
}

pub fn hint(text: impl Display) -> String {
    text.if_supports_color(Stream::Stdout, |text| text.dimmed())
        .to_string()
}

/// For the error printed by `main`, which goes to stderr.
pub fn error_label(text: impl Display) -> String {
    text.if_supports_color(Stream::Stderr, |text| text.red())
        .to_string()
}

fn is_glyph(c: char) -> bool {
    c == Color::White.glyph() || c == Color::Black.glyph() || c == PLACEHOLDER_GLYPH
}

/// Colors a board and its status block line by line.
///
/// Checker glyphs are bold. Digits on rows that hold checkers are counts and
/// turn yellow; label rows have no glyphs and stay plain.
pub fn paint_game(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        output += &paint_line(line);
    }
    output
}

fn paint_line(line: &str) -> String {
    if line.starts_with('│') && line.chars().any(is_glyph) {
        return line
            .chars()
            .map(|c| {
                if is_glyph(c) {
                    c.if_supports_color(Stream::Stdout, |c| c.bold()).to_string()
                } else if c.is_ascii_digit() {
                    c.if_supports_color(Stream::Stdout, |c| c.yellow()).to_string()
                } else {
                    c.to_string()
                }
            })
            .collect();
    }

    let (body, newline) = match line.strip_suffix('\n') {
        Some(body) => (body, "\n"),
        None => (line, ""),
    };
    let painted = if body.ends_with("← ACTIVE") {
        body.if_supports_color(Stream::Stdout, |body| body.green())
            .to_string()
    } else if ["Game:", "State:", "Turn:"]
        .iter()
        .any(|prefix| body.starts_with(prefix))
    {
        heading(body)
    } else if body.starts_with("Dice:") {
        warning(body)
    } else if body.contains("BAR = Hit") {
        hint(body)
    } else {
        return line.to_owned();
    };
    painted + newline
}
