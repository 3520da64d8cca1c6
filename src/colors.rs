//! ANSI foreground colors for console text.
//!
//! Text is only decorated when standard output is a terminal, so captured or
//! piped output stays plain.

pub use crossterm::style::Color;
use crossterm::style::Stylize;
use std::io::IsTerminal;

/// Color `text` if standard output is a terminal.
pub fn paint(color: Color, text: &str) -> String {
    paint_when(std::io::stdout().is_terminal(), color, text)
}

/// Color `text` when `enabled`, otherwise return it unchanged.
pub fn paint_when(enabled: bool, color: Color, text: &str) -> String {
    if enabled {
        text.with(color).to_string()
    } else {
        text.to_string()
    }
}

pub fn black(text: &str) -> String {
    paint(Color::Black, text)
}

pub fn blue(text: &str) -> String {
    paint(Color::Blue, text)
}

pub fn cyan(text: &str) -> String {
    paint(Color::Cyan, text)
}

pub fn magenta(text: &str) -> String {
    paint(Color::Magenta, text)
}

pub fn white(text: &str) -> String {
    paint(Color::White, text)
}

pub fn yellow(text: &str) -> String {
    paint(Color::Yellow, text)
}

pub fn red(text: &str) -> String {
    paint(Color::Red, text)
}

pub fn green(text: &str) -> String {
    paint(Color::Green, text)
}
