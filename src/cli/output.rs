use colored::Colorize;
use std::fmt;

/// How a line of shell output is labelled and colored.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

fn apply_style(kind: Tone, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        Tone::Info => text,
        Tone::Success => format!("[ok] {text}").bright_green().to_string(),
        Tone::Warning => format!("[!] {text}").bright_yellow().to_string(),
        Tone::Error => format!("[x] {text}").bright_red().to_string(),
        Tone::Section => format!("=== {} ===", text.trim()).bold().to_string(),
    }
}

pub fn print(kind: Tone, message: impl fmt::Display) {
    let formatted = apply_style(kind, message);
    match kind {
        Tone::Section => println!("\n{formatted}"),
        _ => println!("{formatted}"),
    }
}

pub fn info(message: impl fmt::Display) {
    print(Tone::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(Tone::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(Tone::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(Tone::Error, message);
}

pub fn section(title: impl fmt::Display) {
    print(Tone::Section, title);
}

/// Disables ANSI styling, used for script mode.
pub fn set_plain(plain: bool) {
    if plain {
        colored::control::set_override(false);
    } else {
        colored::control::unset_override();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_output_keeps_labels() {
        set_plain(true);
        assert_eq!(apply_style(Tone::Error, "boom"), "[x] boom");
        assert_eq!(apply_style(Tone::Section, " Ledger "), "=== Ledger ===");
        assert_eq!(apply_style(Tone::Info, "plain"), "plain");
    }
}
