use std::{fmt, io::Write};

use colored::Colorize;

use crate::errors::CliError;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
}

fn build_label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "[i]",
        MessageKind::Success => "[✓]",
        MessageKind::Warning => "[!]",
    }
}

pub fn styled(kind: MessageKind, message: impl fmt::Display) -> String {
    let formatted = format!("{} {message}", build_label(kind));
    match kind {
        MessageKind::Success => formatted.bright_green().to_string(),
        MessageKind::Warning => formatted.bright_yellow().to_string(),
        MessageKind::Info => formatted,
    }
}

pub fn print<W: Write>(
    out: &mut W,
    kind: MessageKind,
    message: impl fmt::Display,
) -> Result<(), CliError> {
    writeln!(out, "{}", styled(kind, message))?;
    Ok(())
}

pub fn info<W: Write>(out: &mut W, message: impl fmt::Display) -> Result<(), CliError> {
    print(out, MessageKind::Info, message)
}

pub fn success<W: Write>(out: &mut W, message: impl fmt::Display) -> Result<(), CliError> {
    print(out, MessageKind::Success, message)
}

pub fn warning<W: Write>(out: &mut W, message: impl fmt::Display) -> Result<(), CliError> {
    print(out, MessageKind::Warning, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_their_label() {
        colored::control::set_override(false);
        assert_eq!(styled(MessageKind::Success, "Expense added."), "[✓] Expense added.");
        let mut out = Vec::new();
        warning(&mut out, "skipped").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[!] skipped\n");
    }
}
