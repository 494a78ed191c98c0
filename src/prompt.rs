//! Interactive line prompts.
//!
//! The installer is driven entirely by prompts on stdin/stdout. Prompts are
//! generic over `BufRead`/`Write` so tests can feed scripted answers through
//! a `Cursor` instead of a terminal.

use std::io::{self, BufRead, Write};

/// The exact token the operator must type to authorize disk destruction.
/// Anything else, including lowercase variants, is a refusal.
pub const CONFIRM_TOKEN: &str = "YES";

/// Ask a question, returning `default` on an empty answer.
pub fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
    default: &str,
) -> io::Result<String> {
    write!(output, "{question} [{default}]: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim();

    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer.to_string()
    })
}

/// Ask a question and re-prompt until `accept` returns true for the answer.
pub fn ask_validated<R, W, F>(
    input: &mut R,
    output: &mut W,
    question: &str,
    default: &str,
    accept: F,
) -> io::Result<String>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> bool,
{
    loop {
        let answer = ask(input, output, question, default)?;
        if accept(&answer) {
            return Ok(answer);
        }
        writeln!(output, "invalid value: {answer:?}")?;
    }
}

/// Ask for the destruction confirmation token.
///
/// Returns `true` only for an exact match of [`CONFIRM_TOKEN`]. There is no
/// re-prompt: any other input is a refusal and the caller must abort before
/// touching the disk.
pub fn confirm_destruction<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    disk: &str,
) -> io::Result<bool> {
    writeln!(
        output,
        "ALL DATA ON {disk} WILL BE DESTROYED. This cannot be undone."
    )?;
    write!(output, "Type {CONFIRM_TOKEN} to continue: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    Ok(line.trim_end_matches(['\r', '\n']) == CONFIRM_TOKEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_ask_returns_answer() {
        let mut input = Cursor::new("Europe/Berlin\n");
        let mut output = Vec::new();
        let answer = ask(&mut input, &mut output, "Timezone", "UTC").unwrap();
        assert_eq!(answer, "Europe/Berlin");
        assert!(String::from_utf8(output).unwrap().contains("[UTC]"));
    }

    #[test]
    fn test_ask_empty_falls_back_to_default() {
        let mut input = Cursor::new("\n");
        let mut output = Vec::new();
        let answer = ask(&mut input, &mut output, "Timezone", "UTC").unwrap();
        assert_eq!(answer, "UTC");
    }

    #[test]
    fn test_ask_validated_reprompts() {
        // First answer rejected, second accepted
        let mut input = Cursor::new("ab\nvalid_name\n");
        let mut output = Vec::new();
        let answer = ask_validated(&mut input, &mut output, "Username", "user", |s| s.len() >= 3)
            .unwrap();
        assert_eq!(answer, "valid_name");
        assert!(String::from_utf8(output).unwrap().contains("invalid value"));
    }

    #[test]
    fn test_confirm_exact_token_accepts() {
        let mut input = Cursor::new("YES\n");
        let mut output = Vec::new();
        assert!(confirm_destruction(&mut input, &mut output, "/dev/sda").unwrap());
    }

    #[test]
    fn test_confirm_anything_else_refuses() {
        for answer in ["yes\n", "Y\n", "YES \n", " YES\n", "no\n", "\n"] {
            let mut input = Cursor::new(answer);
            let mut output = Vec::new();
            assert!(
                !confirm_destruction(&mut input, &mut output, "/dev/sda").unwrap(),
                "{answer:?} must be treated as a refusal"
            );
        }
    }

    #[test]
    fn test_confirm_strips_crlf() {
        let mut input = Cursor::new("YES\r\n");
        let mut output = Vec::new();
        assert!(confirm_destruction(&mut input, &mut output, "/dev/sda").unwrap());
    }
}
