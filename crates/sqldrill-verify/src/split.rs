//! Quote-aware statement splitting.
//!
//! Splits learner-submitted text into semicolon-terminated statements while
//! respecting single- and double-quoted literals, tracking each statement's
//! byte span for in-editor error marking.

use sqldrill_types::{Span, Statement};

/// Split submitted text into ordered statements with source spans.
///
/// A semicolon terminates a statement only when it is outside both quote
/// kinds. A quote character toggles its own flag only when the other flag is
/// clear and the character is not escaped by an immediately preceding
/// backslash. Whitespace-only segments are dropped. Trailing text after the
/// last semicolon becomes a final statement, so submissions need no
/// terminator.
///
/// An unterminated quote is not an error: the flag stays set, so the rest of
/// the input (semicolons included) becomes a single statement.
///
/// Spans are half-open byte ranges into the original text: a terminated
/// statement runs from its first non-whitespace byte to the semicolon
/// (exclusive); the trailing statement ends one past its last non-whitespace
/// byte.
#[must_use]
pub fn split(text: &str) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let mut start: Option<usize> = None;

    for (i, ch) in text.char_indices() {
        let was_escaped = escaped;
        escaped = ch == '\\' && !escaped;

        match ch {
            '\'' if !in_double && !was_escaped => in_single = !in_single,
            '"' if !in_single && !was_escaped => in_double = !in_double,
            ';' if !in_single && !in_double => {
                if let Some(s) = start.take() {
                    push_statement(&mut statements, text, s, i);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() && !ch.is_whitespace() {
            start = Some(i);
        }
    }

    // Trailing statement without a terminator; end past the last
    // non-whitespace byte so the span never covers trailing newlines.
    if let Some(s) = start {
        let end = s + text[s..].trim_end().len();
        push_statement(&mut statements, text, s, end);
    }

    statements
}

fn push_statement(out: &mut Vec<Statement>, text: &str, start: usize, end: usize) {
    let body = text[start..end].trim_end();
    if body.is_empty() {
        return;
    }
    out.push(Statement {
        text: body.to_owned(),
        span: Span::new(start, end),
    });
}
