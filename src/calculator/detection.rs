//! Input validation for calculator expressions.
//!
//! Everything reaching the evaluator (CLI argument, `expr` query parameter)
//! claims to be arithmetic; this check rejects input that cannot possibly be
//! before the parser runs.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Matches strings containing only math-safe characters.
    /// Allows: digits, whitespace, operators, parentheses, letters (for
    /// function names like `sqrt`), dots, commas.
    static ref MATH_SAFE_CHARS: Regex = Regex::new(
        r"^[\d\s\.\,\+\-\*/%\^()a-zA-Z_]+$"
    ).unwrap();
}

/// Check whether input is acceptable calculator input.
///
/// Returns `true` if the input is non-empty after trimming and contains only
/// math-safe characters. Plain numbers pass: a calculator handed `42`
/// displays `42`. Whether the input actually parses is the evaluator's call.
pub fn is_math_input(input: &str) -> bool {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return false;
    }

    if !MATH_SAFE_CHARS.is_match(trimmed) {
        return false;
    }

    balanced_parens(trimmed)
}

/// Reject input whose parentheses cannot balance. The parser would refuse it
/// anyway; catching it here gives the caller a validation error instead of a
/// parse error.
fn balanced_parens(input: &str) -> bool {
    let mut depth: i32 = 0;
    for c in input.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}
