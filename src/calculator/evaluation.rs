//! Expression evaluation using fasteval.
//!
//! Wraps fasteval to provide a simple interface for evaluating arithmetic
//! expressions and formatting results for the page, the API, and the CLI.

use std::collections::BTreeMap;

/// Result of evaluating a calculator expression.
#[derive(Clone, Debug)]
pub enum CalcResult {
    /// Successful calculation with a valid numeric result.
    Success {
        /// The original expression.
        expression: String,
        /// The numeric value.
        value: f64,
        /// Formatted for display (with thousand separators).
        display_result: String,
        /// Raw number without separators, for machine consumers.
        raw_result: String,
    },
    /// Expression evaluated but the result is not a finite number.
    Error {
        /// The original expression.
        expression: String,
        /// Error indicator to display.
        message: String,
    },
}

impl CalcResult {
    /// Get the expression that was evaluated.
    pub fn expression(&self) -> &str {
        match self {
            Self::Success { expression, .. } => expression,
            Self::Error { expression, .. } => expression,
        }
    }

    /// Check if this is a successful result.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Get the display string (result or error indicator).
    pub fn display(&self) -> &str {
        match self {
            Self::Success { display_result, .. } => display_result,
            Self::Error { message, .. } => message,
        }
    }

    /// Get the raw number string (only for successful results).
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Success { raw_result, .. } => Some(raw_result),
            Self::Error { .. } => None,
        }
    }

    /// Get the numeric value (only for successful results).
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Success { value, .. } => Some(*value),
            Self::Error { .. } => None,
        }
    }
}

/// Evaluate an arithmetic expression.
///
/// Returns `Some(CalcResult)` if the expression can be parsed, or `None` if
/// parsing fails entirely. Division by zero and other non-finite results map
/// to the `Error` variant with a defined indicator, never a panic.
pub fn evaluate_expression(input: &str) -> Option<CalcResult> {
    let expression = input.trim().to_string();

    // Empty namespace: no custom variables.
    let mut namespace = BTreeMap::<String, f64>::new();

    match fasteval::ez_eval(&expression, &mut namespace) {
        Ok(value) => {
            if value.is_nan() {
                Some(CalcResult::Error {
                    expression,
                    message: "Not a Number".to_string(),
                })
            } else if value.is_infinite() {
                let msg = if value.is_sign_positive() {
                    "Infinity"
                } else {
                    "-Infinity"
                };
                Some(CalcResult::Error {
                    expression,
                    message: msg.to_string(),
                })
            } else {
                Some(CalcResult::Success {
                    expression,
                    display_result: format_display(value),
                    raw_result: format_raw(value),
                    value,
                })
            }
        }
        Err(_) => None, // Parse error
    }
}

/// Format a number for display with thousand separators.
fn format_display(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        // Integer display with thousand separators
        format_with_separators(value as i64)
    } else {
        // Decimal display
        let formatted = format!("{:.10}", value);
        let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');

        // Add thousand separators to the integer part
        if let Some(dot_pos) = trimmed.find('.') {
            let (int_part, dec_part) = trimmed.split_at(dot_pos);
            let int_val: i64 = int_part.parse().unwrap_or(0);
            format!("{}{}", format_with_separators(int_val), dec_part)
        } else {
            let int_val: i64 = trimmed.parse().unwrap_or(0);
            format_with_separators(int_val)
        }
    }
}

/// Format an integer with thousand separators.
fn format_with_separators(value: i64) -> String {
    let is_negative = value < 0;
    let abs_value = value.abs();
    let s = abs_value.to_string();

    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    let formatted: String = result.chars().rev().collect();
    if is_negative {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

/// Format a number as a raw string (no separators).
fn format_raw(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let formatted = format!("{:.10}", value);
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}
