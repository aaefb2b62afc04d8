//! Calculator engine: the arithmetic core behind the page, the API, and
//! the CLI.
//!
//! This module provides functionality to:
//! - Validate that input is plausible calculator input
//! - Evaluate expressions using fasteval
//! - Format results for display and for machine consumers

mod detection;
mod evaluation;

pub use detection::is_math_input;
pub use evaluation::{CalcResult, evaluate_expression};
