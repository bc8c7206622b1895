//! # tassist
//!
//! A configuration-driven structural analyzer for Java exercises.
//!
//! An [`ExerciseConfig`](model::ExerciseConfig) names what a submission must
//! contain: methods with exact signatures, allowed operators, control
//! structures, naming conventions, textual patterns, validation logic,
//! expressions and exception handling. [`analyze`] checks one source file
//! against it and reports every violation, line-addressed, without compiling
//! or running anything. Results for a whole class are reduced into grades by
//! [`grade::aggregate`], and [`batch::grade_assessment`] drives both over a
//! directory of submissions.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// The rule evaluator and its results
pub mod analysis;
/// Batch grading over a worker pool
pub mod batch;
/// Runtime settings read from the environment
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// Error types
pub mod error;
/// For all things related to grading
pub mod grade;
/// The Java front end: tokenizer, syntax checker and structural extractor
pub mod java;
/// Exercise and assessment configurations
pub mod model;
/// Where configurations and submissions come from
pub mod provider;
/// Utility functions for convenience
pub mod util;

use analysis::{AnalysisResult, Analyzer, AnalyzerOptions};
use error::AnalysisError;
use model::ExerciseConfig;

/// Analyzes one source unit against one exercise with default options.
///
/// To analyze many sources against the same exercise, build an
/// [`Analyzer`] once instead.
pub fn analyze(source: &str, config: &ExerciseConfig) -> Result<AnalysisResult, AnalysisError> {
    Analyzer::new(config, AnalyzerOptions::default())?.analyze(source)
}
