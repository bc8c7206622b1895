#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Reduction of per-exercise outcomes into an assessment grade.
pub mod aggregate;
/// Markdown feedback and the overview table.
pub mod feedback;
/// Grading policies.
pub mod policy;
/// Grade rows.
pub mod results;

pub use aggregate::{
    AssessmentGrade, ExerciseBreakdown, ExerciseOutcome, ExerciseStatus, aggregate,
};
pub use feedback::{overview_table, render_feedback};
pub use policy::GradingPolicy;
pub use results::{Grade, GradeResult};
