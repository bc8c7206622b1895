#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{collections::HashMap, fmt::Write};

use tabled::{
    Table,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};

use super::{
    aggregate::{AssessmentGrade, ExerciseBreakdown, ExerciseStatus},
    results::GradeResult,
};
use crate::model::{AssessmentConfig, GradingCriterion};

/// The headline of one exercise section.
fn grade_line(b: &ExerciseBreakdown) -> String {
    let awarded = b.awarded.unwrap_or(0.0);
    match b.status {
        ExerciseStatus::Graded => format!("{awarded:.2}/{:.2}", b.max_points),
        ExerciseStatus::Pending => format!("pending review (out of {:.2})", b.max_points),
        ExerciseStatus::NotSubmitted => format!("{awarded:.2}/{:.2}, not submitted", b.max_points),
        ExerciseStatus::Unevaluable => format!(
            "{awarded:.2}/{:.2}, could not be evaluated: {}",
            b.max_points,
            b.reason.as_deref().unwrap_or("unknown reason")
        ),
    }
}

/// Appends the rubric of an exercise.
fn push_rubric(out: &mut String, criteria: &[GradingCriterion]) {
    if criteria.is_empty() {
        return;
    }
    out.push_str("\n### Rubric\n\n");
    for c in criteria {
        let _ = write!(out, "- **{}** ({} pts)", c.title, c.points);
        if !c.description.trim().is_empty() {
            let _ = write!(out, ": {}", c.description.trim());
        }
        out.push('\n');
        for s in &c.subcriteria {
            let _ = writeln!(out, "  - {}", s.text);
        }
    }
}

/// Renders Markdown feedback for an aggregated grade: the total, then per
/// exercise the grade line, every violation, advisory warnings, and the
/// rubric for the human grader.
pub fn render_feedback(
    assessment: &AssessmentConfig,
    grade: &AssessmentGrade,
    criteria: &HashMap<String, Vec<GradingCriterion>>,
) -> String {
    let title = if assessment.name.trim().is_empty() {
        assessment.id.as_str()
    } else {
        assessment.name.trim()
    };

    let mut out = String::new();
    let _ = writeln!(out, "# {title}\n");
    let _ = write!(out, "**Total: {:.2}/{:.2}**", grade.student_total, grade.total_max_points);
    if grade.pending_review {
        out.push_str(" (some exercises are pending manual review)");
    }
    out.push('\n');

    for b in &grade.breakdown {
        let _ = writeln!(out, "\n## {}: {}", b.exercise_id, grade_line(b));
        if let Some(source) = &b.source {
            let _ = writeln!(out, "\nSource: `{source}`");
        }

        if matches!(b.status, ExerciseStatus::Graded | ExerciseStatus::Pending) {
            if b.violations.is_empty() {
                out.push_str("\nNo violations found.\n");
            } else {
                out.push_str("\n### Violations\n\n");
                for (category, message) in &b.violations {
                    let _ = writeln!(out, "- **{category}**: {message}");
                }
            }
            if !b.warnings.is_empty() {
                out.push_str("\n### Warnings\n\n");
                for w in &b.warnings {
                    let _ = writeln!(out, "- {w}");
                }
            }
        }

        push_rubric(&mut out, criteria.get(&b.exercise_id).map(Vec::as_slice).unwrap_or_default());
    }
    out
}

/// Renders the overview table of a grade.
pub fn overview_table(results: &[GradeResult]) -> String {
    let (grade, out_of) = results
        .iter()
        .fold((0f64, 0f64), |acc, r| (acc.0 + r.grade_value(), acc.1 + r.out_of_value()));

    Table::new(results)
        .with(Panel::header("Grading Overview"))
        .with(Panel::footer(format!("Total: {grade:.2}/{out_of:.2}")))
        .with(Modify::new(Rows::new(1..)).with(Width::wrap(24).keep_words(true)))
        .with(
            Modify::new(Rows::first())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(
            Modify::new(Rows::last())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(Style::modern())
        .to_string()
}
