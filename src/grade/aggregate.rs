#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{
    feedback::render_feedback,
    policy::GradingPolicy,
    results::{Grade, GradeResult},
};
use crate::{
    analysis::{AnalysisResult, Category},
    model::{AssessmentConfig, GradingCriterion},
};

/// What happened when one exercise of one student was analyzed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExerciseOutcome {
    /// the analysis ran
    Analyzed {
        /// its result
        result: AnalysisResult,
        /// the file that was analyzed, if known
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
    /// the analysis call was rejected
    Unevaluable {
        /// why
        reason: String,
    },
}

impl ExerciseOutcome {
    /// An analyzed outcome without a file name.
    pub fn analyzed(result: AnalysisResult) -> Self {
        ExerciseOutcome::Analyzed {
            result,
            source: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// The state of one exercise after aggregation.
pub enum ExerciseStatus {
    /// points were awarded automatically
    Graded,
    /// analyzed, waiting for a human grader
    Pending,
    /// the submission could not be evaluated
    Unevaluable,
    /// nothing was submitted
    NotSubmitted,
}

/// One exercise's line in an aggregated grade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExerciseBreakdown {
    /// exercise id
    pub exercise_id: String,
    /// points the exercise is worth
    pub max_points:  f64,
    /// points awarded; `None` while pending
    pub awarded:     Option<f64>,
    /// aggregation state
    pub status:      ExerciseStatus,
    /// the analyzed file, if any
    pub source:      Option<String>,
    /// violation messages by category
    pub violations:  Vec<(Category, String)>,
    /// advisory findings
    pub warnings:    Vec<String>,
    /// why the exercise was not evaluated
    pub reason:      Option<String>,
}

impl ExerciseBreakdown {
    /// The row shown in the overview table.
    pub fn grade_result(&self) -> GradeResult {
        let reason = match self.status {
            ExerciseStatus::NotSubmitted => "Not submitted".to_string(),
            ExerciseStatus::Unevaluable => {
                format!("Could not be evaluated: {}", self.reason.as_deref().unwrap_or("unknown"))
            }
            ExerciseStatus::Pending if self.violations.is_empty() => {
                "No violations; pending review".to_string()
            }
            ExerciseStatus::Pending => format!("{} violation(s); pending review", self.violations.len()),
            ExerciseStatus::Graded if self.violations.is_empty() => String::new(),
            ExerciseStatus::Graded => self
                .violations
                .iter()
                .map(|(_, m)| m.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        };
        GradeResult::builder()
            .requirement(self.exercise_id.clone())
            .grade(Grade::new(self.awarded.unwrap_or(0.0), self.max_points))
            .reason(reason)
            .build()
    }
}

/// The aggregated grade of one student on one assessment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssessmentGrade {
    /// assessment id
    pub assessment_id:    String,
    /// sum of awarded points
    pub student_total:    f64,
    /// sum of every exercise's points
    pub total_max_points: f64,
    /// whether any exercise still awaits a human grader
    pub pending_review:   bool,
    /// per exercise, in assessment order
    pub breakdown:        Vec<ExerciseBreakdown>,
    /// Markdown feedback
    pub feedback_text:    String,
}

impl AssessmentGrade {
    /// Overview table rows, one per exercise.
    pub fn grade_results(&self) -> Vec<GradeResult> {
        self.breakdown.iter().map(ExerciseBreakdown::grade_result).collect()
    }
}

/// Reduces per-exercise outcomes into a grade.
///
/// Exercises of the assessment with no outcome count as not submitted;
/// outcomes for exercises outside the assessment are ignored. Inputs are
/// never modified, and the same inputs always give the same grade.
pub fn aggregate(
    assessment: &AssessmentConfig,
    outcomes: &HashMap<String, ExerciseOutcome>,
    criteria: &HashMap<String, Vec<GradingCriterion>>,
    policy: GradingPolicy,
) -> AssessmentGrade {
    let breakdown: Vec<ExerciseBreakdown> = assessment
        .exercises()
        .iter()
        .map(|e| {
            let max_points = e.max_points;
            let blank = ExerciseBreakdown {
                exercise_id: e.exercise_id.clone(),
                max_points,
                awarded: Some(0.0),
                status: ExerciseStatus::NotSubmitted,
                source: None,
                violations: Vec::new(),
                warnings: Vec::new(),
                reason: None,
            };

            match outcomes.get(&e.exercise_id) {
                None => blank,
                Some(ExerciseOutcome::Unevaluable { reason }) => ExerciseBreakdown {
                    status: ExerciseStatus::Unevaluable,
                    reason: Some(reason.clone()),
                    ..blank
                },
                Some(ExerciseOutcome::Analyzed { result, source }) => {
                    let awarded = policy.score(result, max_points);
                    ExerciseBreakdown {
                        awarded,
                        status: if awarded.is_some() {
                            ExerciseStatus::Graded
                        } else {
                            ExerciseStatus::Pending
                        },
                        source: source.clone(),
                        violations: result.all_messages(),
                        warnings: result.syntax_warnings.iter().map(ToString::to_string).collect(),
                        ..blank
                    }
                }
            }
        })
        .collect();

    let total_max_points = assessment.total_max_points();
    let student_total = breakdown
        .iter()
        .filter_map(|b| b.awarded)
        .sum::<f64>()
        .min(total_max_points);
    let pending_review = breakdown.iter().any(|b| b.status == ExerciseStatus::Pending);

    let mut grade = AssessmentGrade {
        assessment_id: assessment.id.clone(),
        student_total,
        total_max_points,
        pending_review,
        breakdown,
        feedback_text: String::new(),
    };
    grade.feedback_text = render_feedback(assessment, &grade, criteria);
    grade
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java::ControlStructure;

    fn assessment() -> AssessmentConfig {
        let mut a = AssessmentConfig::new("tp1", "TP 1");
        a.add_exercise("a", 4.0).unwrap();
        a.add_exercise("b", 6.0).unwrap();
        a.add_exercise("c", 5.0).unwrap();
        a
    }

    fn outcomes() -> HashMap<String, ExerciseOutcome> {
        let bad = AnalysisResult {
            missing_control_structures: vec![ControlStructure::For],
            ..AnalysisResult::default()
        }
        .seal();
        HashMap::from([
            ("a".to_string(), ExerciseOutcome::analyzed(AnalysisResult::default().seal())),
            ("b".to_string(), ExerciseOutcome::analyzed(bad)),
            ("zzz".to_string(), ExerciseOutcome::analyzed(AnalysisResult::default().seal())),
        ])
    }

    #[test]
    fn all_or_nothing() {
        let grade = aggregate(
            &assessment(),
            &outcomes(),
            &HashMap::new(),
            GradingPolicy::AllOrNothing,
        );
        assert_eq!(grade.student_total, 4.0);
        assert_eq!(grade.total_max_points, 15.0);
        assert_eq!(grade.breakdown.len(), 3);
        assert_eq!(grade.breakdown[2].status, ExerciseStatus::NotSubmitted);
        assert!(!grade.pending_review);
    }

    #[test]
    fn manual_review_leaves_scores_pending() {
        let grade = aggregate(
            &assessment(),
            &outcomes(),
            &HashMap::new(),
            GradingPolicy::ManualReview,
        );
        assert_eq!(grade.student_total, 0.0);
        assert!(grade.pending_review);
        assert_eq!(grade.breakdown[0].status, ExerciseStatus::Pending);
        assert_eq!(grade.breakdown[0].awarded, None);
        assert_eq!(grade.breakdown[2].awarded, Some(0.0));
    }

    #[test]
    fn unevaluable_scores_nothing() {
        let outcomes = HashMap::from([(
            "a".to_string(),
            ExerciseOutcome::Unevaluable {
                reason: "The submitted source is empty.".into(),
            },
        )]);
        let grade = aggregate(&assessment(), &outcomes, &HashMap::new(), GradingPolicy::CheckRatio);
        assert_eq!(grade.student_total, 0.0);
        assert_eq!(grade.breakdown[0].status, ExerciseStatus::Unevaluable);
        assert_eq!(
            grade.breakdown[0].grade_result().reason(),
            "Could not be evaluated: The submitted source is empty."
        );
    }
}
