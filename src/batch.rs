#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use anyhow::{Context, Result};
use futures::{StreamExt, stream};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    analysis::{AnalysisResult, Analyzer, AnalyzerOptions},
    error::AnalysisError,
    grade::{AssessmentGrade, ExerciseOutcome, GradingPolicy, aggregate},
    model::GradingCriterion,
    provider::{ConfigProvider, SourceFile, SubmissionSource},
    util::match_exercise,
};

/// One analysis to run on the worker pool.
#[derive(Clone, Debug)]
pub struct Job {
    /// student the source belongs to
    pub student:  String,
    /// exercise the source was matched to
    pub exercise: String,
    /// the analyzer of that exercise
    pub analyzer: Arc<Analyzer>,
    /// the source
    pub source:   SourceFile,
}

/// A finished [`Job`].
#[derive(Debug)]
pub struct Finished {
    /// student the source belongs to
    pub student:  String,
    /// exercise the source was matched to
    pub exercise: String,
    /// path of the source, relative to the student's directory
    pub path:     String,
    /// the analysis, or why it was rejected
    pub result:   Result<AnalysisResult, AnalysisError>,
}

/// Runs every job with at most `workers` analyses in flight. Analyses are
/// CPU-bound, so each one runs on the blocking pool. Results come back in
/// completion order.
pub async fn run_jobs(jobs: Vec<Job>, workers: usize) -> Result<Vec<Finished>> {
    let total = jobs.len();
    let finished: Vec<Finished> = stream::iter(jobs)
        .map(|job| {
            tokio::task::spawn_blocking(move || {
                let result = match &job.source.text {
                    Ok(text) => job.analyzer.analyze(text),
                    Err(e) => Err(AnalysisError::Unreadable(e.clone())),
                };
                Finished {
                    student:  job.student,
                    exercise: job.exercise,
                    path:     job.source.relative_path,
                    result,
                }
            })
        })
        .buffer_unordered(workers.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<_, _>>()
        .context("An analysis task panicked")?;

    debug!("Finished {total} analyses");
    Ok(finished)
}

/// Analyses of the files matched to one exercise, by path.
type Candidates = Vec<(String, Result<AnalysisResult, AnalysisError>)>;

/// Keeps, per exercise, the best of several analyzed files: a completed
/// analysis beats a rejected or unreadable one, fewer violations beat more,
/// and the earlier path wins a tie.
fn best_outcome(mut candidates: Candidates) -> ExerciseOutcome {
    candidates.sort_by(|a, b| a.0.cmp(&b.0));

    let best = candidates
        .iter()
        .filter_map(|(path, r)| r.as_ref().ok().map(|r| (path, r)))
        .min_by_key(|(_, r)| r.violation_count());

    match best {
        Some((path, result)) => ExerciseOutcome::Analyzed {
            result: result.clone(),
            source: Some(path.clone()),
        },
        None => ExerciseOutcome::Unevaluable {
            reason: candidates
                .iter()
                .filter_map(|(path, r)| r.as_ref().err().map(|e| format!("{path}: {e}")))
                .collect::<Vec<_>>()
                .join("; "),
        },
    }
}

/// The grade of one student.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StudentReport {
    /// student id
    pub student:   String,
    /// aggregated grade
    pub grade:     AssessmentGrade,
    /// files that matched no exercise of the assessment
    pub unmatched: Vec<String>,
}

/// Grades every listed student on an assessment.
///
/// Each file is matched to an exercise by name and analyzed on the worker
/// pool; when several files match the same exercise the best one counts.
/// Exercises whose configuration is missing or invalid are unevaluable for
/// every student who submitted them.
pub async fn grade_assessment(
    provider: &impl ConfigProvider,
    submissions: &impl SubmissionSource,
    assessment_id: &str,
    students: &[String],
    policy: GradingPolicy,
    options: AnalyzerOptions,
    workers: usize,
) -> Result<Vec<StudentReport>> {
    let assessment = provider.get_assessment_config(assessment_id)?;
    let ids: Vec<&str> = assessment.exercise_ids().collect();

    let mut analyzers: HashMap<String, Result<Arc<Analyzer>, String>> = HashMap::new();
    let mut criteria: HashMap<String, Vec<GradingCriterion>> = HashMap::new();
    for id in &ids {
        let analyzer = provider
            .get_exercise_config(id)
            .map_err(|e| e.to_string())
            .and_then(|config| {
                criteria.insert(id.to_string(), config.grading_criteria.clone());
                Analyzer::new(&config, options).map_err(|e| e.to_string())
            });
        if let Err(e) = &analyzer {
            warn!("Exercise `{id}` cannot be evaluated: {e}");
        }
        analyzers.insert(id.to_string(), analyzer.map(Arc::new));
    }

    let mut jobs = Vec::new();
    let mut rejected: BTreeMap<(String, String), String> = BTreeMap::new();
    let mut unmatched: HashMap<String, Vec<String>> = HashMap::new();

    for student in students {
        let sources = match submissions.list_java_sources(student) {
            Ok(sources) => sources,
            Err(e) => {
                warn!("Could not read the submission of `{student}`: {e:#}");
                Vec::new()
            }
        };

        for source in sources {
            let Some(exercise) = match_exercise(source.file_name(), ids.iter().copied()) else {
                debug!("{student}: {} matches no exercise", source.relative_path);
                unmatched
                    .entry(student.clone())
                    .or_default()
                    .push(source.relative_path);
                continue;
            };
            debug!("{student}: {} -> {exercise}", source.relative_path);

            match analyzers.get(exercise) {
                Some(Ok(analyzer)) => jobs.push(Job {
                    student: student.clone(),
                    exercise: exercise.to_string(),
                    analyzer: Arc::clone(analyzer),
                    source,
                }),
                Some(Err(reason)) => {
                    rejected.insert((student.clone(), exercise.to_string()), reason.clone());
                }
                None => {}
            }
        }
    }

    info!(
        "Grading {} student(s) on `{}`: {} analyses on {} worker(s)",
        students.len(),
        assessment.id,
        jobs.len(),
        workers.max(1)
    );

    let mut by_student: HashMap<String, HashMap<String, Candidates>> = HashMap::new();
    for f in run_jobs(jobs, workers).await? {
        by_student
            .entry(f.student)
            .or_default()
            .entry(f.exercise)
            .or_default()
            .push((f.path, f.result));
    }

    let mut reports = Vec::with_capacity(students.len());
    for student in students {
        let mut outcomes: HashMap<String, ExerciseOutcome> = by_student
            .remove(student)
            .unwrap_or_default()
            .into_iter()
            .map(|(exercise, candidates)| (exercise, best_outcome(candidates)))
            .collect();
        for ((s, exercise), reason) in &rejected {
            if s == student {
                outcomes.insert(
                    exercise.clone(),
                    ExerciseOutcome::Unevaluable {
                        reason: reason.clone(),
                    },
                );
            }
        }

        let grade = aggregate(&assessment, &outcomes, &criteria, policy);
        info!(
            "{student}: {:.2}/{:.2}",
            grade.student_total, grade.total_max_points
        );
        reports.push(StudentReport {
            student: student.clone(),
            grade,
            unmatched: unmatched.remove(student).unwrap_or_default(),
        });
    }
    Ok(reports)
}
