#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// One exercise of an assessment with its point cap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AssessmentExercise {
    /// id of the referenced `ExerciseConfig`
    pub exercise_id: String,
    /// points this exercise is worth in the assessment
    pub max_points:  f64,
}

/// The stored shape of an assessment, including its total.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct StoredAssessment {
    /// assessment id
    assessment_id:    String,
    /// display name
    #[serde(default)]
    name:             String,
    /// display description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description:      String,
    /// exercises in order
    #[serde(default)]
    exercises:        Vec<AssessmentExercise>,
    /// total as written by whoever saved the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_max_points: Option<f64>,
}

/// A weighted, ordered collection of exercises.
///
/// The total is never stored. It is the sum of the exercises' points,
/// computed on every read and written out on every serialization, so it
/// cannot go stale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredAssessment", into = "StoredAssessment")]
pub struct AssessmentConfig {
    /// assessment id
    pub id:          String,
    /// display name
    pub name:        String,
    /// display description
    pub description: String,
    /// exercises in order
    exercises:       Vec<AssessmentExercise>,
}

impl TryFrom<StoredAssessment> for AssessmentConfig {
    type Error = ConfigError;

    fn try_from(stored: StoredAssessment) -> Result<Self, Self::Error> {
        let assessment = AssessmentConfig::new(stored.assessment_id, stored.name)
            .with_description(stored.description)
            .with_exercises(stored.exercises)?;

        if let Some(stored_total) = stored.total_max_points {
            let total = assessment.total_max_points();
            if (stored_total - total).abs() > 1e-9 {
                warn!(
                    "Assessment `{}` stores totalMaxPoints {stored_total}, but its exercises sum \
                     to {total}; using {total}.",
                    assessment.id
                );
            }
        }
        Ok(assessment)
    }
}

impl From<AssessmentConfig> for StoredAssessment {
    fn from(assessment: AssessmentConfig) -> Self {
        let total_max_points = Some(assessment.total_max_points());
        StoredAssessment {
            assessment_id: assessment.id,
            name: assessment.name,
            description: assessment.description,
            exercises: assessment.exercises,
            total_max_points,
        }
    }
}

/// Rejects negative or non-finite points.
fn check_points(exercise: &str, points: f64) -> Result<(), ConfigError> {
    if points.is_finite() && points >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativePoints {
            exercise: exercise.to_string(),
            points,
        })
    }
}

impl AssessmentConfig {
    /// An assessment with no exercises.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id:          id.into(),
            name:        name.into(),
            description: String::new(),
            exercises:   Vec::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Appends each exercise in turn, validating as [`Self::add_exercise`] does.
    pub fn with_exercises(
        mut self,
        exercises: impl IntoIterator<Item = AssessmentExercise>,
    ) -> Result<Self, ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::EmptyId);
        }
        for e in exercises {
            self.add_exercise(e.exercise_id, e.max_points)?;
        }
        Ok(self)
    }

    /// The exercises in order.
    pub fn exercises(&self) -> &[AssessmentExercise] {
        &self.exercises
    }

    /// Sum of every exercise's points.
    pub fn total_max_points(&self) -> f64 {
        self.exercises.iter().map(|e| e.max_points).sum()
    }

    /// Points of one exercise, if it is part of the assessment.
    pub fn max_points_for(&self, exercise_id: &str) -> Option<f64> {
        self.exercises
            .iter()
            .find(|e| e.exercise_id == exercise_id)
            .map(|e| e.max_points)
    }

    /// Appends an exercise.
    pub fn add_exercise(
        &mut self,
        exercise_id: impl Into<String>,
        max_points: f64,
    ) -> Result<(), ConfigError> {
        let exercise_id = exercise_id.into();
        if exercise_id.trim().is_empty() {
            return Err(ConfigError::EmptyId);
        }
        check_points(&exercise_id, max_points)?;
        if self.max_points_for(&exercise_id).is_some() {
            return Err(ConfigError::DuplicateExercise(exercise_id));
        }
        self.exercises.push(AssessmentExercise {
            exercise_id,
            max_points,
        });
        Ok(())
    }

    /// Removes an exercise, returning whether it was present.
    pub fn remove_exercise(&mut self, exercise_id: &str) -> bool {
        let before = self.exercises.len();
        self.exercises.retain(|e| e.exercise_id != exercise_id);
        self.exercises.len() != before
    }

    /// Changes the points of an exercise, returning whether it was present.
    pub fn update_exercise_points(
        &mut self,
        exercise_id: &str,
        max_points: f64,
    ) -> Result<bool, ConfigError> {
        check_points(exercise_id, max_points)?;
        Ok(match self.exercises.iter_mut().find(|e| e.exercise_id == exercise_id) {
            Some(e) => {
                e.max_points = max_points;
                true
            }
            None => false,
        })
    }

    /// Ids of every referenced exercise.
    pub fn exercise_ids(&self) -> impl Iterator<Item = &str> {
        self.exercises.iter().map(|e| e.exercise_id.as_str())
    }
}
