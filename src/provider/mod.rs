#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{
    error::ProviderError,
    model::{AssessmentConfig, ExerciseConfig},
};

/// Exercise and assessment configurations stored as JSON files.
pub mod json;
/// Student submissions laid out as one directory per student.
pub mod submissions;

pub use json::JsonConfigStore;
pub use submissions::DirectorySubmissions;

/// Somewhere exercise and assessment configurations can be looked up.
pub trait ConfigProvider {
    /// The exercise configuration with this id.
    fn get_exercise_config(&self, id: &str) -> Result<ExerciseConfig, ProviderError>;

    /// The assessment configuration with this id.
    fn get_assessment_config(&self, id: &str) -> Result<AssessmentConfig, ProviderError>;
}

/// One Java source file of a submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// path relative to the student's submission root, with `/` separators
    pub relative_path: String,
    /// file contents, or why they could not be read
    pub text:          Result<String, String>,
}

impl SourceFile {
    /// The file name without directories.
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

/// Somewhere student sources come from.
pub trait SubmissionSource {
    /// Every Java source of one student, in path order.
    fn list_java_sources(&self, student_id: &str) -> Result<Vec<SourceFile>>;
}
