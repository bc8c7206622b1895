#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, warn};

use super::ConfigProvider;
use crate::{
    constants::{ASSESSMENTS_DIR, DEFAULT_EXERCISE_POINTS, EXERCISES_DIR},
    error::ProviderError,
    model::{AssessmentConfig, ExerciseConfig},
    util::find_files,
};

/// Configurations kept as `<id>.json` files under `configs/` and
/// `assessments/` of a base directory, cached in memory.
#[derive(Clone, Debug, Default)]
pub struct JsonConfigStore {
    /// base directory
    root:        PathBuf,
    /// loaded exercises by id
    exercises:   BTreeMap<String, ExerciseConfig>,
    /// loaded assessments by id
    assessments: BTreeMap<String, AssessmentConfig>,
}

/// Rejects ids that cannot be used as a file name.
fn file_name(id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(['/', '\\'])
        || id.chars().any(char::is_control)
    {
        bail!("`{id}` cannot be used as a configuration file name");
    }
    Ok(format!("{id}.json"))
}

/// Parses every `*.json` directly inside `dir`, logging and skipping files
/// that do not parse.
fn load_dir<T>(dir: &Path, parse: impl Fn(&str) -> Result<T>) -> Result<Vec<(PathBuf, T)>> {
    let mut loaded = Vec::new();
    for path in find_files("json", 0, dir)? {
        let parsed = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))
            .and_then(|text| parse(&text));
        match parsed {
            Ok(value) => loaded.push((path, value)),
            Err(e) => warn!("Skipping {}: {e:#}", path.display()),
        }
    }
    Ok(loaded)
}

/// Writes `value` as pretty JSON.
fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Could not serialize configuration")?;
    fs::write(path, text + "\n").with_context(|| format!("Could not write {}", path.display()))
}

/// Parses any JSON document with context.
fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text).context("Could not parse configuration")
}

impl JsonConfigStore {
    /// Opens a store rooted at `root`, creating its directories and loading
    /// everything in them.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let mut store = Self {
            root: root.into(),
            ..Self::default()
        };
        for dir in [store.exercises_dir(), store.assessments_dir()] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Could not create {}", dir.display()))?;
        }
        store.load_all()?;
        Ok(store)
    }

    /// Directory holding exercise configurations.
    pub fn exercises_dir(&self) -> PathBuf {
        self.root.join(EXERCISES_DIR)
    }

    /// Directory holding assessment configurations.
    pub fn assessments_dir(&self) -> PathBuf {
        self.root.join(ASSESSMENTS_DIR)
    }

    /// Reloads every configuration from disk, returning how many exercises
    /// and assessments were loaded.
    pub fn load_all(&mut self) -> Result<(usize, usize)> {
        self.exercises = load_dir(&self.exercises_dir(), |text| {
            ExerciseConfig::from_json(text).map_err(anyhow::Error::from)
        })?
        .into_iter()
        .map(|(path, c)| {
            debug!("Loaded exercise `{}` from {}", c.id, path.display());
            (c.id.clone(), c)
        })
        .collect();

        self.assessments = load_dir(&self.assessments_dir(), parse_json::<AssessmentConfig>)?
            .into_iter()
            .map(|(path, a)| {
                debug!("Loaded assessment `{}` from {}", a.id, path.display());
                (a.id.clone(), a)
            })
            .collect();

        info!(
            "Loaded {} exercise(s) and {} assessment(s) from {}",
            self.exercises.len(),
            self.assessments.len(),
            self.root.display()
        );
        Ok((self.exercises.len(), self.assessments.len()))
    }

    /// Every loaded exercise, by id.
    pub fn exercises(&self) -> &BTreeMap<String, ExerciseConfig> {
        &self.exercises
    }

    /// Every loaded assessment, by id.
    pub fn assessments(&self) -> &BTreeMap<String, AssessmentConfig> {
        &self.assessments
    }

    /// Validates and writes an exercise, replacing any previous version.
    pub fn save_exercise(&mut self, config: ExerciseConfig) -> Result<PathBuf> {
        config
            .compile()
            .with_context(|| format!("Refusing to save invalid exercise `{}`", config.id))?;
        let path = self.exercises_dir().join(file_name(&config.id)?);
        write_json(&path, &config)?;
        self.exercises.insert(config.id.clone(), config);
        Ok(path)
    }

    /// Writes an assessment, with its total recomputed, replacing any
    /// previous version.
    pub fn save_assessment(&mut self, config: AssessmentConfig) -> Result<PathBuf> {
        let path = self.assessments_dir().join(file_name(&config.id)?);
        write_json(&path, &config)?;
        self.assessments.insert(config.id.clone(), config);
        Ok(path)
    }

    /// Deletes an exercise, returning whether it existed. Assessments that
    /// reference it are left alone.
    pub fn delete_exercise(&mut self, id: &str) -> Result<bool> {
        if self.exercises.remove(id).is_none() {
            return Ok(false);
        }
        let path = self.exercises_dir().join(file_name(id)?);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Could not delete {}", path.display()))?;
        }
        Ok(true)
    }

    /// Deletes an assessment, returning whether it existed.
    pub fn delete_assessment(&mut self, id: &str) -> Result<bool> {
        if self.assessments.remove(id).is_none() {
            return Ok(false);
        }
        let path = self.assessments_dir().join(file_name(id)?);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Could not delete {}", path.display()))?;
        }
        Ok(true)
    }

    /// Creates and saves an exercise with no rules.
    pub fn create_empty_exercise(&mut self, id: &str) -> Result<ExerciseConfig> {
        let config = ExerciseConfig {
            name: id.to_string(),
            difficulty: Some(1),
            max_points: Some(DEFAULT_EXERCISE_POINTS),
            ..ExerciseConfig::empty(id)
        };
        self.save_exercise(config.clone())?;
        Ok(config)
    }

    /// Creates and saves an assessment with no exercises.
    pub fn create_empty_assessment(&mut self, id: &str) -> Result<AssessmentConfig> {
        if id.trim().is_empty() {
            bail!("Assessment id must not be empty");
        }
        let config = AssessmentConfig::new(id, id);
        self.save_assessment(config.clone())?;
        Ok(config)
    }
}

impl ConfigProvider for JsonConfigStore {
    fn get_exercise_config(&self, id: &str) -> Result<ExerciseConfig, ProviderError> {
        self.exercises
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::ExerciseNotFound(id.to_string()))
    }

    fn get_assessment_config(&self, id: &str) -> Result<AssessmentConfig, ProviderError> {
        self.assessments
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::AssessmentNotFound(id.to_string()))
    }
}
