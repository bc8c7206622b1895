#![allow(dead_code)]

use std::{fs, path::PathBuf};

use tassist::model::ExerciseConfig;

pub fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

pub fn java(name: &str) -> String {
    let path = fixtures_root().join("java").join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

pub fn config_text(name: &str) -> String {
    let path = fixtures_root().join("configs").join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

pub fn exercise(name: &str) -> ExerciseConfig {
    ExerciseConfig::from_json(&config_text(name)).expect("fixture config is valid")
}

/// An exercise whose rules are given inline as JSON.
pub fn exercise_with_rules(rules: serde_json::Value) -> ExerciseConfig {
    let json = serde_json::json!({ "id": "inline", "name": "Inline", "rules": rules });
    ExerciseConfig::from_json(&json.to_string()).expect("inline config is valid")
}
