mod common;

use std::fs;

use common::{config_text, exercise};
use tassist::{
    error::ProviderError,
    model::{AssessmentConfig, ExerciseConfig, NamingConvention},
    provider::{ConfigProvider, JsonConfigStore},
};

#[test]
fn fixture_configs_parse() {
    let est = exercise("est-majeur.json");
    assert_eq!(est.id, "01-est-majeur");
    assert_eq!(est.rules.required_methods[0].return_type, "boolean");
    assert_eq!(est.grading_criteria[0].subcriteria[0].text, "Retourne un boolean");

    let tp1: AssessmentConfig = serde_json::from_str(&config_text("tp1.json")).unwrap();
    assert_eq!(tp1.exercise_ids().collect::<Vec<_>>(), vec![
        "01-est-majeur",
        "02-racine-carree"
    ]);
    assert_eq!(tp1.total_max_points(), 10.0);
}

#[test]
fn malformed_rules_are_rejected_at_load_time() {
    for rules in [
        r#"{ "allowedOperators": ["<>"] }"#,
        r#"{ "requiredControlStructures": ["loop"] }"#,
        r#"{ "checkNamingConventions": ["kebab-case"] }"#,
        r#"{ "customPatterns": [{ "description": "d", "pattern": "(" }] }"#,
        r#"{ "requiredDomainChecks": [{ "variable": "x", "operator": "+", "value": 1 }] }"#,
        r#"{ "unknownRule": true }"#,
    ] {
        let json = format!(r#"{{ "id": "x", "rules": {rules} }}"#);
        assert!(ExerciseConfig::from_json(&json).is_err(), "{rules}");
    }
    assert!(ExerciseConfig::from_json(r#"{ "id": "" }"#).is_err());
}

#[test]
fn naming_convention_spellings() {
    assert_eq!(
        "camelCase".parse::<NamingConvention>().ok(),
        Some(NamingConvention::CamelCase)
    );
    assert_eq!(
        "SCREAMING_SNAKE_CASE".parse::<NamingConvention>().ok(),
        Some(NamingConvention::UpperSnakeCase)
    );
    assert!("kebab-case".parse::<NamingConvention>().is_err());
    assert!(NamingConvention::SnakeCase.accepts("total_count"));
    assert!(!NamingConvention::CamelCase.accepts("Total"));
}

#[test]
fn assessment_total_tracks_every_change() {
    let mut a = AssessmentConfig::new("tp2", "TP 2");
    a.add_exercise("a", 2.5).unwrap();
    a.add_exercise("b", 4.0).unwrap();
    assert_eq!(a.total_max_points(), 6.5);

    assert!(a.add_exercise("a", 1.0).is_err());
    assert!(a.add_exercise("c", -1.0).is_err());
    assert_eq!(a.total_max_points(), 6.5);

    assert!(a.update_exercise_points("b", 1.5).unwrap());
    assert!(!a.update_exercise_points("zzz", 1.0).unwrap());
    assert_eq!(a.total_max_points(), 4.0);

    assert!(a.remove_exercise("a"));
    assert!(!a.remove_exercise("a"));
    assert_eq!(a.total_max_points(), 1.5);
    assert_eq!(a.exercise_ids().collect::<Vec<_>>(), vec!["b"]);

    let json = serde_json::to_value(&a).unwrap();
    assert_eq!(json["totalMaxPoints"], 1.5);
    assert_eq!(json["assessmentId"], "tp2");
}

#[test]
fn store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonConfigStore::open(dir.path()).unwrap();
    assert!(store.exercises().is_empty());

    store.save_exercise(exercise("est-majeur.json")).unwrap();
    let created = store.create_empty_exercise("scratch").unwrap();
    assert_eq!(created.max_points, Some(10.0));

    let mut tp = store.create_empty_assessment("tp1").unwrap();
    tp.add_exercise("01-est-majeur", 4.0).unwrap();
    store.save_assessment(tp).unwrap();

    let reopened = JsonConfigStore::open(dir.path()).unwrap();
    assert_eq!(reopened.exercises().len(), 2);
    assert_eq!(
        reopened.get_exercise_config("01-est-majeur").unwrap(),
        exercise("est-majeur.json")
    );
    let tp = reopened.get_assessment_config("tp1").unwrap();
    assert_eq!(tp.total_max_points(), 4.0);
    assert!(matches!(
        reopened.get_assessment_config("tp9"),
        Err(ProviderError::AssessmentNotFound(_))
    ));
}

#[test]
fn store_skips_unparsable_files_and_deletes() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonConfigStore::open(dir.path()).unwrap();
    fs::write(store.exercises_dir().join("broken.json"), "{ not json").unwrap();
    fs::write(
        store.exercises_dir().join("02-racine-carree.json"),
        config_text("racine-carree.json"),
    )
    .unwrap();

    assert_eq!(store.load_all().unwrap(), (1, 0));
    assert!(store.get_exercise_config("02-racine-carree").is_ok());

    assert!(store.delete_exercise("02-racine-carree").unwrap());
    assert!(!store.delete_exercise("02-racine-carree").unwrap());
    assert!(!store.exercises_dir().join("02-racine-carree.json").exists());
    assert!(matches!(
        store.get_exercise_config("02-racine-carree"),
        Err(ProviderError::ExerciseNotFound(_))
    ));
}

#[test]
fn store_refuses_invalid_exercises() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonConfigStore::open(dir.path()).unwrap();
    let mut bad = ExerciseConfig::empty("bad");
    bad.rules.allowed_operators = vec!["<>".into()];
    assert!(store.save_exercise(bad).is_err());
    assert!(store.save_exercise(ExerciseConfig::empty("../escape")).is_err());
    assert!(store.exercises().is_empty());
}
