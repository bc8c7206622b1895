mod common;

use common::{exercise, exercise_with_rules, java};
use serde_json::json;
use tassist::{
    analysis::{Analyzer, AnalyzerOptions, Category, ExceptionViolation, NamingTarget},
    analyze,
    error::AnalysisError,
    java::{ControlStructure, SemicolonSeverity, SyntaxErrorKind},
};

#[test]
fn required_method_present() {
    let result = analyze(&java("EstMajeur.java"), &exercise("est-majeur.json")).unwrap();
    assert!(result.missing_methods.is_empty());
    assert!(result.syntax_errors.is_empty());
    assert!(result.disallowed_operators.is_empty());
    assert!(result.is_valid);
}

#[test]
fn required_method_missing() {
    let result = analyze(&java("VerifierAge.java"), &exercise("est-majeur.json")).unwrap();
    assert!(!result.is_valid);
    assert_eq!(result.missing_methods.len(), 1);

    let missing = &result.missing_methods[0];
    assert_eq!(missing.name, "estMajeur");
    assert_eq!(missing.expected_return, "boolean");
    assert_eq!(missing.expected_params, vec!["int".to_string()]);
    assert_eq!(missing.similar, vec!["verifierAge".to_string()]);
}

#[test]
fn missing_semicolon_is_line_addressed() {
    let result = analyze(&java("MissingSemicolon.java"), &exercise("est-majeur.json")).unwrap();
    assert_eq!(result.syntax_errors.len(), 1);
    assert_eq!(result.syntax_errors[0].kind, SyntaxErrorKind::MissingSemicolon);
    assert_eq!(result.syntax_errors[0].line, 3);
    assert!(result.missing_methods.is_empty());
    assert!(!result.is_valid);
}

#[test]
fn missing_semicolon_can_be_advisory() {
    let options = AnalyzerOptions::builder()
        .semicolon_severity(SemicolonSeverity::Warning)
        .build();
    let analyzer = Analyzer::new(&exercise("est-majeur.json"), options).unwrap();
    let result = analyzer.analyze(&java("MissingSemicolon.java")).unwrap();

    assert!(result.syntax_errors.is_empty());
    assert_eq!(result.syntax_warnings.len(), 1);
    assert_eq!(result.syntax_warnings[0].line, 3);
    assert!(result.is_valid);
}

#[test]
fn missing_control_structures_keep_configured_order() {
    let config = exercise_with_rules(json!({ "requiredControlStructures": ["if", "for"] }));
    let result = analyze(&java("WhileOnly.java"), &config).unwrap();
    assert_eq!(
        result.missing_control_structures,
        vec![ControlStructure::If, ControlStructure::For]
    );
    assert!(!result.is_valid);

    let config = exercise_with_rules(json!({ "requiredControlStructures": ["while"] }));
    assert!(analyze(&java("WhileOnly.java"), &config).unwrap().is_valid);
}

#[test]
fn required_pattern_absent() {
    let config = exercise_with_rules(json!({
        "customPatterns": [
            { "description": "try-catch", "pattern": "try\\s*\\{", "required": true }
        ]
    }));
    let result = analyze(&java("WhileOnly.java"), &config).unwrap();
    assert_eq!(result.pattern_violations.len(), 1);
    assert_eq!(result.pattern_violations[0].description, "try-catch");
    assert!(!result.is_valid);
}

#[test]
fn comments_and_strings_never_satisfy_rules() {
    let config = exercise_with_rules(json!({
        "requiredMethods": [{ "name": "estMajeur", "returnType": "boolean", "params": ["int"] }],
        "customPatterns": [
            { "description": "try-catch", "pattern": "try\\s*\\{", "required": true }
        ],
        "exceptionHandling": { "required": true }
    }));
    let result = analyze(&java("CommentsOnly.java"), &config).unwrap();

    assert_eq!(result.missing_methods.len(), 1);
    assert_eq!(result.pattern_violations.len(), 1);
    assert_eq!(result.exception_violations, vec![ExceptionViolation::MissingTryCatch]);
    assert!(result.missing_control_structures.is_empty());
}

#[test]
fn operators_outside_the_allowed_set() {
    let config = exercise_with_rules(json!({ "allowedOperators": ["=", "+=", "<="] }));
    let result = analyze(&java("WhileOnly.java"), &config).unwrap();
    assert_eq!(result.disallowed_operators.len(), 1);
    assert_eq!(result.disallowed_operators[0].operator, "++");
    assert_eq!(result.disallowed_operators[0].line, 7);
    assert_eq!(result.disallowed_operators[0].occurrences, 1);

    let config = exercise_with_rules(json!({ "allowedOperators": [] }));
    let result = analyze(&java("WhileOnly.java"), &config).unwrap();
    assert!(result.disallowed_operators.is_empty());
}

#[test]
fn naming_only_runs_with_scope_checking() {
    let rules = json!({
        "checkVariableScope": true,
        "checkNamingConventions": ["camelCase"]
    });
    let result = analyze(&java("Naming.java"), &exercise_with_rules(rules)).unwrap();
    let mut names: Vec<&str> = result
        .naming_violations
        .iter()
        .map(|v| v.name.as_str())
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Valeur", "resultat_final"]);
    assert!(result.scope_violations.is_empty());

    let rules = json!({
        "checkVariableScope": false,
        "checkNamingConventions": ["camelCase"]
    });
    let result = analyze(&java("Naming.java"), &exercise_with_rules(rules)).unwrap();
    assert!(result.naming_violations.is_empty());
    assert!(result.is_valid);
}

#[test]
fn variable_used_after_its_block() {
    let rules = json!({ "checkVariableScope": true });
    let result = analyze(&java("ScopeLeak.java"), &exercise_with_rules(rules)).unwrap();
    assert_eq!(result.scope_violations.len(), 1);
    assert_eq!(result.scope_violations[0].name, "doubled");
    assert_eq!(result.scope_violations[0].line, 8);
    assert_eq!(result.scope_violations[0].declared_line, 5);

    let result = analyze(&java("ScopeLeak.java"), &exercise_with_rules(json!({}))).unwrap();
    assert!(result.scope_violations.is_empty());
}

#[test]
fn complete_exercise_passes_every_family() {
    let result = analyze(&java("RacineCarree.java"), &exercise("racine-carree.json")).unwrap();
    assert_eq!(result.all_messages(), Vec::new());
    assert!(result.is_valid);
}

#[test]
fn domain_math_and_exception_rules_report_what_is_missing() {
    let result = analyze(&java("WhileOnly.java"), &exercise("racine-carree.json")).unwrap();

    assert_eq!(result.domain_violations.len(), 1);
    assert_eq!(result.domain_violations[0].message, "Le cas x < 0 n'est pas traite.");
    assert_eq!(result.missing_math_functions.len(), 1);
    assert_eq!(result.missing_math_functions[0].name, "racine");
    assert_eq!(
        result.exception_violations,
        vec![
            ExceptionViolation::MissingTryCatch,
            ExceptionViolation::MissingSpecificException {
                exception: "NumberFormatException".into()
            }
        ]
    );
    assert_eq!(result.count(Category::Exceptions), 2);
}

#[test]
fn validity_matches_violation_count() {
    let config = exercise("racine-carree.json");
    for name in [
        "EstMajeur.java",
        "VerifierAge.java",
        "MissingSemicolon.java",
        "WhileOnly.java",
        "CommentsOnly.java",
        "Naming.java",
        "ScopeLeak.java",
        "RacineCarree.java",
    ] {
        let result = analyze(&java(name), &config).unwrap();
        assert_eq!(result.is_valid, result.violation_count() == 0, "{name}");
        let listed: usize = Category::ALL.iter().map(|c| result.count(*c)).sum();
        assert_eq!(listed, result.violation_count(), "{name}");
    }
}

#[test]
fn analysis_is_deterministic() {
    let config = exercise("racine-carree.json");
    let analyzer = Analyzer::new(&config, AnalyzerOptions::default()).unwrap();
    let source = java("ScopeLeak.java");

    let first = analyzer.analyze(&source).unwrap();
    let second = analyzer.analyze(&source).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn unusable_sources_are_rejected() {
    let config = exercise("est-majeur.json");
    assert!(matches!(analyze("", &config), Err(AnalysisError::EmptySource)));
    assert!(matches!(analyze("\n   \n", &config), Err(AnalysisError::EmptySource)));

    let options = AnalyzerOptions::builder().max_source_bytes(64).build();
    let analyzer = Analyzer::new(&config, options).unwrap();
    assert!(matches!(
        analyzer.analyze(&java("EstMajeur.java")),
        Err(AnalysisError::SourceTooLarge { limit: 64, .. })
    ));
}

#[test]
fn unbalanced_source_still_gets_structural_checks() {
    let config = exercise("est-majeur.json");
    let source = "public class A {\n    public boolean estMajeur(int age) {\n        return age >= 18;\n    }\n";
    let result = analyze(source, &config).unwrap();
    assert!(
        result
            .syntax_errors
            .iter()
            .any(|e| e.kind == SyntaxErrorKind::UnclosedOpener)
    );
    assert!(result.missing_methods.is_empty());
    assert!(!result.is_valid);
}

#[test]
fn unspaced_comparisons_satisfy_domain_checks() {
    let config = exercise_with_rules(json!({
        "requiredDomainChecks": [
            { "variable": "age", "operator": ">=", "value": 18 },
            { "variable": "x", "operator": ">", "value": 0 }
        ]
    }));
    let source = "class A {\n    boolean f(int age, int x) {\n        return age>=18 && (0<x);\n    }\n}\n";
    let result = analyze(source, &config).unwrap();
    assert!(result.domain_violations.is_empty(), "{:?}", result.domain_violations);
    assert!(result.is_valid);
}

#[test]
fn membership_domain_checks() {
    let config = exercise_with_rules(json!({
        "requiredDomainChecks": [
            { "variable": "mois", "operator": "in", "value": "1..12", "errorMessage": "Mois invalide." }
        ]
    }));
    let guarded = "class A {\n    boolean f(int mois) {\n        return mois >= 1 && mois <= 12;\n    }\n}\n";
    assert!(analyze(guarded, &config).unwrap().domain_violations.is_empty());

    let half = "class A {\n    boolean f(int mois) {\n        return mois >= 1;\n    }\n}\n";
    let result = analyze(half, &config).unwrap();
    assert_eq!(result.domain_violations.len(), 1);
    assert_eq!(result.domain_violations[0].check, "mois in 1..12");
    assert_eq!(result.domain_violations[0].message, "Mois invalide.");
}

#[test]
fn lambda_parameters_reuse_expired_names() {
    let rules = json!({ "checkVariableScope": true });
    let source = "import java.util.function.IntUnaryOperator;\n\nclass A {\n    void a() {\n        for (int i = 0; i < 3; i++) {\n        }\n    }\n\n    void b() {\n        IntUnaryOperator f = i -> i + 1;\n        f.applyAsInt(2);\n    }\n}\n";
    let result = analyze(source, &exercise_with_rules(rules)).unwrap();
    assert!(result.scope_violations.is_empty(), "{:?}", result.scope_violations);
    assert!(result.is_valid);
}

#[test]
fn method_names_follow_conventions_too() {
    let rules = json!({
        "checkVariableScope": true,
        "checkNamingConventions": ["camelCase"]
    });
    let source = "class A {\n    void goodName() {\n    }\n\n    int Calcul_Total(int total) {\n        return total;\n    }\n}\n";
    let result = analyze(source, &exercise_with_rules(rules)).unwrap();
    assert_eq!(result.naming_violations.len(), 1);
    let violation = &result.naming_violations[0];
    assert_eq!(violation.name, "Calcul_Total");
    assert_eq!(violation.kind, NamingTarget::Method);
    assert_eq!(violation.line, 5);
    assert_eq!(
        violation.to_string(),
        "Method `Calcul_Total` on line 5 does not follow camelCase"
    );
}
