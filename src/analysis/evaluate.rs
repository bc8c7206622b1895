#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use itertools::Itertools;
use typed_builder::TypedBuilder;

use super::result::{
    AnalysisResult, DisallowedOperator, DomainViolation, ExceptionViolation, MissingMathFunction,
    MissingMethod, NamingTarget, NamingViolation, PatternViolation,
};
use crate::{
    constants::DEFAULT_MAX_SOURCE_BYTES,
    error::{AnalysisError, ConfigError},
    java::{
        SemicolonSeverity, StructuralFacts, cleaned_source, extract,
        lexer::line_of,
        syntax::{self, SyntaxReport},
        tokenize,
    },
    model::{CompiledRules, ExerciseConfig},
};

/// Knobs that are not part of an exercise configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TypedBuilder)]
pub struct AnalyzerOptions {
    /// where missing-semicolon findings go
    #[builder(default)]
    pub semicolon_severity: SemicolonSeverity,
    /// sources larger than this are rejected
    #[builder(default = DEFAULT_MAX_SOURCE_BYTES)]
    pub max_source_bytes:   usize,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Evaluates sources against one exercise. Building an analyzer validates
/// and compiles the rules once; [`Analyzer::analyze`] can then be called any
/// number of times, from any thread.
#[derive(Clone, Debug)]
pub struct Analyzer {
    /// id of the exercise the rules came from
    exercise_id: String,
    /// the compiled rules
    rules:       CompiledRules,
    /// analysis options
    options:     AnalyzerOptions,
}

/// Longest matched text kept in a pattern violation.
const MATCH_EXCERPT: usize = 60;

/// Collapses whitespace runs and truncates long matches.
fn excerpt(text: &str) -> String {
    let collapsed = text.split_whitespace().join(" ");
    if collapsed.chars().count() > MATCH_EXCERPT {
        let cut: String = collapsed.chars().take(MATCH_EXCERPT).collect();
        format!("{cut}...")
    } else {
        collapsed
    }
}

impl Analyzer {
    /// Compiles the rules of `config`.
    pub fn new(config: &ExerciseConfig, options: AnalyzerOptions) -> Result<Self, ConfigError> {
        Ok(Self {
            exercise_id: config.id.clone(),
            rules: config.compile()?,
            options,
        })
    }

    /// Id of the exercise this analyzer evaluates.
    pub fn exercise_id(&self) -> &str {
        &self.exercise_id
    }

    /// The compiled rules.
    pub fn rules(&self) -> &CompiledRules {
        &self.rules
    }

    /// Analyzes one source unit.
    ///
    /// Fails only when the source cannot be evaluated at all. Syntax problems
    /// are reported as violations, and every rule family is evaluated on
    /// whatever structure could still be recovered.
    pub fn analyze(&self, source: &str) -> Result<AnalysisResult, AnalysisError> {
        if source.len() > self.options.max_source_bytes {
            return Err(AnalysisError::SourceTooLarge {
                size:  source.len(),
                limit: self.options.max_source_bytes,
            });
        }
        if source.trim().is_empty() {
            return Err(AnalysisError::EmptySource);
        }

        let lexed = tokenize(source);
        let SyntaxReport { errors, warnings } =
            syntax::check(&lexed, self.options.semicolon_severity);
        let facts = extract(&lexed);
        let cleaned = cleaned_source(source, &lexed.tokens);

        Ok(AnalysisResult {
            is_valid: false,
            syntax_errors: errors,
            missing_methods: self.missing_methods(&facts),
            disallowed_operators: self.disallowed_operators(&facts),
            missing_control_structures: self
                .rules
                .control_structures
                .iter()
                .copied()
                .filter(|c| !facts.uses(*c))
                .collect(),
            naming_violations: self.naming_violations(&facts),
            scope_violations: if self.rules.check_variable_scope {
                facts.scope_violations.clone()
            } else {
                Vec::new()
            },
            pattern_violations: self.pattern_violations(&cleaned),
            domain_violations: self.domain_violations(&cleaned),
            missing_math_functions: self.missing_math_functions(&facts),
            exception_violations: self.exception_violations(&facts),
            syntax_warnings: warnings,
        }
        .seal())
    }

    /// Required methods with no exact `(name, return type, parameter types)`
    /// match.
    fn missing_methods(&self, facts: &StructuralFacts<'_>) -> Vec<MissingMethod> {
        self.rules
            .methods
            .iter()
            .filter_map(|required| {
                let same_shape = facts.methods.iter().filter(|m| {
                    m.return_type == required.return_type && m.param_types == required.params
                });
                if same_shape.clone().any(|m| m.name == required.name) {
                    return None;
                }
                Some(MissingMethod {
                    name:            required.name.clone(),
                    expected_return: required.return_type.clone(),
                    expected_params: required.params.clone(),
                    similar:         same_shape.map(|m| m.name.clone()).unique().collect(),
                })
            })
            .collect()
    }

    /// Used operators outside the allowed set, in lexical order.
    fn disallowed_operators(&self, facts: &StructuralFacts<'_>) -> Vec<DisallowedOperator> {
        if self.rules.allowed_operators.is_empty() {
            return Vec::new();
        }
        facts
            .operators
            .iter()
            .filter(|(op, _)| !self.rules.allowed_operators.contains(*op))
            .map(|(op, used)| DisallowedOperator {
                operator:    op.clone(),
                line:        used.first_line,
                occurrences: used.occurrences,
            })
            .collect()
    }

    /// Declared variables and methods that follow none of the configured
    /// conventions, in line order.
    fn naming_violations(&self, facts: &StructuralFacts<'_>) -> Vec<NamingViolation> {
        let conventions = &self.rules.conventions;
        if !self.rules.check_variable_scope || conventions.is_empty() {
            return Vec::new();
        }
        let variables = facts
            .variables
            .iter()
            .map(|v| (v.name.as_str(), v.line, NamingTarget::Variable));
        let methods = facts
            .methods
            .iter()
            .map(|m| (m.name.as_str(), m.line, NamingTarget::Method));
        let mut violations: Vec<NamingViolation> = variables
            .chain(methods)
            .filter(|(name, ..)| !conventions.iter().any(|c| c.accepts(name)))
            .map(|(name, line, kind)| NamingViolation {
                name: name.to_string(),
                line,
                kind,
                expected: conventions.iter().map(|c| c.to_string()).collect(),
            })
            .collect();
        violations.sort_by_key(|v| v.line);
        violations
    }

    /// Required custom patterns that are absent, or present when negative.
    fn pattern_violations(&self, cleaned: &str) -> Vec<PatternViolation> {
        self.rules
            .patterns
            .iter()
            .filter(|p| p.required)
            .filter_map(|p| {
                let description = if p.description.trim().is_empty() {
                    p.regex.as_str().to_string()
                } else {
                    p.description.clone()
                };

                if p.negative {
                    let found = p.regex.find(cleaned)?;
                    Some(PatternViolation {
                        message: p
                            .error_message
                            .clone()
                            .unwrap_or_else(|| format!("Forbidden pattern found: {description}")),
                        description,
                        matched: Some(excerpt(found.as_str())),
                        line: Some(line_of(cleaned, found.start())),
                    })
                } else if p.regex.is_match(cleaned) {
                    None
                } else {
                    Some(PatternViolation {
                        message: p
                            .error_message
                            .clone()
                            .unwrap_or_else(|| format!("Required pattern not found: {description}")),
                        description,
                        matched: None,
                        line: None,
                    })
                }
            })
            .collect()
    }

    /// Domain checks with no matching text.
    fn domain_violations(&self, cleaned: &str) -> Vec<DomainViolation> {
        self.rules
            .domain_checks
            .iter()
            .filter(|d| !d.is_satisfied(cleaned))
            .map(|d| DomainViolation {
                check:   d.label.clone(),
                message: d
                    .error_message
                    .clone()
                    .unwrap_or_else(|| format!("Missing validation: {}", d.label)),
            })
            .collect()
    }

    /// Math functions whose expression, or whose guard, does not occur.
    fn missing_math_functions(&self, facts: &StructuralFacts<'_>) -> Vec<MissingMathFunction> {
        self.rules
            .math_functions
            .iter()
            .filter_map(|m| {
                let expression = m.expression.as_str().to_string();
                if !m.expression.is_match(&facts.tokens) {
                    return Some(MissingMathFunction {
                        message: m.error_message.clone().unwrap_or_else(|| {
                            format!("Expression `{expression}` for `{}` not found", m.name)
                        }),
                        name: m.name.clone(),
                        expression,
                        missing_domain_condition: None,
                    });
                }

                let domain = m.domain.as_ref().filter(|d| !d.is_match(&facts.tokens))?;
                Some(MissingMathFunction {
                    message: m.error_message.clone().unwrap_or_else(|| {
                        format!("Domain condition `{}` for `{}` not found", domain.as_str(), m.name)
                    }),
                    name: m.name.clone(),
                    expression,
                    missing_domain_condition: Some(domain.as_str().to_string()),
                })
            })
            .collect()
    }

    /// Missing catch clauses and uncaught required exceptions.
    fn exception_violations(&self, facts: &StructuralFacts<'_>) -> Vec<ExceptionViolation> {
        let mut violations = Vec::new();
        if self.rules.require_catch && facts.catch_clauses == 0 {
            violations.push(ExceptionViolation::MissingTryCatch);
        }
        violations.extend(
            self.rules
                .specific_exceptions
                .iter()
                .filter(|e| !facts.catches(e))
                .map(|e| ExceptionViolation::MissingSpecificException {
                    exception: e.clone(),
                }),
        );
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RuleSet;

    fn analyzer(rules: RuleSet) -> Analyzer {
        let config = ExerciseConfig {
            rules,
            ..ExerciseConfig::empty("test")
        };
        Analyzer::new(&config, AnalyzerOptions::default()).unwrap()
    }

    #[test]
    fn rejects_unusable_sources() {
        let a = analyzer(RuleSet::default());
        assert!(matches!(a.analyze("  \n\t"), Err(AnalysisError::EmptySource)));

        let tiny = Analyzer::new(
            &ExerciseConfig::empty("t"),
            AnalyzerOptions::builder().max_source_bytes(8).build(),
        )
        .unwrap();
        assert!(matches!(
            tiny.analyze("class A { }"),
            Err(AnalysisError::SourceTooLarge { size: 11, limit: 8 })
        ));
    }

    #[test]
    fn negative_pattern_reports_the_match() {
        let rules: RuleSet = serde_json::from_str(
            r#"{"customPatterns": [{"description": "no System.exit", "pattern": "System\\.exit\\s*\\(", "required": true, "negative": true}]}"#,
        )
        .unwrap();
        let a = analyzer(rules);

        let bad = a
            .analyze("class A {\n void f() {\n  System.exit (1);\n }\n}")
            .unwrap();
        assert_eq!(bad.pattern_violations.len(), 1);
        assert_eq!(bad.pattern_violations[0].line, Some(3));
        assert_eq!(bad.pattern_violations[0].matched.as_deref(), Some("System.exit ("));

        let good = a
            .analyze("class A {\n // System.exit(1);\n String s = \"System.exit(0)\";\n}")
            .unwrap();
        assert!(good.pattern_violations.is_empty());
    }

    #[test]
    fn optional_patterns_never_report() {
        let rules: RuleSet = serde_json::from_str(
            r#"{"customPatterns": [{"description": "loop", "pattern": "while"}]}"#,
        )
        .unwrap();
        let result = analyzer(rules).analyze("class A { }").unwrap();
        assert!(result.pattern_violations.is_empty());
        assert!(result.is_valid);
    }

    #[test]
    fn similar_methods_are_hinted() {
        let rules: RuleSet = serde_json::from_str(
            r#"{"requiredMethods": [{"name": "estMajeur", "returnType": "boolean", "params": ["int"]}]}"#,
        )
        .unwrap();
        let result = analyzer(rules)
            .analyze("class A { boolean verifierAge(int age) { return age >= 18; } }")
            .unwrap();
        assert_eq!(result.missing_methods[0].similar, vec!["verifierAge"]);
    }

    #[test]
    fn math_function_with_guard() {
        let rules: RuleSet = serde_json::from_str(
            r#"{"mathFunctions": [{"name": "racine", "params": ["x"], "expression": "Math.sqrt(x)", "domainCondition": "x >= 0"}]}"#,
        )
        .unwrap();
        let a = analyzer(rules);

        let guarded = a
            .analyze("class A { double r(double v) { if (v >= 0) { return Math.sqrt(v); } return -1; } }")
            .unwrap();
        assert!(guarded.missing_math_functions.is_empty());

        let unguarded = a
            .analyze("class A { double r(double v) { return Math.sqrt(v); } }")
            .unwrap();
        assert_eq!(
            unguarded.missing_math_functions[0].missing_domain_condition.as_deref(),
            Some("x >= 0")
        );

        let absent = a.analyze("class A { double r(double v) { return v; } }").unwrap();
        assert_eq!(absent.missing_math_functions.len(), 1);
        assert!(absent.missing_math_functions[0].missing_domain_condition.is_none());
    }

    #[test]
    fn exception_requirements() {
        let rules: RuleSet = serde_json::from_str(
            r#"{"exceptionHandling": {"required": true, "specificExceptions": ["NumberFormatException", "IOException"]}}"#,
        )
        .unwrap();
        let a = analyzer(rules);

        let none = a.analyze("class A { void f() { g(); } }").unwrap();
        assert_eq!(none.exception_violations.len(), 3);
        assert_eq!(none.exception_violations[0], ExceptionViolation::MissingTryCatch);

        let some = a
            .analyze("class A { void f() { try { g(); } catch (NumberFormatException e) { } } }")
            .unwrap();
        assert_eq!(
            some.exception_violations,
            vec![ExceptionViolation::MissingSpecificException {
                exception: "IOException".into()
            }]
        );
    }
}
