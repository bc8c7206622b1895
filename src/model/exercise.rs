#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{collections::BTreeSet, fmt, str::FromStr};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        CAMEL_CASE, COMPARISON_OPERATORS, MEMBERSHIP_OPERATOR, PASCAL_CASE, SNAKE_CASE,
        STRUCTURAL_OPERATORS, UPPER_SNAKE_CASE,
    },
    error::ConfigError,
    java::{ControlStructure, ExpressionPattern, lexer::OPERATORS},
};

/// The rule configuration of one exercise, as authored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExerciseConfig {
    /// unique, stable identifier
    pub id:               String,
    /// display name
    #[serde(default)]
    pub name:             String,
    /// display description
    #[serde(default)]
    pub description:      String,
    /// authoring difficulty level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty:       Option<u32>,
    /// points suggested by the author; assessments carry the binding value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_points:       Option<f64>,
    /// inputs used by the authoring tool's test runner, kept verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_inputs:      Option<serde_json::Value>,
    /// the rules
    #[serde(default)]
    pub rules:            RuleSet,
    /// descriptive rubric for the human grader
    #[serde(default, alias = "grading_criteria", skip_serializing_if = "Vec::is_empty")]
    pub grading_criteria: Vec<GradingCriterion>,
}

impl ExerciseConfig {
    /// An exercise with no rules.
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id:               id.into(),
            name:             String::new(),
            description:      String::new(),
            difficulty:       None,
            max_points:       None,
            test_inputs:      None,
            rules:            RuleSet::default(),
            grading_criteria: Vec::new(),
        }
    }

    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.compile()?;
        Ok(config)
    }

    /// Validates the configuration and compiles its patterns.
    pub fn compile(&self) -> Result<CompiledRules, ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::EmptyId);
        }
        if let Some(points) = self.max_points.filter(|p| *p < 0.0) {
            return Err(ConfigError::NegativePoints {
                exercise: self.id.clone(),
                points,
            });
        }
        self.rules.compile()
    }
}

/// The rule families of an exercise.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleSet {
    /// methods that must be declared
    #[serde(default)]
    pub required_methods:            Vec<RequiredMethod>,
    /// the only operators allowed; empty means unrestricted
    #[serde(default)]
    pub allowed_operators:           Vec<String>,
    /// control structures that must be used
    #[serde(default)]
    pub required_control_structures: Vec<String>,
    /// whether naming and scope checks run at all
    #[serde(default)]
    pub check_variable_scope:        bool,
    /// conventions a variable name may follow
    #[serde(default)]
    pub check_naming_conventions:    Vec<String>,
    /// regular expressions checked against the cleaned source
    #[serde(default)]
    pub custom_patterns:             Vec<CustomPattern>,
    /// exception handling requirements
    #[serde(default)]
    pub exception_handling:          ExceptionHandling,
    /// validation logic that must be present
    #[serde(default, alias = "domainChecks")]
    pub required_domain_checks:      Vec<DomainCheck>,
    /// expressions that must be present
    #[serde(default)]
    pub math_functions:              Vec<MathFunctionCheck>,
}

/// A method the submission must declare.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RequiredMethod {
    /// method name
    pub name:        String,
    /// exact return type
    #[serde(default = "void")]
    pub return_type: String,
    /// exact parameter types, in order
    #[serde(default)]
    pub params:      Vec<String>,
}

/// Default return type of a required method.
fn void() -> String {
    "void".to_string()
}

/// A regular expression over the cleaned source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomPattern {
    /// what the pattern looks for
    #[serde(default)]
    pub description:   String,
    /// the regular expression
    pub pattern:       String,
    /// whether a failure is a violation; informational otherwise
    #[serde(default)]
    pub required:      bool,
    /// message shown on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// when true the pattern must *not* occur
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negative:      bool,
}

/// Exception handling requirements.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExceptionHandling {
    /// whether at least one catch clause is required
    #[serde(default, alias = "requiredTryCatch")]
    pub required:            bool,
    /// exception types that must each be caught somewhere
    #[serde(default)]
    pub specific_exceptions: Vec<String>,
}

/// A textual assertion that some validation logic is present.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomainCheck {
    /// a raw regular expression
    Pattern(PatternCheck),
    /// a comparison of a variable against a value
    Comparison(ComparisonCheck),
}

/// The regular-expression form of a domain check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PatternCheck {
    /// the regular expression
    pub pattern:       String,
    /// what the pattern checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description:   Option<String>,
    /// message shown on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// The comparison form of a domain check, e.g. `age >= 18`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ComparisonCheck {
    /// left-hand variable
    pub variable:      String,
    /// comparison operator
    pub operator:      String,
    /// right-hand value
    pub value:         ComparisonValue,
    /// message shown on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// A comparison value, written either as a JSON number or a string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComparisonValue {
    /// a number
    Number(serde_json::Number),
    /// anything else, as source text
    Text(String),
}

impl fmt::Display for ComparisonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonValue::Number(n) => write!(f, "{n}"),
            ComparisonValue::Text(s) => f.write_str(s),
        }
    }
}

impl DomainCheck {
    /// Short human description of what is checked.
    pub fn label(&self) -> String {
        match self {
            DomainCheck::Pattern(p) => p.description.clone().unwrap_or_else(|| p.pattern.clone()),
            DomainCheck::Comparison(c) => format!("{} {} {}", c.variable, c.operator, c.value),
        }
    }

    /// Configured failure message, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            DomainCheck::Pattern(p) => p.error_message.as_deref(),
            DomainCheck::Comparison(c) => c.error_message.as_deref(),
        }
    }
}

/// An expression that must be present, with free parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MathFunctionCheck {
    /// name of the function being computed
    pub name:             String,
    /// free variables of `expression`
    #[serde(default)]
    pub params:           Vec<String>,
    /// the expression, e.g. `Math.sqrt(x)`
    pub expression:       String,
    /// message shown on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message:    Option<String>,
    /// a guard that must also be present, e.g. `x >= 0`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_condition: Option<String>,
}

/// A rubric entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GradingCriterion {
    /// entry title
    pub title:       String,
    /// points the entry is worth
    #[serde(default)]
    pub points:      f64,
    /// entry description
    #[serde(default)]
    pub description: String,
    /// finer-grained items
    #[serde(default)]
    pub subcriteria: Vec<Subcriterion>,
}

/// A rubric sub-item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Subcriterion {
    /// item text
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// A variable naming convention.
pub enum NamingConvention {
    /// `lowerCamelCase`
    #[serde(rename = "camelCase")]
    CamelCase,
    /// `UpperCamelCase`
    #[serde(rename = "PascalCase")]
    PascalCase,
    /// `lower_snake_case`
    #[serde(rename = "snake_case")]
    SnakeCase,
    /// `UPPER_SNAKE_CASE`
    #[serde(rename = "UPPER_SNAKE_CASE")]
    UpperSnakeCase,
}

impl NamingConvention {
    /// The validating pattern.
    pub fn regex(self) -> &'static Regex {
        match self {
            NamingConvention::CamelCase => &CAMEL_CASE,
            NamingConvention::PascalCase => &PASCAL_CASE,
            NamingConvention::SnakeCase => &SNAKE_CASE,
            NamingConvention::UpperSnakeCase => &UPPER_SNAKE_CASE,
        }
    }

    /// Whether `name` follows the convention.
    pub fn accepts(self, name: &str) -> bool {
        self.regex().is_match(name)
    }

    /// The canonical configuration spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            NamingConvention::CamelCase => "camelCase",
            NamingConvention::PascalCase => "PascalCase",
            NamingConvention::SnakeCase => "snake_case",
            NamingConvention::UpperSnakeCase => "UPPER_SNAKE_CASE",
        }
    }
}

impl fmt::Display for NamingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamingConvention {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "camelCase" | "lowerCamelCase" => Ok(NamingConvention::CamelCase),
            "PascalCase" | "UpperCamelCase" => Ok(NamingConvention::PascalCase),
            "snake_case" => Ok(NamingConvention::SnakeCase),
            "UPPER_SNAKE_CASE" | "SCREAMING_SNAKE_CASE" | "CONSTANT_CASE" => {
                Ok(NamingConvention::UpperSnakeCase)
            }
            other => Err(ConfigError::UnknownConvention(other.to_string())),
        }
    }
}

/// A required method with its types normalised for exact comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodRequirement {
    /// method name
    pub name:        String,
    /// return type without whitespace
    pub return_type: String,
    /// parameter types without whitespace
    pub params:      Vec<String>,
}

/// A compiled custom pattern.
#[derive(Clone, Debug)]
pub struct PatternRule {
    /// what the pattern looks for
    pub description:   String,
    /// message shown on failure
    pub error_message: Option<String>,
    /// whether a failure is a violation
    pub required:      bool,
    /// whether the pattern must be absent
    pub negative:      bool,
    /// compiled expression
    pub regex:         Regex,
}

/// A compiled domain check.
#[derive(Clone, Debug)]
pub struct DomainRule {
    /// what is checked
    pub label:         String,
    /// message shown on failure
    pub error_message: Option<String>,
    /// compiled expressions, all of which must match
    pub regexes:       Vec<Regex>,
}

impl DomainRule {
    /// Whether `text` contains every expression of the check.
    pub fn is_satisfied(&self, text: &str) -> bool {
        self.regexes.iter().all(|re| re.is_match(text))
    }
}

/// A compiled math function check.
#[derive(Clone, Debug)]
pub struct MathRule {
    /// name of the function
    pub name:          String,
    /// message shown on failure
    pub error_message: Option<String>,
    /// the expression
    pub expression:    ExpressionPattern,
    /// the optional guard
    pub domain:        Option<ExpressionPattern>,
}

/// A rule set checked and compiled once, ready to evaluate many submissions.
#[derive(Clone, Debug, Default)]
pub struct CompiledRules {
    /// required methods
    pub methods:              Vec<MethodRequirement>,
    /// allowed operators; empty means unrestricted
    pub allowed_operators:    BTreeSet<String>,
    /// required control structures, in configuration order, deduplicated
    pub control_structures:   Vec<ControlStructure>,
    /// whether naming and scope checks run
    pub check_variable_scope: bool,
    /// accepted naming conventions
    pub conventions:          Vec<NamingConvention>,
    /// custom patterns
    pub patterns:             Vec<PatternRule>,
    /// domain checks
    pub domain_checks:        Vec<DomainRule>,
    /// math function checks
    pub math_functions:       Vec<MathRule>,
    /// whether a catch clause is required
    pub require_catch:        bool,
    /// exceptions that must be caught
    pub specific_exceptions:  Vec<String>,
}

/// Removes all whitespace from a type name.
pub fn normalize_type(ty: &str) -> String {
    ty.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Compiles a source regex with `.` matching newlines.
fn source_regex(field: &str, pattern: &str) -> Result<Regex, ConfigError> {
    RegexBuilder::new(pattern)
        .dot_matches_new_line(true)
        .build()
        .map_err(|source| ConfigError::InvalidPattern {
            field: field.to_string(),
            pattern: pattern.to_string(),
            source,
        })
}

/// `\b` when the adjacent character of `text` is a word character.
fn boundary(c: Option<char>) -> &'static str {
    match c {
        Some(c) if c.is_alphanumeric() || c == '_' => r"\b",
        _ => "",
    }
}

/// Escapes `text` and anchors it at word boundaries where that makes sense.
fn bounded(text: &str) -> String {
    format!(
        "{}{}{}",
        boundary(text.chars().next()),
        regex::escape(text),
        boundary(text.chars().last())
    )
}

/// The operator with its operands swapped: `a < b` is `b > a`.
fn mirrored(operator: &str) -> &str {
    match operator {
        "<" => ">",
        ">" => "<",
        "<=" => ">=",
        ">=" => "<=",
        other => other,
    }
}

/// Builds the regex for a comparison domain check, accepting both operand
/// orders.
fn comparison_regex(check: &ComparisonCheck) -> Result<Regex, ConfigError> {
    let operator = check.operator.trim();
    if !COMPARISON_OPERATORS.contains(&operator) {
        return Err(ConfigError::InvalidComparison {
            variable: check.variable.clone(),
            operator: check.operator.clone(),
        });
    }

    let variable = bounded(check.variable.trim());
    let value = bounded(check.value.to_string().trim());
    let pattern = format!(
        r"{variable}\s*{}\s*{value}|{value}\s*{}\s*{variable}",
        regex::escape(operator),
        regex::escape(mirrored(operator)),
    );
    source_regex("requiredDomainChecks", &pattern)
}

/// Builds the regexes for an `in` domain check, all of which must match.
///
/// A `low..high` range needs the variable compared against both bounds with
/// any ordering operator. A list `a, b, c` needs each element tested for
/// equality with the variable (`==`, `equals`) or used as a `case` label.
fn membership_regexes(check: &ComparisonCheck) -> Result<Vec<Regex>, ConfigError> {
    let variable = bounded(check.variable.trim());
    let value = check.value.to_string();
    let ordered = |bound: &str| {
        let bound = bounded(bound);
        format!(r"{variable}\s*(?:<=?|>=?)\s*{bound}|{bound}\s*(?:<=?|>=?)\s*{variable}")
    };

    let patterns: Vec<String> = match value.split_once("..") {
        Some((low, high)) if !low.trim().is_empty() && !high.trim().is_empty() => {
            vec![ordered(low.trim()), ordered(high.trim())]
        }
        Some(_) => Vec::new(),
        None => value
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(|element| {
                let element = bounded(element);
                format!(
                    r"{variable}\s*==\s*{element}|{element}\s*==\s*{variable}|{variable}\s*\.\s*equals\s*\(\s*{element}\s*\)|{element}\s*\.\s*equals\s*\(\s*{variable}\s*\)|\bcase\s+{element}\s*[:,-]"
                )
            })
            .collect(),
    };
    if patterns.is_empty() {
        return Err(ConfigError::EmptyDomainSet(check.variable.clone()));
    }
    patterns
        .iter()
        .map(|p| source_regex("requiredDomainChecks", p))
        .collect()
}

impl RuleSet {
    /// Validates every rule family and compiles patterns and expressions.
    pub fn compile(&self) -> Result<CompiledRules, ConfigError> {
        let mut methods = Vec::with_capacity(self.required_methods.len());
        for (i, m) in self.required_methods.iter().enumerate() {
            if m.name.trim().is_empty() {
                return Err(ConfigError::UnnamedMethod(i + 1));
            }
            methods.push(MethodRequirement {
                name:        m.name.trim().to_string(),
                return_type: normalize_type(&m.return_type),
                params:      m.params.iter().map(|p| normalize_type(p)).collect(),
            });
        }

        let mut allowed_operators = BTreeSet::new();
        for op in &self.allowed_operators {
            let op = op.trim();
            if !OPERATORS.contains(&op) && !STRUCTURAL_OPERATORS.contains(&op) {
                return Err(ConfigError::InvalidOperator(op.to_string()));
            }
            allowed_operators.insert(op.to_string());
        }

        let mut control_structures = Vec::new();
        for name in &self.required_control_structures {
            let structure: ControlStructure = name
                .parse()
                .map_err(|_| ConfigError::UnknownControlStructure(name.clone()))?;
            if !control_structures.contains(&structure) {
                control_structures.push(structure);
            }
        }

        let mut conventions = Vec::new();
        for name in &self.check_naming_conventions {
            let convention: NamingConvention = name.parse()?;
            if !conventions.contains(&convention) {
                conventions.push(convention);
            }
        }

        let patterns = self
            .custom_patterns
            .iter()
            .map(|p| {
                Ok(PatternRule {
                    description:   p.description.clone(),
                    error_message: p.error_message.clone(),
                    required:      p.required,
                    negative:      p.negative,
                    regex:         source_regex("customPatterns", &p.pattern)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let domain_checks = self
            .required_domain_checks
            .iter()
            .map(|check| {
                let regexes = match check {
                    DomainCheck::Pattern(p) => {
                        vec![source_regex("requiredDomainChecks", &p.pattern)?]
                    }
                    DomainCheck::Comparison(c) if c.operator.trim() == MEMBERSHIP_OPERATOR => {
                        membership_regexes(c)?
                    }
                    DomainCheck::Comparison(c) => vec![comparison_regex(c)?],
                };
                Ok(DomainRule {
                    label: check.label(),
                    error_message: check.error_message().map(str::to_string),
                    regexes,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let math_functions = self
            .math_functions
            .iter()
            .map(|m| {
                let invalid = |part: &'static str| {
                    move |message: String| ConfigError::InvalidExpression {
                        name: m.name.clone(),
                        part,
                        message,
                    }
                };
                let expression = ExpressionPattern::compile(&m.expression, &m.params)
                    .map_err(invalid("expression"))?;
                let domain = m
                    .domain_condition
                    .as_deref()
                    .filter(|d| !d.trim().is_empty())
                    .map(|d| ExpressionPattern::compile(d, &m.params))
                    .transpose()
                    .map_err(invalid("domain condition"))?;
                Ok(MathRule {
                    name: m.name.clone(),
                    error_message: m.error_message.clone(),
                    expression,
                    domain,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(CompiledRules {
            methods,
            allowed_operators,
            control_structures,
            check_variable_scope: self.check_variable_scope,
            conventions,
            patterns,
            domain_checks,
            math_functions,
            require_catch: self.exception_handling.required,
            specific_exceptions: self
                .exception_handling
                .specific_exceptions
                .iter()
                .map(|e| normalize_type(e))
                .filter(|e| !e.is_empty())
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_authored_configuration() {
        let json = r#"{
            "id": "01-est-majeur",
            "name": "Est majeur",
            "description": "",
            "difficulty": 1,
            "maxPoints": 10,
            "testInputs": ["17", "18"],
            "rules": {
                "requiredMethods": [{"name": "estMajeur", "returnType": "boolean", "params": ["int"]}],
                "allowedOperators": [">=", "=", "<"],
                "requiredControlStructures": ["if"],
                "checkVariableScope": true,
                "checkNamingConventions": ["camelCase"],
                "customPatterns": [{"description": "return", "pattern": "return\\s+", "required": true}],
                "exceptionHandling": {"requiredTryCatch": false, "specificExceptions": []},
                "requiredDomainChecks": [
                    {"variable": "age", "operator": ">=", "value": 18},
                    {"pattern": "age\\s*<\\s*0"}
                ],
                "mathFunctions": []
            },
            "grading_criteria": [{"title": "Logique", "points": 5, "description": "", "subcriteria": [{"text": "if"}]}]
        }"#;
        let config = ExerciseConfig::from_json(json).unwrap();
        assert_eq!(config.rules.required_methods[0].return_type, "boolean");
        assert!(matches!(config.rules.required_domain_checks[0], DomainCheck::Comparison(_)));
        assert!(matches!(config.rules.required_domain_checks[1], DomainCheck::Pattern(_)));
        assert_eq!(config.grading_criteria.len(), 1);

        let rules = config.compile().unwrap();
        assert_eq!(rules.control_structures, vec![ControlStructure::If]);
        assert_eq!(rules.conventions, vec![NamingConvention::CamelCase]);
    }

    #[test]
    fn return_type_defaults_to_void() {
        let m: RequiredMethod = serde_json::from_str(r#"{"name": "main"}"#).unwrap();
        assert_eq!(m.return_type, "void");
        assert!(m.params.is_empty());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ExerciseConfig::from_json(r#"{"id": "x", "rules": {"requiredMethod": []}}"#);
        assert!(matches!(err, Err(ConfigError::Json(_))));
    }

    #[test]
    fn bad_rules_are_rejected_at_load() {
        let bad_regex = r#"{"id": "x", "rules": {"customPatterns": [{"pattern": "(", "required": true}]}}"#;
        assert!(matches!(
            ExerciseConfig::from_json(bad_regex),
            Err(ConfigError::InvalidPattern { .. })
        ));

        let bad_structure = r#"{"id": "x", "rules": {"requiredControlStructures": ["loop"]}}"#;
        assert!(matches!(
            ExerciseConfig::from_json(bad_structure),
            Err(ConfigError::UnknownControlStructure(_))
        ));

        let bad_convention = r#"{"id": "x", "rules": {"checkNamingConventions": ["kebab"]}}"#;
        assert!(matches!(
            ExerciseConfig::from_json(bad_convention),
            Err(ConfigError::UnknownConvention(_))
        ));

        let bad_operator = r#"{"id": "x", "rules": {"allowedOperators": ["**"]}}"#;
        assert!(matches!(
            ExerciseConfig::from_json(bad_operator),
            Err(ConfigError::InvalidOperator(_))
        ));

        let bad_comparison =
            r#"{"id": "x", "rules": {"requiredDomainChecks": [{"variable": "a", "operator": "+", "value": 1}]}}"#;
        assert!(matches!(
            ExerciseConfig::from_json(bad_comparison),
            Err(ConfigError::InvalidComparison { .. })
        ));

        assert!(matches!(ExerciseConfig::from_json(r#"{"id": " "}"#), Err(ConfigError::EmptyId)));
    }

    #[test]
    fn comparison_regex_accepts_both_orders() {
        let check = ComparisonCheck {
            variable:      "age".into(),
            operator:      ">=".into(),
            value:         ComparisonValue::Number(18.into()),
            error_message: None,
        };
        let re = comparison_regex(&check).unwrap();
        assert!(re.is_match("if (age >= 18)"));
        assert!(re.is_match("if (18 <= age)"));
        assert!(!re.is_match("if (age > 18)"));
        assert!(!re.is_match("if (age >= 180)"));
        assert!(!re.is_match("if (page >= 18)"));
        assert!(re.is_match("return age>=18;"));
        assert!(re.is_match("if(18<=age)"));
        assert!(re.is_match("(age>=18)"));
        assert!(!re.is_match("age>18"));

        let positive = ComparisonCheck {
            variable:      "x".into(),
            operator:      ">".into(),
            value:         ComparisonValue::Number(0.into()),
            error_message: None,
        };
        let re = comparison_regex(&positive).unwrap();
        assert!(re.is_match("if (x>0)"));
        assert!(re.is_match("while (0<x)"));
        assert!(!re.is_match("if (x>=0)"));
        assert!(!re.is_match("y = x >> 0;"));
    }

    fn membership(value: &str) -> DomainRule {
        let rules = RuleSet {
            required_domain_checks: vec![DomainCheck::Comparison(ComparisonCheck {
                variable:      "mois".into(),
                operator:      "in".into(),
                value:         ComparisonValue::Text(value.into()),
                error_message: None,
            })],
            ..RuleSet::default()
        };
        rules.compile().unwrap().domain_checks.remove(0)
    }

    #[test]
    fn membership_range_needs_both_bounds() {
        let rule = membership("1..12");
        assert_eq!(rule.label, "mois in 1..12");
        assert!(rule.is_satisfied("if (mois >= 1 && mois <= 12) { }"));
        assert!(rule.is_satisfied("if (mois < 1 || 12 < mois) { }"));
        assert!(!rule.is_satisfied("if (mois >= 1) { }"));
        assert!(!rule.is_satisfied("if (mois >= 10 && mois <= 120) { }"));
    }

    #[test]
    fn membership_list_needs_every_element() {
        let rule = membership("1, 3, 5");
        assert!(rule.is_satisfied("if (mois == 1 || mois == 3 || 5 == mois) { }"));
        assert!(rule.is_satisfied("switch (mois) { case 1: case 3: case 5: break; }"));
        assert!(!rule.is_satisfied("if (mois == 1 || mois == 3) { }"));

        let named = membership("NORD, SUD");
        assert!(named.is_satisfied("if (mois.equals(NORD) || SUD.equals(mois)) { }"));
    }

    #[test]
    fn membership_without_values_is_rejected() {
        for value in ["", " , ", "1..", "..5"] {
            let rules = RuleSet {
                required_domain_checks: vec![DomainCheck::Comparison(ComparisonCheck {
                    variable:      "x".into(),
                    operator:      "in".into(),
                    value:         ComparisonValue::Text(value.into()),
                    error_message: None,
                })],
                ..RuleSet::default()
            };
            assert!(
                matches!(rules.compile(), Err(ConfigError::EmptyDomainSet(_))),
                "{value:?}"
            );
        }
    }

    #[test]
    fn types_are_whitespace_normalised() {
        let rules = RuleSet {
            required_methods: vec![RequiredMethod {
                name:        "f".into(),
                return_type: "Map<String, Integer>".into(),
                params:      vec!["int [ ]".into()],
            }],
            ..RuleSet::default()
        };
        let compiled = rules.compile().unwrap();
        assert_eq!(compiled.methods[0].return_type, "Map<String,Integer>");
        assert_eq!(compiled.methods[0].params, vec!["int[]"]);
    }

    #[test]
    fn convention_aliases() {
        assert_eq!(
            "SCREAMING_SNAKE_CASE".parse::<NamingConvention>().unwrap(),
            NamingConvention::UpperSnakeCase
        );
        assert!(NamingConvention::CamelCase.accepts("estMajeur"));
        assert!(!NamingConvention::CamelCase.accepts("EstMajeur"));
        assert!(NamingConvention::SnakeCase.accepts("total_count"));
    }
}
