#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::java::{
    lexer::{Lexed, Token, TokenKind},
    parsers::{Fact, structure},
    scope::{self, ScopeViolation, Variable},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Control-flow keywords a rule set can require.
pub enum ControlStructure {
    /// `if`
    If,
    /// `for`, both classic and enhanced
    For,
    /// `while`, including the tail of a `do ... while`
    While,
    /// `switch`, statement or expression
    Switch,
    /// `do`
    Do,
    /// `try`
    Try,
}

impl ControlStructure {
    /// Every recognised structure.
    pub const ALL: [ControlStructure; 6] = [
        ControlStructure::If,
        ControlStructure::For,
        ControlStructure::While,
        ControlStructure::Switch,
        ControlStructure::Do,
        ControlStructure::Try,
    ];

    /// The Java keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            ControlStructure::If => "if",
            ControlStructure::For => "for",
            ControlStructure::While => "while",
            ControlStructure::Switch => "switch",
            ControlStructure::Do => "do",
            ControlStructure::Try => "try",
        }
    }
}

impl Display for ControlStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for ControlStructure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ControlStructure::ALL
            .into_iter()
            .find(|c| c.keyword() == s.trim())
            .ok_or_else(|| format!("unknown control structure `{s}`"))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// A declared method.
pub struct MethodSignature {
    /// method name
    pub name:        String,
    /// return type text
    pub return_type: String,
    /// parameter types in order
    pub param_types: Vec<String>,
    /// parameter names in order
    pub param_names: Vec<String>,
    /// modifiers as written
    pub modifiers:   Vec<String>,
    /// line of the method name
    pub line:        u32,
}

impl MethodSignature {
    /// `boolean estMajeur(int)` style rendering.
    pub fn display_signature(&self) -> String {
        format!("{} {}({})", self.return_type, self.name, self.param_types.join(", "))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Where and how often an operator is used.
pub struct OperatorUse {
    /// line of the first occurrence
    pub first_line:  u32,
    /// number of occurrences
    pub occurrences: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// An exception type named by a catch clause.
pub struct CaughtException {
    /// type text as written, possibly qualified
    pub ty:   String,
    /// line of the catch clause
    pub line: u32,
}

impl CaughtException {
    /// The unqualified type name.
    pub fn simple_name(&self) -> &str {
        self.ty.rsplit('.').next().unwrap_or(&self.ty)
    }
}

/// Everything the evaluator needs to know about one source unit.
#[derive(Clone, Debug, Default)]
pub struct StructuralFacts<'a> {
    /// significant tokens (comments dropped)
    pub tokens:             Vec<Token<'a>>,
    /// declared methods in source order
    pub methods:            Vec<MethodSignature>,
    /// operators used, by lexeme
    pub operators:          BTreeMap<String, OperatorUse>,
    /// control structures used, with the line of first use
    pub control_structures: BTreeMap<ControlStructure, u32>,
    /// declared variables in source order
    pub variables:          Vec<Variable>,
    /// variable references outside their scope
    pub scope_violations:   Vec<ScopeViolation>,
    /// every alternative of every catch clause
    pub caught_exceptions:  Vec<CaughtException>,
    /// number of catch clauses
    pub catch_clauses:      usize,
}

impl StructuralFacts<'_> {
    /// Whether a control structure is used.
    pub fn uses(&self, structure: ControlStructure) -> bool {
        self.control_structures.contains_key(&structure)
    }

    /// Whether some catch clause names `exception`. A simple name also matches
    /// the last segment of a qualified caught type.
    pub fn catches(&self, exception: &str) -> bool {
        let qualified = exception.contains('.');
        self.caught_exceptions.iter().any(|c| {
            c.ty == exception || (!qualified && c.simple_name() == exception)
        })
    }
}

/// Recovers the structural facts of a token stream. Works on whatever parses:
/// a construct broken by a syntax error is skipped, not fatal.
pub fn extract<'a>(lexed: &Lexed<'a>) -> StructuralFacts<'a> {
    let tokens = lexed.significant();
    let parsed = structure::facts(&tokens).unwrap_or_default();

    let mut facts = StructuralFacts::default();

    for t in &tokens {
        match t.kind {
            TokenKind::Operator => {
                facts
                    .operators
                    .entry(t.text.to_string())
                    .and_modify(|u| u.occurrences += 1)
                    .or_insert(OperatorUse {
                        first_line:  t.line,
                        occurrences: 1,
                    });
            }
            TokenKind::Keyword => {
                if let Ok(structure) = t.text.parse::<ControlStructure>() {
                    facts.control_structures.entry(structure).or_insert(t.line);
                }
            }
            _ => {}
        }
    }

    for fact in &parsed {
        match fact {
            Fact::Method { head, .. } => facts.methods.push(MethodSignature {
                name:        head.name.text.to_string(),
                return_type: head.return_type.clone(),
                param_types: head.params.iter().map(|p| p.ty.clone()).collect(),
                param_names: head.params.iter().map(|p| p.name.text.to_string()).collect(),
                modifiers:   head.modifiers.iter().map(|m| m.to_string()).collect(),
                line:        head.name.line,
            }),
            Fact::Catch { types, name, .. } => {
                facts.catch_clauses += 1;
                facts
                    .caught_exceptions
                    .extend(types.iter().map(|ty| CaughtException {
                        ty:   ty.clone(),
                        line: name.line,
                    }));
            }
            _ => {}
        }
    }

    let scopes = scope::walk(&tokens, &parsed);
    facts.variables = scopes.variables;
    facts.scope_violations = scopes.violations;
    facts.tokens = tokens;
    facts
}
