#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::java::lexer::{Token, TokenKind, tokenize};

/// One element of a compiled expression.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Element {
    /// a token that must appear verbatim
    Exact {
        /// lexical class of the expected token
        kind: TokenKind,
        /// its text
        text: String,
    },
    /// a free variable, by position in the parameter list
    Param(usize),
}

/// An expression turned into a token sequence in which named parameters are
/// wildcards. Matching is purely structural: `Math.pow(x, 2)` with parameter
/// `x` matches `Math.pow( base ,2 )` but not `Math.pow(2, base)` or
/// `Math.pow(base * 1, 2)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpressionPattern {
    /// the expression as written
    source:   String,
    /// compiled elements
    elements: Vec<Element>,
    /// number of parameters
    arity:    usize,
}

/// Where a pattern matched and what its parameters bound to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpressionMatch {
    /// line of the first matched token
    pub line:     u32,
    /// identifier bound to each parameter, in parameter order; `None` for
    /// parameters that do not occur in the expression
    pub bindings: Vec<Option<String>>,
}

impl ExpressionPattern {
    /// Compiles `expression`, treating every identifier listed in `params` as
    /// a wildcard.
    pub fn compile(expression: &str, params: &[String]) -> Result<Self, String> {
        let lexed = tokenize(expression);
        if let Some(error) = lexed.errors.first() {
            return Err(error.message.clone());
        }

        let elements: Vec<Element> = lexed
            .significant()
            .into_iter()
            .map(|t| match params.iter().position(|p| t.is_ident() && p == t.text) {
                Some(n) => Element::Param(n),
                None => Element::Exact {
                    kind: t.kind,
                    text: t.text.to_string(),
                },
            })
            .collect();

        if elements.is_empty() {
            return Err("expression is empty".to_string());
        }

        Ok(Self {
            source: expression.to_string(),
            elements,
            arity: params.len(),
        })
    }

    /// The expression as written in the configuration.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// First place in `tokens` where the pattern matches.
    pub fn find(&self, tokens: &[Token<'_>]) -> Option<ExpressionMatch> {
        if tokens.len() < self.elements.len() {
            return None;
        }
        (0..=tokens.len() - self.elements.len()).find_map(|start| self.match_at(tokens, start))
    }

    /// Whether the pattern occurs anywhere in `tokens`.
    pub fn is_match(&self, tokens: &[Token<'_>]) -> bool {
        self.find(tokens).is_some()
    }

    /// Attempts a match starting at `start`.
    fn match_at(&self, tokens: &[Token<'_>], start: usize) -> Option<ExpressionMatch> {
        let mut bindings: Vec<Option<String>> = vec![None; self.arity];

        for (element, token) in self.elements.iter().zip(&tokens[start..]) {
            match element {
                Element::Exact { kind, text } => {
                    if !same_token(*kind, text, token) {
                        return None;
                    }
                }
                Element::Param(n) => {
                    if !token.is_ident() {
                        return None;
                    }
                    match &bindings[*n] {
                        Some(bound) if bound != token.text => return None,
                        Some(_) => {}
                        None => bindings[*n] = Some(token.text.to_string()),
                    }
                }
            }
        }

        Some(ExpressionMatch {
            line: tokens[start].line,
            bindings,
        })
    }
}

/// Compares an expected token with a source token. Operators and separators
/// compare by text alone since `<`/`>` change class inside type arguments.
fn same_token(kind: TokenKind, text: &str, token: &Token<'_>) -> bool {
    let punctuation = |k: TokenKind| matches!(k, TokenKind::Operator | TokenKind::Separator);
    let kinds_agree = kind == token.kind || (punctuation(kind) && punctuation(token.kind));
    kinds_agree && token.text == text
}
