#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::java::lexer::{Lexed, Token, TokenKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// What kind of well-formedness problem was found.
pub enum SyntaxErrorKind {
    /// a character that cannot start any Java token
    UnexpectedCharacter,
    /// a string literal or text block that never closes
    UnterminatedString,
    /// a character literal that never closes
    UnterminatedChar,
    /// a block comment that never closes
    UnterminatedComment,
    /// a closing bracket with nothing open
    UnmatchedCloser,
    /// a closing bracket of the wrong kind
    MismatchedCloser,
    /// an opening bracket still open at end of input
    UnclosedOpener,
    /// a simple statement that does not end in `;`
    MissingSemicolon,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// A line-addressed syntax finding.
pub struct SyntaxError {
    /// category of the finding
    pub kind:    SyntaxErrorKind,
    /// 1-based line the finding is reported at
    pub line:    u32,
    /// 1-based column the finding is reported at
    pub column:  u32,
    /// human readable description
    pub message: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Where missing-semicolon findings are reported.
pub enum SemicolonSeverity {
    /// reported as syntax errors, making the submission invalid
    #[default]
    Error,
    /// reported as advisory warnings only
    Warning,
}

impl FromStr for SemicolonSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(SemicolonSeverity::Error),
            "warning" | "warn" | "advisory" => Ok(SemicolonSeverity::Warning),
            other => Err(format!("unknown semicolon severity `{other}` (expected error|warning)")),
        }
    }
}

/// Result of checking a token stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyntaxReport {
    /// findings that make the source invalid
    pub errors:   Vec<SyntaxError>,
    /// advisory findings
    pub warnings: Vec<SyntaxError>,
}

/// Checks bracket balance and statement termination. Lexical errors already
/// found by the tokenizer are carried over into the report.
pub fn check(lexed: &Lexed<'_>, severity: SemicolonSeverity) -> SyntaxReport {
    let tokens = lexed.significant();

    let mut errors = lexed.errors.clone();
    errors.extend(check_brackets(&tokens));

    let semicolons = missing_semicolons(&tokens);
    let mut warnings = Vec::new();
    match severity {
        SemicolonSeverity::Error => errors.extend(semicolons),
        SemicolonSeverity::Warning => warnings.extend(semicolons),
    }

    errors.sort_by_key(|e| (e.line, e.column));
    warnings.sort_by_key(|e| (e.line, e.column));
    SyntaxReport { errors, warnings }
}

/// The closer expected for an opening bracket.
fn closer_of(open: &str) -> &'static str {
    match open {
        "(" => ")",
        "[" => "]",
        _ => "}",
    }
}

/// Verifies that `(`, `[` and `{` nest properly.
fn check_brackets(tokens: &[Token<'_>]) -> Vec<SyntaxError> {
    let mut errors = Vec::new();
    let mut stack: Vec<Token<'_>> = Vec::new();

    for &t in tokens {
        if t.kind != TokenKind::Separator {
            continue;
        }
        match t.text {
            "(" | "[" | "{" => stack.push(t),
            ")" | "]" | "}" => match stack.last() {
                None => errors.push(SyntaxError {
                    kind:    SyntaxErrorKind::UnmatchedCloser,
                    line:    t.line,
                    column:  t.column,
                    message: format!("unexpected '{}' with no matching opener", t.text),
                }),
                Some(open) if closer_of(open.text) == t.text => {
                    stack.pop();
                }
                Some(&open) => {
                    errors.push(SyntaxError {
                        kind:    SyntaxErrorKind::MismatchedCloser,
                        line:    t.line,
                        column:  t.column,
                        message: format!(
                            "unexpected '{}', expected '{}' to close '{}' opened on line {}",
                            t.text,
                            closer_of(open.text),
                            open.text,
                            open.line
                        ),
                    });
                    if let Some(pos) = stack.iter().rposition(|o| closer_of(o.text) == t.text) {
                        stack.truncate(pos);
                    }
                }
            },
            _ => {}
        }
    }

    errors.extend(stack.into_iter().map(|open| SyntaxError {
        kind:    SyntaxErrorKind::UnclosedOpener,
        line:    open.line,
        column:  open.column,
        message: format!("'{}' is never closed", open.text),
    }));
    errors
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// What a `{` opened, as far as statement termination is concerned.
enum BraceKind {
    /// a block of statements or a type body
    Block,
    /// the body of a `do ... while` loop
    DoBody,
    /// an array initializer
    Initializer,
    /// an enum body, whose constants are comma separated
    EnumBody,
}

/// Statement-level state kept for each open brace.
#[derive(Clone, Copy, Debug)]
struct Frame {
    /// what the brace opened
    kind:         BraceKind,
    /// open `(`/`[` inside this brace, at this level only
    parens:       u32,
    /// paren depth at which a control header started, if inside one
    header_paren: Option<u32>,
}

impl Frame {
    /// A fresh frame of the given kind.
    fn new(kind: BraceKind) -> Self {
        Self {
            kind,
            parens: 0,
            header_paren: None,
        }
    }
}

/// Keywords whose parenthesised part is a header rather than a statement.
fn is_header_keyword(t: &Token<'_>) -> bool {
    t.kind == TokenKind::Keyword
        && matches!(
            t.text,
            "if" | "for" | "while" | "switch" | "catch" | "synchronized" | "try"
        )
}

/// Whether a statement beginning with `first` is a declaration or label
/// header that never ends in `;`.
fn is_header_statement(first: &Token<'_>) -> bool {
    (first.kind == TokenKind::Keyword
        && matches!(first.text, "class" | "interface" | "enum" | "case" | "default"))
        || (first.is_ident() && matches!(first.text, "record" | "permits"))
}

/// Whether `t` can be the last token of a statement that lacks its `;`.
fn can_end_statement(t: &Token<'_>) -> bool {
    matches!(
        t.kind,
        TokenKind::Identifier | TokenKind::Literal | TokenKind::StringLiteral | TokenKind::CharLiteral
    ) || t.is(")")
        || t.is("]")
        || t.is("++")
        || t.is("--")
}

/// Whether `t` can begin a new statement or declaration.
fn starts_statement(t: &Token<'_>) -> bool {
    match t.kind {
        TokenKind::Identifier => true,
        TokenKind::Keyword => !matches!(t.text, "throws" | "extends" | "implements" | "instanceof"),
        _ => t.is("@"),
    }
}

/// Indices of tokens that end an annotation (`@Name`, `@a.b.Name(...)`).
fn annotation_ends(tokens: &[Token<'_>]) -> Vec<bool> {
    let mut ends = vec![false; tokens.len()];
    let mut i = 0;
    while i + 1 < tokens.len() {
        if !(tokens[i].is("@") && tokens[i + 1].is_ident()) {
            i += 1;
            continue;
        }
        let mut j = i + 1;
        while j + 2 < tokens.len() && tokens[j + 1].is(".") && tokens[j + 2].is_ident() {
            j += 2;
        }
        if j + 1 < tokens.len() && tokens[j + 1].is("(") {
            let mut depth = 0u32;
            let mut k = j + 1;
            while k < tokens.len() {
                if tokens[k].is("(") {
                    depth += 1;
                } else if tokens[k].is(")") {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                k += 1;
            }
            j = k.min(tokens.len() - 1);
        }
        ends[j] = true;
        i = j + 1;
    }
    ends
}

/// Shortens long token text for messages.
fn excerpt(text: &str) -> String {
    const MAX: usize = 24;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(MAX).collect::<String>())
    }
}

/// Finds lines that end a simple statement without `;`. A line qualifies when
/// its last token can end an expression, no parenthesis is open, the statement
/// is not a control or declaration header, and the next token (on a later line)
/// is `}` or starts another statement.
fn missing_semicolons(tokens: &[Token<'_>]) -> Vec<SyntaxError> {
    let annotation_end = annotation_ends(tokens);
    let mut findings = Vec::new();

    let mut frames = vec![Frame::new(BraceKind::Block)];
    let mut first: Option<Token<'_>> = None;
    let mut pending_header = false;
    let mut pending_enum = false;
    let mut pending_do = false;
    let mut after_do_body = false;
    let mut do_while = false;

    for (i, &t) in tokens.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| tokens[p]);
        let mut header_closed = false;

        if first.is_none() {
            first = Some(t);
        }

        match (t.kind, t.text) {
            (TokenKind::Separator, "{") => {
                let top = frames.last().map(|f| f.kind);
                let kind = if pending_enum {
                    BraceKind::EnumBody
                } else if pending_do {
                    BraceKind::DoBody
                } else if prev.is_some_and(|p| p.is("=") || p.is("]"))
                    || (top == Some(BraceKind::Initializer)
                        && prev.is_some_and(|p| p.is(",") || p.is("{")))
                {
                    BraceKind::Initializer
                } else {
                    BraceKind::Block
                };
                pending_enum = false;
                pending_do = false;
                pending_header = false;
                frames.push(Frame::new(kind));
                first = None;
            }
            (TokenKind::Separator, "}") => {
                let closed = if frames.len() > 1 { frames.pop() } else { None };
                after_do_body = closed.is_some_and(|f| f.kind == BraceKind::DoBody);
                first = None;
            }
            (TokenKind::Separator, ";") => {
                if frames.last().is_none_or(|f| f.header_paren.is_none()) {
                    first = None;
                }
            }
            (TokenKind::Separator, "(" | "[") => {
                if let Some(frame) = frames.last_mut() {
                    if pending_header && t.is("(") && frame.header_paren.is_none() {
                        frame.header_paren = Some(frame.parens);
                        pending_header = false;
                    }
                    frame.parens += 1;
                }
            }
            (TokenKind::Separator, ")" | "]") => {
                if let Some(frame) = frames.last_mut() {
                    frame.parens = frame.parens.saturating_sub(1);
                    if t.is(")") && frame.header_paren == Some(frame.parens) {
                        frame.header_paren = None;
                        header_closed = true;
                        first = None;
                    }
                }
            }
            (TokenKind::Separator, ":" | "->") => {
                let top_parens = frames.last().map_or(0, |f| f.parens);
                if top_parens == 0
                    && first.is_some_and(|f| f.is("case") || f.is("default"))
                {
                    first = None;
                }
            }
            (TokenKind::Keyword, "else" | "finally") => first = None,
            (TokenKind::Keyword, "do") => {
                pending_do = true;
                first = None;
            }
            (TokenKind::Keyword, "enum") => pending_enum = true,
            _ => {}
        }

        if is_header_keyword(&t) {
            do_while = t.is("while") && after_do_body;
            if t.is("try") {
                first = None;
            }
            pending_header = true;
        }
        if !t.is("}") {
            after_do_body = false;
        }

        let Some(next) = tokens.get(i + 1) else {
            continue;
        };
        if next.line <= t.line || !can_end_statement(&t) || annotation_end[i] {
            continue;
        }
        let Some(frame) = frames.last() else {
            continue;
        };
        if frame.parens > 0
            || frame.header_paren.is_some()
            || matches!(frame.kind, BraceKind::Initializer | BraceKind::EnumBody)
        {
            continue;
        }
        if header_closed && !do_while {
            continue;
        }
        if !header_closed && first.is_some_and(|f| is_header_statement(&f) || f.is("@")) {
            continue;
        }
        if !(next.is("}") || starts_statement(next)) {
            continue;
        }

        findings.push(SyntaxError {
            kind:    SyntaxErrorKind::MissingSemicolon,
            line:    t.line,
            column:  t.column + t.text.chars().count() as u32,
            message: format!("';' expected after '{}'", excerpt(t.text)),
        });
    }

    findings
}
