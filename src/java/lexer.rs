#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::java::syntax::{SyntaxError, SyntaxErrorKind};

/// Java reserved words. `true`, `false` and `null` are literals and the
/// contextual words (`var`, `record`, `yield`, ...) lex as identifiers.
const KEYWORDS: &[&str] = &[
    "abstract",
    "assert",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extends",
    "final",
    "finally",
    "float",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "try",
    "void",
    "volatile",
    "while",
];

/// Operator lexemes, longest first so the scanner can apply maximal munch.
pub const OPERATORS: &[&str] = &[
    ">>>=", ">>>", "<<=", ">>=", "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=", "-=",
    "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "+", "-", "*", "/", "%", "<", ">", "!", "&",
    "|", "^", "~",
];

/// Structural punctuation, longest first.
const SEPARATORS: &[&str] = &[
    "...", "->", "::", "(", ")", "{", "}", "[", "]", ";", ",", ".", "@", "=", "?", ":",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Lexical class of a token.
pub enum TokenKind {
    /// A name: variables, types, methods, contextual keywords.
    Identifier,
    /// A reserved word.
    Keyword,
    /// An operator tracked by the allowed-operator rule.
    Operator,
    /// Brackets, delimiters and structural punctuation.
    Separator,
    /// Numeric literals and `true`/`false`/`null`.
    Literal,
    /// String literals and text blocks, quotes included.
    StringLiteral,
    /// Character literals, quotes included.
    CharLiteral,
    /// Line, block and doc comments.
    Comment,
}

impl TokenKind {
    /// Whether tokens of this kind take part in structural matching.
    pub fn is_significant(self) -> bool {
        !matches!(self, TokenKind::Comment)
    }

    /// Whether the content of tokens of this kind is opaque text.
    pub fn is_text(self) -> bool {
        matches!(self, TokenKind::StringLiteral | TokenKind::CharLiteral | TokenKind::Comment)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::Operator => "operator",
            TokenKind::Separator => "separator",
            TokenKind::Literal => "literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::CharLiteral => "char literal",
            TokenKind::Comment => "comment",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// A classified lexeme borrowed from the source text.
pub struct Token<'a> {
    /// lexical class
    pub kind:   TokenKind,
    /// the exact source text of the token
    pub text:   &'a str,
    /// 1-based line of the first character
    pub line:   u32,
    /// 1-based column (in characters) of the first character
    pub column: u32,
    /// byte offset of the first character
    pub offset: usize,
    /// brace depth; a `}` carries the depth of the block it closes
    pub depth:  u32,
}

impl<'a> Token<'a> {
    /// True if the token text is exactly `s`. Literal and comment tokens never
    /// compare equal to punctuation or keywords.
    pub fn is(&self, s: &str) -> bool {
        !self.kind.is_text() && self.text == s
    }

    /// True for identifiers.
    pub fn is_ident(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    /// True for primitive type keywords and `void`.
    pub fn is_primitive(&self) -> bool {
        self.kind == TokenKind::Keyword
            && matches!(
                self.text,
                "boolean" | "byte" | "char" | "short" | "int" | "long" | "float" | "double" | "void"
            )
    }

    /// True for declaration modifiers.
    pub fn is_modifier(&self) -> bool {
        self.kind == TokenKind::Keyword
            && matches!(
                self.text,
                "public"
                    | "protected"
                    | "private"
                    | "static"
                    | "final"
                    | "abstract"
                    | "native"
                    | "synchronized"
                    | "transient"
                    | "volatile"
                    | "strictfp"
                    | "default"
            )
    }

    /// Byte offset one past the last character.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

/// Output of the tokenizer: every lexeme, comments included, plus the lexical
/// errors met on the way.
#[derive(Debug, Clone, Default)]
pub struct Lexed<'a> {
    /// all tokens in source order
    pub tokens: Vec<Token<'a>>,
    /// unterminated literals/comments and stray characters
    pub errors: Vec<SyntaxError>,
}

impl<'a> Lexed<'a> {
    /// Tokens that take part in structural analysis (comments dropped).
    pub fn significant(&self) -> Vec<Token<'a>> {
        self.tokens
            .iter()
            .copied()
            .filter(|t| t.kind.is_significant())
            .collect()
    }
}

/// Splits Java source text into classified tokens.
pub fn tokenize(source: &str) -> Lexed<'_> {
    let mut lexed = Scanner::new(source).run();
    lexed.tokens = mark_type_arguments(lexed.tokens);
    mark_catch_unions(&mut lexed.tokens);
    lexed
}

/// Reclassifies the angle brackets (and `&` bounds) of type argument and type
/// parameter lists as separators, splitting `>>`/`>>>` closers into single `>`
/// tokens. A `<` qualifies when it follows a name, a `.` or a modifier and the
/// tokens up to its balanced closer can only form a type.
fn mark_type_arguments(tokens: Vec<Token<'_>>) -> Vec<Token<'_>> {
    let significant: Vec<usize> = (0..tokens.len())
        .filter(|&i| tokens[i].kind.is_significant())
        .collect();
    let mut in_type = vec![false; tokens.len()];

    let mut k = 0;
    while k < significant.len() {
        let i = significant[k];
        let opens = tokens[i].kind == TokenKind::Operator
            && tokens[i].text == "<"
            && k > 0
            && {
                let prev = tokens[significant[k - 1]];
                prev.is_ident() || prev.is(".") || prev.is_modifier()
            };

        match opens.then(|| type_argument_end(&tokens, &significant, k)).flatten() {
            Some(end) => {
                for &j in &significant[k..=end] {
                    in_type[j] = true;
                }
                k = end + 1;
            }
            None => k += 1,
        }
    }

    let mut out = Vec::with_capacity(tokens.len());
    for (i, token) in tokens.into_iter().enumerate() {
        if !in_type[i] || token.kind != TokenKind::Operator {
            out.push(token);
            continue;
        }
        if token.text.bytes().all(|b| b == b'>') {
            for n in 0..token.text.len() {
                out.push(Token {
                    kind: TokenKind::Separator,
                    text: &token.text[n..n + 1],
                    column: token.column + n as u32,
                    offset: token.offset + n,
                    ..token
                });
            }
        } else {
            out.push(Token {
                kind: TokenKind::Separator,
                ..token
            });
        }
    }
    out
}

/// Position (in `significant`) of the closer balancing the `<` at position
/// `start`, if everything in between is type syntax.
fn type_argument_end(tokens: &[Token<'_>], significant: &[usize], start: usize) -> Option<usize> {
    let mut depth: i32 = 0;
    for (k, &i) in significant.iter().enumerate().skip(start) {
        let t = tokens[i];
        match (t.kind, t.text) {
            (TokenKind::Operator, "<") => depth += 1,
            (TokenKind::Operator, closer) if closer.bytes().all(|b| b == b'>') => {
                depth -= closer.len() as i32;
                if depth == 0 {
                    return Some(k);
                }
                if depth < 0 {
                    return None;
                }
            }
            (TokenKind::Operator, "&") => {}
            (TokenKind::Identifier, _) => {}
            (TokenKind::Keyword, "extends" | "super") => {}
            (TokenKind::Keyword, _) if t.is_primitive() => {}
            (TokenKind::Separator, "." | "," | "?" | "[" | "]" | "@") => {}
            _ => return None,
        }
    }
    None
}

/// Marks the `|` between the alternatives of a multi-catch as a separator.
fn mark_catch_unions(tokens: &mut [Token<'_>]) {
    let mut i = 0;
    while i < tokens.len() {
        if !(tokens[i].kind == TokenKind::Keyword && tokens[i].text == "catch") {
            i += 1;
            continue;
        }
        let mut depth = 0u32;
        let mut j = i + 1;
        while j < tokens.len() {
            let t = tokens[j];
            if t.is("(") {
                depth += 1;
            } else if t.is(")") {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            } else if depth == 1 && t.kind == TokenKind::Operator && t.text == "|" {
                tokens[j].kind = TokenKind::Separator;
            } else if depth == 0 && t.kind.is_significant() {
                break;
            }
            j += 1;
        }
        i = j.max(i + 1);
    }
}

/// Cursor over the source bytes that tracks line/column/depth.
struct Scanner<'a> {
    /// the full source
    src:    &'a str,
    /// current byte offset
    pos:    usize,
    /// current 1-based line
    line:   u32,
    /// current 1-based column
    column: u32,
    /// current brace depth
    depth:  u32,
    /// accumulated output
    out:    Lexed<'a>,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner at the start of `src`.
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            depth: 0,
            out: Lexed::default(),
        }
    }

    /// Character at the cursor.
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    /// Character `n` characters past the cursor.
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    /// Advances over one character, keeping line/column in sync.
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Advances while `pred` holds.
    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.bump();
        }
    }

    /// Records a lexical error.
    fn error(&mut self, kind: SyntaxErrorKind, line: u32, column: u32, message: String) {
        self.out.errors.push(SyntaxError {
            kind,
            line,
            column,
            message,
        });
    }

    /// Scans the whole input.
    fn run(mut self) -> Lexed<'a> {
        while let Some(c) = self.peek() {
            let (start, line, column) = (self.pos, self.line, self.column);

            let kind = if c.is_whitespace() {
                self.bump();
                continue;
            } else if c == '/' && self.peek_nth(1) == Some('/') {
                self.bump_while(|c| c != '\n');
                TokenKind::Comment
            } else if c == '/' && self.peek_nth(1) == Some('*') {
                self.block_comment(line, column);
                TokenKind::Comment
            } else if c == '"' {
                self.string(line, column);
                TokenKind::StringLiteral
            } else if c == '\'' {
                self.char_literal(line, column);
                TokenKind::CharLiteral
            } else if c.is_ascii_digit()
                || (c == '.' && self.peek_nth(1).is_some_and(|n| n.is_ascii_digit()))
            {
                self.number();
                TokenKind::Literal
            } else if is_ident_start(c) {
                self.bump_while(is_ident_part);
                match &self.src[start..self.pos] {
                    "true" | "false" | "null" => TokenKind::Literal,
                    word if KEYWORDS.contains(&word) => TokenKind::Keyword,
                    _ => TokenKind::Identifier,
                }
            } else if let Some(op) = self.longest(SEPARATORS).or_else(|| self.longest(OPERATORS)) {
                // `=` is shorter than `==`, so operators are tried first where
                // they overlap with separators.
                let op = match self.longest(OPERATORS) {
                    Some(longer) if longer.len() > op.len() => longer,
                    _ => op,
                };
                for _ in 0..op.chars().count() {
                    self.bump();
                }
                if OPERATORS.contains(&op) {
                    TokenKind::Operator
                } else {
                    TokenKind::Separator
                }
            } else {
                self.bump();
                self.error(
                    SyntaxErrorKind::UnexpectedCharacter,
                    line,
                    column,
                    format!("unexpected character '{c}'"),
                );
                continue;
            };

            let text = &self.src[start..self.pos];
            let depth = match text {
                "}" if kind == TokenKind::Separator => {
                    self.depth = self.depth.saturating_sub(1);
                    self.depth + 1
                }
                "{" if kind == TokenKind::Separator => {
                    self.depth += 1;
                    self.depth - 1
                }
                _ => self.depth,
            };

            self.out.tokens.push(Token {
                kind,
                text,
                line,
                column,
                offset: start,
                depth,
            });
        }

        self.out
    }

    /// Longest entry of `table` that the input starts with at the cursor.
    fn longest(&self, table: &[&'static str]) -> Option<&'static str> {
        let rest = &self.src[self.pos..];
        table
            .iter()
            .copied()
            .filter(|candidate| rest.starts_with(candidate))
            .max_by_key(|candidate| candidate.len())
    }

    /// Scans a `/* ... */` comment.
    fn block_comment(&mut self, line: u32, column: u32) {
        self.bump();
        self.bump();
        loop {
            match self.peek() {
                Some('*') if self.peek_nth(1) == Some('/') => {
                    self.bump();
                    self.bump();
                    return;
                }
                Some(_) => {
                    self.bump();
                }
                None => {
                    self.error(
                        SyntaxErrorKind::UnterminatedComment,
                        line,
                        column,
                        "unterminated block comment".to_string(),
                    );
                    return;
                }
            }
        }
    }

    /// Scans a string literal or a `"""` text block.
    fn string(&mut self, line: u32, column: u32) {
        if self.src[self.pos..].starts_with("\"\"\"") {
            for _ in 0..3 {
                self.bump();
            }
            loop {
                if self.src[self.pos..].starts_with("\"\"\"") {
                    for _ in 0..3 {
                        self.bump();
                    }
                    return;
                }
                match self.bump() {
                    Some('\\') => {
                        self.bump();
                    }
                    Some(_) => {}
                    None => {
                        self.error(
                            SyntaxErrorKind::UnterminatedString,
                            line,
                            column,
                            "unterminated text block".to_string(),
                        );
                        return;
                    }
                }
            }
        }

        self.bump();
        self.quoted('"', line, column, SyntaxErrorKind::UnterminatedString, "string literal");
    }

    /// Scans a character literal.
    fn char_literal(&mut self, line: u32, column: u32) {
        self.bump();
        self.quoted('\'', line, column, SyntaxErrorKind::UnterminatedChar, "character literal");
    }

    /// Scans up to the closing `quote` on the same line, honouring escapes.
    fn quoted(&mut self, quote: char, line: u32, column: u32, kind: SyntaxErrorKind, what: &str) {
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    self.bump();
                    return;
                }
                Some('\\') => {
                    self.bump();
                    if self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                Some('\n') | None => {
                    self.error(kind, line, column, format!("unterminated {what}"));
                    return;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// Scans a numeric literal: decimal, hex, octal, binary, floating point,
    /// underscores and type suffixes.
    fn number(&mut self) {
        let hex = self.src[self.pos..].starts_with("0x") || self.src[self.pos..].starts_with("0X");
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_alphanumeric() || c == '_' => {
                    self.bump();
                    let exponent = if hex { matches!(c, 'p' | 'P') } else { matches!(c, 'e' | 'E') };
                    if exponent
                        && matches!(self.peek(), Some('+' | '-'))
                        && self.peek_nth(1).is_some_and(|n| n.is_ascii_digit())
                    {
                        self.bump();
                    }
                }
                Some('.') if self.peek_nth(1).is_some_and(|n| n.is_ascii_digit()) => {
                    self.bump();
                }
                _ => break,
            }
        }
    }
}

/// Java identifier start characters.
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

/// Java identifier part characters.
fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Returns `source` with every comment blanked and the content of string and
/// character literals blanked (their delimiters stay). Line breaks are kept, so
/// a byte offset in the result maps to the same line as in `source`.
pub fn cleaned_source(source: &str, tokens: &[Token<'_>]) -> String {
    let mut cleaned = String::with_capacity(source.len());
    let mut cursor = 0;

    for token in tokens.iter().filter(|t| t.kind.is_text()) {
        if token.offset < cursor {
            continue;
        }
        cleaned.push_str(&source[cursor..token.offset]);

        let text = token.text;
        let (open, close) = match token.kind {
            TokenKind::StringLiteral if text.starts_with("\"\"\"") => {
                (3, if text.len() >= 6 && text.ends_with("\"\"\"") { 3 } else { 0 })
            }
            TokenKind::StringLiteral => (1, usize::from(text.len() >= 2 && text.ends_with('"'))),
            TokenKind::CharLiteral => (1, usize::from(text.len() >= 2 && text.ends_with('\''))),
            _ => (0, 0),
        };

        let body_end = token.text.len() - close;
        cleaned.push_str(&token.text[..open.min(body_end)]);
        cleaned.extend(
            token.text[open.min(body_end)..body_end]
                .chars()
                .map(|c| if c == '\n' { '\n' } else { ' ' }),
        );
        cleaned.push_str(&token.text[body_end..]);
        cursor = token.end();
    }

    cleaned.push_str(&source[cursor..]);
    cleaned
}

/// 1-based line number of byte `offset` in `text`.
pub fn line_of(text: &str, offset: usize) -> u32 {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() as u32 + 1
}
