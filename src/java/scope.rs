#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    fmt,
};

use serde::{Deserialize, Serialize};

use crate::java::{
    lexer::{Token, TokenKind},
    parsers::Fact,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Where a variable was declared.
pub enum VariableRole {
    /// a field of a class, interface, enum or record
    Field,
    /// a local variable
    Local,
    /// a method, constructor or catch parameter
    Parameter,
    /// a variable declared in a `for` header
    LoopVariable,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// A declared variable.
pub struct Variable {
    /// variable name
    pub name:  String,
    /// declared type text
    pub ty:    String,
    /// line of the name
    pub line:  u32,
    /// brace depth of the name
    pub depth: u32,
    /// kind of declaration
    pub role:  VariableRole,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// A reference to a variable whose declaring block has already closed.
pub struct ScopeViolation {
    /// variable name
    pub name:          String,
    /// line of the out-of-scope reference
    pub line:          u32,
    /// line of the declaration that went out of scope
    pub declared_line: u32,
}

impl fmt::Display for ScopeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Variable `{}` is used on line {} outside the block that declares it (line {})",
            self.name, self.line, self.declared_line
        )
    }
}

/// Variables found by [`walk`] and the references that escaped their scope.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeReport {
    /// declarations in source order
    pub variables:  Vec<Variable>,
    /// out-of-scope references in source order
    pub violations: Vec<ScopeViolation>,
}

/// Lifecycle of a `for` statement's scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ForState {
    /// inside the parenthesised header
    Header,
    /// header closed, body not started
    AwaitBody,
    /// body is a block
    BlockBody,
    /// body is a single statement
    StatementBody,
}

/// What opened a scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScopeKind {
    /// a statement block, method body or lambda body
    Block,
    /// a class-like body
    TypeBody,
    /// a `for` statement; `parens` is the parenthesis depth outside its header
    For {
        /// lifecycle state
        state:  ForState,
        /// parenthesis depth just outside the header
        parens: u32,
    },
    /// an expression lambda body, which ends at the first `)`, `,` or `;`
    /// that closes its parenthesis depth
    Lambda {
        /// parenthesis depth at the arrow
        parens: u32,
    },
}

/// An open scope and the names declared directly in it.
#[derive(Clone, Debug)]
struct Scope {
    /// what opened the scope
    kind:  ScopeKind,
    /// `(name, line, role)` of each declaration
    names: Vec<(String, u32, VariableRole)>,
}

impl Scope {
    /// An empty scope.
    fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            names: Vec::new(),
        }
    }
}

/// A declaration discovered from the parsed facts, applied during the walk.
#[derive(Clone, Debug)]
struct Pending {
    /// variable name
    name:   String,
    /// declared type
    ty:     String,
    /// line of the name
    line:   u32,
    /// brace depth of the name
    depth:  u32,
    /// byte offset of the name
    offset: usize,
    /// declaration role, or `None` to infer it from the enclosing scope
    role:   Option<VariableRole>,
}

impl Pending {
    /// A pending declaration for a name token.
    fn new(name: &Token<'_>, ty: &str, role: Option<VariableRole>) -> Self {
        Self {
            name: name.text.to_string(),
            ty: ty.to_string(),
            line: name.line,
            depth: name.depth,
            offset: name.offset,
            role,
        }
    }
}

/// Finds the further declarators of a declaration whose first name ends just
/// before `from` (`int a = 1, b, c[] = {};`).
fn more_declarators<'a>(tokens: &[Token<'a>], from: usize) -> Vec<(usize, Token<'a>)> {
    let mut found = Vec::new();
    let mut nesting: i32 = 0;
    let mut i = from;
    while i < tokens.len() {
        let t = tokens[i];
        if t.is("(") || t.is("[") || t.is("{") {
            nesting += 1;
        } else if t.is(")") || t.is("]") || t.is("}") {
            nesting -= 1;
            if nesting < 0 {
                break;
            }
        } else if nesting == 0 && t.is(";") {
            break;
        } else if nesting == 0
            && t.is(",")
            && let Some(name) = tokens.get(i + 1).filter(|n| n.is_ident())
            && tokens
                .get(i + 2)
                .is_some_and(|n| n.is("=") || n.is(",") || n.is(";") || n.is("["))
        {
            found.push((i + 1, *name));
        }
        i += 1;
    }
    found
}

/// Finds the parameters of the lambda whose arrow is at `arrow`, as
/// `(token index, type)`. Switch `case` arrows have none.
fn lambda_params(tokens: &[Token<'_>], arrow: usize) -> Vec<(usize, String)> {
    let Some(before) = arrow.checked_sub(1) else {
        return Vec::new();
    };

    if tokens[before].is_ident() {
        let mut j = before;
        while j > 0 {
            j -= 1;
            let t = tokens[j];
            if t.is("case") || t.is("default") {
                return Vec::new();
            }
            let label_part = t.is_ident()
                || t.is(",")
                || t.is(".")
                || matches!(
                    t.kind,
                    TokenKind::Literal | TokenKind::StringLiteral | TokenKind::CharLiteral
                );
            if !label_part {
                break;
            }
        }
        return vec![(before, "var".to_string())];
    }

    if !tokens[before].is(")") {
        return Vec::new();
    }
    let mut nesting = 0;
    let mut open = None;
    for j in (0..before).rev() {
        let t = tokens[j];
        if t.is(")") {
            nesting += 1;
        } else if t.is("(") {
            if nesting == 0 {
                open = Some(j);
                break;
            }
            nesting -= 1;
        }
    }
    let Some(open) = open else {
        return Vec::new();
    };
    // `name(...) ->` is a call or a record pattern, not a parameter list
    if open > 0 && (tokens[open - 1].is_ident() || tokens[open - 1].is("case")) {
        return Vec::new();
    }

    let mut params = Vec::new();
    let mut angles = 0;
    let mut start = open + 1;
    for j in open + 1..=before {
        let t = tokens[j];
        if t.is("<") {
            angles += 1;
        } else if t.is(">") {
            angles -= 1;
        }
        if j == before || (angles == 0 && t.is(",")) {
            let segment = &tokens[start..j];
            if let Some((name, ty)) = segment.split_last()
                && name.is_ident()
            {
                let ty: String = ty
                    .iter()
                    .filter(|t| !t.is("final"))
                    .map(|t| t.text)
                    .collect();
                let ty = if ty.is_empty() { "var".to_string() } else { ty };
                params.push((j - 1, ty));
            }
            start = j + 1;
        }
    }
    params
}

/// Records a declaration in `scope` and in the report.
fn declare(scope: &mut Scope, report: &mut ScopeReport, p: Pending, role: VariableRole) {
    scope.names.push((p.name.clone(), p.line, role));
    report.variables.push(Variable {
        name: p.name,
        ty: p.ty,
        line: p.line,
        depth: p.depth,
        role,
    });
}

/// Whether the `{` at `brace` starts an anonymous class body, given the index
/// of the `(` matching the `)` just before it.
fn is_anonymous_body(tokens: &[Token<'_>], open_paren: usize) -> bool {
    let mut j = open_paren;
    while j > 0 {
        j -= 1;
        let t = tokens[j];
        if t.is("new") {
            return true;
        }
        let type_token = t.is_ident()
            || (t.kind == TokenKind::Separator
                && matches!(t.text, "." | "<" | ">" | "," | "?" | "[" | "]"));
        if !type_token {
            return false;
        }
    }
    false
}

/// Walks significant tokens with the facts parsed from them, tracking which
/// variables are visible at each point. Fields never go out of scope.
pub fn walk(tokens: &[Token<'_>], facts: &[Fact<'_>]) -> ScopeReport {
    let index_of: HashMap<usize, usize> = tokens
        .iter()
        .enumerate()
        .map(|(i, t)| (t.offset, i))
        .collect();

    let mut declared_at: HashMap<usize, Pending> = HashMap::new();
    let mut params_at: HashMap<usize, Vec<Pending>> = HashMap::new();

    for fact in facts {
        match fact {
            Fact::Declaration { ty, name, end } => {
                if let Some(&i) = index_of.get(&name.offset) {
                    declared_at.insert(i, Pending::new(name, ty, None));
                }
                for (i, extra) in more_declarators(tokens, *end) {
                    declared_at.insert(i, Pending::new(&extra, ty, None));
                }
            }
            Fact::ForEach { ty, name } => {
                if let Some(&i) = index_of.get(&name.offset) {
                    declared_at.insert(i, Pending::new(name, ty, Some(VariableRole::LoopVariable)));
                }
            }
            Fact::Method { head, end } => {
                params_at.insert(
                    *end,
                    head.params
                        .iter()
                        .map(|p| Pending::new(&p.name, &p.ty, Some(VariableRole::Parameter)))
                        .collect(),
                );
            }
            Fact::Constructor { params, end } => {
                params_at.insert(
                    *end,
                    params
                        .iter()
                        .map(|p| Pending::new(&p.name, &p.ty, Some(VariableRole::Parameter)))
                        .collect(),
                );
            }
            Fact::Record { params, end } => {
                params_at.insert(
                    *end,
                    params
                        .iter()
                        .map(|p| Pending::new(&p.name, &p.ty, Some(VariableRole::Field)))
                        .collect(),
                );
            }
            Fact::Catch { types, name, end } => {
                let ty = types.join("|");
                params_at.insert(*end, vec![Pending::new(name, &ty, Some(VariableRole::Parameter))]);
            }
        }
    }

    let mut lambdas_at: HashMap<usize, Vec<Pending>> = HashMap::new();
    for arrow in (0..tokens.len()).filter(|&i| tokens[i].is("->")) {
        let params = lambda_params(tokens, arrow);
        if params.is_empty() {
            continue;
        }
        for (i, _) in &params {
            declared_at.remove(i);
        }
        lambdas_at.insert(
            arrow,
            params
                .into_iter()
                .map(|(i, ty)| Pending::new(&tokens[i], &ty, Some(VariableRole::Parameter)))
                .collect(),
        );
    }

    let declaration_sites: HashSet<usize> = declared_at
        .keys()
        .copied()
        .chain(
            params_at
                .values()
                .chain(lambdas_at.values())
                .flatten()
                .filter_map(|p| index_of.get(&p.offset).copied()),
        )
        .collect();

    let mut report = ScopeReport::default();
    let mut scopes = vec![Scope::new(ScopeKind::TypeBody)];
    let mut expired: HashMap<String, u32> = HashMap::new();
    let mut reported: BTreeSet<(u32, String)> = BTreeSet::new();
    let mut pending_params: Vec<Pending> = Vec::new();
    let mut pending_type_body = false;
    let mut open_parens: Vec<usize> = Vec::new();
    let mut last_closed_paren: Option<usize> = None;

    let close_scope = |scope: Scope, expired: &mut HashMap<String, u32>| {
        for (name, line, role) in scope.names {
            if role != VariableRole::Field {
                expired.insert(name, line);
            }
        }
    };
    let close_lambdas = |scopes: &mut Vec<Scope>,
                         expired: &mut HashMap<String, u32>,
                         ends: &dyn Fn(u32) -> bool| {
        while let Some(ScopeKind::Lambda { parens }) = scopes.last().map(|s| s.kind) {
            if !ends(parens) {
                break;
            }
            if let Some(scope) = scopes.pop() {
                close_scope(scope, expired);
            }
        }
    };

    for (i, &t) in tokens.iter().enumerate() {
        if let Some(params) = params_at.remove(&i) {
            pending_params = params;
        }
        if let Some(params) = lambdas_at.remove(&i) {
            if tokens.get(i + 1).is_some_and(|n| n.is("{")) {
                pending_params = params;
            } else {
                let mut scope = Scope::new(ScopeKind::Lambda {
                    parens: open_parens.len() as u32,
                });
                for p in params {
                    declare(&mut scope, &mut report, p, VariableRole::Parameter);
                }
                scopes.push(scope);
            }
        }

        if let Some(ScopeKind::For {
            state: ForState::AwaitBody,
            parens,
        }) = scopes.last().map(|s| s.kind)
            && let Some(top) = scopes.last_mut()
        {
            let state = if t.is("{") {
                ForState::BlockBody
            } else {
                ForState::StatementBody
            };
            top.kind = ScopeKind::For { state, parens };
        }

        match (t.kind, t.text) {
            (TokenKind::Keyword, "class" | "interface" | "enum") => pending_type_body = true,
            (TokenKind::Identifier, "record")
                if tokens.get(i + 1).is_some_and(|n| n.is_ident()) =>
            {
                pending_type_body = true
            }
            (TokenKind::Keyword, "for") => scopes.push(Scope::new(ScopeKind::For {
                state:  ForState::Header,
                parens: open_parens.len() as u32,
            })),
            (TokenKind::Separator, "(") => open_parens.push(i),
            (TokenKind::Separator, ")") => {
                last_closed_paren = open_parens.pop();
                let depth = open_parens.len() as u32;
                close_lambdas(&mut scopes, &mut expired, &|parens: u32| parens > depth);
                if let Some(top) = scopes.last_mut()
                    && top.kind
                        == (ScopeKind::For {
                            state:  ForState::Header,
                            parens: depth,
                        })
                {
                    top.kind = ScopeKind::For {
                        state:  ForState::AwaitBody,
                        parens: depth,
                    };
                }
            }
            (TokenKind::Separator, "{") => {
                let anonymous = i > 0
                    && tokens[i - 1].is(")")
                    && last_closed_paren.is_some_and(|open| is_anonymous_body(tokens, open));
                let kind = if pending_type_body || anonymous {
                    ScopeKind::TypeBody
                } else {
                    ScopeKind::Block
                };
                pending_type_body = false;
                let mut scope = Scope::new(kind);
                for p in pending_params.drain(..) {
                    let role = p.role.unwrap_or(VariableRole::Local);
                    declare(&mut scope, &mut report, p, role);
                }
                scopes.push(scope);
            }
            (TokenKind::Separator, "}") => {
                while let Some(scope) = scopes.pop() {
                    let braced = matches!(scope.kind, ScopeKind::Block | ScopeKind::TypeBody);
                    close_scope(scope, &mut expired);
                    if braced {
                        break;
                    }
                }
                if scopes.is_empty() {
                    scopes.push(Scope::new(ScopeKind::TypeBody));
                }
                let outside = open_parens.len() as u32;
                while let Some(ScopeKind::For { state, parens }) = scopes.last().map(|s| s.kind) {
                    let ends = match state {
                        ForState::BlockBody => true,
                        ForState::StatementBody => {
                            parens == outside && !tokens.get(i + 1).is_some_and(|n| n.is("else"))
                        }
                        _ => false,
                    };
                    if !ends {
                        break;
                    }
                    if let Some(scope) = scopes.pop() {
                        close_scope(scope, &mut expired);
                    }
                }
            }
            (TokenKind::Separator, ",") => {
                let outside = open_parens.len() as u32;
                close_lambdas(&mut scopes, &mut expired, &|parens: u32| parens == outside);
            }
            (TokenKind::Separator, ";") => {
                pending_params.clear();
                let outside = open_parens.len() as u32;
                close_lambdas(&mut scopes, &mut expired, &|parens: u32| parens == outside);
                while let Some(ScopeKind::For {
                    state: ForState::StatementBody,
                    parens,
                }) = scopes.last().map(|s| s.kind)
                {
                    if parens != outside {
                        break;
                    }
                    if let Some(scope) = scopes.pop() {
                        close_scope(scope, &mut expired);
                    }
                }
            }
            _ => {}
        }

        if let Some(p) = declared_at.remove(&i) {
            let role = p.role.unwrap_or(match scopes.last().map(|s| s.kind) {
                Some(ScopeKind::TypeBody) => VariableRole::Field,
                Some(ScopeKind::For { .. }) => VariableRole::LoopVariable,
                _ => VariableRole::Local,
            });
            if let Some(top) = scopes.last_mut() {
                top.names.push((p.name.clone(), p.line, role));
            }
            report.variables.push(Variable {
                name: p.name,
                ty: p.ty,
                line: p.line,
                depth: p.depth,
                role,
            });
            continue;
        }

        if t.kind != TokenKind::Identifier || declaration_sites.contains(&i) {
            continue;
        }
        let prev = i.checked_sub(1).map(|p| tokens[p]);
        let next = tokens.get(i + 1);
        let is_member = prev.is_some_and(|p| {
            p.is(".") || p.is("::") || p.is("@") || p.is("break") || p.is("continue")
        });
        let is_call_or_type = next.is_some_and(|n| n.is("(") || n.is_ident());
        if is_member || is_call_or_type {
            continue;
        }

        let live = scopes
            .iter()
            .any(|s| s.names.iter().any(|(name, ..)| name == t.text));
        if live {
            continue;
        }
        if let Some(&declared_line) = expired.get(t.text)
            && reported.insert((t.line, t.text.to_string()))
        {
            report.violations.push(ScopeViolation {
                name: t.text.to_string(),
                line: t.line,
                declared_line,
            });
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java::{lexer::tokenize, parsers::structure};

    fn report(src: &str) -> ScopeReport {
        let lexed = tokenize(src);
        let tokens = lexed.significant();
        let facts = structure::facts(&tokens).unwrap_or_default();
        walk(&tokens, &facts)
    }

    #[test]
    fn roles_are_assigned() {
        let r = report(
            "class A {\n int total;\n void f(int n) {\n  int x = 1, y;\n  for (int i = 0; i < n; i++) {}\n  for (String s : list) {}\n  try {} catch (Exception e) {}\n }\n}",
        );
        let roles: Vec<(&str, VariableRole)> = r
            .variables
            .iter()
            .map(|v| (v.name.as_str(), v.role))
            .collect();
        assert_eq!(
            roles,
            vec![
                ("total", VariableRole::Field),
                ("n", VariableRole::Parameter),
                ("x", VariableRole::Local),
                ("y", VariableRole::Local),
                ("i", VariableRole::LoopVariable),
                ("s", VariableRole::LoopVariable),
                ("e", VariableRole::Parameter),
            ]
        );
        assert!(r.violations.is_empty());
    }

    #[test]
    fn reference_after_block_closes_is_reported() {
        let r = report(
            "class A {\n void f() {\n  if (true) {\n   int tmp = 1;\n  }\n  System.out.println(tmp);\n }\n}",
        );
        assert_eq!(
            r.violations,
            vec![ScopeViolation {
                name:          "tmp".to_string(),
                line:          6,
                declared_line: 4,
            }]
        );
    }

    #[test]
    fn loop_variable_used_after_loop() {
        let r = report(
            "class A {\n int f() {\n  for (int i = 0; i < 3; i++)\n   g(i);\n  return i;\n }\n}",
        );
        assert_eq!(r.violations.len(), 1);
        assert_eq!(r.violations[0].name, "i");
        assert_eq!(r.violations[0].line, 5);
    }

    #[test]
    fn redeclaration_and_fields_are_fine() {
        let r = report(
            "class A {\n int count;\n void f() {\n  { int k = 0; }\n  int k = 2;\n  k++;\n  count++;\n }\n void g() { count = 1; }\n}",
        );
        assert!(r.violations.is_empty());
    }

    #[test]
    fn parameters_expire_with_their_method() {
        let r = report("class A {\n void f(int a) { a++; }\n void g() { a = 2; }\n}");
        assert_eq!(r.violations.len(), 1);
        assert_eq!(r.violations[0].line, 3);
    }

    #[test]
    fn lambda_parameters_are_declared() {
        let r = report(
            "class A {\n void a() { for (int i = 0; i < 3; i++) {} }\n void b() {\n  IntUnaryOperator f = i -> i + 1;\n  BinaryOperator<Integer> g = (x, y) -> x + y;\n  BiFunction<Integer, Integer, Integer> h = (Integer p, final Integer q) -> { return p * q; };\n  list.forEach(e -> System.out.println(e));\n }\n}",
        );
        assert!(r.violations.is_empty(), "{:?}", r.violations);
        let lambda: Vec<(&str, &str)> = r
            .variables
            .iter()
            .filter(|v| v.role == VariableRole::Parameter)
            .map(|v| (v.name.as_str(), v.ty.as_str()))
            .collect();
        assert_eq!(lambda, vec![
            ("i", "var"),
            ("x", "var"),
            ("y", "var"),
            ("p", "Integer"),
            ("q", "Integer"),
            ("e", "var"),
        ]);
    }

    #[test]
    fn lambda_parameters_expire_with_the_lambda() {
        let r = report(
            "class A {\n int f() {\n  IntUnaryOperator g = n -> n * 2;\n  call(m -> m, 3);\n  return n + m;\n }\n}",
        );
        let names: Vec<(&str, u32)> = r.violations.iter().map(|v| (v.name.as_str(), v.line)).collect();
        assert_eq!(names, vec![("n", 5), ("m", 5)]);
    }

    #[test]
    fn switch_arrows_declare_nothing() {
        let r = report(
            "class A {\n int f(int k) {\n  return switch (k) { case ONE, TWO -> 1; default -> 0; };\n }\n}",
        );
        assert!(r.variables.iter().all(|v| v.name == "k"));
        assert!(r.violations.is_empty());
    }
}
