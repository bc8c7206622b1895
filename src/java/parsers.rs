#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::java::lexer::Token;

/// A formal parameter: its normalised type and its name token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param<'a> {
    /// type text, whitespace-free (`List<String>`, `int[]`, `int...`)
    pub ty:   String,
    /// the parameter name
    pub name: Token<'a>,
}

/// A method header as written in source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodHead<'a> {
    /// modifiers in source order (annotations dropped)
    pub modifiers:   Vec<&'a str>,
    /// return type text
    pub return_type: String,
    /// method name
    pub name:        Token<'a>,
    /// formal parameters
    pub params:      Vec<Param<'a>>,
}

/// A declaration-level fact recognised in the token stream. Every `end` is the
/// token index just past the construct's closing `)` (or its name, for
/// variables).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fact<'a> {
    /// a method with a return type
    Method {
        /// the parsed header
        head: MethodHead<'a>,
        /// index after the parameter list
        end:  usize,
    },
    /// a constructor (or an anonymous class instantiation)
    Constructor {
        /// formal parameters
        params: Vec<Param<'a>>,
        /// index after the parameter list
        end:    usize,
    },
    /// a record header, whose components behave as fields
    Record {
        /// record components
        params: Vec<Param<'a>>,
        /// index after the component list
        end:    usize,
    },
    /// a catch clause with every alternative of a multi-catch
    Catch {
        /// caught types
        types: Vec<String>,
        /// the exception parameter
        name:  Token<'a>,
        /// index after the closing parenthesis
        end:   usize,
    },
    /// the variable of an enhanced `for`
    ForEach {
        /// declared type
        ty:   String,
        /// variable name
        name: Token<'a>,
    },
    /// the first declarator of a field or local variable declaration
    Declaration {
        /// declared type, including C-style dimensions
        ty:   String,
        /// variable name
        name: Token<'a>,
        /// index after the name and its dimensions
        end:  usize,
    },
}

/// Concatenates token texts without whitespace.
fn text(tokens: &[Token<'_>]) -> String {
    tokens.iter().map(|t| t.text).collect()
}

peg::parser! {
    /// recognises declaration-level structure in a stream of significant Java
    /// tokens; everything it does not recognise is skipped one token at a time.
    pub grammar structure<'a>() for [Token<'a>] {
        /// matches a token with exactly this text
        rule tok(s: &'static str) -> Token<'a>
            = [t] {? if t.is(s) { Ok(t) } else { Err(s) } }

        /// matches any identifier
        rule ident() -> Token<'a>
            = [t] {? if t.is_ident() { Ok(t) } else { Err("identifier") } }

        /// matches a contextual keyword that lexes as an identifier
        rule named(s: &'static str) -> Token<'a>
            = [t] {? if t.is_ident() && t.text == s { Ok(t) } else { Err(s) } }

        /// matches a primitive type or `void`
        rule primitive() -> Token<'a>
            = [t] {? if t.is_primitive() { Ok(t) } else { Err("primitive type") } }

        /// matches a declaration modifier
        rule modifier() -> Token<'a>
            = [t] {? if t.is_modifier() { Ok(t) } else { Err("modifier") } }

        /// matches any token but a parenthesis
        rule not_paren()
            = [t] {? if t.is("(") || t.is(")") { Err("not a parenthesis") } else { Ok(()) } }

        /// matches a balanced run of tokens
        rule balanced()
            = (tok("(") balanced() tok(")") / not_paren())*

        /// matches `@Name`, `@a.b.Name` and `@Name(...)`
        rule annotation()
            = tok("@") (ident() ++ tok(".")) (tok("(") balanced() tok(")"))?

        /// matches modifiers and annotations, keeping the modifiers
        rule prefix() -> Vec<&'a str>
            = m:(m:modifier() { Some(m.text) } / annotation() { None })*
            { m.into_iter().flatten().collect() }

        /// matches array dimensions
        rule dims()
            = (tok("[") tok("]"))*

        /// matches a type argument list, diamond included
        rule type_args()
            = tok("<") (type_arg() ** tok(",")) tok(">")

        /// matches a single type argument or wildcard
        rule type_arg()
            = annotation()* (tok("?") ((tok("extends") / tok("super")) type_())? / type_())

        /// matches a primitive or (qualified, parameterised) class type
        rule base_type()
            = primitive() / ident() type_args()? (tok(".") ident() type_args()?)*

        /// matches a type and returns its whitespace-free text
        pub rule type_() -> String
            = annotation()* t:$(base_type() dims()) { text(t) }

        /// matches a generic method's type parameter list
        rule type_params()
            = tok("<") (annotation()* ident() (tok("extends") (type_() ++ tok("&")))?) ++ tok(",") tok(">")

        /// matches one formal parameter
        rule param() -> Param<'a>
            = prefix() ty:type_() va:tok("...")? name:ident() d:$(dims())
            {
                let mut ty = ty;
                ty.push_str(&"[]".repeat(d.len() / 2));
                if va.is_some() {
                    ty.push_str("...");
                }
                Param { ty, name }
            }

        /// matches a parenthesised parameter list
        rule params() -> Vec<Param<'a>>
            = tok("(") p:(param() ** tok(",")) tok(")") { p }

        /// matches a record header
        rule record() -> Fact<'a>
            = prefix() named("record") ident() type_params()? params:params() end:position!()
            { Fact::Record { params, end } }

        /// matches a method header followed by its body, `;` or `throws`
        rule method() -> Fact<'a>
            = modifiers:prefix() type_params()? return_type:type_() name:ident() params:params()
              dims() end:position!() &(tok("{") / tok(";") / tok("throws") / tok("default"))
            {
                Fact::Method {
                    head: MethodHead { modifiers, return_type, name, params },
                    end,
                }
            }

        /// matches a constructor header followed by its body or `throws`
        rule constructor() -> Fact<'a>
            = prefix() type_params()? ident() params:params() end:position!()
              &(tok("{") / tok("throws"))
            { Fact::Constructor { params, end } }

        /// matches a catch clause header
        rule catch_clause() -> Fact<'a>
            = tok("catch") tok("(") prefix() types:(type_() ++ tok("|")) name:ident() tok(")")
              end:position!()
            { Fact::Catch { types, name, end } }

        /// matches the header of an enhanced for loop up to its `:`
        rule for_each() -> Fact<'a>
            = tok("for") tok("(") prefix() ty:type_() name:ident() tok(":")
            { Fact::ForEach { ty, name } }

        /// matches the head of a variable declaration
        rule declaration() -> Fact<'a>
            = prefix() ty:type_() name:ident() d:$(dims()) end:position!()
              &(tok("=") / tok(",") / tok(";"))
            {?
                if ty == "yield" {
                    Err("declaration")
                } else {
                    let ty = format!("{ty}{}", "[]".repeat(d.len() / 2));
                    Ok(Fact::Declaration { ty, name, end })
                }
            }

        /// matches one recognised construct, or skips a token
        rule item() -> Option<Fact<'a>>
            = f:(record() / method() / constructor() / catch_clause() / for_each() / declaration())
              { Some(f) }
            / [_] { None }

        /// parses the whole token stream into facts, in source order
        pub rule facts() -> Vec<Fact<'a>>
            = f:item()* { f.into_iter().flatten().collect() }
    }
}
