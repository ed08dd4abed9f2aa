//! Recursive-descent / Pratt parser for statements, formulas and
//! arithmetic constraints.
//!
//! Text is first parsed into an untyped [`Expr`] tree, then elaborated into
//! either a logic [`Formula`] or an arithmetic
//! [`Constraint`](super::arith::Constraint). Nothing is ever evaluated as
//! code.

use num_rational::Rational64;

use super::ast::{Declaration, Formula, OBJECT_SORT, Statement, Term};
use crate::error::ParseError;

/// Identifiers with a fixed meaning in both syntaxes.
pub const RESERVED_WORDS: &[&str] = &[
    "And", "Or", "Not", "Implies", "ForAll", "Exists", "True", "False",
];

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Ident(String),
    Number(Rational64),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
    Compare(CompareOp),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    position: usize,
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

/// Comparison operators. `=` and `==` both mean equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `==` or `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// Operator text.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// Untyped syntax tree node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// Node payload.
    pub kind: ExprKind,
    /// Byte offset of the node in the source.
    pub position: usize,
}

/// Syntax tree node payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// A bare identifier.
    Ident(String),
    /// A numeric literal.
    Number(Rational64),
    /// `[a, b, ...]`
    List(Vec<Expr>),
    /// `name(args...)`
    Call {
        /// Callee name.
        name: String,
        /// Arguments.
        args: Vec<Expr>,
    },
    /// Unary minus.
    Neg(Box<Expr>),
    /// Arithmetic binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// Comparison.
    Compare {
        /// Operator.
        op: CompareOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
}

fn tokenize(src: &str) -> Result<Vec<Token>, ParseError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '=' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    i += 1;
                }
                TokenKind::Compare(CompareOp::Eq)
            }
            '!' if bytes.get(i + 1) == Some(&b'=') => {
                i += 1;
                TokenKind::Compare(CompareOp::Ne)
            }
            '<' | '>' => {
                let or_equal = bytes.get(i + 1) == Some(&b'=');
                if or_equal {
                    i += 1;
                }
                TokenKind::Compare(match (c, or_equal) {
                    ('<', false) => CompareOp::Lt,
                    ('<', true) => CompareOp::Le,
                    ('>', false) => CompareOp::Gt,
                    _ => CompareOp::Ge,
                })
            }
            c if c.is_ascii_digit() || c == '.' => {
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Number(parse_number(&src[start..i], start)?),
                    position: start,
                });
                continue;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(src[start..i].to_string()),
                    position: start,
                });
                continue;
            }
            _ => {
                let shown = src[start..].chars().next().unwrap_or(c);
                return Err(ParseError::new(start, format!("unexpected character '{shown}'")));
            }
        };
        i += 1;
        tokens.push(Token {
            kind,
            position: start,
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        position: src.len(),
    });
    Ok(tokens)
}

fn parse_number(text: &str, position: usize) -> Result<Rational64, ParseError> {
    let overflow = || ParseError::new(position, format!("number '{text}' is out of range"));
    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    if fraction.contains('.') || (whole.is_empty() && fraction.is_empty()) {
        return Err(ParseError::new(position, format!("invalid number '{text}'")));
    }

    let mut numer: i64 = 0;
    let mut denom: i64 = 1;
    for digit in whole.bytes().chain(fraction.bytes()) {
        numer = numer
            .checked_mul(10)
            .and_then(|n| n.checked_add(i64::from(digit - b'0')))
            .ok_or_else(overflow)?;
    }
    for _ in 0..fraction.len() {
        denom = denom.checked_mul(10).ok_or_else(overflow)?;
    }
    Ok(Rational64::new(numer, denom))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(src: &str) -> Result<Self, ParseError> {
        Ok(Self {
            tokens: tokenize(src)?,
            pos: 0,
        })
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<Token, ParseError> {
        let token = self.advance();
        if &token.kind == kind {
            Ok(token)
        } else {
            Err(ParseError::new(token.position, format!("expected {what}")))
        }
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// Comma-separated expressions up to (not including) `close`.
    fn parse_sequence(&mut self, close: &TokenKind) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();
        if &self.peek().kind == close {
            return Ok(items);
        }
        loop {
            items.push(self.parse_expr(0)?);
            if self.peek().kind == TokenKind::Comma {
                self.advance();
            } else {
                return Ok(items);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance();
        let position = token.position;
        let kind = match token.kind {
            TokenKind::Number(value) => ExprKind::Number(value),
            TokenKind::Ident(name) => {
                if self.peek().kind == TokenKind::LParen {
                    self.advance();
                    let args = self.parse_sequence(&TokenKind::RParen)?;
                    self.expect(&TokenKind::RParen, "')'")?;
                    ExprKind::Call { name, args }
                } else {
                    ExprKind::Ident(name)
                }
            }
            TokenKind::LParen => {
                let inner = self.parse_expr(0)?;
                self.expect(&TokenKind::RParen, "')'")?;
                return Ok(inner);
            }
            TokenKind::LBracket => {
                let items = self.parse_sequence(&TokenKind::RBracket)?;
                self.expect(&TokenKind::RBracket, "']'")?;
                ExprKind::List(items)
            }
            TokenKind::Minus => ExprKind::Neg(Box::new(self.parse_expr(7)?)),
            TokenKind::Eof => return Err(ParseError::new(position, "unexpected end of input")),
            _ => return Err(ParseError::new(position, "expected an expression")),
        };
        Ok(Expr { kind, position })
    }

    fn parse_expr(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_primary()?;

        loop {
            let token = self.peek().clone();
            let (left_bp, right_bp) = match token.kind {
                TokenKind::Compare(_) => (1, 2),
                TokenKind::Plus | TokenKind::Minus => (3, 4),
                TokenKind::Star | TokenKind::Slash => (5, 6),
                _ => break,
            };
            if left_bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_expr(right_bp)?;
            let kind = match token.kind {
                TokenKind::Compare(op) => {
                    if let TokenKind::Compare(_) = self.peek().kind {
                        return Err(ParseError::new(
                            self.peek().position,
                            "chained comparisons are not supported",
                        ));
                    }
                    ExprKind::Compare {
                        op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    }
                }
                TokenKind::Plus => binary(BinaryOp::Add, lhs, rhs),
                TokenKind::Minus => binary(BinaryOp::Sub, lhs, rhs),
                TokenKind::Star => binary(BinaryOp::Mul, lhs, rhs),
                _ => binary(BinaryOp::Div, lhs, rhs),
            };
            lhs = Expr {
                kind,
                position: token.position,
            };
        }

        Ok(lhs)
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> ExprKind {
    ExprKind::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

/// Parse exactly one expression.
///
/// # Errors
///
/// Returns an error on any syntax error or trailing input.
pub fn parse_expression(src: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(src)?;
    let expr = parser.parse_expr(0)?;
    if !parser.at_eof() {
        return Err(ParseError::new(parser.peek().position, "unexpected trailing input"));
    }
    Ok(expr)
}

/// Parse a comma-separated list of top-level expressions.
///
/// # Errors
///
/// Returns an error on any syntax error or an empty input.
pub fn parse_expression_list(src: &str) -> Result<Vec<Expr>, ParseError> {
    let mut parser = Parser::new(src)?;
    if parser.at_eof() {
        return Err(ParseError::new(0, "empty expression"));
    }
    let items = parser.parse_sequence(&TokenKind::Eof)?;
    if !parser.at_eof() {
        return Err(ParseError::new(parser.peek().position, "unexpected trailing input"));
    }
    Ok(items)
}

fn term_from_expr(expr: &Expr, bound: &[String]) -> Result<Term, ParseError> {
    match &expr.kind {
        ExprKind::Ident(name) if RESERVED_WORDS.contains(&name.as_str()) => Err(ParseError::new(
            expr.position,
            format!("'{name}' cannot be used as a term"),
        )),
        ExprKind::Ident(name) if bound.contains(name) => Ok(Term::Variable(name.clone())),
        ExprKind::Ident(name) => Ok(Term::Constant(name.clone())),
        _ => Err(ParseError::new(expr.position, "expected a constant or variable")),
    }
}

fn arity_error(expr: &Expr, name: &str, expected: &str) -> ParseError {
    ParseError::new(expr.position, format!("{name} expects {expected}"))
}

fn formula_from_expr(expr: &Expr, bound: &mut Vec<String>) -> Result<Formula, ParseError> {
    match &expr.kind {
        ExprKind::Ident(name) => match name.as_str() {
            "True" => Ok(Formula::True),
            "False" => Ok(Formula::False),
            _ => Err(ParseError::new(
                expr.position,
                format!("expected a formula, found term '{name}'"),
            )),
        },
        ExprKind::Call { name, args } => match name.as_str() {
            "ForAll" | "Exists" => {
                let [vars, body] = args.as_slice() else {
                    return Err(arity_error(expr, name, "a variable list and a body"));
                };
                let names = quantifier_vars(vars)?;
                let depth = bound.len();
                bound.extend(names.iter().cloned());
                let body = formula_from_expr(body, bound);
                bound.truncate(depth);
                let body = Box::new(body?);
                Ok(if name == "ForAll" {
                    Formula::ForAll { vars: names, body }
                } else {
                    Formula::Exists { vars: names, body }
                })
            }
            "And" | "Or" => {
                let parts = args
                    .iter()
                    .map(|a| formula_from_expr(a, bound))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(if name == "And" {
                    Formula::And(parts)
                } else {
                    Formula::Or(parts)
                })
            }
            "Not" => {
                let [inner] = args.as_slice() else {
                    return Err(arity_error(expr, name, "one argument"));
                };
                Ok(formula_from_expr(inner, bound)?.negate())
            }
            "Implies" => {
                let [lhs, rhs] = args.as_slice() else {
                    return Err(arity_error(expr, name, "two arguments"));
                };
                Ok(Formula::implies(
                    formula_from_expr(lhs, bound)?,
                    formula_from_expr(rhs, bound)?,
                ))
            }
            "True" | "False" => Err(ParseError::new(
                expr.position,
                format!("'{name}' is not a function"),
            )),
            _ => {
                let terms = args
                    .iter()
                    .map(|a| term_from_expr(a, bound))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Formula::atom(name.clone(), terms))
            }
        },
        ExprKind::Compare { op, lhs, rhs } => {
            let lhs = term_from_expr(lhs, bound)?;
            let rhs = term_from_expr(rhs, bound)?;
            match op {
                CompareOp::Eq => Ok(Formula::Equal(lhs, rhs)),
                CompareOp::Ne => Ok(Formula::Equal(lhs, rhs).negate()),
                other => Err(ParseError::new(
                    expr.position,
                    format!("'{}' is not defined between objects", other.symbol()),
                )),
            }
        }
        _ => Err(ParseError::new(expr.position, "expected a formula")),
    }
}

fn quantifier_vars(expr: &Expr) -> Result<Vec<String>, ParseError> {
    let items = match &expr.kind {
        ExprKind::List(items) => items.as_slice(),
        ExprKind::Ident(_) => std::slice::from_ref(expr),
        _ => return Err(ParseError::new(expr.position, "expected a variable list")),
    };
    if items.is_empty() {
        return Err(ParseError::new(expr.position, "quantifier binds no variables"));
    }
    items
        .iter()
        .map(|item| match &item.kind {
            ExprKind::Ident(name) if !RESERVED_WORDS.contains(&name.as_str()) => Ok(name.clone()),
            _ => Err(ParseError::new(item.position, "expected a variable name")),
        })
        .collect()
}

/// Parse a formula in the program vocabulary, e.g.
/// `ForAll([x], Implies(Human(x), Mortal(x)))`.
///
/// # Errors
///
/// Returns an error if the text is not a well-formed formula.
pub fn parse_formula(src: &str) -> Result<Formula, ParseError> {
    let expr = parse_expression(src)?;
    formula_from_expr(&expr, &mut Vec::new())
}

fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse one statement of the program vocabulary, e.g.
/// `declare-constant socrates Object` or `assert Human(socrates)`.
///
/// # Errors
///
/// Returns an error if the keyword is unknown or its operands are malformed.
pub fn parse_statement(src: &str) -> Result<Statement, ParseError> {
    let leading = src.len() - src.trim_start().len();
    let text = src.trim();
    let (keyword, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
    let rest_offset = leading + keyword.len() + (text.len() - keyword.len() - rest.len());

    if keyword == "assert" {
        return parse_formula(rest)
            .map(Statement::Assert)
            .map_err(|e| ParseError::new(e.position + rest_offset, e.message));
    }

    let words: Vec<&str> = rest.split_whitespace().collect();
    if let Some(bad) = words.iter().find(|w| !is_identifier(w)) {
        return Err(ParseError::new(
            rest_offset,
            format!("'{bad}' is not a valid identifier"),
        ));
    }
    let Some((&name, sorts)) = words.split_first() else {
        return Err(ParseError::new(rest_offset, format!("{keyword} expects a name")));
    };
    let name = name.to_string();
    let sorts: Vec<String> = sorts.iter().map(|s| (*s).to_string()).collect();
    let single_sort = |sorts: Vec<String>| -> Result<String, ParseError> {
        match sorts.as_slice() {
            [] => Ok(OBJECT_SORT.to_string()),
            [sort] => Ok(sort.clone()),
            _ => Err(ParseError::new(rest_offset, format!("{keyword} takes one sort"))),
        }
    };

    let decl = match keyword {
        "declare-sort" if sorts.is_empty() => Declaration::Sort(name),
        "declare-sort" => {
            return Err(ParseError::new(rest_offset, "declare-sort takes only a name"));
        }
        "declare-constant" => Declaration::Constant {
            name,
            sort: single_sort(sorts)?,
        },
        "declare-variable" => Declaration::Variable {
            name,
            sort: single_sort(sorts)?,
        },
        "declare-predicate" => Declaration::Predicate {
            name,
            domain: if sorts.is_empty() {
                vec![OBJECT_SORT.to_string()]
            } else {
                sorts
            },
        },
        "declare-relation" => Declaration::Relation {
            name,
            domain: if sorts.is_empty() {
                vec![OBJECT_SORT.to_string(), OBJECT_SORT.to_string()]
            } else {
                sorts
            },
        },
        other => {
            return Err(ParseError::new(
                leading,
                format!("unknown statement keyword '{other}'"),
            ));
        }
    };
    Ok(Statement::Declare(decl))
}
