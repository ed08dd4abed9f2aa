//! The textual logic language: typed programs, formulas, and arithmetic
//! constraints, plus the parser shared by all of them.

pub mod arith;
pub mod ast;
pub mod parser;

pub use arith::{ArithExpr, Constraint, format_rational};
pub use ast::{Declaration, Formula, OBJECT_SORT, ProgramFragment, Statement, SymbolKind, Term};
pub use parser::{
    BinaryOp, CompareOp, Expr, ExprKind, RESERVED_WORDS, parse_expression, parse_expression_list,
    parse_formula, parse_statement,
};
