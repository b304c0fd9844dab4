//! # Abstract Syntax Tree
//!
//! The typed representation of a function body after semantic analysis, and
//! its tree-walking evaluator.
//!
//! ## Structure
//!
//! Two sum types carry the whole tree: [`Expression`] and [`Statement`], one
//! struct per node kind. Every non-leaf node exclusively owns its children.
//! Identifiers never own name strings — only a [`SymbolId`] into the
//! function's symbol table. Source fragments are not retained; diagnostics
//! past this stage are runtime-only.
//!
//! ## Evaluation
//!
//! Every node evaluates to `Option<i64>`; `None` is fatal and unwinds the
//! whole call. Arithmetic is two's-complement with wrapping on overflow, and
//! division by zero is the single runtime trap.

use crate::analysis::symbol_table::{SymbolId, SymbolTable};
use crate::execution::ExecutionContext;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    Literal(Literal),
    Unary(Unary),
    Binary(Binary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identifier {
    pub symbol: SymbolId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal {
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub operator: UnaryOperator,
    pub child: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assignment(Assignment),
    Return(Return),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: SymbolId,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub value: Expression,
}

/// A compiled function body: its statements and the symbol table they index.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub statements: Vec<Statement>,
    pub symbols: SymbolTable,
}

impl Expression {
    pub fn evaluate(&self, context: &mut ExecutionContext) -> Option<i64> {
        match self {
            Expression::Identifier(identifier) => Some(context.value(identifier.symbol)),
            Expression::Literal(literal) => Some(literal.value),
            Expression::Unary(unary) => {
                let value = unary.child.evaluate(context)?;
                match unary.operator {
                    UnaryOperator::Plus => Some(value),
                    UnaryOperator::Minus => Some(value.wrapping_neg()),
                }
            }
            Expression::Binary(binary) => {
                // Operands evaluate left to right, short-circuiting on failure.
                let lhs = binary.left.evaluate(context)?;
                let rhs = binary.right.evaluate(context)?;
                match binary.operator {
                    BinaryOperator::Add => Some(lhs.wrapping_add(rhs)),
                    BinaryOperator::Subtract => Some(lhs.wrapping_sub(rhs)),
                    BinaryOperator::Multiply => Some(lhs.wrapping_mul(rhs)),
                    BinaryOperator::Divide => {
                        if rhs == 0 {
                            eprintln!("Division by zero!");
                            return None;
                        }
                        Some(lhs.wrapping_div(rhs))
                    }
                }
            }
        }
    }
}

impl Statement {
    pub fn evaluate(&self, context: &mut ExecutionContext) -> Option<i64> {
        match self {
            Statement::Assignment(assignment) => {
                let value = assignment.value.evaluate(context)?;
                context.set_value(assignment.target, value);
                Some(value)
            }
            Statement::Return(ret) => {
                let value = ret.value.evaluate(context)?;
                context.set_result(value);
                Some(value)
            }
        }
    }
}

impl Function {
    /// Evaluate the function body. Execution halts at the first successful
    /// `RETURN`; the returned value is also recorded in the context.
    pub fn evaluate(&self, context: &mut ExecutionContext) -> Option<i64> {
        for statement in &self.statements {
            let result = statement.evaluate(context)?;
            if matches!(statement, Statement::Return(_)) {
                return Some(result);
            }
        }
        // Semantic analysis rejects bodies without a return statement.
        None
    }
}
