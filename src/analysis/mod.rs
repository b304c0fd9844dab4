//! # Semantic Analysis
//!
//! Lowers a parse tree into a typed [`Function`](ast::Function): an AST over
//! symbol ids plus the symbol table describing every declared name.
//!
//! ## Responsibilities
//!
//! 1. **Symbol table construction**: declaration sections are walked in the
//!    order parameters, variables, constants, so the table's partitioning
//!    invariant holds by construction. Duplicate names are rejected with a
//!    diagnostic pointing at the original declaration.
//! 2. **Name resolution**: every identifier in the body becomes a symbol id;
//!    unknown names are rejected.
//! 3. **Initialization checking**: a variable must be assigned before it is
//!    read. The check sees the flags as they were on entry to the current
//!    statement, so `x := x + 1` is rejected for an uninitialized `x`.
//! 4. **Structure checking**: assignments to constants are rejected, and the
//!    body must contain at least one `RETURN`.
//!
//! Analysis stops at the first violation; the partially built symbol table
//! is discarded with the builder.

pub mod ast;
pub mod dot;
pub mod symbol_table;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use crate::error::{CompileError, ErrorKind};
use crate::parser::tree;
use crate::source::SourceBuffer;
use ast::{
    Assignment, Binary, BinaryOperator, Expression, Function, Identifier, Literal, Return,
    Statement, Unary, UnaryOperator,
};
use symbol_table::{SymbolId, SymbolKind, SymbolTable};

pub struct AstBuilder<'a> {
    source: &'a SourceBuffer,
    symbols: SymbolTable,
    /// Name → symbol id for the names declared so far.
    names: HashMap<&'a str, SymbolId>,
}

impl<'a> AstBuilder<'a> {
    /// Lower `tree` into a compiled function, or fail with the first
    /// semantic violation.
    pub fn build(
        source: &'a SourceBuffer,
        tree: &tree::FunctionDefinition,
    ) -> Result<Function, CompileError> {
        let builder = Self {
            source,
            symbols: SymbolTable::new(),
            names: HashMap::new(),
        };
        builder.analyze_function(tree)
    }

    fn analyze_function(
        mut self,
        tree: &tree::FunctionDefinition,
    ) -> Result<Function, CompileError> {
        if let Some(parameters) = &tree.parameters {
            for identifier in &parameters.declarators.identifiers {
                self.declare(identifier, SymbolKind::Parameter, None)?;
            }
        }
        if let Some(variables) = &tree.variables {
            for identifier in &variables.declarators.identifiers {
                self.declare(identifier, SymbolKind::Variable, None)?;
            }
        }
        if let Some(constants) = &tree.constants {
            for declarator in &constants.declarators.declarators {
                self.declare(
                    &declarator.identifier,
                    SymbolKind::Constant,
                    Some(declarator.value.value),
                )?;
            }
        }

        let mut has_return = false;
        let statement_list = &tree.body.statements.statements;
        let mut statements = Vec::with_capacity(statement_list.len());
        for statement in statement_list {
            let lowered = match statement {
                tree::Statement::Return(ret) => {
                    has_return = true;
                    Statement::Return(Return {
                        value: self.lower_additive(&ret.expression)?,
                    })
                }
                tree::Statement::Assignment(assignment) => {
                    Statement::Assignment(self.lower_assignment(assignment)?)
                }
            };
            statements.push(lowered);
        }

        if !has_return {
            return Err(CompileError::new(
                ErrorKind::MissingReturn,
                "Missing return statement",
                tree.body.fragment,
            ));
        }

        Ok(Function {
            statements,
            symbols: self.symbols,
        })
    }

    /// Register a declared name, rejecting duplicates across all phases.
    fn declare(
        &mut self,
        identifier: &tree::Identifier,
        kind: SymbolKind,
        constant_value: Option<i64>,
    ) -> Result<SymbolId, CompileError> {
        let name = self.source.fragment_str(identifier.fragment);
        if let Some(&existing) = self.names.get(name) {
            // Point the diagnostic at the original declaration.
            return Err(CompileError::new(
                ErrorKind::Redeclaration,
                format!("Redeclaration of identifier \"{name}\""),
                self.symbols.get(existing).declaration,
            ));
        }
        let id = self.symbols.insert(identifier.fragment, kind, constant_value);
        self.names.insert(name, id);
        Ok(id)
    }

    fn lower_assignment(
        &mut self,
        assignment: &tree::AssignmentExpression,
    ) -> Result<Assignment, CompileError> {
        let name = self.source.fragment_str(assignment.target.fragment);
        let Some(&target) = self.names.get(name) else {
            return Err(self.undeclared(name, assignment.target.fragment));
        };

        if self.symbols.get(target).kind == SymbolKind::Constant {
            return Err(CompileError::new(
                ErrorKind::AssignmentToConstant,
                format!("Assigning to constant \"{name}\""),
                assignment.target.fragment,
            ));
        }

        // Lower the right-hand side before flipping the target's flag: the
        // initialization check must see the state on entry to this statement.
        let value = self.lower_additive(&assignment.value)?;
        self.symbols.get_mut(target).initialized = true;

        Ok(Assignment { target, value })
    }

    fn lower_additive(
        &mut self,
        expression: &tree::AdditiveExpression,
    ) -> Result<Expression, CompileError> {
        let lhs = self.lower_multiplicative(&expression.lhs)?;
        match &expression.rhs {
            None => Ok(lhs),
            Some((operator, rhs)) => {
                let operator = match operator {
                    tree::AdditiveOperator::Plus => BinaryOperator::Add,
                    tree::AdditiveOperator::Minus => BinaryOperator::Subtract,
                };
                let rhs = self.lower_additive(rhs)?;
                Ok(Expression::Binary(Binary {
                    operator,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                }))
            }
        }
    }

    fn lower_multiplicative(
        &mut self,
        expression: &tree::MultiplicativeExpression,
    ) -> Result<Expression, CompileError> {
        let lhs = self.lower_unary(&expression.lhs)?;
        match &expression.rhs {
            None => Ok(lhs),
            Some((operator, rhs)) => {
                let operator = match operator {
                    tree::MultiplicativeOperator::Mult => BinaryOperator::Multiply,
                    tree::MultiplicativeOperator::Div => BinaryOperator::Divide,
                };
                let rhs = self.lower_multiplicative(rhs)?;
                Ok(Expression::Binary(Binary {
                    operator,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                }))
            }
        }
    }

    /// Every unary expression is wrapped, explicit sign or not; the unary
    /// plus wrappers are stripped uniformly by the optimizer.
    fn lower_unary(
        &mut self,
        expression: &tree::UnaryExpression,
    ) -> Result<Expression, CompileError> {
        let child = self.lower_primary(&expression.operand)?;
        let operator = match expression.sign {
            Some(tree::UnaryOperator::Minus) => UnaryOperator::Minus,
            Some(tree::UnaryOperator::Plus) | None => UnaryOperator::Plus,
        };
        Ok(Expression::Unary(Unary {
            operator,
            child: Box::new(child),
        }))
    }

    fn lower_primary(
        &mut self,
        expression: &tree::PrimaryExpression,
    ) -> Result<Expression, CompileError> {
        match expression {
            tree::PrimaryExpression::Literal(literal) => Ok(Expression::Literal(Literal {
                value: literal.value,
            })),
            tree::PrimaryExpression::Parenthesized(parenthesized) => {
                // Parentheses do not appear in the AST.
                self.lower_additive(&parenthesized.expression)
            }
            tree::PrimaryExpression::Identifier(identifier) => {
                let name = self.source.fragment_str(identifier.fragment);
                let Some(&id) = self.names.get(name) else {
                    return Err(self.undeclared(name, identifier.fragment));
                };
                if !self.symbols.get(id).initialized {
                    return Err(CompileError::new(
                        ErrorKind::UninitializedVariable,
                        format!("Variable \"{name}\" has not been initialized but is referenced"),
                        identifier.fragment,
                    ));
                }
                Ok(Expression::Identifier(Identifier { symbol: id }))
            }
        }
    }

    fn undeclared(&self, name: &str, fragment: crate::source::Fragment) -> CompileError {
        CompileError::new(
            ErrorKind::UndeclaredIdentifier,
            format!("Undeclared identifier \"{name}\""),
            fragment,
        )
    }
}
