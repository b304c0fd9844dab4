//! # Optimization Passes
//!
//! The concrete passes run over every compiled function:
//!
//! 1. [`UnaryPlusRemoval`] - semantic analysis wraps every unary expression,
//!    signed or not, in a unary node; this pass collapses the `+` wrappers
//!    everywhere in the tree.
//! 2. [`ConstantPropagation`] - a single forward sweep folding every
//!    expression whose operands are known at compile time into a literal.
//! 3. [`DeadCodeElimination`] - statements after the first `RETURN` can
//!    never execute and are dropped.

use crate::analysis::ast::{
    Assignment, Binary, Expression, Function, Identifier, Literal, Return, Statement, Unary,
    UnaryOperator,
};
use crate::execution::ExecutionContext;
use crate::optimizer::Pass;

/// Collapses `Unary(+, e)` nodes to `e` throughout the tree.
pub struct UnaryPlusRemoval;

impl Pass for UnaryPlusRemoval {
    fn optimize_function(&mut self, function: &mut Function) {
        for statement in &mut function.statements {
            Statement::optimize_in_place(statement, self);
        }
    }

    fn optimize_unary(&mut self, mut node: Unary) -> Expression {
        Expression::optimize_in_place(&mut node.child, self);
        if node.operator == UnaryOperator::Plus {
            // Release the child from the wrapper.
            *node.child
        } else {
            Expression::Unary(node)
        }
    }

    fn optimize_binary(&mut self, mut node: Binary) -> Expression {
        Expression::optimize_in_place(&mut node.left, self);
        Expression::optimize_in_place(&mut node.right, self);
        Expression::Binary(node)
    }

    fn optimize_return(&mut self, mut node: Return) -> Statement {
        Expression::optimize_in_place(&mut node.value, self);
        Statement::Return(node)
    }

    fn optimize_assignment(&mut self, mut node: Assignment) -> Statement {
        Expression::optimize_in_place(&mut node.value, self);
        Statement::Assignment(node)
    }
}

/// Whole-program constant propagation.
///
/// Tracks, per symbol, whether its value is known at the current point of the
/// sweep: constants from their declarations, variables from assignments whose
/// right-hand side folded to a literal. After child rewriting, a
/// sub-expression is known exactly when it *is* a literal, so no side table
/// of expression values is needed.
///
/// Folding evaluates the candidate sub-tree in a transient execution context.
/// If evaluation fails (division by zero with known operands), the
/// expression is left in place so the failure still occurs at run time.
#[derive(Default)]
pub struct ConstantPropagation {
    /// Known value per symbol id, `None` when unknown.
    constant_variables: Vec<Option<i64>>,
    /// Scratch context for evaluating foldable sub-trees.
    context: Option<ExecutionContext>,
}

impl ConstantPropagation {
    pub fn new() -> Self {
        Self::default()
    }

    fn known_value(expression: &Expression) -> Option<i64> {
        match expression {
            Expression::Literal(literal) => Some(literal.value),
            _ => None,
        }
    }

    /// Fold a fully-known expression to a literal, or return it unchanged if
    /// evaluation traps.
    fn fold(&mut self, expression: Expression) -> Expression {
        let Some(context) = self.context.as_mut() else {
            return expression;
        };
        match expression.evaluate(context) {
            Some(value) => Expression::Literal(Literal { value }),
            None => expression,
        }
    }
}

impl Pass for ConstantPropagation {
    fn optimize_function(&mut self, function: &mut Function) {
        self.constant_variables = function
            .symbols
            .iter()
            .map(|symbol| symbol.constant_value)
            .collect();
        let parameters = vec![0; function.symbols.number_of_parameters()];
        self.context = Some(ExecutionContext::new(&function.symbols, &parameters));

        for statement in &mut function.statements {
            Statement::optimize_in_place(statement, self);
        }
    }

    fn optimize_identifier(&mut self, node: Identifier) -> Expression {
        match self.constant_variables[node.symbol] {
            Some(value) => Expression::Literal(Literal { value }),
            None => Expression::Identifier(node),
        }
    }

    fn optimize_unary(&mut self, mut node: Unary) -> Expression {
        Expression::optimize_in_place(&mut node.child, self);
        if Self::known_value(&node.child).is_some() {
            self.fold(Expression::Unary(node))
        } else {
            Expression::Unary(node)
        }
    }

    fn optimize_binary(&mut self, mut node: Binary) -> Expression {
        Expression::optimize_in_place(&mut node.left, self);
        Expression::optimize_in_place(&mut node.right, self);
        if Self::known_value(&node.left).is_some() && Self::known_value(&node.right).is_some() {
            self.fold(Expression::Binary(node))
        } else {
            Expression::Binary(node)
        }
    }

    fn optimize_return(&mut self, mut node: Return) -> Statement {
        Expression::optimize_in_place(&mut node.value, self);
        Statement::Return(node)
    }

    fn optimize_assignment(&mut self, mut node: Assignment) -> Statement {
        Expression::optimize_in_place(&mut node.value, self);
        // A known right-hand side makes the target known from here on. An
        // unknown one leaves the entry untouched; PL bodies are straight
        // lines of statements, so the sweep never revisits an earlier one.
        if let Some(value) = Self::known_value(&node.value) {
            self.constant_variables[node.target] = Some(value);
        }
        Statement::Assignment(node)
    }
}

/// Drops the unreachable statements after the first `RETURN`.
pub struct DeadCodeElimination;

impl Pass for DeadCodeElimination {
    fn optimize_function(&mut self, function: &mut Function) {
        let first_return = function
            .statements
            .iter()
            .position(|statement| matches!(statement, Statement::Return(_)));
        if let Some(index) = first_return {
            function.statements.truncate(index + 1);
        }
    }
}
