//! Graphviz rendering of a compiled function.
//!
//! Produces a `graph { .. }` string with one labeled node per AST node,
//! useful for eyeballing optimizer output and for structural comparison in
//! tests.

use crate::analysis::ast::{
    BinaryOperator, Expression, Function, Statement, UnaryOperator,
};

/// Render `function` as a Graphviz `graph` string.
pub fn to_dot(function: &Function) -> String {
    let mut printer = DotPrinter {
        out: String::new(),
        next_id: 0,
    };
    printer.function(function);
    printer.out
}

struct DotPrinter {
    out: String,
    next_id: usize,
}

impl DotPrinter {
    fn function(&mut self, function: &Function) {
        self.out.push_str("graph {\n");
        let id = self.labeled_node("Function");
        for statement in &function.statements {
            self.edge_from(id);
            self.statement(statement);
        }
        self.out.push('}');
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Return(ret) => {
                let id = self.labeled_node("Return Statement");
                self.edge_from(id);
                self.expression(&ret.value);
            }
            Statement::Assignment(assignment) => {
                let id = self.labeled_node("Assignment");
                self.edge_from(id);
                self.labeled_node(&format!("Identifier {}", assignment.target));
                self.edge_from(id);
                self.expression(&assignment.value);
            }
        }
    }

    fn expression(&mut self, expression: &Expression) {
        match expression {
            Expression::Identifier(identifier) => {
                self.labeled_node(&format!("Identifier {}", identifier.symbol));
            }
            Expression::Literal(literal) => {
                self.labeled_node(&literal.value.to_string());
            }
            Expression::Unary(unary) => {
                let label = match unary.operator {
                    UnaryOperator::Plus => "+(child)",
                    UnaryOperator::Minus => "-(child)",
                };
                let id = self.labeled_node(label);
                self.edge_from(id);
                self.expression(&unary.child);
            }
            Expression::Binary(binary) => {
                let label = match binary.operator {
                    BinaryOperator::Add => "lhs + rhs",
                    BinaryOperator::Subtract => "lhs - rhs",
                    BinaryOperator::Multiply => "lhs * rhs",
                    BinaryOperator::Divide => "lhs / rhs",
                };
                let id = self.labeled_node(label);
                self.edge_from(id);
                self.expression(&binary.left);
                self.edge_from(id);
                self.expression(&binary.right);
            }
        }
    }

    /// Emit a node declaration and return its id.
    fn labeled_node(&mut self, label: &str) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.out.push_str(&format!("n_{id} [label=\"{label}\"];\n"));
        id
    }

    /// Start an edge line from `parent`; the next declared node completes it.
    fn edge_from(&mut self, parent: usize) {
        self.out.push_str(&format!("n_{parent} -- n_{};\n", self.next_id));
    }
}
