//! # PL Parser
//!
//! Hand-written recursive-descent parser with one token of lookahead,
//! producing the concrete parse tree in [`tree`].
//!
//! ## Error handling
//!
//! The parser latches the first error it sees — whether a lexical error from
//! the lexer or an unexpected token — and every subsequent parse method
//! short-circuits to failure. [`Parser::parse_function_definition`] returns
//! `None` on any error; the latched diagnostic is available through
//! [`Parser::error`].
//!
//! Missing optional declaration sections are not errors; they are simply
//! absent from the tree. Trailing input after the program terminator `.` is
//! a syntax error.

pub mod tree;


use crate::error::{CompileError, ErrorKind};
use crate::lexer::token::{Token, TokenKind};
use crate::lexer::Lexer;
use crate::source::SourceBuffer;
use tree::{
    AdditiveExpression, AdditiveOperator, AssignmentExpression, CompoundStatement,
    ConstantDeclaration, DeclaratorList, FunctionDefinition, Identifier, InitDeclarator,
    InitDeclaratorList, Literal, MultiplicativeExpression, MultiplicativeOperator,
    ParameterDeclaration, ParenthesizedExpression, PrimaryExpression, ReturnStatement, Statement,
    StatementList, UnaryExpression, UnaryOperator, VariableDeclaration,
};

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    source: &'a SourceBuffer,
    lookahead: Option<Token>,
    error: Option<CompileError>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a SourceBuffer) -> Self {
        Self {
            lexer: Lexer::new(source),
            source,
            lookahead: None,
            error: None,
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// The first error encountered, if parsing failed.
    pub fn error(&self) -> Option<&CompileError> {
        self.error.as_ref()
    }

    /// Consume the latched error, if any.
    pub fn take_error(&mut self) -> Option<CompileError> {
        self.error.take()
    }

    /// Parse a whole program. Returns the parse tree root on success,
    /// otherwise `None` with the diagnostic latched.
    pub fn parse_function_definition(&mut self) -> Option<FunctionDefinition> {
        let parameters = if self.at(TokenKind::Param) {
            Some(self.parse_parameter_declaration()?)
        } else {
            None
        };
        let variables = if self.at(TokenKind::Var) {
            Some(self.parse_variable_declaration()?)
        } else {
            None
        };
        let constants = if self.at(TokenKind::Const) {
            Some(self.parse_constant_declaration()?)
        } else {
            None
        };

        let body = self.parse_compound_statement()?;
        let terminator = self.consume(TokenKind::ProgramTerminator, "'.' ending the program")?;

        // The program terminator must be the last token of the input.
        match self.peek_kind()? {
            TokenKind::Eos => {}
            _ => {
                let fragment = self.lookahead.map(|t| t.fragment);
                self.report(
                    ErrorKind::TrailingInput,
                    "Trailing input after the program terminator",
                    fragment,
                );
                return None;
            }
        }

        let mut fragment = body.fragment;
        if let Some(parameters) = &parameters {
            fragment.extend(parameters.fragment);
        }
        if let Some(variables) = &variables {
            fragment.extend(variables.fragment);
        }
        if let Some(constants) = &constants {
            fragment.extend(constants.fragment);
        }
        fragment.extend(terminator.fragment);

        Some(FunctionDefinition {
            parameters,
            variables,
            constants,
            body,
            fragment,
        })
    }

    // === Declarations ===

    fn parse_parameter_declaration(&mut self) -> Option<ParameterDeclaration> {
        let keyword = self.consume(TokenKind::Param, "'PARAM'")?;
        let declarators = self.parse_declarator_list()?;
        let terminator =
            self.consume(TokenKind::StatementTerminator, "';' after parameter declarations")?;
        let mut fragment = keyword.fragment;
        fragment.extend(terminator.fragment);
        Some(ParameterDeclaration {
            declarators,
            fragment,
        })
    }

    fn parse_variable_declaration(&mut self) -> Option<VariableDeclaration> {
        let keyword = self.consume(TokenKind::Var, "'VAR'")?;
        let declarators = self.parse_declarator_list()?;
        let terminator =
            self.consume(TokenKind::StatementTerminator, "';' after variable declarations")?;
        let mut fragment = keyword.fragment;
        fragment.extend(terminator.fragment);
        Some(VariableDeclaration {
            declarators,
            fragment,
        })
    }

    fn parse_constant_declaration(&mut self) -> Option<ConstantDeclaration> {
        let keyword = self.consume(TokenKind::Const, "'CONST'")?;
        let declarators = self.parse_init_declarator_list()?;
        let terminator =
            self.consume(TokenKind::StatementTerminator, "';' after constant declarations")?;
        let mut fragment = keyword.fragment;
        fragment.extend(terminator.fragment);
        Some(ConstantDeclaration {
            declarators,
            fragment,
        })
    }

    fn parse_declarator_list(&mut self) -> Option<DeclaratorList> {
        let first = self.parse_identifier()?;
        let mut fragment = first.fragment;
        let mut identifiers = vec![first];
        while self.at(TokenKind::Separator) {
            self.advance_token();
            let identifier = self.parse_identifier()?;
            fragment.extend(identifier.fragment);
            identifiers.push(identifier);
        }
        Some(DeclaratorList {
            identifiers,
            fragment,
        })
    }

    fn parse_init_declarator_list(&mut self) -> Option<InitDeclaratorList> {
        let first = self.parse_init_declarator()?;
        let mut fragment = first.fragment;
        let mut declarators = vec![first];
        while self.at(TokenKind::Separator) {
            self.advance_token();
            let declarator = self.parse_init_declarator()?;
            fragment.extend(declarator.fragment);
            declarators.push(declarator);
        }
        Some(InitDeclaratorList {
            declarators,
            fragment,
        })
    }

    fn parse_init_declarator(&mut self) -> Option<InitDeclarator> {
        let identifier = self.parse_identifier()?;
        self.consume(TokenKind::InitAssign, "'=' in constant declaration")?;
        let value = self.parse_literal()?;
        let mut fragment = identifier.fragment;
        fragment.extend(value.fragment);
        Some(InitDeclarator {
            identifier,
            value,
            fragment,
        })
    }

    // === Statements ===

    fn parse_compound_statement(&mut self) -> Option<CompoundStatement> {
        let begin = self.consume(TokenKind::Begin, "'BEGIN'")?;
        let statements = self.parse_statement_list()?;
        let end = self.consume(TokenKind::End, "'END' after statement list")?;
        let mut fragment = begin.fragment;
        fragment.extend(end.fragment);
        Some(CompoundStatement {
            statements,
            fragment,
        })
    }

    fn parse_statement_list(&mut self) -> Option<StatementList> {
        let first = self.parse_statement()?;
        let mut fragment = first.fragment();
        let mut statements = vec![first];
        while self.at(TokenKind::StatementTerminator) {
            self.advance_token();
            let statement = self.parse_statement()?;
            fragment.extend(statement.fragment());
            statements.push(statement);
        }
        Some(StatementList {
            statements,
            fragment,
        })
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        if self.at(TokenKind::Return) {
            let keyword = self.advance_token()?;
            let expression = self.parse_additive_expression()?;
            let mut fragment = keyword.fragment;
            fragment.extend(expression.fragment);
            Some(Statement::Return(ReturnStatement {
                expression,
                fragment,
            }))
        } else {
            self.parse_assignment().map(Statement::Assignment)
        }
    }

    fn parse_assignment(&mut self) -> Option<AssignmentExpression> {
        let target = self.parse_identifier()?;
        self.consume(TokenKind::VarAssign, "':=' in assignment")?;
        let value = self.parse_additive_expression()?;
        let mut fragment = target.fragment;
        fragment.extend(value.fragment);
        Some(AssignmentExpression {
            target,
            value,
            fragment,
        })
    }

    // === Expressions ===

    fn parse_additive_expression(&mut self) -> Option<AdditiveExpression> {
        let lhs = self.parse_multiplicative_expression()?;
        let mut fragment = lhs.fragment;

        let operator = match self.peek_kind() {
            Some(TokenKind::Plus) => Some(AdditiveOperator::Plus),
            Some(TokenKind::Minus) => Some(AdditiveOperator::Minus),
            _ => None,
        };
        let rhs = match operator {
            Some(operator) => {
                self.advance_token();
                // Right recursion: `a - b - c` groups as `a - (b - c)`.
                let rhs = self.parse_additive_expression()?;
                fragment.extend(rhs.fragment);
                Some((operator, Box::new(rhs)))
            }
            None => None,
        };

        Some(AdditiveExpression { lhs, rhs, fragment })
    }

    fn parse_multiplicative_expression(&mut self) -> Option<MultiplicativeExpression> {
        let lhs = self.parse_unary_expression()?;
        let mut fragment = lhs.fragment;

        let operator = match self.peek_kind() {
            Some(TokenKind::Mult) => Some(MultiplicativeOperator::Mult),
            Some(TokenKind::Div) => Some(MultiplicativeOperator::Div),
            _ => None,
        };
        let rhs = match operator {
            Some(operator) => {
                self.advance_token();
                let rhs = self.parse_multiplicative_expression()?;
                fragment.extend(rhs.fragment);
                Some((operator, Box::new(rhs)))
            }
            None => None,
        };

        Some(MultiplicativeExpression { lhs, rhs, fragment })
    }

    fn parse_unary_expression(&mut self) -> Option<UnaryExpression> {
        let sign = match self.peek_kind() {
            Some(TokenKind::Plus) => Some(UnaryOperator::Plus),
            Some(TokenKind::Minus) => Some(UnaryOperator::Minus),
            _ => None,
        };
        let sign_fragment = match sign {
            Some(_) => Some(self.advance_token()?.fragment),
            None => None,
        };

        let operand = self.parse_primary_expression()?;
        let mut fragment = sign_fragment.unwrap_or_else(|| operand.fragment());
        fragment.extend(operand.fragment());

        Some(UnaryExpression {
            sign,
            operand,
            fragment,
        })
    }

    fn parse_primary_expression(&mut self) -> Option<PrimaryExpression> {
        match self.peek_kind()? {
            TokenKind::Identifier => self.parse_identifier().map(PrimaryExpression::Identifier),
            TokenKind::Literal => self.parse_literal().map(PrimaryExpression::Literal),
            TokenKind::LParen => {
                let open = self.advance_token()?;
                let expression = self.parse_additive_expression()?;
                let close = self.consume(TokenKind::RParen, "')' closing the expression")?;
                let mut fragment = open.fragment;
                fragment.extend(close.fragment);
                Some(PrimaryExpression::Parenthesized(ParenthesizedExpression {
                    expression: Box::new(expression),
                    fragment,
                }))
            }
            _ => {
                let fragment = self.lookahead.map(|t| t.fragment);
                self.report(
                    ErrorKind::UnexpectedToken,
                    "Expected an identifier, a literal or '('",
                    fragment,
                );
                None
            }
        }
    }

    fn parse_identifier(&mut self) -> Option<Identifier> {
        let token = self.consume(TokenKind::Identifier, "an identifier")?;
        Some(Identifier {
            fragment: token.fragment,
        })
    }

    fn parse_literal(&mut self) -> Option<Literal> {
        let token = self.consume(TokenKind::Literal, "a literal")?;
        let text = self.source.fragment_str(token.fragment);
        match text.parse::<i64>() {
            Ok(value) => Some(Literal {
                value,
                fragment: token.fragment,
            }),
            Err(_) => {
                self.report(
                    ErrorKind::UnexpectedToken,
                    format!("Literal '{text}' does not fit a 64-bit integer"),
                    Some(token.fragment),
                );
                None
            }
        }
    }

    // === Token plumbing ===

    /// Pull the next token into the lookahead slot. A lexical error latches
    /// and leaves the slot empty.
    fn fill_lookahead(&mut self) {
        if self.error.is_some() || self.lookahead.is_some() {
            return;
        }
        match self.lexer.next() {
            Ok(token) => self.lookahead = Some(token),
            Err(error) => self.error = Some(error),
        }
    }

    fn peek_kind(&mut self) -> Option<TokenKind> {
        self.fill_lookahead();
        self.lookahead.map(|token| token.kind)
    }

    /// Whether the next token has the given kind. Never reports an error.
    fn at(&mut self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    /// Take the next token unconditionally.
    fn advance_token(&mut self) -> Option<Token> {
        self.fill_lookahead();
        self.lookahead.take()
    }

    /// Take the next token if it has the expected kind, otherwise latch an
    /// unexpected-token error.
    fn consume(&mut self, expected: TokenKind, what: &str) -> Option<Token> {
        self.fill_lookahead();
        match self.lookahead {
            Some(token) if token.kind == expected => self.lookahead.take(),
            Some(token) => {
                self.report(
                    ErrorKind::UnexpectedToken,
                    format!("Expected {what}"),
                    Some(token.fragment),
                );
                None
            }
            // A lexical error is already latched.
            None => None,
        }
    }

    /// Latch `error` unless one is already recorded.
    fn report(
        &mut self,
        kind: ErrorKind,
        message: impl Into<String>,
        fragment: Option<crate::source::Fragment>,
    ) {
        if self.error.is_none() {
            let fragment =
                fragment.unwrap_or_else(|| crate::source::Fragment::empty_at(self.source.end()));
            self.error = Some(CompileError::new(kind, message, fragment));
        }
    }
}
