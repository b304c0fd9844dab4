//! # Registry / Facade
//!
//! The public entry point of the crate. A [`Pljit`] registry accepts PL
//! source once per program and hands back a [`FunctionHandle`]; the first
//! call through any handle compiles the program, every later call reuses the
//! cached result.
//!
//! ## Compilation protocol
//!
//! Each registered function owns its source and a `OnceCell` holding the
//! compilation outcome. `OnceCell::get_or_init` runs the pipeline (lex,
//! parse, semantic analysis, optimization) exactly once per function, no
//! matter how many threads race on the first call: late arrivals block until
//! the winner has stored the outcome, and every subsequent call takes the
//! lock-free fast path. A failed compilation is cached the same way as a
//! successful one; repeated calls on a broken program return `None` without
//! retrying.
//!
//! The compiled AST and symbol table are immutable after initialization and
//! shared read-only across threads. Runtime state lives in a fresh
//! [`ExecutionContext`] per call, so a runtime trap (division by zero) never
//! poisons the function.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;

use crate::analysis::{ast, AstBuilder};
use crate::error::{CompileError, ErrorKind};
use crate::execution::ExecutionContext;
use crate::optimizer::passes::{ConstantPropagation, DeadCodeElimination, UnaryPlusRemoval};
use crate::optimizer::Pass;
use crate::parser::Parser;
use crate::source::{Fragment, SourceBuffer};

/// A registered program and its lazily compiled form.
pub struct Function {
    source: SourceBuffer,
    program: OnceCell<Result<ast::Function, CompileError>>,
    /// Number of pipeline runs; stays at one for the registry's lifetime.
    compile_invocations: AtomicUsize,
}

impl Function {
    fn new(source: String) -> Self {
        Self {
            source: SourceBuffer::new(source),
            program: OnceCell::new(),
            compile_invocations: AtomicUsize::new(0),
        }
    }

    /// The compilation outcome, compiling on first use.
    fn program(&self) -> &Result<ast::Function, CompileError> {
        self.program.get_or_init(|| self.compile())
    }

    fn compile(&self) -> Result<ast::Function, CompileError> {
        self.compile_invocations.fetch_add(1, Ordering::Relaxed);

        let result = self.compile_pipeline();
        if let Err(error) = &result {
            eprintln!("{}", error.render(&self.source));
        }
        result
    }

    fn compile_pipeline(&self) -> Result<ast::Function, CompileError> {
        let mut parser = Parser::new(&self.source);
        let tree = match parser.parse_function_definition() {
            Some(tree) => tree,
            None => {
                return Err(parser.take_error().unwrap_or_else(|| {
                    CompileError::new(
                        ErrorKind::UnexpectedToken,
                        "Syntax error",
                        Fragment::empty_at(self.source.end()),
                    )
                }))
            }
        };

        let mut function = AstBuilder::build(&self.source, &tree)?;

        UnaryPlusRemoval.optimize_function(&mut function);
        ConstantPropagation::new().optimize_function(&mut function);
        DeadCodeElimination.optimize_function(&mut function);

        Ok(function)
    }

    /// Invoke the function. `None` reports a cached compilation failure or a
    /// runtime trap; `arguments` must match the declared parameter count on
    /// a successfully compiled program.
    pub fn call(&self, arguments: &[i64]) -> Option<i64> {
        let function = self.program().as_ref().ok()?;
        let mut context = ExecutionContext::new(&function.symbols, arguments);
        function.evaluate(&mut context)?;
        context.result()
    }

    /// How many times the compilation pipeline actually ran.
    pub fn compile_invocations(&self) -> usize {
        self.compile_invocations.load(Ordering::Relaxed)
    }

    /// The cached compilation failure, if any. Triggers compilation when the
    /// function has not been called yet.
    pub fn compile_error(&self) -> Option<&CompileError> {
        self.program().as_ref().err()
    }
}

/// The compiler registry. Owns every registered function; registration is
/// append-only and safe to race with registrations from other threads.
#[derive(Default)]
pub struct Pljit {
    functions: Mutex<Vec<Arc<Function>>>,
}

impl Pljit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register PL source. Nothing is compiled yet; the first call through
    /// the returned handle is.
    pub fn register_function(&self, source: impl Into<String>) -> FunctionHandle {
        let function = Arc::new(Function::new(source.into()));
        let mut functions = self.functions.lock().unwrap();
        functions.push(Arc::clone(&function));
        FunctionHandle { function }
    }

    /// A fresh handle for the `id`-th registered function, in registration
    /// order.
    pub fn get(&self, id: usize) -> FunctionHandle {
        let functions = self.functions.lock().unwrap();
        FunctionHandle {
            function: Arc::clone(&functions[id]),
        }
    }
}

/// A lightweight, clonable reference to one registered function. Handles can
/// cross threads freely; all clones share the same one-shot compilation.
#[derive(Clone)]
pub struct FunctionHandle {
    function: Arc<Function>,
}

impl FunctionHandle {
    /// See [`Function::call`].
    pub fn call(&self, arguments: &[i64]) -> Option<i64> {
        self.function.call(arguments)
    }

    pub fn compile_invocations(&self) -> usize {
        self.function.compile_invocations()
    }

    pub fn compile_error(&self) -> Option<&CompileError> {
        self.function.compile_error()
    }
}
