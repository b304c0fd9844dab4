//! # PLJIT
//!
//! A just-in-time compiler library for PL, a small imperative language over
//! 64-bit signed integers. A host registers PL source once and thereafter
//! invokes it like a function: integer arguments in, an integer result out,
//! or `None` for a program that failed to compile or divided by zero.
//!
//! ## Pipeline
//!
//! A registered program is compiled lazily, on its first call, through five
//! stages:
//!
//! 1. **Source management** - line/column addressing over the owned text
//! 2. **Lexer** - one token of lookahead over typed, source-anchored tokens
//! 3. **Parser** - recursive descent into a concrete parse tree
//! 4. **Semantic analysis** - symbol table construction and lowering to a
//!    typed AST
//! 5. **Optimizer** - in-place passes: unary-plus removal, constant
//!    propagation, dead-code elimination
//!
//! Evaluation walks the optimized AST against a per-call execution context;
//! there is no native code generation. Compilation runs exactly once per
//! program, even under concurrent first calls, and its outcome (success or
//! failure) is cached for the registry's lifetime.
//!
//! ## Example
//!
//! ```rust
//! use pljit::Pljit;
//!
//! let jit = Pljit::new();
//! let volume = jit.register_function(
//!     "PARAM w, h, d;\n\
//!      VAR volume;\n\
//!      CONST density = 2400;\n\
//!      BEGIN\n\
//!      volume := w * h * d;\n\
//!      RETURN density * volume\n\
//!      END.",
//! );
//!
//! assert_eq!(volume.call(&[10, 10, 10]), Some(2_400_000));
//! assert_eq!(volume.call(&[1, 1, 1]), Some(2400));
//! ```

pub mod analysis;
pub mod error;
pub mod execution;
pub mod jit;
pub mod lexer;
pub mod optimizer;
pub mod parser;
pub mod source;

pub use jit::{FunctionHandle, Pljit};
