//! Right-hand-side expression compiler
//!
//! Turns the textual right-hand sides of a model into a single numeric
//! evaluator:
//!
//! 1. [SymbolTable] binds every state and parameter name to a position in the
//!    flat argument list `[states..., parameters...]`.
//! 2. [tokenize] and [Parser] turn each expression into an [Expr] tree. The
//!    grammar covers numbers, identifiers, `+ - * / ^` (`**` is accepted for
//!    `^`), unary signs, parentheses and builtin function calls.
//! 3. The trees are checked against the table and lowered to stack
//!    [Opcode]s, one [Program] per equation, bundled into a
//!    [CompiledEvaluator].
//!
//! ```rust
//! use pkode::expr::compile;
//!
//! let f = compile(&["A", "C"], &["ka", "ke"], &["-ka * A", "ka * A - ke * C"])?;
//! assert_eq!(f.call(&[100.0, 5.0, 1.0, 0.2])?, vec![-100.0, 99.0]);
//! # Ok::<(), pkode::PkodeError>(())
//! ```
mod ast;
mod builtins;
mod compiler;
mod parser;
mod symbols;
mod vm;

pub use ast::{Expr, ParseError, Token};
pub use builtins::Builtin;
pub use compiler::{compile, CompiledEvaluator, ExpressionCompiler};
pub use parser::{parse, tokenize, tokenize_spanned, Parser, Spanned};
pub use symbols::{Symbol, SymbolKind, SymbolTable};
pub use vm::{Opcode, Program};
