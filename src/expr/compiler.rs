use ndarray::parallel::prelude::*;
use ndarray::{Array2, ArrayView1, Axis};

use crate::expr::ast::Expr;
use crate::expr::builtins::{self, Builtin};
use crate::expr::parser;
use crate::expr::symbols::{SymbolKind, SymbolTable};
use crate::expr::vm::{Opcode, Program};
use crate::PkodeError;

/// Binds state and parameter names and compiles right-hand sides against them.
#[derive(Debug, Clone)]
pub struct ExpressionCompiler {
    symbols: SymbolTable,
}

impl ExpressionCompiler {
    /// Build the binding table. Fails with [PkodeError::NameCollision] when a
    /// name is declared twice.
    pub fn new(
        states: &[impl AsRef<str>],
        parameters: &[impl AsRef<str>],
    ) -> Result<Self, PkodeError> {
        Ok(Self {
            symbols: SymbolTable::new(states, parameters)?,
        })
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Parse one right-hand side and check that every identifier and function
    /// it references is bound.
    pub fn parse(&self, rhs: &str) -> Result<Expr, PkodeError> {
        let expr = parser::parse(rhs).map_err(|source| PkodeError::ExpressionParse {
            expression: rhs.to_string(),
            source,
        })?;
        self.check_bound(&expr, rhs)?;
        Ok(expr)
    }

    fn check_bound(&self, expr: &Expr, rhs: &str) -> Result<(), PkodeError> {
        match expr {
            Expr::Number(_) => Ok(()),
            Expr::Ident(name) => {
                if self.symbols.resolve(name).is_some() || builtins::constant(name).is_some() {
                    Ok(())
                } else {
                    Err(PkodeError::undefined_symbol(name, rhs))
                }
            }
            Expr::UnaryOp { rhs: inner, .. } => self.check_bound(inner, rhs),
            Expr::BinaryOp { lhs, rhs: r, .. } => {
                self.check_bound(lhs, rhs)?;
                self.check_bound(r, rhs)
            }
            Expr::Call { name, args } => {
                if Builtin::lookup(name).is_none() {
                    return Err(PkodeError::undefined_symbol(name, rhs));
                }
                args.iter().try_for_each(|a| self.check_bound(a, rhs))
            }
        }
    }

    /// Parse and compile the ordered right-hand sides into one evaluator.
    ///
    /// Output `i` of the evaluator is the value of `rhs[i]`.
    pub fn compile(self, rhs: &[impl AsRef<str>]) -> Result<CompiledEvaluator, PkodeError> {
        let mut programs = Vec::with_capacity(rhs.len());
        for source in rhs {
            let expr = self.parse(source.as_ref())?;
            let mut lowering = Lowering::default();
            lowering.emit(&expr, &self.symbols);
            programs.push(Program::new(lowering.code, lowering.max_depth));
        }
        let max_stack = programs.iter().map(Program::max_stack).max().unwrap_or(0);
        tracing::debug!(
            nstates = self.symbols.nstates(),
            nparams = self.symbols.nparams(),
            nequations = programs.len(),
            "compiled right-hand sides"
        );
        Ok(CompiledEvaluator {
            symbols: self.symbols,
            programs,
            max_stack,
        })
    }
}

/// Compile `rhs` against `states` and `parameters` in one call.
pub fn compile(
    states: &[impl AsRef<str>],
    parameters: &[impl AsRef<str>],
    rhs: &[impl AsRef<str>],
) -> Result<CompiledEvaluator, PkodeError> {
    ExpressionCompiler::new(states, parameters)?.compile(rhs)
}

// AST -> postfix bytecode, tracking stack depth
#[derive(Default)]
struct Lowering {
    code: Vec<Opcode>,
    depth: usize,
    max_depth: usize,
}

impl Lowering {
    fn push(&mut self, op: Opcode) {
        match &op {
            Opcode::PushConst(_) | Opcode::LoadArg(_) => self.depth += 1,
            Opcode::Neg => {}
            Opcode::Call(_, argc) => self.depth = self.depth + 1 - argc,
            _ => self.depth -= 1,
        }
        self.max_depth = self.max_depth.max(self.depth);
        self.code.push(op);
    }

    // Identifiers were checked by `check_bound`
    fn emit(&mut self, expr: &Expr, symbols: &SymbolTable) {
        match expr {
            Expr::Number(v) => self.push(Opcode::PushConst(*v)),
            Expr::Ident(name) => match symbols.resolve(name) {
                Some(symbol) => self.push(Opcode::LoadArg(symbol.index())),
                None => self.push(Opcode::PushConst(
                    builtins::constant(name).unwrap_or(f64::NAN),
                )),
            },
            Expr::UnaryOp { rhs, .. } => match rhs.as_ref() {
                Expr::Number(v) => self.push(Opcode::PushConst(-v)),
                _ => {
                    self.emit(rhs, symbols);
                    self.push(Opcode::Neg);
                }
            },
            Expr::BinaryOp { lhs, op, rhs } => {
                self.emit(lhs, symbols);
                self.emit(rhs, symbols);
                self.push(match op {
                    '+' => Opcode::Add,
                    '-' => Opcode::Sub,
                    '*' => Opcode::Mul,
                    '/' => Opcode::Div,
                    _ => Opcode::Pow,
                });
            }
            Expr::Call { name, args } => {
                for a in args {
                    self.emit(a, symbols);
                }
                if let Some(f) = Builtin::lookup(name) {
                    self.push(Opcode::Call(f, args.len()));
                }
            }
        }
    }
}

/// A pure numeric function from `[states..., parameters...]` to the ordered
/// right-hand-side values.
///
/// The evaluator holds no mutable state; it is `Send + Sync` and can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct CompiledEvaluator {
    symbols: SymbolTable,
    programs: Vec<Program>,
    max_stack: usize,
}

impl CompiledEvaluator {
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Number of arguments the evaluator takes
    pub fn arity(&self) -> usize {
        self.symbols.len()
    }

    /// Number of values the evaluator returns
    pub fn noutputs(&self) -> usize {
        self.programs.len()
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    /// Evaluate with a flat argument list.
    pub fn call(&self, args: &[f64]) -> Result<Vec<f64>, PkodeError> {
        if args.len() != self.arity() {
            return Err(PkodeError::ArgumentCount {
                expected: self.arity(),
                got: args.len(),
            });
        }
        let mut out = vec![0.0; self.noutputs()];
        self.eval_with(|i| args[i], &mut out);
        Ok(out)
    }

    /// Evaluate with states and parameters supplied separately, avoiding the
    /// concatenation of a flat argument list.
    ///
    /// `states` must hold `nstates` values, `params` `nparams` values and
    /// `out` `noutputs` slots.
    #[inline]
    pub fn eval_split(&self, states: &[f64], params: &[f64], out: &mut [f64]) {
        let nstates = self.symbols.nstates();
        self.eval_with(
            |i| {
                if i < nstates {
                    states[i]
                } else {
                    params[i - nstates]
                }
            },
            out,
        );
    }

    #[inline]
    pub(crate) fn eval_with<F>(&self, load: F, out: &mut [f64])
    where
        F: Fn(usize) -> f64,
    {
        let mut stack = Vec::with_capacity(self.max_stack);
        for (slot, program) in out.iter_mut().zip(&self.programs) {
            *slot = program.run(&load, &mut stack);
        }
    }

    /// Elementwise evaluation over arrays.
    ///
    /// Each argument is a 1-D array of length `n` or a length-1 array that is
    /// broadcast as a scalar. Returns an `(noutputs, n)` array.
    pub fn eval_batch(&self, args: &[ArrayView1<f64>]) -> Result<Array2<f64>, PkodeError> {
        if args.len() != self.arity() {
            return Err(PkodeError::ArgumentCount {
                expected: self.arity(),
                got: args.len(),
            });
        }
        let n = args.iter().map(|a| a.len()).max().unwrap_or(1);
        for (index, a) in args.iter().enumerate() {
            if a.len() != 1 && a.len() != n {
                return Err(PkodeError::BatchShape {
                    index,
                    len: a.len(),
                    expected: n,
                });
            }
        }

        let mut out = Array2::zeros((self.noutputs(), n));
        out.axis_iter_mut(Axis(1))
            .into_par_iter()
            .enumerate()
            .for_each(|(j, mut column)| {
                let mut stack = Vec::with_capacity(self.max_stack);
                let load = |i: usize| {
                    let a = &args[i];
                    if a.len() == 1 {
                        a[0]
                    } else {
                        a[j]
                    }
                };
                for (k, program) in self.programs.iter().enumerate() {
                    column[k] = program.run(&load, &mut stack);
                }
            });
        Ok(out)
    }

    /// Parameter names in the order the evaluator expects their values.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.symbols.parameter_names()
    }

    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.symbols.state_names()
    }

    /// Whether output `i` reads any state at all
    pub fn depends_on_states(&self, i: usize) -> bool {
        self.programs.get(i).is_some_and(|p| {
            p.code().iter().any(|op| {
                matches!(op, Opcode::LoadArg(a)
                    if self.symbols.symbols()[*a].kind() == SymbolKind::State)
            })
        })
    }
}
