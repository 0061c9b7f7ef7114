use crate::expr::builtins::Builtin;

/// Stack machine instructions for one compiled right-hand side.
#[derive(Debug, Clone, PartialEq)]
pub enum Opcode {
    PushConst(f64),
    /// push args[idx] from the flat `[states..., parameters...]` list
    LoadArg(usize),
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    /// builtin and argument count
    Call(Builtin, usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    code: Vec<Opcode>,
    max_stack: usize,
}

impl Program {
    pub(crate) fn new(code: Vec<Opcode>, max_stack: usize) -> Self {
        Self { code, max_stack }
    }

    pub fn code(&self) -> &[Opcode] {
        &self.code
    }

    /// Deepest stack the program reaches
    pub fn max_stack(&self) -> usize {
        self.max_stack
    }

    /// Execute the program. `load` supplies argument values by flat index;
    /// `stack` is scratch space and is left empty on return.
    #[inline]
    pub fn run<F>(&self, load: F, stack: &mut Vec<f64>) -> f64
    where
        F: Fn(usize) -> f64,
    {
        stack.clear();
        for op in &self.code {
            match op {
                Opcode::PushConst(v) => stack.push(*v),
                Opcode::LoadArg(i) => stack.push(load(*i)),
                Opcode::Neg => {
                    let a = stack.pop().unwrap_or(f64::NAN);
                    stack.push(-a);
                }
                Opcode::Call(f, argc) => {
                    let at = stack.len().saturating_sub(*argc);
                    let v = f.apply(&stack[at..]);
                    stack.truncate(at);
                    stack.push(v);
                }
                Opcode::Add => binary(stack, |a, b| a + b),
                Opcode::Sub => binary(stack, |a, b| a - b),
                Opcode::Mul => binary(stack, |a, b| a * b),
                Opcode::Div => binary(stack, |a, b| a / b),
                Opcode::Pow => binary(stack, f64::powf),
            }
        }
        stack.pop().unwrap_or(f64::NAN)
    }
}

#[inline(always)]
fn binary(stack: &mut Vec<f64>, f: impl Fn(f64, f64) -> f64) {
    let b = stack.pop().unwrap_or(f64::NAN);
    let a = stack.pop().unwrap_or(f64::NAN);
    stack.push(f(a, b));
}
