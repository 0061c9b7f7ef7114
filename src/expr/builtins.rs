//! Builtin functions and constants available to right-hand-side expressions.
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Exp,
    Ln,
    Log10,
    Log2,
    Sqrt,
    Abs,
    Sin,
    Cos,
    Tan,
    Sinh,
    Cosh,
    Tanh,
    Floor,
    Ceil,
    Pow,
    Min,
    Max,
}

impl Builtin {
    /// Resolve a function name, accepting the capitalized spellings
    /// (`Abs`, `Min`, `Max`) that symbolic-algebra front ends emit.
    pub fn lookup(name: &str) -> Option<Self> {
        let f = match name {
            "exp" => Self::Exp,
            "ln" | "log" => Self::Ln,
            "log10" => Self::Log10,
            "log2" => Self::Log2,
            "sqrt" => Self::Sqrt,
            "abs" | "Abs" => Self::Abs,
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "sinh" => Self::Sinh,
            "cosh" => Self::Cosh,
            "tanh" => Self::Tanh,
            "floor" => Self::Floor,
            "ceil" | "ceiling" => Self::Ceil,
            "pow" | "powf" => Self::Pow,
            "min" | "Min" => Self::Min,
            "max" | "Max" => Self::Max,
            _ => return None,
        };
        Some(f)
    }

    /// Allowed argument count. `log` takes an optional base.
    pub fn arg_count_range(&self) -> RangeInclusive<usize> {
        match self {
            Self::Ln => 1..=2,
            Self::Pow => 2..=2,
            Self::Min | Self::Max => 2..=usize::MAX,
            _ => 1..=1,
        }
    }

    /// Evaluate the function. An argument count outside
    /// [arg_count_range](Self::arg_count_range) yields NaN.
    pub fn apply(&self, args: &[f64]) -> f64 {
        if !self.arg_count_range().contains(&args.len()) {
            return f64::NAN;
        }
        match self {
            Self::Exp => args[0].exp(),
            Self::Ln => match args.get(1) {
                Some(base) => args[0].ln() / base.ln(),
                None => args[0].ln(),
            },
            Self::Log10 => args[0].log10(),
            Self::Log2 => args[0].log2(),
            Self::Sqrt => args[0].sqrt(),
            Self::Abs => args[0].abs(),
            Self::Sin => args[0].sin(),
            Self::Cos => args[0].cos(),
            Self::Tan => args[0].tan(),
            Self::Sinh => args[0].sinh(),
            Self::Cosh => args[0].cosh(),
            Self::Tanh => args[0].tanh(),
            Self::Floor => args[0].floor(),
            Self::Ceil => args[0].ceil(),
            Self::Pow => args[0].powf(args[1]),
            Self::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Named constants. Declared states and parameters shadow these.
pub fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(std::f64::consts::PI),
        "E" => Some(std::f64::consts::E),
        _ => None,
    }
}
