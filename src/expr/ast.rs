// AST and token types for the right-hand-side expression language
use std::fmt;

/// Parsed right-hand-side expression.
///
/// Identifiers are kept by name here; binding them to argument slots happens
/// when the tree is lowered to bytecode.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Ident(String),
    UnaryOp {
        op: char,
        rhs: Box<Expr>,
    },
    BinaryOp {
        lhs: Box<Expr>,
        op: char,
        rhs: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Visit every identifier referenced by the expression, including
    /// function names, in source order.
    pub fn walk_idents<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a str),
    {
        match self {
            Expr::Number(_) => {}
            Expr::Ident(name) => f(name),
            Expr::UnaryOp { rhs, .. } => rhs.walk_idents(f),
            Expr::BinaryOp { lhs, rhs, .. } => {
                lhs.walk_idents(f);
                rhs.walk_idents(f);
            }
            Expr::Call { name, args } => {
                f(name);
                for a in args {
                    a.walk_idents(f);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Num(f64),
    Ident(String),
    LParen,
    RParen,
    Comma,
    Op(char),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Num(v) => write!(f, "{}", v),
            Token::Ident(id) => write!(f, "'{}'", id),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Comma => write!(f, "','"),
            Token::Op(c) => write!(f, "'{}'", c),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub pos: usize,
    pub found: Option<String>,
    pub expected: Vec<String>,
}

impl ParseError {
    pub(crate) fn new(pos: usize, found: Option<String>, expected: &[&str]) -> Self {
        Self {
            pos,
            found,
            expected: expected.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let found = self.found.as_deref().unwrap_or("<end>");
        if self.expected.is_empty() {
            write!(f, "unexpected {} at position {}", found, self.pos)
        } else {
            write!(
                f,
                "unexpected {} at position {}, expected {}",
                found,
                self.pos,
                self.expected.join(" or ")
            )
        }
    }
}

impl std::error::Error for ParseError {}
