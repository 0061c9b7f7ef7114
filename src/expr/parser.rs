use std::ops::RangeInclusive;

use crate::expr::ast::{Expr, ParseError, Token};
use crate::expr::builtins::Builtin;

/// A token paired with the character offset it starts at
pub type Spanned = (usize, Token);

// Tokenizer + recursive-descent parser
pub fn tokenize(s: &str) -> Result<Vec<Token>, ParseError> {
    Ok(tokenize_spanned(s)?.into_iter().map(|(_, tok)| tok).collect())
}

/// Like [tokenize], keeping the character offset of every token.
pub fn tokenize_spanned(s: &str) -> Result<Vec<Spanned>, ParseError> {
    let chars: Vec<char> = s.chars().collect();
    let mut toks = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(char::is_ascii_digit))
        {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            // exponent only when digits follow, so `2*E` style input is left alone
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    i = j;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            let num: String = chars[start..i].iter().collect();
            match num.parse::<f64>() {
                Ok(v) => toks.push((start, Token::Num(v))),
                Err(_) => {
                    return Err(ParseError::new(
                        start,
                        Some(format!("malformed number '{}'", num)),
                        &[],
                    ))
                }
            }
            continue;
        }
        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            toks.push((start, Token::Ident(chars[start..i].iter().collect())));
            continue;
        }
        match c {
            '(' => toks.push((i, Token::LParen)),
            ')' => toks.push((i, Token::RParen)),
            ',' => toks.push((i, Token::Comma)),
            '*' if chars.get(i + 1) == Some(&'*') => {
                toks.push((i, Token::Op('^')));
                i += 1;
            }
            '+' | '-' | '*' | '/' | '^' => toks.push((i, Token::Op(c))),
            _ => {
                return Err(ParseError::new(
                    i,
                    Some(format!("character '{}'", c)),
                    &[],
                ))
            }
        }
        i += 1;
    }
    Ok(toks)
}

/// Recursive-descent parser over spanned tokens.
///
/// `pos` indexes `tokens`; errors report the character offset of the token
/// at `pos`, or `end` once the input is exhausted.
pub struct Parser {
    tokens: Vec<Spanned>,
    end: usize,
    pos: usize,
    expected: Vec<String>,
}

impl Parser {
    /// `end` is the length of the source in characters.
    pub fn new(tokens: Vec<Spanned>, end: usize) -> Self {
        Self {
            tokens,
            end,
            pos: 0,
            expected: Vec::new(),
        }
    }

    fn expected_push(&mut self, s: &str) {
        if !self.expected.iter().any(|e| e == s) {
            self.expected.push(s.to_string());
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, tok)| tok)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(offset, _)| *offset)
    }

    fn next(&mut self) -> Option<&Token> {
        let r = self.tokens.get(self.pos).map(|(_, tok)| tok);
        if r.is_some() {
            self.pos += 1;
        }
        r
    }

    /// Parse a complete expression; every token must be consumed.
    pub fn parse_expr_result(&mut self) -> Result<Expr, ParseError> {
        match self.parse_expr() {
            Some(expr) if self.peek().is_none() => Ok(expr),
            Some(_) => {
                self.expected.clear();
                self.expected_push("operator");
                Err(self.error())
            }
            None => Err(self.error()),
        }
    }

    fn error(&self) -> ParseError {
        ParseError {
            pos: self.offset(),
            found: self.peek().map(|t| t.to_string()),
            expected: self.expected.clone(),
        }
    }

    pub fn parse_expr(&mut self) -> Option<Expr> {
        self.parse_add_sub()
    }

    fn parse_add_sub(&mut self) -> Option<Expr> {
        let mut node = self.parse_mul_div()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek().cloned() {
            self.next();
            let rhs = self.parse_mul_div()?;
            node = Expr::BinaryOp {
                lhs: Box::new(node),
                op,
                rhs: Box::new(rhs),
            };
        }
        Some(node)
    }

    fn parse_mul_div(&mut self) -> Option<Expr> {
        let mut node = self.parse_unary()?;
        while let Some(Token::Op(op @ ('*' | '/'))) = self.peek().cloned() {
            self.next();
            let rhs = self.parse_unary()?;
            node = Expr::BinaryOp {
                lhs: Box::new(node),
                op,
                rhs: Box::new(rhs),
            };
        }
        Some(node)
    }

    // unary minus binds looser than `^`: -x^2 == -(x^2)
    fn parse_unary(&mut self) -> Option<Expr> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.next();
                let rhs = self.parse_unary()?;
                Some(Expr::UnaryOp {
                    op: '-',
                    rhs: Box::new(rhs),
                })
            }
            Some(Token::Op('+')) => {
                self.next();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Option<Expr> {
        let node = self.parse_primary()?;
        if let Some(Token::Op('^')) = self.peek() {
            self.next();
            // right-associative, and allows a signed exponent: 2^-1
            let rhs = self.parse_unary()?;
            return Some(Expr::BinaryOp {
                lhs: Box::new(node),
                op: '^',
                rhs: Box::new(rhs),
            });
        }
        Some(node)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let tok = match self.next().cloned() {
            Some(tok) => tok,
            None => {
                self.expected_push("number|identifier|'('");
                return None;
            }
        };
        match tok {
            Token::Num(v) => Some(Expr::Number(v)),
            Token::Ident(id) => {
                if let Some(Token::LParen) = self.peek() {
                    let name_pos = self.pos - 1;
                    self.next();
                    let args = self.parse_args()?;
                    if let Some(builtin) = Builtin::lookup(&id) {
                        let arity = builtin.arg_count_range();
                        if !arity.contains(&args.len()) {
                            self.pos = name_pos;
                            self.expected.clear();
                            self.expected_push(&describe_arity(&id, &arity));
                            return None;
                        }
                    }
                    Some(Expr::Call { name: id, args })
                } else {
                    Some(Expr::Ident(id))
                }
            }
            Token::LParen => {
                let expr = self.parse_expr()?;
                if let Some(Token::RParen) = self.peek() {
                    self.next();
                    Some(expr)
                } else {
                    self.expected_push(")");
                    None
                }
            }
            _ => {
                // report the offending token, not the one after it
                self.pos -= 1;
                self.expected_push("number|identifier|'('");
                None
            }
        }
    }

    // Argument list after the opening parenthesis, consuming the closing one.
    fn parse_args(&mut self) -> Option<Vec<Expr>> {
        let mut args = Vec::new();
        if let Some(Token::RParen) = self.peek() {
            self.next();
            return Some(args);
        }
        loop {
            args.push(self.parse_expr()?);
            match self.peek() {
                Some(Token::Comma) => {
                    self.next();
                }
                Some(Token::RParen) => {
                    self.next();
                    return Some(args);
                }
                _ => {
                    self.expected_push(",|)");
                    return None;
                }
            }
        }
    }
}

fn describe_arity(name: &str, arity: &RangeInclusive<usize>) -> String {
    match (*arity.start(), *arity.end()) {
        (1, 1) => format!("1 argument to {}()", name),
        (lo, hi) if lo == hi => format!("{} arguments to {}()", lo, name),
        (lo, usize::MAX) => format!("at least {} arguments to {}()", lo, name),
        (lo, hi) => format!("{} to {} arguments to {}()", lo, hi, name),
    }
}

/// Tokenize and parse a single expression string.
pub fn parse(s: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize_spanned(s)?;
    Parser::new(tokens, s.chars().count()).parse_expr_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: f64) -> Box<Expr> {
        Box::new(Expr::Number(v))
    }

    fn ident(s: &str) -> Box<Expr> {
        Box::new(Expr::Ident(s.to_string()))
    }

    #[test]
    fn tokenize_scientific_and_double_star() {
        let toks = tokenize("1.5e-3 ** x").unwrap();
        assert_eq!(
            toks,
            vec![
                Token::Num(1.5e-3),
                Token::Op('^'),
                Token::Ident("x".to_string())
            ]
        );
    }

    #[test]
    fn tokenize_rejects_unknown_character() {
        let err = tokenize("k * C $ 2").unwrap_err();
        assert_eq!(err.pos, 6);
        assert!(err.to_string().contains("'$'"));
    }

    #[test]
    fn unary_minus_binds_looser_than_power() {
        let expr = parse("-x^2").unwrap();
        assert_eq!(
            expr,
            Expr::UnaryOp {
                op: '-',
                rhs: Box::new(Expr::BinaryOp {
                    lhs: ident("x"),
                    op: '^',
                    rhs: num(2.0),
                }),
            }
        );
    }

    #[test]
    fn power_is_right_associative() {
        let expr = parse("2^3^2").unwrap();
        assert_eq!(
            expr,
            Expr::BinaryOp {
                lhs: num(2.0),
                op: '^',
                rhs: Box::new(Expr::BinaryOp {
                    lhs: num(3.0),
                    op: '^',
                    rhs: num(2.0),
                }),
            }
        );
    }

    #[test]
    fn subtraction_is_left_associative() {
        let expr = parse("a - b - c").unwrap();
        assert_eq!(
            expr,
            Expr::BinaryOp {
                lhs: Box::new(Expr::BinaryOp {
                    lhs: ident("a"),
                    op: '-',
                    rhs: ident("b"),
                }),
                op: '-',
                rhs: ident("c"),
            }
        );
    }

    #[test]
    fn parses_function_calls() {
        let expr = parse("Vmax * C / (Km + C) + exp(-k*t)").unwrap();
        let mut names = Vec::new();
        expr.walk_idents(&mut |n| names.push(n.to_string()));
        assert_eq!(names, vec!["Vmax", "C", "Km", "C", "exp", "k", "t"]);
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["", "k *", "(k * C", "k C", "exp(k,", "* k", "k)"] {
            assert!(parse(bad).is_err(), "'{}' should not parse", bad);
        }
    }

    #[test]
    fn checks_builtin_arity() {
        let err = parse("k * exp(C, 2)").unwrap_err();
        assert_eq!(err.pos, 4);
        assert_eq!(err.expected, vec!["1 argument to exp()".to_string()]);
        assert!(parse("log(C, 10)").is_ok());
        assert!(parse("max(C)").is_err());
        // unknown functions are left to symbol resolution
        assert!(parse("foo(C, 1, 2)").is_ok());
    }

    #[test]
    fn trailing_token_error_points_at_token() {
        let err = parse("k C").unwrap_err();
        assert_eq!(err.pos, 2);
        assert_eq!(err.found.as_deref(), Some("'C'"));
    }

    #[test]
    fn error_positions_are_character_offsets() {
        let spanned = tokenize_spanned("ka *  A").unwrap();
        let offsets: Vec<usize> = spanned.iter().map(|(o, _)| *o).collect();
        assert_eq!(offsets, vec![0, 3, 6]);

        let err = parse("ka *  ) + A").unwrap_err();
        assert_eq!(err.pos, 6);
        assert!(err.to_string().contains("at position 6"));

        let err = parse("(ka * A").unwrap_err();
        assert_eq!(err.pos, 7);
        assert_eq!(err.found, None);

        let err = parse("2 ** k ** C ,").unwrap_err();
        assert_eq!(err.pos, 12);
    }
}
