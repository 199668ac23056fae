//! Lexer and recursive-descent parser for rewritten formulas.
//!
//! The accepted language is a JavaScript expression subset: literals,
//! variables, unary/binary/logical/conditional operators, a fixed set of
//! function calls and value methods. There is no assignment, no indexing and
//! no way to reach anything that is not a bound variable or a builtin.
//!
//! Precedence, lowest first:
//! - `parse_conditional`: `c ? a : b`
//! - `parse_or`: `||`, `??`
//! - `parse_and`: `&&`
//! - `parse_equality`: `==`, `!=`, `===`, `!==`
//! - `parse_relational`: `<`, `<=`, `>`, `>=`
//! - `parse_additive`: `+`, `-`
//! - `parse_multiplicative`: `*`, `/`, `%`
//! - `parse_exponent`: `**` (right associative)
//! - `parse_unary`: `-`, `+`, `!`
//! - `parse_postfix`: `.name`, `.name(args)`
//! - `parse_primary`: literals, identifiers, calls, `( … )`

use crate::error::{EvalError, Result};

use super::value::Scalar;

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Op(&'static str),
    LParen,
    RParen,
    Comma,
    Dot,
    Question,
    Colon,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::Str(_) => "string".to_string(),
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::Op(op) => format!("'{}'", op),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::Question => "'?'".to_string(),
            Token::Colon => "':'".to_string(),
        }
    }
}

/// Nesting allowed before a formula is rejected. Bounds both parser
/// recursion and the depth of the resulting tree.
const MAX_DEPTH: usize = 128;

/// Longest operators first so `===` is not lexed as `==` `=`.
const OPERATORS: &[&str] = &[
    "===", "!==", "**", "==", "!=", "<=", ">=", "&&", "||", "??", "+", "-", "*", "/", "%", "<",
    ">", "!",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Nullish,
}

/// Parsed expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Scalar),
    Var(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Logical(LogicalOp, Box<Expr>, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
    /// Free function call; `callee` is the dotted name (`Math.round`).
    Call { callee: String, args: Vec<Expr> },
    Method {
        target: Box<Expr>,
        name: String,
        args: Vec<Expr>,
    },
    Property { target: Box<Expr>, name: String },
}

fn tokenize(src: &str) -> Result<Vec<(Token, usize)>> {
    let chars: Vec<(usize, char)> = src.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (offset, ch) = chars[i];

        if ch.is_whitespace() {
            i += 1;
            continue;
        }

        let next_is_digit = chars.get(i + 1).is_some_and(|(_, c)| c.is_ascii_digit());
        if ch.is_ascii_digit() || (ch == '.' && next_is_digit) {
            let start = i;
            while i < chars.len() && (chars[i].1.is_ascii_digit() || chars[i].1 == '.') {
                i += 1;
            }
            if i < chars.len() && matches!(chars[i].1, 'e' | 'E') {
                let mut j = i + 1;
                if j < chars.len() && matches!(chars[j].1, '+' | '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].1.is_ascii_digit() {
                    i = j;
                    while i < chars.len() && chars[i].1.is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            let literal: String = chars[start..i].iter().map(|(_, c)| *c).collect();
            let n = literal
                .parse::<f64>()
                .map_err(|_| EvalError::InvalidNumber(literal.clone()))?;
            tokens.push((Token::Number(n), offset));
            continue;
        }

        if ch.is_alphabetic() || ch == '_' || ch == '$' {
            let start = i;
            while i < chars.len()
                && (chars[i].1.is_alphanumeric() || chars[i].1 == '_' || chars[i].1 == '$')
            {
                i += 1;
            }
            let ident: String = chars[start..i].iter().map(|(_, c)| *c).collect();
            tokens.push((Token::Ident(ident), offset));
            continue;
        }

        if ch == '\'' || ch == '"' {
            let (literal, next) = lex_string(&chars, i)?;
            tokens.push((Token::Str(literal), offset));
            i = next;
            continue;
        }

        let simple = match ch {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ',' => Some(Token::Comma),
            '.' => Some(Token::Dot),
            '?' if chars.get(i + 1).map(|(_, c)| *c) != Some('?') => Some(Token::Question),
            ':' => Some(Token::Colon),
            _ => None,
        };
        if let Some(token) = simple {
            tokens.push((token, offset));
            i += 1;
            continue;
        }

        let rest = &src[offset..];
        let Some(op) = OPERATORS.iter().copied().find(|op| rest.starts_with(op)) else {
            return Err(EvalError::UnexpectedChar { ch, offset });
        };
        tokens.push((Token::Op(op), offset));
        i += op.chars().count();
    }

    Ok(tokens)
}

/// Lex a quoted string starting at `chars[start]`. Returns the unescaped
/// contents and the index just past the closing quote.
fn lex_string(chars: &[(usize, char)], start: usize) -> Result<(String, usize)> {
    let (offset, quote) = chars[start];
    let mut out = String::new();
    let mut i = start + 1;

    while i < chars.len() {
        let ch = chars[i].1;
        if ch == quote {
            return Ok((out, i + 1));
        }
        if ch == '\\' {
            i += 1;
            let Some(&(_, escaped)) = chars.get(i) else {
                break;
            };
            match escaped {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                '0' => out.push('\0'),
                other => out.push(other),
            }
        } else if ch == '\n' {
            break;
        } else {
            out.push(ch);
        }
        i += 1;
    }

    Err(EvalError::UnterminatedString(offset))
}

/// Parse a rewritten formula into an expression tree.
pub fn parse(src: &str) -> Result<Expr> {
    let tokens = tokenize(src)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_conditional()?;
    match parser.tokens.get(parser.pos) {
        None => Ok(expr),
        Some((token, offset)) => Err(EvalError::UnexpectedToken {
            found: token.describe(),
            offset: *offset,
        }),
    }
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn next(&mut self) -> Result<Token> {
        let (token, _) = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(EvalError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(token)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_op(&mut self, ops: &[&'static str]) -> Option<&'static str> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(op) => {
                let op = *op;
                self.pos += 1;
                Some(op)
            }
            _ => None,
        }
    }

    /// One level deeper in the tree. Callers restore `depth` on success.
    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        if self.eat(&expected) {
            return Ok(());
        }
        Err(self.unexpected())
    }

    fn unexpected(&self) -> EvalError {
        match self.tokens.get(self.pos) {
            Some((token, offset)) => EvalError::UnexpectedToken {
                found: token.describe(),
                offset: *offset,
            },
            None => EvalError::UnexpectedEnd,
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.next()? {
            Token::Ident(name) => Ok(name),
            _ => {
                self.pos -= 1;
                Err(self.unexpected())
            }
        }
    }

    fn parse_conditional(&mut self) -> Result<Expr> {
        self.descend()?;
        let expr = self.parse_ternary()?;
        self.depth -= 1;
        Ok(expr)
    }

    fn parse_ternary(&mut self) -> Result<Expr> {
        let cond = self.parse_or()?;
        if !self.eat(&Token::Question) {
            return Ok(cond);
        }
        let then = self.parse_conditional()?;
        self.expect(Token::Colon)?;
        let otherwise = self.parse_conditional()?;
        Ok(Expr::Conditional(
            Box::new(cond),
            Box::new(then),
            Box::new(otherwise),
        ))
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let saved = self.depth;
        let mut lhs = self.parse_and()?;
        while let Some(op) = self.eat_op(&["||", "??"]) {
            self.descend()?;
            let rhs = self.parse_and()?;
            let op = if op == "||" {
                LogicalOp::Or
            } else {
                LogicalOp::Nullish
            };
            lhs = Expr::Logical(op, Box::new(lhs), Box::new(rhs));
        }
        self.depth = saved;
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let saved = self.depth;
        let mut lhs = self.parse_equality()?;
        while self.eat_op(&["&&"]).is_some() {
            self.descend()?;
            let rhs = self.parse_equality()?;
            lhs = Expr::Logical(LogicalOp::And, Box::new(lhs), Box::new(rhs));
        }
        self.depth = saved;
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr> {
        let saved = self.depth;
        let mut lhs = self.parse_relational()?;
        while let Some(op) = self.eat_op(&["===", "!==", "==", "!="]) {
            self.descend()?;
            let op = match op {
                "===" => BinaryOp::StrictEq,
                "!==" => BinaryOp::StrictNe,
                "==" => BinaryOp::Eq,
                _ => BinaryOp::Ne,
            };
            let rhs = self.parse_relational()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        self.depth = saved;
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<Expr> {
        let saved = self.depth;
        let mut lhs = self.parse_additive()?;
        while let Some(op) = self.eat_op(&["<=", ">=", "<", ">"]) {
            self.descend()?;
            let op = match op {
                "<=" => BinaryOp::Le,
                ">=" => BinaryOp::Ge,
                "<" => BinaryOp::Lt,
                _ => BinaryOp::Gt,
            };
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        self.depth = saved;
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let saved = self.depth;
        let mut lhs = self.parse_multiplicative()?;
        while let Some(op) = self.eat_op(&["+", "-"]) {
            self.descend()?;
            let op = if op == "+" { BinaryOp::Add } else { BinaryOp::Sub };
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        self.depth = saved;
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let saved = self.depth;
        let mut lhs = self.parse_exponent()?;
        while let Some(op) = self.eat_op(&["*", "/", "%"]) {
            self.descend()?;
            let op = match op {
                "*" => BinaryOp::Mul,
                "/" => BinaryOp::Div,
                _ => BinaryOp::Rem,
            };
            let rhs = self.parse_exponent()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        self.depth = saved;
        Ok(lhs)
    }

    fn parse_exponent(&mut self) -> Result<Expr> {
        let unary_base = matches!(self.peek(), Some(Token::Op("-" | "+" | "!")));
        let base = self.parse_unary()?;
        if self.eat_op(&["**"]).is_none() {
            return Ok(base);
        }
        // `-2 ** 2` is rejected in JavaScript; `(-2) ** 2` is fine.
        if unary_base {
            return Err(EvalError::AmbiguousExponent);
        }
        self.descend()?;
        let exponent = self.parse_exponent()?;
        self.depth -= 1;
        Ok(Expr::Binary(
            BinaryOp::Pow,
            Box::new(base),
            Box::new(exponent),
        ))
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let Some(op) = self.eat_op(&["-", "+", "!"]) else {
            return self.parse_postfix();
        };
        let op = match op {
            "-" => UnaryOp::Neg,
            "+" => UnaryOp::Plus,
            _ => UnaryOp::Not,
        };
        self.descend()?;
        let operand = self.parse_unary()?;
        self.depth -= 1;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let saved = self.depth;
        let mut expr = self.parse_primary()?;
        while self.eat(&Token::Dot) {
            self.descend()?;
            let name = self.expect_ident()?;
            if self.eat(&Token::LParen) {
                let args = self.parse_args()?;
                expr = Expr::Method {
                    target: Box::new(expr),
                    name,
                    args,
                };
            } else {
                expr = Expr::Property {
                    target: Box::new(expr),
                    name,
                };
            }
        }
        self.depth = saved;
        Ok(expr)
    }

    /// Arguments after an opening `(`, up to and including `)`.
    fn parse_args(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_conditional()?);
            if self.eat(&Token::RParen) {
                return Ok(args);
            }
            self.expect(Token::Comma)?;
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.next()? {
            Token::Number(n) => Ok(Expr::Literal(Scalar::Number(n))),
            Token::Str(s) => Ok(Expr::Literal(Scalar::Text(s))),
            Token::LParen => {
                let inner = self.parse_conditional()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(name) => self.parse_identifier(name),
            _ => {
                self.pos -= 1;
                Err(self.unexpected())
            }
        }
    }

    fn parse_identifier(&mut self, name: String) -> Result<Expr> {
        match name.as_str() {
            "true" => return Ok(Expr::Literal(Scalar::Bool(true))),
            "false" => return Ok(Expr::Literal(Scalar::Bool(false))),
            "null" => return Ok(Expr::Literal(Scalar::Null)),
            "NaN" => return Ok(Expr::Literal(Scalar::Number(f64::NAN))),
            "Infinity" => return Ok(Expr::Literal(Scalar::Number(f64::INFINITY))),
            _ => {}
        }

        if crate::builtins::is_namespace(&name) {
            self.expect(Token::Dot)?;
            let member = self.expect_ident()?;
            let qualified = format!("{}.{}", name, member);
            if self.eat(&Token::LParen) {
                let args = self.parse_args()?;
                return Ok(Expr::Call {
                    callee: qualified,
                    args,
                });
            }
            return crate::builtins::constant(&qualified)
                .map(|n| Expr::Literal(Scalar::Number(n)))
                .ok_or(EvalError::UnknownIdentifier(qualified));
        }

        if self.eat(&Token::LParen) {
            let args = self.parse_args()?;
            return Ok(Expr::Call { callee: name, args });
        }

        Ok(Expr::Var(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Box<Expr> {
        Box::new(Expr::Literal(Scalar::Number(n)))
    }

    #[test]
    fn test_parse_precedence() {
        let expr = parse("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                BinaryOp::Add,
                num(1.0),
                Box::new(Expr::Binary(BinaryOp::Mul, num(2.0), num(3.0)))
            )
        );
    }

    #[test]
    fn test_parse_exponent_right_assoc() {
        let expr = parse("2 ** 3 ** 2").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                BinaryOp::Pow,
                num(2.0),
                Box::new(Expr::Binary(BinaryOp::Pow, num(3.0), num(2.0)))
            )
        );
        assert_eq!(parse("-2 ** 2"), Err(EvalError::AmbiguousExponent));
        assert_eq!(parse("!__var_0 ** 2"), Err(EvalError::AmbiguousExponent));
        assert_eq!(
            parse("(-2) ** 2").unwrap(),
            Expr::Binary(
                BinaryOp::Pow,
                Box::new(Expr::Unary(UnaryOp::Neg, num(2.0))),
                num(2.0)
            )
        );
        assert!(parse("2 ** -2").is_ok());
    }

    #[test]
    fn test_parse_depth_limit() {
        let nested = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(parse(&nested), Err(EvalError::TooDeep(MAX_DEPTH)));

        let negations = format!("{}1", "-".repeat(200_000));
        assert_eq!(parse(&negations), Err(EvalError::TooDeep(MAX_DEPTH)));

        let chain = format!("{}1", "1 + ".repeat(50_000));
        assert_eq!(parse(&chain), Err(EvalError::TooDeep(MAX_DEPTH)));

        let powers = format!("{}2", "2 ** ".repeat(50_000));
        assert_eq!(parse(&powers), Err(EvalError::TooDeep(MAX_DEPTH)));

        let methods = format!("__var_0{}", ".trim()".repeat(50_000));
        assert_eq!(parse(&methods), Err(EvalError::TooDeep(MAX_DEPTH)));

        let ok = format!("{}1{}", "(".repeat(40), ")".repeat(40));
        assert_eq!(parse(&ok).unwrap(), Expr::Literal(Scalar::Number(1.0)));
    }

    #[test]
    fn test_parse_strings() {
        assert_eq!(
            parse(r#"'it\'s' + "x""#).unwrap(),
            Expr::Binary(
                BinaryOp::Add,
                Box::new(Expr::Literal(Scalar::text("it's"))),
                Box::new(Expr::Literal(Scalar::text("x")))
            )
        );
        assert_eq!(parse("'open"), Err(EvalError::UnterminatedString(0)));
    }

    #[test]
    fn test_parse_variables_and_methods() {
        let expr = parse("__var_0.toFixed(2)").unwrap();
        assert_eq!(
            expr,
            Expr::Method {
                target: Box::new(Expr::Var("__var_0".to_string())),
                name: "toFixed".to_string(),
                args: vec![Expr::Literal(Scalar::Number(2.0))],
            }
        );
    }

    #[test]
    fn test_parse_namespaced_calls() {
        assert_eq!(
            parse("Math.max(1, 2)").unwrap(),
            Expr::Call {
                callee: "Math.max".to_string(),
                args: vec![
                    Expr::Literal(Scalar::Number(1.0)),
                    Expr::Literal(Scalar::Number(2.0))
                ],
            }
        );
        assert!(matches!(parse("Math.PI"), Ok(Expr::Literal(_))));
        assert!(parse("Math.constructor").is_err());
    }

    #[test]
    fn test_parse_conditional_and_logical() {
        assert!(matches!(
            parse("__var_0 > 1 && __var_1 ? 'a' : 'b'"),
            Ok(Expr::Conditional(..))
        ));
        assert!(matches!(
            parse("__var_0 ?? 5"),
            Ok(Expr::Logical(LogicalOp::Nullish, ..))
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("1 +"), Err(EvalError::UnexpectedEnd));
        assert_eq!(parse(""), Err(EvalError::UnexpectedEnd));
        assert!(matches!(parse("(1"), Err(EvalError::UnexpectedEnd)));
        assert!(matches!(
            parse("1 2"),
            Err(EvalError::UnexpectedToken { offset: 2, .. })
        ));
        assert!(matches!(
            parse("a = 1"),
            Err(EvalError::UnexpectedChar { ch: '=', .. })
        ));
        assert!(matches!(parse("a[0]"), Err(EvalError::UnexpectedChar { .. })));
        assert!(matches!(parse("1.2.3"), Err(EvalError::InvalidNumber(_))));
    }
}
