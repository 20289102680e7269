use std::fmt;

use crate::{
    math::{error::ParseError, lexer::Lexer},
    types::{BIND_RIGHT_BP, Fun, OP_UNARY_MINUS_BP, Op, Token},
};

/// A parsed expression. Trees are built once and never edited; evaluation and
/// differentiation produce new values.
#[derive(PartialEq, Debug, Clone)]
pub enum Exp {
    Val(f64),
    Var(String),
    Neg(Box<Exp>),
    Op(Op, Box<Exp>, Box<Exp>),
    Fun(Fun, Box<Exp>),
}

/// Parses `input` as a single-variable expression in `variable`.
pub fn parse(input: &str, variable: &str) -> Result<Exp, ParseError> {
    Exp::parse(input, variable)
}

impl Exp {
    pub fn parse(input: &str, variable: &str) -> Result<Exp, ParseError> {
        let tokens = Lexer::tokenize(input, variable)?;
        let mut parser = Parser {
            tokens,
            index: 0,
            depth: 0,
            open: Vec::new(),
        };
        let root = parse_recurse(&mut parser, BIND_RIGHT_BP)?;
        if parser.peek() == Some(Token::ParClose) {
            parser.next();
            return Err(parser.unbalanced_error(parser.index - 1, "Unmatched closing paren"));
        }
        Ok(root)
    }

    fn bp(&self) -> u8 {
        match self {
            Exp::Val(_) | Exp::Var(_) | Exp::Fun(..) => u8::MAX,
            Exp::Neg(_) => OP_UNARY_MINUS_BP,
            Exp::Op(op, ..) => op.bp(),
        }
    }

    fn fmt_bound(&self, f: &mut fmt::Formatter<'_>, min_bp: u8) -> fmt::Result {
        if self.bp() < min_bp {
            write!(f, "(")?;
            self.fmt_bound(f, BIND_RIGHT_BP)?;
            return write!(f, ")");
        }
        match self {
            Exp::Val(v) => f.write_str(&format_number(*v)),
            Exp::Var(name) => f.write_str(name),
            Exp::Neg(inner) => {
                write!(f, "-")?;
                inner.fmt_bound(f, Op::Pow.bp())
            }
            Exp::Op(op, lhs, rhs) => {
                let bp = op.bp();
                // Power is right associative, everything else left associative
                let (lhs_bp, rhs_bp) = if *op == Op::Pow {
                    (bp + 1, bp)
                } else {
                    (bp, bp + 1)
                };
                lhs.fmt_bound(f, lhs_bp)?;
                match op {
                    Op::Add | Op::Sub => write!(f, " {} ", op.symbol())?,
                    _ => f.write_str(op.symbol())?,
                }
                rhs.fmt_bound(f, rhs_bp)
            }
            Exp::Fun(fun, arg) => {
                write!(f, "{}(", fun.name())?;
                arg.fmt_bound(f, BIND_RIGHT_BP)?;
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Exp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_bound(f, BIND_RIGHT_BP)
    }
}

/// Renders a number the way users type it: `12` rather than `12.0`, never `-0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{value}")
    }
}

/// Deepest nesting of groups, unary minus and powers the parser descends into.
const MAX_DEPTH: usize = 64;

struct Parser {
    tokens: Vec<Token>,
    index: usize,
    depth: usize,
    // Token indices of the groups still waiting for their closing paren
    open: Vec<usize>,
}

impl Parser {
    fn next(&mut self) -> Option<Token> {
        if self.index < self.tokens.len() {
            let token = self.tokens[self.index].clone();
            self.index += 1;
            Some(token)
        } else {
            None
        }
    }

    fn peek(&self) -> Option<Token> {
        if self.index < self.tokens.len() {
            Some(self.tokens[self.index].clone())
        } else {
            None
        }
    }

    /// Rebuilds the token stream as text and locates token `index` in it.
    /// An index past the end points at the end of input.
    fn locate(&self, index: usize) -> (String, (usize, usize), String) {
        let mut display = String::new();
        let mut span = None;
        let mut found = String::from("end of input");

        for (i, token) in self.tokens.iter().enumerate() {
            let token_str = token.to_string();
            if i == index {
                span = Some((display.len(), token_str.len()));
                found = token_str.clone();
            }
            display.push_str(&token_str);
        }

        let span = span.unwrap_or((display.len(), 0));
        (display, span, found)
    }

    fn unexpected_token_error(&self, message: &str) -> ParseError {
        // Use index - 1 because next() has already consumed the token
        let (display, span, found) = self.locate(self.index.saturating_sub(1));
        ParseError::unexpected(&display, span, &found, message)
    }

    fn end_of_input_error(&self, message: &str) -> ParseError {
        if let Some(&open) = self.open.last() {
            return self.unbalanced_error(open, "Opening paren is never closed");
        }
        let (display, span, found) = self.locate(self.tokens.len());
        ParseError::unexpected(&display, span, &found, message)
    }

    fn unbalanced_error(&self, index: usize, message: &str) -> ParseError {
        let (display, span, _) = self.locate(index);
        ParseError::unbalanced(&display, span, message)
    }
}

fn parse_atom(parser: &mut Parser) -> Result<Exp, ParseError> {
    let Some(token) = parser.next() else {
        return Err(parser.end_of_input_error("Expected a value"));
    };
    let val = match token {
        Token::Val(v) => Exp::Val(v),
        Token::Var(v) => Exp::Var(v),
        Token::Op(Op::Sub) => {
            let rhs = parse_recurse(parser, OP_UNARY_MINUS_BP)?;
            Exp::Neg(Box::new(rhs))
        }
        Token::Op(op) => {
            return Err(parser.unexpected_token_error(&format!("Unexpected operator {:?}", op)));
        }
        Token::ParOpen => parse_group(parser)?,
        Token::ParClose => {
            return Err(parser.unexpected_token_error("Unexpected closing paren"));
        }
        Token::Fun(fun) => {
            if parser.next() != Some(Token::ParOpen) {
                return Err(parser
                    .unexpected_token_error("Function arguments must be enclosed in parentheses"));
            }
            Exp::Fun(fun, Box::new(parse_group(parser)?))
        }
    };
    Ok(val)
}

/// Parses the inside of a group whose opening paren was just consumed, along
/// with its closing paren.
fn parse_group(parser: &mut Parser) -> Result<Exp, ParseError> {
    parser.open.push(parser.index - 1);
    let exp = parse_recurse(parser, BIND_RIGHT_BP)?;
    match parser.next() {
        Some(Token::ParClose) => {
            parser.open.pop();
            Ok(exp)
        }
        None => Err(parser.end_of_input_error("Expected closing paren")),
        Some(_) => Err(parser.unexpected_token_error("Expected closing paren")),
    }
}

fn parse_recurse(parser: &mut Parser, min_bp: u8) -> Result<Exp, ParseError> {
    if parser.depth >= MAX_DEPTH {
        return Err(parser.unexpected_token_error("Expression is nested too deeply"));
    }
    parser.depth += 1;
    let mut lhs = parse_atom(parser)?;

    loop {
        let Some(t) = parser.peek() else {
            break;
        };

        // End of parentheses - opener consumes the closer
        if t == Token::ParClose {
            break;
        }

        let Token::Op(op) = t else {
            parser.next();
            return Err(parser.unexpected_token_error("Expected an operator"));
        };

        let bp = op.bp();
        if bp <= min_bp {
            break;
        }

        parser.next();
        // Power is special with right associativity => x^y^z = x^(y^z)
        let bp = if op == Op::Pow { bp - 1 } else { bp };
        let rhs = parse_recurse(parser, bp)?;
        lhs = Exp::Op(op, Box::new(lhs), Box::new(rhs));
    }
    parser.depth -= 1;
    Ok(lhs)
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse_ok(input: &str) -> Exp {
        Exp::parse(input, "x").expect("parse failed")
    }

    fn parse_err(input: &str) -> ParseError {
        Exp::parse(input, "x").expect_err("Expected parse to fail")
    }

    fn x() -> Box<Exp> {
        Box::new(Exp::Var("x".to_string()))
    }

    fn val(v: f64) -> Box<Exp> {
        Box::new(Exp::Val(v))
    }

    #[test]
    fn basic1() {
        assert_eq!(parse_ok("2"), Exp::Val(2.0));
        assert_eq!(parse_ok("x"), Exp::Var("x".to_string()));
    }

    #[test]
    fn basic2() {
        let expected = Exp::Op(Op::Add, val(1.0), Box::new(Exp::Op(Op::Mul, val(2.0), val(3.0))));
        assert_eq!(parse_ok("1+2*3"), expected);
    }

    #[test]
    fn basic3() {
        let expected = Exp::Op(Op::Add, Box::new(Exp::Op(Op::Mul, val(1.0), val(2.0))), val(3.0));
        assert_eq!(parse_ok("1*2+3"), expected);
    }

    #[test]
    fn parens1() {
        assert_eq!(parse_ok("((2))"), Exp::Val(2.0));
    }

    #[test]
    fn parens2() {
        let expected = Exp::Op(Op::Mul, x(), Box::new(Exp::Op(Op::Add, val(1.0), val(2.0))));
        assert_eq!(parse_ok("x(1+2)"), expected);
    }

    #[test]
    fn parens3() {
        let expected = Exp::Op(Op::Mul, Box::new(Exp::Op(Op::Add, val(1.0), val(2.0))), x());
        assert_eq!(parse_ok("(1+2)x"), expected);
    }

    #[test]
    fn associativity1() {
        let expected = Exp::Op(Op::Sub, Box::new(Exp::Op(Op::Sub, val(1.0), val(2.0))), val(3.0));
        assert_eq!(parse_ok("1-2-3"), expected);
    }

    #[test]
    fn associativity2() {
        let expected = Exp::Op(Op::Div, Box::new(Exp::Op(Op::Div, val(12.0), val(3.0))), val(2.0));
        assert_eq!(parse_ok("12/3/2"), expected);
    }

    #[test]
    fn associativity3() {
        let expected = Exp::Op(Op::Pow, val(2.0), Box::new(Exp::Op(Op::Pow, val(3.0), val(4.0))));
        assert_eq!(parse_ok("2^3^4"), expected);
    }

    #[test]
    fn implied_mul1() {
        assert_eq!(parse_ok("2x"), Exp::Op(Op::Mul, val(2.0), x()));
        assert_eq!(parse_ok("x2"), Exp::Op(Op::Mul, x(), val(2.0)));
    }

    #[test]
    fn implied_mul2() {
        let expected = Exp::Op(Op::Mul, val(2.0), Box::new(Exp::Op(Op::Pow, x(), val(3.0))));
        assert_eq!(parse_ok("2x^3"), expected);
    }

    #[test]
    fn function1() {
        let expected = Exp::Fun(Fun::Sin, Box::new(Exp::Fun(Fun::Cos, x())));
        assert_eq!(parse_ok("sin(cos(x))"), expected);
    }

    #[test]
    fn function2() {
        let expected = Exp::Op(Op::Mul, val(2.0), Box::new(Exp::Fun(Fun::Sqrt, x())));
        assert_eq!(parse_ok("2sqrt(x)"), expected);
    }

    #[test]
    fn unary1() {
        assert_eq!(parse_ok("-x"), Exp::Neg(x()));
    }

    #[test]
    fn unary_minus_binds_looser_than_power() {
        let expected = Exp::Neg(Box::new(Exp::Op(Op::Pow, x(), val(2.0))));
        assert_eq!(parse_ok("-x^2"), expected);
    }

    #[test]
    fn unary_minus_binds_tighter_than_product() {
        let expected = Exp::Op(Op::Mul, Box::new(Exp::Neg(val(2.0))), x());
        assert_eq!(parse_ok("-2*x"), expected);
    }

    #[test]
    fn unary_in_exponent() {
        let expected = Exp::Op(Op::Pow, x(), Box::new(Exp::Neg(val(2.0))));
        assert_eq!(parse_ok("x^-2"), expected);
    }

    #[test]
    fn unary_after_operator() {
        let expected = Exp::Op(Op::Mul, x(), Box::new(Exp::Neg(x())));
        assert_eq!(parse_ok("x*-x"), expected);
    }

    #[test]
    fn display_round_trips() {
        for input in ["x^2 + 4*x + 1", "-(x + 1)", "sin(x)*x", "(-x)^2", "2^x^3", "x - (x - 1)", "-x^2"] {
            let exp = parse_ok(input);
            assert_eq!(exp.to_string(), input);
            assert_eq!(parse_ok(&exp.to_string()), exp);
        }
    }

    #[test]
    fn display_numbers() {
        assert_eq!(format_number(12.0), "12");
        assert_eq!(format_number(-9.8), "-9.8");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn error_unexpected_operator() {
        let err = parse_err("*2*3)+1");
        let report = miette::Report::new(err);
        assert!(format!("{report}").contains("Unexpected token '*'"));
        assert!(format!("{report:?}").contains("Unexpected operator Mul"));
    }

    #[test]
    fn error_trailing_operator() {
        let err = parse_err("x+");
        assert!(matches!(err, ParseError::UnexpectedToken(e) if e.found == "end of input"));
    }

    #[test]
    fn error_empty_input() {
        assert!(matches!(parse_err("   "), ParseError::UnexpectedToken(_)));
    }

    #[test]
    fn error_empty_parens() {
        assert!(matches!(parse_err("()"), ParseError::UnexpectedToken(_)));
    }

    #[test]
    fn error_unclosed_paren() {
        assert!(matches!(parse_err("(x+1"), ParseError::UnbalancedParens(_)));
        assert!(matches!(parse_err("sin(x"), ParseError::UnbalancedParens(_)));
    }

    #[test]
    fn error_input_ends_inside_group() {
        for input in ["(x+", "x(", "sin(", "(x+1)*(2"] {
            let err = parse_err(input);
            assert!(matches!(err, ParseError::UnbalancedParens(_)), "{input} gave {err:?}");
        }
    }

    #[test]
    fn nesting_limit() {
        let deep = format!("{}x{}", "(".repeat(MAX_DEPTH - 1), ")".repeat(MAX_DEPTH - 1));
        assert_eq!(parse_ok(&deep), Exp::Var("x".to_string()));

        let too_deep = format!("{}x{}", "(".repeat(200), ")".repeat(200));
        let err = parse_err(&too_deep);
        assert!(matches!(err, ParseError::UnexpectedToken(e) if e.message.contains("too deeply")));

        let minus = format!("{}x", "-".repeat(200));
        assert!(matches!(parse_err(&minus), ParseError::UnexpectedToken(_)));

        let tower = vec!["x"; 200].join("^");
        assert!(matches!(parse_err(&tower), ParseError::UnexpectedToken(_)));
    }

    #[test]
    fn error_unopened_paren() {
        assert!(matches!(parse_err("x+1)"), ParseError::UnbalancedParens(_)));
    }

    #[test]
    fn error_function_without_parens() {
        assert!(matches!(parse_err("sinx"), ParseError::UnexpectedToken(_)));
    }

    #[test]
    fn error_unknown_identifier() {
        assert!(matches!(parse_err("x+y"), ParseError::UnknownIdentifier(_)));
    }
}
