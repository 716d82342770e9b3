//! Turns a function string into an expression tree.
//!
//! The grammar, from loosest to tightest binding:
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := unary (('*' | '/') unary)*
//! unary      := ('-' | '+') unary | power
//! power      := primary ('^' unary)?
//! primary    := number | 'z' | constant | builtin '(' expression ')'
//!             | '(' expression ')'
//! ```
//!
//! Exponentiation is right-associative and binds tighter than negation,
//! so `-z^2` is `-(z^2)` and `2^3^2` is `2^9`.  Implicit multiplication
//! (`2z`, `2(z+1)`, `(z)(z)`) is handled by the tokenizer, which inserts
//! a `*` whenever a number or a closing parenthesis is followed directly
//! by a number, a name, or an opening parenthesis.
//!
//! Nesting is capped at `MAX_DEPTH`, both for parentheses and for long
//! chains like `z+z+...+z`, whose trees lean left and grow one level per
//! operator.

use std::cmp;
use std::iter::Peekable;
use std::str::CharIndices;
use std::str::FromStr;

use ast::{Ast, BinaryOp, Builtin, Constant, UnaryOp};
use errors::{ParseError, ParseErrorKind};

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Name(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match *self {
            Token::Number(n) => n.to_string(),
            Token::Name(ref s) => s.clone(),
            Token::Plus => "+".to_string(),
            Token::Minus => "-".to_string(),
            Token::Star => "*".to_string(),
            Token::Slash => "/".to_string(),
            Token::Caret => "^".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
        }
    }

    // Can this token end an operand that an implied `*` may follow?
    fn ends_factor(&self) -> bool {
        match *self {
            Token::Number(_) | Token::RParen => true,
            _ => false,
        }
    }

    // Can this token start an operand that an implied `*` may precede?
    fn starts_factor(&self) -> bool {
        match *self {
            Token::Number(_) | Token::Name(_) | Token::LParen => true,
            _ => false,
        }
    }
}

#[derive(Clone, Debug)]
struct Spanned {
    token: Token,
    position: usize,
}

struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    tokens: Vec<Spanned>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Lexer<'a> {
        Lexer {
            source,
            chars: source.char_indices().peekable(),
            tokens: vec![],
        }
    }

    fn push(&mut self, token: Token, position: usize) {
        let implied = match self.tokens.last() {
            Some(prev) => prev.token.ends_factor() && token.starts_factor(),
            None => false,
        };
        if implied {
            self.tokens.push(Spanned {
                token: Token::Star,
                position,
            });
        }
        self.tokens.push(Spanned { token, position });
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn offset(&mut self) -> usize {
        match self.chars.peek() {
            Some(&(i, _)) => i,
            None => self.source.len(),
        }
    }

    fn eat_digits(&mut self) -> usize {
        let mut count = 0;
        while let Some(c) = self.peek_char() {
            if !c.is_ascii_digit() {
                break;
            }
            self.chars.next();
            count += 1;
        }
        count
    }

    // `2e3` is two thousand.  `2exp(z)` is a number followed by a name.
    fn exponent_follows(&self) -> bool {
        let mut ahead = self.chars.clone();
        match ahead.next() {
            Some((_, 'e')) | Some((_, 'E')) => (),
            _ => return false,
        }
        match ahead.next() {
            Some((_, c)) if c.is_ascii_digit() => true,
            Some((_, '+')) | Some((_, '-')) => match ahead.next() {
                Some((_, c)) => c.is_ascii_digit(),
                None => false,
            },
            _ => false,
        }
    }

    // An exponent marker with nothing after it, as in `1e` or `1e+`.
    fn dangling_exponent(&self) -> bool {
        let mut ahead = self.chars.clone();
        match ahead.next() {
            Some((_, 'e')) | Some((_, 'E')) => (),
            _ => return false,
        }
        match ahead.next() {
            Some((_, c)) => !(c.is_ascii_alphabetic() || c == '_'),
            None => true,
        }
    }

    fn number(&mut self, start: usize) -> Result<(), ParseError> {
        let source = self.source;
        let mut digits = self.eat_digits();
        if self.peek_char() == Some('.') {
            self.chars.next();
            digits += self.eat_digits();
        }
        if self.exponent_follows() {
            self.chars.next();
            if let Some('+') | Some('-') = self.peek_char() {
                self.chars.next();
            }
            self.eat_digits();
        } else if self.dangling_exponent() {
            self.chars.next();
            if let Some('+') | Some('-') = self.peek_char() {
                self.chars.next();
            }
            let end = self.offset();
            return Err(ParseError::new(
                ParseErrorKind::MalformedNumber(source[start..end].to_string()),
                start,
            ));
        }
        let end = self.offset();
        let text = &source[start..end];
        if digits == 0 || self.peek_char() == Some('.') {
            let mut end = end;
            while let Some(c) = self.peek_char() {
                if !(c.is_ascii_digit() || c == '.') {
                    break;
                }
                self.chars.next();
                end = self.offset();
            }
            return Err(ParseError::new(
                ParseErrorKind::MalformedNumber(source[start..end].to_string()),
                start,
            ));
        }
        match f64::from_str(text) {
            Ok(n) if n.is_finite() => {
                self.push(Token::Number(n), start);
                Ok(())
            }
            _ => Err(ParseError::new(
                ParseErrorKind::MalformedNumber(text.to_string()),
                start,
            )),
        }
    }

    fn name(&mut self, start: usize) {
        while let Some(c) = self.peek_char() {
            if !(c.is_ascii_alphabetic() || c == '_') {
                break;
            }
            self.chars.next();
        }
        let end = self.offset();
        let name = self.source[start..end].to_string();
        self.push(Token::Name(name), start);
    }

    fn run(mut self) -> Result<Vec<Spanned>, ParseError> {
        while let Some(&(position, c)) = self.chars.peek() {
            let simple = match c {
                '+' => Some(Token::Plus),
                '-' => Some(Token::Minus),
                '*' => Some(Token::Star),
                '/' => Some(Token::Slash),
                '^' => Some(Token::Caret),
                '(' => Some(Token::LParen),
                ')' => Some(Token::RParen),
                _ => None,
            };
            if let Some(token) = simple {
                self.chars.next();
                self.push(token, position);
            } else if c.is_whitespace() {
                self.chars.next();
            } else if c.is_ascii_digit() || c == '.' {
                self.number(position)?;
            } else if c.is_ascii_alphabetic() || c == '_' {
                self.name(position);
            } else {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedCharacter(c),
                    position,
                ));
            }
        }
        Ok(self.tokens)
    }
}

fn tokenize(source: &str) -> Result<Vec<Spanned>, ParseError> {
    Lexer::new(source).run()
}

// Reports the first stray `)` or the innermost `(` left open.
fn check_balance(tokens: &[Spanned]) -> Result<(), ParseError> {
    let mut open: Vec<usize> = vec![];
    for t in tokens {
        match t.token {
            Token::LParen => open.push(t.position),
            Token::RParen => {
                if open.pop().is_none() {
                    return Err(ParseError::new(
                        ParseErrorKind::UnbalancedParenthesis,
                        t.position,
                    ));
                }
            }
            _ => (),
        }
    }
    match open.pop() {
        Some(position) => Err(ParseError::new(
            ParseErrorKind::UnbalancedParenthesis,
            position,
        )),
        None => Ok(()),
    }
}

/// How deeply an expression may nest, counting both parentheses and the
/// height of the finished tree.  Evaluation recurses over the tree, so
/// this also bounds the stack a render needs.
pub const MAX_DEPTH: usize = 256;

// A subtree along with its height.
type Parsed = Result<(Ast, usize), ParseError>;

struct Parser<'a> {
    tokens: &'a [Spanned],
    index: usize,
    end: usize,
    nesting: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.index).map(|t| &t.token)
    }

    fn position(&self) -> usize {
        self.tokens.get(self.index).map_or(self.end, |t| t.position)
    }

    fn advance(&mut self) -> Option<&'a Spanned> {
        let t = self.tokens.get(self.index);
        if t.is_some() {
            self.index += 1;
        }
        t
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.tokens.get(self.index) {
            Some(t) => ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    found: t.token.describe(),
                    expected,
                },
                t.position,
            ),
            None => ParseError::new(ParseErrorKind::UnexpectedEnd { expected }, self.end),
        }
    }

    fn expect(&mut self, token: &Token, expected: &'static str) -> Result<(), ParseError> {
        if self.peek() == Some(token) {
            self.index += 1;
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn height(&self, height: usize, position: usize) -> Result<usize, ParseError> {
        if height > MAX_DEPTH {
            Err(ParseError::new(ParseErrorKind::TooDeep, position))
        } else {
            Ok(height)
        }
    }

    fn expression(&mut self) -> Parsed {
        let (mut left, mut height) = self.term()?;
        loop {
            let op = match self.peek() {
                Some(&Token::Plus) => BinaryOp::Add,
                Some(&Token::Minus) => BinaryOp::Sub,
                _ => return Ok((left, height)),
            };
            let position = self.position();
            self.index += 1;
            let (right, right_height) = self.term()?;
            height = self.height(1 + cmp::max(height, right_height), position)?;
            left = Ast::binary(op, left, right);
        }
    }

    fn term(&mut self) -> Parsed {
        let (mut left, mut height) = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(&Token::Star) => BinaryOp::Mul,
                Some(&Token::Slash) => BinaryOp::Div,
                _ => return Ok((left, height)),
            };
            let position = self.position();
            self.index += 1;
            let (right, right_height) = self.unary()?;
            height = self.height(1 + cmp::max(height, right_height), position)?;
            left = Ast::binary(op, left, right);
        }
    }

    // Every recursive path in the grammar passes through here.
    fn unary(&mut self) -> Parsed {
        if self.nesting >= MAX_DEPTH {
            return Err(ParseError::new(ParseErrorKind::TooDeep, self.position()));
        }
        self.nesting += 1;
        let parsed = self.signed();
        self.nesting -= 1;
        parsed
    }

    fn signed(&mut self) -> Parsed {
        let op = match self.peek() {
            Some(&Token::Minus) => UnaryOp::Neg,
            Some(&Token::Plus) => UnaryOp::Plus,
            _ => return self.power(),
        };
        let position = self.position();
        self.index += 1;
        let (operand, height) = self.unary()?;
        let height = self.height(height + 1, position)?;
        Ok((Ast::unary(op, operand), height))
    }

    fn power(&mut self) -> Parsed {
        let (base, base_height) = self.primary()?;
        if self.peek() == Some(&Token::Caret) {
            let position = self.position();
            self.index += 1;
            let (exponent, exponent_height) = self.unary()?;
            let height = self.height(1 + cmp::max(base_height, exponent_height), position)?;
            return Ok((Ast::binary(BinaryOp::Pow, base, exponent), height));
        }
        Ok((base, base_height))
    }

    fn primary(&mut self) -> Parsed {
        const OPERAND: &str = "a number, 'z', a constant, a function or '('";
        let spanned = match self.advance() {
            Some(t) => t,
            None => return Err(self.unexpected(OPERAND)),
        };
        match spanned.token {
            Token::Number(n) => Ok((Ast::Number(n), 1)),
            Token::LParen => {
                let inner = self.expression()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            Token::Name(ref name) => self.named(name, spanned.position),
            _ => {
                self.index -= 1;
                Err(self.unexpected(OPERAND))
            }
        }
    }

    fn named(&mut self, name: &str, position: usize) -> Parsed {
        if name == "z" {
            return Ok((Ast::Variable, 1));
        }
        if let Some(c) = Constant::from_name(name) {
            return Ok((Ast::Constant(c), 1));
        }
        let called = self.peek() == Some(&Token::LParen);
        match Builtin::from_name(name) {
            Some(function) => {
                self.expect(&Token::LParen, "'(' after a function name")?;
                let (argument, height) = self.expression()?;
                self.expect(&Token::RParen, "')'")?;
                let height = self.height(height + 1, position)?;
                Ok((Ast::call(function, argument), height))
            }
            None if called => Err(ParseError::new(
                ParseErrorKind::UnknownFunction(name.to_string()),
                position,
            )),
            None => Err(ParseError::new(
                ParseErrorKind::UnknownIdentifier(name.to_string()),
                position,
            )),
        }
    }
}

/// Parses a function string.  The result can be evaluated as often as
/// needed and should be kept around until the function string changes.
pub fn parse(source: &str) -> Result<Ast, ParseError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        let position = source.len() - source.trim_start().len();
        return Err(ParseError::new(ParseErrorKind::EmptyInput, position));
    }
    check_balance(&tokens)?;

    let mut parser = Parser {
        tokens: &tokens,
        index: 0,
        end: source.trim_end().len(),
        nesting: 0,
    };
    let (ast, _) = parser.expression()?;
    if parser.index < tokens.len() {
        return Err(parser.unexpected("an operator or end of input"));
    }
    trace!("parsed '{}' as {}", source, ast);
    Ok(ast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::Ast::Number;

    fn kind(source: &str) -> ParseErrorKind {
        parse(source).unwrap_err().kind
    }

    #[test]
    fn accepts_the_presets() {
        for f in &["z^2", "1/z", "exp(z)", "sin(z)*cos(z)", "(z-1)/(z+1)", "z + 1/z"] {
            assert!(parse(f).is_ok(), "failed to parse {}", f);
        }
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(kind("z +"), ParseErrorKind::UnexpectedEnd {
            expected: "a number, 'z', a constant, a function or '('",
        });
        assert_eq!(kind("foo(z)"), ParseErrorKind::UnknownFunction("foo".to_string()));
        assert_eq!(kind("(("), ParseErrorKind::UnbalancedParenthesis);
        assert_eq!(kind("z)"), ParseErrorKind::UnbalancedParenthesis);
        assert_eq!(kind("w"), ParseErrorKind::UnknownIdentifier("w".to_string()));
        assert_eq!(kind("z $ 2"), ParseErrorKind::UnexpectedCharacter('$'));
        assert_eq!(kind("*z"), ParseErrorKind::UnexpectedToken {
            found: "*".to_string(),
            expected: "a number, 'z', a constant, a function or '('",
        });
    }

    #[test]
    fn empty_input() {
        assert_eq!(kind(""), ParseErrorKind::EmptyInput);
        assert_eq!(kind("   "), ParseErrorKind::EmptyInput);
    }

    #[test]
    fn malformed_numbers() {
        assert_eq!(kind("1.2.3"), ParseErrorKind::MalformedNumber("1.2.3".to_string()));
        assert_eq!(kind("."), ParseErrorKind::MalformedNumber(".".to_string()));
        assert_eq!(kind("1e999"), ParseErrorKind::MalformedNumber("1e999".to_string()));
        assert_eq!(kind("1e"), ParseErrorKind::MalformedNumber("1e".to_string()));
        assert_eq!(kind("2E"), ParseErrorKind::MalformedNumber("2E".to_string()));
        assert_eq!(kind("1e+"), ParseErrorKind::MalformedNumber("1e+".to_string()));
        assert_eq!(kind("z + 2e*z"), ParseErrorKind::MalformedNumber("2e".to_string()));
        assert_eq!(parse("z + 2e*z").unwrap_err().position, 4);
    }

    #[test]
    fn a_name_after_a_number_is_not_an_exponent() {
        assert_eq!(parse("2exp(z)").unwrap(), parse("2*exp(z)").unwrap());
        assert_eq!(parse("2 e").unwrap(), parse("2*e").unwrap());
    }

    #[test]
    fn error_positions_point_at_the_problem() {
        assert_eq!(parse("z + foo").unwrap_err().position, 4);
        assert_eq!(parse("(z + 1").unwrap_err().position, 0);
        assert_eq!(parse("z + 1)").unwrap_err().position, 5);
        assert_eq!(parse("z +  ").unwrap_err().position, 3);
    }

    #[test]
    fn function_names_need_arguments() {
        assert_eq!(kind("sin z"), ParseErrorKind::UnexpectedToken {
            found: "z".to_string(),
            expected: "'(' after a function name",
        });
        assert_eq!(kind("sin"), ParseErrorKind::UnexpectedEnd {
            expected: "'(' after a function name",
        });
    }

    #[test]
    fn numbers() {
        assert_eq!(parse("2.5").unwrap(), Number(2.5));
        assert_eq!(parse(".5").unwrap(), Number(0.5));
        assert_eq!(parse("1.").unwrap(), Number(1.0));
        assert_eq!(parse("2e3").unwrap(), Number(2000.0));
        assert_eq!(parse("1e-3").unwrap(), Number(0.001));
    }

    #[test]
    fn precedence() {
        assert_eq!(parse("1 + 2 * z").unwrap().to_string(), "(1 + (2 * z))");
        assert_eq!(parse("1 - z - 2").unwrap().to_string(), "((1 - z) - 2)");
        assert_eq!(parse("z / 2 / 3").unwrap().to_string(), "((z / 2) / 3)");
        assert_eq!(parse("-z^2").unwrap().to_string(), "(-(z ^ 2))");
        assert_eq!(parse("2^3^2").unwrap().to_string(), "(2 ^ (3 ^ 2))");
        assert_eq!(parse("z^-1").unwrap().to_string(), "(z ^ (-1))");
        assert_eq!(parse("--z").unwrap().to_string(), "(-(-z))");
        assert_eq!(parse("sin(z)^2").unwrap().to_string(), "(sin(z) ^ 2)");
    }

    #[test]
    fn implicit_multiplication() {
        assert_eq!(parse("2(z)").unwrap(), parse("2*z").unwrap());
        assert_eq!(parse("2z").unwrap(), parse("2*z").unwrap());
        assert_eq!(parse("2pi").unwrap(), parse("2*pi").unwrap());
        assert_eq!(parse("3i").unwrap(), parse("3*i").unwrap());
        assert_eq!(parse("(z+1)(z-1)").unwrap(), parse("(z+1)*(z-1)").unwrap());
        assert_eq!(parse("2sin(z)").unwrap(), parse("2*sin(z)").unwrap());
        assert_eq!(parse("(z)2").unwrap(), parse("(z)*2").unwrap());
    }

    #[test]
    fn implicit_multiplication_binds_like_explicit() {
        assert_eq!(parse("1/2z").unwrap().to_string(), "((1 / 2) * z)");
        assert_eq!(parse("2z^2").unwrap().to_string(), "(2 * (z ^ 2))");
        assert_eq!(
            parse("2(3(z))").unwrap().to_string(),
            "(2 * (3 * z))"
        );
    }

    #[test]
    fn deep_nesting_is_an_error() {
        let parens = format!("{}z{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(kind(&parens), ParseErrorKind::TooDeep);
        assert_eq!(kind(&"-".repeat(10_000)), ParseErrorKind::TooDeep);
        let call = format!("sin({}z{})", "(".repeat(300), ")".repeat(300));
        assert_eq!(kind(&call), ParseErrorKind::TooDeep);
    }

    #[test]
    fn long_chains_are_an_error() {
        assert_eq!(kind(&vec!["z"; 20_000].join("+")), ParseErrorKind::TooDeep);
        assert_eq!(kind(&vec!["z"; 20_000].join("*")), ParseErrorKind::TooDeep);
        assert_eq!(kind(&vec!["z"; 20_000].join("^")), ParseErrorKind::TooDeep);
    }

    #[test]
    fn nesting_up_to_the_limit_is_fine() {
        let parens = format!("{}z{}", "(".repeat(MAX_DEPTH - 1), ")".repeat(MAX_DEPTH - 1));
        assert_eq!(parse(&parens).unwrap(), Ast::Variable);
        assert!(parse(&vec!["z"; MAX_DEPTH].join("+")).is_ok());
        assert_eq!(kind(&vec!["z"; MAX_DEPTH + 1].join("+")), ParseErrorKind::TooDeep);
    }

    #[test]
    fn a_variable_does_not_imply_multiplication() {
        assert!(parse("z(z)").is_err());
        assert!(parse("z2").is_err());
    }
}
