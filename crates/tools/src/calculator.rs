//! Calculator tool: evaluates arithmetic found in free text.
//!
//! The expression is pulled out of the input (the longest run of digits,
//! operators, parentheses, dots and whitespace that contains an operator),
//! then evaluated by a recursive-descent parser supporting `+`, `-`, `*`,
//! `/`, parentheses, unary signs and decimal numbers. Nothing else is
//! evaluated.

use async_trait::async_trait;
use regex_lite::Regex;
use std::sync::LazyLock;
use taskloop_core::error::ToolError;
use taskloop_core::tool::{Observation, Tool};

static MATH_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9+\-*/().\s]+").expect("math run pattern is valid"));

static MATH_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9+\-*/().\s]+$").expect("math-only pattern is valid"));

const OPERATORS: [char; 4] = ['+', '-', '*', '/'];

/// Deepest nesting of parentheses and unary signs the parser accepts.
const MAX_DEPTH: usize = 256;

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate a mathematical expression. Supports +, -, *, /, parentheses, and decimal numbers."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "input": {
                    "type": "string",
                    "description": "Text containing the expression to evaluate, e.g. 'what is (2 + 3) * 4'"
                }
            },
            "required": ["input"]
        })
    }

    async fn execute(&self, input: &str) -> Result<Observation, ToolError> {
        let expr = extract_expression(input).ok_or_else(|| {
            ToolError::InvalidArguments(format!(
                "Could not find mathematical expression in '{input}'"
            ))
        })?;

        let value = evaluate(&expr).map_err(ToolError::ExecutionFailed)?;
        Ok(Observation::text(format!(
            "Calculator result: {} = {}",
            expr,
            format_number(value)
        )))
    }
}

/// Find the arithmetic expression embedded in `input`.
pub fn extract_expression(input: &str) -> Option<String> {
    let mut best: Option<&str> = None;
    for m in MATH_RUN.find_iter(input) {
        let run = m.as_str();
        if !run.contains(OPERATORS) || run.trim().len() <= 2 {
            continue;
        }
        if best.is_none_or(|b| run.len() > b.len()) {
            best = Some(run);
        }
    }

    if let Some(run) = best {
        return Some(run.trim().to_string());
    }

    let trimmed = input.trim();
    MATH_ONLY.is_match(trimmed).then(|| trimmed.to_string())
}

/// Remove the trailing `.0` from integral values.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// ── Recursive-descent expression evaluator ────────────────────────────────

/// Evaluate a mathematical expression string.
pub fn evaluate(expr: &str) -> Result<f64, String> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser::new(&tokens);
    let result = parser.parse_expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(format!(
            "Unexpected token at position {}: {:?}",
            parser.pos, parser.tokens[parser.pos]
        ));
    }
    Ok(result)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            c if c.is_whitespace() => i += 1,
            '+' => { tokens.push(Token::Plus); i += 1; }
            '-' => { tokens.push(Token::Minus); i += 1; }
            '*' => { tokens.push(Token::Star); i += 1; }
            '/' => { tokens.push(Token::Slash); i += 1; }
            '(' => { tokens.push(Token::LParen); i += 1; }
            ')' => { tokens.push(Token::RParen); i += 1; }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let num_str: String = chars[start..i].iter().collect();
                let num: f64 = num_str
                    .parse()
                    .map_err(|_| format!("Invalid number: {}", num_str))?;
                tokens.push(Token::Number(num));
            }
            c => return Err(format!("Unexpected character: '{}'", c)),
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn descend(&mut self) -> Result<(), String> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err("Expression too deeply nested".into());
        }
        Ok(())
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    // expr = term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<f64, String> {
        let mut left = self.parse_term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.consume();
                    left += self.parse_term()?;
                }
                Token::Minus => {
                    self.consume();
                    left -= self.parse_term()?;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // term = unary (('*' | '/') unary)*
    fn parse_term(&mut self) -> Result<f64, String> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.consume();
                    left *= self.parse_unary()?;
                }
                Token::Slash => {
                    self.consume();
                    let right = self.parse_unary()?;
                    if right == 0.0 {
                        return Err("Division by zero".into());
                    }
                    left /= right;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // unary = ('-' | '+') unary | primary
    fn parse_unary(&mut self) -> Result<f64, String> {
        let value = match self.peek() {
            Some(Token::Minus) => {
                self.consume();
                self.descend()?;
                -self.parse_unary()?
            }
            Some(Token::Plus) => {
                self.consume();
                self.descend()?;
                self.parse_unary()?
            }
            _ => return self.parse_primary(),
        };
        self.depth -= 1;
        Ok(value)
    }

    // primary = NUMBER | '(' expr ')'
    fn parse_primary(&mut self) -> Result<f64, String> {
        match self.consume() {
            Some(Token::Number(n)) => Ok(*n),
            Some(Token::LParen) => {
                self.descend()?;
                let val = self.parse_expr()?;
                self.depth -= 1;
                match self.consume() {
                    Some(Token::RParen) => Ok(val),
                    _ => Err("Expected closing parenthesis".into()),
                }
            }
            Some(tok) => Err(format!("Unexpected token: {:?}", tok)),
            None => Err("Unexpected end of expression".into()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
