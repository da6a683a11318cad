//! Calculator tool — evaluates mathematical expressions.
//!
//! Supports arithmetic (`+`, `-`, `*`, `/`, `**`, `%`, `//`), parentheses,
//! unary negation, and a whitelist of math functions and constants. Uses a
//! recursive-descent parser for correctness. No dependencies beyond std.

use async_trait::async_trait;
use infoagent_core::error::ToolError;
use infoagent_core::tool::{Tool, ToolResult};

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate a mathematical expression. Supports +, -, *, /, **, %, //, parentheses, \
         functions like sqrt, log, sin, cos, round, pow, and the constants pi and e."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "The mathematical expression to evaluate, e.g. '2 + 2' or 'sqrt(144)'"
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let expression = arguments["expression"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'expression' argument".into()))?;

        match evaluate(expression) {
            Ok(value) => Ok(ToolResult::ok(format!(
                "{expression} = {}",
                format_value(value)
            ))),
            Err(EvalError::DivisionByZero) => Ok(ToolResult::error("Error: Division by zero")),
            Err(EvalError::Invalid(reason)) => Ok(ToolResult::error(format!(
                "Error evaluating '{expression}': {reason}"
            ))),
        }
    }
}

/// Format a result, suppressing the trailing fractional part of whole numbers.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

// ── Recursive-descent expression evaluator ────────────────────────────────

/// Why an expression failed to evaluate.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    DivisionByZero,
    Invalid(String),
}

/// Evaluate a mathematical expression string.
pub fn evaluate(expr: &str) -> Result<f64, EvalError> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser::new(&tokens);
    let result = parser.parse_expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(EvalError::Invalid(format!(
            "Unexpected token at position {}: {:?}",
            parser.pos, parser.tokens[parser.pos]
        )));
    }
    Ok(result)
}

/// Math functions callable with `name(args)`.
const FUNCTIONS: &[&str] = &[
    "sqrt", "abs", "ceil", "floor", "log", "log2", "log10", "sin", "cos", "tan", "round", "pow",
];

fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(std::f64::consts::PI),
        "e" => Some(std::f64::consts::E),
        _ => None,
    }
}

fn apply_function(name: &str, args: &[f64]) -> Result<f64, EvalError> {
    let value = match (name, args) {
        ("log" | "log2" | "log10", [x, ..]) if *x <= 0.0 => {
            return Err(EvalError::Invalid("math domain error".into()));
        }
        ("sqrt", [x]) => x.sqrt(),
        ("abs", [x]) => x.abs(),
        ("ceil", [x]) => x.ceil(),
        ("floor", [x]) => x.floor(),
        ("log", [x]) => x.ln(),
        ("log", [x, base]) => x.ln() / base.ln(),
        ("log2", [x]) => x.log2(),
        ("log10", [x]) => x.log10(),
        ("sin", [x]) => x.sin(),
        ("cos", [x]) => x.cos(),
        ("tan", [x]) => x.tan(),
        // round() halves go to the nearest even number (banker's rounding)
        ("round", [x]) => x.round_ties_even(),
        ("round", [x, digits]) => {
            let factor = 10f64.powi(*digits as i32);
            (x * factor).round_ties_even() / factor
        }
        ("pow", [base, exp]) => base.powf(*exp),
        ("log" | "round", _) => {
            return Err(EvalError::Invalid(format!(
                "{name}() expects 1 or 2 arguments"
            )));
        }
        ("pow", _) => {
            return Err(EvalError::Invalid("pow() expects 2 arguments".into()));
        }
        _ => {
            return Err(EvalError::Invalid(format!("{name}() expects 1 argument")));
        }
    };

    if value.is_nan() {
        return Err(EvalError::Invalid("math domain error".into()));
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::StarStar);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                if chars.get(i + 1) == Some(&'/') {
                    tokens.push(Token::SlashSlash);
                    i += 2;
                } else {
                    tokens.push(Token::Slash);
                    i += 1;
                }
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let num_str: String = chars[start..i].iter().collect();
                let num: f64 = num_str
                    .parse()
                    .map_err(|_| EvalError::Invalid(format!("Invalid number: {num_str}")))?;
                tokens.push(Token::Number(num));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                tokens.push(Token::Ident(ident));
            }
            c => return Err(EvalError::Invalid(format!("Unexpected character: '{c}'"))),
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    // expr = term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<f64, EvalError> {
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

    // term = unary (('*' | '/' | '//' | '%') unary)*
    fn parse_term(&mut self) -> Result<f64, EvalError> {
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
                        return Err(EvalError::DivisionByZero);
                    }
                    left /= right;
                }
                Token::SlashSlash => {
                    self.consume();
                    let right = self.parse_unary()?;
                    if right == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    left = (left / right).floor();
                }
                Token::Percent => {
                    self.consume();
                    let right = self.parse_unary()?;
                    if right == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    // Floored modulo: the result takes the sign of the divisor.
                    left -= right * (left / right).floor();
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // unary = '-' unary | power
    fn parse_unary(&mut self) -> Result<f64, EvalError> {
        if let Some(Token::Minus) = self.peek() {
            self.consume();
            let val = self.parse_unary()?;
            return Ok(-val);
        }
        self.parse_power()
    }

    // power = primary ('**' unary)?   right-associative; '-2 ** 2' is -4
    fn parse_power(&mut self) -> Result<f64, EvalError> {
        let base = self.parse_primary()?;
        if let Some(Token::StarStar) = self.peek() {
            self.consume();
            let exp = self.parse_unary()?;
            return Ok(base.powf(exp));
        }
        Ok(base)
    }

    // primary = NUMBER | IDENT | IDENT '(' args ')' | '(' expr ')'
    fn parse_primary(&mut self) -> Result<f64, EvalError> {
        match self.consume() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::Ident(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.consume();
                    let args = self.parse_args()?;
                    if FUNCTIONS.contains(&name.as_str()) {
                        apply_function(&name, &args)
                    } else if constant(&name).is_some() {
                        Err(EvalError::Invalid(format!("'{name}' is not callable.")))
                    } else {
                        Err(EvalError::Invalid(format!("Function not allowed: '{name}'")))
                    }
                } else if let Some(value) = constant(&name) {
                    Ok(value)
                } else if FUNCTIONS.contains(&name.as_str()) {
                    Err(EvalError::Invalid(format!(
                        "'{name}' is a function, not a constant. Call it with ()."
                    )))
                } else {
                    Err(EvalError::Invalid(format!("Unknown name: '{name}'")))
                }
            }
            Some(Token::LParen) => {
                let val = self.parse_expr()?;
                match self.consume() {
                    Some(Token::RParen) => Ok(val),
                    _ => Err(EvalError::Invalid("Expected closing parenthesis".into())),
                }
            }
            Some(tok) => Err(EvalError::Invalid(format!("Unexpected token: {tok:?}"))),
            None => Err(EvalError::Invalid("Unexpected end of expression".into())),
        }
    }

    // args = [expr (',' expr)*] ')'
    fn parse_args(&mut self) -> Result<Vec<f64>, EvalError> {
        let mut args = Vec::new();
        if let Some(Token::RParen) = self.peek() {
            self.consume();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            match self.consume() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok(args),
                Some(tok) => {
                    return Err(EvalError::Invalid(format!(
                        "Expected ',' or ')' in argument list, found {tok:?}"
                    )));
                }
                None => return Err(EvalError::Invalid("Expected closing parenthesis".into())),
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_addition() {
        assert_eq!(evaluate("2 + 3").unwrap(), 5.0);
    }

    #[test]
    fn operator_precedence() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
    }

    #[test]
    fn parentheses() {
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
    }

    #[test]
    fn nested_parentheses() {
        assert_eq!(evaluate("((1 + 2) * (3 + 4))").unwrap(), 21.0);
    }

    #[test]
    fn division() {
        assert_eq!(evaluate("10 / 4").unwrap(), 2.5);
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(evaluate("1 / 0"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn floor_division() {
        assert_eq!(evaluate("7 // 2").unwrap(), 3.0);
        assert_eq!(evaluate("-7 // 2").unwrap(), -4.0);
    }

    #[test]
    fn floor_division_by_zero() {
        assert_eq!(evaluate("7 // 0"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn modulo_follows_divisor_sign() {
        assert_eq!(evaluate("7 % 3").unwrap(), 1.0);
        assert_eq!(evaluate("-7 % 3").unwrap(), 2.0);
        assert_eq!(evaluate("7 % -3").unwrap(), -2.0);
    }

    #[test]
    fn modulo_by_zero() {
        assert_eq!(evaluate("7 % 0"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn power() {
        assert_eq!(evaluate("2 ** 10").unwrap(), 1024.0);
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(evaluate("2 ** 3 ** 2").unwrap(), 512.0);
    }

    #[test]
    fn power_binds_tighter_than_unary_minus() {
        assert_eq!(evaluate("-2 ** 2").unwrap(), -4.0);
        assert_eq!(evaluate("2 ** -1").unwrap(), 0.5);
    }

    #[test]
    fn unary_negation() {
        assert_eq!(evaluate("-5 + 3").unwrap(), -2.0);
    }

    #[test]
    fn decimals() {
        assert_eq!(evaluate("3.14 * 2").unwrap(), 6.28);
    }

    #[test]
    fn sqrt_function() {
        assert_eq!(evaluate("sqrt(144)").unwrap(), 12.0);
    }

    #[test]
    fn trig_with_pi() {
        assert!((evaluate("sin(pi / 2)").unwrap() - 1.0).abs() < 1e-10);
        assert!((evaluate("cos(0)").unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn natural_log_of_e() {
        assert!((evaluate("log(e)").unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn log_with_base() {
        assert!((evaluate("log(8, 2)").unwrap() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn log_variants() {
        assert!((evaluate("log2(8)").unwrap() - 3.0).abs() < 1e-10);
        assert!((evaluate("log10(1000)").unwrap() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn round_halves_to_even() {
        assert_eq!(evaluate("round(2.5)").unwrap(), 2.0);
        assert_eq!(evaluate("round(3.5)").unwrap(), 4.0);
    }

    #[test]
    fn round_with_digits() {
        assert!((evaluate("round(2.675, 2)").unwrap() - 2.67).abs() < 1e-9);
    }

    #[test]
    fn misc_functions() {
        assert_eq!(evaluate("abs(-5)").unwrap(), 5.0);
        assert_eq!(evaluate("ceil(1.2)").unwrap(), 2.0);
        assert_eq!(evaluate("floor(-1.2)").unwrap(), -2.0);
        assert_eq!(evaluate("pow(2, 8)").unwrap(), 256.0);
    }

    #[test]
    fn unknown_name() {
        match evaluate("import os") {
            Err(EvalError::Invalid(reason)) => {
                assert_eq!(reason, "Unknown name: 'import'");
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn function_used_as_constant() {
        match evaluate("sqrt") {
            Err(EvalError::Invalid(reason)) => {
                assert_eq!(
                    reason,
                    "'sqrt' is a function, not a constant. Call it with ()."
                );
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn unknown_function_rejected() {
        match evaluate("foo(2)") {
            Err(EvalError::Invalid(reason)) => {
                assert_eq!(reason, "Function not allowed: 'foo'");
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn constant_is_not_callable() {
        match evaluate("pi(2)") {
            Err(EvalError::Invalid(reason)) => {
                assert_eq!(reason, "'pi' is not callable.");
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn sqrt_of_negative_is_domain_error() {
        match evaluate("sqrt(-1)") {
            Err(EvalError::Invalid(reason)) => assert_eq!(reason, "math domain error"),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn log_of_zero_is_domain_error() {
        match evaluate("log(0)") {
            Err(EvalError::Invalid(reason)) => assert_eq!(reason, "math domain error"),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn wrong_arity() {
        assert!(matches!(evaluate("sqrt(1, 2)"), Err(EvalError::Invalid(_))));
        assert!(matches!(evaluate("pow(2)"), Err(EvalError::Invalid(_))));
    }

    #[test]
    fn invalid_expression() {
        assert!(evaluate("2 +").is_err());
    }

    #[test]
    fn empty_expression() {
        assert!(evaluate("").is_err());
    }

    #[tokio::test]
    async fn tool_execute() {
        let tool = CalculatorTool;
        let result = tool
            .execute(serde_json::json!({"expression": "2 + 2"}))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.output, "2 + 2 = 4");
    }

    #[tokio::test]
    async fn tool_formats_whole_floats_as_integers() {
        let tool = CalculatorTool;
        let result = tool
            .execute(serde_json::json!({"expression": "sqrt(144)"}))
            .await
            .unwrap();

        assert_eq!(result.output, "sqrt(144) = 12");
    }

    #[tokio::test]
    async fn tool_formats_decimals() {
        let tool = CalculatorTool;
        let result = tool
            .execute(serde_json::json!({"expression": "10 / 3"}))
            .await
            .unwrap();

        assert!(result.output.starts_with("10 / 3 = 3.333"));
    }

    #[tokio::test]
    async fn tool_division_by_zero_is_text() {
        let tool = CalculatorTool;
        let result = tool
            .execute(serde_json::json!({"expression": "1/0"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.output, "Error: Division by zero");
    }

    #[tokio::test]
    async fn tool_rejects_arbitrary_code_as_text() {
        let tool = CalculatorTool;
        let result = tool
            .execute(serde_json::json!({"expression": "import os"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(
            result.output,
            "Error evaluating 'import os': Unknown name: 'import'"
        );
    }

    #[tokio::test]
    async fn tool_missing_expression() {
        let tool = CalculatorTool;
        let result = tool.execute(serde_json::json!({})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn tool_definition() {
        let tool = CalculatorTool;
        let def = tool.to_definition();
        assert_eq!(def.name, "calculator");
    }
}
