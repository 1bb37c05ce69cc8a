//! Built-in tools.

use async_trait::async_trait;
use serde_json::{json, Value};

use skillbridge_core::{traits::Tool, types::ParameterSpec, Error, Result};

// =============================================================================
// Weather Tool
// =============================================================================

/// Mock weather tool returning fixed sample data.
pub struct GetWeatherTool;

#[async_trait]
impl Tool for GetWeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get weather for a location"
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![ParameterSpec::required_string("location", "City name")]
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let location = args
            .get("location")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::validation("location is required"))?;

        Ok(json!({
            "temperature": 72,
            "condition": "sunny",
            "location": location,
        }))
    }
}

// =============================================================================
// Calculator Tool
// =============================================================================

/// Calculator tool evaluating arithmetic expressions.
pub struct CalculateTool;

#[async_trait]
impl Tool for CalculateTool {
    fn name(&self) -> &str {
        "calculate"
    }

    fn description(&self) -> &str {
        "Calculate a mathematical expression"
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![ParameterSpec::required_string(
            "expression",
            "Mathematical expression to evaluate",
        )]
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let expression = args
            .get("expression")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::validation("expression is required"))?;

        let result = eval_expression(expression)?;
        Ok(json!({ "result": result }))
    }
}

// =============================================================================
// Add Numbers Tool
// =============================================================================

/// Adds two integers.
pub struct AddNumbersTool;

#[async_trait]
impl Tool for AddNumbersTool {
    fn name(&self) -> &str {
        "add_numbers"
    }

    fn description(&self) -> &str {
        "Add two numbers together"
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required_integer("a", "First number"),
            ParameterSpec::required_integer("b", "Second number"),
        ]
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let a = int_arg(&args, "a")?;
        let b = int_arg(&args, "b")?;
        Ok(json!(a + b))
    }
}

fn int_arg(args: &Value, name: &str) -> Result<i64> {
    let value = args
        .get(name)
        .ok_or_else(|| Error::validation(format!("{} is required", name)))?;
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| Error::validation(format!("{} must be an integer", name)))
}

// =============================================================================
// Expression Evaluator
// =============================================================================

/// Evaluate an arithmetic expression over `+ - * / ( )` and decimal numbers.
pub fn eval_expression(input: &str) -> Result<f64> {
    let mut parser = Parser {
        input: input.as_bytes(),
        pos: 0,
    };
    let value = parser.expression()?;
    parser.skip_whitespace();
    if parser.pos != parser.input.len() {
        return Err(Error::validation(format!(
            "unexpected character at position {}",
            parser.pos
        )));
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.input.get(self.pos).copied()
    }

    fn expression(&mut self) -> Result<f64> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                b'+' => {
                    self.pos += 1;
                    value += self.term()?;
                }
                b'-' => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64> {
        let mut value = self.factor()?;
        while let Some(op) = self.peek() {
            match op {
                b'*' => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                b'/' => {
                    self.pos += 1;
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err(Error::tool_execution("division by zero"));
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64> {
        match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                Ok(-self.factor()?)
            }
            Some(b'(') => {
                self.pos += 1;
                let value = self.expression()?;
                if self.peek() != Some(b')') {
                    return Err(Error::validation("expected closing parenthesis"));
                }
                self.pos += 1;
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || c == b'.' => self.number(),
            _ => Err(Error::validation(format!(
                "expected number at position {}",
                self.pos
            ))),
        }
    }

    fn number(&mut self) -> Result<f64> {
        self.skip_whitespace();
        let start = self.pos;
        while self.pos < self.input.len()
            && (self.input[self.pos].is_ascii_digit() || self.input[self.pos] == b'.')
        {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| Error::validation("invalid number"))?;
        text.parse()
            .map_err(|_| Error::validation(format!("invalid number '{}'", text)))
    }
}
