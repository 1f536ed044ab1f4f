use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number { value: f64, unit: String },
    String { text: String, quoted: bool },
    Boolean(bool),
    Null,
}

/// Failure of a single value operation; the evaluator attaches the site.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperationError {
    #[error("undefined operation \"{left} {op} {right}\"")]
    Undefined {
        left: String,
        op: &'static str,
        right: String,
    },
    #[error("incompatible units {left} and {right}")]
    IncompatibleUnits { left: String, right: String },
    #[error("division by zero")]
    DivisionByZero,
}

impl Value {
    pub fn number(value: f64) -> Value {
        Value::Number {
            value,
            unit: String::new(),
        }
    }

    pub fn with_unit(value: f64, unit: impl Into<String>) -> Value {
        Value::Number {
            value,
            unit: unit.into(),
        }
    }

    pub fn quoted(text: impl Into<String>) -> Value {
        Value::String {
            text: text.into(),
            quoted: true,
        }
    }

    pub fn unquoted(text: impl Into<String>) -> Value {
        Value::String {
            text: text.into(),
            quoted: false,
        }
    }

    // only false and null are falsy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false) | Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn add(&self, rhs: &Value) -> Result<Value, OperationError> {
        match (self, rhs) {
            (Value::String { text, quoted }, other) => Ok(Value::String {
                text: format!("{}{}", text, other.unquoted_text()),
                quoted: *quoted,
            }),
            // the left operand decides quotedness, and a non-string is unquoted
            (other, Value::String { text, .. }) => Ok(Value::unquoted(format!(
                "{}{}",
                other.unquoted_text(),
                text
            ))),
            _ => self.additive(rhs, "+", |a, b| a + b),
        }
    }

    pub fn sub(&self, rhs: &Value) -> Result<Value, OperationError> {
        self.additive(rhs, "-", |a, b| a - b)
    }

    pub fn mul(&self, rhs: &Value) -> Result<Value, OperationError> {
        let ((a, ua), (b, ub)) = self.numbers(rhs, "*")?;
        if !ua.is_empty() && !ub.is_empty() {
            return Err(OperationError::IncompatibleUnits {
                left: ua.to_string(),
                right: ub.to_string(),
            });
        }
        let unit = if ua.is_empty() { ub } else { ua };
        Ok(Value::with_unit(a * b, unit))
    }

    pub fn div(&self, rhs: &Value) -> Result<Value, OperationError> {
        self.divisive(rhs, "/", |a, b| a / b)
    }

    pub fn rem(&self, rhs: &Value) -> Result<Value, OperationError> {
        self.divisive(rhs, "%", |a, b| a % b)
    }

    pub fn neg(&self) -> Result<Value, OperationError> {
        match self {
            Value::Number { value, unit } => Ok(Value::with_unit(-value, unit.clone())),
            other => Ok(Value::unquoted(format!("-{}", other.unquoted_text()))),
        }
    }

    pub fn compare(
        &self,
        rhs: &Value,
        op: &'static str,
        cmp: impl Fn(f64, f64) -> bool,
    ) -> Result<Value, OperationError> {
        let ((a, _), (b, _)) = self.numbers(rhs, op)?;
        Ok(Value::Boolean(cmp(a, b)))
    }

    fn additive(
        &self,
        rhs: &Value,
        op: &'static str,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Value, OperationError> {
        let ((a, ua), (b, ub)) = self.numbers(rhs, op)?;
        let unit = match (ua.is_empty(), ub.is_empty()) {
            (true, _) => ub,
            (_, true) => ua,
            _ if ua == ub => ua,
            _ => {
                return Err(OperationError::IncompatibleUnits {
                    left: ua.to_string(),
                    right: ub.to_string(),
                })
            }
        };
        Ok(Value::with_unit(f(a, b), unit))
    }

    fn divisive(
        &self,
        rhs: &Value,
        op: &'static str,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Value, OperationError> {
        let ((a, ua), (b, ub)) = self.numbers(rhs, op)?;
        if b == 0.0 {
            return Err(OperationError::DivisionByZero);
        }
        // px / px cancels out, px / 2 keeps px
        let unit = if ua == ub {
            ""
        } else if ub.is_empty() {
            ua
        } else {
            return Err(OperationError::IncompatibleUnits {
                left: ua.to_string(),
                right: ub.to_string(),
            });
        };
        Ok(Value::with_unit(f(a, b), unit))
    }

    fn numbers<'v>(
        &'v self,
        rhs: &'v Value,
        op: &'static str,
    ) -> Result<((f64, &'v str), (f64, &'v str)), OperationError> {
        match (self, rhs) {
            (Value::Number { value: a, unit: ua }, Value::Number { value: b, unit: ub }) => {
                Ok(((*a, ua.as_str()), (*b, ub.as_str())))
            }
            _ => Err(OperationError::Undefined {
                left: self.to_string(),
                op,
                right: rhs.to_string(),
            }),
        }
    }

    fn unquoted_text(&self) -> String {
        match self {
            Value::String { text, .. } => text.clone(),
            other => other.to_string(),
        }
    }
}

fn format_number(value: f64) -> String {
    let rounded = (value * 1e10).round() / 1e10;
    if rounded.fract() == 0.0 && rounded.abs() < 1e15 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number { value, unit } => write!(f, "{}{}", format_number(*value), unit),
            Value::String { text, quoted: true } => write!(f, "\"{}\"", text),
            Value::String { text, quoted: false } => f.write_str(text),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Null => f.write_str("null"),
        }
    }
}
