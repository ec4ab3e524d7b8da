use std::fmt;

use crate::cell::Value;

/// Format a number for display.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NUM!".to_string()
    } else if n.is_infinite() {
        "#DIV/0!".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

/// Spreadsheet-style rendering: arrays as `{a;b}`, errors as their code.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Error(info) => write!(f, "{}", info.kind),
            Value::Array(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(";")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("}")
            }
        }
    }
}
