//! JSON rendering of tree values.
//!
//! Used wherever a value must become text: the `str()` operator, auto-id
//! labels, and the command-line driver. Mapping entries are written in
//! insertion order, so output mirrors the input document.
//!
//! # Examples
//!
//! ```
//! use jsonpath_lang::Value;
//! use jsonpath_lang::output::{to_json, to_json_pretty};
//!
//! let value = Value::Array(vec![Value::Integer(1), Value::Float(2.0)]);
//!
//! assert_eq!(to_json(&value), "[1,2.0]");
//! assert_eq!(to_json_pretty(&value), "[\n  1,\n  2.0\n]");
//! ```

use indexmap::IndexMap;

use crate::value::Value;

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        self.print_value(value, 0)
    }

    fn print_value(&self, value: &Value, indent: usize) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) => format_float(*n),
            Value::String(s) => format!("\"{}\"", escape_string(s)),
            Value::Array(arr) => self.print_array(arr, indent),
            Value::Object(obj) => self.print_object(obj, indent),
        }
    }

    fn print_array(&self, arr: &[Value], indent: usize) -> String {
        if arr.is_empty() {
            return "[]".to_string();
        }

        let items: Vec<String> = arr
            .iter()
            .map(|v| self.print_value(v, indent + 1))
            .collect();
        self.wrap('[', ']', items, indent)
    }

    fn print_object(&self, obj: &IndexMap<String, Value>, indent: usize) -> String {
        if obj.is_empty() {
            return "{}".to_string();
        }

        let separator = if self.pretty { ": " } else { ":" };
        let items: Vec<String> = obj
            .iter()
            .map(|(k, v)| {
                format!(
                    "\"{}\"{}{}",
                    escape_string(k),
                    separator,
                    self.print_value(v, indent + 1)
                )
            })
            .collect();
        self.wrap('{', '}', items, indent)
    }

    fn wrap(&self, open: char, close: char, items: Vec<String>, indent: usize) -> String {
        if !self.pretty {
            return format!("{}{}{}", open, items.join(","), close);
        }

        let inner = self.indent(indent + 1);
        let body: Vec<String> = items.into_iter().map(|item| format!("{inner}{item}")).collect();
        format!("{}\n{}\n{}{}", open, body.join(",\n"), self.indent(indent), close)
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }
}

/// Whole floats keep a `.0` so they stay distinguishable from integers.
fn format_float(n: f64) -> String {
    if !n.is_finite() {
        return "null".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e16 {
        format!("{:.1}", n)
    } else {
        n.to_string()
    }
}

fn escape_string(s: &str) -> String {
    s.chars()
        .flat_map(|c| match c {
            '"' => vec!['\\', '"'],
            '\\' => vec!['\\', '\\'],
            '\n' => vec!['\\', 'n'],
            '\r' => vec!['\\', 'r'],
            '\t' => vec!['\\', 't'],
            c if c.is_control() => format!("\\u{:04x}", c as u32).chars().collect(),
            c => vec![c],
        })
        .collect()
}

/// Converts a value to compact JSON with no extra whitespace.
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Converts a value to JSON indented by two spaces per level.
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}
