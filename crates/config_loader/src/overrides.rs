//! Command-line `dotted.key=value` overrides
//!
//! Values are typed the way a shell user expects: `true`/`false`, integers
//! and decimals become scalars, `[a, b]` becomes a list of strings, quoted
//! text loses its quotes, anything else stays a string. In particular
//! `main.execute_steps=download,preprocess` stays a delimited string.
//!
//! Keys split on `.` except inside quotes, so `artifacts.pins."data_test.csv"=v2`
//! addresses a single pin. Under `artifacts.pins` an unquoted remainder is
//! also taken whole, since artifact names carry file extensions.

use contracts::ContractError;
use serde_json::{Map, Value};

/// A parsed `key=value` override
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    pub path: Vec<String>,
    pub value: Value,
}

impl Override {
    /// Parse one `dotted.key=value` argument.
    pub fn parse(arg: &str) -> Result<Self, ContractError> {
        let (key, raw) = arg.split_once('=').ok_or_else(|| {
            ContractError::config_parse(format!("override '{arg}' is not of the form key=value"))
        })?;

        let path = split_key(key.trim()).ok_or_else(|| {
            ContractError::config_parse(format!("override '{arg}' has an unterminated quote"))
        })?;
        if path.iter().any(String::is_empty) {
            return Err(ContractError::config_parse(format!(
                "override '{arg}' has an empty key segment"
            )));
        }

        Ok(Self {
            path,
            value: parse_value(raw.trim()),
        })
    }

    pub fn key(&self) -> String {
        self.path.join(".")
    }
}

const PIN_TABLE: [&str; 2] = ["artifacts", "pins"];

/// Split a dotted key into segments, honoring `"..."` and `'...'` quoting.
/// Returns `None` on an unterminated quote.
fn split_key(key: &str) -> Option<Vec<String>> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut quote = None;

    for (i, c) in key.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                quoted = true;
            }
            None if c == '.' => {
                segments.push(finish_segment(&current, quoted));
                current.clear();
                quoted = false;
                if segments == PIN_TABLE {
                    let rest = key[i + 1..].trim();
                    segments.push(unquote(rest).to_string());
                    return Some(segments);
                }
            }
            None => current.push(c),
        }
    }
    if quote.is_some() {
        return None;
    }
    segments.push(finish_segment(&current, quoted));
    Some(segments)
}

fn finish_segment(raw: &str, quoted: bool) -> String {
    if quoted {
        raw.to_string()
    } else {
        raw.trim().to_string()
    }
}

fn parse_value(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(x) = raw.parse::<f64>() {
        if x.is_finite() {
            return Value::from(x);
        }
    }
    if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        return Value::Array(
            inner
                .split(',')
                .map(|s| unquote(s.trim()))
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
        );
    }
    Value::String(unquote(raw).to_string())
}

fn unquote(s: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(q).and_then(|r| r.strip_suffix(q)) {
            return inner;
        }
    }
    s
}

/// Apply overrides in order; later ones win.
pub fn apply(document: &mut Value, overrides: &[Override]) -> Result<(), ContractError> {
    for ov in overrides {
        set_path(document, ov)?;
    }
    Ok(())
}

fn set_path(document: &mut Value, ov: &Override) -> Result<(), ContractError> {
    let Some((last, parents)) = ov.path.split_last() else {
        return Err(ContractError::config_parse("override with empty key"));
    };

    let mut node = document;
    for (depth, segment) in parents.iter().enumerate() {
        let table = node.as_object_mut().ok_or_else(|| {
            ContractError::config_validation(
                ov.path[..depth].join("."),
                format!("cannot override '{}': not a table", ov.key()),
            )
        })?;
        node = table
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    let table = node.as_object_mut().ok_or_else(|| {
        ContractError::config_validation(
            parents.join("."),
            format!("cannot override '{}': not a table", ov.key()),
        )
    })?;
    table.insert(last.clone(), ov.value.clone());
    Ok(())
}
