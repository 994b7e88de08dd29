//! `${NAME}` placeholder substitution
//!
//! String leaves of a config subtree are rewritten in place using a
//! variable table built from the plan's `env` section. Lookup prefers a
//! non-empty process environment value over the declared default; an
//! empty environment value counts as unset. A placeholder with no usable
//! value fails the whole run before any role starts.

use std::collections::BTreeMap;

use serde_yaml::Value;

use crate::common::{Error, Result};

/// Resolved variable values, read-only after construction
#[derive(Debug, Default)]
pub struct VarTable {
    vars: BTreeMap<String, String>,
}

impl VarTable {
    /// Build the table from plan defaults, overridden by the process
    /// environment.
    pub fn from_process_env(defaults: &BTreeMap<String, Value>) -> Self {
        Self::build(defaults, |name| std::env::var(name).ok())
    }

    /// Build the table with an explicit environment lookup.
    ///
    /// Values are resolved eagerly; a key left empty by both sources is
    /// only an error once a placeholder references it.
    pub fn build(
        defaults: &BTreeMap<String, Value>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut vars = BTreeMap::new();
        for (name, default) in defaults {
            let value = match env(name) {
                Some(v) if !v.is_empty() => v,
                _ => scalar_to_string(default),
            };
            vars.insert(name.clone(), value);
        }
        Self { vars }
    }

    fn lookup(&self, name: &str) -> Result<&str> {
        match self.vars.get(name) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(Error::VariableNotFound(name.to_string())),
        }
    }

    /// Expand every `${identifier}` occurrence in `input`, left to right.
    ///
    /// Identifiers are ASCII word characters; anything else after `${`
    /// is not a placeholder and stays literal.
    pub fn expand(&self, input: &str) -> Result<String> {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(pos) = rest.find("${") {
            let after = &rest[pos + 2..];
            let len = after
                .bytes()
                .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
                .count();
            if len > 0 && after.as_bytes().get(len) == Some(&b'}') {
                out.push_str(&rest[..pos]);
                out.push_str(self.lookup(&after[..len])?);
                rest = &after[len + 1..];
            } else {
                out.push_str(&rest[..pos + 2]);
                rest = after;
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

/// Rewrite every string leaf of `node` in place.
///
/// Recursion descends mapping values only; sequences and other
/// non-string leaves pass through untouched.
pub fn resolve(node: &mut Value, vars: &VarTable) -> Result<()> {
    match node {
        Value::String(s) => {
            *s = vars.expand(s)?;
        }
        Value::Mapping(map) => {
            for (_, value) in map.iter_mut() {
                resolve(value, vars)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
