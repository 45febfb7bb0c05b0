//! Explicit environment snapshot.
//!
//! Configuration for the whole tool is environment-driven. Rather than letting
//! each component call `std::env::var`, the binaries capture the environment
//! once and hand the snapshot down.

use std::collections::BTreeMap;

/// An immutable copy of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment. Non-UTF-8 entries are skipped.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Build a snapshot from literal pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Raw lookup. Distinguishes unset (`None`) from empty (`Some("")`).
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Value of `name` if it is set to a non-empty string.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.raw(name).filter(|v| !v.is_empty())
    }

    /// Walk a precedence chain and return the first tier that is set.
    ///
    /// Empty values count as unset and fall through to the next tier.
    pub fn first_set(&self, chain: &[&str]) -> Option<&str> {
        chain.iter().find_map(|name| self.get(name))
    }

    /// Like [`first_set`](Self::first_set), falling back to `default`.
    pub fn first_set_or<'a>(&'a self, chain: &[&str], default: &'a str) -> &'a str {
        self.first_set(chain).unwrap_or(default)
    }

    /// Return a copy with `name` set to `value`.
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }
}
