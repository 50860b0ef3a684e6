use anyhow::{Context, Result};
use regex::Regex;

/// Regex filter over output lines, optionally inverted
#[derive(Debug, Clone, Default)]
pub struct LineFilter {
    pattern: Option<Regex>,
    negate: bool,
}

impl LineFilter {
    /// Join `tokens` as alternatives of a single pattern
    ///
    /// With no tokens every line passes, negated or not
    pub fn new<S: AsRef<str>>(tokens: &[S], negate: bool) -> Result<Self> {
        if tokens.is_empty() {
            return Ok(Self {
                pattern: None,
                negate,
            });
        }
        let joined = tokens
            .iter()
            .map(|t| t.as_ref())
            .collect::<Vec<_>>()
            .join("|");
        let pattern =
            Regex::new(&joined).with_context(|| format!("Invalid filter pattern: {}", joined))?;
        Ok(Self {
            pattern: Some(pattern),
            negate,
        })
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(|r| r.as_str())
    }

    pub fn accepts(&self, line: &str) -> bool {
        match &self.pattern {
            Some(p) => p.is_match(line) != self.negate,
            None => true,
        }
    }
}
