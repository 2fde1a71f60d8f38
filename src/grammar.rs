//! Parallel string rewriting.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Expands `axiom` by applying `rules` to every symbol, `iterations` times.
///
/// Symbols without a rule are copied unchanged. Output length grows
/// exponentially with `iterations` for any rule that produces more than one
/// symbol, so callers should keep the count small.
pub fn generate(axiom: &str, rules: &HashMap<char, String>, iterations: u32) -> String {
    let mut current = axiom.to_owned();
    for _ in 0..iterations {
        let mut next = String::with_capacity(current.len() * 2);
        for c in current.chars() {
            match rules.get(&c) {
                Some(replacement) => next.push_str(replacement),
                None => next.push(c),
            }
        }
        current = next;
    }
    log::debug!(
        "expanded axiom {axiom:?} over {iterations} iterations into {} symbols",
        current.len()
    );
    current
}

/// An L-System: the start string, its production rules and how many times to
/// apply them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grammar {
    pub axiom: String,
    pub rules: HashMap<char, String>,
    pub iterations: u32,
}

impl Default for Grammar {
    /// A bushy tree with alternating pitch and roll branching.
    fn default() -> Self {
        Self::new("FA", 7)
            .with_rule('A', "F[^S]F[&S]FS")
            .with_rule('S', "F[*A]F[/A]FA")
            .with_rule('F', "JF")
    }
}

impl Grammar {
    /// Creates a grammar with no rules.
    pub fn new(axiom: impl Into<String>, iterations: u32) -> Self {
        Self {
            axiom: axiom.into(),
            rules: HashMap::new(),
            iterations,
        }
    }

    /// Adds or replaces the production for `symbol` (builder pattern).
    pub fn with_rule(mut self, symbol: char, replacement: impl Into<String>) -> Self {
        self.set_rule(symbol, replacement);
        self
    }

    pub fn set_rule(&mut self, symbol: char, replacement: impl Into<String>) {
        self.rules.insert(symbol, replacement.into());
    }

    /// Removes the production for `symbol`, returning it if there was one.
    pub fn remove_rule(&mut self, symbol: char) -> Option<String> {
        self.rules.remove(&symbol)
    }

    /// Copies every rule of `other` into this grammar. Rules present in both
    /// take the replacement from `other`.
    pub fn merge_rules(&mut self, other: &HashMap<char, String>) {
        for (symbol, replacement) in other {
            self.rules.insert(*symbol, replacement.clone());
        }
    }

    /// Runs the rewriting and returns the final command string.
    pub fn generate(&self) -> String {
        generate(&self.axiom, &self.rules, self.iterations)
    }
}
