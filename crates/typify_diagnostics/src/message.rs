//! Nested diagnostic message text.

use serde::{Deserialize, Serialize};

/// A diagnostic message, possibly elaborated by nested detail messages.
///
/// Engines often explain an error with a chain such as
/// "Type 'A' is not assignable to type 'B'" → "Property 'x' is missing".
/// Deserializes from either a plain string or `{ "text": ..., "next": [...] }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ChainRepr")]
pub struct MessageChain {
    /// The text of this link.
    pub text: String,
    /// Detail messages, rendered indented below this one.
    pub next: Vec<MessageChain>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChainRepr {
    Text(String),
    Chain {
        text: String,
        #[serde(default)]
        next: Vec<MessageChain>,
    },
}

impl From<ChainRepr> for MessageChain {
    fn from(repr: ChainRepr) -> Self {
        match repr {
            ChainRepr::Text(text) => Self::new(text),
            ChainRepr::Chain { text, next } => Self { text, next },
        }
    }
}

impl MessageChain {
    /// Creates a single-link message.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            next: Vec::new(),
        }
    }

    /// Appends a detail message.
    pub fn with_next(mut self, next: MessageChain) -> Self {
        self.next.push(next);
        self
    }

    /// Flattens the chain into one string, each nested level on its own line
    /// indented two spaces deeper than its parent.
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        self.flatten_into(&mut out, 0);
        out
    }

    fn flatten_into(&self, out: &mut String, depth: usize) {
        if depth > 0 {
            out.push('\n');
            out.push_str(&"  ".repeat(depth));
        }
        out.push_str(&self.text);
        for child in &self.next {
            child.flatten_into(out, depth + 1);
        }
    }
}

impl From<&str> for MessageChain {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for MessageChain {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}
