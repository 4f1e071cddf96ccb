//! Structured diagnostics as produced by the checking engine.

use crate::location::Location;
use crate::message::MessageChain;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// A diagnostic reported by the checking engine.
///
/// The adapter never inspects diagnostic text; it only aggregates and renders
/// it. Diagnostics without a file position (compiler-option problems, global
/// errors) have no [`Location`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    #[serde(default)]
    pub severity: Severity,
    /// The engine's numeric diagnostic code, if it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    /// The message, possibly with nested details.
    pub message: MessageChain,
    /// Where the diagnostic points, if anywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Diagnostic {
    /// Creates a new error diagnostic without a position.
    pub fn error(message: impl Into<MessageChain>) -> Self {
        Self {
            severity: Severity::Error,
            code: None,
            message: message.into(),
            location: None,
        }
    }

    /// Creates a new warning diagnostic without a position.
    pub fn warning(message: impl Into<MessageChain>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(message)
        }
    }

    /// Attaches a file position.
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Sets the engine's diagnostic code.
    pub fn with_code(mut self, code: u32) -> Self {
        self.code = Some(code);
        self
    }

    /// Returns the flattened message text.
    pub fn text(&self) -> String {
        self.message.flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_error() {
        let diag = Diagnostic::error("Cannot find name 'foo'.");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.text(), "Cannot find name 'foo'.");
        assert!(diag.location.is_none());
    }

    #[test]
    fn builder_methods() {
        let diag = Diagnostic::warning("unused")
            .with_code(6133)
            .at(Location::new("a.ts", 2, 3));
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.code, Some(6133));
        assert_eq!(diag.location.unwrap().line, 2);
    }

    #[test]
    fn deserialize_minimal() {
        let diag: Diagnostic = serde_json::from_str(r#"{"message": "bad option"}"#).unwrap();
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.text(), "bad option");
        assert!(diag.code.is_none());
    }

    #[test]
    fn deserialize_positioned() {
        let json = r#"{
            "severity": "error",
            "code": 2322,
            "message": {"text": "Type 'number' is not assignable to type 'string'."},
            "location": {"file": "/in/a.ts", "line": 0, "column": 4}
        }"#;
        let diag: Diagnostic = serde_json::from_str(json).unwrap();
        assert_eq!(diag.code, Some(2322));
        assert_eq!(diag.location.unwrap().to_string(), "/in/a.ts (1,5)");
    }
}
