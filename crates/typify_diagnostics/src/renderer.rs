//! Diagnostic rendering backends for the aggregated failure summary and JSON.

use crate::diagnostic::Diagnostic;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic.
    fn render(&self, diag: &Diagnostic) -> String;

    /// Renders every diagnostic, one entry per diagnostic, joined by newlines.
    fn render_all(&self, diags: &[Diagnostic]) -> String {
        diags
            .iter()
            .map(|d| self.render(d))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Renders the one-line-per-diagnostic summary used in build failures.
///
/// Produces output like:
/// ```text
///   src/app.ts (3,7): Type 'number' is not assignable to type 'string'.
///   Option 'target' must be one of ...
/// ```
/// Diagnostics without a position carry no prefix. Multi-part messages
/// continue on following lines with their nesting indent.
#[derive(Default)]
pub struct SummaryRenderer;

impl DiagnosticRenderer for SummaryRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        match &diag.location {
            Some(location) => format!("  {location}: {}", diag.text()),
            None => format!("  {}", diag.text()),
        }
    }
}

/// Renders each diagnostic as a single compact JSON object.
#[derive(Default)]
pub struct JsonRenderer;

impl DiagnosticRenderer for JsonRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        // Diagnostic holds only strings, integers and enums.
        serde_json::to_string(diag).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;
    use crate::message::MessageChain;

    #[test]
    fn summary_with_position() {
        let diag = Diagnostic::error("Type 'number' is not assignable to type 'string'.")
            .at(Location::new("/in/a.ts", 2, 6));
        assert_eq!(
            SummaryRenderer.render(&diag),
            "  /in/a.ts (3,7): Type 'number' is not assignable to type 'string'."
        );
    }

    #[test]
    fn summary_without_position() {
        let diag = Diagnostic::error("Unknown compiler option 'foo'.");
        assert_eq!(
            SummaryRenderer.render(&diag),
            "  Unknown compiler option 'foo'."
        );
    }

    #[test]
    fn summary_nested_message() {
        let diag = Diagnostic::error(MessageChain::new("outer").with_next("inner".into()))
            .at(Location::new("a.ts", 0, 0));
        assert_eq!(SummaryRenderer.render(&diag), "  a.ts (1,1): outer\n  inner");
    }

    #[test]
    fn render_all_joins_lines() {
        let diags = vec![
            Diagnostic::error("one").at(Location::new("a.ts", 1, 0)),
            Diagnostic::warning("two"),
        ];
        assert_eq!(SummaryRenderer.render_all(&diags), "  a.ts (2,1): one\n  two");
    }

    #[test]
    fn json_is_parseable() {
        let diag = Diagnostic::error("oops").with_code(1005);
        let out = JsonRenderer.render(&diag);
        let back: Diagnostic = serde_json::from_str(&out).unwrap();
        assert_eq!(back, diag);
    }
}
