//! Terminal and JSON rendering of diagnostics.

use crate::diagnostic::Diagnostic;
use crate::source_map::SourceMap;

const RESET: &str = "\x1b[0m";
const BOLD_BLUE: &str = "\x1b[1;34m";

/// Formats a diagnostic for output.
pub trait DiagnosticRenderer {
    /// Renders one diagnostic. The result ends with a newline.
    fn render(&self, diag: &Diagnostic, sources: &SourceMap) -> String;
}

/// rustc-style output:
///
/// ```text
/// error[E202]: module `A` is not defined and no attached library provides it
///   --> B.v:13:5
///    |
/// 13 |     A u1 (.clk(clk), .a(a1), .b(b1), .y(y1));
///    |     ^ instantiated here
///    = help: attach a hard-macro library that provides `A`
/// ```
pub struct TerminalRenderer {
    /// Emit ANSI colors.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.color {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, sources: &SourceMap) -> String {
        let mut out = String::new();
        let header = format!("{}[{}]", diag.severity, diag.code);
        out.push_str(&format!(
            "{}: {}\n",
            self.paint(diag.severity.ansi(), &header),
            diag.message
        ));

        if let Some(span) = diag.span {
            let loc = sources.locate(span);
            let file = sources.file(span.file);
            let gutter = " ".repeat(loc.line.to_string().len());
            let bar = self.paint(BOLD_BLUE, "|");

            out.push_str(&format!("{gutter}{} {loc}\n", self.paint(BOLD_BLUE, "-->")));
            out.push_str(&format!("{gutter} {bar}\n"));
            out.push_str(&format!(
                "{} {bar} {}\n",
                self.paint(BOLD_BLUE, &loc.line.to_string()),
                file.line_text(span.start)
            ));
            let indent = " ".repeat(loc.column.saturating_sub(1) as usize);
            let carets = "^".repeat(span.len().max(1) as usize);
            let label = diag
                .label
                .as_deref()
                .map(|l| format!(" {l}"))
                .unwrap_or_default();
            out.push_str(&format!(
                "{gutter} {bar} {indent}{}\n",
                self.paint(diag.severity.ansi(), &format!("{carets}{label}"))
            ));
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        out
    }
}

/// One JSON object per line, with the span resolved to a location.
pub struct JsonRenderer;

impl DiagnosticRenderer for JsonRenderer {
    fn render(&self, diag: &Diagnostic, sources: &SourceMap) -> String {
        let location = diag.span.map(|span| sources.locate(span));
        let value = serde_json::json!({
            "severity": diag.severity,
            "code": diag.code.to_string(),
            "message": diag.message,
            "location": location,
            "label": diag.label,
            "notes": diag.notes,
            "help": diag.help,
        });
        format!("{value}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::DiagnosticCode;
    use crate::source_map::Span;

    fn sample() -> (SourceMap, Diagnostic) {
        let mut sources = SourceMap::new();
        let id = sources.add("B.v", "module B;\n    A u1 ();\nendmodule\n".to_string());
        let diag = Diagnostic::error(DiagnosticCode::UNRESOLVED_MODULE, "unknown module `A`")
            .at(Span::new(id, 14, 15))
            .with_label("instantiated here")
            .with_help("attach a hard-macro library that provides `A`");
        (sources, diag)
    }

    #[test]
    fn terminal_plain() {
        let (sources, diag) = sample();
        let out = TerminalRenderer::new(false).render(&diag, &sources);
        assert!(out.starts_with("error[E202]: unknown module `A`\n"));
        assert!(out.contains("--> B.v:2:5"));
        assert!(out.contains("2 |     A u1 ();"));
        assert!(out.contains("|     ^ instantiated here"));
        assert!(out.contains("= help: attach a hard-macro library"));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn terminal_colored() {
        let (sources, diag) = sample();
        let out = TerminalRenderer::new(true).render(&diag, &sources);
        assert!(out.contains("\x1b[1;31merror[E202]\x1b[0m"));
    }

    #[test]
    fn terminal_without_span() {
        let sources = SourceMap::new();
        let diag = Diagnostic::error(DiagnosticCode::MISSING_ARTIFACT, "A.gds is empty")
            .with_note("produced by write.gds/0");
        let out = TerminalRenderer::new(false).render(&diag, &sources);
        assert_eq!(
            out,
            "error[F301]: A.gds is empty\n   = note: produced by write.gds/0\n"
        );
    }

    #[test]
    fn json_has_location() {
        let (sources, diag) = sample();
        let out = JsonRenderer.render(&diag, &sources);
        let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["code"], "E202");
        assert_eq!(value["severity"], "error");
        assert_eq!(value["location"]["line"], 2);
        assert_eq!(value["location"]["column"], 5);
    }
}
