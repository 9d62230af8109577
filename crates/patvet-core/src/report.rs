//! Rendering of collected diagnostics.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::types::Diagnostic;

/// Placeholder rendered in the position column of a position-less diagnostic.
const NO_POSITION: &str = "-";

/// Output format for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Column-aligned `position: message` lines.
    #[default]
    Text,
    /// Pretty-printed JSON array.
    Json,
}

/// Renders diagnostics relative to a project root.
#[derive(Debug, Clone)]
pub struct Reporter<'r> {
    root: &'r Path,
    format: ReportFormat,
    color: bool,
}

#[derive(Serialize)]
struct JsonDiagnostic<'d> {
    file: Option<String>,
    line: Option<usize>,
    column: Option<usize>,
    message: &'d str,
}

impl<'r> Reporter<'r> {
    /// Creates a plain-text reporter for `root`.
    #[must_use]
    pub fn new(root: &'r Path) -> Self {
        Self {
            root,
            format: ReportFormat::Text,
            color: false,
        }
    }

    /// Sets the output format.
    #[must_use]
    pub fn format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Enables ANSI color on the position column of text output.
    #[must_use]
    pub fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Writes `diagnostics` in accumulation order and flushes `out`.
    ///
    /// Nothing is written for an empty slice.
    ///
    /// # Errors
    ///
    /// Returns any IO or serialization error from the writer.
    pub fn flush<W: Write>(&self, diagnostics: &[Diagnostic], mut out: W) -> std::io::Result<()> {
        if diagnostics.is_empty() {
            return out.flush();
        }
        match self.format {
            ReportFormat::Text => out.write_all(self.render_text(diagnostics).as_bytes())?,
            ReportFormat::Json => {
                let items: Vec<_> = diagnostics.iter().map(|d| self.json_item(d)).collect();
                serde_json::to_writer_pretty(&mut out, &items)?;
                writeln!(out)?;
            }
        }
        out.flush()
    }

    /// Renders the column-aligned text form.
    #[must_use]
    pub fn render_text(&self, diagnostics: &[Diagnostic]) -> String {
        let positions: Vec<String> = diagnostics
            .iter()
            .map(|d| {
                d.position
                    .as_ref()
                    .map_or_else(|| NO_POSITION.to_string(), |p| p.relative_to(self.root))
            })
            .collect();
        let width = positions
            .iter()
            .map(|p| p.chars().count())
            .max()
            .unwrap_or(0)
            + 1;

        let mut output = String::new();
        for (position, diagnostic) in positions.iter().zip(diagnostics) {
            let padding = " ".repeat(width - position.chars().count());
            if self.color {
                output.push_str(&format!("\x1b[32m{position}\x1b[0m:"));
            } else {
                output.push_str(position);
                output.push(':');
            }
            output.push_str(&padding);
            output.push_str(&diagnostic.message);
            output.push('\n');
        }
        output
    }

    fn json_item<'d>(&self, diagnostic: &'d Diagnostic) -> JsonDiagnostic<'d> {
        let position = diagnostic.position.as_ref();
        JsonDiagnostic {
            file: position.map(|p| {
                p.file
                    .strip_prefix(self.root)
                    .unwrap_or(&p.file)
                    .display()
                    .to_string()
            }),
            line: position.map(|p| p.line),
            column: position.map(|p| p.column),
            message: &diagnostic.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    fn sample() -> Vec<Diagnostic> {
        vec![
            Diagnostic::at(Position::new("/p/src/a.rs", 3, 1), "first"),
            Diagnostic::at(Position::new("/p/src/longer_name.rs", 12, 5), "second"),
            Diagnostic::unpositioned("matcher failed"),
        ]
    }

    #[test]
    fn text_is_column_aligned() {
        let out = Reporter::new(Path::new("/p")).render_text(&sample());
        insta::assert_snapshot!(out, @r"
        ./src/a.rs:3:1:            first
        ./src/longer_name.rs:12:5: second
        -:                         matcher failed
        ");
    }

    #[test]
    fn alignment_counts_characters_not_bytes() {
        let diagnostics = vec![
            Diagnostic::at(Position::new("/p/données.rs", 1, 1), "accented"),
            Diagnostic::at(Position::new("/p/abcdefgh.rs", 1, 1), "ascii"),
        ];
        let out = Reporter::new(Path::new("/p")).render_text(&diagnostics);
        assert_eq!(
            out,
            "./données.rs:1:1:  accented\n./abcdefgh.rs:1:1: ascii\n"
        );
    }

    #[test]
    fn color_wraps_position_only() {
        let diagnostics = vec![Diagnostic::at(Position::new("/p/a.rs", 1, 2), "m")];
        let out = Reporter::new(Path::new("/p"))
            .color(true)
            .render_text(&diagnostics);
        assert_eq!(out, "\x1b[32m./a.rs:1:2\x1b[0m: m\n");
    }

    #[test]
    fn json_uses_relative_paths() {
        let mut buf = Vec::new();
        Reporter::new(Path::new("/p"))
            .format(ReportFormat::Json)
            .flush(&sample(), &mut buf)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["file"], "src/a.rs");
        assert_eq!(value[1]["line"], 12);
        assert!(value[2]["file"].is_null());
        assert_eq!(value[2]["message"], "matcher failed");
    }

    #[test]
    fn empty_writes_nothing() {
        let mut buf = Vec::new();
        Reporter::new(Path::new("/p")).flush(&[], &mut buf).unwrap();
        assert!(buf.is_empty());
    }
}
