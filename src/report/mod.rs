//! Comparison report output.
//!
//! Scenarios receive a [`ReportSink`] explicitly instead of writing to any
//! process-global state; the sink decides what to do with attached tables.

use anyhow::Result;
use std::path::Path;

/// Receiver for tabular findings produced by scenarios.
pub trait ReportSink: Send {
    /// Attach a titled table. `rows` are stringified cells, one Vec per row.
    fn attach_table(&mut self, title: &str, headers: &[&str], rows: &[Vec<String>]);
}

/// Sink that discards everything.
pub struct NullSink;

impl ReportSink for NullSink {
    fn attach_table(&mut self, _title: &str, _headers: &[&str], _rows: &[Vec<String>]) {}
}

/// Accumulates tables and renders a standalone HTML document.
#[derive(Default)]
pub struct HtmlReport {
    sections: Vec<String>,
}

impl HtmlReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn render(&self) -> String {
        let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut html = String::from(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>Weather comparison report</title>\n</head>\n<body>\n",
        );
        for section in &self.sections {
            html.push_str(section);
            html.push('\n');
        }
        html.push_str(&format!("<p>Generated at {generated_at}</p>\n"));
        html.push_str("</body>\n</html>\n");
        html
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render())?;
        log::info!("HTML report saved to {}", path.display());
        Ok(())
    }
}

impl ReportSink for HtmlReport {
    fn attach_table(&mut self, title: &str, headers: &[&str], rows: &[Vec<String>]) {
        let mut html = format!(
            "<h3>{}</h3><table border='1' style='border-collapse:collapse;'>",
            html_escape(title)
        );

        html.push_str("<tr>");
        for header in headers {
            html.push_str(&format!("<th>{}</th>", html_escape(header)));
        }
        html.push_str("</tr>");

        for row in rows {
            html.push_str("<tr>");
            for cell in row {
                html.push_str(&format!("<td>{}</td>", html_escape(cell)));
            }
            html.push_str("</tr>");
        }
        html.push_str("</table>");

        self.sections.push(html);
    }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
