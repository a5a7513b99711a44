//! Table and JSON rendering.

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// How results are printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Box-drawn tables
    Table,
    /// Pretty-printed JSON
    Json,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// A titled two-or-more column table of text cells.
pub struct Report {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Report {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) -> &mut Self {
        self.rows.push(cells);
        self
    }

    /// Label and a number formatted to two decimals.
    pub fn amount(&mut self, label: impl Into<String>, value: f64) -> &mut Self {
        self.row(vec![label.into(), format!("{:.2}", value)])
    }

    pub fn render(&self) -> String {
        let n = self.headers.len();
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (j, cell) in row.iter().enumerate().take(n) {
                widths[j] = widths[j].max(cell.chars().count());
            }
        }

        let rule = |left: &str, mid: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("{}{}{}", left, segments.join(mid), right)
        };
        let line = |cells: &[String]| {
            let padded: Vec<String> = (0..n)
                .map(|j| {
                    let cell = cells.get(j).map(String::as_str).unwrap_or("");
                    if j == 0 {
                        format!(" {:<width$} ", cell, width = widths[j])
                    } else {
                        format!(" {:>width$} ", cell, width = widths[j])
                    }
                })
                .collect();
            format!("│{}│", padded.join("│"))
        };

        let mut out = vec![rule("┌", "┬", "┐"), line(&self.headers), rule("├", "┼", "┤")];
        if self.rows.is_empty() {
            out.push(line(&["(no data)".to_string()]));
        }
        out.extend(self.rows.iter().map(|r| line(r)));
        out.push(rule("└", "┴", "┘"));
        out.join("\n")
    }

    pub fn print(&self) {
        println!("{}", self.render());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_aligns_columns() {
        let mut report = Report::new(&["Measure", "Value"]);
        report.amount("VaR", -1234.5).amount("ES", -2000.0);
        let text = report.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "│ Measure │    Value │");
        assert_eq!(lines[3], "│ VaR     │ -1234.50 │");
        assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
    }

    #[test]
    fn test_empty_report() {
        let text = Report::new(&["Scenario", "P&L"]).render();
        assert!(text.contains("(no data)"));
    }
}
