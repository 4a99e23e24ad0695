//! Final render step: localized month labels, fixed decimals, captions.

use chrono::NaiveDate;
use dk_schemas::{NormalizedRow, Version};
use serde::Serialize;

use crate::matrix::{Axis, DiffMatrix};

pub const MONTH_LABELS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];
pub const MEAN_LABEL: &str = "média";

/// Which snapshot an operand is, carried next to the matrix for the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotCaption {
    pub deck_date: NaiveDate,
    pub version: Version,
}

impl SnapshotCaption {
    pub fn new(deck_date: NaiveDate, version: Version) -> Self {
        Self { deck_date, version }
    }

    /// Tags of the newest deck date in `rows`.
    pub fn from_rows(rows: &[NormalizedRow]) -> Option<Self> {
        rows.iter()
            .max_by_key(|r| (r.deck_date, r.version))
            .map(|r| Self::new(r.deck_date, r.version))
    }

    /// Whether `row` belongs to the snapshot this caption names.
    pub fn matches(&self, row: &NormalizedRow) -> bool {
        row.deck_date == self.deck_date && row.version == self.version
    }
}

/// A rendered report: header row, body rows of strings, and caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedTable {
    pub caption: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RenderedTable {
    /// Pipe-delimited text with the caption on the first line.
    pub fn to_pipe_table(&self) -> String {
        let mut widths: Vec<usize> = self.header.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let line = |cells: &[String]| -> String {
            let padded: Vec<String> = cells
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{c:>w$}", w = widths[i]))
                .collect();
            format!("| {} |", padded.join(" | "))
        };

        let mut out = String::new();
        out.push_str(&self.caption);
        out.push('\n');
        out.push_str(&line(&self.header));
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&format!("|-{}-|", rule.join("-|-")));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&line(row));
            out.push('\n');
        }
        out
    }
}

/// A diff ready to render, with its operands' captions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffReport {
    pub metric: String,
    pub current: SnapshotCaption,
    pub prior: SnapshotCaption,
    pub matrix: DiffMatrix,
}

impl DiffReport {
    pub fn caption(&self) -> String {
        let scope = match self.matrix.axis {
            Axis::Submarket { year } => format!("{year}"),
            Axis::Year { submarket: Some(sm) } => format!("{sm}"),
            Axis::Year { submarket: None } => "SIN".to_string(),
        };
        format!(
            "{} {}: {} {} x {} {}",
            self.metric,
            scope,
            self.current.version,
            self.current.deck_date.format("%d/%m/%Y"),
            self.prior.version,
            self.prior.deck_date.format("%d/%m/%Y"),
        )
    }

    /// Render with `decimals` fixed places. Undefined cells are blank.
    pub fn render(&self, decimals: usize) -> RenderedTable {
        let identity = match self.matrix.axis {
            Axis::Submarket { .. } => "submercado",
            Axis::Year { .. } => "ano",
        };
        let mut header = Vec::with_capacity(14);
        header.push(identity.to_string());
        header.extend(MONTH_LABELS.iter().map(|m| m.to_string()));
        header.push(MEAN_LABEL.to_string());

        let fmt = |v: Option<f64>| match v {
            Some(v) => format!("{v:.decimals$}"),
            None => String::new(),
        };

        let rows = self
            .matrix
            .rows
            .iter()
            .map(|r| {
                let mut cells = Vec::with_capacity(14);
                cells.push(r.label.to_string());
                cells.extend(r.months.iter().map(|v| fmt(*v)));
                cells.push(fmt(r.mean));
                cells
            })
            .collect();

        RenderedTable {
            caption: self.caption(),
            header,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{DiffRow, RowLabel};
    use dk_schemas::SubmarketCode;

    fn report() -> DiffReport {
        let mut months = [None; 12];
        months[0] = Some(1.256);
        months[2] = Some(-3.0);
        DiffReport {
            metric: "vl_geracao_eol".to_string(),
            current: SnapshotCaption::new(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(), Version::Definitivo),
            prior: SnapshotCaption::new(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(), Version::Definitivo),
            matrix: DiffMatrix {
                axis: Axis::Submarket { year: 2025 },
                rows: vec![DiffRow {
                    label: RowLabel::Submarket(SubmarketCode::Ne),
                    months,
                    mean: Some(-0.872),
                }],
            },
        }
    }

    #[test]
    fn labels_applied_only_at_render() {
        let t = report().render(1);
        assert_eq!(t.header[0], "submercado");
        assert_eq!(t.header[1], "jan");
        assert_eq!(t.header[12], "dez");
        assert_eq!(t.header[13], "média");
        assert_eq!(t.rows[0][0], "NE");
        assert_eq!(t.rows[0][1], "1.3");
        assert_eq!(t.rows[0][2], "");
        assert_eq!(t.rows[0][3], "-3.0");
        assert_eq!(t.rows[0][13], "-0.9");
    }

    #[test]
    fn caption_names_both_operands() {
        let c = report().caption();
        assert!(c.contains("01/06/2025"));
        assert!(c.contains("01/05/2025"));
        assert!(c.starts_with("vl_geracao_eol 2025"));
    }

    #[test]
    fn pipe_table_has_caption_header_rule_and_rows() {
        let text = report().render(0).to_pipe_table();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("média"));
        assert!(lines[2].starts_with("|-"));
        assert!(lines[3].contains("NE"));
    }
}
