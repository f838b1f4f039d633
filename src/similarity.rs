//! Pairwise near-duplicate detection over a workbook sheet.
//!
//! Every row is compared with every later row. Two rows are similar when at
//! least `threshold` fields hold exactly equal values. For each outer row `i`
//! the first similar partner emits row `i` as an anchor (every cell filled with
//! [`Fill::Anchor`]); each similar partner is then emitted below it with
//! [`Fill::Match`] on the cells that agree with the anchor. The two date
//! columns also count as agreeing when only their month and day agree.
//!
//! After each outer row a single blank delimiter row is appended unless the
//! previous appended row already was one. That flag spans outer rows, so runs
//! of rows without partners collapse into one delimiter and a table with no
//! similar pairs at all yields exactly one blank row.

use log::{debug, info};
use thiserror::Error;

use crate::{
    config::ScanConfig,
    data::Value,
    workbook::{Cell, Fill, Sheet, Workbook},
};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("workbook does not contain any sheets")]
    EmptyWorkbook,
    #[error("sheet '{0}' not found in workbook")]
    MissingSheet(String),
    #[error("column '{column}' not found in sheet '{sheet}'")]
    MissingColumn { sheet: String, column: String },
    #[error("sheet row {row} has {found} field(s) but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("sheet row {row}, column '{column}': '{value}' does not carry a hyphenated date")]
    MalformedDate {
        row: usize,
        column: String,
        value: String,
    },
}

/// Month and day tokens of a date-like field, year and time discarded.
/// `day` is absent for month-only values such as `"2024-05"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthDay {
    pub month: String,
    pub day: Option<String>,
}

/// Takes the first whitespace token and returns its second and third
/// hyphen-separated parts, e.g. `"2024-05-06 10:00:00"` gives `05` and `06`.
/// Fails only when that token has no hyphen at all.
pub fn extract_month_day(raw: &str) -> Option<MonthDay> {
    let date = raw.split_whitespace().next()?;
    let mut parts = date.split('-').skip(1);
    let month = parts.next()?;
    Some(MonthDay {
        month: month.to_string(),
        day: parts.next().map(str::to_string),
    })
}

/// Number of positions holding exactly equal values.
pub fn similarity_score(left: &[Value], right: &[Value]) -> usize {
    left.iter()
        .zip(right)
        .filter(|(a, b)| a.matches(b))
        .count()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    /// Zero-based data row index of the anchor.
    pub anchor: usize,
    /// Zero-based data row indices emitted below the anchor, in order.
    pub members: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    /// Name under which the similarity sheet was appended.
    pub sheet_name: String,
    /// Compared columns, i.e. the source header minus the excluded column.
    pub columns: Vec<String>,
    pub compared_rows: usize,
    pub groups: Vec<GroupSummary>,
    pub blank_rows: usize,
}

impl ScanSummary {
    pub fn grouped_rows(&self) -> usize {
        self.groups.iter().map(|group| 1 + group.members.len()).sum()
    }
}

#[derive(Debug)]
struct RowDates {
    inbound: MonthDay,
    boundary: MonthDay,
}

/// Source rows with the excluded column removed.
#[derive(Debug)]
struct ComparisonTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    inbound: usize,
    boundary: usize,
}

impl ComparisonTable {
    fn from_sheet(sheet: &Sheet, config: &ScanConfig) -> Result<Self, ScanError> {
        let missing = |column: &str| ScanError::MissingColumn {
            sheet: sheet.name.clone(),
            column: column.to_string(),
        };
        let headers = sheet.headers();
        let excluded = headers
            .iter()
            .position(|name| *name == config.exclude_column)
            .ok_or_else(|| missing(&config.exclude_column))?;

        let columns = headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != excluded)
            .map(|(_, name)| name.clone())
            .collect::<Vec<_>>();
        let inbound = columns
            .iter()
            .position(|name| *name == config.inbound_column)
            .ok_or_else(|| missing(&config.inbound_column))?;
        let boundary = columns
            .iter()
            .position(|name| *name == config.boundary_column)
            .ok_or_else(|| missing(&config.boundary_column))?;

        let mut rows = Vec::with_capacity(sheet.row_count().saturating_sub(1));
        for (idx, row) in sheet.rows.iter().enumerate().skip(1) {
            if row.len() != headers.len() {
                return Err(ScanError::RaggedRow {
                    row: idx + 1,
                    expected: headers.len(),
                    found: row.len(),
                });
            }
            let values = row
                .iter()
                .enumerate()
                .filter(|(col, _)| *col != excluded)
                .map(|(_, cell)| cell.value.clone())
                .collect();
            rows.push(values);
        }

        Ok(Self {
            columns,
            rows,
            inbound,
            boundary,
        })
    }

    fn month_day(&self, row: usize, col: usize) -> Result<MonthDay, ScanError> {
        let value = &self.rows[row][col];
        value
            .as_str()
            .and_then(extract_month_day)
            .ok_or_else(|| ScanError::MalformedDate {
                row: row + 2,
                column: self.columns[col].clone(),
                value: value.as_display(),
            })
    }

    /// Every row takes part in at least one pair once there are two rows, so
    /// any malformed date fails the scan up front.
    fn row_dates(&self) -> Result<Vec<RowDates>, ScanError> {
        if self.rows.len() < 2 {
            return Ok(Vec::new());
        }
        (0..self.rows.len())
            .map(|row| {
                Ok(RowDates {
                    inbound: self.month_day(row, self.inbound)?,
                    boundary: self.month_day(row, self.boundary)?,
                })
            })
            .collect()
    }

    fn highlight(&self, row: usize, dates: &RowDates, anchor: AnchorSnapshot<'_>) -> Vec<Cell> {
        self.rows[row]
            .iter()
            .enumerate()
            .map(|(col, value)| {
                let same_value = anchor
                    .values
                    .get(col)
                    .is_some_and(|main| main.matches(value));
                let same_inbound = col == self.inbound && dates.inbound == anchor.dates.inbound;
                let same_boundary =
                    col == self.boundary && dates.boundary == anchor.dates.boundary;
                let fill = if same_value || same_inbound || same_boundary {
                    Fill::Match
                } else {
                    Fill::None
                };
                Cell::with_fill(value.clone(), fill)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct AnchorSnapshot<'t> {
    values: &'t [Value],
    dates: &'t RowDates,
}

/// Grouping state for a single outer row; rebuilt for every `i`.
struct SimilarityGroup<'t> {
    index: usize,
    anchor: Option<AnchorSnapshot<'t>>,
    members: Vec<usize>,
}

impl<'t> SimilarityGroup<'t> {
    fn new(index: usize) -> Self {
        Self {
            index,
            anchor: None,
            members: Vec::new(),
        }
    }

    fn finish(self) -> Option<GroupSummary> {
        self.anchor.map(|_| GroupSummary {
            anchor: self.index,
            members: self.members,
        })
    }
}

/// Runs the pairwise comparison over `sheet` and returns the similarity sheet
/// without attaching it to any workbook.
pub fn find_similarities(
    sheet: &Sheet,
    config: &ScanConfig,
) -> Result<(Sheet, ScanSummary), ScanError> {
    let table = ComparisonTable::from_sheet(sheet, config)?;
    let dates = table.row_dates()?;
    let row_count = table.rows.len();

    let mut output = Sheet::new(config.output_sheet.clone());
    let mut groups = Vec::new();
    let mut blank_rows = 0usize;
    let mut last_row_was_blank = false;

    for i in 0..row_count {
        let mut group = SimilarityGroup::new(i);
        for j in (i + 1)..row_count {
            let score = similarity_score(&table.rows[i], &table.rows[j]);
            if score < config.threshold {
                continue;
            }
            let anchor = match group.anchor {
                Some(anchor) => anchor,
                None => {
                    let anchor = AnchorSnapshot {
                        values: &table.rows[i],
                        dates: &dates[i],
                    };
                    output.push_row(
                        anchor
                            .values
                            .iter()
                            .map(|value| Cell::with_fill(value.clone(), Fill::Anchor))
                            .collect(),
                    );
                    group.anchor = Some(anchor);
                    anchor
                }
            };
            output.push_row(table.highlight(j, &dates[j], anchor));
            group.members.push(j);
            last_row_was_blank = false;
        }

        if !last_row_was_blank {
            output.push_blank();
            blank_rows += 1;
            last_row_was_blank = true;
        }

        if let Some(summary) = group.finish() {
            debug!(
                "Row {} anchors {} similar row(s): {:?}",
                summary.anchor,
                summary.members.len(),
                summary.members
            );
            groups.push(summary);
        }
    }

    let summary = ScanSummary {
        sheet_name: output.name.clone(),
        columns: table.columns,
        compared_rows: row_count,
        groups,
        blank_rows,
    };
    Ok((output, summary))
}

/// Scans the configured source sheet (the first sheet by default) and appends
/// the similarity sheet to `workbook`. Nothing is appended on error.
pub fn scan(workbook: &mut Workbook, config: &ScanConfig) -> Result<ScanSummary, ScanError> {
    let source = match &config.sheet {
        Some(name) => workbook
            .sheet(name)
            .ok_or_else(|| ScanError::MissingSheet(name.clone()))?,
        None => workbook.first_sheet().ok_or(ScanError::EmptyWorkbook)?,
    };
    info!(
        "Scanning sheet '{}' for rows sharing at least {} field(s), excluding '{}'",
        source.name, config.threshold, config.exclude_column
    );
    let (sheet, mut summary) = find_similarities(source, config)?;
    summary.sheet_name = workbook.push_sheet(sheet).name.clone();
    info!(
        "Compared {} row(s): {} group(s), {} grouped row(s) written to '{}'",
        summary.compared_rows,
        summary.groups.len(),
        summary.grouped_rows(),
        summary.sheet_name
    );
    Ok(summary)
}
