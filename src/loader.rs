use std::error::Error;
use std::io::Read;

use csv::ReaderBuilder;

use crate::config::SheetSource;
use crate::types::{Cell, Sheet, Workbook};
use crate::util::{parse_date_multi, parse_f64_safe};

/// What happened while assembling a workbook from its sheet files.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub sheets: usize,
    pub total_rows: usize,
    pub missing_files: usize,
    pub number_cells: usize,
    pub date_cells: usize,
}

/// Sniff a cell's type from its CSV text. Dates are tried before numbers;
/// anything else stays text so no information is lost before role
/// resolution runs.
fn sniff_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    if let Some(d) = parse_date_multi(trimmed) {
        return Cell::Date(d);
    }
    if let Some(n) = parse_f64_safe(Some(trimmed)) {
        return Cell::Number(n);
    }
    Cell::Text(trimmed.to_string())
}

/// Read one sheet from CSV. Ragged rows are normalized to the header
/// width: short rows are padded with empty cells, long rows truncated.
pub fn read_sheet<R: Read>(name: &str, reader: R) -> Result<(Sheet, LoadReport), Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut report = LoadReport {
        sheets: 1,
        ..LoadReport::default()
    };
    let mut rows: Vec<Vec<Cell>> = Vec::new();

    for record in rdr.records() {
        let record = record?;
        let mut row: Vec<Cell> = Vec::with_capacity(headers.len());
        for i in 0..headers.len() {
            let cell = sniff_cell(record.get(i).unwrap_or(""));
            match cell {
                Cell::Number(_) => report.number_cells += 1,
                Cell::Date(_) => report.date_cells += 1,
                _ => {}
            }
            row.push(cell);
        }
        rows.push(row);
    }

    report.total_rows = rows.len();
    Ok((
        Sheet {
            name: name.to_string(),
            headers,
            rows,
        },
        report,
    ))
}

/// Load a workbook from the configured sheet files. A missing file skips
/// its sheet (counted in the report); the load only fails outright when
/// no sheet could be read at all, or when a present file is unreadable.
pub fn load_workbook(sources: &[SheetSource]) -> Result<(Workbook, LoadReport), Box<dyn Error>> {
    let mut workbook = Workbook::default();
    let mut report = LoadReport::default();

    for source in sources {
        let file = match std::fs::File::open(&source.file) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                report.missing_files += 1;
                continue;
            }
            Err(e) => return Err(format!("cannot open '{}': {}", source.file, e).into()),
        };
        let (sheet, sheet_report) = read_sheet(&source.name, file)?;
        report.sheets += 1;
        report.total_rows += sheet_report.total_rows;
        report.number_cells += sheet_report.number_cells;
        report.date_cells += sheet_report.date_cells;
        workbook.sheets.push(sheet);
    }

    if workbook.sheets.is_empty() {
        return Err(format!(
            "none of the {} configured sheet files could be read",
            sources.len()
        )
        .into());
    }
    Ok((workbook, report))
}
