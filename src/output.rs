use std::error::Error;

use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Print a numbered report header, a markdown preview of the first rows,
/// and where the full table was exported.
pub fn preview_report<T>(report_no: usize, title: &str, rows: &[T], max_rows: usize, file: &str)
where
    T: Tabled + Clone,
{
    println!("Report {}: {}\n", report_no, title);
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}", table_str);
    if rows.len() > max_rows {
        println!("(showing {} of {} rows)", max_rows, rows.len());
    }
    println!("(Full table exported to {})\n", file);
}

/// Degraded-capability notices are printed distinctly from hard errors.
pub fn print_notices(notices: &[String]) {
    for notice in notices {
        println!("Notice: {}", notice);
    }
    if !notices.is_empty() {
        println!();
    }
}
