// Entry point and high-level CLI flow.
//
// The binary replaces the stack of one-off dashboard revisions with a
// single parameterized run:
// - Option [1] loads the meeting minutes and settlement data, printing
//   load diagnostics.
// - Option [2] picks the reporting sheet, runs the reconciliation
//   pipeline, and writes the report CSVs plus a JSON summary.
// - After generating reports, the user can go back to the menu or exit.
mod achievement;
mod aggregate;
mod classify;
mod config;
mod loader;
mod output;
mod reconcile;
mod reports;
mod resolve;
mod types;
mod util;

use std::io::{self, Write};
use std::sync::Mutex;

use once_cell::sync::Lazy;

use config::ReportConfig;
use types::Workbook;

const CONFIG_PATH: &str = "report_config.toml";

// In-memory app state so the files are loaded once but reports can be
// generated multiple times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        config: ReportConfig::default(),
        data: None,
    })
});

struct AppState {
    config: ReportConfig,
    data: Option<LoadedData>,
}

struct LoadedData {
    meeting: Workbook,
    sales: Option<Workbook>,
}

/// Read a single line of input after printing the common prompt. Reused
/// for the main menu and the sheet-selection fallback.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask whether to go back to the report menu after generating reports.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: read the config and load the source workbooks.
fn handle_load() {
    let config = match ReportConfig::load_or_default(CONFIG_PATH) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid config '{}': {}\n", CONFIG_PATH, e);
            return;
        }
    };

    let (meeting, meeting_report) = match loader::load_workbook(&config.inputs.meeting_sheets) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load meeting minutes: {}\n", e);
            return;
        }
    };
    println!(
        "Meeting minutes loaded: {} sheet(s), {} rows ({} date cells, {} numeric cells).",
        meeting_report.sheets,
        util::format_int(meeting_report.total_rows as i64),
        util::format_int(meeting_report.date_cells as i64),
        util::format_int(meeting_report.number_cells as i64)
    );
    if meeting_report.missing_files > 0 {
        println!(
            "Note: {} configured sheet file(s) were not found and were skipped.",
            meeting_report.missing_files
        );
    }

    // Settlement data is optional; without it only the settlement reports
    // are skipped.
    let sales = match loader::load_workbook(&config.inputs.sales_sheets) {
        Ok((workbook, report)) => {
            println!(
                "Sales data loaded: {} sheet(s), {} rows.",
                report.sheets,
                util::format_int(report.total_rows as i64)
            );
            Some(workbook)
        }
        Err(e) => {
            println!("Note: sales data unavailable ({}).", e);
            None
        }
    };
    println!();

    let mut state = APP_STATE.lock().unwrap();
    state.config = config;
    state.data = Some(LoadedData { meeting, sales });
}

/// Pick the reporting sheet: automatic month-token selection first, an
/// explicit user choice when no sheet name matches.
fn choose_sheet(workbook: &Workbook, config: &ReportConfig) -> Option<(usize, u32)> {
    let names = workbook.sheet_names();
    let selection = resolve::select_sheet(
        &names,
        config.period.primary_month,
        config.period.secondary_month,
    );
    if let (Some(index), Some(month)) = (selection.index, selection.month) {
        println!("Using sheet '{}' for month {}.\n", names[index], month);
        return Some((index, month));
    }

    println!(
        "No sheet name matches month {} or {}. Available sheets:",
        config.period.primary_month, config.period.secondary_month
    );
    for (i, name) in names.iter().enumerate() {
        println!("[{}] {}", i + 1, name);
    }
    match read_choice().parse::<usize>() {
        Ok(n) if (1..=names.len()).contains(&n) => {
            Some((n - 1, config.period.primary_month))
        }
        _ => {
            println!("Invalid sheet choice.\n");
            None
        }
    }
}

/// Handle option [2]: run the pipeline and export every report.
fn handle_generate_reports() {
    let (config, meeting_sheet, sales_sheet, report_month) = {
        let state = APP_STATE.lock().unwrap();
        let Some(data) = state.data.as_ref() else {
            println!("Error: No data loaded. Please load the files first (option 1).\n");
            return;
        };
        let Some((index, month)) = choose_sheet(&data.meeting, &state.config) else {
            return;
        };
        let sales_sheet = data
            .sales
            .as_ref()
            .and_then(|wb| wb.sheets.first())
            .cloned();
        (
            state.config.clone(),
            data.meeting.sheets[index].clone(),
            sales_sheet,
            month,
        )
    };

    println!("Generating reports for month {}...", report_month);
    println!("Outputs saved to individual files...\n");

    let bundle = reports::build_reports(
        &meeting_sheet,
        sales_sheet.as_ref(),
        report_month,
        &config,
    );
    output::print_notices(&bundle.notices);

    let exports: &[(&str, &str)] = &[
        ("monthly_revenue.csv", "월별 매출총이익 추이"),
        ("goal_achievement.csv", "목표 달성 현황"),
        ("weekly_breakdown.csv", "주차별 현황"),
        ("daily_breakdown.csv", "일별 현황"),
        ("category_stats.csv", "분류별 상세 통계"),
        ("consultation_summary.csv", "업체별 상담내역 담당자"),
        ("settlement_monthly.csv", "월별 정산금액 추이"),
        ("manufacturer_settlement.csv", "업체별 정산금액"),
        ("product_sales.csv", "상품별 판매 수량"),
    ];

    let results = [
        output::write_csv(exports[0].0, &bundle.monthly),
        output::write_csv(exports[1].0, &bundle.achievement),
        output::write_csv(exports[2].0, &bundle.weekly),
        output::write_csv(exports[3].0, &bundle.daily),
        output::write_csv(exports[4].0, &bundle.categories),
        output::write_csv(exports[5].0, &bundle.consultations),
        output::write_csv(exports[6].0, &bundle.settlement_monthly),
        output::write_csv(exports[7].0, &bundle.manufacturers),
        output::write_csv(exports[8].0, &bundle.products),
    ];
    for (result, (file, _)) in results.iter().zip(exports) {
        if let Err(e) = result {
            eprintln!("Write error ({}): {}", file, e);
        }
    }

    output::preview_report(1, exports[0].1, &bundle.monthly, 12, exports[0].0);
    output::preview_report(2, exports[1].1, &bundle.achievement, 3, exports[1].0);
    output::preview_report(3, exports[2].1, &bundle.weekly, 5, exports[2].0);
    output::preview_report(4, exports[3].1, &bundle.daily, 5, exports[3].0);
    output::preview_report(5, exports[4].1, &bundle.categories, 10, exports[4].0);
    output::preview_report(6, exports[5].1, &bundle.consultations, 10, exports[5].0);
    output::preview_report(7, exports[6].1, &bundle.settlement_monthly, 12, exports[6].0);
    output::preview_report(8, exports[7].1, &bundle.manufacturers, 10, exports[7].0);
    output::preview_report(9, exports[8].1, &bundle.products, 10, exports[8].0);

    if let Some(summary) = &bundle.summary {
        if let Err(e) = output::write_json("summary.json", summary) {
            eprintln!("Write error (summary.json): {}", e);
        }
        println!("Summary Stats (summary.json):");
        match serde_json::to_string(summary) {
            Ok(s) => println!("{}\n", s),
            Err(e) => eprintln!("Summary encode error: {}\n", e),
        }
    }
}

fn main() {
    loop {
        println!("Select an action:");
        println!("[1] Load the files");
        println!("[2] Generate Reports\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!();
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
