// Report assembly: runs the pipeline stages over the loaded sheets and
// shapes their output into the display tables the presentation layer
// renders and exports.
//
// A stage whose required column roles are unresolved is skipped and a
// degraded-capability notice is collected instead; one missing role never
// blocks the unrelated reports.
use std::collections::BTreeMap;

use chrono::Datelike;

use crate::achievement::{self, PartSource};
use crate::aggregate::{monthly_series, MonthlySeries};
use crate::classify::derive_parts;
use crate::config::ReportConfig;
use crate::reconcile::apply_overrides;
use crate::resolve::resolve_roles;
use crate::types::{
    AchievementResult, AchievementRow, CategoryStatsRow, Cell, ColumnRole,
    ConsultationSummaryRow, DailyBreakdownRow, ManufacturerSettlementRow, MonthHighlight,
    MonthlyBucket, MonthlySeriesRow, ProductSalesRow, RoleBindings, Sheet, SummaryStats,
    WeeklyBreakdownRow,
};
use crate::util::{format_number, week_label};

/// Roles the weekly meeting minutes are resolved against, in priority
/// order.
const MEETING_ROLES: &[ColumnRole] = &[
    ColumnRole::Date,
    ColumnRole::Amount,
    ColumnRole::Payment,
    ColumnRole::Manager,
    ColumnRole::Part,
    ColumnRole::Quantity,
    ColumnRole::SalesBase,
    ColumnRole::Company,
    ColumnRole::Consultation,
];

/// Roles the settlement sales data is resolved against.
const SALES_ROLES: &[ColumnRole] = &[
    ColumnRole::Date,
    ColumnRole::Manufacturer,
    ColumnRole::Payment,
    ColumnRole::ProductCode,
    ColumnRole::ProductName,
    ColumnRole::Quantity,
    ColumnRole::Company,
];

/// Everything one pipeline invocation hands to the presentation layer.
#[derive(Debug, Default)]
pub struct ReportBundle {
    pub report_month: u32,
    pub monthly: Vec<MonthlySeriesRow>,
    pub achievement: Vec<AchievementRow>,
    pub weekly: Vec<WeeklyBreakdownRow>,
    pub daily: Vec<DailyBreakdownRow>,
    pub categories: Vec<CategoryStatsRow>,
    pub consultations: Vec<ConsultationSummaryRow>,
    pub settlement_monthly: Vec<MonthlySeriesRow>,
    pub manufacturers: Vec<ManufacturerSettlementRow>,
    pub products: Vec<ProductSalesRow>,
    pub summary: Option<SummaryStats>,
    pub notices: Vec<String>,
}

/// Run the full pipeline: resolve roles, derive parts, aggregate, apply
/// the audited overrides, and shape every report table.
pub fn build_reports(
    meeting: &Sheet,
    sales: Option<&Sheet>,
    report_month: u32,
    config: &ReportConfig,
) -> ReportBundle {
    let mut bundle = ReportBundle {
        report_month,
        ..ReportBundle::default()
    };

    let bindings = resolve_roles(meeting, MEETING_ROLES, config);
    push_unresolved(&mut bundle.notices, &meeting.name, &bindings);

    // The achievement and per-day views run over the selected month only;
    // the monthly series always sees the whole sheet. If no row carries
    // the selected month, the full sheet is used and flagged.
    let month_sheet = filter_to_month(meeting, bindings.get(ColumnRole::Date), report_month)
        .unwrap_or_else(|| {
            if bindings.is_bound(ColumnRole::Date) {
                bundle.notices.push(format!(
                    "'{}': no rows dated in month {}; using the whole sheet",
                    meeting.name, report_month
                ));
            }
            meeting.clone()
        });

    // Monthly revenue series with reconciliation.
    let mut reconciled: Vec<MonthlyBucket> = Vec::new();
    let mut diagnostics = MonthlySeries::default();
    match (bindings.get(ColumnRole::Date), bindings.get(ColumnRole::Amount)) {
        (Some(date_col), Some(amount_col)) => {
            let series = monthly_series(
                meeting,
                date_col,
                amount_col,
                bindings.get(ColumnRole::Payment),
                &config.period.excluded_months,
            );
            reconciled = apply_overrides(series.buckets.clone(), &config.overrides);
            diagnostics = series;
            bundle.monthly = monthly_rows(&reconciled);
        }
        _ => bundle.notices.push(format!(
            "'{}': monthly revenue series skipped (date/amount column unresolved)",
            meeting.name
        )),
    }

    // Goal achievement over the selected month.
    if let Some(amount_col) = bindings.get(ColumnRole::Amount) {
        let labels = bindings
            .get(ColumnRole::Manager)
            .map(|col| derive_parts(&month_sheet, col, &config.part.distinguished_manager));
        let part_source = match (&labels, bindings.get(ColumnRole::Part)) {
            (Some(labels), _) => Some(PartSource::Derived(labels.as_slice())),
            (None, Some(col)) => Some(PartSource::Column(col)),
            (None, None) => {
                bundle.notices.push(format!(
                    "'{}': no part column; splitting the total by the configured ratio",
                    meeting.name
                ));
                None
            }
        };
        let targets = config.targets.for_month(report_month);
        let results = achievement::compute(
            &month_sheet,
            amount_col,
            part_source,
            &targets,
            config.part.part1_ratio_pct,
        );
        bundle.achievement = achievement_rows(&results);
    } else {
        bundle.notices.push(format!(
            "'{}': goal achievement skipped (amount column unresolved)",
            meeting.name
        ));
    }

    // Weekly / daily trends for the selected month.
    if let Some(date_col) = bindings.get(ColumnRole::Date) {
        let amount_col = bindings.get(ColumnRole::Amount);
        bundle.weekly = weekly_breakdown(&month_sheet, date_col, amount_col, report_month);
        bundle.daily = daily_breakdown(&month_sheet, date_col, amount_col);
    } else {
        bundle.notices.push(format!(
            "'{}': weekly/daily trends skipped (no date column)",
            meeting.name
        ));
    }

    bundle.categories = category_stats(&month_sheet, &bindings);

    match (bindings.get(ColumnRole::Company), bindings.get(ColumnRole::Manager)) {
        (Some(company_col), Some(manager_col)) => {
            bundle.consultations = consultation_summary(meeting, company_col, manager_col);
        }
        _ => bundle.notices.push(format!(
            "'{}': consultation summary skipped (company/manager column unresolved)",
            meeting.name
        )),
    }

    // Settlement sales data.
    let mut sales_unresolved: Vec<String> = Vec::new();
    if let Some(sales_sheet) = sales {
        let sb = resolve_roles(sales_sheet, SALES_ROLES, config);
        push_unresolved(&mut bundle.notices, &sales_sheet.name, &sb);
        sales_unresolved = sb
            .unresolved
            .iter()
            .map(|r| format!("{}:{}", sales_sheet.name, r))
            .collect();

        match (sb.get(ColumnRole::Date), sb.get(ColumnRole::Payment)) {
            (Some(date_col), Some(payment_col)) => {
                let series = monthly_series(
                    sales_sheet,
                    date_col,
                    payment_col,
                    None,
                    &config.period.excluded_months,
                );
                let buckets = apply_overrides(series.buckets, &config.overrides);
                bundle.settlement_monthly = monthly_rows(&buckets);
            }
            _ => bundle.notices.push(format!(
                "'{}': settlement series skipped (date/payment column unresolved)",
                sales_sheet.name
            )),
        }

        match (sb.get(ColumnRole::Manufacturer), sb.get(ColumnRole::Payment)) {
            (Some(maker_col), Some(payment_col)) => {
                bundle.manufacturers =
                    manufacturer_settlement(sales_sheet, maker_col, payment_col);
            }
            _ => bundle.notices.push(format!(
                "'{}': manufacturer settlement skipped (manufacturer/payment unresolved)",
                sales_sheet.name
            )),
        }

        match (sb.get(ColumnRole::ProductCode), sb.get(ColumnRole::Quantity)) {
            (Some(product_col), Some(quantity_col)) => {
                let maker_col = sb
                    .get(ColumnRole::Company)
                    .or_else(|| sb.get(ColumnRole::Manufacturer));
                bundle.products = product_ranking(
                    sales_sheet,
                    product_col,
                    sb.get(ColumnRole::ProductName),
                    maker_col,
                    quantity_col,
                );
            }
            _ => bundle.notices.push(format!(
                "'{}': product ranking skipped (product/quantity column unresolved)",
                sales_sheet.name
            )),
        }
    } else {
        bundle
            .notices
            .push("sales data not loaded; settlement reports skipped".into());
    }

    let mut unresolved: Vec<String> = bindings
        .unresolved
        .iter()
        .map(|r| format!("{}:{}", meeting.name, r))
        .collect();
    unresolved.extend(sales_unresolved);
    bundle.summary = Some(summarize(
        &reconciled,
        report_month,
        meeting.rows.len(),
        &diagnostics,
        unresolved,
    ));

    bundle
}

fn push_unresolved(notices: &mut Vec<String>, sheet_name: &str, bindings: &RoleBindings) {
    for role in &bindings.unresolved {
        notices.push(format!(
            "'{}': column role '{}' unresolved",
            sheet_name, role
        ));
    }
}

/// Rows of `sheet` whose date cell falls in `month`. `None` when the date
/// role is unbound or nothing matches.
fn filter_to_month(sheet: &Sheet, date_col: Option<usize>, month: u32) -> Option<Sheet> {
    let date_col = date_col?;
    let rows: Vec<Vec<Cell>> = sheet
        .rows
        .iter()
        .filter(|row| {
            row.get(date_col)
                .and_then(|c| c.as_date())
                .map(|d| d.month() == month)
                .unwrap_or(false)
        })
        .cloned()
        .collect();
    if rows.is_empty() {
        return None;
    }
    Some(Sheet {
        name: sheet.name.clone(),
        headers: sheet.headers.clone(),
        rows,
    })
}

// ---------------------------------------------------------------------------
// Table shaping
// ---------------------------------------------------------------------------

pub fn monthly_rows(buckets: &[MonthlyBucket]) -> Vec<MonthlySeriesRow> {
    buckets
        .iter()
        .map(|b| MonthlySeriesRow {
            period: b.period.to_string(),
            amount_total: format_number(b.amount_total, 0),
            payment_total: format_number(b.payment_total, 0),
            rows: b.rows,
            growth: match b.growth_pct {
                Some(g) => format!("{:.2}%", g),
                None => "-".to_string(),
            },
            source: b.provenance.to_string(),
        })
        .collect()
}

pub fn achievement_rows(results: &[AchievementResult]) -> Vec<AchievementRow> {
    results
        .iter()
        .map(|r| AchievementRow {
            part: r.label.clone(),
            target: format_number(r.target, 0),
            achieved: format_number(r.achieved, 0),
            rows: r.rows,
            rate: format!("{:.1}%", r.rate_pct),
            delta: format_number(r.delta, 0),
        })
        .collect()
}

pub fn weekly_breakdown(
    sheet: &Sheet,
    date_col: usize,
    amount_col: Option<usize>,
    month: u32,
) -> Vec<WeeklyBreakdownRow> {
    let mut groups: BTreeMap<u32, (usize, f64)> = BTreeMap::new();
    for row in &sheet.rows {
        let date = match row.get(date_col).and_then(|c| c.as_date()) {
            Some(d) => d,
            None => continue,
        };
        let entry = groups.entry(date.iso_week().week()).or_insert((0, 0.0));
        entry.0 += 1;
        if let Some(ac) = amount_col {
            if let Some(v) = row.get(ac).and_then(|c| c.as_number()) {
                entry.1 += v;
            }
        }
    }
    let min_week = groups.keys().next().copied().unwrap_or(0);
    groups
        .into_iter()
        .map(|(week, (rows, amount))| WeeklyBreakdownRow {
            week: week_label(month, week as i64 - min_week as i64, week),
            rows,
            amount_total: format_number(amount, 0),
        })
        .collect()
}

pub fn daily_breakdown(
    sheet: &Sheet,
    date_col: usize,
    amount_col: Option<usize>,
) -> Vec<DailyBreakdownRow> {
    let mut groups: BTreeMap<u32, (usize, f64)> = BTreeMap::new();
    for row in &sheet.rows {
        let date = match row.get(date_col).and_then(|c| c.as_date()) {
            Some(d) => d,
            None => continue,
        };
        let entry = groups.entry(date.day()).or_insert((0, 0.0));
        entry.0 += 1;
        if let Some(ac) = amount_col {
            if let Some(v) = row.get(ac).and_then(|c| c.as_number()) {
                entry.1 += v;
            }
        }
    }
    groups
        .into_iter()
        .map(|(day, (rows, amount))| DailyBreakdownRow {
            day,
            rows,
            amount_total: format_number(amount, 0),
        })
        .collect()
}

pub fn manufacturer_settlement(
    sheet: &Sheet,
    maker_col: usize,
    payment_col: usize,
) -> Vec<ManufacturerSettlementRow> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for row in &sheet.rows {
        let maker = row.get(maker_col).map(|c| c.display()).unwrap_or_default();
        let maker = maker.trim();
        if maker.is_empty() {
            continue;
        }
        if let Some(v) = row.get(payment_col).and_then(|c| c.as_number()) {
            *totals.entry(maker.to_string()).or_insert(0.0) += v;
        }
    }
    let mut rows: Vec<(String, f64)> = totals.into_iter().collect();
    rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    rows.into_iter()
        .map(|(maker, total)| ManufacturerSettlementRow {
            manufacturer: maker,
            payment_total: format_number(total, 0),
        })
        .collect()
}

pub fn product_ranking(
    sheet: &Sheet,
    product_col: usize,
    name_col: Option<usize>,
    maker_col: Option<usize>,
    quantity_col: usize,
) -> Vec<ProductSalesRow> {
    #[derive(Default)]
    struct Acc {
        quantity: f64,
        name: Option<String>,
        makers: Vec<String>,
    }

    let mut accs: BTreeMap<String, Acc> = BTreeMap::new();
    for row in &sheet.rows {
        let code = row.get(product_col).map(|c| c.display()).unwrap_or_default();
        let code = code.trim();
        if code.is_empty() {
            continue;
        }
        let acc = accs.entry(code.to_string()).or_default();
        if let Some(q) = row.get(quantity_col).and_then(|c| c.as_number()) {
            acc.quantity += q;
        }
        if acc.name.is_none() {
            if let Some(nc) = name_col {
                let name = row.get(nc).map(|c| c.display()).unwrap_or_default();
                if !name.trim().is_empty() {
                    acc.name = Some(name.trim().to_string());
                }
            }
        }
        if let Some(mc) = maker_col {
            let maker = row.get(mc).map(|c| c.display()).unwrap_or_default();
            if !maker.trim().is_empty() {
                acc.makers.push(maker.trim().to_string());
            }
        }
    }

    let mut entries: Vec<(String, Acc)> = accs.into_iter().collect();
    entries.sort_by(|a, b| {
        b.1.quantity
            .partial_cmp(&a.1.quantity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    entries
        .into_iter()
        .enumerate()
        .map(|(i, (code, acc))| ProductSalesRow {
            rank: i + 1,
            manufacturer: most_frequent(&acc.makers).unwrap_or_else(|| "미확인".to_string()),
            product: acc.name.unwrap_or(code),
            total_quantity: format_number(acc.quantity, 0),
        })
        .collect()
}

/// Most frequently seen value; ties break toward the first seen.
fn most_frequent(values: &[String]) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v.as_str()).or_insert(0) += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for v in values {
        let count = counts[v.as_str()];
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((v.as_str(), count)),
        }
    }
    best.map(|(v, _)| v.to_string())
}

/// Per-category sums over the first plausible category column: a text
/// column, not already bound to a role, with between 2 and 50 distinct
/// values.
pub fn category_stats(sheet: &Sheet, bindings: &RoleBindings) -> Vec<CategoryStatsRow> {
    let taken: Vec<usize> = bindings.bound.values().copied().collect();
    let category_col = (0..sheet.headers.len()).find(|col| {
        if taken.contains(col) {
            return false;
        }
        let mut distinct: Vec<String> = Vec::new();
        let mut text_cells = 0usize;
        let mut non_empty = 0usize;
        for row in &sheet.rows {
            let cell = row.get(*col).unwrap_or(&Cell::Empty);
            if cell.is_empty() {
                continue;
            }
            non_empty += 1;
            if matches!(cell, Cell::Text(_)) {
                text_cells += 1;
            }
            let value = cell.display();
            if !distinct.contains(&value) {
                distinct.push(value);
            }
            if distinct.len() > 50 {
                return false;
            }
        }
        non_empty > 0 && text_cells * 2 > non_empty && distinct.len() >= 2
    });
    let category_col = match category_col {
        Some(c) => c,
        None => return Vec::new(),
    };

    let quantity_col = bindings.get(ColumnRole::Quantity);
    let sales_base_col = bindings.get(ColumnRole::SalesBase);
    let amount_col = bindings.get(ColumnRole::Amount);

    let mut groups: BTreeMap<String, (usize, f64, f64, f64)> = BTreeMap::new();
    for row in &sheet.rows {
        let value = row.get(category_col).map(|c| c.display()).unwrap_or_default();
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let entry = groups.entry(value.to_string()).or_insert((0, 0.0, 0.0, 0.0));
        entry.0 += 1;
        let add = |col: Option<usize>, slot: &mut f64| {
            if let Some(c) = col {
                if let Some(v) = row.get(c).and_then(|cell| cell.as_number()) {
                    *slot += v;
                }
            }
        };
        add(quantity_col, &mut entry.1);
        add(sales_base_col, &mut entry.2);
        add(amount_col, &mut entry.3);
    }

    let mut rows: Vec<(String, (usize, f64, f64, f64))> = groups.into_iter().collect();
    rows.sort_by(|a, b| {
        b.1 .3
            .partial_cmp(&a.1 .3)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.1 .0.cmp(&a.1 .0))
    });
    rows.into_iter()
        .map(|(value, (count, quantity, sales_base, amount))| CategoryStatsRow {
            value,
            rows: count,
            quantity: format_number(quantity, 0),
            sales_base: format_number(sales_base, 0),
            amount_total: format_number(amount, 0),
        })
        .collect()
}

pub fn consultation_summary(
    sheet: &Sheet,
    company_col: usize,
    manager_col: usize,
) -> Vec<ConsultationSummaryRow> {
    let mut groups: BTreeMap<(String, String), usize> = BTreeMap::new();
    for row in &sheet.rows {
        let company = row.get(company_col).map(|c| c.display()).unwrap_or_default();
        let manager = row.get(manager_col).map(|c| c.display()).unwrap_or_default();
        let (company, manager) = (company.trim(), manager.trim());
        if company.is_empty() || manager.is_empty() {
            continue;
        }
        *groups
            .entry((company.to_string(), manager.to_string()))
            .or_insert(0) += 1;
    }
    let mut rows: Vec<((String, String), usize)> = groups.into_iter().collect();
    rows.sort_by(|a, b| a.0 .0.cmp(&b.0 .0).then_with(|| b.1.cmp(&a.1)));
    rows.into_iter()
        .map(|((company, manager), consultations)| ConsultationSummaryRow {
            company,
            manager,
            consultations,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

fn highlight(bucket: &MonthlyBucket) -> MonthHighlight {
    MonthHighlight {
        period: bucket.period.to_string(),
        amount_total: bucket.amount_total,
        growth_pct: bucket.growth_pct,
    }
}

pub fn summarize(
    buckets: &[MonthlyBucket],
    report_month: u32,
    total_rows: usize,
    diagnostics: &MonthlySeries,
    unresolved_roles: Vec<String>,
) -> SummaryStats {
    let best_month = buckets
        .iter()
        .max_by(|a, b| {
            a.amount_total
                .partial_cmp(&b.amount_total)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(highlight);
    let sharpest_growth = buckets
        .iter()
        .filter(|b| b.growth_pct.map(|g| g > 0.0).unwrap_or(false))
        .max_by(|a, b| {
            a.growth_pct
                .partial_cmp(&b.growth_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(highlight);
    let sharpest_decline = buckets
        .iter()
        .filter(|b| b.growth_pct.map(|g| g < 0.0).unwrap_or(false))
        .min_by(|a, b| {
            a.growth_pct
                .partial_cmp(&b.growth_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(highlight);
    let weakest_month = if buckets.is_empty() {
        None
    } else {
        let mean: f64 =
            buckets.iter().map(|b| b.amount_total).sum::<f64>() / buckets.len() as f64;
        buckets
            .iter()
            .filter(|b| b.amount_total < mean * 0.8)
            .min_by(|a, b| {
                a.amount_total
                    .partial_cmp(&b.amount_total)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(highlight)
    };

    SummaryStats {
        report_month,
        total_rows,
        months_covered: buckets.len(),
        invalid_date_cells: diagnostics.invalid_dates,
        non_numeric_amount_cells: diagnostics.non_numeric_amounts,
        unresolved_roles,
        best_month,
        sharpest_growth,
        sharpest_decline,
        weakest_month,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::YearMonth;
    use chrono::NaiveDate;

    fn date(s: &str) -> Cell {
        Cell::Date(NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap())
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.into())
    }

    fn meeting_sheet() -> Sheet {
        Sheet {
            name: "11월 주간회의록".into(),
            headers: vec![
                "날짜".into(),
                "플랫폼".into(),
                "매출총이익".into(),
                "업체지급금액".into(),
                "담당자".into(),
            ],
            rows: vec![
                vec![
                    date("2025-11-03"),
                    text("스마트스토어"),
                    Cell::Number(100.0),
                    Cell::Number(10.0),
                    text("김철수"),
                ],
                vec![
                    date("2025-11-10"),
                    text("쿠팡"),
                    Cell::Number(200.0),
                    Cell::Number(20.0),
                    text("맹기열"),
                ],
                vec![
                    date("2025-12-01"),
                    text("쿠팡"),
                    Cell::Number(300.0),
                    Cell::Number(30.0),
                    text("이영희"),
                ],
            ],
        }
    }

    fn test_config() -> ReportConfig {
        let mut config = ReportConfig::default();
        config.overrides = [("2025-11".to_string(), 999.0)].into_iter().collect();
        config
    }

    #[test]
    fn end_to_end_monthly_series_is_reconciled() {
        let bundle = build_reports(&meeting_sheet(), None, 11, &test_config());
        // December rows are excluded; the November bucket (100 + 200) is
        // replaced by the audited 999.
        assert_eq!(bundle.monthly.len(), 1);
        let row = &bundle.monthly[0];
        assert_eq!(row.period, "2025-11");
        assert_eq!(row.amount_total, "999");
        assert_eq!(row.payment_total, "30");
        assert_eq!(row.source, "overridden");
    }

    #[test]
    fn end_to_end_achievement_uses_derived_parts() {
        let bundle = build_reports(&meeting_sheet(), None, 11, &test_config());
        assert_eq!(bundle.achievement.len(), 3);
        // 김철수 -> 1파트 (100), 맹기열 -> 2파트 (200); December rows are
        // outside the selected month.
        assert_eq!(bundle.achievement[0].part, "1파트");
        assert_eq!(bundle.achievement[0].achieved, "100");
        assert_eq!(bundle.achievement[1].part, "2파트");
        assert_eq!(bundle.achievement[1].achieved, "200");
        assert_eq!(bundle.achievement[2].part, "전체");
    }

    #[test]
    fn end_to_end_collects_degraded_notices() {
        let sheet = Sheet {
            name: "메모".into(),
            headers: vec!["비고".into()],
            rows: vec![vec![text("자유 메모")]],
        };
        let bundle = build_reports(&sheet, None, 11, &test_config());
        assert!(bundle.monthly.is_empty());
        assert!(bundle
            .notices
            .iter()
            .any(|n| n.contains("monthly revenue series skipped")));
        assert!(bundle
            .notices
            .iter()
            .any(|n| n.contains("unresolved")));
        // The summary still reports the unresolved roles.
        let summary = bundle.summary.unwrap();
        assert!(!summary.unresolved_roles.is_empty());
    }

    #[test]
    fn sales_sheet_produces_settlement_reports() {
        let sales = Sheet {
            name: "2025 정산".into(),
            headers: vec![
                "업체명".into(),
                "상품코드".into(),
                "상품명".into(),
                "판매수량".into(),
                "업체지급금액".into(),
                "판매일".into(),
            ],
            rows: vec![
                vec![
                    text("에이스제조"),
                    text("A-100"),
                    text("보호필름"),
                    Cell::Number(5.0),
                    Cell::Number(1000.0),
                    date("2025-10-05"),
                ],
                vec![
                    text("에이스제조"),
                    text("A-100"),
                    text("보호필름"),
                    Cell::Number(3.0),
                    Cell::Number(500.0),
                    date("2025-11-02"),
                ],
                vec![
                    text("부강상사"),
                    text("B-200"),
                    text("거치대"),
                    Cell::Number(10.0),
                    Cell::Number(4000.0),
                    date("2025-11-03"),
                ],
            ],
        };
        let bundle = build_reports(&meeting_sheet(), Some(&sales), 11, &test_config());

        assert_eq!(bundle.manufacturers.len(), 2);
        assert_eq!(bundle.manufacturers[0].manufacturer, "부강상사");
        assert_eq!(bundle.manufacturers[0].payment_total, "4,000");

        assert_eq!(bundle.products.len(), 2);
        assert_eq!(bundle.products[0].rank, 1);
        assert_eq!(bundle.products[0].product, "거치대");
        assert_eq!(bundle.products[0].total_quantity, "10");
        assert_eq!(bundle.products[1].manufacturer, "에이스제조");

        // Settlement series: October 1,000 / November 500 + 4,000, with
        // the November override applied on top.
        assert_eq!(bundle.settlement_monthly.len(), 2);
        assert_eq!(bundle.settlement_monthly[0].period, "2025-10");
        assert_eq!(bundle.settlement_monthly[1].amount_total, "999");
    }

    #[test]
    fn weekly_breakdown_labels_relative_weeks() {
        let sheet = Sheet {
            name: "11월".into(),
            headers: vec!["날짜".into(), "매출총이익".into()],
            rows: vec![
                vec![date("2025-11-03"), Cell::Number(10.0)],
                vec![date("2025-11-04"), Cell::Number(5.0)],
                vec![date("2025-11-12"), Cell::Number(20.0)],
            ],
        };
        let rows = weekly_breakdown(&sheet, 0, Some(1), 11);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].week, "11월 첫째주");
        assert_eq!(rows[0].rows, 2);
        assert_eq!(rows[0].amount_total, "15");
        assert_eq!(rows[1].week, "11월 둘째주");
    }

    #[test]
    fn daily_breakdown_groups_by_day_of_month() {
        let sheet = Sheet {
            name: "11월".into(),
            headers: vec!["날짜".into()],
            rows: vec![
                vec![date("2025-11-03")],
                vec![date("2025-11-03")],
                vec![date("2025-11-21")],
            ],
        };
        let rows = daily_breakdown(&sheet, 0, None);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].day, 3);
        assert_eq!(rows[0].rows, 2);
        assert_eq!(rows[1].day, 21);
    }

    #[test]
    fn consultation_summary_counts_company_manager_pairs() {
        let sheet = Sheet {
            name: "스마트공장".into(),
            headers: vec!["업체명".into(), "담당자".into()],
            rows: vec![
                vec![text("가온테크"), text("김철수")],
                vec![text("가온테크"), text("김철수")],
                vec![text("가온테크"), text("이영희")],
                vec![text("나래전자"), text("김철수")],
                vec![text(""), text("무시됨")],
            ],
        };
        let rows = consultation_summary(&sheet, 0, 1);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].company, "가온테크");
        assert_eq!(rows[0].manager, "김철수");
        assert_eq!(rows[0].consultations, 2);
        assert_eq!(rows[2].company, "나래전자");
    }

    #[test]
    fn most_frequent_breaks_ties_by_first_seen() {
        let values: Vec<String> = ["b", "a", "a", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(most_frequent(&values), Some("b".to_string()));
        let values: Vec<String> = ["a", "b", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(most_frequent(&values), Some("b".to_string()));
        assert_eq!(most_frequent(&[]), None);
    }

    #[test]
    fn summary_highlights_best_and_weakest_months() {
        let buckets = vec![
            MonthlyBucket {
                period: YearMonth { year: 2025, month: 9 },
                amount_total: 1000.0,
                payment_total: 0.0,
                rows: 1,
                growth_pct: None,
                provenance: crate::types::Provenance::Computed,
            },
            MonthlyBucket {
                period: YearMonth { year: 2025, month: 10 },
                amount_total: 5000.0,
                payment_total: 0.0,
                rows: 1,
                growth_pct: Some(400.0),
                provenance: crate::types::Provenance::Computed,
            },
            MonthlyBucket {
                period: YearMonth { year: 2025, month: 11 },
                amount_total: 200.0,
                payment_total: 0.0,
                rows: 1,
                growth_pct: Some(-96.0),
                provenance: crate::types::Provenance::Computed,
            },
        ];
        let summary = summarize(&buckets, 11, 3, &MonthlySeries::default(), vec![]);
        assert_eq!(summary.best_month.as_ref().unwrap().period, "2025-10");
        assert_eq!(summary.sharpest_growth.as_ref().unwrap().period, "2025-10");
        assert_eq!(summary.sharpest_decline.as_ref().unwrap().period, "2025-11");
        assert_eq!(summary.weakest_month.as_ref().unwrap().period, "2025-11");
        assert_eq!(summary.months_covered, 3);
    }
}
