// Monthly aggregation of the role-tagged table.
//
// Rows with an unparseable date or a non-numeric amount are excluded and
// counted for diagnostics — they never contribute a zero to a sum. Months
// in the excluded set produce no bucket at all.
use std::collections::BTreeMap;

use crate::types::{Cell, MonthlyBucket, Provenance, Sheet, YearMonth};
use crate::util::round2;

/// The monthly series plus the diagnostic counts the presentation layer
/// reports alongside it.
#[derive(Debug, Clone, Default)]
pub struct MonthlySeries {
    pub buckets: Vec<MonthlyBucket>,
    pub invalid_dates: usize,
    pub non_numeric_amounts: usize,
    pub zero_amounts: usize,
}

/// Group rows by (year, month) of the date column, summing the primary
/// amount column and, when bound, the secondary payment column.
///
/// Amounts of zero (or negligibly close to it) are excluded along with
/// the non-numeric ones, matching how the settlement sheets mix blank
/// placeholder rows into the data.
pub fn monthly_series(
    sheet: &Sheet,
    date_col: usize,
    amount_col: usize,
    payment_col: Option<usize>,
    excluded_months: &[u32],
) -> MonthlySeries {
    let mut series = MonthlySeries::default();
    let mut groups: BTreeMap<YearMonth, (f64, f64, usize)> = BTreeMap::new();

    for row in &sheet.rows {
        let date = match row.get(date_col).unwrap_or(&Cell::Empty).as_date() {
            Some(d) => d,
            None => {
                series.invalid_dates += 1;
                continue;
            }
        };
        let amount = match row.get(amount_col).unwrap_or(&Cell::Empty).as_number() {
            Some(v) => v,
            None => {
                series.non_numeric_amounts += 1;
                continue;
            }
        };
        if amount.abs() <= 0.01 {
            series.zero_amounts += 1;
            continue;
        }
        let period = YearMonth::of(date);
        if excluded_months.contains(&period.month) {
            continue;
        }
        let entry = groups.entry(period).or_insert((0.0, 0.0, 0));
        entry.0 += amount;
        if let Some(pc) = payment_col {
            if let Some(p) = row.get(pc).unwrap_or(&Cell::Empty).as_number() {
                entry.1 += p;
            }
        }
        entry.2 += 1;
    }

    series.buckets = groups
        .into_iter()
        .map(|(period, (amount_total, payment_total, rows))| MonthlyBucket {
            period,
            amount_total,
            payment_total,
            rows,
            growth_pct: None,
            provenance: Provenance::Computed,
        })
        .collect();
    apply_growth(&mut series.buckets);
    series
}

/// Fill in period-over-period growth for an ascending series. The first
/// bucket has no prior period and stays `None`; so does any bucket whose
/// predecessor totals exactly zero.
pub fn apply_growth(buckets: &mut [MonthlyBucket]) {
    let mut prev: Option<f64> = None;
    for bucket in buckets.iter_mut() {
        bucket.growth_pct = match prev {
            Some(p) if p != 0.0 => Some(round2((bucket.amount_total - p) / p * 100.0)),
            _ => None,
        };
        prev = Some(bucket.amount_total);
    }
}
