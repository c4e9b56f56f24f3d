// Monthly override reconciliation.
//
// The override table holds totals audited in the financial close; they
// always win over the computed sums. Each affected bucket is marked
// `Overridden` so the presentation layer can show which figures came from
// the close instead of the heuristic aggregation.
use std::collections::BTreeMap;

use crate::aggregate::apply_growth;
use crate::types::{MonthlyBucket, Provenance, YearMonth};

/// Apply the `YYYY-MM` → total override map to a computed series.
///
/// An existing bucket keeps its payment sum and row count and only has its
/// primary aggregate replaced. A period with no computed bucket is
/// synthesized with zeroed secondary aggregates. The series is re-sorted
/// and growth recomputed against the reconciled totals.
pub fn apply_overrides(
    mut buckets: Vec<MonthlyBucket>,
    overrides: &BTreeMap<String, f64>,
) -> Vec<MonthlyBucket> {
    for (key, value) in overrides {
        let period = match YearMonth::parse(key) {
            Some(p) => p,
            None => continue,
        };
        if let Some(pos) = buckets.iter().position(|b| b.period == period) {
            buckets[pos].amount_total = *value;
            buckets[pos].provenance = Provenance::Overridden;
        } else {
            buckets.push(MonthlyBucket {
                period,
                amount_total: *value,
                payment_total: 0.0,
                rows: 0,
                growth_pct: None,
                provenance: Provenance::Overridden,
            });
        }
    }
    buckets.sort_by_key(|b| b.period);
    apply_growth(&mut buckets);
    buckets
}
