// Goal-achievement figures per part.
//
// Part values in the wild are messy ("1파트", "1", "part1 영업"), so rows
// are aggregated by their literal part value first and the aggregates are
// matched against the known alias forms. Rates are uncapped; a target
// that is not positive yields a rate of 0 by convention instead of a
// division error.
use std::collections::BTreeMap;

use crate::config::TargetPair;
use crate::types::{AchievementResult, Cell, PartLabel, Sheet};

/// Where per-row part values come from: the column derived from the
/// manager names, or a part column resolved directly on the sheet.
pub enum PartSource<'a> {
    Derived(&'a [PartLabel]),
    Column(usize),
}

const PART1_EXACT: &[&str] = &["1파트", "1"];
const PART2_EXACT: &[&str] = &["2파트", "2"];
const PART1_ALIASES: &[&str] = &["1파트", "part1"];
const PART2_ALIASES: &[&str] = &["2파트", "part2"];

fn matches_aliases(value: &str, exact: &[&str], aliases: &[&str]) -> bool {
    let v = value.trim();
    if exact.iter().any(|e| v == *e) {
        return true;
    }
    let lower = v.to_lowercase();
    aliases.iter().any(|a| lower.contains(&a.to_lowercase()))
}

fn result(label: &str, target: f64, achieved: f64, rows: usize) -> AchievementResult {
    let rate_pct = if target > 0.0 {
        achieved * 100.0 / target
    } else {
        0.0
    };
    AchievementResult {
        label: label.to_string(),
        target,
        achieved,
        rows,
        rate_pct,
        delta: achieved - target,
    }
}

/// Compute per-part achievement plus the combined total row.
///
/// With a part source, rows with an empty or null-like part value are
/// dropped, the rest aggregate by literal part value, and the aggregates
/// matching each part's alias forms combine. Without one (the Part role
/// entirely unresolved) the configured split ratio divides the grand
/// total and the per-part row counts are reported as zero.
pub fn compute(
    sheet: &Sheet,
    amount_col: usize,
    part: Option<PartSource<'_>>,
    targets: &TargetPair,
    part1_ratio_pct: f64,
) -> Vec<AchievementResult> {
    match part {
        Some(source) => by_part(sheet, amount_col, source, targets),
        None => by_ratio(sheet, amount_col, targets, part1_ratio_pct),
    }
}

fn part_value(source: &PartSource<'_>, sheet: &Sheet, row_idx: usize) -> String {
    match source {
        PartSource::Derived(labels) => labels
            .get(row_idx)
            .map(|l| l.to_string())
            .unwrap_or_default(),
        PartSource::Column(col) => sheet.cell(row_idx, *col).display(),
    }
}

fn by_part(
    sheet: &Sheet,
    amount_col: usize,
    source: PartSource<'_>,
    targets: &TargetPair,
) -> Vec<AchievementResult> {
    // Aggregate by literal part value first, counting only rows whose
    // amount is actually numeric.
    let mut by_value: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for (i, row) in sheet.rows.iter().enumerate() {
        let value = part_value(&source, sheet, i);
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("nan") {
            continue;
        }
        let amount = match row.get(amount_col).unwrap_or(&Cell::Empty).as_number() {
            Some(v) => v,
            None => continue,
        };
        let entry = by_value.entry(value.to_string()).or_insert((0.0, 0));
        entry.0 += amount;
        entry.1 += 1;
    }

    let (mut part1_sum, mut part1_rows) = (0.0, 0usize);
    let (mut part2_sum, mut part2_rows) = (0.0, 0usize);
    for (value, (sum, rows)) in &by_value {
        if matches_aliases(value, PART1_EXACT, PART1_ALIASES) {
            part1_sum += sum;
            part1_rows += rows;
        } else if matches_aliases(value, PART2_EXACT, PART2_ALIASES) {
            part2_sum += sum;
            part2_rows += rows;
        }
    }

    vec![
        result("1파트", targets.part1, part1_sum, part1_rows),
        result("2파트", targets.part2, part2_sum, part2_rows),
        result(
            "전체",
            targets.part1 + targets.part2,
            part1_sum + part2_sum,
            part1_rows + part2_rows,
        ),
    ]
}

fn by_ratio(
    sheet: &Sheet,
    amount_col: usize,
    targets: &TargetPair,
    part1_ratio_pct: f64,
) -> Vec<AchievementResult> {
    let total: f64 = sheet
        .rows
        .iter()
        .filter_map(|row| row.get(amount_col).unwrap_or(&Cell::Empty).as_number())
        .sum();
    let part1 = total * part1_ratio_pct / 100.0;
    let part2 = total - part1;
    vec![
        result("1파트", targets.part1, part1, 0),
        result("2파트", targets.part2, part2, 0),
        result("전체", targets.part1 + targets.part2, total, 0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PartLabel;

    const TARGETS: TargetPair = TargetPair {
        part1: 17_000_000.0,
        part2: 1_000_000.0,
    };

    fn sheet_with_parts(rows: Vec<(&str, Cell)>) -> Sheet {
        Sheet {
            name: "11월".into(),
            headers: vec!["파트".into(), "매출총이익".into()],
            rows: rows
                .into_iter()
                .map(|(part, amount)| vec![Cell::Text(part.into()), amount])
                .collect(),
        }
    }

    #[test]
    fn rates_and_deltas_follow_the_targets() {
        // Part1 achieves 18,700,000 against 17,000,000 (110.0%), Part2
        // achieves 500,000 against 1,000,000 (50.0%).
        let sheet = sheet_with_parts(vec![
            ("1파트", Cell::Number(18_000_000.0)),
            ("1파트", Cell::Number(700_000.0)),
            ("2파트", Cell::Number(500_000.0)),
        ]);
        let out = compute(&sheet, 1, Some(PartSource::Column(0)), &TARGETS, 90.0);
        assert_eq!(out[0].rate_pct, 110.0);
        assert_eq!(out[0].delta, 1_700_000.0);
        assert_eq!(out[0].rows, 2);
        assert_eq!(out[1].rate_pct, 50.0);
        assert_eq!(out[1].delta, -500_000.0);
        assert_eq!(out[2].achieved, 19_200_000.0);
    }

    #[test]
    fn rate_is_uncapped_above_100() {
        let sheet = sheet_with_parts(vec![("2파트", Cell::Number(3_000_000.0))]);
        let out = compute(&sheet, 1, Some(PartSource::Column(0)), &TARGETS, 90.0);
        assert_eq!(out[1].rate_pct, 300.0);
    }

    #[test]
    fn zero_or_negative_target_yields_zero_rate() {
        let sheet = sheet_with_parts(vec![("1파트", Cell::Number(5_000_000.0))]);
        let targets = TargetPair {
            part1: 0.0,
            part2: -100.0,
        };
        let out = compute(&sheet, 1, Some(PartSource::Column(0)), &targets, 90.0);
        assert_eq!(out[0].rate_pct, 0.0);
        assert_eq!(out[1].rate_pct, 0.0);
        // Delta still reports the raw difference.
        assert_eq!(out[0].delta, 5_000_000.0);
    }

    #[test]
    fn alias_forms_collapse_into_the_same_part() {
        let sheet = sheet_with_parts(vec![
            ("1파트", Cell::Number(100.0)),
            ("1", Cell::Number(10.0)),
            ("PART1 영업", Cell::Number(1.0)),
            ("2파트", Cell::Number(200.0)),
            ("part2", Cell::Number(20.0)),
        ]);
        let out = compute(&sheet, 1, Some(PartSource::Column(0)), &TARGETS, 90.0);
        assert_eq!(out[0].achieved, 111.0);
        assert_eq!(out[0].rows, 3);
        assert_eq!(out[1].achieved, 220.0);
        assert_eq!(out[1].rows, 2);
    }

    #[test]
    fn empty_and_null_like_parts_are_dropped() {
        let sheet = sheet_with_parts(vec![
            ("", Cell::Number(999.0)),
            ("nan", Cell::Number(999.0)),
            ("1파트", Cell::Number(50.0)),
        ]);
        let out = compute(&sheet, 1, Some(PartSource::Column(0)), &TARGETS, 90.0);
        assert_eq!(out[0].achieved, 50.0);
        assert_eq!(out[2].achieved, 50.0);
    }

    #[test]
    fn non_numeric_amounts_do_not_count_rows() {
        let sheet = sheet_with_parts(vec![
            ("1파트", Cell::Text("협의중".into())),
            ("1파트", Cell::Number(80.0)),
        ]);
        let out = compute(&sheet, 1, Some(PartSource::Column(0)), &TARGETS, 90.0);
        assert_eq!(out[0].achieved, 80.0);
        assert_eq!(out[0].rows, 1);
    }

    #[test]
    fn derived_labels_work_as_a_part_source() {
        let sheet = sheet_with_parts(vec![
            ("ignored", Cell::Number(100.0)),
            ("ignored", Cell::Number(25.0)),
        ]);
        let labels = vec![PartLabel::Part1, PartLabel::Part2];
        let out = compute(
            &sheet,
            1,
            Some(PartSource::Derived(&labels)),
            &TARGETS,
            90.0,
        );
        assert_eq!(out[0].achieved, 100.0);
        assert_eq!(out[1].achieved, 25.0);
    }

    #[test]
    fn ratio_fallback_splits_the_grand_total() {
        let sheet = sheet_with_parts(vec![
            ("", Cell::Number(600.0)),
            ("", Cell::Number(400.0)),
        ]);
        let out = compute(&sheet, 1, None, &TARGETS, 90.0);
        assert_eq!(out[0].achieved, 900.0);
        assert_eq!(out[1].achieved, 100.0);
        assert_eq!(out[0].rows, 0);
        assert_eq!(out[2].achieved, 1000.0);
    }
}
