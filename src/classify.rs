// Part derivation from the manager-name column.
//
// Rule from the reporting team: one distinguished manager carries 2파트 by
// themselves; every other non-empty manager cell is 1파트.
use crate::types::{Cell, PartLabel, Sheet};

/// Null-like sentinel produced by spreadsheet round-trips.
const NULL_SENTINEL: &str = "nan";

/// Classify a single manager-name cell. Pure: the label depends on
/// nothing but the cell value.
pub fn classify_manager(cell: &Cell, distinguished: &str) -> PartLabel {
    let name = cell.display();
    let name = name.trim();
    if !distinguished.is_empty() && name.contains(distinguished) {
        return PartLabel::Part2;
    }
    if name.is_empty() || name.eq_ignore_ascii_case(NULL_SENTINEL) {
        return PartLabel::Unlabeled;
    }
    PartLabel::Part1
}

/// Derive the part column for a whole sheet, aligned 1:1 with its rows.
/// Rows are never reordered or dropped here.
pub fn derive_parts(sheet: &Sheet, manager_col: usize, distinguished: &str) -> Vec<PartLabel> {
    sheet
        .rows
        .iter()
        .map(|row| {
            let cell = row.get(manager_col).unwrap_or(&Cell::Empty);
            classify_manager(cell, distinguished)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISTINGUISHED: &str = "맹기열";

    fn text(s: &str) -> Cell {
        Cell::Text(s.into())
    }

    #[test]
    fn manager_cells_classify_per_the_fixed_rule() {
        let cells = [
            text("김철수"),
            text("맹기열"),
            text(""),
            text("nan"),
            text("이영희"),
        ];
        let labels: Vec<PartLabel> = cells
            .iter()
            .map(|c| classify_manager(c, DISTINGUISHED))
            .collect();
        assert_eq!(
            labels,
            vec![
                PartLabel::Part1,
                PartLabel::Part2,
                PartLabel::Unlabeled,
                PartLabel::Unlabeled,
                PartLabel::Part1,
            ]
        );
    }

    #[test]
    fn containment_is_enough_for_the_distinguished_name() {
        assert_eq!(
            classify_manager(&text("맹기열 팀장"), DISTINGUISHED),
            PartLabel::Part2
        );
        assert_eq!(
            classify_manager(&text("  맹기열  "), DISTINGUISHED),
            PartLabel::Part2
        );
    }

    #[test]
    fn whitespace_and_empty_cells_stay_unlabeled() {
        assert_eq!(
            classify_manager(&Cell::Empty, DISTINGUISHED),
            PartLabel::Unlabeled
        );
        assert_eq!(
            classify_manager(&text("   "), DISTINGUISHED),
            PartLabel::Unlabeled
        );
        assert_eq!(
            classify_manager(&text("NaN"), DISTINGUISHED),
            PartLabel::Unlabeled
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let cell = text("박민수");
        let first = classify_manager(&cell, DISTINGUISHED);
        let second = classify_manager(&cell, DISTINGUISHED);
        assert_eq!(first, second);
        assert_eq!(first, PartLabel::Part1);
    }

    #[test]
    fn derived_column_aligns_with_rows() {
        let sheet = Sheet {
            name: "11월".into(),
            headers: vec!["날짜".into(), "담당자".into()],
            rows: vec![
                vec![Cell::Empty, text("맹기열")],
                vec![Cell::Empty, Cell::Empty],
                vec![Cell::Empty, text("김철수")],
            ],
        };
        let labels = derive_parts(&sheet, 1, DISTINGUISHED);
        assert_eq!(
            labels,
            vec![PartLabel::Part2, PartLabel::Unlabeled, PartLabel::Part1]
        );
    }
}
