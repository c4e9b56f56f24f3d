// Sheet selection and column-role resolution.
//
// Both are pure functions over names/headers plus config. A role that
// cannot be resolved is reported, never guessed: downstream stages skip
// the computations that need it.
use std::collections::BTreeSet;

use crate::config::{ManualColumn, ReportConfig};
use crate::types::{Cell, ColumnRole, RoleBindings, Sheet};

// ---------------------------------------------------------------------------
// Sheet selection
// ---------------------------------------------------------------------------

/// Result of scanning sheet names for the reporting month. `index` is
/// `None` when neither month matched; the caller must then ask the user
/// instead of silently picking a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetSelection {
    pub index: Option<usize>,
    pub month: Option<u32>,
}

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Name fragments that identify a month: `11월`, `november`, `nov`, `11`.
pub fn month_tokens(month: u32) -> Vec<String> {
    let name = MONTH_NAMES[(month.clamp(1, 12) as usize) - 1];
    vec![
        format!("{}월", month),
        name.to_string(),
        name[..3].to_string(),
        month.to_string(),
    ]
}

pub fn sheet_matches_month(name: &str, month: u32) -> bool {
    let lower = name.to_lowercase();
    month_tokens(month).iter().any(|t| lower.contains(t))
}

/// Scan sheet names in order for the primary month's tokens, then the
/// secondary month's.
pub fn select_sheet(names: &[String], primary: u32, secondary: u32) -> SheetSelection {
    for month in [primary, secondary] {
        if let Some(index) = names.iter().position(|n| sheet_matches_month(n, month)) {
            return SheetSelection {
                index: Some(index),
                month: Some(month),
            };
        }
    }
    SheetSelection {
        index: None,
        month: None,
    }
}

// ---------------------------------------------------------------------------
// Column-role resolution
// ---------------------------------------------------------------------------

/// Resolve the requested roles against one sheet's headers.
///
/// Roles are processed in the order given; a column taken by an earlier
/// role is invisible to later roles, which fall through to their next
/// strategy. Per role the strategies are: manual binding, fixed position,
/// keyword match, date sniffing (Date only), then unresolved.
pub fn resolve_roles(sheet: &Sheet, roles: &[ColumnRole], config: &ReportConfig) -> RoleBindings {
    let mut bindings = RoleBindings::default();
    let mut taken: BTreeSet<usize> = BTreeSet::new();

    for &role in roles {
        match resolve_one(sheet, role, config, &taken) {
            Some(col) => {
                bindings.bound.insert(role, col);
                taken.insert(col);
            }
            None => bindings.unresolved.push(role),
        }
    }
    bindings
}

fn resolve_one(
    sheet: &Sheet,
    role: ColumnRole,
    config: &ReportConfig,
    taken: &BTreeSet<usize>,
) -> Option<usize> {
    if let Some(manual) = config.manual_roles.get(&role) {
        if let Some(col) = manual_column(sheet, manual) {
            if !taken.contains(&col) {
                return Some(col);
            }
        }
    }

    if let Some(discovery) = config.discovery.get(&role) {
        if let Some(index) = discovery.index {
            if index < sheet.headers.len() && !taken.contains(&index) {
                return Some(index);
            }
        }
        for (i, header) in sheet.headers.iter().enumerate() {
            if taken.contains(&i) {
                continue;
            }
            let lower = header.to_lowercase();
            if discovery
                .exclude
                .iter()
                .any(|k| lower.contains(&k.to_lowercase()))
            {
                continue;
            }
            if discovery
                .keywords
                .iter()
                .any(|k| lower.contains(&k.to_lowercase()))
            {
                return Some(i);
            }
        }
    }

    if role == ColumnRole::Date {
        return sniff_date_column(sheet, taken);
    }
    None
}

fn manual_column(sheet: &Sheet, manual: &ManualColumn) -> Option<usize> {
    match manual {
        ManualColumn::Index(i) => {
            if *i < sheet.headers.len() {
                Some(*i)
            } else {
                None
            }
        }
        ManualColumn::Header(name) => sheet
            .headers
            .iter()
            .position(|h| h.trim() == name.trim()),
    }
}

/// First column whose first non-empty cell reads as a date.
fn sniff_date_column(sheet: &Sheet, taken: &BTreeSet<usize>) -> Option<usize> {
    for col in 0..sheet.headers.len() {
        if taken.contains(&col) {
            continue;
        }
        let first_value = sheet
            .rows
            .iter()
            .map(|row| row.get(col).unwrap_or(&Cell::Empty))
            .find(|cell| !cell.is_empty());
        if let Some(cell) = first_value {
            if cell.as_date().is_some() {
                return Some(col);
            }
        }
    }
    None
}
