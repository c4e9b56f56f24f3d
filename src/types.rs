use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::util::{parse_date_multi, parse_f64_safe};

// ---------------------------------------------------------------------------
// Workbook model
// ---------------------------------------------------------------------------

/// A single spreadsheet cell after loading. The loader sniffs numbers and
/// dates from CSV text; anything else stays text.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Numeric view of the cell. Text is re-parsed leniently; dates and
    /// empty cells are not numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(s) => parse_f64_safe(Some(s)),
            _ => None,
        }
    }

    /// Date view of the cell. Text is re-parsed against the known formats.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::Text(s) => parse_date_multi(s),
            _ => None,
        }
    }

    /// Canonical string form. Numbers that hold integral values print
    /// without a trailing `.0` so codes and counts group cleanly.
    pub fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(v) => {
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    format!("{}", *v as i64)
                } else {
                    format!("{}", v)
                }
            }
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Empty => String::new(),
        }
    }
}

/// One 2-D table: a header row plus data rows. Headers are not guaranteed
/// unique or meaningful — role inference deals with that.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&Cell::Empty)
    }
}

/// An ordered collection of named sheets, loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Column roles
// ---------------------------------------------------------------------------

/// Semantic meaning assigned to a spreadsheet column, as opposed to its raw
/// header text or position.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Date,
    Amount,
    Payment,
    Manager,
    Part,
    Manufacturer,
    ProductCode,
    ProductName,
    Quantity,
    SalesBase,
    Company,
    Consultation,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Date => "date",
            Self::Amount => "amount",
            Self::Payment => "payment",
            Self::Manager => "manager",
            Self::Part => "part",
            Self::Manufacturer => "manufacturer",
            Self::ProductCode => "product_code",
            Self::ProductName => "product_name",
            Self::Quantity => "quantity",
            Self::SalesBase => "sales_base",
            Self::Company => "company",
            Self::Consultation => "consultation",
        };
        write!(f, "{}", s)
    }
}

/// Role-to-column bindings for one sheet. A role missing from `bound` is
/// unresolved: dependent computations are skipped and reported, never
/// silently defaulted.
#[derive(Debug, Clone, Default)]
pub struct RoleBindings {
    pub bound: BTreeMap<ColumnRole, usize>,
    pub unresolved: Vec<ColumnRole>,
}

impl RoleBindings {
    pub fn get(&self, role: ColumnRole) -> Option<usize> {
        self.bound.get(&role).copied()
    }

    pub fn is_bound(&self, role: ColumnRole) -> bool {
        self.bound.contains_key(&role)
    }
}

// ---------------------------------------------------------------------------
// Part labels
// ---------------------------------------------------------------------------

/// Team split derived from the manager-name column. The label is a pure
/// function of the cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartLabel {
    Part1,
    Part2,
    Unlabeled,
}

impl PartLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Part1 => "1파트",
            Self::Part2 => "2파트",
            Self::Unlabeled => "",
        }
    }
}

impl fmt::Display for PartLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Monthly series
// ---------------------------------------------------------------------------

/// Aggregation key for the monthly series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse a `YYYY-MM` period key as used by the override table.
    pub fn parse(s: &str) -> Option<Self> {
        let (y, m) = s.trim().split_once('-')?;
        let year: i32 = y.parse().ok()?;
        let month: u32 = m.parse().ok()?;
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Whether a bucket's primary aggregate came out of the computation or was
/// replaced by the audited override table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Computed,
    Overridden,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Computed => write!(f, "computed"),
            Self::Overridden => write!(f, "overridden"),
        }
    }
}

/// One month of aggregated revenue. `payment_total` is the secondary
/// aggregate and survives overrides untouched.
#[derive(Debug, Clone)]
pub struct MonthlyBucket {
    pub period: YearMonth,
    pub amount_total: f64,
    pub payment_total: f64,
    pub rows: usize,
    pub growth_pct: Option<f64>,
    pub provenance: Provenance,
}

// ---------------------------------------------------------------------------
// Achievement
// ---------------------------------------------------------------------------

/// Goal-achievement figures for one part (or the combined total row).
/// `rate_pct` is uncapped; by convention it is 0 when the target is not
/// positive.
#[derive(Debug, Clone)]
pub struct AchievementResult {
    pub label: String,
    pub target: f64,
    pub achieved: f64,
    pub rows: usize,
    pub rate_pct: f64,
    pub delta: f64,
}

// ---------------------------------------------------------------------------
// Report rows (presentation layer shapes)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MonthlySeriesRow {
    #[serde(rename = "년월")]
    #[tabled(rename = "년월")]
    pub period: String,
    #[serde(rename = "매출총이익")]
    #[tabled(rename = "매출총이익")]
    pub amount_total: String,
    #[serde(rename = "업체지급금액")]
    #[tabled(rename = "업체지급금액")]
    pub payment_total: String,
    #[serde(rename = "건수")]
    #[tabled(rename = "건수")]
    pub rows: usize,
    #[serde(rename = "성장률")]
    #[tabled(rename = "성장률")]
    pub growth: String,
    #[serde(rename = "출처")]
    #[tabled(rename = "출처")]
    pub source: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct AchievementRow {
    #[serde(rename = "파트")]
    #[tabled(rename = "파트")]
    pub part: String,
    #[serde(rename = "목표")]
    #[tabled(rename = "목표")]
    pub target: String,
    #[serde(rename = "달성")]
    #[tabled(rename = "달성")]
    pub achieved: String,
    #[serde(rename = "건수")]
    #[tabled(rename = "건수")]
    pub rows: usize,
    #[serde(rename = "달성율")]
    #[tabled(rename = "달성율")]
    pub rate: String,
    #[serde(rename = "차이")]
    #[tabled(rename = "차이")]
    pub delta: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct WeeklyBreakdownRow {
    #[serde(rename = "주차")]
    #[tabled(rename = "주차")]
    pub week: String,
    #[serde(rename = "건수")]
    #[tabled(rename = "건수")]
    pub rows: usize,
    #[serde(rename = "매출이익금")]
    #[tabled(rename = "매출이익금")]
    pub amount_total: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DailyBreakdownRow {
    #[serde(rename = "일")]
    #[tabled(rename = "일")]
    pub day: u32,
    #[serde(rename = "건수")]
    #[tabled(rename = "건수")]
    pub rows: usize,
    #[serde(rename = "매출이익금")]
    #[tabled(rename = "매출이익금")]
    pub amount_total: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ManufacturerSettlementRow {
    #[serde(rename = "업체")]
    #[tabled(rename = "업체")]
    pub manufacturer: String,
    #[serde(rename = "정산금액")]
    #[tabled(rename = "정산금액")]
    pub payment_total: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ProductSalesRow {
    #[serde(rename = "순위")]
    #[tabled(rename = "순위")]
    pub rank: usize,
    #[serde(rename = "제조사")]
    #[tabled(rename = "제조사")]
    pub manufacturer: String,
    #[serde(rename = "상품명")]
    #[tabled(rename = "상품명")]
    pub product: String,
    #[serde(rename = "총판매수량")]
    #[tabled(rename = "총판매수량")]
    pub total_quantity: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CategoryStatsRow {
    #[serde(rename = "분류")]
    #[tabled(rename = "분류")]
    pub value: String,
    #[serde(rename = "건수")]
    #[tabled(rename = "건수")]
    pub rows: usize,
    #[serde(rename = "수량")]
    #[tabled(rename = "수량")]
    pub quantity: String,
    #[serde(rename = "매출기준액")]
    #[tabled(rename = "매출기준액")]
    pub sales_base: String,
    #[serde(rename = "매출총이익")]
    #[tabled(rename = "매출총이익")]
    pub amount_total: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ConsultationSummaryRow {
    #[serde(rename = "업체")]
    #[tabled(rename = "업체")]
    pub company: String,
    #[serde(rename = "담당자")]
    #[tabled(rename = "담당자")]
    pub manager: String,
    #[serde(rename = "상담건수")]
    #[tabled(rename = "상담건수")]
    pub consultations: usize,
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MonthHighlight {
    pub period: String,
    pub amount_total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_pct: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub report_month: u32,
    pub total_rows: usize,
    pub months_covered: usize,
    pub invalid_date_cells: usize,
    pub non_numeric_amount_cells: usize,
    pub unresolved_roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_month: Option<MonthHighlight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpest_growth: Option<MonthHighlight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpest_decline: Option<MonthHighlight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weakest_month: Option<MonthHighlight>,
}
