// Report configuration: reporting period, column discovery rules, targets,
// and the audited monthly override table.
//
// All defaults reproduce the constants the reporting team settled on; a
// `report_config.toml` next to the binary overrides any subset of them.
use std::collections::BTreeMap;
use std::error::Error;

use serde::Deserialize;

use crate::types::{ColumnRole, YearMonth};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub period: PeriodConfig,
    pub inputs: InputConfig,
    pub discovery: BTreeMap<ColumnRole, RoleDiscovery>,
    /// Explicit user-chosen bindings. A manual binding wins over every
    /// automatic discovery strategy.
    pub manual_roles: BTreeMap<ColumnRole, ManualColumn>,
    pub part: PartConfig,
    pub targets: TargetConfig,
    /// Audited monthly totals, keyed by `YYYY-MM`. These supersede the
    /// computed sums for their periods.
    pub overrides: BTreeMap<String, f64>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            period: PeriodConfig::default(),
            inputs: InputConfig::default(),
            discovery: default_discovery(),
            manual_roles: BTreeMap::new(),
            part: PartConfig::default(),
            targets: TargetConfig::default(),
            overrides: default_overrides(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PeriodConfig {
    /// Month whose sheet is looked for first.
    pub primary_month: u32,
    /// Fallback month when no primary sheet exists.
    pub secondary_month: u32,
    /// Months dropped from the monthly series (settlement not closed yet).
    pub excluded_months: Vec<u32>,
}

impl Default for PeriodConfig {
    fn default() -> Self {
        Self {
            primary_month: 11,
            secondary_month: 12,
            excluded_months: vec![12],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetSource {
    pub name: String,
    pub file: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Weekly meeting minutes, one CSV per sheet.
    pub meeting_sheets: Vec<SheetSource>,
    /// Settlement-based sales data.
    pub sales_sheets: Vec<SheetSource>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            meeting_sheets: vec![
                SheetSource {
                    name: "11월 주간회의록".into(),
                    file: "weekly_minutes_11.csv".into(),
                },
                SheetSource {
                    name: "12월 주간회의록".into(),
                    file: "weekly_minutes_12.csv".into(),
                },
            ],
            sales_sheets: vec![SheetSource {
                name: "2025 정산서 기준 판매 데이터".into(),
                file: "settlement_sales_2025.csv".into(),
            }],
        }
    }
}

// ---------------------------------------------------------------------------
// Column discovery
// ---------------------------------------------------------------------------

/// How one role is discovered automatically: a fixed position when the
/// sheet is wide enough, otherwise the first header containing any keyword
/// and none of the exclusions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoleDiscovery {
    pub index: Option<usize>,
    pub keywords: Vec<String>,
    pub exclude: Vec<String>,
}

/// A manual role binding: either a header name or a 0-based column index.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ManualColumn {
    Index(usize),
    Header(String),
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn default_discovery() -> BTreeMap<ColumnRole, RoleDiscovery> {
    let mut map = BTreeMap::new();
    // Date columns are found by content sniffing, not keywords.
    map.insert(ColumnRole::Date, RoleDiscovery::default());
    map.insert(
        ColumnRole::Amount,
        RoleDiscovery {
            // Column N of the meeting minutes.
            index: Some(13),
            keywords: words(&[
                "금액", "amount", "매출", "매출액", "수익", "revenue", "매출총이익",
            ]),
            exclude: vec![],
        },
    );
    map.insert(
        ColumnRole::Payment,
        RoleDiscovery {
            // Column I.
            index: Some(8),
            keywords: words(&["업체지급금액", "지급금액", "정산금액", "payment"]),
            exclude: vec![],
        },
    );
    map.insert(
        ColumnRole::Manager,
        RoleDiscovery {
            // Column P.
            index: Some(15),
            keywords: words(&["담당자", "manager", "담당", "contact", "담당자명"]),
            exclude: vec![],
        },
    );
    map.insert(
        ColumnRole::Part,
        RoleDiscovery {
            index: None,
            keywords: words(&["파트", "part"]),
            exclude: vec![],
        },
    );
    map.insert(
        ColumnRole::Manufacturer,
        RoleDiscovery {
            // Column A of the sales data.
            index: Some(0),
            keywords: words(&[
                "업체",
                "company",
                "회사",
                "고객",
                "customer",
                "제조사",
                "manufacturer",
                "maker",
            ]),
            exclude: words(&["지급금액", "금액"]),
        },
    );
    map.insert(
        ColumnRole::ProductCode,
        RoleDiscovery {
            index: None,
            keywords: words(&["상품", "product", "코드", "code", "상품코드"]),
            exclude: words(&["상품명", "코드별"]),
        },
    );
    map.insert(
        ColumnRole::ProductName,
        RoleDiscovery {
            index: None,
            keywords: words(&[
                "상품명",
                "product name",
                "품명",
                "name",
                "제품명",
                "상품이름",
            ]),
            exclude: vec![],
        },
    );
    map.insert(
        ColumnRole::Quantity,
        RoleDiscovery {
            index: None,
            keywords: words(&["수량", "quantity", "판매", "sales", "qty"]),
            exclude: words(&["코드별", "상품코드", "상품명"]),
        },
    );
    map.insert(
        ColumnRole::SalesBase,
        RoleDiscovery {
            index: None,
            keywords: words(&["매출기준액", "매출기준", "sales base", "기준액"]),
            exclude: vec![],
        },
    );
    map.insert(
        ColumnRole::Company,
        RoleDiscovery {
            index: None,
            keywords: words(&["업체", "company", "회사", "고객", "customer", "client"]),
            exclude: words(&["지급금액", "금액"]),
        },
    );
    map.insert(
        ColumnRole::Consultation,
        RoleDiscovery {
            index: None,
            keywords: words(&[
                "상담",
                "consultation",
                "내역",
                "내용",
                "content",
                "상담내용",
                "상담내역",
            ]),
            exclude: vec![],
        },
    );
    map
}

// ---------------------------------------------------------------------------
// Part split + targets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PartConfig {
    /// The one manager whose rows belong to 2파트; every other non-empty
    /// manager cell maps to 1파트.
    pub distinguished_manager: String,
    /// Share of the grand total credited to 1파트 when no part column can
    /// be resolved at all.
    pub part1_ratio_pct: f64,
}

impl Default for PartConfig {
    fn default() -> Self {
        Self {
            distinguished_manager: "맹기열".into(),
            part1_ratio_pct: 90.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TargetPair {
    pub part1: f64,
    pub part2: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub part1: f64,
    pub part2: f64,
    /// Per-month target overrides (month number as key), for periods that
    /// run against their own goals.
    pub by_month: BTreeMap<String, TargetPair>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            part1: 17_000_000.0,
            part2: 1_000_000.0,
            by_month: BTreeMap::new(),
        }
    }
}

impl TargetConfig {
    pub fn for_month(&self, month: u32) -> TargetPair {
        self.by_month
            .get(&month.to_string())
            .copied()
            .unwrap_or(TargetPair {
                part1: self.part1,
                part2: self.part2,
            })
    }
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

/// Audited 2025 monthly totals from the financial close. December is not
/// closed and stays absent.
fn default_overrides() -> BTreeMap<String, f64> {
    let table = [
        ("2025-01", 23_290_017.0),
        ("2025-02", 20_003_838.0),
        ("2025-03", 18_924_280.0),
        ("2025-04", 23_528_759.0),
        ("2025-05", 24_544_760.0),
        ("2025-06", 22_182_939.0),
        ("2025-07", 90_013_289.0),
        ("2025-08", 38_355_057.0),
        ("2025-09", 68_243_253.0),
        ("2025-10", 61_020_050.0),
        ("2025-11", 45_450_249.0),
    ];
    table
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect()
}

// ---------------------------------------------------------------------------
// Parse + validate
// ---------------------------------------------------------------------------

impl ReportConfig {
    pub fn from_toml(input: &str) -> Result<Self, Box<dyn Error>> {
        let config: ReportConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read the config file if it exists; otherwise use the built-in
    /// defaults. A present-but-malformed file is a hard error.
    pub fn load_or_default(path: &str) -> Result<Self, Box<dyn Error>> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        let month_ok = |m: u32| (1..=12).contains(&m);
        if !month_ok(self.period.primary_month) || !month_ok(self.period.secondary_month) {
            return Err(format!(
                "period months must be 1..=12, got {}/{}",
                self.period.primary_month, self.period.secondary_month
            )
            .into());
        }
        for m in &self.period.excluded_months {
            if !month_ok(*m) {
                return Err(format!("excluded month {} out of range", m).into());
            }
        }
        for key in self.overrides.keys() {
            if YearMonth::parse(key).is_none() {
                return Err(format!("override key '{}' is not YYYY-MM", key).into());
            }
        }
        for key in self.targets.by_month.keys() {
            match key.parse::<u32>() {
                Ok(m) if month_ok(m) => {}
                _ => return Err(format!("target month key '{}' is not 1..=12", key).into()),
            }
        }
        if !(0.0..=100.0).contains(&self.part.part1_ratio_pct) {
            return Err(format!(
                "part1_ratio_pct must be 0..=100, got {}",
                self.part.part1_ratio_pct
            )
            .into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ReportConfig::default();
        config.validate().unwrap();
        assert_eq!(config.period.primary_month, 11);
        assert_eq!(config.period.excluded_months, vec![12]);
        assert_eq!(config.overrides.get("2025-11"), Some(&45_450_249.0));
        assert_eq!(config.part.distinguished_manager, "맹기열");
    }

    #[test]
    fn partial_toml_merges_with_defaults() {
        let config = ReportConfig::from_toml(
            r#"
[period]
primary_month = 12
secondary_month = 11

[targets]
part1 = 20000000.0
part2 = 1500000.0
"#,
        )
        .unwrap();
        assert_eq!(config.period.primary_month, 12);
        // Untouched sections keep their defaults.
        assert_eq!(config.period.excluded_months, vec![12]);
        assert_eq!(config.targets.for_month(11).part1, 20_000_000.0);
        assert!(!config.overrides.is_empty());
    }

    #[test]
    fn per_month_targets_override_the_default_pair() {
        let config = ReportConfig::from_toml(
            r#"
[targets]
part1 = 17000000.0
part2 = 1000000.0

[targets.by_month.12]
part1 = 21000000.0
part2 = 1200000.0
"#,
        )
        .unwrap();
        assert_eq!(config.targets.for_month(12).part1, 21_000_000.0);
        assert_eq!(config.targets.for_month(11).part1, 17_000_000.0);
    }

    #[test]
    fn manual_roles_accept_header_or_index() {
        let config = ReportConfig::from_toml(
            r#"
[manual_roles]
amount = "매출총이익"
manager = 15
"#,
        )
        .unwrap();
        assert!(matches!(
            config.manual_roles.get(&ColumnRole::Amount),
            Some(ManualColumn::Header(h)) if h == "매출총이익"
        ));
        assert!(matches!(
            config.manual_roles.get(&ColumnRole::Manager),
            Some(ManualColumn::Index(15))
        ));
    }

    #[test]
    fn reject_bad_override_key() {
        let err = ReportConfig::from_toml(
            r#"
[overrides]
"november-2025" = 1.0
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("november-2025"));
    }

    #[test]
    fn reject_out_of_range_month() {
        let err = ReportConfig::from_toml(
            r#"
[period]
primary_month = 13
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("1..=12"));
    }
}
