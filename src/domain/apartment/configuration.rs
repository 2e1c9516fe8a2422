use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use strum::{Display, EnumString};
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum FieldKind {
    /// Money or plain quantity (EUR, sqm).
    Amount,
    /// Fraction between 0 and 1.
    Ratio,
    /// Percentage as typed by the user, `3.5` meaning 3.5 %.
    Percent,
    Integer,
    Date,
    Flag,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Amount(f64),
    Ratio(f64),
    Percent(f64),
    Integer(i64),
    Date(NaiveDate),
    Flag(bool),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Amount(_) => FieldKind::Amount,
            FieldValue::Ratio(_) => FieldKind::Ratio,
            FieldValue::Percent(_) => FieldKind::Percent,
            FieldValue::Integer(_) => FieldKind::Integer,
            FieldValue::Date(_) => FieldKind::Date,
            FieldValue::Flag(_) => FieldKind::Flag,
        }
    }

    /// Cell text for the backing table. Floats use the shortest form that parses back to the
    /// same value.
    pub fn to_cell(&self) -> String {
        match self {
            FieldValue::Amount(v) | FieldValue::Ratio(v) | FieldValue::Percent(v) => v.to_string(),
            FieldValue::Integer(v) => v.to_string(),
            FieldValue::Date(d) => d.format(DATE_FORMAT).to_string(),
            FieldValue::Flag(true) => "TRUE".to_string(),
            FieldValue::Flag(false) => "FALSE".to_string(),
        }
    }

    fn is_finite(&self) -> bool {
        match self {
            FieldValue::Amount(v) | FieldValue::Ratio(v) | FieldValue::Percent(v) => v.is_finite(),
            _ => true,
        }
    }
}

impl FieldKind {
    /// Parses cell text as this kind. `None` when the text is blank or does not fit.
    pub fn parse_cell(&self, cell: &str) -> Option<FieldValue> {
        let cell = cell.trim();
        if cell.is_empty() {
            return None;
        }

        let value = match self {
            FieldKind::Amount => FieldValue::Amount(cell.parse().ok()?),
            FieldKind::Ratio => FieldValue::Ratio(cell.parse().ok()?),
            FieldKind::Percent => FieldValue::Percent(cell.parse().ok()?),
            FieldKind::Integer => FieldValue::Integer(cell.parse().ok()?),
            FieldKind::Date => FieldValue::Date(NaiveDate::parse_from_str(cell, DATE_FORMAT).ok()?),
            FieldKind::Flag => FieldValue::Flag(parse_flag(cell)?),
        };

        value.is_finite().then_some(value)
    }
}

fn parse_flag(cell: &str) -> Option<bool> {
    match cell.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub default: FieldValue,
}

impl FieldSpec {
    pub fn kind(&self) -> FieldKind {
        self.default.kind()
    }

    fn amount(key: &'static str, label: &'static str, default: f64) -> Self {
        Self::new(key, label, FieldValue::Amount(default))
    }

    fn ratio(key: &'static str, label: &'static str, default: f64) -> Self {
        Self::new(key, label, FieldValue::Ratio(default))
    }

    fn percent(key: &'static str, label: &'static str, default: f64) -> Self {
        Self::new(key, label, FieldValue::Percent(default))
    }

    fn integer(key: &'static str, label: &'static str, default: i64) -> Self {
        Self::new(key, label, FieldValue::Integer(default))
    }

    fn date(key: &'static str, label: &'static str, year: i32, month: u32, day: u32) -> Self {
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default();
        Self::new(key, label, FieldValue::Date(date))
    }

    fn flag(key: &'static str, label: &'static str, default: bool) -> Self {
        Self::new(key, label, FieldValue::Flag(default))
    }

    fn new(key: &'static str, label: &'static str, default: FieldValue) -> Self {
        Self {
            key,
            label,
            default,
        }
    }
}

/// Every input of the calculator, in backing-table column order.
///
/// New fields must only ever be appended: rows written before a field existed are shorter and
/// decode that field to its default.
pub static FIELDS: LazyLock<Vec<FieldSpec>> = LazyLock::new(|| {
    vec![
        // Purchase & property
        FieldSpec::amount("purchase_price", "Purchase price (€)", 389_000.0),
        FieldSpec::amount("parking_price", "Parking garage price (€)", 39_900.0),
        FieldSpec::amount("living_area_sqm", "Living area (sqm)", 41.39),
        FieldSpec::ratio("building_value_ratio", "Property to land value ratio", 0.81),
        // Transaction costs
        FieldSpec::percent("transfer_tax_pct", "Real estate tax (%)", 3.5),
        FieldSpec::percent("notary_pct", "Notary (%)", 1.5),
        FieldSpec::percent("land_charge_fees_pct", "Land charge fees (%)", 0.5),
        FieldSpec::percent("equity_pct", "Equity (%)", 10.0),
        // Rent
        FieldSpec::amount("rent_per_sqm", "Rent per sqm (€)", 28.0),
        FieldSpec::amount("parking_rent", "Parking rent (€)", 100.0),
        FieldSpec::percent("rent_growth_pct", "Annual rent growth (%)", 2.0),
        // Furnishing
        FieldSpec::amount("furnishing_costs", "Furnishing costs (€)", 5_000.0),
        FieldSpec::percent(
            "furnishing_depreciation_pct",
            "Furnishing depreciation rate (%)",
            10.0,
        ),
        FieldSpec::integer(
            "furnishing_depreciation_years",
            "Furnishing depreciation years",
            10,
        ),
        // Maintenance
        FieldSpec::amount("maintenance_monthly", "Maintenance (monthly €)", 5.0),
        FieldSpec::amount("wg_management_fee", "WG management fee (monthly €)", 30.0),
        FieldSpec::amount("unit_management_fee", "Unit management fee (monthly €)", 0.0),
        FieldSpec::percent("maintenance_growth_pct", "Maintenance growth (annual %)", 2.0),
        // Depreciation
        FieldSpec::percent("special_depreciation_pct", "Special depreciation rate (%)", 5.0),
        FieldSpec::integer("special_depreciation_years", "Special depreciation years", 4),
        FieldSpec::amount(
            "special_depreciation_base",
            "Special depreciation base amount (€)",
            100_000.0,
        ),
        FieldSpec::percent(
            "degressive_depreciation_pct",
            "Degressive depreciation rate (%)",
            5.0,
        ),
        FieldSpec::integer(
            "degressive_depreciation_years",
            "Degressive depreciation years",
            10,
        ),
        FieldSpec::integer("linear_depreciation_years", "Linear depreciation years", 40),
        // Financing
        FieldSpec::amount("kfw_loan_amount", "KfW loan amount (€)", 100_000.0),
        FieldSpec::percent("kfw_interest_pct", "KfW interest (%)", 2.19),
        FieldSpec::percent("kfw_repayment_pct", "KfW repayment (%)", 2.0),
        FieldSpec::percent("main_loan_interest_pct", "Main loan interest (%)", 4.0),
        FieldSpec::percent("main_loan_repayment_pct", "Main loan repayment (%)", 1.5),
        FieldSpec::percent("commitment_fee_pct", "Commitment fee (% / month)", 0.25),
        FieldSpec::integer("grace_period_months", "Grace period (months)", 12),
        // Tax
        FieldSpec::percent("marginal_tax_rate_pct", "Marginal tax rate (%)", 42.0),
        // Timeline
        FieldSpec::date("contract_date", "Contract date", 2025, 9, 1),
        FieldSpec::date("construction_end_date", "Construction end date", 2027, 12, 31),
        FieldSpec::integer("output_years", "Output horizon (years)", 30),
        // Added after the first rows were written
        FieldSpec::percent("property_value_growth_pct", "Property value growth (%)", 2.0),
        FieldSpec::flag("show_monthly_details", "Show monthly details", false),
        // Installment payment schedule, only the first `installment_count` entries apply
        FieldSpec::integer("installment_count", "Number of payment installments", 6),
        FieldSpec::ratio("installment_1_share", "Installment 1 share", 0.30),
        FieldSpec::integer(
            "installment_1_offset_months",
            "Installment 1 offset (months)",
            0,
        ),
        FieldSpec::ratio("installment_2_share", "Installment 2 share", 0.15),
        FieldSpec::integer(
            "installment_2_offset_months",
            "Installment 2 offset (months)",
            5,
        ),
        FieldSpec::ratio("installment_3_share", "Installment 3 share", 0.13),
        FieldSpec::integer(
            "installment_3_offset_months",
            "Installment 3 offset (months)",
            11,
        ),
        FieldSpec::ratio("installment_4_share", "Installment 4 share", 0.12),
        FieldSpec::integer(
            "installment_4_offset_months",
            "Installment 4 offset (months)",
            16,
        ),
        FieldSpec::ratio("installment_5_share", "Installment 5 share", 0.14),
        FieldSpec::integer(
            "installment_5_offset_months",
            "Installment 5 offset (months)",
            22,
        ),
        FieldSpec::ratio("installment_6_share", "Installment 6 share", 0.16),
        FieldSpec::integer(
            "installment_6_offset_months",
            "Installment 6 offset (months)",
            27,
        ),
        FieldSpec::ratio("installment_7_share", "Installment 7 share", 0.0),
        FieldSpec::integer(
            "installment_7_offset_months",
            "Installment 7 offset (months)",
            18,
        ),
        FieldSpec::ratio("installment_8_share", "Installment 8 share", 0.0),
        FieldSpec::integer(
            "installment_8_offset_months",
            "Installment 8 offset (months)",
            21,
        ),
        FieldSpec::ratio("installment_9_share", "Installment 9 share", 0.0),
        FieldSpec::integer(
            "installment_9_offset_months",
            "Installment 9 offset (months)",
            24,
        ),
        FieldSpec::ratio("installment_10_share", "Installment 10 share", 0.0),
        FieldSpec::integer(
            "installment_10_offset_months",
            "Installment 10 offset (months)",
            27,
        ),
        FieldSpec::ratio("installment_11_share", "Installment 11 share", 0.0),
        FieldSpec::integer(
            "installment_11_offset_months",
            "Installment 11 offset (months)",
            30,
        ),
        FieldSpec::ratio("installment_12_share", "Installment 12 share", 0.0),
        FieldSpec::integer(
            "installment_12_offset_months",
            "Installment 12 offset (months)",
            33,
        ),
    ]
});

pub fn field_spec(key: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|spec| spec.key == key)
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Unknown field '{0}'")]
    UnknownField(String),
    #[error("Field '{key}' expects a {expected} value, got {found}")]
    KindMismatch {
        key: String,
        expected: FieldKind,
        found: FieldKind,
    },
    #[error("Field '{0}' must be a finite number")]
    NonFinite(String),
    #[error("Could not read '{text}' as a {kind} for field '{key}'")]
    Unparsable {
        key: String,
        kind: FieldKind,
        text: String,
    },
}

/// One apartment's full input set. Every known field always holds a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    values: HashMap<&'static str, FieldValue>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            values: FIELDS.iter().map(|spec| (spec.key, spec.default)).collect(),
        }
    }
}

impl Configuration {
    pub fn get(&self, key: &str) -> Option<FieldValue> {
        self.values.get(key).copied()
    }

    pub fn set(&mut self, key: &str, value: FieldValue) -> Result<(), ConfigurationError> {
        let spec = field_spec(key).ok_or_else(|| ConfigurationError::UnknownField(key.into()))?;

        if value.kind() != spec.kind() {
            return Err(ConfigurationError::KindMismatch {
                key: key.into(),
                expected: spec.kind(),
                found: value.kind(),
            });
        }
        if !value.is_finite() {
            return Err(ConfigurationError::NonFinite(key.into()));
        }

        self.values.insert(spec.key, value);
        Ok(())
    }

    pub fn with(mut self, key: &str, value: FieldValue) -> Result<Self, ConfigurationError> {
        self.set(key, value)?;
        Ok(self)
    }

    /// Sets a field from its cell text, e.g. `set_from_text("contract_date", "2026-01-01")`.
    pub fn set_from_text(&mut self, key: &str, text: &str) -> Result<(), ConfigurationError> {
        let spec = field_spec(key).ok_or_else(|| ConfigurationError::UnknownField(key.into()))?;
        let value = spec
            .kind()
            .parse_cell(text)
            .ok_or_else(|| ConfigurationError::Unparsable {
                key: key.into(),
                kind: spec.kind(),
                text: text.into(),
            })?;
        self.set(key, value)
    }

    /// Fields in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, FieldValue)> + '_ {
        FIELDS
            .iter()
            .map(|spec| (spec.key, self.get(spec.key).unwrap_or(spec.default)))
    }
}
