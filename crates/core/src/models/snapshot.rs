use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::AssetField;

/// One calendar month's complete portfolio record.
///
/// Uniquely keyed by `month`, always normalized to the first day of the
/// month so that timezone drift on input can never split one month into
/// two records.
///
/// Liquidity accounts, the bond position and the pension fund store EUR
/// values directly. ETF and crypto fields store unit quantities and need a
/// EUR unit price to be valued. The optional `*_price` fields are per-asset
/// EUR prices captured when the snapshot was recorded; when present they
/// are authoritative and win over any fetched or estimated price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlySnapshot {
    /// First day of the snapshot's month.
    pub month: NaiveDate,

    // Cash flow for the month (EUR)
    pub fixed_income: f64,
    pub variable_income: f64,
    pub fixed_expenses: f64,
    pub variable_expenses: f64,

    // Liquidity accounts (EUR balances)
    pub ing: f64,
    pub bbva: f64,
    pub revolut: f64,
    pub directa: f64,

    // ETF holdings (unit quantities)
    pub mwrd: f64,
    pub smea: f64,
    pub xmme: f64,

    // Bond position (EUR)
    pub bond: f64,

    // Crypto holdings (unit quantities)
    pub eth: f64,
    pub sol: f64,
    pub link: f64,
    pub op: f64,
    pub usdt: f64,

    // Pension fund (EUR)
    pub cometa: f64,

    // Per-asset EUR unit prices captured at snapshot time
    #[serde(default)]
    pub mwrd_price: Option<f64>,
    #[serde(default)]
    pub smea_price: Option<f64>,
    #[serde(default)]
    pub xmme_price: Option<f64>,
    #[serde(default)]
    pub eth_price: Option<f64>,
    #[serde(default)]
    pub sol_price: Option<f64>,
    #[serde(default)]
    pub link_price: Option<f64>,
    #[serde(default)]
    pub op_price: Option<f64>,
}

/// Normalize any date to the first day of its month.
pub fn normalize_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Clamp a quantity: non-finite or negative input counts as zero.
fn sane(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

/// A stored price must be finite and strictly positive to be usable.
fn sane_price(price: Option<f64>) -> Option<f64> {
    price.filter(|p| p.is_finite() && *p > 0.0)
}

impl MonthlySnapshot {
    /// An empty snapshot for the given month (all quantities zero).
    pub fn new(month: NaiveDate) -> Self {
        Self {
            month: normalize_month(month),
            ..Self::default()
        }
    }

    /// Normalize the month key and clamp every numeric field.
    ///
    /// Applied on every upsert so a malformed record degrades to zeros
    /// instead of poisoning downstream aggregations.
    pub fn sanitized(mut self) -> Self {
        self.month = normalize_month(self.month);
        self.fixed_income = sane(self.fixed_income);
        self.variable_income = sane(self.variable_income);
        self.fixed_expenses = sane(self.fixed_expenses);
        self.variable_expenses = sane(self.variable_expenses);
        self.ing = sane(self.ing);
        self.bbva = sane(self.bbva);
        self.revolut = sane(self.revolut);
        self.directa = sane(self.directa);
        self.mwrd = sane(self.mwrd);
        self.smea = sane(self.smea);
        self.xmme = sane(self.xmme);
        self.bond = sane(self.bond);
        self.eth = sane(self.eth);
        self.sol = sane(self.sol);
        self.link = sane(self.link);
        self.op = sane(self.op);
        self.usdt = sane(self.usdt);
        self.cometa = sane(self.cometa);
        self.mwrd_price = sane_price(self.mwrd_price);
        self.smea_price = sane_price(self.smea_price);
        self.xmme_price = sane_price(self.xmme_price);
        self.eth_price = sane_price(self.eth_price);
        self.sol_price = sane_price(self.sol_price);
        self.link_price = sane_price(self.link_price);
        self.op_price = sane_price(self.op_price);
        self
    }

    /// The stored quantity (or EUR balance) for a holding field.
    pub fn quantity(&self, field: AssetField) -> f64 {
        match field {
            AssetField::Ing => self.ing,
            AssetField::Bbva => self.bbva,
            AssetField::Revolut => self.revolut,
            AssetField::Directa => self.directa,
            AssetField::Mwrd => self.mwrd,
            AssetField::Smea => self.smea,
            AssetField::Xmme => self.xmme,
            AssetField::Bond => self.bond,
            AssetField::Eth => self.eth,
            AssetField::Sol => self.sol,
            AssetField::Link => self.link,
            AssetField::Op => self.op,
            AssetField::Usdt => self.usdt,
            AssetField::Cometa => self.cometa,
        }
    }

    /// The per-asset EUR price captured at snapshot time, if any.
    /// Only the priced fields (ETFs and free-floating cryptos) can carry one.
    pub fn stored_price(&self, field: AssetField) -> Option<f64> {
        match field {
            AssetField::Mwrd => self.mwrd_price,
            AssetField::Smea => self.smea_price,
            AssetField::Xmme => self.xmme_price,
            AssetField::Eth => self.eth_price,
            AssetField::Sol => self.sol_price,
            AssetField::Link => self.link_price,
            AssetField::Op => self.op_price,
            _ => None,
        }
    }

    /// Total income recorded for the month.
    pub fn income_total(&self) -> f64 {
        self.fixed_income + self.variable_income
    }

    /// Total expenses recorded for the month.
    pub fn expense_total(&self) -> f64 {
        self.fixed_expenses + self.variable_expenses
    }

    /// The snapshot's calendar year.
    pub fn year(&self) -> i32 {
        self.month.year()
    }
}
