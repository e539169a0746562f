use serde::{Deserialize, Serialize};

/// Reporting category for a portfolio holding.
///
/// Every aggregation (totals, allocation, trends) is computed per category
/// by walking [`CATEGORY_MAP`] — adding a new asset means one edit there,
/// never a change in the engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Liquidity,
    Stock,
    Bond,
    Pension,
    Crypto,
}

impl Category {
    /// All categories in reporting order.
    pub const ALL: [Category; 5] = [
        Category::Liquidity,
        Category::Stock,
        Category::Bond,
        Category::Pension,
        Category::Crypto,
    ];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Liquidity => write!(f, "Liquidity"),
            Category::Stock => write!(f, "Stock"),
            Category::Bond => write!(f, "Bond"),
            // Display label kept from the original dashboard
            Category::Pension => write!(f, "Fondo Pensione"),
            Category::Crypto => write!(f, "Crypto"),
        }
    }
}

/// How a holding field turns into EUR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// The stored quantity already IS the EUR value (cash accounts, bond, pension).
    EurDenominated,
    /// Unit quantity of an exchange-traded fund; needs a EUR quote.
    Etf,
    /// Unit quantity of a free-floating crypto asset; quoted in USD.
    Crypto,
    /// Stable-coin valued at a fixed configured EUR price.
    StableCoin,
}

/// One holding field of a monthly snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetField {
    // Liquidity accounts (EUR balances)
    Ing,
    Bbva,
    Revolut,
    Directa,
    // ETF holdings (unit quantities)
    Mwrd,
    Smea,
    Xmme,
    // Bond position (EUR)
    Bond,
    // Crypto holdings (unit quantities)
    Eth,
    Sol,
    Link,
    Op,
    Usdt,
    // Pension fund (EUR)
    Cometa,
}

impl AssetField {
    /// Every holding field, in snapshot order.
    pub const ALL: [AssetField; 14] = [
        AssetField::Ing,
        AssetField::Bbva,
        AssetField::Revolut,
        AssetField::Directa,
        AssetField::Mwrd,
        AssetField::Smea,
        AssetField::Xmme,
        AssetField::Bond,
        AssetField::Eth,
        AssetField::Sol,
        AssetField::Link,
        AssetField::Op,
        AssetField::Usdt,
        AssetField::Cometa,
    ];

    /// Lowercase field identifier, matching the snapshot column names.
    pub fn symbol(&self) -> &'static str {
        match self {
            AssetField::Ing => "ing",
            AssetField::Bbva => "bbva",
            AssetField::Revolut => "revolut",
            AssetField::Directa => "directa",
            AssetField::Mwrd => "mwrd",
            AssetField::Smea => "smea",
            AssetField::Xmme => "xmme",
            AssetField::Bond => "bond",
            AssetField::Eth => "eth",
            AssetField::Sol => "sol",
            AssetField::Link => "link",
            AssetField::Op => "op",
            AssetField::Usdt => "usdt",
            AssetField::Cometa => "cometa",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            AssetField::Ing
            | AssetField::Bbva
            | AssetField::Revolut
            | AssetField::Directa
            | AssetField::Bond
            | AssetField::Cometa => FieldKind::EurDenominated,
            AssetField::Mwrd | AssetField::Smea | AssetField::Xmme => FieldKind::Etf,
            AssetField::Eth | AssetField::Sol | AssetField::Link | AssetField::Op => {
                FieldKind::Crypto
            }
            AssetField::Usdt => FieldKind::StableCoin,
        }
    }
}

impl std::fmt::Display for AssetField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Category → fields mapping, in reporting order.
///
/// Contract: the lists partition [`AssetField::ALL`] — every field appears
/// in exactly one category.
pub const CATEGORY_MAP: &[(Category, &[AssetField])] = &[
    (
        Category::Liquidity,
        &[
            AssetField::Ing,
            AssetField::Bbva,
            AssetField::Revolut,
            AssetField::Directa,
        ],
    ),
    (
        Category::Stock,
        &[AssetField::Mwrd, AssetField::Smea, AssetField::Xmme],
    ),
    (Category::Bond, &[AssetField::Bond]),
    (Category::Pension, &[AssetField::Cometa]),
    (
        Category::Crypto,
        &[
            AssetField::Eth,
            AssetField::Sol,
            AssetField::Link,
            AssetField::Op,
            AssetField::Usdt,
        ],
    ),
];

/// The category a field belongs to, or `None` for an unmapped field.
pub fn category_of(field: AssetField) -> Option<Category> {
    CATEGORY_MAP
        .iter()
        .find(|(_, fields)| fields.contains(&field))
        .map(|(category, _)| *category)
}

/// Book value of one USDT in EUR.
///
/// Deliberately below market parity — the dashboard carries the stable-coin
/// at a conservative book value, not at its 1.00 peg.
pub const USDT_PEG_EUR: f64 = 0.90;

/// Static EUR unit-price estimates, used when a snapshot carries no stored
/// price and no fetched price is available for the month.
pub fn estimated_price(field: AssetField) -> Option<f64> {
    match field {
        AssetField::Mwrd => Some(85.5),
        AssetField::Smea => Some(32.2),
        AssetField::Xmme => Some(40.1),
        AssetField::Eth => Some(2450.0),
        AssetField::Sol => Some(110.0),
        AssetField::Link => Some(14.5),
        AssetField::Op => Some(2.1),
        _ => None,
    }
}

/// Exchange listing used to quote an ETF holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EtfListing {
    /// Yahoo Finance ticker.
    pub ticker: &'static str,
    /// The listing quotes in minor currency units (pence); raw closes
    /// must be divided by 100 to get major units.
    pub minor_units: bool,
}

/// Listing table for the ETF holdings.
pub fn etf_listing(field: AssetField) -> Option<EtfListing> {
    match field {
        AssetField::Mwrd => Some(EtfListing {
            ticker: "MWRD.MI",
            minor_units: false,
        }),
        // London listing, quoted in GBp
        AssetField::Smea => Some(EtfListing {
            ticker: "SMEA.L",
            minor_units: true,
        }),
        AssetField::Xmme => Some(EtfListing {
            ticker: "XMME.DE",
            minor_units: false,
        }),
        _ => None,
    }
}

/// Whether a Yahoo ticker in the listing table quotes in minor units.
pub fn quoted_in_minor_units(ticker: &str) -> bool {
    AssetField::ALL
        .iter()
        .filter_map(|f| etf_listing(*f))
        .any(|l| l.ticker == ticker && l.minor_units)
}

/// Uppercase exchange symbol for a free-floating crypto holding.
pub fn crypto_symbol(field: AssetField) -> Option<&'static str> {
    match field {
        AssetField::Eth => Some("ETH"),
        AssetField::Sol => Some("SOL"),
        AssetField::Link => Some("LINK"),
        AssetField::Op => Some("OP"),
        _ => None,
    }
}

/// Yearly-average USD→EUR rates (ECB data), used when the live rate source
/// is unreachable.
pub fn fallback_usd_eur(year: i32) -> f64 {
    match year {
        2015 => 0.9015,
        2016 => 0.9034,
        2017 => 0.8852,
        2018 => 0.8469,
        2019 => 0.8933,
        2020 => 0.8755,
        2021 => 0.8455,
        2022 => 0.9504,
        2023 => 0.9251,
        2024 => 0.9264,
        2025 => 0.95,
        _ => 0.92,
    }
}

/// Pause between consecutive ETF quote lookups (Yahoo politeness).
pub const ETF_FETCH_DELAY_MS: u64 = 1500;
