use crate::config::{self, Category, FieldKind, AssetField, CATEGORY_MAP, USDT_PEG_EUR};
use crate::models::price::PriceBook;
use crate::models::snapshot::MonthlySnapshot;
use crate::models::summary::CategoryTotals;

/// Turns one monthly snapshot into per-category EUR totals.
///
/// Walks [`CATEGORY_MAP`] — no field is ever valued outside its category,
/// so `sum(category totals) == grand total` holds by construction. Pure
/// and deterministic: all prices come from the snapshot itself, the
/// passed-in price book, or static configuration.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Value a snapshot. A missing snapshot yields all-zero totals, never
    /// an error — the first request against an empty ledger is a valid one.
    pub fn valuate(&self, snapshot: Option<&MonthlySnapshot>, book: &PriceBook) -> CategoryTotals {
        let mut totals = CategoryTotals::default();
        let Some(snapshot) = snapshot else {
            return totals;
        };

        for (category, fields) in CATEGORY_MAP {
            for field in *fields {
                let quantity = snapshot.quantity(*field);
                if quantity == 0.0 {
                    continue;
                }
                totals.add(*category, quantity * self.unit_price(snapshot, *field, book));
            }
        }

        totals.total = Category::ALL.iter().map(|c| totals.get(*c)).sum();
        totals
    }

    /// EUR unit price for one field.
    ///
    /// Resolution order: EUR-native quantities are their own value; a price
    /// stored in the snapshot is authoritative; the stable-coin uses its
    /// configured book value; otherwise the fetched price for the month,
    /// then the static estimate, then zero — a missing price degrades one
    /// term of the sum, it never fails the valuation.
    fn unit_price(&self, snapshot: &MonthlySnapshot, field: AssetField, book: &PriceBook) -> f64 {
        match field.kind() {
            FieldKind::EurDenominated => 1.0,
            FieldKind::StableCoin => USDT_PEG_EUR,
            FieldKind::Etf | FieldKind::Crypto => snapshot
                .stored_price(field)
                .or_else(|| book.price(field, snapshot.month))
                .or_else(|| config::estimated_price(field))
                .unwrap_or(0.0),
        }
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
