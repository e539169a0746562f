pub mod currency_service;
pub mod ledger_service;
pub mod price_service;
pub mod rollup_service;
pub mod smoothing_service;
pub mod summary_service;
pub mod valuation_service;
