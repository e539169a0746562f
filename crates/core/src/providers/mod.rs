pub mod registry;
pub mod traits;

// API provider implementations
pub mod coincap;
pub mod frankfurter;
#[cfg(not(target_arch = "wasm32"))]
pub mod yahoo_etf;
