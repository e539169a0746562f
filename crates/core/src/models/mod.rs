pub mod entry;
pub mod ledger;
pub mod price;
pub mod settings;
pub mod snapshot;
pub mod summary;
