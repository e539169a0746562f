//! Encrypted at-rest persistence for the ledger.
//!
//! A saved file is a small self-describing header (magic, format version,
//! KDF parameters, salt, nonce) followed by an AES-256-GCM ciphertext of
//! the bincode-serialized [`Ledger`](crate::models::ledger::Ledger). The
//! key is derived from the user's password with Argon2id; the parameters
//! live in the header so they can be raised in a later format version
//! without breaking old files.

pub mod encryption;
pub mod format;
pub mod manager;

pub use manager::StorageManager;
