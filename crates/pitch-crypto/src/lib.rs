//! Pitch credential checks.
//!
//! Two checks that are never interchanged:
//! - `admin`: the process-wide admin key, compared in constant time
//! - `password`: per-proposal passwords, stored as salted Argon2id PHC strings
//!
//! Password hashing is deliberately slow. Callers on an async runtime must run
//! `PasswordHasher::hash` and `PasswordHasher::verify` on the blocking pool.

pub mod admin;
pub mod password;

pub use admin::AdminKey;
pub use password::{CryptoError, PasswordHasher, WorkFactor};
