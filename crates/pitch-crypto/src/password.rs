use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
    password_hash::{SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid work factor: {0}")]
    WorkFactor(argon2::Error),

    #[error("password hashing failed: {0}")]
    Hash(argon2::password_hash::Error),
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkFactor {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for WorkFactor {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl WorkFactor {
    /// Smallest parameters Argon2 accepts.
    pub fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }
}

/// Hashes and verifies per-proposal passwords.
///
/// New hashes use the configured work factor. Verification reads the
/// parameters embedded in the stored PHC string, so raising the work factor
/// later does not lock out existing proposals.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

impl PasswordHasher {
    pub fn new(work: WorkFactor) -> Result<Self, CryptoError> {
        let params = Params::new(work.memory_kib, work.iterations, work.parallelism, None)
            .map_err(CryptoError::WorkFactor)?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password with a fresh random salt. Returns a PHC string.
    pub fn hash(&self, password: &str) -> Result<String, CryptoError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(CryptoError::Hash)?;
        Ok(hash.to_string())
    }

    /// Check a candidate against a stored hash.
    ///
    /// Argon2 PHC strings are checked with this hasher. Rows written by older
    /// releases carry bcrypt hashes (`$2a$`, `$2b$`, `$2y$`), which are checked
    /// with bcrypt. A malformed stored hash and a wrong password are
    /// indistinguishable: both return `false`.
    pub fn verify(&self, candidate: &str, stored_hash: &str) -> bool {
        if is_bcrypt(stored_hash) {
            return bcrypt::verify(candidate, stored_hash).unwrap_or(false);
        }
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            return false;
        };
        self.argon2
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }
}

fn is_bcrypt(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"]
        .iter()
        .any(|prefix| hash.starts_with(prefix))
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}
