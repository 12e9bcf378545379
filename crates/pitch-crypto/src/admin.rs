use subtle::ConstantTimeEq;

/// The process-wide admin secret that gates authoring operations.
#[derive(Clone)]
pub struct AdminKey(String);

impl AdminKey {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exact, constant-time equality. An empty configured key never matches.
    pub fn verify(&self, candidate: &str) -> bool {
        if self.0.is_empty() {
            return false;
        }
        self.0.as_bytes().ct_eq(candidate.as_bytes()).into()
    }
}

// Never print the secret.
impl std::fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminKey(..)")
    }
}
