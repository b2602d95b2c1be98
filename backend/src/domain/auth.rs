//! Credential verification seam.
//!
//! The hashing scheme is owned by the authentication collaborator; the core
//! only asks "does this plaintext match the stored hash".

use sha2::{Digest, Sha256};

pub trait PasswordVerifier: Send + Sync {
    fn hash(&self, plain: &str) -> String;
    fn verify(&self, plain: &str, stored_hash: &str) -> bool;
}

/// Unsalted lowercase-hex SHA-256, matching the hashes already stored in
/// existing `users` tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Verifier;

impl PasswordVerifier for Sha256Verifier {
    fn hash(&self, plain: &str) -> String {
        hex::encode(Sha256::digest(plain.as_bytes()))
    }

    fn verify(&self, plain: &str, stored_hash: &str) -> bool {
        self.hash(plain).eq_ignore_ascii_case(stored_hash.trim())
    }
}
