//! Cryptographically random id generator.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::domain::IdGenerator;

#[derive(Debug, Clone, Copy, Default)]
pub struct CryptoIdGenerator;

impl CryptoIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for CryptoIdGenerator {
    fn generate_id(&self) -> String {
        OsRng.next_u64().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_decimal_u64() {
        let id = CryptoIdGenerator::new().generate_id();
        assert!(id.parse::<u64>().is_ok());
    }

    #[test]
    fn consecutive_ids_differ() {
        let generator = CryptoIdGenerator::new();
        assert_ne!(generator.generate_id(), generator.generate_id());
    }
}
