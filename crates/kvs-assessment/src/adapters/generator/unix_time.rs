//! Time-based id generator.

use chrono::Utc;

use crate::domain::IdGenerator;

#[derive(Debug, Clone, Copy, Default)]
pub struct UnixTimeIdGenerator;

impl UnixTimeIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for UnixTimeIdGenerator {
    fn generate_id(&self) -> String {
        let nanos = Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_else(|| Utc::now().timestamp_micros());
        (nanos as u64).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_decimal_u64() {
        let id = UnixTimeIdGenerator::new().generate_id();
        assert!(id.parse::<u64>().is_ok());
    }
}
