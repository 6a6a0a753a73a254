//! Session id generators.
//!
//! Two strategies coexist: cryptographically random and time based. Both
//! render a decimal `u64`, the id format the storage and wire layers carry.

mod crypto;
mod unix_time;

pub use crypto::CryptoIdGenerator;
pub use unix_time::UnixTimeIdGenerator;
