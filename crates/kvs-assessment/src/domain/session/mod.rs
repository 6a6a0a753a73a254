//! Session lifecycle: state machine, aggregate, and result.

mod aggregate;
mod result;
mod state;

pub use aggregate::{DailyQuotaGuard, IdGenerator, Session};
pub use result::SessionResult;
pub use state::{SessionState, ACTIVE_STATE, COMPLETED_STATE, INIT_STATE, PASS_THRESHOLD};
