use chrono::{DateTime, SubsecRound, Utc};

/// Time source for token issuance and expiry checks.
///
/// Implementations must return UTC with sub-second precision truncated (not
/// rounded), so repeated reads within the same second compare equal and the
/// `issuedAt` claim stays byte-stable for a given second.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock, truncated to whole seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(0)
    }
}
