//! Per-user throttle on sending friend requests
//!
//! One GCRA bucket per sender, keyed by [`UserId`]. A bucket holds
//! `per_minute` slots and regains one slot every minute.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{
    clock::{Clock, DefaultClock},
    middleware::NoOpMiddleware,
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter,
};
use tracing::debug;

use amity_core::{AmityError, Result, UserId};

const WINDOW: Duration = Duration::from_secs(60);

type KeyedLimiter<C> =
    RateLimiter<UserId, DefaultKeyedStateStore<UserId>, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Limits how often each user may send friend requests
pub struct FriendRequestThrottle<C: Clock = DefaultClock> {
    limiter: KeyedLimiter<C>,
    clock: C,
}

impl FriendRequestThrottle {
    pub fn new(per_minute: u32) -> Self {
        Self::with_clock(per_minute, DefaultClock::default())
    }
}

impl<C: Clock> FriendRequestThrottle<C> {
    pub fn with_clock(per_minute: u32, clock: C) -> Self {
        let rate = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(WINDOW)
            .map(|quota| quota.allow_burst(rate))
            .unwrap_or_else(|| Quota::per_minute(rate));
        Self {
            limiter: RateLimiter::new(quota, DefaultKeyedStateStore::default(), &clock),
            clock,
        }
    }

    /// Take one slot for `user`, or report how long until one frees up
    pub fn check(&self, user: UserId) -> Result<()> {
        match self.limiter.check_key(&user) {
            Ok(()) => Ok(()),
            Err(not_until) => {
                let wait = not_until.wait_time_from(self.clock.now());
                let retry_after_secs = whole_seconds(wait);
                debug!(user = %user, retry_after_secs, "Friend request throttled");
                Err(AmityError::RateLimited { retry_after_secs })
            }
        }
    }

    /// Drop buckets that have fully refilled
    pub fn sweep(&self) {
        self.limiter.retain_recent();
    }

    /// Number of users currently tracked
    pub fn tracked(&self) -> usize {
        self.limiter.len()
    }
}

fn whole_seconds(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}
