// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Sources of the current time.
//!
//! The [TokenCache](crate::token_cache::TokenCache) compares token
//! expirations against a [Clock]. Production code uses [SystemClock]; tests
//! (or applications that need deterministic behavior) can freeze time with
//! [FixedClock].

use chrono::{DateTime, Utc};

/// A source of the current instant.
///
/// Implementations must be cheap and must not block: the token cache calls
/// [Clock::now] while holding its lock.
pub trait Clock: std::fmt::Debug + Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// A [Clock] backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A [Clock] that always returns the same instant.
///
/// ```
/// # use cached_token_auth::clock::{Clock, FixedClock};
/// # use chrono::{TimeZone, Utc};
/// let now = Utc.with_ymd_and_hms(2018, 1, 19, 22, 0, 0).unwrap();
/// let clock = FixedClock::new(now);
/// assert_eq!(clock.now(), now);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    /// Creates a clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn fixed_clock_does_not_advance() {
        let now = Utc.with_ymd_and_hms(2018, 1, 19, 22, 0, 0).unwrap();
        let clock = FixedClock::new(now);
        assert_eq!(clock.now(), now);
        assert_eq!(clock.now(), now);
    }

    #[test]
    fn system_clock_tracks_real_time() {
        let before = Utc::now();
        let got = SystemClock.now();
        let after = Utc::now();
        assert!(before <= got && got <= after, "{before} {got} {after}");
        assert!(after - before < Duration::seconds(5));
    }
}
