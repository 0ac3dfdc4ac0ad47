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

//! An expiry-aware cache in front of a [TokenSource].

use crate::clock::{Clock, SystemClock};
use crate::errors::CacheError;
use crate::token::{Token, TokenSource};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Returns the current bearer token string, fetching a new one if needed.
///
/// [AuthenticatingTransport](crate::authenticating::AuthenticatingTransport)
/// consumes this trait rather than a concrete cache, so applications can
/// plug in their own caching policy.
#[async_trait::async_trait]
pub trait CachedTokenProvider: std::fmt::Debug + Send + Sync {
    /// Returns a token string that has not expired.
    async fn token(&self) -> Result<String, CacheError>;
}

/// Caches the most recent token from a [TokenSource].
///
/// The cache holds at most one token. While that token has not expired it is
/// returned without consulting the source. Once it expires (or before any
/// token was fetched) the next caller fetches a new one.
///
/// A single lock guards the check, the fetch, and the write-back. Callers
/// that arrive while a refresh is in progress wait for it and then find the
/// fresh token, so concurrent misses result in one call to the source.
///
/// Cloning a `TokenCache` is cheap, and all clones share the same token.
///
/// # Example
/// ```
/// # use cached_token_auth::errors::SourceError;
/// # use cached_token_auth::token::{Token, TokenSource};
/// # use cached_token_auth::token_cache::{CachedTokenProvider, TokenCache};
/// # use chrono::{Duration, Utc};
/// #[derive(Debug)]
/// struct MySource;
///
/// #[async_trait::async_trait]
/// impl TokenSource for MySource {
///     async fn token(&self) -> Result<Option<Token>, SourceError> {
///         Ok(Some(Token::new("my-token", Utc::now() + Duration::hours(1))))
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let cache = TokenCache::new(MySource);
/// assert_eq!(cache.token().await?, "my-token");
/// # Ok::<(), cached_token_auth::errors::CacheError>(())
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct TokenCache {
    // The most recently fetched token, if any.
    token: Arc<Mutex<Option<Token>>>,

    // Fetches new tokens when the cached one is missing or expired.
    source: Arc<dyn TokenSource>,

    clock: Arc<dyn Clock>,
}

impl TokenCache {
    /// Creates an empty cache that checks expirations against the system
    /// clock.
    pub fn new<T>(source: T) -> Self
    where
        T: TokenSource + 'static,
    {
        Self::with_clock(source, SystemClock)
    }

    /// Creates an empty cache that checks expirations against `clock`.
    pub fn with_clock<T, C>(source: T, clock: C) -> Self
    where
        T: TokenSource + 'static,
        C: Clock + 'static,
    {
        Self::from_parts(Arc::new(source), Arc::new(clock))
    }

    pub(crate) fn from_parts(source: Arc<dyn TokenSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            token: Arc::new(Mutex::new(None)),
            source,
            clock,
        }
    }
}

#[async_trait::async_trait]
impl CachedTokenProvider for TokenCache {
    async fn token(&self) -> Result<String, CacheError> {
        // Held until return, including the early returns on errors.
        let mut cached = self.token.lock().await;

        let now = self.clock.now();
        if let Some(token) = cached.as_ref().filter(|t| !t.is_expired(now)) {
            tracing::trace!(expires_at = %token.expires_at, "using cached token");
            return Ok(token.token.clone());
        }

        tracing::debug!("cached token is missing or expired, fetching a new token");
        let token = self
            .source
            .token()
            .await
            .map_err(CacheError::Fetch)?
            .ok_or(CacheError::NilToken)?;
        tracing::debug!(expires_at = %token.expires_at, "fetched new token");

        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::errors::SourceError;
    use crate::token::tests::MockTokenSource;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use static_assertions::assert_impl_all;
    use std::sync::Mutex as StdMutex;

    const UNEXPIRED_TOKEN: &str = "mock-unexpired-token-string";
    const EXPIRED_TOKEN: &str = "mock-expired-token-string";

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    assert_impl_all!(TokenCache: Clone, Send, Sync);

    fn once_was_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 1, 19, 22, 0, 0).unwrap()
    }

    fn once_was_the_future() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 1, 19, 23, 30, 0).unwrap()
    }

    fn still_is_the_past() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 1, 19, 21, 30, 0).unwrap()
    }

    fn unexpired_token() -> Token {
        Token::new(UNEXPIRED_TOKEN, once_was_the_future())
    }

    fn expired_token() -> Token {
        Token::new(EXPIRED_TOKEN, still_is_the_past())
    }

    // Builds a cache that already holds `cached`, with time frozen at
    // `once_was_now()`.
    fn seeded_cache<T: TokenSource + 'static>(cached: Option<Token>, source: T) -> TokenCache {
        let cache = TokenCache::with_clock(source, FixedClock::new(once_was_now()));
        *cache.token.try_lock().unwrap() = cached;
        cache
    }

    async fn cached_token(cache: &TokenCache) -> Option<Token> {
        cache.token.lock().await.clone()
    }

    #[tokio::test]
    async fn returns_cached_token_when_not_expired() -> TestResult {
        let mut mock = MockTokenSource::new();
        mock.expect_token().never();

        let cache = seeded_cache(Some(unexpired_token()), mock);
        assert_eq!(cache.token().await?, UNEXPIRED_TOKEN);

        // A second call is also served from the cache.
        assert_eq!(cache.token().await?, UNEXPIRED_TOKEN);
        Ok(())
    }

    #[tokio::test]
    async fn returns_new_token_from_source_when_expired() -> TestResult {
        let mut mock = MockTokenSource::new();
        mock.expect_token()
            .times(1)
            .return_once(|| Ok(Some(unexpired_token())));

        let cache = seeded_cache(Some(expired_token()), mock);
        assert_eq!(cache.token().await?, UNEXPIRED_TOKEN);

        // The new token is cached, the mock would panic on a second fetch.
        assert_eq!(cache.token().await?, UNEXPIRED_TOKEN);
        assert_eq!(cached_token(&cache).await, Some(unexpired_token()));
        Ok(())
    }

    #[tokio::test]
    async fn refreshes_token_expiring_exactly_now() -> TestResult {
        let mut mock = MockTokenSource::new();
        mock.expect_token()
            .times(1)
            .return_once(|| Ok(Some(unexpired_token())));

        let cache = seeded_cache(Some(Token::new(EXPIRED_TOKEN, once_was_now())), mock);
        assert_eq!(cache.token().await?, UNEXPIRED_TOKEN);
        Ok(())
    }

    #[tokio::test]
    async fn fetches_initial_token() -> TestResult {
        let mut mock = MockTokenSource::new();
        mock.expect_token()
            .times(1)
            .return_once(|| Ok(Some(unexpired_token())));

        let cache = seeded_cache(None, mock);
        let first = cache.token().await?;
        let second = cache.token().await?;
        assert_eq!(first, UNEXPIRED_TOKEN);
        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn returns_errors_fetching_new_token() {
        let mut mock = MockTokenSource::new();
        mock.expect_token()
            .times(2)
            .returning(|| Err(SourceError::from_msg("token store error")));

        let cache = seeded_cache(Some(expired_token()), mock);
        let err = cache.token().await.unwrap_err();
        assert!(matches!(err, CacheError::Fetch(_)), "{err:?}");
        assert_eq!(
            err.to_string(),
            "could not fetch new token: token store error"
        );

        // The failure is not cached and the held token is unchanged, so the
        // next call fetches again.
        assert_eq!(cached_token(&cache).await, Some(expired_token()));
        let err = cache.token().await.unwrap_err();
        assert!(
            err.to_string().contains("could not fetch new token:"),
            "{err}"
        );
        assert_eq!(cached_token(&cache).await, Some(expired_token()));
    }

    #[tokio::test]
    async fn returns_error_when_source_returns_no_token() {
        let mut mock = MockTokenSource::new();
        mock.expect_token().times(1).return_once(|| Ok(None));

        let cache = seeded_cache(Some(expired_token()), mock);
        let err = cache.token().await.unwrap_err();
        assert!(matches!(err, CacheError::NilToken), "{err:?}");
        assert_eq!(err.to_string(), "nil token returned by source");
        assert_eq!(cached_token(&cache).await, Some(expired_token()));
    }

    #[tokio::test]
    async fn recovers_after_failed_fetch() -> TestResult {
        let mut seq = mockall::Sequence::new();
        let mut mock = MockTokenSource::new();
        mock.expect_token()
            .times(1)
            .in_sequence(&mut seq)
            .return_once(|| Err(SourceError::from_msg("transient")));
        mock.expect_token()
            .times(1)
            .in_sequence(&mut seq)
            .return_once(|| Ok(Some(unexpired_token())));

        let cache = seeded_cache(None, mock);
        assert!(cache.token().await.is_err());
        assert_eq!(cache.token().await?, UNEXPIRED_TOKEN);
        Ok(())
    }

    // A clock that tests can move forward.
    #[derive(Debug)]
    struct ManualClock(StdMutex<DateTime<Utc>>);

    impl ManualClock {
        fn advance(&self, d: Duration) {
            *self.0.lock().unwrap() += d;
        }
    }

    impl Clock for Arc<ManualClock> {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    #[tokio::test]
    async fn refreshes_after_clock_crosses_expiration() -> TestResult {
        let clock = Arc::new(ManualClock(StdMutex::new(once_was_now())));
        let valid_for = Duration::hours(1);

        let mut seq = mockall::Sequence::new();
        let mut mock = MockTokenSource::new();
        mock.expect_token()
            .times(1)
            .in_sequence(&mut seq)
            .return_once(move || Ok(Some(Token::new("initial-token", once_was_now() + valid_for))));
        mock.expect_token()
            .times(1)
            .in_sequence(&mut seq)
            .return_once(move || {
                Ok(Some(Token::new(
                    "refresh-token",
                    once_was_now() + valid_for * 2,
                )))
            });

        let cache = TokenCache::with_clock(mock, clock.clone());
        assert_eq!(cache.token().await?, "initial-token");

        clock.advance(valid_for - Duration::seconds(1));
        assert_eq!(cache.token().await?, "initial-token");

        clock.advance(Duration::seconds(1));
        assert_eq!(cache.token().await?, "refresh-token");
        Ok(())
    }

    #[derive(Clone, Debug)]
    struct FakeTokenSource {
        result: Result<Option<Token>, SourceError>,
        delay: std::time::Duration,
        calls: Arc<StdMutex<i32>>,
    }

    impl FakeTokenSource {
        fn new(result: Result<Option<Token>, SourceError>, delay: std::time::Duration) -> Self {
            Self {
                result,
                delay,
                calls: Arc::new(StdMutex::new(0)),
            }
        }

        fn calls(&self) -> i32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl TokenSource for FakeTokenSource {
        async fn token(&self) -> Result<Option<Token>, SourceError> {
            // Give the waiters in a thundering herd time to pile up.
            tokio::time::sleep(self.delay).await;
            *self.calls.lock().unwrap() += 1;
            self.result.clone()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn thundering_herd_fetches_once() {
        let source = FakeTokenSource::new(
            Ok(Some(unexpired_token())),
            std::time::Duration::from_millis(50),
        );
        let cache = TokenCache::with_clock(source.clone(), FixedClock::new(once_was_now()));

        let tasks = (0..100)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.token().await })
            })
            .collect::<Vec<_>>();

        for task in tasks {
            let actual = task.await.unwrap();
            assert!(actual.is_ok(), "{actual:?}");
            assert_eq!(actual.unwrap(), UNEXPIRED_TOKEN);
        }

        // Every caller after the first waits on the lock and then finds the
        // fresh token.
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn thundering_herd_failures_are_not_cached() {
        let source = FakeTokenSource::new(
            Err(SourceError::from_msg("epic fail")),
            std::time::Duration::ZERO,
        );
        let cache = TokenCache::with_clock(source.clone(), FixedClock::new(once_was_now()));

        let tasks = (0..10)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.token().await })
            })
            .collect::<Vec<_>>();

        for task in tasks {
            let actual = task.await.unwrap();
            let e = actual.expect_err("the source always fails").to_string();
            assert!(e.contains("epic fail"), "{e}");
        }

        assert_eq!(source.calls(), 10);
    }
}
