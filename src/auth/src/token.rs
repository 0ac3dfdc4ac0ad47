// Copyright 2024 Google LLC
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

//! Types and functions to work with bearer tokens.

use crate::errors::SourceError;
use chrono::{DateTime, Utc};

/// Represents a bearer token and the instant it stops being usable.
///
/// Tokens are plain values. A refresh produces a new `Token`, it never
/// modifies the one already held by a cache.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    /// The actual token string.
    ///
    /// This is the value sent in the `Authorization: Bearer` header.
    pub token: String,

    /// The instant at which the token expires.
    ///
    /// A token is usable while `expires_at` is strictly after the current
    /// time. A token whose expiration equals "now" is already expired.
    pub expires_at: DateTime<Utc>,
}

impl Token {
    /// Creates a new token.
    pub fn new<T: Into<String>>(token: T, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Returns true if the token can no longer be used at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("token", &"[censored]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Produces fresh tokens.
///
/// Implemented by whatever authentication mechanism is in play: a service
/// account file, an OIDC exchange, an external helper process, etc. The
/// [TokenCache](crate::token_cache::TokenCache) treats implementations as
/// opaque and possibly slow.
///
/// Implementations must be safe to call repeatedly. Returning `Ok(None)`
/// violates the contract: the cache reports it as
/// [CacheError::NilToken](crate::errors::CacheError::NilToken).
#[async_trait::async_trait]
pub trait TokenSource: std::fmt::Debug + Send + Sync {
    /// Fetches a new token.
    async fn token(&self) -> Result<Option<Token>, SourceError>;
}

#[async_trait::async_trait]
impl<T> TokenSource for std::sync::Arc<T>
where
    T: TokenSource + ?Sized,
{
    async fn token(&self) -> Result<Option<Token>, SourceError> {
        (**self).token().await
    }
}
