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

//! Auth providers: the glue between a [TokenSource] and HTTP clients.
//!
//! An HTTP client asks its [AuthProvider] to wrap the client's transport once,
//! when the client is configured. Every transport wrapped by the same
//! provider shares the provider's [TokenCache], so the client fetches a token
//! once and reuses it until it expires.
//!
//! Example usage:
//!
//! ```
//! # use cached_token_auth::errors::SourceError;
//! # use cached_token_auth::provider::{AuthProvider, Builder};
//! # use cached_token_auth::token::{Token, TokenSource};
//! # use cached_token_auth::transport::Transport;
//! # use std::sync::Arc;
//! # #[derive(Debug)]
//! # struct MySource;
//! # #[async_trait::async_trait]
//! # impl TokenSource for MySource {
//! #     async fn token(&self) -> Result<Option<Token>, SourceError> {
//! #         Ok(None)
//! #     }
//! # }
//! # use cached_token_auth::build_errors;
//! fn configure(base: Arc<dyn Transport>) -> build_errors::Result<Arc<dyn Transport>> {
//!     let provider = Builder::new().with_token_source(MySource).build()?;
//!     Ok(provider.wrap_transport(base))
//! }
//! ```

use crate::authenticating::AuthenticatingTransport;
use crate::build_errors::{Error as BuildError, Result as BuildResult};
use crate::clock::{Clock, SystemClock};
use crate::token::TokenSource;
use crate::token_cache::TokenCache;
use crate::transport::Transport;
use std::sync::Arc;

/// Attaches credentials to the requests of an HTTP client.
pub trait AuthProvider: std::fmt::Debug + Send + Sync {
    /// Returns a transport that authenticates requests and then sends them
    /// with `transport`.
    fn wrap_transport(&self, transport: Arc<dyn Transport>) -> Arc<dyn Transport>;

    /// Runs an interactive login flow, if the provider supports one.
    fn login(&self) -> Result<(), ProviderError>;
}

/// The error type for [AuthProvider] operations.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ProviderError {
    /// The provider does not support the operation.
    #[error("not implemented")]
    NotImplemented,
}

/// An [AuthProvider] backed by an external [TokenSource].
///
/// Use [Builder] to create instances of this type.
#[derive(Clone, Debug)]
pub struct ExternalAuthProvider {
    cache: TokenCache,
}

impl ExternalAuthProvider {
    /// Returns the cache shared by every transport this provider wraps.
    pub fn token_cache(&self) -> &TokenCache {
        &self.cache
    }
}

impl AuthProvider for ExternalAuthProvider {
    fn wrap_transport(&self, transport: Arc<dyn Transport>) -> Arc<dyn Transport> {
        Arc::new(AuthenticatingTransport::new(
            Arc::new(self.cache.clone()),
            transport,
        ))
    }

    fn login(&self) -> Result<(), ProviderError> {
        Err(ProviderError::NotImplemented)
    }
}

/// A builder for [ExternalAuthProvider].
#[derive(Debug, Default)]
pub struct Builder {
    source: Option<Arc<dyn TokenSource>>,
    clock: Option<Arc<dyn Clock>>,
}

impl Builder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source of new tokens. Required.
    pub fn with_token_source<T>(mut self, source: T) -> Self
    where
        T: TokenSource + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    /// Sets the clock used to decide if a cached token has expired.
    ///
    /// Defaults to [SystemClock].
    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Returns an [ExternalAuthProvider] with an empty token cache.
    ///
    /// Fails if no token source was configured.
    pub fn build(self) -> BuildResult<ExternalAuthProvider> {
        let source = self
            .source
            .ok_or_else(|| BuildError::missing_field("token_source"))?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        Ok(ExternalAuthProvider {
            cache: TokenCache::from_parts(source, clock),
        })
    }
}
