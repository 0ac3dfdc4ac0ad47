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

//! A [Transport] that adds bearer tokens to outgoing requests.

use crate::headers_util::{bearer_header_value, has_authorization};
use crate::token_cache::CachedTokenProvider;
use crate::transport::{Error, Result, Transport};
use bytes::Bytes;
use http::header::AUTHORIZATION;
use std::sync::Arc;

/// Sets `Authorization: Bearer <token>` on requests and forwards them to the
/// wrapped transport.
///
/// Requests that already carry a non-empty `Authorization` header are
/// forwarded untouched, an explicitly set credential always wins. Otherwise
/// the token comes from a [CachedTokenProvider], typically a
/// [TokenCache](crate::token_cache::TokenCache) shared by every transport of
/// the same client.
///
/// If no token can be obtained the request is not sent and the error is
/// returned to the caller. There are no retries.
///
/// # Example
/// ```
/// # use cached_token_auth::authenticating::AuthenticatingTransport;
/// # use cached_token_auth::token_cache::CachedTokenProvider;
/// # use cached_token_auth::transport::Transport;
/// # use std::sync::Arc;
/// fn with_auth(
///     tokens: Arc<dyn CachedTokenProvider>,
///     inner: Arc<dyn Transport>,
/// ) -> Arc<dyn Transport> {
///     Arc::new(AuthenticatingTransport::new(tokens, inner))
/// }
/// ```
#[derive(Clone, Debug)]
pub struct AuthenticatingTransport {
    tokens: Arc<dyn CachedTokenProvider>,
    inner: Arc<dyn Transport>,
}

impl AuthenticatingTransport {
    /// Creates a transport that authenticates requests with tokens from
    /// `tokens` and sends them with `inner`.
    pub fn new(tokens: Arc<dyn CachedTokenProvider>, inner: Arc<dyn Transport>) -> Self {
        Self { tokens, inner }
    }
}

#[async_trait::async_trait]
impl Transport for AuthenticatingTransport {
    async fn round_trip(&self, mut request: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        if has_authorization(request.headers()) {
            tracing::trace!("request has an authorization header, forwarding unchanged");
            return self.inner.round_trip(request).await;
        }

        let token = self.tokens.token().await.map_err(|e| {
            tracing::error!("failed to acquire a token: {e}");
            Error::authorization(e)
        })?;
        let value = bearer_header_value(&token).map_err(Error::invalid_header)?;

        // `insert` drops any empty `Authorization` values left on the request.
        request.headers_mut().insert(AUTHORIZATION, value);
        self.inner.round_trip(request).await
    }

    fn wrapped_transport(&self) -> Option<&dyn Transport> {
        Some(self.inner.as_ref())
    }
}
