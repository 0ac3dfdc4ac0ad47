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

//! Cached bearer-token authentication for HTTP transports.
//!
//! This crate attaches `Authorization: Bearer <token>` headers to outgoing
//! HTTP requests. Tokens come from a pluggable [token::TokenSource], such as
//! a helper process or a remote endpoint, and are cached by a
//! [token_cache::TokenCache] until they expire. Concurrent callers of an
//! expired cache share a single fetch.
//!
//! The [authenticating::AuthenticatingTransport] decorator wraps any
//! [transport::Transport]. With the default `reqwest` feature the crate also
//! provides `http::ReqwestTransport`, a transport that sends requests over
//! the network.
//!
//! Most applications configure these pieces through a
//! [provider::ExternalAuthProvider]:
//!
//! ```
//! # use cached_token_auth::errors::SourceError;
//! # use cached_token_auth::provider::{AuthProvider, Builder};
//! # use cached_token_auth::token::{Token, TokenSource};
//! # use cached_token_auth::transport::Transport;
//! # use std::sync::Arc;
//! # #[derive(Debug)]
//! # struct HelperSource;
//! # #[async_trait::async_trait]
//! # impl TokenSource for HelperSource {
//! #     async fn token(&self) -> Result<Option<Token>, SourceError> {
//! #         let expires_at = chrono::Utc::now() + chrono::Duration::hours(1);
//! #         Ok(Some(Token::new("test-only-token", expires_at)))
//! #     }
//! # }
//! # tokio_test::block_on(async {
//! # #[derive(Debug)]
//! # struct Echo;
//! # #[async_trait::async_trait]
//! # impl Transport for Echo {
//! #     async fn round_trip(
//! #         &self,
//! #         request: http::Request<bytes::Bytes>,
//! #     ) -> cached_token_auth::transport::Result<http::Response<bytes::Bytes>> {
//! #         Ok(http::Response::new(request.into_body()))
//! #     }
//! # }
//! # let base: Arc<dyn Transport> = Arc::new(Echo);
//! let provider = Builder::new().with_token_source(HelperSource).build()?;
//! let transport = provider.wrap_transport(base);
//! let response = transport
//!     .round_trip(http::Request::new(bytes::Bytes::from_static(b"hello")))
//!     .await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```

pub mod errors;

/// Time sources for token expiration checks.
pub mod clock;

/// Bearer tokens and the sources that produce them.
pub mod token;

/// The token cache
pub mod token_cache;

/// The interface between authentication and the HTTP stack.
pub mod transport;

pub mod authenticating;

pub mod provider;

pub mod build_errors;

/// Functions to format and inspect the `Authorization` header.
pub(crate) mod headers_util;

#[cfg(feature = "reqwest")]
pub mod http;
