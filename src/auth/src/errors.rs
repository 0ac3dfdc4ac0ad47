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

//! Errors produced while fetching and caching tokens.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter, Result};
use std::sync::Arc;

/// Represents an error returned by a [TokenSource](crate::token::TokenSource).
///
/// Token sources wrap whatever went wrong (a failed HTTP exchange, a helper
/// process exiting with an error, a malformed response) in this type. The
/// message is surfaced verbatim by the cache.
///
/// # Example
/// ```
/// # use cached_token_auth::errors::SourceError;
/// let err = SourceError::from_msg("token store error");
/// assert_eq!(err.to_string(), "token store error");
/// ```
#[derive(Clone, Debug)]
pub struct SourceError {
    source: SourceErrorImpl,
}

#[derive(Clone, Debug)]
enum SourceErrorImpl {
    SimpleMessage(String),
    Source(Arc<dyn Error + Send + Sync>),
}

impl SourceError {
    /// Creates a new `SourceError` from an underlying error.
    ///
    /// The underlying error is available via [Error::source].
    pub fn from_source<T: Error + Send + Sync + 'static>(source: T) -> Self {
        SourceError {
            source: SourceErrorImpl::Source(Arc::new(source)),
        }
    }

    /// Creates a new `SourceError` from a message.
    pub fn from_msg<T: Into<String>>(message: T) -> Self {
        SourceError {
            source: SourceErrorImpl::SimpleMessage(message.into()),
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match &self.source {
            SourceErrorImpl::SimpleMessage(message) => write!(f, "{message}"),
            SourceErrorImpl::Source(source) => write!(f, "{source}"),
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.source {
            SourceErrorImpl::SimpleMessage(_) => None,
            SourceErrorImpl::Source(source) => Some(source.as_ref()),
        }
    }
}

/// The error returned by [TokenCache](crate::token_cache::TokenCache).
///
/// The two variants separate failures to reach the token source from token
/// sources that misbehave.
#[derive(thiserror::Error, Clone, Debug)]
#[non_exhaustive]
pub enum CacheError {
    /// The token source returned an error.
    ///
    /// The cached token, if any, was left untouched.
    #[error("could not fetch new token: {0}")]
    Fetch(#[source] SourceError),

    /// The token source reported success but did not return a token.
    #[error("nil token returned by source")]
    NilToken,
}
