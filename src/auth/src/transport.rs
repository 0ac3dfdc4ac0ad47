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

//! Types and functions to send HTTP requests through a chain of transports.
//!
//! A [Transport] sends one request and returns one response. Transports are
//! composed by wrapping: a decorator such as
//! [AuthenticatingTransport](crate::authenticating::AuthenticatingTransport)
//! inspects or modifies the request and then delegates to the transport it
//! wraps. Tools that need to see the whole chain can walk it with
//! [Transport::wrapped_transport] or jump to the end with [innermost].

use crate::errors::CacheError;
use bytes::Bytes;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A `Result` alias where the `Err` case is [Error].
pub type Result<T> = std::result::Result<T, Error>;

/// Sends HTTP requests.
///
/// Implementations own the request they are given. A decorator may change
/// its copy before passing it on, the caller never observes those changes.
#[async_trait::async_trait]
pub trait Transport: std::fmt::Debug + Send + Sync {
    /// Sends `request` and returns the response.
    async fn round_trip(&self, request: http::Request<Bytes>) -> Result<http::Response<Bytes>>;

    /// Returns the transport this transport delegates to, if any.
    fn wrapped_transport(&self) -> Option<&dyn Transport> {
        None
    }
}

/// Returns the last transport in a chain of wrapping transports.
///
/// Returns `transport` itself if it does not wrap another transport.
pub fn innermost(transport: &dyn Transport) -> &dyn Transport {
    let mut current = transport;
    while let Some(next) = current.wrapped_transport() {
        current = next;
    }
    current
}

/// The error type for [Transport].
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Error(ErrorKind);

impl Error {
    /// A token for the `Authorization` header could not be obtained.
    ///
    /// The request was not sent.
    pub fn is_authorization(&self) -> bool {
        matches!(self.0, ErrorKind::Authorization(_))
    }

    /// The token could not be encoded as an HTTP header value.
    ///
    /// The request was not sent.
    pub fn is_invalid_header(&self) -> bool {
        matches!(self.0, ErrorKind::InvalidHeader(_))
    }

    /// The underlying transport failed to send the request or to receive the
    /// response.
    pub fn is_transport(&self) -> bool {
        matches!(self.0, ErrorKind::Transport(_))
    }

    /// Creates an error representing a failure to send a request or receive
    /// its response.
    ///
    /// Applications implementing [Transport] use this to report failures of
    /// their HTTP stack.
    pub fn transport<T>(source: T) -> Error
    where
        T: Into<BoxError>,
    {
        Error(ErrorKind::Transport(source.into()))
    }

    pub(crate) fn authorization(source: CacheError) -> Error {
        Error(ErrorKind::Authorization(source))
    }

    pub(crate) fn invalid_header(source: http::header::InvalidHeaderValue) -> Error {
        Error(ErrorKind::InvalidHeader(source))
    }
}

#[derive(thiserror::Error, Debug)]
enum ErrorKind {
    #[error("acquiring a token for authorization header: {0}")]
    Authorization(#[source] CacheError),
    #[error("the token is not a valid header value: {0}")]
    InvalidHeader(#[source] http::header::InvalidHeaderValue),
    #[error("cannot send the request: {0}")]
    Transport(#[source] BoxError),
}
