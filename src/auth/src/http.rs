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

//! A [Transport] that sends requests with [reqwest].

use crate::transport::{Error, Result, Transport};
use bytes::Bytes;

/// Sends requests over the network using a [reqwest::Client].
///
/// This is usually the innermost transport of a chain. It does not retry,
/// and it does not treat HTTP error statuses as errors: any response that
/// arrives is returned to the caller.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default [reqwest::Client].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport that sends requests with `client`.
    ///
    /// Use this to configure timeouts, proxies, or TLS settings.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { inner: client }
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn round_trip(&self, request: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let request = reqwest::Request::try_from(request).map_err(Error::transport)?;
        let response = self
            .inner
            .execute(request)
            .await
            .map_err(Error::transport)?;
        to_http_response(response).await
    }
}

async fn to_http_response(response: reqwest::Response) -> Result<http::Response<Bytes>> {
    let response = http::Response::from(response);
    let (parts, body) = response.into_parts();
    let body = http_body_util::BodyExt::collect(body)
        .await
        .map_err(Error::transport)?
        .to_bytes();
    Ok(http::Response::from_parts(parts, body))
}
