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

use http::HeaderMap;
use http::header::{AUTHORIZATION, HeaderValue, InvalidHeaderValue};

/// Returns true if the headers already carry a non-empty `Authorization`
/// value.
pub(crate) fn has_authorization(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .is_some_and(|value| !value.is_empty())
}

/// Formats `token` as a bearer credential.
///
/// The value is marked as sensitive, so HTTP stacks that honor the flag do
/// not log or compress it.
pub(crate) fn bearer_header_value(token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn bearer_value() -> Result<(), InvalidHeaderValue> {
        let value = bearer_header_value("abc")?;
        assert_eq!(value, "Bearer abc");
        assert!(value.is_sensitive());
        Ok(())
    }

    #[test]
    fn bearer_value_rejects_control_characters() {
        let got = bearer_header_value("abc\r\nX-Injected: yes");
        assert!(got.is_err(), "{got:?}");
    }

    #[test_case(None, false; "missing")]
    #[test_case(Some(""), false; "empty")]
    #[test_case(Some("Bearer existing"), true; "bearer")]
    #[test_case(Some("Basic dXNlcjpwYXNz"), true; "basic")]
    fn authorization_present(value: Option<&'static str>, want: bool) {
        let mut headers = HeaderMap::new();
        if let Some(v) = value {
            headers.insert(AUTHORIZATION, HeaderValue::from_static(v));
        }
        assert_eq!(has_authorization(&headers), want, "{headers:?}");
    }
}
