// nrcctl - CLI for the nagrestconf REST API
// Copyright (C) 2024 The nrcctl authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Percent-encoding of field values as they travel to and from the REST API.
//!
//! The server sends command-like fields (shell commands, URLs, service
//! descriptions) query-string encoded. Whether those values are decoded for
//! display is decided once at startup and carried around as an
//! [`EncodingMode`].

use thiserror::Error;
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingMode {
    /// Percent-decode values before they are shown or matched.
    #[default]
    Decode,
    /// Leave values exactly as the server sent them.
    Passthrough,
}

impl EncodingMode {
    /// `keep_encoded` mirrors the `--encode` flag / `encode:` config key.
    pub fn from_keep_encoded(keep_encoded: bool) -> Self {
        if keep_encoded {
            EncodingMode::Passthrough
        } else {
            EncodingMode::Decode
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("invalid percent escape `{escape}` in `{input}`")]
    InvalidEscape { input: String, escape: String },
    #[error("decoded value of `{0}` is not valid UTF-8")]
    InvalidUtf8(String),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    mode: EncodingMode,
}

impl Normalizer {
    pub fn new(mode: EncodingMode) -> Self {
        Self { mode }
    }

    pub fn decode(&self, value: &str) -> Result<String, EncodingError> {
        match self.mode {
            EncodingMode::Decode => force_decode(value),
            EncodingMode::Passthrough => Ok(value.to_string()),
        }
    }

    /// Like [`Normalizer::decode`], but falls back to the input when it does
    /// not decode cleanly.
    pub fn decode_or_keep(&self, value: &str) -> String {
        self.decode(value).unwrap_or_else(|_| value.to_string())
    }
}

/// Query-string decode regardless of mode: `+` is a space and every `%`
/// must start a two digit hex escape.
pub fn force_decode(value: &str) -> Result<String, EncodingError> {
    let bytes = value.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'%' {
            let escape = bytes.get(idx + 1..idx + 3);
            match escape {
                Some(hex) if hex.iter().all(u8::is_ascii_hexdigit) => idx += 3,
                _ => {
                    let end = (idx + 3).min(bytes.len());
                    return Err(EncodingError::InvalidEscape {
                        input: value.to_string(),
                        escape: String::from_utf8_lossy(&bytes[idx..end]).into_owned(),
                    });
                }
            }
        } else {
            idx += 1;
        }
    }

    let spaced = value.replace('+', "%20");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| EncodingError::InvalidUtf8(value.to_string()))
}

/// Query-string encode regardless of mode.
pub fn force_encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_mode_unescapes_values() {
        let normalizer = Normalizer::new(EncodingMode::Decode);
        assert_eq!(normalizer.decode("a%20b").unwrap(), "a b");
        assert_eq!(normalizer.decode("check_ping+-w+100").unwrap(), "check_ping -w 100");
        assert_eq!(normalizer.decode("1%2B1").unwrap(), "1+1");
    }

    #[test]
    fn passthrough_mode_keeps_values() {
        let normalizer = Normalizer::new(EncodingMode::Passthrough);
        assert_eq!(normalizer.decode("a%20b").unwrap(), "a%20b");
        assert_eq!(normalizer.decode("100%").unwrap(), "100%");
    }

    #[test]
    fn bad_escapes_are_reported_but_can_be_kept() {
        let normalizer = Normalizer::new(EncodingMode::Decode);
        let err = normalizer.decode("load > 90%").unwrap_err();
        assert!(matches!(err, EncodingError::InvalidEscape { .. }));
        assert!(force_decode("%zz").is_err());
        assert!(force_decode("%FF").is_err());
        assert_eq!(normalizer.decode_or_keep("load > 90%"), "load > 90%");
    }

    #[test]
    fn force_encode_uses_query_rules() {
        assert_eq!(force_encode("$USER1$/check_http -H x"), "%24USER1%24%2Fcheck_http+-H+x");
        assert_eq!(force_encode("a,b:c"), "a%2Cb%3Ac");
        let original = "check_nrpe!-c \"disk\" & 50%";
        assert_eq!(force_decode(&force_encode(original)).unwrap(), original);
    }

    #[test]
    fn keep_encoded_flag_selects_passthrough() {
        assert_eq!(EncodingMode::from_keep_encoded(true), EncodingMode::Passthrough);
        assert_eq!(EncodingMode::from_keep_encoded(false), EncodingMode::Decode);
    }
}
