//! Decoder for `application/x-www-form-urlencoded` response bodies.
//!
//! Pocket answers successful calls with `key=value&key2=value2` rather than
//! JSON. Decoding is strict: a malformed percent escape, a `;` separator or an
//! escape that does not decode to UTF-8 rejects the whole body.

use std::collections::HashMap;

use crate::error::PocketError;

/// Decoded key/value pairs. A key may appear more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    inner: HashMap<String, Vec<String>>,
}

impl FormValues {
    /// First value for `key`, or `""` when the key is absent.
    pub fn get(&self, key: &str) -> &str {
        self.inner
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Every value for `key` in body order.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.inner.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Parse a query string into `FormValues`.
///
/// Empty segments (`a=1&&b=2`) are skipped. A segment without `=` is a key
/// with an empty value.
pub fn parse(body: &str) -> Result<FormValues, PocketError> {
    let mut values = FormValues::default();
    for segment in body.split('&') {
        if segment.contains(';') {
            return Err(PocketError::Decode(
                "failed to parse response body: invalid semicolon separator in query".to_string(),
            ));
        }
        if segment.is_empty() {
            continue;
        }
        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        let key = unescape(key)?;
        let value = unescape(value)?;
        values.inner.entry(key).or_default().push(value);
    }
    Ok(values)
}

fn unescape(raw: &str) -> Result<String, PocketError> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3);
            if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
                let end = (i + 3).min(raw.len());
                return Err(PocketError::Decode(format!(
                    "failed to parse response body: invalid URL escape {:?}",
                    raw.get(i..end).unwrap_or(&raw[i..])
                )));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| PocketError::Decode(format!("failed to parse response body: {e}")))
}
