//! Request target composition.
//!
//! Merges the configured base endpoint, a resource path and a parameter set
//! into one absolute URL. No I/O happens here: identical inputs always give
//! the identical target.

use std::collections::BTreeMap;

use url::Url;
use url::form_urlencoded;

use crate::error::Error;

/// Multi-valued query parameters.
///
/// Keys are kept in sorted order so the encoded query string is
/// reproducible; the values of one key keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, Vec<String>>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every value of `key` with `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), vec![value.into()]);
    }

    /// Appends `value` to the values of `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.0.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All `(key, value)` pairs, keys sorted.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// Percent-encodes the parameters as `application/x-www-form-urlencoded`.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs())
            .finish()
    }

    /// Parses an encoded query string back into parameters.
    pub fn decode(query: &str) -> Self {
        form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.add(k, v);
        }
        params
    }
}

/// Parses and validates a base endpoint.
///
/// # Errors
///
/// Returns [`Error::Config`] if `base` is blank or not an absolute URL.
pub fn parse_base(base: &str) -> Result<Url, Error> {
    let trimmed = base.trim();
    if trimmed.is_empty() {
        return Err(Error::Config("base URL is required".to_string()));
    }
    let url = Url::parse(trimmed)
        .map_err(|e| Error::Config(format!("parse base URL {trimmed:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(Error::Config(format!(
            "base URL {trimmed:?} cannot carry a path"
        )));
    }
    Ok(url)
}

/// Builds the request target for `path` below an already parsed `base`.
///
/// `path` always lands under the base's own path prefix; a leading `/` does
/// not escape it. An empty parameter set leaves no query string at all.
pub fn join_target(base: &Url, path: &str, params: &Params) -> Url {
    let clean_path = path.trim_start_matches('/');
    let base_path = base.path().trim_end_matches('/');

    let mut target = base.clone();
    target.set_path(&format!("{base_path}/{clean_path}"));
    if params.is_empty() {
        target.set_query(None);
    } else {
        target.set_query(Some(&params.encode()));
    }
    target.set_fragment(None);
    target
}

/// Parses `base` and composes the request target in one step.
///
/// # Errors
///
/// Returns [`Error::Config`] if `base` is not a usable absolute URL.
pub fn compose(base: &str, path: &str, params: &Params) -> Result<Url, Error> {
    Ok(join_target(&parse_base(base)?, path, params))
}

/// Percent-encodes one user-supplied path segment (a stop or trip id).
pub fn path_segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}
