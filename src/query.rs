//! Query-string parameter updates for list and history URLs
//!
//! Follows `URLSearchParams` semantics: setting a parameter replaces the
//! first occurrence in place and drops any duplicates; other parameters
//! keep their order.

use url::Url;

/// A query parameter value as the UI produces it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryValue<'a> {
    Text(&'a str),
    Number(i64),
    Flag(bool),
}

impl QueryValue<'_> {
    /// Falsy values (`""`, `0`, `false`) clear the parameter
    fn is_truthy(&self) -> bool {
        match self {
            QueryValue::Text(s) => !s.is_empty(),
            QueryValue::Number(n) => *n != 0,
            QueryValue::Flag(b) => *b,
        }
    }

    fn render(&self) -> String {
        match self {
            QueryValue::Text(s) => s.to_string(),
            QueryValue::Number(n) => n.to_string(),
            QueryValue::Flag(b) => b.to_string(),
        }
    }
}

impl<'a> From<&'a str> for QueryValue<'a> {
    fn from(value: &'a str) -> Self {
        QueryValue::Text(value)
    }
}

impl From<i64> for QueryValue<'_> {
    fn from(value: i64) -> Self {
        QueryValue::Number(value)
    }
}

impl From<bool> for QueryValue<'_> {
    fn from(value: bool) -> Self {
        QueryValue::Flag(value)
    }
}

/// Set, blank or remove `parameter` on `url`
///
/// A truthy value sets the parameter. A missing or falsy value sets it to
/// the empty string when `allow_empty` is true, and removes it otherwise.
/// Returns whether the URL changed.
pub fn update_query_parameter(
    url: &mut Url,
    parameter: &str,
    value: Option<QueryValue<'_>>,
    allow_empty: bool,
) -> bool {
    let next = match value {
        Some(v) if v.is_truthy() => Some(v.render()),
        _ if allow_empty => Some(String::new()),
        _ => None,
    };

    let before = url.as_str().to_string();
    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

    match next {
        Some(next) => {
            let mut replaced = false;
            pairs.retain_mut(|(name, value)| {
                if name != parameter {
                    return true;
                }
                if replaced {
                    return false;
                }
                *value = next.clone();
                replaced = true;
                true
            });
            if !replaced {
                pairs.push((parameter.to_string(), next));
            }
        }
        None => pairs.retain(|(name, _)| name != parameter),
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }

    let changed = url.as_str() != before;
    if changed {
        tracing::trace!(parameter, url = %url, "query parameter updated");
    }
    changed
}
