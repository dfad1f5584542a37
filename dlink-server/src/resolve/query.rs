//! Query-string handling for the resolver
//!
//! Resolution consumes `linktype`, `context`, and `compress`; every other
//! incoming parameter is carried through verbatim onto the redirect target.

use percent_encoding::percent_decode_str;

/// Parameters consumed by the pipeline and stripped from redirects
const CONSUMED: &[&str] = &["linktype", "compress", "context"];

/// One raw `key=value` pair with its decoded, lowercased key
#[derive(Debug, Clone)]
struct RawParam {
    raw: String,
    key: String,
}

/// Ordered view over a request's raw query string
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    params: Vec<RawParam>,
}

impl QueryParams {
    /// Parse a raw query string (without the leading `?`)
    pub fn parse(raw: &str) -> Self {
        let params = raw
            .split('&')
            .filter(|s| !s.is_empty())
            .map(|segment| {
                let key_raw = segment.split('=').next().unwrap_or(segment);
                let key = percent_decode_str(key_raw)
                    .decode_utf8_lossy()
                    .to_ascii_lowercase();
                RawParam {
                    raw: segment.to_string(),
                    key,
                }
            })
            .collect();
        Self { params }
    }

    /// Decoded value of the first occurrence of `name` (case-insensitive)
    pub fn get(&self, name: &str) -> Option<String> {
        let wanted = name.to_ascii_lowercase();
        self.params.iter().find(|p| p.key == wanted).map(|p| {
            match p.raw.split_once('=') {
                Some((_, value)) => percent_decode_str(value)
                    .decode_utf8_lossy()
                    .replace('+', " "),
                None => String::new(),
            }
        })
    }

    /// Whether `?compress=true` was requested
    pub fn compress_requested(&self) -> bool {
        self.get("compress")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Append every non-consumed incoming parameter to a redirect target,
    /// joining with `?` or `&` depending on whether the target already
    /// carries a query.
    pub fn append_preserved(&self, target: &str) -> String {
        let preserved: Vec<&str> = self
            .params
            .iter()
            .filter(|p| !CONSUMED.contains(&p.key.as_str()))
            .map(|p| p.raw.as_str())
            .collect();

        if preserved.is_empty() {
            return target.to_string();
        }

        let joiner = if target.contains('?') { '&' } else { '?' };
        format!("{target}{joiner}{}", preserved.join("&"))
    }
}
