use maud::Render;
use std::collections::HashSet;
use std::fmt;

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Replaces every character outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if is_id_char(c) { c } else { '_' })
        .collect()
}

/// Returns true when `value` is non-empty and made only of id characters.
pub fn is_dom_id(value: &str) -> bool {
    !value.is_empty() && value.chars().all(is_id_char)
}

/// An element id (or id fragment) that is safe to emit without escaping.
///
/// The only way to obtain one is through sanitizing or validating, so its
/// [`Render`] impl splices it into `html!` output verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomId(String);

impl DomId {
    pub fn parse(value: &str) -> Option<Self> {
        is_dom_id(value).then(|| Self(value.to_string()))
    }

    /// For compile-time ids such as `metrics-profiles-panel`.
    pub fn from_static(value: &'static str) -> Self {
        debug_assert!(is_dom_id(value), "not a DOM id: {:?}", value);
        Self(value.to_string())
    }

    pub fn sanitized(key: &str) -> Self {
        Self(sanitize_key(key))
    }

    /// Builds `<prefix><fragment>`, e.g. `prof-body-` + `profile_01`.
    pub fn prefixed(prefix: &'static str, fragment: &DomId) -> Self {
        debug_assert!(prefix.chars().all(is_id_char));
        Self(format!("{}{}", prefix, fragment.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Render for DomId {
    fn render_to(&self, buffer: &mut String) {
        buffer.push_str(&self.0);
    }
}

/// Hands out unique id fragments for a set of keys.
///
/// Two distinct keys can sanitize to the same fragment (`a.b` and `a b`).
/// The first one keeps the plain fragment; later ones get `-2`, `-3`, ...
#[derive(Debug, Default)]
pub struct DomIdAllocator {
    taken: HashSet<String>,
}

impl DomIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, key: &str) -> DomId {
        let base = sanitize_key(key);
        if self.taken.insert(base.clone()) {
            return DomId(base);
        }

        let mut n = 2usize;
        loop {
            let candidate = format!("{}-{}", base, n);
            if self.taken.insert(candidate.clone()) {
                log::debug!("DOM id collision for key {:?}, using {}", key, candidate);
                return DomId(candidate);
            }
            n += 1;
        }
    }
}
