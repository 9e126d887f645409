use std::fmt::Write as _;

/// Canonical package name for an override key, with any trailing version
/// specifier stripped. Scoped keys keep their `@scope/` prefix.
pub fn package_name(key: &str) -> String {
    if key.starts_with('@') {
        // "@scope/name" splits on '@' into ["", "scope/name"]; a third
        // segment means an embedded version specifier follows the name.
        let parts: Vec<&str> = key.split('@').collect();
        if parts.len() == 2 {
            return key.to_string();
        }
        if parts.len() >= 3 {
            return format!("@{}", parts[1]);
        }
        key.to_string()
    } else {
        key.split('@').next().unwrap_or(key).to_string()
    }
}

/// Percent-encode a string for use as a URL path component
/// (`encodeURIComponent` semantics over UTF-8 bytes).
pub fn encode_uri_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(b as char),
            _ => {
                let _ = write!(out, "%{b:02X}");
            }
        }
    }
    out
}
