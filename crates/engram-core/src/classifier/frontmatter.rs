//! Minimal frontmatter extraction. The core treats `content` as opaque text
//! except here and in embedding — this is a flat `key: value` line scanner,
//! not a YAML parser, since the classifier only ever needs a handful of
//! known keys.

use std::collections::HashMap;

/// Parses a leading `---`-delimited block into flat key/value pairs.
/// Returns `None` if `content` doesn't open with a frontmatter fence.
pub fn extract(content: &str) -> Option<HashMap<String, String>> {
    let mut lines = content.lines();
    if lines.next()?.trim() != "---" {
        return None;
    }
    let mut map = HashMap::new();
    for line in lines {
        if line.trim() == "---" {
            return Some(map);
        }
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim().to_string();
            let value = value.trim().trim_matches('"').trim_matches('\'').to_string();
            map.insert(key, value);
        }
    }
    // Unterminated frontmatter block: treat whatever we gathered as valid,
    // matching typical "tolerant" parsing of hand-edited notes.
    Some(map)
}

/// Looks up the first matching key among `keys` (so both `memory_type` and
/// `memoryType` style keys are accepted), case-sensitively on the key name.
pub fn lookup<'a>(map: &'a HashMap<String, String>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| map.get(*k)).map(|s| s.as_str())
}
