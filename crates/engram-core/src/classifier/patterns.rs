//! Path-pattern and keyword tables for the type classifier's third and
//! fourth priority tiers (§4.1). The distilled spec notes these tables are
//! "derived from visible test cases" and that completeness beyond those
//! cases is ambiguous (§9 Open Questions); the tables below are this
//! repository's pinned, documented choice — see DESIGN.md.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::MemoryType;

/// First-match-wins path patterns, checked in this order.
fn path_patterns() -> &'static Vec<(Regex, MemoryType)> {
    static PATTERNS: OnceLock<Vec<(Regex, MemoryType)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            (r"(?i)/(scratch|tmp|working|draft)/", MemoryType::Working),
            (r"(?i)/(journal|daily|log|diary)/", MemoryType::Episodic),
            (r"(?i)/(todo|tasks|reminders|intentions)/", MemoryType::Prospective),
            (r"(?i)/(habits|routines|cache)/", MemoryType::Implicit),
            (r"(?i)/(procedures|how-?to|runbooks|playbooks)/", MemoryType::Procedural),
            (r"(?i)/(architecture|decisions|design|semantics|concepts)/", MemoryType::Semantic),
            (r"(?i)/(profile|about-?me|bio|identity)/", MemoryType::Autobiographical),
            (r"(?i)/(core|constitution|self-?model|identity-?core)/", MemoryType::MetaCognitive),
        ]
        .into_iter()
        .map(|(pat, ty)| (Regex::new(pat).expect("static pattern compiles"), ty))
        .collect()
    })
}

/// First matching path pattern, if any.
pub fn match_path(path: &str) -> Option<MemoryType> {
    path_patterns()
        .iter()
        .find(|(re, _)| re.is_match(path))
        .map(|(_, ty)| *ty)
}

/// Per-type keyword list for the title substring scan. First type (in
/// half-life order) whose table has a hit wins.
fn keyword_table() -> &'static [(MemoryType, &'static [&'static str])] {
    const TABLE: &[(MemoryType, &[&str])] = &[
        (MemoryType::Working, &["scratch", "draft", "temp", "wip"]),
        (MemoryType::Episodic, &["today", "yesterday", "meeting", "happened", "journal"]),
        (MemoryType::Prospective, &["remind", "todo", "later", "follow up", "follow-up"]),
        (MemoryType::Implicit, &["habit", "routine", "pattern", "style preference"]),
        (MemoryType::Procedural, &["how to", "steps", "procedure", "runbook", "guide"]),
        (MemoryType::Semantic, &["definition", "concept", "architecture", "decision"]),
        (MemoryType::Autobiographical, &["my life", "childhood", "biography", "about me"]),
        (MemoryType::MetaCognitive, &["core belief", "identity", "constitution", "self-model"]),
    ];
    TABLE
}

/// First keyword-table hit against a lower-cased `title`.
pub fn match_keyword(title: &str) -> Option<MemoryType> {
    let lowered = title.to_ascii_lowercase();
    keyword_table()
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(ty, _)| *ty)
}

/// Fixed tier-marker to type mapping (§4.1 point 2).
pub fn tier_to_type(tier: &str) -> Option<MemoryType> {
    match tier.trim().to_ascii_lowercase().as_str() {
        "constitutional" => Some(MemoryType::MetaCognitive),
        "critical" => Some(MemoryType::Semantic),
        "important" => Some(MemoryType::Declarative),
        "normal" => Some(MemoryType::Declarative),
        "temporary" => Some(MemoryType::Working),
        "deprecated" => Some(MemoryType::Episodic),
        _ => None,
    }
}

/// Scans `text` for an inline bracket marker like `[CONSTITUTIONAL]` and
/// returns the tier name if one is found.
pub fn find_bracket_tier(text: &str) -> Option<String> {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    let re = MARKER.get_or_init(|| {
        Regex::new(r"(?i)\[(constitutional|critical|important|normal|temporary|deprecated)\]")
            .expect("static pattern compiles")
    });
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
