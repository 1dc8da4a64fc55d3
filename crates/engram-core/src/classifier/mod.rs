//! The type classifier (§4.1): produces `{type, source, confidence}` for a
//! new memory. Pure function; no side effects, no storage access.

mod frontmatter;
mod patterns;

use crate::model::MemoryType;

/// Which priority tier produced the classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    Explicit,
    Tier,
    Path,
    Keyword,
    Default,
}

/// The classifier's output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub memory_type: MemoryType,
    pub source: ClassificationSource,
    pub confidence: f64,
}

/// Everything the classifier needs. All fields besides `content` are
/// optional since only the save path's initial ingest necessarily has them.
#[derive(Debug, Clone, Default)]
pub struct ClassifyInput<'a> {
    pub file_path: Option<&'a str>,
    pub content: &'a str,
    pub title: &'a str,
    pub trigger_phrases: &'a [String],
}

/// Runs the five sources in strict priority order; first match wins (§4.1).
pub fn classify(input: &ClassifyInput) -> Classification {
    let frontmatter = frontmatter::extract(input.content);

    // 1. Explicit frontmatter `memory_type`/`memoryType`.
    if let Some(fm) = &frontmatter {
        if let Some(raw) = frontmatter::lookup(fm, &["memory_type", "memoryType"]) {
            if let Some(memory_type) = MemoryType::parse_name(raw) {
                return Classification {
                    memory_type,
                    source: ClassificationSource::Explicit,
                    confidence: 1.0,
                };
            }
        }
    }

    // 2. Tier mapping: frontmatter `importance_tier`, or an inline bracket marker.
    let tier = frontmatter
        .as_ref()
        .and_then(|fm| frontmatter::lookup(fm, &["importance_tier", "importanceTier"]))
        .map(str::to_string)
        .or_else(|| patterns::find_bracket_tier(input.content))
        .or_else(|| patterns::find_bracket_tier(input.title));
    if let Some(tier) = tier {
        if let Some(memory_type) = patterns::tier_to_type(&tier) {
            return Classification {
                memory_type,
                source: ClassificationSource::Tier,
                confidence: 0.9,
            };
        }
    }

    // 3. Path pattern.
    if let Some(path) = input.file_path {
        if let Some(memory_type) = patterns::match_path(path) {
            return Classification {
                memory_type,
                source: ClassificationSource::Path,
                confidence: 0.75,
            };
        }
    }

    // 4. Keyword scan of the title (and trigger phrases, treated the same way).
    if let Some(memory_type) = patterns::match_keyword(input.title) {
        return Classification {
            memory_type,
            source: ClassificationSource::Keyword,
            confidence: 0.6,
        };
    }
    for phrase in input.trigger_phrases {
        if let Some(memory_type) = patterns::match_keyword(phrase) {
            return Classification {
                memory_type,
                source: ClassificationSource::Keyword,
                confidence: 0.6,
            };
        }
    }

    // 5. Default.
    Classification {
        memory_type: MemoryType::Declarative,
        source: ClassificationSource::Default,
        confidence: 0.3,
    }
}
