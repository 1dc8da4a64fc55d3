use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The nine memory types, ordered by increasing half-life. Half-life drives
/// the scheduler's stability seed (`fsrs::initial_stability`) and the
/// difficulty mean-reversion prior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryType {
    Working,
    Episodic,
    Prospective,
    Implicit,
    Declarative,
    Procedural,
    Semantic,
    Autobiographical,
    MetaCognitive,
}

impl MemoryType {
    /// Half-life in days, or `None` for the no-decay meta-cognitive type.
    pub fn half_life_days(&self) -> Option<f64> {
        match self {
            MemoryType::Working => Some(1.0),
            MemoryType::Episodic => Some(7.0),
            MemoryType::Prospective => Some(14.0),
            MemoryType::Implicit => Some(30.0),
            MemoryType::Declarative => Some(60.0),
            MemoryType::Procedural => Some(90.0),
            MemoryType::Semantic => Some(180.0),
            MemoryType::Autobiographical => Some(365.0),
            MemoryType::MetaCognitive => None,
        }
    }

    /// `true` for the sentinel, no-decay type.
    pub fn is_meta_cognitive(&self) -> bool {
        matches!(self, MemoryType::MetaCognitive)
    }

    /// Prior difficulty used by the scheduler's mean-reversion term. The
    /// distilled spec leaves this unspecified numerically; this repository
    /// pins every type to the FSRS-4.5 default-weight initial difficulty
    /// (`w4`), which is what a never-reviewed record of any type starts at
    /// anyway. See DESIGN.md.
    pub fn difficulty_prior(&self) -> f64 {
        crate::fsrs::weights::FSRS45_DEFAULT_WEIGHTS[4]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryType::Working => "working",
            MemoryType::Episodic => "episodic",
            MemoryType::Prospective => "prospective",
            MemoryType::Implicit => "implicit",
            MemoryType::Declarative => "declarative",
            MemoryType::Procedural => "procedural",
            MemoryType::Semantic => "semantic",
            MemoryType::Autobiographical => "autobiographical",
            MemoryType::MetaCognitive => "meta-cognitive",
        }
    }

    pub fn parse_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "working" => Some(MemoryType::Working),
            "episodic" => Some(MemoryType::Episodic),
            "prospective" => Some(MemoryType::Prospective),
            "implicit" => Some(MemoryType::Implicit),
            "declarative" => Some(MemoryType::Declarative),
            "procedural" => Some(MemoryType::Procedural),
            "semantic" => Some(MemoryType::Semantic),
            "autobiographical" => Some(MemoryType::Autobiographical),
            "meta-cognitive" | "metacognitive" | "meta_cognitive" => {
                Some(MemoryType::MetaCognitive)
            }
            _ => None,
        }
    }

    /// All nine variants, in half-life order. Used by the classifier's
    /// keyword table and by property tests that sweep every type.
    pub const ALL: [MemoryType; 9] = [
        MemoryType::Working,
        MemoryType::Episodic,
        MemoryType::Prospective,
        MemoryType::Implicit,
        MemoryType::Declarative,
        MemoryType::Procedural,
        MemoryType::Semantic,
        MemoryType::Autobiographical,
        MemoryType::MetaCognitive,
    ];
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MemoryType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_name(s).ok_or_else(|| format!("unknown memory type: {s}"))
    }
}

impl Default for MemoryType {
    fn default() -> Self {
        MemoryType::Declarative
    }
}
