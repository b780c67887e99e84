//! Rule-based priority scoring and categorization.
//!
//! [`KeywordScorer`] scans prompt text (lower-cased, substring match) for
//! three weighted keyword tiers and an ordered list of category rules.
//!
//! * Every tier keyword found contributes its tier weight once: HIGH +3,
//!   MEDIUM +2, LOW −1.  The total is floored at 0.
//! * The category is the label of the **first** rule with any matching
//!   keyword; rule order is the tie-break.  No match gives
//!   [`FALLBACK_CATEGORY`].

// ---------------------------------------------------------------------------
// Internal types
// ---------------------------------------------------------------------------

struct KeywordTier {
    weight: i32,
    keywords: &'static [&'static str],
}

struct CategoryRule {
    label: &'static str,
    keywords: &'static [&'static str],
}

/// Category assigned when no rule matches.
pub const FALLBACK_CATEGORY: &str = "General Wisdom";

// ---------------------------------------------------------------------------
// Static keyword tables
// ---------------------------------------------------------------------------

static TIERS: &[KeywordTier] = &[
    KeywordTier {
        weight: 3,
        keywords: &[
            // Technology & Future
            "technology",
            "future",
            "innovation",
            "ai",
            "artificial intelligence",
            "automation",
            "digital",
            "virtual",
            "augmented",
            "biotechnology",
            // Biology & Health
            "biology",
            "health",
            "genetic",
            "wellness",
            "longevity",
            "medical",
            "neuroscience",
            "brain",
            "body",
            "human potential",
            // Humanity & Society
            "generation",
            "children",
            "education",
            "learning",
            "youth",
            "future generations",
            "humanity",
            "human",
            "society",
            "community",
            "collective",
            // Alignment & Integration
            "alignment",
            "integration",
            "harmony",
            "balance",
            "synergy",
            "convergence",
            "ethics",
            "values",
            "wisdom",
            "sustainability",
            "regenerative",
            // Systems Thinking
            "systems",
            "holistic",
            "interconnected",
            "ecosystem",
            "complex",
        ],
    },
    KeywordTier {
        weight: 2,
        keywords: &[
            "relationship",
            "communication",
            "collaboration",
            "creativity",
            "consciousness",
            "awareness",
            "mindfulness",
            "purpose",
            "meaning",
            "leadership",
            "vision",
            "transformation",
            "evolution",
            "growth",
            "nature",
            "environment",
            "planet",
            "earth",
        ],
    },
    KeywordTier {
        weight: -1,
        keywords: &[
            "personal",
            "individual",
            "preference",
            "opinion",
            "favorite",
            "routine",
            "daily",
            "habit",
        ],
    },
];

static CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        label: "Technology & Future",
        keywords: &["ai", "technology", "digital", "automation", "virtual", "augmented"],
    },
    CategoryRule {
        label: "Biology & Health",
        keywords: &["health", "biology", "body", "brain", "genetic", "medical", "wellness"],
    },
    CategoryRule {
        label: "Generation Alpha & Youth",
        keywords: &["children", "generation", "youth", "education", "learning", "young"],
    },
    CategoryRule {
        label: "Systems & Alignment",
        keywords: &["system", "integration", "alignment", "harmony", "balance", "holistic"],
    },
    CategoryRule {
        label: "Ethics & Wisdom",
        keywords: &["ethics", "values", "wisdom", "meaning", "purpose", "consciousness"],
    },
    CategoryRule {
        label: "Environment & Sustainability",
        keywords: &["environment", "nature", "planet", "sustainability", "earth", "climate"],
    },
    CategoryRule {
        label: "Leadership & Vision",
        keywords: &["leadership", "transform", "vision", "change", "innovation"],
    },
    CategoryRule {
        label: "Personal Growth",
        keywords: &["growth", "development", "learning", "mindset", "creativity"],
    },
    CategoryRule {
        label: "Relationships & Community",
        keywords: &["relationship", "community", "collaboration", "social", "connection"],
    },
];

// ---------------------------------------------------------------------------
// KeywordScore
// ---------------------------------------------------------------------------

/// Priority score and category produced for one prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordScore {
    pub score: u32,
    pub category: &'static str,
}

// ---------------------------------------------------------------------------
// KeywordScorer
// ---------------------------------------------------------------------------

/// Scores prompts against the built-in keyword tiers and category rules.
///
/// # Example
/// ```rust
/// use knowledge_capture::scoring::KeywordScorer;
///
/// let scorer = KeywordScorer::new();
/// let result = scorer.score("How can AI support wisdom?");
/// assert_eq!(result.category, "Technology & Future");
/// assert_eq!(result.score, 6);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordScorer;

impl KeywordScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score and categorize `text`.
    pub fn score(&self, text: &str) -> KeywordScore {
        let lower = text.to_lowercase();
        KeywordScore {
            score: priority_score(&lower),
            category: categorize(&lower),
        }
    }
}

/// Score and categorize `text` with the built-in tables.
pub fn score_keyword(text: &str) -> (u32, &'static str) {
    let result = KeywordScorer::new().score(text);
    (result.score, result.category)
}

fn priority_score(lower: &str) -> u32 {
    let total: i32 = TIERS
        .iter()
        .map(|tier| {
            let hits = tier.keywords.iter().filter(|kw| lower.contains(**kw)).count() as i32;
            hits * tier.weight
        })
        .sum();
    total.max(0) as u32
}

fn categorize(lower: &str) -> &'static str {
    CATEGORY_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lower.contains(kw)))
        .map(|rule| rule.label)
        .unwrap_or(FALLBACK_CATEGORY)
}

/// Category labels in rule order, followed by the fallback.
pub fn category_labels() -> Vec<&'static str> {
    CATEGORY_RULES
        .iter()
        .map(|rule| rule.label)
        .chain(std::iter::once(FALLBACK_CATEGORY))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
