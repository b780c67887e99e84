//! Semantic alignment scoring against fixed mission themes.
//!
//! Each [`Theme`] has a canonical description that is embedded once per run
//! into [`ThemeVectors`].  A prompt's embedding is compared to every theme
//! by cosine similarity; the alignment score is the weighted sum
//!
//! ```text
//! technology × 1.5 + biology × 1.5 + humanity × 1.0
//!   + generation_alpha × 2.0 + systems_thinking × 1.2
//! ```
//!
//! and the category is the label of the most similar theme, ties resolved
//! by [`Theme::ALL`] order.

use serde::{Deserialize, Serialize};

use crate::embed::{EmbedError, Embedder};

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// One axis of the mission rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    Technology,
    Biology,
    Humanity,
    GenerationAlpha,
    SystemsThinking,
}

impl Theme {
    /// All themes in tie-break priority order.
    pub const ALL: [Theme; 5] = [
        Theme::Technology,
        Theme::Biology,
        Theme::Humanity,
        Theme::GenerationAlpha,
        Theme::SystemsThinking,
    ];

    /// Stable key used in serialized theme scores.
    pub fn key(self) -> &'static str {
        match self {
            Theme::Technology => "technology_alignment",
            Theme::Biology => "biology_alignment",
            Theme::Humanity => "humanity_alignment",
            Theme::GenerationAlpha => "generation_alpha",
            Theme::SystemsThinking => "systems_thinking",
        }
    }

    /// Category label assigned when this theme is the closest.
    pub fn label(self) -> &'static str {
        match self {
            Theme::Technology => "Technology & Future",
            Theme::Biology => "Biology & Health",
            Theme::Humanity => "Ethics & Humanity",
            Theme::GenerationAlpha => "Generation Alpha",
            Theme::SystemsThinking => "Systems & Integration",
        }
    }

    /// Weight of this theme in the alignment score.
    pub fn weight(self) -> f64 {
        match self {
            Theme::Technology => 1.5,
            Theme::Biology => 1.5,
            Theme::Humanity => 1.0,
            Theme::GenerationAlpha => 2.0,
            Theme::SystemsThinking => 1.2,
        }
    }

    /// Canonical description embedded to obtain the theme vector.
    pub fn description(self) -> &'static str {
        match self {
            Theme::Technology => {
                "Advanced technologies, AI, automation, digital transformation, \
                 biotechnology, augmented reality, virtual reality, human-computer interaction, \
                 technological evolution, innovation for humanity"
            }
            Theme::Biology => {
                "Human biology, genetics, neuroscience, health optimization, \
                 longevity, wellness, biological systems, brain function, \
                 human potential, biohacking, regenerative medicine"
            }
            Theme::Humanity => {
                "Human values, ethics, consciousness, collective wisdom, \
                 social connection, empathy, compassion, human flourishing, \
                 meaning, purpose, spiritual growth, humanity's future"
            }
            Theme::GenerationAlpha => {
                "Future generations, children, youth, education for tomorrow, \
                 preparing young minds, generation alpha, next generation, \
                 childhood development, learning systems, youth empowerment"
            }
            Theme::SystemsThinking => {
                "Systems thinking, holistic integration, interconnection, \
                 complexity, emergence, synergy, harmony between systems, \
                 whole systems design, ecological thinking, integration"
            }
        }
    }

    fn index(self) -> usize {
        match self {
            Theme::Technology => 0,
            Theme::Biology => 1,
            Theme::Humanity => 2,
            Theme::GenerationAlpha => 3,
            Theme::SystemsThinking => 4,
        }
    }
}

// ---------------------------------------------------------------------------
// Cosine similarity
// ---------------------------------------------------------------------------

/// Cosine similarity of two vectors.
///
/// Returns `0.0` when either vector has zero norm or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}

// ---------------------------------------------------------------------------
// ThemeVectors
// ---------------------------------------------------------------------------

/// Embeddings of every theme description, computed once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeVectors {
    vectors: [Vec<f32>; 5],
}

impl ThemeVectors {
    /// Build from precomputed vectors in [`Theme::ALL`] order.
    pub fn from_vectors(vectors: [Vec<f32>; 5]) -> Self {
        Self { vectors }
    }

    /// Embed all theme descriptions in a single provider call.
    pub async fn embed(embedder: &dyn Embedder) -> Result<Self, EmbedError> {
        let descriptions: Vec<&str> = Theme::ALL.iter().map(|t| t.description()).collect();
        let vectors = embedder.embed_batch(&descriptions).await?;

        let got = vectors.len();
        let vectors: [Vec<f32>; 5] = vectors
            .try_into()
            .map_err(|_| EmbedError::CountMismatch { expected: 5, got })?;

        let expected = vectors[0].len();
        for vector in &vectors {
            check_vector(vector, expected)?;
        }

        log::info!(
            "scoring: embedded {} theme descriptions ({} dimensions)",
            Theme::ALL.len(),
            vectors[0].len()
        );
        Ok(Self { vectors })
    }

    pub fn get(&self, theme: Theme) -> &[f32] {
        &self.vectors[theme.index()]
    }

    /// Length of the theme vectors.
    pub fn dimension(&self) -> usize {
        self.vectors[0].len()
    }
}

/// Reject vectors that cannot be compared with the theme vectors.
fn check_vector(vector: &[f32], expected: usize) -> Result<(), EmbedError> {
    if vector.len() != expected || vector.is_empty() {
        return Err(EmbedError::DimensionMismatch {
            expected,
            got: vector.len(),
        });
    }
    if vector.iter().any(|x| !x.is_finite()) {
        return Err(EmbedError::NonFinite);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ThemeScores
// ---------------------------------------------------------------------------

/// Similarity of one prompt to each theme.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThemeScores {
    pub technology_alignment: f64,
    pub biology_alignment: f64,
    pub humanity_alignment: f64,
    pub generation_alpha: f64,
    pub systems_thinking: f64,
}

impl ThemeScores {
    pub fn get(&self, theme: Theme) -> f64 {
        match theme {
            Theme::Technology => self.technology_alignment,
            Theme::Biology => self.biology_alignment,
            Theme::Humanity => self.humanity_alignment,
            Theme::GenerationAlpha => self.generation_alpha,
            Theme::SystemsThinking => self.systems_thinking,
        }
    }

    fn set(&mut self, theme: Theme, value: f64) {
        match theme {
            Theme::Technology => self.technology_alignment = value,
            Theme::Biology => self.biology_alignment = value,
            Theme::Humanity => self.humanity_alignment = value,
            Theme::GenerationAlpha => self.generation_alpha = value,
            Theme::SystemsThinking => self.systems_thinking = value,
        }
    }

    /// Weighted alignment score.
    pub fn alignment(&self) -> f64 {
        Theme::ALL.iter().map(|&t| self.get(t) * t.weight()).sum()
    }

    /// Most similar theme; the first in [`Theme::ALL`] order wins ties.
    pub fn primary(&self) -> Theme {
        let mut best = Theme::ALL[0];
        for &theme in &Theme::ALL[1..] {
            if self.get(theme) > self.get(best) {
                best = theme;
            }
        }
        best
    }

    /// Copy with every value rounded to `decimals` places.
    pub fn rounded(&self, decimals: i32) -> Self {
        let mut out = *self;
        for theme in Theme::ALL {
            out.set(theme, round_to(self.get(theme), decimals));
        }
        out
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ---------------------------------------------------------------------------
// EmbeddingScore
// ---------------------------------------------------------------------------

/// Alignment score, category and per-theme similarity for one prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbeddingScore {
    pub alignment: f64,
    pub category: &'static str,
    pub theme_scores: ThemeScores,
}

/// Score an already-embedded prompt against the theme vectors.
pub fn score_embedding(embedding: &[f32], themes: &ThemeVectors) -> EmbeddingScore {
    let mut theme_scores = ThemeScores::default();
    for theme in Theme::ALL {
        theme_scores.set(theme, cosine_similarity(embedding, themes.get(theme)));
    }

    EmbeddingScore {
        alignment: theme_scores.alignment(),
        category: theme_scores.primary().label(),
        theme_scores,
    }
}

// ---------------------------------------------------------------------------
// EmbeddingScorer
// ---------------------------------------------------------------------------

/// Scores prompts with an injected [`Embedder`], reusing the theme vectors
/// for every prompt.
pub struct EmbeddingScorer<'a> {
    embedder: &'a dyn Embedder,
    themes: ThemeVectors,
    batch_size: usize,
}

impl<'a> EmbeddingScorer<'a> {
    /// Embed the theme descriptions and prepare a scorer.
    pub async fn new(embedder: &'a dyn Embedder, batch_size: usize) -> Result<Self, EmbedError> {
        let themes = ThemeVectors::embed(embedder).await?;
        Ok(Self::with_themes(embedder, themes, batch_size))
    }

    /// Prepare a scorer from precomputed theme vectors.
    pub fn with_themes(embedder: &'a dyn Embedder, themes: ThemeVectors, batch_size: usize) -> Self {
        Self {
            embedder,
            themes,
            batch_size: batch_size.max(1),
        }
    }

    pub fn themes(&self) -> &ThemeVectors {
        &self.themes
    }

    /// Score a single prompt.
    pub async fn score(&self, text: &str) -> Result<EmbeddingScore, EmbedError> {
        let embedding = self.embedder.embed(text).await?;
        check_vector(&embedding, self.themes.dimension())?;
        Ok(score_embedding(&embedding, &self.themes))
    }

    /// Score many prompts in batches; results follow input order.
    pub async fn score_all(&self, texts: &[&str]) -> Result<Vec<EmbeddingScore>, EmbedError> {
        let mut scores = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.batch_size) {
            let embeddings = self.embedder.embed_batch(chunk).await?;
            if embeddings.len() != chunk.len() {
                return Err(EmbedError::CountMismatch {
                    expected: chunk.len(),
                    got: embeddings.len(),
                });
            }
            for embedding in &embeddings {
                check_vector(embedding, self.themes.dimension())?;
                scores.push(score_embedding(embedding, &self.themes));
            }
            log::info!("scoring: embedded {}/{} prompts", scores.len(), texts.len());
        }

        Ok(scores)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
