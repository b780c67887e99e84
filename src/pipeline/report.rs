//! Run statistics and the end-of-run summary.

use crate::scoring::{in_tier, tier_counts, ScoredPrompt, ScoringMode, Tier};

/// Everything a batch run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub mode: ScoringMode,
    /// Ranked prompts, best first.
    pub prompts: Vec<ScoredPrompt>,
    /// Rows read from the source.
    pub total_rows: usize,
    /// Rows skipped because they had no usable text.
    pub skipped: usize,
    /// Rows dropped as duplicates.
    pub duplicates: usize,
}

impl RunReport {
    /// Prompts per category, most common first; equal counts keep the order
    /// in which the categories first appear in the ranking.
    pub fn category_distribution(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for prompt in &self.prompts {
            match counts.iter_mut().find(|(c, _)| *c == prompt.prompt.category) {
                Some((_, n)) => *n += 1,
                None => counts.push((prompt.prompt.category.clone(), 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    pub fn tier_counts(&self) -> [(Tier, usize); 3] {
        tier_counts(&self.prompts)
    }

    pub fn high_tier(&self) -> Vec<&ScoredPrompt> {
        in_tier(&self.prompts, Tier::High)
    }

    /// Log the run summary: totals, category and tier distribution, and the
    /// top `preview` prompts.
    pub fn log_summary(&self, preview: usize) {
        log::info!("{}", "=".repeat(60));
        log::info!("PROCESSING COMPLETE ({:?} scoring)", self.mode);
        log::info!("{}", "=".repeat(60));
        log::info!("Rows read: {}", self.total_rows);
        log::info!("Total prompts ranked: {}", self.prompts.len());
        if self.skipped > 0 {
            log::warn!("Skipped rows without usable text: {}", self.skipped);
        }
        if self.duplicates > 0 {
            log::info!("Duplicates removed: {}", self.duplicates);
        }

        log::info!("Category distribution:");
        for (category, count) in self.category_distribution() {
            log::info!("  {category}: {count}");
        }

        log::info!("Tier distribution:");
        for (tier, count) in self.tier_counts() {
            log::info!("  {}: {count}", tier.describe(self.mode));
        }

        let top: Vec<&ScoredPrompt> = match self.mode {
            ScoringMode::Keyword => self.high_tier(),
            ScoringMode::Embedding => self.prompts.iter().collect(),
        };
        if !top.is_empty() && preview > 0 {
            log::info!("Top {} prompts:", preview.min(top.len()));
            for (i, p) in top.iter().take(preview).enumerate() {
                log::info!(
                    "  {}. [{}] (score: {:.2}) {}",
                    i + 1,
                    p.prompt.category,
                    p.score.value(),
                    truncate(&p.prompt.text, 100)
                );
            }
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::NormalizedPrompt;
    use crate::scoring::{rank, Score};

    fn report(entries: &[(&str, &str, u32)]) -> RunReport {
        let prompts = entries
            .iter()
            .map(|(text, cat, s)| {
                ScoredPrompt::new(NormalizedPrompt::new(*text, *cat), Score::Priority(*s))
            })
            .collect();
        RunReport {
            mode: ScoringMode::Keyword,
            prompts: rank(prompts),
            total_rows: entries.len(),
            skipped: 0,
            duplicates: 0,
        }
    }

    #[test]
    fn category_distribution_is_sorted_by_count() {
        let r = report(&[
            ("a", "Ethics & Wisdom", 9),
            ("b", "Technology & Future", 8),
            ("c", "Technology & Future", 7),
            ("d", "General Wisdom", 1),
        ]);
        assert_eq!(
            r.category_distribution(),
            vec![
                ("Technology & Future".to_string(), 2),
                ("Ethics & Wisdom".to_string(), 1),
                ("General Wisdom".to_string(), 1),
            ]
        );
    }

    #[test]
    fn high_tier_subset() {
        let r = report(&[("a", "X", 6), ("b", "X", 5), ("c", "X", 12)]);
        let high: Vec<_> = r.high_tier().iter().map(|p| p.prompt.text.as_str()).collect();
        assert_eq!(high, vec!["c", "a"]);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé...");
        assert_eq!(truncate("short", 100), "short");
    }

    #[test]
    fn log_summary_handles_empty_report() {
        let r = report(&[]);
        r.log_summary(10);
        assert!(r.category_distribution().is_empty());
    }
}
