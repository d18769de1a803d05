//! Evidence scoring
//!
//! An [`EvidenceScorer`] turns free text (a paper, a README) into a 0/1/2
//! judgement for every subfeature in a [`Schema`]. [`KeywordScorer`] is the
//! deterministic reference strategy; any other implementation of the trait
//! can be swapped in.

use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Note used when no keyword matched
pub const NO_EVIDENCE_NOTE: &str = "no keyword evidence";

/// Judgement for one subfeature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub score: u8,
    pub note: String,
}

/// category -> subfeature -> evidence
pub type EvidenceScores = BTreeMap<String, BTreeMap<String, Evidence>>;

/// Strategy mapping text to per-subfeature scores
///
/// Implementations must cover every (category, subfeature) pair of the
/// schema exactly once and must not add pairs absent from it.
pub trait EvidenceScorer: Send + Sync {
    fn score(&self, text: &str, schema: &Schema) -> EvidenceScores;
}

/// category -> subfeature -> keywords
pub type KeywordTable = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Case-insensitive whole-word keyword counter
///
/// Total hits below `low` score 0, below `high` score 1, otherwise 2.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    keywords: KeywordTable,
    low: usize,
    high: usize,
}

impl Default for KeywordScorer {
    fn default() -> Self {
        Self::new(default_keywords(), 2, 5)
    }
}

impl KeywordScorer {
    pub fn new(keywords: KeywordTable, low: usize, high: usize) -> Self {
        Self {
            keywords,
            low,
            high,
        }
    }

    /// Replace the hit-count thresholds, keeping the keyword table
    pub fn with_thresholds(mut self, low: usize, high: usize) -> Self {
        self.low = low;
        self.high = high;
        self
    }

    fn score_for_hits(&self, hits: usize) -> u8 {
        if hits < self.low {
            0
        } else if hits < self.high {
            1
        } else {
            2
        }
    }

    fn judge(&self, text: &str, keywords: &[String]) -> Evidence {
        let mut hits = 0;
        let mut note_bits = Vec::new();

        for kw in keywords {
            let count = count_whole_word(text, &kw.to_lowercase());
            if count > 0 {
                hits += count;
                note_bits.push(format!("{}×{}", kw, count));
            }
        }

        let note = if note_bits.is_empty() {
            NO_EVIDENCE_NOTE.to_string()
        } else {
            note_bits.join(" | ")
        };

        Evidence {
            score: self.score_for_hits(hits),
            note,
        }
    }
}

impl EvidenceScorer for KeywordScorer {
    fn score(&self, text: &str, schema: &Schema) -> EvidenceScores {
        let text = text.to_lowercase();

        schema
            .iter()
            .map(|(category, subfeatures)| {
                let judged: BTreeMap<String, Evidence> = subfeatures
                    .iter()
                    .map(|sub| {
                        let keywords = self
                            .keywords
                            .get(category)
                            .and_then(|subs| subs.get(sub))
                            .map(Vec::as_slice)
                            .unwrap_or(&[]);
                        (sub.clone(), self.judge(&text, keywords))
                    })
                    .collect();
                (category.clone(), judged)
            })
            .collect()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Count non-overlapping occurrences of `needle` bounded by word boundaries
/// on both ends (regex `\bneedle\b` semantics)
fn count_whole_word(haystack: &str, needle: &str) -> usize {
    let (Some(first), Some(last)) = (needle.chars().next(), needle.chars().next_back()) else {
        return 0;
    };
    let first_is_word = is_word_char(first);
    let last_is_word = is_word_char(last);

    let mut count = 0;
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        let begin = start + pos;
        let end = begin + needle.len();

        let before_is_word = haystack[..begin].chars().next_back().is_some_and(is_word_char);
        let after_is_word = haystack[end..].chars().next().is_some_and(is_word_char);

        if before_is_word != first_is_word && after_is_word != last_is_word {
            count += 1;
            start = end;
        } else {
            start = begin + haystack[begin..].chars().next().map_or(1, char::len_utf8);
        }
    }
    count
}

/// Built-in keyword rubric for the standard ABUS categories
pub fn default_keywords() -> KeywordTable {
    let table: &[(&str, &[(&str, &[&str])])] = &[
        (
            "adaptability",
            &[
                (
                    "modular_architecture",
                    &["modular", "adapter", "plugin", "component", "modularity"],
                ),
                (
                    "transferability",
                    &["transfer", "generalize", "few-shot", "multi-task", "domain adaptation"],
                ),
            ],
        ),
        (
            "bioinformatics_relevance",
            &[
                (
                    "biological_input_modalities",
                    &["sequence", "structure", "phenotype", "annotation", "omics"],
                ),
                (
                    "structural_awareness",
                    &["3d", "folding", "torsion", "angle", "structural"],
                ),
            ],
        ),
        (
            "usability",
            &[
                (
                    "code_availability",
                    &["github", "repository", "open-source", "code", "license"],
                ),
                (
                    "documentation_quality",
                    &["readme", "docs", "documentation", "tutorial", "api reference"],
                ),
                (
                    "setup_ease",
                    &["pip install", "conda", "requirements.txt", "docker", "setup"],
                ),
            ],
        ),
        (
            "computational_efficiency",
            &[
                (
                    "parameter_count_efficiency",
                    &["parameters", "million", "billion", "lightweight", "compact"],
                ),
                (
                    "runtime_scalability",
                    &["throughput", "latency", "scalable", "speed", "gpu", "inference"],
                ),
            ],
        ),
        (
            "output_suitability",
            &[
                (
                    "output_interpretability",
                    &["interpret", "attention", "explain", "saliency", "attribution"],
                ),
                (
                    "task_alignment",
                    &[
                        "function prediction",
                        "secondary structure",
                        "mutation effect",
                        "phenotype",
                    ],
                ),
            ],
        ),
    ];

    table
        .iter()
        .map(|(category, subs)| {
            let subs: BTreeMap<String, Vec<String>> = subs
                .iter()
                .map(|(sub, kws)| (sub.to_string(), kws.iter().map(|k| k.to_string()).collect()))
                .collect();
            (category.to_string(), subs)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn schema(pairs: &[(&str, &[&str])]) -> Schema {
        pairs
            .iter()
            .map(|(cat, subs)| {
                (
                    cat.to_string(),
                    subs.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
                )
            })
            .collect()
    }

    #[test]
    fn test_whole_word_counting() {
        assert_eq!(count_whole_word("code and more code", "code"), 2);
        assert_eq!(count_whole_word("codebase", "code"), 0);
        assert_eq!(count_whole_word("source-code.", "code"), 1);
        assert_eq!(count_whole_word("run pip install now", "pip install"), 1);
        assert_eq!(count_whole_word("see requirements.txt", "requirements.txt"), 1);
        assert_eq!(count_whole_word("anything", ""), 0);
    }

    #[test]
    fn test_scores_bucket_by_hits() {
        let scorer = KeywordScorer::default();
        let s = schema(&[("usability", &["code_availability", "setup_ease"])]);

        let text = "Code is on GitHub under an open-source license. Docker image provided.";
        let out = scorer.score(text, &s);

        let code = &out["usability"]["code_availability"];
        assert_eq!(code.score, 1);
        assert_eq!(code.note, "github×1 | open-source×1 | code×1 | license×1");

        // One hit is below the first threshold
        let setup = &out["usability"]["setup_ease"];
        assert_eq!(setup.score, 0);
        assert_eq!(setup.note, "docker×1");
    }

    #[test]
    fn test_five_hits_scores_two() {
        let scorer = KeywordScorer::default();
        let s = schema(&[("adaptability", &["modular_architecture"])]);

        let out = scorer.score("modular modular plugin adapter component", &s);

        assert_eq!(out["adaptability"]["modular_architecture"].score, 2);
    }

    #[test]
    fn test_covers_exactly_the_schema() {
        let scorer = KeywordScorer::default();
        let s = schema(&[("usability", &["setup_ease"]), ("novel", &["unknown_sub"])]);

        let out = scorer.score("nothing relevant", &s);

        assert_eq!(out.len(), 2);
        assert_eq!(out["usability"].len(), 1);
        assert!(!out.contains_key("adaptability"));
        let unknown = &out["novel"]["unknown_sub"];
        assert_eq!(unknown.score, 0);
        assert_eq!(unknown.note, NO_EVIDENCE_NOTE);
    }

    #[test]
    fn test_deterministic() {
        let scorer = KeywordScorer::default().with_thresholds(1, 2);
        let s = schema(&[
            ("usability", &["code_availability", "documentation_quality"]),
            ("computational_efficiency", &["runtime_scalability"]),
        ]);
        let text = "GPU inference with high throughput; see the README and docs.";

        assert_eq!(scorer.score(text, &s), scorer.score(text, &s));
        assert_eq!(
            scorer.score(text, &s)["computational_efficiency"]["runtime_scalability"].score,
            2
        );
    }
}
