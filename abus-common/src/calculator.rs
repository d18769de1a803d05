//! Weighted-and-normalized ABUS calculator
//!
//! Alternative to [`crate::aggregate`]. Each category score is the
//! subfeature-weighted mean divided by [`MAX_SUBFEATURE_SCORE`], landing in
//! [0, 1]. The ABUS total is the plain sum of `category_score * weight`;
//! callers pick category weights that add up to 100 to get a 0-100 figure.
//! There is no fallback when weights are missing: zero total weight gives 0.

use crate::document::ScoringDocument;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Highest score a single subfeature can carry
pub const MAX_SUBFEATURE_SCORE: f64 = 2.0;

fn default_subfeature_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedSubfeature {
    #[serde(default)]
    pub score: f64,
    #[serde(default = "default_subfeature_weight")]
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightedCategory {
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub subfeatures: BTreeMap<String, WeightedSubfeature>,
}

/// Calculator over a set of weighted categories
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreCalculator {
    categories: BTreeMap<String, WeightedCategory>,
}

impl ScoreCalculator {
    pub fn new(categories: BTreeMap<String, WeightedCategory>) -> Self {
        Self { categories }
    }

    /// Build from a scoring document; every subfeature gets weight 1
    pub fn from_document(document: &ScoringDocument) -> Self {
        let categories = document
            .iter()
            .map(|(name, entry)| {
                let subfeatures = entry
                    .subfeatures
                    .iter()
                    .map(|(sub, s)| {
                        (
                            sub.clone(),
                            WeightedSubfeature {
                                score: s.score,
                                weight: default_subfeature_weight(),
                            },
                        )
                    })
                    .collect();
                (
                    name.clone(),
                    WeightedCategory {
                        weight: entry.weight,
                        subfeatures,
                    },
                )
            })
            .collect();

        Self { categories }
    }

    /// Normalized [0, 1] score for one category; 0.0 when unknown or empty
    pub fn category_score(&self, category: &str) -> f64 {
        let Some(cat) = self.categories.get(category) else {
            return 0.0;
        };

        let (weighted_sum, total_weight) = cat
            .subfeatures
            .values()
            .fold((0.0, 0.0), |(sum, total), s| {
                (sum + s.score * s.weight, total + s.weight)
            });

        if total_weight == 0.0 {
            return 0.0;
        }
        (weighted_sum / total_weight) / MAX_SUBFEATURE_SCORE
    }

    /// Sum of normalized category scores times category weight
    pub fn abus_score(&self) -> f64 {
        let total_weight: f64 = self.categories.values().map(|c| c.weight).sum();
        if total_weight == 0.0 {
            return 0.0;
        }

        self.categories
            .iter()
            .map(|(name, cat)| self.category_score(name) * cat.weight)
            .sum()
    }

    /// Normalized score of every category
    pub fn detailed_scores(&self) -> BTreeMap<String, f64> {
        self.categories
            .keys()
            .map(|name| (name.clone(), self.category_score(name)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use serde_json::json;

    fn calculator(value: serde_json::Value) -> ScoreCalculator {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_category_score_is_weighted_and_normalized() {
        let calc = calculator(json!({
            "usability": {
                "weight": 40,
                "subfeatures": {
                    "code_availability": {"score": 2, "weight": 3},
                    "setup_ease": {"score": 0}
                }
            }
        }));

        // (2*3 + 0*1) / 4 / 2
        assert_eq!(calc.category_score("usability"), 0.75);
        assert_eq!(calc.category_score("missing"), 0.0);
    }

    #[test]
    fn test_abus_score_on_hundred_scale() {
        let calc = calculator(json!({
            "a": {"weight": 60, "subfeatures": {"x": {"score": 2}}},
            "b": {"weight": 40, "subfeatures": {"y": {"score": 1}}}
        }));

        assert_eq!(calc.abus_score(), 80.0);
        let detail = calc.detailed_scores();
        assert_eq!(detail["a"], 1.0);
        assert_eq!(detail["b"], 0.5);
    }

    #[test]
    fn test_zero_weights_give_zero_total() {
        let calc = calculator(json!({
            "a": {"subfeatures": {"x": {"score": 2}}}
        }));

        assert_eq!(calc.abus_score(), 0.0);
    }

    #[test]
    fn test_differs_from_plain_average_strategy() {
        let calc = calculator(json!({
            "a": {"weight": 0, "subfeatures": {"x": {"score": 2}}},
            "b": {"weight": 0, "subfeatures": {"y": {"score": 1}}}
        }));
        let document: ScoringDocument = serde_json::from_value(json!({
            "a": {"weight": 0, "subfeatures": {"x": {"score": 2}}},
            "b": {"weight": 0, "subfeatures": {"y": {"score": 1}}}
        }))
        .unwrap();

        // Plain averaging falls back to equal weights; the calculator does not
        assert_eq!(aggregate("M", &document).overall, 1.5);
        assert_eq!(calc.abus_score(), 0.0);
        assert_eq!(ScoreCalculator::from_document(&document), calc);
    }
}
