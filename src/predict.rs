//! Proposal outcome prediction.
//!
//! A small TF-IDF vectorizer plus a nearest-centroid classifier, trained
//! once at service start-up from an embedded corpus of historical proposals
//! and immutable afterwards. The model is deliberately tiny: it stands in
//! for a real classifier trained on historical DAO data, and its job is to
//! produce a stable `(probability, confidence)` pair, never to throw; any
//! degenerate internal state yields the neutral pair (0.5, 0.5).

use std::collections::HashMap;

struct TrainingRow {
    text: &'static str,
    reputation: f32,
    complexity: f32,
    sentiment: f32,
    financial_impact: f32,
    passed: bool,
}

/// Historical proposals with hand-labelled outcomes. In production this
/// corpus would come from indexed governance history.
const TRAINING_SET: [TrainingRow; 10] = [
    TrainingRow {
        text: "Increase treasury allocation to DeFi protocols",
        reputation: 0.8,
        complexity: 0.6,
        sentiment: 0.7,
        financial_impact: 0.8,
        passed: true,
    },
    TrainingRow {
        text: "Reduce governance token supply",
        reputation: 0.6,
        complexity: 0.8,
        sentiment: 0.3,
        financial_impact: 0.9,
        passed: false,
    },
    TrainingRow {
        text: "Add new validator to the network",
        reputation: 0.9,
        complexity: 0.4,
        sentiment: 0.8,
        financial_impact: 0.3,
        passed: true,
    },
    TrainingRow {
        text: "Update smart contract parameters",
        reputation: 0.7,
        complexity: 0.7,
        sentiment: 0.5,
        financial_impact: 0.6,
        passed: false,
    },
    TrainingRow {
        text: "Distribute rewards to token holders",
        reputation: 0.5,
        complexity: 0.3,
        sentiment: 0.9,
        financial_impact: 0.7,
        passed: true,
    },
    TrainingRow {
        text: "Implement new security measures",
        reputation: 0.8,
        complexity: 0.9,
        sentiment: 0.6,
        financial_impact: 0.5,
        passed: true,
    },
    TrainingRow {
        text: "Change voting mechanism",
        reputation: 0.4,
        complexity: 0.8,
        sentiment: 0.2,
        financial_impact: 0.8,
        passed: false,
    },
    TrainingRow {
        text: "Allocate funds for development",
        reputation: 0.7,
        complexity: 0.5,
        sentiment: 0.7,
        financial_impact: 0.6,
        passed: true,
    },
    TrainingRow {
        text: "Update tokenomics model",
        reputation: 0.6,
        complexity: 0.7,
        sentiment: 0.4,
        financial_impact: 0.8,
        passed: false,
    },
    TrainingRow {
        text: "Implement cross-chain bridge",
        reputation: 0.8,
        complexity: 0.6,
        sentiment: 0.7,
        financial_impact: 0.5,
        passed: true,
    },
];

const STOP_WORDS: [&str; 24] = [
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "in", "is", "it", "of",
    "on", "or", "that", "the", "this", "to", "was", "will", "with",
];

const MAX_FEATURES: usize = 1000;

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

/// Vocabulary + inverse-document-frequency weights fitted over a corpus.
struct Vectorizer {
    vocab: HashMap<String, usize>,
    idf: Vec<f32>,
}

impl Vectorizer {
    fn fit(corpus: &[&str]) -> Self {
        let mut vocab: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: Vec<u32> = Vec::new();

        for doc in corpus {
            let mut seen: Vec<usize> = Vec::new();
            for tok in tokenize(doc) {
                let idx = match vocab.get(&tok) {
                    Some(&i) => i,
                    None => {
                        if vocab.len() >= MAX_FEATURES {
                            continue;
                        }
                        let i = vocab.len();
                        vocab.insert(tok, i);
                        doc_freq.push(0);
                        i
                    }
                };
                if !seen.contains(&idx) {
                    seen.push(idx);
                    doc_freq[idx] += 1;
                }
            }
        }

        let n = corpus.len() as f32;
        let idf = doc_freq
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f32)).ln() + 1.0)
            .collect();

        Self { vocab, idf }
    }

    fn transform(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.vocab.len()];
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return vec;
        }
        for tok in &tokens {
            if let Some(&idx) = self.vocab.get(tok) {
                vec[idx] += 1.0;
            }
        }
        let total = tokens.len() as f32;
        for (i, v) in vec.iter_mut().enumerate() {
            *v = (*v / total) * self.idf[i];
        }
        vec
    }
}

/// Numeric features fed to the model alongside the text vector.
#[derive(Debug, Clone, Copy)]
pub struct PredictionFeatures {
    pub proposer_reputation: f32,
    /// Word count / 100, a crude complexity proxy.
    pub complexity: f32,
    pub sentiment: f32,
    pub financial_impact: f32,
}

impl PredictionFeatures {
    /// Complexity proxy from the raw proposal text.
    pub fn complexity_of(text: &str) -> f32 {
        text.split_whitespace().count() as f32 / 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomePrediction {
    /// Probability of the proposal passing, in [0,1].
    pub probability: f32,
    /// Confidence in the probability, in [0.5,1] by construction.
    pub confidence: f32,
}

impl OutcomePrediction {
    pub const NEUTRAL: Self = Self {
        probability: 0.5,
        confidence: 0.5,
    };
}

/// Trained vectorizer + per-class centroids. Built once, then shared
/// read-only across requests.
pub struct OutcomePredictor {
    vectorizer: Vectorizer,
    centroid_passed: Vec<f32>,
    centroid_failed: Vec<f32>,
}

impl OutcomePredictor {
    /// Fit the vectorizer and class centroids over the embedded corpus.
    pub fn train() -> Self {
        let corpus: Vec<&str> = TRAINING_SET.iter().map(|r| r.text).collect();
        let vectorizer = Vectorizer::fit(&corpus);

        let dim = vectorizer.vocab.len() + 4;
        let mut centroid_passed = vec![0.0f32; dim];
        let mut centroid_failed = vec![0.0f32; dim];
        let mut n_passed = 0u32;
        let mut n_failed = 0u32;

        for row in &TRAINING_SET {
            let mut v = vectorizer.transform(row.text);
            v.extend_from_slice(&[
                row.reputation,
                row.complexity,
                row.sentiment,
                row.financial_impact,
            ]);
            let (centroid, n) = if row.passed {
                (&mut centroid_passed, &mut n_passed)
            } else {
                (&mut centroid_failed, &mut n_failed)
            };
            for (c, x) in centroid.iter_mut().zip(&v) {
                *c += x;
            }
            *n += 1;
        }

        for c in centroid_passed.iter_mut() {
            *c /= n_passed.max(1) as f32;
        }
        for c in centroid_failed.iter_mut() {
            *c /= n_failed.max(1) as f32;
        }

        Self {
            vectorizer,
            centroid_passed,
            centroid_failed,
        }
    }

    /// Distance-weighted class probability. Ties and any non-finite
    /// intermediate collapse to the neutral pair.
    pub fn predict(&self, text: &str, features: &PredictionFeatures) -> OutcomePrediction {
        let mut v = self.vectorizer.transform(text);
        v.extend_from_slice(&[
            features.proposer_reputation,
            features.complexity,
            features.sentiment,
            features.financial_impact,
        ]);

        let d_pass = euclidean(&v, &self.centroid_passed);
        let d_fail = euclidean(&v, &self.centroid_failed);
        let denom = d_pass + d_fail;
        if !denom.is_finite() || denom <= f32::EPSILON {
            return OutcomePrediction::NEUTRAL;
        }

        // Closer to the "passed" centroid means a higher pass probability.
        let probability = (d_fail / denom).clamp(0.0, 1.0);
        if !probability.is_finite() {
            return OutcomePrediction::NEUTRAL;
        }
        let confidence = probability.max(1.0 - probability);

        OutcomePrediction {
            probability,
            confidence,
        }
    }
}

fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(reputation: f32, sentiment: f32, financial: f32, text: &str) -> PredictionFeatures {
        PredictionFeatures {
            proposer_reputation: reputation,
            complexity: PredictionFeatures::complexity_of(text),
            sentiment,
            financial_impact: financial,
        }
    }

    #[test]
    fn prediction_is_bounded_and_confident() {
        let model = OutcomePredictor::train();
        let text = "Increase treasury allocation to DeFi protocols";
        let p = model.predict(text, &features(0.8, 0.7, 0.8, text));
        assert!((0.0..=1.0).contains(&p.probability));
        assert!((0.5..=1.0).contains(&p.confidence));
    }

    #[test]
    fn prediction_is_deterministic() {
        let model = OutcomePredictor::train();
        let text = "Change voting mechanism for the council";
        let f = features(0.4, 0.2, 0.8, text);
        let a = model.predict(text, &f);
        let b = model.predict(text, &f);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_text_still_produces_valid_pair() {
        let model = OutcomePredictor::train();
        let p = model.predict("", &features(0.5, 0.0, 0.5, ""));
        assert!((0.0..=1.0).contains(&p.probability));
        assert!((0.5..=1.0).contains(&p.confidence));
    }

    #[test]
    fn training_vocabulary_is_nonempty_and_capped() {
        let model = OutcomePredictor::train();
        assert!(!model.vectorizer.vocab.is_empty());
        assert!(model.vectorizer.vocab.len() <= MAX_FEATURES);
    }

    #[test]
    fn complexity_proxy_counts_words() {
        let c = PredictionFeatures::complexity_of("one two three four");
        assert!((c - 0.04).abs() < 1e-6);
    }

    #[test]
    fn neutral_pair_is_half_half() {
        assert_eq!(OutcomePrediction::NEUTRAL.probability, 0.5);
        assert_eq!(OutcomePrediction::NEUTRAL.confidence, 0.5);
    }
}
