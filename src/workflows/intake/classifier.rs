//! Bag-of-words topic classifier.
//!
//! Question texts are turned into TF-IDF vectors and fed to a multinomial
//! naive Bayes model. The vectorizer lowercases its input and keeps word
//! tokens of at least two alphanumeric characters; idf is smoothed as
//! `ln((1 + n) / (1 + df)) + 1` and each document vector is L2-normalized.

use super::question_bank::QuestionBank;
use std::collections::{BTreeMap, HashMap};
use tracing::info;

const SMOOTHING_ALPHA: f64 = 1.0;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("cannot train a classifier without labelled questions")]
    EmptyTrainingSet,
    #[error("classifier has not been trained")]
    Untrained,
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_lowercase)
}

#[derive(Debug, Clone)]
struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    fn fit(documents: &[&str]) -> Self {
        let mut vocabulary: BTreeMap<String, usize> = BTreeMap::new();
        for document in documents {
            let mut seen: Vec<String> = tokenize(document).collect();
            seen.sort();
            seen.dedup();
            for token in seen {
                *vocabulary.entry(token).or_insert(0) += 1;
            }
        }

        let total = documents.len() as f64;
        let mut idf = Vec::with_capacity(vocabulary.len());
        let vocabulary = vocabulary
            .into_iter()
            .enumerate()
            .map(|(index, (token, document_frequency))| {
                idf.push(((1.0 + total) / (1.0 + document_frequency as f64)).ln() + 1.0);
                (token, index)
            })
            .collect();

        Self { vocabulary, idf }
    }

    /// Sparse, L2-normalized TF-IDF weights. Unknown tokens are dropped.
    fn transform(&self, document: &str) -> Vec<(usize, f64)> {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokenize(document) {
            if let Some(&index) = self.vocabulary.get(&token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut weights: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index]))
            .collect();

        let norm = weights.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in &mut weights {
                *weight /= norm;
            }
        }
        weights
    }

    fn features(&self) -> usize {
        self.idf.len()
    }
}

#[derive(Debug, Clone)]
struct MultinomialNaiveBayes {
    labels: Vec<String>,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNaiveBayes {
    fn fit(
        samples: &[Vec<(usize, f64)>],
        targets: &[usize],
        labels: Vec<String>,
        features: usize,
    ) -> Self {
        let classes = labels.len();
        let mut class_counts = vec![0usize; classes];
        let mut feature_counts = vec![vec![0.0; features]; classes];

        for (sample, &class) in samples.iter().zip(targets) {
            class_counts[class] += 1;
            for &(feature, weight) in sample {
                feature_counts[class][feature] += weight;
            }
        }

        let total = samples.len() as f64;
        let class_log_prior = class_counts
            .iter()
            .map(|&count| (count as f64 / total).ln())
            .collect();

        let feature_log_prob = feature_counts
            .into_iter()
            .map(|counts| {
                let denominator = counts.iter().sum::<f64>() + SMOOTHING_ALPHA * features as f64;
                counts
                    .into_iter()
                    .map(|count| ((count + SMOOTHING_ALPHA) / denominator).ln())
                    .collect()
            })
            .collect();

        Self {
            labels,
            class_log_prior,
            feature_log_prob,
        }
    }

    fn predict(&self, sample: &[(usize, f64)]) -> &str {
        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (class, prior) in self.class_log_prior.iter().enumerate() {
            let score = prior
                + sample
                    .iter()
                    .map(|&(feature, weight)| weight * self.feature_log_prob[class][feature])
                    .sum::<f64>();
            if score > best_score {
                best = class;
                best_score = score;
            }
        }
        &self.labels[best]
    }
}

#[derive(Debug, Clone)]
struct TrainedModel {
    vectorizer: TfidfVectorizer,
    model: MultinomialNaiveBayes,
}

/// Maps free text to the most probable question-bank topic.
#[derive(Debug, Clone, Default)]
pub struct TopicClassifier {
    trained: Option<TrainedModel>,
}

impl TopicClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fits a fresh model on every question of the bank, labelled by topic.
    /// Any previously trained state is discarded.
    pub fn train(&mut self, bank: &QuestionBank) -> Result<(), ClassifierError> {
        self.trained = None;
        let (texts, topics): (Vec<&str>, Vec<&str>) = bank.training_pairs().unzip();
        self.trained = Some(fit(&texts, &topics)?);
        info!(
            samples = texts.len(),
            topics = bank.len(),
            "topic classifier trained"
        );
        Ok(())
    }

    pub fn is_trained(&self) -> bool {
        self.trained.is_some()
    }

    pub fn predict(&self, text: &str) -> Result<&str, ClassifierError> {
        let trained = self.trained.as_ref().ok_or(ClassifierError::Untrained)?;
        let sample = trained.vectorizer.transform(text);
        Ok(trained.model.predict(&sample))
    }
}

fn fit(texts: &[&str], topics: &[&str]) -> Result<TrainedModel, ClassifierError> {
    if texts.is_empty() {
        return Err(ClassifierError::EmptyTrainingSet);
    }

    let mut labels: Vec<String> = topics.iter().map(|topic| topic.to_string()).collect();
    labels.sort();
    labels.dedup();
    let targets: Vec<usize> = topics
        .iter()
        .filter_map(|topic| labels.binary_search_by(|label| label.as_str().cmp(topic)).ok())
        .collect();

    let vectorizer = TfidfVectorizer::fit(texts);
    let samples: Vec<Vec<(usize, f64)>> = texts
        .iter()
        .map(|text| vectorizer.transform(text))
        .collect();
    let model = MultinomialNaiveBayes::fit(&samples, &targets, labels, vectorizer.features());

    Ok(TrainedModel { vectorizer, model })
}
