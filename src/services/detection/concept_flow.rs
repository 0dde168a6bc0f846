// Concept Flow Analyzer
// Tracks how topical terms are introduced, developed and related across the
// document. AI text tends toward systematic, evenly-paced concept
// development; human text develops topics unevenly and associatively.
//
// Two passes over the sentence sequence:
//   1. discovery: extract content terms, create/extend concept records
//   2. development: maintain the active-concept window, classify a
//      development event per re-occurrence, record relations between
//      simultaneously active concepts
// All tracker state is scoped to one analysis call.

use super::{mean, population_variance, Analyzer};
use crate::models::AnalyzerScore;
use crate::services::config_store::ConceptConfig;
use crate::services::text_processor::{tokenize_words, SegmentedText};
use crate::services::wordlists::WordLists;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

pub const NAME: &str = "concept_flow";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DevelopmentKind {
    Elaboration,
    Repetition,
    Pivot,
}

#[derive(Debug, Clone)]
pub struct DevelopmentEvent {
    pub sentence: usize,
    pub kind: DevelopmentKind,
}

#[derive(Debug, Clone)]
pub struct Concept {
    pub term: String,
    pub first_sentence: usize,
    pub occurrences: Vec<usize>,
    pub related: BTreeSet<String>,
    pub development: Vec<DevelopmentEvent>,
}

/// Request-scoped concept state; built fresh per analysis call and
/// discarded afterwards. BTreeMap keeps iteration deterministic.
#[derive(Debug, Default)]
pub struct ConceptTracker {
    concepts: BTreeMap<String, Concept>,
    relations: BTreeSet<(String, String)>,
}

impl ConceptTracker {
    pub fn concept_count(&self) -> usize {
        self.concepts.len()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    fn record_occurrence(&mut self, term: &str, sentence: usize) {
        match self.concepts.get_mut(term) {
            Some(concept) => {
                if concept.occurrences.last() != Some(&sentence) {
                    concept.occurrences.push(sentence);
                }
            }
            None => {
                self.concepts.insert(
                    term.to_string(),
                    Concept {
                        term: term.to_string(),
                        first_sentence: sentence,
                        occurrences: vec![sentence],
                        related: BTreeSet::new(),
                        development: Vec::new(),
                    },
                );
            }
        }
    }

    fn record_relation(&mut self, a: &str, b: &str) {
        if a == b {
            return;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        if self.relations.insert((lo.to_string(), hi.to_string())) {
            if let Some(c) = self.concepts.get_mut(lo) {
                c.related.insert(hi.to_string());
            }
            if let Some(c) = self.concepts.get_mut(hi) {
                c.related.insert(lo.to_string());
            }
        }
    }

    /// Terms active at sentence `i`: latest occurrence at or before `i`
    /// lies within the eviction window.
    fn active_at(&self, i: usize, window: usize) -> Vec<&str> {
        self.concepts
            .values()
            .filter_map(|c| {
                let last = c.occurrences.iter().rev().find(|&&occ| occ <= i)?;
                (i - last <= window).then_some(c.term.as_str())
            })
            .collect()
    }
}

pub struct ConceptFlowAnalyzer {
    cfg: ConceptConfig,
    lists: Arc<WordLists>,
}

impl ConceptFlowAnalyzer {
    pub fn new(cfg: ConceptConfig, lists: Arc<WordLists>) -> Self {
        Self { cfg, lists }
    }

    /// Content terms of one sentence: lowercased alphabetic tokens of the
    /// configured minimum length, minus stopwords, deduplicated.
    fn content_terms(&self, sentence: &str) -> BTreeSet<String> {
        tokenize_words(sentence)
            .into_iter()
            .filter(|t| t.chars().count() >= self.cfg.min_term_len)
            .filter(|t| t.chars().all(|c| c.is_alphabetic() || c == '\''))
            .filter(|t| !self.lists.is_stopword(t))
            .collect()
    }

    fn discovery_pass(&self, sentence_terms: &[BTreeSet<String>]) -> ConceptTracker {
        let mut tracker = ConceptTracker::default();
        for (i, terms) in sentence_terms.iter().enumerate() {
            for term in terms {
                tracker.record_occurrence(term, i);
            }
        }
        tracker
    }

    fn development_pass(&self, tracker: &mut ConceptTracker, sentence_terms: &[BTreeSet<String>]) {
        for i in 0..sentence_terms.len() {
            let active: Vec<String> = tracker
                .active_at(i, self.cfg.active_window)
                .into_iter()
                .map(String::from)
                .collect();

            // Classify a development event for each concept re-occurring here.
            for term in &sentence_terms[i] {
                let Some(prev) = tracker
                    .concepts
                    .get(term)
                    .and_then(|c| c.occurrences.iter().rev().find(|&&occ| occ < i))
                    .copied()
                else {
                    continue;
                };

                let kind = classify_development(
                    term,
                    &sentence_terms[i],
                    &sentence_terms[prev],
                    self.cfg.repetition_overlap,
                );
                if let Some(concept) = tracker.concepts.get_mut(term) {
                    concept.development.push(DevelopmentEvent { sentence: i, kind });
                }
            }

            // Relate every pair of simultaneously active concepts.
            for (ai, a) in active.iter().enumerate() {
                for b in active.iter().skip(ai + 1) {
                    tracker.record_relation(a, b);
                }
            }
        }
    }

    fn introduction_regularity(&self, tracker: &ConceptTracker, sentence_count: usize) -> f64 {
        let mut counts = vec![0.0; sentence_count];
        for concept in tracker.concepts.values() {
            counts[concept.first_sentence] += 1.0;
        }
        let m = mean(&counts);
        if m <= 0.0 {
            return 0.0;
        }
        let cv = population_variance(&counts).sqrt() / m;
        1.0 - cv.min(1.0)
    }

    fn development_regularity(&self, tracker: &ConceptTracker) -> f64 {
        let consistencies: Vec<f64> = tracker
            .concepts
            .values()
            .filter(|c| !c.development.is_empty())
            .map(|c| dominant_share(c.development.iter().map(|e| e.kind)))
            .collect();
        if consistencies.is_empty() {
            return 0.0;
        }
        mean(&consistencies)
    }

    fn relation_density(&self, tracker: &ConceptTracker) -> f64 {
        let n = tracker.concept_count();
        if n < 2 {
            return 0.0;
        }
        let possible = (n * (n - 1) / 2) as f64;
        tracker.relation_count() as f64 / possible
    }

    fn event_consistency(&self, tracker: &ConceptTracker) -> f64 {
        let kinds: Vec<DevelopmentKind> = tracker
            .concepts
            .values()
            .flat_map(|c| c.development.iter().map(|e| e.kind))
            .collect();
        if kinds.is_empty() {
            return 0.0;
        }
        dominant_share(kinds.into_iter())
    }
}

/// Compare the concept's surrounding content words against its previous
/// occurrence: strong overlap is repetition, partial overlap elaboration,
/// a fully changed context a pivot.
fn classify_development(
    term: &str,
    current: &BTreeSet<String>,
    previous: &BTreeSet<String>,
    repetition_overlap: f64,
) -> DevelopmentKind {
    let current_ctx: BTreeSet<&str> = current
        .iter()
        .filter(|t| t.as_str() != term)
        .map(|t| t.as_str())
        .collect();
    let previous_ctx: BTreeSet<&str> = previous
        .iter()
        .filter(|t| t.as_str() != term)
        .map(|t| t.as_str())
        .collect();

    let union = current_ctx.union(&previous_ctx).count();
    if union == 0 {
        // The term stands alone in both sentences: pure repetition.
        return DevelopmentKind::Repetition;
    }
    let overlap = current_ctx.intersection(&previous_ctx).count() as f64 / union as f64;

    if overlap >= repetition_overlap {
        DevelopmentKind::Repetition
    } else if overlap > 0.0 {
        DevelopmentKind::Elaboration
    } else {
        DevelopmentKind::Pivot
    }
}

/// Share of the most common event kind.
fn dominant_share(kinds: impl Iterator<Item = DevelopmentKind>) -> f64 {
    let mut counts: BTreeMap<DevelopmentKind, usize> = BTreeMap::new();
    let mut total = 0usize;
    for kind in kinds {
        *counts.entry(kind).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    let max = counts.values().copied().max().unwrap_or(0);
    max as f64 / total as f64
}

impl Analyzer for ConceptFlowAnalyzer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn compute(&self, doc: &SegmentedText) -> AnalyzerScore {
        let sentence_terms: Vec<BTreeSet<String>> = doc
            .sentences
            .iter()
            .map(|s| self.content_terms(s))
            .collect();

        let mut tracker = self.discovery_pass(&sentence_terms);

        // Single-sentence or concept-free input carries no flow signal.
        if doc.sentences.len() < 2 || tracker.concept_count() == 0 {
            return AnalyzerScore::new(NAME, 0.0)
                .with_metric("conceptCount", tracker.concept_count() as f64)
                .with_metric("relationCount", 0.0);
        }

        self.development_pass(&mut tracker, &sentence_terms);

        let introduction = self.introduction_regularity(&tracker, doc.sentences.len());
        let development = self.development_regularity(&tracker);
        let relation = self.relation_density(&tracker);
        let consistency = self.event_consistency(&tracker);

        let score = 100.0
            * (self.cfg.introduction_weight * introduction
                + self.cfg.development_weight * development
                + self.cfg.relation_weight * relation
                + self.cfg.consistency_weight * consistency);

        let event_count: usize = tracker
            .concepts
            .values()
            .map(|c| c.development.len())
            .sum();

        AnalyzerScore::new(NAME, score)
            .with_metric("conceptCount", tracker.concept_count() as f64)
            .with_metric("relationCount", tracker.relation_count() as f64)
            .with_metric("developmentEvents", event_count as f64)
            .with_metric("introductionRegularity", introduction)
            .with_metric("developmentRegularity", development)
            .with_metric("relationDensity", relation)
            .with_metric("eventConsistency", consistency)
    }
}
