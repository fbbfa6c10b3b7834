use crate::config::FuzzyTieBreak;
use crate::index::ExclusionIndex;
use crate::model::{MatchResult, NormalizedRecord, Record, Signal};

/// Decides, for candidate records, whether they duplicate a reference entry.
pub struct Matcher<'a> {
    index: &'a ExclusionIndex,
}

impl<'a> Matcher<'a> {
    pub fn new(index: &'a ExclusionIndex) -> Self {
        Self { index }
    }

    /// Exact mode, used for bulk filtering.
    ///
    /// Domain, then name, then phone; the first hit rejects the candidate.
    /// Names compare by alphanumeric equality only, never fuzzily.
    pub fn exact(&self, record: &Record) -> MatchResult {
        self.exact_keys(&record.normalized())
    }

    pub fn exact_keys(&self, keys: &NormalizedRecord) -> MatchResult {
        let keys = self.index.indexable(keys);

        let hit = |signal: Signal, refs: &[usize]| MatchResult {
            signals: vec![signal],
            reference: refs.first().copied(),
            confidence: None,
        };

        if let Some(refs) = keys.domain.as_deref().and_then(|k| self.index.domain(k)) {
            return hit(Signal::Website, refs);
        }
        if let Some(refs) = keys.name.as_deref().and_then(|k| self.index.name(k)) {
            return hit(Signal::BusinessName { confidence: None }, refs);
        }
        if let Some(refs) = keys.phone.as_deref().and_then(|k| self.index.phone(k)) {
            return hit(Signal::Phone, refs);
        }
        MatchResult::no_match()
    }

    /// Cross-sheet mode, used for audit reports.
    ///
    /// Evaluates every signal (email, phone, website, name) without
    /// short-circuiting and falls back to fuzzy name matching when the exact
    /// name did not hit. The attributed reference is the email match's if
    /// email fired, else the first other signal's.
    ///
    /// Returns `None` for a record with no normalizable field at all: such a
    /// row is neither a match nor an explicit non-match.
    pub fn cross_sheet(&self, record: &Record) -> Option<MatchResult> {
        let raw = record.normalized();
        if !raw.has_signal() {
            return None;
        }
        let keys = self.index.indexable(&raw);

        let mut signals = Vec::new();
        let mut email_ref = None;
        let mut other_ref = None;
        let mut confidence = None;

        if let Some(refs) = keys.email.as_deref().and_then(|k| self.index.email(k)) {
            signals.push(Signal::Email);
            email_ref = refs.first().copied();
        }
        if let Some(refs) = keys.phone.as_deref().and_then(|k| self.index.phone(k)) {
            signals.push(Signal::Phone);
            other_ref = other_ref.or(refs.first().copied());
        }
        if let Some(refs) = keys.domain.as_deref().and_then(|k| self.index.domain(k)) {
            signals.push(Signal::Website);
            other_ref = other_ref.or(refs.first().copied());
        }
        if let Some(name) = keys.name.as_deref() {
            if let Some(refs) = self.index.name(name) {
                signals.push(Signal::BusinessName { confidence: None });
                other_ref = other_ref.or(refs.first().copied());
            } else if let Some((reference, score)) = self.fuzzy_name(name) {
                signals.push(Signal::BusinessName { confidence: Some(score) });
                other_ref = other_ref.or(Some(reference));
                confidence = Some(score);
            }
        }

        Some(MatchResult {
            signals,
            reference: email_ref.or(other_ref),
            confidence,
        })
    }

    /// Scan indexed names for one scoring at or above the fuzzy threshold.
    /// Returns the reference entry and its score.
    pub fn fuzzy_name(&self, name: &str) -> Option<(usize, u8)> {
        let config = self.index.config();
        let threshold = config.fuzzy_threshold;
        let mut best: Option<(usize, u8)> = None;

        for (candidate, refs) in self.index.names() {
            if score_ceiling(name, candidate) < threshold {
                continue;
            }
            let score = similarity(name, candidate);
            if score < threshold {
                continue;
            }
            let Some(&reference) = refs.first() else {
                continue;
            };
            match config.fuzzy_tie_break {
                FuzzyTieBreak::First => return Some((reference, score)),
                FuzzyTieBreak::Best => {
                    if best.map_or(true, |(_, s)| score > s) {
                        best = Some((reference, score));
                    }
                }
            }
        }

        best
    }
}

/// Normalized Levenshtein similarity as a rounded 0-100 score.
pub fn similarity(a: &str, b: &str) -> u8 {
    (strsim::normalized_levenshtein(a, b) * 100.0).round() as u8
}

/// Upper bound of `similarity` from lengths alone: the edit distance is at
/// least the length difference.
fn score_ceiling(a: &str, b: &str) -> u8 {
    let (la, lb) = (a.chars().count(), b.chars().count());
    let longest = la.max(lb);
    if longest == 0 {
        return 100;
    }
    let diff = la.abs_diff(lb);
    ((1.0 - diff as f64 / longest as f64) * 100.0).round() as u8
}
