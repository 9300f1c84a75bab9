//! Best-effort filtering of search results down to genuine facilities.
//!
//! Providers mis-tag listings (a doctor's personal page tagged `hospital`,
//! a closed site still indexed). [`Classifier::evaluate`] applies the rules
//! in order and reports the first one that fails; [`filter_with_fallback`]
//! refuses to filter a non-empty result set down to nothing.

use std::sync::LazyLock;

use regex::Regex;

use crate::candidate::{BusinessStatus, Candidate};
use crate::categories::CategoryProfile;

/// Two or three capitalised word tokens, e.g. "John Smith", "Dr. Mary Jones".
static PERSON_LIKE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\p{Lu}[\p{L}'.\-]*(?:\s+\p{Lu}[\p{L}'.\-]*){1,2}$").expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    NotOperational(BusinessStatus),
    CategoryMismatch,
    PersonLikeName,
    BelowRatingFloor { count: u32, min: u32 },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::NotOperational(status) => write!(f, "business status {status}"),
            RejectReason::CategoryMismatch => write!(f, "category mismatch"),
            RejectReason::PersonLikeName => write!(f, "name looks like a person"),
            RejectReason::BelowRatingFloor { count, min } => {
                write!(f, "rating count {count} below floor {min}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(RejectReason),
}

/// Accept/reject rules for one target category.
#[derive(Debug, Clone)]
pub struct Classifier {
    category: String,
    keywords: Vec<String>,
    min_rating_count: u32,
}

impl Classifier {
    #[must_use]
    pub fn new(category: impl Into<String>, keywords: Vec<String>, min_rating_count: u32) -> Self {
        Self {
            category: category.into(),
            keywords,
            min_rating_count,
        }
    }

    #[must_use]
    pub fn from_profile(profile: &CategoryProfile) -> Self {
        Self::new(
            profile.name.clone(),
            profile.keywords.clone(),
            profile.min_rating_count,
        )
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn min_rating_count(&self) -> u32 {
        self.min_rating_count
    }

    #[must_use]
    pub fn accept(&self, candidate: &Candidate) -> bool {
        self.evaluate(candidate) == Verdict::Accepted
    }

    #[must_use]
    pub fn evaluate(&self, candidate: &Candidate) -> Verdict {
        if candidate.business_status.is_closed() {
            return Verdict::Rejected(RejectReason::NotOperational(candidate.business_status));
        }

        let primary_matches = candidate.primary_type.as_deref() == Some(self.category.as_str());
        if !primary_matches && !candidate.types.contains(&self.category) {
            return Verdict::Rejected(RejectReason::CategoryMismatch);
        }

        if looks_like_person(&candidate.name) && !self.has_keyword(&candidate.name) {
            return Verdict::Rejected(RejectReason::PersonLikeName);
        }

        if let Some(count) = candidate.rating_count {
            if count < self.min_rating_count {
                return Verdict::Rejected(RejectReason::BelowRatingFloor {
                    count,
                    min: self.min_rating_count,
                });
            }
        }

        Verdict::Accepted
    }

    fn has_keyword(&self, name: &str) -> bool {
        name.split_whitespace().map(normalize_token).any(|token| {
            self.keywords
                .iter()
                .any(|k| k.trim().eq_ignore_ascii_case(token))
        })
    }
}

/// Result of [`filter_with_fallback`].
#[derive(Debug, Clone, PartialEq)]
pub struct Filtered {
    pub candidates: Vec<Candidate>,
    /// Number of candidates the rules accepted (0 when the fallback fired).
    pub accepted: usize,
    /// `true` when every candidate was rejected and the unfiltered set was kept.
    pub fell_back: bool,
}

/// Apply `classifier` to `candidates`, keeping the unfiltered input when the
/// rules would reject every one of them.
#[must_use]
pub fn filter_with_fallback(classifier: &Classifier, candidates: Vec<Candidate>) -> Filtered {
    let verdicts: Vec<Verdict> = candidates.iter().map(|c| classifier.evaluate(c)).collect();

    for (candidate, verdict) in candidates.iter().zip(&verdicts) {
        if let Verdict::Rejected(reason) = verdict {
            tracing::debug!(
                id = candidate.id.as_str(),
                name = candidate.name.as_str(),
                %reason,
                "classifier rejected candidate"
            );
        }
    }

    let accepted = verdicts.iter().filter(|v| **v == Verdict::Accepted).count();
    if accepted == 0 && !candidates.is_empty() {
        tracing::warn!(
            category = classifier.category(),
            total = candidates.len(),
            "classifier rejected every candidate; falling back to unfiltered results"
        );
        return Filtered {
            candidates,
            accepted: 0,
            fell_back: true,
        };
    }

    let survivors = candidates
        .into_iter()
        .zip(verdicts)
        .filter_map(|(c, verdict)| (verdict == Verdict::Accepted).then_some(c))
        .collect();

    Filtered {
        candidates: survivors,
        accepted,
        fell_back: false,
    }
}

fn looks_like_person(name: &str) -> bool {
    PERSON_LIKE_NAME.is_match(name.trim())
}

fn normalize_token(token: &str) -> &str {
    let trimmed = token.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'');
    let trimmed = trimmed
        .strip_suffix("'s")
        .or_else(|| trimmed.strip_suffix("’s"))
        .unwrap_or(trimmed);
    trimmed.trim_matches(|c: char| !c.is_alphanumeric())
}
