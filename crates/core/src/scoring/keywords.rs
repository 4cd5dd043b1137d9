//! Fixed keyword tables and the substring predicates built on them.
//!
//! All matching is case-insensitive substring containment. The tables are
//! deliberately short; free-text classification beyond this is the language
//! model's job, not the scorer's.

const INTENT_PHRASES: &[&str] = &[
    "looking for",
    "interested in",
    "need a solution",
    "want to buy",
    "evaluating",
    "searching for",
    "in the market for",
];

const URGENCY_WORDS: &[&str] =
    &["urgent", "asap", "immediately", "right away", "this week", "time-sensitive"];

const DECISION_MAKER_TITLES: &[&str] = &[
    "ceo",
    "cto",
    "coo",
    "cfo",
    "founder",
    "vp",
    "director",
    "head of",
    "owner",
    "president",
    "decision maker",
];

const NEAR_TERM_MARKERS: &[&str] = &["q1", "immediate"];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let lowered = haystack.to_lowercase();
    needles.iter().any(|needle| lowered.contains(needle))
}

/// Does the email text carry an explicit buying-intent phrase?
pub fn mentions_intent(email_text: &str) -> bool {
    contains_any(email_text, INTENT_PHRASES)
}

/// Does the email text carry urgency wording?
pub fn mentions_urgency(email_text: &str) -> bool {
    contains_any(email_text, URGENCY_WORDS)
}

/// Does an authority label identify a decision maker?
pub fn mentions_decision_maker(authority: &str) -> bool {
    contains_any(authority, DECISION_MAKER_TITLES)
}

/// Does a timing label point at the near term ("Q1", "immediate")?
pub fn mentions_near_term(timing: &str) -> bool {
    contains_any(timing, NEAR_TERM_MARKERS)
}
