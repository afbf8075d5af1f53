// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pricing table and tiered model lookup.
//!
//! A model id resolves against the table through three tiers, first hit wins:
//!
//! 1. exact, case-sensitive id equality (`openai/gpt-4o`)
//! 2. vendor suffix, only for targets without a `/` (`gpt-4o` -> `*/gpt-4o`)
//! 3. case-insensitive substring, first entry in table order
//!
//! Prices arrive as decimal strings; anything that does not parse to a
//! finite, non-negative number is treated as 0.

use std::collections::HashSet;

use serde_json::Value;
use tokentally_core::PricingEntry;
use tracing::debug;

/// A predicate deciding whether an entry matches a target model id.
type MatchTier = fn(&PricingEntry, &str) -> bool;

/// Lookup tiers in precedence order.
const MATCH_TIERS: &[(&str, MatchTier)] = &[
    ("exact", exact_id),
    ("vendor_suffix", vendor_suffix),
    ("substring", case_insensitive_substring),
];

fn exact_id(entry: &PricingEntry, target: &str) -> bool {
    entry.id == target
}

fn vendor_suffix(entry: &PricingEntry, target: &str) -> bool {
    !target.contains('/')
        && entry
            .id
            .strip_suffix(target)
            .is_some_and(|prefix| prefix.ends_with('/'))
}

fn case_insensitive_substring(entry: &PricingEntry, target: &str) -> bool {
    entry.id.to_lowercase().contains(&target.to_lowercase())
}

/// The set of priced models fetched for one batch.
///
/// Entries keep the source's order. Ids are unique: when the source repeats
/// an id, the first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct PricingTable {
    entries: Vec<PricingEntry>,
}

impl PricingTable {
    /// Build a table from entries in source order, dropping empty and
    /// repeated ids.
    pub fn new(entries: impl IntoIterator<Item = PricingEntry>) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|e| !e.id.is_empty() && seen.insert(e.id.clone()))
            .collect();
        Self { entries }
    }

    /// Resolve `model` through the lookup tiers.
    ///
    /// Returns `None` when no tier matches or `model` is blank.
    pub fn lookup(&self, model: &str) -> Option<&PricingEntry> {
        let target = model.trim();
        if target.is_empty() {
            return None;
        }
        MATCH_TIERS.iter().find_map(|(tier, matches)| {
            let hit = self.entries.iter().find(|&e| matches(e, target))?;
            debug!(model = target, tier, resolved = %hit.id, "pricing entry resolved");
            Some(hit)
        })
    }

    /// Exact-id access without fallback tiers.
    pub fn get(&self, id: &str) -> Option<&PricingEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PricingEntry> {
        self.entries.iter()
    }
}

impl FromIterator<PricingEntry> for PricingTable {
    fn from_iter<I: IntoIterator<Item = PricingEntry>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Parse a per-token price from its decimal-string form.
pub fn parse_price(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
        .unwrap_or(0.0)
}

/// Parse a price field that may be a decimal string, a JSON number, or absent.
pub fn price_from_value(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::String(s)) => parse_price(s),
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|p| p.is_finite() && *p >= 0.0)
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, prompt: f64, completion: f64) -> PricingEntry {
        PricingEntry {
            id: id.to_string(),
            name: id.to_string(),
            prompt_price: prompt,
            completion_price: completion,
        }
    }

    fn table() -> PricingTable {
        PricingTable::new(vec![
            entry("openai/gpt-4o-mini", 0.00000015, 0.0000006),
            entry("openai/gpt-4o", 0.000005, 0.000015),
            entry("anthropic/claude-3.5-sonnet", 0.000003, 0.000015),
            entry("meta-llama/llama-3.1-8b-instruct:free", 0.0, 0.0),
        ])
    }

    #[test]
    fn exact_match_wins() {
        let t = table();
        let hit = t.lookup("openai/gpt-4o").unwrap();
        assert_eq!(hit.id, "openai/gpt-4o");
    }

    #[test]
    fn exact_match_beats_earlier_substring_match() {
        // "openai/gpt-4o-mini" comes first and contains "openai/gpt-4o".
        let t = table();
        assert_eq!(t.lookup("openai/gpt-4o").unwrap().id, "openai/gpt-4o");
    }

    #[test]
    fn unprefixed_name_resolves_by_vendor_suffix() {
        let t = table();
        let hit = t.lookup("gpt-4o").unwrap();
        assert_eq!(hit.id, "openai/gpt-4o");
        assert_eq!(hit.prompt_price, 0.000005);
    }

    #[test]
    fn suffix_tier_requires_separator_boundary() {
        let t = PricingTable::new(vec![
            entry("acme/turbo-gpt-4o", 1.0, 1.0),
            entry("openai/gpt-4o", 2.0, 2.0),
        ]);
        assert_eq!(t.lookup("gpt-4o").unwrap().id, "openai/gpt-4o");
    }

    #[test]
    fn suffix_tier_skipped_for_prefixed_targets() {
        let t = PricingTable::new(vec![entry("router/openai/gpt-4o", 1.0, 1.0)]);
        // Falls through to the substring tier instead.
        assert_eq!(
            t.lookup("openai/gpt-4o").unwrap().id,
            "router/openai/gpt-4o"
        );
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        let t = table();
        assert_eq!(
            t.lookup("Claude-3.5").unwrap().id,
            "anthropic/claude-3.5-sonnet"
        );
    }

    #[test]
    fn substring_match_takes_first_in_table_order() {
        let t = table();
        assert_eq!(t.lookup("gpt").unwrap().id, "openai/gpt-4o-mini");
    }

    #[test]
    fn no_match_returns_none() {
        assert!(table().lookup("mistral/mixtral-8x7b").is_none());
        assert!(PricingTable::default().lookup("gpt-4o").is_none());
    }

    #[test]
    fn blank_target_never_matches() {
        assert!(table().lookup("").is_none());
        assert!(table().lookup("   ").is_none());
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let t = PricingTable::new(vec![
            entry("openai/gpt-4o", 1.0, 1.0),
            entry("openai/gpt-4o", 2.0, 2.0),
            entry("", 3.0, 3.0),
        ]);
        assert_eq!(t.len(), 1);
        assert_eq!(t.get("openai/gpt-4o").unwrap().prompt_price, 1.0);
    }

    #[test]
    fn ids_are_case_sensitive_for_exact_tier() {
        let t = PricingTable::new(vec![entry("OpenAI/GPT-4o", 1.0, 1.0)]);
        assert!(t.get("openai/gpt-4o").is_none());
        // The substring tier still resolves it.
        assert!(t.lookup("openai/gpt-4o").is_some());
    }

    #[test]
    fn parse_price_defaults_to_zero() {
        assert_eq!(parse_price("0.000005"), 0.000005);
        assert_eq!(parse_price(" 0.5 "), 0.5);
        assert_eq!(parse_price(""), 0.0);
        assert_eq!(parse_price("n/a"), 0.0);
        assert_eq!(parse_price("-1"), 0.0);
        assert_eq!(parse_price("NaN"), 0.0);
    }

    #[test]
    fn price_from_value_accepts_strings_and_numbers() {
        assert_eq!(price_from_value(Some(&Value::from("0.000015"))), 0.000015);
        assert_eq!(price_from_value(Some(&Value::from(0.25))), 0.25);
        assert_eq!(price_from_value(Some(&Value::Null)), 0.0);
        assert_eq!(price_from_value(None), 0.0);
    }
}
