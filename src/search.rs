//! Equivalence search over normalized facts.
//!
//! Matching happens on tokens, grouping on the raw `main_part` string. Once
//! any fact of a main part matches, every fact of that main part is folded
//! into its group, so the whole family comes back from a single hit.

use crate::constants::PREFIX_LEN;
use crate::normalize::normalize_token;
use crate::types::{BrakePadGroup, Fact, Section, WiperGroup};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Exact match on the normalized query.
pub fn search(query: &str, facts: &[Fact]) -> Vec<WiperGroup> {
    let token = normalize_token(query);
    if token.is_empty() {
        return Vec::new();
    }
    group_matching(facts, |candidate| candidate == token)
}

/// Match every fact whose main or alt token starts with the first three
/// characters of the normalized query. Shorter queries match nothing.
pub fn search_by_prefix(query: &str, facts: &[Fact]) -> Vec<WiperGroup> {
    let token = normalize_token(query);
    if token.len() < PREFIX_LEN {
        return Vec::new();
    }
    let prefix = &token[..PREFIX_LEN];
    group_matching(facts, |candidate| candidate.starts_with(prefix))
}

/// Brake pads compare trimmed, case-folded strings (no punctuation
/// stripping) and return the stored payload of the first matching fact.
pub fn search_brake_pads(query: &str, facts: &[Fact]) -> Vec<BrakePadGroup> {
    let wanted = query.trim().to_uppercase();
    if wanted.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for fact in facts {
        let hit = fact.main_part.to_uppercase() == wanted || fact.alt_part.to_uppercase() == wanted;
        if hit && seen.insert(fact.main_part.as_str()) {
            results.push(BrakePadGroup {
                main_part: fact.main_part.clone(),
                section: fact.section.clone(),
                oe_analogue: fact.oe_analogue.clone().unwrap_or_default(),
                not_original: fact.not_original.clone().unwrap_or_default(),
            });
        }
    }

    results
}

fn group_matching<F>(facts: &[Fact], matches: F) -> Vec<WiperGroup>
where
    F: Fn(&str) -> bool,
{
    // First pass: which main parts were hit, in first-seen order, each with
    // the section of its first matching fact.
    let mut order: Vec<(&str, &Section)> = Vec::new();
    let mut matched: HashSet<&str> = HashSet::new();
    for fact in facts {
        let hit = matches(&normalize_token(&fact.main_part)) || matches(&normalize_token(&fact.alt_part));
        if hit && matched.insert(fact.main_part.as_str()) {
            order.push((fact.main_part.as_str(), &fact.section));
        }
    }
    if order.is_empty() {
        return Vec::new();
    }

    // Second pass: union of every fact belonging to a matched main part.
    let mut parts: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for fact in facts.iter().filter(|f| matched.contains(f.main_part.as_str())) {
        let set = parts.entry(fact.main_part.as_str()).or_default();
        set.insert(fact.main_part.as_str());
        set.insert(fact.alt_part.as_str());
    }

    order
        .into_iter()
        .filter_map(|(main, section)| {
            parts.remove(main).map(|all| WiperGroup {
                main_part: main.to_string(),
                all_parts: all.into_iter().map(str::to_string).collect(),
                section: section.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(main: &str, alts: &[&str], section: Section) -> Vec<Fact> {
        std::iter::once(main)
            .chain(alts.iter().copied())
            .map(|alt| Fact::new(main, alt, section.clone()))
            .collect()
    }

    fn sample() -> Vec<Fact> {
        let mut facts = family("6R1998002", &["1S1", "5E1", "5JB"], Section::FrontWipers);
        facts.extend(family("6V6955425", &["5JA", "1S1"], Section::BackWipers));
        facts.extend(family("8K1998002A", &["2S1"], Section::FrontWipers));
        facts
    }

    #[test]
    fn test_alt_hit_returns_whole_family() {
        let groups = search("5E1", &sample());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].main_part, "6R1998002");
        assert_eq!(groups[0].all_parts, vec!["1S1", "5E1", "5JB", "6R1998002"]);
        assert_eq!(groups[0].section, Section::FrontWipers);
    }

    #[test]
    fn test_shared_alt_hits_several_groups_in_first_seen_order() {
        let groups = search("1s1", &sample());
        let mains: Vec<_> = groups.iter().map(|g| g.main_part.as_str()).collect();
        assert_eq!(mains, vec!["6R1998002", "6V6955425"]);
        assert_eq!(groups[1].all_parts, vec!["1S1", "5JA", "6V6955425"]);
    }

    #[test]
    fn test_formatting_does_not_affect_exact_match() {
        let facts = sample();
        let expected = search("6R1998002", &facts);
        assert_eq!(search("6r1998002", &facts), expected);
        assert_eq!(search("6 R-1998/002", &facts), expected);
        assert_eq!(expected.len(), 1);
    }

    #[test]
    fn test_empty_token_never_matches() {
        assert!(search("", &sample()).is_empty());
        assert!(search(" -/ ", &sample()).is_empty());
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(search("ZZZ999", &sample()).is_empty());
    }

    #[test]
    fn test_groups_fold_in_rows_that_did_not_match() {
        // The same main part listed on two rows: a hit on the first row
        // still pulls in the alternates of the second.
        let mut facts = family("6R1998002", &["1S1"], Section::FrontWipers);
        facts.extend(family("6R1998002", &["9X9"], Section::FrontWipers));
        let groups = search("1S1", &facts);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].all_parts, vec!["1S1", "6R1998002", "9X9"]);
    }

    #[test]
    fn test_inconsistent_sections_follow_first_matching_fact() {
        // Known ambiguity: a main part listed under two sections reports the
        // section of the first fact that matched the query.
        let mut facts = family("6R1998002", &["1S1"], Section::FrontWipers);
        facts.extend(family("6R1998002", &["9X9"], Section::BackWipers));

        let groups = search("9X9", &facts);
        assert_eq!(groups[0].section, Section::BackWipers);
        assert_eq!(groups[0].all_parts, vec!["1S1", "6R1998002", "9X9"]);

        let groups = search("1S1", &facts);
        assert_eq!(groups[0].section, Section::FrontWipers);
    }

    #[test]
    fn test_prefix_matches_main_and_alt_tokens() {
        let groups = search_by_prefix("6r1-xyz", &sample());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].main_part, "6R1998002");

        let groups = search_by_prefix("5JA", &sample());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].main_part, "6V6955425");
    }

    #[test]
    fn test_prefix_uses_only_first_three_characters() {
        let groups = search_by_prefix("8K1000000", &sample());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].main_part, "8K1998002A");
    }

    #[test]
    fn test_prefix_too_short_is_empty() {
        assert!(search_by_prefix("6R", &sample()).is_empty());
        assert!(search_by_prefix("6-R", &sample()).is_empty());
        assert!(search_by_prefix("", &sample()).is_empty());
    }

    #[test]
    fn test_every_group_contains_its_main_part() {
        let facts = sample();
        for query in ["1S1", "5JA", "2S1", "6R1998002"] {
            for group in search(query, &facts) {
                assert!(group.all_parts.contains(&group.main_part));
            }
        }
    }

    fn brake_facts() -> Vec<Fact> {
        let row = |main: &str, oe: &str, no: &str, section: Section| {
            crate::types::BrakePadRow {
                main_part: main.into(),
                oe_analogue: oe.into(),
                not_original: no.into(),
                section,
            }
        };
        crate::normalize::normalize_brake_pads(&[
            row("GDB1550", "1K0698151", "P85075", Section::FrontBrakePads),
            row("GDB1550X", "1K0698151A", "", Section::Tab("Other".into())),
            row("GDB1332", "", "P85020", Section::RearBrakePads),
        ])
    }

    #[test]
    fn test_brake_search_by_main_returns_one_result() {
        let results = search_brake_pads("gdb1550", &brake_facts());
        assert_eq!(
            results,
            vec![BrakePadGroup {
                main_part: "GDB1550".into(),
                section: Section::FrontBrakePads,
                oe_analogue: "1K0698151".into(),
                not_original: "P85075".into(),
            }]
        );
    }

    #[test]
    fn test_brake_search_by_alternate() {
        let results = search_brake_pads(" p85020 ", &brake_facts());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].main_part, "GDB1332");
        assert_eq!(results[0].oe_analogue, "");
    }

    #[test]
    fn test_brake_search_does_not_strip_punctuation() {
        assert!(search_brake_pads("GDB-1550", &brake_facts()).is_empty());
    }
}
