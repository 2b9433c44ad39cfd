//! Expands classified rows into equivalence facts.

pub mod token;

pub use token::{normalize_token, strip_leading_marker};

use crate::error::XrefError;
use crate::types::{BrakePadRow, Fact, WiperRow};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::str::FromStr;
use tracing::debug;

static PARENTHESIZED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").expect("valid regex"));
static DELIMITERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[/,\s]+").expect("valid regex"));

/// How a packed alternates cell is split into part numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AltSplitPolicy {
    /// Drop `(...)` notes and keep only alphanumeric tokens holding a digit.
    #[default]
    Strict,
    /// Treat parentheses as delimiters and keep every non-empty token.
    Legacy,
}

impl FromStr for AltSplitPolicy {
    type Err = XrefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(AltSplitPolicy::Strict),
            "legacy" => Ok(AltSplitPolicy::Legacy),
            other => Err(XrefError::Config(format!(
                "unknown split policy '{other}' (expected 'strict' or 'legacy')"
            ))),
        }
    }
}

impl AltSplitPolicy {
    /// Split an alternates cell into the part numbers it names.
    pub fn split_alternates(self, cell: &str) -> Vec<String> {
        match self {
            AltSplitPolicy::Strict => {
                let without_notes = PARENTHESIZED.replace_all(cell, " ");
                DELIMITERS
                    .split(&without_notes)
                    .filter(|candidate| is_part_number(candidate))
                    .map(str::to_string)
                    .collect()
            }
            AltSplitPolicy::Legacy => {
                let flattened = cell.replace(['(', ')'], "/");
                DELIMITERS
                    .split(&flattened)
                    .map(str::trim)
                    .filter(|candidate| !candidate.is_empty())
                    .map(str::to_string)
                    .collect()
            }
        }
    }
}

/// Real part numbers are plain alphanumerics and always carry a digit.
fn is_part_number(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate.chars().all(|c| c.is_ascii_alphanumeric())
        && candidate.chars().any(|c| c.is_ascii_digit())
}

/// Turn wiper rows into facts: the reflexive fact first, then one fact per
/// alternate found in the packed cell.
pub fn normalize(rows: &[WiperRow], policy: AltSplitPolicy) -> Vec<Fact> {
    let mut facts = Vec::new();

    for row in rows {
        if row.main_part.is_empty() || row.alt_parts.is_empty() {
            continue;
        }

        facts.push(Fact::new(&row.main_part, &row.main_part, row.section.clone()));

        for alt in policy.split_alternates(&row.alt_parts) {
            facts.push(Fact::new(&row.main_part, alt, row.section.clone()));
        }
    }

    debug!(rows = rows.len(), facts = facts.len(), ?policy, "normalized wiper rows");
    facts
}

/// Turn brake-pad rows into facts. The OE analogue and not-original columns
/// become alternates and also ride along verbatim on every fact.
pub fn normalize_brake_pads(rows: &[BrakePadRow]) -> Vec<Fact> {
    let mut facts = Vec::new();

    for row in rows {
        if row.main_part.is_empty() {
            continue;
        }

        let with_payload = |alt: &str| Fact {
            main_part: row.main_part.clone(),
            alt_part: alt.to_string(),
            section: row.section.clone(),
            oe_analogue: Some(row.oe_analogue.clone()),
            not_original: Some(row.not_original.clone()),
        };

        facts.push(with_payload(&row.main_part));
        if !row.oe_analogue.is_empty() {
            facts.push(with_payload(&row.oe_analogue));
        }
        if !row.not_original.is_empty() {
            facts.push(with_payload(&row.not_original));
        }
    }

    debug!(rows = rows.len(), facts = facts.len(), "normalized brake-pad rows");
    facts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Section;

    fn wiper_row(main: &str, alts: &str) -> WiperRow {
        WiperRow {
            main_part: main.into(),
            alt_parts: alts.into(),
            section: Section::FrontWipers,
        }
    }

    fn alt_parts(facts: &[Fact]) -> Vec<&str> {
        facts.iter().map(|f| f.alt_part.as_str()).collect()
    }

    #[test]
    fn test_reflexive_fact_comes_first() {
        let facts = normalize(&[wiper_row("6R1998002", "1S1, 5E1, 5JB")], AltSplitPolicy::Strict);
        assert_eq!(alt_parts(&facts), vec!["6R1998002", "1S1", "5E1", "5JB"]);
        assert!(facts.iter().all(|f| f.main_part == "6R1998002"));
        assert!(facts.iter().all(|f| f.section == Section::FrontWipers));
    }

    #[test]
    fn test_strict_drops_parenthesized_notes() {
        let split = AltSplitPolicy::Strict.split_alternates("5E1 (change mounting), 5JB");
        assert_eq!(split, vec!["5E1", "5JB"]);
    }

    #[test]
    fn test_strict_drops_digit_free_words() {
        let split = AltSplitPolicy::Strict.split_alternates("5E1 NOTE/5JB");
        assert_eq!(split, vec!["5E1", "5JB"]);
    }

    #[test]
    fn test_strict_drops_tokens_with_embedded_punctuation() {
        let split = AltSplitPolicy::Strict.split_alternates("8K1-998 ; 4D4, 1A1.");
        assert_eq!(split, vec!["4D4"]);
    }

    #[test]
    fn test_strict_handles_mixed_delimiters() {
        let split = AltSplitPolicy::Strict.split_alternates("  1S1//5E1 ,\n5JB\t6V1 ");
        assert_eq!(split, vec!["1S1", "5E1", "5JB", "6V1"]);
    }

    #[test]
    fn test_legacy_keeps_note_words() {
        let split = AltSplitPolicy::Legacy.split_alternates("5E1 (change mounting), 5JB");
        assert_eq!(split, vec!["5E1", "change", "mounting", "5JB"]);
    }

    #[test]
    fn test_rows_without_alternates_are_skipped() {
        let facts = normalize(&[wiper_row("6R1998002", "")], AltSplitPolicy::Strict);
        assert!(facts.is_empty());
    }

    #[test]
    fn test_alternates_cell_with_only_notes_still_yields_reflexive_fact() {
        let facts = normalize(&[wiper_row("6R1998002", "(see below)")], AltSplitPolicy::Strict);
        assert_eq!(alt_parts(&facts), vec!["6R1998002"]);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Legacy".parse::<AltSplitPolicy>().unwrap(), AltSplitPolicy::Legacy);
        assert_eq!(" strict ".parse::<AltSplitPolicy>().unwrap(), AltSplitPolicy::Strict);
        assert!("loose".parse::<AltSplitPolicy>().is_err());
    }

    #[test]
    fn test_brake_pads_emit_payload_on_every_fact() {
        let rows = vec![BrakePadRow {
            main_part: "GDB1550".into(),
            oe_analogue: "1K0698151".into(),
            not_original: "".into(),
            section: Section::FrontBrakePads,
        }];
        let facts = normalize_brake_pads(&rows);
        assert_eq!(alt_parts(&facts), vec!["GDB1550", "1K0698151"]);
        for fact in &facts {
            assert_eq!(fact.oe_analogue.as_deref(), Some("1K0698151"));
            assert_eq!(fact.not_original.as_deref(), Some(""));
        }
    }

    #[test]
    fn test_brake_pads_emit_not_original_alternate() {
        let rows = vec![BrakePadRow {
            main_part: "GDB1550".into(),
            oe_analogue: "1K0698151".into(),
            not_original: "P85075".into(),
            section: Section::RearBrakePads,
        }];
        let facts = normalize_brake_pads(&rows);
        assert_eq!(alt_parts(&facts), vec!["GDB1550", "1K0698151", "P85075"]);
    }
}
