//! Row classification: headers, data rows and noise.
//!
//! Spreadsheet tabs mix section headers ("Front Wipers"), column captions and
//! data rows. A pass over one tab threads the current section from row to
//! row and emits typed rows for the data it finds. Untyped cells do not
//! travel past this module.

use crate::constants::{
    BACK_KEYWORDS, BACK_WIPERS_HEADER, BRAKE_KEYWORDS, BRAKE_PAD_KEYWORDS, BRAKE_PAD_STOPLIST,
    CROSS_FILTER_CELLS, FRONT_KEYWORD, FRONT_WIPERS_HEADER, WIPER_KEYWORDS, WIPER_STOPLIST,
};
use crate::types::{BrakePadRow, PartFamily, Section, Tab, WiperRow};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// Keep wiper and brake-pad data from bleeding into each other when a
    /// workbook mixes both families.
    pub cross_family_filter: bool,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self { cross_family_filter: true }
    }
}

/// Running section state inside a wiper tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WiperSection {
    Unassigned,
    Front,
    Back,
}

impl WiperSection {
    fn from_header(first_cell_lower: &str) -> Option<Self> {
        if first_cell_lower.contains(FRONT_WIPERS_HEADER) {
            Some(WiperSection::Front)
        } else if first_cell_lower.contains(BACK_WIPERS_HEADER) {
            Some(WiperSection::Back)
        } else {
            None
        }
    }

    fn resolve(self, tab_name: &str) -> Section {
        match self {
            WiperSection::Unassigned => Section::Tab(tab_name.to_string()),
            WiperSection::Front => Section::FrontWipers,
            WiperSection::Back => Section::BackWipers,
        }
    }
}

fn contains_any(haystack_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack_lower.contains(k))
}

/// Does any of the first few cells mention one of `keywords`?
fn leading_cells_mention(row: &[String], keywords: &[&str]) -> bool {
    row.iter()
        .take(CROSS_FILTER_CELLS)
        .any(|cell| contains_any(&cell.to_lowercase(), keywords))
}

/// Keyword rule shared by tab names and header rows in brake-pad tabs.
pub fn brake_pad_section(text: &str) -> Option<Section> {
    let lower = text.to_lowercase();
    if !contains_any(&lower, BRAKE_KEYWORDS) {
        return None;
    }
    if lower.contains(FRONT_KEYWORD) {
        Some(Section::FrontBrakePads)
    } else if contains_any(&lower, BACK_KEYWORDS) {
        Some(Section::RearBrakePads)
    } else {
        None
    }
}

/// Whether a tab should be skipped outright when collecting `family` data.
pub fn skips_tab(tab_name: &str, family: PartFamily, options: ClassifyOptions) -> bool {
    if !options.cross_family_filter {
        return false;
    }
    let lower = tab_name.to_lowercase();
    match family {
        PartFamily::Wipers => contains_any(&lower, BRAKE_PAD_KEYWORDS),
        PartFamily::BrakePads => contains_any(&lower, WIPER_KEYWORDS),
    }
}

/// Classify one tab in wiper mode.
pub fn classify_wiper_tab(tab: &Tab, options: ClassifyOptions) -> Vec<WiperRow> {
    if skips_tab(&tab.name, PartFamily::Wipers, options) {
        debug!(tab = %tab.name, "skipping brake-pad tab in wiper mode");
        return Vec::new();
    }

    let mut state = WiperSection::Unassigned;
    let mut out = Vec::new();

    for row in &tab.rows {
        let first = row.first().map(|c| c.trim()).unwrap_or("");
        if first.is_empty() {
            continue;
        }
        let first_lower = first.to_lowercase();

        if let Some(next) = WiperSection::from_header(&first_lower) {
            state = next;
            continue;
        }

        let Some(alts) = row.get(1).map(|c| c.trim()) else {
            continue;
        };
        if alts.is_empty() || contains_any(&first_lower, WIPER_STOPLIST) {
            continue;
        }
        if options.cross_family_filter && leading_cells_mention(row, BRAKE_PAD_KEYWORDS) {
            continue;
        }

        out.push(WiperRow {
            main_part: first.to_string(),
            alt_parts: alts.to_string(),
            section: state.resolve(&tab.name),
        });
    }

    out
}

/// Classify one tab in brake-pad mode.
pub fn classify_brake_pad_tab(tab: &Tab, options: ClassifyOptions) -> Vec<BrakePadRow> {
    if skips_tab(&tab.name, PartFamily::BrakePads, options) {
        debug!(tab = %tab.name, "skipping wiper tab in brake-pad mode");
        return Vec::new();
    }

    let mut section = brake_pad_section(&tab.name).unwrap_or_else(|| Section::Tab(tab.name.clone()));
    let mut out = Vec::new();

    for row in &tab.rows {
        let first = row.first().map(|c| c.trim()).unwrap_or("");
        if first.is_empty() {
            continue;
        }

        // Headers only resolve a section that is still the raw tab name.
        if matches!(section, Section::Tab(_)) {
            if let Some(header) = brake_pad_section(first) {
                section = header;
            }
        }

        if row.len() < 3 || contains_any(&first.to_lowercase(), BRAKE_PAD_STOPLIST) {
            continue;
        }

        let oe_analogue = row[1].trim();
        let not_original = row[2].trim();
        if oe_analogue.is_empty() && not_original.is_empty() {
            continue;
        }
        if options.cross_family_filter && leading_cells_mention(row, WIPER_KEYWORDS) {
            continue;
        }

        out.push(BrakePadRow {
            main_part: first.to_string(),
            oe_analogue: oe_analogue.to_string(),
            not_original: not_original.to_string(),
            section: section.clone(),
        });
    }

    out
}

pub fn classify_wipers(tabs: &[Tab], options: ClassifyOptions) -> Vec<WiperRow> {
    tabs.iter().flat_map(|tab| classify_wiper_tab(tab, options)).collect()
}

pub fn classify_brake_pads(tabs: &[Tab], options: ClassifyOptions) -> Vec<BrakePadRow> {
    tabs.iter().flat_map(|tab| classify_brake_pad_tab(tab, options)).collect()
}
