use crate::constants::{BACK_WIPERS, FRONT_BRAKE_PADS, FRONT_WIPERS, REAR_BRAKE_PADS};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// One worksheet as delivered by a spreadsheet source: a name plus untyped
/// string cells. Nothing past the classifier sees this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

impl Tab {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self { name: name.into(), rows }
    }
}

/// Subsystem/position label of an equivalence class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Section {
    FrontWipers,
    BackWipers,
    FrontBrakePads,
    RearBrakePads,
    /// Raw tab name, used when no header or keyword resolved the section.
    Tab(String),
}

impl Section {
    pub fn label(&self) -> &str {
        match self {
            Section::FrontWipers => FRONT_WIPERS,
            Section::BackWipers => BACK_WIPERS,
            Section::FrontBrakePads => FRONT_BRAKE_PADS,
            Section::RearBrakePads => REAR_BRAKE_PADS,
            Section::Tab(name) => name,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Which part family a lookup works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartFamily {
    Wipers,
    BrakePads,
}

impl PartFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartFamily::Wipers => "wipers",
            PartFamily::BrakePads => "brake_pads",
        }
    }
}

/// A classified wiper data row: one main part and its packed alternates cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WiperRow {
    pub main_part: String,
    pub alt_parts: String,
    pub section: Section,
}

/// A classified brake-pad data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrakePadRow {
    pub main_part: String,
    pub oe_analogue: String,
    pub not_original: String,
    pub section: Section,
}

/// "alt_part is a known equivalent of main_part within section".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fact {
    pub main_part: String,
    pub alt_part: String,
    pub section: Section,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oe_analogue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_original: Option<String>,
}

impl Fact {
    pub fn new(main_part: impl Into<String>, alt_part: impl Into<String>, section: Section) -> Self {
        Self {
            main_part: main_part.into(),
            alt_part: alt_part.into(),
            section,
            oe_analogue: None,
            not_original: None,
        }
    }
}

/// Wiper search result: a main part and the union of everything known to
/// be interchangeable with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WiperGroup {
    pub main_part: String,
    pub all_parts: Vec<String>,
    pub section: Section,
}

/// Brake-pad search result, one per matched main part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrakePadGroup {
    pub main_part: String,
    pub section: Section,
    pub oe_analogue: String,
    pub not_original: String,
}

/// Body returned by every successful lookup, including "not found".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResponse<G> {
    pub message: String,
    pub results: Vec<G>,
}
