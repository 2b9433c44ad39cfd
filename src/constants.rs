/// Section labels and keyword tables used when classifying spreadsheet rows.
/// Keywords are matched case-insensitively as substrings of a cell.

// Canonical section labels
pub const FRONT_WIPERS: &str = "Front Wipers";
pub const BACK_WIPERS: &str = "Back Wipers";
pub const FRONT_BRAKE_PADS: &str = "Front Brake Pads";
pub const REAR_BRAKE_PADS: &str = "Rear Brake Pads";

// Header markers inside wiper tabs
pub const FRONT_WIPERS_HEADER: &str = "front wipers";
pub const BACK_WIPERS_HEADER: &str = "back wipers";

/// First-cell keywords that mark a wiper row as a header or noise.
pub const WIPER_STOPLIST: &[&str] = &["wipers", "front", "back"];

/// First-cell keywords that mark a brake-pad row as a header or noise.
pub const BRAKE_PAD_STOPLIST: &[&str] = &[
    "brake",
    "pads",
    "front",
    "back",
    "rear",
    "part number",
    "oe analogue",
    "not original",
    "тормоз",
];

/// Keywords identifying wiper content (tab names and cells).
pub const WIPER_KEYWORDS: &[&str] = &["wiper", "щетк", "щётк", "дворник"];

/// Keywords identifying brake-pad content (tab names and cells).
pub const BRAKE_PAD_KEYWORDS: &[&str] = &["brake", "pad", "тормоз", "колодк"];

// Position keywords for brake-pad section detection
pub const FRONT_KEYWORD: &str = "front";
pub const BACK_KEYWORDS: &[&str] = &["back", "rear"];
pub const BRAKE_KEYWORDS: &[&str] = &["brake", "pad"];

/// Number of leading cells inspected by the cross-family filter.
pub const CROSS_FILTER_CELLS: usize = 3;

/// Length of the prefix used by the fallback search.
pub const PREFIX_LEN: usize = 3;

/// Case-insensitive marker some users type in front of a part number.
pub const LEADING_MARKER: char = 'v';

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_CONFIG_PATH: &str = "parts_xref.toml";
pub const DEFAULT_STATIC_DIR: &str = "static";
