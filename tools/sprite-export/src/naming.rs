//! Output naming for sprite headers
//!
//! Two naming modes:
//! - mapped: `Agumon_2.png` + frame table `{2: Walk/0}` -> `Agumon_Walk_0`
//! - generic: `bg.png` -> `Bg`

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::sanitize::{capitalize, sanitize_identifier, FALLBACK_IDENTIFIER};

/// Accepted input extension (matched case-insensitively)
pub const PNG_EXTENSION: &str = "png";

const CHARACTER_FALLBACK: &str = "Sprite";
const ACTION_FALLBACK: &str = "Action";
const GENERIC_FALLBACK: &str = "Generic";

/// Reasons a file name cannot be turned into an output name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NamingError {
    #[error("Does not match 'Name_Number.png' format")]
    PatternMismatch,

    #[error("Frame number part '{0}' is not an integer")]
    InvalidFrameNumber(String),

    #[error("Frame number {0} not found in animation mapping")]
    UnknownFrame(u32),
}

/// Conversion mode for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingMode {
    /// `<Name>_<Frame>.png` through the animation table
    Mapped,
    /// Sanitized file stem
    Generic,
}

/// One entry of the animation table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFrame {
    pub action: String,
    pub index: u32,
}

impl ActionFrame {
    pub fn new(action: impl Into<String>, index: u32) -> Self {
        Self {
            action: action.into(),
            index,
        }
    }
}

/// `[[frames]]` entry as written in the config file
#[derive(Debug, Clone, Deserialize)]
pub struct FrameMapping {
    pub frame: u32,
    pub action: String,
    pub index: u32,
}

/// Ordered frame number -> action table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationMap {
    frames: BTreeMap<u32, ActionFrame>,
}

impl AnimationMap {
    pub fn new() -> Self {
        Self {
            frames: BTreeMap::new(),
        }
    }

    /// Insert a mapping, returning the entry it replaced
    pub fn insert(&mut self, frame: u32, action: ActionFrame) -> Option<ActionFrame> {
        self.frames.insert(frame, action)
    }

    pub fn lookup(&self, frame: u32) -> Result<&ActionFrame, NamingError> {
        self.frames
            .get(&frame)
            .ok_or(NamingError::UnknownFrame(frame))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &ActionFrame)> {
        self.frames.iter().map(|(k, v)| (*k, v))
    }
}

impl Default for AnimationMap {
    /// Ten-frame sprite sheet layout
    fn default() -> Self {
        let table = [
            (0, "Idle", 0),
            (1, "Idle", 1),
            (2, "Walk", 0),
            (3, "Walk", 1),
            (4, "Run", 0),
            (5, "Run", 1),
            (6, "Happy", 0),
            (7, "Rest", 0),
            (8, "Attack", 0),
            (9, "Turn", 0),
        ];

        let mut map = Self::new();
        for (frame, action, index) in table {
            map.insert(frame, ActionFrame::new(action, index));
        }
        map
    }
}

/// Parsed `<Name>_<Frame>.png` file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameFileName<'a> {
    pub raw_name: &'a str,
    pub frame: u32,
}

/// Check for a `.png` extension, ignoring case
pub fn has_png_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(PNG_EXTENSION))
        .unwrap_or(false)
}

/// Split `<Name>_<Digits>.png` into name and frame number.
///
/// The name is everything before the last underscore and may itself
/// contain underscores.
pub fn parse_frame_filename(file_name: &str) -> Result<FrameFileName<'_>, NamingError> {
    let stem = strip_png_extension(file_name).ok_or(NamingError::PatternMismatch)?;
    let (raw_name, digits) = stem.rsplit_once('_').ok_or(NamingError::PatternMismatch)?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NamingError::PatternMismatch);
    }

    let frame = digits
        .parse::<u32>()
        .map_err(|_| NamingError::InvalidFrameNumber(digits.to_string()))?;

    Ok(FrameFileName { raw_name, frame })
}

fn strip_png_extension(file_name: &str) -> Option<&str> {
    let suffix_len = PNG_EXTENSION.len() + 1;
    if file_name.len() < suffix_len || !file_name.is_char_boundary(file_name.len() - suffix_len) {
        return None;
    }

    let (stem, suffix) = file_name.split_at(file_name.len() - suffix_len);
    let ext = suffix.strip_prefix('.')?;
    ext.eq_ignore_ascii_case(PNG_EXTENSION).then_some(stem)
}

/// Logical name plus the context written into the header comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub logical_name: String,
    /// Mapped mode only: `Action: <raw>, Frame Index: <n>`
    pub annotation: Option<String>,
}

/// Resolve the logical name for a file in mapped mode
pub fn resolve_mapped(file_name: &str, map: &AnimationMap) -> Result<ResolvedName, NamingError> {
    let parsed = parse_frame_filename(file_name)?;
    let action = map.lookup(parsed.frame)?;

    let character = role_name(parsed.raw_name, CHARACTER_FALLBACK);
    let action_name = role_name(&action.action, ACTION_FALLBACK);

    Ok(ResolvedName {
        logical_name: format!("{}_{}_{}", character, action_name, action.index),
        annotation: Some(format!(
            "Action: {}, Frame Index: {}",
            action.action, action.index
        )),
    })
}

/// Resolve the logical name for a file in generic mode
pub fn resolve_generic(file_name: &str) -> ResolvedName {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    ResolvedName {
        logical_name: role_name(stem, GENERIC_FALLBACK),
        annotation: None,
    }
}

/// Resolve a user-supplied logical name. Sanitized, but the case is kept.
pub fn resolve_explicit(name: &str) -> ResolvedName {
    let sanitized = sanitize_identifier(name);
    let logical_name = if sanitized == FALLBACK_IDENTIFIER {
        GENERIC_FALLBACK.to_string()
    } else {
        sanitized
    };

    ResolvedName {
        logical_name,
        annotation: None,
    }
}

/// Resolve a file name in the given mode
pub fn resolve(
    mode: NamingMode,
    file_name: &str,
    map: &AnimationMap,
) -> Result<ResolvedName, NamingError> {
    match mode {
        NamingMode::Mapped => resolve_mapped(file_name, map),
        NamingMode::Generic => Ok(resolve_generic(file_name)),
    }
}

/// Sanitize and capitalize one name part, substituting `fallback` when
/// nothing usable survives.
fn role_name(raw: &str, fallback: &str) -> String {
    let sanitized = sanitize_identifier(raw);
    if sanitized == FALLBACK_IDENTIFIER {
        return fallback.to_string();
    }
    capitalize(&sanitized)
}
