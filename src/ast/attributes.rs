//! Attribute sequences captured positionally (spec §3, §4.3).

use crate::location::Location;
use serde::Serialize;

/// One attribute, in whichever of the three accepted spellings it came in.
///
/// The body is kept as raw spelling rather than parsed further — spec §9
/// leaves the exact set of tolerated vendor attributes implementation
/// defined, so the parser records what it saw instead of validating it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AttributeForm {
    /// `[[ ... ]]`
    Standard,
    /// `__attribute__(( ... ))`
    Gnu,
    /// `__declspec( ... )`
    Declspec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub form: AttributeForm,
    /// Raw spelling of the attribute body, exactly as written.
    pub raw: String,
    pub location: Location,
}
