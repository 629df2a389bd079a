//! Mapping tables - base codes, units and scale factor glyphs
//!
//! Three tables drive the conversion:
//! - [`CodeMap`]: base code character → (scale factor, implied units), read by the parser
//! - [`UnitsCodeMap`]: units → base code character, read by the formatter
//! - [`SfMap`]: scale factor → glyph written by the formatter
//!
//! Two base code tables are built in: [`UNITLESS`] (the default, accepts
//! any kind of quantity) and [`IEC60062`] (resistances and capacitances).

use rkm_core::ScaleFactor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::ConfigError;

/// Unitless base codes: `r`, `c`, `f`, `l`, `h` are plain decimal points
pub static UNITLESS: LazyLock<CodeMap> = LazyLock::new(|| {
    CodeMap::from_groups(&[
        ("rR", None, ""),
        ("Ω", None, "Ω"),
        ("℧", None, "℧"),
        ("vV", None, "V"),
        ("iI", None, "A"),
        ("cCfF", None, ""),
        ("lLhH", None, ""),
    ])
});

/// IEC 60062 base codes: resistors in ohms, capacitors in farads
pub static IEC60062: LazyLock<CodeMap> = LazyLock::new(|| {
    CodeMap::from_groups(&[
        ("rRΩ", None, "Ω"),
        ("lL", Some(ScaleFactor::Milli), "Ω"),
        ("kK", Some(ScaleFactor::Kilo), "Ω"),
        ("M", Some(ScaleFactor::Mega), "Ω"),
        ("G", Some(ScaleFactor::Giga), "Ω"),
        ("T", Some(ScaleFactor::Tera), "Ω"),
        ("cCF", None, "F"),
        ("m", Some(ScaleFactor::Milli), "F"),
        ("uμµ", Some(ScaleFactor::Micro), "F"),
        ("n", Some(ScaleFactor::Nano), "F"),
        ("p", Some(ScaleFactor::Pico), "F"),
    ])
});

/// Base code used for values without units when the units map has no `""` entry
pub const DEFAULT_UNITLESS_CODE: char = 'r';

// ========== Base Code Map ==========

/// What a base code stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    #[serde(default, with = "optional_sf")]
    pub scale_factor: Option<ScaleFactor>,
    #[serde(default)]
    pub units: String,
}

impl CodeEntry {
    pub fn new(scale_factor: Option<ScaleFactor>, units: impl Into<String>) -> Self {
        CodeEntry { scale_factor, units: units.into() }
    }

    /// Build from the textual form, validating the scale factor
    pub fn parse(code: char, scale_factor: &str, units: &str) -> Result<Self, ConfigError> {
        let mut chars = scale_factor.chars();
        let sf = match (chars.next(), chars.next()) {
            (None, _) => None,
            (Some(c), None) => Some(ScaleFactor::from_char(c).ok_or_else(|| {
                ConfigError::UnknownScaleFactor { code, value: scale_factor.to_string() }
            })?),
            _ => {
                return Err(ConfigError::MultiCharScaleFactor {
                    code,
                    value: scale_factor.to_string(),
                })
            }
        };
        Ok(CodeEntry::new(sf, units))
    }
}

/// Base code character → scale factor and implied units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, CodeEntry>", into = "BTreeMap<String, CodeEntry>")]
pub struct CodeMap {
    codes: BTreeMap<char, CodeEntry>,
}

impl CodeMap {
    /// Empty map: every letter falls through to scale factors or units
    pub fn new() -> Self {
        CodeMap { codes: BTreeMap::new() }
    }

    pub fn unitless() -> Self {
        UNITLESS.clone()
    }

    pub fn iec60062() -> Self {
        IEC60062.clone()
    }

    fn from_groups(groups: &[(&str, Option<ScaleFactor>, &str)]) -> Self {
        let mut map = CodeMap::new();
        for (codes, sf, units) in groups {
            for code in codes.chars() {
                map.insert(code, CodeEntry::new(*sf, *units));
            }
        }
        map
    }

    pub fn get(&self, code: char) -> Option<&CodeEntry> {
        self.codes.get(&code)
    }

    pub fn contains(&self, code: char) -> bool {
        self.codes.contains_key(&code)
    }

    pub fn insert(&mut self, code: char, entry: CodeEntry) -> Option<CodeEntry> {
        self.codes.insert(code, entry)
    }

    /// Builder: add or replace an entry
    pub fn with(mut self, code: char, entry: CodeEntry) -> Self {
        self.insert(code, entry);
        self
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for CodeMap {
    fn default() -> Self {
        CodeMap::unitless()
    }
}

impl FromIterator<(char, CodeEntry)> for CodeMap {
    fn from_iter<I: IntoIterator<Item = (char, CodeEntry)>>(iter: I) -> Self {
        CodeMap { codes: iter.into_iter().collect() }
    }
}

impl TryFrom<BTreeMap<String, CodeEntry>> for CodeMap {
    type Error = ConfigError;

    fn try_from(raw: BTreeMap<String, CodeEntry>) -> Result<Self, Self::Error> {
        let mut map = CodeMap::new();
        for (key, entry) in raw {
            let code = single_char(&key).ok_or_else(|| ConfigError::InvalidCodeKey(key.clone()))?;
            map.insert(code, entry);
        }
        Ok(map)
    }
}

impl From<CodeMap> for BTreeMap<String, CodeEntry> {
    fn from(map: CodeMap) -> Self {
        map.codes.into_iter().map(|(c, e)| (c.to_string(), e)).collect()
    }
}

// ========== Units → Base Code ==========

/// Units → base code character written by the formatter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct UnitsCodeMap {
    codes: BTreeMap<String, char>,
}

impl UnitsCodeMap {
    pub fn new() -> Self {
        UnitsCodeMap { codes: BTreeMap::new() }
    }

    /// Base code for `units`, if the units are mapped
    pub fn get(&self, units: &str) -> Option<char> {
        self.codes.get(units).copied()
    }

    /// Base code for values without units
    pub fn unitless_code(&self) -> char {
        self.get("").unwrap_or(DEFAULT_UNITLESS_CODE)
    }

    pub fn insert(&mut self, units: impl Into<String>, code: char) -> Option<char> {
        self.codes.insert(units.into(), code)
    }

    /// Validate and insert a textual entry
    pub fn insert_str(&mut self, units: &str, code: &str) -> Result<(), ConfigError> {
        let c = single_char(code).ok_or_else(|| ConfigError::InvalidBaseCode {
            units: units.to_string(),
            value: code.to_string(),
        })?;
        self.insert(units, c);
        Ok(())
    }

}

impl Default for UnitsCodeMap {
    fn default() -> Self {
        let mut map = UnitsCodeMap::new();
        for (units, code) in [("Ω", 'r'), ("Ohm", 'r'), ("F", 'c'), ("H", 'l'), ("V", 'v'), ("A", 'i')] {
            map.insert(units, code);
        }
        map
    }
}

impl TryFrom<BTreeMap<String, String>> for UnitsCodeMap {
    type Error = ConfigError;

    fn try_from(raw: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut map = UnitsCodeMap::new();
        for (units, code) in &raw {
            map.insert_str(units, code)?;
        }
        Ok(map)
    }
}

impl From<UnitsCodeMap> for BTreeMap<String, String> {
    fn from(map: UnitsCodeMap) -> Self {
        map.codes.into_iter().map(|(u, c)| (u, c.to_string())).collect()
    }
}

// ========== Scale Factor Substitutions ==========

/// Scale factor → glyph used in generated codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct SfMap {
    glyphs: BTreeMap<ScaleFactor, String>,
}

impl SfMap {
    /// No substitutions: every scale factor is written with its own symbol
    pub fn new() -> Self {
        SfMap { glyphs: BTreeMap::new() }
    }

    pub fn insert(&mut self, sf: ScaleFactor, glyph: impl Into<String>) -> Option<String> {
        self.glyphs.insert(sf, glyph.into())
    }

    /// Validate and insert a textual entry
    pub fn insert_str(&mut self, sf: &str, glyph: &str) -> Result<(), ConfigError> {
        let sf = single_char(sf)
            .and_then(ScaleFactor::from_char)
            .ok_or_else(|| ConfigError::UnknownSubstitution(sf.to_string()))?;
        self.insert(sf, glyph);
        Ok(())
    }

    /// Glyph to write for `sf`
    pub fn glyph(&self, sf: ScaleFactor) -> String {
        self.glyphs.get(&sf).cloned().unwrap_or_else(|| sf.to_string())
    }
}

impl Default for SfMap {
    fn default() -> Self {
        let mut map = SfMap::new();
        map.insert(ScaleFactor::Micro, "μ");
        map.insert(ScaleFactor::Kilo, "K");
        map
    }
}

impl TryFrom<BTreeMap<String, String>> for SfMap {
    type Error = ConfigError;

    fn try_from(raw: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut map = SfMap::new();
        for (sf, glyph) in &raw {
            map.insert_str(sf, glyph)?;
        }
        Ok(map)
    }
}

impl From<SfMap> for BTreeMap<String, String> {
    fn from(map: SfMap) -> Self {
        map.glyphs.into_iter().map(|(sf, g)| (sf.to_string(), g)).collect()
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Scale factor as `""` or a one character string
mod optional_sf {
    use rkm_core::ScaleFactor;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(sf: &Option<ScaleFactor>, serializer: S) -> Result<S::Ok, S::Error> {
        match sf {
            Some(sf) => serializer.serialize_str(&sf.to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<ScaleFactor>, D::Error> {
        let s = String::deserialize(deserializer)?;
        ScaleFactor::parse_optional(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unitless_table() {
        let map = CodeMap::unitless();
        assert_eq!(map.get('r'), Some(&CodeEntry::new(None, "")));
        assert_eq!(map.get('Ω'), Some(&CodeEntry::new(None, "Ω")));
        assert_eq!(map.get('V'), Some(&CodeEntry::new(None, "V")));
        assert_eq!(map.get('i'), Some(&CodeEntry::new(None, "A")));
        assert_eq!(map.get('h'), Some(&CodeEntry::new(None, "")));
        assert!(!map.contains('k'));
        assert!(!map.contains('d'));
    }

    #[test]
    fn test_iec_table() {
        let map = CodeMap::iec60062();
        assert_eq!(map.get('l'), Some(&CodeEntry::new(Some(ScaleFactor::Milli), "Ω")));
        assert_eq!(map.get('K'), Some(&CodeEntry::new(Some(ScaleFactor::Kilo), "Ω")));
        assert_eq!(map.get('m'), Some(&CodeEntry::new(Some(ScaleFactor::Milli), "F")));
        assert_eq!(map.get('µ'), Some(&CodeEntry::new(Some(ScaleFactor::Micro), "F")));
        assert_eq!(map.get('F'), Some(&CodeEntry::new(None, "F")));
        assert!(!map.contains('f'));
        assert!(!map.contains('v'));
    }

    #[test]
    fn test_default_is_unitless() {
        assert_eq!(CodeMap::default(), *UNITLESS);
    }

    #[test]
    fn test_code_entry_parse() {
        assert_eq!(CodeEntry::parse('d', "", "").unwrap(), CodeEntry::new(None, ""));
        assert_eq!(
            CodeEntry::parse('x', "k", "Ω").unwrap(),
            CodeEntry::new(Some(ScaleFactor::Kilo), "Ω")
        );
        assert!(matches!(
            CodeEntry::parse('x', "kk", ""),
            Err(ConfigError::MultiCharScaleFactor { code: 'x', .. })
        ));
        assert!(matches!(
            CodeEntry::parse('x', "q", ""),
            Err(ConfigError::UnknownScaleFactor { code: 'x', .. })
        ));
    }

    #[test]
    fn test_with_adds_entry() {
        let map = CodeMap::unitless().with('d', CodeEntry::new(None, ""));
        assert!(map.contains('d'));
        assert!(map.contains('r'));
        assert_eq!(map.len(), CodeMap::unitless().len() + 1);
    }

    #[test]
    fn test_units_map() {
        let map = UnitsCodeMap::default();
        assert_eq!(map.get("Ω"), Some('r'));
        assert_eq!(map.get("Ohm"), Some('r'));
        assert_eq!(map.get("Hz"), None);
        assert_eq!(map.unitless_code(), 'r');

        let mut map = map;
        map.insert("", 'd');
        assert_eq!(map.unitless_code(), 'd');
    }

    #[test]
    fn test_units_map_rejects_long_code() {
        let mut map = UnitsCodeMap::new();
        assert!(matches!(
            map.insert_str("Ω", "RR"),
            Err(ConfigError::InvalidBaseCode { .. })
        ));
        assert!(map.insert_str("Ω", "").is_err());
    }

    #[test]
    fn test_sf_map() {
        let map = SfMap::default();
        assert_eq!(map.glyph(ScaleFactor::Micro), "μ");
        assert_eq!(map.glyph(ScaleFactor::Kilo), "K");
        assert_eq!(map.glyph(ScaleFactor::Mega), "M");

        let mut map = SfMap::new();
        map.insert_str("μ", "u").unwrap();
        assert_eq!(map.glyph(ScaleFactor::Micro), "u");
        assert!(map.insert_str("x", "y").is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let json = serde_json::to_string(&CodeMap::iec60062()).unwrap();
        let back: CodeMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CodeMap::iec60062());

        let back: CodeMap = serde_json::from_str(r#"{"d": {"scale_factor": "", "units": ""}}"#).unwrap();
        assert_eq!(back.get('d'), Some(&CodeEntry::new(None, "")));

        assert!(serde_json::from_str::<CodeMap>(r#"{"dd": {}}"#).is_err());
        assert!(serde_json::from_str::<UnitsCodeMap>(r#"{"Ω": "RR"}"#).is_err());
        assert!(serde_json::from_str::<SfMap>(r#"{"k": "K"}"#).is_ok());
    }
}
