//! Preferences - the tables and flags that steer parsing and formatting
//!
//! A [`Preferences`] value is a complete, validated configuration. The
//! process-wide instance behind [`set_prefs`] and [`prefs`] is the one the
//! crate-level functions use; callers that want isolation keep their own
//! value and call its methods directly.

use rkm_core::{ScaleFactor, DEFAULT_OUTPUT_SF};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{LazyLock, PoisonError, RwLock};
use tracing::debug;

use crate::maps::{CodeEntry, CodeMap, SfMap, UnitsCodeMap};
use crate::{ConfigError, FormatError, RkmError};

/// Process-wide preferences
static PREFS: LazyLock<RwLock<Preferences>> = LazyLock::new(|| RwLock::new(Preferences::default()));

/// Update the process-wide preferences
///
/// The update is validated as a whole; on error nothing changes.
pub fn set_prefs(update: PrefsUpdate) -> Result<(), RkmError> {
    let mut guard = PREFS.write().unwrap_or_else(PoisonError::into_inner);
    guard.apply(&update)?;
    debug!(fields = ?update.touched(), "rkm preferences updated");
    Ok(())
}

/// Snapshot of the process-wide preferences
pub fn prefs() -> Preferences {
    PREFS.read().unwrap_or_else(PoisonError::into_inner).clone()
}

// ========== Precision ==========

/// How many digits the formatter keeps
///
/// `Digits(n)` counts every digit of the mantissa, including a lone leading
/// zero: at `Digits(5)` 4.7 is written `4R7000` and 0.47 is written `R4700`.
/// For mantissas of 1 and above this is the number of significant digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Option<i64>", into = "Option<i64>")]
pub enum Precision {
    /// Every digit of the exact value
    #[default]
    Full,
    Digits(usize),
}

impl Precision {
    /// Most digits a fixed precision may ask for
    pub const MAX_DIGITS: usize = 100;

    /// Digit count, `None` for full precision
    pub fn digits(self) -> Result<Option<usize>, FormatError> {
        match self {
            Precision::Full => Ok(None),
            Precision::Digits(n) if (1..=Self::MAX_DIGITS).contains(&n) => Ok(Some(n)),
            Precision::Digits(n) => Err(FormatError::InvalidPrecision(saturating_i64(n))),
        }
    }
}

fn saturating_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl TryFrom<i64> for Precision {
    type Error = FormatError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        let prec = usize::try_from(n)
            .map(Precision::Digits)
            .map_err(|_| FormatError::InvalidPrecision(n))?;
        prec.digits()?;
        Ok(prec)
    }
}

impl TryFrom<Option<i64>> for Precision {
    type Error = FormatError;

    fn try_from(n: Option<i64>) -> Result<Self, Self::Error> {
        n.map_or(Ok(Precision::Full), Precision::try_from)
    }
}

impl From<Precision> for Option<i64> {
    fn from(prec: Precision) -> Self {
        match prec {
            Precision::Full => None,
            Precision::Digits(n) => Some(saturating_i64(n)),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Full => write!(f, "full"),
            Precision::Digits(n) => write!(f, "{} digits", n),
        }
    }
}

// ========== Preferences ==========

/// Complete configuration for parsing and formatting RKM codes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Base codes understood by the parser
    pub rkm_maps: CodeMap,
    /// Base code the formatter writes for given units
    pub units_to_rkm_base_code: UnitsCodeMap,
    /// Glyph substitutions for scale factors in generated codes
    pub map_sf: SfMap,
    pub show_units: bool,
    pub strip_zeros: bool,
    pub strip_code: bool,
    pub minus_sign: String,
    pub prec: Precision,
    /// Scale factors the formatter may use, e.g. `"TGMk"`
    pub output_sf: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            rkm_maps: CodeMap::unitless(),
            units_to_rkm_base_code: UnitsCodeMap::default(),
            map_sf: SfMap::default(),
            show_units: false,
            strip_zeros: true,
            strip_code: true,
            minus_sign: "-".to_string(),
            prec: Precision::Full,
            output_sf: DEFAULT_OUTPUT_SF.to_string(),
        }
    }
}

impl Preferences {
    /// Check the invariants the tables cannot enforce by type
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.minus_sign.is_empty() {
            return Err(ConfigError::EmptyMinusSign);
        }
        // Only the letter signs n and m are recognised by the parser
        let is_word = self.minus_sign.chars().all(char::is_alphanumeric);
        if is_word && !matches!(self.minus_sign.as_str(), "n" | "m") {
            return Err(ConfigError::LetterMinusSign(self.minus_sign.clone()));
        }
        self.prec.digits()?;
        self.output_scale_factors()?;
        Ok(())
    }

    /// Scale factors the formatter may choose from
    pub fn output_scale_factors(&self) -> Result<Vec<ScaleFactor>, ConfigError> {
        self.output_sf
            .chars()
            .map(|c| ScaleFactor::from_char(c).ok_or(ConfigError::UnknownOutputScaleFactor(c)))
            .collect()
    }

    /// Apply an update in place; on error `self` is unchanged
    pub fn apply(&mut self, update: &PrefsUpdate) -> Result<(), ConfigError> {
        let mut next = self.clone();

        match &update.rkm_maps {
            MapUpdate::Keep => {}
            MapUpdate::Reset => next.rkm_maps = CodeMap::default(),
            MapUpdate::Merge(entries) => {
                let mut map = CodeMap::default();
                for (code, sf, units) in entries {
                    map.insert(*code, CodeEntry::parse(*code, sf, units)?);
                }
                next.rkm_maps = map;
            }
            MapUpdate::Replace(map) => next.rkm_maps = map.clone(),
        }

        match &update.units_to_rkm_base_code {
            MapUpdate::Keep => {}
            MapUpdate::Reset => next.units_to_rkm_base_code = UnitsCodeMap::default(),
            MapUpdate::Merge(entries) => {
                let mut map = UnitsCodeMap::default();
                for (units, code) in entries {
                    map.insert_str(units, code)?;
                }
                next.units_to_rkm_base_code = map;
            }
            MapUpdate::Replace(map) => next.units_to_rkm_base_code = map.clone(),
        }

        match &update.map_sf {
            MapUpdate::Keep => {}
            MapUpdate::Reset => next.map_sf = SfMap::default(),
            MapUpdate::Merge(entries) => {
                let mut map = SfMap::default();
                for (sf, glyph) in entries {
                    map.insert_str(sf, glyph)?;
                }
                next.map_sf = map;
            }
            MapUpdate::Replace(map) => next.map_sf = map.clone(),
        }

        let defaults = Preferences::default();
        update.show_units.apply_to(&mut next.show_units, defaults.show_units);
        update.strip_zeros.apply_to(&mut next.strip_zeros, defaults.strip_zeros);
        update.strip_code.apply_to(&mut next.strip_code, defaults.strip_code);
        update.minus_sign.apply_to(&mut next.minus_sign, defaults.minus_sign);
        update.prec.apply_to(&mut next.prec, defaults.prec);
        update.output_sf.apply_to(&mut next.output_sf, defaults.output_sf);

        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Copy with an update applied
    pub fn with(&self, update: &PrefsUpdate) -> Result<Preferences, ConfigError> {
        let mut prefs = self.clone();
        prefs.apply(update)?;
        Ok(prefs)
    }

    /// Load from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let prefs: Preferences =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        prefs.validate()?;
        Ok(prefs)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Json(e.to_string()))
    }
}

// ========== Updates ==========

/// Change to a single scalar preference
#[derive(Debug, Clone, PartialEq)]
pub enum Setting<T> {
    Keep,
    /// Restore the built-in default
    Reset,
    Set(T),
}

impl<T> Default for Setting<T> {
    fn default() -> Self {
        Setting::Keep
    }
}

impl<T: Clone> Setting<T> {
    fn apply_to(&self, target: &mut T, default: T) {
        match self {
            Setting::Keep => {}
            Setting::Reset => *target = default,
            Setting::Set(value) => *target = value.clone(),
        }
    }

    fn is_keep(&self) -> bool {
        matches!(self, Setting::Keep)
    }
}

/// Change to a mapping table
///
/// `Merge` overlays the entries on the built-in default table, `Replace`
/// installs the given table as is.
#[derive(Debug, Clone, PartialEq)]
pub enum MapUpdate<E, M> {
    Keep,
    Reset,
    Merge(Vec<E>),
    Replace(M),
}

impl<E, M> Default for MapUpdate<E, M> {
    fn default() -> Self {
        MapUpdate::Keep
    }
}

impl<E, M> MapUpdate<E, M> {
    fn is_keep(&self) -> bool {
        matches!(self, MapUpdate::Keep)
    }
}

/// A preference field, for [`PrefsUpdate::reset`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    RkmMaps,
    UnitsToRkmBaseCode,
    MapSf,
    ShowUnits,
    StripZeros,
    StripCode,
    MinusSign,
    Prec,
    OutputSf,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::RkmMaps,
        Field::UnitsToRkmBaseCode,
        Field::MapSf,
        Field::ShowUnits,
        Field::StripZeros,
        Field::StripCode,
        Field::MinusSign,
        Field::Prec,
        Field::OutputSf,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::RkmMaps => "rkm_maps",
            Field::UnitsToRkmBaseCode => "units_to_rkm_base_code",
            Field::MapSf => "map_sf",
            Field::ShowUnits => "show_units",
            Field::StripZeros => "strip_zeros",
            Field::StripCode => "strip_code",
            Field::MinusSign => "minus_sign",
            Field::Prec => "prec",
            Field::OutputSf => "output_sf",
        }
    }
}

/// Partial update of [`Preferences`]
///
/// Fields not mentioned are kept. Map entries are textual and validated
/// when the update is applied.
///
/// ```
/// use rkm_codes::{PrefsUpdate, Precision};
///
/// let update = PrefsUpdate::new()
///     .units_to_rkm_base_code([("", "d")])
///     .show_units(true)
///     .prec(Precision::Digits(3));
/// assert!(!update.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrefsUpdate {
    rkm_maps: MapUpdate<(char, String, String), CodeMap>,
    units_to_rkm_base_code: MapUpdate<(String, String), UnitsCodeMap>,
    map_sf: MapUpdate<(String, String), SfMap>,
    show_units: Setting<bool>,
    strip_zeros: Setting<bool>,
    strip_code: Setting<bool>,
    minus_sign: Setting<String>,
    prec: Setting<Precision>,
    output_sf: Setting<String>,
}

impl PrefsUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every field to its default
    pub fn reset_all() -> Self {
        Field::ALL.iter().fold(Self::new(), |update, field| update.reset(*field))
    }

    /// Base codes as `(code, scale factor, units)`, merged over the unitless table
    pub fn rkm_maps<I, S, U>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (char, S, U)>,
        S: Into<String>,
        U: Into<String>,
    {
        let entries = entries.into_iter().map(|(c, sf, u)| (c, sf.into(), u.into())).collect();
        self.rkm_maps = MapUpdate::Merge(entries);
        self
    }

    /// Use exactly this base code table, e.g. [`CodeMap::iec60062`]
    pub fn replace_rkm_maps(mut self, map: CodeMap) -> Self {
        self.rkm_maps = MapUpdate::Replace(map);
        self
    }

    /// Units to base code entries, merged over the default table
    pub fn units_to_rkm_base_code<I, U, C>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (U, C)>,
        U: Into<String>,
        C: Into<String>,
    {
        let entries = entries.into_iter().map(|(u, c)| (u.into(), c.into())).collect();
        self.units_to_rkm_base_code = MapUpdate::Merge(entries);
        self
    }

    pub fn replace_units_to_rkm_base_code(mut self, map: UnitsCodeMap) -> Self {
        self.units_to_rkm_base_code = MapUpdate::Replace(map);
        self
    }

    /// Scale factor substitutions, merged over the default table
    pub fn map_sf<I, S, G>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, G)>,
        S: Into<String>,
        G: Into<String>,
    {
        let entries = entries.into_iter().map(|(s, g)| (s.into(), g.into())).collect();
        self.map_sf = MapUpdate::Merge(entries);
        self
    }

    pub fn replace_map_sf(mut self, map: SfMap) -> Self {
        self.map_sf = MapUpdate::Replace(map);
        self
    }

    pub fn show_units(mut self, show: bool) -> Self {
        self.show_units = Setting::Set(show);
        self
    }

    pub fn strip_zeros(mut self, strip: bool) -> Self {
        self.strip_zeros = Setting::Set(strip);
        self
    }

    pub fn strip_code(mut self, strip: bool) -> Self {
        self.strip_code = Setting::Set(strip);
        self
    }

    pub fn minus_sign(mut self, sign: impl Into<String>) -> Self {
        self.minus_sign = Setting::Set(sign.into());
        self
    }

    pub fn prec(mut self, prec: Precision) -> Self {
        self.prec = Setting::Set(prec);
        self
    }

    pub fn output_sf(mut self, sf: impl Into<String>) -> Self {
        self.output_sf = Setting::Set(sf.into());
        self
    }

    /// Restore one field to its built-in default
    pub fn reset(mut self, field: Field) -> Self {
        match field {
            Field::RkmMaps => self.rkm_maps = MapUpdate::Reset,
            Field::UnitsToRkmBaseCode => self.units_to_rkm_base_code = MapUpdate::Reset,
            Field::MapSf => self.map_sf = MapUpdate::Reset,
            Field::ShowUnits => self.show_units = Setting::Reset,
            Field::StripZeros => self.strip_zeros = Setting::Reset,
            Field::StripCode => self.strip_code = Setting::Reset,
            Field::MinusSign => self.minus_sign = Setting::Reset,
            Field::Prec => self.prec = Setting::Reset,
            Field::OutputSf => self.output_sf = Setting::Reset,
        }
        self
    }

    /// True when applying this update changes nothing
    pub fn is_empty(&self) -> bool {
        self.touched().is_empty()
    }

    /// Names of the fields this update changes
    pub fn touched(&self) -> Vec<&'static str> {
        let keep = [
            self.rkm_maps.is_keep(),
            self.units_to_rkm_base_code.is_keep(),
            self.map_sf.is_keep(),
            self.show_units.is_keep(),
            self.strip_zeros.is_keep(),
            self.strip_code.is_keep(),
            self.minus_sign.is_keep(),
            self.prec.is_keep(),
            self.output_sf.is_keep(),
        ];
        Field::ALL
            .iter()
            .zip(keep)
            .filter(|(_, keep)| !keep)
            .map(|(field, _)| field.name())
            .collect()
    }
}
