use alloc::string::{String, ToString};

/// Every option key `UserSettings::set` recognizes.
pub const SETTING_KEYS: &[&str] = &[
    "start_index",
    "min_index",
    "max_index",
    "item_size",
    "buffer_size",
    "padding",
    "infinite",
    "horizontal",
    "window_viewport",
];

pub const DEFAULT_START_INDEX: i64 = 1;
pub const DEFAULT_BUFFER_SIZE: u32 = 5;
pub const DEFAULT_PADDING: f64 = 0.5;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("unknown setting `{key}`")]
    UnknownKey { key: String },

    #[error("setting `{key}` expects {expected}")]
    InvalidType { key: &'static str, expected: &'static str },

    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: &'static str, reason: &'static str },

    #[error("min_index ({min}) must not exceed max_index ({max})")]
    InvalidRange { min: i64, max: i64 },
}

/// A loosely typed option value, as received from a host configuration layer.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum SettingValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
}

/// User-supplied overrides. Unset fields fall back to their defaults in [`Settings::merge`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct UserSettings {
    pub start_index: Option<i64>,
    pub min_index: Option<i64>,
    pub max_index: Option<i64>,
    pub item_size: Option<u32>,
    pub buffer_size: Option<u32>,
    pub padding: Option<f64>,
    pub infinite: Option<bool>,
    pub horizontal: Option<bool>,
    pub window_viewport: Option<bool>,
}

impl UserSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one option by name.
    ///
    /// Unknown keys and mistyped values are rejected; range checks that involve more than one
    /// option are left to [`Settings::merge`].
    pub fn set(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        match key {
            "start_index" => self.start_index = Some(int("start_index", value)?),
            "min_index" => self.min_index = nullable_int("min_index", value)?,
            "max_index" => self.max_index = nullable_int("max_index", value)?,
            "item_size" => {
                self.item_size = match nullable_int("item_size", value)? {
                    None => None,
                    Some(v) => Some(u32::try_from(v).map_err(|_| SettingsError::InvalidValue {
                        key: "item_size",
                        reason: "must be a non-negative 32-bit integer",
                    })?),
                }
            }
            "buffer_size" => {
                let v = int("buffer_size", value)?;
                self.buffer_size = Some(u32::try_from(v).map_err(|_| {
                    SettingsError::InvalidValue {
                        key: "buffer_size",
                        reason: "must be a positive 32-bit integer",
                    }
                })?);
            }
            "padding" => {
                self.padding = Some(match value {
                    SettingValue::Float(v) => v,
                    SettingValue::Int(v) => v as f64,
                    _ => {
                        return Err(SettingsError::InvalidType {
                            key: "padding",
                            expected: "a number",
                        });
                    }
                })
            }
            "infinite" => self.infinite = Some(boolean("infinite", value)?),
            "horizontal" => self.horizontal = Some(boolean("horizontal", value)?),
            "window_viewport" => self.window_viewport = Some(boolean("window_viewport", value)?),
            _ => {
                swarn!(key, "UserSettings::set: unknown key");
                return Err(SettingsError::UnknownKey {
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Applies `(key, value)` pairs in order, stopping at the first rejected one.
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = (&'a str, SettingValue)>,
    ) -> Result<Self, SettingsError> {
        let mut out = Self::default();
        for (key, value) in entries {
            out.set(key, value)?;
        }
        Ok(out)
    }

    pub fn with_start_index(mut self, start_index: i64) -> Self {
        self.start_index = Some(start_index);
        self
    }

    pub fn with_index_bounds(mut self, min_index: Option<i64>, max_index: Option<i64>) -> Self {
        self.min_index = min_index;
        self.max_index = max_index;
        self
    }

    pub fn with_item_size(mut self, item_size: Option<u32>) -> Self {
        self.item_size = item_size;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: u32) -> Self {
        self.buffer_size = Some(buffer_size);
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = Some(padding);
        self
    }

    pub fn with_infinite(mut self, infinite: bool) -> Self {
        self.infinite = Some(infinite);
        self
    }

    pub fn with_horizontal(mut self, horizontal: bool) -> Self {
        self.horizontal = Some(horizontal);
        self
    }

    pub fn with_window_viewport(mut self, window_viewport: bool) -> Self {
        self.window_viewport = Some(window_viewport);
        self
    }
}

fn int(key: &'static str, value: SettingValue) -> Result<i64, SettingsError> {
    match value {
        SettingValue::Int(v) => Ok(v),
        SettingValue::Float(v) if v.is_finite() && v == (v as i64) as f64 => Ok(v as i64),
        _ => Err(SettingsError::InvalidType {
            key,
            expected: "an integer",
        }),
    }
}

fn nullable_int(key: &'static str, value: SettingValue) -> Result<Option<i64>, SettingsError> {
    match value {
        SettingValue::Null => Ok(None),
        other => int(key, other).map(Some),
    }
}

fn boolean(key: &'static str, value: SettingValue) -> Result<bool, SettingsError> {
    match value {
        SettingValue::Bool(v) => Ok(v),
        _ => Err(SettingsError::InvalidType {
            key,
            expected: "a boolean",
        }),
    }
}

/// Validated, immutable configuration of one scrolling session.
///
/// Reconfiguring means building a new `Settings` (and a new session); there are no setters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "UserSettings"))]
pub struct Settings {
    start_index: i64,
    min_index: Option<i64>,
    max_index: Option<i64>,
    item_size: Option<u32>,
    buffer_size: u32,
    padding: f64,
    infinite: bool,
    horizontal: bool,
    window_viewport: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_index: DEFAULT_START_INDEX,
            min_index: None,
            max_index: None,
            item_size: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
            padding: DEFAULT_PADDING,
            infinite: false,
            horizontal: false,
            window_viewport: false,
        }
    }
}

impl TryFrom<UserSettings> for Settings {
    type Error = SettingsError;

    fn try_from(user: UserSettings) -> Result<Self, Self::Error> {
        Self::merge(user)
    }
}

impl Settings {
    /// Merges user overrides over the defaults and validates the result.
    pub fn merge(user: UserSettings) -> Result<Self, SettingsError> {
        let defaults = Self::default();
        let settings = Self {
            start_index: user.start_index.unwrap_or(defaults.start_index),
            min_index: user.min_index.or(defaults.min_index),
            max_index: user.max_index.or(defaults.max_index),
            item_size: user.item_size.or(defaults.item_size),
            buffer_size: user.buffer_size.unwrap_or(defaults.buffer_size),
            padding: user.padding.unwrap_or(defaults.padding),
            infinite: user.infinite.unwrap_or(defaults.infinite),
            horizontal: user.horizontal.unwrap_or(defaults.horizontal),
            window_viewport: user.window_viewport.unwrap_or(defaults.window_viewport),
        };
        settings.validate()?;
        sdebug!(
            start_index = settings.start_index,
            item_size = ?settings.item_size,
            padding = settings.padding,
            window_viewport = settings.window_viewport,
            "Settings::merge"
        );
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.buffer_size == 0 {
            return Err(SettingsError::InvalidValue {
                key: "buffer_size",
                reason: "must be at least 1",
            });
        }
        if !self.padding.is_finite() || self.padding <= 0.0 {
            return Err(SettingsError::InvalidValue {
                key: "padding",
                reason: "must be a finite number greater than 0",
            });
        }
        if let (Some(min), Some(max)) = (self.min_index, self.max_index) {
            if min > max {
                return Err(SettingsError::InvalidRange { min, max });
            }
        }
        Ok(())
    }

    pub fn start_index(&self) -> i64 {
        self.start_index
    }

    /// Lowest index the datasource can produce, `None` when unbounded.
    pub fn min_index(&self) -> Option<i64> {
        self.min_index
    }

    /// Highest index the datasource can produce, `None` when unbounded.
    pub fn max_index(&self) -> Option<i64> {
        self.max_index
    }

    /// Nominal item size along the scroll axis. `None` and `Some(0)` both mean "unknown".
    pub fn item_size(&self) -> Option<u32> {
        self.item_size
    }

    /// Known, non-zero item size.
    pub fn known_item_size(&self) -> Option<f64> {
        self.item_size.filter(|&s| s > 0).map(f64::from)
    }

    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    /// Fraction of the viewport size used as the look-ahead trigger zone.
    pub fn padding(&self) -> f64 {
        self.padding
    }

    pub fn infinite(&self) -> bool {
        self.infinite
    }

    pub fn horizontal(&self) -> bool {
        self.horizontal
    }

    pub fn window_viewport(&self) -> bool {
        self.window_viewport
    }
}
