//! Static configuration: classifier thresholds, debounce timing, enabled
//! gestures and the gesture-to-action binding table.
//!
//! Loaded once at startup from an s-expression plist and validated before
//! the first frame is processed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lexpr::Value;
use tracing::debug;

use crate::action::{ActionBinding, ActionTarget};
use crate::gesture::{ClassifierRegistry, DebounceConfig, GestureLabel, Thresholds};
use crate::sexp;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] lexpr::parse::Error),

    #[error("config must be a plist, got {0}")]
    NotAPlist(String),

    #[error("invalid value for :{key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("unknown gesture `{0}`")]
    UnknownGesture(String),

    #[error("gesture {0} is enabled twice")]
    DuplicateGesture(GestureLabel),

    #[error("no gestures enabled")]
    NoGestures,

    #[error("gesture {0} is enabled but has no binding")]
    MissingBinding(GestureLabel),

    #[error("binding for {0} has no program to launch")]
    EmptyTarget(GestureLabel),

    #[error("{key} must be {expected}, got {value}")]
    OutOfRange {
        key: &'static str,
        expected: &'static str,
        value: f64,
    },
}

// ── Config ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub thresholds: Thresholds,
    pub debounce: DebounceConfig,
    /// Hands scored below this by the detector are ignored.
    pub min_hand_score: f32,
    /// Landmark smoothing factor (0 = off, closer to 1 = smoother).
    pub smoothing: f32,
    /// Enabled gestures in resolution order.
    pub gestures: Vec<GestureLabel>,
    pub bindings: BTreeMap<GestureLabel, ActionBinding>,
}

impl Default for Config {
    fn default() -> Self {
        let bindings = BTreeMap::from([
            (GestureLabel::Ok, ActionBinding::launch("notepad.exe", "Opens Notepad", "#00ff00")),
            (GestureLabel::ThumbsUp, ActionBinding::launch("calc.exe", "Opens Calculator", "#ff0000")),
            (GestureLabel::PeaceSign, ActionBinding::launch("mspaint.exe", "Opens Paint", "#ffff00")),
            (GestureLabel::Fist, ActionBinding::launch("taskmgr.exe", "Opens Task Manager", "#00ffff")),
            (GestureLabel::OpenHand, ActionBinding::stop("Stops gesture control", "#ffffff")),
        ]);
        Self {
            thresholds: Thresholds::default(),
            debounce: DebounceConfig::default(),
            min_hand_score: 0.7,
            smoothing: 0.0,
            gestures: vec![
                GestureLabel::Ok,
                GestureLabel::ThumbsUp,
                GestureLabel::PeaceSign,
                GestureLabel::Fist,
                GestureLabel::OpenHand,
            ],
            bindings,
        }
    }
}

impl Config {
    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_sexp(&text)?;
        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse a config plist.  Absent keys keep their defaults; a present
    /// `:bindings` list replaces the default table.  Does not validate.
    pub fn from_sexp(text: &str) -> Result<Self, ConfigError> {
        let value = lexpr::from_str(text)?;
        if !matches!(value, Value::Cons(_) | Value::Null) {
            return Err(ConfigError::NotAPlist(value.to_string()));
        }

        let mut config = Self::default();
        if let Some(v) = float_field(&value, "ok-distance")? {
            config.thresholds.ok_distance = v as f32;
        }
        if let Some(v) = float_field(&value, "thumb-min-rise")? {
            config.thresholds.thumb_min_rise = v as f32;
        }
        if let Some(ms) = uint_field(&value, "cooldown-ms")? {
            config.debounce.cooldown = Duration::from_millis(ms);
        }
        if let Some(ms) = uint_field(&value, "min-hold-ms")? {
            config.debounce.min_hold = Duration::from_millis(ms);
        }
        if let Some(v) = float_field(&value, "min-hand-score")? {
            config.min_hand_score = v as f32;
        }
        if let Some(v) = float_field(&value, "smoothing")? {
            config.smoothing = v as f32;
        }
        if let Some(list) = sexp::plist_get(&value, "gestures") {
            config.gestures = sexp::list_items(list)
                .into_iter()
                .map(parse_label)
                .collect::<Result<_, _>>()?;
        }
        if let Some(list) = sexp::plist_get(&value, "bindings") {
            config.bindings = sexp::list_items(list)
                .into_iter()
                .map(parse_binding)
                .collect::<Result<_, _>>()?;
        }
        Ok(config)
    }

    /// Check thresholds and that every enabled gesture can be dispatched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("ok-distance", "a positive number", self.thresholds.ok_distance, |v| v > 0.0)?;
        check_range("thumb-min-rise", "non-negative", self.thresholds.thumb_min_rise, |v| v >= 0.0)?;
        check_range("min-hand-score", "within [0, 1]", self.min_hand_score, |v| {
            (0.0..=1.0).contains(&v)
        })?;
        check_range("smoothing", "within [0, 1)", self.smoothing, |v| (0.0..1.0).contains(&v))?;

        if self.gestures.is_empty() {
            return Err(ConfigError::NoGestures);
        }
        for (i, label) in self.gestures.iter().enumerate() {
            if self.gestures[..i].contains(label) {
                return Err(ConfigError::DuplicateGesture(*label));
            }
            let binding = self.bindings.get(label).ok_or(ConfigError::MissingBinding(*label))?;
            if let ActionTarget::Launch(argv) = &binding.target {
                if argv.first().map_or(true, |p| p.is_empty()) {
                    return Err(ConfigError::EmptyTarget(*label));
                }
            }
        }
        Ok(())
    }

    /// Classifier registry for the enabled gestures.
    pub fn registry(&self) -> ClassifierRegistry {
        ClassifierRegistry::standard(&self.gestures, &self.thresholds)
    }

    /// Render as a config plist that [`Config::from_sexp`] reads back.
    pub fn to_sexp(&self) -> String {
        let gestures: Vec<&str> = self.gestures.iter().map(|g| g.as_str()).collect();
        let bindings: Vec<String> = self
            .bindings
            .iter()
            .map(|(label, b)| {
                let target = match &b.target {
                    ActionTarget::Launch(argv) => {
                        let quoted: Vec<String> = argv.iter().map(|a| sexp::quote(a)).collect();
                        format!(":launch ({})", quoted.join(" "))
                    }
                    ActionTarget::Stop => ":stop t".to_string(),
                };
                format!(
                    "(:gesture {} {} :description {} :color {})",
                    label,
                    target,
                    sexp::quote(&b.description),
                    sexp::quote(&b.color)
                )
            })
            .collect();
        format!(
            "(:ok-distance {} :thumb-min-rise {} :cooldown-ms {} :min-hold-ms {} \
             :min-hand-score {} :smoothing {} :gestures ({}) :bindings ({}))",
            self.thresholds.ok_distance,
            self.thresholds.thumb_min_rise,
            self.debounce.cooldown.as_millis(),
            self.debounce.min_hold.as_millis(),
            self.min_hand_score,
            self.smoothing,
            gestures.join(" "),
            bindings.join(" ")
        )
    }
}

// ── Parsing helpers ────────────────────────────────────────

fn invalid(key: &str, value: &Value) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn float_field(plist: &Value, key: &str) -> Result<Option<f64>, ConfigError> {
    match sexp::plist_get(plist, key) {
        None => Ok(None),
        Some(v) => sexp::get_float(plist, key).map(Some).ok_or_else(|| invalid(key, v)),
    }
}

fn uint_field(plist: &Value, key: &str) -> Result<Option<u64>, ConfigError> {
    match sexp::plist_get(plist, key) {
        None => Ok(None),
        Some(v) => sexp::get_uint(plist, key).map(Some).ok_or_else(|| invalid(key, v)),
    }
}

fn parse_label(value: &Value) -> Result<GestureLabel, ConfigError> {
    let name = sexp::atom_string(value).ok_or_else(|| invalid("gestures", value))?;
    GestureLabel::parse(&name).ok_or(ConfigError::UnknownGesture(name))
}

/// `(:gesture ok :launch ("prog" "arg") :description "..." :color "#rrggbb")`,
/// or `:stop t` in place of `:launch`.  A bare string is accepted for
/// `:launch`.
fn parse_binding(entry: &Value) -> Result<(GestureLabel, ActionBinding), ConfigError> {
    let gesture = sexp::plist_get(entry, "gesture").ok_or_else(|| invalid("bindings", entry))?;
    let label = parse_label(gesture)?;

    let target = if sexp::get_bool(entry, "stop").unwrap_or(false) {
        ActionTarget::Stop
    } else {
        let argv = match sexp::plist_get(entry, "launch") {
            Some(Value::String(program)) => vec![program.to_string()],
            Some(list @ (Value::Cons(_) | Value::Null)) => sexp::list_items(list)
                .into_iter()
                .map(|a| sexp::atom_string(a).ok_or_else(|| invalid("launch", a)))
                .collect::<Result<_, _>>()?,
            Some(other) => return Err(invalid("launch", other)),
            None => Vec::new(),
        };
        ActionTarget::Launch(argv)
    };

    let binding = ActionBinding {
        target,
        description: sexp::get_string(entry, "description").unwrap_or_else(|| label.to_string()),
        color: sexp::get_string(entry, "color").unwrap_or_else(|| "#ffffff".to_string()),
    };
    Ok((label, binding))
}

fn check_range(
    key: &'static str,
    expected: &'static str,
    value: f32,
    ok: impl Fn(f32) -> bool,
) -> Result<(), ConfigError> {
    if value.is_finite() && ok(value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            key,
            expected,
            value: value as f64,
        })
    }
}
