//! Transition descriptors and their loose-JSON parser.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::foundation::error::{StudioError, StudioResult};
use crate::sources::registry::ExtraSettings;
use crate::transition::ease::Ease;

/// Transition style without its settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionType {
    /// Instant switch.
    Cut,
    /// Crossfade.
    Fade,
    /// Both scenes move together.
    Slide,
    /// Hard or soft edge sweeps across the frame.
    Wipe,
    /// Luminance pattern threshold sweep.
    LumaWipe,
    /// Hard switch at a fixed point, covered by an external stinger clip.
    Stinger,
    /// Fade through a solid color.
    FadeToColor,
    /// One scene moves over the other.
    Swipe,
}

impl TransitionType {
    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cut => "cut",
            Self::Fade => "fade",
            Self::Slide => "slide",
            Self::Wipe => "wipe",
            Self::LumaWipe => "luma_wipe",
            Self::Stinger => "stinger",
            Self::FadeToColor => "fade_to_color",
            Self::Swipe => "swipe",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        Some(match name.trim().to_ascii_lowercase().as_str() {
            "cut" => Self::Cut,
            "fade" | "crossfade" => Self::Fade,
            "slide" => Self::Slide,
            "wipe" => Self::Wipe,
            "luma_wipe" | "lumawipe" | "luma" => Self::LumaWipe,
            "stinger" => Self::Stinger,
            "fade_to_color" | "fadetocolor" | "fade_to_black" => Self::FadeToColor,
            "swipe" => Self::Swipe,
            _ => return None,
        })
    }
}

impl std::fmt::Display for TransitionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction content moves in for slide and swipe transitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Content moves towards the left edge.
    #[default]
    Left,
    /// Content moves towards the right edge.
    Right,
    /// Content moves towards the top edge.
    Up,
    /// Content moves towards the bottom edge.
    Down,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Sweep direction of a wipe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WipeDir {
    /// Incoming scene is revealed from the left edge.
    #[default]
    LeftToRight,
    /// Incoming scene is revealed from the right edge.
    RightToLeft,
    /// Incoming scene is revealed from the top edge.
    TopToBottom,
    /// Incoming scene is revealed from the bottom edge.
    BottomToTop,
}

impl WipeDir {
    fn as_str(self) -> &'static str {
        match self {
            Self::LeftToRight => "left_to_right",
            Self::RightToLeft => "right_to_left",
            Self::TopToBottom => "top_to_bottom",
            Self::BottomToTop => "bottom_to_top",
        }
    }
}

/// Built-in luminance patterns for luma wipes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LumaPattern {
    /// Dark on the left, bright on the right.
    #[default]
    Horizontal,
    /// Dark on top, bright at the bottom.
    Vertical,
    /// Dark center, bright corners.
    Radial,
    /// Diamond (L1 distance from center).
    Diamond,
}

impl LumaPattern {
    fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Radial => "radial",
            Self::Diamond => "diamond",
        }
    }
}

/// Style-specific transition settings.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum TransitionKind {
    Cut,
    Fade,
    Slide {
        direction: Direction,
    },
    Wipe {
        dir: WipeDir,
        /// Soft edge width as a fraction of the sweep axis, in `[0, 1]`.
        soft_edge: f32,
    },
    LumaWipe {
        pattern: LumaPattern,
        /// Threshold ramp width, in `[0, 1]`.
        softness: f32,
        invert: bool,
    },
    Stinger {
        /// Milliseconds into the transition at which the output switches scenes.
        transition_point_ms: u64,
    },
    FadeToColor {
        /// Straight-alpha RGBA.
        color: [u8; 4],
        /// Fraction of the duration at which the color is fully opaque, in `[0, 1]`.
        switch_point: f32,
    },
    Swipe {
        direction: Direction,
        /// `true`: incoming scene moves in over the outgoing one. `false`: outgoing moves away.
        swipe_in: bool,
    },
}

impl TransitionKind {
    /// Settings-free type tag.
    pub fn transition_type(&self) -> TransitionType {
        match self {
            Self::Cut => TransitionType::Cut,
            Self::Fade => TransitionType::Fade,
            Self::Slide { .. } => TransitionType::Slide,
            Self::Wipe { .. } => TransitionType::Wipe,
            Self::LumaWipe { .. } => TransitionType::LumaWipe,
            Self::Stinger { .. } => TransitionType::Stinger,
            Self::FadeToColor { .. } => TransitionType::FadeToColor,
            Self::Swipe { .. } => TransitionType::Swipe,
        }
    }
}

/// A transition request: style, duration and easing.
///
/// Serialized as `{"type": "...", "duration_ms": N, "settings": {...}}`, the same shape
/// [`parse_transition`] accepts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransitionWire", into = "TransitionWire")]
pub struct TransitionDescriptor {
    /// Style and its settings.
    pub kind: TransitionKind,
    /// Duration in milliseconds. Ignored for [`TransitionKind::Cut`].
    pub duration_ms: u64,
    /// Easing applied to the visual blend.
    pub ease: Ease,
    /// Settings this crate does not interpret, kept for forward compatibility.
    pub extra: ExtraSettings,
}

impl TransitionDescriptor {
    /// Build a descriptor with default easing. A cut always gets duration 0.
    pub fn new(kind: TransitionKind, duration_ms: u64) -> Self {
        let duration_ms = if kind == TransitionKind::Cut {
            0
        } else {
            duration_ms
        };
        Self {
            kind,
            duration_ms,
            ease: Ease::Linear,
            extra: ExtraSettings::new(),
        }
    }

    /// Instant switch.
    pub fn cut() -> Self {
        Self::new(TransitionKind::Cut, 0)
    }

    /// Crossfade over `duration_ms`.
    pub fn fade(duration_ms: u64) -> Self {
        Self::new(TransitionKind::Fade, duration_ms)
    }

    /// Settings-free type tag.
    pub fn transition_type(&self) -> TransitionType {
        self.kind.transition_type()
    }

    /// `true` when the transition commits on the tick it starts. A cut is always instant, whatever
    /// its `duration_ms` field says.
    pub fn is_instant(&self) -> bool {
        self.duration_ms == 0 || self.kind == TransitionKind::Cut
    }

    /// Duration the engine actually runs: 0 for instant transitions.
    pub fn effective_duration_ms(&self) -> u64 {
        if self.is_instant() { 0 } else { self.duration_ms }
    }

    /// Settings as a JSON object, in the shape [`parse_transition`] reads back.
    pub fn settings_json(&self) -> Value {
        let mut map: Map<String, Value> = self
            .extra
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let typed = match &self.kind {
            TransitionKind::Cut | TransitionKind::Fade => json!({}),
            TransitionKind::Slide { direction } => json!({ "direction": direction.as_str() }),
            TransitionKind::Wipe { dir, soft_edge } => {
                json!({ "dir": dir.as_str(), "soft_edge": soft_edge })
            }
            TransitionKind::LumaWipe {
                pattern,
                softness,
                invert,
            } => json!({ "pattern": pattern.as_str(), "softness": softness, "invert": invert }),
            TransitionKind::Stinger {
                transition_point_ms,
            } => json!({ "transition_point_ms": transition_point_ms }),
            TransitionKind::FadeToColor {
                color,
                switch_point,
            } => json!({ "color": color, "switch_point": switch_point }),
            TransitionKind::Swipe {
                direction,
                swipe_in,
            } => json!({ "direction": direction.as_str(), "swipe_in": swipe_in }),
        };
        if let Value::Object(typed) = typed {
            map.extend(typed);
        }
        if self.ease != Ease::Linear {
            map.insert("ease".to_owned(), json!(self.ease));
        }
        Value::Object(map)
    }
}

impl Default for TransitionDescriptor {
    fn default() -> Self {
        Self::fade(300)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct TransitionWire {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    duration_ms: u64,
    #[serde(default)]
    settings: Value,
}

impl TryFrom<TransitionWire> for TransitionDescriptor {
    type Error = StudioError;

    fn try_from(wire: TransitionWire) -> StudioResult<Self> {
        parse_transition(&wire.kind, wire.duration_ms, &wire.settings)
    }
}

impl From<TransitionDescriptor> for TransitionWire {
    fn from(d: TransitionDescriptor) -> Self {
        Self {
            kind: d.transition_type().as_str().to_owned(),
            duration_ms: d.duration_ms,
            settings: d.settings_json(),
        }
    }
}

/// Parse a transition from its type name, duration and loose JSON settings.
///
/// `settings` may be `null` or an object. Known keys are validated (unknown enum values and
/// non-finite numbers are errors), soft numeric values are clamped into range, and unknown keys
/// are kept in [`TransitionDescriptor::extra`]. An optional `"ease"` key selects the easing.
pub fn parse_transition(
    kind: &str,
    duration_ms: u64,
    settings: &Value,
) -> StudioResult<TransitionDescriptor> {
    let name = kind.trim();
    if name.is_empty() {
        return Err(StudioError::validation("transition type must be non-empty"));
    }
    let ty = TransitionType::parse(name)
        .ok_or_else(|| StudioError::validation(format!("unknown transition type '{name}'")))?;

    let mut params = match settings {
        Value::Null => Map::new(),
        Value::Object(map) => map.clone(),
        _ => {
            return Err(StudioError::validation(format!(
                "{ty} settings must be an object"
            )));
        }
    };

    let ease = match params.remove("ease") {
        None | Some(Value::Null) => Ease::Linear,
        Some(Value::String(s)) => Ease::parse(&s)
            .ok_or_else(|| StudioError::validation(format!("unknown ease '{s}'")))?,
        Some(_) => return Err(StudioError::validation("ease must be a string")),
    };

    let kind = match ty {
        TransitionType::Cut => TransitionKind::Cut,
        TransitionType::Fade => TransitionKind::Fade,
        TransitionType::Slide => TransitionKind::Slide {
            direction: take_direction(&mut params, ty)?,
        },
        TransitionType::Swipe => TransitionKind::Swipe {
            direction: take_direction(&mut params, ty)?,
            swipe_in: take_bool(&mut params, "swipe_in", true, ty)?,
        },
        TransitionType::Wipe => {
            let dir = match take_str(&mut params, &["dir", "direction"], ty)? {
                None => WipeDir::LeftToRight,
                Some(s) => match normalize_key(&s).as_str() {
                    "lefttoright" | "ltr" | "right" => WipeDir::LeftToRight,
                    "righttoleft" | "rtl" | "left" => WipeDir::RightToLeft,
                    "toptobottom" | "ttb" | "down" => WipeDir::TopToBottom,
                    "bottomtotop" | "btt" | "up" => WipeDir::BottomToTop,
                    _ => return Err(StudioError::validation(format!("unknown wipe.dir '{s}'"))),
                },
            };
            TransitionKind::Wipe {
                dir,
                soft_edge: take_unit(&mut params, "soft_edge", 0.0, ty)?,
            }
        }
        TransitionType::LumaWipe => {
            let pattern = match take_str(&mut params, &["pattern", "image"], ty)? {
                None => LumaPattern::Horizontal,
                Some(s) => match normalize_key(&s).as_str() {
                    "horizontal" | "linearh" => LumaPattern::Horizontal,
                    "vertical" | "linearv" => LumaPattern::Vertical,
                    "radial" | "circle" => LumaPattern::Radial,
                    "diamond" => LumaPattern::Diamond,
                    _ => {
                        return Err(StudioError::validation(format!(
                            "unknown luma_wipe.pattern '{s}'"
                        )));
                    }
                },
            };
            TransitionKind::LumaWipe {
                pattern,
                softness: take_unit(&mut params, "softness", 0.1, ty)?,
                invert: take_bool(&mut params, "invert", false, ty)?,
            }
        }
        TransitionType::Stinger => {
            let point = match params.remove("transition_point_ms") {
                None | Some(Value::Null) => duration_ms / 2,
                Some(v) => {
                    let ms = v.as_f64().filter(|f| f.is_finite()).ok_or_else(|| {
                        StudioError::validation("stinger.transition_point_ms must be a number")
                    })?;
                    ms.max(0.0).round() as u64
                }
            };
            TransitionKind::Stinger {
                transition_point_ms: point.min(duration_ms),
            }
        }
        TransitionType::FadeToColor => TransitionKind::FadeToColor {
            color: take_color(&mut params, ty)?,
            switch_point: take_unit(&mut params, "switch_point", 0.5, ty)?,
        },
    };

    let mut descriptor = TransitionDescriptor::new(kind, duration_ms);
    descriptor.ease = ease;
    descriptor.extra = params.into_iter().collect();
    Ok(descriptor)
}

fn normalize_key(s: &str) -> String {
    s.trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn take_str(
    params: &mut Map<String, Value>,
    keys: &[&str],
    ty: TransitionType,
) -> StudioResult<Option<String>> {
    for key in keys {
        match params.remove(*key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) => return Ok(Some(s)),
            Some(_) => {
                return Err(StudioError::validation(format!(
                    "{ty}.{key} must be a string"
                )));
            }
        }
    }
    Ok(None)
}

fn take_bool(
    params: &mut Map<String, Value>,
    key: &str,
    default: bool,
    ty: TransitionType,
) -> StudioResult<bool> {
    match params.remove(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(b),
        Some(_) => Err(StudioError::validation(format!("{ty}.{key} must be a bool"))),
    }
}

fn take_unit(
    params: &mut Map<String, Value>,
    key: &str,
    default: f32,
    ty: TransitionType,
) -> StudioResult<f32> {
    match params.remove(key) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => {
            let f = v.as_f64().map(|f| f as f32).filter(|f| f.is_finite());
            let f = f.ok_or_else(|| {
                StudioError::validation(format!("{ty}.{key} must be finite when set"))
            })?;
            Ok(f.clamp(0.0, 1.0))
        }
    }
}

fn take_direction(params: &mut Map<String, Value>, ty: TransitionType) -> StudioResult<Direction> {
    match take_str(params, &["direction", "dir"], ty)? {
        None => Ok(Direction::Left),
        Some(s) => match normalize_key(&s).as_str() {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            "up" | "top" => Ok(Direction::Up),
            "down" | "bottom" => Ok(Direction::Down),
            _ => Err(StudioError::validation(format!(
                "unknown {ty}.direction '{s}'"
            ))),
        },
    }
}

fn take_color(params: &mut Map<String, Value>, ty: TransitionType) -> StudioResult<[u8; 4]> {
    let bad = || StudioError::validation(format!("{ty}.color must be '#rrggbb[aa]' or [r,g,b(,a)]"));
    match params.remove("color") {
        None | Some(Value::Null) => Ok([0, 0, 0, 255]),
        Some(Value::String(s)) => parse_hex_color(&s).ok_or_else(bad),
        Some(Value::Array(items)) => {
            if items.len() != 3 && items.len() != 4 {
                return Err(bad());
            }
            let mut out = [0, 0, 0, 255];
            for (slot, v) in out.iter_mut().zip(&items) {
                let n = v.as_u64().filter(|n| *n <= 255).ok_or_else(bad)?;
                *slot = n as u8;
            }
            Ok(out)
        }
        Some(_) => Err(bad()),
    }
}

fn parse_hex_color(s: &str) -> Option<[u8; 4]> {
    let hex = s.trim().strip_prefix('#')?;
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let a = if hex.len() == 8 { byte(6)? } else { 255 };
    Some([byte(0)?, byte(2)?, byte(4)?, a])
}

#[cfg(test)]
#[path = "../../tests/unit/transition/descriptor.rs"]
mod tests;
