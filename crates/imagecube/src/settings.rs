//! Widget settings
//!
//! [`Settings`] is the full configuration of one image cube. It loads from
//! TOML or JSON with camelCase keys; every key is optional and falls back to
//! the defaults below. [`SettingsPatch`] is a partial update where an
//! explicit `null` clears a setting back to its default.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use imagecube_animation::Easing;
use imagecube_surface::SurfaceId;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::error::{CubeError, Result};

/// One of the four travel directions of a rotation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Cardinal {
    Up,
    Down,
    Left,
    Right,
}

impl Cardinal {
    pub const ALL: [Cardinal; 4] = [Cardinal::Up, Cardinal::Down, Cardinal::Left, Cardinal::Right];

    /// True for up and down, where faces collapse vertically
    pub fn is_vertical(self) -> bool {
        matches!(self, Cardinal::Up | Cardinal::Down)
    }

    /// True for up and left, where the outgoing face catches the highlight
    pub fn is_up_left(self) -> bool {
        matches!(self, Cardinal::Up | Cardinal::Left)
    }
}

impl FromStr for Cardinal {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Cardinal::Up),
            "down" => Ok(Cardinal::Down),
            "left" => Ok(Cardinal::Left),
            "right" => Ok(Cardinal::Right),
            _ => Err(CubeError::UnknownDirection(s.to_string())),
        }
    }
}

impl From<String> for Cardinal {
    fn from(name: String) -> Self {
        name.parse().unwrap_or_else(|_| {
            debug!(direction = %name, "unknown direction, using up");
            Cardinal::Up
        })
    }
}

/// Configured direction: fixed, or picked per rotation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    Random,
}

impl Direction {
    /// Pick the cardinal direction for one rotation.
    ///
    /// `Random` draws uniformly from `candidates`; an empty candidate set
    /// resolves to up.
    pub fn resolve<R: Rng>(self, candidates: &[Cardinal], rng: &mut R) -> Cardinal {
        match self {
            Direction::Up => Cardinal::Up,
            Direction::Down => Cardinal::Down,
            Direction::Left => Cardinal::Left,
            Direction::Right => Cardinal::Right,
            Direction::Random if candidates.is_empty() => Cardinal::Up,
            Direction::Random => candidates[rng.random_range(0..candidates.len())],
        }
    }
}

impl FromStr for Direction {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("random") {
            return Ok(Direction::Random);
        }
        Ok(match s.parse::<Cardinal>()? {
            Cardinal::Up => Direction::Up,
            Cardinal::Down => Direction::Down,
            Cardinal::Left => Direction::Left,
            Cardinal::Right => Direction::Right,
        })
    }
}

impl From<String> for Direction {
    fn from(name: String) -> Self {
        name.parse().unwrap_or_else(|_| {
            debug!(direction = %name, "unknown direction, using up");
            Direction::Up
        })
    }
}

/// How the next panel is chosen
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Selection {
    #[default]
    Forward,
    Backward,
    Random,
}

impl FromStr for Selection {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" => Ok(Selection::Forward),
            "backward" => Ok(Selection::Backward),
            "random" => Ok(Selection::Random),
            _ => Err(CubeError::UnknownSelection(s.to_string())),
        }
    }
}

impl From<String> for Selection {
    fn from(name: String) -> Self {
        name.parse().unwrap_or_else(|_| {
            debug!(selection = %name, "unknown selection policy, using forward");
            Selection::Forward
        })
    }
}

/// What a rotation hook is told
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RotateEvent {
    pub container: SurfaceId,
    /// Panel being rotated away
    pub current: SurfaceId,
    /// Panel being rotated in
    pub next: SurfaceId,
    pub direction: Cardinal,
}

/// A shared rotation hook
#[derive(Clone)]
pub struct RotateHook(Rc<dyn Fn(&RotateEvent)>);

impl RotateHook {
    pub fn new(hook: impl Fn(&RotateEvent) + 'static) -> Self {
        Self(Rc::new(hook))
    }

    pub fn call(&self, event: &RotateEvent) {
        (self.0)(event)
    }
}

impl fmt::Debug for RotateHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RotateHook(..)")
    }
}

impl PartialEq for RotateHook {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Full configuration of one image cube
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Direction of rotation
    pub direction: Direction,
    /// Candidates when `direction` is random
    pub random_selection: SmallVec<[Cardinal; 4]>,
    /// Transition duration in milliseconds
    #[serde(deserialize_with = "saturating_u32")]
    pub speed: u32,
    pub easing: Easing,
    /// Automatically rotate again after `pause`
    pub repeat: bool,
    /// Milliseconds between rotations
    #[serde(deserialize_with = "saturating_u32")]
    pub pause: u32,
    pub selection: Selection,
    /// Overlay highlights and shadows during rotation
    pub shading: bool,
    /// Minimum and maximum shading opacity
    pub opacity: (f32, f32),
    /// Slice faces into strips for a perspective effect
    #[serde(rename = "full3D")]
    pub full_3d: bool,
    /// Strips per face in 3D mode
    #[serde(deserialize_with = "saturating_u32")]
    pub segments: u32,
    /// Pixels the far edge of a face shrinks by
    pub reduction: f32,
    /// Pixels the near edge of a face grows by
    pub expansion: f32,
    /// Hidden and normal line height (em)
    pub line_height: (f32, f32),
    /// Hidden and normal letter spacing (em)
    pub letter_spacing: (f32, f32),
    #[serde(skip)]
    pub before_rotate: Option<RotateHook>,
    #[serde(skip)]
    pub after_rotate: Option<RotateHook>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            direction: Direction::Random,
            random_selection: SmallVec::from_slice(&Cardinal::ALL),
            speed: 2000,
            easing: Easing::Linear,
            repeat: true,
            pause: 2000,
            selection: Selection::Forward,
            shading: true,
            opacity: (0.0, 0.8),
            full_3d: true,
            segments: 20,
            reduction: 30.0,
            expansion: 10.0,
            line_height: (0.0, 1.25),
            letter_spacing: (-0.4, 0.0),
            before_rotate: None,
            after_rotate: None,
        }
    }
}

impl Settings {
    /// Load settings from TOML text
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Load settings from JSON text
    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Merge a patch; cleared settings take their value from `defaults`
    pub fn apply(&mut self, patch: SettingsPatch, defaults: &Settings) {
        patch.direction.merge(&mut self.direction, || defaults.direction);
        patch
            .random_selection
            .merge(&mut self.random_selection, || defaults.random_selection.clone());
        patch.speed.merge(&mut self.speed, || defaults.speed);
        patch.easing.merge(&mut self.easing, || defaults.easing);
        patch.repeat.merge(&mut self.repeat, || defaults.repeat);
        patch.pause.merge(&mut self.pause, || defaults.pause);
        patch.selection.merge(&mut self.selection, || defaults.selection);
        patch.shading.merge(&mut self.shading, || defaults.shading);
        patch.opacity.merge(&mut self.opacity, || defaults.opacity);
        patch.full_3d.merge(&mut self.full_3d, || defaults.full_3d);
        patch.segments.merge(&mut self.segments, || defaults.segments);
        patch.reduction.merge(&mut self.reduction, || defaults.reduction);
        patch.expansion.merge(&mut self.expansion, || defaults.expansion);
        patch
            .line_height
            .merge(&mut self.line_height, || defaults.line_height);
        patch
            .letter_spacing
            .merge(&mut self.letter_spacing, || defaults.letter_spacing);
        patch.before_rotate.merge_option(&mut self.before_rotate);
        patch.after_rotate.merge_option(&mut self.after_rotate);
    }
}

/// One field of a [`SettingsPatch`]
#[derive(Clone, Debug, PartialEq)]
pub enum Patch<T> {
    /// Leave the setting alone
    Keep,
    Set(T),
    /// Reset the setting to its default
    Clear,
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T> Patch<T> {
    fn merge(self, slot: &mut T, default: impl FnOnce() -> T) {
        match self {
            Patch::Keep => {}
            Patch::Set(value) => *slot = value,
            Patch::Clear => *slot = default(),
        }
    }

    fn merge_option(self, slot: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Set(value) => *slot = Some(value),
            Patch::Clear => *slot = None,
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.map_or(Patch::Clear, Patch::Set))
    }
}

/// Any number as a `u32`: fractions truncate, negatives become zero and
/// huge values saturate.
fn saturating_u32<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<u32, D::Error> {
    f64::deserialize(deserializer).map(|n| n as u32)
}

fn saturating_u32_patch<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Patch<u32>, D::Error> {
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.map_or(Patch::Clear, |n| Patch::Set(n as u32)))
}

/// A partial settings update
///
/// Absent keys are kept; `null` clears a setting back to its default.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsPatch {
    pub direction: Patch<Direction>,
    pub random_selection: Patch<SmallVec<[Cardinal; 4]>>,
    #[serde(deserialize_with = "saturating_u32_patch")]
    pub speed: Patch<u32>,
    pub easing: Patch<Easing>,
    pub repeat: Patch<bool>,
    #[serde(deserialize_with = "saturating_u32_patch")]
    pub pause: Patch<u32>,
    pub selection: Patch<Selection>,
    pub shading: Patch<bool>,
    pub opacity: Patch<(f32, f32)>,
    #[serde(rename = "full3D")]
    pub full_3d: Patch<bool>,
    #[serde(deserialize_with = "saturating_u32_patch")]
    pub segments: Patch<u32>,
    pub reduction: Patch<f32>,
    pub expansion: Patch<f32>,
    pub line_height: Patch<(f32, f32)>,
    pub letter_spacing: Patch<(f32, f32)>,
    #[serde(skip)]
    pub before_rotate: Patch<RotateHook>,
    #[serde(skip)]
    pub after_rotate: Patch<RotateHook>,
}

impl SettingsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a patch that changes one setting, named as in configuration
    /// files (`"speed"`, `"full3D"`, ...). A JSON `null` clears it.
    pub fn single(name: &str, value: serde_json::Value) -> Result<Self> {
        let mut object = serde_json::Map::new();
        object.insert(name.to_string(), value);
        Ok(serde_json::from_value(serde_json::Value::Object(object))?)
    }

    /// Parse a patch from JSON text
    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Patch::Set(direction);
        self
    }

    pub fn speed(mut self, ms: u32) -> Self {
        self.speed = Patch::Set(ms);
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Patch::Set(easing);
        self
    }

    pub fn repeat(mut self, repeat: bool) -> Self {
        self.repeat = Patch::Set(repeat);
        self
    }

    pub fn pause(mut self, ms: u32) -> Self {
        self.pause = Patch::Set(ms);
        self
    }

    pub fn selection(mut self, selection: Selection) -> Self {
        self.selection = Patch::Set(selection);
        self
    }

    pub fn shading(mut self, shading: bool) -> Self {
        self.shading = Patch::Set(shading);
        self
    }

    pub fn full_3d(mut self, full_3d: bool) -> Self {
        self.full_3d = Patch::Set(full_3d);
        self
    }

    pub fn segments(mut self, segments: u32) -> Self {
        self.segments = Patch::Set(segments);
        self
    }

    pub fn before_rotate(mut self, hook: impl Fn(&RotateEvent) + 'static) -> Self {
        self.before_rotate = Patch::Set(RotateHook::new(hook));
        self
    }

    pub fn after_rotate(mut self, hook: impl Fn(&RotateEvent) + 'static) -> Self {
        self.after_rotate = Patch::Set(RotateHook::new(hook));
        self
    }
}

impl From<Settings> for SettingsPatch {
    fn from(settings: Settings) -> Self {
        let set_option = |hook: Option<RotateHook>| hook.map_or(Patch::Clear, Patch::Set);
        Self {
            direction: Patch::Set(settings.direction),
            random_selection: Patch::Set(settings.random_selection),
            speed: Patch::Set(settings.speed),
            easing: Patch::Set(settings.easing),
            repeat: Patch::Set(settings.repeat),
            pause: Patch::Set(settings.pause),
            selection: Patch::Set(settings.selection),
            shading: Patch::Set(settings.shading),
            opacity: Patch::Set(settings.opacity),
            full_3d: Patch::Set(settings.full_3d),
            segments: Patch::Set(settings.segments),
            reduction: Patch::Set(settings.reduction),
            expansion: Patch::Set(settings.expansion),
            line_height: Patch::Set(settings.line_height),
            letter_spacing: Patch::Set(settings.letter_spacing),
            before_rotate: set_option(settings.before_rotate),
            after_rotate: set_option(settings.after_rotate),
        }
    }
}
