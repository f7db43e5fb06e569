//! Transition planning
//!
//! A rotation reads the container geometry and both panels' box metrics
//! once, up front. Every animated property then becomes an
//! [`AnimatedValue`] holding its start, end and precomputed delta, so each
//! frame is a plain `start + pos * delta` per property.
//!
//! Planning also performs the transition's set-up writes: start values,
//! `overflow: hidden`, the shading overlays and, in 3D mode, the strip
//! clones.

use imagecube_surface::{
    metrics, Edges, Point, Property, Rect, Rgb, Size, Style, StyleSystem, SurfaceId, Unit, Value,
};
use smallvec::SmallVec;
use tracing::debug;

use crate::settings::{Cardinal, Settings};

/// Class carried by every surface the widget creates
pub const SYNTHETIC_CLASS: &str = "imagecube-synthetic";

/// Overlays sit above the panels they shade
const OVERLAY_Z_INDEX: f32 = 10.0;

/// One property animated from `start` to `end`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimatedValue {
    pub start: f32,
    pub end: f32,
    pub delta: f32,
    pub unit: Unit,
}

impl AnimatedValue {
    pub fn new(start: f32, end: f32, unit: Unit) -> Self {
        Self {
            start,
            end,
            delta: end - start,
            unit,
        }
    }

    /// Value at progress `pos`; exactly `end` once `pos` reaches 1
    pub fn at(&self, pos: f32) -> f32 {
        if pos >= 1.0 {
            self.end
        } else {
            self.start + pos * self.delta
        }
    }

    pub fn value_at(&self, pos: f32) -> Value {
        Value::Length(self.at(pos), self.unit)
    }
}

/// Legacy alpha filter text mirroring an opacity
pub fn alpha_filter(opacity: f32) -> Value {
    Value::keyword(format!("alpha(opacity={})", (opacity * 100.0).round() as i32))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceRole {
    Outgoing,
    Incoming,
    Highlight,
    Shadow,
}

/// The animated properties of one surface
#[derive(Clone, Debug)]
pub struct SurfacePlan {
    pub surface: SurfaceId,
    pub role: SurfaceRole,
    pub props: SmallVec<[(Property, AnimatedValue); 16]>,
}

impl SurfacePlan {
    fn new(surface: SurfaceId, role: SurfaceRole) -> Self {
        Self {
            surface,
            role,
            props: SmallVec::new(),
        }
    }

    fn push(&mut self, prop: Property, start: f32, end: f32, unit: Unit) {
        self.props.push((prop, AnimatedValue::new(start, end, unit)));
    }

    pub fn get(&self, prop: Property) -> Option<&AnimatedValue> {
        self.props.iter().find(|(p, _)| *p == prop).map(|(_, v)| v)
    }

    /// Property writes for progress `pos`; opacity also writes the alpha filter
    pub fn values_at(&self, pos: f32) -> Vec<(Property, Value)> {
        let mut out = Vec::with_capacity(self.props.len() + 1);
        for (prop, anim) in &self.props {
            out.push((*prop, anim.value_at(pos)));
            if *prop == Property::Opacity {
                out.push((Property::Filter, alpha_filter(anim.at(pos))));
            }
        }
        out
    }

    fn range(&self, prop: Property) -> (f32, f32) {
        self.get(prop).map_or((0.0, 0.0), |v| (v.start, v.end))
    }
}

/// Opacity ramps of the two shading layers
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shading {
    pub highlight: AnimatedValue,
    pub shadow: AnimatedValue,
}

impl Shading {
    fn new(direction: Cardinal, (low, high): (f32, f32)) -> Self {
        let first = if direction.is_up_left() { low } else { high };
        Self {
            highlight: AnimatedValue::new(first, high - first, Unit::None),
            shadow: AnimatedValue::new(high - first, first, Unit::None),
        }
    }

    /// Ramp and colour shading the given panel
    pub fn for_panel(&self, direction: Cardinal, role: SurfaceRole) -> (AnimatedValue, Rgb) {
        let highlighted = match role {
            SurfaceRole::Outgoing => direction.is_up_left(),
            _ => !direction.is_up_left(),
        };
        if highlighted {
            (self.highlight, Rgb::WHITE)
        } else {
            (self.shadow, Rgb::BLACK)
        }
    }
}

/// 3D tuning captured when the transition was planned
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Perspective {
    pub segments: u32,
    pub reduction: f32,
    pub expansion: f32,
    pub line_height: (f32, f32),
    pub letter_spacing: (f32, f32),
}

/// One slice of a face in 3D mode
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Strip {
    pub surface: SurfaceId,
    pub shade: Option<SurfaceId>,
}

/// All strips of both faces
#[derive(Clone, Debug)]
pub struct StripSet {
    pub perspective: Perspective,
    pub outgoing: Vec<Strip>,
    pub incoming: Vec<Strip>,
    /// Border plus padding of the outgoing panel, per axis
    pub outgoing_extras: Size,
    pub incoming_extras: Size,
}

impl StripSet {
    pub fn face(&self, role: SurfaceRole) -> &[Strip] {
        match role {
            SurfaceRole::Incoming => &self.incoming,
            _ => &self.outgoing,
        }
    }

    pub fn extras(&self, role: SurfaceRole) -> Size {
        match role {
            SurfaceRole::Incoming => self.incoming_extras,
            _ => self.outgoing_extras,
        }
    }
}

/// Everything needed to render and finish one rotation
#[derive(Clone, Debug)]
pub struct TransitionPlan {
    pub container: SurfaceId,
    pub outgoing: SurfaceId,
    pub incoming: SurfaceId,
    pub direction: Cardinal,
    /// Container offset and size
    pub frame: Rect,
    /// Panels first, then any shading overlays
    pub surfaces: SmallVec<[SurfacePlan; 4]>,
    pub shading: Option<Shading>,
    /// Present in 3D mode
    pub strips: Option<StripSet>,
    saved: Style,
}

impl TransitionPlan {
    pub fn surface(&self, role: SurfaceRole) -> Option<&SurfacePlan> {
        self.surfaces.iter().find(|s| s.role == role)
    }

    /// Outgoing panel style from before the transition
    pub fn saved_style(&self) -> &Style {
        &self.saved
    }

    pub fn is_full_3d(&self) -> bool {
        self.strips.is_some()
    }

    /// Surfaces created for this transition
    pub fn synthetic_surfaces(&self) -> Vec<SurfaceId> {
        let overlays = self
            .surfaces
            .iter()
            .filter(|s| matches!(s.role, SurfaceRole::Highlight | SurfaceRole::Shadow))
            .map(|s| s.surface);
        let strips = self
            .strips
            .iter()
            .flat_map(|set| set.outgoing.iter().chain(&set.incoming))
            .flat_map(|strip| std::iter::once(strip.surface).chain(strip.shade));
        overlays.chain(strips).collect()
    }
}

/// Panels taking part in one rotation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RotateRequest {
    pub container: SurfaceId,
    pub outgoing: SurfaceId,
    pub incoming: SurfaceId,
    pub direction: Cardinal,
}

/// Border and padding of one panel
struct BoxMetrics {
    border: Edges<f32>,
    padding: Edges<f32>,
}

impl BoxMetrics {
    fn of(style: &Style) -> Self {
        Self {
            border: metrics::border_widths(style),
            padding: metrics::paddings(style),
        }
    }

    fn extras(&self) -> Size {
        let sum = self.border + self.padding;
        Size::new(sum.horizontal(), sum.vertical())
    }
}

/// Page offset of the container, relative to a fixed-position ancestor if any
pub fn container_offset<S: StyleSystem>(stage: &S, container: SurfaceId) -> Point {
    let offset = stage.offset(container);
    match stage.fixed_ancestor(container) {
        Some(fixed) => offset - stage.offset(fixed),
        None => offset,
    }
}

/// Plan a rotation and perform its set-up writes
pub fn plan_transition<S: StyleSystem>(
    stage: &mut S,
    request: &RotateRequest,
    settings: &Settings,
) -> TransitionPlan {
    let RotateRequest {
        container,
        outgoing,
        incoming,
        direction,
    } = *request;

    let offset = container_offset(stage, container);
    let dims = stage.size(container);
    let frame = Rect {
        origin: offset,
        size: dims,
    };

    let saved = stage.style(outgoing).cloned().unwrap_or_default();
    let from = BoxMetrics::of(&saved);
    let to = BoxMetrics::of(&stage.style(incoming).cloned().unwrap_or_default());

    let from_plan = outgoing_plan(outgoing, direction, frame, &from, settings);
    let to_plan = incoming_plan(incoming, direction, frame, &to, settings);

    let shading = settings
        .shading
        .then(|| Shading::new(direction, settings.opacity));

    debug!(
        ?direction,
        width = dims.width,
        height = dims.height,
        full_3d = settings.full_3d,
        "planning rotation"
    );

    let mut plan = TransitionPlan {
        container,
        outgoing,
        incoming,
        direction,
        frame,
        surfaces: SmallVec::new(),
        shading,
        strips: None,
        saved,
    };

    let hidden_overflow = (Property::Overflow, Value::keyword("hidden"));
    let mut start = from_plan.values_at(0.0);
    start.push(hidden_overflow.clone());
    stage.apply(outgoing, &start);

    if settings.full_3d {
        // The incoming panel is laid out at its final size so its clones
        // carry final content; it stays hidden until the last frame.
        let mut end = to_plan.values_at(1.0);
        end.push(hidden_overflow);
        stage.apply(incoming, &end);

        let perspective = Perspective {
            segments: settings.segments.max(1),
            reduction: settings.reduction,
            expansion: settings.expansion,
            line_height: settings.line_height,
            letter_spacing: settings.letter_spacing,
        };
        let segments = perspective.segments;
        let outgoing_strips = create_strips(stage, &plan, SurfaceRole::Outgoing, segments);
        let incoming_strips = create_strips(stage, &plan, SurfaceRole::Incoming, segments);
        stage.hide(outgoing);

        plan.strips = Some(StripSet {
            perspective,
            outgoing: outgoing_strips,
            incoming: incoming_strips,
            outgoing_extras: from.extras(),
            incoming_extras: to.extras(),
        });
        plan.surfaces.push(from_plan);
        plan.surfaces.push(to_plan);
    } else {
        let mut start = to_plan.values_at(0.0);
        start.push(hidden_overflow);
        stage.apply(incoming, &start);
        stage.show(incoming);

        let overlays = shading.map(|shading| {
            let (tracked_by_highlight, tracked_by_shadow) = if direction.is_up_left() {
                (&from_plan, &to_plan)
            } else {
                (&to_plan, &from_plan)
            };
            [
                create_overlay(
                    stage,
                    container,
                    SurfaceRole::Highlight,
                    tracked_by_highlight,
                    shading.highlight,
                ),
                create_overlay(
                    stage,
                    container,
                    SurfaceRole::Shadow,
                    tracked_by_shadow,
                    shading.shadow,
                ),
            ]
        });

        plan.surfaces.push(from_plan);
        plan.surfaces.push(to_plan);
        plan.surfaces.extend(overlays.into_iter().flatten());
    }

    plan
}

fn outgoing_plan(
    surface: SurfaceId,
    direction: Cardinal,
    frame: Rect,
    metrics: &BoxMetrics,
    settings: &Settings,
) -> SurfacePlan {
    let vertical = direction.is_vertical();
    let Point { x, y } = frame.origin;
    let Size { width, height } = frame.size;
    let extras = metrics.extras();
    let (hidden_lh, normal_lh) = settings.line_height;
    let (hidden_ls, normal_ls) = settings.letter_spacing;

    let mut plan = SurfacePlan::new(surface, SurfaceRole::Outgoing);
    let right = if direction == Cardinal::Right { width } else { 0.0 };
    let down = if direction == Cardinal::Down { height } else { 0.0 };
    plan.push(Property::Left, x, x + right, Unit::Px);
    plan.push(Property::Top, y, y + down, Unit::Px);
    let inner = Size::new(width - extras.width, height - extras.height);
    plan.push(
        Property::Width,
        inner.width,
        if vertical { inner.width } else { 0.0 },
        Unit::Px,
    );
    plan.push(
        Property::Height,
        inner.height,
        if vertical { 0.0 } else { inner.height },
        Unit::Px,
    );
    push_sides(&mut plan, Property::PADDING, metrics.padding, vertical, true);
    push_sides(&mut plan, Property::BORDER_WIDTH, metrics.border, vertical, true);
    plan.push(
        Property::LineHeight,
        normal_lh,
        if vertical { hidden_lh } else { normal_lh },
        Unit::Em,
    );
    plan.push(
        Property::LetterSpacing,
        normal_ls,
        if vertical { normal_ls } else { hidden_ls },
        Unit::Em,
    );
    plan
}

fn incoming_plan(
    surface: SurfaceId,
    direction: Cardinal,
    frame: Rect,
    metrics: &BoxMetrics,
    settings: &Settings,
) -> SurfacePlan {
    let vertical = direction.is_vertical();
    let Point { x, y } = frame.origin;
    let Size { width, height } = frame.size;
    let extras = metrics.extras();
    let (hidden_lh, normal_lh) = settings.line_height;
    let (hidden_ls, normal_ls) = settings.letter_spacing;

    let mut plan = SurfacePlan::new(surface, SurfaceRole::Incoming);
    let left = if direction == Cardinal::Left { width } else { 0.0 };
    let up = if direction == Cardinal::Up { height } else { 0.0 };
    plan.push(Property::Left, x + left, x, Unit::Px);
    plan.push(Property::Top, y + up, y, Unit::Px);
    let inner = Size::new(width - extras.width, height - extras.height);
    plan.push(
        Property::Width,
        if vertical { inner.width } else { 0.0 },
        inner.width,
        Unit::Px,
    );
    plan.push(
        Property::Height,
        if vertical { 0.0 } else { inner.height },
        inner.height,
        Unit::Px,
    );
    push_sides(&mut plan, Property::PADDING, metrics.padding, vertical, false);
    push_sides(&mut plan, Property::BORDER_WIDTH, metrics.border, vertical, false);
    plan.push(
        Property::LineHeight,
        if vertical { hidden_lh } else { normal_lh },
        normal_lh,
        Unit::Em,
    );
    plan.push(
        Property::LetterSpacing,
        if vertical { normal_ls } else { hidden_ls },
        normal_ls,
        Unit::Em,
    );
    plan
}

/// Sides along the travel axis collapse to zero (outgoing) or grow from zero
/// (incoming); the other two are held.
fn push_sides(
    plan: &mut SurfacePlan,
    props: [Property; 4],
    values: Edges<f32>,
    vertical: bool,
    outgoing: bool,
) {
    for (i, (prop, value)) in props.into_iter().zip(values.to_array()).enumerate() {
        let collapses = if i < 2 { !vertical } else { vertical };
        let (start, end) = match (collapses, outgoing) {
            (false, _) => (value, value),
            (true, true) => (value, 0.0),
            (true, false) => (0.0, value),
        };
        plan.push(prop, start, end, Unit::Px);
    }
}

/// A shading layer that follows one panel's outer box
fn create_overlay<S: StyleSystem>(
    stage: &mut S,
    container: SurfaceId,
    role: SurfaceRole,
    tracked: &SurfacePlan,
    opacity: AnimatedValue,
) -> SurfacePlan {
    let color = if role == SurfaceRole::Highlight {
        Rgb::WHITE
    } else {
        Rgb::BLACK
    };
    let style = Style::new()
        .with(Property::Position, Value::keyword("absolute"))
        .with(Property::ZIndex, Value::number(OVERLAY_Z_INDEX))
        .with(Property::BackgroundColor, color);
    let surface = stage.create_surface(style, SYNTHETIC_CLASS);

    let mut plan = SurfacePlan::new(surface, role);
    for prop in [Property::Left, Property::Top, Property::Width, Property::Height] {
        let (start, end) = tracked.range(prop);
        plan.push(prop, start, end, Unit::Px);
    }
    for (padding, border) in Property::PADDING.into_iter().zip(Property::BORDER_WIDTH) {
        let (pad_start, pad_end) = tracked.range(padding);
        let (border_start, border_end) = tracked.range(border);
        plan.push(
            padding,
            pad_start + border_start,
            pad_end + border_end,
            Unit::Px,
        );
    }
    plan.props.push((Property::Opacity, opacity));

    stage.apply(surface, &plan.values_at(0.0));
    stage.append(container, surface);
    plan
}

/// Clone a panel once per segment, each with an optional shading layer
fn create_strips<S: StyleSystem>(
    stage: &mut S,
    plan: &TransitionPlan,
    role: SurfaceRole,
    segments: u32,
) -> Vec<Strip> {
    let panel = match role {
        SurfaceRole::Incoming => plan.incoming,
        _ => plan.outgoing,
    };
    let shade_color = plan
        .shading
        .map(|shading| shading.for_panel(plan.direction, role).1);

    let mut strips = Vec::with_capacity(segments as usize);
    for _ in 0..segments {
        let Some(surface) = stage.clone_surface(panel) else {
            debug!(?panel, "panel vanished while slicing");
            break;
        };
        stage.add_class(surface, SYNTHETIC_CLASS);
        stage.apply(
            surface,
            &[
                (Property::Position, Value::keyword("absolute")),
                (Property::Overflow, Value::keyword("hidden")),
            ],
        );
        stage.append(plan.container, surface);
        stage.show(surface);

        let shade = shade_color.map(|color| {
            let style = Style::new()
                .with(Property::Position, Value::keyword("absolute"))
                .with(Property::ZIndex, Value::number(OVERLAY_Z_INDEX))
                .with(Property::BackgroundColor, color);
            let shade = stage.create_surface(style, SYNTHETIC_CLASS);
            stage.append(plan.container, shade);
            shade
        });
        strips.push(Strip { surface, shade });
    }
    strips
}

#[cfg(test)]
mod tests {
    use super::*;
    use imagecube_surface::SurfaceTree;

    fn stage(panel_style: &str) -> (SurfaceTree, SurfaceId, SurfaceId, SurfaceId) {
        let mut tree = SurfaceTree::new();
        let container = tree.insert(Style::parse(
            "position: absolute; left: 100px; top: 50px; width: 200px; height: 100px",
        ));
        let a = tree
            .insert_child(container, Style::parse(panel_style))
            .unwrap();
        let b = tree
            .insert_child(container, Style::parse(panel_style))
            .unwrap();
        tree.hide(b);
        (tree, container, a, b)
    }

    fn flat_settings() -> Settings {
        Settings {
            full_3d: false,
            ..Settings::default()
        }
    }

    #[test]
    fn delta_reaches_end() {
        let value = AnimatedValue::new(-0.4, 0.0, Unit::Em);
        assert_eq!(value.start + 1.0 * value.delta, value.end);
        assert_eq!(value.at(0.5), -0.2);
        assert_eq!(value.at(1.2), 0.0);
    }

    #[test]
    fn alpha_filter_rounds_percent() {
        assert_eq!(alpha_filter(0.8), Value::keyword("alpha(opacity=80)"));
        assert_eq!(alpha_filter(0.004), Value::keyword("alpha(opacity=0)"));
    }

    #[test]
    fn content_box_subtracts_border_and_padding() {
        let (mut tree, container, a, b) =
            stage("padding-left: 5px; padding-right: 5px; border-top-width: thin");
        let request = RotateRequest {
            container,
            outgoing: a,
            incoming: b,
            direction: Cardinal::Down,
        };
        let plan = plan_transition(&mut tree, &request, &flat_settings());
        let out = plan.surface(SurfaceRole::Outgoing).unwrap();
        assert_eq!(out.get(Property::Width).unwrap().start, 190.0);
        assert_eq!(out.get(Property::Height).unwrap().start, 99.0);
        assert_eq!(out.get(Property::Height).unwrap().end, 0.0);
        // Vertical travel keeps horizontal padding and collapses the top border
        assert_eq!(out.get(Property::PaddingLeft).unwrap().end, 5.0);
        assert_eq!(out.get(Property::BorderTopWidth).unwrap().end, 0.0);
    }

    #[test]
    fn setup_writes_start_values_and_shows_incoming() {
        let (mut tree, container, a, b) = stage("");
        let request = RotateRequest {
            container,
            outgoing: a,
            incoming: b,
            direction: Cardinal::Left,
        };
        let plan = plan_transition(&mut tree, &request, &flat_settings());
        assert!(tree.is_visible(b));
        let incoming = tree.style(b).unwrap();
        assert_eq!(incoming.px(Property::Left), Some(300.0));
        assert_eq!(incoming.px(Property::Width), Some(0.0));
        assert_eq!(incoming.keyword(Property::Overflow), Some("hidden"));
        assert_eq!(plan.synthetic_surfaces().len(), 2);
        assert!(plan.saved_style().is_empty());
    }

    #[test]
    fn highlight_tracks_outgoing_for_up_and_left() {
        let (mut tree, container, a, b) = stage("");
        let request = RotateRequest {
            container,
            outgoing: a,
            incoming: b,
            direction: Cardinal::Up,
        };
        let plan = plan_transition(&mut tree, &request, &flat_settings());
        let highlight = plan.surface(SurfaceRole::Highlight).unwrap();
        let outgoing = plan.surface(SurfaceRole::Outgoing).unwrap();
        assert_eq!(
            highlight.get(Property::Height),
            outgoing.get(Property::Height)
        );
        let opacity = highlight.get(Property::Opacity).unwrap();
        assert_eq!((opacity.start, opacity.end), (0.0, 0.8));
        let shadow = plan.surface(SurfaceRole::Shadow).unwrap();
        let opacity = shadow.get(Property::Opacity).unwrap();
        assert_eq!((opacity.start, opacity.end), (0.8, 0.0));
    }

    #[test]
    fn overlays_pad_with_border() {
        let (mut tree, container, a, b) = stage("padding-top: 4px; border-top-width: 2px");
        let request = RotateRequest {
            container,
            outgoing: a,
            incoming: b,
            direction: Cardinal::Right,
        };
        let plan = plan_transition(&mut tree, &request, &flat_settings());
        let shadow = plan.surface(SurfaceRole::Shadow).unwrap();
        let top = shadow.get(Property::PaddingTop).unwrap();
        assert_eq!((top.start, top.end), (6.0, 6.0));
    }

    #[test]
    fn shading_off_creates_no_overlays() {
        let (mut tree, container, a, b) = stage("");
        let settings = Settings {
            shading: false,
            ..flat_settings()
        };
        let request = RotateRequest {
            container,
            outgoing: a,
            incoming: b,
            direction: Cardinal::Down,
        };
        let plan = plan_transition(&mut tree, &request, &settings);
        assert!(plan.shading.is_none());
        assert!(plan.synthetic_surfaces().is_empty());
        assert_eq!(tree.children(container), vec![a, b]);
    }

    #[test]
    fn full_3d_slices_both_panels() {
        let (mut tree, container, a, b) = stage("");
        let settings = Settings {
            segments: 4,
            ..Settings::default()
        };
        let request = RotateRequest {
            container,
            outgoing: a,
            incoming: b,
            direction: Cardinal::Down,
        };
        let plan = plan_transition(&mut tree, &request, &settings);
        let strips = plan.strips.as_ref().unwrap();
        assert_eq!(strips.outgoing.len(), 4);
        assert_eq!(strips.incoming.len(), 4);
        assert!(strips.outgoing.iter().all(|s| s.shade.is_some()));
        assert_eq!(plan.synthetic_surfaces().len(), 16);
        assert!(!tree.is_visible(a));
        assert!(!tree.is_visible(b));
        assert_eq!(tree.style(b).unwrap().px(Property::Height), Some(100.0));
    }

    #[test]
    fn fixed_ancestor_offset_is_subtracted() {
        let mut tree = SurfaceTree::new();
        let fixed = tree.insert(Style::parse("position: fixed; left: 30px; top: 40px"));
        let container = tree
            .insert_child(fixed, Style::parse("left: 5px; top: 6px"))
            .unwrap();
        assert_eq!(container_offset(&tree, container), Point::new(5.0, 6.0));
    }
}
