//! Perspective strips for 3D mode
//!
//! Each face is cut into `segments` strips along the travel axis. Geometry
//! is worked out in a local frame per direction: `u` runs along the travel
//! axis starting at the edge the incoming face enters from, `v` runs across
//! it. At progress `pos` the shared edge sits at `u = pos * L`; the incoming
//! face covers `[0, pos * L]` and the outgoing face the rest.
//!
//! The shared (near) edge is widened by up to `expansion` pixels at mid
//! rotation, and each far edge is narrowed. The incoming far edge starts at
//! the full `reduction` and relaxes to zero; the outgoing far edge does the
//! opposite. Cross-section width is interpolated linearly between the two
//! edges of a face.

use imagecube_surface::{ClipRect, Point, Property, Rect, StyleSystem, Value};
use tracing::trace;

use crate::plan::{alpha_filter, Perspective, StripSet, SurfaceRole, TransitionPlan};
use crate::settings::Cardinal;

/// The rotating cube at one progress value
#[derive(Clone, Copy, Debug)]
pub struct Projection {
    direction: Cardinal,
    frame: Rect,
    /// Container length along the travel axis
    axis: f32,
    /// Container length across it
    cross: f32,
    /// Position of the shared edge along the axis
    depth: f32,
    expand: f32,
    reduce_incoming: f32,
    reduce_outgoing: f32,
}

/// Where one strip lands on screen
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StripLayout {
    /// Bounding box of the strip's four corners
    pub bounds: Rect,
    /// Box the strip surface is laid out in
    pub surface: Rect,
    /// Slice of `surface` that is shown
    pub clip: ClipRect,
    /// Face length over container length along the axis
    pub axis_fraction: f32,
    /// Strip width over container width across the axis, capped at 1
    pub cross_fraction: f32,
}

impl Projection {
    pub fn new(direction: Cardinal, frame: Rect, perspective: &Perspective, pos: f32) -> Self {
        let pos = pos.clamp(0.0, 1.0);
        let (axis, cross) = if direction.is_vertical() {
            (frame.size.height, frame.size.width)
        } else {
            (frame.size.width, frame.size.height)
        };
        let reduce_incoming = perspective.reduction * (1.0 - pos);
        Self {
            direction,
            frame,
            axis,
            cross,
            depth: pos * axis,
            expand: perspective.expansion * (1.0 - (1.0 - 2.0 * pos).abs()),
            reduce_incoming,
            reduce_outgoing: perspective.reduction - reduce_incoming,
        }
    }

    /// Map local `(u, v)` to page coordinates
    pub fn to_screen(&self, u: f32, v: f32) -> Point {
        let Point { x, y } = self.frame.origin;
        let (w, h) = (self.frame.size.width, self.frame.size.height);
        match self.direction {
            Cardinal::Down => Point::new(x + v, y + u),
            Cardinal::Up => Point::new(x + v, y + h - u),
            Cardinal::Right => Point::new(x + u, y + v),
            Cardinal::Left => Point::new(x + w - u, y + v),
        }
    }

    /// Axis interval covered by a face
    pub fn face_span(&self, face: SurfaceRole) -> (f32, f32) {
        match face {
            SurfaceRole::Incoming => (0.0, self.depth),
            _ => (self.depth, self.axis),
        }
    }

    /// Inset of the face's cross edges at `u`; negative means widened
    pub fn inset(&self, face: SurfaceRole, u: f32) -> f32 {
        let near = -self.expand;
        let (far, far_u) = match face {
            SurfaceRole::Incoming => (self.reduce_incoming, 0.0),
            _ => (self.reduce_outgoing, self.axis),
        };
        let span = (far_u - self.depth).abs();
        if span <= f32::EPSILON {
            return near;
        }
        let t = ((u - self.depth).abs() / span).clamp(0.0, 1.0);
        near + (far - near) * t
    }

    /// Corners of strip `k` of `n`
    pub fn strip_corners(&self, face: SurfaceRole, k: usize, n: usize) -> [Point; 4] {
        let (a, b) = self.face_span(face);
        let n = n.max(1) as f32;
        let u0 = a + (b - a) * k as f32 / n;
        let u1 = a + (b - a) * (k + 1) as f32 / n;
        let (i0, i1) = (self.inset(face, u0), self.inset(face, u1));
        [
            self.to_screen(u0, i0),
            self.to_screen(u0, self.cross - i0),
            self.to_screen(u1, i1),
            self.to_screen(u1, self.cross - i1),
        ]
    }

    pub fn strip_layout(&self, face: SurfaceRole, k: usize, n: usize) -> StripLayout {
        let bounds = Rect::bounding(&self.strip_corners(face, k, n));
        let (a, b) = self.face_span(face);
        let face_rect = Rect::bounding(&[self.to_screen(a, 0.0), self.to_screen(b, self.cross)]);
        let axis_fraction = if self.axis > 0.0 {
            (b - a) / self.axis
        } else {
            0.0
        };

        let (surface, clip, cross_extent) = if self.direction.is_vertical() {
            let surface = Rect::new(
                bounds.left(),
                face_rect.top(),
                bounds.size.width,
                face_rect.size.height,
            );
            let clip = ClipRect::new(
                bounds.top() - face_rect.top(),
                bounds.size.width,
                bounds.bottom() - face_rect.top(),
                0.0,
            );
            (surface, clip, bounds.size.width)
        } else {
            let surface = Rect::new(
                face_rect.left(),
                bounds.top(),
                face_rect.size.width,
                bounds.size.height,
            );
            let clip = ClipRect::new(
                0.0,
                bounds.right() - face_rect.left(),
                bounds.size.height,
                bounds.left() - face_rect.left(),
            );
            (surface, clip, bounds.size.height)
        };

        StripLayout {
            bounds,
            surface,
            clip,
            axis_fraction,
            cross_fraction: if self.cross > 0.0 {
                (cross_extent / self.cross).min(1.0)
            } else {
                0.0
            },
        }
    }
}

/// Shading weight of strip `k` of `n`; strips nearer the far edge of the
/// cube's turn are shaded more.
pub fn shade_weight(direction: Cardinal, k: usize, n: usize) -> f32 {
    let n = n.max(1) as f32;
    if direction.is_up_left() {
        (n - k as f32) / n
    } else {
        (k as f32 + 1.0) / n
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Lay out every strip for progress `pos`
pub fn render_strips<S: StyleSystem>(stage: &mut S, plan: &TransitionPlan, pos: f32) {
    let Some(strips) = &plan.strips else {
        return;
    };
    if plan.frame.size.is_empty() {
        trace!(container = ?plan.container, "zero-sized container, skipping strips");
        return;
    }

    let projection = Projection::new(plan.direction, plan.frame, &strips.perspective, pos);
    for face in [SurfaceRole::Outgoing, SurfaceRole::Incoming] {
        render_face(stage, plan, strips, &projection, face, pos);
    }
}

fn render_face<S: StyleSystem>(
    stage: &mut S,
    plan: &TransitionPlan,
    strips: &StripSet,
    projection: &Projection,
    face: SurfaceRole,
    pos: f32,
) {
    let Perspective {
        line_height: (hidden_lh, normal_lh),
        letter_spacing: (hidden_ls, normal_ls),
        ..
    } = strips.perspective;
    let vertical = plan.direction.is_vertical();
    let extras = strips.extras(face);
    let ramp = plan
        .shading
        .map(|shading| shading.for_panel(plan.direction, face).0);
    let face_strips = strips.face(face);
    let n = face_strips.len();

    for (k, strip) in face_strips.iter().enumerate() {
        let layout = projection.strip_layout(face, k, n);
        let (lh_t, ls_t) = if vertical {
            (layout.axis_fraction, layout.cross_fraction)
        } else {
            (layout.cross_fraction, layout.axis_fraction)
        };
        stage.apply(
            strip.surface,
            &[
                (Property::Left, Value::px(layout.surface.left())),
                (Property::Top, Value::px(layout.surface.top())),
                (
                    Property::Width,
                    Value::px((layout.surface.size.width - extras.width).max(0.0)),
                ),
                (
                    Property::Height,
                    Value::px((layout.surface.size.height - extras.height).max(0.0)),
                ),
                (Property::Clip, layout.clip.into()),
                (Property::LineHeight, Value::em(lerp(hidden_lh, normal_lh, lh_t))),
                (Property::LetterSpacing, Value::em(lerp(hidden_ls, normal_ls, ls_t))),
            ],
        );

        if let (Some(shade), Some(ramp)) = (strip.shade, ramp) {
            let opacity = ramp.at(pos) * shade_weight(plan.direction, k, n);
            stage.apply(
                shade,
                &[
                    (Property::Left, Value::px(layout.bounds.left())),
                    (Property::Top, Value::px(layout.bounds.top())),
                    (Property::Width, Value::px(layout.bounds.size.width)),
                    (Property::Height, Value::px(layout.bounds.size.height)),
                    (Property::Opacity, Value::number(opacity)),
                    (Property::Filter, alpha_filter(opacity)),
                ],
            );
        }
    }
}
