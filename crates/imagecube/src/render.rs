//! Frame rendering and transition teardown

use imagecube_surface::StyleSystem;
use tracing::trace;

use crate::full3d;
use crate::plan::TransitionPlan;

/// Write every animated property for progress `pos`
pub fn render_frame<S: StyleSystem>(stage: &mut S, plan: &TransitionPlan, pos: f32) {
    trace!(container = ?plan.container, pos, "frame");
    if plan.is_full_3d() {
        full3d::render_strips(stage, plan, pos);
        return;
    }
    for surface in &plan.surfaces {
        stage.apply(surface.surface, &surface.values_at(pos));
    }
}

/// Terminal step: swap the panels and remove everything the transition made
pub fn finish<S: StyleSystem>(stage: &mut S, plan: &TransitionPlan) {
    stage.hide(plan.outgoing);
    stage.replace_style(plan.outgoing, plan.saved_style().clone());
    stage.show(plan.incoming);
    discard(stage, plan);
}

/// Remove the overlays and strips without touching the panels
pub fn discard<S: StyleSystem>(stage: &mut S, plan: &TransitionPlan) {
    for surface in plan.synthetic_surfaces() {
        stage.remove(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{plan_transition, RotateRequest, SurfaceRole};
    use crate::settings::{Cardinal, Settings};
    use imagecube_surface::{Property, Style, SurfaceTree, Value};

    fn rotate(full_3d: bool) -> (SurfaceTree, TransitionPlan) {
        let mut tree = SurfaceTree::new();
        let container = tree.insert(Style::parse(
            "position: absolute; left: 0px; top: 0px; width: 120px; height: 80px",
        ));
        let a = tree
            .insert_child(container, Style::parse("background-color: red; padding-top: 3px"))
            .unwrap();
        let b = tree.insert_child(container, Style::new()).unwrap();
        tree.hide(b);
        let settings = Settings {
            full_3d,
            segments: 3,
            ..Settings::default()
        };
        let request = RotateRequest {
            container,
            outgoing: a,
            incoming: b,
            direction: Cardinal::Down,
        };
        let plan = plan_transition(&mut tree, &request, &settings);
        (tree, plan)
    }

    #[test]
    fn frames_write_interpolated_values() {
        let (mut tree, plan) = rotate(false);
        render_frame(&mut tree, &plan, 0.5);
        let out = tree.style(plan.outgoing).unwrap();
        assert_eq!(out.px(Property::Top), Some(40.0));
        let shadow = plan.surface(SurfaceRole::Shadow).unwrap().surface;
        assert_eq!(
            tree.style(shadow).unwrap().get(Property::Filter),
            Some(&Value::keyword("alpha(opacity=40)"))
        );
    }

    #[test]
    fn finish_restores_outgoing_and_cleans_up() {
        let (mut tree, plan) = rotate(false);
        render_frame(&mut tree, &plan, 1.0);
        finish(&mut tree, &plan);
        assert!(!tree.is_visible(plan.outgoing));
        assert!(tree.is_visible(plan.incoming));
        assert_eq!(
            tree.style(plan.outgoing).unwrap(),
            &Style::parse("background-color: red; padding-top: 3px")
        );
        assert_eq!(tree.children(plan.container), vec![plan.outgoing, plan.incoming]);
    }

    #[test]
    fn strips_are_positioned_and_removed() {
        let (mut tree, plan) = rotate(true);
        render_frame(&mut tree, &plan, 0.5);
        let strips = plan.strips.as_ref().unwrap();
        let first = strips.outgoing[0].surface;
        assert!(tree.style(first).unwrap().get(Property::Clip).is_some());
        assert_eq!(tree.children(plan.container).len(), 2 + 12);

        finish(&mut tree, &plan);
        assert!(!tree.contains(first));
        assert_eq!(tree.children(plan.container).len(), 2);
        assert!(tree.is_visible(plan.incoming));
    }
}
