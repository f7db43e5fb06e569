//! Panel selection
//!
//! Panels are the container's children in order, minus the surfaces the
//! widget itself adds while a rotation runs.

use imagecube_surface::{StyleSystem, SurfaceId};
use rand::Rng;

use crate::plan::SYNTHETIC_CLASS;
use crate::settings::Selection;

fn is_panel<S: StyleSystem>(stage: &S, id: SurfaceId) -> bool {
    !stage.has_class(id, SYNTHETIC_CLASS)
}

/// The container's panels in document order
pub fn panels<S: StyleSystem>(stage: &S, container: SurfaceId) -> Vec<SurfaceId> {
    let mut panels = Vec::with_capacity(stage.child_count(container));
    panels.extend(
        stage
            .children(container)
            .into_iter()
            .filter(|id| is_panel(stage, *id)),
    );
    panels
}

/// The panel currently on display
pub fn first_visible_panel<S: StyleSystem>(stage: &S, container: SurfaceId) -> Option<SurfaceId> {
    panels(stage, container)
        .into_iter()
        .find(|id| stage.is_visible(*id))
}

/// Choose the panel that follows `current`.
///
/// Forward and backward wrap around the ends. Random picks uniformly among
/// hidden panels and falls back to `current` when there are none.
pub fn select_next<S: StyleSystem, R: Rng>(
    stage: &S,
    container: SurfaceId,
    current: SurfaceId,
    policy: Selection,
    rng: &mut R,
) -> SurfaceId {
    match policy {
        Selection::Forward => {
            let mut cursor = stage.next_sibling(current);
            while let Some(id) = cursor {
                if is_panel(stage, id) {
                    return id;
                }
                cursor = stage.next_sibling(id);
            }
            panels(stage, container).first().copied().unwrap_or(current)
        }
        Selection::Backward => {
            let mut cursor = stage.prev_sibling(current);
            while let Some(id) = cursor {
                if is_panel(stage, id) {
                    return id;
                }
                cursor = stage.prev_sibling(id);
            }
            panels(stage, container).last().copied().unwrap_or(current)
        }
        Selection::Random => {
            let hidden: Vec<_> = panels(stage, container)
                .into_iter()
                .filter(|id| *id != current && !stage.is_visible(*id))
                .collect();
            if hidden.is_empty() {
                current
            } else {
                hidden[rng.random_range(0..hidden.len())]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imagecube_surface::{Style, SurfaceTree};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn three_panels() -> (SurfaceTree, SurfaceId, Vec<SurfaceId>) {
        let mut tree = SurfaceTree::new();
        let container = tree.insert(Style::new());
        let panels = (0..3)
            .map(|_| tree.insert_child(container, Style::new()).unwrap())
            .collect::<Vec<_>>();
        tree.hide(panels[1]);
        tree.hide(panels[2]);
        (tree, container, panels)
    }

    #[test]
    fn forward_and_backward_wrap() {
        let (tree, container, p) = three_panels();
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            select_next(&tree, container, p[0], Selection::Forward, &mut rng),
            p[1]
        );
        assert_eq!(
            select_next(&tree, container, p[2], Selection::Forward, &mut rng),
            p[0]
        );
        assert_eq!(
            select_next(&tree, container, p[0], Selection::Backward, &mut rng),
            p[2]
        );
    }

    #[test]
    fn synthetic_surfaces_are_skipped() {
        let (mut tree, container, p) = three_panels();
        let overlay = tree.create_surface(Style::new(), SYNTHETIC_CLASS);
        tree.append(container, overlay);
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(panels(&tree, container), p);
        assert_eq!(
            select_next(&tree, container, p[2], Selection::Forward, &mut rng),
            p[0]
        );
        assert_eq!(first_visible_panel(&tree, container), Some(p[0]));
    }

    #[test]
    fn random_picks_a_hidden_panel() {
        let (mut tree, container, p) = three_panels();
        let mut rng = SmallRng::seed_from_u64(9);
        for _ in 0..20 {
            let next = select_next(&tree, container, p[0], Selection::Random, &mut rng);
            assert!(next == p[1] || next == p[2]);
        }
        tree.show(p[1]);
        tree.show(p[2]);
        assert_eq!(
            select_next(&tree, container, p[0], Selection::Random, &mut rng),
            p[0]
        );
    }

    #[test]
    fn lone_panel_selects_itself() {
        let mut tree = SurfaceTree::new();
        let container = tree.insert(Style::new());
        let only = tree.insert_child(container, Style::new()).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            select_next(&tree, container, only, Selection::Forward, &mut rng),
            only
        );
    }
}
