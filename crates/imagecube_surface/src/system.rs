//! The style system seam
//!
//! Everything the widget needs from its host: reading and writing surface
//! styles, visibility, cloning and creating surfaces, tree structure and
//! sibling navigation, and layout queries.

use crate::geometry::{Point, Size};
use crate::style::{Property, Style};
use crate::value::Value;
use crate::SurfaceId;

/// A retained set of styled surfaces
pub trait StyleSystem {
    /// Current style of a surface
    fn style(&self, id: SurfaceId) -> Option<&Style>;

    /// Write a batch of property values
    fn apply(&mut self, id: SurfaceId, changes: &[(Property, Value)]);

    /// Replace a surface's whole style
    fn replace_style(&mut self, id: SurfaceId, style: Style);

    fn is_visible(&self, id: SurfaceId) -> bool;

    fn set_visible(&mut self, id: SurfaceId, visible: bool);

    /// Deep-copy a surface and its descendants; the copy is detached
    fn clone_surface(&mut self, id: SurfaceId) -> Option<SurfaceId>;

    /// Create a detached surface with the given style and class
    fn create_surface(&mut self, style: Style, class: &str) -> SurfaceId;

    /// Append `child` as the last child of `parent`
    fn append(&mut self, parent: SurfaceId, child: SurfaceId);

    /// Remove a surface and its descendants
    fn remove(&mut self, id: SurfaceId);

    fn parent(&self, id: SurfaceId) -> Option<SurfaceId>;

    /// Children in document order
    fn children(&self, id: SurfaceId) -> Vec<SurfaceId>;

    /// Page offset of the surface's top-left corner
    fn offset(&self, id: SurfaceId) -> Point;

    /// Content size of the surface
    fn size(&self, id: SurfaceId) -> Size;

    fn has_class(&self, id: SurfaceId, class: &str) -> bool;

    fn add_class(&mut self, id: SurfaceId, class: &str);

    fn remove_class(&mut self, id: SurfaceId, class: &str);

    fn show(&mut self, id: SurfaceId) {
        self.set_visible(id, true);
    }

    fn hide(&mut self, id: SurfaceId) {
        self.set_visible(id, false);
    }

    /// Nearest ancestor positioned `fixed`
    fn fixed_ancestor(&self, id: SurfaceId) -> Option<SurfaceId> {
        let mut cursor = self.parent(id);
        while let Some(ancestor) = cursor {
            let fixed = self
                .style(ancestor)
                .and_then(|s| s.keyword(Property::Position))
                == Some("fixed");
            if fixed {
                return Some(ancestor);
            }
            cursor = self.parent(ancestor);
        }
        None
    }

    fn contains_child(&self, parent: SurfaceId, child: SurfaceId) -> bool {
        self.parent(child) == Some(parent)
    }

    fn child_count(&self, id: SurfaceId) -> usize {
        self.children(id).len()
    }

    fn next_sibling(&self, id: SurfaceId) -> Option<SurfaceId> {
        let siblings = self.children(self.parent(id)?);
        let index = siblings.iter().position(|s| *s == id)?;
        siblings.get(index + 1).copied()
    }

    fn prev_sibling(&self, id: SurfaceId) -> Option<SurfaceId> {
        let siblings = self.children(self.parent(id)?);
        let index = siblings.iter().position(|s| *s == id)?;
        index.checked_sub(1).and_then(|i| siblings.get(i).copied())
    }
}
