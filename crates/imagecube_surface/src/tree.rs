//! In-memory surface tree
//!
//! A retained tree of styled surfaces backed by a slotmap. It is the
//! reference [`StyleSystem`] used by headless runs and tests.
//!
//! Layout is deliberately simple: `width`/`height` give the content size,
//! and offsets resolve `left`/`top` against the parent. Surfaces positioned
//! `absolute` or `fixed` take `left`/`top` as page coordinates, falling back
//! to the parent's offset when unset.

use slotmap::SlotMap;
use smallvec::SmallVec;
use tracing::trace;

use crate::error::{Result, SurfaceError};
use crate::geometry::{Point, Size};
use crate::style::{Property, Style};
use crate::system::StyleSystem;
use crate::value::Value;
use crate::SurfaceId;

#[derive(Clone, Debug)]
struct Node {
    style: Style,
    visible: bool,
    classes: SmallVec<[String; 2]>,
    label: Option<String>,
    parent: Option<SurfaceId>,
    children: Vec<SurfaceId>,
}

impl Node {
    fn new(style: Style) -> Self {
        Self {
            style,
            visible: true,
            classes: SmallVec::new(),
            label: None,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Everything observable about one surface
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceSnapshot {
    pub style: Style,
    pub visible: bool,
    pub classes: Vec<String>,
}

/// Retained surface tree
#[derive(Debug, Default)]
pub struct SurfaceTree {
    nodes: SlotMap<SurfaceId, Node>,
}

impl SurfaceTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached, visible surface
    pub fn insert(&mut self, style: Style) -> SurfaceId {
        self.nodes.insert(Node::new(style))
    }

    /// Create a surface as the last child of `parent`
    pub fn insert_child(&mut self, parent: SurfaceId, style: Style) -> Result<SurfaceId> {
        if !self.nodes.contains_key(parent) {
            return Err(SurfaceError::UnknownSurface(parent));
        }
        let id = self.insert(style);
        self.attach(parent, id)?;
        Ok(id)
    }

    /// Move `child` under `parent`, detaching it from any previous parent
    pub fn attach(&mut self, parent: SurfaceId, child: SurfaceId) -> Result<()> {
        if !self.nodes.contains_key(parent) {
            return Err(SurfaceError::UnknownSurface(parent));
        }
        if !self.nodes.contains_key(child) {
            return Err(SurfaceError::UnknownSurface(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(SurfaceError::Cycle { parent, child });
        }

        self.detach(child);
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        Ok(())
    }

    /// Unlink a surface from its parent, keeping it alive
    pub fn detach(&mut self, child: SurfaceId) {
        let Some(parent) = self.nodes.get_mut(child).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|c| *c != child);
        }
    }

    fn is_ancestor_or_self(&self, candidate: SurfaceId, of: SurfaceId) -> bool {
        let mut cursor = Some(of);
        while let Some(id) = cursor {
            if id == candidate {
                return true;
            }
            cursor = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live surfaces
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn set_label(&mut self, id: SurfaceId, label: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.label = Some(label.into());
        }
    }

    pub fn label(&self, id: SurfaceId) -> Option<&str> {
        self.nodes.get(id).and_then(|n| n.label.as_deref())
    }

    pub fn snapshot(&self, id: SurfaceId) -> Option<SurfaceSnapshot> {
        self.nodes.get(id).map(|node| SurfaceSnapshot {
            style: node.style.clone(),
            visible: node.visible,
            classes: node.classes.iter().cloned().collect(),
        })
    }

    fn clone_subtree(&mut self, id: SurfaceId) -> Option<SurfaceId> {
        let mut node = self.nodes.get(id)?.clone();
        let children = std::mem::take(&mut node.children);
        node.parent = None;
        let copy = self.nodes.insert(node);
        for child in children {
            if let Some(child_copy) = self.clone_subtree(child) {
                self.nodes[child_copy].parent = Some(copy);
                self.nodes[copy].children.push(child_copy);
            }
        }
        Some(copy)
    }

    fn axis_offset(&self, id: SurfaceId, prop: Property, pick: fn(Point) -> f32) -> f32 {
        let Some(node) = self.nodes.get(id) else {
            return 0.0;
        };
        let parent = node.parent.map(|p| pick(self.offset(p))).unwrap_or(0.0);
        let own = node.style.px(prop);
        match node.style.keyword(Property::Position) {
            Some("absolute") | Some("fixed") => own.unwrap_or(parent),
            _ => parent + own.unwrap_or(0.0),
        }
    }
}

impl StyleSystem for SurfaceTree {
    fn style(&self, id: SurfaceId) -> Option<&Style> {
        self.nodes.get(id).map(|n| &n.style)
    }

    fn apply(&mut self, id: SurfaceId, changes: &[(Property, Value)]) {
        match self.nodes.get_mut(id) {
            Some(node) => node.style.extend(changes.iter().cloned()),
            None => trace!(?id, "apply on missing surface"),
        }
    }

    fn replace_style(&mut self, id: SurfaceId, style: Style) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.style = style;
        }
    }

    fn is_visible(&self, id: SurfaceId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.visible)
    }

    fn set_visible(&mut self, id: SurfaceId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.visible = visible;
        }
    }

    fn clone_surface(&mut self, id: SurfaceId) -> Option<SurfaceId> {
        self.clone_subtree(id)
    }

    fn create_surface(&mut self, style: Style, class: &str) -> SurfaceId {
        let id = self.insert(style);
        if !class.is_empty() {
            self.nodes[id].classes.push(class.to_string());
        }
        id
    }

    fn append(&mut self, parent: SurfaceId, child: SurfaceId) {
        if let Err(err) = self.attach(parent, child) {
            trace!(%err, "append ignored");
        }
    }

    fn remove(&mut self, id: SurfaceId) {
        self.detach(id);
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children);
            }
        }
    }

    fn parent(&self, id: SurfaceId) -> Option<SurfaceId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    fn children(&self, id: SurfaceId) -> Vec<SurfaceId> {
        self.nodes
            .get(id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn offset(&self, id: SurfaceId) -> Point {
        Point::new(
            self.axis_offset(id, Property::Left, |p| p.x),
            self.axis_offset(id, Property::Top, |p| p.y),
        )
    }

    fn size(&self, id: SurfaceId) -> Size {
        let Some(node) = self.nodes.get(id) else {
            return Size::default();
        };
        Size::new(
            node.style.px(Property::Width).unwrap_or(0.0),
            node.style.px(Property::Height).unwrap_or(0.0),
        )
    }

    fn has_class(&self, id: SurfaceId, class: &str) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, id: SurfaceId, class: &str) {
        if let Some(node) = self.nodes.get_mut(id) {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, id: SurfaceId, class: &str) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.classes.retain(|c| c != class);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_children(n: usize) -> (SurfaceTree, SurfaceId, Vec<SurfaceId>) {
        let mut tree = SurfaceTree::new();
        let root = tree.insert(Style::parse("left: 10px; top: 20px; width: 100px; height: 50px"));
        let children = (0..n)
            .map(|_| tree.insert_child(root, Style::new()).unwrap())
            .collect();
        (tree, root, children)
    }

    #[test]
    fn siblings_navigate_in_document_order() {
        let (tree, root, kids) = tree_with_children(3);
        assert_eq!(tree.children(root), kids);
        assert_eq!(tree.next_sibling(kids[0]), Some(kids[1]));
        assert_eq!(tree.next_sibling(kids[2]), None);
        assert_eq!(tree.prev_sibling(kids[1]), Some(kids[0]));
        assert_eq!(tree.prev_sibling(kids[0]), None);
        assert!(tree.contains_child(root, kids[2]));
        assert_eq!(tree.child_count(root), 3);
    }

    #[test]
    fn attach_rejects_cycles() {
        let (mut tree, root, kids) = tree_with_children(1);
        assert_eq!(
            tree.attach(kids[0], root),
            Err(SurfaceError::Cycle {
                parent: kids[0],
                child: root
            })
        );
        assert_eq!(
            tree.attach(root, root),
            Err(SurfaceError::Cycle {
                parent: root,
                child: root
            })
        );
    }

    #[test]
    fn remove_drops_descendants() {
        let (mut tree, root, kids) = tree_with_children(2);
        let grandchild = tree.insert_child(kids[0], Style::new()).unwrap();
        tree.remove(kids[0]);
        assert!(!tree.contains(grandchild));
        assert_eq!(tree.children(root), vec![kids[1]]);
    }

    #[test]
    fn clone_is_deep_and_detached() {
        let (mut tree, root, kids) = tree_with_children(1);
        tree.insert_child(kids[0], Style::parse("width: 5px")).unwrap();
        let copy = tree.clone_surface(kids[0]).unwrap();
        assert_eq!(tree.parent(copy), None);
        assert_eq!(tree.children(copy).len(), 1);
        assert_eq!(tree.children(root), kids);
    }

    #[test]
    fn offsets_resolve_against_parent() {
        let (mut tree, root, kids) = tree_with_children(2);
        tree.apply(kids[0], &[(Property::Left, Value::px(5.0))]);
        tree.apply(
            kids[1],
            &[(Property::Position, Value::keyword("absolute"))],
        );
        assert_eq!(tree.offset(root), Point::new(10.0, 20.0));
        assert_eq!(tree.offset(kids[0]), Point::new(15.0, 20.0));
        assert_eq!(tree.offset(kids[1]), Point::new(10.0, 20.0));

        tree.apply(kids[1], &[(Property::Left, Value::px(70.0))]);
        assert_eq!(tree.offset(kids[1]).x, 70.0);
    }

    #[test]
    fn fixed_ancestor_is_found() {
        let (mut tree, root, kids) = tree_with_children(1);
        assert_eq!(tree.fixed_ancestor(kids[0]), None);
        tree.apply(root, &[(Property::Position, Value::keyword("fixed"))]);
        assert_eq!(tree.fixed_ancestor(kids[0]), Some(root));
    }

    #[test]
    fn classes_are_unique() {
        let (mut tree, root, _) = tree_with_children(0);
        tree.add_class(root, "marker");
        tree.add_class(root, "marker");
        assert_eq!(tree.snapshot(root).unwrap().classes, vec!["marker"]);
        tree.remove_class(root, "marker");
        assert!(!tree.has_class(root, "marker"));
    }
}
