//! The widget arena: ownership, parent/child links, walks.

use slotmap::{new_key_type, SecondaryMap, SlotMap};

use super::Widget;
use crate::error::{Error, Result};
use crate::native::Handle;

new_key_type! {
    /// Stable identifier of a widget inside a [`WidgetTree`].
    pub struct WidgetId;
}

/// Empty slice constant for returning when a widget has no children.
const EMPTY_CHILDREN: &[WidgetId] = &[];

struct Slot {
    handle: Handle,
    /// `None` while the widget is checked out by [`WidgetTree::take`].
    widget: Option<Box<dyn Widget>>,
}

/// Owns every live widget.
///
/// Widgets live in a single `SlotMap`. Parent/child relationships are stored
/// in secondary maps, so removal is O(subtree size) and lookup is O(1). A
/// container owns its children through the tree; widgets only keep ids.
pub struct WidgetTree {
    nodes: SlotMap<WidgetId, Slot>,
    children: SecondaryMap<WidgetId, Vec<WidgetId>>,
    parent: SecondaryMap<WidgetId, WidgetId>,
    /// Children disposed while their parent was checked out.
    deferred_detach: SecondaryMap<WidgetId, Vec<WidgetId>>,
}

impl WidgetTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            deferred_detach: SecondaryMap::new(),
        }
    }

    /// Insert a widget built from its own id, as a child of `parent` (or as a
    /// top-level widget when `parent` is `None`).
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the tree.
    pub fn insert_with(
        &mut self,
        parent: Option<WidgetId>,
        handle: Handle,
        build: impl FnOnce(WidgetId) -> Box<dyn Widget>,
    ) -> WidgetId {
        let id = self.nodes.insert_with_key(|id| Slot {
            handle,
            widget: Some(build(id)),
        });
        self.children.insert(id, Vec::new());
        if let Some(parent) = parent {
            debug_assert!(self.nodes.contains_key(parent), "parent widget does not exist");
            if let Some(siblings) = self.children.get_mut(parent) {
                siblings.push(id);
                self.parent.insert(id, parent);
            }
        }
        id
    }

    /// Remove a widget and all its descendants. Returns every removed id in
    /// pre-order, or an empty vec if `id` did not exist.
    pub fn remove(&mut self, id: WidgetId) -> Vec<WidgetId> {
        if !self.nodes.contains_key(id) {
            return Vec::new();
        }
        self.detach(id);
        let removed = self.walk_depth_first(id);
        for &node in &removed {
            self.children.remove(node);
            self.parent.remove(node);
            self.deferred_detach.remove(node);
            self.nodes.remove(node);
        }
        removed
    }

    /// Make `node` a child of `new_parent` at `index` (appended when `None` or
    /// past the end). The subtree moves with it.
    pub fn attach(&mut self, node: WidgetId, new_parent: WidgetId, index: Option<usize>) -> Result<()> {
        if !self.nodes.contains_key(node) {
            return Err(Error::WidgetNotFound(node));
        }
        if !self.nodes.contains_key(new_parent) {
            return Err(Error::WidgetNotFound(new_parent));
        }
        if node == new_parent || self.ancestors(new_parent).contains(&node) {
            return Err(Error::native("attach widget", "widget would become its own ancestor"));
        }
        self.detach(node);
        let Some(siblings) = self.children.get_mut(new_parent) else {
            return Err(Error::WidgetNotFound(new_parent));
        };
        let index = index.map_or(siblings.len(), |i| i.min(siblings.len()));
        siblings.insert(index, node);
        self.parent.insert(node, new_parent);
        Ok(())
    }

    /// Unlink `node` from its parent; it becomes top-level. Returns the old
    /// parent.
    pub fn detach(&mut self, node: WidgetId) -> Option<WidgetId> {
        let old_parent = self.parent.remove(node)?;
        if let Some(siblings) = self.children.get_mut(old_parent) {
            siblings.retain(|&child| child != node);
        }
        Some(old_parent)
    }

    /// Get the parent of a widget, if it has one.
    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.parent.get(id).copied()
    }

    /// Children in order. Empty when the widget has none or does not exist.
    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Ancestor ids from the immediate parent up to the top-level widget.
    pub fn ancestors(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Widgets without a parent, in creation order of their slots.
    pub fn roots(&self) -> Vec<WidgetId> {
        self.nodes
            .keys()
            .filter(|&id| !self.parent.contains_key(id))
            .collect()
    }

    /// Native handle of a widget.
    pub fn handle(&self, id: WidgetId) -> Option<Handle> {
        self.nodes.get(id).map(|slot| slot.handle)
    }

    /// Shared access to a widget that is not checked out.
    pub fn get(&self, id: WidgetId) -> Result<&dyn Widget> {
        let slot = self.nodes.get(id).ok_or(Error::WidgetNotFound(id))?;
        slot.widget.as_deref().ok_or(Error::WidgetBusy(id))
    }

    /// Check a widget out so it can run with `&mut` access to the rest of the
    /// tree. Must be paired with [`restore`](Self::restore).
    pub fn take(&mut self, id: WidgetId) -> Result<Box<dyn Widget>> {
        let slot = self.nodes.get_mut(id).ok_or(Error::WidgetNotFound(id))?;
        slot.widget.take().ok_or(Error::WidgetBusy(id))
    }

    /// Return a checked-out widget. Hands the widget back when its slot was
    /// removed in the meantime.
    pub fn restore(&mut self, id: WidgetId, widget: Box<dyn Widget>) -> Result<(), Box<dyn Widget>> {
        match self.nodes.get_mut(id) {
            Some(slot) => {
                slot.widget = Some(widget);
                Ok(())
            }
            None => Err(widget),
        }
    }

    /// Remember that `child` left while `parent` was checked out, so the
    /// parent can drop its bookkeeping once it is back.
    pub fn defer_detach(&mut self, parent: WidgetId, child: WidgetId) {
        if !self.nodes.contains_key(parent) {
            return;
        }
        match self.deferred_detach.get_mut(parent) {
            Some(children) => children.push(child),
            None => {
                self.deferred_detach.insert(parent, vec![child]);
            }
        }
    }

    /// Take the children recorded by [`defer_detach`](Self::defer_detach).
    pub fn take_deferred_detach(&mut self, parent: WidgetId) -> Vec<WidgetId> {
        self.deferred_detach.remove(parent).unwrap_or_default()
    }

    /// Whether the widget exists but is checked out.
    pub fn is_busy(&self, id: WidgetId) -> bool {
        self.nodes.get(id).is_some_and(|slot| slot.widget.is_none())
    }

    /// Number of widgets in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the tree contains a widget with the given id.
    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: WidgetId) -> Vec<WidgetId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::test_support::Recorder;
    use pretty_assertions::assert_eq;

    fn handle(raw: u64) -> Handle {
        Handle::from_raw(raw).unwrap()
    }

    fn add(tree: &mut WidgetTree, parent: Option<WidgetId>, raw: u64) -> WidgetId {
        tree.insert_with(parent, handle(raw), |id| Box::new(Recorder::detached(id)))
    }

    /// ```text
    ///       root
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (WidgetTree, [WidgetId; 5]) {
        let mut tree = WidgetTree::new();
        let root = add(&mut tree, None, 1);
        let a = add(&mut tree, Some(root), 2);
        let b = add(&mut tree, Some(root), 3);
        let c = add(&mut tree, Some(a), 4);
        let d = add(&mut tree, Some(a), 5);
        (tree, [root, a, b, c, d])
    }

    #[test]
    fn insert_links_parent_and_children() {
        let (tree, [root, a, b, c, d]) = build_tree();
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.children(a), &[c, d]);
        assert_eq!(tree.parent(c), Some(a));
        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.handle(b), Some(handle(3)));
        assert_eq!(tree.roots(), vec![root]);
    }

    #[test]
    fn walk_is_pre_order() {
        let (tree, [root, a, b, c, d]) = build_tree();
        assert_eq!(tree.walk_depth_first(root), vec![root, a, c, d, b]);
    }

    #[test]
    fn ancestors_go_up_to_root() {
        let (tree, [root, a, _, c, _]) = build_tree();
        assert_eq!(tree.ancestors(c), vec![a, root]);
        assert!(tree.ancestors(root).is_empty());
    }

    #[test]
    fn remove_takes_subtree() {
        let (mut tree, [root, a, b, c, d]) = build_tree();
        assert_eq!(tree.remove(a), vec![a, c, d]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.children(root), &[b]);
        assert!(!tree.contains(c));
        assert!(tree.remove(a).is_empty());
    }

    #[test]
    fn attach_at_index_and_detach() {
        let (mut tree, [root, a, b, c, _]) = build_tree();
        tree.attach(c, root, Some(1)).unwrap();
        assert_eq!(tree.children(root), &[a, c, b]);
        assert_eq!(tree.parent(c), Some(root));

        assert_eq!(tree.detach(c), Some(root));
        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.parent(c), None);
        assert_eq!(tree.detach(c), None);
    }

    #[test]
    fn attach_rejects_cycles() {
        let (mut tree, [root, a, _, c, _]) = build_tree();
        assert!(tree.attach(a, c, None).is_err());
        assert!(tree.attach(root, root, None).is_err());
        assert_eq!(tree.parent(a), Some(root));
    }

    #[test]
    fn take_marks_busy_until_restored() {
        let (mut tree, [_, a, ..]) = build_tree();
        let widget = tree.take(a).unwrap();
        assert!(tree.is_busy(a));
        assert_eq!(tree.get(a).err(), Some(Error::WidgetBusy(a)));
        assert_eq!(tree.take(a).err(), Some(Error::WidgetBusy(a)));

        assert!(tree.restore(a, widget).is_ok());
        assert!(!tree.is_busy(a));
        assert!(tree.get(a).is_ok());
    }

    #[test]
    fn restore_into_removed_slot_hands_widget_back() {
        let (mut tree, [_, a, ..]) = build_tree();
        let widget = tree.take(a).unwrap();
        tree.remove(a);
        assert!(tree.restore(a, widget).is_err());
    }

    #[test]
    fn missing_widget_reports_not_found() {
        let (mut tree, [_, a, ..]) = build_tree();
        tree.remove(a);
        assert_eq!(tree.get(a).err(), Some(Error::WidgetNotFound(a)));
    }

    #[test]
    fn deferred_detach_is_taken_once_and_dropped_with_parent() {
        let (mut tree, [root, a, b, c, _]) = build_tree();
        tree.defer_detach(a, c);
        tree.defer_detach(root, b);
        assert_eq!(tree.take_deferred_detach(a), vec![c]);
        assert!(tree.take_deferred_detach(a).is_empty());

        tree.remove(root);
        assert!(tree.take_deferred_detach(root).is_empty());
    }
}
