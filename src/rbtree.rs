//! Arena-backed red-black tree with in-order linked-list threading
//!
//! Backing structure for both sweep-state collections: the beachline
//! (ordered by breakpoint geometry) and the circle-event queue (ordered by
//! event key). The tree never compares keys itself: the caller picks the
//! insertion point and [`RbTree::insert_after`] preserves the red-black
//! invariants around it. Every node additionally carries `prev`/`next`
//! links consistent with in-order traversal, so neighbor lookups are O(1).
//!
//! Nodes live in an arena and are addressed by index. Slots are allocated
//! monotonically and never reused, which keeps an index valid (readable)
//! even after the node has been removed from the tree; the whole arena is
//! dropped in one step when the sweep ends.

/// Index of a node in the tree's arena
pub(crate) type NodeId = usize;

struct Node<T> {
    item: T,
    parent: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    red: bool,
}

pub(crate) struct RbTree<T> {
    nodes: Vec<Node<T>>,
    root: Option<NodeId>,
}

impl<T> RbTree<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Allocate a detached node holding `item`
    pub fn alloc(&mut self, item: T) -> NodeId {
        self.nodes.push(Node {
            item,
            parent: None,
            prev: None,
            next: None,
            left: None,
            right: None,
            red: false,
        });
        self.nodes.len() - 1
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[inline]
    pub fn item(&self, id: NodeId) -> &T {
        &self.nodes[id].item
    }

    #[inline]
    pub fn item_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.nodes[id].item
    }

    #[inline]
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].next
    }

    #[inline]
    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].prev
    }

    #[inline]
    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].left
    }

    #[inline]
    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].right
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    #[inline]
    fn is_red(&self, id: NodeId) -> bool {
        self.nodes[id].red
    }

    /// Leftmost node of the subtree rooted at `id`
    pub fn first(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.nodes[id].left {
            id = left;
        }
        id
    }

    /// Insert `successor` immediately after `after` in sorted order
    ///
    /// `None` means the leftmost position: with a non-empty tree the new
    /// node becomes the first in order, otherwise it becomes the root.
    pub fn insert_after(&mut self, after: Option<NodeId>, successor: NodeId) {
        let parent;
        if let Some(node) = after {
            // splice into the in-order list
            self.nodes[successor].prev = Some(node);
            self.nodes[successor].next = self.nodes[node].next;
            if let Some(next) = self.nodes[node].next {
                self.nodes[next].prev = Some(successor);
            }
            self.nodes[node].next = Some(successor);
            // structural position: leftmost slot of the right subtree,
            // or the node's own empty right slot
            if let Some(right) = self.nodes[node].right {
                let spot = self.first(right);
                self.nodes[spot].left = Some(successor);
                parent = Some(spot);
            } else {
                self.nodes[node].right = Some(successor);
                parent = Some(node);
            }
        } else if let Some(root) = self.root {
            let node = self.first(root);
            self.nodes[successor].prev = None;
            self.nodes[successor].next = Some(node);
            self.nodes[node].prev = Some(successor);
            self.nodes[node].left = Some(successor);
            parent = Some(node);
        } else {
            self.nodes[successor].prev = None;
            self.nodes[successor].next = None;
            self.root = Some(successor);
            parent = None;
        }

        self.nodes[successor].left = None;
        self.nodes[successor].right = None;
        self.nodes[successor].parent = parent;
        self.nodes[successor].red = true;

        // recolor and rotate (2 rotations at most) back up the tree
        let mut node = successor;
        let mut parent = parent;
        while let Some(mut p) = parent {
            if !self.is_red(p) {
                break;
            }
            let grandpa = self.nodes[p].parent.expect("red node has a parent");
            if self.nodes[grandpa].left == Some(p) {
                let uncle = self.nodes[grandpa].right;
                if uncle.map_or(false, |u| self.is_red(u)) {
                    self.nodes[p].red = false;
                    self.nodes[uncle.expect("red uncle is present")].red = false;
                    self.nodes[grandpa].red = true;
                    node = grandpa;
                } else {
                    if self.nodes[p].right == Some(node) {
                        self.rotate_left(p);
                        node = p;
                        p = self.nodes[node].parent.expect("rotated node has a parent");
                    }
                    self.nodes[p].red = false;
                    self.nodes[grandpa].red = true;
                    self.rotate_right(grandpa);
                }
            } else {
                let uncle = self.nodes[grandpa].left;
                if uncle.map_or(false, |u| self.is_red(u)) {
                    self.nodes[p].red = false;
                    self.nodes[uncle.expect("red uncle is present")].red = false;
                    self.nodes[grandpa].red = true;
                    node = grandpa;
                } else {
                    if self.nodes[p].left == Some(node) {
                        self.rotate_right(p);
                        node = p;
                        p = self.nodes[node].parent.expect("rotated node has a parent");
                    }
                    self.nodes[p].red = false;
                    self.nodes[grandpa].red = true;
                    self.rotate_left(grandpa);
                }
            }
            parent = self.nodes[node].parent;
        }
        let root = self.root.expect("tree is non-empty after insert");
        self.nodes[root].red = false;
    }

    /// Remove `node` from the tree and the in-order list
    ///
    /// The arena slot stays allocated; only the links are torn down.
    pub fn remove(&mut self, node: NodeId) {
        if let Some(next) = self.nodes[node].next {
            self.nodes[next].prev = self.nodes[node].prev;
        }
        if let Some(prev) = self.nodes[node].prev {
            self.nodes[prev].next = self.nodes[node].next;
        }
        self.nodes[node].next = None;
        self.nodes[node].prev = None;

        let mut parent = self.nodes[node].parent;
        let left = self.nodes[node].left;
        let right = self.nodes[node].right;
        let next = match (left, right) {
            (None, r) => r,
            (l, None) => l,
            (_, Some(r)) => Some(self.first(r)),
        };

        if let Some(p) = parent {
            if self.nodes[p].left == Some(node) {
                self.nodes[p].left = next;
            } else {
                self.nodes[p].right = next;
            }
        } else {
            self.root = next;
        }

        // replace a two-child node by its in-order successor, keeping the
        // removed node's color on the successor
        let is_red;
        let mut fix;
        if let (Some(left), Some(right)) = (left, right) {
            let successor = next.expect("two-child node has a successor");
            is_red = self.is_red(successor);
            self.nodes[successor].red = self.is_red(node);
            self.nodes[successor].left = Some(left);
            self.nodes[left].parent = Some(successor);
            if successor != right {
                parent = self.nodes[successor].parent;
                self.nodes[successor].parent = self.nodes[node].parent;
                fix = self.nodes[successor].right;
                self.nodes[parent.expect("detached successor has a parent")].left = fix;
                self.nodes[successor].right = Some(right);
                self.nodes[right].parent = Some(successor);
            } else {
                self.nodes[successor].parent = parent;
                parent = Some(successor);
                fix = self.nodes[successor].right;
            }
        } else {
            is_red = self.is_red(node);
            fix = next;
        }

        if let Some(f) = fix {
            self.nodes[f].parent = parent;
        }
        if is_red {
            return;
        }
        if let Some(f) = fix {
            if self.is_red(f) {
                self.nodes[f].red = false;
                return;
            }
        }

        // a black node was unlinked: rebalance upward until the deficiency
        // is absorbed by a red node or reaches the root
        let mut fix = fix;
        loop {
            if fix == self.root {
                break;
            }
            let p = parent.expect("non-root fixup node has a parent");
            if self.nodes[p].left == fix {
                let mut sibling = self.nodes[p].right.expect("black-height demands a sibling");
                if self.is_red(sibling) {
                    self.nodes[sibling].red = false;
                    self.nodes[p].red = true;
                    self.rotate_left(p);
                    sibling = self.nodes[p].right.expect("rotation preserved the sibling");
                }
                let sl = self.nodes[sibling].left;
                let sr = self.nodes[sibling].right;
                if sl.map_or(false, |n| self.is_red(n)) || sr.map_or(false, |n| self.is_red(n)) {
                    if sr.map_or(true, |n| !self.is_red(n)) {
                        self.nodes[sl.expect("left nephew is red")].red = false;
                        self.nodes[sibling].red = true;
                        self.rotate_right(sibling);
                        sibling = self.nodes[p].right.expect("rotation preserved the sibling");
                    }
                    self.nodes[sibling].red = self.is_red(p);
                    self.nodes[p].red = false;
                    let sr = self.nodes[sibling].right.expect("restructured sibling has a right child");
                    self.nodes[sr].red = false;
                    self.rotate_left(p);
                    fix = self.root;
                    break;
                }
                self.nodes[sibling].red = true;
            } else {
                let mut sibling = self.nodes[p].left.expect("black-height demands a sibling");
                if self.is_red(sibling) {
                    self.nodes[sibling].red = false;
                    self.nodes[p].red = true;
                    self.rotate_right(p);
                    sibling = self.nodes[p].left.expect("rotation preserved the sibling");
                }
                let sl = self.nodes[sibling].left;
                let sr = self.nodes[sibling].right;
                if sl.map_or(false, |n| self.is_red(n)) || sr.map_or(false, |n| self.is_red(n)) {
                    if sl.map_or(true, |n| !self.is_red(n)) {
                        self.nodes[sr.expect("right nephew is red")].red = false;
                        self.nodes[sibling].red = true;
                        self.rotate_left(sibling);
                        sibling = self.nodes[p].left.expect("rotation preserved the sibling");
                    }
                    self.nodes[sibling].red = self.is_red(p);
                    self.nodes[p].red = false;
                    let sl = self.nodes[sibling].left.expect("restructured sibling has a left child");
                    self.nodes[sl].red = false;
                    self.rotate_right(p);
                    fix = self.root;
                    break;
                }
                self.nodes[sibling].red = true;
            }
            fix = Some(p);
            parent = self.nodes[p].parent;
            if self.is_red(p) {
                break;
            }
        }
        if let Some(f) = fix {
            self.nodes[f].red = false;
        }
    }

    fn rotate_left(&mut self, p: NodeId) {
        let q = self.nodes[p].right.expect("left rotation needs a right child");
        let parent = self.nodes[p].parent;
        if let Some(par) = parent {
            if self.nodes[par].left == Some(p) {
                self.nodes[par].left = Some(q);
            } else {
                self.nodes[par].right = Some(q);
            }
        } else {
            self.root = Some(q);
        }
        self.nodes[q].parent = parent;
        self.nodes[p].parent = Some(q);
        self.nodes[p].right = self.nodes[q].left;
        if let Some(right) = self.nodes[p].right {
            self.nodes[right].parent = Some(p);
        }
        self.nodes[q].left = Some(p);
    }

    fn rotate_right(&mut self, p: NodeId) {
        let q = self.nodes[p].left.expect("right rotation needs a left child");
        let parent = self.nodes[p].parent;
        if let Some(par) = parent {
            if self.nodes[par].left == Some(p) {
                self.nodes[par].left = Some(q);
            } else {
                self.nodes[par].right = Some(q);
            }
        } else {
            self.root = Some(q);
        }
        self.nodes[q].parent = parent;
        self.nodes[p].parent = Some(q);
        self.nodes[p].left = self.nodes[q].right;
        if let Some(left) = self.nodes[p].left {
            self.nodes[left].parent = Some(p);
        }
        self.nodes[q].right = Some(p);
    }
}
