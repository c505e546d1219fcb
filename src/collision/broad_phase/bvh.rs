use crate::collision::contact::{BodyHandle, CollisionPair};
use crate::geometry::Aabb;

/// A body entry fed to [`Bvh::build`]
#[derive(Debug, Clone, Copy)]
pub struct BvhEntry {
    pub handle: BodyHandle,
    pub aabb: Aabb,
    /// Leaves that don't collide still take part in spatial queries
    pub collision_enabled: bool,
}

#[derive(Debug, Clone, Copy)]
enum BvhNodeKind {
    Leaf {
        handle: BodyHandle,
        collision_enabled: bool,
    },
    Internal {
        left: usize,
        right: usize,
    },
}

/// A node in the BVH tree
#[derive(Debug, Clone, Copy)]
struct BvhNode {
    /// Bounding box for this node
    aabb: Aabb,
    kind: BvhNodeKind,
}

/// A bounding volume hierarchy rebuilt from scratch every step.
///
/// Nodes live in an arena; a leaf holds exactly one body and an internal
/// node's bounds are the union of its two children.
#[derive(Debug, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    root: Option<usize>,
    entries: Vec<BvhEntry>,
}

impl Bvh {
    /// Creates a new empty BVH
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the tree from `entries`, discarding the previous one.
    ///
    /// Each level splits along the longest axis of the aggregate bounds at
    /// the median of the entry centers.
    pub fn build(&mut self, entries: impl IntoIterator<Item = BvhEntry>) {
        self.nodes.clear();
        self.entries.clear();
        self.entries.extend(entries);
        self.root = None;

        let count = self.entries.len();
        if count == 0 {
            return;
        }
        self.nodes.reserve(2 * count - 1);

        let mut entries = std::mem::take(&mut self.entries);
        let root = self.build_range(&mut entries, 0, count);
        self.entries = entries;
        self.root = Some(root);
    }

    fn build_range(&mut self, entries: &mut [BvhEntry], start: usize, end: usize) -> usize {
        let count = end - start;
        if count == 1 {
            let entry = entries[start];
            return self.push(BvhNode {
                aabb: entry.aabb,
                kind: BvhNodeKind::Leaf {
                    handle: entry.handle,
                    collision_enabled: entry.collision_enabled,
                },
            });
        }

        let bounds = entries[start..end]
            .iter()
            .fold(Aabb::EMPTY, |acc, e| acc.union(e.aabb));
        let axis = bounds.longest_axis();
        entries[start..end].sort_by(|a, b| a.aabb.center()[axis].total_cmp(&b.aabb.center()[axis]));

        let mid = start + count / 2;
        let left = self.build_range(entries, start, mid);
        let right = self.build_range(entries, mid, end);

        let aabb = self.nodes[left].aabb.union(self.nodes[right].aabb);
        self.push(BvhNode {
            aabb,
            kind: BvhNodeKind::Internal { left, right },
        })
    }

    fn push(&mut self, node: BvhNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Number of bodies in the tree
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the tree holds no bodies
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Bounds of the whole tree, if any
    pub fn root_aabb(&self) -> Option<Aabb> {
        self.root.map(|root| self.nodes[root].aabb)
    }

    /// Height of the tree (a single leaf has depth 1)
    pub fn depth(&self) -> usize {
        self.root.map_or(0, |root| self.node_depth(root))
    }

    fn node_depth(&self, node: usize) -> usize {
        match self.nodes[node].kind {
            BvhNodeKind::Leaf { .. } => 1,
            BvhNodeKind::Internal { left, right } => {
                1 + self.node_depth(left).max(self.node_depth(right))
            }
        }
    }

    /// All candidate pairs whose bounds overlap and whose bodies both collide.
    ///
    /// Every pair is reported once, lower handle first, in traversal order.
    pub fn query_pairs(&self) -> Vec<CollisionPair> {
        let mut pairs = Vec::new();
        if let Some(root) = self.root {
            self.pairs_within(root, &mut pairs);
        }
        pairs
    }

    fn pairs_within(&self, node: usize, pairs: &mut Vec<CollisionPair>) {
        if let BvhNodeKind::Internal { left, right } = self.nodes[node].kind {
            self.pairs_between(left, right, pairs);
            self.pairs_within(left, pairs);
            self.pairs_within(right, pairs);
        }
    }

    fn pairs_between(&self, a: usize, b: usize, pairs: &mut Vec<CollisionPair>) {
        let (node_a, node_b) = (&self.nodes[a], &self.nodes[b]);
        if !node_a.aabb.intersects(node_b.aabb) {
            return;
        }

        match (node_a.kind, node_b.kind) {
            (
                BvhNodeKind::Leaf {
                    handle: ha,
                    collision_enabled: ca,
                },
                BvhNodeKind::Leaf {
                    handle: hb,
                    collision_enabled: cb,
                },
            ) => {
                if ca && cb && ha != hb {
                    pairs.push(CollisionPair::new(ha, hb));
                }
            }
            (BvhNodeKind::Leaf { .. }, BvhNodeKind::Internal { left, right }) => {
                self.pairs_between(a, left, pairs);
                self.pairs_between(a, right, pairs);
            }
            (BvhNodeKind::Internal { left, right }, BvhNodeKind::Leaf { .. }) => {
                self.pairs_between(left, b, pairs);
                self.pairs_between(right, b, pairs);
            }
            (
                BvhNodeKind::Internal {
                    left: al,
                    right: ar,
                },
                BvhNodeKind::Internal {
                    left: bl,
                    right: br,
                },
            ) => {
                self.pairs_between(al, bl, pairs);
                self.pairs_between(al, br, pairs);
                self.pairs_between(ar, bl, pairs);
                self.pairs_between(ar, br, pairs);
            }
        }
    }

    /// Calls `callback` for every body whose bounds overlap `aabb`
    pub fn query_aabb(&self, aabb: Aabb, mut callback: impl FnMut(BodyHandle)) {
        let Some(root) = self.root else {
            return;
        };
        let mut stack = vec![root];

        while let Some(current) = stack.pop() {
            let node = &self.nodes[current];
            if !node.aabb.intersects(aabb) {
                continue;
            }

            match node.kind {
                BvhNodeKind::Leaf { handle, .. } => callback(handle),
                BvhNodeKind::Internal { left, right } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
    }
}
