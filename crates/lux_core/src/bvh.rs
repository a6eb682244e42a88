//! Flat Bounding Volume Hierarchy.
//!
//! Nodes are stored depth-first in one array. Node 0 is the root, a tree
//! node's first child immediately follows it, and every node carries a "miss"
//! link: the node to visit next when its box is missed (or, for leaves, after
//! its shapes were tested). `None` ends traversal. Because every link points
//! strictly forward, traversal terminates without a stack.
//!
//! Construction is a median split on the longest centroid axis.

use lux_math::Aabb;

use crate::error::{SceneError, SceneResult};
use crate::ShapeId;

/// Maximum primitives per leaf node before splitting.
pub const LEAF_MAX_SIZE: usize = 4;

/// A node of the flat BVH.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BvhNode {
    /// Interior node: descend to `child` on a box hit, jump to `miss` otherwise.
    Tree {
        bbox: Aabb,
        child: u32,
        miss: Option<u32>,
    },
    /// Leaf node owning `count` entries of the leaf shape list starting at `first`.
    Leaf {
        bbox: Aabb,
        miss: Option<u32>,
        first: u32,
        count: u32,
    },
}

impl BvhNode {
    /// Bounding box of this node.
    #[inline]
    pub fn bbox(&self) -> &Aabb {
        match self {
            BvhNode::Tree { bbox, .. } | BvhNode::Leaf { bbox, .. } => bbox,
        }
    }

    /// Link followed when the box is missed.
    #[inline]
    pub fn miss(&self) -> Option<u32> {
        match self {
            BvhNode::Tree { miss, .. } | BvhNode::Leaf { miss, .. } => *miss,
        }
    }
}

/// The flat BVH: node array plus the shape indices referenced by leaves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bvh {
    pub nodes: Vec<BvhNode>,
    pub leaf_shapes: Vec<ShapeId>,
}

/// Temporary pointer tree used only while building.
enum BuildNode {
    Branch {
        left: Box<BuildNode>,
        right: Box<BuildNode>,
        bbox: Aabb,
        node_count: u32,
    },
    Leaf {
        shapes: Vec<ShapeId>,
        bbox: Aabb,
    },
}

impl BuildNode {
    fn node_count(&self) -> u32 {
        match self {
            BuildNode::Branch { node_count, .. } => *node_count,
            BuildNode::Leaf { .. } => 1,
        }
    }
}

impl Bvh {
    /// Build a BVH over shapes with known bounding boxes.
    pub fn build(mut items: Vec<(ShapeId, Aabb)>) -> Self {
        let mut bvh = Bvh::default();
        if items.is_empty() {
            return bvh;
        }

        let root = Self::build_recursive(&mut items);
        bvh.nodes.reserve(root.node_count() as usize);
        bvh.leaf_shapes.reserve(items.len());
        bvh.flatten(root, None);
        bvh
    }

    /// Recursive median-split construction.
    ///
    /// Sorts shapes by centroid on the longest axis of the centroid bounds,
    /// splits in half, recurses.
    fn build_recursive(items: &mut [(ShapeId, Aabb)]) -> BuildNode {
        let bbox = items
            .iter()
            .fold(Aabb::EMPTY, |acc, (_, b)| Aabb::surrounding(&acc, b));

        if items.len() <= LEAF_MAX_SIZE {
            return BuildNode::Leaf {
                shapes: items.iter().map(|(id, _)| *id).collect(),
                bbox,
            };
        }

        let centroid_bounds = items.iter().fold(Aabb::EMPTY, |acc, (_, b)| {
            let c = b.centroid();
            Aabb::surrounding(&acc, &Aabb { min: c, max: c })
        });
        let axis = centroid_bounds.longest_axis();

        items.sort_unstable_by(|(_, a), (_, b)| {
            a.centroid()[axis]
                .partial_cmp(&b.centroid()[axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mid = items.len() / 2;
        let (left_items, right_items) = items.split_at_mut(mid);
        let left = Self::build_recursive(left_items);
        let right = Self::build_recursive(right_items);
        let node_count = 1 + left.node_count() + right.node_count();

        BuildNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
            node_count,
        }
    }

    /// Emit `node` depth-first, wiring miss links.
    fn flatten(&mut self, node: BuildNode, miss: Option<u32>) {
        let index = self.nodes.len() as u32;
        match node {
            BuildNode::Leaf { shapes, bbox } => {
                self.nodes.push(BvhNode::Leaf {
                    bbox,
                    miss,
                    first: self.leaf_shapes.len() as u32,
                    count: shapes.len() as u32,
                });
                self.leaf_shapes.extend(shapes);
            }
            BuildNode::Branch {
                left, right, bbox, ..
            } => {
                self.nodes.push(BvhNode::Tree {
                    bbox,
                    child: index + 1,
                    miss,
                });
                let right_index = index + 1 + left.node_count();
                self.flatten(*left, Some(right_index));
                self.flatten(*right, miss);
            }
        }
    }

    /// Check that traversal terminates and every leaf entry is in range.
    ///
    /// Links must point strictly forward; a backward or out-of-range link
    /// would make traversal loop or index out of bounds.
    pub fn validate(&self, shape_count: usize) -> SceneResult<()> {
        let len = self.nodes.len();
        let check_link = |node: usize, link: u32| {
            if (link as usize) <= node || (link as usize) >= len {
                Err(SceneError::MalformedBvh { node, link, len })
            } else {
                Ok(())
            }
        };

        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(miss) = node.miss() {
                check_link(i, miss)?;
            }
            match *node {
                BvhNode::Tree { child, .. } => check_link(i, child)?,
                BvhNode::Leaf { first, count, .. } => {
                    let end = first as u64 + count as u64;
                    if end > self.leaf_shapes.len() as u64 {
                        return Err(SceneError::LeafRangeOutOfBounds {
                            node: i,
                            first,
                            end,
                            len: self.leaf_shapes.len(),
                        });
                    }
                }
            }
        }

        for shape in &self.leaf_shapes {
            if shape.index() >= shape_count {
                return Err(SceneError::ShapeOutOfRange {
                    shape: shape.0,
                    count: shape_count,
                });
            }
        }

        Ok(())
    }

    /// Shapes referenced by a leaf node.
    #[inline]
    pub fn leaf(&self, first: u32, count: u32) -> &[ShapeId] {
        &self.leaf_shapes[first as usize..(first + count) as usize]
    }

    /// Check if the BVH has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn unit_boxes(n: u32) -> Vec<(ShapeId, Aabb)> {
        (0..n)
            .map(|i| {
                let c = Vec3::new(i as f32 * 2.0, 0.0, -5.0);
                (ShapeId(i), Aabb::from_points(c - 0.5, c + 0.5))
            })
            .collect()
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = Bvh::build(vec![]);
        assert!(bvh.is_empty());
        assert!(bvh.validate(0).is_ok());
    }

    #[test]
    fn test_bvh_single_leaf() {
        let bvh = Bvh::build(unit_boxes(3));

        assert_eq!(bvh.len(), 1);
        assert!(matches!(
            bvh.nodes[0],
            BvhNode::Leaf { miss: None, first: 0, count: 3, .. }
        ));
    }

    #[test]
    fn test_bvh_links_point_forward_and_cover_all_shapes() {
        let bvh = Bvh::build(unit_boxes(37));
        bvh.validate(37).unwrap();

        let mut seen: Vec<u32> = bvh.leaf_shapes.iter().map(|s| s.0).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..37).collect::<Vec<_>>());

        // The root is never skipped over, and the last node in order ends traversal
        assert_eq!(bvh.nodes[0].miss(), None);
        assert_eq!(bvh.nodes.last().unwrap().miss(), None);
    }

    #[test]
    fn test_bvh_walk_visits_every_node_once_when_all_boxes_hit() {
        let bvh = Bvh::build(unit_boxes(20));

        let mut visited = 0;
        let mut next = Some(0u32);
        while let Some(index) = next {
            visited += 1;
            next = match bvh.nodes[index as usize] {
                BvhNode::Tree { child, .. } => Some(child),
                BvhNode::Leaf { miss, .. } => miss,
            };
        }
        assert_eq!(visited, bvh.len());
    }

    #[test]
    fn test_validate_rejects_backward_link() {
        let mut bvh = Bvh::build(unit_boxes(10));
        if let BvhNode::Leaf { miss, .. } = bvh.nodes.iter_mut().last().unwrap() {
            *miss = Some(0);
        }
        assert!(matches!(
            bvh.validate(10),
            Err(SceneError::MalformedBvh { link: 0, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_shape() {
        let bvh = Bvh::build(unit_boxes(5));
        assert!(matches!(
            bvh.validate(4),
            Err(SceneError::ShapeOutOfRange { shape: 4, .. })
        ));
    }
}
