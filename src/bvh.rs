//! Flat-array bounding volume hierarchy.
//!
//! Built top-down by midpoint-of-longest-axis partition. Nodes are pushed
//! into a flat `Vec` in post-order (children before parent) with the
//! invariant that an interior node's right child always sits immediately
//! after its left child, `right_index == left_index + 1`, which lets
//! traversal address both children from a single stored index.
//!
//! Generic over anything [`Hittable`] so the same tree shape serves both
//! bare primitives and primitives wrapped in a transform stack.

use crate::aabb::Aabb;
use crate::math::{Interval, Ray};
use crate::primitive::{HitRecord, Hittable};

/// Rays are tested against primitives starting just past this distance, to
/// avoid re-hitting the originating surface from floating point error.
pub const MIN_RAY_DIST: f64 = 0.001;

#[derive(Debug, Clone, Copy)]
pub struct BvhNode {
    pub bbox: Aabb,
    /// Start of this node's primitive range in `Bvh::order`.
    pub object_index: i32,
    /// `>= 0`: index of the left child; the right child is `left + 1`.
    /// `< 0`: this is a leaf; `-left` is the primitive count.
    pub left: i32,
}

#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    /// Primitive indices, permuted by construction into spatial order.
    order: Vec<u32>,
    root: usize,
}

impl Bvh {
    pub fn build<T: Hittable>(objects: &[T]) -> Self {
        assert!(!objects.is_empty(), "cannot build a BVH over zero objects");
        let mut order: Vec<u32> = (0..objects.len() as u32).collect();
        let mut nodes = Vec::new();
        let root_node = build_node(objects, &mut order, 0, objects.len(), &mut nodes);
        nodes.push(root_node);
        let root = nodes.len() - 1;
        Self { nodes, order, root }
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn root_bbox(&self) -> Aabb {
        self.nodes[self.root].bbox
    }

    /// Finds the closest hit along `ray` within `[MIN_RAY_DIST, closest]`,
    /// tightening `closest` as better hits are found. Returns the hit
    /// object's index alongside its hit record.
    pub fn hit_select<T: Hittable>(&self, objects: &[T], ray: &Ray, closest: &mut f64) -> Option<(usize, HitRecord)> {
        self.hit_node(objects, self.root, ray, closest)
    }

    fn hit_node<T: Hittable>(
        &self,
        objects: &[T],
        node_idx: usize,
        ray: &Ray,
        closest: &mut f64,
    ) -> Option<(usize, HitRecord)> {
        let node = &self.nodes[node_idx];
        if !node.bbox.hit(ray, Interval::new(MIN_RAY_DIST, *closest)) {
            return None;
        }

        if node.left < 0 {
            let count = (-node.left) as usize;
            let start = node.object_index as usize;
            let mut best = None;
            for &idx in &self.order[start..start + count] {
                if let Some(rec) = objects[idx as usize].hit(ray, Interval::new(MIN_RAY_DIST, *closest)) {
                    *closest = rec.t;
                    best = Some((idx as usize, rec));
                }
            }
            return best;
        }

        // Right is traversed second with the tightened `closest`, so on a
        // tie it is the one that actually satisfied the narrower bound,
        // and takes precedence.
        let left = self.hit_node(objects, node.left as usize, ray, closest);
        let right = self.hit_node(objects, node.left as usize + 1, ray, closest);
        right.or(left)
    }
}

fn build_node<T: Hittable>(objects: &[T], order: &mut [u32], start: usize, end: usize, nodes: &mut Vec<BvhNode>) -> BvhNode {
    debug_assert!(end > start);

    let bbox = order[start..end]
        .iter()
        .map(|&i| objects[i as usize].bounding_box())
        .fold(Aabb::empty(), Aabb::union);

    let span = end - start;
    if span == 1 {
        return BvhNode {
            bbox,
            object_index: start as i32,
            left: -1,
        };
    }

    let axis = bbox.longest_axis();
    let pivot = bbox.axis_interval(axis).mid_point();

    let mid = partition_by_midpoint(objects, &mut order[start..end], axis, pivot) + start;

    if mid == start || mid == end {
        return BvhNode {
            bbox,
            object_index: start as i32,
            left: -((end - start) as i32),
        };
    }

    let left_node = build_node(objects, order, start, mid, nodes);
    let right_node = build_node(objects, order, mid, end, nodes);

    let left_index = nodes.len();
    nodes.push(left_node);
    let right_index = nodes.len();
    nodes.push(right_node);
    debug_assert_eq!(right_index, left_index + 1);

    BvhNode {
        bbox,
        object_index: start as i32,
        left: left_index as i32,
    }
}

/// In-place partition: elements whose bounding-box midpoint on `axis` is
/// `<= pivot` move to the front. Returns the split point (count of "left"
/// elements), matching `std::partition`'s return value in the original.
fn partition_by_midpoint<T: Hittable>(objects: &[T], slice: &mut [u32], axis: usize, pivot: f64) -> usize {
    let goes_left = |idx: u32| objects[idx as usize].bounding_box().axis_interval(axis).mid_point() <= pivot;

    let mut i = 0;
    for j in 0..slice.len() {
        if goes_left(slice[j]) {
            slice.swap(i, j);
            i += 1;
        }
    }
    i
}
