//! Quadtree spatial index for the collision broad phase.
//!
//! Rebuilt from scratch every tick: `clear`, bulk `insert`, then `retrieve`
//! per query shape. `retrieve` is deliberately approximate — it returns
//! everything stored in any node the query box touches, so it may contain
//! false positives and duplicates (items straddling a split line are stored
//! in every child they overlap), but it never omits a true intersection.

use glam::Vec2;

use super::shape::Aabb;

/// Spatial index over axis-aligned boxes with an opaque payload per item.
pub struct QuadTree<T> {
    bounds: Aabb,
    max_depth: u32,
    max_children: usize,
    root: Node<T>,
}

struct Node<T> {
    bounds: Aabb,
    depth: u32,
    items: Vec<(Aabb, T)>,
    children: Option<Box<[Node<T>; 4]>>,
}

impl<T: Clone> QuadTree<T> {
    /// `max_children` is the occupant count a node tolerates before it
    /// subdivides; `max_depth` caps subdivision.
    pub fn new(bounds: Aabb, max_depth: u32, max_children: usize) -> Self {
        Self {
            bounds,
            max_depth,
            max_children,
            root: Node::new(bounds, 0),
        }
    }

    /// Discard all stored items, keeping the configured world bounds.
    pub fn clear(&mut self) {
        self.root = Node::new(self.bounds, 0);
    }

    /// Bulk-load items.
    pub fn insert<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = (Aabb, T)>,
    {
        for (bounds, item) in items {
            self.insert_one(bounds, item);
        }
    }

    pub fn insert_one(&mut self, bounds: Aabb, item: T) {
        self.root.insert(bounds, item, self.max_depth, self.max_children);
    }

    /// Broad-phase query: payloads of every item stored in a node whose
    /// region overlaps `query`.
    pub fn retrieve(&self, query: Aabb) -> Vec<T> {
        let mut out = Vec::new();
        self.root.collect(query, &mut out);
        out
    }
}

impl<T: Clone> Node<T> {
    fn new(bounds: Aabb, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            items: Vec::new(),
            children: None,
        }
    }

    fn insert(&mut self, bounds: Aabb, item: T, max_depth: u32, max_children: usize) {
        if let Some(children) = self.children.as_mut() {
            let mut placed = false;
            for child in children.iter_mut() {
                if child.bounds.overlaps(bounds) {
                    child.insert(bounds, item.clone(), max_depth, max_children);
                    placed = true;
                }
            }
            // items overlapping no child (outside this node's region) stay here
            if !placed {
                self.items.push((bounds, item));
            }
        } else {
            self.items.push((bounds, item));
            if self.items.len() > max_children && self.depth < max_depth {
                self.split(max_depth, max_children);
            }
        }
    }

    fn split(&mut self, max_depth: u32, max_children: usize) {
        let Aabb { min, max } = self.bounds;
        let center = self.bounds.center();
        let quads = [
            Aabb::new(min, center),
            Aabb::new(Vec2::new(center.x, min.y), Vec2::new(max.x, center.y)),
            Aabb::new(Vec2::new(min.x, center.y), Vec2::new(center.x, max.y)),
            Aabb::new(center, max),
        ];
        let depth = self.depth + 1;
        self.children = Some(Box::new(quads.map(|bounds| Node::new(bounds, depth))));
        for (bounds, item) in std::mem::take(&mut self.items) {
            self.insert(bounds, item, max_depth, max_children);
        }
    }

    fn collect(&self, query: Aabb, out: &mut Vec<T>) {
        out.extend(self.items.iter().map(|(_, item)| item.clone()));
        if let Some(children) = self.children.as_deref() {
            for child in children {
                if child.bounds.overlaps(query) {
                    child.collect(query, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    fn world() -> Aabb {
        Aabb::new(Vec2::ZERO, Vec2::new(800.0, 600.0))
    }

    fn item(x: f32, y: f32, w: f32, h: f32) -> Aabb {
        Aabb::new(Vec2::new(x, y), Vec2::new(x + w, y + h))
    }

    #[test]
    fn test_retrieve_from_empty_tree() {
        let tree: QuadTree<usize> = QuadTree::new(world(), 4, 4);
        assert!(tree.retrieve(item(0.0, 0.0, 100.0, 100.0)).is_empty());
    }

    #[test]
    fn test_retrieve_finds_inserted_item() {
        let mut tree = QuadTree::new(world(), 4, 4);
        tree.insert_one(item(100.0, 100.0, 50.0, 50.0), 7usize);
        assert_eq!(tree.retrieve(item(120.0, 120.0, 10.0, 10.0)), vec![7]);
    }

    #[test]
    fn test_split_prunes_distant_items() {
        let mut tree = QuadTree::new(world(), 4, 2);
        // three items in the far corner force a split; a query near the
        // origin must not see them once quadrants separate them
        tree.insert([
            (item(700.0, 500.0, 10.0, 10.0), 0usize),
            (item(720.0, 520.0, 10.0, 10.0), 1),
            (item(740.0, 540.0, 10.0, 10.0), 2),
            (item(10.0, 10.0, 10.0, 10.0), 3),
        ]);
        let near_origin = tree.retrieve(item(0.0, 0.0, 50.0, 50.0));
        assert!(near_origin.contains(&3));
        assert!(!near_origin.contains(&0));
    }

    #[test]
    fn test_straddler_retrievable_from_both_sides() {
        let mut tree = QuadTree::new(world(), 4, 1);
        // sits on the vertical split line of the root
        tree.insert([
            (item(390.0, 100.0, 20.0, 20.0), 0usize),
            (item(10.0, 10.0, 10.0, 10.0), 1),
            (item(700.0, 100.0, 10.0, 10.0), 2),
        ]);
        assert!(tree.retrieve(item(350.0, 100.0, 10.0, 10.0)).contains(&0));
        assert!(tree.retrieve(item(450.0, 100.0, 10.0, 10.0)).contains(&0));
    }

    #[test]
    fn test_clear_discards_items() {
        let mut tree = QuadTree::new(world(), 4, 4);
        tree.insert_one(item(100.0, 100.0, 50.0, 50.0), 0usize);
        tree.clear();
        assert!(tree.retrieve(item(0.0, 0.0, 800.0, 600.0)).is_empty());
    }

    #[test]
    fn test_items_outside_world_are_still_retrievable() {
        let mut tree = QuadTree::new(world(), 4, 4);
        tree.insert_one(item(-100.0, -100.0, 20.0, 20.0), 9usize);
        assert!(tree.retrieve(item(-95.0, -95.0, 5.0, 5.0)).contains(&9));
    }

    proptest! {
        /// Broad phase must never omit a true intersection.
        #[test]
        fn retrieve_never_omits_overlapping_items(
            boxes in prop::collection::vec(
                (0.0f32..760.0, 0.0f32..560.0, 1.0f32..120.0, 1.0f32..120.0),
                1..40,
            ),
            max_children in 1usize..8,
        ) {
            let boxes: Vec<Aabb> = boxes
                .iter()
                .map(|&(x, y, w, h)| item(x, y, w, h))
                .collect();
            let mut tree = QuadTree::new(world(), 5, max_children);
            tree.insert(boxes.iter().copied().enumerate().map(|(i, b)| (b, i)));

            for (i, a) in boxes.iter().enumerate() {
                let found = tree.retrieve(*a);
                for (j, b) in boxes.iter().enumerate() {
                    if i != j && a.overlaps(*b) {
                        prop_assert!(found.contains(&j));
                    }
                }
            }
        }
    }
}
