//! Arena-allocated Barnes-Hut octree over the active sources.
//!
//! Nodes live contiguously in a `Vec` and refer to their children by index.
//! Every node owns a contiguous range of a permutation of source indices, so
//! "does this node contain particle `i`" is a range check.

use orrery_core::{SpatialIndex, State, Vector3};
use tracing::trace;

const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone)]
struct Node {
    center: Vector3<f64>,
    half_width: f64,
    start: usize,
    end: usize,
    children: Option<[usize; 8]>,
    mass: f64,
    com: Vector3<f64>,
}

impl Node {
    fn new(center: Vector3<f64>, half_width: f64, start: usize, end: usize) -> Self {
        Self {
            center,
            half_width,
            start,
            end,
            children: None,
            mass: 0.0,
            com: Vector3::zeros(),
        }
    }

    fn octant(&self, position: &Vector3<f64>) -> usize {
        usize::from(position.x > self.center.x)
            | usize::from(position.y > self.center.y) << 1
            | usize::from(position.z > self.center.z) << 2
    }

    fn child_center(&self, octant: usize) -> Vector3<f64> {
        let q = 0.5 * self.half_width;
        let sign = |bit: usize| if octant & bit != 0 { q } else { -q };
        self.center + Vector3::new(sign(1), sign(2), sign(4))
    }
}

/// A Barnes-Hut octree implementing [`SpatialIndex`].
///
/// [`SpatialIndex::update`] rebuilds the structure from source positions and
/// [`SpatialIndex::update_gravity_data`] refreshes the per-node moments. The
/// moments pass walks the arena backwards, since children are always pushed
/// after their parent.
#[derive(Debug, Clone, Default)]
pub struct Octree {
    nodes: Vec<Node>,
    order: Vec<usize>,
    slot: Vec<usize>,
}

impl Octree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes, including empty children.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total mass held by the root, or zero for an empty tree.
    #[must_use]
    pub fn total_mass(&self) -> f64 {
        self.nodes.first().map_or(0.0, |root| root.mass)
    }

    fn contains(&self, node: &Node, index: usize) -> bool {
        self.slot
            .get(index)
            .is_some_and(|&s| node.start <= s && s < node.end)
    }

    fn split(&mut self, node: usize, positions: &[Vector3<f64>], depth: usize) {
        let (start, end) = (self.nodes[node].start, self.nodes[node].end);
        if end - start <= 1 || depth >= MAX_DEPTH {
            return;
        }

        let mut buckets: [Vec<usize>; 8] = Default::default();
        for &i in &self.order[start..end] {
            buckets[self.nodes[node].octant(&positions[i])].push(i);
        }

        let mut children = [0; 8];
        let mut cursor = start;
        for (octant, bucket) in buckets.iter().enumerate() {
            let next = cursor + bucket.len();
            self.order[cursor..next].copy_from_slice(bucket);
            let center = self.nodes[node].child_center(octant);
            let half_width = 0.5 * self.nodes[node].half_width;
            children[octant] = self.nodes.len();
            self.nodes.push(Node::new(center, half_width, cursor, next));
            cursor = next;
        }
        self.nodes[node].children = Some(children);

        for child in children {
            self.split(child, positions, depth + 1);
        }
    }
}

impl SpatialIndex for Octree {
    fn update(&mut self, state: &State) {
        let particles = state.particles();
        let active = state.active_count();
        let positions: Vec<Vector3<f64>> = particles.iter().map(|p| p.position).collect();

        self.nodes.clear();
        self.order = (0..active).collect();
        self.slot = vec![usize::MAX; particles.len()];
        if active == 0 {
            return;
        }

        let (min, max) = positions[..active].iter().fold(
            (
                Vector3::repeat(f64::INFINITY),
                Vector3::repeat(f64::NEG_INFINITY),
            ),
            |(min, max), x| (min.inf(x), max.sup(x)),
        );
        let center = 0.5 * (min + max);
        let half_width = 0.5 * (max - min).max() * (1.0 + 1e-9) + f64::MIN_POSITIVE;

        self.nodes.push(Node::new(center, half_width, 0, active));
        self.split(0, &positions, 0);

        for (s, &i) in self.order.iter().enumerate() {
            self.slot[i] = s;
        }
        trace!(nodes = self.nodes.len(), sources = active, "rebuilt octree");
    }

    fn update_gravity_data(&mut self, state: &State) {
        let particles = state.particles();
        for n in (0..self.nodes.len()).rev() {
            let (mass, weighted) = match self.nodes[n].children {
                Some(children) => children.iter().fold(
                    (0.0, Vector3::<f64>::zeros()),
                    |(m, w), &c| {
                        let child = &self.nodes[c];
                        (m + child.mass, w + child.com * child.mass)
                    },
                ),
                None => self.order[self.nodes[n].start..self.nodes[n].end]
                    .iter()
                    .filter_map(|&i| particles.get(i))
                    .fold((0.0, Vector3::<f64>::zeros()), |(m, w), p| {
                        (m + p.mass, w + p.position * p.mass)
                    }),
            };

            let node = &mut self.nodes[n];
            node.mass = mass;
            node.com = if mass > 0.0 { weighted / mass } else { node.center };
        }
    }

    fn acceleration_at(&self, state: &State, index: usize, opening_angle: f64) -> Vector3<f64> {
        let particles = state.particles();
        let Some(target) = particles.get(index) else {
            return Vector3::zeros();
        };
        let eps2 = state.softening * state.softening;
        let pull = |mass: f64, at: Vector3<f64>| {
            let r = at - target.position;
            let s2 = r.norm_squared() + eps2;
            if s2 == 0.0 {
                Vector3::zeros()
            } else {
                r * (mass / (s2 * s2.sqrt()))
            }
        };

        let mut field = Vector3::zeros();
        let mut stack = Vec::with_capacity(64);
        if !self.nodes.is_empty() {
            stack.push(0);
        }

        while let Some(n) = stack.pop() {
            let node = &self.nodes[n];
            if node.mass == 0.0 {
                continue;
            }

            match node.children {
                None => {
                    for &j in &self.order[node.start..node.end] {
                        if j != index {
                            if let Some(source) = particles.get(j) {
                                field += pull(source.mass, source.position);
                            }
                        }
                    }
                }
                Some(children) => {
                    let distance = (node.com - target.position).norm();
                    let far = 2.0 * node.half_width < opening_angle * distance;
                    if far && !self.contains(node, index) {
                        field += pull(node.mass, node.com);
                    } else {
                        stack.extend(children);
                    }
                }
            }
        }

        field
    }
}
