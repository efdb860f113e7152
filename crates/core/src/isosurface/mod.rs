//! Isocontour surface extraction (marching tetrahedra).
//!
//! Walks every tetrahedron's six edges, interpolates the threshold crossing
//! on each edge whose endpoint values straddle the level, and stitches the
//! resulting 3 or 4 points into consistently oriented triangles. Vertices
//! shared between adjacent elements are merged through a tolerance-keyed
//! spatial hash, so the surface is watertight within numerical tolerance.

mod burn_area;

pub use burn_area::{burn_area_curve, BurnAreaCurve};

use rustc_hash::FxHashMap;

use crate::core_types::{Mesh, Vec3};

/// Triangulated isocontour surface.
#[derive(Debug, Clone, Default)]
pub struct IsosurfaceMesh {
    /// Deduplicated surface vertices.
    pub nodes: Vec<Vec3>,
    /// Triangles as indices into `nodes`, wound so the face normal opposes
    /// the local field gradient.
    pub triangles: Vec<[usize; 3]>,
}

impl IsosurfaceMesh {
    /// Sum of the triangle areas.
    pub fn area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|triangle| {
                let edge_1 = self.nodes[triangle[1]] - self.nodes[triangle[0]];
                let edge_2 = self.nodes[triangle[2]] - self.nodes[triangle[0]];
                edge_1.cross(&edge_2).norm() / 2.0
            })
            .sum()
    }
}

/// Merges interpolated vertices that adjacent tetrahedra produce for the
/// same edge. Keys are coordinates quantized to a mesh-scale tolerance;
/// interpolation is deterministic, so true duplicates land on the same key.
struct VertexPool {
    nodes: Vec<Vec3>,
    lookup: FxHashMap<[i64; 3], usize>,
    quantum: f64,
}

impl VertexPool {
    fn new(quantum: f64) -> Self {
        Self {
            nodes: Vec::new(),
            lookup: FxHashMap::default(),
            quantum,
        }
    }

    fn key(&self, point: &Vec3) -> [i64; 3] {
        [
            (point.x / self.quantum).round() as i64,
            (point.y / self.quantum).round() as i64,
            (point.z / self.quantum).round() as i64,
        ]
    }

    fn insert(&mut self, point: Vec3) -> usize {
        let key = self.key(&point);
        if let Some(&index) = self.lookup.get(&key) {
            return index;
        }
        let index = self.nodes.len();
        self.nodes.push(point);
        self.lookup.insert(key, index);
        index
    }
}

/// Threshold crossing on one tetrahedron edge, linearly interpolated.
///
/// The interpolation is parametrized from the lower-valued endpoint toward
/// the higher so the floating-point result does not depend on which
/// endpoint came first in the edge enumeration.
fn edge_crossing(value: f64, u_1: f64, u_2: f64, point_1: Vec3, point_2: Vec3) -> Vec3 {
    let (u_low, u_high, low, high) = if u_1 - value < 0.0 {
        (u_1, u_2, point_1, point_2)
    } else {
        (u_2, u_1, point_2, point_1)
    };
    let t = (value - u_low) / (u_high - u_low);
    low + (high - low) * t
}

/// Flip the winding when the triangle's geometric normal points along the
/// owning element's gradient, so the surface orientation is consistent.
fn orient(nodes: &[Vec3], triangle: &mut [usize; 3], flow_direction: &Vec3) {
    let normal = (nodes[triangle[1]] - nodes[triangle[0]])
        .cross(&(nodes[triangle[2]] - nodes[triangle[0]]));
    if normal.dot(flow_direction) > 0.0 {
        triangle.swap(1, 2);
    }
}

/// Order four near-coplanar crossing points into a proper quadrilateral:
/// sort the three non-anchor points by signed angle around the normal
/// defined by the first two. Returns indices into the point set.
fn order_quadrilateral(points: &[Vec3; 4]) -> [usize; 4] {
    let center = (points[0] + points[1] + points[2] + points[3]) / 4.0;
    let oa = points[0] - center;
    let reference_normal = oa.cross(&(points[1] - center));
    let mag_oa = oa.norm();

    let mut angles = [0.0f64; 3];
    for i in 1..4 {
        let ob = points[i] - center;
        let cos_arg = (oa.dot(&ob) / (mag_oa * ob.norm())).clamp(-1.0, 1.0);
        let mut angle = cos_arg.acos();
        if reference_normal.dot(&oa.cross(&ob)) < 0.0 {
            angle = 2.0 * std::f64::consts::PI - angle;
        }
        angles[i - 1] = angle;
    }

    let mut ordered = [0usize; 4];
    for slot in 1..4 {
        let (min_index, _) = angles
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .expect("three candidate angles");
        ordered[slot] = min_index + 1;
        angles[min_index] = f64::INFINITY;
    }
    ordered
}

/// Extract the isocontour surface `{x : u(x) = value}` from the scalar
/// field.
///
/// `gradient` is the per-tetrahedron reconstructed gradient used to orient
/// the output triangles; pass the solver's last gradient buffer. Edges
/// whose endpoint values only touch the threshold (product exactly zero)
/// are not crossings, so a threshold sitting exactly on a node value never
/// produces a zero-measure triangle.
///
/// # Panics
///
/// Panics if a tetrahedron yields a crossing count other than 0, 3, or 4 —
/// that means a solver or geometry invariant was broken upstream.
pub fn isosurface(mesh: &Mesh, u_vertex: &[f64], gradient: &[Vec3], value: f64) -> IsosurfaceMesh {
    // Quantum well below any feature the interpolation can produce, but
    // scale-aware so huge meshes do not exhaust the integer key range.
    let extent = mesh
        .nodes
        .iter()
        .map(|n| n.x.abs().max(n.y.abs()).max(n.z.abs()))
        .fold(1.0, f64::max);
    let mut pool = VertexPool::new(extent * 1e-12);
    let mut triangles: Vec<[usize; 3]> = Vec::new();

    for (tet, nodes) in mesh.tetrahedra.iter().enumerate() {
        let mut crossings: Vec<Vec3> = Vec::with_capacity(4);

        // 4 vertices give 6 edges.
        for i in 0..4 {
            for j in (i + 1)..4 {
                let u_1 = u_vertex[nodes[i]];
                let u_2 = u_vertex[nodes[j]];
                if (u_1 - value) * (u_2 - value) < 0.0 {
                    crossings.push(edge_crossing(
                        value,
                        u_1,
                        u_2,
                        mesh.nodes[nodes[i]],
                        mesh.nodes[nodes[j]],
                    ));
                }
            }
        }

        match crossings.len() {
            0 => {}
            3 => {
                let mut triangle = [
                    pool.insert(crossings[0]),
                    pool.insert(crossings[1]),
                    pool.insert(crossings[2]),
                ];
                orient(&pool.nodes, &mut triangle, &gradient[tet]);
                triangles.push(triangle);
            }
            4 => {
                let points = [crossings[0], crossings[1], crossings[2], crossings[3]];
                let ordered = order_quadrilateral(&points);

                // Split along the shorter diagonal to avoid slivers.
                let diagonal_1 = points[ordered[0]] - points[ordered[2]];
                let diagonal_2 = points[ordered[1]] - points[ordered[3]];
                let (split_1, split_2) = if diagonal_1.norm() < diagonal_2.norm() {
                    (
                        [ordered[0], ordered[1], ordered[2]],
                        [ordered[0], ordered[2], ordered[3]],
                    )
                } else {
                    (
                        [ordered[0], ordered[1], ordered[3]],
                        [ordered[1], ordered[2], ordered[3]],
                    )
                };

                for split in [split_1, split_2] {
                    let mut triangle = [
                        pool.insert(points[split[0]]),
                        pool.insert(points[split[1]]),
                        pool.insert(points[split[2]]),
                    ];
                    orient(&pool.nodes, &mut triangle, &gradient[tet]);
                    triangles.push(triangle);
                }
            }
            count => panic!("unexpected number of intersection points: {count}"),
        }
    }

    IsosurfaceMesh {
        nodes: pool.nodes,
        triangles,
    }
}
