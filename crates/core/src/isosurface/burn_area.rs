//! Burn-area-vs-depth sampling over the scalar field range.

use crate::core_types::{Mesh, Vec3};
use crate::isosurface::isosurface;

/// Burn area sampled at evenly spaced depths.
#[derive(Debug, Clone, Default)]
pub struct BurnAreaCurve {
    /// Sampled field thresholds (burn depths).
    pub depth: Vec<f64>,
    /// Total isocontour area at each depth.
    pub area: Vec<f64>,
}

/// Sample the isocontour area at `number_of_areas` thresholds spread over
/// the field range, inset slightly from both ends so the extraction never
/// sits exactly on the extreme node values. Depths below zero are clamped
/// out of the range.
pub fn burn_area_curve(
    mesh: &Mesh,
    u_vertex: &[f64],
    gradient: &[Vec3],
    number_of_areas: usize,
) -> BurnAreaCurve {
    let mut curve = BurnAreaCurve::default();
    if number_of_areas == 0 || u_vertex.is_empty() {
        return curve;
    }

    let epsilon = 0.001;
    let mut u_max = u_vertex.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut u_min = u_vertex.iter().copied().fold(f64::INFINITY, f64::min);
    if u_min < 0.0 {
        u_min = 0.0;
    }
    u_max -= (u_max - u_min) * epsilon;
    u_min += (u_max - u_min) * epsilon;

    for sample in 0..number_of_areas {
        let depth = if number_of_areas == 1 {
            u_min
        } else {
            u_min + (u_max - u_min) * sample as f64 / (number_of_areas - 1) as f64
        };
        let surface = isosurface(mesh, u_vertex, gradient, depth);
        curve.depth.push(depth);
        curve.area.push(surface.area());
    }

    curve
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_curve_samples_span_field_range() {
        let mesh = Mesh {
            nodes: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            triangles: vec![],
            tetrahedra: vec![[0, 1, 2, 3]],
        };
        let u = vec![0.0, 1.0, 0.0, 0.0];
        let gradient = vec![Vec3::new(1.0, 0.0, 0.0)];

        let curve = burn_area_curve(&mesh, &u, &gradient, 5);
        assert_eq!(curve.depth.len(), 5);
        assert_eq!(curve.area.len(), 5);
        assert!(curve.depth.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(curve.depth[0] > 0.0);
        assert!(curve.depth[4] < 1.0);
        // Every inset depth cuts the element somewhere.
        assert!(curve.area.iter().all(|area| *area > 0.0));
    }

    #[test]
    fn test_zero_samples_is_empty() {
        let mesh = Mesh::default();
        let curve = burn_area_curve(&mesh, &[], &[], 0);
        assert!(curve.depth.is_empty());
        assert!(curve.area.is_empty());
    }
}
