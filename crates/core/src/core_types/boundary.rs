//! Boundary surface tags and their attached conditions.
//!
//! A scenario document tags each boundary triangle with a positive integer;
//! tag 0 is reserved for untagged faces and never produces a node condition.
//! Each tag maps to a [`Boundary`] describing the condition kind and, for
//! symmetry planes, the plane orientation.

use serde::{Deserialize, Serialize};

use crate::core_types::Vec3;

/// Kind of condition a boundary surface imposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    /// Dirichlet: the field is frozen on this surface.
    Inlet,
    /// Free outflow.
    Outlet,
    /// Mirror plane: the gradient component along the plane normal is removed.
    Symmetry,
}

/// Value attached to a boundary tag.
///
/// Inlets carry a scalar; symmetry planes carry either `[azimuth, elevation]`
/// orientation angles in degrees or an explicit plane normal. The variants
/// round-trip through JSON untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoundaryValue {
    /// Inlet scalar.
    Scalar(f64),
    /// Symmetry plane orientation as `[azimuth°, elevation°]`.
    Angles([f64; 2]),
    /// Explicit plane normal; a zero vector means "not yet resolved".
    Vector([f64; 3]),
}

impl Default for BoundaryValue {
    fn default() -> Self {
        BoundaryValue::Vector([0.0, 0.0, 0.0])
    }
}

/// A tagged boundary surface condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    /// Condition kind.
    #[serde(rename = "type")]
    pub kind: BoundaryKind,
    /// Inlet scalar or symmetry orientation.
    #[serde(default)]
    pub value: BoundaryValue,
    /// Free-form label carried through from the document.
    #[serde(default)]
    pub description: String,
}

impl Boundary {
    /// Unit normal of the symmetry plane this boundary describes, if the
    /// stored value determines one.
    ///
    /// Orientation angles are degrees on disk and convert as
    /// `n = (cos e·cos a, cos e·sin a, −sin e)`. An explicit zero vector
    /// yields `None`; the loader then derives the normal from the geometry
    /// of the first triangle carrying the tag.
    pub fn plane_normal(&self) -> Option<Vec3> {
        match self.value {
            BoundaryValue::Angles([azimuth, elevation]) => {
                let azimuth = azimuth.to_radians();
                let elevation = elevation.to_radians();
                Some(Vec3::new(
                    elevation.cos() * azimuth.cos(),
                    elevation.cos() * azimuth.sin(),
                    -elevation.sin(),
                ))
            }
            BoundaryValue::Vector(v) => {
                let v = Vec3::new(v[0], v[1], v[2]);
                if v.norm() == 0.0 {
                    None
                } else {
                    Some(v.normalize())
                }
            }
            BoundaryValue::Scalar(_) => None,
        }
    }
}
