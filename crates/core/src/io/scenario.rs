//! Scenario document loading.
//!
//! The input is a JSON document with three required sections: `metaData`
//! (opaque to the solver), `mesh` (1-based node indices), and `conditions`
//! (boundary tag table, per-triangle tags, optional recession field).
//! Everything the solver needs is validated here so the numerical code can
//! assume a consistent scenario.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::info;

use crate::core_types::{Boundary, BoundaryKind, BoundaryValue, Mesh, MeshError, Vec3};
use crate::solver::{BoundaryError, RecessionField};

/// Failures while loading a scenario document. All are fatal to the load
/// and leave any previously loaded state untouched.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The document is not valid JSON.
    Parse(String),
    /// A required top-level section is absent.
    MissingSection(&'static str),
    /// A section exists but does not match the expected shape.
    Format { section: &'static str, cause: String },
    /// A mesh index was zero or negative (the document is 1-based).
    NonPositiveIndex { section: &'static str, element: usize },
    /// Structural mesh validation failed.
    Mesh(MeshError),
    /// A boundary tag was not a positive integer.
    InvalidBoundaryTag { tag: i64 },
    /// The per-triangle tag list does not match the triangle count.
    TriangleTagCount { expected: usize, found: usize },
    /// Composing per-node conditions failed.
    Boundary(BoundaryError),
    /// The recession list does not match the node count.
    RecessionLength { expected: usize, found: usize },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(cause) => write!(f, "Unable to read scenario file: {cause}"),
            LoadError::Parse(cause) => {
                write!(f, "Unable to parse JSON file. Invalid JSON file? ({cause})")
            }
            LoadError::MissingSection(section) => {
                write!(f, "Unable to read mesh data from JSON file. Missing {section} field.")
            }
            LoadError::Format { section, cause } => {
                write!(f, "Unable to read {section} from JSON file. Wrong format? ({cause})")
            }
            LoadError::NonPositiveIndex { section, element } => {
                write!(f, "{section} entry {element} uses a non-positive node index (input is 1-based)")
            }
            LoadError::Mesh(cause) => write!(f, "{cause}"),
            LoadError::InvalidBoundaryTag { tag } => {
                write!(f, "Boundary tag must be greater than 0 (found {tag})")
            }
            LoadError::TriangleTagCount { expected, found } => {
                write!(f, "Condition list covers {found} triangles, mesh has {expected}")
            }
            LoadError::Boundary(cause) => write!(f, "{cause}"),
            LoadError::RecessionLength { expected, found } => {
                write!(f, "Recession field covers {found} nodes, mesh has {expected}")
            }
        }
    }
}

impl std::error::Error for LoadError {}

impl From<MeshError> for LoadError {
    fn from(cause: MeshError) -> Self {
        LoadError::Mesh(cause)
    }
}

impl From<BoundaryError> for LoadError {
    fn from(cause: BoundaryError) -> Self {
        LoadError::Boundary(cause)
    }
}

#[derive(Deserialize)]
struct RawMesh {
    nodes: Vec<[f64; 3]>,
    triangles: Vec<[i64; 3]>,
    tetrahedra: Vec<[i64; 4]>,
}

fn default_kind() -> BoundaryKind {
    BoundaryKind::Inlet
}

#[derive(Deserialize)]
struct RawBoundary {
    tag: i64,
    #[serde(rename = "type", default = "default_kind")]
    kind: BoundaryKind,
    #[serde(default)]
    value: BoundaryValue,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRecession {
    Isotropic(Vec<f64>),
    Anisotropic(Vec<[f64; 6]>),
}

#[derive(Deserialize)]
struct RawConditions {
    boundary: Vec<RawBoundary>,
    triangle: Vec<u32>,
    recession: Option<RawRecession>,
}

/// A fully validated scenario: everything the solver context is built from,
/// plus the original document retained for results merging.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// The ingested mesh, 0-based and validated.
    pub mesh: Mesh,
    /// Boundary tag table with symmetry orientations resolved.
    pub boundaries: FxHashMap<u32, Boundary>,
    /// Per-triangle boundary tags, 0 meaning untagged.
    pub triangle_tags: Vec<u32>,
    /// Recession field in the mode the document selected.
    pub recession: RecessionField,
    /// The original parsed document.
    pub document: serde_json::Value,
}

impl Scenario {
    /// Load and validate a scenario file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(&path).map_err(LoadError::Io)?;
        let scenario = Self::from_str(&contents)?;
        info!(
            path = %path.as_ref().display(),
            nodes = scenario.mesh.node_count(),
            tetrahedra = scenario.mesh.tetrahedra.len(),
            boundaries = scenario.boundaries.len(),
            anisotropic = scenario.recession.is_anisotropic(),
            "scenario loaded"
        );
        Ok(scenario)
    }

    /// Parse and validate a scenario document from JSON text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> Result<Self, LoadError> {
        let document: serde_json::Value =
            serde_json::from_str(contents).map_err(|e| LoadError::Parse(e.to_string()))?;

        for section in ["metaData", "mesh", "conditions"] {
            if document.get(section).is_none() {
                return Err(LoadError::MissingSection(section));
            }
        }

        let raw_mesh: RawMesh = serde_json::from_value(document["mesh"].clone())
            .map_err(|e| LoadError::Format {
                section: "mesh",
                cause: e.to_string(),
            })?;
        let mesh = ingest_mesh(raw_mesh)?;

        let raw_conditions: RawConditions =
            serde_json::from_value(document["conditions"].clone()).map_err(|e| {
                LoadError::Format {
                    section: "boundary conditions",
                    cause: e.to_string(),
                }
            })?;

        let mut boundaries = FxHashMap::default();
        for raw in raw_conditions.boundary {
            if raw.tag < 1 {
                return Err(LoadError::InvalidBoundaryTag { tag: raw.tag });
            }
            boundaries.insert(
                raw.tag as u32,
                Boundary {
                    kind: raw.kind,
                    value: raw.value,
                    description: raw.description,
                },
            );
        }

        if raw_conditions.triangle.len() != mesh.triangles.len() {
            return Err(LoadError::TriangleTagCount {
                expected: mesh.triangles.len(),
                found: raw_conditions.triangle.len(),
            });
        }
        let triangle_tags = raw_conditions.triangle;
        resolve_symmetry_orientations(&mesh, &mut boundaries, &triangle_tags);

        let recession = match raw_conditions.recession {
            None => RecessionField::uniform(mesh.node_count()),
            Some(RawRecession::Isotropic(rates)) => {
                if rates.is_empty() {
                    RecessionField::uniform(mesh.node_count())
                } else if rates.len() != mesh.node_count() {
                    return Err(LoadError::RecessionLength {
                        expected: mesh.node_count(),
                        found: rates.len(),
                    });
                } else {
                    RecessionField::Isotropic(rates)
                }
            }
            Some(RawRecession::Anisotropic(tuples)) => {
                if tuples.len() != mesh.node_count() {
                    return Err(LoadError::RecessionLength {
                        expected: mesh.node_count(),
                        found: tuples.len(),
                    });
                }
                RecessionField::anisotropic(tuples)
            }
        };

        Ok(Self {
            mesh,
            boundaries,
            triangle_tags,
            recession,
            document,
        })
    }
}

/// Convert 1-based document indices to the internal 0-based mesh and run
/// structural validation.
fn ingest_mesh(raw: RawMesh) -> Result<Mesh, LoadError> {
    let nodes: Vec<Vec3> = raw
        .nodes
        .iter()
        .map(|n| Vec3::new(n[0], n[1], n[2]))
        .collect();

    let mut triangles = Vec::with_capacity(raw.triangles.len());
    for (element, triangle) in raw.triangles.iter().enumerate() {
        let mut converted = [0usize; 3];
        for (slot, &index) in triangle.iter().enumerate() {
            if index < 1 {
                return Err(LoadError::NonPositiveIndex {
                    section: "triangles",
                    element,
                });
            }
            converted[slot] = (index - 1) as usize;
        }
        triangles.push(converted);
    }

    let mut tetrahedra = Vec::with_capacity(raw.tetrahedra.len());
    for (element, tet) in raw.tetrahedra.iter().enumerate() {
        let mut converted = [0usize; 4];
        for (slot, &index) in tet.iter().enumerate() {
            if index < 1 {
                return Err(LoadError::NonPositiveIndex {
                    section: "tetrahedra",
                    element,
                });
            }
            converted[slot] = (index - 1) as usize;
        }
        tetrahedra.push(converted);
    }

    let mesh = Mesh {
        nodes,
        triangles,
        tetrahedra,
    };
    mesh.validate()?;
    Ok(mesh)
}

/// Give every symmetry boundary a usable plane normal: boundaries whose
/// stored value does not determine one inherit the geometric normal of the
/// first mesh triangle carrying their tag.
fn resolve_symmetry_orientations(
    mesh: &Mesh,
    boundaries: &mut FxHashMap<u32, Boundary>,
    triangle_tags: &[u32],
) {
    for (triangle, &tag) in triangle_tags.iter().enumerate() {
        if tag == 0 {
            continue;
        }
        let Some(boundary) = boundaries.get_mut(&tag) else {
            continue; // surfaces with unknown tags fail later, with context
        };
        if boundary.kind != BoundaryKind::Symmetry || boundary.plane_normal().is_some() {
            continue;
        }
        let [a, b, c] = mesh.triangles[triangle];
        let edge_1 = mesh.nodes[b] - mesh.nodes[a];
        let edge_2 = mesh.nodes[c] - mesh.nodes[a];
        let normal = edge_2.cross(&edge_1).normalize();
        boundary.value = BoundaryValue::Vector([normal.x, normal.y, normal.z]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_json() -> String {
        // One unit tetrahedron, 1-based indices, inlet on one face and an
        // unoriented symmetry plane on the z = 0 face.
        r#"{
            "metaData": {"version": 1},
            "mesh": {
                "nodes": [[0,0,0],[1,0,0],[0,1,0],[0,0,1]],
                "triangles": [[1,2,3],[1,2,4],[1,3,4],[2,3,4]],
                "tetrahedra": [[1,2,3,4]]
            },
            "conditions": {
                "boundary": [
                    {"tag": 1, "type": "symmetry", "description": "mirror"},
                    {"tag": 2, "type": "inlet", "value": 0.0}
                ],
                "triangle": [1, 0, 0, 2]
            }
        }"#
        .to_string()
    }

    #[test]
    fn test_load_decrements_indices() {
        let scenario = Scenario::from_str(&scenario_json()).unwrap();
        assert_eq!(scenario.mesh.tetrahedra[0], [0, 1, 2, 3]);
        assert_eq!(scenario.mesh.triangles[0], [0, 1, 2]);
        assert_eq!(scenario.triangle_tags, vec![1, 0, 0, 2]);
    }

    #[test]
    fn test_symmetry_normal_derived_from_triangle() {
        let scenario = Scenario::from_str(&scenario_json()).unwrap();
        let normal = scenario.boundaries[&1].plane_normal().unwrap();
        // Triangle (0,1,2) spans the z = 0 plane.
        assert_eq!(normal.x, 0.0);
        assert_eq!(normal.y, 0.0);
        assert_eq!(normal.z.abs(), 1.0);
    }

    #[test]
    fn test_missing_section_named() {
        let err = Scenario::from_str(r#"{"metaData": {}, "mesh": {}}"#).unwrap_err();
        assert!(matches!(err, LoadError::MissingSection("conditions")));
        let message = err.to_string();
        assert!(message.contains("conditions"));
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = Scenario::from_str("not json").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_zero_tag_rejected() {
        let json = scenario_json().replace(r#""tag": 2"#, r#""tag": 0"#);
        let err = Scenario::from_str(&json).unwrap_err();
        assert!(matches!(err, LoadError::InvalidBoundaryTag { tag: 0 }));
    }

    #[test]
    fn test_missing_recession_defaults_to_unit() {
        let scenario = Scenario::from_str(&scenario_json()).unwrap();
        assert!(!scenario.recession.is_anisotropic());
        assert_eq!(scenario.recession.max_rate(), 1.0);
    }

    #[test]
    fn test_anisotropic_recession_detected() {
        let json = scenario_json().replace(
            r#""triangle": [1, 0, 0, 2]"#,
            r#""triangle": [1, 0, 0, 2],
               "recession": [[1,1,1,0,0,0],[1,1,1,0,0,0],[2,1,1,0,0,90],[1,1,1,0,0,0]]"#,
        );
        let scenario = Scenario::from_str(&json).unwrap();
        assert!(scenario.recession.is_anisotropic());
        assert_eq!(scenario.recession.max_rate(), 2.0);
    }

    #[test]
    fn test_recession_length_mismatch_rejected() {
        let json = scenario_json().replace(
            r#""triangle": [1, 0, 0, 2]"#,
            r#""triangle": [1, 0, 0, 2], "recession": [1.0, 1.0]"#,
        );
        let err = Scenario::from_str(&json).unwrap_err();
        assert!(matches!(
            err,
            LoadError::RecessionLength {
                expected: 4,
                found: 2
            }
        ));
    }

    #[test]
    fn test_degenerate_tetrahedron_rejected() {
        let json = scenario_json().replace("[0,0,1]", "[1,1,0]");
        let err = Scenario::from_str(&json).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Mesh(MeshError::DegenerateTetrahedron { tetrahedron: 0 })
        ));
    }
}
