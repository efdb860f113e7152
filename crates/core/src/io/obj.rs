//! Text mesh export of extracted surfaces.
//!
//! The format is OBJ-style: `v x y z` vertex lines followed by 1-based
//! `f i j k` faces. Isocontour surfaces swap the y and z coordinates on
//! output to match the axis convention of the downstream viewer.

use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core_types::Mesh;
use crate::isosurface::IsosurfaceMesh;

/// Write an isocontour surface.
pub fn write_isosurface(path: impl AsRef<Path>, surface: &IsosurfaceMesh) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut out = BufWriter::new(file);
    writeln!(out, "# isocontour surface")?;
    for node in &surface.nodes {
        // y and z swapped for the viewer's up-axis.
        writeln!(out, "v {} {} {}", node.x, node.z, node.y)?;
    }
    for triangle in &surface.triangles {
        writeln!(
            out,
            "f {} {} {}",
            triangle[0] + 1,
            triangle[1] + 1,
            triangle[2] + 1
        )?;
    }
    out.flush()
}

/// Write the mesh's boundary triangles as a surface.
pub fn write_boundary_surface(path: impl AsRef<Path>, mesh: &Mesh) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut out = BufWriter::new(file);
    writeln!(out, "# boundary")?;
    for node in &mesh.nodes {
        writeln!(out, "v {} {} {}", node.x, node.y, node.z)?;
    }
    for triangle in &mesh.triangles {
        writeln!(
            out,
            "f {} {} {}",
            triangle[0] + 1,
            triangle[1] + 1,
            triangle[2] + 1
        )?;
    }
    out.flush()
}
