//! Results export: merge solver output back into the scenario document.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde_json::{json, Value};
use tracing::info;

use crate::core_types::{Boundary, BoundaryKind};
use crate::solver::{RecessionField, SimulationContext};

/// Failures while writing result or update documents.
#[derive(Debug)]
pub enum WriteError {
    /// The target file could not be written.
    Io(std::io::Error),
    /// The origin document could not be parsed; when writing results a
    /// file containing only the results section is produced instead.
    OriginUnreadable(String),
}

impl std::fmt::Display for WriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteError::Io(cause) => write!(f, "Unable to write JSON file: {cause}"),
            WriteError::OriginUnreadable(cause) => write!(
                f,
                "Unable to parse JSON file. Invalid JSON file? ({cause})\nA file with only results is created."
            ),
        }
    }
}

impl std::error::Error for WriteError {}

fn vectors_json(vectors: &[crate::core_types::Vec3]) -> Value {
    Value::from(
        vectors
            .iter()
            .map(|v| vec![v.x, v.y, v.z])
            .collect::<Vec<_>>(),
    )
}

/// Solver output as a JSON object: the scalar field, the node-averaged
/// gradient, both flux channels, the time step and total, and the residual
/// history.
pub fn results_json(context: &SimulationContext) -> Value {
    json!({
        "uVertex": context.data.u_vertex,
        "duVertex": vectors_json(&context.data.vertex_gradient),
        "fluxes": [context.data.flux_hamiltonian, context.data.flux_diffusive],
        "timeStep": context.time_step,
        "timeTotal": context.time_total,
        "errorIter": context.error_iter,
    })
}

fn write_document(path: &Path, document: &Value, pretty: bool) -> Result<(), WriteError> {
    let contents = if pretty {
        serde_json::to_string_pretty(document)
    } else {
        serde_json::to_string(document)
    }
    .expect("JSON values always serialize");
    std::fs::write(path, contents).map_err(WriteError::Io)
}

/// Write the results merged into the scenario's original document as a
/// `burnbackResults` section.
///
/// If the origin document is unusable, a file holding only the results
/// section is written and the error reported, so partial output survives a
/// corrupted input.
pub fn write_results(
    path: impl AsRef<Path>,
    origin: &Value,
    context: &SimulationContext,
    pretty: bool,
) -> Result<(), WriteError> {
    let path = path.as_ref();
    let results = results_json(context);
    match origin {
        Value::Object(_) => {
            let mut document = origin.clone();
            document["burnbackResults"] = results;
            write_document(path, &document, pretty)?;
            info!(path = %path.display(), "results written");
            Ok(())
        }
        other => {
            write_document(path, &json!({ "burnbackResults": results }), pretty)?;
            Err(WriteError::OriginUnreadable(format!(
                "expected an object, found {other}"
            )))
        }
    }
}

/// Boundary table as the document's `conditions.boundary` list.
pub fn boundaries_json(boundaries: &FxHashMap<u32, Boundary>) -> Value {
    let mut tags: Vec<_> = boundaries.keys().copied().collect();
    tags.sort_unstable();
    Value::from(
        tags.into_iter()
            .map(|tag| {
                let boundary = &boundaries[&tag];
                let kind = match boundary.kind {
                    BoundaryKind::Inlet => "inlet",
                    BoundaryKind::Outlet => "outlet",
                    BoundaryKind::Symmetry => "symmetry",
                };
                json!({
                    "tag": tag,
                    "type": kind,
                    "value": boundary.value,
                    "description": boundary.description,
                })
            })
            .collect::<Vec<_>>(),
    )
}

/// Rewrite a scenario file with the current boundary table in
/// `conditions.boundary`. The rest of the document is preserved.
pub fn update_boundaries(
    path: impl AsRef<Path>,
    boundaries: &FxHashMap<u32, Boundary>,
    pretty: bool,
) -> Result<(), WriteError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(WriteError::Io)?;
    let mut document: Value =
        serde_json::from_str(&contents).map_err(|e| WriteError::OriginUnreadable(e.to_string()))?;
    document["conditions"]["boundary"] = boundaries_json(boundaries);
    write_document(path, &document, pretty)
}

/// Rewrite a scenario file with the current recession field in
/// `conditions.recession`, in whichever mode the field uses.
pub fn update_recessions(
    path: impl AsRef<Path>,
    recession: &RecessionField,
    pretty: bool,
) -> Result<(), WriteError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(WriteError::Io)?;
    let mut document: Value =
        serde_json::from_str(&contents).map_err(|e| WriteError::OriginUnreadable(e.to_string()))?;
    document["conditions"]["recession"] = match recession {
        RecessionField::Isotropic(rates) => json!(rates),
        RecessionField::Anisotropic { raw, .. } => json!(raw),
    };
    write_document(path, &document, pretty)
}
