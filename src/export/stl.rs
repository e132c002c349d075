//! STL output for terrain solids.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geom::{Point3, TerrainMesh, Triangle, triangle_normal};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StlFormat {
    #[default]
    Binary,
    Ascii,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write STL: {0}")]
    Io(#[from] io::Error),
    #[error("binary STL holds at most {} facets, mesh has {0}", u32::MAX)]
    TooManyFacets(usize),
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),
}

fn facet_normal(tri: &Triangle) -> [f64; 3] {
    let [a, b, c] = (*tri).map(Point3::from_array);
    triangle_normal(a, b, c).map_or([0.0; 3], |n| n.to_array())
}

/// Encode `mesh` as binary STL.
///
/// `name` fills the 80-byte header and is truncated if longer.
pub fn binary_stl_bytes(mesh: &TerrainMesh, name: &str) -> Result<Vec<u8>, ExportError> {
    let mut out = Vec::with_capacity(HEADER_LEN + 4 + mesh.triangle_count() * FACET_LEN);
    write_binary_stl(&mut out, mesh, name)?;
    Ok(out)
}

#[allow(clippy::cast_possible_truncation)]
pub fn write_binary_stl<W: Write>(
    mut writer: W,
    mesh: &TerrainMesh,
    name: &str,
) -> Result<(), ExportError> {
    let count = u32::try_from(mesh.triangle_count())
        .map_err(|_| ExportError::TooManyFacets(mesh.triangle_count()))?;

    let mut header = [0u8; HEADER_LEN];
    let name_bytes = name.as_bytes();
    let copy_n = name_bytes.len().min(HEADER_LEN);
    header[..copy_n].copy_from_slice(&name_bytes[..copy_n]);
    writer.write_all(&header)?;
    writer.write_all(&count.to_le_bytes())?;

    for tri in mesh.triangles() {
        let mut facet = [0u8; FACET_LEN];
        let values = std::iter::once(facet_normal(&tri)).chain(tri).flatten();
        for (chunk, value) in facet.chunks_exact_mut(4).zip(values) {
            chunk.copy_from_slice(&(value as f32).to_le_bytes());
        }
        // Trailing attribute byte count stays zero.
        writer.write_all(&facet)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_ascii_stl<W: Write>(
    mut writer: W,
    mesh: &TerrainMesh,
    name: &str,
) -> Result<(), ExportError> {
    let name = name.split_whitespace().next().unwrap_or("terrain");
    writeln!(writer, "solid {name}")?;
    for tri in mesh.triangles() {
        let [nx, ny, nz] = facet_normal(&tri);
        writeln!(writer, "  facet normal {nx:e} {ny:e} {nz:e}")?;
        writeln!(writer, "    outer loop")?;
        for [x, y, z] in tri {
            writeln!(writer, "      vertex {x:e} {y:e} {z:e}")?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {name}")?;
    writer.flush()?;
    Ok(())
}

/// Write `mesh` to `path`, refusing to replace an existing file unless
/// `overwrite` is set.
pub fn export_stl(
    path: &Path,
    mesh: &TerrainMesh,
    format: StlFormat,
    overwrite: bool,
) -> Result<(), ExportError> {
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("terrain");
    let writer = BufWriter::new(open_output(path, overwrite)?);
    match format {
        StlFormat::Binary => write_binary_stl(writer, mesh, name)?,
        StlFormat::Ascii => write_ascii_stl(writer, mesh, name)?,
    }

    log::info!(
        "wrote {} facets to {}",
        mesh.triangle_count(),
        path.display()
    );
    Ok(())
}

/// Write the two halves of a split mesh next to `path`, as
/// `<stem>_a.<ext>` and `<stem>_b.<ext>`.
pub fn export_split_stl(
    path: &Path,
    below: &TerrainMesh,
    above: &TerrainMesh,
    format: StlFormat,
    overwrite: bool,
) -> Result<(PathBuf, PathBuf), ExportError> {
    let (path_a, path_b) = split_paths(path);
    export_stl(&path_a, below, format, overwrite)?;
    export_stl(&path_b, above, format, overwrite)?;
    Ok((path_a, path_b))
}

/// `out/model.stl` becomes `out/model_a.stl` and `out/model_b.stl`.
#[must_use]
pub fn split_paths(path: &Path) -> (PathBuf, PathBuf) {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("terrain");
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("stl");
    (
        path.with_file_name(format!("{stem}_a.{ext}")),
        path.with_file_name(format!("{stem}_b.{ext}")),
    )
}

fn open_output(path: &Path, overwrite: bool) -> Result<File, ExportError> {
    OpenOptions::new()
        .write(true)
        .truncate(overwrite)
        .create(overwrite)
        .create_new(!overwrite)
        .open(path)
        .map_err(|err| match err.kind() {
            io::ErrorKind::AlreadyExists => ExportError::AlreadyExists(path.to_path_buf()),
            _ => ExportError::Io(err),
        })
}
