//! Mesh file loaders.
//!
//! Two formats are supported: Wavefront OBJ (positions and faces only) and
//! the G3DM binary container. Both produce a flat list of [`Triangle`]s;
//! everything beyond "a list of triangles" (materials, textures embedded in
//! the file) is ignored in favor of the material passed by the caller.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use candela_math::{dvec3, DVec3};
use thiserror::Error;

use crate::material::Material;
use crate::shape::Triangle;

const G3DM_MAGIC: [u8; 4] = *b"G3DM";

/// Size of one binary vertex: position, texture, normal and color, each
/// three little-endian f32s.
const G3DM_VERTEX_FLOATS: usize = 12;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("bad magic, expected \"G3DM\"")]
    BadMagic,
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("vertex index {index} out of range ({count} vertices)")]
    IndexOutOfRange { index: usize, count: usize },
}

impl MeshError {
    fn parse(line: usize, message: impl Into<String>) -> Self {
        MeshError::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Load a Wavefront OBJ file.
///
/// Only `v` and `f` records are interpreted; faces with more than three
/// vertices are fan-triangulated. With `smooth` set, per-vertex normals are
/// accumulated from adjacent face normals and interpolated at shading time.
pub fn load_obj<P: AsRef<Path>>(
    path: P,
    material: Material,
    smooth: bool,
) -> Result<Vec<Triangle>, MeshError> {
    read_obj(BufReader::new(File::open(path)?), material, smooth)
}

pub fn read_obj<R: BufRead>(
    reader: R,
    material: Material,
    smooth: bool,
) -> Result<Vec<Triangle>, MeshError> {
    let mut positions: Vec<DVec3> = Vec::new();
    let mut faces: Vec<[usize; 3]> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line?;
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("v") => {
                let mut coord = |axis: &str| -> Result<f64, MeshError> {
                    fields
                        .next()
                        .ok_or_else(|| MeshError::parse(line_no, format!("missing {axis} coordinate")))?
                        .parse()
                        .map_err(|_| MeshError::parse(line_no, format!("bad {axis} coordinate")))
                };
                let x = coord("x")?;
                let y = coord("y")?;
                let z = coord("z")?;
                positions.push(dvec3(x, y, z));
            }
            Some("f") => {
                let indices = fields
                    .map(|field| parse_face_index(field, positions.len(), line_no))
                    .collect::<Result<Vec<_>, _>>()?;
                if indices.len() < 3 {
                    return Err(MeshError::parse(line_no, "face with fewer than 3 vertices"));
                }
                for i in 1..indices.len() - 1 {
                    faces.push([indices[0], indices[i], indices[i + 1]]);
                }
            }
            // Comments, normals, texture coordinates, groups: skipped.
            _ => {}
        }
    }

    let normals = smooth.then(|| accumulate_normals(&positions, &faces));
    Ok(build_triangles(&positions, &faces, normals.as_deref(), material))
}

/// A face field is `i`, `i/t`, `i//n` or `i/t/n`; only the position index
/// is used. OBJ indices are 1-based, negative values count from the end.
fn parse_face_index(field: &str, count: usize, line_no: usize) -> Result<usize, MeshError> {
    let head = field.split('/').next().unwrap_or(field);
    let raw: i64 = head
        .parse()
        .map_err(|_| MeshError::parse(line_no, format!("bad face index {field:?}")))?;
    let index = if raw < 0 {
        count as i64 + raw
    } else {
        raw - 1
    };
    if index < 0 || index as usize >= count {
        return Err(MeshError::IndexOutOfRange {
            index: raw.unsigned_abs() as usize,
            count,
        });
    }
    Ok(index as usize)
}

fn accumulate_normals(positions: &[DVec3], faces: &[[usize; 3]]) -> Vec<DVec3> {
    let mut normals = vec![DVec3::ZERO; positions.len()];
    for &[a, b, c] in faces {
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    for n in &mut normals {
        *n = n.normalize_or_zero();
    }
    normals
}

fn build_triangles(
    positions: &[DVec3],
    faces: &[[usize; 3]],
    normals: Option<&[DVec3]>,
    material: Material,
) -> Vec<Triangle> {
    faces
        .iter()
        .map(|&[a, b, c]| match normals {
            Some(n) => Triangle::smooth(
                positions[a],
                positions[b],
                positions[c],
                [n[a], n[b], n[c]],
                material,
            ),
            None => Triangle::new(positions[a], positions[b], positions[c], material),
        })
        .collect()
}

/// Load a G3DM binary mesh.
///
/// Layout: magic, then primitive/material/texture counts; per primitive a
/// vertex count, index count and material slot, followed by the vertex and
/// index blocks. Material and texture payloads are skipped.
pub fn load_ctm<P: AsRef<Path>>(path: P, material: Material) -> Result<Vec<Triangle>, MeshError> {
    read_g3dm(BufReader::new(File::open(path)?), material)
}

pub fn read_g3dm<R: Read>(mut reader: R, material: Material) -> Result<Vec<Triangle>, MeshError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != G3DM_MAGIC {
        return Err(MeshError::BadMagic);
    }

    let prim_count = reader.read_u32::<LittleEndian>()?;
    let _material_count = reader.read_u32::<LittleEndian>()?;
    let _texture_count = reader.read_u32::<LittleEndian>()?;

    let mut tris = Vec::new();
    for _ in 0..prim_count {
        let vertex_count = reader.read_u32::<LittleEndian>()? as usize;
        let index_count = reader.read_u32::<LittleEndian>()? as usize;
        let _material_slot = reader.read_u32::<LittleEndian>()?;

        let mut positions = Vec::with_capacity(vertex_count);
        for _ in 0..vertex_count {
            let mut v = [0f32; G3DM_VERTEX_FLOATS];
            reader.read_f32_into::<LittleEndian>(&mut v)?;
            // Position is the first triple; texture, normal and color
            // triples follow and are unused here.
            positions.push(dvec3(v[0] as f64, v[1] as f64, v[2] as f64));
        }

        let mut indices = Vec::with_capacity(index_count);
        for _ in 0..index_count {
            let i = reader.read_u32::<LittleEndian>()? as usize;
            if i >= positions.len() {
                return Err(MeshError::IndexOutOfRange {
                    index: i,
                    count: positions.len(),
                });
            }
            indices.push(i);
        }

        for tri in indices.chunks_exact(3) {
            tris.push(Triangle::new(
                positions[tri[0]],
                positions[tri[1]],
                positions[tri[2]],
                material,
            ));
        }
    }
    Ok(tris)
}
