//! Minimal OBJ parser: positions, normals, triangulated faces.
//! Texture coordinates are accepted in the input but not retained; the viewer
//! renders untextured. Meshes without normals get smooth vertex normals
//! computed from face geometry so lighting still works.

use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::error::{AssetError, Result};
use crate::mesh::{MeshData, MeshVertex};

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> Result<MeshData> {
    let path = path.as_ref();
    log::info!("Loading OBJ model from {}", path.display());
    let file = File::open(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mesh = load_obj_from_reader(BufReader::new(file))?;
    log::info!(
        "Loaded {}: {} vertices, {} triangles",
        path.display(),
        mesh.vertices.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Load an OBJ mesh from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> Result<MeshData> {
    parse_obj(reader)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> Result<MeshData> {
    parse_obj(io::Cursor::new(contents))
}

fn parse_obj<R: BufRead>(reader: R) -> Result<MeshData> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();

    // Dedup key: position index + optional normal index.
    let mut unique: HashMap<(usize, Option<usize>), u32> = HashMap::new();
    let mut vertices: Vec<MeshVertex> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line.map_err(|source| AssetError::Read {
            line: line_no,
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else { continue };

        match tag {
            "v" => {
                positions.push(parse_vec3(&mut parts, line_no, "vertex position")?);
            }
            "vn" => {
                normals.push(parse_vec3(&mut parts, line_no, "vertex normal")?);
            }
            "f" => {
                let mut face: Vec<u32> = Vec::new();
                for token in parts {
                    let (pos_idx, norm_idx) =
                        parse_face_vertex(token, positions.len(), normals.len(), line_no)?;
                    let key = (pos_idx, norm_idx);
                    let index = match unique.get(&key) {
                        Some(&idx) => idx,
                        None => {
                            let position = positions[pos_idx];
                            let normal = norm_idx.map(|i| normals[i]).unwrap_or([0.0; 3]);
                            let idx = u32::try_from(vertices.len()).map_err(|_| {
                                AssetError::Parse {
                                    line: line_no,
                                    message: format!("too many vertices (>{})", u32::MAX),
                                }
                            })?;
                            vertices.push(MeshVertex::new(position, normal));
                            unique.insert(key, idx);
                            idx
                        }
                    };
                    face.push(index);
                }

                if face.len() < 3 {
                    return Err(AssetError::Parse {
                        line: line_no,
                        message: format!("face with {} vertices", face.len()),
                    });
                }
                // Triangulate fan.
                for tri in 1..(face.len() - 1) {
                    indices.push(face[0]);
                    indices.push(face[tri]);
                    indices.push(face[tri + 1]);
                }
            }
            // vt/o/g/s/usemtl/mtllib and friends are ignored.
            _ => {}
        }
    }

    if vertices.is_empty() || indices.is_empty() {
        return Err(AssetError::Empty);
    }

    if normals.is_empty() {
        compute_smooth_normals(&mut vertices, &indices);
    }

    Ok(MeshData::new(vertices, indices))
}

fn parse_vec3<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    line_no: usize,
    what: &str,
) -> Result<[f32; 3]> {
    let mut out = [0.0f32; 3];
    for slot in &mut out {
        let token = parts.next().ok_or_else(|| AssetError::Parse {
            line: line_no,
            message: format!("missing component in {what}"),
        })?;
        *slot = token.parse::<f32>().map_err(|_| AssetError::Parse {
            line: line_no,
            message: format!("invalid number '{token}' in {what}"),
        })?;
    }
    Ok(out)
}

/// Parse one `f` element: `v`, `v/vt`, `v//vn` or `v/vt/vn`.
/// The texture-coordinate slot is skipped.
fn parse_face_vertex(
    token: &str,
    pos_count: usize,
    norm_count: usize,
    line_no: usize,
) -> Result<(usize, Option<usize>)> {
    let mut split = token.split('/');
    let pos = split.next().unwrap_or_default();
    let pos_idx = resolve_index(pos, pos_count, line_no)?;

    let _texcoord = split.next();

    let norm_idx = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(value, norm_count, line_no)?),
        _ => None,
    };

    Ok((pos_idx, norm_idx))
}

/// Resolve a 1-based (or negative, from-the-end) OBJ index.
fn resolve_index(token: &str, len: usize, line_no: usize) -> Result<usize> {
    let raw = token.parse::<i64>().map_err(|_| AssetError::Parse {
        line: line_no,
        message: format!("invalid index '{token}'"),
    })?;
    if raw == 0 {
        return Err(AssetError::Parse {
            line: line_no,
            message: "OBJ indices are 1-based; found 0".into(),
        });
    }

    let idx = if raw > 0 {
        raw - 1
    } else {
        len as i64 + raw
    };

    if idx < 0 || idx as usize >= len {
        return Err(AssetError::Parse {
            line: line_no,
            message: format!("index {raw} out of bounds (len={len})"),
        });
    }
    Ok(idx as usize)
}

/// Area-weighted vertex normals from triangle cross products.
fn compute_smooth_normals(vertices: &mut [MeshVertex], indices: &[u32]) {
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let p0 = vertices[a].position;
        let p1 = vertices[b].position;
        let p2 = vertices[c].position;
        let e1 = [p1[0] - p0[0], p1[1] - p0[1], p1[2] - p0[2]];
        let e2 = [p2[0] - p0[0], p2[1] - p0[1], p2[2] - p0[2]];
        let n = [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ];
        for &i in &[a, b, c] {
            for axis in 0..3 {
                vertices[i].normal[axis] += n[axis];
            }
        }
    }
    for v in vertices {
        let len = (v.normal[0] * v.normal[0] + v.normal[1] * v.normal[1]
            + v.normal[2] * v.normal[2])
            .sqrt();
        if len > 1e-12 {
            for axis in 0..3 {
                v.normal[axis] /= len;
            }
        } else {
            v.normal = [0.0, 0.0, 1.0];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_triangle() {
        let src = r#"
            v 0.0 0.0 0.0
            v 1.0 0.0 0.0
            v 0.0 1.0 0.0
            vn 0.0 0.0 1.0
            vt 0.0 0.0
            f 1/1/1 2/1/1 3/1/1
        "#;
        let mesh = load_obj_from_str(src).expect("parse triangle");
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices.len(), 3);
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
        assert!(mesh.is_valid());
    }

    #[test]
    fn quad_triangulates_to_two_triangles() {
        let src = r#"
            v 0 0 0
            v 1 0 0
            v 1 1 0
            v 0 1 0
            f 1 2 3 4
        "#;
        let mesh = load_obj_from_str(src).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn negative_indices_resolve_from_the_end() {
        let src = r#"
            v 0 0 0
            v 1 0 0
            v 0 1 0
            f -3 -2 -1
        "#;
        let mesh = load_obj_from_str(src).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn missing_normals_are_computed() {
        // CCW triangle in the z=0 plane faces +Z.
        let src = r#"
            v 0 0 0
            v 1 0 0
            v 0 1 0
            f 1 2 3
        "#;
        let mesh = load_obj_from_str(src).unwrap();
        for v in &mesh.vertices {
            assert!((v.normal[2] - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn zero_index_is_a_parse_error() {
        let err = load_obj_from_str("v 0 0 0\nf 0 1 1").unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 2, .. }));
    }

    #[test]
    fn out_of_bounds_index_is_a_parse_error() {
        let err = load_obj_from_str("v 0 0 0\nf 1 2 3").unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 2, .. }));
    }

    #[test]
    fn bad_float_reports_line_number() {
        let err = load_obj_from_str("v 0 0 0\nv 1 oops 0").unwrap_err();
        match err {
            AssetError::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("oops"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(load_obj_from_str("").unwrap_err(), AssetError::Empty));
        assert!(matches!(
            load_obj_from_str("# only comments\n").unwrap_err(),
            AssetError::Empty
        ));
    }

    #[test]
    fn unknown_directives_are_ignored() {
        let src = r#"
            mtllib scene.mtl
            o Cube
            v 0 0 0
            v 1 0 0
            v 0 1 0
            usemtl body
            s off
            f 1 2 3
        "#;
        assert!(load_obj_from_str(src).is_ok());
    }

    #[test]
    fn shared_corners_are_deduplicated() {
        let src = r#"
            v 0 0 0
            v 1 0 0
            v 1 1 0
            v 0 1 0
            f 1 2 3
            f 1 3 4
        "#;
        let mesh = load_obj_from_str(src).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
    }
}
