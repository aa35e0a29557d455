//! STL mesh decoding.

use std::collections::HashMap;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use glam::Vec3;

use rv_scene::MeshData;

use crate::model::{MeshProvider, ModelError};

/// Decodes STL files into indexed mesh data.
pub struct StlMeshProvider;

impl MeshProvider for StlMeshProvider {
    fn load(&self, path: &Path) -> Result<MeshData, ModelError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if extension != "stl" {
            return Err(ModelError::UnsupportedMeshFormat(
                path.to_string_lossy().to_string(),
            ));
        }

        let file = std::fs::File::open(path).map_err(|e| ModelError::MeshLoad {
            path: path.to_string_lossy().to_string(),
            reason: e.to_string(),
        })?;
        let mut reader = BufReader::new(file);

        decode_stl(&mut reader).map_err(|e| match e {
            ModelError::Parse(reason) => ModelError::MeshLoad {
                path: path.to_string_lossy().to_string(),
                reason,
            },
            other => other,
        })
    }
}

/// Decodes STL data from a reader into an indexed mesh with smoothed
/// per-vertex normals.
pub fn decode_stl(reader: &mut (impl Read + Seek)) -> Result<MeshData, ModelError> {
    let mesh = stl_io::read_stl(reader).map_err(|e| ModelError::Parse(e.to_string()))?;

    // Quantization precision for vertex deduplication.
    const PRECISION: f32 = 10000.0;

    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normal_sums: Vec<Vec3> = Vec::new();
    let mut vertex_map: HashMap<[i32; 3], u32> = HashMap::new();
    let mut indices: Vec<u32> = Vec::new();

    for face in &mesh.faces {
        let face_normal = Vec3::new(face.normal[0], face.normal[1], face.normal[2]);

        for &vertex_idx in &face.vertices {
            let vertex = mesh.vertices[vertex_idx];
            let v = [vertex[0], vertex[1], vertex[2]];

            let key = [
                (v[0] * PRECISION) as i32,
                (v[1] * PRECISION) as i32,
                (v[2] * PRECISION) as i32,
            ];

            let index = if let Some(&existing) = vertex_map.get(&key) {
                existing
            } else {
                let new_index = positions.len() as u32;
                positions.push(v);
                normal_sums.push(Vec3::ZERO);
                vertex_map.insert(key, new_index);
                new_index
            };

            normal_sums[index as usize] += face_normal;
            indices.push(index);
        }
    }

    let normals: Vec<[f32; 3]> = normal_sums
        .into_iter()
        .map(|sum| {
            let n = sum.normalize_or_zero();
            if n == Vec3::ZERO {
                [0.0, 0.0, 1.0]
            } else {
                [n.x, n.y, n.z]
            }
        })
        .collect();

    Ok(MeshData::new(positions, normals, indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode(triangles: &[stl_io::Triangle]) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        stl_io::write_stl(&mut buffer, triangles.iter()).unwrap();
        buffer.into_inner()
    }

    fn quad() -> Vec<stl_io::Triangle> {
        let normal = stl_io::Normal::new([0.0, 0.0, 1.0]);
        vec![
            stl_io::Triangle {
                normal,
                vertices: [
                    stl_io::Vertex::new([0.0, 0.0, 0.0]),
                    stl_io::Vertex::new([1.0, 0.0, 0.0]),
                    stl_io::Vertex::new([1.0, 1.0, 0.0]),
                ],
            },
            stl_io::Triangle {
                normal,
                vertices: [
                    stl_io::Vertex::new([0.0, 0.0, 0.0]),
                    stl_io::Vertex::new([1.0, 1.0, 0.0]),
                    stl_io::Vertex::new([0.0, 1.0, 0.0]),
                ],
            },
        ]
    }

    #[test]
    fn decode_dedups_shared_vertices() {
        let bytes = encode(&quad());
        let mesh = decode_stl(&mut Cursor::new(bytes)).unwrap();

        // Two triangles sharing an edge: 4 unique vertices, 6 indices.
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        assert_eq!(mesh.normals.len(), 4);
        for n in &mesh.normals {
            assert!((Vec3::from(*n) - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn decode_rejects_garbage() {
        let mut data = Cursor::new(vec![0u8; 10]);
        assert!(decode_stl(&mut data).is_err());
    }

    #[test]
    fn provider_rejects_non_stl_extension() {
        let result = StlMeshProvider.load(Path::new("mesh.dae"));
        assert!(matches!(result, Err(ModelError::UnsupportedMeshFormat(_))));
    }

    #[test]
    fn provider_reports_missing_file() {
        let result = StlMeshProvider.load(Path::new("/nonexistent/mesh.stl"));
        assert!(matches!(result, Err(ModelError::MeshLoad { .. })));
    }
}
