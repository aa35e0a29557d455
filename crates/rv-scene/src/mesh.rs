//! Mesh resource ownership.

use std::collections::HashMap;

use glam::Vec3;

use crate::bounds::BoundingBox;

/// Handle to a mesh stored in the [`MeshStore`].
///
/// Handles are lightweight and can be copied freely; the mesh data itself
/// lives in the store until explicitly released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MeshHandle(u64);

impl MeshHandle {
    /// Returns the raw handle value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Indexed triangle mesh data.
#[derive(Debug, Clone)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Per-vertex normals, parallel to `positions`.
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices.
    pub indices: Vec<u32>,
    /// Base color (RGBA).
    pub color: [f32; 4],
    /// Bounding box of the positions.
    pub bounds: BoundingBox,
}

impl MeshData {
    /// Creates mesh data, computing bounds from the positions.
    pub fn new(positions: Vec<[f32; 3]>, normals: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        let bounds = BoundingBox::from_points(positions.iter().map(|p| Vec3::from(*p)));
        Self {
            positions,
            normals,
            indices,
            color: [0.7, 0.7, 0.7, 1.0],
            bounds,
        }
    }

    /// Sets the base color.
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Owner of mesh resources, addressed by handle.
///
/// Disposing a scene subtree releases its handles back into the store so the
/// underlying data is dropped; a renderer backend would release GPU buffers
/// at the same point.
pub struct MeshStore {
    meshes: HashMap<MeshHandle, MeshData>,
    next_handle: u64,
}

impl MeshStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            meshes: HashMap::new(),
            next_handle: 1,
        }
    }

    /// Takes ownership of mesh data and returns its handle.
    pub fn insert(&mut self, data: MeshData) -> MeshHandle {
        let handle = MeshHandle(self.next_handle);
        self.next_handle += 1;
        self.meshes.insert(handle, data);
        handle
    }

    /// Gets a mesh by handle.
    pub fn get(&self, handle: MeshHandle) -> Option<&MeshData> {
        self.meshes.get(&handle)
    }

    /// Releases a mesh. The data is dropped when removed.
    pub fn remove(&mut self, handle: MeshHandle) -> Option<MeshData> {
        self.meshes.remove(&handle)
    }

    /// Returns true if the store holds a mesh for the handle.
    pub fn contains(&self, handle: MeshHandle) -> bool {
        self.meshes.contains_key(&handle)
    }

    /// Number of meshes currently owned.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Returns true if no meshes are owned.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Releases everything.
    pub fn clear(&mut self) {
        self.meshes.clear();
    }
}

impl Default for MeshStore {
    fn default() -> Self {
        Self::new()
    }
}
