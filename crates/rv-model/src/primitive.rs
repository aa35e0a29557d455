//! Primitive mesh generation for box/cylinder/sphere geometry.

use rv_scene::MeshData;

/// Generates an axis-aligned box centered at the origin.
pub fn generate_box_mesh(size: [f32; 3]) -> MeshData {
    let [hx, hy, hz] = [size[0] * 0.5, size[1] * 0.5, size[2] * 0.5];

    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // +X
        (
            [1.0, 0.0, 0.0],
            [
                [hx, -hy, -hz],
                [hx, hy, -hz],
                [hx, hy, hz],
                [hx, -hy, hz],
            ],
        ),
        // -X
        (
            [-1.0, 0.0, 0.0],
            [
                [-hx, -hy, hz],
                [-hx, hy, hz],
                [-hx, hy, -hz],
                [-hx, -hy, -hz],
            ],
        ),
        // +Y
        (
            [0.0, 1.0, 0.0],
            [
                [-hx, hy, -hz],
                [-hx, hy, hz],
                [hx, hy, hz],
                [hx, hy, -hz],
            ],
        ),
        // -Y
        (
            [0.0, -1.0, 0.0],
            [
                [-hx, -hy, hz],
                [-hx, -hy, -hz],
                [hx, -hy, -hz],
                [hx, -hy, hz],
            ],
        ),
        // +Z
        (
            [0.0, 0.0, 1.0],
            [
                [-hx, -hy, hz],
                [hx, -hy, hz],
                [hx, hy, hz],
                [-hx, hy, hz],
            ],
        ),
        // -Z
        (
            [0.0, 0.0, -1.0],
            [
                [hx, -hy, -hz],
                [-hx, -hy, -hz],
                [-hx, hy, -hz],
                [hx, hy, -hz],
            ],
        ),
    ];

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, corners) in faces {
        let base = positions.len() as u32;
        for corner in corners {
            positions.push(corner);
            normals.push(normal);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData::new(positions, normals, indices)
}

/// Generates a cylinder along Z, centered at the origin.
pub fn generate_cylinder_mesh(radius: f32, length: f32) -> MeshData {
    const SEGMENTS: u32 = 32;
    let half = length * 0.5;

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut indices = Vec::new();

    // Side wall: two rings with outward normals.
    for i in 0..=SEGMENTS {
        let angle = i as f32 / SEGMENTS as f32 * std::f32::consts::TAU;
        let (sin, cos) = angle.sin_cos();
        let normal = [cos, sin, 0.0];
        positions.push([radius * cos, radius * sin, -half]);
        normals.push(normal);
        positions.push([radius * cos, radius * sin, half]);
        normals.push(normal);
    }
    for i in 0..SEGMENTS {
        let base = i * 2;
        indices.extend_from_slice(&[base, base + 2, base + 3, base, base + 3, base + 1]);
    }

    // Caps: a center vertex and a ring each.
    for (z, normal_z) in [(-half, -1.0f32), (half, 1.0)] {
        let center = positions.len() as u32;
        positions.push([0.0, 0.0, z]);
        normals.push([0.0, 0.0, normal_z]);
        for i in 0..=SEGMENTS {
            let angle = i as f32 / SEGMENTS as f32 * std::f32::consts::TAU;
            let (sin, cos) = angle.sin_cos();
            positions.push([radius * cos, radius * sin, z]);
            normals.push([0.0, 0.0, normal_z]);
        }
        for i in 0..SEGMENTS {
            let a = center + 1 + i;
            let b = center + 2 + i;
            if normal_z > 0.0 {
                indices.extend_from_slice(&[center, a, b]);
            } else {
                indices.extend_from_slice(&[center, b, a]);
            }
        }
    }

    MeshData::new(positions, normals, indices)
}

/// Generates a UV sphere centered at the origin.
pub fn generate_sphere_mesh(radius: f32) -> MeshData {
    const RINGS: u32 = 16;
    const SEGMENTS: u32 = 24;

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut indices = Vec::new();

    for ring in 0..=RINGS {
        let phi = ring as f32 / RINGS as f32 * std::f32::consts::PI;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for seg in 0..=SEGMENTS {
            let theta = seg as f32 / SEGMENTS as f32 * std::f32::consts::TAU;
            let (sin_theta, cos_theta) = theta.sin_cos();
            let n = [sin_phi * cos_theta, sin_phi * sin_theta, cos_phi];
            positions.push([radius * n[0], radius * n[1], radius * n[2]]);
            normals.push(n);
        }
    }

    for ring in 0..RINGS {
        for seg in 0..SEGMENTS {
            let a = ring * (SEGMENTS + 1) + seg;
            let b = a + SEGMENTS + 1;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    MeshData::new(positions, normals, indices)
}
