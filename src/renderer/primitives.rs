use super::vertex::{v, Vertex};

/// Unit cube centered on the origin, four vertices per face so normals and
/// UVs stay flat.
pub fn cube_mesh() -> (Vec<Vertex>, Vec<u32>) {
    // (normal, four corners counter-clockwise seen from outside)
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // +X
        (
            [1.0, 0.0, 0.0],
            [
                [0.5, -0.5, -0.5],
                [0.5, 0.5, -0.5],
                [0.5, 0.5, 0.5],
                [0.5, -0.5, 0.5],
            ],
        ),
        // -X
        (
            [-1.0, 0.0, 0.0],
            [
                [-0.5, -0.5, 0.5],
                [-0.5, 0.5, 0.5],
                [-0.5, 0.5, -0.5],
                [-0.5, -0.5, -0.5],
            ],
        ),
        // +Y
        (
            [0.0, 1.0, 0.0],
            [
                [-0.5, 0.5, -0.5],
                [-0.5, 0.5, 0.5],
                [0.5, 0.5, 0.5],
                [0.5, 0.5, -0.5],
            ],
        ),
        // -Y
        (
            [0.0, -1.0, 0.0],
            [
                [-0.5, -0.5, 0.5],
                [-0.5, -0.5, -0.5],
                [0.5, -0.5, -0.5],
                [0.5, -0.5, 0.5],
            ],
        ),
        // +Z
        (
            [0.0, 0.0, 1.0],
            [
                [0.5, -0.5, 0.5],
                [0.5, 0.5, 0.5],
                [-0.5, 0.5, 0.5],
                [-0.5, -0.5, 0.5],
            ],
        ),
        // -Z
        (
            [0.0, 0.0, -1.0],
            [
                [-0.5, -0.5, -0.5],
                [-0.5, 0.5, -0.5],
                [0.5, 0.5, -0.5],
                [0.5, -0.5, -0.5],
            ],
        ),
    ];
    let uvs = [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];

    let verts = faces
        .iter()
        .flat_map(|(normal, corners)| {
            corners
                .iter()
                .zip(uvs.iter())
                .map(move |(pos, uv)| v(*pos, *normal, *uv))
        })
        .collect::<Vec<_>>();

    let idx = (0..6u32)
        .flat_map(|f| {
            let o = f * 4;
            [o, o + 1, o + 2, o, o + 2, o + 3]
        })
        .collect::<Vec<_>>();

    (verts, idx)
}

/// Two-triangle quad in the XY plane facing +Z, as a flat vertex list with no
/// index buffer.
pub fn quad_mesh() -> Vec<Vertex> {
    let n = [0.0, 0.0, 1.0];
    vec![
        v([-0.5, -0.5, 0.0], n, [0.0, 0.0]),
        v([0.5, -0.5, 0.0], n, [1.0, 0.0]),
        v([0.5, 0.5, 0.0], n, [1.0, 1.0]),
        v([-0.5, -0.5, 0.0], n, [0.0, 0.0]),
        v([0.5, 0.5, 0.0], n, [1.0, 1.0]),
        v([-0.5, 0.5, 0.0], n, [0.0, 1.0]),
    ]
}

/// RGBA checkerboard used as the fallback texture.
pub fn checkerboard(size: u32, cell: u32) -> image::RgbaImage {
    let cell = cell.max(1);
    image::RgbaImage::from_fn(size, size, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            image::Rgba([255, 0, 255, 255])
        } else {
            image::Rgba([20, 20, 20, 255])
        }
    })
}
