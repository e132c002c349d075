/// Split every cell of a `width` × `height` row-major vertex grid into two
/// triangles, cutting each cell from `(i, j + 1)` to `(i + 1, j)`.
///
/// With rows running along +Y and columns along +X the triangles face +Z;
/// `flip` reverses every triangle so they face -Z. Indices are shifted by
/// `offset`. Grids with fewer than two nodes on either axis produce nothing.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn triangulate_grid(width: usize, height: usize, offset: u32, flip: bool) -> Vec<[u32; 3]> {
    if width < 2 || height < 2 {
        return Vec::new();
    }

    let mut faces = Vec::with_capacity((width - 1) * (height - 1) * 2);
    let stride = width;
    for i in 0..height - 1 {
        for j in 0..width - 1 {
            let i0 = offset + (i * stride + j) as u32;
            let i1 = offset + (i * stride + j + 1) as u32;
            let i2 = offset + ((i + 1) * stride + j) as u32;
            let i3 = offset + ((i + 1) * stride + j + 1) as u32;

            if flip {
                faces.push([i0, i2, i1]);
                faces.push([i1, i2, i3]);
            } else {
                faces.push([i0, i1, i2]);
                faces.push([i1, i3, i2]);
            }
        }
    }

    faces
}
