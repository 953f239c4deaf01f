//! Scalar triangle rasterizer.
//!
//! Samples pixel centers and applies the top-left fill rule, the same coverage
//! rule GPUs use for single-sample rasterization: two triangles sharing an edge
//! never both cover a pixel whose center lies on that edge.

type P = (f64, f64);

#[inline]
fn edge(a: P, b: P, p: P) -> f64 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}

/// Top or left edge for a triangle with positive `edge` orientation in a
/// +Y-down framebuffer.
#[inline]
fn is_top_left(from: P, to: P) -> bool {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    (dy == 0.0 && dx > 0.0) || dy < 0.0
}

#[inline]
fn covers(w: f64, from: P, to: P) -> bool {
    w > 0.0 || (w == 0.0 && is_top_left(from, to))
}

/// Calls `emit(x, y)` for every pixel of a `width` x `height` framebuffer
/// whose center is covered by the triangle. Vertices are in framebuffer
/// coordinates. Degenerate and non-finite triangles cover nothing.
pub(crate) fn rasterize_triangle(
    tri: [P; 3],
    width: u32,
    height: u32,
    mut emit: impl FnMut(u32, u32),
) {
    if tri.iter().any(|v| !v.0.is_finite() || !v.1.is_finite()) {
        return;
    }

    let [a, mut b, mut c] = tri;
    let area = edge(a, b, c);
    if area == 0.0 {
        return;
    }
    if area < 0.0 {
        std::mem::swap(&mut b, &mut c);
    }

    let min_x = a.0.min(b.0).min(c.0).floor().max(0.0);
    let min_y = a.1.min(b.1).min(c.1).floor().max(0.0);
    let max_x = a.0.max(b.0).max(c.0).ceil().min(f64::from(width));
    let max_y = a.1.max(b.1).max(c.1).ceil().min(f64::from(height));
    if min_x >= max_x || min_y >= max_y {
        return;
    }

    for y in min_y as u32..max_y as u32 {
        let py = f64::from(y) + 0.5;
        for x in min_x as u32..max_x as u32 {
            let p = (f64::from(x) + 0.5, py);
            if covers(edge(b, c, p), b, c) && covers(edge(c, a, p), c, a) && covers(edge(a, b, p), a, b)
            {
                emit(x, y);
            }
        }
    }
}
