use super::figure::{Axes3d, ViewAngles};

/// Orthographic camera for drawing 3-D axes on a 2-D plot.
///
/// Each data axis is first scaled into `[-0.5, 0.5]`, like matplotlib's
/// cube-shaped 3-D box, then rotated so the eye sits at
/// `(cos e cos a, cos e sin a, sin e)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    min: [f64; 3],
    span: [f64; 3],
    right: [f64; 3],
    up: [f64; 3],
    eye: [f64; 3],
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

impl Projector {
    pub fn fit<'a>(points: impl IntoIterator<Item = &'a [f64; 3]>, view: ViewAngles) -> Self {
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        for p in points {
            for k in 0..3 {
                min[k] = min[k].min(p[k]);
                max[k] = max[k].max(p[k]);
            }
        }
        let mut span = [0.0; 3];
        for k in 0..3 {
            if min[k].is_finite() && max[k].is_finite() {
                span[k] = max[k] - min[k];
            } else {
                min[k] = 0.0;
            }
        }

        let (se, ce) = view.elevation.to_radians().sin_cos();
        let (sa, ca) = view.azimuth.to_radians().sin_cos();
        Self {
            min,
            span,
            right: [-sa, ca, 0.0],
            up: [-se * ca, -se * sa, ce],
            eye: [ce * ca, ce * sa, se],
        }
    }

    pub fn for_axes(axes: &Axes3d) -> Self {
        Self::fit(axes.series.iter().flat_map(|s| s.points.iter()), axes.view)
    }

    /// Data coordinates scaled into the unit cube centred on the origin.
    fn normalize(&self, p: [f64; 3]) -> [f64; 3] {
        let mut out = [0.0; 3];
        for k in 0..3 {
            out[k] = if self.span[k] > 0.0 {
                (p[k] - self.min[k]) / self.span[k] - 0.5
            } else {
                0.0
            };
        }
        out
    }

    /// Screen position of a data point.
    pub fn project(&self, p: [f64; 3]) -> [f64; 2] {
        let n = self.normalize(p);
        [dot(n, self.right), dot(n, self.up)]
    }

    /// Distance towards the viewer; larger values are drawn on top.
    pub fn depth(&self, p: [f64; 3]) -> f64 {
        dot(self.normalize(p), self.eye)
    }

    /// Screen position of a unit-cube corner given as `±0.5` per axis.
    fn corner(&self, c: [f64; 3]) -> [f64; 2] {
        [dot(c, self.right), dot(c, self.up)]
    }

    /// The 12 edges of the bounding box, projected.
    pub fn box_edges(&self) -> Vec<[[f64; 2]; 2]> {
        let mut edges = Vec::with_capacity(12);
        for axis in 0..3 {
            let (a, b) = ((axis + 1) % 3, (axis + 2) % 3);
            for &sa in &[-0.5, 0.5] {
                for &sb in &[-0.5, 0.5] {
                    let mut lo = [0.0; 3];
                    lo[axis] = -0.5;
                    lo[a] = sa;
                    lo[b] = sb;
                    let mut hi = lo;
                    hi[axis] = 0.5;
                    edges.push([self.corner(lo), self.corner(hi)]);
                }
            }
        }
        edges
    }

    /// Where to write the label of `axis`: the middle of the box edge along
    /// that axis that lies furthest from the viewer, pushed out by `pad`.
    pub fn label_anchor(&self, axis: usize, pad: f64) -> [f64; 2] {
        let (a, b) = ((axis + 1) % 3, (axis + 2) % 3);
        let mut mid = [0.0; 3];
        // Pick the low/high side of the two other axes facing away from the eye,
        // except for the vertical axis which sits on the outside.
        mid[a] = if self.eye[a] >= 0.0 { -0.5 } else { 0.5 };
        mid[b] = if self.eye[b] >= 0.0 { -0.5 } else { 0.5 };
        if axis == 2 {
            mid[a] = -mid[a];
        }
        let [u, v] = self.corner(mid);
        let len = (u * u + v * v).sqrt();
        if len > 0.0 {
            [u * (1.0 + pad / len), v * (1.0 + pad / len)]
        } else {
            [u, v - pad]
        }
    }
}
