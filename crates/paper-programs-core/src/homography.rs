use nalgebra::{Matrix3, Point2, Vector3};

/// Planar projective transform acting on homogeneous 2D points.
///
/// No normalization is applied to `h`: the matrix returned by
/// [`Homography::adjugate`] is the inverse only up to scale, which is all a
/// homogeneous projection needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    /// Project a point, dividing by the homogeneous coordinate.
    ///
    /// A degenerate matrix yields NaN or infinite coordinates; nothing here
    /// checks for that.
    #[inline]
    pub fn apply(&self, p: Point2<f64>) -> Point2<f64> {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        let w = v[2];
        Point2::new(v[0] / w, v[1] / w)
    }

    /// Adjugate (transposed cofactor matrix). `H * adj(H) = det(H) * I`, so as
    /// a projective map it is the inverse of `H` whenever `det(H) != 0`.
    pub fn adjugate(&self) -> Self {
        let m = &self.h;
        Self::new(Matrix3::new(
            m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)],
            m[(0, 2)] * m[(2, 1)] - m[(0, 1)] * m[(2, 2)],
            m[(0, 1)] * m[(1, 2)] - m[(0, 2)] * m[(1, 1)],
            m[(1, 2)] * m[(2, 0)] - m[(1, 0)] * m[(2, 2)],
            m[(0, 0)] * m[(2, 2)] - m[(0, 2)] * m[(2, 0)],
            m[(0, 2)] * m[(1, 0)] - m[(0, 0)] * m[(1, 2)],
            m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)],
            m[(0, 1)] * m[(2, 0)] - m[(0, 0)] * m[(2, 1)],
            m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)],
        ))
    }
}

/// Homography taking the unit square onto `points`.
///
/// The unit square corners are matched in the order top-left `(0,0)`,
/// top-right `(1,0)`, bottom-right `(1,1)`, bottom-left `(0,1)`, i.e.
/// `points[k]` is the image of the k-th corner. Uses the closed-form square
/// to quad solve (Heckbert): a 2x2 system for the perspective terms `g, h`
/// followed by the affine terms.
///
/// Three collinear points make the 2x2 system singular; the result then
/// contains NaN/inf entries and so does every projected point.
pub fn forward_projection_for_points(points: &[Point2<f64>; 4]) -> Homography {
    let [p0, p1, p2, p3] = *points;

    let dx1 = p1.x - p2.x;
    let dx2 = p3.x - p2.x;
    let sum_x = p0.x - p1.x + p2.x - p3.x;
    let dy1 = p1.y - p2.y;
    let dy2 = p3.y - p2.y;
    let sum_y = p0.y - p1.y + p2.y - p3.y;

    let denominator = dx1 * dy2 - dx2 * dy1;
    let g = (sum_x * dy2 - dx2 * sum_y) / denominator;
    let h = (dx1 * sum_y - sum_x * dy1) / denominator;

    let a = p1.x - p0.x + g * p1.x;
    let b = p3.x - p0.x + h * p3.x;
    let c = p0.x;
    let d = p1.y - p0.y + g * p1.y;
    let e = p3.y - p0.y + h * p3.y;
    let f = p0.y;

    Homography::new(Matrix3::new(
        a, b, c, //
        d, e, f, //
        g, h, 1.0,
    ))
}

/// Free-function form of [`Homography::apply`].
#[inline]
pub fn project_point(p: Point2<f64>, h: &Homography) -> Point2<f64> {
    h.apply(p)
}
