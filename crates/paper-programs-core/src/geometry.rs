use nalgebra::{Point2, Vector2};

/// z-component of the 2D cross product.
#[inline]
pub fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Polar angle of `v` in radians, `(-π, π]`.
#[inline]
pub fn polar_angle(v: &Vector2<f64>) -> f64 {
    v.y.atan2(v.x)
}

/// `v` rescaled to length `amount`.
#[inline]
pub fn move_along_vector(amount: f64, v: &Vector2<f64>) -> Vector2<f64> {
    v * (amount / v.norm())
}

/// Move every quad corner `amount` towards both of its neighbours.
///
/// For a convex quad in TL, TR, BR, BL order this pulls the outline inwards.
pub fn shrink_quad(amount: f64, points: &[Point2<f64>; 4]) -> [Point2<f64>; 4] {
    std::array::from_fn(|i| {
        let point = points[i];
        let next = points[(i + 1) % 4];
        let prev = points[(i + 3) % 4];
        point + move_along_vector(amount, &(next - point)) + move_along_vector(amount, &(prev - point))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cross_sign_follows_turn_direction() {
        let right = Vector2::new(1.0, 0.0);
        let down = Vector2::new(0.0, 1.0);
        assert!(cross(&right, &down) > 0.0);
        assert!(cross(&down, &right) < 0.0);
        assert_eq!(cross(&right, &(right * 3.0)), 0.0);
    }

    #[test]
    fn shrink_moves_square_corners_inward() {
        let quad = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        let shrunk = shrink_quad(1.0, &quad);
        assert_abs_diff_eq!(shrunk[0].x, 1.0);
        assert_abs_diff_eq!(shrunk[0].y, 1.0);
        assert_abs_diff_eq!(shrunk[2].x, 9.0);
        assert_abs_diff_eq!(shrunk[2].y, 9.0);
        assert_abs_diff_eq!(shrunk[3].x, 1.0);
        assert_abs_diff_eq!(shrunk[3].y, 9.0);
    }
}
