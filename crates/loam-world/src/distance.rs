use serde::{Deserialize, Serialize};

/// Pluggable sort metric over chunk offsets. Larger means farther.
pub type DistanceFn = Box<dyn Fn(i32, i32, i32) -> i64 + Send + Sync>;

#[inline]
pub fn squared_euclidean(dx: i32, dy: i32, dz: i32) -> i64 {
    let (dx, dy, dz) = (i64::from(dx), i64::from(dy), i64::from(dz));
    dx * dx + dy * dy + dz * dz
}

/// Axis-aligned ellipsoid in chunk units: `horizontal` radius on x/z,
/// `vertical` radius on y.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ellipsoid {
    pub horizontal: i32,
    pub vertical: i32,
}

impl Ellipsoid {
    pub const fn new(horizontal: i32, vertical: i32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn from_pair(r: [i32; 2]) -> Self {
        Self::new(r[0].max(0), r[1].max(0))
    }

    /// Grows each radius to at least `inner + 1` per axis.
    pub fn at_least_outside(self, inner: Ellipsoid) -> Self {
        Self {
            horizontal: self.horizontal.max(inner.horizontal + 1),
            vertical: self.vertical.max(inner.vertical + 1),
        }
    }

    #[inline]
    pub fn contains(&self, dx: i32, dy: i32, dz: i32) -> bool {
        let h = i64::from(self.horizontal);
        let v = i64::from(self.vertical);
        let hd = i64::from(dx) * i64::from(dx) + i64::from(dz) * i64::from(dz);
        let vd = i64::from(dy) * i64::from(dy);
        match (h, v) {
            (0, 0) => hd == 0 && vd == 0,
            (0, _) => hd == 0 && vd <= v * v,
            (_, 0) => vd == 0 && hd <= h * h,
            // hd/h² + vd/v² <= 1, cleared of denominators
            _ => hd * v * v + vd * h * h <= h * h * v * v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_when_radii_match() {
        let e = Ellipsoid::new(2, 2);
        assert!(e.contains(2, 0, 0));
        assert!(e.contains(0, -2, 0));
        assert!(e.contains(1, 1, 1));
        assert!(!e.contains(2, 1, 0));
        assert!(!e.contains(3, 0, 0));
    }

    #[test]
    fn flattened_ellipsoid() {
        let e = Ellipsoid::new(4, 1);
        assert!(e.contains(4, 0, 0));
        assert!(e.contains(0, 1, 0));
        assert!(!e.contains(0, 2, 0));
        assert!(!e.contains(4, 1, 0));
        let flat = Ellipsoid::new(3, 0);
        assert!(flat.contains(3, 0, 0));
        assert!(!flat.contains(0, 1, 0));
    }

    #[test]
    fn remove_radius_is_forced_outside_add() {
        let add = Ellipsoid::new(2, 2);
        assert_eq!(Ellipsoid::new(1, 5).at_least_outside(add), Ellipsoid::new(3, 5));
    }
}
