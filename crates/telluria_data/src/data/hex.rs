use serde::{Deserialize, Serialize};

/// Axial hexagonal coordinate (pointy-top layout). The third cube
/// coordinate is derived, so `q + r + s == 0` holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Axial {
    pub q: i32,
    pub r: i32,
}

/// The six axial direction offsets, counter-clockwise from east.
pub const HEX_DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

impl Axial {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    pub fn neighbor(&self, direction: usize) -> Axial {
        let (dq, dr) = HEX_DIRECTIONS[direction % 6];
        Axial::new(self.q + dq, self.r + dr)
    }

    pub fn neighbors(&self) -> [Axial; 6] {
        let mut out = [*self; 6];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.neighbor(i);
        }
        out
    }

    /// Cube distance: half the L1 norm of the coordinate deltas.
    pub fn distance(&self, other: &Axial) -> i32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        (dq + dr + ds) / 2
    }

    /// Cells at exactly `radius` steps, built by walking the ring.
    pub fn ring(&self, radius: i32) -> Vec<Axial> {
        if radius <= 0 {
            return vec![*self];
        }
        let mut results = Vec::with_capacity((radius * 6) as usize);
        // Start at the cell radius steps in direction 4, then walk each edge.
        let (dq, dr) = HEX_DIRECTIONS[4];
        let mut cursor = Axial::new(self.q + dq * radius, self.r + dr * radius);
        for direction in 0..6 {
            for _ in 0..radius {
                results.push(cursor);
                cursor = cursor.neighbor(direction);
            }
        }
        results
    }

    /// All cells within `radius` steps, centre first.
    pub fn spiral(&self, radius: i32) -> Vec<Axial> {
        let mut results = vec![*self];
        for r in 1..=radius {
            results.extend(self.ring(r));
        }
        results
    }

    /// Pointy-top axial to pixel centre.
    pub fn to_pixel(&self, size: f64) -> (f64, f64) {
        let sqrt3 = 3.0_f64.sqrt();
        let x = size * (sqrt3 * self.q as f64 + sqrt3 / 2.0 * self.r as f64);
        let y = size * (1.5 * self.r as f64);
        (x, y)
    }

    /// Inverse of [`Axial::to_pixel`] with cube rounding.
    pub fn from_pixel(x: f64, y: f64, size: f64) -> Axial {
        let sqrt3 = 3.0_f64.sqrt();
        let fq = (sqrt3 / 3.0 * x - y / 3.0) / size;
        let fr = (2.0 / 3.0 * y) / size;
        Self::round(fq, fr)
    }

    fn round(fq: f64, fr: f64) -> Axial {
        let fs = -fq - fr;
        let mut q = fq.round();
        let mut r = fr.round();
        let s = fs.round();

        let dq = (q - fq).abs();
        let dr = (r - fr).abs();
        let ds = (s - fs).abs();

        if dq > dr && dq > ds {
            q = -r - s;
        } else if dr > ds {
            r = -q - s;
        }
        Axial::new(q as i32, r as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_invariant_holds_for_neighbors() {
        let origin = Axial::new(3, -5);
        for n in origin.neighbors() {
            assert_eq!(n.q + n.r + n.s(), 0);
            assert_eq!(origin.distance(&n), 1);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Axial::new(0, 0);
        let b = Axial::new(4, -2);
        assert_eq!(a.distance(&b), b.distance(&a));
        assert_eq!(a.distance(&b), 4);
    }

    #[test]
    fn ring_has_six_r_cells() {
        let origin = Axial::new(0, 0);
        for radius in 1..4 {
            let ring = origin.ring(radius);
            assert_eq!(ring.len(), (6 * radius) as usize);
            for cell in &ring {
                assert_eq!(origin.distance(cell), radius);
            }
        }
    }

    #[test]
    fn spiral_counts_interior() {
        let origin = Axial::new(2, 1);
        // 1 + 6 + 12 = 19 cells within radius 2
        assert_eq!(origin.spiral(2).len(), 19);
    }

    #[test]
    fn pixel_round_trip() {
        for q in -10..10 {
            for r in -10..10 {
                let h = Axial::new(q, r);
                for size in [0.5, 1.0, 17.3] {
                    let (x, y) = h.to_pixel(size);
                    assert_eq!(Axial::from_pixel(x, y, size), h);
                }
            }
        }
    }
}
