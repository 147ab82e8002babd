// src/physics/lookup.rs
use crate::utils::geometry::pixel_distance;
use std::collections::HashMap;

/// Uniform bucket grid over pixel positions for nearest-spot picking.
///
/// The bucket edge equals the pick cutoff, so a query only has to visit the
/// buckets overlapping its cutoff square (at most 3×3).
#[derive(Debug, Clone, Default)]
pub struct PixelGrid {
    cell: f64,
    buckets: HashMap<(i64, i64), Vec<usize>>,
    points: Vec<[f64; 2]>,
}

impl PixelGrid {
    /// Index `points` (slot order is preserved; queries return slots).
    pub fn build(points: Vec<[f64; 2]>, cutoff: f64) -> Self {
        let cell = if cutoff.is_finite() && cutoff > 0.0 { cutoff } else { 1.0 };
        let mut buckets: HashMap<(i64, i64), Vec<usize>> = HashMap::new();

        for (slot, p) in points.iter().enumerate() {
            if !(p[0].is_finite() && p[1].is_finite()) { continue; }
            buckets.entry(Self::key(cell, *p)).or_default().push(slot);
        }

        Self { cell, buckets, points }
    }

    fn key(cell: f64, p: [f64; 2]) -> (i64, i64) {
        ((p[0] / cell).floor() as i64, (p[1] / cell).floor() as i64)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Slot of the closest point no further than `cutoff` from (x, y).
    ///
    /// A point exactly at the cutoff counts as a hit. Ties go to the lower slot.
    pub fn nearest(&self, x: f64, y: f64, cutoff: f64) -> Option<usize> {
        if !(x.is_finite() && y.is_finite()) || cutoff < 0.0 {
            return None;
        }

        let (x0, y0) = Self::key(self.cell, [x - cutoff, y - cutoff]);
        let (x1, y1) = Self::key(self.cell, [x + cutoff, y + cutoff]);

        let mut best: Option<(f64, usize)> = None;
        for gx in x0..=x1 {
            for gy in y0..=y1 {
                let Some(bucket) = self.buckets.get(&(gx, gy)) else { continue };
                for &slot in bucket {
                    let d = pixel_distance(self.points[slot], [x, y]);
                    if d > cutoff { continue; }
                    let better = match best {
                        None => true,
                        Some((bd, bs)) => d < bd || (d == bd && slot < bs),
                    };
                    if better {
                        best = Some((d, slot));
                    }
                }
            }
        }

        best.map(|(_, slot)| slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(points: &[[f64; 2]], x: f64, y: f64, cutoff: f64) -> Option<usize> {
        let mut best: Option<(f64, usize)> = None;
        for (i, p) in points.iter().enumerate() {
            let d = pixel_distance(*p, [x, y]);
            if d <= cutoff && best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, i));
            }
        }
        best.map(|(_, i)| i)
    }

    #[test]
    fn test_nearest_within_cutoff() {
        let grid = PixelGrid::build(vec![[100.0, 100.0], [110.0, 100.0], [300.0, 50.0]], 10.0);
        assert_eq!(grid.nearest(104.0, 101.0, 10.0), Some(0));
        assert_eq!(grid.nearest(106.0, 99.0, 10.0), Some(1));
        assert_eq!(grid.nearest(305.0, 55.0, 10.0), Some(2));
        assert_eq!(grid.nearest(200.0, 200.0, 10.0), None);
    }

    #[test]
    fn test_exact_cutoff_boundary() {
        let grid = PixelGrid::build(vec![[50.0, 50.0]], 10.0);
        // 6-8-10 triangle: exactly on the cutoff
        assert_eq!(grid.nearest(56.0, 58.0, 10.0), Some(0));
        assert_eq!(grid.nearest(60.0, 50.0, 10.0), Some(0));
        assert_eq!(grid.nearest(60.001, 50.0, 10.0), None);
    }

    #[test]
    fn test_negative_coordinates_and_bucket_edges() {
        let grid = PixelGrid::build(vec![[-0.5, -0.5], [9.99, 0.0], [10.0, 0.0]], 10.0);
        assert_eq!(grid.nearest(-8.0, -3.0, 10.0), Some(0));
        assert_eq!(grid.nearest(10.01, 0.0, 10.0), Some(2));
        assert_eq!(grid.nearest(19.99, 0.0, 10.0), Some(2));
    }

    #[test]
    fn test_matches_brute_force() {
        let mut points = Vec::new();
        for i in 0..40 {
            for j in 0..40 {
                points.push([i as f64 * 7.3 + (j % 3) as f64, j as f64 * 5.1 - (i % 5) as f64]);
            }
        }
        let grid = PixelGrid::build(points.clone(), 4.0);
        for qx in 0..60 {
            for qy in 0..40 {
                let (x, y) = (qx as f64 * 4.9 + 0.3, qy as f64 * 5.3 - 2.0);
                assert_eq!(grid.nearest(x, y, 4.0), brute_force(&points, x, y, 4.0));
            }
        }
    }
}
