//! Continuous worlds.
//!
//! Positions are [`DVec3`] points inside `[0, size)` on every axis whose size
//! is positive; axes of size 0 are fixed at 0. Points are bucketed into unit
//! cells so radius queries only inspect buckets overlapping the search box.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use glam::DVec3;

use crate::error::SpaceError;
use crate::neighbourhood::Neighbourhood;

/// Distance function for radius queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Euclidean,
    Chebyshev,
    Manhattan,
}

impl Metric {
    #[must_use]
    pub fn distance(self, delta: DVec3) -> f64 {
        match self {
            Self::Euclidean => delta.length(),
            Self::Chebyshev => Neighbourhood::Moore.distance(delta),
            Self::Manhattan => Neighbourhood::Neumann.distance(delta),
        }
    }
}

impl From<Neighbourhood> for Metric {
    fn from(mode: Neighbourhood) -> Self {
        match mode {
            Neighbourhood::Moore => Self::Chebyshev,
            Neighbourhood::Neumann => Self::Manhattan,
        }
    }
}

type Bucket = [i64; 3];

/// A continuous world tracking the point of every placed key.
#[derive(Debug, Clone)]
pub struct ContinuousSpace<K> {
    bounds: DVec3,
    toroidal: bool,
    buckets: HashMap<Bucket, Vec<K>>,
    positions: HashMap<K, DVec3>,
}

impl<K> ContinuousSpace<K>
where
    K: Clone + Eq + Hash + Display,
{
    /// Create a world of the given size. Negative sizes count as 0.
    #[must_use]
    pub fn new(bounds: DVec3, toroidal: bool) -> Self {
        Self {
            bounds: bounds.max(DVec3::ZERO),
            toroidal,
            buckets: HashMap::new(),
            positions: HashMap::new(),
        }
    }

    #[must_use]
    pub fn bounds(&self) -> DVec3 {
        self.bounds
    }

    #[must_use]
    pub fn is_toroidal(&self) -> bool {
        self.toroidal
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Check a point against the world bounds, zeroing degenerate axes.
    ///
    /// # Errors
    ///
    /// [`SpaceError::PointOutOfBounds`] if a coordinate is outside `[0, size)`
    /// on an axis with positive size.
    pub fn validate(&self, point: DVec3) -> Result<DVec3, SpaceError> {
        let mut out = point.to_array();
        for (c, size) in out.iter_mut().zip(self.bounds.to_array()) {
            if size == 0.0 {
                *c = 0.0;
            } else if !(0.0..size).contains(c) {
                return Err(SpaceError::PointOutOfBounds {
                    point,
                    bounds: self.bounds,
                });
            }
        }
        Ok(DVec3::from_array(out))
    }

    /// Place a key at a point, moving it if it is already placed.
    ///
    /// # Errors
    ///
    /// [`SpaceError::PointOutOfBounds`] if the point is outside the world.
    pub fn place(&mut self, key: K, point: DVec3) -> Result<DVec3, SpaceError> {
        let point = self.validate(point)?;
        self.detach(&key);
        self.buckets
            .entry(bucket_of(point))
            .or_default()
            .push(key.clone());
        self.positions.insert(key, point);
        Ok(point)
    }

    /// Forget a key. Returns its last point.
    pub fn remove(&mut self, key: &K) -> Option<DVec3> {
        self.detach(key)
    }

    #[must_use]
    pub fn position(&self, key: &K) -> Option<DVec3> {
        self.positions.get(key).copied()
    }

    /// Move a placed key to an absolute point.
    ///
    /// # Errors
    ///
    /// [`SpaceError::NotPlaced`] or [`SpaceError::PointOutOfBounds`].
    pub fn move_to(&mut self, key: &K, point: DVec3) -> Result<DVec3, SpaceError> {
        self.require(key)?;
        self.place(key.clone(), point)
    }

    /// Move a placed key by an offset, wrapping or clamping at the edges.
    ///
    /// # Errors
    ///
    /// [`SpaceError::NotPlaced`] for unknown keys.
    pub fn move_by(&mut self, key: &K, delta: DVec3) -> Result<DVec3, SpaceError> {
        let from = self.require(key)?;
        let target = self.settle(from + delta);
        self.place(key.clone(), target)
    }

    /// Keys within Euclidean distance `radius` of a point.
    ///
    /// # Errors
    ///
    /// [`SpaceError::PointOutOfBounds`] if the point is outside the world.
    pub fn agents_near(&self, point: DVec3, radius: f64) -> Result<Vec<K>, SpaceError> {
        let point = self.validate(point)?;
        Ok(self.query(point, radius, Metric::Euclidean, None))
    }

    /// Keys around a placed key, excluding the key itself.
    ///
    /// Moore uses Chebyshev distance, Neumann uses Manhattan distance.
    ///
    /// # Errors
    ///
    /// [`SpaceError::NotPlaced`] for unknown keys.
    pub fn neighbours(&self, key: &K, radius: f64, mode: Neighbourhood) -> Result<Vec<K>, SpaceError> {
        let centre = self.require(key)?;
        Ok(self.query(centre, radius, Metric::from(mode), Some(key)))
    }

    /// Keys within `radius` of `point` under `metric`, skipping `skip`.
    ///
    /// Distances use the minimum image in toroidal worlds.
    #[must_use]
    pub fn query(&self, point: DVec3, radius: f64, metric: Metric, skip: Option<&K>) -> Vec<K> {
        if radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }
        let centre = bucket_of(point);
        let reach = radius.ceil() as i64;
        let [xs, ys, zs] = [0, 1, 2].map(|axis| self.bucket_span(axis, centre[axis], reach));

        let mut found = Vec::new();
        for &z in &zs {
            for &y in &ys {
                for &x in &xs {
                    let Some(bucket) = self.buckets.get(&[x, y, z]) else {
                        continue;
                    };
                    for key in bucket {
                        if skip == Some(key) {
                            continue;
                        }
                        let Some(pos) = self.positions.get(key) else {
                            continue;
                        };
                        if metric.distance(self.displacement(point, *pos)) <= radius {
                            found.push(key.clone());
                        }
                    }
                }
            }
        }
        found
    }

    fn bucket_span(&self, axis: usize, centre: i64, reach: i64) -> Vec<i64> {
        let size = self.bounds[axis];
        if size == 0.0 {
            return vec![0];
        }
        let count = (size.ceil() as i64).max(1);
        if self.toroidal {
            if reach.saturating_mul(2).saturating_add(1) >= count {
                return (0..count).collect();
            }
            let mut span: Vec<i64> = (centre - reach..=centre + reach)
                .map(|b| b.rem_euclid(count))
                .collect();
            span.sort_unstable();
            span.dedup();
            span
        } else {
            let lo = centre.saturating_sub(reach).max(0);
            let hi = centre.saturating_add(reach).min(count - 1);
            (lo..=hi).collect()
        }
    }

    fn displacement(&self, from: DVec3, to: DVec3) -> DVec3 {
        let mut d = to - from;
        if self.toroidal {
            for axis in 0..3 {
                let size = self.bounds[axis];
                if size > 0.0 {
                    if d[axis] > size / 2.0 {
                        d[axis] -= size;
                    } else if d[axis] < -size / 2.0 {
                        d[axis] += size;
                    }
                }
            }
        }
        d
    }

    /// Bring an arbitrary point inside the world by wrapping or clamping.
    fn settle(&self, point: DVec3) -> DVec3 {
        let mut out = point.to_array();
        for (c, size) in out.iter_mut().zip(self.bounds.to_array()) {
            *c = if size == 0.0 {
                0.0
            } else if self.toroidal {
                let wrapped = (*c).rem_euclid(size);
                if wrapped >= size { 0.0 } else { wrapped }
            } else {
                (*c).clamp(0.0, size.next_down())
            };
        }
        DVec3::from_array(out)
    }

    fn require(&self, key: &K) -> Result<DVec3, SpaceError> {
        self.position(key)
            .ok_or_else(|| SpaceError::NotPlaced(key.to_string()))
    }

    fn detach(&mut self, key: &K) -> Option<DVec3> {
        let point = self.positions.remove(key)?;
        let bucket_key = bucket_of(point);
        if let Some(bucket) = self.buckets.get_mut(&bucket_key) {
            bucket.retain(|k| k != key);
            if bucket.is_empty() {
                self.buckets.remove(&bucket_key);
            }
        }
        Some(point)
    }
}

fn bucket_of(point: DVec3) -> Bucket {
    point.floor().to_array().map(|c| c as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world(toroidal: bool) -> ContinuousSpace<String> {
        ContinuousSpace::new(DVec3::new(10.0, 10.0, 0.0), toroidal)
    }

    #[test]
    fn test_place_validates_and_zeroes_degenerate_axis() {
        let mut space = world(false);
        let stored = space.place("a".into(), DVec3::new(1.5, 2.5, 7.0)).unwrap();
        assert_eq!(stored, DVec3::new(1.5, 2.5, 0.0));
        assert!(matches!(
            space.place("b".into(), DVec3::new(10.0, 0.0, 0.0)),
            Err(SpaceError::PointOutOfBounds { .. })
        ));
        assert!(space.place("b".into(), DVec3::new(-0.1, 0.0, 0.0)).is_err());
        assert_eq!(space.len(), 1);
    }

    #[test]
    fn test_agents_near_uses_euclidean_distance() {
        let mut space = world(false);
        space.place("a".into(), DVec3::new(1.0, 1.0, 0.0)).unwrap();
        space.place("b".into(), DVec3::new(2.0, 2.0, 0.0)).unwrap();
        space.place("c".into(), DVec3::new(5.0, 5.0, 0.0)).unwrap();

        let near = space.agents_near(DVec3::new(1.0, 1.0, 0.0), 1.5).unwrap();
        assert_eq!(near, vec!["a".to_string(), "b".to_string()]);
        let near = space.agents_near(DVec3::new(1.0, 1.0, 0.0), 1.0).unwrap();
        assert_eq!(near, vec!["a".to_string()]);
    }

    #[test]
    fn test_moore_and_neumann_metrics() {
        let mut space = world(false);
        space.place("a".into(), DVec3::new(5.0, 5.0, 0.0)).unwrap();
        space.place("diag".into(), DVec3::new(6.0, 6.0, 0.0)).unwrap();

        let moore = space.neighbours(&"a".into(), 1.0, Neighbourhood::Moore).unwrap();
        assert_eq!(moore, vec!["diag".to_string()]);
        let neumann = space.neighbours(&"a".into(), 1.0, Neighbourhood::Neumann).unwrap();
        assert!(neumann.is_empty());
    }

    #[test]
    fn test_toroidal_minimum_image() {
        let mut space = world(true);
        space.place("a".into(), DVec3::new(0.5, 5.0, 0.0)).unwrap();
        space.place("b".into(), DVec3::new(9.5, 5.0, 0.0)).unwrap();
        let found = space.neighbours(&"a".into(), 1.0, Neighbourhood::Moore).unwrap();
        assert_eq!(found, vec!["b".to_string()]);

        let bounded = {
            let mut s = world(false);
            s.place("a".into(), DVec3::new(0.5, 5.0, 0.0)).unwrap();
            s.place("b".into(), DVec3::new(9.5, 5.0, 0.0)).unwrap();
            s
        };
        assert!(bounded.neighbours(&"a".into(), 1.0, Neighbourhood::Moore).unwrap().is_empty());
    }

    #[test]
    fn test_move_by_wraps_or_clamps() {
        let mut torus = world(true);
        torus.place("a".into(), DVec3::new(9.0, 0.5, 0.0)).unwrap();
        let moved = torus.move_by(&"a".into(), DVec3::new(2.0, -1.0, 0.0)).unwrap();
        assert_eq!(moved, DVec3::new(1.0, 9.5, 0.0));

        let mut bounded = world(false);
        bounded.place("a".into(), DVec3::new(9.0, 0.5, 0.0)).unwrap();
        let moved = bounded.move_by(&"a".into(), DVec3::new(5.0, -3.0, 0.0)).unwrap();
        assert!(moved.x < 10.0 && moved.x > 9.99);
        assert_eq!(moved.y, 0.0);
    }

    #[test]
    fn test_remove_and_not_placed() {
        let mut space = world(false);
        space.place("a".into(), DVec3::new(3.0, 3.0, 0.0)).unwrap();
        assert!(space.remove(&"a".into()).is_some());
        assert!(space.agents_near(DVec3::new(3.0, 3.0, 0.0), 2.0).unwrap().is_empty());
        assert!(matches!(
            space.move_to(&"a".into(), DVec3::ZERO),
            Err(SpaceError::NotPlaced(_))
        ));
    }
}
