//! Common types used throughout ladder_planning

use nalgebra::{RealField, Vector2};

use crate::common::error::{RoboticsError, RoboticsResult};

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// Path represented as a sequence of 2D points
#[derive(Debug, Clone, Default)]
pub struct Path2D {
    pub points: Vec<Point2D>,
}

impl Path2D {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: Point2D) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn x_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn y_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}

/// Candidate joint configurations at one waypoint of the ladder graph.
///
/// Configurations are stored row-major in a single buffer, `dof` values each,
/// which keeps a rung cheap to share between worker threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Rung<T> {
    dof: usize,
    data: Vec<T>,
}

impl<T: RealField + Copy> Rung<T> {
    /// Build a rung from flat row-major joint data.
    pub fn new(dof: usize, data: Vec<T>) -> RoboticsResult<Self> {
        if dof == 0 {
            return Err(RoboticsError::InvalidParameter(
                "rung dof must be greater than zero".to_string(),
            ));
        }
        if data.len() % dof != 0 {
            return Err(RoboticsError::InvalidParameter(format!(
                "rung data length {} is not a multiple of dof {}",
                data.len(),
                dof
            )));
        }
        Ok(Self { dof, data })
    }

    /// Empty rung with a fixed joint layout.
    pub fn empty(dof: usize) -> RoboticsResult<Self> {
        Self::new(dof, Vec::new())
    }

    /// Build a rung from individual configurations, each of length `dof`.
    pub fn from_configurations<I, C>(dof: usize, configurations: I) -> RoboticsResult<Self>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[T]>,
    {
        let mut rung = Self::empty(dof)?;
        for configuration in configurations {
            rung.push(configuration.as_ref())?;
        }
        Ok(rung)
    }

    pub fn push(&mut self, configuration: &[T]) -> RoboticsResult<()> {
        if configuration.len() != self.dof {
            return Err(RoboticsError::dimension_mismatch(self.dof, configuration.len()));
        }
        self.data.extend_from_slice(configuration);
        Ok(())
    }

    pub fn dof(&self) -> usize {
        self.dof
    }

    /// Number of configurations in the rung
    pub fn len(&self) -> usize {
        self.data.len() / self.dof
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&[T]> {
        let start = index.checked_mul(self.dof)?;
        self.data.get(start..start.checked_add(self.dof)?)
    }

    /// Configuration at `index`. Panics if out of range, like slice indexing.
    pub fn configuration(&self, index: usize) -> &[T] {
        &self.data[index * self.dof..(index + 1) * self.dof]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.data.chunks_exact(self.dof)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }
}

/// Directed transition into a destination configuration.
///
/// Edges are grouped per destination, so only the source index is stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge<T> {
    /// Index of the source configuration in the previous rung
    pub source: usize,
    /// Joint-space distance of the transition, never negative
    pub cost: T,
    /// False only for an edge synthesized by the degenerate-connectivity fallback
    pub collision_free: bool,
}

impl<T> Edge<T> {
    pub fn new(source: usize, cost: T) -> Self {
        Self {
            source,
            cost,
            collision_free: true,
        }
    }

    pub fn fallback(source: usize, cost: T) -> Self {
        Self {
            source,
            cost,
            collision_free: false,
        }
    }
}

/// Admissible edges into one destination configuration, in source order
pub type EdgeList<T> = Vec<Edge<T>>;

/// True when at least one destination received an edge
pub fn has_edges<T>(edges: &[EdgeList<T>]) -> bool {
    edges.iter().any(|list| !list.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point2d_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_rung_from_configurations() {
        let rung = Rung::from_configurations(2, vec![[0.0, 0.0], [1.0, 1.0]]).unwrap();
        assert_eq!(rung.len(), 2);
        assert_eq!(rung.configuration(1), &[1.0, 1.0]);
        assert_eq!(rung.get(2), None);
        assert_eq!(rung.iter().count(), 2);
    }

    #[test]
    fn test_rung_get_out_of_range_index() {
        let rung = Rung::from_configurations(2, vec![[0.0, 0.0]]).unwrap();
        assert_eq!(rung.get(usize::MAX / 2), None);
        assert_eq!(rung.get(usize::MAX), None);
    }

    #[test]
    fn test_rung_rejects_ragged_data() {
        assert!(matches!(
            Rung::new(3, vec![0.0_f64; 4]),
            Err(RoboticsError::InvalidParameter(_))
        ));
        assert!(Rung::<f64>::new(0, Vec::new()).is_err());
    }

    #[test]
    fn test_rung_push_checks_dof() {
        let mut rung = Rung::<f64>::empty(2).unwrap();
        assert!(matches!(
            rung.push(&[1.0, 2.0, 3.0]),
            Err(RoboticsError::DimensionMismatch { expected: 2, found: 3 })
        ));
        assert!(rung.is_empty());
    }

    #[test]
    fn test_has_edges() {
        let empty: Vec<EdgeList<f64>> = vec![Vec::new(), Vec::new()];
        assert!(!has_edges(&empty));
        let some = vec![Vec::new(), vec![Edge::new(0, 1.0)]];
        assert!(has_edges(&some));
    }
}
