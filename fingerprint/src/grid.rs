//! Probe grid over the unit square

use crate::PipelineError;
use serde::{Deserialize, Serialize};

/// One probe parameter pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Points on or above the anti-diagonal are played by a dual probe
    pub fn is_upper(&self) -> bool {
        self.x + self.y >= 1.0
    }
}

/// `n` evenly spaced values from 0 to 1 inclusive
pub fn linspace(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let last = (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { 1.0 } else { i as f64 / last })
                .collect()
        }
    }
}

/// Cartesian product of `linspace(floor(1 / step) + 1)` with itself
///
/// The x coordinate varies slowest, so point `i * n + j` is `(v[i], v[j])`.
///
/// # Errors
/// `InvalidStep` when `step` is zero, negative or not finite.
pub fn create_points(step: f64) -> Result<Vec<Point>, PipelineError> {
    if !step.is_finite() || step <= 0.0 {
        return Err(PipelineError::InvalidStep(step));
    }
    let n = (1.0 / step).floor() as usize + 1;
    let values = linspace(n);
    Ok(values
        .iter()
        .flat_map(|&x| values.iter().map(move |&y| Point::new(x, y)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_step_gives_nine_points() {
        let points = create_points(0.5).unwrap();
        let expected: Vec<Point> = [
            (0.0, 0.0),
            (0.0, 0.5),
            (0.0, 1.0),
            (0.5, 0.0),
            (0.5, 0.5),
            (0.5, 1.0),
            (1.0, 0.0),
            (1.0, 0.5),
            (1.0, 1.0),
        ]
        .iter()
        .map(|&(x, y)| Point::new(x, y))
        .collect();
        assert_eq!(points, expected);
    }

    #[test]
    fn test_step_that_does_not_divide_one() {
        // floor(1 / 0.3) + 1 = 4 values per axis
        let points = create_points(0.3).unwrap();
        assert_eq!(points.len(), 16);
        assert_eq!(points.last(), Some(&Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_step_of_one_and_above() {
        assert_eq!(create_points(1.0).unwrap().len(), 4);
        assert_eq!(create_points(2.0).unwrap(), vec![Point::new(0.0, 0.0)]);
    }

    #[test]
    fn test_invalid_steps_are_rejected() {
        for step in [0.0, -0.25, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                create_points(step),
                Err(PipelineError::InvalidStep(_))
            ));
        }
    }

    #[test]
    fn test_linspace_endpoints() {
        assert!(linspace(0).is_empty());
        assert_eq!(linspace(5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_upper_region() {
        assert!(Point::new(0.5, 0.5).is_upper());
        assert!(Point::new(1.0, 1.0).is_upper());
        assert!(!Point::new(0.25, 0.5).is_upper());
    }
}
