//! Observation representations and observation spaces

use std::fmt::Debug;
use std::marker::PhantomData;

/// Trait for observations from an environment
pub trait Observation: Clone + Debug {
    /// Convert observation to a feature vector
    fn to_vec(&self) -> Vec<f64>;

    /// Get the shape of the observation
    fn shape(&self) -> Vec<usize>;
}

/// Trait for defining observation spaces
pub trait ObservationSpace {
    /// The type of observations in this space
    type Observation: Observation;

    /// Check if an observation is valid within this space
    fn contains(&self, obs: &Self::Observation) -> bool;

    /// Get the shape of observations in this space
    fn shape(&self) -> Vec<usize>;

    /// Inclusive `(low, high)` bounds shared by every element
    fn bounds(&self) -> (f64, f64);
}

/// Box observation space with one scalar bound for every element
#[derive(Debug, Clone)]
pub struct BoxObservationSpace<O> {
    /// Lower bound
    pub low: f64,
    /// Upper bound
    pub high: f64,
    /// Shape of observations
    pub shape: Vec<usize>,
    _observation: PhantomData<O>,
}

impl<O> BoxObservationSpace<O> {
    /// Create a new box observation space
    pub fn new(low: f64, high: f64, shape: Vec<usize>) -> crate::Result<Self> {
        if low > high {
            return Err(crate::RLError::InvalidState(format!(
                "box lower bound {low} exceeds upper bound {high}"
            )));
        }
        Ok(Self {
            low,
            high,
            shape,
            _observation: PhantomData,
        })
    }

    /// Space bounded by `[-bound, bound]` in every element
    #[must_use]
    pub fn symmetric(bound: f64, shape: Vec<usize>) -> Self {
        let bound = bound.abs();
        Self {
            low: -bound,
            high: bound,
            shape,
            _observation: PhantomData,
        }
    }

    /// Total number of elements in one observation
    #[must_use]
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }
}

impl<O: Observation> ObservationSpace for BoxObservationSpace<O> {
    type Observation = O;

    fn contains(&self, obs: &Self::Observation) -> bool {
        let values = obs.to_vec();
        obs.shape() == self.shape
            && values.len() == self.size()
            && values.iter().all(|x| *x >= self.low && *x <= self.high)
    }

    fn shape(&self) -> Vec<usize> {
        self.shape.clone()
    }

    fn bounds(&self) -> (f64, f64) {
        (self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Flat(Vec<f64>);

    impl Observation for Flat {
        fn to_vec(&self) -> Vec<f64> {
            self.0.clone()
        }

        fn shape(&self) -> Vec<usize> {
            vec![self.0.len()]
        }
    }

    #[test]
    fn test_box_contains() {
        let space = BoxObservationSpace::<Flat>::new(-1.0, 1.0, vec![3]).unwrap();
        assert_eq!(space.size(), 3);
        assert!(space.contains(&Flat(vec![-1.0, 0.0, 1.0])));
        assert!(!space.contains(&Flat(vec![-1.0, 0.0, 1.5])));
        assert!(!space.contains(&Flat(vec![0.0, 0.0])));
    }

    #[derive(Debug, Clone)]
    struct Shaped {
        shape: Vec<usize>,
        values: Vec<f64>,
    }

    impl Observation for Shaped {
        fn to_vec(&self) -> Vec<f64> {
            self.values.clone()
        }

        fn shape(&self) -> Vec<usize> {
            self.shape.clone()
        }
    }

    #[test]
    fn test_box_checks_element_count() {
        let space = BoxObservationSpace::<Shaped>::symmetric(1.0, vec![2, 2]);
        assert!(space.contains(&Shaped { shape: vec![2, 2], values: vec![0.0; 4] }));
        assert!(!space.contains(&Shaped { shape: vec![2, 2], values: vec![0.0; 3] }));
    }

    #[test]
    fn test_box_rejects_inverted_bounds() {
        assert!(BoxObservationSpace::<Flat>::new(1.0, -1.0, vec![1]).is_err());
        let space = BoxObservationSpace::<Flat>::symmetric(-6.0, vec![2]);
        assert_eq!(space.bounds(), (-6.0, 6.0));
    }
}
