use crate::Primitive;

/// Lifecycle of a clustering run.
///
/// `Initialized → Iterating → {Converged, MaxItersReached}`. Both terminal states
/// produce a [`crate::RunResult`]; only the flag [`crate::RunResult::converged`] differs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Centroids are placed, no assignment has been computed yet
    Initialized,
    /// At least one assignment/update round ran and the run continues
    Iterating,
    /// The convergence criterion was met
    Converged,
    /// The iteration cap was hit before the criterion was met
    MaxItersReached,
}
impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Converged | RunState::MaxItersReached)
    }
}

/// Enum with the supported convergence criteria.
/// These criteria decide, after each iteration, whether the centroids have settled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConvergenceCriterion<T: Primitive> {
	/// Converged once the largest per-coordinate centroid movement of an iteration is `<= epsilon`.
	/// ## Fields:
	/// - **epsilon**: Movement tolerance
	CentroidShift { epsilon: T },
	/// Converged directly after an iteration produced no improvement of the WCSS where `improvement > threshold`.
	/// ## Fields:
	/// - **threshold**: Threshold, used to detect an improvement (`improvement > threshold`)
	NoImprovement { threshold: T },
}
impl<T: Primitive> Default for ConvergenceCriterion<T> {
	fn default() -> Self {
		ConvergenceCriterion::CentroidShift { epsilon: T::from(1e-4).unwrap_or_else(T::epsilon) }
	}
}
impl<T: Primitive> ConvergenceCriterion<T> {
	pub(crate) fn create_logic(&self) -> Box<dyn ConvergenceLogic<T>> {
		match *self {
			ConvergenceCriterion::CentroidShift { epsilon } => Box::new(CentroidShiftLogic { epsilon }),
			ConvergenceCriterion::NoImprovement { threshold } => Box::new(NoImprovementLogic {
				threshold,
				prev_error: T::infinity()
			})
		}
	}
}

pub(crate) trait ConvergenceLogic<T: Primitive> {
	/// Function that has to be called once an iteration ended.
	/// ## Arguments
	/// - **shift**: Largest per-coordinate centroid movement of this iteration
	/// - **error**: The new error (WCSS) after this iteration
	/// ## Returns
	/// - **true** if the centroids are considered settled
	fn settled(&mut self, shift: T, error: T) -> bool;
}

pub(crate) struct CentroidShiftLogic<T: Primitive> {
	epsilon: T
}
impl<T: Primitive> ConvergenceLogic<T> for CentroidShiftLogic<T> {
	fn settled(&mut self, shift: T, _error: T) -> bool {
		shift <= self.epsilon
	}
}

pub(crate) struct NoImprovementLogic<T: Primitive> {
	threshold: T,
	prev_error: T
}
impl<T: Primitive> ConvergenceLogic<T> for NoImprovementLogic<T> {
	fn settled(&mut self, _shift: T, error: T) -> bool {
		let improvement = self.prev_error - error;
		self.prev_error = error;
		!(improvement > self.threshold)
	}
}


/// Drives the [`RunState`] machine of one run: counts iterations and applies the
/// configured [`ConvergenceCriterion`] and the iteration cap.
pub struct ConvergenceMonitor<T: Primitive> {
	logic: Box<dyn ConvergenceLogic<T>>,
	max_iter: usize,
	iterations: usize,
	state: RunState,
}
impl<T: Primitive> ConvergenceMonitor<T> {
	pub fn new(criterion: ConvergenceCriterion<T>, max_iter: usize) -> Self {
		Self { logic: criterion.create_logic(), max_iter, iterations: 0, state: RunState::Initialized }
	}

	pub fn state(&self) -> RunState { self.state }
	pub fn iterations(&self) -> usize { self.iterations }

	/// Whether another assignment/update round should run.
	/// A monitor with `max_iter == 0` moves straight to [`RunState::MaxItersReached`].
	pub fn should_continue(&mut self) -> bool {
		if self.state.is_terminal() {
			return false;
		}
		if self.iterations >= self.max_iter {
			self.state = RunState::MaxItersReached;
			return false;
		}
		true
	}

	/// Record a finished iteration and return the resulting state.
	pub fn observe(&mut self, shift: T, error: T) -> RunState {
		debug_assert!(!self.state.is_terminal());
		self.iterations += 1;
		self.state = if self.logic.settled(shift, error) {
			RunState::Converged
		} else if self.iterations >= self.max_iter {
			RunState::MaxItersReached
		} else {
			RunState::Iterating
		};
		self.state
	}
}
