use crate::Primitive;

/// Squared euclidean distance between two equally long slices.
#[inline(always)]
pub(crate) fn squared_distance<T: Primitive>(a: &[T], b: &[T]) -> T {
    a.iter().zip(b.iter())
        .map(|(&av, &bv)| av - bv)          // <a> - <b>
        .map(|v| v * v)                     // <vec_components> ^2
        .sum()                              // sum(<vec_components>^2)
}

/// Euclidean distance between two equally long slices.
#[inline(always)]
pub(crate) fn distance<T: Primitive>(a: &[T], b: &[T]) -> T {
    squared_distance(a, b).sqrt()
}

/// Largest absolute per-coordinate difference between two centroid sets.
pub(crate) fn max_shift<T: Primitive>(previous: &[T], current: &[T]) -> T {
    previous.iter().zip(current.iter())
        .map(|(&p, &c)| (p - c).abs())
        .fold(T::zero(), |acc, d| if d > acc { d } else { acc })
}

/// Amount of samples assigned to each of the `k` clusters.
pub(crate) fn cluster_frequencies(assignments: &[usize], k: usize) -> Vec<usize> {
    let mut centroid_frequency = vec![0usize; k];
    assignments.iter().cloned()
        .for_each(|centroid_id| centroid_frequency[centroid_id] += 1);
    centroid_frequency
}

#[cfg(test)]
macro_rules! assert_approx_eq {
	($left: expr, $right: expr, $tol: expr) => ({
		match ($left, $right, $tol) {
			(left_val , right_val, tol_val) => {
				let delta = (left_val - right_val).abs();
				if !(delta < tol_val) {
					panic!(
						"assertion failed: `(left ≈ right)` \
						(left: `{}`, right: `{}`) \
						with ∆={:1.1e} (allowed ∆={:e})",
						left_val , right_val, delta, tol_val
					)
				}
			}
		}
	});
	($left: expr, $right: expr) => (assert_approx_eq!(($left), ($right), 1e-12))
}
