use crate::{ClusterError, Primitive, Result};

/// Read-only n×d table of observations, stored row-major.
///
/// Construction validates the shape and rejects non-finite values, so every
/// later stage can assume a rectangular, NaN-free table. Clustering never
/// mutates it, which lets runs share one instance by reference.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMatrix<T: Primitive> {
    pub(crate) sample_cnt: usize,
    pub(crate) sample_dims: usize,
    pub(crate) samples: Vec<T>,
}
impl<T: Primitive> FeatureMatrix<T> {
    /// Create a new [`FeatureMatrix`].
    ///
    /// ## Arguments
    /// - **samples**: Vector of samples [row-major] = [<sample0>,<sample1>,<sample2>,...]
    /// - **sample_cnt**: Amount of samples, contained in the passed **samples** vector
    /// - **sample_dims**: Amount of dimensions each sample from the **samples** vector has
    ///
    /// ## Errors
    /// - [`ClusterError::EmptyInput`] if either **sample_cnt** or **sample_dims** is zero
    /// - [`ClusterError::DimensionMismatch`] if `samples.len() != sample_cnt * sample_dims`
    /// - [`ClusterError::NonFiniteValue`] on the first NaN or infinite value
    /// - [`ClusterError::ValueOutOfRange`] on the first value whose magnitude exceeds
    ///   [`FeatureMatrix::magnitude_limit`]
    pub fn new(samples: Vec<T>, sample_cnt: usize, sample_dims: usize) -> Result<Self> {
        if sample_cnt == 0 || sample_dims == 0 {
            return Err(ClusterError::EmptyInput { samples: sample_cnt, dims: sample_dims });
        }
        if samples.len() != sample_cnt * sample_dims {
            return Err(ClusterError::DimensionMismatch { expected: sample_cnt * sample_dims, actual: samples.len() });
        }
        if let Some(pos) = samples.iter().position(|v| !v.is_finite()) {
            return Err(ClusterError::NonFiniteValue { row: pos / sample_dims, column: pos % sample_dims });
        }
        let limit = magnitude_limit::<T>(sample_cnt, sample_dims);
        if let Some(pos) = samples.iter().position(|v| v.abs() > limit) {
            return Err(ClusterError::ValueOutOfRange { row: pos / sample_dims, column: pos % sample_dims });
        }
        Ok(Self { sample_cnt, sample_dims, samples })
    }

    /// Create a [`FeatureMatrix`] from a slice of rows. All rows must share the length of the first one.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self> {
        let sample_dims = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut samples = Vec::with_capacity(rows.len() * sample_dims);
        for row in rows {
            let row = row.as_ref();
            if row.len() != sample_dims {
                return Err(ClusterError::DimensionMismatch { expected: sample_dims, actual: row.len() });
            }
            samples.extend_from_slice(row);
        }
        Self::new(samples, rows.len(), sample_dims)
    }

    /// Amount of observations (n)
    pub fn sample_cnt(&self) -> usize { self.sample_cnt }
    /// Dimensionality of each observation (d)
    pub fn sample_dims(&self) -> usize { self.sample_dims }
    /// Row-major view of all samples
    pub fn as_slice(&self) -> &[T] { &self.samples }

    /// The `idx`-th observation. Panics if `idx >= sample_cnt`.
    pub fn row(&self, idx: usize) -> &[T] {
        &self.samples[idx * self.sample_dims..(idx + 1) * self.sample_dims]
    }

    /// Iterate over all observations in order.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, T> {
        self.samples.chunks_exact(self.sample_dims)
    }

    /// Column-wise mean of all observations.
    pub fn column_means(&self) -> Vec<T> {
        let mut means = vec![T::zero(); self.sample_dims];
        self.rows().for_each(|s| {
            means.iter_mut().zip(s.iter()).for_each(|(m, &v)| *m += v);
        });
        let cnt = crate::primitive::from_count::<T>(self.sample_cnt);
        means.iter_mut().for_each(|m| *m = *m / cnt);
        means
    }

    /// Largest magnitude a value (of a sample or a centroid) may have.
    ///
    /// Chosen as `sqrt(T::MAX / (4·n·d))`, so that neither a squared distance between two rows
    /// nor the sum of all `n` of them (the WCSS) can overflow.
    pub fn magnitude_limit(&self) -> T {
        magnitude_limit(self.sample_cnt, self.sample_dims)
    }

    /// Validate a row-major centroid buffer, e.g. one written by an initializer.
    ///
    /// ## Errors
    /// - [`ClusterError::DimensionMismatch`] if the buffer does not hold exactly `k` centroids of `d` values
    /// - [`ClusterError::NonFiniteValue`] / [`ClusterError::ValueOutOfRange`] with `row` being the centroid index
    pub(crate) fn check_centroids(&self, centroids: &[T], k: usize) -> Result<()> {
        let expected = k * self.sample_dims;
        if centroids.len() != expected {
            return Err(ClusterError::DimensionMismatch { expected, actual: centroids.len() });
        }
        if let Some(pos) = centroids.iter().position(|v| !v.is_finite()) {
            return Err(ClusterError::NonFiniteValue { row: pos / self.sample_dims, column: pos % self.sample_dims });
        }
        let limit = self.magnitude_limit();
        if let Some(pos) = centroids.iter().position(|v| v.abs() > limit) {
            return Err(ClusterError::ValueOutOfRange { row: pos / self.sample_dims, column: pos % self.sample_dims });
        }
        Ok(())
    }

    pub(crate) fn check_k(&self, k: usize) -> Result<()> {
        if k < 1 || k > self.sample_cnt {
            return Err(ClusterError::InvalidK { k, n: self.sample_cnt });
        }
        Ok(())
    }
}

fn magnitude_limit<T: Primitive>(sample_cnt: usize, sample_dims: usize) -> T {
    let cells = sample_cnt.saturating_mul(sample_dims).saturating_mul(4);
    (T::max_value() / crate::primitive::from_count::<T>(cells)).sqrt()
}
