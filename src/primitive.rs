use num::{Float, NumCast, Zero};
use rand::distributions::uniform::SampleUniform;
use std::{
    fmt::{Debug, Display, LowerExp},
    iter::Sum,
    ops::{AddAssign, SubAssign},
};

/// Floating point types the clustering code can run on.
///
/// The `for<'a> AddAssign<&'a Self>` and [`SampleUniform`] bounds are what
/// `rand`'s `WeightedIndex` needs for the k-means++ draw.
pub trait Primitive: AddAssign + SubAssign + Sum + Zero + Float + NumCast + SampleUniform
                + PartialOrd + Copy + Default + Display + Debug + Sync + Send + LowerExp + 'static
                + for<'a> AddAssign<&'a Self> {}
impl Primitive for f32 {}
impl Primitive for f64 {}

/// Convert a count into `T`. Every `usize` is representable (possibly rounded) in `f32`/`f64`.
#[inline(always)]
pub(crate) fn from_count<T: Primitive>(cnt: usize) -> T {
    T::from(cnt).unwrap_or_else(T::infinity)
}
