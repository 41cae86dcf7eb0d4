pub(crate) mod lloyd;
pub(crate) mod parallel;
pub(crate) mod linfa_kmeans;

pub use parallel::ParallelLloyd;
pub use linfa_kmeans::LinfaKMeans;
