pub mod filter;
pub mod sweep;

pub use filter::{DropConsecutiveDuplicates, DropInterpolated, FilterPipeline, Slice};
pub use sweep::{sweep, SweepEngine};
