//! Aperture envelope core for accelerator beam pipes.
//!
//! A profile is read from an aperture dump, optionally thinned by row
//! filters, and swept over viewing angles to obtain the radial boundary of
//! the beam pipe at every longitudinal position. The output is a plain list
//! of `(s, x, y)` points per angle, independent of how it is drawn.

pub mod geometry;
pub mod io;
pub mod model;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use io::{load_losses, load_profile, LoadOptions};
pub use model::{ApertureRecord, Profile, Shape, ShapeKind, SweepResult};
pub use prelude::{ApertureError, ApertureResult, MirrorMode, MirrorSpec, RenderStyle, SweepConfig};
pub use processing::{sweep, FilterPipeline, SweepEngine};
