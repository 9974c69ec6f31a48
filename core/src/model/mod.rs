pub mod loss;
pub mod profile;
pub mod record;
pub mod sweep;

pub use loss::{LossEvent, LossMarker, LossTable};
pub use profile::{ApertureSeries, Plane, Profile};
pub use record::{ApertureRecord, Shape, ShapeKind, INTERPOLATED_NAME, PARAM_COUNT};
pub use sweep::{AngleSweep, Reflection, RejectedRecord, SweepPoint, SweepResult};
