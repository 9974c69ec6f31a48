pub mod loss_loader;
pub mod profile_loader;
pub mod table;

pub use loss_loader::{load_losses, parse_losses};
pub use profile_loader::{load_profile, load_profile_with, parse_profile, LoadOptions};
