pub mod requirements;

pub use requirements::{RequirementsFormatter, REQUIREMENTS_FILE};
