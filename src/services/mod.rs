mod engine;
mod steps;
mod temp_images;

pub use engine::{BackupReport, ConvertReport, Outcome, RestoreReport, Workflows};
pub use steps::Compensation;
pub use temp_images::TempImages;
