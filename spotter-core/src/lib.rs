pub mod error;
pub mod settings;
pub mod types;

pub use error::{Error, Result};
pub use settings::{CameraTopics, MotherSettings, SettingsError};
pub use types::{Header, Point3, PointStamped};
