pub mod home;
pub mod settings;

pub use home::HomeScreen;
pub use settings::{SettingsScreen, TempUnit};
