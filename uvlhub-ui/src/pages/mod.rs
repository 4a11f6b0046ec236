pub mod sessions;
pub mod two_factor;

pub use sessions::SessionsPanel;
pub use two_factor::{TwoFactorSetup, TwoFactorSetupData};
