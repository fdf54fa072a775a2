//! Concrete [`crate::strategy::RefreshStrategy`] implementations, one per
//! provider family.

mod copilot;
mod google_oidc;
mod kiro_social;
mod opaque;

pub use copilot::CopilotExchangeStrategy;
pub use google_oidc::GoogleOidcRefreshStrategy;
pub use kiro_social::KiroSocialRefreshStrategy;
pub use opaque::OpaqueApiKeyStrategy;
