//! Kimi provider descriptor.

use quotio_core::{IconStyle, ProviderBranding, ProviderColor, ProviderKind, ProviderMetadata};
use quotio_fetch::{FetchContext, FetchPipeline, SourceMode};

use crate::descriptor::{CliConfig, FetchPlan, ProviderDescriptor, TokenCostConfig};
use super::strategies::KimiPtyStrategy;

/// Creates the Kimi provider descriptor.
pub fn kimi_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ProviderKind::Kimi,
        metadata: kimi_metadata(),
        branding: kimi_branding(),
        token_cost: TokenCostConfig::default(),
        fetch_plan: kimi_fetch_plan(),
        cli: kimi_cli_config(),
    }
}

fn kimi_metadata() -> ProviderMetadata {
    ProviderMetadata {
        id: ProviderKind::Kimi,
        display_name: "Kimi".to_string(),
        session_label: "5h window".to_string(),
        weekly_label: "Weekly".to_string(),
        opus_label: None,
        supports_opus: false,
        supports_credits: false,
        credits_hint: String::new(),
        toggle_title: "Show Kimi usage".to_string(),
        cli_name: "kimi".to_string(),
        default_enabled: false,
        is_primary_provider: false,
        uses_account_fallback: false,
        dashboard_url: Some("https://platform.moonshot.ai/console".to_string()),
        subscription_dashboard_url: Some("https://platform.moonshot.ai/console/billing".to_string()),
        status_page_url: None,
        status_link_url: None,
    }
}

fn kimi_branding() -> ProviderBranding {
    ProviderBranding {
        icon_style: IconStyle::Kimi,
        icon_resource_name: "icon_kimi".to_string(),
        color: ProviderColor::new(0.1, 0.1, 0.1),
    }
}

fn kimi_fetch_plan() -> FetchPlan {
    FetchPlan {
        source_modes: vec![SourceMode::CLI],
        build_pipeline: build_kimi_pipeline,
    }
}

fn build_kimi_pipeline(ctx: &FetchContext) -> FetchPipeline {
    let mut strategies: Vec<Box<dyn quotio_fetch::FetchStrategy>> = Vec::new();

    if ctx.settings.source_mode.allows_cli() {
        strategies.push(Box::new(KimiPtyStrategy::new()));
    }

    FetchPipeline::with_strategies(strategies)
}

fn kimi_cli_config() -> CliConfig {
    CliConfig {
        name: "kimi",
        aliases: &["moonshot"],
        version_args: &["--version"],
        usage_args: &["/usage"],
    }
}
