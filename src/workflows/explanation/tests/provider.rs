use crate::config::ExplanationSettings;
use crate::workflows::explanation::provider::{AnthropicProvider, ProviderError, TokenPricing};

fn configured(base_url: &str) -> AnthropicProvider {
    let settings = ExplanationSettings {
        api_key: Some("test-key".to_string()),
        base_url: base_url.to_string(),
        ..ExplanationSettings::default()
    };
    AnthropicProvider::new(&settings).expect("client builds")
}

#[test]
fn missing_api_key_is_reported() {
    let err = AnthropicProvider::new(&ExplanationSettings::default())
        .err()
        .expect("key required");
    assert!(matches!(err, ProviderError::NotConfigured(_)));
}

#[test]
fn endpoint_accepts_bare_and_versioned_base_urls() {
    for base in [
        "https://api.anthropic.com",
        "https://api.anthropic.com/",
        "https://api.anthropic.com/v1",
        "https://api.anthropic.com/v1/messages",
    ] {
        assert_eq!(
            configured(base).endpoint(),
            "https://api.anthropic.com/v1/messages"
        );
    }
}

#[test]
fn cost_is_priced_per_million_tokens() {
    let pricing = TokenPricing {
        input_per_mtok: 0.8,
        output_per_mtok: 4.0,
    };

    let cost = pricing.cost(1_000_000, 250_000);
    assert!((cost - 1.8).abs() < 1e-9);
}
