use detectify_api_client::DetectifyClient;
use detectify_api_client::config::ProviderConfig;
use detectify_api_client::endpoints::ASSETS;

fn live_tests_enabled() -> bool {
    std::env::var("DETECTIFY_LIVE_TESTS").ok().as_deref() == Some("1")
}

#[tokio::test]
#[ignore]
async fn live_assets_smoke() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    if !live_tests_enabled() {
        return Ok(());
    }

    let config = match ProviderConfig::from_env() {
        Ok(config) => config,
        Err(_) => return Ok(()),
    };
    let client = DetectifyClient::from_config(&config)?;

    let response = client.get(ASSETS)?.send().await?;
    assert!(
        response.status().is_success(),
        "unexpected status {} (signing: {})",
        response.status(),
        client.is_signing()
    );

    Ok(())
}
