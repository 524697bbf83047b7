use anypay::{AnyPayClient, AnyPayConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Reads ANYPAY_API_ID, ANYPAY_API_KEY, ANYPAY_SECRET_KEY (and optional ANYPAY_PROJECT_ID)
    #[cfg(feature = "env-file")]
    let config = AnyPayConfig::from_env_file("anypay")?;
    #[cfg(not(feature = "env-file"))]
    let config = AnyPayConfig::from_env("anypay")?;

    let client = AnyPayClient::from_config(config)?;

    println!("Fetching balance...");
    match client.get_balance().await {
        Ok(balance) => println!("Balance: {}", balance),
        Err(e) => println!("Error fetching balance: {}", e),
    }

    match client.get_service_ip().await {
        Ok(info) => println!("Notification sources: {:?}", info.addresses()),
        Err(e) => println!("Error fetching notification addresses: {}", e),
    }

    Ok(())
}
