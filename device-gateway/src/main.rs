//! Device gateway - prints the hub inventory, then relays live events to the log.

use std::env;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use device_gateway::{events, DeviceGatewayClient, GatewayConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    println!("device-gateway {}", VERSION);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle --version / -V
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        print_version();
        return Ok(());
    }

    // Load configuration
    let config = GatewayConfig::load().map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Check gateway.toml or the GATEWAY__SECTION__KEY / NEXT_PUBLIC_API_URL environment variables.",
            e
        )
    })?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = DeviceGatewayClient::new(&config)?;
    tracing::info!("Starting device-gateway against {}", client.base_url());

    log_inventory(&client).await;

    for event in events::ALL {
        client.on(event, move |payload| {
            tracing::info!("[{}] {}", event, payload);
        });
    }

    client.connect().await;
    tracing::info!("Listening on {}", client.stream_url());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Received Ctrl+C, shutting down");

    client.disconnect().await;
    Ok(())
}

/// Log devices grouped by room. Failures are logged, not fatal.
async fn log_inventory(client: &DeviceGatewayClient) {
    let devices = match client.get_devices().await.into_result() {
        Ok(devices) => devices,
        Err(e) => {
            tracing::warn!("Could not list devices: {}", e);
            return;
        }
    };

    let rooms = client.get_rooms().await.into_result().unwrap_or_else(|e| {
        tracing::warn!("Could not list rooms: {}", e);
        vec![]
    });

    for room in &rooms {
        let members: Vec<&str> = devices
            .iter()
            .filter(|d| room.contains(&d.id))
            .map(|d| d.name.as_str())
            .collect();
        tracing::info!("{} ({}): {}", room.name, room.room_type, members.join(", "));
    }

    let online = devices.iter().filter(|d| d.is_online()).count();
    tracing::info!(
        "{} devices, {} online, {} rooms",
        devices.len(),
        online,
        rooms.len()
    );
}
