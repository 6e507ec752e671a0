use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use byte::client::ByteClient;
use byte::config::{ClientConfig, ServerConfig};
use byte::crypto::chain::ServerChain;
use byte::error::Result;
use byte::server::{self, AppState};
use byte::state::{Database, DeviceRegistry};

#[derive(Parser)]
#[command(name = "byte")]
#[command(about = "Personal file server with a derived device-key hierarchy")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve,
    /// Print the derived SSH host key (PKCS#8 PEM)
    HostKey,
    /// Register a device directly in the registry and print its enrollment payload
    NewDevice,
    /// Manage devices over the authenticated RPC channel
    Device {
        #[command(subcommand)]
        command: DeviceCommands,
    },
}

#[derive(Subcommand)]
enum DeviceCommands {
    /// Invite a new device and print its enrollment payload
    Create,
    /// List enrolled devices
    List,
    /// Delete (revoke) a device
    Delete { id: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "byte=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve => serve().await,
        Commands::HostKey => host_key(),
        Commands::NewDevice => new_device().await,
        Commands::Device { command } => device(command).await,
    }
}

async fn serve() -> Result<()> {
    let config = ServerConfig::from_env()?;
    let chain = ServerChain::new(config.secret.as_bytes())?;

    let db = Database::connect(&config.database).await?;
    db.migrate().await?;

    let state = AppState {
        chain,
        registry: Arc::new(db),
    };

    server::serve(state, &config.http_addr).await
}

fn host_key() -> Result<()> {
    let config = ServerConfig::from_env()?;
    let chain = ServerChain::new(config.secret.as_bytes())?;

    print!("{}", chain.ssh_host_key_pem()?);

    Ok(())
}

/// Operator-side bootstrap: enroll a device without an existing inviter.
/// This is how the first device joins a fresh server.
async fn new_device() -> Result<()> {
    let config = ServerConfig::from_env()?;
    let chain = ServerChain::new(config.secret.as_bytes())?;

    let db = Database::connect(&config.database).await?;
    db.migrate().await?;

    let id = uuid::Uuid::new_v4().to_string();
    db.add_device(&id).await?;

    let device_chain = chain.client_chain(&id)?;
    let enrollment = ClientConfig {
        server_url: config.server_url(),
        device_id: id.clone(),
        secret: device_chain.seed().to_base64(),
    };

    println!("Device created");
    println!("Device ID:     {id}");
    println!("Device secret: {}", enrollment.secret);
    println!();
    println!("{}", serde_json::to_string_pretty(&enrollment)?);

    Ok(())
}

async fn device(command: DeviceCommands) -> Result<()> {
    let config = ClientConfig::load(&ClientConfig::default_path())?;
    let client = ByteClient::from_config(&config)?;

    match command {
        DeviceCommands::Create => {
            let new_device = client.create_device().await?;
            let enrollment = new_device.enrollment_config(&config.server_url);

            println!("Device created");
            println!("Device ID:     {}", new_device.id);
            println!("Device secret: {}", enrollment.secret);
            println!();
            println!("{}", serde_json::to_string_pretty(&enrollment)?);
        }
        DeviceCommands::List => {
            for id in client.list_devices().await? {
                println!("{id}");
            }
        }
        DeviceCommands::Delete { id } => {
            client.delete_device(&id).await?;
            println!("deleted {id}");
        }
    }

    Ok(())
}
