mod client;
mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ipam-cli")]
#[command(about = "IPAM Server CLI", long_about = None)]
struct Cli {
    /// API server URL (http://...) or Unix socket path (default: /var/run/ipam-server.sock)
    #[arg(long, short = 'u')]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage branches
    Branch {
        #[command(subcommand)]
        action: NamedCommands,
    },
    /// Manage device types
    DeviceType {
        #[command(subcommand)]
        action: NamedCommands,
    },
    /// View subnets
    Subnet {
        #[command(subcommand)]
        action: SubnetCommands,
    },
    /// View a branch's /24 networks
    Network {
        #[command(subcommand)]
        action: NetworkCommands,
    },
    /// Manage IP addresses
    Ip {
        #[command(subcommand)]
        action: IpCommands,
    },
    /// Insert whole address ranges
    Bulk {
        #[command(subcommand)]
        action: BulkCommands,
    },
}

#[derive(Subcommand)]
enum NamedCommands {
    /// List entries
    List,
    /// Create an entry
    Create {
        /// Name of the new entry
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand)]
enum SubnetCommands {
    /// List all subnets
    List,
}

#[derive(Subcommand)]
enum NetworkCommands {
    /// List networks of a branch
    List {
        #[arg(long)]
        branch_id: i64,
    },
}

#[derive(Subcommand)]
enum IpCommands {
    /// List a branch's addresses
    List {
        #[arg(long)]
        branch_id: i64,
        /// Page number (10 addresses per page)
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Register an address
    Add {
        /// IP address (e.g., 192.168.1.10)
        #[arg(long)]
        ip: String,
        /// Device name
        #[arg(long)]
        name: String,
        #[arg(long)]
        device_type_id: i64,
        #[arg(long)]
        subnet_id: i64,
        #[arg(long)]
        branch_id: i64,
        #[arg(long)]
        description: Option<String>,
    },
    /// Update an address
    Update {
        /// Address ID
        id: i64,
        #[arg(long)]
        ip: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        device_type_id: Option<i64>,
        #[arg(long)]
        subnet_id: Option<i64>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an address
    Delete {
        /// Address ID
        id: i64,
    },
}

/// Range given either as two full addresses or as last octets under a prefix
#[derive(Args, Clone)]
pub struct RangeArgs {
    /// First address (e.g., 10.0.0.1)
    #[arg(long, requires = "end_ip", conflicts_with = "network_prefix")]
    start_ip: Option<String>,
    /// Last address (e.g., 10.0.3.254)
    #[arg(long, requires = "start_ip")]
    end_ip: Option<String>,
    /// First three octets (e.g., 192.168.1)
    #[arg(long, requires_all = ["start_octet", "end_octet"])]
    network_prefix: Option<String>,
    #[arg(long)]
    start_octet: Option<u8>,
    #[arg(long)]
    end_octet: Option<u8>,
    /// Device name prefix
    #[arg(long, default_value = "Device")]
    prefix: String,
}

#[derive(Subcommand)]
enum BulkCommands {
    /// Insert every address of a range
    Insert {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long)]
        subnet_id: i64,
        #[arg(long)]
        device_type_id: i64,
        #[arg(long)]
        branch_id: i64,
        #[arg(long)]
        description: Option<String>,
        /// Skip addresses that already exist instead of reporting them
        #[arg(long)]
        skip_existing: bool,
        #[arg(long)]
        batch_size: Option<i64>,
        /// Validate references first and allow larger ranges
        #[arg(long)]
        enhanced: bool,
    },
    /// Show what a range would insert without contacting the server
    Preview {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long, default_value_t = 1000)]
        batch_size: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let client = match &cli.api_url {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
            client::ApiClient::new_http(url)
        }
        Some(path) => client::ApiClient::new_unix(path),
        None => client::ApiClient::new_unix("/var/run/ipam-server.sock"),
    };

    match cli.command {
        Commands::Branch { action } => {
            commands::branch::handle(client, action).await?;
        }
        Commands::DeviceType { action } => {
            commands::device_type::handle(client, action).await?;
        }
        Commands::Subnet { action } => {
            commands::subnet::handle(client, action).await?;
        }
        Commands::Network { action } => {
            commands::subnet::handle_networks(client, action).await?;
        }
        Commands::Ip { action } => {
            commands::ip::handle(client, action).await?;
        }
        Commands::Bulk { action } => {
            commands::bulk::handle(client, action).await?;
        }
    }

    Ok(())
}
