use crate::client::ApiClient;
use crate::{NetworkCommands, SubnetCommands};
use anyhow::Result;
use ipam_server::models::{NetworkSummary, Subnet};

pub async fn handle(client: ApiClient, action: SubnetCommands) -> Result<()> {
    match action {
        SubnetCommands::List => list(client).await,
    }
}

pub async fn handle_networks(client: ApiClient, action: NetworkCommands) -> Result<()> {
    match action {
        NetworkCommands::List { branch_id } => list_networks(client, branch_id).await,
    }
}

async fn list(client: ApiClient) -> Result<()> {
    let subnets: Vec<Subnet> = client.get("/api/subnets").await?;

    println!("{:<5} {:<8} {:<18}", "ID", "Prefix", "Mask");
    println!("{}", "-".repeat(35));

    for subnet in subnets {
        println!("{:<5} /{:<7} {:<18}", subnet.id, subnet.prefix, subnet.subnet_mask);
    }

    Ok(())
}

async fn list_networks(client: ApiClient, branch_id: i64) -> Result<()> {
    let networks: Vec<NetworkSummary> = client
        .get(&format!("/api/networks?branch_id={}", branch_id))
        .await?;

    if networks.is_empty() {
        println!("No addresses in branch {}", branch_id);
    } else {
        println!("{:<18} {:<8} {:<18} {:<8}", "Network", "Prefix", "Mask", "IPs");
        println!("{}", "-".repeat(55));

        for network in networks {
            println!(
                "{:<18} /{:<7} {:<18} {:<8}",
                network.network, network.prefix, network.subnet_mask, network.ip_count
            );
        }
    }

    Ok(())
}
