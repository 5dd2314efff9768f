use crate::client::ApiClient;
use crate::IpCommands;
use anyhow::Result;
use ipam_server::models::{IpChange, IpEntry, IpPage, IpPatch, NewIp};

pub async fn handle(client: ApiClient, action: IpCommands) -> Result<()> {
    match action {
        IpCommands::List { branch_id, page } => list(client, branch_id, page).await,
        IpCommands::Add {
            ip,
            name,
            device_type_id,
            subnet_id,
            branch_id,
            description,
        } => {
            let new_ip = NewIp {
                ip_address: ip,
                device_name: name,
                device_type_id,
                subnet_id,
                branch_id,
                description,
            };
            add(client, new_ip).await
        }
        IpCommands::Update {
            id,
            ip,
            name,
            device_type_id,
            subnet_id,
            description,
        } => {
            let patch = IpPatch {
                ip_address: ip,
                device_name: name,
                device_type_id,
                subnet_id,
                description,
            };
            update(client, id, patch).await
        }
        IpCommands::Delete { id } => delete(client, id).await,
    }
}

fn print_entries(entries: &[IpEntry]) {
    println!(
        "{:<6} {:<16} {:<28} {:<14} {:<16} {:<30}",
        "ID", "IP Address", "Device", "Type", "Mask", "Description"
    );
    println!("{}", "-".repeat(110));

    for entry in entries {
        println!(
            "{:<6} {:<16} {:<28} {:<14} {:<16} {:<30}",
            entry.id,
            entry.ip_address,
            entry.device_name,
            entry.device_type,
            entry.subnet_mask,
            entry.description.as_deref().unwrap_or("-")
        );
    }
}

async fn list(client: ApiClient, branch_id: i64, page: u32) -> Result<()> {
    let result: IpPage = client
        .get(&format!("/api/ips?branch_id={}&page={}", branch_id, page))
        .await?;

    if result.ips.is_empty() {
        println!("No addresses on page {}", result.pagination.current_page);
    } else {
        print_entries(&result.ips);
    }
    println!(
        "Page {}/{} ({} addresses)",
        result.pagination.current_page,
        result.pagination.total_pages,
        result.pagination.total_records
    );

    Ok(())
}

async fn add(client: ApiClient, new_ip: NewIp) -> Result<()> {
    let change: IpChange = client.post("/api/ips", &new_ip).await?;
    println!("{} (ID: {})", change.message, change.ip.id);
    Ok(())
}

async fn update(client: ApiClient, id: i64, patch: IpPatch) -> Result<()> {
    if patch.is_empty() {
        anyhow::bail!("Nothing to update: pass at least one field");
    }
    let change: IpChange = client.put(&format!("/api/ips/{}", id), &patch).await?;
    println!("{}", change.message);
    print_entries(std::slice::from_ref(&change.ip));
    Ok(())
}

async fn delete(client: ApiClient, id: i64) -> Result<()> {
    client.delete(&format!("/api/ips/{}", id)).await?;
    println!("Address {} deleted", id);
    Ok(())
}
