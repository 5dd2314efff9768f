use crate::client::ApiClient;
use crate::NamedCommands;
use anyhow::Result;
use ipam_server::models::{Branch, CreateNamed};

pub async fn handle(client: ApiClient, action: NamedCommands) -> Result<()> {
    match action {
        NamedCommands::List => list(client).await,
        NamedCommands::Create { name } => create(client, name).await,
    }
}

async fn list(client: ApiClient) -> Result<()> {
    let branches: Vec<Branch> = client.get("/api/branches").await?;

    if branches.is_empty() {
        println!("No branches configured");
    } else {
        println!("{:<5} {:<30} {:<10}", "ID", "Name", "IPs");
        println!("{}", "-".repeat(50));

        for branch in branches {
            println!("{:<5} {:<30} {:<10}", branch.id, branch.name, branch.ip_count);
        }
    }

    Ok(())
}

async fn create(client: ApiClient, name: String) -> Result<()> {
    let branch: Branch = client.post("/api/branches", &CreateNamed { name }).await?;
    println!("Branch created with ID: {}", branch.id);
    Ok(())
}
