use crate::client::ApiClient;
use crate::NamedCommands;
use anyhow::Result;
use ipam_server::models::{CreateNamed, DeviceType};

pub async fn handle(client: ApiClient, action: NamedCommands) -> Result<()> {
    match action {
        NamedCommands::List => list(client).await,
        NamedCommands::Create { name } => create(client, name).await,
    }
}

async fn list(client: ApiClient) -> Result<()> {
    let device_types: Vec<DeviceType> = client.get("/api/device-types").await?;

    if device_types.is_empty() {
        println!("No device types configured");
    } else {
        println!("{:<5} {:<30}", "ID", "Name");
        println!("{}", "-".repeat(40));

        for device_type in device_types {
            println!("{:<5} {:<30}", device_type.id, device_type.name);
        }
    }

    Ok(())
}

async fn create(client: ApiClient, name: String) -> Result<()> {
    let device_type: DeviceType = client
        .post("/api/device-types", &CreateNamed { name })
        .await?;
    println!("Device type created with ID: {}", device_type.id);
    Ok(())
}
