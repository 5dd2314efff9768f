use crate::client::ApiClient;
use crate::{BulkCommands, RangeArgs};
use anyhow::{bail, Result};
use ipam_range::RangeSpec;
use ipam_server::bulk::BulkInsertPayload;
use ipam_server::handlers::bulk::BulkInsertResponse;

const PREVIEW_COUNT: usize = 5;

pub async fn handle(client: ApiClient, action: BulkCommands) -> Result<()> {
    match action {
        BulkCommands::Insert {
            range,
            subnet_id,
            device_type_id,
            branch_id,
            description,
            skip_existing,
            batch_size,
            enhanced,
        } => {
            let payload = BulkInsertPayload {
                start_ip: range.start_ip,
                end_ip: range.end_ip,
                network_prefix: range.network_prefix,
                start_octet: range.start_octet.map(u32::from),
                end_octet: range.end_octet.map(u32::from),
                subnet_id: Some(subnet_id.into()),
                device_type_id: Some(device_type_id.into()),
                branch_id: Some(branch_id.into()),
                device_name_prefix: Some(range.prefix),
                description,
                skip_existing,
                batch_size,
            };
            insert(client, payload, enhanced).await
        }
        BulkCommands::Preview { range, batch_size } => preview(&range, batch_size),
    }
}

fn range_spec(range: &RangeArgs) -> Result<RangeSpec> {
    let spec = match (&range.start_ip, &range.end_ip, &range.network_prefix) {
        (Some(start), Some(end), None) => RangeSpec::from_addresses(start, end)?,
        (None, None, Some(prefix)) => match (range.start_octet, range.end_octet) {
            (Some(start), Some(end)) => RangeSpec::from_octets(prefix, start, end)?,
            _ => bail!("--network-prefix needs --start-octet and --end-octet"),
        },
        _ => bail!("Give either --start-ip/--end-ip or --network-prefix with octets"),
    };
    Ok(spec)
}

async fn insert(client: ApiClient, payload: BulkInsertPayload, enhanced: bool) -> Result<()> {
    let path = if enhanced {
        "/api/ips/bulk/enhanced"
    } else {
        "/api/ips/bulk"
    };
    let result: BulkInsertResponse = client.post(path, &payload).await?;

    println!("{}", result.message);
    println!("  Range:     {} - {}", result.start_ip, result.end_ip);
    println!("  Processed: {}", result.total_processed);
    println!("  Inserted:  {}", result.inserted);
    println!("  Skipped:   {}", result.skipped);

    if let Some(warning) = &result.warning {
        println!("Warning: {}", warning);
    }
    for error in &result.errors {
        println!("  ! {}", error);
    }

    Ok(())
}

fn preview(range: &RangeArgs, batch_size: usize) -> Result<()> {
    let spec = range_spec(range)?;
    let batch_size = batch_size.max(1) as u64;
    let total = spec.total();

    println!("{:<18} {:<30}", "IP Address", "Device Name");
    println!("{}", "-".repeat(48));
    for candidate in spec.expander(range.prefix.as_str()).preview(PREVIEW_COUNT) {
        println!("{:<18} {:<30}", candidate.ip_address, candidate.device_name);
    }
    if total > PREVIEW_COUNT as u64 {
        println!("... and {} more", total - PREVIEW_COUNT as u64);
    }

    println!();
    println!("Total addresses: {}", total);
    println!("Batches of {}: {}", batch_size, total.div_ceil(batch_size));

    Ok(())
}
