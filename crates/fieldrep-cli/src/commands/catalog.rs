use std::path::Path;

use crate::commands::common::{
    format_client_lines, format_product_lines, format_reason_lines, open_service,
};
use crate::error::CliError;

pub async fn run_clients(
    region: Option<&str>,
    search: Option<&str>,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let service = open_service(db_path).await?;
    let mut clients = match search.map(str::trim).filter(|term| !term.is_empty()) {
        Some(term) => service.search_clients(term).await?,
        None => service.clients(region).await?,
    };
    if search.is_some() {
        if let Some(region) = region {
            clients.retain(|client| client.region == region);
        }
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(&clients)?);
    } else if clients.is_empty() {
        println!("No clients stored locally. Run `fieldrep sync` to pull them.");
    } else {
        for line in format_client_lines(&clients) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn run_products(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let products = open_service(db_path).await?.products().await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&products)?);
    } else if products.is_empty() {
        println!("No products stored locally. Run `fieldrep sync` to pull the catalog.");
    } else {
        for line in format_product_lines(&products) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn run_reasons(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let reasons = open_service(db_path).await?.discount_reasons().await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&reasons)?);
    } else if reasons.is_empty() {
        println!("No discount reasons stored locally. Run `fieldrep sync` to pull them.");
    } else {
        for line in format_reason_lines(&reasons) {
            println!("{line}");
        }
    }
    Ok(())
}
