//! Catalog command implementation

use crate::cli::output::{format_catalog_table, format_json};
use crate::cli::{CatalogArgs, Context};
use serde_json::json;

/// Handle `breakeven catalog` command
pub fn handle_catalog(
    args: &CatalogArgs,
    ctx: &Context,
) -> Result<String, Box<dyn std::error::Error>> {
    let catalog = &ctx.catalog;
    if let Some(provider) = args.provider {
        if catalog.provider(provider).is_none() {
            return Err(format!("Provider not in catalog: {}", provider).into());
        }
    }

    let entries: Vec<_> = catalog
        .entries()
        .iter()
        .filter(|e| args.provider.map_or(true, |p| e.provider == p))
        .collect();

    if args.common.json {
        let providers: Vec<_> = catalog
            .providers()
            .filter(|info| args.provider.map_or(true, |p| info.provider == p))
            .collect();
        return Ok(format_json(&json!({
            "version": catalog.version(),
            "effective_date": catalog.effective_date(),
            "providers": providers,
            "entries": entries,
        }))?);
    }

    Ok(format!(
        "Pricing catalog {} (effective {})\n{}",
        catalog.version(),
        catalog.effective_date(),
        format_catalog_table(&entries)
    ))
}
