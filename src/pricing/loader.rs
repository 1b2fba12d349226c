use crate::error::AppError;
use crate::pricing::catalog::{CatalogFile, PricingCatalog};
use std::path::Path;
use tracing::{debug, info};

/// Parse and validate a JSON catalog
pub fn parse_catalog_json(content: &str) -> Result<PricingCatalog, AppError> {
    let file: CatalogFile = serde_json::from_str(content)?;
    file.into_catalog()
}

/// Parse and validate a TOML catalog
pub fn parse_catalog_toml(content: &str) -> Result<PricingCatalog, AppError> {
    let file: CatalogFile = toml::from_str(content)?;
    file.into_catalog()
}

/// Load a catalog file, choosing the parser by extension
pub async fn load_catalog_file(path: impl AsRef<Path>) -> Result<PricingCatalog, AppError> {
    let path = path.as_ref();
    info!("Loading pricing catalog from: {}", path.display());

    let content = tokio::fs::read_to_string(path).await?;
    debug!("Read {} bytes of catalog data", content.len());

    let catalog = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => parse_catalog_json(&content)?,
        Some("toml") => parse_catalog_toml(&content)?,
        other => {
            return Err(AppError::ConfigError(format!(
                "Unsupported catalog format: {}",
                other.unwrap_or("<none>")
            )))
        }
    };

    info!(
        "Loaded {} tier tables and {} services",
        catalog.color_class_ids().len(),
        catalog.services().len()
    );
    Ok(catalog)
}

/// Render a catalog as pretty JSON
pub fn export_catalog_json(catalog: &PricingCatalog) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(&catalog.to_file())?)
}
