//! Reads quiz catalogs from JSON.
//!
//! ```json
//! {
//!   "reference_total": 8000000000,
//!   "items": [
//!     { "id": "France", "weight": 68000000, "coordinates": [46.0, 2.0] }
//!   ]
//! }
//! ```

use std::path::Path;

use flagquiz_core::model::{Catalog, CatalogDraft};

use crate::error::CatalogLoadError;

/// Parse and validate a catalog from a JSON string.
///
/// # Errors
///
/// Returns `CatalogLoadError::Json` for malformed input and
/// `CatalogLoadError::Catalog` for invalid items.
pub fn parse_catalog(json: &str) -> Result<Catalog, CatalogLoadError> {
    let draft: CatalogDraft = serde_json::from_str(json)?;
    Ok(draft.validate()?)
}

/// Read and validate a catalog file.
///
/// # Errors
///
/// Returns `CatalogLoadError` if the file cannot be read or parsed.
pub fn load_catalog_file(path: impl AsRef<Path>) -> Result<Catalog, CatalogLoadError> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    let catalog = parse_catalog(&raw)?;
    tracing::debug!(
        path = %path.as_ref().display(),
        items = catalog.len(),
        "catalog loaded"
    );
    Ok(catalog)
}
