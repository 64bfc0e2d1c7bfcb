// src/services/registry.rs

use crate::error::Result;
use crate::models::ProjectDescriptor;
use crate::services::WebFetch;

/// Download and parse the published project registry.
pub async fn fetch_registry(web: &dyn WebFetch, url: &str) -> Result<Vec<ProjectDescriptor>> {
    log::info!("Fetching project registry from {}", url);
    let body = web.get_text(url).await?;
    let projects: Vec<ProjectDescriptor> = serde_json::from_str(&body)?;
    log::info!("Registry lists {} projects", projects.len());
    Ok(projects)
}
