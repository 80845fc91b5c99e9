use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::Folder;
use crate::domain::models::Model;
use crate::domain::models::ModelMatch;
use crate::domain::models::Tenant;

#[async_trait]
pub trait ApiClient: Send + Sync {
    fn tenant(&self) -> &Tenant;
    async fn list_folders(&self) -> Result<Vec<Folder>>;
    async fn list_models(&self, folder_id: Option<u64>, search: Option<String>)
        -> Result<Vec<Model>>;
    async fn find_matches(&self, model_id: Uuid) -> Result<Vec<ModelMatch>>;
}

pub type ApiClientBox = Box<dyn ApiClient>;

/// Builds the client for a tenant once the user selects it.
pub type ApiClientFactory = Box<dyn Fn(&Tenant) -> Result<ApiClientBox> + Send + Sync>;
