use std::time::Duration;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::models::ApiClient;
use crate::domain::models::Folder;
use crate::domain::models::Model;
use crate::domain::models::ModelMatch;
use crate::domain::models::Tenant;

#[cfg(test)]
#[path = "physna_test.rs"]
mod tests;

const PAGE_SIZE: u32 = 100;
const MAX_PAGES: u32 = 50;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct PageData {
    #[serde(default)]
    last_page: u32,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct FoldersResponse {
    folders: Vec<Folder>,
    #[serde(default)]
    page_data: PageData,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ModelsResponse {
    models: Vec<Model>,
    #[serde(default)]
    page_data: PageData,
}

#[derive(Deserialize, Debug)]
struct MatchesResponse {
    matches: Vec<ModelMatch>,
}

pub struct Physna {
    tenant: Tenant,
    client: reqwest::Client,
    timeout: Duration,
    match_threshold: f64,
}

impl Physna {
    pub fn new(tenant: &Tenant, timeout: Duration, match_threshold: f64) -> Result<Physna> {
        tenant.validate()?;

        return Ok(Physna {
            tenant: tenant.clone(),
            client: reqwest::Client::new(),
            timeout,
            match_threshold,
        });
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.tenant.base_url(), path);

        let mut req = self
            .client
            .get(&url)
            .query(query)
            .header("Accept", "application/json")
            .timeout(self.timeout);

        if let Some(token) = &self.tenant.access_token {
            req = req.bearer_auth(token);
        }

        let res = req
            .send()
            .await
            .with_context(|| format!("{} is not reachable", self.tenant.base_url()))?;

        let status = res.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let body = res
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            tracing::error!(status = status_code, body = %body, path = path, "Physna request failed");
            bail!("GET {path} returned status {status_code}");
        }

        let body = res
            .json::<T>()
            .await
            .with_context(|| format!("GET {path} returned an unexpected response"))?;

        return Ok(body);
    }
}

#[async_trait]
impl ApiClient for Physna {
    fn tenant(&self) -> &Tenant {
        return &self.tenant;
    }

    async fn list_folders(&self) -> Result<Vec<Folder>> {
        let mut folders = vec![];

        for page in 1..=MAX_PAGES {
            let query = vec![("page", page.to_string()), ("perPage", PAGE_SIZE.to_string())];
            let res: FoldersResponse = self.get("/v2/folders", &query).await?;
            folders.extend(res.folders);

            if page >= res.page_data.last_page {
                break;
            }
        }

        tracing::debug!(tenant = self.tenant.id, count = folders.len(), "listed folders");
        return Ok(folders);
    }

    async fn list_models(
        &self,
        folder_id: Option<u64>,
        search: Option<String>,
    ) -> Result<Vec<Model>> {
        let mut models = vec![];

        for page in 1..=MAX_PAGES {
            let mut query = vec![("page", page.to_string()), ("perPage", PAGE_SIZE.to_string())];
            if let Some(folder_id) = folder_id {
                query.push(("folderId", folder_id.to_string()));
            }
            if let Some(search) = &search {
                query.push(("search", search.to_string()));
            }

            let res: ModelsResponse = self.get("/v2/models", &query).await?;
            models.extend(res.models);

            if page >= res.page_data.last_page {
                break;
            }
        }

        tracing::debug!(tenant = self.tenant.id, count = models.len(), "listed models");
        return Ok(models);
    }

    async fn find_matches(&self, model_id: Uuid) -> Result<Vec<ModelMatch>> {
        let path = format!("/v2/models/{model_id}/matches");
        let query = vec![("threshold", self.match_threshold.to_string())];
        let res: MatchesResponse = self.get(&path, &query).await?;

        let mut matches = res.matches;
        matches.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));

        return Ok(matches);
    }
}
