use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::models::Action;
use crate::domain::models::ApiClientBox;
use crate::domain::models::ApiClientFactory;
use crate::domain::models::Event;
use crate::domain::models::ModelsQuery;

fn worker_error(
    tenant_id: &str,
    err: anyhow::Error,
    event_tx: &mpsc::UnboundedSender<Event>,
) -> Result<()> {
    tracing::error!(tenant = tenant_id, error = format!("{err:#}"), "backend request failed");
    event_tx.send(Event::BackendError(
        tenant_id.to_string(),
        format!("Request to tenant {tenant_id} failed: {err:#}"),
    ))?;

    Ok(())
}

async fn run_request(
    api_client: &ApiClientBox,
    action: Action,
    event_tx: &mpsc::UnboundedSender<Event>,
) -> Result<()> {
    let tenant_id = api_client.tenant().id.to_string();

    let event = match action {
        Action::LoadFolders => Event::FoldersLoaded(tenant_id, api_client.list_folders().await?),
        Action::LoadModels(folder) => {
            let folder_id = folder.as_ref().map(|folder| folder.id);
            let models = api_client.list_models(folder_id, None).await?;
            let query = match folder {
                Some(folder) => ModelsQuery::Folder(folder),
                None => ModelsQuery::All,
            };
            Event::ModelsLoaded(tenant_id, query, models)
        }
        Action::SearchModels(text) => {
            let text = text.trim().to_string();
            if text.is_empty() {
                let models = api_client.list_models(None, None).await?;
                Event::ModelsLoaded(tenant_id, ModelsQuery::All, models)
            } else {
                let models = api_client.list_models(None, Some(text.clone())).await?;
                Event::ModelsLoaded(tenant_id, ModelsQuery::Search(text), models)
            }
        }
        Action::LoadMatches(model) => {
            let matches = api_client.find_matches(model.id).await?;
            Event::MatchesLoaded(tenant_id, model, matches)
        }
        Action::SelectTenant(_) => return Ok(()),
    };

    event_tx.send(event)?;

    Ok(())
}

pub struct ActionsService {}

impl ActionsService {
    pub async fn start(
        client_factory: ApiClientFactory,
        event_tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let mut api_client: Option<Arc<ApiClientBox>> = None;
        let mut workers: Vec<JoinHandle<Result<()>>> = vec![];
        // Only the latest model listing may reach the UI.
        let mut models_worker: Option<JoinHandle<Result<()>>> = None;

        while let Some(action) = rx.recv().await {
            workers.retain(|worker| !worker.is_finished());

            let action = match action {
                Action::SelectTenant(tenant) => {
                    for worker in workers.drain(..) {
                        worker.abort();
                    }
                    if let Some(worker) = models_worker.take() {
                        worker.abort();
                    }

                    match client_factory(&tenant) {
                        Ok(client) => {
                            tracing::info!(tenant = tenant.id, "connected to tenant");
                            api_client = Some(Arc::new(client));
                            event_tx.send(Event::TenantConnected(tenant.id.to_string()))?;
                        }
                        Err(err) => {
                            api_client = None;
                            worker_error(&tenant.id, err, &event_tx)?;
                            continue;
                        }
                    }

                    Action::LoadFolders
                }
                action => action,
            };

            let Some(client) = api_client.clone() else {
                event_tx.send(Event::BackendError(
                    String::new(),
                    "No tenant selected".to_string(),
                ))?;
                continue;
            };

            tracing::debug!(tenant = client.tenant().id, action = ?action, "dispatching request");
            let lists_models = matches!(action, Action::LoadModels(_) | Action::SearchModels(_));
            let worker_event_tx = event_tx.clone();
            let worker = tokio::spawn(async move {
                if let Err(err) = run_request(&client, action, &worker_event_tx).await {
                    worker_error(&client.tenant().id, err, &worker_event_tx)?;
                }
                Ok(())
            });

            if lists_models {
                if let Some(previous) = models_worker.replace(worker) {
                    previous.abort();
                }
            } else {
                workers.push(worker);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ApiClient, Folder, Model, ModelMatch, Tenant};
    use anyhow::bail;
    use async_trait::async_trait;
    use std::time::Duration;
    use uuid::Uuid;

    struct MockApiClient {
        tenant: Tenant,
        fail: bool,
    }

    #[async_trait]
    impl ApiClient for MockApiClient {
        fn tenant(&self) -> &Tenant {
            &self.tenant
        }

        async fn list_folders(&self) -> Result<Vec<Folder>> {
            if self.fail {
                bail!("connection refused");
            }
            Ok(vec![Folder::new(1, "First"), Folder::new(2, "Second")])
        }

        async fn list_models(
            &self,
            folder_id: Option<u64>,
            search: Option<String>,
        ) -> Result<Vec<Model>> {
            if search.as_deref() == Some("slow") {
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            let name = format!("{folder_id:?}-{}", search.unwrap_or_default());
            Ok(vec![Model::new(Uuid::nil(), &name)])
        }

        async fn find_matches(&self, model_id: Uuid) -> Result<Vec<ModelMatch>> {
            Ok(vec![ModelMatch {
                model: Model::new(model_id, "twin"),
                percentage: 99.0,
            }])
        }
    }

    fn factory(fail: bool) -> ApiClientFactory {
        Box::new(move |tenant: &Tenant| {
            if tenant.id == "broken" {
                bail!("invalid credentials");
            }
            let client: ApiClientBox = Box::new(MockApiClient {
                tenant: tenant.clone(),
                fail,
            });
            Ok(client)
        })
    }

    fn start(fail: bool) -> (mpsc::UnboundedSender<Action>, mpsc::UnboundedReceiver<Event>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();
        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

        tokio::spawn(async move {
            ActionsService::start(factory(fail), event_tx, &mut action_rx)
                .await
                .unwrap();
        });

        (action_tx, event_rx)
    }

    #[tokio::test]
    async fn test_select_tenant_loads_folders() {
        let (action_tx, mut event_rx) = start(false);
        action_tx
            .send(Action::SelectTenant(Tenant::new("acme", "http://localhost")))
            .unwrap();

        match event_rx.recv().await.unwrap() {
            Event::TenantConnected(tenant_id) => assert_eq!(tenant_id, "acme"),
            event => panic!("unexpected event {event:?}"),
        }

        match event_rx.recv().await.unwrap() {
            Event::FoldersLoaded(tenant_id, folders) => {
                assert_eq!(tenant_id, "acme");
                assert_eq!(folders.len(), 2);
            }
            event => panic!("unexpected event {event:?}"),
        }
    }

    #[tokio::test]
    async fn test_requests_without_tenant_fail() {
        let (action_tx, mut event_rx) = start(false);
        action_tx.send(Action::LoadFolders).unwrap();

        match event_rx.recv().await.unwrap() {
            Event::BackendError(tenant_id, message) => {
                assert!(tenant_id.is_empty());
                assert_eq!(message, "No tenant selected");
            }
            event => panic!("unexpected event {event:?}"),
        }
    }

    #[tokio::test]
    async fn test_client_factory_errors_are_reported() {
        let (action_tx, mut event_rx) = start(false);
        action_tx
            .send(Action::SelectTenant(Tenant::new("broken", "http://localhost")))
            .unwrap();

        match event_rx.recv().await.unwrap() {
            Event::BackendError(tenant_id, message) => {
                assert_eq!(tenant_id, "broken");
                assert!(message.contains("invalid credentials"));
            }
            event => panic!("unexpected event {event:?}"),
        }
    }

    #[tokio::test]
    async fn test_request_errors_are_reported() {
        let (action_tx, mut event_rx) = start(true);
        action_tx
            .send(Action::SelectTenant(Tenant::new("acme", "http://localhost")))
            .unwrap();

        assert!(matches!(
            event_rx.recv().await.unwrap(),
            Event::TenantConnected(_)
        ));
        match event_rx.recv().await.unwrap() {
            Event::BackendError(tenant_id, message) => {
                assert_eq!(tenant_id, "acme");
                assert!(message.contains("connection refused"));
            }
            event => panic!("unexpected event {event:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_and_matches() {
        let (action_tx, mut event_rx) = start(false);
        action_tx
            .send(Action::SelectTenant(Tenant::new("acme", "http://localhost")))
            .unwrap();
        event_rx.recv().await.unwrap();
        event_rx.recv().await.unwrap();

        action_tx
            .send(Action::SearchModels(" gear ".to_string()))
            .unwrap();
        match event_rx.recv().await.unwrap() {
            Event::ModelsLoaded(_, query, models) => {
                assert_eq!(query, ModelsQuery::Search("gear".to_string()));
                assert_eq!(models[0].name, "None-gear");
            }
            event => panic!("unexpected event {event:?}"),
        }

        action_tx.send(Action::SearchModels("".to_string())).unwrap();
        match event_rx.recv().await.unwrap() {
            Event::ModelsLoaded(_, query, _) => assert_eq!(query, ModelsQuery::All),
            event => panic!("unexpected event {event:?}"),
        }

        action_tx
            .send(Action::LoadModels(Some(Folder::new(2, "Second"))))
            .unwrap();
        match event_rx.recv().await.unwrap() {
            Event::ModelsLoaded(_, query, models) => {
                assert_eq!(query, ModelsQuery::Folder(Folder::new(2, "Second")));
                assert_eq!(models[0].name, "Some(2)-");
            }
            event => panic!("unexpected event {event:?}"),
        }

        let model = Model::new(Uuid::new_v4(), "bracket");
        action_tx.send(Action::LoadMatches(model.clone())).unwrap();
        match event_rx.recv().await.unwrap() {
            Event::MatchesLoaded(_, for_model, matches) => {
                assert_eq!(for_model, model);
                assert_eq!(matches[0].model.id, model.id);
            }
            event => panic!("unexpected event {event:?}"),
        }
    }

    #[tokio::test]
    async fn test_newer_model_listing_replaces_a_slow_one() {
        let (action_tx, mut event_rx) = start(false);
        action_tx
            .send(Action::SelectTenant(Tenant::new("acme", "http://localhost")))
            .unwrap();
        event_rx.recv().await.unwrap();
        event_rx.recv().await.unwrap();

        action_tx
            .send(Action::SearchModels("slow".to_string()))
            .unwrap();
        action_tx
            .send(Action::LoadModels(Some(Folder::new(2, "Second"))))
            .unwrap();

        match event_rx.recv().await.unwrap() {
            Event::ModelsLoaded(_, query, _) => {
                assert_eq!(query, ModelsQuery::Folder(Folder::new(2, "Second")));
            }
            event => panic!("unexpected event {event:?}"),
        }

        let late = tokio::time::timeout(Duration::from_millis(600), event_rx.recv()).await;
        assert!(late.is_err(), "stale listing was delivered: {late:?}");
    }
}
