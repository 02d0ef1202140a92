//! reqwest-based folder remote.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use stockroom_core::config::remote::RemoteConfig;
use stockroom_core::error::{AppError, ErrorKind};
use stockroom_core::result::AppResult;
use stockroom_core::types::{FolderId, ItemId, PageRequest, PageResponse};
use stockroom_entity::folder::{
    CloneFolder, CreateFolder, FolderAlert, FolderFilter, FolderHistoryEntry, FolderLabel,
    FolderPermission, FolderRecord, FolderTree, UpdateFolder,
};
use stockroom_entity::item::{ItemPatch, ItemQuery, ItemRecord};
use stockroom_service::FolderRemote;

use super::wire::{BulkUpdateBody, MoveBody, error_from_response};

/// Folder remote speaking JSON to the inventory API.
#[derive(Debug, Clone)]
pub struct HttpFolderRemote {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
}

impl HttpFolderRemote {
    /// Build a client from configuration.
    pub fn new(config: &RemoteConfig) -> AppResult<Self> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid remote base URL: '{}'", config.base_url),
                e,
            )
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            base_url,
            api_token: config.api_token.clone().filter(|t| !t.is_empty()),
        })
    }

    /// Base URL every path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` (relative, no leading slash) with query pairs.
    pub(crate) fn url(&self, path: &str, query: &[(&str, String)]) -> AppResult<Url> {
        let mut url = self.base_url.join(path).map_err(|e| {
            AppError::with_source(ErrorKind::Internal, format!("Invalid request path: {path}"), e)
        })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> AppResult<reqwest::Response> {
        let response = builder.send().await.map_err(|e| {
            let kind = if e.is_builder() {
                ErrorKind::Internal
            } else {
                ErrorKind::Transport
            };
            warn!(
                error = %e,
                is_timeout = e.is_timeout(),
                is_connect = e.is_connect(),
                "Inventory API request failed"
            );
            AppError::with_source(kind, format!("Inventory API unreachable: {e}"), e)
        })?;

        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "Inventory API response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(error_from_response(status.as_u16(), &body))
    }

    async fn read_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> AppResult<T> {
        let response = self.send(builder).await?;
        response.json::<T>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Inventory API returned an unexpected body",
                e,
            )
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> AppResult<T> {
        let url = self.url(path, query)?;
        self.read_json(self.request(Method::GET, url)).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path, &[])?;
        self.read_json(self.request(method, url).json(body)).await
    }
}

fn folder_path(id: FolderId, rest: &str) -> String {
    if rest.is_empty() {
        format!("folders/{id}")
    } else {
        format!("folders/{id}/{rest}")
    }
}

fn filter_query(filter: &FolderFilter) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(search) = &filter.search {
        query.push(("search", search.clone()));
    }
    if let Some(parent_id) = filter.parent_id {
        query.push(("parentId", parent_id.to_string()));
    }
    if !filter.tags.is_empty() {
        query.push(("tags", filter.tags.join(",")));
    }
    query
}

fn page_query(page: &PageRequest) -> Vec<(&'static str, String)> {
    vec![
        ("page", page.page.to_string()),
        ("pageSize", page.page_size.to_string()),
    ]
}

#[async_trait]
impl FolderRemote for HttpFolderRemote {
    async fn list_folders(&self, filter: &FolderFilter) -> AppResult<Vec<FolderRecord>> {
        self.get("folders", &filter_query(filter)).await
    }

    async fn folder_hierarchy(&self) -> AppResult<FolderTree> {
        self.get("folders/hierarchy", &[]).await
    }

    async fn folder_items(
        &self,
        folder_id: FolderId,
        query: &ItemQuery,
    ) -> AppResult<PageResponse<ItemRecord>> {
        let mut params = page_query(&query.page);
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }
        self.get(&folder_path(folder_id, "items"), &params).await
    }

    async fn create_folder(&self, data: &CreateFolder) -> AppResult<FolderRecord> {
        self.send_json(Method::POST, "folders", data).await
    }

    async fn update_folder(&self, id: FolderId, data: &UpdateFolder) -> AppResult<FolderRecord> {
        self.send_json(Method::PATCH, &folder_path(id, ""), data).await
    }

    async fn delete_folder(&self, id: FolderId, move_items_to: Option<FolderId>) -> AppResult<()> {
        let query: Vec<(&str, String)> = move_items_to
            .map(|target| vec![("moveItemsTo", target.to_string())])
            .unwrap_or_default();
        let url = self.url(&folder_path(id, ""), &query)?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn clone_folder(&self, id: FolderId, request: &CloneFolder) -> AppResult<FolderRecord> {
        self.send_json(Method::POST, &folder_path(id, "clone"), request)
            .await
    }

    async fn move_folder(
        &self,
        id: FolderId,
        new_parent_id: Option<FolderId>,
    ) -> AppResult<FolderRecord> {
        let body = MoveBody {
            parent_id: new_parent_id,
        };
        self.send_json(Method::POST, &folder_path(id, "move"), &body)
            .await
    }

    async fn bulk_update_items(&self, item_ids: &[ItemId], patch: &ItemPatch) -> AppResult<()> {
        let body = BulkUpdateBody {
            item_ids,
            patch: *patch,
        };
        let url = self.url("items/bulk-update", &[])?;
        self.send(self.request(Method::POST, url).json(&body)).await?;
        Ok(())
    }

    async fn folder_history(
        &self,
        id: FolderId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FolderHistoryEntry>> {
        self.get(&folder_path(id, "history"), &page_query(page)).await
    }

    async fn folder_permissions(&self, id: FolderId) -> AppResult<Vec<FolderPermission>> {
        self.get(&folder_path(id, "permissions"), &[]).await
    }

    async fn set_folder_permissions(
        &self,
        id: FolderId,
        permissions: &[FolderPermission],
    ) -> AppResult<Vec<FolderPermission>> {
        self.send_json(Method::PUT, &folder_path(id, "permissions"), permissions)
            .await
    }

    async fn folder_alerts(&self, id: FolderId) -> AppResult<Vec<FolderAlert>> {
        self.get(&folder_path(id, "alerts"), &[]).await
    }

    async fn set_folder_alerts(
        &self,
        id: FolderId,
        alerts: &[FolderAlert],
    ) -> AppResult<Vec<FolderAlert>> {
        self.send_json(Method::PUT, &folder_path(id, "alerts"), alerts)
            .await
    }

    async fn folder_labels(&self, id: FolderId) -> AppResult<Vec<FolderLabel>> {
        self.get(&folder_path(id, "labels"), &[]).await
    }

    async fn set_folder_labels(
        &self,
        id: FolderId,
        labels: &[FolderLabel],
    ) -> AppResult<Vec<FolderLabel>> {
        self.send_json(Method::PUT, &folder_path(id, "labels"), labels)
            .await
    }
}
