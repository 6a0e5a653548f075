//! Drive v3 implementation of [`DocumentStore`]

use super::http::GoogleHttp;
use super::models::{
    CopyFileRequest, CreateFileRequest, CreatePermissionRequest, FileList, FileResource,
    PermissionList,
};
use crate::adapters::store::traits::{remote_file_id, remote_permission_id};
use crate::adapters::store::{
    apply_mutation, DocumentStore, DriveItem, DriveQuery, Mutation, MutationOutput, Permission,
    FOLDER_MIME_TYPE,
};
use crate::config::GoogleConfig;
use crate::domain::ids::{FileId, PermissionId};
use crate::domain::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};

const FILE_FIELDS: &str = "id,name,mimeType,parents";

/// Google Drive client
///
/// Listing follows `nextPageToken` until exhausted. Bulk mutations are sent as
/// concurrent single requests, at most `batch_concurrency` at a time.
///
/// # Example
///
/// ```no_run
/// use examgen::adapters::google::DriveClient;
/// use examgen::adapters::store::{DocumentStore, DriveQuery};
/// use examgen::config::load_config;
///
/// # async fn example() -> examgen::domain::Result<()> {
/// let config = load_config("examgen.toml")?;
/// let drive = DriveClient::new(&config.google, false)?;
/// let exams = drive.list(&DriveQuery::new().named("Midterm")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DriveClient {
    http: GoogleHttp,
    batch_concurrency: usize,
    send_notification_email: bool,
}

impl DriveClient {
    /// Creates a client against `google.drive_base_url`
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the HTTP client cannot be built
    pub fn new(config: &GoogleConfig, send_notification_email: bool) -> Result<Self> {
        Ok(Self {
            http: GoogleHttp::new(config, &config.drive_base_url)?,
            batch_concurrency: config.batch_concurrency.max(1),
            send_notification_email,
        })
    }
}

#[async_trait]
impl DocumentStore for DriveClient {
    async fn list(&self, query: &DriveQuery) -> Result<Vec<DriveItem>> {
        let url = self.http.endpoint(&["files"])?;
        let q = query.to_query_string();
        let fields = format!("nextPageToken,files({FILE_FIELDS})");
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http.get(url.clone()).query(&[
                ("q", q.as_str()),
                ("fields", fields.as_str()),
                ("pageSize", "1000"),
                ("spaces", "drive"),
            ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: FileList = self.http.send_json(request).await?;
            for file in page.files {
                items.push(file.into_item()?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(query = %q, count = items.len(), "Listed files");
        Ok(items)
    }

    async fn create_folder(&self, name: &str, parent: &FileId) -> Result<FileId> {
        let url = self.http.endpoint(&["files"])?;
        let request = self
            .http
            .post(url)
            .query(&[("fields", "id")])
            .json(&CreateFileRequest {
                name,
                mime_type: FOLDER_MIME_TYPE,
                parents: vec![parent.as_str()],
            });

        let file: FileResource = self.http.send_json(request).await?;
        tracing::debug!(name = %name, parent = %parent, id = %file.id, "Created folder");
        remote_file_id(file.id)
    }

    async fn copy(&self, source: &FileId, new_name: &str, parent: &FileId) -> Result<DriveItem> {
        let url = self.http.endpoint(&["files", source.as_str(), "copy"])?;
        let request = self
            .http
            .post(url)
            .query(&[("fields", FILE_FIELDS)])
            .json(&CopyFileRequest {
                name: new_name,
                parents: vec![parent.as_str()],
            });

        let file: FileResource = self.http.send_json(request).await?;
        file.into_item()
    }

    async fn move_file(
        &self,
        id: &FileId,
        from_parents: &[FileId],
        to_parent: &FileId,
    ) -> Result<()> {
        let url = self.http.endpoint(&["files", id.as_str()])?;
        let remove = from_parents
            .iter()
            .map(FileId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let request = self
            .http
            .patch(url)
            .query(&[
                ("addParents", to_parent.as_str()),
                ("removeParents", remove.as_str()),
                ("fields", "id,parents"),
            ])
            .json(&serde_json::json!({}));

        self.http.send(request).await?;
        Ok(())
    }

    async fn delete_file(&self, id: &FileId) -> Result<()> {
        let url = self.http.endpoint(&["files", id.as_str()])?;
        self.http.send(self.http.delete(url)).await?;
        tracing::debug!(id = %id, "Deleted file");
        Ok(())
    }

    async fn get_permissions(&self, resource: &FileId) -> Result<Vec<Permission>> {
        let url = self
            .http
            .endpoint(&["files", resource.as_str(), "permissions"])?;
        let mut permissions = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http.get(url.clone()).query(&[(
                "fields",
                "nextPageToken,permissions(id,emailAddress,role)",
            )]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: PermissionList = self.http.send_json(request).await?;
            for permission in page.permissions {
                permissions.push(permission.into_permission()?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(permissions)
    }

    async fn create_permission(
        &self,
        resource: &FileId,
        email: &str,
        role: &str,
    ) -> Result<PermissionId> {
        let url = self
            .http
            .endpoint(&["files", resource.as_str(), "permissions"])?;
        let notify = if self.send_notification_email {
            "true"
        } else {
            "false"
        };
        let request = self
            .http
            .post(url)
            .query(&[("sendNotificationEmail", notify), ("fields", "id")])
            .json(&CreatePermissionRequest {
                kind: "user",
                role,
                email_address: email,
            });

        #[derive(serde::Deserialize)]
        struct Created {
            id: String,
        }

        let created: Created = self.http.send_json(request).await?;
        remote_permission_id(created.id)
    }

    async fn delete_permission(&self, resource: &FileId, permission: &PermissionId) -> Result<()> {
        let url = self.http.endpoint(&[
            "files",
            resource.as_str(),
            "permissions",
            permission.as_str(),
        ])?;
        self.http.send(self.http.delete(url)).await?;
        Ok(())
    }

    async fn execute_batch(&self, mutations: Vec<Mutation>) -> Vec<Result<MutationOutput>> {
        // `buffered` keeps submission order while running up to N at once
        stream::iter(mutations)
            .map(|mutation| apply_mutation(self, mutation))
            .buffered(self.batch_concurrency)
            .collect()
            .await
    }
}
