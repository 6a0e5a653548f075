//! Wire models for the Drive v3 and Sheets v4 REST APIs

use crate::adapters::store::traits::{remote_file_id, remote_permission_id};
use crate::adapters::store::{DriveItem, Permission};
use crate::domain::Result;
use serde::{Deserialize, Serialize};

/// Drive `File` resource (only the fields examgen requests)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResource {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl FileResource {
    pub fn into_item(self) -> Result<DriveItem> {
        Ok(DriveItem {
            id: remote_file_id(self.id)?,
            name: self.name,
            mime_type: self.mime_type,
            parents: self
                .parents
                .into_iter()
                .map(remote_file_id)
                .collect::<Result<_>>()?,
        })
    }
}

/// One page of `files.list`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<FileResource>,
    pub next_page_token: Option<String>,
}

/// Body of `files.create` for a folder
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest<'a> {
    pub name: &'a str,
    pub mime_type: &'a str,
    pub parents: Vec<&'a str>,
}

/// Body of `files.copy`
#[derive(Debug, Serialize)]
pub struct CopyFileRequest<'a> {
    pub name: &'a str,
    pub parents: Vec<&'a str>,
}

/// Drive `Permission` resource
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResource {
    pub id: String,
    pub email_address: Option<String>,
    #[serde(default)]
    pub role: String,
}

impl PermissionResource {
    pub fn into_permission(self) -> Result<Permission> {
        Ok(Permission {
            id: remote_permission_id(self.id)?,
            email_address: self.email_address,
            role: self.role,
        })
    }
}

/// One page of `permissions.list`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionList {
    #[serde(default)]
    pub permissions: Vec<PermissionResource>,
    pub next_page_token: Option<String>,
}

/// Body of `permissions.create` for a single user
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub role: &'a str,
    pub email_address: &'a str,
}

/// Sheets `ValueRange`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    /// Cells rendered as strings; numbers and booleans keep their JSON text
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect()
    }
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Body of `spreadsheets.create`
#[derive(Debug, Serialize)]
pub struct CreateSpreadsheetRequest<'a> {
    pub properties: SpreadsheetProperties<'a>,
}

#[derive(Debug, Serialize)]
pub struct SpreadsheetProperties<'a> {
    pub title: &'a str,
}

/// Response of `spreadsheets.create`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    pub spreadsheet_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_list_deserialization() {
        let page: FileList = serde_json::from_value(json!({
            "nextPageToken": "t2",
            "files": [{
                "id": "f1",
                "name": "Q1",
                "mimeType": "application/vnd.google-apps.folder",
                "parents": ["exam"]
            }]
        }))
        .unwrap();

        assert_eq!(page.next_page_token.as_deref(), Some("t2"));
        let item = page.files.into_iter().next().unwrap().into_item().unwrap();
        assert!(item.is_folder());
        assert_eq!(item.parents[0].as_str(), "exam");
    }

    #[test]
    fn test_file_resource_rejects_empty_id() {
        let file: FileResource = serde_json::from_value(json!({ "id": "" })).unwrap();
        assert!(file.into_item().is_err());
    }

    #[test]
    fn test_create_permission_request_serialization() {
        let body = serde_json::to_value(CreatePermissionRequest {
            kind: "user",
            role: "writer",
            email_address: "jo@x.edu",
        })
        .unwrap();
        assert_eq!(
            body,
            json!({ "type": "user", "role": "writer", "emailAddress": "jo@x.edu" })
        );
    }

    #[test]
    fn test_value_range_into_rows() {
        let range: ValueRange = serde_json::from_value(json!({
            "range": "Sheet1!A1:K3",
            "values": [["1", "Doe", "Jo"], [2, null, true]]
        }))
        .unwrap();
        assert_eq!(
            range.into_rows(),
            vec![
                vec!["1".to_string(), "Doe".to_string(), "Jo".to_string()],
                vec!["2".to_string(), String::new(), "true".to_string()],
            ]
        );
    }
}
