//! Integration tests for the Drive and Sheets clients against a mock server

use examgen::adapters::google::{DriveClient, SheetsClient};
use examgen::adapters::store::{DocumentStore, DriveQuery, LedgerSink, Mutation, RosterSource};
use examgen::config::{secret_string, GoogleConfig};
use examgen::domain::{ExamGenError, FileId, PermissionId, RemoteError};
use mockito::Matcher;

fn google_config(base_url: &str) -> GoogleConfig {
    GoogleConfig {
        access_token: secret_string("test-token".to_string()),
        drive_base_url: base_url.to_string(),
        sheets_base_url: base_url.to_string(),
        timeout_seconds: 5,
        batch_concurrency: 4,
    }
}

fn file_id(id: &str) -> FileId {
    FileId::new(id).unwrap()
}

#[tokio::test]
async fn test_list_follows_page_tokens() {
    let mut server = mockito::Server::new_async().await;

    let first = server
        .mock("GET", "/files")
        .match_header("authorization", "Bearer test-token")
        .match_query(Matcher::Regex("spaces=drive$".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"nextPageToken":"p2","files":[
                {"id":"f1","name":"Q1","mimeType":"application/vnd.google-apps.folder","parents":["exam"]}
            ]}"#,
        )
        .create_async()
        .await;
    let second = server
        .mock("GET", "/files")
        .match_query(Matcher::Regex("pageToken=p2$".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"files":[
                {"id":"f2","name":"Q2","mimeType":"application/vnd.google-apps.folder","parents":["exam"]}
            ]}"#,
        )
        .create_async()
        .await;

    let drive = DriveClient::new(&google_config(&server.url()), false).unwrap();
    let items = drive
        .list(&DriveQuery::new().in_folder(&file_id("exam")))
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Q1", "Q2"]);
    assert!(items[0].is_folder());
}

#[tokio::test]
async fn test_status_codes_map_to_remote_errors() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/files/missing/permissions")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body("File not found")
        .create_async()
        .await;
    server
        .mock("GET", "/files/busy/permissions")
        .match_query(Matcher::Any)
        .with_status(429)
        .create_async()
        .await;
    server
        .mock("GET", "/files/broken/permissions")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let drive = DriveClient::new(&google_config(&server.url()), false).unwrap();

    let err = drive.get_permissions(&file_id("missing")).await.unwrap_err();
    assert!(matches!(err, ExamGenError::Remote(RemoteError::NotFound(_))));

    let err = drive.get_permissions(&file_id("busy")).await.unwrap_err();
    assert!(matches!(err, ExamGenError::Remote(RemoteError::RateLimited(_))));

    let err = drive.get_permissions(&file_id("broken")).await.unwrap_err();
    assert!(matches!(
        err,
        ExamGenError::Remote(RemoteError::ServerError { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_create_permission_sends_user_grant() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/files/ws1/permissions")
        .match_query(Matcher::UrlEncoded(
            "sendNotificationEmail".into(),
            "false".into(),
        ))
        .match_body(Matcher::PartialJson(serde_json::json!({
            "type": "user",
            "role": "writer",
            "emailAddress": "jo@x.edu"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"perm-1"}"#)
        .create_async()
        .await;

    let drive = DriveClient::new(&google_config(&server.url()), false).unwrap();
    let id = drive
        .create_permission(&file_id("ws1"), "jo@x.edu", "writer")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(id.as_str(), "perm-1");
}

#[tokio::test]
async fn test_execute_batch_keeps_submission_order() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("DELETE", "/files/ws1/permissions/p1")
        .with_status(204)
        .create_async()
        .await;
    server
        .mock("DELETE", "/files/ws2/permissions/p2")
        .with_status(500)
        .with_body("backend error")
        .create_async()
        .await;
    server
        .mock("DELETE", "/files/ws3/permissions/p3")
        .with_status(204)
        .create_async()
        .await;

    let drive = DriveClient::new(&google_config(&server.url()), false).unwrap();
    let mutations = ["1", "2", "3"]
        .iter()
        .map(|n| Mutation::DeletePermission {
            resource: file_id(&format!("ws{n}")),
            permission: PermissionId::new(format!("p{n}")).unwrap(),
        })
        .collect();

    let results = drive.execute_batch(mutations).await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(ExamGenError::Remote(RemoteError::ServerError { status: 500, .. }))
    ));
    assert!(results[2].is_ok());
}

#[tokio::test]
async fn test_copy_targets_workspace_parent() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/files/src1/copy")
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(
            serde_json::json!({ "name": "Q1a", "parents": ["ws1"] }),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"copy1","name":"Q1a","mimeType":"application/pdf","parents":["ws1"]}"#)
        .create_async()
        .await;

    let drive = DriveClient::new(&google_config(&server.url()), false).unwrap();
    let item = drive
        .copy(&file_id("src1"), "Q1a", &file_id("ws1"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(item.id.as_str(), "copy1");
    assert_eq!(item.parents, vec![file_id("ws1")]);
}

#[tokio::test]
async fn test_delete_file_sends_delete() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("DELETE", "/files/copy1")
        .with_status(204)
        .create_async()
        .await;

    let drive = DriveClient::new(&google_config(&server.url()), false).unwrap();
    drive.delete_file(&file_id("copy1")).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_read_range_stringifies_cells() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock(
            "GET",
            Matcher::Regex(r"^/spreadsheets/roster1/values/Sheet1".into()),
        )
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"range":"Sheet1!A1:K3","values":[
                ["ID","Last","First"],
                ["17","Doe","Jo"],
                [23,"Roe","Ann"]
            ]}"#,
        )
        .create_async()
        .await;

    let sheets = SheetsClient::new(&google_config(&server.url())).unwrap();
    let rows = sheets
        .read_range(&file_id("roster1"), "Sheet1!A1:K10000")
        .await
        .unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2], vec!["23", "Roe", "Ann"]);
}

#[tokio::test]
async fn test_ledger_create_and_append() {
    let mut server = mockito::Server::new_async().await;

    let create = server
        .mock("POST", "/spreadsheets")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "properties": { "title": "Variant Ledger - Midterm" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"spreadsheetId":"sheet-9"}"#)
        .create_async()
        .await;
    let append = server
        .mock("POST", "/spreadsheets/sheet-9/values/A1:append")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("valueInputOption".into(), "RAW".into()),
            Matcher::UrlEncoded("insertDataOption".into(), "INSERT_ROWS".into()),
        ]))
        .match_body(Matcher::PartialJson(serde_json::json!({
            "values": [["Student", "Q1"], ["Doe_Jo_17", "Q1b"]]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .create_async()
        .await;

    let sheets = SheetsClient::new(&google_config(&server.url())).unwrap();
    let sheet = sheets.create_sheet("Variant Ledger - Midterm").await.unwrap();
    sheets
        .append_rows(
            &sheet,
            vec![
                vec!["Student".to_string(), "Q1".to_string()],
                vec!["Doe_Jo_17".to_string(), "Q1b".to_string()],
            ],
        )
        .await
        .unwrap();

    create.assert_async().await;
    append.assert_async().await;
    assert_eq!(sheet.as_str(), "sheet-9");
}
