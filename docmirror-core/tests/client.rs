use docmirror_core::{DocumentClient, DocumentError, ItemKind};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn list_children_at_root_posts_to_documents() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/documents/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "ID": "doc-1",
                "VissibleName": "Notes",
                "Type": "DocumentType",
                "ModifiedClient": "2024-03-01T10:00:00.123Z",
                "Parent": "",
                "sizeInBytes": "2048"
            },
            {
                "ID": "folder-1",
                "VissibleName": "Work",
                "Type": "CollectionType",
                "ModifiedClient": "2024-03-01T09:00:00.000Z"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = DocumentClient::with_base_url(&server.uri()).unwrap();
    let items = client.list_children("").await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, "doc-1");
    assert_eq!(items[0].kind, ItemKind::Document);
    assert_eq!(items[0].size_bytes(), 2048);
    assert_eq!(items[1].kind, ItemKind::Folder);
    assert!(items[1].is_folder());
    assert_eq!(items[1].size, None);
}

#[tokio::test]
async fn list_children_of_folder_uses_folder_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/documents/folder-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "ID": "tpl-1",
                "VissibleName": "Template",
                "Type": "TemplateType",
                "ModifiedClient": "2024-03-01T09:00:00.000Z"
            }
        ])))
        .mount(&server)
        .await;

    let client = DocumentClient::with_base_url(&server.uri()).unwrap();
    let items = client.list_children("folder-1").await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].kind, ItemKind::Unknown);
}

#[tokio::test]
async fn list_children_surfaces_non_success_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/documents/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let client = DocumentClient::with_base_url(&server.uri()).unwrap();
    let err = client.list_children("").await.unwrap_err();

    match err {
        DocumentError::Api { status, body } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "busy");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn list_children_rejects_malformed_listing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/documents/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let client = DocumentClient::with_base_url(&server.uri()).unwrap();
    let err = client.list_children("").await.unwrap_err();

    assert!(matches!(err, DocumentError::Request(_)));
}

#[tokio::test]
async fn fetch_content_reads_file_name_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/download/doc-1/placeholder"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-disposition", r#"attachment; filename="Notes.pdf""#)
                .set_body_bytes(b"%PDF-1.4".to_vec()),
        )
        .mount(&server)
        .await;

    let client = DocumentClient::with_base_url(&server.uri()).unwrap();
    let fetched = client.fetch_content("doc-1").await.unwrap();

    assert_eq!(fetched.file_name, "Notes.pdf");
    assert_eq!(fetched.bytes, b"%PDF-1.4");
}

#[tokio::test]
async fn fetch_content_requires_content_disposition() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/download/doc-1/placeholder"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data".to_vec()))
        .mount(&server)
        .await;

    let client = DocumentClient::with_base_url(&server.uri()).unwrap();
    let err = client.fetch_content("doc-1").await.unwrap_err();

    assert!(matches!(err, DocumentError::MissingFileName(id) if id == "doc-1"));
}

#[tokio::test]
async fn fetch_content_surfaces_non_success_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/download/doc-1/placeholder"))
        .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
        .mount(&server)
        .await;

    let client = DocumentClient::with_base_url(&server.uri()).unwrap();
    let err = client.fetch_content("doc-1").await.unwrap_err();

    assert!(matches!(err, DocumentError::Api { status, .. } if status.as_u16() == 404));
}
