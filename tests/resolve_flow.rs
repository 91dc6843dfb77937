mod common;

use anyhow::Result;
use common::StubServer;
use paperless_cli::models::ResourceKind;
use paperless_cli::resolve::resolve;
use paperless_cli::ApiError;
use serde_json::json;

const NAMED_KINDS: [(ResourceKind, &str); 5] = [
    (ResourceKind::Tag, "tags"),
    (ResourceKind::Correspondent, "correspondents"),
    (ResourceKind::DocumentType, "document_types"),
    (ResourceKind::StoragePath, "storage_paths"),
    (ResourceKind::SavedView, "saved_views"),
];

#[tokio::test]
async fn numeric_reference_needs_no_request() -> Result<()> {
    let server = StubServer::start().await?;
    let client = server.client()?;

    for (kind, _) in NAMED_KINDS {
        assert_eq!(resolve(&client, kind, "42").await?, 42);
        assert_eq!(resolve(&client, kind, " 7 ").await?, 7);
    }
    assert_eq!(resolve(&client, ResourceKind::Document, "1001").await?, 1001);
    assert!(server.requests().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn names_match_case_insensitively_for_every_kind() -> Result<()> {
    let server = StubServer::start().await?;
    let client = server.client()?;

    for (kind, collection) in NAMED_KINDS {
        server.insert(collection, json!({ "name": "Decoy" })).await;
        let id = server
            .insert(collection, json!({ "name": "Stadtwerke München" }))
            .await;
        assert_eq!(resolve(&client, kind, "stadtwerke münchen").await?, id, "{kind}");
    }
    Ok(())
}

#[tokio::test]
async fn unknown_names_are_not_found_for_every_kind() -> Result<()> {
    let server = StubServer::start().await?;
    let client = server.client()?;

    for (kind, collection) in NAMED_KINDS {
        server.insert(collection, json!({ "name": "Existing" })).await;
        match resolve(&client, kind, "Missing").await {
            Err(ApiError::NotFound {
                kind: reported,
                reference,
            }) => {
                assert_eq!(reported, kind);
                assert_eq!(reference, "Missing");
            }
            other => panic!("expected not found for {kind}, got {other:?}"),
        }
    }
    Ok(())
}

#[tokio::test]
async fn documents_resolve_by_exact_title() -> Result<()> {
    let server = StubServer::start().await?;
    server
        .insert("documents", json!({ "title": "Lease agreement draft" }))
        .await;
    let lease = server
        .insert("documents", json!({ "title": "Lease agreement" }))
        .await;
    let client = server.client()?;

    assert_eq!(
        resolve(&client, ResourceKind::Document, "lease AGREEMENT").await?,
        lease
    );

    let request = server.requests().await.pop().expect("request recorded");
    assert_eq!(request.path, "/api/documents/");
    assert_eq!(request.query_value("title__iexact"), Some("lease AGREEMENT"));

    assert!(resolve(&client, ResourceKind::Document, "Lease")
        .await
        .unwrap_err()
        .is_not_found());
    Ok(())
}

#[tokio::test]
async fn tasks_cannot_be_resolved_by_name() -> Result<()> {
    let server = StubServer::start().await?;
    let client = server.client()?;

    let err = resolve(&client, ResourceKind::Task, "upload").await.unwrap_err();
    assert!(matches!(err, ApiError::Unsupported(ResourceKind::Task)));
    assert!(server.requests().await.is_empty());
    Ok(())
}
