#![cfg(feature = "client")]

use {
    anyhow::Result,
    assert_matches::assert_matches,
    futures_util::StreamExt,
    mockito::{Matcher, Server, ServerGuard},
    serde::{Deserialize, Serialize},
    serde_json::json,
    std::path::PathBuf,
    tempfile::tempdir,
    walrus_sdk::{
        UploadParams,
        WalrusClient,
        WalrusError,
        REQUEST_FAILED_STATUS,
        UNKNOWN_STATUS,
    },
};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct SampleData {
    name: String,
    value: i32,
}

const EPOCHS: u64 = 1;
const TEST_TEXT: &str = "Hello, World!";
const TEST_CONTENT: &[u8] = TEST_TEXT.as_bytes();

/// Setup mock server for Walrus testing
async fn setup_mock_server() -> Result<(ServerGuard, WalrusClient)> {
    let server = Server::new_async().await;
    let server_url = server.url();

    // Create a Walrus client that points to our mock server
    let walrus_client = WalrusClient::builder()
        .with_publisher_url(&server_url)
        .with_aggregator_url(&format!("{server_url}/"))
        .with_cache_max_size(10)
        .build()?;

    Ok((server, walrus_client))
}

/// Helper to create a temp file with content
async fn create_temp_file(content: &[u8]) -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempdir()?;
    let file_path = dir.path().join("test_file.txt");
    tokio::fs::write(&file_path, content).await?;
    Ok((dir, file_path))
}

fn newly_created_body(blob_id: &str, object_id: &str, end_epoch: u64) -> String {
    json!({
        "newlyCreated": {
            "blobObject": {
                "id": object_id,
                "blobId": blob_id,
                "size": TEST_CONTENT.len(),
                "registeredEpoch": 10,
                "certifiedEpoch": 10,
                "storage": {"startEpoch": 10, "endEpoch": end_epoch},
                "deletable": false
            },
            "cost": 1000
        }
    })
    .to_string()
}

#[tokio::test]
async fn test_put_blob_with_all_params() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    let mock = server
        .mock("PUT", "/v1/blobs")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("encoding_type".into(), "RS2".into()),
            Matcher::UrlEncoded("epochs".into(), "5".into()),
            Matcher::UrlEncoded("deletable".into(), "true".into()),
            Matcher::UrlEncoded("send_object_to".into(), "0x42".into()),
        ]))
        .match_header("content-type", "application/octet-stream")
        .match_body(TEST_TEXT)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(newly_created_body("test_blob_id", "test_object_id", 100))
        .create_async()
        .await;

    let params = UploadParams::new()
        .with_encoding_type("RS2")
        .with_epochs(5)
        .with_deletable(true)
        .with_send_object_to("0x42");

    let response = client.put_blob(TEST_CONTENT, &params).await?;

    assert_eq!(response.blob_id(), Some("test_blob_id"));
    assert_eq!(response.object_id(), Some("test_object_id"));
    assert_eq!(response.end_epoch(), Some(100));
    assert!(response.already_certified.is_none());

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_put_blob_without_params_sends_no_query() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    let mock = server
        .mock("PUT", "/v1/blobs")
        .with_status(200)
        .with_body(
            json!({
                "alreadyCertified": {
                    "blobId": "certified_blob_id",
                    "event": {"txDigest": "digest", "eventSeq": "0"},
                    "endEpoch": 42
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let response = client.put_blob(TEST_CONTENT, &UploadParams::new()).await?;

    assert_eq!(response.blob_id(), Some("certified_blob_id"));
    assert_eq!(response.end_epoch(), Some(42));
    assert!(response.newly_created.is_none());

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_put_blob_from_file() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    let (_dir, file_path) = create_temp_file(TEST_CONTENT).await?;

    let mock = server
        .mock("PUT", "/v1/blobs")
        .match_query(Matcher::UrlEncoded("epochs".into(), EPOCHS.to_string()))
        .match_body(TEST_TEXT)
        .with_status(200)
        .with_body(newly_created_body("file_blob_id", "file_object_id", 11))
        .create_async()
        .await;

    let response = client
        .put_blob_from_file(&file_path, &UploadParams::new().with_epochs(EPOCHS))
        .await?;

    assert_eq!(response.blob_id(), Some("file_blob_id"));

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_put_blob_from_missing_file() -> Result<()> {
    let (server, client) = setup_mock_server().await?;

    let dir = tempdir()?;
    let missing = dir.path().join("missing.bin");

    let result = client
        .put_blob_from_file(&missing, &UploadParams::new())
        .await;
    assert_matches!(result, Err(WalrusError::FileNotFound(path)) if path == missing);

    // A directory is not a file either.
    let result = client
        .put_blob_from_file(dir.path(), &UploadParams::new())
        .await;
    assert_matches!(result, Err(WalrusError::FileNotFound(_)));

    drop(server);

    Ok(())
}

#[tokio::test]
async fn test_put_blob_from_stream() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    // Larger than a single upload chunk.
    let content = "walrus".repeat(4_000);

    let mock = server
        .mock("PUT", "/v1/blobs")
        .match_query(Matcher::UrlEncoded("deletable".into(), "false".into()))
        .match_body(content.as_str())
        .with_status(200)
        .with_body(newly_created_body("stream_blob_id", "stream_object_id", 12))
        .create_async()
        .await;

    let response = client
        .put_blob_from_stream(
            std::io::Cursor::new(content.into_bytes()),
            &UploadParams::new().with_deletable(false),
        )
        .await?;

    assert_eq!(response.blob_id(), Some("stream_blob_id"));

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_upload_json() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    let test_data = SampleData {
        name: "Test".to_string(),
        value: 10,
    };

    let mock = server
        .mock("PUT", "/v1/blobs")
        .match_query(Matcher::UrlEncoded("epochs".into(), EPOCHS.to_string()))
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"name": "Test", "value": 10})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(newly_created_body("json_blob_id", "json_object_id", 200))
        .create_async()
        .await;

    let response = client
        .upload_json(&test_data, &UploadParams::new().with_epochs(EPOCHS))
        .await?;

    assert_eq!(response.blob_id(), Some("json_blob_id"));
    assert_eq!(response.end_epoch(), Some(200));

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_upload_structured_error() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    let mock = server
        .mock("PUT", "/v1/blobs")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "error": {
                    "code": 400,
                    "status": "INVALID_ARGUMENT",
                    "message": "epochs must be positive",
                    "details": [{"field": "epochs"}]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let err = client
        .put_blob(TEST_CONTENT, &UploadParams::new())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(400));
    assert_matches!(&err, WalrusError::Api(api) if api.status == "INVALID_ARGUMENT"
        && api.message == "epochs must be positive"
        && api.details == vec![json!({"field": "epochs"})]
        && api.context == "Error uploading blob");
    assert!(err.to_string().starts_with("Error uploading blob: HTTP 400 - INVALID_ARGUMENT"));

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_get_blob_uses_cache() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    let mock = server
        .mock("GET", "/v1/blobs/test_blob_id")
        .with_status(200)
        .with_body(TEST_CONTENT)
        .expect(1)
        .create_async()
        .await;

    let first = client.get_blob("test_blob_id").await?;
    let second = client.get_blob("test_blob_id").await?;

    assert_eq!(first, TEST_CONTENT);
    assert_eq!(second, TEST_CONTENT);
    assert!(client.cache().contains("test_blob_id"));

    // Only the first read reached the aggregator.
    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_get_blob_survives_cache_write_failure() -> Result<()> {
    let mut server = Server::new_async().await;
    let root = tempdir()?;
    let cache_dir = root.path().join("cache");

    let client = WalrusClient::builder()
        .with_aggregator_url(&server.url())
        .with_cache_dir(Some(cache_dir.clone()))
        .build()?;

    let mock = server
        .mock("GET", "/v1/blobs/test_blob_id")
        .with_status(200)
        .with_body(TEST_CONTENT)
        .expect(2)
        .create_async()
        .await;

    // Nowhere left to write the cached copy.
    std::fs::remove_dir_all(&cache_dir)?;

    let data = client.get_blob("test_blob_id").await?;

    assert_eq!(data, TEST_CONTENT);
    assert!(!client.cache().contains("test_blob_id"));

    let output_path = root.path().join("downloaded_file.txt");
    client.get_blob_as_file("test_blob_id", &output_path).await?;

    assert_eq!(tokio::fs::read(&output_path).await?, TEST_CONTENT);
    assert!(!client.cache().contains("test_blob_id"));

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_metadata_keeps_non_ascii_headers() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    let mock = server
        .mock("HEAD", "/v1/blobs/test_blob_id")
        .with_status(200)
        .with_header("x-file-name", "caf\u{e9}.txt")
        .create_async()
        .await;

    let metadata = client.get_blob_metadata("test_blob_id").await?;

    assert_eq!(metadata.get("x-file-name"), Some("caf\u{e9}.txt"));

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_get_blob_not_found() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    let mock = server
        .mock("GET", "/v1/blobs/missing_blob_id")
        .with_status(404)
        .create_async()
        .await;

    let err = client.get_blob("missing_blob_id").await.unwrap_err();

    assert_matches!(&err, WalrusError::Api(api) if api.code == 404
        && api.status == "Not Found"
        && api.message == "HTTP 404: Not Found"
        && api.context == "Error retrieving blob by blob ID: missing_blob_id");
    assert!(!client.cache().contains("missing_blob_id"));

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_get_blob_by_object_id_is_not_cached() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    let mock = server
        .mock("GET", "/v1/blobs/by-object-id/0xobject")
        .with_status(200)
        .with_body(TEST_CONTENT)
        .expect(2)
        .create_async()
        .await;

    assert_eq!(client.get_blob_by_object_id("0xobject").await?, TEST_CONTENT);
    assert_eq!(client.get_blob_by_object_id("0xobject").await?, TEST_CONTENT);
    assert!(client.cache().is_empty());

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_get_blob_as_stream() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    let content = vec![3u8; 50_000];

    let mock = server
        .mock("GET", "/v1/blobs/stream_blob_id")
        .with_status(200)
        .with_body(content.clone())
        .create_async()
        .await;

    let mut stream = client.get_blob_as_stream("stream_blob_id").await?;
    let mut received = vec![];

    while let Some(chunk) = stream.next().await {
        received.extend(chunk?);
    }

    assert_eq!(received, content);
    assert!(client.cache().is_empty());

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_get_blob_as_stream_error() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    let mock = server
        .mock("GET", "/v1/blobs/error_blob_id")
        .with_status(503)
        .with_body("Service Unavailable")
        .create_async()
        .await;

    let result = client.get_blob_as_stream("error_blob_id").await;

    assert_matches!(result.map(|_| ()), Err(WalrusError::Api(api)) if api.code == 503
        && api.context == "Error retrieving blob as stream by blob ID: error_blob_id");

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_get_blob_as_file() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    let dir = tempdir()?;
    let output_path = dir.path().join("downloaded_file.txt");

    let mock = server
        .mock("GET", "/v1/blobs/test_blob_id")
        .with_status(200)
        .with_body(TEST_CONTENT)
        .expect(1)
        .create_async()
        .await;

    client.get_blob_as_file("test_blob_id", &output_path).await?;

    assert_eq!(tokio::fs::read(&output_path).await?, TEST_CONTENT);
    assert_eq!(client.cache().get("test_blob_id").unwrap(), TEST_CONTENT);

    // The second download is served from the cache.
    let second_path = dir.path().join("second.txt");
    client.get_blob_as_file("test_blob_id", &second_path).await?;

    assert_eq!(tokio::fs::read(&second_path).await?, TEST_CONTENT);

    // Only the downloaded files are left, no temp files.
    let mut entries = std::fs::read_dir(dir.path())?
        .map(|entry| entry.map(|entry| entry.file_name()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();
    assert_eq!(entries, vec!["downloaded_file.txt", "second.txt"]);

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_get_blob_as_file_error_leaves_no_file() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    let dir = tempdir()?;
    let output_path = dir.path().join("never.txt");

    let mock = server
        .mock("GET", "/v1/blobs/error_blob_id")
        .with_status(500)
        .with_body("Internal Server Error")
        .create_async()
        .await;

    let result = client.get_blob_as_file("error_blob_id", &output_path).await;

    assert_matches!(result, Err(WalrusError::Api(api)) if api.code == 500);
    assert!(!output_path.exists());
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_read_json() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    let test_data = SampleData {
        name: "Downloaded".to_string(),
        value: 10,
    };

    let mock = server
        .mock("GET", "/v1/blobs/json_blob_id")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::to_string(&test_data)?)
        .create_async()
        .await;

    let result: SampleData = client.read_json("json_blob_id").await?;

    assert_eq!(result, test_data);

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_read_json_invalid() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    let mock = server
        .mock("GET", "/v1/blobs/text_blob_id")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let result = client.read_json::<SampleData>("text_blob_id").await;

    assert_matches!(result, Err(WalrusError::Json(_)));

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_get_blob_metadata() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    let mock = server
        .mock("HEAD", "/v1/blobs/test_blob_id")
        .with_status(200)
        .with_header("content-type", "application/octet-stream")
        .with_header("ETag", "\"test_blob_id\"")
        .with_header("x-walrus-epoch", "12")
        .create_async()
        .await;

    let metadata = client.get_blob_metadata("test_blob_id").await?;

    assert_eq!(metadata.content_type(), Some("application/octet-stream"));
    assert_eq!(metadata.etag(), Some("\"test_blob_id\""));
    assert_eq!(metadata.get("X-Walrus-Epoch"), Some("12"));

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_get_blob_metadata_not_found() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    let mock = server
        .mock("HEAD", "/v1/blobs/missing_blob_id")
        .with_status(404)
        .create_async()
        .await;

    let err = client
        .get_blob_metadata("missing_blob_id")
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(404));
    assert_eq!(
        err.to_string(),
        "Error retrieving metadata for blob ID: missing_blob_id: HTTP 404 - Not Found: HTTP 404: Not Found"
    );

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_verify_blob() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    let mock_exists = server
        .mock("HEAD", "/v1/blobs/existing_blob_id")
        .with_status(200)
        .create_async()
        .await;

    let mock_not_exists = server
        .mock("HEAD", "/v1/blobs/nonexistent_blob_id")
        .with_status(404)
        .create_async()
        .await;

    assert!(client.verify_blob("existing_blob_id").await?);
    assert!(!client.verify_blob("nonexistent_blob_id").await?);

    mock_exists.assert_async().await;
    mock_not_exists.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_unreachable_server() -> Result<()> {
    // Nothing listens on the tcpmux port.
    let url = "http://127.0.0.1:1";

    let client = WalrusClient::builder()
        .with_publisher_url(url)
        .with_aggregator_url(url)
        .build()?;

    let err = client.get_blob("any_blob_id").await.unwrap_err();

    assert_matches!(&err, WalrusError::Api(api) if api.code == 500
        && api.status == REQUEST_FAILED_STATUS
        && api.context == "Error retrieving blob by blob ID: any_blob_id");

    assert_matches!(
        client.verify_blob("any_blob_id").await,
        Err(WalrusError::Api(api)) if api.status == REQUEST_FAILED_STATUS
    );

    Ok(())
}

#[tokio::test]
async fn test_plain_json_error_body_is_unknown_status() -> Result<()> {
    let (mut server, client) = setup_mock_server().await?;

    let mock = server
        .mock("GET", "/v1/blobs/error_blob_id")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "Internal server error"}"#)
        .create_async()
        .await;

    let err = client.get_blob("error_blob_id").await.unwrap_err();

    // `error` is not an object, so the HTTP status is used instead.
    assert_matches!(&err, WalrusError::Api(api) if api.code == 500
        && api.status == "Internal Server Error"
        && api.status != UNKNOWN_STATUS);

    mock.assert_async().await;

    Ok(())
}
