use {
    crate::{
        cache::{BlobCache, DEFAULT_CACHE_MAX_SIZE},
        config::{DEFAULT_TIMEOUT_SECS, WALRUS_AGGREGATOR_URL, WALRUS_PUBLISHER_URL},
        error::{WalrusApiError, WalrusError, WalrusResult},
        models::{BlobMetadata, StoreResponse},
    },
    futures_util::{stream::BoxStream, StreamExt},
    log::{debug, warn},
    reqwest::{header::CONTENT_TYPE, Body, Client, RequestBuilder, Response},
    serde::{de::DeserializeOwned, Serialize},
    std::{
        collections::BTreeMap,
        path::{Path, PathBuf},
        sync::Arc,
        time::Duration,
    },
    tokio::{
        fs::File,
        io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    },
};

const OCTET_STREAM: &str = "application/octet-stream";
const APPLICATION_JSON: &str = "application/json";

/// Size of the chunks read from a stream when uploading it.
const UPLOAD_CHUNK_SIZE: usize = 8192;

/// Stream of blob chunks returned by [`WalrusClient::get_blob_as_stream`].
pub type BlobStream = BoxStream<'static, WalrusResult<Vec<u8>>>;

/// Optional query parameters of a blob upload. Only the parameters that are
/// set are sent to the publisher.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadParams {
    /// The encoding type to use for the blob
    pub encoding_type: Option<String>,
    /// Number of epochs ahead of the current one to store the blob
    pub epochs: Option<u64>,
    /// Create a deletable blob instead of a permanent one
    pub deletable: Option<bool>,
    /// Sui address the created Blob object should be sent to
    pub send_object_to: Option<String>,
}

impl UploadParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding_type(mut self, encoding_type: impl Into<String>) -> Self {
        self.encoding_type = Some(encoding_type.into());
        self
    }

    pub fn with_epochs(mut self, epochs: u64) -> Self {
        self.epochs = Some(epochs);
        self
    }

    pub fn with_deletable(mut self, deletable: bool) -> Self {
        self.deletable = Some(deletable);
        self
    }

    pub fn with_send_object_to(mut self, address: impl Into<String>) -> Self {
        self.send_object_to = Some(address.into());
        self
    }

    /// Query pairs for the upload request.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![];

        if let Some(encoding_type) = &self.encoding_type {
            query.push(("encoding_type", encoding_type.clone()));
        }

        if let Some(epochs) = self.epochs {
            query.push(("epochs", epochs.to_string()));
        }

        if let Some(deletable) = self.deletable {
            query.push(("deletable", deletable.to_string()));
        }

        if let Some(address) = &self.send_object_to {
            query.push(("send_object_to", address.clone()));
        }

        query
    }
}

/// Builder for WalrusClient configuration
pub struct WalrusClientBuilder {
    client: Option<Client>,
    publisher_url: String,
    aggregator_url: String,
    timeout: Duration,
    cache_dir: Option<PathBuf>,
    cache_max_size: usize,
}

impl Default for WalrusClientBuilder {
    /// Creates a default WalrusClientBuilder with standard configuration
    fn default() -> Self {
        Self {
            client: None,
            publisher_url: WALRUS_PUBLISHER_URL.to_string(),
            aggregator_url: WALRUS_AGGREGATOR_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_dir: None,
            cache_max_size: DEFAULT_CACHE_MAX_SIZE,
        }
    }
}

impl WalrusClientBuilder {
    /// Create a new WalrusClientBuilder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client. The configured timeout is not applied to it.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set a custom publisher URL
    pub fn with_publisher_url(mut self, url: &str) -> Self {
        self.publisher_url = url.to_string();
        self
    }

    /// Set a custom aggregator URL
    pub fn with_aggregator_url(mut self, url: &str) -> Self {
        self.aggregator_url = url.to_string();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the cache directory. `None` uses a temporary directory.
    pub fn with_cache_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.cache_dir = dir;
        self
    }

    /// Set the maximum number of cached blobs
    pub fn with_cache_max_size(mut self, max_size: usize) -> Self {
        self.cache_max_size = max_size;
        self
    }

    /// Build the WalrusClient with the configured settings
    pub fn build(self) -> WalrusResult<WalrusClient> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| {
                    WalrusError::InvalidConfig(format!("Failed to build HTTP client: {e}"))
                })?,
        };

        let cache = BlobCache::new(self.cache_dir, self.cache_max_size)?;

        Ok(WalrusClient {
            client,
            publisher_url: self.publisher_url.trim_end_matches('/').to_string(),
            aggregator_url: self.aggregator_url.trim_end_matches('/').to_string(),
            timeout: self.timeout,
            cache: Arc::new(cache),
        })
    }
}

/// Client for interacting with the Walrus decentralized blob storage system.
///
/// Uploads go to the publisher, reads go to the aggregator. Blobs read by
/// blob ID are kept in a local [`BlobCache`].
pub struct WalrusClient {
    client: Client,
    publisher_url: String,
    aggregator_url: String,
    timeout: Duration,
    cache: Arc<BlobCache>,
}

impl WalrusClient {
    /// Create a new WalrusClient with default configuration
    pub fn new() -> WalrusResult<Self> {
        Self::builder().build()
    }

    /// Get a builder to create a customized WalrusClient
    pub fn builder() -> WalrusClientBuilder {
        WalrusClientBuilder::default()
    }

    pub fn publisher_url(&self) -> &str {
        &self.publisher_url
    }

    pub fn aggregator_url(&self) -> &str {
        &self.aggregator_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn cache(&self) -> &BlobCache {
        &self.cache
    }

    /// Upload a blob to the publisher
    ///
    /// # Arguments
    /// * `data` - Bytes of the blob
    /// * `params` - Optional upload query parameters
    ///
    /// # Returns
    /// * `WalrusResult<StoreResponse>` - Information about the stored blob
    pub async fn put_blob(
        &self,
        data: impl Into<Body>,
        params: &UploadParams,
    ) -> WalrusResult<StoreResponse> {
        self.store(data.into(), OCTET_STREAM, params, "Error uploading blob")
            .await
    }

    /// Upload the contents of a file to the publisher
    ///
    /// # Arguments
    /// * `file_path` - Path to the file to upload
    /// * `params` - Optional upload query parameters
    pub async fn put_blob_from_file(
        &self,
        file_path: &Path,
        params: &UploadParams,
    ) -> WalrusResult<StoreResponse> {
        let is_file = tokio::fs::metadata(file_path)
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false);

        if !is_file {
            return Err(WalrusError::FileNotFound(file_path.to_path_buf()));
        }

        let data = tokio::fs::read(file_path).await.map_err(|e| {
            WalrusError::io(format!("Failed to read file {}", file_path.display()), e)
        })?;

        self.put_blob(data, params).await
    }

    /// Upload a blob from a reader, streaming it to the publisher in chunks
    ///
    /// # Arguments
    /// * `reader` - Source of the blob bytes
    /// * `params` - Optional upload query parameters
    pub async fn put_blob_from_stream<R>(
        &self,
        reader: R,
        params: &UploadParams,
    ) -> WalrusResult<StoreResponse>
    where
        R: AsyncRead + Send + Sync + Unpin + 'static,
    {
        let chunks = futures_util::stream::try_unfold(reader, |mut reader| async move {
            let mut buf = vec![0u8; UPLOAD_CHUNK_SIZE];
            let read: std::io::Result<usize> = reader.read(&mut buf).await;

            read.map(|read| {
                if read == 0 {
                    return None;
                }

                buf.truncate(read);

                Some((buf, reader))
            })
        });

        self.store(
            Body::wrap_stream(chunks),
            OCTET_STREAM,
            params,
            "Error uploading blob from stream",
        )
        .await
    }

    /// Serialize data as JSON and upload it to the publisher
    ///
    /// # Arguments
    /// * `data` - Data to serialize as JSON and upload
    /// * `params` - Optional upload query parameters
    pub async fn upload_json<T: Serialize>(
        &self,
        data: &T,
        params: &UploadParams,
    ) -> WalrusResult<StoreResponse> {
        let json_content = serde_json::to_vec(data)?;

        self.store(
            json_content.into(),
            APPLICATION_JSON,
            params,
            "Error uploading JSON blob",
        )
        .await
    }

    /// Retrieve a blob by the Sui object ID of its Blob object. These reads
    /// are not cached.
    pub async fn get_blob_by_object_id(&self, object_id: &str) -> WalrusResult<Vec<u8>> {
        let context = format!("Error retrieving blob by object ID: {object_id}");
        let url = format!("{}/v1/blobs/by-object-id/{}", self.aggregator_url, object_id);

        debug!("GET {url}");

        let response = self.send(self.client.get(&url), &context).await?;

        read_body(response, &context).await
    }

    /// Retrieve a blob by its blob ID
    ///
    /// Served from the cache when possible. Otherwise the blob is downloaded
    /// and cached. Failing to cache does not fail the read.
    pub async fn get_blob(&self, blob_id: &str) -> WalrusResult<Vec<u8>> {
        if let Some(data) = self.cached(blob_id).await {
            return Ok(data);
        }

        let context = format!("Error retrieving blob by blob ID: {blob_id}");
        let url = self.blob_url(blob_id);

        debug!("GET {url}");

        let response = self.send(self.client.get(&url), &context).await?;
        let data = read_body(response, &context).await?;

        self.cache_quietly(blob_id, data).await
    }

    /// Retrieve a blob as a stream of chunks. Bypasses the cache.
    ///
    /// HTTP errors are reported before the stream is returned. Errors while
    /// reading the body are yielded by the stream.
    pub async fn get_blob_as_stream(&self, blob_id: &str) -> WalrusResult<BlobStream> {
        let context = format!("Error retrieving blob as stream by blob ID: {blob_id}");
        let url = self.blob_url(blob_id);

        debug!("GET {url} (streaming)");

        let response = self.send(self.client.get(&url), &context).await?;

        let stream = response.bytes_stream().map(move |chunk| match chunk {
            Ok(chunk) => Ok(chunk.to_vec()),
            Err(e) => Err(WalrusError::from(WalrusApiError::request_failed(
                e.to_string(),
                &context,
            ))),
        });

        Ok(stream.boxed())
    }

    /// Retrieve a blob and save it to `file_path`
    ///
    /// A cached blob is written directly. Otherwise the body is streamed into
    /// a temporary file next to `file_path`, cached, and then moved into
    /// place, so a failed download never leaves a partial file behind.
    pub async fn get_blob_as_file(&self, blob_id: &str, file_path: &Path) -> WalrusResult<()> {
        if let Some(data) = self.cached(blob_id).await {
            return tokio::fs::write(file_path, data).await.map_err(|e| {
                WalrusError::io(format!("Failed to write {}", file_path.display()), e)
            });
        }

        let context = format!("Error retrieving blob as file by blob ID: {blob_id}");
        let url = self.blob_url(blob_id);

        debug!("GET {url} -> {}", file_path.display());

        let response = self.send(self.client.get(&url), &context).await?;

        let parent = match file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let temp = tempfile::NamedTempFile::new_in(parent).map_err(|e| {
            WalrusError::io(format!("Failed to create temp file in {}", parent.display()), e)
        })?;

        let temp_handle = temp
            .reopen()
            .map_err(|e| WalrusError::io("Failed to open temp file", e))?;

        // Stream the response body to the temp file
        let mut file = File::from_std(temp_handle);
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result
                .map_err(|e| WalrusApiError::request_failed(e.to_string(), &context))?;

            file.write_all(&chunk)
                .await
                .map_err(|e| WalrusError::io("Failed to write temp file", e))?;
        }

        file.flush()
            .await
            .map_err(|e| WalrusError::io("Failed to write temp file", e))?;

        drop(file);

        match tokio::fs::read(temp.path()).await {
            Ok(data) => drop(self.cache_quietly(blob_id, data).await?),
            Err(e) => warn!("Not caching blob '{blob_id}': {e}"),
        }

        temp.persist(file_path).map_err(|e| {
            WalrusError::io(format!("Failed to move blob to {}", file_path.display()), e.error)
        })?;

        Ok(())
    }

    /// Download and parse JSON data from Walrus
    ///
    /// # Type Parameters
    /// * `T` - The type to deserialize the JSON into, must implement DeserializeOwned
    pub async fn read_json<T: DeserializeOwned>(&self, blob_id: &str) -> WalrusResult<T> {
        let data = self.get_blob(blob_id).await?;

        Ok(serde_json::from_slice(&data)?)
    }

    /// Retrieve the response headers of a blob with a `HEAD` request
    pub async fn get_blob_metadata(&self, blob_id: &str) -> WalrusResult<BlobMetadata> {
        let context = format!("Error retrieving metadata for blob ID: {blob_id}");
        let url = self.blob_url(blob_id);

        debug!("HEAD {url}");

        let response = self.send(self.client.head(&url), &context).await?;

        let mut headers = BTreeMap::<String, String>::new();

        for (name, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes());

            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert_with(|| value.into_owned());
        }

        Ok(BlobMetadata::new(headers))
    }

    /// Verify if a blob exists in the Walrus network
    ///
    /// # Returns
    /// * `WalrusResult<bool>` - True if the aggregator serves the blob. Only
    ///   transport failures are errors.
    pub async fn verify_blob(&self, blob_id: &str) -> WalrusResult<bool> {
        let context = format!("Error verifying blob ID: {blob_id}");
        let url = self.blob_url(blob_id);

        debug!("HEAD {url}");

        let response = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(|e| WalrusApiError::request_failed(e.to_string(), &context))?;

        Ok(response.status().is_success())
    }

    fn blob_url(&self, blob_id: &str) -> String {
        format!("{}/v1/blobs/{}", self.aggregator_url, blob_id)
    }

    async fn store(
        &self,
        body: Body,
        content_type: &str,
        params: &UploadParams,
        context: &str,
    ) -> WalrusResult<StoreResponse> {
        let url = format!("{}/v1/blobs", self.publisher_url);

        debug!("PUT {url} {params:?}");

        let request = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, content_type)
            .query(&params.to_query())
            .body(body);

        let response = self.send(request, context).await?;
        let body = read_body(response, context).await?;

        Ok(serde_json::from_slice(&body)?)
    }

    /// Send a request and turn transport failures and non-2xx responses
    /// into [`WalrusApiError`]s carrying `context`.
    async fn send(&self, request: RequestBuilder, context: &str) -> WalrusResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| WalrusApiError::request_failed(e.to_string(), context))?;

        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();

        debug!("{context}: HTTP {status}");

        Err(WalrusApiError::from_response_parts(
            status.as_u16(),
            status.canonical_reason(),
            &body,
            context,
        )
        .into())
    }

    /// Look a blob up in the cache on the blocking thread pool.
    async fn cached(&self, blob_id: &str) -> Option<Vec<u8>> {
        let cache = Arc::clone(&self.cache);
        let key = blob_id.to_string();

        match tokio::task::spawn_blocking(move || cache.get(&key)).await {
            Ok(data) => data,
            Err(e) => {
                warn!("Blob cache lookup for '{blob_id}' failed: {e}");

                None
            }
        }
    }

    /// Cache a blob on the blocking thread pool and hand the data back.
    /// Cache write failures are logged and otherwise ignored.
    async fn cache_quietly(&self, blob_id: &str, data: Vec<u8>) -> WalrusResult<Vec<u8>> {
        let cache = Arc::clone(&self.cache);
        let key = blob_id.to_string();

        let (data, result) = tokio::task::spawn_blocking(move || {
            let result = cache.put(&key, &data);

            (data, result)
        })
        .await
        .map_err(|e| WalrusError::io("Blob cache task failed", std::io::Error::other(e)))?;

        if let Err(e) = result {
            warn!("Not caching blob '{blob_id}': {e}");
        }

        Ok(data)
    }
}

async fn read_body(response: Response, context: &str) -> WalrusResult<Vec<u8>> {
    let body = response
        .bytes()
        .await
        .map_err(|e| WalrusApiError::request_failed(e.to_string(), context))?;

    Ok(body.to_vec())
}
