use {
    crate::{command_title, display::*, item, loading, prelude::*},
    walrus_sdk::BlobMetadata,
};

#[derive(Args, Clone, Debug)]
pub(crate) struct MetadataCommand {
    /// The blob ID to inspect.
    #[arg(value_name = "BLOB_ID")]
    blob_id: String,
}

/// Print the headers the aggregator returns for a blob.
pub(crate) async fn metadata(
    MetadataCommand { blob_id }: MetadataCommand,
    conf_path: &PathBuf,
) -> AnyResult<BlobMetadata, WalrusCliError> {
    command_title!("Fetching metadata of blob '{blob_id}'");

    let client = build_client(conf_path)?;

    let metadata_handle = loading!("Sending HEAD request to {}...", client.aggregator_url());

    let metadata = match client.get_blob_metadata(&blob_id).await {
        Ok(metadata) => metadata,
        Err(e) => {
            metadata_handle.error();

            return Err(WalrusCliError::Walrus(e));
        }
    };

    metadata_handle.success();

    for (name, value) in &metadata.headers {
        item!("{}: {}", name.bold(), value.truecolor(100, 100, 100));
    }

    json_output(&metadata)?;

    Ok(metadata)
}
