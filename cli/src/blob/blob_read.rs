use crate::{command_title, display::*, item, loading, notify_success, prelude::*};

#[derive(Args, Clone, Debug)]
pub(crate) struct ReadCommand {
    /// The blob ID to read.
    #[arg(value_name = "BLOB_ID")]
    blob_id: String,
    #[arg(
        long = "out",
        short = 'o',
        help = "Write the blob to this file",
        value_name = "PATH",
        value_parser = ValueParser::from(expand_tilde)
    )]
    out: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
pub(crate) struct ReadObjectCommand {
    /// The Sui object ID of the Blob object.
    #[arg(value_name = "OBJECT_ID")]
    object_id: String,
    #[arg(
        long = "out",
        short = 'o',
        help = "Write the blob to this file",
        value_name = "PATH",
        value_parser = ValueParser::from(expand_tilde)
    )]
    out: PathBuf,
}

/// Summary of a read, printed in JSON mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct ReadSummary {
    pub(crate) id: String,
    pub(crate) size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) path: Option<PathBuf>,
}

/// Read a blob by its blob ID, optionally saving it to a file.
pub(crate) async fn read(
    ReadCommand { blob_id, out }: ReadCommand,
    conf_path: &PathBuf,
) -> AnyResult<ReadSummary, WalrusCliError> {
    command_title!("Reading blob '{blob_id}'");

    let client = build_client(conf_path)?;

    let read_handle = loading!("Fetching blob from {}...", client.aggregator_url());

    let result = match &out {
        Some(path) => match client.get_blob_as_file(&blob_id, path).await {
            Ok(()) => std::fs::metadata(path)
                .map(|metadata| metadata.len())
                .map_err(WalrusCliError::IoError),
            Err(e) => Err(WalrusCliError::Walrus(e)),
        },
        None => client
            .get_blob(&blob_id)
            .await
            .map(|data| data.len() as u64)
            .map_err(WalrusCliError::Walrus),
    };

    let size = match result {
        Ok(size) => size,
        Err(e) => {
            read_handle.error();

            return Err(e);
        }
    };

    read_handle.success();

    let summary = ReadSummary {
        id: blob_id,
        size,
        path: out,
    };

    print_summary(&summary);

    json_output(&summary)?;

    Ok(summary)
}

/// Read a blob by its Sui object ID and save it to a file.
pub(crate) async fn read_object(
    ReadObjectCommand { object_id, out }: ReadObjectCommand,
    conf_path: &PathBuf,
) -> AnyResult<ReadSummary, WalrusCliError> {
    command_title!("Reading blob object '{object_id}'");

    let client = build_client(conf_path)?;

    let read_handle = loading!("Fetching blob from {}...", client.aggregator_url());

    let data = match client.get_blob_by_object_id(&object_id).await {
        Ok(data) => data,
        Err(e) => {
            read_handle.error();

            return Err(WalrusCliError::Walrus(e));
        }
    };

    read_handle.success();

    tokio::fs::write(&out, &data)
        .await
        .map_err(WalrusCliError::IoError)?;

    let summary = ReadSummary {
        id: object_id,
        size: data.len() as u64,
        path: Some(out),
    };

    print_summary(&summary);

    json_output(&summary)?;

    Ok(summary)
}

fn print_summary(summary: &ReadSummary) {
    notify_success!("Read {} bytes", summary.size);

    if let Some(path) = &summary.path {
        item!("Saved to: {}", path.display().to_string().truecolor(100, 100, 100));
    }
}
