use crate::{command_title, display::*, loading, notify_error, notify_success, prelude::*};

#[derive(Args, Clone, Debug)]
pub(crate) struct VerifyCommand {
    /// The blob ID to verify.
    #[arg(value_name = "BLOB_ID")]
    blob_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct VerifySummary {
    pub(crate) blob_id: String,
    pub(crate) exists: bool,
}

/// Check whether the aggregator serves a blob.
pub(crate) async fn verify(
    VerifyCommand { blob_id }: VerifyCommand,
    conf_path: &PathBuf,
) -> AnyResult<VerifySummary, WalrusCliError> {
    command_title!("Verifying blob '{blob_id}'");

    let client = build_client(conf_path)?;

    let verify_handle = loading!("Asking {}...", client.aggregator_url());

    let exists = match client.verify_blob(&blob_id).await {
        Ok(exists) => exists,
        Err(e) => {
            verify_handle.error();

            return Err(WalrusCliError::Walrus(e));
        }
    };

    verify_handle.success();

    if exists {
        notify_success!("Blob '{blob_id}' is available");
    } else {
        notify_error!("Blob '{blob_id}' is not available");
    }

    let summary = VerifySummary { blob_id, exists };

    json_output(&summary)?;

    Ok(summary)
}
