use {
    crate::{command_title, display::*, item, loading, notify_success, prelude::*},
    walrus_sdk::{StoreResponse, UploadParams},
};

#[derive(Args, Clone, Debug)]
pub(crate) struct StoreCommand {
    /// The file to store.
    #[arg(value_name = "FILE", value_parser = ValueParser::from(expand_tilde))]
    file: PathBuf,
    #[arg(
        long = "epochs",
        short = 'e',
        help = "Number of epochs ahead of the current one to store the blob",
        value_name = "EPOCHS"
    )]
    epochs: Option<u64>,
    #[arg(
        long = "deletable",
        help = "Create a deletable blob",
        conflicts_with = "permanent"
    )]
    deletable: bool,
    #[arg(long = "permanent", help = "Create a permanent blob")]
    permanent: bool,
    #[arg(
        long = "send-object-to",
        help = "Sui address to send the created Blob object to",
        value_name = "ADDRESS"
    )]
    send_object_to: Option<String>,
    #[arg(
        long = "encoding-type",
        help = "The encoding type to use for the blob",
        value_name = "ENCODING"
    )]
    encoding_type: Option<String>,
}

impl StoreCommand {
    fn upload_params(&self) -> UploadParams {
        UploadParams {
            encoding_type: self.encoding_type.clone(),
            epochs: self.epochs,
            deletable: match (self.deletable, self.permanent) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            },
            send_object_to: self.send_object_to.clone(),
        }
    }
}

/// Store a file as a blob and print where it ended up.
pub(crate) async fn store(
    command: StoreCommand,
    conf_path: &PathBuf,
) -> AnyResult<StoreResponse, WalrusCliError> {
    command_title!("Storing '{}' on Walrus", command.file.display());

    let client = build_client(conf_path)?;
    let params = command.upload_params();

    let store_handle = loading!("Uploading blob to {}...", client.publisher_url());

    let response = match client.put_blob_from_file(&command.file, &params).await {
        Ok(response) => response,
        Err(e) => {
            store_handle.error();

            return Err(WalrusCliError::Walrus(e));
        }
    };

    store_handle.success();

    match (&response.newly_created, &response.already_certified) {
        (Some(created), _) => {
            notify_success!("Blob stored");

            item!("Blob ID: {}", created.blob_object.blob_id.truecolor(100, 100, 100));
            item!("Object ID: {}", created.blob_object.id.truecolor(100, 100, 100));
            item!("End epoch: {}", created.blob_object.storage.end_epoch);

            if let Some(cost) = created.cost {
                item!("Cost: {cost}");
            }
        }
        (None, Some(certified)) => {
            notify_success!("Blob was already certified");

            item!("Blob ID: {}", certified.blob_id.truecolor(100, 100, 100));
            item!("End epoch: {}", certified.end_epoch);
        }
        (None, None) => {
            return Err(WalrusCliError::Any(anyhow!(
                "Publisher response contains neither a new nor a certified blob"
            )));
        }
    }

    json_output(&response)?;

    Ok(response)
}
