mod blob_metadata;
mod blob_read;
mod blob_store;
mod blob_verify;

pub(crate) use {blob_metadata::*, blob_read::*, blob_store::*, blob_verify::*};
