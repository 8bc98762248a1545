use serde::{Deserialize, Serialize};

/// Sui event emitted when a blob was certified
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiEvent {
    pub tx_digest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_seq: Option<String>,
}
