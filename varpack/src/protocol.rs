//! Messages exchanged between the controller and the presenter.
//!
//! Every message is a self-contained value: nothing is shared between the
//! two sides. The JSON form is `{"type": "<kebab-name>", "payload": {...}}`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::pass::PreparedBatch;
use crate::target::{OutputFormat, Preferences};

/// One file of a prepared batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedFile {
    #[serde(default)]
    pub file_name: String,
    #[serde(default, deserialize_with = "lenient_bytes")]
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPayload {
    pub files: Vec<PreparedFile>,
    pub archive_name: String,
    #[serde(flatten)]
    pub preferences: Preferences,
}

impl From<PreparedBatch> for BatchPayload {
    fn from(batch: PreparedBatch) -> Self {
        BatchPayload {
            files: batch.files,
            archive_name: batch.archive_name,
            preferences: batch.preferences,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailurePayload {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuePayload<T> {
    pub value: T,
}

/// Controller → presenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ToPresenter {
    PreparedBatch(BatchPayload),
    ExportFailed(FailurePayload),
}

/// Presenter → controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ToController {
    #[serde(rename = "toggle-include-24")]
    ToggleInclude24(ValuePayload<bool>),
    #[serde(rename = "toggle-upscale-128")]
    ToggleUpscale128(ValuePayload<bool>),
    ChangeFormat(ValuePayload<OutputFormat>),
    BatchExported,
    DownloadFailed(FailurePayload),
    Cancel,
}

impl ToController {
    pub fn toggle_include_24(value: bool) -> Self {
        ToController::ToggleInclude24(ValuePayload { value })
    }

    pub fn toggle_upscale_128(value: bool) -> Self {
        ToController::ToggleUpscale128(ValuePayload { value })
    }

    pub fn change_format(value: OutputFormat) -> Self {
        ToController::ChangeFormat(ValuePayload { value })
    }

    pub fn download_failed(message: impl Into<String>) -> Self {
        ToController::DownloadFailed(FailurePayload {
            message: message.into(),
        })
    }
}

/// Accept a byte array; anything else (strings, out-of-range numbers,
/// objects, null) becomes an empty buffer instead of failing the message.
fn lenient_bytes<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Bytes(Vec<u8>),
        Other(serde::de::IgnoredAny),
    }

    match Lenient::deserialize(deserializer)? {
        Lenient::Bytes(bytes) => Ok(bytes),
        Lenient::Other(_) => {
            tracing::warn!("Malformed file bytes replaced with an empty buffer");
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prepared_batch_shape() {
        let message = ToPresenter::PreparedBatch(BatchPayload {
            files: vec![PreparedFile {
                file_name: "ICON_PNG.png".into(),
                bytes: vec![1, 2],
            }],
            archive_name: "EXPORT.zip".into(),
            preferences: Preferences::default(),
        });

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "type": "prepared-batch",
                "payload": {
                    "files": [{ "fileName": "ICON_PNG.png", "bytes": [1, 2] }],
                    "archiveName": "EXPORT.zip",
                    "includeSize24": false,
                    "upscaleTo128": true,
                    "outputFormat": "Raster"
                }
            })
        );
    }

    #[test]
    fn test_controller_message_names() {
        let cases = [
            (ToController::toggle_include_24(true), "toggle-include-24"),
            (ToController::toggle_upscale_128(false), "toggle-upscale-128"),
            (ToController::change_format(OutputFormat::Vector), "change-format"),
            (ToController::BatchExported, "batch-exported"),
            (ToController::download_failed("disk full"), "download-failed"),
            (ToController::Cancel, "cancel"),
        ];
        for (message, name) in cases {
            let value = serde_json::to_value(&message).unwrap();
            assert_eq!(value["type"], name);
            let back: ToController = serde_json::from_value(value).unwrap();
            assert_eq!(back, message);
        }
    }

    #[test]
    fn test_change_format_payload() {
        let message: ToController = serde_json::from_value(json!({
            "type": "change-format",
            "payload": { "value": "Vector" }
        }))
        .unwrap();
        assert_eq!(message, ToController::change_format(OutputFormat::Vector));
    }

    #[test]
    fn test_malformed_bytes_become_empty() {
        let message: ToPresenter = serde_json::from_value(json!({
            "type": "prepared-batch",
            "payload": {
                "files": [
                    { "fileName": "A_PNG.png", "bytes": "not bytes" },
                    { "fileName": "B_PNG.png", "bytes": [1, 999] },
                    { "fileName": "C_PNG.png" },
                    { "fileName": "D_PNG.png", "bytes": [7, 8] }
                ],
                "archiveName": "x.zip",
                "includeSize24": true,
                "upscaleTo128": false,
                "outputFormat": "Raster"
            }
        }))
        .unwrap();

        let ToPresenter::PreparedBatch(batch) = message else {
            panic!("expected a prepared batch");
        };
        let sizes: Vec<_> = batch.files.iter().map(|f| f.bytes.len()).collect();
        assert_eq!(sizes, vec![0, 0, 0, 2]);
        assert!(batch.preferences.include_size_24);
    }
}
