use serde::Deserialize;
use serde::Serialize;
use strum::Display;
use uuid::Uuid;

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;

/// Processing state of an uploaded model. Unrecognised backend states map to `Unknown`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(from = "Option<String>")]
pub enum ModelState {
    Received,
    Indexing,
    Ready,
    Failed,
    #[default]
    Unknown,
}

impl From<Option<String>> for ModelState {
    fn from(value: Option<String>) -> ModelState {
        return value.map(ModelState::from).unwrap_or_default();
    }
}

impl From<String> for ModelState {
    fn from(value: String) -> ModelState {
        match value.trim().to_lowercase().as_str() {
            "received" | "uploaded" | "uploading" => return ModelState::Received,
            "indexing" | "processing" => return ModelState::Indexing,
            "ready" | "finished" | "complete" | "completed" => return ModelState::Ready,
            "failed" | "error" => return ModelState::Failed,
            _ => return ModelState::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub folder_id: Option<u64>,
    #[serde(default)]
    pub state: ModelState,
}

impl Model {
    pub fn new(id: Uuid, name: &str) -> Model {
        return Model {
            id,
            name: name.to_string(),
            folder_id: None,
            state: ModelState::Unknown,
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMatch {
    #[serde(rename = "matchedModel")]
    pub model: Model,
    #[serde(rename = "matchPercentage")]
    pub percentage: f64,
}
