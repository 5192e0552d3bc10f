use serde::{Deserialize, Serialize};

/// Lenient `/convert` response: names retrievable through `/download/{name}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub converted: Vec<String>,
}
