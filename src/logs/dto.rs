use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateLogRequest {
    /// `YYYY-MM-DD`; today when omitted.
    #[serde(default)]
    pub date: Option<String>,
    pub meal: String,
    pub food: String,
    pub calories: i64,
    /// Raw photo bytes, base64; normalized before storing.
    #[serde(default)]
    pub photo_b64: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteLogResponse {
    pub id: String,
    pub deleted: bool,
}
