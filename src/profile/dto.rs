use serde::Serialize;

use super::repo_types::Profile;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    /// Estimated kcal/day; null until height and weight are filled in.
    pub daily_target: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored_keys: Vec<String>,
}
