use serde::{Deserialize, Serialize};
use time::Date;

use crate::images::EncodedImage;
use crate::week::calendar::iso_date;

/// One logged food. Never edited after creation; only removed by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealLogEntry {
    pub id: String,                   // opaque unique id
    #[serde(with = "iso_date")]
    pub date: Date,
    pub meal: String,                 // slot label, matched against row titles
    pub food: String,
    pub calories: u32,
    pub cold: bool,                   // fixed at creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<EncodedImage>,
}
