//! Label entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use doclabel_core::types::{DbId, Timestamp};

/// A label row from the `labels` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Label {
    pub id: DbId,
    pub project_id: DbId,
    pub text: String,
    pub background_color: String,
    pub text_color: String,
    pub prefix_key: Option<String>,
    pub suffix_key: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a label. Colors fall back to the column defaults.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLabel {
    #[validate(length(min = 1, max = 100))]
    pub text: String,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    #[validate(length(max = 10))]
    pub prefix_key: Option<String>,
    #[validate(length(max = 1))]
    pub suffix_key: Option<String>,
}
