use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One person extracted from the success-search stage output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessPersonRecord {
    pub name: String,
    pub profession: String,
    pub success: String,
    pub source: String,
}

impl SuccessPersonRecord {
    pub fn new(
        name: impl Into<String>,
        profession: impl Into<String>,
        success: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            profession: profession.into(),
            success: success.into(),
            source: source.into(),
        }
    }
}

// API Request/Response models
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub birth_date: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResponse {
    pub run_id: Uuid,
    pub birth_date: String,
    pub report_markdown: String,
    pub success_table: Vec<SuccessPersonRecord>,
    pub file_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub birth_date: String,
    pub content: String,
}
