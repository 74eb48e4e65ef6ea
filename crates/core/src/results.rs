//! Typed views over the operation-specific result payloads.
//!
//! The orchestrator treats a completed job's result as opaque JSON;
//! callers that know which operation they ran can decode it into one of
//! these shapes. Fields the backend sometimes omits default rather than
//! fail the decode.

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Decode an opaque result payload into an operation-specific type.
pub fn decode<T: DeserializeOwned>(result: &serde_json::Value) -> Result<T, serde_json::Error> {
    T::deserialize(result)
}

/// Result of a completed article generation: the created article.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedArticle {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Result of a completed rewrite.
#[derive(Debug, Clone, Deserialize)]
pub struct RewriteResult {
    pub rewritten_text: String,
}

/// Result of a completed SEO audit.
#[derive(Debug, Clone, Deserialize)]
pub struct SeoAuditReport {
    pub overall_score: u32,
    pub grade: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub critical_issues: Vec<serde_json::Value>,
    #[serde(default)]
    pub recommendations: Vec<serde_json::Value>,
}

/// Result of a completed competitor comparison.
#[derive(Debug, Clone, Deserialize)]
pub struct CompetitorReport {
    pub overall_verdict: String,
    pub my_score: u32,
    pub competitor_score: u32,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub strengths: Vec<serde_json::Value>,
    #[serde(default)]
    pub weaknesses: Vec<serde_json::Value>,
}

/// Result of a completed keyword analysis.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordAnalyticsReport {
    #[serde(default)]
    pub keywords: Vec<serde_json::Value>,
}
