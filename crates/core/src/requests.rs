//! Request DTOs for the five operations, validated before submission.
//!
//! Validation happens client-side so an obviously bad request never
//! creates a backend job; the backend still re-validates and may reject
//! with a 4xx, which surfaces as a submission error.

use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::operation::OperationKind;

/// Input to one of the long-running operations.
///
/// Ties a serializable request body to the [`OperationKind`] whose
/// endpoints it is submitted to.
pub trait OperationRequest: Serialize + Validate {
    const KIND: OperationKind;
}

/// `POST /api/articles/generate`
#[derive(Debug, Clone, Serialize, Validate)]
pub struct GenerateArticleRequest {
    #[validate(length(min = 1, message = "topic must not be empty"))]
    pub topic: String,
    #[validate(length(min = 1, message = "primary keyword must not be empty"))]
    pub primary_keyword: String,
    pub secondary_keywords: Vec<String>,
    #[validate(range(min = 500, max = 5000, message = "target length must be 500-5000 words"))]
    pub target_length: u32,
    #[validate(length(min = 1, message = "tone must not be empty"))]
    pub tone: String,
}

impl OperationRequest for GenerateArticleRequest {
    const KIND: OperationKind = OperationKind::ArticleGeneration;
}

/// `POST /api/rewrite`
#[derive(Debug, Clone, Serialize, Validate)]
pub struct RewriteRequest {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
    #[validate(length(min = 1, message = "style must not be empty"))]
    pub style: String,
}

impl OperationRequest for RewriteRequest {
    const KIND: OperationKind = OperationKind::Rewrite;
}

/// `POST /api/competition/analyze`
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CompetitorAnalysisRequest {
    #[validate(length(min = 1, message = "article id must not be empty"))]
    pub article_id: String,
    #[validate(url(message = "competitor URL must be a valid http(s) URL"))]
    pub competitor_url: String,
}

impl OperationRequest for CompetitorAnalysisRequest {
    const KIND: OperationKind = OperationKind::CompetitorAnalysis;
}

/// `POST /api/seo-audit`
#[derive(Debug, Clone, Serialize, Validate)]
pub struct SeoAuditRequest {
    #[validate(url(message = "URL must be a valid http(s) URL"))]
    pub url: String,
}

impl OperationRequest for SeoAuditRequest {
    const KIND: OperationKind = OperationKind::SeoAudit;
}

/// `POST /api/keyword-analytics/analyze`
#[derive(Debug, Clone, Serialize, Validate)]
pub struct KeywordAnalyticsRequest {
    #[validate(
        length(min = 1, max = 10, message = "between 1 and 10 keywords"),
        custom(function = keywords_non_empty)
    )]
    pub keywords: Vec<String>,
    pub industry: String,
}

impl OperationRequest for KeywordAnalyticsRequest {
    const KIND: OperationKind = OperationKind::KeywordAnalytics;
}

fn keywords_non_empty(keywords: &[String]) -> Result<(), ValidationError> {
    if keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ValidationError::new("keyword_empty")
            .with_message("keywords must not contain empty entries".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_request() -> GenerateArticleRequest {
        GenerateArticleRequest {
            topic: "How to account for VAT in a sole proprietorship".into(),
            primary_keyword: "VAT accounting".into(),
            secondary_keywords: vec!["VAT".into(), "bookkeeping".into()],
            target_length: 1500,
            tone: "professional".into(),
        }
    }

    #[test]
    fn valid_generate_request_passes() {
        assert!(generate_request().validate().is_ok());
    }

    #[test]
    fn empty_topic_rejected() {
        let mut req = generate_request();
        req.topic = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn target_length_bounds_enforced() {
        let mut req = generate_request();
        req.target_length = 499;
        assert!(req.validate().is_err());
        req.target_length = 5001;
        assert!(req.validate().is_err());
        req.target_length = 500;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn empty_rewrite_text_rejected() {
        let req = RewriteRequest {
            text: String::new(),
            style: "professional".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn audit_requires_valid_url() {
        assert!(SeoAuditRequest {
            url: "not a url".into()
        }
        .validate()
        .is_err());
        assert!(SeoAuditRequest {
            url: "https://example.com".into()
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn keyword_count_bounds_enforced() {
        let req = KeywordAnalyticsRequest {
            keywords: vec![],
            industry: "accounting".into(),
        };
        assert!(req.validate().is_err());

        let req = KeywordAnalyticsRequest {
            keywords: (0..11).map(|i| format!("kw{i}")).collect(),
            industry: "accounting".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn blank_keyword_entries_rejected() {
        let req = KeywordAnalyticsRequest {
            keywords: vec!["VAT".into(), "  ".into()],
            industry: "accounting".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn request_bodies_serialize_with_wire_field_names() {
        let body = serde_json::to_value(generate_request()).unwrap();
        assert!(body.get("primary_keyword").is_some());
        assert!(body.get("secondary_keywords").is_some());

        let body = serde_json::to_value(CompetitorAnalysisRequest {
            article_id: "art-1".into(),
            competitor_url: "https://example.com".into(),
        })
        .unwrap();
        assert!(body.get("competitor_url").is_some());
    }
}
