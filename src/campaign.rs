//! Campaign payloads exchanged with the CRM backend.
//!
//! Nothing here talks to the network: these types are the request bodies the
//! backend expects and the responses it returns, plus the small amount of
//! logic that runs on the client side (draft validation, status lifecycle,
//! message personalisation).

use crate::segment::{RuleRow, SegmentQueryDocument, decompile};
use regex::{NoExpand, Regex};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

pub const DEFAULT_MESSAGE: &str = "Hi {{name}}, here’s 10% off on your next order!";

/// Number of customers requested by an audience preview unless configured
pub const DEFAULT_PREVIEW_LIMIT: u32 = 20;

/// Campaigns per page of the history list
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

static NAME_PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*name\s*\}\}").expect("valid placeholder regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CampaignError {
    #[error("Campaign name is required")]
    MissingName,

    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Unknown campaign status: '{0}'. Valid statuses are: draft, running, completed")]
    UnknownStatus(String),

    #[error("Cannot move a campaign from {from} to {to}")]
    InvalidTransition {
        from: CampaignStatus,
        to: CampaignStatus,
    },
}

/// Body of `POST /campaigns/preview`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub segment_rules: SegmentQueryDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl PreviewRequest {
    pub fn new(segment_rules: SegmentQueryDocument) -> Self {
        Self {
            segment_rules,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A campaign being filled in, before it is sent
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignDraft {
    pub created_by: String,
    pub name: String,
    pub message: String,
}

impl Default for CampaignDraft {
    fn default() -> Self {
        Self {
            created_by: String::new(),
            name: String::new(),
            message: DEFAULT_MESSAGE.to_string(),
        }
    }
}

impl CampaignDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn created_by(mut self, user: impl Into<String>) -> Self {
        self.created_by = user.into();
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn validate(&self) -> Result<(), CampaignError> {
        if self.name.trim().is_empty() {
            return Err(CampaignError::MissingName);
        }
        if self.message.trim().is_empty() {
            return Err(CampaignError::EmptyMessage);
        }
        Ok(())
    }

    /// Validate the draft and attach the audience
    pub fn into_request(
        self,
        segment_rules: SegmentQueryDocument,
    ) -> Result<CreateCampaignRequest, CampaignError> {
        self.validate()?;
        Ok(CreateCampaignRequest {
            created_by: self.created_by,
            name: self.name,
            message: self.message,
            segment_rules,
        })
    }
}

/// Body of `POST /campaigns`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    pub created_by: String,
    pub name: String,
    pub message: String,
    pub segment_rules: SegmentQueryDocument,
}

/// Response of the natural-language rule parser: `{"rules": {...}}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParseRulesResponse {
    pub rules: SegmentQueryDocument,
}

impl ParseRulesResponse {
    pub fn into_rows(self) -> Vec<RuleRow> {
        decompile(&self.rules)
    }
}

/// Lifecycle of a campaign: draft, then running, then completed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Running,
    Completed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Running => "running",
            CampaignStatus::Completed => "completed",
        }
    }

    /// The only status this one may move to
    pub fn next(&self) -> Option<CampaignStatus> {
        match self {
            CampaignStatus::Draft => Some(CampaignStatus::Running),
            CampaignStatus::Running => Some(CampaignStatus::Completed),
            CampaignStatus::Completed => None,
        }
    }

    pub fn can_transition_to(&self, target: CampaignStatus) -> bool {
        self.next() == Some(target)
    }

    /// Build the status update body, refusing transitions the lifecycle forbids
    pub fn transition_to(
        &self,
        target: CampaignStatus,
    ) -> Result<StatusUpdateRequest, CampaignError> {
        if self.can_transition_to(target) {
            Ok(StatusUpdateRequest { status: target })
        } else {
            Err(CampaignError::InvalidTransition {
                from: *self,
                to: target,
            })
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(CampaignStatus::Draft),
            "running" => Ok(CampaignStatus::Running),
            "completed" => Ok(CampaignStatus::Completed),
            _ => Err(CampaignError::UnknownStatus(s.to_string())),
        }
    }
}

/// Body of `PATCH /campaigns/{id}/status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusUpdateRequest {
    pub status: CampaignStatus,
}

/// Actions offered for a campaign in the history list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignAction {
    Start,
    Complete,
    Delete,
}

/// HTTP request the backend expects for a history action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRequest {
    pub action: CampaignAction,
    pub method: &'static str,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<StatusUpdateRequest>,
}

/// One entry of `GET /campaigns`.
///
/// Read leniently: a record the lifecycle doesn't know about is still listed,
/// it just offers no status actions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecord {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: Value,
    /// Status exactly as the backend reports it; missing or null reads as draft
    #[serde(default = "draft_status", deserialize_with = "status_text")]
    pub status: String,
    #[serde(default)]
    pub audience_size: Value,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn draft_status() -> String {
    CampaignStatus::Draft.as_str().to_string()
}

fn status_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(status) => status,
        Value::Null => draft_status(),
        other => other.to_string(),
    })
}

impl CampaignRecord {
    /// The status as a lifecycle stage, if it is one
    pub fn lifecycle(&self) -> Option<CampaignStatus> {
        self.status.parse().ok()
    }

    /// Status this campaign may move to next
    pub fn next_status(&self) -> Option<CampaignStatus> {
        self.lifecycle().and_then(|status| status.next())
    }

    pub fn actions(&self) -> Vec<CampaignAction> {
        let mut actions = Vec::new();
        match self.lifecycle() {
            Some(CampaignStatus::Draft) => actions.push(CampaignAction::Start),
            Some(CampaignStatus::Running) => actions.push(CampaignAction::Complete),
            Some(CampaignStatus::Completed) | None => {}
        }
        actions.push(CampaignAction::Delete);
        actions
    }

    /// Request behind each action offered for this campaign
    pub fn action_requests(&self) -> Vec<ActionRequest> {
        self.actions()
            .into_iter()
            .map(|action| match action {
                CampaignAction::Delete => ActionRequest {
                    action,
                    method: "DELETE",
                    path: format!("/campaigns/{}", self.id),
                    body: None,
                },
                CampaignAction::Start | CampaignAction::Complete => ActionRequest {
                    action,
                    method: "PATCH",
                    path: format!("/campaigns/{}/status", self.id),
                    body: self
                        .next_status()
                        .map(|status| StatusUpdateRequest { status }),
                },
            })
            .collect()
    }
}

/// Paged response of `GET /campaigns`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CampaignPage {
    #[serde(default)]
    pub data: Vec<CampaignRecord>,
}

/// Page of the campaign history to request; pages start at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryQuery {
    pub page: u32,
    pub limit: u32,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl HistoryQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit,
        }
    }

    /// Path and query string of `GET /campaigns`
    pub fn path(&self) -> String {
        format!("/campaigns?page={}&limit={}", self.page, self.limit)
    }

    pub fn next_page(&self) -> Self {
        Self::new(self.page.saturating_add(1), self.limit)
    }

    /// The previous page, or `None` on the first one
    pub fn previous_page(&self) -> Option<Self> {
        (self.page > 1).then(|| Self::new(self.page - 1, self.limit))
    }
}

/// A customer returned by an audience preview. Fields are loosely typed; the
/// backend does not guarantee their shape.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewCustomer {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub email: Value,
    #[serde(default)]
    pub phone: Value,
    #[serde(default)]
    pub total_spend: Value,
    #[serde(default)]
    pub visits: Value,
    #[serde(default)]
    pub last_active: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PreviewData {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub customers: Vec<PreviewCustomer>,
}

/// Response of `POST /campaigns/preview`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PreviewResponse {
    #[serde(default)]
    pub data: PreviewData,
}

/// Substitute `{{name}}` placeholders in a campaign message
pub fn render_message(template: &str, name: &str) -> String {
    NAME_PLACEHOLDER_RE
        .replace_all(template, NoExpand(name))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_draft_requires_name_and_message() {
        let doc = SegmentQueryDocument::new();
        assert_eq!(
            CampaignDraft::new("  ").into_request(doc.clone()),
            Err(CampaignError::MissingName)
        );
        assert_eq!(
            CampaignDraft::new("Win-back").message(" ").into_request(doc),
            Err(CampaignError::EmptyMessage)
        );
    }

    #[test]
    fn test_status_lifecycle() {
        assert!(CampaignStatus::Draft.can_transition_to(CampaignStatus::Running));
        assert!(CampaignStatus::Running.can_transition_to(CampaignStatus::Completed));
        assert!(!CampaignStatus::Draft.can_transition_to(CampaignStatus::Completed));
        assert!(!CampaignStatus::Completed.can_transition_to(CampaignStatus::Draft));
        assert_eq!(CampaignStatus::Completed.next(), None);
    }

    #[test]
    fn test_status_update_body() {
        let body = CampaignStatus::Draft
            .transition_to(CampaignStatus::Running)
            .unwrap();
        assert_eq!(serde_json::to_value(body).unwrap(), json!({"status": "running"}));
    }

    #[test]
    fn test_render_message() {
        assert_eq!(
            render_message(DEFAULT_MESSAGE, "Aman"),
            "Hi Aman, here’s 10% off on your next order!"
        );
        assert_eq!(render_message("{{ name }} / {{name}}", "A"), "A / A");
        assert_eq!(render_message("Hi {{name}}", "$1"), "Hi $1");
    }

    #[test]
    fn test_unknown_status_offers_only_delete() {
        let record: CampaignRecord = serde_json::from_value(
            json!({"_id": "c9", "status": "scheduled", "audienceSize": null}),
        )
        .unwrap();
        assert_eq!(record.status, "scheduled");
        assert_eq!(record.lifecycle(), None);
        assert_eq!(record.next_status(), None);
        assert_eq!(record.actions(), vec![CampaignAction::Delete]);
        assert_eq!(record.audience_size, Value::Null);
    }

    #[test]
    fn test_action_requests() {
        let record: CampaignRecord =
            serde_json::from_value(json!({"_id": "c1", "status": "draft"})).unwrap();
        assert_eq!(
            serde_json::to_value(record.action_requests()).unwrap(),
            json!([
                {"action": "start", "method": "PATCH", "path": "/campaigns/c1/status", "body": {"status": "running"}},
                {"action": "delete", "method": "DELETE", "path": "/campaigns/c1"}
            ])
        );
    }

    #[test]
    fn test_history_query_paging() {
        let first = HistoryQuery::default();
        assert_eq!(first.path(), "/campaigns?page=1&limit=10");
        assert_eq!(first.previous_page(), None);
        assert_eq!(first.next_page().path(), "/campaigns?page=2&limit=10");
        assert_eq!(HistoryQuery::new(0, 5), HistoryQuery { page: 1, limit: 5 });
        assert_eq!(
            HistoryQuery::new(3, 10).previous_page(),
            Some(HistoryQuery::new(2, 10))
        );
    }

    #[test]
    fn test_record_actions() {
        let record: CampaignRecord =
            serde_json::from_value(json!({"_id": "c1", "name": "x", "status": "running"})).unwrap();
        assert_eq!(
            record.actions(),
            vec![CampaignAction::Complete, CampaignAction::Delete]
        );
    }
}
