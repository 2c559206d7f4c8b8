//! Issue Lifecycle Manager
//!
//! Orchestrates screening, image upload, department routing, persistence,
//! and status-change notification. All outbound I/O is strictly sequential
//! within a request and attempted exactly once; the only recovery performed
//! here is best-effort cleanup, whose failures are logged and swallowed.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::gateway::{Filters, RemoteStore, RestMethod};
use crate::identity::CurrentUser;
use crate::media::MediaStore;
use crate::routing;
use crate::screening;
use crate::shared::error::{Result, ServiceError};

use super::entity::{Image, Issue, IssueDraft, IssuePatch};

/// One image blob taken from the multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
}

const IMAGE_FOLDER: &str = "issues";

pub struct IssueService {
    store: Arc<dyn RemoteStore>,
    media: Arc<dyn MediaStore>,
}

impl IssueService {
    pub fn new(store: Arc<dyn RemoteStore>, media: Arc<dyn MediaStore>) -> Self {
        Self { store, media }
    }

    /// Create an issue from a citizen submission.
    ///
    /// The screening verdict is evaluated once, before any side effect; a
    /// rejected submission performs zero uploads and zero persistence. If
    /// persistence fails after uploads, each uploaded image is deleted
    /// best-effort exactly once and the persistence failure propagates.
    pub async fn create(
        &self,
        draft: IssueDraft,
        images: Vec<ImageUpload>,
        user: Option<&CurrentUser>,
    ) -> Result<Issue> {
        let combined = format!("{} {}", draft.title, draft.description);
        if screening::is_rejected(&combined) {
            return Err(ServiceError::rejected("Submission flagged as spam"));
        }

        let mut uploaded: Vec<Image> = Vec::new();
        match self.create_inner(&draft, images, user, &combined, &mut uploaded).await {
            Ok(issue) => Ok(issue),
            Err(err) => {
                self.cleanup_images(&uploaded).await;
                Err(err)
            }
        }
    }

    async fn create_inner(
        &self,
        draft: &IssueDraft,
        images: Vec<ImageUpload>,
        user: Option<&CurrentUser>,
        combined_text: &str,
        uploaded: &mut Vec<Image>,
    ) -> Result<Issue> {
        // Uploads are sequential; the stored image order follows the form.
        for image in images {
            let outcome = self
                .media
                .upload(image.bytes, &image.filename, IMAGE_FOLDER)
                .await?;
            match outcome.into_image() {
                Some(stored) => uploaded.push(stored),
                None => warn!(filename = %image.filename, "image host refused upload, skipping"),
            }
        }

        let department_id = self.infer_department_id(combined_text).await?;

        let payload = json!({
            "title": draft.title,
            "description": draft.description,
            "location": draft.location,
            "status": draft.status.clone().unwrap_or_else(|| "pending".to_string()),
            "images": uploaded,
            "user_id": user.map(|u| u.id.clone()),
            "department_id": department_id,
        });

        let response = self
            .store
            .request(RestMethod::Post, "issues", Some(payload), None)
            .await?;
        if !matches!(response.status, 200 | 201) {
            return Err(ServiceError::upstream(response.status, response.data));
        }

        // The store may answer with a single-element list or a bare object.
        let created = response
            .data
            .as_array()
            .and_then(|rows| rows.first().cloned())
            .unwrap_or(response.data);
        Ok(serde_json::from_value(created)?)
    }

    /// Infer a department from the submission text and reconcile the name
    /// against the live department list. An unresolved inference is
    /// "unassigned", not an error. The list is fetched fresh per call.
    async fn infer_department_id(&self, text: &str) -> Result<Option<String>> {
        let Some(name) = routing::infer_department(text) else {
            return Ok(None);
        };

        let response = self
            .store
            .request(RestMethod::Get, "departments", None, None)
            .await?;
        let id_to_name: HashMap<String, String> = response
            .rows()
            .iter()
            .filter_map(|row| {
                let id = id_as_string(row.get("id")?)?;
                let name = row.get("name")?.as_str()?.to_string();
                Some((id, name))
            })
            .collect();

        Ok(routing::resolve_id(&id_to_name, name))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Issue>> {
        let filters = Filters::eq("id", id);
        let response = self
            .store
            .request(RestMethod::Get, "issues", None, Some(&filters))
            .await?;
        Ok(response
            .rows()
            .into_iter()
            .next()
            .and_then(|row| serde_json::from_value(row).ok()))
    }

    pub async fn list(&self, status: Option<&str>, category: Option<&str>) -> Result<Vec<Issue>> {
        let mut filters = Filters::new();
        if let Some(status) = status {
            filters = filters.and_eq("status", status);
        }
        if let Some(category) = category {
            filters = filters.and_eq("category", category);
        }
        let response = self
            .store
            .request(RestMethod::Get, "issues", None, Some(&filters))
            .await?;
        Ok(parse_rows(response.rows()))
    }

    /// Issues assigned to a staff member.
    pub async fn assigned_to(&self, user_id: &str) -> Result<Vec<Issue>> {
        let filters = Filters::eq("assignee", user_id);
        let response = self
            .store
            .request(RestMethod::Get, "issues", None, Some(&filters))
            .await?;
        Ok(parse_rows(response.rows()))
    }

    /// Apply a partial update.
    ///
    /// The previous row is fetched first to observe the prior status; when
    /// the status changes, exactly one notification is written for the
    /// issue's original owner, best-effort. Returns `None` when the update
    /// call did not report success.
    ///
    /// Two concurrent updates on the same id can lose one of the writes;
    /// the remote store exposes no version column to guard against it.
    pub async fn update(
        &self,
        id: &str,
        patch: IssuePatch,
        _user: &CurrentUser,
    ) -> Result<Option<Issue>> {
        let existing = self.get(id).await?;

        let payload = Value::Object(patch.to_payload());
        let filters = Filters::eq("id", id);
        let response = self
            .store
            .request(RestMethod::Patch, "issues", Some(payload), Some(&filters))
            .await?;
        if !matches!(response.status, 200 | 204) {
            return Ok(None);
        }

        if let Some(existing) = &existing {
            self.notify_status_change(id, existing, patch.status.as_deref())
                .await;
        }

        self.get(id).await
    }

    /// Fire-and-forget owner notification for a status transition.
    async fn notify_status_change(&self, id: &str, existing: &Issue, new_status: Option<&str>) {
        let (Some(new_status), Some(old_status)) = (new_status, existing.status.as_deref()) else {
            return;
        };
        if new_status == old_status {
            return;
        }

        let note = json!({
            "user_id": existing.user_id,
            "issue_id": id,
            "message": format!("Your issue status changed from {} to {}", old_status, new_status),
        });
        match self
            .store
            .request(
                RestMethod::Post,
                "notifications",
                Some(json!({ "entries": [note] })),
                None,
            )
            .await
        {
            Ok(response) if !response.is_success() => {
                warn!(issue_id = %id, status = response.status, "notification write refused");
            }
            Ok(_) => {}
            Err(err) => warn!(issue_id = %id, error = %err, "notification dispatch failed"),
        }
    }

    /// Delete an issue and its images. Only the owning user may delete;
    /// there is no admin override.
    pub async fn delete(&self, id: &str, user: &CurrentUser) -> Result<()> {
        let issue = self
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Issue", id))?;

        if issue.user_id.as_deref() != Some(user.id.as_str()) {
            return Err(ServiceError::forbidden(
                "Only the reporting user may delete an issue",
            ));
        }

        self.cleanup_images(&issue.images).await;

        let filters = Filters::eq("id", id);
        let response = self
            .store
            .request(RestMethod::Delete, "issues", None, Some(&filters))
            .await?;
        if matches!(response.status, 200 | 204) {
            Ok(())
        } else {
            Err(ServiceError::upstream(response.status, response.data))
        }
    }

    /// Delete each image once, ignoring failures.
    async fn cleanup_images(&self, images: &[Image]) {
        for image in images {
            if let Err(err) = self.media.delete(&image.public_id).await {
                warn!(public_id = %image.public_id, error = %err, "image cleanup failed");
            }
        }
    }
}

fn parse_rows(rows: Vec<Value>) -> Vec<Issue> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(issue) => Some(issue),
            Err(err) => {
                warn!(error = %err, "skipping malformed issue row");
                None
            }
        })
        .collect()
}

fn id_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
