//! Issue lifecycle orchestration tests.
//!
//! The remote store and media host are replaced with recording fakes so the
//! exact sequence of side effects can be asserted: what was uploaded, what
//! was deleted, and which rows were written.

use async_trait::async_trait;
use cr_platform::{
    CurrentUser, Filters, IssueDraft, IssuePatch, IssueService, MediaStore, RemoteResponse,
    RemoteStore, RestMethod, Role, ServiceError, UploadOutcome,
};
use cr_platform::issue::service::ImageUpload;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct RecordedCall {
    method: RestMethod,
    collection: String,
    payload: Option<Value>,
    query: String,
}

type Responder = dyn Fn(&RecordedCall) -> RemoteResponse + Send + Sync;

struct RecordingStore {
    calls: Mutex<Vec<RecordedCall>>,
    respond: Box<Responder>,
}

impl RecordingStore {
    fn new(respond: impl Fn(&RecordedCall) -> RemoteResponse + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        })
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn calls_to(&self, method: RestMethod, collection: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.collection == collection)
            .collect()
    }
}

#[async_trait]
impl RemoteStore for RecordingStore {
    async fn request(
        &self,
        method: RestMethod,
        collection: &str,
        payload: Option<Value>,
        filters: Option<&Filters>,
    ) -> cr_platform::Result<RemoteResponse> {
        let call = RecordedCall {
            method,
            collection: collection.to_string(),
            payload,
            query: filters.map(Filters::to_query).unwrap_or_default(),
        };
        let response = (self.respond)(&call);
        self.calls.lock().unwrap().push(call);
        Ok(response)
    }
}

struct RecordingMedia {
    uploads: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
    /// Upload indexes (0-based) the fake host refuses.
    refusals: Vec<usize>,
}

impl RecordingMedia {
    fn new() -> Arc<Self> {
        Self::refusing(Vec::new())
    }

    fn refusing(refusals: Vec<usize>) -> Arc<Self> {
        Arc::new(Self {
            uploads: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            refusals,
        })
    }

    fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for RecordingMedia {
    async fn upload(
        &self,
        _bytes: Vec<u8>,
        filename: &str,
        folder: &str,
    ) -> cr_platform::Result<UploadOutcome> {
        let mut uploads = self.uploads.lock().unwrap();
        let index = uploads.len();
        uploads.push(filename.to_string());
        if self.refusals.contains(&index) {
            return Ok(UploadOutcome::default());
        }
        Ok(UploadOutcome {
            url: Some(format!("https://img.test/{}/{}", folder, filename)),
            public_id: Some(format!("{}/{}", folder, index)),
        })
    }

    async fn delete(&self, public_id: &str) -> cr_platform::Result<Value> {
        self.deletes.lock().unwrap().push(public_id.to_string());
        Ok(json!({"deleted": true}))
    }
}

fn response(status: u16, data: Value) -> RemoteResponse {
    RemoteResponse {
        status,
        data,
        headers: HashMap::new(),
    }
}

fn citizen(id: &str) -> CurrentUser {
    CurrentUser {
        id: id.to_string(),
        email: Some(format!("{}@example.test", id)),
        role: Role::Citizen,
        raw: Value::Null,
    }
}

fn issue_row(id: &str, status: &str, user_id: &str) -> Value {
    json!({
        "id": id,
        "title": "Pothole on 5th",
        "description": "Deep pothole",
        "status": status,
        "user_id": user_id,
        "images": [
            {"url": "https://img.test/issues/a.jpg", "public_id": "issues/a"},
            {"url": "https://img.test/issues/b.jpg", "public_id": "issues/b"}
        ]
    })
}

fn image(name: &str) -> ImageUpload {
    ImageUpload {
        bytes: vec![0xFF, 0xD8],
        filename: name.to_string(),
    }
}

#[tokio::test]
async fn rejected_submission_performs_no_side_effects() {
    let store = RecordingStore::new(|_| panic!("store must not be called"));
    let media = RecordingMedia::new();
    let service = IssueService::new(store.clone(), media.clone());

    let draft = IssueDraft {
        title: "Buy NOW".to_string(),
        description: "great deal".to_string(),
        ..Default::default()
    };
    let err = service
        .create(draft, vec![image("a.jpg")], Some(&citizen("u1")))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Rejected { .. }));
    assert!(store.calls().is_empty());
    assert!(media.uploads().is_empty());
}

#[tokio::test]
async fn create_routes_department_and_persists_everything() {
    let store = RecordingStore::new(|call| match (call.method, call.collection.as_str()) {
        (RestMethod::Get, "departments") => response(
            200,
            json!([{"id": 7, "name": "Public Works"}, {"id": 8, "name": "Sanitation"}]),
        ),
        (RestMethod::Post, "issues") => {
            response(201, json!([issue_row("i1", "pending", "u1")]))
        }
        other => panic!("unexpected call {:?}", other),
    });
    let media = RecordingMedia::new();
    let service = IssueService::new(store.clone(), media.clone());

    let draft = IssueDraft {
        title: "Pothole on 5th".to_string(),
        description: "Deep pothole near the school".to_string(),
        location: Some("40.7,-74.0".to_string()),
        status: None,
    };
    let issue = service
        .create(draft, vec![image("a.jpg"), image("b.jpg")], Some(&citizen("u1")))
        .await
        .unwrap();

    assert_eq!(issue.id, "i1");
    assert_eq!(issue.title, "Pothole on 5th");
    assert_eq!(issue.status.as_deref(), Some("pending"));
    assert_eq!(issue.images.len(), 2);
    assert_eq!(media.uploads(), vec!["a.jpg", "b.jpg"]);

    let posts = store.calls_to(RestMethod::Post, "issues");
    assert_eq!(posts.len(), 1);
    let payload = posts[0].payload.as_ref().unwrap();
    assert_eq!(payload["status"], "pending");
    assert_eq!(payload["location"], "40.7,-74.0");
    assert_eq!(payload["user_id"], "u1");
    assert_eq!(payload["department_id"], "7");
    assert_eq!(payload["images"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn create_then_get_round_trips_the_stored_record() {
    // The fake store keeps the POSTed row and serves it back on the
    // id-filtered GET, like the real row store would.
    let stored: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let stored_by_responder = stored.clone();
    let store = RecordingStore::new(move |call| match (call.method, call.collection.as_str()) {
        (RestMethod::Post, "issues") => {
            let mut row = call.payload.clone().unwrap();
            row["id"] = json!("i1");
            *stored_by_responder.lock().unwrap() = Some(row.clone());
            response(201, json!([row]))
        }
        (RestMethod::Get, "issues") => {
            assert_eq!(call.query, "id=eq.i1");
            let row = stored_by_responder.lock().unwrap().clone().unwrap();
            response(200, json!([row]))
        }
        other => panic!("unexpected call {:?}", other),
    });
    let media = RecordingMedia::new();
    let service = IssueService::new(store.clone(), media.clone());

    let draft = IssueDraft {
        title: "Broken bench".to_string(),
        description: "Park bench slats missing".to_string(),
        location: Some("40.7,-74.0".to_string()),
        status: None,
    };
    let created = service
        .create(draft, vec![image("a.jpg"), image("b.jpg")], Some(&citizen("u1")))
        .await
        .unwrap();

    let fetched = service.get(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.title, "Broken bench");
    assert_eq!(fetched.description, "Park bench slats missing");
    assert_eq!(fetched.location.as_deref(), Some("40.7,-74.0"));
    assert_eq!(fetched.user_id.as_deref(), Some("u1"));
    assert_eq!(fetched.images, created.images);
    assert_eq!(fetched.images.len(), 2);
}

#[tokio::test]
async fn refused_uploads_are_skipped_not_fatal() {
    let store = RecordingStore::new(|call| match (call.method, call.collection.as_str()) {
        (RestMethod::Post, "issues") => response(201, json!([issue_row("i1", "pending", "u1")])),
        other => panic!("unexpected call {:?}", other),
    });
    let media = RecordingMedia::refusing(vec![0]);
    let service = IssueService::new(store.clone(), media.clone());

    let draft = IssueDraft {
        title: "Broken bench".to_string(),
        description: "Park bench slats missing".to_string(),
        ..Default::default()
    };
    service
        .create(draft, vec![image("a.jpg"), image("b.jpg")], Some(&citizen("u1")))
        .await
        .unwrap();

    let posts = store.calls_to(RestMethod::Post, "issues");
    let stored = posts[0].payload.as_ref().unwrap()["images"]
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["public_id"], "issues/1");
}

#[tokio::test]
async fn persistence_failure_deletes_uploaded_images_once() {
    let store = RecordingStore::new(|call| match (call.method, call.collection.as_str()) {
        (RestMethod::Post, "issues") => response(500, json!({"message": "row store down"})),
        other => panic!("unexpected call {:?}", other),
    });
    let media = RecordingMedia::new();
    let service = IssueService::new(store.clone(), media.clone());

    let draft = IssueDraft {
        title: "Broken bench".to_string(),
        description: "Park bench slats missing".to_string(),
        ..Default::default()
    };
    let err = service
        .create(draft, vec![image("a.jpg"), image("b.jpg")], Some(&citizen("u1")))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::UpstreamStatus { status: 500, .. }));
    assert_eq!(media.deletes(), vec!["issues/0", "issues/1"]);
}

#[tokio::test]
async fn status_change_notifies_the_original_owner_once() {
    let store = RecordingStore::new(|call| match (call.method, call.collection.as_str()) {
        (RestMethod::Get, "issues") => response(200, json!([issue_row("i1", "pending", "owner-1")])),
        (RestMethod::Patch, "issues") => response(204, Value::Null),
        (RestMethod::Post, "notifications") => response(201, json!([])),
        other => panic!("unexpected call {:?}", other),
    });
    let media = RecordingMedia::new();
    let service = IssueService::new(store.clone(), media.clone());

    let patch = IssuePatch {
        status: Some("resolved".to_string()),
        ..Default::default()
    };
    service.update("i1", patch, &citizen("staff-9")).await.unwrap();

    let notes = store.calls_to(RestMethod::Post, "notifications");
    assert_eq!(notes.len(), 1);
    let entries = notes[0].payload.as_ref().unwrap()["entries"]
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["user_id"], "owner-1");
    let message = entries[0]["message"].as_str().unwrap();
    assert!(message.contains("pending"));
    assert!(message.contains("resolved"));
}

#[tokio::test]
async fn same_status_and_non_status_updates_send_no_notification() {
    let store = RecordingStore::new(|call| match (call.method, call.collection.as_str()) {
        (RestMethod::Get, "issues") => response(200, json!([issue_row("i1", "pending", "owner-1")])),
        (RestMethod::Patch, "issues") => response(204, Value::Null),
        other => panic!("unexpected call {:?}", other),
    });
    let media = RecordingMedia::new();
    let service = IssueService::new(store.clone(), media.clone());

    let title_only = IssuePatch {
        title: Some("New title".to_string()),
        ..Default::default()
    };
    service.update("i1", title_only, &citizen("u1")).await.unwrap();

    let same_status = IssuePatch {
        status: Some("pending".to_string()),
        ..Default::default()
    };
    service.update("i1", same_status, &citizen("u1")).await.unwrap();

    assert!(store.calls_to(RestMethod::Post, "notifications").is_empty());
}

#[tokio::test]
async fn notification_failure_does_not_fail_the_update() {
    let store = RecordingStore::new(|call| match (call.method, call.collection.as_str()) {
        (RestMethod::Get, "issues") => response(200, json!([issue_row("i1", "pending", "owner-1")])),
        (RestMethod::Patch, "issues") => response(204, Value::Null),
        (RestMethod::Post, "notifications") => response(500, json!({"message": "nope"})),
        other => panic!("unexpected call {:?}", other),
    });
    let media = RecordingMedia::new();
    let service = IssueService::new(store.clone(), media.clone());

    let patch = IssuePatch {
        status: Some("assigned".to_string()),
        ..Default::default()
    };
    let updated = service.update("i1", patch, &citizen("u1")).await.unwrap();
    assert!(updated.is_some());
}

#[tokio::test]
async fn owner_delete_removes_images_then_the_row() {
    let store = RecordingStore::new(|call| match (call.method, call.collection.as_str()) {
        (RestMethod::Get, "issues") => response(200, json!([issue_row("i1", "pending", "u1")])),
        (RestMethod::Delete, "issues") => response(204, Value::Null),
        other => panic!("unexpected call {:?}", other),
    });
    let media = RecordingMedia::new();
    let service = IssueService::new(store.clone(), media.clone());

    service.delete("i1", &citizen("u1")).await.unwrap();

    assert_eq!(media.deletes(), vec!["issues/a", "issues/b"]);
    let deletes = store.calls_to(RestMethod::Delete, "issues");
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].query, "id=eq.i1");
}

#[tokio::test]
async fn non_owner_delete_is_forbidden_with_no_side_effects() {
    let store = RecordingStore::new(|call| match (call.method, call.collection.as_str()) {
        (RestMethod::Get, "issues") => response(200, json!([issue_row("i1", "pending", "u1")])),
        other => panic!("unexpected call {:?}", other),
    });
    let media = RecordingMedia::new();
    let service = IssueService::new(store.clone(), media.clone());

    let err = service.delete("i1", &citizen("intruder")).await.unwrap_err();

    assert!(matches!(err, ServiceError::Forbidden { .. }));
    assert!(media.deletes().is_empty());
    assert!(store.calls_to(RestMethod::Delete, "issues").is_empty());
}

#[tokio::test]
async fn delete_of_missing_issue_is_not_found() {
    let store = RecordingStore::new(|call| match (call.method, call.collection.as_str()) {
        (RestMethod::Get, "issues") => response(200, json!([])),
        other => panic!("unexpected call {:?}", other),
    });
    let media = RecordingMedia::new();
    let service = IssueService::new(store.clone(), media.clone());

    let err = service.delete("ghost", &citizen("u1")).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}

#[tokio::test]
async fn list_applies_status_and_category_filters() {
    let store = RecordingStore::new(|call| match (call.method, call.collection.as_str()) {
        (RestMethod::Get, "issues") => response(200, json!([issue_row("i1", "pending", "u1")])),
        other => panic!("unexpected call {:?}", other),
    });
    let media = RecordingMedia::new();
    let service = IssueService::new(store.clone(), media.clone());

    let issues = service.list(Some("pending"), Some("roads")).await.unwrap();
    assert_eq!(issues.len(), 1);

    let calls = store.calls_to(RestMethod::Get, "issues");
    assert_eq!(calls[0].query, "status=eq.pending&category=eq.roads");
}
