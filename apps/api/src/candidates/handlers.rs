//! Axum route handlers for the Candidates API.

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::candidates::filter::CandidateFilter;
use crate::candidates::pagination::paginate;
use crate::candidates::transform::{
    CandidateForm, CandidateListResponse, CandidateResponse, UpdateCandidateRequest,
};
use crate::errors::AppError;
use crate::state::AppState;

pub const DEFAULT_PAGE_LIMIT: usize = 100;
pub const MAX_PAGE_LIMIT: usize = 1000;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListCandidatesQuery {
    pub skill: Option<String>,
    /// Minimum years of experience.
    #[serde(alias = "min_experience")]
    pub experience: Option<i32>,
    pub graduation_year: Option<i32>,
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

impl ListCandidatesQuery {
    fn into_filter(self) -> CandidateFilter {
        CandidateFilter {
            skill: self.skill,
            min_experience: self.experience,
            graduation_year: self.graduation_year,
        }
    }
}

struct UploadedResume {
    filename: String,
    content: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/candidates
///
/// Multipart form with the candidate fields (`skill_set` as JSON-array text)
/// and a `resume` file. Text fields are validated before anything is written;
/// if the store write fails, the saved resume is removed again.
pub async fn handle_create_candidate(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<CandidateResponse>), AppError> {
    let mut multipart = multipart?;
    let max_bytes = state.config.max_upload_bytes;

    let mut form = CandidateForm::default();
    let mut resume: Option<UploadedResume> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::from_multipart(e, max_bytes))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "resume" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content = field
                .bytes()
                .await
                .map_err(|e| AppError::from_multipart(e, max_bytes))?;
            resume = Some(UploadedResume { filename, content });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::from_multipart(e, max_bytes))?;
            if !form.set(&name, value) {
                debug!("Ignoring unknown form field '{name}'");
            }
        }
    }

    let fields = form.into_fields()?;
    let resume = resume
        .ok_or_else(|| AppError::Validation("Missing required field 'resume'".to_string()))?;

    let resume_path = state
        .resumes
        .save(&fields.full_name, &resume.filename, resume.content)
        .await?;

    let record = match state.store.create(fields, Some(resume_path.clone())) {
        Ok(record) => record,
        Err(e) => {
            discard_resume(&state, &resume_path).await;
            return Err(e.into());
        }
    };

    info!("Created candidate {} with resume {resume_path}", record.id);
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// GET /api/candidates
///
/// Filters by `skill`, `experience` and `graduation_year`, then returns the
/// `[skip, skip + limit)` slice together with the filtered total.
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    params: Result<Query<ListCandidatesQuery>, QueryRejection>,
) -> Result<Json<CandidateListResponse>, AppError> {
    let Query(params) = params?;
    if !(1..=MAX_PAGE_LIMIT).contains(&params.limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_PAGE_LIMIT}"
        )));
    }
    let (skip, limit) = (params.skip, params.limit);

    let matched = state.store.filter(&params.into_filter())?;
    let page = paginate(matched, skip, limit);
    debug!(
        "Listing candidates: total={}, count={}",
        page.total,
        page.items.len()
    );

    Ok(Json(CandidateListResponse {
        total: page.total,
        candidates: page.items.into_iter().map(CandidateResponse::from).collect(),
    }))
}

/// GET /api/candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<CandidateResponse>, AppError> {
    let id = candidate_id(id)?;
    let record = state.store.get(id)?.ok_or_else(|| not_found(id))?;
    Ok(Json(record.into()))
}

/// PUT /api/candidates/:id
///
/// Partial update: only fields present in the body change.
pub async fn handle_update_candidate(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateCandidateRequest>, JsonRejection>,
) -> Result<Json<CandidateResponse>, AppError> {
    let id = candidate_id(id)?;
    let Json(request) = body?;
    let patch = request.into_patch()?;

    let record = state.store.update(id, patch)?.ok_or_else(|| not_found(id))?;
    info!("Updated candidate {id}");
    Ok(Json(record.into()))
}

/// DELETE /api/candidates/:id
///
/// Removes the record, then its resume file. File removal is best-effort.
pub async fn handle_delete_candidate(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = candidate_id(id)?;
    // resume_path never changes after create, so reading it first is safe
    let record = state.store.get(id)?.ok_or_else(|| not_found(id))?;
    if !state.store.delete(id)? {
        return Err(not_found(id));
    }

    if let Some(path) = record.resume_path.as_deref() {
        discard_resume(&state, path).await;
    }

    info!("Deleted candidate {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// Any integer is a well-formed id; one that cannot name a record is simply not found.
fn candidate_id(id: Result<Path<i64>, PathRejection>) -> Result<u64, AppError> {
    let Path(id) = id?;
    u64::try_from(id).map_err(|_| not_found(id))
}

fn not_found(id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("Candidate {id} not found"))
}

async fn discard_resume(state: &AppState, path: &str) {
    match state.resumes.delete(path).await {
        Ok(true) => {}
        Ok(false) => debug!("Resume {path} was already gone"),
        Err(e) => warn!("Failed to delete resume {path}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
        response::Response,
        Router,
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::models::candidate::fixtures::candidate;
    use crate::routes::build_router;

    const BOUNDARY: &str = "candidates-test-boundary";

    const JANE: &[(&str, &str)] = &[
        ("full_name", "Jane Smith"),
        ("dob", "1992-05-15"),
        ("contact_number", "+1-555-0100"),
        ("contact_address", "42 Elm Street, Springfield"),
        ("education_qualification", "B.Sc. Computer Science"),
        ("graduation_year", "2014"),
        ("years_of_experience", "6"),
        ("skill_set", r#"["Python", "Django", "PostgreSQL"]"#),
    ];

    struct TestApp {
        router: Router,
        state: AppState,
        uploads: TempDir,
    }

    fn test_app() -> TestApp {
        let uploads = tempfile::tempdir().unwrap();
        let config = Config {
            upload_dir: uploads.path().to_path_buf(),
            store_lock_timeout: Duration::from_millis(50),
            ..Config::default()
        };
        let state = AppState::new(config);
        TestApp {
            router: build_router(state.clone()),
            state,
            uploads,
        }
    }

    fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((filename, content)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response: Response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(
        router: &Router,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/candidates")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(fields, file)))
            .unwrap();
        send(router, request).await
    }

    async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
        send(router, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn put_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::PUT)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(router, request).await
    }

    async fn delete(router: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        send(router, request).await
    }

    fn uploaded_files(app: &TestApp) -> usize {
        std::fs::read_dir(app.uploads.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_candidate_lifecycle() {
        let app = test_app();

        let (status, created) = create(
            &app.router,
            JANE,
            Some(("resume.pdf", b"%PDF-1.4".as_slice())),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["id"], 1);
        assert_eq!(created["dob"], "1992-05-15");
        assert_eq!(created["skill_set"], json!(["Python", "Django", "PostgreSQL"]));
        assert_eq!(created["created_at"], created["updated_at"]);
        let resume_path = created["resume_path"].as_str().unwrap().to_string();
        assert!(resume_path.contains("Jane_Smith_"));
        assert!(std::path::Path::new(&resume_path).exists());

        let (status, listed) = get(&app.router, "/api/candidates?skill=Python").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["total"], 1);
        assert_eq!(listed["candidates"][0], created);

        let (status, updated) =
            put_json(&app.router, "/api/candidates/1", json!({ "years_of_experience": 7 })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["years_of_experience"], 7);
        assert_eq!(updated["full_name"], "Jane Smith");
        let before: CandidateResponse = serde_json::from_value(created.clone()).unwrap();
        let after: CandidateResponse = serde_json::from_value(updated).unwrap();
        assert!(after.updated_at > before.created_at);
        assert_eq!(after.created_at, before.created_at);

        let (status, fetched) = get(&app.router, "/api/candidates/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["years_of_experience"], 7);

        let (status, _) = delete(&app.router, "/api/candidates/1").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(!std::path::Path::new(&resume_path).exists());

        let (status, body) = get(&app.router, "/api/candidates/1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (status, _) = delete(&app.router, "/api/candidates/1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_skill_set_before_saving() {
        let app = test_app();
        let mut fields = JANE.to_vec();
        fields[7] = ("skill_set", "Python, Django");

        let (status, body) = create(
            &app.router,
            &fields,
            Some(("resume.pdf", b"%PDF".as_slice())),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(uploaded_files(&app), 0);
        assert_eq!(app.state.store.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_dob() {
        let app = test_app();
        let mut fields = JANE.to_vec();
        fields[1] = ("dob", "15-05-1992");

        let (status, body) = create(
            &app.router,
            &fields,
            Some(("resume.pdf", b"%PDF".as_slice())),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "Invalid date format. Use YYYY-MM-DD"
        );
    }

    #[tokio::test]
    async fn test_create_rejects_unsupported_file_type() {
        let app = test_app();
        let (status, body) = create(
            &app.router,
            JANE,
            Some(("resume.exe", b"MZ".as_slice())),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_FILE_TYPE");
        assert_eq!(uploaded_files(&app), 0);
    }

    #[tokio::test]
    async fn test_create_requires_resume() {
        let app = test_app();
        let (status, body) = create(&app.router, JANE, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("resume"));
    }

    #[tokio::test]
    async fn test_create_rejects_oversized_resume() {
        let app = test_app();
        let content = vec![b'x'; app.state.config.max_upload_bytes + 1];
        let (status, body) = create(
            &app.router,
            JANE,
            Some(("resume.pdf", content.as_slice())),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "FILE_TOO_LARGE");
        assert_eq!(uploaded_files(&app), 0);
    }

    #[tokio::test]
    async fn test_create_rolls_back_file_when_store_unavailable() {
        let app = test_app();
        let guard = app.state.store.hold_lock();

        let (status, body) = create(
            &app.router,
            JANE,
            Some(("resume.pdf", b"%PDF".as_slice())),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "STORE_ERROR");
        assert_eq!(uploaded_files(&app), 0);

        drop(guard);
        assert_eq!(app.state.store.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_paginates_filtered_set() {
        let app = test_app();
        for i in 0..10 {
            let name = format!("Candidate {i}");
            app.state
                .store
                .create(candidate(&name, &["Rust"], i, 2020), None)
                .unwrap();
        }
        app.state
            .store
            .create(candidate("Java Dev", &["Java"], 3, 2020), None)
            .unwrap();

        let (status, page) = get(&app.router, "/api/candidates?skill=rust&skip=5&limit=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["total"], 10);
        let ids: Vec<u64> = page["candidates"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![6, 7, 8]);

        let (status, page) = get(&app.router, "/api/candidates?skill=rust&skip=15&limit=5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["total"], 10);
        assert_eq!(page["candidates"], json!([]));
    }

    #[tokio::test]
    async fn test_list_combines_filters() {
        let app = test_app();
        let store = &app.state.store;
        store.create(candidate("A", &["Python"], 5, 2020), None).unwrap();
        store.create(candidate("B", &["PYTHON3"], 4, 2020), None).unwrap();
        store.create(candidate("C", &["python"], 8, 2019), None).unwrap();
        store.create(candidate("D", &["Java"], 9, 2020), None).unwrap();

        let (status, page) = get(
            &app.router,
            "/api/candidates?skill=py&experience=5&graduation_year=2020",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["total"], 1);
        assert_eq!(page["candidates"][0]["full_name"], "A");

        let (_, page) = get(&app.router, "/api/candidates/?min_experience=8").await;
        assert_eq!(page["total"], 2);
    }

    #[tokio::test]
    async fn test_list_rejects_out_of_range_limit() {
        let app = test_app();
        for uri in ["/api/candidates?limit=0", "/api/candidates?limit=1001"] {
            let (status, body) = get(&app.router, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }
        let (status, _) = get(&app.router, "/api/candidates?skip=-1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_unknown_candidate_is_404() {
        let app = test_app();
        let (status, _) =
            put_json(&app.router, "/api/candidates/99", json!({ "full_name": "X" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_coerces_dob_and_skill_set() {
        let app = test_app();
        app.state
            .store
            .create(candidate("A", &["Go"], 1, 2020), None)
            .unwrap();

        let (status, body) = put_json(
            &app.router,
            "/api/candidates/1",
            json!({ "dob": "1990-01-02", "skill_set": "[\"Rust\"]" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dob"], "1990-01-02");
        assert_eq!(body["skill_set"], json!(["Rust"]));

        let (status, body) =
            put_json(&app.router, "/api/candidates/1", json!({ "dob": "someday" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (_, fetched) = get(&app.router, "/api/candidates/1").await;
        assert_eq!(fetched["dob"], "1990-01-02");
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_validation_error() {
        let app = test_app();
        let (status, body) = get(&app.router, "/api/candidates/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_negative_id_is_not_found() {
        let app = test_app();
        let (status, body) = get(&app.router, "/api/candidates/-1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (status, body) =
            put_json(&app.router, "/api/candidates/-1", json!({ "full_name": "X" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (status, body) = delete(&app.router, "/api/candidates/-1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
