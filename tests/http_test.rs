use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};

use vericv::api::{ApiError, DirectoryApi, EntryUpdate, HttpApi, LoginRequest};
use vericv::draft::{CvDraft, EducationDraft, ExperienceDraft, ProfileDraft};
use vericv::flows::Submitter;
use vericv::model::VerificationBadge;
use vericv::session::Session;

/// What the stub saw on each request: `"METHOD path?query auth"`.
type Seen = Arc<Mutex<Vec<String>>>;

fn profile_json(user_id: i64, name: &str, badge: &str) -> Value {
    json!({
        "id": user_id * 10,
        "userId": user_id,
        "fullName": name,
        "headline": "Engineer",
        "location": "Remote",
        "verificationBadge": badge,
        "isVisible": true,
        "profileViews": 4
    })
}

fn note(seen: &Seen, line: String) {
    seen.lock().unwrap().push(line);
}

fn auth_of(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string()
}

async fn search(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let q = params.get("q").cloned();
    note(
        &seen,
        format!("GET /directory/search q={q:?} {}", auth_of(&headers)),
    );
    let results = match q.as_deref() {
        Some("nobody") => vec![],
        _ => vec![
            profile_json(1, "Ada Lovelace", "GOLD"),
            profile_json(2, "Grace Hopper", "PLATINUM"),
        ],
    };
    let count = results.len();
    Json(json!({ "results": results, "count": count }))
}

async fn badge(State(seen): State<Seen>, Path(level): Path<String>) -> Json<Value> {
    note(&seen, format!("GET /directory/filter/badge/{level}"));
    Json(json!({ "results": [profile_json(1, "Ada Lovelace", &level)], "count": 1 }))
}

async fn profile(Path(user_id): Path<i64>) -> impl IntoResponse {
    if user_id == 404 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "User not found in directory" })),
        )
            .into_response();
    }
    Json(profile_json(user_id, "Ada Lovelace", "SILVER")).into_response()
}

async fn cv_by_user(Path(user_id): Path<i64>) -> Json<Value> {
    Json(json!({
        "cv": { "id": 7, "userId": user_id, "headline": "Engineer", "summary": null, "isPublic": true },
        "education": [{
            "id": 1, "cvId": 7, "institution": "MIT", "degree": "BSc",
            "fieldOfStudy": "CS", "startDate": "2010-09-01", "endDate": "2014-06-30",
            "isVerified": true
        }],
        "experience": []
    }))
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    if body["password"] == "wrong" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid email or password" })),
        )
            .into_response();
    }
    Json(json!({
        "token": "abc.def.ghi",
        "email": body["email"],
        "fullName": "Ada Lovelace",
        "roles": ["USER"]
    }))
    .into_response()
}

async fn add_experience(
    State(seen): State<Seen>,
    Path(cv_id): Path<i64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    note(&seen, format!("POST /cv/{cv_id}/experience {body}"));
    Json(json!({ "id": 3, "cvId": cv_id, "company": body["company"] }))
}

/// A backend that answers writes with as little as it can.
async fn terse_create(State(seen): State<Seen>) -> impl IntoResponse {
    note(&seen, "POST /cv".to_string());
    (StatusCode::CREATED, Json(json!({ "id": 7 })))
}

async fn terse_education(State(seen): State<Seen>, Path(cv_id): Path<i64>) -> Json<Value> {
    note(&seen, format!("POST /cv/{cv_id}/education"));
    Json(json!({}))
}

async fn terse_experience(State(seen): State<Seen>, Path(cv_id): Path<i64>) -> StatusCode {
    note(&seen, format!("POST /cv/{cv_id}/experience"));
    StatusCode::CREATED
}

async fn terse_join(State(seen): State<Seen>) -> Json<Value> {
    note(&seen, "POST /directory/me/join".to_string());
    Json(json!({ "message": "Joined directory" }))
}

async fn join(State(seen): State<Seen>, headers: HeaderMap) -> impl IntoResponse {
    note(&seen, format!("POST /directory/me/join {}", auth_of(&headers)));
    (StatusCode::BAD_REQUEST, "not json at all")
}

async fn update_entry(
    State(seen): State<Seen>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let mut keys: Vec<_> = params.keys().cloned().collect();
    keys.sort();
    note(&seen, format!("PUT /directory/me {}", keys.join(",")));
    let mut entry = profile_json(1, "Ada Lovelace", "GOLD");
    if let Some(headline) = params.get("headline") {
        entry["headline"] = json!(headline);
    }
    Json(json!({ "message": "Profile updated", "entry": entry }))
}

async fn visibility(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let mut entry = profile_json(1, "Ada Lovelace", "GOLD");
    entry["isVisible"] = json!(params.get("visible").map(String::as_str) == Some("true"));
    Json(json!({ "message": "Visibility updated", "entry": entry }))
}

async fn bare_array() -> Json<Value> {
    Json(json!([profile_json(1, "Ada Lovelace", "GOLD")]))
}

/// Start the stub backend and return its base URL plus the request log.
async fn serve() -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/directory/search", get(search))
        .route("/api/directory/filter/badge/{level}", get(badge))
        .route("/api/directory/profile/{user_id}", get(profile))
        .route("/api/directory/me", put(update_entry))
        .route("/api/directory/me/visibility", put(visibility))
        .route("/api/directory/me/join", post(join))
        .route("/api/cv/user/{user_id}", get(cv_by_user))
        .route("/api/cv/{cv_id}/experience", post(add_experience))
        .route("/bare/directory/search", get(bare_array))
        .route("/terse/cv", post(terse_create))
        .route("/terse/cv/{cv_id}/education", post(terse_education))
        .route("/terse/cv/{cv_id}/experience", post(terse_experience))
        .route("/terse/directory/me/join", post(terse_join))
        .with_state(Arc::clone(&seen));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), seen)
}

fn seen_lines(seen: &Seen) -> Vec<String> {
    seen.lock().unwrap().clone()
}

#[tokio::test]
async fn search_sends_keyword_and_bearer_token() {
    let (base, seen) = serve().await;
    let api = HttpApi::new(format!("{base}/api/"), Session::bearer("tok-1"));

    let results = api.search("  ada  ").await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[1].verification_badge, VerificationBadge::Platinum);
    assert_eq!(
        seen_lines(&seen),
        vec!["GET /directory/search q=Some(\"ada\") Bearer tok-1"]
    );
}

#[tokio::test]
async fn empty_search_omits_query_and_anonymous_omits_auth() {
    let (base, seen) = serve().await;
    let api = HttpApi::new(format!("{base}/api"), Session::anonymous());

    let results = api.search("").await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(seen_lines(&seen), vec!["GET /directory/search q=None -"]);
}

#[tokio::test]
async fn search_with_no_hits_is_empty() {
    let (base, _) = serve().await;
    let api = HttpApi::new(format!("{base}/api"), Session::anonymous());

    assert!(api.search("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn bare_array_is_a_decode_error() {
    let (base, _) = serve().await;
    let api = HttpApi::new(format!("{base}/bare"), Session::anonymous());

    let err = api.search("").await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn badge_goes_in_the_path_uppercase() {
    let (base, seen) = serve().await;
    let api = HttpApi::new(format!("{base}/api"), Session::anonymous());

    let results = api.filter_by_badge(VerificationBadge::Gold).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(seen_lines(&seen), vec!["GET /directory/filter/badge/GOLD"]);
}

#[tokio::test]
async fn not_found_carries_server_message() {
    let (base, _) = serve().await;
    let api = HttpApi::new(format!("{base}/api"), Session::anonymous());

    let err = api.get_profile(404).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.server_message(), Some("User not found in directory"));
}

#[tokio::test]
async fn error_without_json_body_has_no_message() {
    let (base, seen) = serve().await;
    let api = HttpApi::new(format!("{base}/api"), Session::bearer("tok-2"));

    let err = api.join_directory().await.unwrap_err();

    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, None);
        }
        other => panic!("expected Status, got {other:?}"),
    }
    assert_eq!(seen_lines(&seen), vec!["POST /directory/me/join Bearer tok-2"]);
}

#[tokio::test]
async fn cv_detail_decodes_dates_and_entries() {
    let (base, _) = serve().await;
    let api = HttpApi::new(format!("{base}/api"), Session::anonymous());

    let detail = api.get_cv_by_user(5).await.unwrap();

    assert_eq!(detail.cv.user_id, 5);
    assert_eq!(detail.education[0].institution, "MIT");
    assert_eq!(
        detail.education[0].start_date.map(|d| d.to_string()).as_deref(),
        Some("2010-09-01")
    );
    assert!(detail.experience.is_empty());
}

#[tokio::test]
async fn experience_is_sent_camel_case() {
    let (base, seen) = serve().await;
    let api = HttpApi::new(format!("{base}/api"), Session::bearer("t"));
    let entry = ExperienceDraft {
        company: "Acme".to_string(),
        role: "Engineer".to_string(),
        is_current: true,
        ..Default::default()
    };

    api.add_experience(9, &entry).await.unwrap();

    let line = &seen_lines(&seen)[0];
    assert!(line.starts_with("POST /cv/9/experience"));
    assert!(line.contains("\"isCurrent\":true"));
    assert!(line.contains("\"company\":\"Acme\""));
}

#[tokio::test]
async fn login_success_and_failure() {
    let (base, _) = serve().await;
    let api = HttpApi::new(format!("{base}/api"), Session::anonymous());

    let ok = api
        .login(&LoginRequest {
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(ok.token, "abc.def.ghi");
    assert_eq!(ok.full_name, "Ada Lovelace");

    let err = api
        .login(&LoginRequest {
            email: "ada@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.user_message("Login failed"), "Invalid email or password");
}

#[tokio::test]
async fn entry_updates_unwrap_the_envelope() {
    let (base, seen) = serve().await;
    let api = HttpApi::new(format!("{base}/api"), Session::bearer("t"));

    let entry = api
        .update_entry(&EntryUpdate {
            headline: Some("Staff Engineer".to_string()),
            location: None,
        })
        .await
        .unwrap();
    assert_eq!(entry.headline.as_deref(), Some("Staff Engineer"));
    assert_eq!(seen_lines(&seen), vec!["PUT /directory/me headline"]);

    let hidden = api.set_visibility(false).await.unwrap();
    assert!(!hidden.is_visible);
}

#[tokio::test]
async fn submission_succeeds_when_writes_echo_only_an_id() {
    let (base, seen) = serve().await;
    let api: Arc<dyn DirectoryApi> =
        Arc::new(HttpApi::new(format!("{base}/terse"), Session::bearer("t")));
    let draft = CvDraft {
        profile: ProfileDraft {
            headline: "Engineer".to_string(),
            ..Default::default()
        },
        education: vec![EducationDraft {
            institution: "MIT".to_string(),
            degree: "BSc".to_string(),
            ..Default::default()
        }],
        experience: vec![ExperienceDraft {
            company: "Acme".to_string(),
            role: "Engineer".to_string(),
            ..Default::default()
        }],
    };

    let receipt = Submitter::new(api).submit(&draft).await.unwrap();

    assert_eq!(receipt.cv_id, 7);
    assert_eq!(receipt.education_attached, 1);
    assert_eq!(receipt.experience_attached, 1);
    assert_eq!(
        seen_lines(&seen),
        vec![
            "POST /cv",
            "POST /cv/7/education",
            "POST /cv/7/experience",
            "POST /directory/me/join",
        ]
    );
}
