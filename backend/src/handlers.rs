use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use inkpost_shared::about_store::{
    AboutData, AboutPatch, ProjectInput, ProjectPatch, TimelineItemInput, TimelineItemPatch,
};
use inkpost_shared::admin_store::{AdminProfile, ProfilePatch};
use inkpost_shared::contacts_store::{ContactEntry, ContactKind};
use inkpost_shared::messages_store::Message;
use inkpost_shared::posts_store::{
    NewPostInput, Post, PostCategory, PostFilter, PostPatch, PostStatus,
};
use inkpost_shared::settings_store::{SettingsPatch, SiteSettings};
use inkpost_shared::subscribers_store::Subscriber;
use inkpost_shared::upload;
use inkpost_shared::StoreError;

use crate::auth::{self, AUTH_COOKIE};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

// ---------------------------------------------------------------- about

#[derive(Debug, Deserialize)]
pub struct AboutActionQuery {
    pub action: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AboutDeleteQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTimelineBody {
    pub id: String,
    #[serde(flatten)]
    pub patch: TimelineItemPatch,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectBody {
    pub id: String,
    #[serde(flatten)]
    pub patch: ProjectPatch,
}

pub async fn get_about(State(state): State<AppState>) -> Json<AboutData> {
    Json(state.about.get().await)
}

pub async fn merge_about(
    State(state): State<AppState>,
    Json(patch): Json<AboutPatch>,
) -> Json<AboutData> {
    Json(state.about.merge(patch).await)
}

/// Nested-collection mutations, dispatched on the `action` query parameter.
pub async fn mutate_about(
    State(state): State<AppState>,
    Query(query): Query<AboutActionQuery>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<AboutData>, ApiError> {
    let about = match query.action.as_deref() {
        Some("add-timeline") => {
            let input: TimelineItemInput = parse_body(body)?;
            state.about.add_timeline_item(input).await
        },
        Some("update-timeline") => {
            let body: UpdateTimelineBody = parse_body(body)?;
            state
                .about
                .update_timeline_item(&body.id, body.patch)
                .await
                .map_err(store_error)?
        },
        Some("add-project") => {
            let input: ProjectInput = parse_body(body)?;
            state.about.add_project(input).await
        },
        Some("update-project") => {
            let body: UpdateProjectBody = parse_body(body)?;
            state
                .about
                .update_project(&body.id, body.patch)
                .await
                .map_err(store_error)?
        },
        _ => return Err(bad_request("Unknown action")),
    };
    Ok(Json(about))
}

/// Removal is a silent no-op when the id is absent from the collection.
pub async fn delete_about_item(
    State(state): State<AppState>,
    Query(query): Query<AboutDeleteQuery>,
) -> Result<Json<AboutData>, ApiError> {
    let id = query.id.ok_or_else(|| bad_request("Missing item id"))?;
    let about = match query.kind.as_deref() {
        Some("timeline") => state.about.remove_timeline_item(&id).await,
        Some("project") => state.about.remove_project(&id).await,
        _ => return Err(bad_request("Unknown item type")),
    };
    Ok(Json(about))
}

// ---------------------------------------------------------------- posts

#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    pub slug: Option<String>,
    pub category: Option<PostCategory>,
    pub status: Option<PostStatus>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<Post>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub post: Post,
}

#[derive(Debug, Serialize)]
pub struct PostMutationResponse {
    pub message: String,
    pub post: Post,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostBody {
    pub id: Option<String>,
    #[serde(flatten)]
    pub patch: PostPatch,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// With `?slug=` this is a single-post lookup; otherwise a filtered,
/// newest-first listing.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostsQuery>,
) -> Result<Response, ApiError> {
    if let Some(slug) = query.slug {
        return match state.posts.get_by_slug(&slug).await {
            Some(post) => Ok(Json(PostResponse { post }).into_response()),
            None => Err(not_found("Post not found")),
        };
    }
    let posts = state
        .posts
        .list(PostFilter {
            category: query.category,
            status: query.status,
            limit: query.limit,
        })
        .await;
    Ok(Json(PostListResponse { posts }).into_response())
}

pub async fn create_post(
    State(state): State<AppState>,
    Json(input): Json<NewPostInput>,
) -> (StatusCode, Json<PostMutationResponse>) {
    let post = state.posts.create(input).await;
    (
        StatusCode::CREATED,
        Json(PostMutationResponse {
            message: "Post created".to_string(),
            post,
        }),
    )
}

pub async fn update_post(
    State(state): State<AppState>,
    Json(body): Json<UpdatePostBody>,
) -> Result<Json<PostMutationResponse>, ApiError> {
    let id = body.id.ok_or_else(|| bad_request("Missing post id"))?;
    let post = state
        .posts
        .update(&id, body.patch)
        .await
        .map_err(store_error)?;
    Ok(Json(PostMutationResponse {
        message: "Post updated".to_string(),
        post,
    }))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<AckMessage>, ApiError> {
    let id = query.id.ok_or_else(|| bad_request("Missing post id"))?;
    state.posts.delete(&id).await.map_err(store_error)?;
    Ok(Json(AckMessage {
        message: "Post deleted".to_string(),
    }))
}

// -------------------------------------------------------------- messages

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub struct NewMessageBody {
    pub email: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AckMessage {
    pub message: String,
}

pub async fn list_messages(State(state): State<AppState>) -> Json<MessageListResponse> {
    Json(MessageListResponse {
        messages: state.messages.list().await,
    })
}

pub async fn create_message(
    State(state): State<AppState>,
    Json(body): Json<NewMessageBody>,
) -> Result<Json<AckMessage>, ApiError> {
    state
        .messages
        .create(
            body.email.as_deref().unwrap_or_default(),
            body.content.as_deref().unwrap_or_default(),
        )
        .await
        .map_err(store_error)?;
    Ok(Json(AckMessage {
        message: "Message received, thank you for the feedback".to_string(),
    }))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<AckMessage>, ApiError> {
    let id = query.id.ok_or_else(|| bad_request("Missing message id"))?;
    state.messages.delete(&id).await.map_err(store_error)?;
    Ok(Json(AckMessage {
        message: "Message deleted".to_string(),
    }))
}

// ------------------------------------------------------------ subscribers

#[derive(Debug, Serialize)]
pub struct SubscriberListResponse {
    pub subscribers: Vec<Subscriber>,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeBody {
    pub email: Option<String>,
}

pub async fn list_subscribers(State(state): State<AppState>) -> Json<SubscriberListResponse> {
    Json(SubscriberListResponse {
        subscribers: state.subscribers.list().await,
    })
}

pub async fn subscribe(
    State(state): State<AppState>,
    Json(body): Json<SubscribeBody>,
) -> Result<Json<AckMessage>, ApiError> {
    state
        .subscribers
        .subscribe(body.email.as_deref().unwrap_or_default())
        .await
        .map_err(store_error)?;
    Ok(Json(AckMessage {
        message: "Subscribed, thank you for following along".to_string(),
    }))
}

pub async fn delete_subscriber(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<AckMessage>, ApiError> {
    let id = query.id.ok_or_else(|| bad_request("Missing subscriber id"))?;
    state.subscribers.remove(&id).await.map_err(store_error)?;
    Ok(Json(AckMessage {
        message: "Subscriber deleted".to_string(),
    }))
}

// -------------------------------------------------------------- contacts

#[derive(Debug, Serialize)]
pub struct ContactListResponse {
    pub contacts: Vec<ContactEntry>,
}

#[derive(Debug, Deserialize)]
pub struct NewContactBody {
    pub contact: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ContactKind>,
}

#[derive(Debug, Serialize)]
pub struct ContactCreatedResponse {
    pub success: bool,
    pub message: String,
    pub data: ContactEntry,
}

pub async fn list_contacts(State(state): State<AppState>) -> Json<ContactListResponse> {
    Json(ContactListResponse {
        contacts: state.contacts.list().await,
    })
}

pub async fn create_contact(
    State(state): State<AppState>,
    Json(body): Json<NewContactBody>,
) -> Result<(StatusCode, Json<ContactCreatedResponse>), ApiError> {
    let entry = state
        .contacts
        .add(body.contact.as_deref().unwrap_or_default(), body.kind)
        .await
        .map_err(store_error)?;
    Ok((
        StatusCode::CREATED,
        Json(ContactCreatedResponse {
            success: true,
            message: "Contact submitted".to_string(),
            data: entry,
        }),
    ))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<AckMessage>, ApiError> {
    let id = query.id.ok_or_else(|| bad_request("Missing contact id"))?;
    state.contacts.remove(&id).await.map_err(store_error)?;
    Ok(Json(AckMessage {
        message: "Contact deleted".to_string(),
    }))
}

// -------------------------------------------------------------- settings

pub async fn get_settings(State(state): State<AppState>) -> Json<SiteSettings> {
    Json(state.settings.get().await)
}

pub async fn merge_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Json<SiteSettings> {
    Json(state.settings.merge(patch).await)
}

// ----------------------------------------------------------------- admin

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateBody {
    pub action: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    #[serde(flatten)]
    pub profile: ProfilePatch,
}

#[derive(Debug, Deserialize)]
pub struct AdminActionBody {
    pub action: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub data: AdminProfile,
}

#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub user: AdminProfile,
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdateResponse {
    pub message: String,
    pub data: AdminProfile,
}

pub async fn get_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AdminProfile>, ApiError> {
    require_auth(&state, &headers)?;
    Ok(Json(state.admin.profile().await))
}

/// Profile updates and password changes, both behind a live session.
pub async fn update_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AdminUpdateBody>,
) -> Result<Response, ApiError> {
    require_auth(&state, &headers)?;
    match body.action.as_deref() {
        Some("change-password") => {
            state
                .admin
                .change_password(
                    body.current_password.as_deref().unwrap_or_default(),
                    body.new_password.as_deref().unwrap_or_default(),
                )
                .await
                .map_err(|err| match err {
                    // A wrong current password is a bad request here, not a
                    // failed login.
                    StoreError::InvalidCredentials => {
                        bad_request("Current password is incorrect")
                    },
                    other => store_error(other),
                })?;
            Ok(Json(AckMessage {
                message: "Password changed".to_string(),
            })
            .into_response())
        },
        Some("update-profile") => {
            let profile = state.admin.update_profile(body.profile).await;
            Ok(Json(ProfileUpdateResponse {
                message: "Profile updated".to_string(),
                data: profile,
            })
            .into_response())
        },
        _ => Err(bad_request("Unknown action")),
    }
}

/// Session lifecycle: login issues a token and sets the auth cookie,
/// logout revokes and clears it, verify reports the logged-in user.
pub async fn admin_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AdminActionBody>,
) -> Result<Response, ApiError> {
    match body.action.as_deref() {
        Some("login") => {
            let profile = state
                .admin
                .login(
                    body.username.as_deref().unwrap_or_default(),
                    body.password.as_deref().unwrap_or_default(),
                )
                .await
                .map_err(store_error)?;
            let token = state.sessions.issue(&profile.username);
            let cookie = format!(
                "{AUTH_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
                state.sessions.ttl().as_secs()
            );
            Ok((
                [(header::SET_COOKIE, cookie)],
                Json(LoginResponse {
                    success: true,
                    message: "Login successful".to_string(),
                    data: profile,
                }),
            )
                .into_response())
        },
        Some("logout") => {
            if let Some(token) = auth::request_token(&headers) {
                state.sessions.revoke(&token);
            }
            let cookie = format!("{AUTH_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
            Ok((
                [(header::SET_COOKIE, cookie)],
                Json(AckResponse {
                    success: true,
                    message: "Logged out".to_string(),
                }),
            )
                .into_response())
        },
        Some("verify") => {
            require_auth(&state, &headers)?;
            Ok(Json(VerifyResponse {
                success: true,
                user: state.admin.profile().await,
            })
            .into_response())
        },
        _ => Err(bad_request("Unknown action")),
    }
}

// ---------------------------------------------------------------- uploads

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub file_name: String,
}

/// Validate and store the `file` part of a multipart upload. Bytes are
/// stored exactly as received.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| bad_request("Malformed multipart body"))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let original_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|_| bad_request("Failed to read file"))?;
        upload::validate(&content_type, data.len()).map_err(store_error)?;
        let file_name = upload::generate_file_name(&original_name, &content_type);
        let url = state
            .blob
            .put_file(&file_name, data, &content_type)
            .await
            .map_err(|e| internal_error("Failed to store upload", e))?;
        return Ok(Json(UploadResponse {
            success: true,
            url,
            file_name,
        }));
    }
    Err(bad_request("No file found in request"))
}

/// Serve a stored upload. Only the last path segment names the file.
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let file_name = path.rsplit('/').next().unwrap_or(path.as_str());
    let file = state
        .blob
        .get_file(file_name)
        .await
        .ok_or_else(|| not_found("File not found"))?;
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.content_type)
        .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
        .body(Body::from(file.bytes))
        .map_err(|e| internal_error("Failed to build response", e))
}

// ---------------------------------------------------------------- helpers

fn require_auth(state: &AppState, headers: &HeaderMap) -> Result<String, ApiError> {
    auth::request_token(headers)
        .and_then(|token| state.sessions.verify(&token))
        .ok_or_else(|| unauthorized("Authentication required"))
}

fn parse_body<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| bad_request(&format!("Invalid request body: {e}")))
}

fn store_error(err: StoreError) -> ApiError {
    let status = match err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        StoreError::Validation(_)
        | StoreError::WeakPassword
        | StoreError::UnsupportedType(_)
        | StoreError::TooLarge { .. } => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: status.as_u16(),
        }),
    )
}

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            code: 400,
        }),
    )
}

fn not_found(message: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.to_string(),
            code: 404,
        }),
    )
}

fn unauthorized(message: &str) -> ApiError {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.to_string(),
            code: 401,
        }),
    )
}

fn internal_error(message: &str, err: impl std::fmt::Display) -> ApiError {
    tracing::error!("{}: {}", message, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.to_string(),
            code: 500,
        }),
    )
}
