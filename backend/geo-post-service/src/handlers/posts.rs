/// Post submission handler
///
/// `POST /post` accepts either a multipart form carrying the media file
/// (`image` part) or a plain JSON post body. The Content-Type decides.
use actix_multipart::Multipart;
use actix_web::{http::header, web, HttpRequest, HttpResponse};
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::handlers::{first_param, parse_coordinate, QueryPairs};
use crate::models::{Location, MediaType, Post};
use crate::AppState;

const MEDIA_FIELD: &str = "image";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Text fields of a post submission, from the query string or form parts
#[derive(Debug, Default)]
pub struct PostForm {
    pub user: Option<String>,
    pub message: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl PostForm {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            user: first_param(pairs, "user"),
            message: first_param(pairs, "message"),
            lat: first_param(pairs, "lat"),
            lon: first_param(pairs, "lon"),
        }
    }

    fn into_post(self) -> Post {
        let location = Location {
            lat: parse_coordinate(self.lat.as_deref()),
            lon: parse_coordinate(self.lon.as_deref()),
        };
        Post::new(
            self.user.unwrap_or_default(),
            self.message.unwrap_or_default(),
            location,
        )
    }
}

/// Uploaded media file
#[derive(Debug)]
struct MediaFile {
    filename: String,
    content_type: String,
    data: Bytes,
}

fn body_too_large(limit: usize) -> AppError {
    AppError::BadRequest(format!("Request body exceeds {limit} bytes"))
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

/// POST /post
pub async fn create_post(
    state: web::Data<AppState>,
    req: HttpRequest,
    pairs: QueryPairs,
    payload: web::Payload,
) -> Result<HttpResponse> {
    info!("Received one request");

    if is_multipart(&req) {
        let multipart = Multipart::new(req.headers(), payload);
        create_media_post(&state, PostForm::from_pairs(&pairs), multipart).await
    } else {
        create_json_post(&state, payload).await
    }
}

fn field_text(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

/// Collect the multipart parts: text fields override the query string, the
/// `image` part with a filename becomes the media file. `limit` bounds the
/// total bytes across all parts.
async fn read_multipart(
    mut multipart: Multipart,
    form: &mut PostForm,
    limit: usize,
) -> Result<Option<MediaFile>> {
    let mut media = None;
    let mut total = 0usize;

    while let Some(field) = multipart.next().await {
        let mut field =
            field.map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?;

        let (name, filename) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().map(str::to_string),
                cd.get_filename().map(str::to_string),
            ),
            None => (None, None),
        };
        let content_type = field
            .content_type()
            .map(|mime| mime.to_string())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let mut data = BytesMut::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| AppError::BadRequest(format!("Multipart read error: {e}")))?;
            total += chunk.len();
            if total > limit {
                return Err(body_too_large(limit));
            }
            data.extend_from_slice(&chunk);
        }

        match name.as_deref() {
            Some(MEDIA_FIELD) => {
                if let Some(filename) = filename {
                    media = Some(MediaFile {
                        filename,
                        content_type,
                        data: data.freeze(),
                    });
                }
            }
            Some("user") => form.user = Some(field_text(&data)),
            Some("message") => form.message = Some(field_text(&data)),
            Some("lat") => form.lat = Some(field_text(&data)),
            Some("lon") => form.lon = Some(field_text(&data)),
            _ => {}
        }
    }

    Ok(media)
}

/// Upload flow: store the media, score faces for images, index the post.
async fn create_media_post(
    state: &AppState,
    mut form: PostForm,
    multipart: Multipart,
) -> Result<HttpResponse> {
    let media = read_multipart(multipart, &mut form, state.settings.max_body_bytes).await?;
    let mut post = form.into_post();

    let media = media.ok_or_else(|| AppError::BadRequest("Image is not available".to_string()))?;
    post.media_type = MediaType::from_filename(&media.filename);

    let id = Uuid::new_v4().to_string();
    let stored = state
        .storage
        .upload(&id, media.data, &media.content_type)
        .await
        .map_err(AppError::MediaUpload)?;
    post.media_url = stored.media_link;

    if post.media_type == MediaType::Image {
        post.face_score = state
            .annotator
            .face_confidence(&stored.gs_uri)
            .await
            .map_err(AppError::Annotation)?;
    }

    state
        .search
        .index_post(&state.settings.post_index, &id, &post)
        .await
        .map_err(AppError::IndexWrite)?;

    info!(
        post_id = %id,
        media_type = post.media_type.as_str(),
        face = post.face_score,
        "Post is saved to index"
    );
    Ok(HttpResponse::Ok().finish())
}

/// JSON flow: the body is a post without media.
async fn create_json_post(state: &AppState, mut payload: web::Payload) -> Result<HttpResponse> {
    let limit = state.settings.max_body_bytes;
    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Body read error: {e}")))?;
        if body.len() + chunk.len() > limit {
            return Err(body_too_large(limit));
        }
        body.extend_from_slice(&chunk);
    }

    let submitted: Post = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid post body: {e}")))?;

    // No upload happened, so media fields from the body are not trusted.
    let post = Post::new(submitted.user, submitted.message, submitted.location);

    let id = Uuid::new_v4().to_string();
    state
        .search
        .index_post(&state.settings.post_index, &id, &post)
        .await
        .map_err(AppError::IndexWrite)?;

    info!(post_id = %id, "Post is saved to index");
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(format!("Post received: {}", post.message)))
}
