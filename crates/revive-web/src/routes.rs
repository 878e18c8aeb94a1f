//! HTTP routes
//!
//! One controller per process, shared behind a mutex. The lock is released
//! while the remote restoration runs so the page can keep polling state.

use std::convert::Infallible;
use std::sync::Arc;

use revive_core::Error;
use revive_core::api;
use revive_core::restoration::{
    CredentialPrompt, FileUpload, ImageRestorer, RestorationController, RestorationState,
    ViewState,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use warp::http::{StatusCode, header};
use warp::hyper::body::Bytes;
use warp::reply::{Reply, Response};
use warp::{Filter, Rejection};

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Shared host state
pub struct AppState<R, P> {
    pub controller: Arc<Mutex<RestorationController<R, P>>>,
    pub max_upload_bytes: u64,
}

impl<R, P> Clone for AppState<R, P> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

/// Snapshot returned by every JSON endpoint
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub state: RestorationState,
    pub view: ViewState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RestoreBody {
    pub strength: Option<i64>,
}

/// All routes
pub fn routes<R, P>(
    state: AppState<R, P>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone
where
    R: ImageRestorer + 'static,
    P: CredentialPrompt + 'static,
{
    let index = warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::html(INDEX_HTML).into_response());

    let get_state = warp::path!("api" / "state")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(get_state::<R, P>);

    let upload = warp::path!("api" / "upload")
        .and(warp::post())
        .and(warp::body::content_length_limit(state.max_upload_bytes))
        .and(warp::header::optional::<String>("content-type"))
        .and(warp::header::optional::<String>("x-file-name"))
        .and(warp::body::bytes())
        .and(with_state(state.clone()))
        .and_then(upload::<R, P>);

    let restore = warp::path!("api" / "restore")
        .and(warp::post())
        .and(warp::body::content_length_limit(16 * 1024))
        .and(warp::body::json::<RestoreBody>())
        .and(with_state(state.clone()))
        .and_then(restore::<R, P>);

    let download = warp::path!("api" / "download")
        .and(warp::get())
        .and(with_state(state))
        .and_then(download::<R, P>);

    let health = warp::path!("api" / "health")
        .and(warp::get())
        .and_then(health);

    index
        .or(get_state)
        .unify()
        .or(upload)
        .unify()
        .or(restore)
        .unify()
        .or(download)
        .unify()
        .or(health)
        .unify()
        .recover(handle_rejection)
        .unify()
        .with(warp::trace::request())
}

fn with_state<R, P>(
    state: AppState<R, P>,
) -> impl Filter<Extract = (AppState<R, P>,), Error = Infallible> + Clone
where
    R: ImageRestorer + 'static,
    P: CredentialPrompt + 'static,
{
    warp::any().map(move || state.clone())
}

async fn get_state<R, P>(state: AppState<R, P>) -> Result<Response, Infallible>
where
    R: ImageRestorer,
    P: CredentialPrompt,
{
    let controller = state.controller.lock().await;
    Ok(snapshot(&*controller, None))
}

async fn upload<R, P>(
    content_type: Option<String>,
    file_name: Option<String>,
    body: Bytes,
    state: AppState<R, P>,
) -> Result<Response, Infallible>
where
    R: ImageRestorer,
    P: CredentialPrompt,
{
    let declared_type = content_type
        .as_deref()
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default();

    let mut file = FileUpload::new(declared_type, body.to_vec());
    if let Some(name) = file_name.filter(|n| !n.is_empty()) {
        file = file.with_file_name(name);
    }

    let mut controller = state.controller.lock().await;
    let outcome = controller.accept_file(file);
    Ok(snapshot(&*controller, outcome.err()))
}

async fn restore<R, P>(body: RestoreBody, state: AppState<R, P>) -> Result<Response, Infallible>
where
    R: ImageRestorer + 'static,
    P: CredentialPrompt + 'static,
{
    let (pending, restorer) = {
        let mut controller = state.controller.lock().await;
        if let Some(strength) = body.strength {
            controller.set_strength(strength);
        }
        match controller.begin_restore().await {
            Ok(pending) => (pending, controller.restorer()),
            Err(e) => return Ok(snapshot(&*controller, Some(e))),
        }
    };

    // The attempt runs to completion on its own task, even if the client goes away
    let shared = Arc::clone(&state.controller);
    let attempt = tokio::spawn(async move {
        debug!(attempt_id = %pending.attempt_id, "Lock released for remote call");
        let outcome = pending.run(restorer.as_ref()).await;

        let mut controller = shared.lock().await;
        let result = controller.finish_restore(outcome).await;
        info!(
            attempt_id = %pending.attempt_id,
            state = %controller.state(),
            "Restoration attempt finished"
        );
        snapshot(&*controller, result.err())
    });

    match attempt.await {
        Ok(reply) => Ok(reply),
        Err(e) => {
            error!(error = %e, "Restoration task failed");
            let failure = format!("Restoration task failed: {}", e);
            let mut controller = state.controller.lock().await;
            if controller.state().is_busy() {
                let _ = controller.finish_restore(Err(Error::Other(failure.clone()))).await;
            }
            Ok(snapshot(&*controller, Some(Error::Other(failure))))
        }
    }
}

async fn download<R, P>(state: AppState<R, P>) -> Result<Response, Infallible>
where
    R: ImageRestorer,
    P: CredentialPrompt,
{
    let controller = state.controller.lock().await;
    let Some(artifact) = controller.download() else {
        let err = Error::Other("No restored image to download".to_string());
        return Ok(error_reply(StatusCode::NOT_FOUND, &err));
    };

    let reply = warp::reply::with_header(
        artifact.bytes,
        header::CONTENT_TYPE,
        artifact.mime_type,
    );
    let reply = warp::reply::with_header(
        reply,
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{}\"", artifact.file_name),
    );
    Ok(reply.into_response())
}

async fn health() -> Result<Response, Infallible> {
    match api::doctor().await {
        Ok(report) => Ok(warp::reply::json(&report).into_response()),
        Err(e) => Ok(error_reply(StatusCode::INTERNAL_SERVER_ERROR, &e)),
    }
}

/// Rejections become the same JSON error body the handlers use
async fn handle_rejection(rejection: Rejection) -> Result<Response, Infallible> {
    let (status, error) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, Error::Other("Not found".to_string()))
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            Error::InvalidInput("image exceeds the upload limit".to_string()),
        )
    } else if let Some(e) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, Error::Other(e.to_string()))
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            Error::Other("Method not allowed".to_string()),
        )
    } else if rejection.find::<warp::reject::LengthRequired>().is_some() {
        (
            StatusCode::LENGTH_REQUIRED,
            Error::Other("Content-Length is required".to_string()),
        )
    } else {
        warn!(?rejection, "Unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Error::Other("Unhandled request".to_string()),
        )
    };
    Ok(error_reply(status, &error))
}

fn snapshot<R, P>(controller: &RestorationController<R, P>, error: Option<Error>) -> Response
where
    R: ImageRestorer,
    P: CredentialPrompt,
{
    let status = error.as_ref().map(status_for).unwrap_or(StatusCode::OK);
    let body = StateResponse {
        state: controller.state(),
        view: controller.view().clone(),
        error: error.map(|e| ErrorBody {
            code: e.code(),
            message: e.to_string(),
        }),
    };
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

fn error_reply(status: StatusCode, error: &Error) -> Response {
    let body = ErrorBody {
        code: error.code(),
        message: error.to_string(),
    };
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::InvalidInput(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        Error::MissingInput => StatusCode::BAD_REQUEST,
        Error::MissingCredential | Error::InvalidCredential(_) => StatusCode::UNAUTHORIZED,
        Error::RestorationInProgress | Error::NoRestorationInProgress => StatusCode::CONFLICT,
        Error::ModelRefusal(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Unclassified(_) | Error::RemoteApi(_) | Error::NetworkError(_) => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use revive_core::image::{RestorationRequest, RestoredImage};
    use revive_core::restoration::{ControllerOptions, NoCredentialDialog};
    use serde_json::Value;
    use std::time::Duration;

    struct FakeRestorer {
        fail_with: Option<&'static str>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl ImageRestorer for FakeRestorer {
        async fn restore_image(
            &self,
            _request: &RestorationRequest,
            _credential: &str,
        ) -> revive_core::Result<RestoredImage> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.fail_with {
                Some(message) => Err(Error::RemoteApi(message.to_string())),
                None => RestoredImage::from_inline_data("image/png", "AQID", "fake", 1),
            }
        }
    }

    fn state(
        fail_with: Option<&'static str>,
        key: Option<&str>,
    ) -> AppState<FakeRestorer, NoCredentialDialog> {
        state_with(
            FakeRestorer {
                fail_with,
                delay: None,
            },
            key,
        )
    }

    fn state_with(
        restorer: FakeRestorer,
        key: Option<&str>,
    ) -> AppState<FakeRestorer, NoCredentialDialog> {
        let controller = RestorationController::new(
            restorer,
            NoCredentialDialog,
            ControllerOptions::default(),
        )
        .with_credential(key.map(str::to_string));
        AppState {
            controller: Arc::new(Mutex::new(controller)),
            max_upload_bytes: 1024,
        }
    }

    fn json(body: &[u8]) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    async fn upload_jpeg<F>(filter: &F) -> warp::http::Response<Bytes>
    where
        F: Filter + 'static,
        F::Extract: Reply + Send,
    {
        warp::test::request()
            .method("POST")
            .path("/api/upload")
            .header("content-type", "image/jpeg")
            .header("x-file-name", "grandma.jpg")
            .body(vec![0xFF, 0xD8, 0xFF, 0xE0])
            .reply(filter)
            .await
    }

    #[tokio::test]
    async fn test_index_page() {
        let filter = routes(state(None, Some("key")));
        let res = warp::test::request().path("/").reply(&filter).await;
        assert_eq!(res.status(), StatusCode::OK);
        let page = String::from_utf8_lossy(res.body());
        assert!(page.contains("<html"));
        assert!(page.contains("res.json().catch(() => null)"));
    }

    #[tokio::test]
    async fn test_initial_state() {
        let filter = routes(state(None, Some("key")));
        let res = warp::test::request().path("/api/state").reply(&filter).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = json(res.body());
        assert_eq!(body["state"], "idle");
        assert_eq!(body["view"]["restore_enabled"], false);
        assert_eq!(body["view"]["download_enabled"], false);
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_upload_non_image_is_rejected() {
        let filter = routes(state(None, Some("key")));
        let res = warp::test::request()
            .method("POST")
            .path("/api/upload")
            .header("content-type", "text/plain")
            .body("hello")
            .reply(&filter)
            .await;

        assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let body = json(res.body());
        assert_eq!(body["state"], "idle");
        assert_eq!(body["error"]["code"], "E001");
    }

    #[tokio::test]
    async fn test_upload_too_large() {
        let filter = routes(state(None, Some("key")));
        let res = warp::test::request()
            .method("POST")
            .path("/api/upload")
            .header("content-type", "image/png")
            .body(vec![0u8; 4096])
            .reply(&filter)
            .await;

        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json(res.body())["code"], "E001");
    }

    #[tokio::test]
    async fn test_rejections_are_json() {
        let filter = routes(state(None, Some("key")));

        let res = warp::test::request()
            .method("GET")
            .path("/api/restore")
            .reply(&filter)
            .await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json(res.body())["code"], "E9999");

        let res = warp::test::request().path("/api/missing").reply(&filter).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(json(res.body())["message"], "Not found");

        let res = warp::test::request()
            .method("POST")
            .path("/api/restore")
            .header("content-type", "application/json")
            .body("{not json")
            .reply(&filter)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(json(res.body())["message"].is_string());
    }

    #[tokio::test]
    async fn test_restore_and_download() {
        let filter = routes(state(None, Some("key")));

        let res = upload_jpeg(&filter).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = json(res.body());
        assert_eq!(body["state"], "file_selected");
        assert_eq!(body["view"]["restore_enabled"], true);

        let res = warp::test::request()
            .method("POST")
            .path("/api/restore")
            .json(&serde_json::json!({ "strength": 75 }))
            .reply(&filter)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = json(res.body());
        assert_eq!(body["state"], "done");
        assert_eq!(body["view"]["restored_image"], "data:image/png;base64,AQID");
        assert_eq!(body["view"]["download_enabled"], true);
        assert_eq!(body["view"]["strength"], 75);

        let res = warp::test::request().path("/api/download").reply(&filter).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(
            res.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"restored_image.png\""
        );
        assert_eq!(res.body().to_vec(), vec![1u8, 2, 3]);
    }

    #[tokio::test]
    async fn test_download_before_restore_is_not_found() {
        let filter = routes(state(None, Some("key")));
        let res = warp::test::request().path("/api/download").reply(&filter).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(json(res.body())["code"], "E9999");
    }

    #[tokio::test]
    async fn test_restore_without_file() {
        let filter = routes(state(None, Some("key")));
        let res = warp::test::request()
            .method("POST")
            .path("/api/restore")
            .json(&serde_json::json!({}))
            .reply(&filter)
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(res.body())["error"]["code"], "E002");
    }

    #[tokio::test]
    async fn test_restore_without_key_shows_instruction() {
        let filter = routes(state(None, None));
        upload_jpeg(&filter).await;

        let res = warp::test::request()
            .method("POST")
            .path("/api/restore")
            .json(&serde_json::json!({ "strength": 50 }))
            .reply(&filter)
            .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = json(res.body());
        assert_eq!(body["error"]["code"], "E100");
        assert_eq!(body["state"], "file_selected");
        assert_eq!(body["view"]["status"]["kind"], "error");
    }

    #[tokio::test]
    async fn test_remote_failure_reports_status() {
        let filter = routes(state(Some("quota exhausted"), Some("key")));
        upload_jpeg(&filter).await;

        let res = warp::test::request()
            .method("POST")
            .path("/api/restore")
            .json(&serde_json::json!({ "strength": 50 }))
            .reply(&filter)
            .await;

        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
        let body = json(res.body());
        assert_eq!(body["state"], "error");
        assert_eq!(body["view"]["status"]["text"], "Lỗi: quota exhausted");
        assert_eq!(body["view"]["busy"], false);
        assert_eq!(body["view"]["restore_enabled"], true);
    }

    #[tokio::test]
    async fn test_restore_completes_after_client_disconnects() {
        let filter = routes(state_with(
            FakeRestorer {
                fail_with: None,
                delay: Some(Duration::from_millis(300)),
            },
            Some("key"),
        ));
        upload_jpeg(&filter).await;

        let abandoned = tokio::time::timeout(
            Duration::from_millis(50),
            warp::test::request()
                .method("POST")
                .path("/api/restore")
                .json(&serde_json::json!({ "strength": 50 }))
                .reply(&filter),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(600)).await;

        let res = warp::test::request().path("/api/state").reply(&filter).await;
        let body = json(res.body());
        assert_eq!(body["state"], "done");
        assert_eq!(body["view"]["busy"], false);
        assert_eq!(body["view"]["upload_enabled"], true);
        assert_eq!(body["view"]["download_enabled"], true);

        let res = warp::test::request()
            .method("POST")
            .path("/api/restore")
            .json(&serde_json::json!({ "strength": 50 }))
            .reply(&filter)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health() {
        let filter = routes(state(None, Some("key")));
        let res = warp::test::request().path("/api/health").reply(&filter).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(json(res.body()).get("overall_status").is_some());
    }
}
