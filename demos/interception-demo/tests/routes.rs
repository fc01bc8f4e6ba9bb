use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use mvc_interception_demo::{
    DemoController, RestDemoAdvice, RestDemoController, RestDemoExceptionHandlerAdvice,
};
use mvc_web::prelude::*;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

fn templates() -> TemplateEngine {
    let properties = TemplateProperties {
        pattern: concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*.html").to_string(),
        suffix: ".html".to_string(),
    };
    TemplateEngine::new(&properties).unwrap()
}

fn app() -> Router {
    mvc_interception_demo::router(templates()).unwrap()
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app(), uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn get_text(uri: &str) -> (StatusCode, String) {
    let (status, body) = get(app(), uri).await;
    (status, String::from_utf8(body).unwrap())
}

/// 去掉页面中随时间变化的部分
fn without_time(page: &str) -> String {
    let start = page.find("<span id=\"time\">").unwrap();
    let end = start + page[start..].find("</span>").unwrap();
    format!("{}{}", &page[..start], &page[end..])
}

// ==================== 视图路由 ====================

#[tokio::test]
async fn welcome_renders_model() {
    let (status, page) = get_text("/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("<td id=\"demo-id\">id</td>"));
    assert!(page.contains("<td id=\"demo-name\">name</td>"));
    assert!(!page.contains("<span id=\"time\"></span>"));
}

#[tokio::test]
async fn view_with_null_renders_view_named_after_path() {
    let (status, page) = get_text("/withNull").await;

    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("<title>withNull</title>"));
}

#[tokio::test]
async fn view_with_exception_is_handled_by_advice() {
    let (status, body) = get_json("/withException").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"message": "oh no"}));
}

#[tokio::test]
async fn view_with_direct_exception_uses_default_error() {
    let (status, body) = get_json("/withDirectException").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "status": 500,
            "error": "Internal Server Error",
            "message": "oh no",
            "path": "/withDirectException"
        })
    );
}

// ==================== REST 路由 ====================

#[tokio::test]
async fn rest_returns_declared_status_and_body() {
    let (status, body) = get_json("/rest/").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"id": "id", "name": "name"}));
}

#[tokio::test]
async fn rest_with_null_has_empty_body_and_default_status() {
    let (status, body) = get(app(), "/rest/withNull").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn rest_with_exception_overrides_declared_status() {
    let (status, body) = get_json("/rest/withException").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"message": "oh no"}));
}

#[tokio::test]
async fn advice_applies_to_every_route() {
    let first = get(app(), "/rest/withException").await;
    let second = get(app(), "/rest/withAnotherException").await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn rest_with_direct_exception_uses_default_error() {
    let (status, body) = get_json("/rest/withDirectException").await;

    assert_ne!(status, StatusCode::CREATED);
    assert_ne!(status, StatusCode::CONFLICT);
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["path"], "/rest/withDirectException");
    assert_eq!(body["message"], "oh no");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (status, body) = get_json("/missing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
    assert_eq!(body["path"], "/missing");
}

#[tokio::test]
async fn repeated_requests_are_identical() {
    let app = app();
    let routes = [
        "/withNull",
        "/withException",
        "/withDirectException",
        "/rest/",
        "/rest/withNull",
        "/rest/withException",
        "/rest/withAnotherException",
        "/rest/withDirectException",
    ];

    for uri in routes {
        let first = get(app.clone(), uri).await;
        let second = get(app.clone(), uri).await;
        assert_eq!(first, second, "{} is not idempotent", uri);
    }

    let (_, first) = get(app.clone(), "/").await;
    let (_, second) = get(app, "/").await;
    assert_eq!(
        without_time(&String::from_utf8(first).unwrap()),
        without_time(&String::from_utf8(second).unwrap())
    );
}

// ==================== 拦截器与 advice ====================

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Post {
        handler: String,
        view: Option<String>,
        injected: bool,
    },
    After {
        handler: String,
        status: Option<StatusCode>,
        failed: bool,
    },
}

#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

#[async_trait]
impl HandlerInterceptor for Recorder {
    fn name(&self) -> &str {
        "Recorder"
    }

    async fn pre_handle(&self, _request: &mut Parts, _handler: &Handler) -> InterceptorResult<bool> {
        Ok(true)
    }

    async fn post_handle(
        &self,
        _request: &Parts,
        handler: &Handler,
        model_and_view: Option<&ModelAndView>,
    ) -> InterceptorResult<()> {
        self.events.lock().unwrap().push(Event::Post {
            handler: handler.to_string(),
            view: model_and_view.and_then(|mav| mav.view_name().map(str::to_string)),
            injected: model_and_view
                .map(|mav| mav.model().contains(RestDemoAdvice::ATTRIBUTE))
                .unwrap_or(false),
        });
        Ok(())
    }

    fn after_completion(
        &self,
        _request: &Parts,
        handler: &Handler,
        completion: &Completion,
    ) -> InterceptorResult<()> {
        self.events.lock().unwrap().push(Event::After {
            handler: handler.to_string(),
            status: completion.status(),
            failed: completion.error().is_some(),
        });
        Ok(())
    }
}

fn recorded_app(recorder: Recorder) -> Router {
    let dispatcher = HandlerDispatcher::builder()
        .interceptor(recorder)
        .advice(RestDemoAdvice)
        .advice(RestDemoExceptionHandlerAdvice)
        .template_engine(templates())
        .build();

    RequestMappings::new(Arc::new(dispatcher))
        .controller(DemoController)
        .unwrap()
        .controller(RestDemoController)
        .unwrap()
        .into_router()
}

async fn record(uri: &str) -> Vec<Event> {
    let recorder = Recorder::default();
    get(recorded_app(recorder.clone()), uri).await;
    let events = recorder.events.lock().unwrap().clone();
    events
}

#[tokio::test]
async fn view_handler_posts_model_and_view_with_advice_attribute() {
    assert_eq!(
        record("/withNull").await,
        vec![
            Event::Post {
                handler: "DemoController#rest_with_null()".to_string(),
                view: Some("withNull".to_string()),
                injected: true,
            },
            Event::After {
                handler: "DemoController#rest_with_null()".to_string(),
                status: Some(StatusCode::OK),
                failed: false,
            },
        ]
    );
}

#[tokio::test]
async fn body_handler_posts_without_model_and_view() {
    assert_eq!(
        record("/rest/").await,
        vec![
            Event::Post {
                handler: "RestDemoController#rest()".to_string(),
                view: None,
                injected: false,
            },
            Event::After {
                handler: "RestDemoController#rest()".to_string(),
                status: Some(StatusCode::CREATED),
                failed: false,
            },
        ]
    );
}

#[tokio::test]
async fn failing_handler_skips_post_handle() {
    assert_eq!(
        record("/rest/withException").await,
        vec![Event::After {
            handler: "RestDemoController#rest_with_exception()".to_string(),
            status: Some(StatusCode::CONFLICT),
            failed: true,
        }]
    );
}

#[tokio::test]
async fn advice_attribute_never_reaches_response_bodies() {
    let (_, page) = get_text("/").await;
    assert!(!page.contains("injectedByAdvice"));

    let (_, body) = get_text("/rest/").await;
    assert!(!body.contains("injectedByAdvice"));
}
