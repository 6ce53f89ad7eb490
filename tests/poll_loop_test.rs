//! 轮询循环端到端测试
//!
//! 用 axum 在本地随机端口上模拟 Practicum API 和 Telegram Bot API，
//! 通过真实 HTTP 驱动 `PracticumClient` + `TelegramChannel` + `PollLoop`。

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use homework_status_bot::{
    HomeworkApi, IterationOutcome, Notifier, PollError, PollLoop, PollerSettings,
    PracticumClient, SendResult, TelegramChannel, TelegramConfig,
};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const STATUS_PATH: &str = "/api/user_api/homework_statuses/";
const API_TOKEN: &str = "practicum-token";
const BOT_TOKEN: &str = "123:bot-token";
const CHAT_ID: &str = "4242";

// ============================================================================
// 模拟服务
// ============================================================================

/// 在后台线程启动服务，返回基础 URL
fn spawn_server(app: Router) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            axum::serve(listener, app).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[derive(Clone, Default)]
struct PracticumState {
    /// 按顺序返回的 (状态码, 响应体)；用完后返回空列表
    responses: Arc<Mutex<VecDeque<(u16, String)>>>,
    /// 收到的 (Authorization, from_date)
    requests: Arc<Mutex<Vec<(Option<String>, Option<String>)>>>,
}

async fn homework_statuses(
    State(state): State<PracticumState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    state
        .requests
        .lock()
        .unwrap()
        .push((auth, params.get("from_date").cloned()));

    let (status, body) = state
        .responses
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((200, r#"{"homeworks": []}"#.to_string()));
    (StatusCode::from_u16(status).unwrap(), body)
}

fn start_practicum(responses: Vec<(u16, Value)>) -> (String, PracticumState) {
    let state = PracticumState::default();
    *state.responses.lock().unwrap() = responses
        .into_iter()
        .map(|(status, body)| (status, body.to_string()))
        .collect();

    let app = Router::new()
        .route(STATUS_PATH, get(homework_statuses))
        .with_state(state.clone());
    let base = spawn_server(app);
    (format!("{base}{STATUS_PATH}"), state)
}

#[derive(Clone, Default)]
struct TelegramState {
    /// 收到的 (路径中的 bot 段, 请求体)
    messages: Arc<Mutex<Vec<(String, Value)>>>,
    reject: bool,
}

async fn send_message(
    State(state): State<TelegramState>,
    Path(bot): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.messages.lock().unwrap().push((bot, body));
    if state.reject {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"ok": false, "error_code": 400, "description": "Bad Request: chat not found"})),
        )
    } else {
        (StatusCode::OK, Json(json!({"ok": true, "result": {"message_id": 1}})))
    }
}

fn start_telegram(reject: bool) -> (String, TelegramState) {
    let state = TelegramState {
        reject,
        ..Default::default()
    };
    let app = Router::new()
        .route("/{bot}/sendMessage", post(send_message))
        .with_state(state.clone());
    (spawn_server(app), state)
}

impl TelegramState {
    fn texts(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|(_, body)| body["text"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

fn settings(endpoint: &str) -> PollerSettings {
    PollerSettings {
        endpoint: endpoint.to_string(),
        poll_interval: Duration::ZERO,
        request_timeout: Duration::from_secs(5),
    }
}

fn build_loop(endpoint: &str, telegram_base: &str) -> PollLoop<PracticumClient> {
    let settings = settings(endpoint);
    let api = PracticumClient::from_settings(API_TOKEN, &settings).unwrap();
    let channel = TelegramChannel::new(
        TelegramConfig::new(BOT_TOKEN, CHAT_ID).with_api_base(telegram_base),
    )
    .unwrap();
    PollLoop::new(api, Notifier::new(Arc::new(channel)), &settings).with_cursor(500)
}

const APPROVED_HW1: &str =
    "Изменился статус проверки работы \"hw1\". Работа проверена: ревьюеру всё понравилось. Ура!";

// ============================================================================
// 测试
// ============================================================================

#[test]
fn test_approved_status_is_forwarded_to_telegram() {
    let (endpoint, practicum) = start_practicum(vec![(
        200,
        json!({
            "homeworks": [{"homework_name": "hw1", "status": "approved"}],
            "current_date": 1000
        }),
    )]);
    let (telegram_base, telegram) = start_telegram(false);
    let mut poll = build_loop(&endpoint, &telegram_base);

    let outcome = poll.cycle();

    assert!(matches!(outcome, IterationOutcome::Notified { delivery: SendResult::Sent, .. }));
    assert_eq!(poll.cursor(), 1000);
    assert_eq!(telegram.texts(), vec![APPROVED_HW1.to_string()]);

    let messages = telegram.messages.lock().unwrap();
    assert_eq!(messages[0].0, format!("bot{BOT_TOKEN}"));
    assert_eq!(messages[0].1["chat_id"], json!(4242));

    let requests = practicum.requests.lock().unwrap();
    assert_eq!(
        requests[0],
        (Some(format!("OAuth {API_TOKEN}")), Some("500".to_string()))
    );
}

#[test]
fn test_next_request_uses_advanced_cursor() {
    let (endpoint, practicum) = start_practicum(vec![(
        200,
        json!({
            "homeworks": [{"homework_name": "hw1", "status": "reviewing"}],
            "current_date": 1000
        }),
    )]);
    let (telegram_base, _telegram) = start_telegram(false);
    let mut poll = build_loop(&endpoint, &telegram_base);

    poll.cycle();
    let second = poll.cycle();

    assert!(matches!(second, IterationOutcome::NoUpdates));
    let from_dates: Vec<Option<String>> = practicum
        .requests
        .lock()
        .unwrap()
        .iter()
        .map(|(_, from)| from.clone())
        .collect();
    assert_eq!(from_dates, vec![Some("500".to_string()), Some("1000".to_string())]);
}

#[test]
fn test_empty_homeworks_sends_nothing() {
    let (endpoint, _practicum) = start_practicum(vec![(200, json!({"homeworks": [], "current_date": 900}))]);
    let (telegram_base, telegram) = start_telegram(false);
    let mut poll = build_loop(&endpoint, &telegram_base);

    assert!(matches!(poll.cycle(), IterationOutcome::NoUpdates));
    assert!(telegram.texts().is_empty());
    assert_eq!(poll.cursor(), 500);
}

#[test]
fn test_http_503_is_reported_and_loop_continues() {
    let (endpoint, _practicum) = start_practicum(vec![
        (503, json!({"detail": "maintenance"})),
        (
            200,
            json!({
                "homeworks": [{"homework_name": "hw1", "status": "approved"}],
                "current_date": 1000
            }),
        ),
    ]);
    let (telegram_base, telegram) = start_telegram(false);
    let mut poll = build_loop(&endpoint, &telegram_base);

    let first = poll.cycle();
    assert!(matches!(
        first,
        IterationOutcome::Failed { error: PollError::HttpStatus { status: 503 }, .. }
    ));
    assert_eq!(poll.cursor(), 500);

    let second = poll.cycle();
    assert!(matches!(second, IterationOutcome::Notified { .. }));
    assert_eq!(
        telegram.texts(),
        vec![
            "Сбой в работе программы: Не получен ответ API. Код ответа: 503".to_string(),
            APPROVED_HW1.to_string(),
        ]
    );
}

#[test]
fn test_rejection_key_in_successful_response() {
    let (endpoint, _practicum) = start_practicum(vec![(
        200,
        json!({"code": "UnknownError", "error": {"error": "Wrong from_date format"}}),
    )]);
    let (telegram_base, telegram) = start_telegram(false);
    let mut poll = build_loop(&endpoint, &telegram_base);

    let outcome = poll.cycle();
    match outcome {
        IterationOutcome::Failed { error: PollError::ApiKey { key, .. }, .. } => {
            assert_eq!(key, "error");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(telegram.texts().len(), 1);
}

#[test]
fn test_repeated_transport_failure_notifies_once() {
    // 绑定后立即释放端口，保证连接被拒绝
    let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}{}", closed.local_addr().unwrap(), STATUS_PATH);
    drop(closed);

    let (telegram_base, telegram) = start_telegram(false);
    let mut poll = build_loop(&endpoint, &telegram_base);

    let first = poll.cycle();
    let second = poll.cycle();

    assert!(matches!(
        first,
        IterationOutcome::Failed { error: PollError::Transport { .. }, delivery: Some(_), .. }
    ));
    assert!(matches!(second, IterationOutcome::Failed { delivery: None, .. }));
    assert_eq!(telegram.texts().len(), 1);
    assert!(!telegram.texts()[0].contains(API_TOKEN));
}

#[test]
fn test_telegram_rejection_does_not_stop_polling() {
    let body = json!({
        "homeworks": [{"homework_name": "hw1", "status": "rejected"}],
        "current_date": 1000
    });
    let (endpoint, _practicum) = start_practicum(vec![(200, body.clone()), (200, body)]);
    let (telegram_base, telegram) = start_telegram(true);
    let mut poll = build_loop(&endpoint, &telegram_base);

    let first = poll.cycle();
    match first {
        IterationOutcome::Notified { delivery: SendResult::Failed(reason), .. } => {
            assert!(reason.contains("chat not found"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(poll.cursor(), 1000);

    let second = poll.cycle();
    assert!(matches!(second, IterationOutcome::Suppressed { .. }));
    assert_eq!(telegram.texts().len(), 1);
}

#[test]
fn test_client_fetch_returns_body_unmodified() {
    let body = json!({
        "homeworks": [{"homework_name": "hw1", "status": "approved", "reviewer_comment": "ok"}],
        "current_date": 1000
    });
    let (endpoint, _practicum) = start_practicum(vec![(200, body.clone())]);
    let client = PracticumClient::from_settings(API_TOKEN, &settings(&endpoint)).unwrap();

    assert_eq!(client.fetch(0).unwrap(), body);
}
