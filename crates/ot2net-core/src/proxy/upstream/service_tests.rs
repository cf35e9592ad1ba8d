use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::response::IntoResponse;
use ot2net_types::{
    AuditError, ChatMessage, ContentBlock, MessageRequest, MessageResponse, TokenUsage,
    UpstreamCallRecord, UpstreamError,
};
use parking_lot::Mutex;

use super::service::{AiCallService, CallDefaults, MessageOptions};
use crate::error::AppError;
use crate::modules::audit_db::AuditLog;
use crate::proxy::retry::RetryPolicy;

#[derive(Default)]
struct ScriptedBackend {
    outcomes: Mutex<VecDeque<Result<MessageResponse, UpstreamError>>>,
    requests: Mutex<Vec<MessageRequest>>,
}

impl ScriptedBackend {
    fn new(outcomes: Vec<Result<MessageResponse, UpstreamError>>) -> Arc<Self> {
        Arc::new(Self { outcomes: Mutex::new(outcomes.into()), requests: Mutex::default() })
    }

    fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl super::client::MessagesBackend for ScriptedBackend {
    async fn create_message(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, UpstreamError> {
        self.requests.lock().push(request.clone());
        self.outcomes
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(UpstreamError::transient(None, "script exhausted")))
    }
}

#[derive(Default)]
struct RecordingAudit {
    records: Mutex<Vec<UpstreamCallRecord>>,
}

#[async_trait]
impl AuditLog for RecordingAudit {
    async fn record(&self, record: &UpstreamCallRecord) -> Result<(), AuditError> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

struct FailingAudit;

#[async_trait]
impl AuditLog for FailingAudit {
    async fn record(&self, _record: &UpstreamCallRecord) -> Result<(), AuditError> {
        Err(AuditError::WriteFailed { message: "disk full".to_string() })
    }
}

fn response(text: &str, input: u64, output: u64) -> MessageResponse {
    MessageResponse {
        id: "msg_test".to_string(),
        model: "claude-3-5-sonnet-20241022".to_string(),
        content: vec![ContentBlock::text(text)],
        stop_reason: Some("end_turn".to_string()),
        usage: TokenUsage { input_tokens: input, output_tokens: output },
    }
}

fn service(
    backend: Arc<ScriptedBackend>,
    audit: Arc<dyn AuditLog>,
) -> AiCallService {
    AiCallService::new(backend, audit, RetryPolicy::new(3, 1000), CallDefaults::default())
}

fn prompt() -> Vec<ChatMessage> {
    vec![ChatMessage::user("Gerar cronograma")]
}

#[tokio::test(start_paused = true)]
async fn test_success_after_transient_failures_records_once() {
    let backend = ScriptedBackend::new(vec![
        Err(UpstreamError::transient(Some(503), "Overloaded")),
        Err(UpstreamError::connection("reset by peer")),
        Ok(response("pronto", 1000, 1000)),
    ]);
    let audit = Arc::new(RecordingAudit::default());
    let svc = service(backend.clone(), audit.clone());
    let start = tokio::time::Instant::now();

    let result = svc.send_message("processamento-ia", prompt(), MessageOptions::default()).await;

    let Ok(completion) = result else { panic!("expected success") };
    assert_eq!(completion.content, vec![ContentBlock::text("pronto")]);
    assert!((completion.cost - 0.018).abs() < 1e-12);
    assert_eq!(backend.calls(), 3);
    assert!(start.elapsed() >= Duration::from_millis(3000));

    let records = audit.records.lock();
    assert_eq!(records.len(), 1);
    assert!(records[0].succeeded);
    assert_eq!(records[0].feature, "processamento-ia");
    assert_eq!(records[0].input_tokens, 1000);
    assert_eq!(records[0].output_tokens, 1000);
}

#[tokio::test(start_paused = true)]
async fn test_client_error_fails_fast_with_uniform_error() {
    let backend = ScriptedBackend::new(vec![Err(UpstreamError::client(400, "prompt is too long"))]);
    let audit = Arc::new(RecordingAudit::default());
    let svc = service(backend.clone(), audit.clone());

    let result = svc.send_message("relatorios", prompt(), MessageOptions::default()).await;

    let Err(err) = result else { panic!("expected failure") };
    assert_eq!(err.to_string(), "Erro ao processar com Claude API: prompt is too long");
    assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(backend.calls(), 1);

    let records = audit.records.lock();
    assert_eq!(records.len(), 1);
    assert!(!records[0].succeeded);
    assert_eq!(records[0].cost, 0.0);
    assert_eq!(records[0].input_tokens, 0);
    assert_eq!(records[0].error_message.as_deref(), Some("prompt is too long"));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_surface_last_error() {
    let backend = ScriptedBackend::new(vec![
        Err(UpstreamError::transient(Some(500), "first")),
        Err(UpstreamError::transient(Some(502), "second")),
        Err(UpstreamError::transient(Some(503), "third")),
    ]);
    let audit = Arc::new(RecordingAudit::default());
    let svc = service(backend.clone(), audit.clone());

    let result = svc.send_message("processamento-ia", prompt(), MessageOptions::default()).await;

    assert!(matches!(
        result,
        Err(AppError::Upstream { ref vendor, ref message }) if vendor == "Claude" && message == "third"
    ));
    assert_eq!(backend.calls(), 3);
    assert_eq!(audit.records.lock().len(), 1);
}

#[tokio::test]
async fn test_audit_failure_does_not_change_outcome() {
    let backend = ScriptedBackend::new(vec![Ok(response("ok", 10, 2))]);
    let svc = service(backend, Arc::new(FailingAudit));

    let result = svc.send_message("processamento-ia", prompt(), MessageOptions::default()).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_defaults_and_overrides_reach_backend() {
    let backend = ScriptedBackend::new(vec![Ok(response("a", 1, 1)), Ok(response("b", 1, 1))]);
    let svc = service(backend.clone(), Arc::new(RecordingAudit::default()));

    let _ = svc.send_message("f", prompt(), MessageOptions::default()).await;
    let _ = svc
        .send_message(
            "f",
            prompt(),
            MessageOptions {
                model: Some("claude-3-5-haiku-20241022".to_string()),
                max_tokens: Some(128),
                temperature: Some(0.0),
                system: Some("Seja breve".to_string()),
            },
        )
        .await;

    let requests = backend.requests.lock();
    assert_eq!(requests[0].model, "claude-3-5-sonnet-20241022");
    assert_eq!(requests[0].max_tokens, 4096);
    assert_eq!(requests[0].temperature, 0.7);
    assert_eq!(requests[0].system, None);
    assert_eq!(requests[1].model, "claude-3-5-haiku-20241022");
    assert_eq!(requests[1].max_tokens, 128);
    assert_eq!(requests[1].temperature, 0.0);
    assert_eq!(requests[1].system.as_deref(), Some("Seja breve"));
}

#[tokio::test]
async fn test_empty_messages_are_sent_and_vendor_rejection_is_audited() {
    let backend = ScriptedBackend::new(vec![Err(UpstreamError::client(
        400,
        "messages: at least one message is required",
    ))]);
    let audit = Arc::new(RecordingAudit::default());
    let svc = service(backend.clone(), audit.clone());

    let result = svc.send_message("f", Vec::new(), MessageOptions::default()).await;

    let Err(err) = result else { panic!("expected vendor rejection") };
    assert_eq!(
        err.to_string(),
        "Erro ao processar com Claude API: messages: at least one message is required"
    );
    assert_eq!(err.into_response().status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(backend.calls(), 1);
    assert!(backend.requests.lock()[0].messages.is_empty());

    let records = audit.records.lock();
    assert_eq!(records.len(), 1);
    assert!(!records[0].succeeded);
    assert_eq!(records[0].input_tokens, 0);
    assert_eq!(
        records[0].error_message.as_deref(),
        Some("messages: at least one message is required")
    );
}
