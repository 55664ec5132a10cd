//! Golden fixture integration tests.
//!
//! Each fixture in `fixtures/sqs/` holds a queue-trigger event and the
//! partial batch response expected when it is dispatched to the employee
//! handler below.

use async_trait::async_trait;
use queuebatch_core::{Batch, BatchResult, HandlerError, InvocationContext, MessageHandler};
use queuebatch_dispatch::{BatchDispatcher, DispatchConfig};
use serde::Deserialize;
use std::sync::{Arc, Mutex};

// ─── Helpers ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Employee {
    employee_id: String,
    #[allow(dead_code)]
    name: String,
    email: String,
    #[serde(default)]
    #[allow(dead_code)]
    department: Option<String>,
}

/// Accepts employees with a plausible email address.
#[derive(Default)]
struct EmployeeHandler {
    stored: Mutex<Vec<String>>,
}

#[async_trait]
impl MessageHandler for EmployeeHandler {
    type Payload = Employee;

    async fn process(&self, e: Employee, _ctx: &InvocationContext) -> Result<(), HandlerError> {
        if !e.email.contains('@') {
            return Err(HandlerError::msg(format!(
                "employee {} has an invalid email",
                e.employee_id
            )));
        }
        self.stored.lock().unwrap().push(e.employee_id);
        Ok(())
    }
}

/// The fixtures live two levels above the crate root.
fn fixture_path(name: &str) -> std::path::PathBuf {
    let mut p = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("../../fixtures/sqs");
    p.push(name);
    p
}

fn load_fixture(name: &str) -> (Batch, BatchResult) {
    let text = std::fs::read_to_string(fixture_path(name)).expect("fixture not found");
    let fixture: serde_json::Value = serde_json::from_str(&text).expect("fixture is not JSON");
    let batch: Batch = serde_json::from_value(fixture["event"].clone()).expect("bad event");
    let expected: BatchResult =
        serde_json::from_value(fixture["expected"].clone()).expect("bad expected result");
    (batch, expected)
}

async fn run_fixture(name: &str, config: DispatchConfig) -> (BatchResult, BatchResult, Arc<EmployeeHandler>) {
    let (batch, expected) = load_fixture(name);
    let handler = Arc::new(EmployeeHandler::default());
    let dispatcher = BatchDispatcher::new(handler.clone()).with_config(config);
    let ctx = InvocationContext::new(format!("fixture-{name}"));
    let actual = dispatcher.handle(&batch, &ctx).await.expect("dispatch failed");
    (actual, expected, handler)
}

// ─── Fixtures ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn mixed_batch_golden() {
    let (actual, expected, handler) = run_fixture("mixed-batch.json", DispatchConfig::sequential()).await;

    assert_eq!(actual, expected);
    assert_eq!(
        *handler.stored.lock().unwrap(),
        vec!["E-1001", "E-1004", "E-1005"]
    );
}

#[tokio::test]
async fn mixed_batch_golden_concurrent() {
    let (actual, expected, handler) = run_fixture("mixed-batch.json", DispatchConfig::concurrent(3)).await;

    assert_eq!(actual, expected);
    assert_eq!(handler.stored.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn all_valid_golden() {
    let (actual, expected, _) = run_fixture("all-valid.json", DispatchConfig::sequential()).await;
    assert_eq!(actual, expected);
    assert!(actual.is_success());
}

#[tokio::test]
async fn empty_golden() {
    let (actual, expected, handler) = run_fixture("empty.json", DispatchConfig::sequential()).await;
    assert_eq!(actual, expected);
    assert!(handler.stored.lock().unwrap().is_empty());
}

#[tokio::test]
async fn response_serializes_to_wire_format() {
    let (actual, _, _) = run_fixture("mixed-batch.json", DispatchConfig::sequential()).await;
    let json = serde_json::to_value(&actual).unwrap();
    assert_eq!(
        json["batchItemFailures"][0]["itemIdentifier"],
        "8f2c1a3e-0002-4b6e-9d2a-3c1f0e7a9b02"
    );
}
