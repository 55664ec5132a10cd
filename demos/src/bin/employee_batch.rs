//! # employee_batch
//!
//! Dispatches a small batch of employee records to a handler that stores them,
//! showing how one malformed or rejected record ends up in the partial batch
//! response while its siblings are still stored.
//!
//! Run with:
//! ```sh
//! cargo run --bin employee_batch
//! ```

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use queuebatch_core::{
    Batch, HandlerError, InvocationContext, MessageEnvelope, MessageHandler,
};
use queuebatch_dispatch::{BatchDispatcher, DispatchConfig};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Employee {
    employee_id: String,
    name: String,
    email: String,
    hire_date: NaiveDate,
}

/// In-memory employee store keyed by id.
#[derive(Default)]
struct EmployeeStore {
    rows: Mutex<HashMap<String, Employee>>,
}

#[async_trait]
impl MessageHandler for EmployeeStore {
    type Payload = Employee;

    async fn process(&self, employee: Employee, _ctx: &InvocationContext) -> Result<(), HandlerError> {
        if !employee.email.contains('@') {
            return Err(HandlerError::msg(format!("invalid email {:?}", employee.email)));
        }
        if employee.hire_date > Utc::now().date_naive() {
            return Err(HandlerError::msg(format!(
                "hire date {} is in the future",
                employee.hire_date
            )));
        }
        // simulated write latency
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.rows
            .lock()
            .map_err(|_| HandlerError::msg("employee store poisoned"))?
            .insert(employee.employee_id.clone(), employee);
        Ok(())
    }

    fn name(&self) -> &str {
        "EmployeeStore"
    }
}

fn record(id: &str, body: &str) -> MessageEnvelope {
    MessageEnvelope::new(id, body, "aws:sqs")
}

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Build a batch: two valid, one truncated, one rejected ─────────────
    let batch = Batch::new(vec![
        record(
            "msg-1",
            r#"{"employeeId":"E-1","name":"Ada","email":"ada@example.com","hireDate":"2021-03-01"}"#,
        ),
        record("msg-2", r#"{"employeeId":"E-2","name":"Bo"#),
        record(
            "msg-3",
            r#"{"employeeId":"E-3","name":"Cy","email":"cy.example.com","hireDate":"2022-07-15"}"#,
        ),
        record(
            "msg-4",
            r#"{"employeeId":"E-4","name":"Di","email":"di@example.com","hireDate":"2019-11-30"}"#,
        ),
    ]);
    println!("✓ Batch built ({} messages)", batch.len());

    // ── 2. Dispatch sequentially, then with two messages in flight ───────────
    for config in [DispatchConfig::sequential(), DispatchConfig::concurrent(2)] {
        let store = Arc::new(EmployeeStore::default());
        let dispatcher = BatchDispatcher::new(store.clone()).with_config(config.clone());
        let ctx = InvocationContext::new(uuid::Uuid::new_v4().to_string())
            .with_function_name("employee-ingest")
            .with_time_budget(Duration::from_secs(30));

        let report = dispatcher.handle_with_report(&batch, &ctx).await?;

        println!("\n─── concurrency = {} ─────────────────────────────", config.concurrency());
        for outcome in report.outcomes() {
            match &outcome.error {
                None => println!("  [OK]   {}", outcome.identifier),
                Some(e) => println!("  [FAIL] {} — {} ({e})", outcome.identifier, outcome.status),
            }
        }

        let stored = store.rows.lock().map(|rows| rows.len()).unwrap_or_default();
        println!("  stored: {stored}  failed: {}", report.failed());
        println!("  response: {}", serde_json::to_string(&report.result())?);
    }

    Ok(())
}
