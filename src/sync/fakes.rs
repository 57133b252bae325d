//! Scripted upstream used by the sync unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::{EngineError, EngineResult};
use crate::models::{AccountRef, Credentials, Employee, ExternalSession};
use crate::upstream::{TotalsQuery, UpstreamApi};

pub(crate) fn employee(reference: &str, name: &str) -> Employee {
    Employee {
        reference: Some(reference.to_string()),
        name: name.to_string(),
        role: None,
        department: None,
        unit: None,
    }
}

#[derive(Default)]
pub(crate) struct FakeUpstream {
    employees: Mutex<Value>,
    totals: Mutex<HashMap<String, Value>>,
    failing: Mutex<HashSet<String>>,
    delay: Duration,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub totals_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub employee_calls: AtomicUsize,
    pub grants: AtomicUsize,
}

impl FakeUpstream {
    pub const TOKEN: &'static str = "token";

    pub fn with_employees(employees: &[Employee]) -> Self {
        let upstream = Self::default();
        let listing: Vec<Value> = employees
            .iter()
            .map(|employee| json!({ "Cpf": employee.reference, "Nome": employee.name }))
            .collect();
        *upstream.employees.lock().unwrap() = Value::Array(listing);
        for reference in employees.iter().filter_map(Employee::reference) {
            upstream.set_totals(
                reference,
                json!({ "Normais": "160:00", "Ex50%": "02:00", "Ex100%": "00:00", "BSaldo": "10:00" }),
            );
        }
        upstream
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        Self { delay, ..self }
    }

    pub fn set_totals(&self, reference: &str, payload: Value) {
        self.totals
            .lock()
            .unwrap()
            .insert(reference.to_string(), payload);
    }

    pub fn fail_totals_for(&self, reference: &str) {
        self.failing.lock().unwrap().insert(reference.to_string());
    }
}

#[async_trait]
impl UpstreamApi for FakeUpstream {
    async fn request_token(&self, _: &Credentials) -> EngineResult<ExternalSession> {
        self.grants.fetch_add(1, Ordering::SeqCst);
        Ok(ExternalSession::new(Self::TOKEN))
    }

    async fn probe(&self, session: &ExternalSession) -> EngineResult<()> {
        if session.access_token() == Self::TOKEN {
            Ok(())
        } else {
            Err(EngineError::Auth {
                message: "expired".to_string(),
            })
        }
    }

    async fn list_accounts(&self, _: &ExternalSession) -> EngineResult<Vec<AccountRef>> {
        Ok(vec![AccountRef {
            id: "1024".to_string(),
            name: Some("Main".to_string()),
        }])
    }

    async fn list_employees(&self, _: &ExternalSession, _: &AccountRef) -> EngineResult<Value> {
        self.employee_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.employees.lock().unwrap().clone())
    }

    async fn fetch_totals(
        &self,
        _: &ExternalSession,
        _: &AccountRef,
        query: &TotalsQuery,
    ) -> EngineResult<Value> {
        self.totals_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.lock().unwrap().contains(&query.employee_ref) {
            return Err(EngineError::upstream("HTTP 500"));
        }
        self.totals
            .lock()
            .unwrap()
            .get(&query.employee_ref)
            .cloned()
            .ok_or_else(|| EngineError::upstream("HTTP 404"))
    }

    async fn fetch_detail(
        &self,
        _: &ExternalSession,
        _: &AccountRef,
        query: &TotalsQuery,
    ) -> EngineResult<Value> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({ "days": [{ "date": query.period_start, "worked": "08:00" }] }))
    }
}
