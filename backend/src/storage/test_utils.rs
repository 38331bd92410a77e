//! Shared fixtures for service and storage tests

use anyhow::{bail, Result};
use async_trait::async_trait;
use shared::{ClassSession, Payment, PaymentStatus, PlanConfig, SessionStatus, Student};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::memory::MemoryBlobStore;
use super::store::{Collection, Store};
use super::traits::BlobStore;

pub fn sample_plans() -> Vec<PlanConfig> {
    [
        ("1", "Mensal - 1x/semana", 250.0),
        ("2", "Trimestral - 2x/semana", 420.0),
        ("3", "Fidelidade - 2x/semana", 380.0),
        ("4", "Anual - VIP", 650.0),
    ]
    .into_iter()
    .map(|(id, name, price)| PlanConfig {
        id: id.to_string(),
        name: name.to_string(),
        price,
    })
    .collect()
}

pub fn sample_student(id: &str, name: &str) -> Student {
    let slug = name.split_whitespace().next().unwrap_or(name).to_lowercase();
    Student {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@me.com", slug),
        phone: "(51) 98765-4321".to_string(),
        plan: "Fidelidade - 2x/semana".to_string(),
        active: true,
        join_date: "2023-10-15".to_string(),
        photo: None,
        password: None,
    }
}

pub fn sample_payment(
    id: &str,
    student_id: &str,
    due_date: &str,
    status: PaymentStatus,
) -> Payment {
    Payment {
        id: id.to_string(),
        student_id: student_id.to_string(),
        student_name: format!("Student {}", student_id),
        amount: 380.0,
        due_date: due_date.to_string(),
        status,
        last_reminder_sent: None,
    }
}

pub fn sample_session(id: &str, student_id: &str, date: &str, time: &str) -> ClassSession {
    ClassSession {
        id: id.to_string(),
        student_id: student_id.to_string(),
        student_name: format!("Student {}", student_id),
        instructor: "Roberta".to_string(),
        date: date.to_string(),
        time: time.to_string(),
        status: SessionStatus::Scheduled,
    }
}

/// A store over an in-memory blob store, seeded with the default plans and
/// the given records. The blob store is returned for persistence assertions.
pub async fn seeded_store(
    students: Vec<Student>,
    payments: Vec<Payment>,
    classes: Vec<ClassSession>,
) -> (Store, MemoryBlobStore) {
    let blobs = MemoryBlobStore::new();
    let store = Store::open(Arc::new(blobs.clone()), sample_plans())
        .await
        .expect("Failed to open test store");

    store
        .mutate(&Collection::ALL, |data| {
            data.students = students;
            data.payments = payments;
            data.classes = classes;
            Ok(())
        })
        .await
        .expect("Failed to seed test store");

    (store, blobs)
}

/// Blob store that rejects writes touching one collection while failing is
/// switched on. Loads and other writes go to the wrapped memory store; a
/// rejected batch writes nothing.
#[derive(Clone)]
pub struct FailingBlobStore {
    inner: MemoryBlobStore,
    failing_key: &'static str,
    failing: Arc<AtomicBool>,
}

impl FailingBlobStore {
    pub fn new(inner: MemoryBlobStore, failing_key: &'static str) -> Self {
        Self {
            inner,
            failing_key,
            failing: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self, collection: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) && collection == self.failing_key {
            bail!("Disk full while writing {}", collection);
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn load(&self, collection: &str) -> Result<Option<String>> {
        self.inner.load(collection).await
    }

    async fn save(&self, collection: &str, blob: &str) -> Result<()> {
        self.check(collection)?;
        self.inner.save(collection, blob).await
    }

    async fn save_all(&self, blobs: &[(&str, String)]) -> Result<()> {
        for (collection, _) in blobs {
            self.check(collection)?;
        }
        self.inner.save_all(blobs).await
    }
}
