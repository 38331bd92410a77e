//! # Store
//!
//! In-memory home of the four studio collections, hydrated once at startup
//! from an injected [`BlobStore`] and written back through it after every
//! change. The store is a plain value shared by reference (it is cheap to
//! clone); nothing reads persistence behind its back.
//!
//! Mutations run against a draft copy. The touched collections are persisted
//! from the draft and only then swapped in, so a failed closure or a failed
//! write leaves both memory and disk at the previous state.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{ClassSession, Payment, PlanConfig, Student};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::traits::BlobStore;
use crate::domain::errors::{StudioError, StudioResult};

/// The persisted collections and their blob keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Students,
    Classes,
    Payments,
    Plans,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Students,
        Collection::Classes,
        Collection::Payments,
        Collection::Plans,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Collection::Students => "me_pilates_students",
            Collection::Classes => "me_pilates_classes",
            Collection::Payments => "me_pilates_payments",
            Collection::Plans => "me_pilates_plans",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudioData {
    pub students: Vec<Student>,
    pub classes: Vec<ClassSession>,
    pub payments: Vec<Payment>,
    pub plans: Vec<PlanConfig>,
}

impl StudioData {
    pub fn find_student(&self, student_id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == student_id)
    }

    fn to_blob(&self, collection: Collection) -> serde_json::Result<String> {
        match collection {
            Collection::Students => serde_json::to_string(&self.students),
            Collection::Classes => serde_json::to_string(&self.classes),
            Collection::Payments => serde_json::to_string(&self.payments),
            Collection::Plans => serde_json::to_string(&self.plans),
        }
    }
}

/// What a student removal took with it
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome {
    pub student: Student,
    pub payments_removed: usize,
    pub sessions_removed: usize,
}

#[derive(Clone)]
pub struct Store {
    blobs: Arc<dyn BlobStore>,
    data: Arc<RwLock<StudioData>>,
}

impl Store {
    /// Hydrate the store from `blobs`. Missing collections start empty,
    /// except plans, which are seeded with `initial_plans` and saved.
    pub async fn open(blobs: Arc<dyn BlobStore>, initial_plans: Vec<PlanConfig>) -> Result<Self> {
        let students: Vec<Student> = load_collection(blobs.as_ref(), Collection::Students)
            .await?
            .unwrap_or_default();
        let classes: Vec<ClassSession> = load_collection(blobs.as_ref(), Collection::Classes)
            .await?
            .unwrap_or_default();
        let payments: Vec<Payment> = load_collection(blobs.as_ref(), Collection::Payments)
            .await?
            .unwrap_or_default();

        let plans = match load_collection(blobs.as_ref(), Collection::Plans).await? {
            Some(plans) => plans,
            None => {
                info!("No stored plans, seeding {} default plans", initial_plans.len());
                save_collection(blobs.as_ref(), Collection::Plans, &initial_plans).await?;
                initial_plans
            }
        };

        info!(
            "Store loaded: {} students, {} classes, {} payments, {} plans",
            students.len(),
            classes.len(),
            payments.len(),
            plans.len()
        );

        Ok(Self {
            blobs,
            data: Arc::new(RwLock::new(StudioData {
                students,
                classes,
                payments,
                plans,
            })),
        })
    }

    /// Run a read-only closure against the current data
    pub async fn read<R>(&self, f: impl FnOnce(&StudioData) -> R) -> R {
        let data = self.data.read().await;
        f(&data)
    }

    /// Apply `f` to a draft, persist the `touched` collections as one batch,
    /// then commit
    pub async fn mutate<R>(
        &self,
        touched: &[Collection],
        f: impl FnOnce(&mut StudioData) -> StudioResult<R>,
    ) -> StudioResult<R> {
        let mut data = self.data.write().await;
        let mut draft = data.clone();

        let result = f(&mut draft)?;

        let mut batch = Vec::with_capacity(touched.len());
        for collection in touched {
            let blob = draft
                .to_blob(*collection)
                .with_context(|| format!("Failed to serialize {}", collection.key()))?;
            batch.push((collection.key(), blob));
        }

        self.blobs.save_all(&batch).await.with_context(|| {
            let keys: Vec<&str> = batch.iter().map(|(key, _)| *key).collect();
            format!("Failed to persist {}", keys.join(", "))
        })?;
        debug!("Persisted {} collections", batch.len());

        *data = draft;
        Ok(result)
    }

    /// Remove a student together with every payment and class session that
    /// references them
    pub async fn remove_student_cascade(&self, student_id: &str) -> StudioResult<CascadeOutcome> {
        self.mutate(
            &[Collection::Students, Collection::Classes, Collection::Payments],
            |data| {
                let position = data
                    .students
                    .iter()
                    .position(|s| s.id == student_id)
                    .ok_or_else(|| StudioError::not_found(format!("Student {}", student_id)))?;
                let student = data.students.remove(position);

                let payments_before = data.payments.len();
                data.payments.retain(|p| p.student_id != student_id);
                let sessions_before = data.classes.len();
                data.classes.retain(|c| c.student_id != student_id);

                Ok(CascadeOutcome {
                    student,
                    payments_removed: payments_before - data.payments.len(),
                    sessions_removed: sessions_before - data.classes.len(),
                })
            },
        )
        .await
    }
}

/// Load and deserialize one collection; `None` when nothing is stored
pub async fn load_collection<T: DeserializeOwned>(
    blobs: &dyn BlobStore,
    collection: Collection,
) -> Result<Option<Vec<T>>> {
    match blobs.load(collection.key()).await? {
        Some(blob) if !blob.trim().is_empty() => {
            let records = serde_json::from_str(&blob)
                .with_context(|| format!("Stored {} is not valid JSON", collection.key()))?;
            Ok(Some(records))
        }
        _ => Ok(None),
    }
}

/// Serialize and save one collection
pub async fn save_collection<T: Serialize>(
    blobs: &dyn BlobStore,
    collection: Collection,
    records: &[T],
) -> Result<()> {
    let blob = serde_json::to_string(records)?;
    blobs.save(collection.key(), &blob).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryBlobStore;
    use crate::storage::test_utils::{
        sample_payment, sample_plans, sample_session, sample_student, FailingBlobStore,
    };
    use shared::PaymentStatus;

    #[tokio::test]
    async fn test_open_seeds_plans_when_missing() {
        let blobs = MemoryBlobStore::new();
        let store = Store::open(Arc::new(blobs.clone()), sample_plans())
            .await
            .expect("Failed to open store");

        let plans = store.read(|d| d.plans.clone()).await;
        assert_eq!(plans.len(), 4);
        assert!(blobs.snapshot("me_pilates_plans").is_some());
        assert!(blobs.snapshot("me_pilates_students").is_none());
    }

    #[tokio::test]
    async fn test_open_keeps_stored_plans() {
        let blobs = MemoryBlobStore::with_blobs([(
            "me_pilates_plans",
            r#"[{"id":"9","name":"Avulsa","price":90}]"#,
        )]);
        let store = Store::open(Arc::new(blobs), sample_plans()).await.unwrap();

        let plans = store.read(|d| d.plans.clone()).await;
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].name, "Avulsa");
    }

    #[tokio::test]
    async fn test_open_rejects_corrupt_blob() {
        let blobs = MemoryBlobStore::with_blobs([("me_pilates_payments", "{not json")]);
        let result = Store::open(Arc::new(blobs), sample_plans()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mutate_persists_touched_collections() {
        let blobs = MemoryBlobStore::new();
        let store = Store::open(Arc::new(blobs.clone()), Vec::new()).await.unwrap();

        store
            .mutate(&[Collection::Students], |data| {
                data.students.push(sample_student("1", "Marina Fontoura"));
                Ok(())
            })
            .await
            .expect("Failed to mutate");

        let blob = blobs.snapshot("me_pilates_students").expect("students not persisted");
        assert!(blob.contains("Marina Fontoura"));
        assert!(blob.contains("joinDate"));
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_data_untouched() {
        let store = Store::open(Arc::new(MemoryBlobStore::new()), Vec::new()).await.unwrap();

        let result: StudioResult<()> = store
            .mutate(&[Collection::Students], |data| {
                data.students.push(sample_student("1", "Marina Fontoura"));
                Err(StudioError::validation("nope"))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(store.read(|d| d.students.len()).await, 0);
    }

    #[tokio::test]
    async fn test_remove_student_cascades() {
        let blobs = MemoryBlobStore::new();
        let store = Store::open(Arc::new(blobs.clone()), Vec::new()).await.unwrap();

        store
            .mutate(&Collection::ALL, |data| {
                data.students.push(sample_student("1", "Marina Fontoura"));
                data.students.push(sample_student("2", "Ricardo Silveira"));
                data.payments.push(sample_payment("p1", "1", "2024-05-25", PaymentStatus::Pending));
                data.payments.push(sample_payment("p2", "1", "2024-06-25", PaymentStatus::Paid));
                data.payments.push(sample_payment("p3", "2", "2024-05-25", PaymentStatus::Pending));
                data.classes.push(sample_session("c1", "1", "2024-05-20", "08:00"));
                data.classes.push(sample_session("c2", "2", "2024-05-21", "09:00"));
                Ok(())
            })
            .await
            .unwrap();

        let outcome = store.remove_student_cascade("1").await.expect("Failed to remove");
        assert_eq!(outcome.student.name, "Marina Fontoura");
        assert_eq!(outcome.payments_removed, 2);
        assert_eq!(outcome.sessions_removed, 1);

        let (students, payments, classes) = store
            .read(|d| (d.students.len(), d.payments.len(), d.classes.len()))
            .await;
        assert_eq!((students, payments, classes), (1, 1, 1));

        let payments_blob = blobs.snapshot("me_pilates_payments").unwrap();
        assert!(!payments_blob.contains("\"p1\""));
        assert!(payments_blob.contains("\"p3\""));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_memory_and_disk() {
        let blobs = MemoryBlobStore::new();
        let failing = FailingBlobStore::new(blobs.clone(), Collection::Classes.key());
        let store = Store::open(Arc::new(failing.clone()), Vec::new()).await.unwrap();

        failing.set_failing(false);
        store
            .mutate(&Collection::ALL, |data| {
                data.students.push(sample_student("1", "Marina Fontoura"));
                data.payments.push(sample_payment("p1", "1", "2024-05-25", PaymentStatus::Pending));
                data.classes.push(sample_session("c1", "1", "2024-05-20", "08:00"));
                Ok(())
            })
            .await
            .unwrap();
        failing.set_failing(true);

        let err = store.remove_student_cascade("1").await.unwrap_err();
        assert!(matches!(err, StudioError::Storage(_)));
        assert_eq!(store.read(|d| d.students.len()).await, 1);

        let reopened = Store::open(Arc::new(blobs), Vec::new()).await.unwrap();
        let counts = reopened
            .read(|d| (d.students.len(), d.payments.len(), d.classes.len()))
            .await;
        assert_eq!(counts, (1, 1, 1));
    }

    #[tokio::test]
    async fn test_remove_unknown_student() {
        let store = Store::open(Arc::new(MemoryBlobStore::new()), Vec::new()).await.unwrap();
        let err = store.remove_student_cascade("missing").await.unwrap_err();
        assert!(matches!(err, StudioError::NotFound(_)));
    }
}
