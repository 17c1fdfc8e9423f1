use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use super::main_resource::MainResourceStatus;
use crate::error::FactError;
use crate::network::NetworkRecord;
use crate::run::RunContext;

/// Identity of a computed fact. One cache slot per kind per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FactKind {
    NetworkRecords,
    MainResource,
    /// Facts defined by downstream consumers.
    Custom(&'static str),
}

impl FactKind {
    pub fn name(self) -> &'static str {
        match self {
            FactKind::NetworkRecords => "NetworkRecords",
            FactKind::MainResource => "MainResource",
            FactKind::Custom(name) => name,
        }
    }
}

#[derive(Clone)]
pub enum FactValue {
    NetworkRecords(Arc<Vec<NetworkRecord>>),
    MainResource(MainResourceStatus),
    Custom(Arc<dyn Any + Send + Sync>),
}

impl FactValue {
    pub fn custom<T: Any + Send + Sync>(value: T) -> Self {
        FactValue::Custom(Arc::new(value))
    }

    pub fn downcast<T: Any + Clone>(&self) -> Option<T> {
        match self {
            FactValue::Custom(value) => value.downcast_ref::<T>().cloned(),
            _ => None,
        }
    }
}

impl fmt::Debug for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::NetworkRecords(records) => {
                f.debug_tuple("NetworkRecords").field(&records.len()).finish()
            }
            FactValue::MainResource(status) => f.debug_tuple("MainResource").field(status).finish(),
            FactValue::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

pub type FactOutcome = Result<FactValue, FactError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactStatus {
    Pending,
    Resolved,
    Failed,
}

/// One kind's entry: empty while in flight, then settled for the life of the run.
#[derive(Debug, Default)]
struct FactSlot {
    outcome: OnceCell<FactOutcome>,
}

impl FactSlot {
    fn status(&self) -> FactStatus {
        match self.outcome.get() {
            None => FactStatus::Pending,
            Some(Ok(_)) => FactStatus::Resolved,
            Some(Err(_)) => FactStatus::Failed,
        }
    }
}

/// A derived value: a pure function of artifacts and other facts.
#[async_trait]
pub trait ComputedFact: Sized + Send + Sync + 'static {
    type Input: Send + Sync + ?Sized;
    type Output: Clone + Send + Sync + 'static;

    const KIND: FactKind;

    async fn compute(input: &Self::Input, ctx: &RunContext) -> Result<Self::Output, FactError>;

    fn into_value(output: Self::Output) -> FactValue;

    fn from_value(value: &FactValue) -> Option<Self::Output>;

    /// Shared entry point; consumers never build their own cache.
    async fn request(input: &Self::Input, ctx: &RunContext) -> Result<Self::Output, FactError> {
        ctx.cache().request::<Self>(input, ctx).await
    }
}

/// Per-run memo of computed facts, single-flight per kind.
///
/// The slot is registered before the computation starts, so a concurrent request for
/// the same kind attaches to the in-flight computation. Failures stay cached like values.
#[derive(Debug, Default)]
pub struct ComputedFactCache {
    slots: Mutex<HashMap<FactKind, Arc<FactSlot>>>,
    computations: AtomicUsize,
}

impl ComputedFactCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<FactKind, Arc<FactSlot>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, kind: FactKind) -> Arc<FactSlot> {
        self.lock().entry(kind).or_default().clone()
    }

    pub async fn request<F: ComputedFact>(
        &self,
        input: &F::Input,
        ctx: &RunContext,
    ) -> Result<F::Output, FactError> {
        let slot = self.slot(F::KIND);
        if slot.status() != FactStatus::Pending {
            debug!("Reusing computed fact {}", F::KIND.name());
        }

        let outcome = slot
            .outcome
            .get_or_init(|| async {
                self.computations.fetch_add(1, Ordering::SeqCst);
                debug!("Computing {} for run {}", F::KIND.name(), ctx.run_id());
                F::compute(input, ctx).await.map(F::into_value)
            })
            .await;

        match outcome {
            Ok(value) => F::from_value(value).ok_or(FactError::KindMismatch(F::KIND.name())),
            Err(e) => Err(e.clone()),
        }
    }

    pub fn status(&self, kind: FactKind) -> Option<FactStatus> {
        self.lock().get(&kind).map(|slot| slot.status())
    }

    /// Number of computations started over the cache's lifetime.
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
