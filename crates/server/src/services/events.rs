//! In-process domain events.
//!
//! Writes that have follow-up effects publish an [`AcademyEvent`] on the
//! [`EventBus`]. Each registered [`Projection`] applies the event on a
//! background task, so the publishing request never waits for, or fails
//! because of, a projection.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{Instrument, info_span, warn};

use crate::db::RepositoryError;
use crate::models::Registration;

/// Something that happened in the academy.
#[derive(Debug, Clone)]
pub enum AcademyEvent {
    /// A public course registration was stored.
    RegistrationCreated(Registration),
}

impl AcademyEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RegistrationCreated(_) => "registration_created",
        }
    }
}

/// A read model kept up to date from events.
#[async_trait]
pub trait Projection: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Apply one event. Must be safe to apply the same event twice.
    async fn apply(&self, event: &AcademyEvent) -> Result<(), RepositoryError>;
}

/// Fan-out of events to projections.
#[derive(Clone, Default)]
pub struct EventBus {
    projections: Arc<Vec<Arc<dyn Projection>>>,
}

impl EventBus {
    #[must_use]
    pub fn new(projections: Vec<Arc<dyn Projection>>) -> Self {
        Self {
            projections: Arc::new(projections),
        }
    }

    /// Apply `event` to every projection on a background task.
    ///
    /// Failures are logged at `warn` and go no further. The handle is only
    /// useful to tests that need to wait for the projections; dropping it
    /// leaves the task running.
    pub fn publish(&self, event: AcademyEvent) -> JoinHandle<()> {
        let projections = Arc::clone(&self.projections);
        let span = info_span!("projection", event = event.name());

        tokio::spawn(
            async move {
                for projection in projections.iter() {
                    if let Err(e) = projection.apply(&event).await {
                        warn!(
                            projection = projection.name(),
                            error = %e,
                            "Projection failed"
                        );
                    }
                }
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use iqra_core::{Email, PaymentStatus, RegistrationId, RegistrationStatus};

    use super::*;

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl Projection for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn apply(&self, _event: &AcademyEvent) -> Result<(), RepositoryError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl Projection for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn apply(&self, _event: &AcademyEvent) -> Result<(), RepositoryError> {
            Err(RepositoryError::NotFound)
        }
    }

    fn event() -> AcademyEvent {
        AcademyEvent::RegistrationCreated(Registration {
            id: RegistrationId::new(1),
            name: "Alice".to_owned(),
            email: Email::parse("alice@example.com").unwrap(),
            age: 10,
            course_id: "pearls-of-juz-amma".to_owned(),
            course_name: "Pearls of Juz Amma".to_owned(),
            hifz_paras_completed: 0,
            user_id: None,
            phone: None,
            amount: 450,
            payment_status: PaymentStatus::Pending,
            status: RegistrationStatus::Pending,
            created_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn test_failing_projection_does_not_stop_others() {
        let count = Arc::new(AtomicUsize::new(0));
        let bus = EventBus::new(vec![
            Arc::new(Failing),
            Arc::new(Counting(Arc::clone(&count))),
        ]);

        bus.publish(event()).await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_bus_is_a_no_op() {
        EventBus::default().publish(event()).await.unwrap();
    }
}
