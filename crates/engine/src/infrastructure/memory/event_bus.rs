//! In-process event bus that logs and keeps every published event.

use async_trait::async_trait;
use tokio::sync::RwLock;

use quizsprint_domain::DomainEvent;

use crate::infrastructure::ports::{EventBus, EventBusError};

#[derive(Default)]
pub struct InMemoryEventBus {
    published: RwLock<Vec<DomainEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything published so far.
    pub async fn drain(&self) -> Vec<DomainEvent> {
        std::mem::take(&mut *self.published.write().await)
    }

    pub async fn event_types(&self) -> Vec<&'static str> {
        self.published
            .read()
            .await
            .iter()
            .map(DomainEvent::event_type)
            .collect()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, events: Vec<DomainEvent>) -> Result<(), EventBusError> {
        for event in &events {
            let payload = serde_json::to_string(event).map_err(|e| EventBusError::Encode(e.to_string()))?;
            tracing::debug!(
                event_type = event.event_type(),
                occurred_at = %event.occurred_at(),
                %payload,
                "Domain event published"
            );
        }
        self.published.write().await.extend(events);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use quizsprint_domain::modes::daily::DailyQuiz;
    use quizsprint_domain::{EventSource, GameDate, QuestionId};

    use super::*;
    use crate::test_fixtures::now;

    #[tokio::test]
    async fn keeps_events_until_drained() {
        let bus = InMemoryEventBus::new();
        let mut quiz = DailyQuiz::new(
            GameDate::from_ymd(2026, 1, 25).unwrap(),
            (0..10).map(|_| QuestionId::new()).collect(),
            now(),
        )
        .unwrap();

        bus.publish(quiz.take_events()).await.unwrap();

        assert_eq!(bus.event_types().await.len(), 1);
        assert_eq!(bus.drain().await.len(), 1);
        assert!(bus.event_types().await.is_empty());
    }
}
