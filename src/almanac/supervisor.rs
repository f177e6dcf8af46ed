use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use parking_lot::Mutex;

use crate::almanac::config::{AlmanacConfig, CompositionStrategy, PhotoSource};
use crate::almanac::types::{LunarObservation, SkyPhotograph};
use crate::almanac::{apod, geocode, lunar, photo};
use crate::error::{FetchError, Result};
use crate::gemini::client::{GeminiClient, TextGenerator};

/// The (location, date) pair that triggered a fetch. All in-flight work is
/// keyed by this value; completions whose key is no longer current are
/// dropped instead of overwriting newer state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub location: String,
    pub date: NaiveDate,
}

/// Lifecycle of one independently failable fetch slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Default for SlotState<T> {
    fn default() -> Self {
        SlotState::Idle
    }
}

impl<T> SlotState<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, SlotState::Ready(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            SlotState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SlotState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Immutable snapshot of the current intent and its derived results, for the
/// presentation layer to render.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlmanacSnapshot {
    pub key: Option<FetchKey>,
    pub facts: SlotState<LunarObservation>,
    pub photograph: SlotState<SkyPhotograph>,
}

/// Drives the two fetch stages for the latest (location, date) input.
///
/// Each `refresh` takes a monotonic ticket; a completion only commits while
/// its ticket is still the newest, so a stale in-flight response can never
/// clobber the state of a later fetch.
pub struct Supervisor {
    model: Arc<dyn TextGenerator>,
    http: reqwest::Client,
    config: AlmanacConfig,
    snapshot: Mutex<AlmanacSnapshot>,
    ticket: AtomicU64,
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("config", &self.config)
            .field("snapshot", &self.snapshot)
            .field("ticket", &self.ticket)
            .finish()
    }
}

impl Supervisor {
    pub fn new(model: Arc<dyn TextGenerator>, config: AlmanacConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            model,
            http,
            config,
            snapshot: Mutex::new(AlmanacSnapshot::default()),
            ticket: AtomicU64::new(0),
        })
    }

    /// Convenience constructor wiring the configured model client.
    pub fn with_gemini(config: AlmanacConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| FetchError::Config("model credential is not set".to_string()))?;
        let model = GeminiClient::new(api_key, config.model.clone(), config.request_timeout)?;
        Self::new(Arc::new(model), config)
    }

    pub fn snapshot(&self) -> AlmanacSnapshot {
        self.snapshot.lock().clone()
    }

    /// Fetch facts and photograph for a new (location, date) input and
    /// return the resulting snapshot. Safe to call concurrently; the newest
    /// call wins.
    pub async fn refresh(&self, location: &str, date: NaiveDate) -> AlmanacSnapshot {
        let key = FetchKey {
            location: location.trim().to_string(),
            date,
        };
        let ticket = self.ticket.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut snap = self.snapshot.lock();
            snap.key = Some(key.clone());
            snap.facts = SlotState::Loading;
            snap.photograph = match self.config.strategy {
                CompositionStrategy::Dependent => SlotState::Idle,
                _ => SlotState::Loading,
            };
        }

        match self.config.strategy {
            CompositionStrategy::Dependent => self.run_dependent(&key, ticket).await,
            CompositionStrategy::ParallelIndependent => {
                self.run_parallel_independent(&key, ticket).await
            }
            CompositionStrategy::ParallelJoined => self.run_parallel_joined(&key, ticket).await,
        }

        self.snapshot()
    }

    async fn fetch_facts(&self, key: &FetchKey) -> Result<LunarObservation> {
        let coords = geocode::resolve_location(self.model.as_ref(), &key.location).await?;
        lunar::fetch_observation(
            self.model.as_ref(),
            coords,
            key.date,
            self.config.web_search,
            self.config.response_schema,
            self.config.illumination,
        )
        .await
    }

    async fn fetch_photograph(&self, key: &FetchKey) -> Result<SkyPhotograph> {
        match self.config.photo_source {
            PhotoSource::Model => {
                photo::fetch_photograph(self.model.as_ref(), key.date, self.config.response_schema)
                    .await
            }
            PhotoSource::ImageOfTheDay => {
                apod::fetch_photo_of_the_day(
                    &self.http,
                    &self.config.apod_url,
                    &self.config.apod_api_key,
                )
                .await
            }
        }
    }

    /// Apply a state change unless a newer refresh has started.
    fn commit(&self, ticket: u64, apply: impl FnOnce(&mut AlmanacSnapshot)) -> bool {
        let mut snap = self.snapshot.lock();
        if self.ticket.load(Ordering::SeqCst) != ticket {
            log::debug!("dropping stale fetch result (ticket {ticket})");
            return false;
        }
        apply(&mut snap);
        true
    }

    async fn run_dependent(&self, key: &FetchKey, ticket: u64) {
        match self.fetch_facts(key).await {
            Ok(facts) => {
                let committed = self.commit(ticket, |snap| {
                    snap.facts = SlotState::Ready(facts);
                    snap.photograph = SlotState::Loading;
                });
                if !committed {
                    return;
                }
            }
            Err(err) => {
                log::warn!("facts fetch failed for {:?}: {err}", key.location);
                let message = err.user_message().to_string();
                self.commit(ticket, |snap| snap.facts = SlotState::Failed(message));
                return;
            }
        }

        match self.fetch_photograph(key).await {
            Ok(photograph) => {
                self.commit(ticket, |snap| {
                    snap.photograph = SlotState::Ready(photograph);
                });
            }
            Err(err) => {
                // Silent to the user: the panel stays empty, facts stay up.
                log::warn!("photograph fetch failed: {err}");
                self.commit(ticket, |snap| {
                    snap.photograph = SlotState::Failed(err.user_message().to_string());
                });
            }
        }
    }

    async fn run_parallel_independent(&self, key: &FetchKey, ticket: u64) {
        let (facts, photograph) =
            tokio::join!(self.fetch_facts(key), self.fetch_photograph(key));

        match facts {
            Ok(value) => {
                self.commit(ticket, |snap| snap.facts = SlotState::Ready(value));
            }
            Err(err) => {
                log::warn!("facts fetch failed for {:?}: {err}", key.location);
                let message = err.user_message().to_string();
                self.commit(ticket, |snap| snap.facts = SlotState::Failed(message));
            }
        }

        match photograph {
            Ok(value) => {
                self.commit(ticket, |snap| snap.photograph = SlotState::Ready(value));
            }
            Err(err) => {
                log::warn!("photograph fetch failed: {err}");
                self.commit(ticket, |snap| {
                    snap.photograph = SlotState::Failed(err.user_message().to_string());
                });
            }
        }
    }

    async fn run_parallel_joined(&self, key: &FetchKey, ticket: u64) {
        match futures::future::try_join(self.fetch_facts(key), self.fetch_photograph(key)).await {
            Ok((facts, photograph)) => {
                self.commit(ticket, |snap| {
                    snap.facts = SlotState::Ready(facts);
                    snap.photograph = SlotState::Ready(photograph);
                });
            }
            Err(err) => {
                log::warn!("joined fetch failed for {:?}: {err}", key.location);
                let message = err.user_message().to_string();
                self.commit(ticket, |snap| {
                    snap.facts = SlotState::Failed(message.clone());
                    snap.photograph = SlotState::Failed(message);
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SlotState, Supervisor};
    use crate::almanac::config::AlmanacConfig;
    use crate::error::FetchError;

    #[test]
    fn with_gemini_requires_a_credential() {
        let err = Supervisor::with_gemini(AlmanacConfig::default()).unwrap_err();
        assert!(matches!(err, FetchError::Config(_)));
    }

    #[test]
    fn slot_accessors_follow_the_state() {
        let ready: SlotState<u32> = SlotState::Ready(7);
        assert!(ready.is_ready());
        assert_eq!(ready.value(), Some(&7));
        assert_eq!(ready.error(), None);

        let failed: SlotState<u32> = SlotState::Failed("nope".to_string());
        assert!(!failed.is_ready());
        assert_eq!(failed.error(), Some("nope"));

        assert_eq!(SlotState::<u32>::default(), SlotState::Idle);
    }
}
