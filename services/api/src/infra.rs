use chrono::{DateTime, Utc};
use credit_oracle::config::NarrativeConfig;
use credit_oracle::scoring::{
    parse_timestamp, ApplicationId, HttpNarrativeService, NarrativeComposer, NarrativeError,
    RepositoryError, ScoreRecord, ScoreRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local score store backing the HTTP service.
#[derive(Default, Clone)]
pub(crate) struct InMemoryScoreRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ScoreRecord>>>,
    scored_applications: Arc<Mutex<BTreeSet<ApplicationId>>>,
}

impl ScoreRepository for InMemoryScoreRepository {
    fn upsert(&self, record: ScoreRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.application_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ScoreRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn mark_application_scored(&self, id: &ApplicationId) -> Result<(), RepositoryError> {
        let mut guard = self
            .scored_applications
            .lock()
            .expect("application mutex poisoned");
        guard.insert(id.clone());
        Ok(())
    }
}

#[cfg(test)]
impl InMemoryScoreRepository {
    pub(crate) fn is_scored(&self, id: &ApplicationId) -> bool {
        self.scored_applications
            .lock()
            .expect("application mutex poisoned")
            .contains(id)
    }
}

/// Template-only unless an enhancement endpoint is configured.
pub(crate) fn narrative_composer(
    config: &NarrativeConfig,
) -> Result<NarrativeComposer, NarrativeError> {
    match HttpNarrativeService::from_config(config)? {
        Some(service) => {
            info!(model = %config.model, "narrative enhancement enabled");
            Ok(NarrativeComposer::with_service(
                Arc::new(service),
                config.timeout,
            ))
        }
        None => Ok(NarrativeComposer::template_only()),
    }
}

pub(crate) fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw)
        .ok_or_else(|| format!("failed to parse '{raw}' as RFC 3339 or YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_instant_accepts_dates_and_timestamps() {
        let date = parse_instant("2025-06-30").expect("date parses");
        let stamp = parse_instant("2025-06-30T00:00:00Z").expect("timestamp parses");
        assert_eq!(date, stamp);
        assert!(parse_instant("June 30th").is_err());
    }

    #[test]
    fn unconfigured_narrative_stays_on_templates() {
        let composer = narrative_composer(&NarrativeConfig::default()).expect("builds");
        assert!(!composer.is_enhanced());
    }
}
