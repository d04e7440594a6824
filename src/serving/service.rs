//! Request handling on top of the reloader and the live index.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::reloader::Reloader;
use super::store::LoadedModel;
use crate::error::{RequestError, ServeError, SnapshotError};

/// Default cap on the number of recommended items per response.
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Version string reported with every response.
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Body of a recommend call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub songs: Option<Vec<String>>,
}

impl RecommendRequest {
    pub fn new<I, S>(songs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            songs: Some(songs.into_iter().map(Into::into).collect()),
        }
    }

    /// Decode a JSON body. A `songs` value that is not a list of strings is
    /// reported like an empty list.
    pub fn from_json(body: &[u8]) -> Result<Self, RequestError> {
        let value: Value = serde_json::from_slice(body).map_err(|err| RequestError::Malformed {
            reason: err.to_string(),
        })?;
        let Value::Object(mut fields) = value else {
            return Err(RequestError::Malformed {
                reason: "expected a JSON object".into(),
            });
        };
        let songs = match fields.remove("songs") {
            None | Some(Value::Null) => None,
            Some(songs) => {
                Some(serde_json::from_value(songs).map_err(|_| RequestError::EmptySongs)?)
            }
        };
        Ok(Self { songs })
    }

    /// The requested songs, or why there are none.
    pub fn songs(&self) -> Result<&[String], RequestError> {
        match self.songs.as_deref() {
            None => Err(RequestError::MissingSongs),
            Some([]) => Err(RequestError::EmptySongs),
            Some(songs) => Ok(songs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub songs: Vec<String>,
    pub version: String,
    pub model_date: String,
}

/// Liveness summary of the serving side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub version: String,
    pub model_loaded: bool,
    pub generation: Option<u64>,
    pub rules: Option<usize>,
    pub model_date: Option<String>,
    pub rebuilds: u64,
}

/// Answers recommend calls, refreshing the model first when it changed.
pub struct RecommendService {
    reloader: Arc<Reloader>,
    version: String,
    max_results: usize,
}

impl RecommendService {
    pub fn new(reloader: Arc<Reloader>) -> Self {
        Self {
            reloader,
            version: SERVICE_VERSION.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn reloader(&self) -> &Arc<Reloader> {
        &self.reloader
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Reload if needed, then answer `request` from the live model.
    pub fn recommend(&self, request: &RecommendRequest) -> Result<RecommendResponse, ServeError> {
        let model = self.live_model()?;
        self.answer(&model, request.songs()?)
    }

    /// Like [`recommend`](Self::recommend) for a raw JSON body. The body is
    /// only decoded once a model is available.
    pub fn recommend_json(&self, body: &[u8]) -> Result<RecommendResponse, ServeError> {
        let model = self.live_model()?;
        let request = RecommendRequest::from_json(body)?;
        self.answer(&model, request.songs()?)
    }

    pub fn health(&self) -> HealthReport {
        let model = self.reloader.store().current();
        HealthReport {
            status: if model.is_some() { "ok" } else { "no_model" }.to_string(),
            version: self.version.clone(),
            model_loaded: model.is_some(),
            generation: model.as_ref().map(|m| m.generation()),
            rules: model.as_ref().map(|m| m.index().rule_count()),
            model_date: model.as_ref().map(|m| m.snapshot().metadata().model_date()),
            rebuilds: self.reloader.rebuild_count(),
        }
    }

    fn live_model(&self) -> Result<Arc<LoadedModel>, ServeError> {
        let failure = match self.reloader.maybe_reload() {
            Ok(_) => None,
            Err(err) => {
                if matches!(err, SnapshotError::Rejected { .. }) {
                    debug!(error = %err, "model reload still failing");
                } else {
                    warn!(error = %err, "model reload failed");
                }
                Some(err)
            }
        };

        self.reloader
            .store()
            .current()
            .ok_or_else(|| ServeError::Unavailable {
                reason: failure.map_or_else(|| "no model loaded".to_string(), |err| err.to_string()),
            })
    }

    fn answer(&self, model: &LoadedModel, songs: &[String]) -> Result<RecommendResponse, ServeError> {
        let songs: Vec<String> = model
            .index()
            .recommend(songs, self.max_results)
            .into_iter()
            .map(|item| item.into_inner())
            .collect();
        debug!(results = songs.len(), generation = model.generation(), "recommendation served");
        Ok(RecommendResponse {
            songs,
            version: self.version.clone(),
            model_date: model.snapshot().metadata().model_date(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_songs() {
        let request = RecommendRequest::from_json(br#"{"songs": ["a", "b"]}"#).unwrap();
        assert_eq!(request.songs().unwrap(), ["a", "b"]);
    }

    #[test]
    fn missing_and_empty_songs_are_distinct() {
        let missing = RecommendRequest::from_json(br#"{"other": 1}"#).unwrap();
        assert_eq!(missing.songs(), Err(RequestError::MissingSongs));

        let null = RecommendRequest::from_json(br#"{"songs": null}"#).unwrap();
        assert_eq!(null.songs(), Err(RequestError::MissingSongs));

        let empty = RecommendRequest::from_json(br#"{"songs": []}"#).unwrap();
        assert_eq!(empty.songs(), Err(RequestError::EmptySongs));
    }

    #[test]
    fn non_list_songs_rejected() {
        assert_eq!(
            RecommendRequest::from_json(br#"{"songs": "a"}"#),
            Err(RequestError::EmptySongs)
        );
    }

    #[test]
    fn malformed_bodies_rejected() {
        assert!(matches!(
            RecommendRequest::from_json(b"not json"),
            Err(RequestError::Malformed { .. })
        ));
        assert!(matches!(
            RecommendRequest::from_json(b"[1, 2]"),
            Err(RequestError::Malformed { .. })
        ));
    }
}
