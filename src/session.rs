//! Search form state machine
//!
//! [`FormState`] is an immutable snapshot of the form and of the current
//! submission. Every user action or network outcome is a [`FormEvent`], and
//! [`FormState::apply`] returns the next snapshot plus the request to send, if
//! any. [`SearchSession`] drives one submission at a time against an
//! [`OptimizerClient`].

use crate::client::OptimizerClient;
use crate::input::SearchForm;
use crate::{OptimizationResult, OptimizerError, SearchRequest};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Lifecycle of one submission: idle → pending → succeeded | failed
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending,
    Succeeded(OptimizationResult),
    Failed(String), // Message shown to the user
}

/// Something that happened to the form
#[derive(Debug)]
pub enum FormEvent {
    OriginChanged(String),
    DestinationsChanged(String),
    CurrencyChanged(String),
    Submitted,
    Resolved(Result<OptimizationResult, OptimizerError>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormState {
    pub form: SearchForm,
    pub submission: SubmissionState,
}

/// Result of applying one event
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: FormState,
    /// Set only when the event starts a new submission
    pub request: Option<SearchRequest>,
}

impl Transition {
    fn stay(state: FormState) -> Self {
        Self {
            state,
            request: None,
        }
    }
}

impl FormState {
    pub fn new(form: SearchForm) -> Self {
        Self {
            form,
            submission: SubmissionState::Idle,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.submission, SubmissionState::Pending)
    }

    /// The submit control is disabled while a request is in flight
    pub fn submit_enabled(&self) -> bool {
        !self.is_pending()
    }

    pub fn result(&self) -> Option<&OptimizationResult> {
        match &self.submission {
            SubmissionState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.submission {
            SubmissionState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Compute the next state. `self` is left untouched.
    pub fn apply(&self, event: FormEvent) -> Transition {
        let mut next = self.clone();

        match event {
            FormEvent::OriginChanged(origin) => next.form.origin = origin,
            FormEvent::DestinationsChanged(destinations) => next.form.destinations = destinations,
            FormEvent::CurrencyChanged(currency) => next.form.currency = currency,
            FormEvent::Submitted => {
                if self.is_pending() {
                    debug!("Ignoring submit while a search is pending");
                    return Transition::stay(next);
                }
                if !self.form.is_complete() {
                    debug!("Ignoring submit with incomplete form");
                    return Transition::stay(next);
                }

                // Starting a search clears the previous result or error
                next.submission = SubmissionState::Pending;
                return Transition {
                    request: Some(self.form.to_request()),
                    state: next,
                };
            }
            FormEvent::Resolved(outcome) => {
                if !self.is_pending() {
                    warn!("Ignoring search outcome with no pending search");
                    return Transition::stay(next);
                }
                next.submission = match outcome {
                    Ok(result) => SubmissionState::Succeeded(result),
                    Err(e) => SubmissionState::Failed(e.user_message()),
                };
            }
        }

        Transition::stay(next)
    }
}

/// Runs submissions against the optimizer, one at a time
pub struct SearchSession {
    client: OptimizerClient,
    in_flight: Mutex<()>,
}

impl SearchSession {
    pub fn new(client: OptimizerClient) -> Self {
        Self {
            client,
            in_flight: Mutex::new(()),
        }
    }

    /// Submit the form in `state` and wait for the outcome.
    ///
    /// `observer` sees every intermediate state (the pending one included).
    /// An incomplete form returns `state` unchanged. A second call while one
    /// is in flight fails with [`OptimizerError::Busy`]; it is not queued.
    pub async fn submit<F>(
        &self,
        state: &FormState,
        mut observer: F,
    ) -> Result<FormState, OptimizerError>
    where
        F: FnMut(&FormState),
    {
        let _guard = self.in_flight.try_lock().map_err(|_| OptimizerError::Busy)?;

        let Transition { state: pending, request } = state.apply(FormEvent::Submitted);
        let Some(request) = request else {
            return Ok(pending);
        };
        observer(&pending);

        info!(
            origin = %request.origin,
            destinations = request.destinations.len(),
            "Search started"
        );
        let outcome = self.client.optimize(&request).await;
        if let Err(e) = &outcome {
            warn!(error = %e, "Search failed");
        }

        let finished = pending.apply(FormEvent::Resolved(outcome)).state;
        observer(&finished);
        Ok(finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DestinationDetail, GENERIC_ERROR_MESSAGE};

    fn filled_form() -> FormState {
        FormState::default()
            .apply(FormEvent::OriginChanged("London".to_string()))
            .state
            .apply(FormEvent::DestinationsChanged("Paris, Berlin, Rome".to_string()))
            .state
    }

    fn sample_result() -> OptimizationResult {
        OptimizationResult {
            best_destination: "Paris".to_string(),
            price_per_km: 0.2,
            details: vec![DestinationDetail::new("Paris", "PAR", 80.0, 400.0)],
        }
    }

    #[test]
    fn test_default_state() {
        let state = FormState::default();
        assert_eq!(state.form.currency, "USD");
        assert_eq!(state.submission, SubmissionState::Idle);
        assert!(state.submit_enabled());
    }

    #[test]
    fn test_submit_builds_request_and_disables_submit() {
        let state = filled_form();
        let transition = state.apply(FormEvent::Submitted);

        let request = transition.request.expect("submit should produce a request");
        assert_eq!(request.origin, "London");
        assert_eq!(request.destinations, vec!["Paris", "Berlin", "Rome"]);
        assert_eq!(request.currency, "USD");
        assert!(transition.state.is_pending());
        assert!(!transition.state.submit_enabled());
        // Snapshot is immutable
        assert_eq!(state.submission, SubmissionState::Idle);
    }

    #[test]
    fn test_second_submit_while_pending_is_ignored() {
        let pending = filled_form().apply(FormEvent::Submitted).state;
        let again = pending.apply(FormEvent::Submitted);
        assert!(again.request.is_none());
        assert_eq!(again.state, pending);
    }

    #[test]
    fn test_incomplete_form_does_not_submit() {
        let state = FormState::default()
            .apply(FormEvent::OriginChanged("London".to_string()))
            .state;
        let transition = state.apply(FormEvent::Submitted);
        assert!(transition.request.is_none());
        assert_eq!(transition.state.submission, SubmissionState::Idle);
    }

    #[test]
    fn test_success_re_enables_submit() {
        let pending = filled_form().apply(FormEvent::Submitted).state;
        let done = pending.apply(FormEvent::Resolved(Ok(sample_result()))).state;

        assert!(done.submit_enabled());
        assert_eq!(done.result(), Some(&sample_result()));
        assert_eq!(done.error_message(), None);
    }

    #[test]
    fn test_failure_shows_remote_detail() {
        let pending = filled_form().apply(FormEvent::Submitted).state;
        let failed = pending
            .apply(FormEvent::Resolved(Err(OptimizerError::Remote {
                status: 400,
                detail: Some("X".to_string()),
            })))
            .state;

        assert!(failed.submit_enabled());
        assert_eq!(failed.error_message(), Some("X"));
        assert!(failed.result().is_none());
    }

    #[test]
    fn test_failure_without_detail_shows_fallback() {
        let pending = filled_form().apply(FormEvent::Submitted).state;
        let failed = pending
            .apply(FormEvent::Resolved(Err(OptimizerError::Remote {
                status: 502,
                detail: None,
            })))
            .state;
        assert_eq!(failed.error_message(), Some(GENERIC_ERROR_MESSAGE));
    }

    #[test]
    fn test_resubmit_after_failure_clears_error() {
        let failed = FormState {
            submission: SubmissionState::Failed("X".to_string()),
            ..filled_form()
        };
        let transition = failed.apply(FormEvent::Submitted);
        assert!(transition.request.is_some());
        assert_eq!(transition.state.error_message(), None);
        assert!(transition.state.is_pending());
    }

    #[test]
    fn test_stale_outcome_is_ignored() {
        let state = filled_form();
        let next = state.apply(FormEvent::Resolved(Ok(sample_result()))).state;
        assert_eq!(next, state);
    }

    #[test]
    fn test_editing_while_pending_keeps_pending() {
        let pending = filled_form().apply(FormEvent::Submitted).state;
        let edited = pending.apply(FormEvent::CurrencyChanged("EUR".to_string())).state;
        assert!(edited.is_pending());
        assert_eq!(edited.form.currency, "EUR");
    }

    #[tokio::test]
    async fn test_session_incomplete_form_makes_no_request() {
        let session = SearchSession::new(OptimizerClient::new("http://127.0.0.1:9").unwrap());
        let mut seen = Vec::new();
        let state = session
            .submit(&FormState::default(), |s| seen.push(s.clone()))
            .await
            .unwrap();
        assert_eq!(state, FormState::default());
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn test_session_transport_failure_ends_in_failed_state() {
        let session = SearchSession::new(OptimizerClient::new("http://127.0.0.1:9").unwrap());
        let mut seen = Vec::new();
        let state = session
            .submit(&filled_form(), |s| seen.push(s.submit_enabled()))
            .await
            .unwrap();

        assert_eq!(seen, vec![false, true]);
        assert_eq!(state.error_message(), Some(GENERIC_ERROR_MESSAGE));
    }
}
