use std::time::{Duration, Instant};

use rst_common::with_logging::log::info;

use caravel_core::identity::verifiable::credential::messages::MessageType;

use super::context::{Settings, SETTING_TRACE_LABEL};

pub const DEFAULT_TRACE_LABEL: &str = "caravel.agent";

/// `TraceTimer` brackets the duration of one handling invocation.
///
/// A handler starts the timer on entry and reuses the same timer for every
/// checkpoint it emits, so elapsed time accumulates across chained trace
/// events (the auto-response continuation reports time since handler entry,
/// not since the previous checkpoint).
#[derive(Debug, Clone)]
pub struct TraceTimer {
    started: Instant,
}

impl TraceTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Emit one timing trace event for `message_type`, tagged with the label from
/// `trace.label` (or the fixed default) and a human-readable outcome combining
/// the handler name and a named checkpoint, e.g.
/// `CredentialOfferHandler.handle.END`.
pub fn trace_event(settings: &Settings, message_type: &MessageType, outcome: &str, timer: &TraceTimer) {
    let label = settings.get(SETTING_TRACE_LABEL).unwrap_or(DEFAULT_TRACE_LABEL);

    info!(
        "[trace:{}] outcome: {} | message type: {} | elapsed: {}ms",
        label,
        outcome,
        message_type,
        timer.elapsed().as_millis()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    use caravel_core::identity::verifiable::credential::messages::{
        CredentialOffer, TypedMessage,
    };

    #[test]
    fn test_timer_accumulates() {
        let timer = TraceTimer::start();
        let first = timer.elapsed();
        let second = timer.elapsed();
        assert!(second >= first);
    }

    #[test]
    fn test_trace_event_with_default_label() {
        // only exercises the formatting path; the log sink is a no-op here
        let timer = TraceTimer::start();
        trace_event(
            &Settings::new(),
            &CredentialOffer::message_type(),
            "CredentialOfferHandler.handle.END",
            &timer,
        );
    }
}
