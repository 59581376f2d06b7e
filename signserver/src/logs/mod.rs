//! Système de logs en mémoire pour SignFleet
//!
//! Les événements `tracing` sont capturés dans un buffer circulaire partagé,
//! interrogeable via la route `/log-dump`. Le niveau minimum, la taille du
//! buffer et la sortie console sont pilotés par la configuration.

use signconfig::get_config;

use std::{
    collections::VecDeque,
    fmt::Write as _,
    sync::{Arc, RwLock},
    time::SystemTime,
};

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{
    Registry,
    filter::LevelFilter,
    layer::{Context, Layer, SubscriberExt},
    util::SubscriberInitExt,
};

/// Représente une entrée de log
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: SystemTime,
    pub level: String,
    pub target: String,
    pub message: String,
}

/// Buffer circulaire partagé
#[derive(Clone)]
pub struct LogState {
    buffer: Arc<RwLock<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl LogState {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    fn push(&self, entry: LogEntry) {
        let mut buf = self.buffer.write().unwrap();
        if buf.len() == self.capacity {
            buf.pop_front();
        }
        buf.push_back(entry);
    }

    pub fn dump(&self) -> Vec<LogEntry> {
        self.buffer.read().unwrap().iter().cloned().collect()
    }
}

/// Layer `tracing` qui copie chaque événement dans le buffer circulaire
pub struct BufferLayer {
    state: LogState,
}

impl BufferLayer {
    pub fn new(state: LogState) -> Self {
        Self { state }
    }
}

impl<S: Subscriber> Layer<S> for BufferLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        self.state.push(LogEntry {
            timestamp: SystemTime::now(),
            level: event.metadata().level().to_string(),
            target: event.metadata().target().to_string(),
            message: visitor.message,
        });
    }
}

/// Visiteur qui reconstitue le message d'un événement tracing
#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let rendered = format!("{:?}", value);
            if self.message.is_empty() {
                self.message = rendered;
            } else {
                // Le message passe devant les champs déjà enregistrés
                self.message = format!("{}{}", rendered, self.message);
            }
        } else {
            let _ = write!(self.message, " {}={:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.message, " {}={}", field.name(), value);
        }
    }
}

/// Handler REST (dump JSON du buffer)
pub async fn log_dump(State(state): State<LogState>) -> impl IntoResponse {
    Json(state.dump())
}

/// Initialise le système de logging global
///
/// Construit le subscriber `tracing` avec :
/// - un filtre de niveau minimum issu de la configuration (`host.logger.min_level`),
/// - le [`BufferLayer`] alimentant le buffer circulaire,
/// - optionnellement la sortie console (`host.logger.enable_console`).
///
/// # Returns
///
/// Le [`LogState`] à passer à la route `/log-dump`.
pub fn init_logging() -> LogState {
    let config = get_config();

    let level_filter = match config.get_log_min_level() {
        Ok(l) => match string_to_level(&l) {
            Some(lev) => LevelFilter::from_level(lev),
            None => LevelFilter::INFO,
        },
        Err(_) => LevelFilter::INFO,
    };

    let buffer_capacity = config.get_log_cache_size().unwrap_or(500);

    let log_state = LogState::new(buffer_capacity);

    // Le filtre doit être appliqué avant le BufferLayer
    let subscriber = Registry::default()
        .with(level_filter)
        .with(BufferLayer::new(log_state.clone()));

    let enable_console = config.get_log_enable_console().unwrap_or(true);

    if enable_console {
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(true),
            )
            .init();
    } else {
        subscriber.init();
    }

    log_state
}

fn string_to_level(s: &str) -> Option<Level> {
    match s.to_uppercase().as_str() {
        "ERROR" => Some(Level::ERROR),
        "WARN" => Some(Level::WARN),
        "INFO" => Some(Level::INFO),
        "DEBUG" => Some(Level::DEBUG),
        "TRACE" => Some(Level::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_wraps_at_capacity() {
        let state = LogState::new(2);
        for i in 0..3 {
            state.push(LogEntry {
                timestamp: SystemTime::now(),
                level: "INFO".to_string(),
                target: "test".to_string(),
                message: format!("entry {}", i),
            });
        }

        let dump = state.dump();
        assert_eq!(dump.len(), 2);
        assert_eq!(dump[0].message, "entry 1");
        assert_eq!(dump[1].message, "entry 2");
    }

    #[test]
    fn test_string_to_level() {
        assert_eq!(string_to_level("debug"), Some(Level::DEBUG));
        assert_eq!(string_to_level("WARN"), Some(Level::WARN));
        assert_eq!(string_to_level("verbose"), None);
    }
}
