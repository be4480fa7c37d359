use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use sheet_ingest::ingestion::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionOptions, IngestionSeverity,
    IngestionStats, Ingestor, SourceFormat, StdErrObserver,
};
use sheet_ingest::IngestionError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<IngestionStats>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, _ctx: &IngestionContext, stats: IngestionStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn opts(obs: Arc<RecordingObserver>, format: Option<SourceFormat>) -> IngestionOptions {
    IngestionOptions {
        format,
        observer: Some(obs),
        alert_at_or_above: IngestionSeverity::Critical,
    }
}

#[test]
fn observer_receives_stats_on_success() {
    let obs = Arc::new(RecordingObserver::default());
    let mut ingestor = Ingestor::default();
    ingestor
        .read_path("tests/fixtures/people.csv", &opts(obs.clone(), None))
        .unwrap();

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(
        successes,
        vec![IngestionStats {
            header_columns: 2,
            accepted: 3,
            rejected: 3,
        }]
    );
    assert_eq!(successes[0].severity(), IngestionSeverity::Warning);
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_failure_and_alert_on_missing_file() {
    let obs = Arc::new(RecordingObserver::default());
    let mut ingestor = Ingestor::default();

    // Missing file -> Io error -> Critical
    let _ = ingestor
        .read_path("tests/fixtures/does_not_exist.csv", &opts(obs.clone(), Some(SourceFormat::Csv)))
        .unwrap_err();
    let _ = ingestor
        .read_path("tests/fixtures/does_not_exist.xlsx", &opts(obs.clone(), None))
        .unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(failures, vec![IngestionSeverity::Critical, IngestionSeverity::Critical]);
    assert_eq!(alerts, failures);
}

#[test]
fn observer_receives_failure_without_alert_for_non_critical_error() {
    let obs = Arc::new(RecordingObserver::default());
    let mut ingestor = Ingestor::default();

    // Undecodable text -> Error severity (not Critical) -> should not alert
    let _ = ingestor
        .read_path("tests/fixtures/latin1.csv", &opts(obs.clone(), None))
        .unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn composite_fans_out_to_file_observer() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let log = std::env::temp_dir().join(format!("sheet-ingest-observer-{nanos}.log"));
    let recording = Arc::new(RecordingObserver::default());
    let observers: Vec<Arc<dyn IngestionObserver>> = vec![
        recording.clone(),
        Arc::new(FileObserver::new(&log)),
        Arc::new(StdErrObserver),
    ];
    let composite = CompositeObserver::new(observers);

    let opts = IngestionOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };
    let mut ingestor = Ingestor::default();
    ingestor.read_path("tests/fixtures/people.csv", &opts).unwrap();

    assert_eq!(recording.successes.lock().unwrap().len(), 1);
    let text = std::fs::read_to_string(&log).unwrap();
    assert!(text.contains("ok format=Csv"));
    assert!(text.contains("accepted=3 rejected=3"));

    let _ = std::fs::remove_file(&log);
}
