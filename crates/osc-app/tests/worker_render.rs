//! Integration test: worker thread feeding a polling renderer.
//!
//! The render side reads the mailbox on its own schedule, lays out the spring
//! figure for whatever frame is current, and stops once the worker reports
//! completion.

use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use osc_app::{SimWorker, SpringFigure, WorkerMessage, parse_config};

const CONFIG: &str = r#"
oscillator:
  natural_frequency: 1.0
run:
  integrator: rk4
  step_size: 0.05
  step_count: 200
pacing:
  frame_delay_ms: 1
"#;

#[test]
fn renderer_sees_monotonic_frames_until_finished() {
    let config = parse_config(CONFIG).unwrap();
    let worker = SimWorker::from_config(&config).unwrap();

    let mut last_sequence = 0;
    let mut last_time = -1.0;
    let mut figures_drawn = 0;

    let report = loop {
        if let Some((sequence, frame)) = worker.mailbox().latest_with_sequence() {
            assert!(sequence >= last_sequence);
            assert!(frame.time >= last_time);
            if sequence > last_sequence {
                let figure = SpringFigure::layout(frame.position);
                assert!((0.0..=1.0).contains(&figure.travel_fraction()));
                figures_drawn += 1;
            }
            last_sequence = sequence;
            last_time = frame.time;
        }

        match worker.progress_rx.recv_timeout(Duration::from_millis(5)) {
            Ok(WorkerMessage::Finished(report)) => break report,
            Ok(WorkerMessage::Started { params, .. }) => {
                assert_eq!(params.step_count, 200);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => panic!("worker vanished"),
        }
    };

    assert!(report.is_complete());
    assert_eq!(report.samples_emitted, 200);
    assert!(figures_drawn > 0);
    assert_eq!(worker.mailbox().sequence(), 200);

    let joined = worker.join().unwrap();
    assert_eq!(joined, report);
}

#[test]
fn dropping_a_running_worker_cancels_it() {
    let mut config = parse_config(CONFIG).unwrap();
    config.run.step_count = 1_000_000;
    let worker = SimWorker::from_config(&config).unwrap();
    let mailbox = std::sync::Arc::clone(worker.mailbox());

    std::thread::sleep(Duration::from_millis(10));
    drop(worker);

    let published = mailbox.sequence();
    assert!(published < 1_000_000);
    std::thread::sleep(Duration::from_millis(10));
    assert_eq!(mailbox.sequence(), published);
}
