use crate::pipeline::failure::{FailureCause, Severity, Stage, failure_channel};
use crate::pipeline::ingest::{Ingestor, RawLines};
use crate::pipeline::shutdown::CancelSignal;
use crate::pipeline::stats::PipelineStats;
use crate::pipeline::tests::test_helpers::write_input;
use crate::pipeline::types::RawLine;

use crossbeam_channel::bounded;
use pretty_assertions::assert_eq;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::thread;

// ---------------------------
// Helpers
// ---------------------------

/// Yields `good` and then fails every read.
struct FlakyReader {
    good: Cursor<Vec<u8>>,
}

impl Read for FlakyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.good.read(buf)?;
        if n == 0 {
            return Err(io::Error::other("disk on fire"));
        }
        Ok(n)
    }
}

fn lines_of(input: &[u8]) -> Vec<Result<RawLine, FailureCause>> {
    RawLines::new(Cursor::new(input.to_vec()), "mem").collect()
}

// ---------------------------
// Tests
// ---------------------------

#[test]
fn yields_lines_in_file_order_with_line_numbers() {
    // Act
    let lines: Vec<RawLine> = lines_of(b"a\r\nb\n\n   \nc")
        .into_iter()
        .map(Result::unwrap)
        .collect();

    // Assert
    assert_eq!(
        lines,
        vec![
            RawLine {
                line_no: 1,
                text: "a".into()
            },
            RawLine {
                line_no: 2,
                text: "b".into()
            },
            RawLine {
                line_no: 5,
                text: "c".into()
            },
        ]
    );
}

#[test]
fn invalid_utf8_is_recoverable_and_iteration_continues() {
    // Act
    let items = lines_of(b"ok\n\xff\xfe\nstill ok\n");

    // Assert
    assert_eq!(items.len(), 3);
    assert!(matches!(
        &items[1],
        Err(FailureCause::InvalidUtf8 { line_no: 2 })
    ));
    assert_eq!(
        items[1].as_ref().unwrap_err().severity(),
        Severity::Recoverable
    );
    assert_eq!(items[2].as_ref().unwrap().text, "still ok");
}

#[test]
fn read_fault_is_fatal_and_ends_the_sequence() {
    // Arrange
    let reader = BufReader::new(FlakyReader {
        good: Cursor::new(b"first\n".to_vec()),
    });
    let mut lines = RawLines::new(reader, "flaky.log");

    // Act
    let first = lines.next();
    let second = lines.next();
    let third = lines.next();

    // Assert
    assert_eq!(first.unwrap().unwrap().text, "first");
    match second {
        Some(Err(cause @ FailureCause::Read { line_no: 1, .. })) => {
            assert_eq!(cause.severity(), Severity::Fatal);
        }
        other => panic!("expected read failure, got {other:?}"),
    }
    assert!(third.is_none());
}

#[test]
fn opening_missing_source_is_fatal() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let ingestor = Ingestor::new(dir.path().join("nope.log"));

    // Act
    let result = ingestor.open();

    // Assert
    match result {
        Err(cause @ FailureCause::Open { .. }) => assert_eq!(cause.severity(), Severity::Fatal),
        Err(other) => panic!("expected open failure, got {other:?}"),
        Ok(_) => panic!("expected open failure"),
    }
}

#[test]
fn run_hands_every_line_downstream_then_closes() {
    // Arrange
    let (_dir, path) = write_input(&[
        "one".to_string(),
        "two".to_string(),
        "three".to_string(),
    ]);
    let (tx, rx) = bounded(0);
    let (failures, failure_rx) = failure_channel(1);
    let stats = PipelineStats::default();

    // Act
    let received = thread::scope(|s| {
        s.spawn(|| Ingestor::new(path).run(tx, failures, CancelSignal::new(), &stats));
        rx.iter().map(|l: RawLine| l.text).collect::<Vec<_>>()
    });

    // Assert
    assert_eq!(received, vec!["one", "two", "three"]);
    assert_eq!(stats.snapshot().lines_read, 3);
    assert!(failure_rx.try_recv().is_err());
}

#[test]
fn run_reports_unreadable_source_once() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let (tx, rx) = bounded::<RawLine>(0);
    let (failures, failure_rx) = failure_channel(4);
    let stats = PipelineStats::default();

    // Act
    Ingestor::new(dir.path().join("missing.log")).run(tx, failures, CancelSignal::new(), &stats);

    // Assert
    let reported: Vec<_> = failure_rx.iter().collect();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].stage, Stage::Ingest);
    assert_eq!(reported[0].severity(), Severity::Fatal);
    assert!(rx.recv().is_err());
}

#[test]
fn run_stops_when_cancelled() {
    // Arrange
    let lines: Vec<String> = (0..100).map(|i| format!("line {i}")).collect();
    let (_dir, path) = write_input(&lines);
    let (tx, rx) = bounded::<RawLine>(0);
    let (failures, _failure_rx) = failure_channel(1);
    let cancel = CancelSignal::new();
    let stats = PipelineStats::default();

    // Act
    thread::scope(|s| {
        let worker = s.spawn(|| Ingestor::new(path).run(tx, failures, cancel.clone(), &stats));
        assert_eq!(rx.recv().unwrap().line_no, 1);
        cancel.cancel();
        worker.join().unwrap();
    });

    // Assert
    assert!(stats.snapshot().lines_read < 100);
    assert!(rx.iter().count() <= 1);
}

#[test]
fn blank_only_input_is_empty() {
    let items = lines_of(b"\n\n  \n");

    assert!(items.is_empty());
}

#[test]
fn raw_lines_accepts_any_bufread() {
    let reader: Box<dyn BufRead> = Box::new(Cursor::new(b"x\ny\n".to_vec()));

    let count = RawLines::new(reader, "boxed").count();

    assert_eq!(count, 2);
}
