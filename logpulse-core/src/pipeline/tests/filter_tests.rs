use crate::pipeline::filter::{keep, run_filter};
use crate::pipeline::shutdown::CancelSignal;
use crate::pipeline::stats::PipelineStats;
use crate::pipeline::tests::test_helpers::{record, request};
use crate::pipeline::types::{Level, LogRecord};

use crossbeam_channel::bounded;
use pretty_assertions::assert_eq;
use std::thread;

#[test]
fn keeps_only_health_relevant_records() {
    let cases = [
        (record(Level::Warn, "anything", vec![]), true),
        (record(Level::Error, "anything", vec![]), true),
        (request(200), true),
        (record(Level::Info, "http request", vec![]), true),
        (record(Level::Info, "user login", vec![]), false),
        (record(Level::Info, "HTTP request", vec![]), false),
        (record(Level::Debug, "http request", vec![]), false),
        (record(Level::Other("info".to_string()), "http request", vec![]), false),
    ];

    for (record, expected) in cases {
        assert_eq!(
            keep(&record),
            expected,
            "{} {:?}",
            record.level,
            record.message
        );
    }
}

#[test]
fn run_filter_forwards_kept_records_in_order() {
    // Arrange
    let input = vec![
        request(200),
        record(Level::Debug, "noise", vec![]),
        record(Level::Warn, "w1", vec![]),
        record(Level::Info, "user login", vec![]),
        record(Level::Error, "e1", vec![]),
        request(503),
    ];
    let (in_tx, in_rx) = bounded(0);
    let (out_tx, out_rx) = bounded(0);
    let stats = PipelineStats::default();

    // Act
    let forwarded = thread::scope(|s| {
        s.spawn(|| run_filter(0, in_rx, out_tx, CancelSignal::new(), &stats));
        s.spawn(move || {
            for record in input {
                in_tx.send(record).unwrap();
            }
        });
        out_rx.iter().collect::<Vec<LogRecord>>()
    });

    // Assert
    let messages: Vec<&str> = forwarded.iter().map(|r| r.message.as_str()).collect();
    assert_eq!(messages, vec!["http request", "w1", "e1", "http request"]);
    assert_eq!(stats.snapshot().records_kept, 4);
}

#[test]
fn filtering_twice_changes_nothing() {
    let input = vec![
        request(200),
        record(Level::Debug, "noise", vec![]),
        record(Level::Warn, "w", vec![]),
        record(Level::Info, "cache hit", vec![]),
    ];

    let once: Vec<&LogRecord> = input.iter().filter(|r| keep(r)).collect();
    let twice: Vec<&LogRecord> = once.iter().copied().filter(|r| keep(r)).collect();

    assert_eq!(once, twice);
}
