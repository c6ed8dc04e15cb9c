use crate::pipeline::{
    AttrValue, Attributes, HTTP_REQUEST_MESSAGE, Level, LogRecord, STATUS_ATTR,
};
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Weighted towards success so the failed rate stays realistic.
const HTTP_STATUSES: &[i64] = &[200, 200, 200, 200, 201, 204, 304, 400, 404, 500, 503];

struct SampleTemplate {
    level: Level,
    message: &'static str,
    attributes: Vec<(&'static str, AttrValue)>,
}

impl SampleTemplate {
    fn new(
        level: Level,
        message: &'static str,
        attributes: Vec<(&'static str, AttrValue)>,
    ) -> Self {
        Self {
            level,
            message,
            attributes,
        }
    }
}

fn templates() -> Vec<SampleTemplate> {
    vec![
        SampleTemplate::new(
            Level::Debug,
            "cache miss",
            vec![("key", "product:456".into())],
        ),
        SampleTemplate::new(
            Level::Debug,
            "jwt token validated",
            vec![("user_id", "u_123".into())],
        ),
        SampleTemplate::new(
            Level::Info,
            "user login",
            vec![("user_id", "u_123".into()), ("email", "john@example.com".into())],
        ),
        SampleTemplate::new(
            Level::Info,
            HTTP_REQUEST_MESSAGE,
            vec![("method", "GET".into()), ("path", "/api/users".into())],
        ),
        SampleTemplate::new(
            Level::Info,
            "cache hit",
            vec![("key", "user:123".into())],
        ),
        SampleTemplate::new(
            Level::Info,
            "user logout",
            vec![("user_id", "u_456".into())],
        ),
        SampleTemplate::new(
            Level::Warn,
            "slow query",
            vec![("duration_ms", 1500_i64.into())],
        ),
        SampleTemplate::new(
            Level::Warn,
            "high memory usage",
            vec![("current_mb", 850_i64.into())],
        ),
        SampleTemplate::new(
            Level::Warn,
            "rate limit approaching",
            vec![("requests", 95_i64.into())],
        ),
        SampleTemplate::new(
            Level::Error,
            "database query failed",
            vec![("error", "connection timeout".into())],
        ),
        SampleTemplate::new(
            Level::Error,
            "redis connection lost",
            vec![("error", "connection refused".into())],
        ),
        SampleTemplate::new(
            Level::Error,
            "payment processing failed",
            vec![("error", "card declined".into())],
        ),
        SampleTemplate::new(
            Level::Error,
            "api timeout",
            vec![("service", "payment-gateway".into())],
        ),
        SampleTemplate::new(
            Level::Error,
            "webhook delivery failed",
            vec![("error", "502 Bad Gateway".into())],
        ),
    ]
}

/// Write `count` synthetic records, one JSON object per line, spaced 1ms apart
/// from `start`.
pub fn write_sample_logs<W: Write, R: Rng>(
    mut out: W,
    count: usize,
    rng: &mut R,
    start: DateTime<Utc>,
) -> io::Result<()> {
    let templates = templates();

    for i in 0..count {
        let template = &templates[rng.random_range(0..templates.len())];

        let mut attributes: Attributes = template
            .attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        if template.message == HTTP_REQUEST_MESSAGE {
            let status = HTTP_STATUSES[rng.random_range(0..HTTP_STATUSES.len())];
            attributes.insert(STATUS_ATTR.to_string(), status.into());
        }

        let record = LogRecord {
            timestamp: (start + Duration::milliseconds(i as i64)).into(),
            level: template.level.clone(),
            message: template.message.to_string(),
            attributes,
        };

        serde_json::to_writer(&mut out, &record)?;
        out.write_all(b"\n")?;
    }

    out.flush()
}

pub fn run_generate(output: &Path, count: usize, seed: Option<u64>) -> anyhow::Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let file = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    write_sample_logs(BufWriter::new(file), count, &mut rng, Utc::now())
        .with_context(|| format!("failed to write sample logs to {}", output.display()))?;

    tracing::info!(path = %output.display(), count, "sample logs written");

    Ok(())
}
