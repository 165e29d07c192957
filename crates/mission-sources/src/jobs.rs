use std::time::Duration;

use async_trait::async_trait;
use mission_core::config::JobsSourceConfig;
use mission_core::{Fetched, JobSchedule, RawJobDescriptor};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Result, SourceError};
use crate::runner::{run, CommandSpec};
use crate::source::JobSource;

const FALLBACK_NAME: &str = "Scheduled Task";

/// Reads jobs from an external scheduler CLI such as `openclaw cron list --json`.
pub struct JobLister {
    command: CommandSpec,
    timeout: Duration,
}

impl JobLister {
    pub fn new(config: &JobsSourceConfig, timeout: Duration) -> Self {
        Self {
            command: CommandSpec::new(&config.command).args(config.args.iter().cloned()),
            timeout,
        }
    }
}

#[async_trait]
impl JobSource for JobLister {
    async fn list_jobs(&self) -> Fetched<RawJobDescriptor> {
        let result = async {
            let stdout = run(&self.command, self.timeout).await?;
            parse_jobs(&stdout)
        }
        .await;

        match result {
            Ok(jobs) => {
                info!(source = "jobs", count = jobs.len(), "jobs listed");
                Fetched::ok(jobs)
            }
            Err(e) => {
                warn!(source = "jobs", error = %e, "job lister failed");
                Fetched::failed()
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JobsPayload {
    List(Vec<serde_json::Value>),
    Wrapped { jobs: Vec<serde_json::Value> },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireJob {
    #[serde(alias = "id")]
    job_id: String,
    #[serde(default)]
    name: Option<String>,
    schedule: WireSchedule,
    #[serde(default)]
    payload: Option<WirePayload>,
    #[serde(default = "enabled_by_default")]
    enabled: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSchedule {
    kind: String,
    #[serde(default)]
    expr: Option<String>,
    #[serde(default)]
    every_ms: Option<i64>,
    #[serde(default)]
    tz: Option<String>,
}

#[derive(Deserialize, Default)]
struct WirePayload {
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn enabled_by_default() -> bool {
    true
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Decode lister output. Jobs that do not decode are skipped; a payload that
/// is not a job list at all is an error.
pub fn parse_jobs(stdout: &[u8]) -> Result<Vec<RawJobDescriptor>> {
    let payload: JobsPayload =
        serde_json::from_slice(stdout).map_err(|e| SourceError::Malformed(e.to_string()))?;
    let values = match payload {
        JobsPayload::List(values) | JobsPayload::Wrapped { jobs: values } => values,
    };

    let jobs = values
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| match serde_json::from_value::<WireJob>(value) {
            Ok(job) => Some(job.into_descriptor()),
            Err(e) => {
                warn!(source = "jobs", index = idx, error = %e, "skipping undecodable job");
                None
            }
        })
        .collect();
    Ok(jobs)
}

impl WireJob {
    fn into_descriptor(self) -> RawJobDescriptor {
        let payload = self.payload.unwrap_or_default();
        let name = non_empty(&self.name)
            .or_else(|| non_empty(&payload.text))
            .or_else(|| non_empty(&payload.message))
            .unwrap_or(FALLBACK_NAME)
            .to_string();
        let payload_summary = non_empty(&payload.text)
            .or_else(|| non_empty(&payload.message))
            .or_else(|| non_empty(&payload.kind))
            .unwrap_or_default()
            .to_string();

        RawJobDescriptor {
            id: self.job_id,
            name,
            schedule: self.schedule.into_schedule(),
            enabled: self.enabled,
            payload_summary,
        }
    }
}

impl WireSchedule {
    fn into_schedule(self) -> JobSchedule {
        match self.kind.as_str() {
            "cron" => JobSchedule::Cron {
                expr: self.expr.unwrap_or_default(),
                timezone: self.tz.filter(|tz| !tz.trim().is_empty()),
            },
            "every" | "interval" => match self.every_ms {
                Some(interval_ms) => JobSchedule::Interval { interval_ms },
                None => JobSchedule::Unsupported {
                    kind: self.kind,
                    expr: self.expr.unwrap_or_default(),
                },
            },
            _ => JobSchedule::Unsupported {
                kind: self.kind,
                expr: self.expr.unwrap_or_default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_array() {
        let json = br#"[
            {"jobId":"a1","name":"Backup","schedule":{"kind":"cron","expr":"0 3 * * *","tz":"Europe/London"},
             "payload":{"kind":"systemEvent","text":"run backup"},"enabled":true},
            {"jobId":"b2","schedule":{"kind":"every","everyMs":3600000},"payload":{"kind":"agentTurn","message":"check inbox"}}
        ]"#;
        let jobs = parse_jobs(json).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].name, "Backup");
        assert_eq!(
            jobs[0].schedule,
            JobSchedule::Cron {
                expr: "0 3 * * *".into(),
                timezone: Some("Europe/London".into())
            }
        );
        assert_eq!(jobs[0].payload_summary, "run backup");
        assert_eq!(jobs[1].name, "check inbox");
        assert_eq!(jobs[1].schedule, JobSchedule::Interval { interval_ms: 3_600_000 });
        assert!(jobs[1].enabled);
    }

    #[test]
    fn parses_wrapped_object_and_id_alias() {
        let json = br#"{"jobs":[{"id":"x","schedule":{"kind":"cron","expr":"*/5 * * * *"},"enabled":false}]}"#;
        let jobs = parse_jobs(json).unwrap();
        assert_eq!(jobs[0].id, "x");
        assert_eq!(jobs[0].name, FALLBACK_NAME);
        assert!(!jobs[0].enabled);
    }

    #[test]
    fn empty_name_falls_back_to_payload_text() {
        let json = br#"[{"jobId":"a","name":"","schedule":{"kind":"cron","expr":"* * * * *"},"payload":{"text":"ping"}}]"#;
        assert_eq!(parse_jobs(json).unwrap()[0].name, "ping");
    }

    #[test]
    fn undecodable_jobs_are_skipped() {
        let json = br#"[{"name":"no id","schedule":{"kind":"cron"}},{"jobId":"ok","schedule":{"kind":"at","expr":"2026-12-01"}}]"#;
        let jobs = parse_jobs(json).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].schedule.kind_name(), "at");
    }

    #[test]
    fn non_list_payload_is_malformed() {
        assert!(matches!(parse_jobs(b"{\"ok\":true}"), Err(SourceError::Malformed(_))));
        assert!(matches!(parse_jobs(b"not json"), Err(SourceError::Malformed(_))));
        assert!(matches!(parse_jobs(b""), Err(SourceError::Malformed(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_yields_failed_fetch() {
        let config = JobsSourceConfig {
            command: "sh".into(),
            args: vec!["-c".into(), "exit 1".into()],
        };
        let fetched = JobLister::new(&config, Duration::from_secs(5)).list_jobs().await;
        assert!(!fetched.ok);
        assert!(fetched.items.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn lists_jobs_from_command_output() {
        let config = JobsSourceConfig {
            command: "printf".into(),
            args: vec![r#"[{"jobId":"j","schedule":{"kind":"every","everyMs":1000}}]"#.into()],
        };
        let fetched = JobLister::new(&config, Duration::from_secs(5)).list_jobs().await;
        assert!(fetched.ok);
        assert_eq!(fetched.items[0].id, "j");
    }
}
