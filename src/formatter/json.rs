use serde::Serialize;

use crate::collector::{CollectionReport, TargetReport, TargetState};
use crate::error::ErrorInfo;
use crate::metrics::{MetricRecord, PublishOutcome};

/// JSON document printed after a pass or returned by `POST /collect`
#[derive(Debug, Clone, Serialize)]
pub struct CollectionReportJson {
    pub timestamp: String,
    pub summary: ReportSummary,
    pub targets: Vec<TargetReportJson>,
    /// Publish outcomes of the last target that reached publishing
    pub result: Vec<PublishOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_targets: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub records_derived: usize,
    pub records_published: usize,
    pub publish_failures: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetReportJson {
    pub instance_name: String,
    pub instance_ip: String,
    pub instance_id: String,
    pub state: TargetState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_during: Option<TargetState>,
    pub timestamp: String,
    pub memory: Vec<MetricRecord>,
    pub disk: Vec<MetricRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ErrorInfo>,
    pub derivation_errors: Vec<ErrorInfo>,
    pub publish: Vec<PublishOutcome>,
}

/// Renders collection reports as JSON
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format_report(report: &CollectionReport) -> CollectionReportJson {
        let targets: Vec<TargetReportJson> = report.targets.iter().map(Self::format_target).collect();

        CollectionReportJson {
            timestamp: report.started_at.to_rfc3339(),
            summary: Self::summarize(report),
            targets,
            result: report.last_publish.clone(),
        }
    }

    fn format_target(target: &TargetReport) -> TargetReportJson {
        TargetReportJson {
            instance_name: target.target.display_name.clone(),
            instance_ip: target.target.address.clone(),
            instance_id: target.target.id.clone(),
            state: target.state,
            failed_during: target.failed_during,
            timestamp: target.timestamp.to_rfc3339(),
            memory: target.memory.clone(),
            disk: target.disk.clone(),
            failure: target.failure.as_ref().map(|e| e.to_info()),
            derivation_errors: target.derivation_errors.iter().map(|e| e.to_info()).collect(),
            publish: target.publish.clone(),
        }
    }

    fn summarize(report: &CollectionReport) -> ReportSummary {
        let succeeded = report.targets.iter().filter(|t| t.is_done()).count();
        let records_derived = report
            .targets
            .iter()
            .map(|t| t.memory.len() + t.disk.len())
            .sum();
        let outcomes = report.targets.iter().flat_map(|t| t.publish.iter());
        let (published, failed): (Vec<_>, Vec<_>) = outcomes.partition(|o| o.is_published());

        ReportSummary {
            total_targets: report.targets.len(),
            succeeded,
            failed: report.targets.len() - succeeded,
            records_derived,
            records_published: published.len(),
            publish_failures: failed.len(),
        }
    }

    pub fn to_json_string(report: &CollectionReport) -> anyhow::Result<String> {
        let json = Self::format_report(report);
        serde_json::to_string_pretty(&json)
            .map_err(|e| anyhow::anyhow!("cannot serialize report: {}", e))
    }

    pub fn to_json_compact(report: &CollectionReport) -> anyhow::Result<String> {
        let json = Self::format_report(report);
        serde_json::to_string(&json).map_err(|e| anyhow::anyhow!("cannot serialize report: {}", e))
    }
}
