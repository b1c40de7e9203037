use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

pub mod scalar_collector;
pub mod table_collector;
pub mod types;

pub use table_collector::TableCollector;
pub use types::{CollectionReport, Target, TargetReport, TargetState};

use crate::config::{AppConfig, SinkKind};
use crate::error::{CollectorError, Result};
use crate::metrics::{derive_disk, derive_memory, MetricPublisher, MetricRecord, VolumeFilter};
use crate::providers::{
    DirectoryService, EnvSecretProvider, InventoryDirectory, JsonLinesSink, LogSink, MetricsSink,
    SecretProvider,
};
use crate::snmp::{walk, Agent, AgentConnector, Credentials, ObjectId, SnmpConnector, WalkResult};

/// Knobs of a collection pass.
#[derive(Debug, Clone)]
pub struct CollectorOptions {
    pub username: String,
    pub secret_id: String,
    pub tag_key: String,
    /// Bound on one connect or one walk attempt.
    pub walk_timeout: Duration,
    /// Extra attempts after a transport failure.
    pub retries: u32,
    pub concurrency: usize,
    pub memory_base: ObjectId,
    pub storage_base: ObjectId,
    pub volume_filter: VolumeFilter,
}

impl CollectorOptions {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            username: config.get_username(),
            secret_id: config.get_secret_id(),
            tag_key: config.settings.directory.tag_key.clone(),
            walk_timeout: Duration::from_secs(config.get_timeout()),
            retries: config.settings.connection.retries,
            concurrency: config.get_concurrency(),
            memory_base: config.profile.memory_base()?,
            storage_base: config.profile.storage_base()?,
            volume_filter: VolumeFilter::new(config.profile.pseudo_mounts.clone()),
        })
    }
}

/// Runs collection passes: credentials and targets once per pass, then one
/// walk → derive → publish pipeline per target on a bounded worker pool.
#[derive(Clone)]
pub struct SnmpCollector {
    secrets: Arc<dyn SecretProvider>,
    directory: Arc<dyn DirectoryService>,
    connector: Arc<dyn AgentConnector>,
    publisher: MetricPublisher,
    options: Arc<CollectorOptions>,
}

impl SnmpCollector {
    pub fn new(
        secrets: Arc<dyn SecretProvider>,
        directory: Arc<dyn DirectoryService>,
        connector: Arc<dyn AgentConnector>,
        sink: Arc<dyn MetricsSink>,
        options: CollectorOptions,
    ) -> Self {
        Self {
            secrets,
            directory,
            connector,
            publisher: MetricPublisher::new(sink),
            options: Arc::new(options),
        }
    }

    /// Wires the built-in providers and the `snmp2` connector from configuration.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let settings = &config.settings;

        let sink: Arc<dyn MetricsSink> = match settings.sink.kind {
            SinkKind::Log => Arc::new(LogSink::new()),
            SinkKind::JsonLines => {
                let path = settings
                    .sink
                    .path
                    .as_deref()
                    .context("sink.path is required for the json_lines sink")?;
                Arc::new(JsonLinesSink::new(path))
            }
        };

        let connector = SnmpConnector {
            version: settings.auth.version,
            port: config.get_port(),
            auth_protocol: settings.auth.auth_protocol,
            privacy_protocol: settings.auth.privacy_protocol,
            community: settings.auth.community.clone(),
        };

        Ok(Self::new(
            Arc::new(EnvSecretProvider),
            Arc::new(InventoryDirectory::new(&settings.directory.inventory)),
            Arc::new(connector),
            sink,
            CollectorOptions::from_config(config)?,
        ))
    }

    /// Runs one collection pass.
    ///
    /// # Errors
    ///
    /// Only [`CollectorError::SecretUnavailable`] and
    /// [`CollectorError::DirectoryUnavailable`]; everything else is recorded
    /// in the returned report.
    pub async fn collect_all(&self, cancel: CancellationToken) -> Result<CollectionReport> {
        let started_at = Utc::now();

        let password = self.secrets.get_secret(&self.options.secret_id).await?;
        let credentials = Arc::new(Credentials {
            username: self.options.username.clone(),
            password,
        });

        let targets = self.directory.list_targets(&self.options.tag_key).await?;
        if targets.is_empty() {
            tracing::warn!(tag_key = %self.options.tag_key, "no targets discovered");
        } else {
            tracing::info!(
                targets = targets.len(),
                concurrency = self.options.concurrency,
                "starting collection pass"
            );
        }

        let semaphore = Arc::new(Semaphore::new(self.options.concurrency));
        let mut tasks = Vec::with_capacity(targets.len());

        for target in targets {
            let collector = self.clone();
            let sem = Arc::clone(&semaphore);
            let credentials = Arc::clone(&credentials);
            let cancel = cancel.clone();
            let task_target = target.clone();

            let task = tokio::spawn(async move {
                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    permit = sem.acquire_owned() => permit.ok(),
                };
                let Some(_permit) = permit else {
                    return TargetReport::new(task_target, Utc::now())
                        .fail(CollectorError::Cancelled("first walk".to_string()));
                };
                collector.collect_target(task_target, &credentials, &cancel).await
            });

            tasks.push((target, task));
        }

        let mut report = CollectionReport::new(started_at);
        for (target, task) in tasks {
            match task.await {
                Ok(target_report) => report.merge(target_report),
                Err(e) => {
                    tracing::error!(target_id = %target.id, error = %e, "target pipeline aborted");
                    report.merge(
                        TargetReport::new(target, Utc::now())
                            .fail(CollectorError::Cancelled(format!("completion ({})", e))),
                    );
                }
            }
        }

        let done = report.targets.iter().filter(|t| t.is_done()).count();
        tracing::info!(
            targets = report.targets.len(),
            done,
            failed = report.targets.len() - done,
            "collection pass finished"
        );
        Ok(report)
    }

    /// Walks, derives and publishes for one target. Never fails: problems
    /// end up in the returned report.
    pub async fn collect_target(
        &self,
        target: Target,
        credentials: &Credentials,
        cancel: &CancellationToken,
    ) -> TargetReport {
        let timestamp = Utc::now();
        let mut report = TargetReport::new(target, timestamp);
        tracing::info!(
            target_id = %report.target.id,
            address = %report.target.address,
            name = %report.target.display_name,
            "collecting target"
        );

        report.advance(TargetState::WalkingMemory);
        let mut agent = match self.connect(&report.target, credentials, cancel).await {
            Ok(agent) => agent,
            Err(e) => return report.fail(e),
        };
        let memory_walk = match self
            .walk_with_retry(agent.as_mut(), &self.options.memory_base, cancel)
            .await
        {
            Ok(walk) => walk,
            Err(e) => return report.fail(e),
        };
        match derive_memory(&memory_walk) {
            Ok(records) => report.memory = records,
            Err(e) => {
                tracing::warn!(target_id = %report.target.id, error = %e, "memory metrics skipped");
                report.derivation_errors.push(e);
            }
        }

        if cancel.is_cancelled() {
            return report.fail(CollectorError::Cancelled("disk walk".to_string()));
        }

        report.advance(TargetState::WalkingDisk);
        let storage_walk = match self
            .walk_with_retry(agent.as_mut(), &self.options.storage_base, cancel)
            .await
        {
            Ok(walk) => walk,
            Err(e) => return report.fail(e),
        };

        if cancel.is_cancelled() {
            return report.fail(CollectorError::Cancelled("disk derivation".to_string()));
        }

        report.advance(TargetState::Deriving);
        let rows = TableCollector::storage_rows(&storage_walk);
        let disk = derive_disk(&rows, &self.options.volume_filter);
        for e in &disk.errors {
            tracing::warn!(target_id = %report.target.id, error = %e, "volume metrics skipped");
        }
        report.disk = disk.records;
        report.derivation_errors.extend(disk.errors);

        report.advance(TargetState::Publishing);
        let records: Vec<MetricRecord> = report
            .memory
            .iter()
            .chain(report.disk.iter())
            .cloned()
            .collect();
        report.publish = self
            .publisher
            .publish(&report.target.id, &records, timestamp, cancel)
            .await;

        report.advance(TargetState::Done);
        tracing::info!(
            target_id = %report.target.id,
            memory = report.memory.len(),
            disk = report.disk.len(),
            volumes = report.disk.len() / 2,
            storage_rows = rows.len(),
            published = report.publish.iter().filter(|o| o.is_published()).count(),
            "target collected"
        );
        report
    }

    async fn connect(
        &self,
        target: &Target,
        credentials: &Credentials,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn Agent>> {
        let limit = self.options.walk_timeout;
        let mut last_error = None;

        for attempt in 0..=self.options.retries {
            if attempt > 0 {
                if cancel.is_cancelled() {
                    return Err(CollectorError::Cancelled("reconnect".to_string()));
                }
                tracing::debug!(target_id = %target.id, attempt, "retrying connect");
            }

            match timeout(limit, self.connector.connect(&target.address, credentials)).await {
                Ok(Ok(agent)) => return Ok(agent),
                Ok(Err(e @ CollectorError::TransportFailure(_))) => last_error = Some(e),
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    last_error = Some(CollectorError::TransportFailure(format!(
                        "connect to {} timed out after {:?}",
                        target.address, limit
                    )))
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            CollectorError::TransportFailure(format!("cannot connect to {}", target.address))
        }))
    }

    async fn walk_with_retry(
        &self,
        agent: &mut dyn Agent,
        base: &ObjectId,
        cancel: &CancellationToken,
    ) -> Result<WalkResult> {
        let limit = self.options.walk_timeout;
        let mut last_error = None;

        for attempt in 0..=self.options.retries {
            if attempt > 0 {
                if cancel.is_cancelled() {
                    return Err(CollectorError::Cancelled(format!("retrying walk of {}", base)));
                }
                tracing::debug!(base = %base, attempt, "retrying walk");
            }

            match timeout(limit, walk(agent, base)).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e @ CollectorError::TransportFailure(_))) => last_error = Some(e),
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    last_error = Some(CollectorError::TransportFailure(format!(
                        "walk of {} timed out after {:?}",
                        base, limit
                    )))
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            CollectorError::TransportFailure(format!("walk of {} never attempted", base))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::publisher::testing::RecordingSink;
    use crate::snmp::walker::testing::StubAgent;
    use crate::snmp::{MemoryCounter, NextBinding, RawValue, StorageColumn, Subtree};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Default)]
    struct HostSpec {
        view: Vec<(ObjectId, RawValue)>,
        /// Error returned for any request inside the storage subtree.
        storage_error: Option<CollectorError>,
        /// Error returned for any request inside the memory subtree.
        memory_error: Option<CollectorError>,
        /// Leading requests answered with a transport failure.
        transient_failures: usize,
        /// Never answer.
        hang: bool,
        /// Requests seen inside the storage subtree, shared across clones.
        storage_requests: Arc<AtomicUsize>,
    }

    struct HostAgent {
        host: HostSpec,
        stub: StubAgent,
        failures_left: usize,
    }

    #[async_trait]
    impl Agent for HostAgent {
        async fn get_next(&mut self, oid: &ObjectId) -> Result<NextBinding> {
            if self.host.hang {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(CollectorError::TransportFailure("no response".into()));
            }
            let in_subtree = |base: ObjectId| oid == &base || oid.is_descendant_of(&base);
            if in_subtree(Subtree::Storage.base()) {
                self.host.storage_requests.fetch_add(1, Ordering::SeqCst);
                if let Some(e) = &self.host.storage_error {
                    return Err(e.clone());
                }
            }
            if in_subtree(Subtree::Memory.base()) {
                if let Some(e) = &self.host.memory_error {
                    return Err(e.clone());
                }
            }
            self.stub.get_next(oid).await
        }
    }

    #[derive(Default)]
    struct StubConnector {
        hosts: HashMap<String, HostSpec>,
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl AgentConnector for StubConnector {
        async fn connect(&self, address: &str, _credentials: &Credentials) -> Result<Box<dyn Agent>> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);

            let host = self
                .hosts
                .get(address)
                .cloned()
                .ok_or_else(|| CollectorError::TransportFailure(format!("{} unreachable", address)))?;
            Ok(Box::new(HostAgent {
                stub: StubAgent::from_bindings(host.view.clone()),
                failures_left: host.transient_failures,
                host,
            }))
        }
    }

    struct StaticSecrets(Option<String>);

    #[async_trait]
    impl SecretProvider for StaticSecrets {
        async fn get_secret(&self, secret_id: &str) -> Result<String> {
            self.0
                .clone()
                .ok_or_else(|| CollectorError::SecretUnavailable(format!("{} denied", secret_id)))
        }
    }

    struct StaticDirectory(Option<Vec<Target>>);

    #[async_trait]
    impl DirectoryService for StaticDirectory {
        async fn list_targets(&self, _tag_key: &str) -> Result<Vec<Target>> {
            self.0
                .clone()
                .ok_or_else(|| CollectorError::DirectoryUnavailable("backend error".into()))
        }
    }

    fn linux_host(total: i64, volumes: &[(u64, &str, i64, i64, i64)]) -> Vec<(ObjectId, RawValue)> {
        let mut view = vec![
            (MemoryCounter::Total.oid(), RawValue::Integer(total)),
            (MemoryCounter::Available.oid(), RawValue::Integer(total / 2)),
            (MemoryCounter::Buffered.oid(), RawValue::Integer(total / 10)),
            (MemoryCounter::Cached.oid(), RawValue::Integer(total / 10)),
            ("1.3.6.1.4.1.2021.10.1.3.1".parse().unwrap(), RawValue::Text("0.15".into())),
        ];
        for &(index, path, unit, size, used) in volumes {
            view.push((StorageColumn::Descr.oid().child(index), RawValue::Text(path.to_string())));
            view.push((StorageColumn::AllocationUnits.oid().child(index), RawValue::Integer(unit)));
            view.push((StorageColumn::Size.oid().child(index), RawValue::Integer(size)));
            view.push((StorageColumn::Used.oid().child(index), RawValue::Integer(used)));
        }
        view
    }

    fn target(id: &str) -> Target {
        Target {
            id: id.to_string(),
            address: format!("{}.example", id),
            display_name: format!("{}-name", id),
        }
    }

    fn options() -> CollectorOptions {
        CollectorOptions {
            username: "monitor".into(),
            secret_id: "snmp/password".into(),
            tag_key: "Role".into(),
            walk_timeout: Duration::from_secs(5),
            retries: 1,
            concurrency: 4,
            memory_base: Subtree::Memory.base(),
            storage_base: Subtree::Storage.base(),
            volume_filter: VolumeFilter::new(crate::config::Profile::default().pseudo_mounts),
        }
    }

    struct Fixture {
        collector: SnmpCollector,
        sink: Arc<RecordingSink>,
        connector: Arc<StubConnector>,
    }

    fn fixture(hosts: Vec<(&str, HostSpec)>, options: CollectorOptions) -> Fixture {
        let targets: Vec<Target> = hosts.iter().map(|(id, _)| target(id)).collect();
        let connector = Arc::new(StubConnector {
            hosts: hosts
                .into_iter()
                .map(|(id, host)| (target(id).address, host))
                .collect(),
            ..Default::default()
        });
        let sink = Arc::new(RecordingSink::default());
        let collector = SnmpCollector::new(
            Arc::new(StaticSecrets(Some("s3cret".into()))),
            Arc::new(StaticDirectory(Some(targets))),
            connector.clone(),
            sink.clone(),
            options,
        );
        Fixture {
            collector,
            sink,
            connector,
        }
    }

    fn healthy() -> HostSpec {
        HostSpec {
            view: linux_host(1_000_000, &[(1, "/", 4096, 1000, 250), (2, "/dev/shm", 4096, 10, 0), (3, "/opt", 1024, 100, 50)]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn disk_walk_failure_is_isolated_to_its_target() {
        let broken = HostSpec {
            storage_error: Some(CollectorError::TransportFailure("no response".into())),
            ..healthy()
        };
        let fx = fixture(vec![("i-a", healthy()), ("i-b", broken), ("i-c", healthy())], options());

        let report = fx.collector.collect_all(CancellationToken::new()).await.unwrap();

        assert_eq!(report.targets.len(), 3);
        let (a, b, c) = (&report.targets[0], &report.targets[1], &report.targets[2]);
        assert_eq!(a.state, TargetState::Done);
        assert_eq!(c.state, TargetState::Done);
        assert_eq!(a.disk.len(), 4);
        assert_eq!(c.memory.len(), 2);

        assert_eq!(b.state, TargetState::Failed);
        assert_eq!(b.failed_during, Some(TargetState::WalkingDisk));
        assert_eq!(b.failure.as_ref().map(|e| e.kind()), Some("TransportFailure"));
        assert_eq!(b.memory.len(), 2);
        assert!(b.disk.is_empty());
        assert!(b.publish.is_empty());

        let received = fx.sink.received();
        assert_eq!(received.len(), 12);
        assert!(received.iter().all(|d| !d.dimension_value.starts_with("i-b")));
        assert!(received.iter().any(|d| d.dimension_value == "i-a:/opt"));
        assert!(received.iter().any(|d| d.dimension_value == "i-c"));
    }

    #[tokio::test]
    async fn memory_protocol_failure_fails_target_during_memory_walk() {
        let denied = HostSpec {
            memory_error: Some(CollectorError::ProtocolFailure {
                status: "authorizationError".into(),
                oid: "?".into(),
            }),
            ..healthy()
        };
        let fx = fixture(vec![("i-a", denied), ("i-b", healthy())], options());

        let report = fx.collector.collect_all(CancellationToken::new()).await.unwrap();

        let a = &report.targets[0];
        assert_eq!(a.failed_during, Some(TargetState::WalkingMemory));
        assert_eq!(a.failure.as_ref().unwrap().to_string(), "authorizationError at ?");
        assert!(a.memory.is_empty());
        assert_eq!(report.targets[1].state, TargetState::Done);
    }

    #[tokio::test]
    async fn zero_memory_total_keeps_volume_metrics() {
        let odd = HostSpec {
            view: linux_host(0, &[(1, "/data", 4096, 100, 25)]),
            ..Default::default()
        };
        let fx = fixture(vec![("i-a", odd)], options());

        let report = fx.collector.collect_all(CancellationToken::new()).await.unwrap();

        let a = &report.targets[0];
        assert_eq!(a.state, TargetState::Done);
        assert!(a.memory.is_empty());
        assert_eq!(a.derivation_errors.len(), 1);
        assert_eq!(a.derivation_errors[0].kind(), "InvalidMetricInput");
        assert_eq!(a.disk.len(), 2);
        assert_eq!(a.publish.len(), 2);
        assert_eq!(report.last_publish.len(), 2);
    }

    #[tokio::test]
    async fn all_records_of_a_target_share_one_timestamp() {
        let fx = fixture(vec![("i-a", healthy())], options());

        let report = fx.collector.collect_all(CancellationToken::new()).await.unwrap();

        let received = fx.sink.received();
        assert_eq!(received.len(), 6);
        assert!(received.iter().all(|d| d.timestamp == report.targets[0].timestamp));
    }

    #[tokio::test]
    async fn hanging_agent_times_out_as_transport_failure() {
        let hung = HostSpec {
            hang: true,
            ..healthy()
        };
        let fx = fixture(
            vec![("i-a", hung), ("i-b", healthy())],
            CollectorOptions {
                walk_timeout: Duration::from_millis(50),
                retries: 0,
                ..options()
            },
        );

        let report = fx.collector.collect_all(CancellationToken::new()).await.unwrap();

        let failure = report.targets[0].failure.as_ref().unwrap();
        assert_eq!(failure.kind(), "TransportFailure");
        assert!(failure.to_string().contains("timed out"));
        assert_eq!(report.targets[1].state, TargetState::Done);
    }

    #[tokio::test]
    async fn transient_transport_failure_is_retried() {
        let flaky = HostSpec {
            transient_failures: 1,
            ..healthy()
        };
        let fx = fixture(vec![("i-a", flaky)], options());

        let report = fx.collector.collect_all(CancellationToken::new()).await.unwrap();

        assert_eq!(report.targets[0].state, TargetState::Done);
        assert_eq!(report.targets[0].memory.len(), 2);
    }

    #[tokio::test]
    async fn protocol_failure_is_not_retried() {
        let host = HostSpec {
            storage_error: Some(CollectorError::ProtocolFailure {
                status: "genErr".into(),
                oid: "1.3.6.1.2.1.25.2.3".into(),
            }),
            ..healthy()
        };
        let storage_requests = Arc::clone(&host.storage_requests);
        let fx = fixture(
            vec![("i-a", host)],
            CollectorOptions {
                retries: 5,
                ..options()
            },
        );

        let report = fx.collector.collect_all(CancellationToken::new()).await.unwrap();

        assert_eq!(report.targets[0].failure.as_ref().unwrap().kind(), "ProtocolFailure");
        assert_eq!(storage_requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transport_failure_is_retried_up_to_the_limit() {
        let host = HostSpec {
            storage_error: Some(CollectorError::TransportFailure("no response".into())),
            ..healthy()
        };
        let storage_requests = Arc::clone(&host.storage_requests);
        let fx = fixture(
            vec![("i-a", host)],
            CollectorOptions {
                retries: 2,
                ..options()
            },
        );

        let report = fx.collector.collect_all(CancellationToken::new()).await.unwrap();

        assert_eq!(report.targets[0].failure.as_ref().unwrap().kind(), "TransportFailure");
        assert_eq!(storage_requests.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn unreachable_target_fails_alone() {
        let fx = fixture(vec![("i-a", healthy())], options());
        let report = fx
            .collector
            .collect_target(target("i-zz"), &Credentials { username: "u".into(), password: "p".into() }, &CancellationToken::new())
            .await;

        assert_eq!(report.failed_during, Some(TargetState::WalkingMemory));
        assert!(report.failure.unwrap().to_string().contains("unreachable"));
    }

    #[tokio::test]
    async fn missing_secret_aborts_the_pass() {
        let fx = fixture(vec![("i-a", healthy())], options());
        let collector = SnmpCollector {
            secrets: Arc::new(StaticSecrets(None)),
            ..fx.collector
        };

        let err = collector.collect_all(CancellationToken::new()).await.unwrap_err();

        assert_eq!(err.kind(), "SecretUnavailable");
        assert!(fx.sink.received().is_empty());
    }

    #[tokio::test]
    async fn directory_outage_aborts_the_pass() {
        let fx = fixture(vec![("i-a", healthy())], options());
        let collector = SnmpCollector {
            directory: Arc::new(StaticDirectory(None)),
            ..fx.collector
        };

        let err = collector.collect_all(CancellationToken::new()).await.unwrap_err();

        assert_eq!(err.kind(), "DirectoryUnavailable");
    }

    #[tokio::test]
    async fn cancelled_pass_publishes_nothing() {
        let fx = fixture(vec![("i-a", healthy()), ("i-b", healthy())], options());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = fx.collector.collect_all(cancel).await.unwrap();

        assert!(report
            .targets
            .iter()
            .all(|t| t.failure.as_ref().map(|e| e.kind()) == Some("Cancelled")));
        assert!(fx.sink.received().is_empty());
    }

    #[tokio::test]
    async fn worker_pool_bounds_concurrent_targets() {
        let hosts: Vec<(&str, HostSpec)> = ["i-1", "i-2", "i-3", "i-4", "i-5", "i-6"]
            .into_iter()
            .map(|id| (id, healthy()))
            .collect();
        let fx = fixture(
            hosts,
            CollectorOptions {
                concurrency: 2,
                ..options()
            },
        );

        let report = fx.collector.collect_all(CancellationToken::new()).await.unwrap();

        assert!(report.targets.iter().all(|t| t.is_done()));
        assert!(fx.connector.peak.load(Ordering::SeqCst) <= 2);
    }
}
