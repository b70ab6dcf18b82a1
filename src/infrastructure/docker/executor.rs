//! [`ContainerExecutor`] backed by a local Docker Engine over the Unix
//! socket (spec.md §4.7's ten-step run algorithm).

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, LogOutput, LogsOptions, RemoveContainerOptions,
    StatsOptions, WaitContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::models::HostConfig;
use bollard::Docker;
use futures::StreamExt;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::models::Task;
use crate::domain::ports::{ContainerExecutor, ContentStore, ExecutionOutcome};

use super::limits::{parse_cpu_limit, parse_memory_limit};
use super::logs::scrub;
use super::metrics::{Sample, UsageAccumulator, DEFAULT_BASE_FREQ_HZ};

/// Runs docker tasks against a local Engine API socket and meters their
/// resource consumption. One instance is shared across concurrent task runs.
pub struct BollardExecutor {
    docker: Docker,
    content_store: Arc<dyn ContentStore>,
    memory_limit: String,
    cpu_limit: String,
    timeout: Duration,
    base_freq_hz: f64,
}

impl BollardExecutor {
    pub fn new(
        docker: Docker,
        content_store: Arc<dyn ContentStore>,
        memory_limit: impl Into<String>,
        cpu_limit: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            docker,
            content_store,
            memory_limit: memory_limit.into(),
            cpu_limit: cpu_limit.into(),
            timeout: Duration::from_secs(timeout_secs),
            base_freq_hz: DEFAULT_BASE_FREQ_HZ,
        }
    }

    /// Connect to the local Docker daemon over its default Unix socket.
    pub fn connect_local(
        content_store: Arc<dyn ContentStore>,
        memory_limit: impl Into<String>,
        cpu_limit: impl Into<String>,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        let docker = Docker::connect_with_unix_defaults()?;
        Ok(Self::new(
            docker,
            content_store,
            memory_limit,
            cpu_limit,
            timeout_secs,
        ))
    }

    async fn pull_image(&self, image: &str) -> anyhow::Result<()> {
        let mut stream = self.docker.create_image(
            Some(CreateImageOptions {
                from_image: image,
                ..Default::default()
            }),
            None,
            None,
        );
        while let Some(progress) = stream.next().await {
            // A malformed progress frame from the registry is noise, not a
            // fatal condition — only a transport-level error aborts the pull.
            match progress {
                Ok(info) => debug!(image, status = ?info.status, "pulling image"),
                Err(bollard::errors::Error::JsonDataError { message, .. }) => {
                    warn!(image, %message, "skipping malformed pull progress frame");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    async fn create_container(
        &self,
        name: &str,
        image: &str,
        workdir: &str,
        command: &[String],
        env: &[String],
    ) -> anyhow::Result<String> {
        let memory = parse_memory_limit(&self.memory_limit)?;
        let nano_cpus = parse_cpu_limit(&self.cpu_limit)?;

        let host_config = HostConfig {
            memory: Some(memory),
            nano_cpus: Some(nano_cpus),
            ..Default::default()
        };
        let config = Config {
            image: Some(image.to_string()),
            cmd: Some(command.to_vec()),
            working_dir: Some(workdir.to_string()),
            env: Some(env.to_vec()),
            host_config: Some(host_config),
            ..Default::default()
        };
        let response = self
            .docker
            .create_container(
                Some(CreateContainerOptions {
                    name: name.to_string(),
                    platform: None,
                }),
                config,
            )
            .await?;
        Ok(response.id)
    }

    /// Spawn a background sampler that polls `docker stats` at the stream's
    /// natural (~1Hz) cadence and folds each sample into `accumulator`
    /// until the container it watches stops.
    fn spawn_stats_sampler(
        docker: Docker,
        container_id: String,
        accumulator: Arc<tokio::sync::Mutex<UsageAccumulator>>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut stream = docker.stats(
                &container_id,
                Some(StatsOptions {
                    stream: true,
                    one_shot: false,
                }),
            );
            let mut last = Instant::now();
            while let Some(item) = stream.next().await {
                let now = Instant::now();
                let elapsed = now.duration_since(last).as_secs_f64();
                last = now;
                let Ok(stats) = item else { continue };

                let cpu_delta = stats
                    .cpu_stats
                    .cpu_usage
                    .total_usage
                    .saturating_sub(stats.precpu_stats.cpu_usage.total_usage)
                    as f64;
                let system_delta = stats
                    .cpu_stats
                    .system_cpu_usage
                    .unwrap_or(0)
                    .saturating_sub(stats.precpu_stats.system_cpu_usage.unwrap_or(0))
                    as f64;
                let online_cpus = stats.cpu_stats.online_cpus.unwrap_or(1).max(1) as f64;
                let cpu_fraction = if system_delta > 0.0 {
                    (cpu_delta / system_delta) * online_cpus
                } else {
                    0.0
                };
                let memory_bytes = stats.memory_stats.usage.unwrap_or(0);
                let blkio_write_bytes = stats
                    .blkio_stats
                    .io_service_bytes_recursive
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|e| e.op.eq_ignore_ascii_case("write"))
                    .map(|e| e.value)
                    .sum();
                let (rx, tx) = stats
                    .networks
                    .unwrap_or_default()
                    .into_values()
                    .fold((0u64, 0u64), |(rx, tx), n| {
                        (rx + n.rx_bytes, tx + n.tx_bytes)
                    });

                accumulator.lock().await.record(Sample {
                    cpu_fraction,
                    memory_bytes,
                    blkio_write_bytes,
                    network_rx_bytes: rx,
                    network_tx_bytes: tx,
                    elapsed_since_prev_secs: elapsed,
                });
            }
        })
    }

    async fn fetch_logs(&self, container_id: &str) -> anyhow::Result<String> {
        let mut stream = self.docker.logs(
            container_id,
            Some(LogsOptions::<String> {
                stdout: true,
                stderr: true,
                ..Default::default()
            }),
        );
        let mut raw = Vec::new();
        while let Some(chunk) = stream.next().await {
            match chunk? {
                LogOutput::StdOut { message }
                | LogOutput::StdErr { message }
                | LogOutput::Console { message }
                | LogOutput::StdIn { message } => raw.extend_from_slice(&message),
            }
        }
        Ok(scrub(&raw))
    }

    async fn remove_container(&self, container_id: &str) {
        if let Err(e) = self
            .docker
            .remove_container(
                container_id,
                Some(RemoveContainerOptions {
                    force: true,
                    v: true,
                    ..Default::default()
                }),
            )
            .await
        {
            warn!(container_id, error = %e, "failed to remove container");
        }
    }
}

#[async_trait]
impl ContainerExecutor for BollardExecutor {
    async fn execute(
        &self,
        task: &Task,
        cancel: CancellationToken,
    ) -> anyhow::Result<Option<ExecutionOutcome>> {
        let environment = task.docker_environment()?;
        let config = task.docker_config()?;
        if environment.image.trim().is_empty()
            || environment.workdir.trim().is_empty()
            || config.command.is_empty()
        {
            anyhow::bail!("task {} is missing a required docker field", task.id);
        }

        if let Err(e) = self.pull_image(&environment.image).await {
            warn!(task_id = %task.id, error = %e, "image pull failed, task cannot run");
            return Ok(None);
        }

        let container_name = format!("runnerd-{}", Uuid::new_v4());
        let container_id = match self
            .create_container(
                &container_name,
                &environment.image,
                &environment.workdir,
                &config.command,
                &environment.env,
            )
            .await
        {
            Ok(id) => id,
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "container create failed");
                return Ok(None);
            }
        };

        let outcome = self.run_started_container(task, &container_id, cancel).await;
        self.remove_container(&container_id).await;
        outcome
    }
}

impl BollardExecutor {
    async fn run_started_container(
        &self,
        task: &Task,
        container_id: &str,
        cancel: CancellationToken,
    ) -> anyhow::Result<Option<ExecutionOutcome>> {
        if let Err(e) = self
            .docker
            .start_container::<String>(container_id, None)
            .await
        {
            warn!(task_id = %task.id, error = %e, "container start failed");
            return Ok(None);
        }

        let start = Instant::now();
        let accumulator = Arc::new(tokio::sync::Mutex::new(UsageAccumulator::new()));
        let sampler = Self::spawn_stats_sampler(
            self.docker.clone(),
            container_id.to_string(),
            Arc::clone(&accumulator),
        );

        let mut wait_stream = self
            .docker
            .wait_container(container_id, None::<WaitContainerOptions<String>>);

        let exit_code = tokio::select! {
            _ = cancel.cancelled() => {
                sampler.abort();
                warn!(task_id = %task.id, "task execution cancelled, force-removing container");
                return Ok(None);
            }
            outcome = wait_stream.next() => {
                match outcome {
                    Some(Ok(body)) => body.status_code,
                    Some(Err(e)) => {
                        warn!(task_id = %task.id, error = %e, "container wait errored");
                        -1
                    }
                    None => -1,
                }
            }
            _ = tokio::time::sleep(self.timeout) => {
                warn!(task_id = %task.id, timeout_secs = self.timeout.as_secs(), "task exceeded its timeout");
                -1
            }
        };
        sampler.abort();

        let execution_time_ns = start.elapsed().as_nanos() as u64;

        let (output, log_error) = match self.fetch_logs(container_id).await {
            Ok(output) => (output, None),
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "log fetch failed");
                (String::new(), Some(e.to_string()))
            }
        };

        let logs_cid = if output.is_empty() {
            None
        } else {
            match self.content_store.upload(output.as_bytes()).await {
                Ok(cid) => Some(cid),
                Err(e) => {
                    warn!(task_id = %task.id, error = %e, "log upload failed, continuing without a cid");
                    None
                }
            }
        };

        let resources = accumulator.lock().await.finish(self.base_freq_hz);

        Ok(Some(ExecutionOutcome {
            exit_code,
            output,
            execution_time_ns,
            resources,
            logs_cid,
            error: log_error,
        }))
    }
}

