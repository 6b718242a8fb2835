//! Docker-backed sandbox.
//!
//! One long-lived container per conversation: started before the first
//! exchange, killed on shutdown. Commands run via `docker exec` under a
//! per-call timeout.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{info, warn};

use super::{clamp_output, failure, SandboxExecutor};

pub struct DockerSandbox {
    image: String,
    dockerfile_dir: Option<PathBuf>,
    workspace_dir: Option<PathBuf>,
    container_id: Mutex<Option<String>>,
}

impl DockerSandbox {
    pub fn new(
        image: impl Into<String>,
        dockerfile_dir: Option<PathBuf>,
        workspace_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            image: image.into(),
            dockerfile_dir,
            workspace_dir,
            container_id: Mutex::new(None),
        }
    }

    /// Start the container, building the image first if needed. Returns the
    /// short container id. Failure here is fatal: a conversation never
    /// begins without a working executor.
    pub async fn start(&self) -> Result<String> {
        self.ensure_image().await?;

        let output = Command::new("docker")
            .args(["run", "-d", "--rm", "-w", "/workspace", &self.image])
            .args(["sleep", "infinity"])
            .output()
            .await
            .context("failed to invoke docker")?;
        if !output.status.success() {
            bail!(
                "docker run failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let short = id.chars().take(12).collect::<String>();
        info!(container = %short, image = %self.image, "sandbox started");

        if let Some(workspace) = &self.workspace_dir {
            if workspace.exists() {
                let src = format!("{}/.", workspace.display());
                let dst = format!("{id}:/workspace/");
                let cp = Command::new("docker")
                    .args(["cp", &src, &dst])
                    .output()
                    .await
                    .context("failed to invoke docker cp")?;
                if !cp.status.success() {
                    bail!(
                        "failed to copy workspace into sandbox: {}",
                        String::from_utf8_lossy(&cp.stderr).trim()
                    );
                }
            }
        }

        *self.container_id.lock().await = Some(id);
        Ok(short)
    }

    /// Kill the container. Safe to call more than once.
    pub async fn shutdown(&self) {
        let Some(id) = self.container_id.lock().await.take() else {
            return;
        };
        let result = Command::new("docker").args(["kill", &id]).output().await;
        if let Err(e) = result {
            warn!("failed to kill sandbox container: {e}");
        }
    }

    /// Build the image when it is missing or its Dockerfile is newer.
    async fn ensure_image(&self) -> Result<()> {
        let Some(dockerfile_dir) = &self.dockerfile_dir else {
            return Ok(());
        };
        if !dockerfile_dir.exists() {
            bail!("dockerfile directory not found: {}", dockerfile_dir.display());
        }

        let image_time = self.image_created_time().await;
        let dockerfile_time = dockerfile_modified_time(dockerfile_dir);

        let needs_build = match (image_time, dockerfile_time) {
            (None, _) => {
                info!(image = %self.image, "sandbox image missing, building");
                true
            }
            (Some(image), Some(dockerfile)) if dockerfile > image => {
                info!(image = %self.image, "dockerfile changed, rebuilding sandbox image");
                true
            }
            _ => false,
        };
        if !needs_build {
            return Ok(());
        }

        let output = Command::new("docker")
            .args(["build", "-t", &self.image])
            .arg(dockerfile_dir)
            .output()
            .await
            .context("failed to invoke docker build")?;
        if !output.status.success() {
            bail!(
                "failed to build sandbox image: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        info!(image = %self.image, "sandbox image ready");
        Ok(())
    }

    async fn image_created_time(&self) -> Option<DateTime<Utc>> {
        let output = Command::new("docker")
            .args(["image", "inspect", "-f", "{{.Created}}", &self.image])
            .output()
            .await
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let created = String::from_utf8_lossy(&output.stdout);
        DateTime::parse_from_rfc3339(created.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

fn dockerfile_modified_time(dir: &std::path::Path) -> Option<DateTime<Utc>> {
    let metadata = std::fs::metadata(dir.join("Dockerfile")).ok()?;
    metadata.modified().ok().map(DateTime::<Utc>::from)
}

#[async_trait]
impl SandboxExecutor for DockerSandbox {
    async fn execute(&self, command: &str, limit: Duration) -> String {
        let id = match self.container_id.lock().await.clone() {
            Some(id) => id,
            None => return failure("sandbox not running"),
        };

        let mut cmd = Command::new("docker");
        cmd.args(["exec", &id, "sh", "-c", command]);
        cmd.kill_on_drop(true);

        match timeout(limit, cmd.output()).await {
            Ok(Ok(output)) => {
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));
                clamp_output(&combined)
            }
            Ok(Err(e)) => failure(format!("failed to run command: {e}")),
            Err(_) => failure(format!("command timed out after {}s", limit.as_secs())),
        }
    }
}
