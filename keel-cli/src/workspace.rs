//! Local workspace
//!
//! A workspace is a `keel/` directory at the root of a project:
//!
//! ```text
//! keel/
//!   .workspace            application = "shop"
//!   api/manifest.toml     name = "api", type = "Backend Service", ...
//!   web/manifest.toml
//! ```
//!
//! It is found by walking up from the current directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use keel_core::domain::workload::{UnknownWorkloadKind, WorkloadKind};

/// Name of the workspace directory
pub const WORKSPACE_DIR: &str = "keel";

const SUMMARY_FILE: &str = ".workspace";
const MANIFEST_FILE: &str = "manifest.toml";

/// Workspace errors
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("no keel workspace found in {} or any parent directory", .0.display())]
    NotFound(PathBuf),

    #[error("a workspace already exists at {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("no manifest found for workload '{0}'")]
    ManifestNotFound(String),

    #[error("manifest already exists at {}, use --force to overwrite", .0.display())]
    ManifestExists(PathBuf),

    #[error("manifest {} is for workload '{found}', expected '{expected}'", .path.display())]
    NameMismatch {
        path: PathBuf,
        found: String,
        expected: String,
    },

    #[error("failed to access {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    UnknownKind(#[from] UnknownWorkloadKind),
}

type Result<T> = std::result::Result<T, WorkspaceError>;

/// Contents of `keel/.workspace`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceSummary {
    application: String,
}

/// Fields every manifest starts with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestHeader {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A workload manifest read from disk
#[derive(Debug, Clone)]
pub struct Manifest {
    pub name: String,
    pub kind: WorkloadKind,
    /// File content, sent verbatim to the deployer
    pub raw: String,
}

/// A discovered workspace
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Path of the `keel/` directory
    root: PathBuf,
    summary: WorkspaceSummary,
}

impl Workspace {
    /// Find the workspace containing `start`
    pub fn discover(start: &Path) -> Result<Self> {
        for dir in start.ancestors() {
            let root = dir.join(WORKSPACE_DIR);
            let summary_path = root.join(SUMMARY_FILE);
            if summary_path.is_file() {
                let summary: WorkspaceSummary = read_toml(&summary_path)?;
                tracing::debug!(path = %root.display(), app = %summary.application, "found workspace");
                return Ok(Self { root, summary });
            }
        }

        Err(WorkspaceError::NotFound(start.to_path_buf()))
    }

    /// Create a workspace for `app` under `project_root`
    pub fn create(project_root: &Path, app: &str) -> Result<Self> {
        let root = project_root.join(WORKSPACE_DIR);
        let summary_path = root.join(SUMMARY_FILE);
        if summary_path.exists() {
            return Err(WorkspaceError::AlreadyExists(root));
        }

        fs::create_dir_all(&root).map_err(|source| WorkspaceError::Io {
            path: root.clone(),
            source,
        })?;

        let summary = WorkspaceSummary {
            application: app.to_string(),
        };
        write_file(&summary_path, &toml::to_string(&summary)?)?;

        Ok(Self { root, summary })
    }

    /// Application this workspace belongs to
    pub fn application(&self) -> &str {
        &self.summary.application
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn manifest_path(&self, name: &str) -> PathBuf {
        self.root.join(name).join(MANIFEST_FILE)
    }

    pub fn has_manifest(&self, name: &str) -> bool {
        self.manifest_path(name).is_file()
    }

    /// Names of workloads with a manifest, sorted
    pub fn list_workloads(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|source| WorkspaceError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| WorkspaceError::Io {
                path: self.root.clone(),
                source,
            })?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if self.has_manifest(&name) {
                names.push(name);
            }
        }
        names.sort();

        Ok(names)
    }

    /// Read and check the manifest of workload `name`
    pub fn read_manifest(&self, name: &str) -> Result<Manifest> {
        let path = self.manifest_path(name);
        if !path.is_file() {
            return Err(WorkspaceError::ManifestNotFound(name.to_string()));
        }

        let raw = fs::read_to_string(&path).map_err(|source| WorkspaceError::Io {
            path: path.clone(),
            source,
        })?;
        let header: ManifestHeader =
            toml::from_str(&raw).map_err(|source| WorkspaceError::Parse {
                path: path.clone(),
                source,
            })?;

        if header.name != name {
            return Err(WorkspaceError::NameMismatch {
                path,
                found: header.name,
                expected: name.to_string(),
            });
        }

        Ok(Manifest {
            name: header.name,
            kind: header.kind.parse()?,
            raw,
        })
    }

    /// Write a starter manifest for a new workload
    ///
    /// # Returns
    /// The path of the written manifest
    pub fn write_manifest(&self, name: &str, kind: WorkloadKind, force: bool) -> Result<PathBuf> {
        let path = self.manifest_path(name);
        if path.exists() && !force {
            return Err(WorkspaceError::ManifestExists(path));
        }

        let dir = self.root.join(name);
        fs::create_dir_all(&dir).map_err(|source| WorkspaceError::Io { path: dir, source })?;
        write_file(&path, &manifest_template(name, kind))?;

        Ok(path)
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|source| WorkspaceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| WorkspaceError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|source| WorkspaceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Starter manifest content for `kind`
fn manifest_template(name: &str, kind: WorkloadKind) -> String {
    let mut manifest = format!("name = \"{name}\"\ntype = \"{kind}\"\n\ncpu = 256\nmemory = 512\n");
    manifest.push_str(if kind.is_job() { "retries = 0\n" } else { "count = 1\n" });
    manifest.push_str(&format!("\n[image]\nbuild = \"{name}/Dockerfile\"\n"));

    manifest.push_str(match kind {
        WorkloadKind::LoadBalancedWebService | WorkloadKind::RequestDrivenWebService => {
            "port = 8080\n\n[http]\npath = \"/\"\nhealthcheck = \"/\"\n"
        }
        WorkloadKind::BackendService => "port = 8080\n",
        WorkloadKind::WorkerService => "\n[subscribe]\ntopics = []\n",
        WorkloadKind::ScheduledJob => "\n[on]\nschedule = \"@daily\"\n",
    });

    manifest
}
