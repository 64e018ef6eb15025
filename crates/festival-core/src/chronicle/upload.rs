//! Chronicle upload widget.
//!
//! Uploads a batch of files and decides what happens after each one
//! completes: either the page must be reloaded, or the server's file
//! reference is attached to the surrounding form as a hidden field and the
//! file gets a copy-snippet action.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::{ChronicleFile, ChronicleStore, CopyAction, LinkBuilder};
use crate::error::{FestivalError, FestivalResult};
use crate::html;

/// What the widget does once an upload completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadMode {
    /// Attach hidden form fields and copy actions.
    #[default]
    Attach,
    /// Reload the page after every completed upload.
    Reload,
}

impl FromStr for UploadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "attach" => Ok(Self::Attach),
            "reload" => Ok(Self::Reload),
            other => Err(format!("unknown upload mode '{}' (attach, reload)", other)),
        }
    }
}

/// Client-side checks applied before a file is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    allowed_extensions: Vec<String>,
    max_bytes: u64,
}

impl UploadPolicy {
    pub fn new(allowed_extensions: Vec<String>, max_bytes: u64) -> Self {
        let allowed_extensions = allowed_extensions
            .into_iter()
            .map(|e| {
                let e = e.to_lowercase();
                if e.starts_with('.') {
                    e
                } else {
                    format!(".{}", e)
                }
            })
            .collect();
        Self {
            allowed_extensions,
            max_bytes,
        }
    }

    pub fn check(&self, file_name: &str, size: u64) -> FestivalResult<()> {
        let lower = file_name.to_lowercase();
        if !self.allowed_extensions.iter().any(|ext| lower.ends_with(ext.as_str())) {
            return Err(FestivalError::upload_rejected(
                file_name,
                format!("extension not allowed ({})", self.allowed_extensions.join(", ")),
            ));
        }
        if size > self.max_bytes {
            return Err(FestivalError::upload_rejected(
                file_name,
                format!("{} bytes exceeds the limit of {} bytes", size, self.max_bytes),
            ));
        }
        Ok(())
    }
}

/// A file waiting to be uploaded.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadRequest {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Hidden `files[]` input carrying a server file reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenField {
    pub file_name: String,
    pub reference: String,
}

impl HiddenField {
    pub fn to_html(&self) -> String {
        format!(
            "<input type='hidden' data='{}' name='files[]' value='{}'>",
            html::escape(&self.file_name),
            html::escape(&self.reference)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Uploaded { reference: String },
    Failed { reason: String },
}

/// Follow-up attached to a completed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionAction {
    CopySnippet(CopyAction),
    ReloadPage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCompletion {
    pub file_name: String,
    pub status: UploadStatus,
    pub action: CompletionAction,
}

impl UploadCompletion {
    pub fn is_success(&self) -> bool {
        matches!(self.status, UploadStatus::Uploaded { .. })
    }
}

/// Upload widget bound to one festival and user.
#[derive(Debug, Clone)]
pub struct UploadWidget {
    mode: UploadMode,
    policy: UploadPolicy,
    builder: LinkBuilder,
    festival_id: String,
    user_id: String,
    parallelism: usize,
    form: Vec<HiddenField>,
}

impl UploadWidget {
    pub fn new(
        mode: UploadMode,
        policy: UploadPolicy,
        builder: LinkBuilder,
        festival_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            mode,
            policy,
            builder,
            festival_id: festival_id.into(),
            user_id: user_id.into(),
            parallelism: 2,
            form: Vec::new(),
        }
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    pub fn mode(&self) -> UploadMode {
        self.mode
    }

    /// Hidden fields accumulated from successful uploads, in submission order.
    pub fn form_fields(&self) -> &[HiddenField] {
        &self.form
    }

    /// Upload every request and return one completion per request, in input order.
    pub async fn upload_all<S>(
        &mut self,
        store: &S,
        requests: Vec<UploadRequest>,
    ) -> Vec<UploadCompletion>
    where
        S: ChronicleStore + ?Sized,
    {
        let policy = &self.policy;
        let statuses: Vec<(String, UploadStatus)> = stream::iter(requests)
            .map(|UploadRequest { file_name, bytes }| async move {
                let status = match upload_one(store, policy, &file_name, bytes).await {
                    Ok(reference) => UploadStatus::Uploaded { reference },
                    Err(e) => {
                        warn!(file = %file_name, error = %e, "Chronicle upload failed");
                        UploadStatus::Failed {
                            reason: e.to_string(),
                        }
                    }
                };
                (file_name, status)
            })
            .buffered(self.parallelism)
            .collect()
            .await;

        statuses
            .into_iter()
            .map(|(file_name, status)| self.complete(file_name, status))
            .collect()
    }

    fn complete(&mut self, file_name: String, status: UploadStatus) -> UploadCompletion {
        let action = match self.mode {
            UploadMode::Reload => CompletionAction::ReloadPage,
            UploadMode::Attach => {
                if let UploadStatus::Uploaded { reference } = &status {
                    self.form.push(HiddenField {
                        file_name: file_name.clone(),
                        reference: reference.clone(),
                    });
                }
                let file = ChronicleFile::new(
                    file_name.as_str(),
                    self.festival_id.as_str(),
                    self.user_id.as_str(),
                );
                CompletionAction::CopySnippet(CopyAction::new(file, self.builder))
            }
        };
        UploadCompletion {
            file_name,
            status,
            action,
        }
    }
}

async fn upload_one<S>(
    store: &S,
    policy: &UploadPolicy,
    file_name: &str,
    bytes: Vec<u8>,
) -> FestivalResult<String>
where
    S: ChronicleStore + ?Sized,
{
    policy.check(file_name, bytes.len() as u64)?;
    debug!(file = %file_name, size = bytes.len(), "Uploading chronicle file");
    let reference = store.upload(file_name, bytes).await?;
    info!(file = %file_name, reference = %reference, "Chronicle file uploaded");
    Ok(reference)
}
