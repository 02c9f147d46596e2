//! Review Surface (C5).
//!
//! Comments are used as progressive status panels: the orchestrator appends
//! or rewrites whole bodies rather than threading replies. Both operations
//! are thin wrappers over the PR Hosting Client (C18); per §7, failures here
//! are non-fatal and the caller is expected to log and continue rather than
//! abort the run.

use tracing::warn;

use crate::client::{CommentId, HostingClient, PrNumber};
use crate::error::HostingError;

#[derive(Debug)]
pub struct ReviewSurface<'a> {
    client: &'a HostingClient,
}

impl<'a> ReviewSurface<'a> {
    pub fn new(client: &'a HostingClient) -> Self {
        Self { client }
    }

    pub async fn create_comment(&self, pr: PrNumber, body: &str) -> Result<CommentId, HostingError> {
        self.client.create_issue_comment(pr, body).await
    }

    pub async fn update_comment(&self, id: CommentId, body: &str) -> Result<(), HostingError> {
        self.client.update_issue_comment(id, body).await
    }

    /// Best-effort variant for callers that must not abort the run when a
    /// comment update fails (§7): logs at `warn` and swallows the error.
    pub async fn update_comment_best_effort(&self, id: CommentId, body: &str) {
        if let Err(err) = self.update_comment(id, body).await {
            warn!(error = %err, "review comment update failed, continuing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HostingConfig;

    #[test]
    fn wraps_hosting_client_by_reference() {
        let cfg = HostingConfig::new("ghp_xxx", "acme", "widgets");
        let client = HostingClient::new(cfg).expect("valid client");
        let _surface = ReviewSurface::new(&client);
    }
}
