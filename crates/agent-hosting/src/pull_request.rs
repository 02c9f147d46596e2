//! `ensurePullRequest`, the half of C4's contract that talks to the hosting
//! API rather than the git CLI. Kept in `agent-hosting` rather than
//! `agent-git` since it is a PR Hosting Client (C18) operation; `agent-git`'s
//! `VcsDriver` has no knowledge of REST endpoints.

use tracing::info;

use crate::client::{HostingClient, PrNumber};
use crate::error::HostingError;

/// Search for an open PR from `head` into `base`; reuse it if found, else
/// create one. Idempotent under retries — a second call with the same
/// `head`/`base` finds the PR created by the first.
pub async fn ensure_pull_request(
    client: &HostingClient,
    head: &str,
    base: &str,
    title: &str,
    body: &str,
) -> Result<PrNumber, HostingError> {
    if let Some(existing) = client.find_open_pull_request(head, base).await? {
        info!(pr = existing.0, %head, %base, "reusing existing pull request");
        return Ok(existing);
    }

    client.create_pull_request(head, base, title, body).await
}
