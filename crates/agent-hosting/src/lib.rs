pub mod client;
pub mod error;
pub mod pull_request;
pub mod review_surface;

pub use client::{CommentId, HostingClient, HostingConfig, PrNumber};
pub use error::{make_snippet, HostingError};
pub use pull_request::ensure_pull_request;
pub use review_surface::ReviewSurface;
