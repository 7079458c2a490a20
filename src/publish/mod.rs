//! Page synchronization with the remote CMS.

pub mod batch;
pub mod content;
pub mod engine;
pub mod transport;

pub use batch::{BatchOutcome, PublishSummary, carry_forward, publish_all};
pub use content::{ContentIssue, ContentProvider, DirectoryContentProvider, PageContent};
pub use engine::{PublishEngine, PublishHint, PublishResult, PublishStatus};
pub use transport::{HttpReply, HttpTransport, PageRequest, PageStatus, PageTransport};
