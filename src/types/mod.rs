// ABOUTME: Validated registry identifiers.
// ABOUTME: Repository names, tag names, and manifest digests.

mod digest;
mod repository_name;
mod tag_name;

pub use digest::{Digest, DigestError};
pub use repository_name::{RepositoryName, RepositoryNameError};
pub use tag_name::{TagName, TagNameError};
