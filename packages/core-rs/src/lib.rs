//! Simulated file-risk scanner for demos and teaching.
//!
//! Nothing here reads file contents or detects real malware: scores, verdicts and
//! hashes are synthetic and every user-facing verdict says so.

pub mod advisory;
pub mod chat;
pub mod error;
pub mod format;
pub mod hash;
pub mod risk;
pub mod session;
pub mod stream;
pub mod types;
pub mod verdict;

pub use advisory::*;
pub use chat::*;
pub use error::*;
pub use format::*;
pub use hash::*;
pub use risk::*;
pub use session::*;
pub use stream::*;
pub use types::*;
pub use verdict::*;
