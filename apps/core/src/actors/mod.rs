//! # Actors Module
//!
//! Message-passing layer for the analysis pipeline.
//!
//! ## Components
//! - `messages`: Message enums and actor-level errors
//! - `traits`: Seams for substituting scripted actors in tests
//! - `inference`: The inference client talking to the analyze endpoint
//! - `session`: Request orchestration and latest-result ownership

pub mod inference;
pub mod messages;
pub mod session;
pub mod traits;

// Re-export main types for convenience
#[allow(unused_imports)]
pub use inference::InferenceActorHandle;
#[allow(unused_imports)]
pub use session::SessionHandle;
#[allow(unused_imports)]
pub use traits::InferenceActor;
