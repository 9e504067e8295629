//! # tracksync-renderer
//!
//! Tera-based template engine that renders the issue comments and story
//! descriptions written by the synchronizer.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tracksync_renderer::Renderer;
//! use tracksync_core::types::Story;
//!
//! fn preview(stories: &[Story]) {
//!     if let Ok(renderer) = Renderer::new() {
//!         if let Ok(body) = renderer.status_comment(stories) {
//!             println!("{body}");
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::{DescriptionContext, IssueEvent, StoryCtx, StoryListContext};
pub use engine::Renderer;
pub use error::RenderError;
