pub mod config;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod persona;
pub mod platform;
pub mod prompt;
pub mod registry;
pub mod transcript;

pub use config::{AgentConfig, CompletionConfig, PlatformConfig, Settings};
pub use error::{AgentError, CompletionError, PlatformError};
pub use llm::{Brain, CompletionService};
pub use orchestrator::{AgentOutcome, Breadcrumb, BreadcrumbLog, Breadcrumbs, NoBreadcrumbs, Orchestrator};
pub use platform::{PlatformClient, ToolPlatform};
pub use registry::{Catalog, ToolDescriptor};
