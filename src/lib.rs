//! # tcad
//!
//! Download the artifacts of a TeamCity build into a local directory tree.
//!
//! A sync run reads the build's artifact manifest (`teamcity-ivy.xml`), drops
//! the server-generated hidden artifacts and anything not matching a wildcard
//! pattern, and downloads the rest one at a time, keeping or flattening the
//! remote folder structure.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tcad::{ArtifactDownloader, NoPrompt, SyncConfig, SyncReport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SyncConfig {
//!         url: "https://ci.example.com".to_string(),
//!         build_type: "Product_Release".to_string(),
//!         glob: "*.zip".to_string(),
//!         username: Some("builder".to_string()),
//!         password: Some("secret".to_string()),
//!         ..Default::default()
//!     };
//!
//!     let downloader = ArtifactDownloader::new(config, &std::env::current_dir()?)?;
//!     let report = downloader.run(&NoPrompt, &mut std::io::stdout()).await?;
//!
//!     if let SyncReport::Completed(summary) = report {
//!         println!("{} artifacts, {} bytes", summary.downloaded(), summary.total_bytes());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Credentials and the prompt used to complete them
pub mod credentials;
/// Sync run orchestration
pub mod downloader;
/// Error types
pub mod error;
/// Wildcard matching of artifact names
pub mod glob;
/// Artifact manifest parsing
pub mod manifest;
/// Remote-to-local path mapping
pub mod paths;
/// Authenticated HTTP transfers
pub mod transfer;
/// Run outcome types
pub mod types;

// Re-export commonly used types
pub use config::{Endpoint, SyncConfig};
pub use credentials::{CredentialField, CredentialPrompt, Credentials, NoPrompt, StaticPrompt};
pub use downloader::ArtifactDownloader;
pub use error::{Error, Result};
pub use manifest::ArtifactDescriptor;
pub use types::{Stage, SyncReport, SyncSummary, SyncedArtifact};
