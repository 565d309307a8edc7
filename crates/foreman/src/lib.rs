//! # foreman
//!
//! Blocking resource client for the Foreman API v2.
//!
//! This crate provides:
//! - [`ForemanClient`], an implementation of [`declarative::ResourceClient`]
//! - Routing of each [`declarative::Kind`] to its API collection
//! - Mapping of HTTP failures to categorized [`declarative::ApiError`]s
//!
//! ## Example
//!
//! ```no_run
//! use declarative::{Kind, LookupKey, ResourceClient};
//! use foreman::{ConnectionOptions, ForemanClient};
//!
//! let opts = ConnectionOptions::new("admin", "secret")
//!     .host("foreman.example.com")
//!     .port(443);
//! let client = ForemanClient::new(&opts).expect("invalid settings");
//!
//! let ptable = client
//!     .find(Kind::PartitionTable, &LookupKey::by_name("FreeBSD"))
//!     .expect("lookup failed");
//! println!("found: {}", ptable.is_found());
//! ```
//!
//! ## Routing
//!
//! | Kind                | Collection                                     |
//! |---------------------|------------------------------------------------|
//! | compute resource    | `/api/compute_resources`                       |
//! | partition table     | `/api/ptables`                                 |
//! | role                | `/api/roles`                                   |
//! | operatingsystem     | `/api/operatingsystems`                        |
//! | config template     | `/api/config_templates`                        |
//! | OS default template | `/api/operatingsystems/:id/os_default_templates` |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod error;
pub mod types;

pub use client::ForemanClient;
pub use error::{Error, Result};
pub use types::{ConnectionOptions, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TIMEOUT, Endpoint};
