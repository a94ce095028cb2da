//! # CLI Module
//!
//! Command-line access to the router, backed by the demonstration controller tree in
//! [`crate::demo`].
//!
//! ## Commands
//!
//! ### `call`
//!
//! Run one request and print the raw HTTP response:
//!
//! ```bash
//! helmsman call GET /information
//! helmsman call POST /child/complex-data --body '{"param1":"x","param2":1}'
//! helmsman call GET /greeting?name=Ada --accept yaml
//! helmsman call GET /child/audit -H 'X-Request-Id: 01ARZ3NDEKTSV4RRFFQ69G5FAV'
//! ```
//!
//! ### `docs`
//!
//! Print a controller's documentation as JSON:
//!
//! ```bash
//! helmsman docs
//! helmsman docs /child
//! ```
//!
//! ## Configuration
//!
//! `--config <FILE>` loads a TOML file; otherwise `HELMSMAN_*` environment variables
//! apply (see [`crate::config`]). Logging is configured separately through
//! `HELMSMAN_LOG_*` (see [`crate::logging`]).

mod commands;


pub use commands::{execute, run_cli, Cli, Commands};
