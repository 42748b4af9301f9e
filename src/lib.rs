//! Brewgate - matrix tests and gated Homebrew formula releases.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── init          # Write a starter .brewgate.toml
//! │   ├── matrix        # Run every environment in parallel
//! │   ├── run           # Run one environment in place
//! │   ├── gate          # Report the release decision
//! │   ├── formula       # Generate a formula without publishing
//! │   ├── publish       # Gate, then publish
//! │   ├── ci            # Run, then gate and publish
//! │   ├── cache         # Cache keys and pruning
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── config        # .brewgate.toml management
//!     ├── domain/       # Environment descriptors, build context
//!     ├── step          # Shell step execution
//!     ├── prepare       # OS-specific preparation strategies
//!     ├── source        # Source directory hiding guard
//!     ├── workspace     # Per-environment project copies
//!     ├── cache         # Cache store and pruning
//!     ├── matrix        # Matrix runner
//!     ├── gate          # Release condition
//!     ├── formula       # Formula generation and checks
//!     ├── credential/   # Deploy key decryption
//!     │   ├── openssl   # aes-256-cbc via the openssl CLI
//!     │   ├── age       # age passphrase
//!     │   └── file      # Owner-read-only key file guard
//!     ├── remote        # Formula repository (git)
//!     └── publish       # Formula publisher
//! ```
//!
//! # Flow
//!
//! The matrix runner tests every environment. For a tagged build on the
//! release branch, in the one designated environment, with a passing suite,
//! the publisher generates a formula, validates it and pushes it to the
//! formula repository.

pub mod cli;
pub mod core;
pub mod error;
