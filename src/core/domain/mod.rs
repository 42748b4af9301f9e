//! Domain types.

mod context;
mod descriptor;

pub use context::BuildContext;
pub use descriptor::{EnvironmentDescriptor, OperatingSystem, Toolchain};
