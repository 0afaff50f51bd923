//! Configuration for fmf-discover.
//!
//! Two layers feed a discovery run:
//!
//! 1. **Global configuration** (`~/.fmf-discover/config.toml`): user-wide
//!    defaults such as the library host and the default revision. See
//!    [`GlobalConfig`].
//! 2. **Step data** (YAML): what to discover, i.e. the `discover` section of
//!    a plan. See [`StepData`].
//!
//! Command-line options are applied on top of the step data through
//! [`StepOverrides`].

pub mod global;
pub mod step;

pub use global::GlobalConfig;
pub use step::{StepData, StepOverrides};
