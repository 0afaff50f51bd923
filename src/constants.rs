//! Global constants used throughout the fmf-discover codebase.
//!
//! Default locations, names and timeouts shared by the library resolver,
//! the test tree resolver and the git wrapper.

use std::time::Duration;

/// Hosting location prepended to the component of a short-form
/// `library(component/name)` reference.
pub const DEFAULT_LIBRARY_HOST: &str = "https://github.com/beakerlib-libraries";

/// Revision used when a library reference or a remote test repository does
/// not name one.
pub const DEFAULT_REF: &str = "master";

/// Library node looked up when a long-form reference omits `name`.
pub const DEFAULT_LIBRARY_NAME: &str = "main";

/// Working-area subdirectory holding the materialized test tree.
pub const TESTS_DIR: &str = "tests";

/// Working-area file recording that `tests/` was materialized by this tool
/// and may be replaced by a later run.
pub const TESTS_MARKER_FILE: &str = ".fmf-discover-tests";

/// Working-area subdirectory holding one directory per fetched library.
pub const LIBS_DIR: &str = "libs";

/// Runtime-visible root every discovered test path is nested under.
pub const TESTS_PREFIX: &str = "/tests";

/// Directory marking the root of an fmf metadata tree.
pub const FMF_ROOT_MARKER: &str = ".fmf";

/// File holding the data of a directory node.
pub const FMF_MAIN_FILE: &str = "main.fmf";

/// Extension of fmf metadata files.
pub const FMF_EXTENSION: &str = "fmf";

/// Attribute marking a leaf node as a test.
pub const TEST_KEY: &str = "test";

/// Default timeout for git commands that do not set their own.
pub const GIT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Timeout for cloning test and library repositories.
pub const GIT_CLONE_TIMEOUT: Duration = Duration::from_secs(600);

/// Environment variable overriding the global configuration path.
pub const CONFIG_PATH_ENV: &str = "FMF_DISCOVER_CONFIG";
