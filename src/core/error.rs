//! Error handling for fmf-discover
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`DiscoverError`]) for precise handling in code
//! 2. **User-friendly messages** ([`ErrorContext`]) with suggestions for CLI users
//!
//! Every fallible operation in the crate returns [`anyhow::Result`] and raises
//! [`DiscoverError`] values, so callers can recover the precise failure with
//! `downcast_ref::<DiscoverError>()` even after context has been attached.
//!
//! # Error Categories
//!
//! - **Git Operations**: [`DiscoverError::GitNotFound`], [`DiscoverError::GitCommandError`],
//!   [`DiscoverError::GitCloneFailed`], [`DiscoverError::GitCheckoutFailed`]
//! - **Library References**: [`DiscoverError::MalformedIdentifier`],
//!   [`DiscoverError::LibraryNotFound`], [`DiscoverError::LibraryConflict`],
//!   [`DiscoverError::CircularDependency`]
//! - **Test Tree**: [`DiscoverError::PathNotFound`], [`DiscoverError::WorkAreaOccupied`],
//!   [`DiscoverError::MetadataTreeNotFound`],
//!   [`DiscoverError::MetadataParseError`], [`DiscoverError::InvalidFilter`],
//!   [`DiscoverError::InvalidPattern`]
//! - **Configuration**: [`DiscoverError::ConfigError`], [`DiscoverError::TomlError`],
//!   [`DiscoverError::YamlError`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use fmf_discover::core::{DiscoverError, user_friendly_error};
//!
//! let error = anyhow::Error::from(DiscoverError::PathNotFound {
//!     path: "/missing".to_string(),
//! });
//! let ctx = user_friendly_error(error);
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for fmf-discover operations.
///
/// Variants carry the offending URL, path or reference so that the message
/// is meaningful without the surrounding log output.
#[derive(Error, Debug)]
pub enum DiscoverError {
    /// A git command exited with a non-zero status.
    #[error("Git operation failed: {operation}")]
    GitCommandError {
        /// The git subcommand that failed (e.g. "rev-parse")
        operation: String,
        /// Standard error output of the command
        stderr: String,
    },

    /// Git executable not found in PATH.
    #[error("Git is not installed or not found in PATH")]
    GitNotFound,

    /// Cloning a test or library repository failed.
    #[error("Failed to clone repository: {url}")]
    GitCloneFailed {
        /// The repository URL that failed to clone
        url: String,
        /// Reason reported by git
        reason: String,
    },

    /// Checking out a requested revision failed.
    #[error("Failed to checkout reference '{reference}' in repository")]
    GitCheckoutFailed {
        /// The branch, tag or commit that could not be checked out
        reference: String,
        /// Reason reported by git
        reason: String,
    },

    /// A library reference could not be turned into a library identifier.
    ///
    /// Raised for long-form references whose `url` yields no component name
    /// and for short-form references whose payload is not `component/name`.
    #[error("Malformed library identifier '{identifier}': {reason}")]
    MalformedIdentifier {
        /// The offending reference or URL
        identifier: String,
        /// Why it was rejected
        reason: String,
    },

    /// A fetched library has no metadata node with the requested name.
    #[error("Library '{name}' not found in component '{component}'")]
    LibraryNotFound {
        /// Component (repository) the library was expected in
        component: String,
        /// Logical library name
        name: String,
    },

    /// The same component was requested with two different sources within one run.
    #[error(
        "Library component '{component}' already fetched as {fetched}, cannot also use {requested}"
    )]
    LibraryConflict {
        /// Component name (cache key)
        component: String,
        /// `url@ref` the component was fetched with
        fetched: String,
        /// `url@ref` of the conflicting request
        requested: String,
    },

    /// A library requires itself, directly or through other libraries.
    #[error("Circular dependency detected: {chain}")]
    CircularDependency {
        /// The reference chain, e.g. "a/main -> b/main -> a/main"
        chain: String,
    },

    /// A user-specified local path is not a directory.
    #[error("Provided path '{path}' is not a directory")]
    PathNotFound {
        /// The path as given by the user
        path: String,
    },

    /// The metadata tree path does not exist or has no fmf root.
    #[error("Metadata tree path '{path}' not found")]
    MetadataTreeNotFound {
        /// The tree path relative to the test directory, or an absolute path
        path: String,
    },

    /// The working area already holds a `tests/` directory it did not create.
    #[error("Test directory '{path}' already exists and was not created by fmf-discover")]
    WorkAreaOccupied {
        /// The existing directory
        path: String,
    },

    /// An fmf file could not be parsed.
    #[error("Invalid metadata in {file}: {reason}")]
    MetadataParseError {
        /// Path of the offending file
        file: String,
        /// Parser message
        reason: String,
    },

    /// A filter expression could not be parsed.
    #[error("Invalid filter '{filter}': {reason}")]
    InvalidFilter {
        /// The filter expression
        filter: String,
        /// Why it was rejected
        reason: String,
    },

    /// A test name pattern is not a valid regular expression.
    #[error("Invalid test name pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern as given
        pattern: String,
        /// Regex compiler message
        reason: String,
    },

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// TOML parsing error.
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Generic error for cases not covered by specific variants.
    #[error("{message}")]
    Other {
        /// The error message
        message: String,
    },
}

impl Clone for DiscoverError {
    fn clone(&self) -> Self {
        match self {
            Self::GitCommandError {
                operation,
                stderr,
            } => Self::GitCommandError {
                operation: operation.clone(),
                stderr: stderr.clone(),
            },
            Self::GitNotFound => Self::GitNotFound,
            Self::GitCloneFailed {
                url,
                reason,
            } => Self::GitCloneFailed {
                url: url.clone(),
                reason: reason.clone(),
            },
            Self::GitCheckoutFailed {
                reference,
                reason,
            } => Self::GitCheckoutFailed {
                reference: reference.clone(),
                reason: reason.clone(),
            },
            Self::MalformedIdentifier {
                identifier,
                reason,
            } => Self::MalformedIdentifier {
                identifier: identifier.clone(),
                reason: reason.clone(),
            },
            Self::LibraryNotFound {
                component,
                name,
            } => Self::LibraryNotFound {
                component: component.clone(),
                name: name.clone(),
            },
            Self::LibraryConflict {
                component,
                fetched,
                requested,
            } => Self::LibraryConflict {
                component: component.clone(),
                fetched: fetched.clone(),
                requested: requested.clone(),
            },
            Self::CircularDependency {
                chain,
            } => Self::CircularDependency {
                chain: chain.clone(),
            },
            Self::PathNotFound {
                path,
            } => Self::PathNotFound {
                path: path.clone(),
            },
            Self::MetadataTreeNotFound {
                path,
            } => Self::MetadataTreeNotFound {
                path: path.clone(),
            },
            Self::MetadataParseError {
                file,
                reason,
            } => Self::MetadataParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::InvalidFilter {
                filter,
                reason,
            } => Self::InvalidFilter {
                filter: filter.clone(),
                reason: reason.clone(),
            },
            Self::InvalidPattern {
                pattern,
                reason,
            } => Self::InvalidPattern {
                pattern: pattern.clone(),
                reason: reason.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            Self::WorkAreaOccupied {
                path,
            } => Self::WorkAreaOccupied {
                path: path.clone(),
            },
            // For errors that don't implement Clone, convert to Other
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::YamlError(e) => Self::Other {
                message: format!("YAML parsing error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error wrapper carrying a suggestion and extra details for terminal display.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: DiscoverError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: DiscoverError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colours.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] suitable for the terminal.
///
/// Known [`DiscoverError`] values anywhere in the chain get a tailored
/// suggestion; IO errors are mapped by kind; everything else keeps its full
/// cause chain in the message.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(discover_error) = error.downcast_ref::<DiscoverError>() {
        return create_error_context(discover_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(DiscoverError::Other {
                    message: format!("Permission denied: {io_error}"),
                })
                .with_suggestion("Check the ownership and permissions of the working area")
                .with_details(
                    "The working area must be writable to copy the test tree and fetch libraries",
                );
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(DiscoverError::Other {
                    message: format!("File not found: {io_error}"),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(DiscoverError::Other {
        message,
    })
}

fn create_error_context(error: DiscoverError) -> ErrorContext {
    match &error {
        DiscoverError::GitNotFound => ErrorContext::new(error.clone())
            .with_suggestion("Install git from https://git-scm.com/ or your package manager (e.g., 'dnf install git', 'apt install git')")
            .with_details("Test trees and beakerlib libraries are fetched with the system git command"),

        DiscoverError::GitCloneFailed { url, reason } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Verify the repository URL is correct: {url}. Check your network connection and repository access"
            ))
            .with_details(reason.trim().to_string()),

        DiscoverError::GitCheckoutFailed { reference, reason } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Verify that '{reference}' exists. Use 'git tag -l' or 'git branch -r' to list available references"
            ))
            .with_details(reason.trim().to_string()),

        DiscoverError::GitCommandError { stderr, .. } => ErrorContext::new(error.clone())
            .with_suggestion("Check your git configuration and repository access. Try running the git command manually for more details")
            .with_details(stderr.trim().to_string()),

        DiscoverError::MalformedIdentifier { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Use 'library(component/name)' or 'library{url: <repository>, ref: <revision>, name: <library>}'")
            .with_details("The component name is taken from the last path segment of the library URL"),

        DiscoverError::LibraryNotFound { component, name } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Check that the '{component}' repository defines an fmf node '/{name}'"
            )),

        DiscoverError::LibraryConflict { component, .. } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Reference library component '{component}' with the same url and ref everywhere"
            ))
            .with_details("Each component is fetched once per run into libs/<component>"),

        DiscoverError::CircularDependency { chain } => ErrorContext::new(error.clone())
            .with_suggestion("Review the library requirements and remove circular references")
            .with_details(format!(
                "Circular library chain detected: {chain}. Libraries cannot require themselves directly or indirectly"
            )),

        DiscoverError::PathNotFound { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Pass an existing directory with --path, or omit it to use the current tree"),

        DiscoverError::WorkAreaOccupied { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Point --workdir at an empty directory, or omit it to use a fresh one")
            .with_details("Directories not created by fmf-discover are never removed"),

        DiscoverError::MetadataTreeNotFound { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Initialize the metadata tree with 'fmf init' or point --path at the tree root")
            .with_details("An fmf tree root is a directory containing a '.fmf' subdirectory"),

        DiscoverError::InvalidFilter { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Filters look like 'tier: 1', 'tag: -slow' or 'tier: 1 & component: httpd'"),

        _ => ErrorContext::new(error.clone()),
    }
}
