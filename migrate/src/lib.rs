//! Rewrites Material UI layout and typography components in JSX/TSX sources
//! into plain HTML elements with utility classes.
//!
//! ```
//! use mui_migrate::Pipeline;
//!
//! let src = "import { Box } from '@mui/material';\n<Box sx={{p:2}}>X</Box>";
//! assert_eq!(Pipeline::mui_to_html().apply(src), r#"<div className="">X</div>"#);
//! ```

pub mod error;
pub mod rules;
pub mod runner;
pub mod scanner;

pub use error::{FileError, MigrateError};
pub use rules::{Pipeline, Rewrite, MIGRATED_COMPONENTS};
pub use runner::{migrate_file, migrate_tree, Event, FileFailure, MigrationOptions, MigrationReport};
