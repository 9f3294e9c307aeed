//! `resumeforge-errors`: user-facing error substrate.
//!
//! - [`ErrorInfo`]: the record notification banners render.
//! - [`mapping`]: translates infrastructure failures into records.
//! - [`ErrorStore`]: session-wide list of records plus the
//!   `execute_with_error_handling` chokepoint.

pub mod info;
pub mod mapping;
pub mod store;

pub use info::{ErrorAction, ErrorInfo, ErrorReport, ErrorSource};
pub use mapping::{DEFAULT_MAPPING, ErrorMapper, ErrorMapping, InfrastructureErrorMapper};
pub use store::{ErrorStore, ExecuteOptions};
