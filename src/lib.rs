// Library exports for ani2xcursor

pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod pipeline_worker;

// Re-export commonly used types from pipeline
pub use error::{CursorError, ErrorKind};
pub use pipeline::{
    batch::{RoleOutcome, convert_roles},
    converter::{collect_cursor_sizes, convert_bytes, convert_file},
    cursor_io::list_available_sizes,
    cursor_types::{ConvertedCursor, ConvertedFrame},
    size_selection::SizeFilter,
    wincur,
};
