//! naga-backed shader driver
//!
//! Implements [`ShaderDriver`](shader_program::ShaderDriver) in process, so
//! shader programs can be compiled, linked and validated without a GPU. Useful
//! for offline checking of shader trees and for tests.

mod config;
mod driver;
mod interface;

pub use config::{NAGA_VERSION_HEADER, naga_template_config};
pub use driver::{NagaDriver, format_parse_errors, naga_stage};
pub use interface::{LinkError, check_interface, check_stage_set, input_locations, output_locations};
