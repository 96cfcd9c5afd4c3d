//! Template settings for sources compiled with naga

use shader_program_template::TemplateConfig;

/// Version directive naga's GLSL front end accepts
///
/// The front end only parses GLSL 440, 450 and 460, so the standard
/// `#version 430` header cannot be used with [`NagaDriver`](crate::NagaDriver).
pub const NAGA_VERSION_HEADER: &str = "#version 450";

/// Standard template configuration with a naga-compatible version header
pub fn naga_template_config() -> TemplateConfig {
    TemplateConfig {
        version_header: NAGA_VERSION_HEADER.to_string(),
        ..TemplateConfig::default()
    }
}
