//! Link-time checks over parsed stage modules

use naga::{Binding, Handle, Module, Type, TypeInner};
use shader_program::{StageHandle, StageType};
use std::collections::BTreeSet;

/// Reasons a program fails to link; each renders as one program log line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("error: no shaders attached to the program")]
    NoStages,
    #[error("error: shader object {0} does not exist")]
    MissingStage(StageHandle),
    #[error("error: {stage} shader {handle} has not been compiled successfully")]
    NotCompiled { stage: StageType, handle: StageHandle },
    #[error("error: more than one {0} shader attached")]
    DuplicateStage(StageType),
    #[error("error: compute shaders cannot be linked with graphics shaders")]
    MixedPipeline,
    #[error("error: program lacks a vertex shader")]
    MissingVertexStage,
    #[error("error: fragment shader input at location {0} is not written by the vertex shader")]
    UnwrittenInput(u32),
}

/// Checks the stage kinds of a program
///
/// # Arguments
/// * `stages` - Kinds of the attached stages in attach order
pub fn check_stage_set(stages: &[StageType]) -> Result<(), LinkError> {
    if stages.is_empty() {
        return Err(LinkError::NoStages);
    }

    let mut seen = BTreeSet::new();
    for stage in stages {
        if !seen.insert(stage.gl_enum()) {
            return Err(LinkError::DuplicateStage(*stage));
        }
    }

    let has_compute = stages.contains(&StageType::Compute);
    if has_compute && stages.len() > 1 {
        return Err(LinkError::MixedPipeline);
    }
    if !has_compute && !stages.contains(&StageType::Vertex) {
        return Err(LinkError::MissingVertexStage);
    }
    Ok(())
}

/// Checks that every fragment input is written by the vertex stage
///
/// Returns one error per unwritten location, in ascending order.
pub fn check_interface(vertex: &Module, fragment: &Module) -> Result<(), Vec<LinkError>> {
    let outputs = output_locations(vertex);
    let unwritten: Vec<_> = input_locations(fragment)
        .into_iter()
        .filter(|location| !outputs.contains(location))
        .map(LinkError::UnwrittenInput)
        .collect();

    if unwritten.is_empty() { Ok(()) } else { Err(unwritten) }
}

/// User-defined output locations of a module's entry point
pub fn output_locations(module: &Module) -> BTreeSet<u32> {
    let mut locations = BTreeSet::new();
    for entry_point in &module.entry_points {
        if let Some(result) = &entry_point.function.result {
            collect_locations(module, result.ty, result.binding.as_ref(), &mut locations);
        }
    }
    locations
}

/// User-defined input locations of a module's entry point
pub fn input_locations(module: &Module) -> BTreeSet<u32> {
    let mut locations = BTreeSet::new();
    for entry_point in &module.entry_points {
        for argument in &entry_point.function.arguments {
            collect_locations(module, argument.ty, argument.binding.as_ref(), &mut locations);
        }
    }
    locations
}

fn collect_locations(module: &Module, ty: Handle<Type>, binding: Option<&Binding>, locations: &mut BTreeSet<u32>) {
    match binding {
        Some(Binding::Location { location, .. }) => {
            locations.insert(*location);
        }
        Some(Binding::BuiltIn(_)) => {}
        // Unbound values are structs whose members carry the bindings
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), locations);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use naga::front::glsl::{Frontend, Options};

    fn parse(stage: naga::ShaderStage, source: &str) -> Module {
        Frontend::default().parse(&Options::from(stage), source).unwrap()
    }

    const VERTEX: &str = "#version 450
layout(location = 0) out vec2 v_uv;
layout(location = 2) out float v_depth;
void main() {
    v_uv = vec2(0.0);
    v_depth = 1.0;
    gl_Position = vec4(0.0, 0.0, 0.0, 1.0);
}
";

    #[test]
    fn test_stage_set_rules() {
        assert_eq!(check_stage_set(&[]), Err(LinkError::NoStages));
        assert_eq!(check_stage_set(&[StageType::Vertex, StageType::Fragment]), Ok(()));
        assert_eq!(check_stage_set(&[StageType::Compute]), Ok(()));
        assert_eq!(check_stage_set(&[StageType::Vertex, StageType::Vertex]), Err(LinkError::DuplicateStage(StageType::Vertex)));
        assert_eq!(check_stage_set(&[StageType::Vertex, StageType::Compute]), Err(LinkError::MixedPipeline));
        assert_eq!(check_stage_set(&[StageType::Fragment]), Err(LinkError::MissingVertexStage));
    }

    #[test]
    fn test_locations_are_collected() {
        let vertex = parse(naga::ShaderStage::Vertex, VERTEX);
        assert_eq!(output_locations(&vertex).into_iter().collect::<Vec<_>>(), vec![0, 2]);
        assert!(input_locations(&vertex).is_empty());
    }

    #[test]
    fn test_interface_mismatch() {
        let vertex = parse(naga::ShaderStage::Vertex, VERTEX);
        let fragment = parse(
            naga::ShaderStage::Fragment,
            "#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 1) in vec3 v_normal;
layout(location = 0) out vec4 color;
void main() {
    color = vec4(v_uv, v_normal.x, 1.0);
}
",
        );

        let errors = check_interface(&vertex, &fragment).unwrap_err();
        assert_eq!(errors, vec![LinkError::UnwrittenInput(1)]);
        assert_eq!(errors[0].to_string(), "error: fragment shader input at location 1 is not written by the vertex shader");
    }
}
