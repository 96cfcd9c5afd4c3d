//! In-process shader driver backed by naga
//!
//! Stage objects are parsed with naga's GLSL front end, programs are linked by
//! matching stage kinds and vertex/fragment interfaces, and validation runs
//! naga's IR validator. Object lifetimes follow the GL rules: deleting an
//! attached stage only flags it, and it is freed once detached from every
//! program.

use crate::interface::{LinkError, check_interface, check_stage_set};
use naga::front::glsl::{Frontend, Options, ParseErrors};
use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{Module, ShaderStage};
use shader_program::{ProgramHandle, ShaderDriver, StageHandle, StageType};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Maps a stage kind to the naga stage that parses it
///
/// Returns `None` for kinds the GLSL front end does not support.
pub fn naga_stage(stage: StageType) -> Option<ShaderStage> {
    match stage {
        StageType::Vertex => Some(ShaderStage::Vertex),
        StageType::Fragment => Some(ShaderStage::Fragment),
        StageType::Compute => Some(ShaderStage::Compute),
        StageType::TessControl | StageType::TessEvaluation | StageType::Geometry => None,
    }
}

/// Formats front end errors as a driver compile log
///
/// Each error becomes one `0:<line>(<column>): error: <message>` line; errors
/// without a source location are written as `error: <message>`.
pub fn format_parse_errors(errors: &ParseErrors, source: &str) -> String {
    errors
        .errors
        .iter()
        .map(|error| {
            if error.meta.is_defined() {
                let location = error.meta.location(source);
                format!("0:{}({}): error: {}", location.line_number, location.line_position, error.kind)
            } else {
                format!("error: {}", error.kind)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug)]
struct StageObject {
    stage: StageType,
    source: String,
    module: Option<Module>,
    log: String,
    /// Attach count across all programs
    attachments: usize,
    delete_pending: bool,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<StageHandle>,
    /// Modules captured by the last successful link
    linked: Vec<(StageType, Module)>,
    link_status: bool,
    validate_status: bool,
    log: String,
}

/// Shader driver that compiles GLSL with naga instead of a GPU driver
#[derive(Debug, Default)]
pub struct NagaDriver {
    last_name: u32,
    stages: HashMap<StageHandle, StageObject>,
    programs: HashMap<ProgramHandle, ProgramObject>,
}

impl NagaDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stage objects not yet freed
    pub fn live_stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Number of program objects not yet deleted
    pub fn live_program_count(&self) -> usize {
        self.programs.len()
    }

    /// Kind of a live stage object
    pub fn stage_type(&self, stage: StageHandle) -> Option<StageType> {
        self.stages.get(&stage).map(|object| object.stage)
    }

    /// Module of one stage of a linked program
    pub fn linked_module(&self, program: ProgramHandle, stage: StageType) -> Option<&Module> {
        let object = self.programs.get(&program)?;
        object.linked.iter().find(|(kind, _)| *kind == stage).map(|(_, module)| module)
    }

    fn next_name(&mut self) -> Option<u32> {
        self.last_name = self.last_name.checked_add(1)?;
        Some(self.last_name)
    }

    fn link(&self, attached: &[StageHandle]) -> Result<Vec<(StageType, Module)>, Vec<LinkError>> {
        let mut stages = Vec::with_capacity(attached.len());
        for &handle in attached {
            let object = self.stages.get(&handle).ok_or_else(|| vec![LinkError::MissingStage(handle)])?;
            let module = object.module.as_ref().ok_or_else(|| {
                vec![LinkError::NotCompiled {
                    stage: object.stage,
                    handle,
                }]
            })?;
            stages.push((object.stage, module));
        }

        let kinds: Vec<_> = stages.iter().map(|(stage, _)| *stage).collect();
        check_stage_set(&kinds).map_err(|err| vec![err])?;

        let find = |kind| stages.iter().find(|(stage, _)| *stage == kind).map(|(_, module)| *module);
        if let (Some(vertex), Some(fragment)) = (find(StageType::Vertex), find(StageType::Fragment)) {
            check_interface(vertex, fragment)?;
        }

        Ok(stages.into_iter().map(|(stage, module)| (stage, module.clone())).collect())
    }

    /// Frees a stage once it is both deleted and no longer attached
    fn release_stage_if_unused(&mut self, stage: StageHandle) {
        if self.stages.get(&stage).is_some_and(|object| object.delete_pending && object.attachments == 0) {
            self.stages.remove(&stage);
            debug!(%stage, "freed stage object");
        }
    }
}

impl ShaderDriver for NagaDriver {
    fn create_program(&mut self) -> Option<ProgramHandle> {
        let program = ProgramHandle::from_raw(self.next_name()?)?;
        self.programs.insert(program, ProgramObject::default());
        Some(program)
    }

    fn create_stage(&mut self, stage: StageType) -> Option<StageHandle> {
        if naga_stage(stage).is_none() {
            warn!(%stage, "stage type not supported by the GLSL front end");
            return None;
        }
        let handle = StageHandle::from_raw(self.next_name()?)?;
        self.stages.insert(
            handle,
            StageObject {
                stage,
                source: String::new(),
                module: None,
                log: String::new(),
                attachments: 0,
                delete_pending: false,
            },
        );
        Some(handle)
    }

    fn set_source(&mut self, stage: StageHandle, source: &str) {
        match self.stages.get_mut(&stage) {
            Some(object) => object.source = source.to_string(),
            None => warn!(%stage, "set_source on unknown stage object"),
        }
    }

    fn compile_stage(&mut self, stage: StageHandle) {
        let Some(object) = self.stages.get_mut(&stage) else {
            warn!(%stage, "compile_stage on unknown stage object");
            return;
        };
        let Some(shader_stage) = naga_stage(object.stage) else {
            return;
        };

        let mut frontend = Frontend::default();
        match frontend.parse(&Options::from(shader_stage), &object.source) {
            Ok(module) => {
                object.module = Some(module);
                object.log.clear();
            }
            Err(errors) => {
                object.module = None;
                object.log = format_parse_errors(&errors, &object.source);
            }
        }
        debug!(%stage, kind = %object.stage, success = object.module.is_some(), "compiled stage");
    }

    fn compile_status(&self, stage: StageHandle) -> bool {
        self.stages.get(&stage).is_some_and(|object| object.module.is_some())
    }

    fn compile_log(&self, stage: StageHandle) -> String {
        self.stages.get(&stage).map(|object| object.log.clone()).unwrap_or_default()
    }

    fn attach_stage(&mut self, program: ProgramHandle, stage: StageHandle) {
        let (Some(program_object), Some(stage_object)) = (self.programs.get_mut(&program), self.stages.get_mut(&stage)) else {
            warn!(%program, %stage, "attach_stage on unknown object");
            return;
        };
        if program_object.attached.contains(&stage) {
            warn!(%program, %stage, "stage is already attached");
            return;
        }
        program_object.attached.push(stage);
        stage_object.attachments += 1;
    }

    fn detach_stage(&mut self, program: ProgramHandle, stage: StageHandle) {
        let Some(program_object) = self.programs.get_mut(&program) else {
            warn!(%program, "detach_stage on unknown program object");
            return;
        };
        let Some(index) = program_object.attached.iter().position(|attached| *attached == stage) else {
            warn!(%program, %stage, "stage is not attached");
            return;
        };
        program_object.attached.remove(index);
        if let Some(stage_object) = self.stages.get_mut(&stage) {
            stage_object.attachments -= 1;
        }
        self.release_stage_if_unused(stage);
    }

    fn delete_stage(&mut self, stage: StageHandle) {
        match self.stages.get_mut(&stage) {
            Some(object) => object.delete_pending = true,
            None => {
                warn!(%stage, "delete_stage on unknown stage object");
                return;
            }
        }
        self.release_stage_if_unused(stage);
    }

    fn link_program(&mut self, program: ProgramHandle) {
        let Some(attached) = self.programs.get(&program).map(|object| object.attached.clone()) else {
            warn!(%program, "link_program on unknown program object");
            return;
        };
        let result = self.link(&attached);

        let Some(object) = self.programs.get_mut(&program) else {
            return;
        };
        object.validate_status = false;
        match result {
            Ok(linked) => {
                object.linked = linked;
                object.link_status = true;
                object.log.clear();
            }
            Err(errors) => {
                object.linked.clear();
                object.link_status = false;
                object.log = errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n");
            }
        }
        debug!(%program, success = object.link_status, "linked program");
    }

    fn link_status(&self, program: ProgramHandle) -> bool {
        self.programs.get(&program).is_some_and(|object| object.link_status)
    }

    fn program_log(&self, program: ProgramHandle) -> String {
        self.programs.get(&program).map(|object| object.log.clone()).unwrap_or_default()
    }

    fn validate_program(&mut self, program: ProgramHandle) {
        let Some(object) = self.programs.get_mut(&program) else {
            warn!(%program, "validate_program on unknown program object");
            return;
        };
        if !object.link_status {
            object.validate_status = false;
            object.log = "error: program has not been linked successfully".to_string();
            return;
        }

        let mut errors = Vec::new();
        for (stage, module) in &object.linked {
            let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
            if let Err(err) = validator.validate(module) {
                errors.push(format!("error: {stage} shader failed validation: {}", err.as_inner()));
            }
        }
        object.validate_status = errors.is_empty();
        object.log = errors.join("\n");
        debug!(%program, success = object.validate_status, "validated program");
    }

    fn validate_status(&self, program: ProgramHandle) -> bool {
        self.programs.get(&program).is_some_and(|object| object.validate_status)
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        let Some(object) = self.programs.remove(&program) else {
            warn!(%program, "delete_program on unknown program object");
            return;
        };
        for stage in object.attached {
            if let Some(stage_object) = self.stages.get_mut(&stage) {
                stage_object.attachments -= 1;
            }
            self.release_stage_if_unused(stage);
        }
    }
}
