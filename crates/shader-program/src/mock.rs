//! In-memory driver and resolver used by the unit tests
//!
//! The mock driver records every call and panics on any operation that a real
//! driver would reject (unknown names, double deletes, detaching a stage that
//! is not attached), so protocol mistakes surface as test failures.

use crate::{ProcessedSource, ProgramHandle, ShaderDriver, StageHandle, StageType, TemplateResolver};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateProgram(Option<ProgramHandle>),
    CreateStage(StageType, Option<StageHandle>),
    SetSource(StageHandle),
    Compile(StageHandle),
    Attach(ProgramHandle, StageHandle),
    Detach(ProgramHandle, StageHandle),
    DeleteStage(StageHandle),
    Link(ProgramHandle),
    Validate(ProgramHandle),
    DeleteProgram(ProgramHandle),
}

#[derive(Debug, Default)]
struct MockStage {
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct MockProgram {
    attached: Vec<StageHandle>,
    linked: bool,
    validated: bool,
    log: String,
}

#[derive(Debug, Default)]
pub struct MockDriver {
    next_program: u32,
    next_stage: u32,
    stages: BTreeMap<StageHandle, MockStage>,
    programs: BTreeMap<ProgramHandle, MockProgram>,
    stage_types: HashMap<StageHandle, StageType>,
    created_programs: Vec<ProgramHandle>,
    calls: Vec<Call>,
    stage_creations: usize,
    fail_program_creation: bool,
    fail_stage_creation_at: Option<usize>,
    link_failure: Option<String>,
    validation_failure: Option<String>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_program_creation(&mut self) {
        self.fail_program_creation = true;
    }

    /// Makes the `index`-th stage creation (0-based) return no handle
    pub fn fail_stage_creation_at(&mut self, index: usize) {
        self.fail_stage_creation_at = Some(index);
    }

    pub fn fail_link(&mut self, log: &str) {
        self.link_failure = Some(log.to_string());
    }

    pub fn fail_validation(&mut self, log: &str) {
        self.validation_failure = Some(log.to_string());
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn created_programs(&self) -> &[ProgramHandle] {
        &self.created_programs
    }

    pub fn live_programs(&self) -> Vec<ProgramHandle> {
        self.programs.keys().copied().collect()
    }

    pub fn live_stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn stage_type_of(&self, stage: StageHandle) -> StageType {
        self.stage_types[&stage]
    }

    fn stage_mut(&mut self, stage: StageHandle) -> &mut MockStage {
        self.stages.get_mut(&stage).unwrap_or_else(|| panic!("stage {stage} is not alive"))
    }

    fn program_mut(&mut self, program: ProgramHandle) -> &mut MockProgram {
        self.programs.get_mut(&program).unwrap_or_else(|| panic!("program {program} is not alive"))
    }
}

impl ShaderDriver for MockDriver {
    fn create_program(&mut self) -> Option<ProgramHandle> {
        let program = if self.fail_program_creation {
            None
        } else {
            self.next_program += 1;
            ProgramHandle::from_raw(self.next_program)
        };
        if let Some(program) = program {
            self.programs.insert(program, MockProgram::default());
            self.created_programs.push(program);
        }
        self.calls.push(Call::CreateProgram(program));
        program
    }

    fn create_stage(&mut self, stage_type: StageType) -> Option<StageHandle> {
        let index = self.stage_creations;
        self.stage_creations += 1;
        let stage = if self.fail_stage_creation_at == Some(index) {
            None
        } else {
            self.next_stage += 1;
            StageHandle::from_raw(self.next_stage)
        };
        if let Some(stage) = stage {
            self.stages.insert(stage, MockStage::default());
            self.stage_types.insert(stage, stage_type);
        }
        self.calls.push(Call::CreateStage(stage_type, stage));
        stage
    }

    fn set_source(&mut self, stage: StageHandle, source: &str) {
        self.stage_mut(stage).source = source.to_string();
        self.calls.push(Call::SetSource(stage));
    }

    /// Fails on every `#error <message>` line, reporting it Mesa style
    fn compile_stage(&mut self, stage: StageHandle) {
        let object = self.stage_mut(stage);
        let errors: Vec<String> = object
            .source
            .lines()
            .enumerate()
            .filter_map(|(index, line)| line.trim_start().strip_prefix("#error ").map(|message| format!("0:{}(1): error: {message}", index + 1)))
            .collect();
        object.compiled = errors.is_empty();
        object.log = if errors.is_empty() { String::new() } else { format!("Shader info log:\n{}", errors.join("\n")) };
        self.calls.push(Call::Compile(stage));
    }

    fn compile_status(&self, stage: StageHandle) -> bool {
        self.stages[&stage].compiled
    }

    fn compile_log(&self, stage: StageHandle) -> String {
        self.stages[&stage].log.clone()
    }

    fn attach_stage(&mut self, program: ProgramHandle, stage: StageHandle) {
        assert!(self.stages[&stage].compiled, "attaching uncompiled stage {stage}");
        let object = self.program_mut(program);
        assert!(!object.attached.contains(&stage), "stage {stage} attached twice");
        object.attached.push(stage);
        self.calls.push(Call::Attach(program, stage));
    }

    fn detach_stage(&mut self, program: ProgramHandle, stage: StageHandle) {
        let object = self.program_mut(program);
        let position = object.attached.iter().position(|attached| *attached == stage).unwrap_or_else(|| panic!("stage {stage} is not attached to {program}"));
        object.attached.remove(position);
        self.calls.push(Call::Detach(program, stage));
    }

    fn delete_stage(&mut self, stage: StageHandle) {
        assert!(self.stages.remove(&stage).is_some(), "stage {stage} deleted twice");
        assert!(
            self.programs.values().all(|program| !program.attached.contains(&stage)),
            "stage {stage} deleted while attached"
        );
        self.calls.push(Call::DeleteStage(stage));
    }

    fn link_program(&mut self, program: ProgramHandle) {
        let failure = self.link_failure.clone();
        let object = self.program_mut(program);
        object.linked = failure.is_none() && !object.attached.is_empty();
        object.log = failure.unwrap_or_default();
        self.calls.push(Call::Link(program));
    }

    fn link_status(&self, program: ProgramHandle) -> bool {
        self.programs[&program].linked
    }

    fn program_log(&self, program: ProgramHandle) -> String {
        self.programs[&program].log.clone()
    }

    fn validate_program(&mut self, program: ProgramHandle) {
        let failure = self.validation_failure.clone();
        let object = self.program_mut(program);
        object.validated = object.linked && failure.is_none();
        object.log = failure.unwrap_or_default();
        self.calls.push(Call::Validate(program));
    }

    fn validate_status(&self, program: ProgramHandle) -> bool {
        self.programs[&program].validated
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        let object = self.programs.remove(&program).unwrap_or_else(|| panic!("program {program} deleted twice"));
        assert!(object.attached.is_empty(), "program {program} deleted with stages attached");
        self.calls.push(Call::DeleteProgram(program));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no source named '{0}'")]
pub struct MissingSource(pub String);

/// Resolver over a fixed set of sources
#[derive(Debug, Default)]
pub struct MemoryResolver {
    sources: HashMap<String, ProcessedSource>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, id: &str, text: &str) -> Self {
        self.insert(id, text);
        self
    }

    pub fn with_processed(mut self, id: &str, source: ProcessedSource) -> Self {
        self.sources.insert(id.to_string(), source);
        self
    }

    pub fn insert(&mut self, id: &str, text: &str) {
        self.sources.insert(id.to_string(), ProcessedSource::identity(id, text));
    }

    pub fn remove(&mut self, id: &str) {
        self.sources.remove(id);
    }
}

impl TemplateResolver for MemoryResolver {
    type Error = MissingSource;

    fn load(&self, source_id: &str) -> Result<ProcessedSource, Self::Error> {
        self.sources.get(source_id).cloned().ok_or_else(|| MissingSource(source_id.to_string()))
    }
}
