//! Program compilation
//!
//! Turns a [`ProgramDescriptor`] into a linked and validated program object.
//! Every driver object created along the way is owned by a scope guard, so
//! whichever step fails, the stages and the program are released before the
//! error reaches the caller. On success only the program object survives.

use crate::{ProgramDescriptor, ProgramError, ProgramHandle, ShaderDriver, ShaderUnit, StageHandle, TemplateResolver, remap_log};
use tracing::{debug, warn};

/// Builds programs against one driver context
///
/// Holding the driver mutably for the duration of each call keeps compiles on
/// one context strictly sequential.
#[derive(Debug)]
pub struct ProgramCompiler<D: ShaderDriver> {
    driver: D,
}

impl<D: ShaderDriver> ProgramCompiler<D> {
    /// Creates a compiler over a driver (or a `&mut` to one)
    pub fn new(driver: D) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Compiles, links and validates every stage of `descriptor`
    ///
    /// Stages are compiled and attached in declaration order. On success the
    /// returned program belongs to the caller, who must eventually delete it.
    /// On failure no object created by this call is left alive.
    ///
    /// # Errors
    /// - [`ProgramError::ProgramCreation`] if no program object could be allocated
    /// - [`ProgramError::StageCreation`] if a stage object could not be allocated
    /// - [`ProgramError::Template`] if a source could not be resolved
    /// - [`ProgramError::StageCompile`] with the remapped compile log
    /// - [`ProgramError::Link`] / [`ProgramError::Validation`] with the raw program log
    pub fn compile<R>(&mut self, descriptor: &ProgramDescriptor, resolver: &R) -> Result<ProgramHandle, ProgramError>
    where
        R: TemplateResolver + ?Sized,
    {
        let program = self.driver.create_program().ok_or(ProgramError::ProgramCreation)?;
        debug!(%program, stages = descriptor.len(), "building shader program");

        let result = ProgramBuild::new(&mut self.driver, program).run(descriptor, resolver);
        match &result {
            Ok(program) => debug!(%program, "shader program linked and validated"),
            Err(err) => warn!(
                %program,
                stage = err.stage().map(|stage| stage.name()),
                source_id = err.source_id(),
                "shader program build failed:\n{err}"
            ),
        }
        result
    }
}

/// Scope guard over a program object under construction
///
/// Dropping the guard detaches and deletes every attached stage, then deletes
/// the program itself unless the build was marked successful.
struct ProgramBuild<'d, D: ShaderDriver + ?Sized> {
    driver: &'d mut D,
    program: ProgramHandle,
    attached: Vec<StageHandle>,
    succeeded: bool,
}

impl<'d, D: ShaderDriver + ?Sized> ProgramBuild<'d, D> {
    fn new(driver: &'d mut D, program: ProgramHandle) -> Self {
        Self {
            driver,
            program,
            attached: Vec::new(),
            succeeded: false,
        }
    }

    fn run<R>(mut self, descriptor: &ProgramDescriptor, resolver: &R) -> Result<ProgramHandle, ProgramError>
    where
        R: TemplateResolver + ?Sized,
    {
        for unit in descriptor {
            self.add_stage(unit, resolver)?;
        }
        self.link()?;
        self.validate()?;
        Ok(self.finish())
    }

    fn add_stage<R>(&mut self, unit: &ShaderUnit, resolver: &R) -> Result<(), ProgramError>
    where
        R: TemplateResolver + ?Sized,
    {
        let handle = self.driver.create_stage(unit.stage()).ok_or(ProgramError::StageCreation { stage: unit.stage() })?;
        let mut stage = PendingStage { build: self, handle: Some(handle) };

        let source = resolver.load(unit.source_id()).map_err(|err| ProgramError::Template {
            source_id: unit.source_id().to_string(),
            source: Box::new(err),
        })?;

        debug!(stage = %unit.stage(), source_id = unit.source_id(), %handle, "compiling stage");
        stage.driver().set_source(handle, source.contents());
        stage.driver().compile_stage(handle);
        if !stage.driver().compile_status(handle) {
            let log = stage.driver().compile_log(handle);
            drop(stage);
            return Err(ProgramError::StageCompile {
                stage: unit.stage(),
                source_id: unit.source_id().to_string(),
                log: remap_log(&log, &source),
            });
        }

        stage.attach();
        Ok(())
    }

    fn link(&mut self) -> Result<(), ProgramError> {
        self.driver.link_program(self.program);
        if !self.driver.link_status(self.program) {
            return Err(ProgramError::Link {
                log: self.driver.program_log(self.program),
            });
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<(), ProgramError> {
        self.driver.validate_program(self.program);
        if !self.driver.validate_status(self.program) {
            return Err(ProgramError::Validation {
                log: self.driver.program_log(self.program),
            });
        }
        Ok(())
    }

    fn finish(mut self) -> ProgramHandle {
        self.succeeded = true;
        self.program
    }
}

impl<D: ShaderDriver + ?Sized> Drop for ProgramBuild<'_, D> {
    fn drop(&mut self) {
        while let Some(stage) = self.attached.pop() {
            self.driver.detach_stage(self.program, stage);
            self.driver.delete_stage(stage);
        }
        if !self.succeeded {
            debug!(program = %self.program, "deleting unfinished program");
            self.driver.delete_program(self.program);
        }
    }
}

/// Scope guard over a stage object that is not attached yet
///
/// Deletes the stage on drop unless it was handed to the program by [`attach`](Self::attach).
struct PendingStage<'b, 'd, D: ShaderDriver + ?Sized> {
    build: &'b mut ProgramBuild<'d, D>,
    handle: Option<StageHandle>,
}

impl<D: ShaderDriver + ?Sized> PendingStage<'_, '_, D> {
    fn driver(&mut self) -> &mut D {
        &mut *self.build.driver
    }

    fn attach(mut self) {
        if let Some(handle) = self.handle.take() {
            self.build.driver.attach_stage(self.build.program, handle);
            self.build.attached.push(handle);
        }
    }
}

impl<D: ShaderDriver + ?Sized> Drop for PendingStage<'_, '_, D> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.build.driver.delete_stage(handle);
        }
    }
}
