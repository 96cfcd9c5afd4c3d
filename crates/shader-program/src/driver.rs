//! Driver binding interface
//!
//! The primitive create/compile/link/validate/delete operations a graphics
//! driver exposes for shader programs. Object names are non-zero integers; the
//! driver's `0` "no object" sentinel is represented by `None` so it can never
//! be passed back into the driver.

use crate::StageType;
use std::fmt;
use std::num::NonZeroU32;

/// Driver-side name of a stage (shader) object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StageHandle(NonZeroU32);

/// Driver-side name of a program object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramHandle(NonZeroU32);

macro_rules! impl_handle {
    ($handle:ident) => {
        impl $handle {
            /// Wraps a raw driver name, mapping the `0` sentinel to `None`
            pub fn from_raw(raw: u32) -> Option<Self> {
                NonZeroU32::new(raw).map(Self)
            }

            /// The raw driver name
            pub fn raw(&self) -> u32 {
                self.0.get()
            }
        }

        impl fmt::Display for $handle {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

impl_handle!(StageHandle);
impl_handle!(ProgramHandle);

/// Primitive shader program operations of a driver context
///
/// Calls are synchronous: every status query reflects the outcome of the
/// preceding request on the same object. A driver context is not shared
/// between threads; callers serialize compiles against one context.
pub trait ShaderDriver {
    /// Allocates an empty program object
    fn create_program(&mut self) -> Option<ProgramHandle>;

    /// Allocates a stage object of the given type
    fn create_stage(&mut self, stage: StageType) -> Option<StageHandle>;

    /// Replaces the source text of a stage object
    fn set_source(&mut self, stage: StageHandle, source: &str);

    /// Compiles the current source of a stage object
    fn compile_stage(&mut self, stage: StageHandle);

    /// Whether the last compile of the stage succeeded
    fn compile_status(&self, stage: StageHandle) -> bool;

    /// Info log of the last compile of the stage
    fn compile_log(&self, stage: StageHandle) -> String;

    fn attach_stage(&mut self, program: ProgramHandle, stage: StageHandle);

    fn detach_stage(&mut self, program: ProgramHandle, stage: StageHandle);

    fn delete_stage(&mut self, stage: StageHandle);

    /// Links all attached stages into an executable program
    fn link_program(&mut self, program: ProgramHandle);

    /// Whether the last link of the program succeeded
    fn link_status(&self, program: ProgramHandle) -> bool;

    /// Info log of the last link or validation of the program
    fn program_log(&self, program: ProgramHandle) -> String;

    /// Checks whether the linked program can execute in the current state
    fn validate_program(&mut self, program: ProgramHandle);

    /// Whether the last validation of the program succeeded
    fn validate_status(&self, program: ProgramHandle) -> bool;

    fn delete_program(&mut self, program: ProgramHandle);
}

impl<D: ShaderDriver + ?Sized> ShaderDriver for &mut D {
    fn create_program(&mut self) -> Option<ProgramHandle> {
        (**self).create_program()
    }

    fn create_stage(&mut self, stage: StageType) -> Option<StageHandle> {
        (**self).create_stage(stage)
    }

    fn set_source(&mut self, stage: StageHandle, source: &str) {
        (**self).set_source(stage, source)
    }

    fn compile_stage(&mut self, stage: StageHandle) {
        (**self).compile_stage(stage)
    }

    fn compile_status(&self, stage: StageHandle) -> bool {
        (**self).compile_status(stage)
    }

    fn compile_log(&self, stage: StageHandle) -> String {
        (**self).compile_log(stage)
    }

    fn attach_stage(&mut self, program: ProgramHandle, stage: StageHandle) {
        (**self).attach_stage(program, stage)
    }

    fn detach_stage(&mut self, program: ProgramHandle, stage: StageHandle) {
        (**self).detach_stage(program, stage)
    }

    fn delete_stage(&mut self, stage: StageHandle) {
        (**self).delete_stage(stage)
    }

    fn link_program(&mut self, program: ProgramHandle) {
        (**self).link_program(program)
    }

    fn link_status(&self, program: ProgramHandle) -> bool {
        (**self).link_status(program)
    }

    fn program_log(&self, program: ProgramHandle) -> String {
        (**self).program_log(program)
    }

    fn validate_program(&mut self, program: ProgramHandle) {
        (**self).validate_program(program)
    }

    fn validate_status(&self, program: ProgramHandle) -> bool {
        (**self).validate_status(program)
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        (**self).delete_program(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sentinel_is_not_a_handle() {
        assert_eq!(StageHandle::from_raw(0), None);
        assert_eq!(ProgramHandle::from_raw(0), None);
        assert_eq!(StageHandle::from_raw(7).map(|h| h.raw()), Some(7));
        assert_eq!(ProgramHandle::from_raw(3).unwrap().to_string(), "3");
    }
}
