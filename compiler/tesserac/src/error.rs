//! The driver's error type.

use std::fmt;

use thiserror::Error;

use tessera_codegen::CodeGenerationError;
use tessera_finalize::FinalizationError;
use tessera_ir::QualifiedName;
use tessera_opt::DiscoveryError;

use crate::{AssemblyError, BuildError, LaunchError};

/// Pipeline stage an error comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Parse,
    Optimize,
    Finalize,
    Generate,
    Assemble,
    Build,
    Launch,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Parse => "parse",
            Phase::Optimize => "optimize",
            Phase::Finalize => "finalize",
            Phase::Generate => "codegen",
            Phase::Assemble => "assemble",
            Phase::Build => "build",
            Phase::Launch => "launch",
        })
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Finalization(#[from] FinalizationError),
    #[error("{module}: {source}")]
    CodeGeneration {
        module: QualifiedName,
        source: CodeGenerationError,
    },
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
}

impl CompileError {
    pub fn phase(&self) -> Phase {
        match self {
            CompileError::Discovery(DiscoveryError::Parse(_)) => Phase::Parse,
            CompileError::Discovery(DiscoveryError::Optimization { .. }) => Phase::Optimize,
            CompileError::Finalization(_) => Phase::Finalize,
            CompileError::CodeGeneration { .. }
            | CompileError::Assembly(AssemblyError::CodeGeneration { .. }) => Phase::Generate,
            CompileError::Assembly(_) => Phase::Assemble,
            CompileError::Build(_) => Phase::Build,
            CompileError::Launch(_) => Phase::Launch,
        }
    }

    /// The module being processed when the error occurred, if any.
    pub fn module(&self) -> Option<QualifiedName> {
        match self {
            CompileError::Discovery(DiscoveryError::Parse(err)) => {
                Some(err.source_id.module_name())
            }
            CompileError::Discovery(DiscoveryError::Optimization { module, .. })
            | CompileError::Finalization(FinalizationError { module, .. })
            | CompileError::CodeGeneration { module, .. } => Some(module.clone()),
            CompileError::Assembly(err) => err.module().cloned(),
            CompileError::Build(_) | CompileError::Launch(_) => None,
        }
    }
}
