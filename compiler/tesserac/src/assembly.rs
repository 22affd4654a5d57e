//! Source assembly: every translation unit of a program, written to its
//! build directory.
//!
//! # Layout
//!
//! ```text
//! <output>/<entry>.build/
//!     <module>.cpp, <module>.hpp   one pair per importable module
//!     __main__.cpp                 the entry module (+ `main` in program mode)
//!     __constants.cpp              the constant pool
//!     __constants.hpp              included by every unit
//! ```
//!
//! Importable modules are generated in name order, then the entry module,
//! then the constants files; the pool is complete only after every module
//! was generated. Two runs over the same module set write byte-identical
//! directories.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info_span};

use tessera_codegen::{
    generate_constants_declaration, generate_constants_definition, generate_extension_module_code,
    generate_main_code, generate_module_code, generate_module_declaration, CodeGenerationError,
    GlobalContext, MAIN_MODULE_NAME,
};
use tessera_ir::{FrozenModuleSet, QualifiedName};

use crate::BuildOptions;

pub const MAIN_SOURCE: &str = "__main__.cpp";
pub const CONSTANTS_SOURCE: &str = "__constants.cpp";
pub const CONSTANTS_HEADER: &str = "__constants.hpp";

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("cannot prepare build directory {}: {source}", .path.display())]
    PrepareDirectory { path: PathBuf, source: io::Error },
    #[error("cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("generating `{module}`: {source}")]
    CodeGeneration {
        module: QualifiedName,
        source: CodeGenerationError,
    },
    #[error("the module set has no entry module")]
    MissingEntry,
}

impl AssemblyError {
    /// The module being generated when the error occurred, if any.
    pub fn module(&self) -> Option<&QualifiedName> {
        match self {
            AssemblyError::CodeGeneration { module, .. } => Some(module),
            AssemblyError::PrepareDirectory { .. }
            | AssemblyError::Write { .. }
            | AssemblyError::MissingEntry => None,
        }
    }
}

/// The written build directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceDirectory {
    pub path: PathBuf,
    /// Every written file, in write order.
    pub files: Vec<PathBuf>,
}

impl SourceDirectory {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File names relative to the directory, in write order.
    pub fn file_names(&self) -> Vec<String> {
        self.files
            .iter()
            .filter_map(|file| file.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect()
    }
}

/// Generate and write every unit of a finalized module set.
pub fn assemble_sources(
    modules: &FrozenModuleSet,
    global: &mut GlobalContext,
    options: &BuildOptions,
) -> Result<SourceDirectory, AssemblyError> {
    let _span = info_span!("assemble", entry = %options.entry_name).entered();
    let entry = modules.entry().ok_or(AssemblyError::MissingEntry)?;

    let path = options.source_dir();
    prepare_directory(&path)?;
    let mut writer = UnitWriter {
        dir: SourceDirectory {
            path,
            files: Vec::new(),
        },
    };

    // `FrozenModuleSet` iterates in name order.
    let mut headers = Vec::new();
    let mut compiled = Vec::new();
    for record in modules.importable() {
        let code = generate_module_code(&record.tree, &record.name, record.name.as_str(), global)
            .map_err(|source| AssemblyError::CodeGeneration {
                module: record.name.clone(),
                source,
            })?;
        writer.write(&format!("{}.cpp", record.name), &code)?;
        let header = format!("{}.hpp", record.name);
        writer.write(&header, &generate_module_declaration(&record.name))?;
        headers.push(header);
        compiled.push(record.name.clone());
    }

    let code = if options.module_mode {
        generate_extension_module_code(&entry.tree, &entry.name, global)
    } else {
        generate_module_code(&entry.tree, &entry.name, MAIN_MODULE_NAME, global)
            .map(|code| generate_main_code(&code, &compiled))
    }
    .map_err(|source| AssemblyError::CodeGeneration {
        module: entry.name.clone(),
        source,
    })?;
    writer.write(MAIN_SOURCE, &code)?;

    writer.write(CONSTANTS_SOURCE, &generate_constants_definition(global))?;
    writer.write(
        CONSTANTS_HEADER,
        &generate_constants_declaration(global, &headers),
    )?;

    debug!(
        files = writer.dir.files.len(),
        constants = global.constants().len(),
        "sources assembled"
    );
    Ok(writer.dir)
}

/// Create the directory, or empty it if it exists.
fn prepare_directory(path: &Path) -> Result<(), AssemblyError> {
    let prepare_error = |source: io::Error| AssemblyError::PrepareDirectory {
        path: path.to_path_buf(),
        source,
    };
    if !path.exists() {
        return fs::create_dir_all(path).map_err(prepare_error);
    }
    for entry in fs::read_dir(path).map_err(prepare_error)? {
        let entry_path = entry.map_err(prepare_error)?.path();
        let removed = if entry_path.is_dir() {
            fs::remove_dir_all(&entry_path)
        } else {
            fs::remove_file(&entry_path)
        };
        removed.map_err(prepare_error)?;
    }
    Ok(())
}

struct UnitWriter {
    dir: SourceDirectory,
}

impl UnitWriter {
    fn write(&mut self, file_name: &str, code: &str) -> Result<(), AssemblyError> {
        let path = self.dir.path.join(file_name);
        fs::write(&path, code).map_err(|source| AssemblyError::Write {
            path: path.clone(),
            source,
        })?;
        self.dir.files.push(path);
        Ok(())
    }
}
