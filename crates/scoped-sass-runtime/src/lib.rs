/*
 * scoped-sass-runtime
 * Copyright (c) 2025 Posit, PBC
 *
 * Runtime abstraction layer for scoped SASS compilation.
 *
 * This crate provides a trait-based abstraction over the two things the
 * scoped compiler needs from its environment, a read-only filesystem and a
 * SASS compiler:
 *
 * - NativeRuntime: std filesystem, grass on the tokio blocking pool
 * - MemoryRuntime: in-memory virtual filesystem, same compiler
 */

mod memory;
mod native;
mod sass_native;
mod traits;

// Re-export core types (API surface)
pub use traits::{
    CompileError, PathKind, RuntimeError, RuntimeResult, SassOutput, SystemRuntime,
};

// Re-export runtime implementations
pub use memory::{MemoryRuntime, normalize_path};
pub use native::NativeRuntime;

// Re-export the grass adapter for callers driving grass themselves
pub use sass_native::{FileSource, TrackingFs, compile_scss, parse_compile_error};
