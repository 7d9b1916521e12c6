//! Foreign-function binding layer for the native fill routines.
//!
//! This crate loads the shared object built from `seqfill-native` at
//! runtime (it is deliberately NOT a Cargo dependency — the dynamic
//! loading boundary is the point of the demonstration) and exposes two
//! binding entry points that fill a caller buffer with sequential index
//! values:
//!
//! ```no_run
//! use seqfill_buffers::{Tensor, Value};
//! use seqfill_ffi::builtins::{fill_array, fill_array_2d};
//!
//! let filled = fill_array(Value::Tensor(Tensor::zeros(vec![5]))).unwrap();
//! let grid = fill_array_2d(Value::Tensor(Tensor::zeros(vec![3, 4]))).unwrap();
//! ```
//!
//! # Signature Files
//!
//! The native routines can be described by a `.ffi` declaration file, the
//! moral equivalent of declaring argument types on a dynamically loaded
//! function before calling it:
//!
//! ```text
//! # seqfill_native.ffi
//! fill_array: (ptr_mut<f64>, usize) -> void
//! fill_array_2d: (ptr_mut<f64>, usize, usize) -> void
//! ```
//!
//! When signatures are registered for a library, the entry points validate
//! their dimensionality against the declaration before dispatch.
//!
//! # Native ABI
//!
//! ```c
//! void fill_array(double* arr, size_t size);
//! void fill_array_2d(double* arr, size_t rows, size_t cols);
//! ```
//!
//! Buffers cross the boundary as a raw pointer plus dimensions. The
//! wrappers only ever derive that pointer from a checked
//! [`seqfill_buffers::Tensor`], whose element count provably matches its
//! shape, so the advertised length never overstates the allocation.

mod error;
mod library;
mod registry;
mod signature;

pub mod builtins;

pub use error::FfiError;
pub use library::NativeLibrary;
pub use registry::{
    get_function_signature, global_registry, load_library, load_library_from,
    register_signatures, LibraryRegistry,
};
pub use signature::{FfiSignature, FfiType, ParseError, SignatureFile};

/// Registry name of the shared object built from `seqfill-native`.
pub const DEFAULT_LIB: &str = "seqfill_native";
