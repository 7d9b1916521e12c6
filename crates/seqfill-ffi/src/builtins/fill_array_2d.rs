//! `fill_array_2d` binding - fill a row-major matrix buffer through the
//! native routine.

use seqfill_buffers::{Tensor, Value};

use crate::builtins::prepare;
use crate::error::FfiError;
use crate::library::NativeLibrary;
use crate::registry::{get_function_signature, load_library, lock_registry};
use crate::DEFAULT_LIB;

type FillArray2dFn = unsafe extern "C" fn(*mut f64, usize, usize);

/// Fill a row-major matrix with `0, 1, 2, ...` (slot `(i, j)` receives
/// `i * cols + j`) via the default native library.
///
/// Coercion and return semantics match [`super::fill_array`]; the input
/// must coerce to exactly two dimensions. The native routine receives the
/// buffer pointer plus both dimension counts — behaviorally identical to
/// the flat fill, the two-parameter signature exists to demonstrate
/// multi-dimension parameter passing.
pub fn fill_array_2d(value: Value) -> Result<Value, FfiError> {
    let tensor = prepare(value, 2)?;
    if tensor.data.is_empty() {
        return Ok(Value::Tensor(tensor));
    }

    if let Some(sig) = get_function_signature(DEFAULT_LIB, "fill_array_2d")? {
        sig.check_fill(2).map_err(FfiError::Signature)?;
    }

    load_library(DEFAULT_LIB)?;
    let registry = lock_registry()?;
    let library = registry.get(DEFAULT_LIB).ok_or_else(|| {
        FfiError::NativeLoad(format!("library '{DEFAULT_LIB}' not found in registry"))
    })?;
    call_fill_2d(library, tensor)
}

/// Same as [`fill_array_2d`], but against an explicitly loaded library
/// instead of the global registry.
pub fn fill_array_2d_in(library: &NativeLibrary, value: Value) -> Result<Value, FfiError> {
    let tensor = prepare(value, 2)?;
    call_fill_2d(library, tensor)
}

fn call_fill_2d(library: &NativeLibrary, mut tensor: Tensor) -> Result<Value, FfiError> {
    if tensor.data.is_empty() {
        return Ok(Value::Tensor(tensor));
    }
    let (rows, cols) = (tensor.shape[0], tensor.shape[1]);

    let func: libloading::Symbol<FillArray2dFn> =
        unsafe { library.get_function("fill_array_2d")? };

    log::trace!("fill_array_2d: {rows}x{cols} element(s)");
    unsafe { func(tensor.data.as_mut_ptr(), rows, cols) };

    Ok(Value::Tensor(tensor))
}
