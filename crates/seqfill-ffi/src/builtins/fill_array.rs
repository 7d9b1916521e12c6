//! `fill_array` binding - fill a 1-D double buffer through the native
//! routine.

use seqfill_buffers::{Tensor, Value};

use crate::builtins::prepare;
use crate::error::FfiError;
use crate::library::NativeLibrary;
use crate::registry::{get_function_signature, load_library, lock_registry};
use crate::DEFAULT_LIB;

type FillArrayFn = unsafe extern "C" fn(*mut f64, usize);

/// Fill a 1-D buffer with `0, 1, 2, ...` via the default native library.
///
/// The input is coerced to a contiguous double-precision vector first;
/// anything other than a 1-D shape is a [`FfiError::ShapeMismatch`]. The
/// filled tensor is RETURNED — it shares the caller's storage only when
/// the input was already a contiguous `f64` tensor, so callers should use
/// the return value rather than rely on in-place mutation.
///
/// Zero-length inputs perform zero writes and never touch the loader.
pub fn fill_array(value: Value) -> Result<Value, FfiError> {
    let tensor = prepare(value, 1)?;
    if tensor.data.is_empty() {
        return Ok(Value::Tensor(tensor));
    }

    if let Some(sig) = get_function_signature(DEFAULT_LIB, "fill_array")? {
        sig.check_fill(1).map_err(FfiError::Signature)?;
    }

    load_library(DEFAULT_LIB)?;
    let registry = lock_registry()?;
    let library = registry.get(DEFAULT_LIB).ok_or_else(|| {
        FfiError::NativeLoad(format!("library '{DEFAULT_LIB}' not found in registry"))
    })?;
    call_fill(library, tensor)
}

/// Same as [`fill_array`], but against an explicitly loaded library
/// instead of the global registry.
pub fn fill_array_in(library: &NativeLibrary, value: Value) -> Result<Value, FfiError> {
    let tensor = prepare(value, 1)?;
    call_fill(library, tensor)
}

fn call_fill(library: &NativeLibrary, mut tensor: Tensor) -> Result<Value, FfiError> {
    let size = tensor.data.len();
    if size == 0 {
        // An empty Vec's pointer is dangling; it never crosses the boundary
        return Ok(Value::Tensor(tensor));
    }

    let func: libloading::Symbol<FillArrayFn> =
        unsafe { library.get_function("fill_array")? };

    log::trace!("fill_array: {size} element(s)");
    unsafe { func(tensor.data.as_mut_ptr(), size) };

    Ok(Value::Tensor(tensor))
}
