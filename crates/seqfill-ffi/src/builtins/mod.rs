//! Public binding entry points.

mod fill_array;
mod fill_array_2d;

pub use fill_array::{fill_array, fill_array_in};
pub use fill_array_2d::{fill_array_2d, fill_array_2d_in};

use seqfill_buffers::{to_contiguous_f64, Tensor, Value};

use crate::error::FfiError;

/// Coerce a caller value into a contiguous `f64` tensor and prove the
/// dimensionality an entry point expects.
pub(crate) fn prepare(value: Value, dims: usize) -> Result<Tensor, FfiError> {
    let coerced = to_contiguous_f64(value).map_err(FfiError::TypeConversion)?;
    let got = coerced.tensor.shape.len();
    if got != dims {
        return Err(FfiError::ShapeMismatch {
            expected: dims,
            got,
        });
    }
    if !coerced.reused {
        log::debug!("input coerced into a fresh buffer; caller storage is left untouched");
    }
    Ok(coerced.tensor)
}
