//! End-to-end demonstration: load the native library, fill a vector and a
//! matrix, print the results.
//!
//! Build the native artifact first, then point the loader at it:
//!
//! ```text
//! cargo build -p seqfill-native
//! SEQFILL_LIBRARY_PATH=target/debug cargo run -p seqfill-ffi --example fill_demo
//! ```

use seqfill_buffers::{IntTensor, Tensor, TensorView, Value};
use seqfill_ffi::builtins::{fill_array, fill_array_2d};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Contiguous double-precision input: its own storage is filled.
    let vector = fill_array(Value::Tensor(Tensor::zeros(vec![5])))?;
    println!("1-D fill:          {vector}");

    let matrix = fill_array_2d(Value::Tensor(Tensor::zeros(vec![3, 4])))?;
    println!("2-D fill:          {matrix}");

    // Integer input is widened to f64 before crossing the boundary.
    let ints = IntTensor::new(vec![7, 7, 7], vec![3])?;
    let widened = fill_array(Value::IntTensor(ints))?;
    println!("int input:         {widened}");

    // A reversed view is not contiguous; the wrapper gathers it into a
    // fresh buffer and fills that, which is why the filled tensor is
    // returned rather than mutated in place.
    let view = TensorView::reversed(Tensor::zeros(vec![4]));
    let gathered = fill_array(Value::View(view))?;
    println!("strided input:     {gathered}");

    Ok(())
}
