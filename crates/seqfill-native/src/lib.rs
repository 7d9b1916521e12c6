//! Native side of the buffer-fill demonstration.
//!
//! This crate builds as a `cdylib` exporting two C-ABI routines that write
//! sequential index values into a caller-owned buffer of doubles:
//!
//! ```c
//! void fill_array(double* arr, size_t size);
//! void fill_array_2d(double* arr, size_t rows, size_t cols);
//! ```
//!
//! The binding crate (`seqfill-ffi`) loads the resulting shared object with
//! `libloading` at runtime and never links against this crate directly —
//! keeping the two sides separated by the dynamic-loading boundary is the
//! point of the exercise.
//!
//! Build the artifact with `cargo build -p seqfill-native`; it lands in the
//! workspace `target/` directory as `libseqfill_native.so` (`.dylib` on
//! macOS, `seqfill_native.dll` on Windows).

/// Write `i as f64` into `data[i]` for every index of the slice.
///
/// Both exported routines reduce their dimension parameters to a flat
/// element count and delegate here; shape is metadata for index
/// decomposition only, never a second copy of the loop.
pub fn fill_sequential(data: &mut [f64]) {
    for (i, slot) in data.iter_mut().enumerate() {
        *slot = i as f64;
    }
}

/// Fill `size` contiguous doubles starting at `arr` with `0, 1, 2, ...`.
///
/// Pure side effect on the buffer; no return value. `size == 0` returns
/// before a slice is ever formed, so a degenerate call performs zero
/// writes.
///
/// # Safety
///
/// `arr` must point to an allocation of at least `size` doubles, valid for
/// writes and unaliased for the duration of the call. The routine performs
/// no bounds checking of its own: a `size` that overstates the allocation
/// is undefined behavior.
#[no_mangle]
pub unsafe extern "C" fn fill_array(arr: *mut f64, size: usize) {
    if size == 0 {
        return;
    }
    debug_assert!(!arr.is_null());
    let data = std::slice::from_raw_parts_mut(arr, size);
    fill_sequential(data);
}

/// Fill a `rows x cols` row-major matrix of doubles with `0, 1, 2, ...`,
/// so slot `(i, j)` receives `i * cols + j`.
///
/// Equivalent to `fill_array(arr, rows * cols)`; the distinct signature
/// exists to demonstrate passing more than one dimension across the
/// boundary.
///
/// # Safety
///
/// Same contract as [`fill_array`] with `size = rows * cols`.
#[no_mangle]
pub unsafe extern "C" fn fill_array_2d(arr: *mut f64, rows: usize, cols: usize) {
    fill_array(arr, rows * cols);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_sequential() {
        let mut data = vec![0.0; 6];
        fill_sequential(&mut data);
        assert_eq!(data, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_fill_sequential_empty() {
        let mut data: Vec<f64> = vec![];
        fill_sequential(&mut data);
        assert!(data.is_empty());
    }

    #[test]
    fn test_fill_array_through_pointer() {
        let mut buffer = vec![-1.0f64; 5];
        unsafe { fill_array(buffer.as_mut_ptr(), buffer.len()) };
        for (i, v) in buffer.iter().enumerate() {
            assert_eq!(*v, i as f64);
        }
    }

    #[test]
    fn test_fill_array_zero_size_ignores_pointer() {
        unsafe { fill_array(std::ptr::null_mut(), 0) };
    }

    #[test]
    fn test_fill_array_2d_row_major() {
        let (rows, cols) = (3usize, 4usize);
        let mut buffer = vec![0.0f64; rows * cols];
        unsafe { fill_array_2d(buffer.as_mut_ptr(), rows, cols) };
        for i in 0..rows {
            for j in 0..cols {
                assert_eq!(buffer[i * cols + j], (i * cols + j) as f64);
            }
        }
    }

    #[test]
    fn test_fill_array_2d_matches_flat_fill() {
        let mut flat = vec![0.0f64; 12];
        let mut grid = vec![0.0f64; 12];
        unsafe {
            fill_array(flat.as_mut_ptr(), 12);
            fill_array_2d(grid.as_mut_ptr(), 3, 4);
        }
        assert_eq!(flat, grid);
    }

    #[test]
    fn test_fill_is_idempotent() {
        let mut buffer = vec![9.0f64; 8];
        unsafe {
            fill_array(buffer.as_mut_ptr(), buffer.len());
            fill_array(buffer.as_mut_ptr(), buffer.len());
        }
        for (i, v) in buffer.iter().enumerate() {
            assert_eq!(*v, i as f64);
        }
    }

    #[test]
    fn test_fill_array_2d_zero_rows() {
        unsafe { fill_array_2d(std::ptr::null_mut(), 0, 7) };
    }
}
