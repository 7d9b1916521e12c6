//! Value model for the buffer-fill demonstration.
//!
//! Callers hand the binding layer a [`Value`] — a scalar, an integer or
//! double tensor, or a strided view — and [`to_contiguous_f64`] turns it
//! into a [`Tensor`]: an owned, contiguous, row-major `f64` buffer whose
//! element count provably matches its shape. That checked tensor is the
//! only thing from which the ffi crate ever derives a raw pointer.

use std::convert::TryFrom;
use std::fmt;

/// A dynamically typed caller value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Num(f64),
    Bool(bool),
    Str(String),
    Tensor(Tensor),
    IntTensor(IntTensor),
    View(TensorView),
}

/// An owned, contiguous, row-major buffer of doubles.
///
/// Construction enforces `data.len() == shape.iter().product()`, so any
/// `Tensor` in hand is safe to expose to native code as a pointer plus its
/// shape: the advertised dimensions never overstate the allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    pub data: Vec<f64>,
    pub shape: Vec<usize>, // Row-major layout
    pub rows: usize,       // Compatibility for 2D usage
    pub cols: usize,       // Compatibility for 2D usage
}

/// An owned, contiguous, row-major buffer of 64-bit integers.
///
/// Exists to demonstrate dtype coercion: integer input is widened to
/// `f64` before crossing the native boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct IntTensor {
    pub data: Vec<i64>,
    pub shape: Vec<usize>,
}

fn rows_cols(shape: &[usize]) -> (usize, usize) {
    if shape.len() >= 2 {
        (shape[0], shape[1])
    } else if shape.len() == 1 {
        (1, shape[0])
    } else {
        (0, 0)
    }
}

impl Tensor {
    pub fn new(data: Vec<f64>, shape: Vec<usize>) -> Result<Self, String> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(format!(
                "Tensor data length {} doesn't match shape {:?} ({} elements)",
                data.len(),
                shape,
                expected
            ));
        }
        let (rows, cols) = rows_cols(&shape);
        Ok(Tensor { data, shape, rows, cols })
    }

    pub fn new_2d(data: Vec<f64>, rows: usize, cols: usize) -> Result<Self, String> {
        Self::new(data, vec![rows, cols])
    }

    pub fn zeros(shape: Vec<usize>) -> Self {
        let size: usize = shape.iter().product();
        let (rows, cols) = rows_cols(&shape);
        Tensor { data: vec![0.0; size], shape, rows, cols }
    }

    pub fn rows(&self) -> usize {
        self.shape.first().copied().unwrap_or(1)
    }

    pub fn cols(&self) -> usize {
        self.shape.get(1).copied().unwrap_or(1)
    }

    pub fn get2(&self, row: usize, col: usize) -> Result<f64, String> {
        let rows = self.rows();
        let cols = self.cols();
        if row >= rows || col >= cols {
            return Err(format!(
                "Index ({}, {}) out of bounds for {}x{} tensor",
                row, col, rows, cols
            ));
        }
        // Row-major linearization: lin = row*cols + col
        Ok(self.data[row * cols + col])
    }

    pub fn set2(&mut self, row: usize, col: usize, value: f64) -> Result<(), String> {
        let rows = self.rows();
        let cols = self.cols();
        if row >= rows || col >= cols {
            return Err(format!(
                "Index ({}, {}) out of bounds for {}x{} tensor",
                row, col, rows, cols
            ));
        }
        self.data[row * cols + col] = value;
        Ok(())
    }
}

impl IntTensor {
    pub fn new(data: Vec<i64>, shape: Vec<usize>) -> Result<Self, String> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(format!(
                "IntTensor data length {} doesn't match shape {:?} ({} elements)",
                data.len(),
                shape,
                expected
            ));
        }
        Ok(IntTensor { data, shape })
    }

    /// Widen to a double tensor. Exact for every value the fill routines
    /// produce (small integers are exactly representable as doubles).
    pub fn to_f64_tensor(&self) -> Tensor {
        let data = self.data.iter().map(|&v| v as f64).collect();
        // Shape already validated against the data length at construction
        Tensor::new(data, self.shape.clone()).unwrap()
    }
}

/// A possibly strided window over owned `f64` storage.
///
/// `strides` are in elements and may be negative (a reversed axis), so
/// this type can express the non-contiguous inputs the coercion step has
/// to detect and copy. `offset` is the storage index of the logical first
/// element.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorView {
    pub data: Vec<f64>,
    pub shape: Vec<usize>,
    pub strides: Vec<isize>,
    pub offset: usize,
}

impl TensorView {
    /// Build a view, checking that every addressable element stays inside
    /// the backing storage.
    pub fn new(
        data: Vec<f64>,
        shape: Vec<usize>,
        strides: Vec<isize>,
        offset: usize,
    ) -> Result<Self, String> {
        if shape.len() != strides.len() {
            return Err(format!(
                "View shape {:?} and strides {:?} have different ranks",
                shape, strides
            ));
        }
        let numel: usize = shape.iter().product();
        if numel > 0 {
            let mut lo = offset as isize;
            let mut hi = offset as isize;
            for (&dim, &stride) in shape.iter().zip(&strides) {
                let span = (dim as isize - 1) * stride;
                if span >= 0 {
                    hi += span;
                } else {
                    lo += span;
                }
            }
            if lo < 0 || hi as usize >= data.len() {
                return Err(format!(
                    "View addresses [{lo}, {hi}] outside storage of {} element(s)",
                    data.len()
                ));
            }
        }
        Ok(TensorView { data, shape, strides, offset })
    }

    /// A packed row-major view over a tensor's storage.
    pub fn from_tensor(tensor: Tensor) -> Self {
        let strides = packed_strides(&tensor.shape);
        TensorView {
            data: tensor.data,
            shape: tensor.shape,
            strides,
            offset: 0,
        }
    }

    /// A view of `tensor` with its leading axis reversed. For a vector
    /// this is the whole buffer backwards; for a matrix, the rows in
    /// reverse order.
    pub fn reversed(tensor: Tensor) -> Self {
        let mut view = Self::from_tensor(tensor);
        if let (Some(&dim), Some(stride)) = (view.shape.first(), view.strides.first_mut()) {
            if dim > 1 {
                view.offset = (dim - 1) * stride.unsigned_abs();
                *stride = -*stride;
            }
        }
        view
    }

    /// Whether the logical layout is packed row-major (no gaps, no
    /// reordering). A contiguous view can still sit at a nonzero offset
    /// inside larger storage.
    pub fn is_contiguous(&self) -> bool {
        self.strides == packed_strides(&self.shape)
    }

    /// Copy the viewed elements into a fresh buffer in row-major order.
    pub fn gather(&self) -> Vec<f64> {
        let numel: usize = self.shape.iter().product();
        let mut out = Vec::with_capacity(numel);
        let mut index = vec![0usize; self.shape.len()];
        for _ in 0..numel {
            let mut addr = self.offset as isize;
            for (d, &i) in index.iter().enumerate() {
                addr += i as isize * self.strides[d];
            }
            out.push(self.data[addr as usize]);
            for d in (0..index.len()).rev() {
                index[d] += 1;
                if index[d] < self.shape[d] {
                    break;
                }
                index[d] = 0;
            }
        }
        out
    }
}

fn packed_strides(shape: &[usize]) -> Vec<isize> {
    let mut strides = vec![1isize; shape.len()];
    for d in (0..shape.len().saturating_sub(1)).rev() {
        strides[d] = strides[d + 1] * shape[d + 1].max(1) as isize;
    }
    strides
}

/// Result of coercing a [`Value`] into a contiguous `f64` buffer.
///
/// `reused` records whether the caller's own storage is the one about to
/// be filled, or whether a fresh copy was materialized (strided views,
/// integer data, scalars). The distinction is surfaced rather than hidden:
/// the binding wrappers always return the filled tensor instead of
/// promising in-place mutation of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedBuffer {
    pub tensor: Tensor,
    pub reused: bool,
}

/// Coerce any numeric [`Value`] into an owned contiguous row-major `f64`
/// tensor.
///
/// - `Tensor` passes its storage through untouched (no copy).
/// - A packed view covering its whole storage hands that storage over;
///   any other view is gathered into a fresh buffer.
/// - Integer tensors are widened element-wise.
/// - Scalars become one-element vectors.
/// - Strings are not numeric-coercible.
pub fn to_contiguous_f64(value: Value) -> Result<CoercedBuffer, String> {
    match value {
        Value::Tensor(t) => Ok(CoercedBuffer { tensor: t, reused: true }),
        Value::View(v) => {
            let numel: usize = v.shape.iter().product();
            if v.is_contiguous() && v.offset == 0 && v.data.len() == numel {
                let tensor = Tensor::new(v.data, v.shape)?;
                Ok(CoercedBuffer { tensor, reused: true })
            } else {
                log::debug!(
                    "gathering strided view (shape {:?}, strides {:?}) into a fresh buffer",
                    v.shape,
                    v.strides
                );
                let tensor = Tensor::new(v.gather(), v.shape)?;
                Ok(CoercedBuffer { tensor, reused: false })
            }
        }
        Value::IntTensor(it) => Ok(CoercedBuffer { tensor: it.to_f64_tensor(), reused: false }),
        Value::Num(n) => Ok(CoercedBuffer {
            tensor: Tensor::new(vec![n], vec![1])?,
            reused: false,
        }),
        Value::Int(i) => Ok(CoercedBuffer {
            tensor: Tensor::new(vec![i as f64], vec![1])?,
            reused: false,
        }),
        Value::Bool(b) => Ok(CoercedBuffer {
            tensor: Tensor::new(vec![if b { 1.0 } else { 0.0 }], vec![1])?,
            reused: false,
        }),
        Value::Str(s) => Err(format!("cannot coerce string {s:?} into a numeric buffer")),
    }
}

// From implementations for Value
impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Num(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<Tensor> for Value {
    fn from(t: Tensor) -> Self {
        Value::Tensor(t)
    }
}

impl From<IntTensor> for Value {
    fn from(t: IntTensor) -> Self {
        Value::IntTensor(t)
    }
}

impl From<TensorView> for Value {
    fn from(v: TensorView) -> Self {
        Value::View(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(data: Vec<f64>) -> Self {
        let len = data.len();
        Value::Tensor(Tensor { data, shape: vec![len], rows: 1, cols: len })
    }
}

// TryFrom implementations for extracting native types
impl TryFrom<&Value> for f64 {
    type Error = String;
    fn try_from(v: &Value) -> Result<Self, Self::Error> {
        match v {
            Value::Num(n) => Ok(*n),
            Value::Int(i) => Ok(*i as f64),
            _ => Err(format!("cannot convert {v:?} to f64")),
        }
    }
}

impl TryFrom<&Value> for i32 {
    type Error = String;
    fn try_from(v: &Value) -> Result<Self, Self::Error> {
        match v {
            Value::Int(i) => Ok(*i),
            Value::Num(n) => Ok(*n as i32),
            _ => Err(format!("cannot convert {v:?} to i32")),
        }
    }
}

impl TryFrom<Value> for Tensor {
    type Error = String;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Tensor(t) => Ok(t),
            _ => Err(format!("cannot convert {v:?} to Tensor")),
        }
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape.len() {
            0 | 1 => {
                // Treat as row vector for display
                write!(f, "[")?;
                for (i, v) in self.data.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            2 => {
                let rows = self.rows();
                let cols = self.cols();
                write!(f, "[")?;
                for r in 0..rows {
                    for c in 0..cols {
                        if c > 0 {
                            write!(f, " ")?;
                        }
                        write!(f, "{}", self.data[r * cols + c])?;
                    }
                    if r + 1 < rows {
                        write!(f, "; ")?;
                    }
                }
                write!(f, "]")
            }
            _ => write!(f, "Tensor(shape={:?})", self.shape),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Num(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "\"{s}\""),
            Value::Tensor(t) => write!(f, "{t}"),
            Value::IntTensor(t) => write!(f, "IntTensor(shape={:?})", t.shape),
            Value::View(v) => write!(f, "View(shape={:?}, strides={:?})", v.shape, v.strides),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_shape_invariant() {
        assert!(Tensor::new(vec![1.0, 2.0], vec![3]).is_err());
        let t = Tensor::new(vec![1.0, 2.0, 3.0], vec![3]).unwrap();
        assert_eq!(t.rows, 1);
        assert_eq!(t.cols, 3);
    }

    #[test]
    fn test_tensor_row_major_indexing() {
        let t = Tensor::new_2d((0..6).map(|v| v as f64).collect(), 2, 3).unwrap();
        assert_eq!(t.get2(0, 2).unwrap(), 2.0);
        assert_eq!(t.get2(1, 0).unwrap(), 3.0);
        assert!(t.get2(2, 0).is_err());
    }

    #[test]
    fn test_zero_sized_tensor() {
        let t = Tensor::zeros(vec![0]);
        assert!(t.data.is_empty());
        let t = Tensor::zeros(vec![0, 5]);
        assert!(t.data.is_empty());
        assert_eq!(t.cols, 5);
    }

    #[test]
    fn test_coerce_tensor_reuses_storage() {
        let t = Tensor::zeros(vec![4]);
        let coerced = to_contiguous_f64(Value::Tensor(t)).unwrap();
        assert!(coerced.reused);
        assert_eq!(coerced.tensor.shape, vec![4]);
    }

    #[test]
    fn test_coerce_int_tensor_is_exact() {
        let it = IntTensor::new(vec![0, 1, 2, 3], vec![4]).unwrap();
        let coerced = to_contiguous_f64(Value::IntTensor(it)).unwrap();
        assert!(!coerced.reused);
        assert_eq!(coerced.tensor.data, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_coerce_scalar() {
        let coerced = to_contiguous_f64(Value::Num(2.5)).unwrap();
        assert_eq!(coerced.tensor.shape, vec![1]);
        assert_eq!(coerced.tensor.data, vec![2.5]);
    }

    #[test]
    fn test_coerce_string_fails() {
        assert!(to_contiguous_f64(Value::from("not numbers")).is_err());
    }

    #[test]
    fn test_reversed_view_gathers() {
        let t = Tensor::new(vec![10.0, 20.0, 30.0], vec![3]).unwrap();
        let view = TensorView::reversed(t);
        assert!(!view.is_contiguous());
        assert_eq!(view.gather(), vec![30.0, 20.0, 10.0]);

        let coerced = to_contiguous_f64(Value::View(view)).unwrap();
        assert!(!coerced.reused);
        assert_eq!(coerced.tensor.data, vec![30.0, 20.0, 10.0]);
    }

    #[test]
    fn test_packed_view_reuses_storage() {
        let t = Tensor::new_2d(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        let view = TensorView::from_tensor(t);
        assert!(view.is_contiguous());
        let coerced = to_contiguous_f64(Value::View(view)).unwrap();
        assert!(coerced.reused);
        assert_eq!(coerced.tensor.data, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_reversed_matrix_view() {
        let t = Tensor::new_2d((0..6).map(|v| v as f64).collect(), 3, 2).unwrap();
        let view = TensorView::reversed(t);
        assert_eq!(view.gather(), vec![4.0, 5.0, 2.0, 3.0, 0.0, 1.0]);
    }

    #[test]
    fn test_view_bounds_are_checked() {
        assert!(TensorView::new(vec![1.0, 2.0], vec![3], vec![1], 0).is_err());
        assert!(TensorView::new(vec![1.0, 2.0], vec![2], vec![-1], 0).is_err());
        assert!(TensorView::new(vec![1.0, 2.0], vec![2], vec![-1], 1).is_ok());
    }

    #[test]
    fn test_empty_view_gather() {
        let view = TensorView::new(vec![], vec![0], vec![1], 0).unwrap();
        assert!(view.gather().is_empty());
    }

    #[test]
    fn test_display_2d() {
        let t = Tensor::new_2d(vec![0.0, 1.0, 2.0, 3.0], 2, 2).unwrap();
        assert_eq!(format!("{t}"), "[0 1; 2 3]");
    }
}
