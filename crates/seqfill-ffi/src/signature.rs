//! Declared signatures for natively loaded functions.
//!
//! A `.ffi` file declares the types a native function expects before any
//! call is made through it — the same job an `argtypes` declaration does
//! in dynamic binding layers:
//!
//! ```text
//! # Comment lines start with #
//! fill_array: (ptr_mut<f64>, usize) -> void
//! fill_array_2d: (ptr_mut<f64>, usize, usize) -> void
//! ```
//!
//! Supported types: `f64`/`double`, `f32`/`float`, `i32`/`int`, `i64`,
//! `usize`/`size_t`, `ptr<T>`, `ptr_mut<T>`, `void` (return only).

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// A type in a declared native signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FfiType {
    /// 64-bit floating point (double)
    F64,
    /// 32-bit floating point (float)
    F32,
    /// 32-bit signed integer
    I32,
    /// 64-bit signed integer
    I64,
    /// Pointer-sized unsigned integer (size_t)
    Usize,
    /// Immutable pointer to the inner type
    Ptr(Box<FfiType>),
    /// Mutable pointer to the inner type
    PtrMut(Box<FfiType>),
    /// No value (return type only)
    Void,
}

impl FfiType {
    /// Parse a type from its declaration spelling.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(inner) = s.strip_prefix("ptr_mut<").and_then(|r| r.strip_suffix('>')) {
            return FfiType::parse(inner).map(|t| FfiType::PtrMut(Box::new(t)));
        }
        if let Some(inner) = s.strip_prefix("ptr<").and_then(|r| r.strip_suffix('>')) {
            return FfiType::parse(inner).map(|t| FfiType::Ptr(Box::new(t)));
        }
        match s.to_lowercase().as_str() {
            "f64" | "double" => Some(FfiType::F64),
            "f32" | "float" => Some(FfiType::F32),
            "i32" | "int" | "int32" => Some(FfiType::I32),
            "i64" | "int64" => Some(FfiType::I64),
            "usize" | "size_t" => Some(FfiType::Usize),
            "void" => Some(FfiType::Void),
            _ => None,
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, FfiType::Ptr(_) | FfiType::PtrMut(_))
    }
}

impl fmt::Display for FfiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiType::F64 => write!(f, "f64"),
            FfiType::F32 => write!(f, "f32"),
            FfiType::I32 => write!(f, "i32"),
            FfiType::I64 => write!(f, "i64"),
            FfiType::Usize => write!(f, "usize"),
            FfiType::Ptr(inner) => write!(f, "ptr<{inner}>"),
            FfiType::PtrMut(inner) => write!(f, "ptr_mut<{inner}>"),
            FfiType::Void => write!(f, "void"),
        }
    }
}

/// A declared signature for one native function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfiSignature {
    /// Symbol name in the native library
    pub name: String,
    /// Argument types
    pub args: Vec<FfiType>,
    /// Return type
    pub ret: FfiType,
}

impl FfiSignature {
    pub fn new(name: impl Into<String>, args: Vec<FfiType>, ret: FfiType) -> Self {
        Self {
            name: name.into(),
            args,
            ret,
        }
    }

    /// Number of `usize` dimension parameters the declaration carries.
    pub fn dim_params(&self) -> usize {
        self.args.iter().filter(|t| **t == FfiType::Usize).count()
    }

    /// Check that this declaration describes a fill entry point: a
    /// mutable double pointer first, `dims` dimension parameters, no
    /// return value.
    pub fn check_fill(&self, dims: usize) -> Result<(), String> {
        match self.args.first() {
            Some(FfiType::PtrMut(inner)) if **inner == FfiType::F64 => {}
            _ => {
                return Err(format!(
                    "'{}' is declared as {} but the entry point passes a mutable double pointer first",
                    self.name, self
                ));
            }
        }
        let declared = self.dim_params();
        if declared != dims {
            return Err(format!(
                "'{}' is declared with {} dimension parameter(s) but the entry point passes {}",
                self.name, declared, dims
            ));
        }
        if self.ret != FfiType::Void {
            return Err(format!(
                "'{}' is declared to return {} but the entry point expects no return value",
                self.name, self.ret
            ));
        }
        Ok(())
    }
}

impl fmt::Display for FfiSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

/// A parsed `.ffi` declaration file.
#[derive(Debug, Clone, Default)]
pub struct SignatureFile {
    /// Declared signatures indexed by symbol name
    pub signatures: HashMap<String, FfiSignature>,
}

impl SignatureFile {
    /// Parse a declaration file from a path.
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ParseError {
            line: 0,
            message: format!("failed to read file: {e}"),
        })?;
        Self::parse(&content)
    }

    /// Parse declaration content from a string.
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let mut signatures = HashMap::new();

        for (line_num, line) in content.lines().enumerate() {
            let line_num = line_num + 1; // 1-indexed for error messages
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let sig = parse_signature_line(line, line_num)?;
            signatures.insert(sig.name.clone(), sig);
        }

        Ok(Self { signatures })
    }

    pub fn get(&self, name: &str) -> Option<&FfiSignature> {
        self.signatures.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.signatures.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FfiSignature> {
        self.signatures.values()
    }
}

/// Error in a declaration file.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "line {}: {}", self.line, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ParseError {}

fn err(line: usize, message: impl Into<String>) -> ParseError {
    ParseError {
        line,
        message: message.into(),
    }
}

/// Parse one declaration: `name: (arg_types) -> return_type`.
fn parse_signature_line(line: &str, line_num: usize) -> Result<FfiSignature, ParseError> {
    let (name, rest) = line
        .split_once(':')
        .ok_or_else(|| err(line_num, "expected ':' after function name"))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(err(line_num, "function name cannot be empty"));
    }

    let (args_part, ret_part) = rest
        .split_once("->")
        .ok_or_else(|| err(line_num, "expected '->' before return type"))?;

    let args_inner = args_part
        .trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| err(line_num, "expected parenthesized argument list"))?;

    let mut args = Vec::new();
    if !args_inner.trim().is_empty() {
        for piece in args_inner.split(',') {
            let arg = FfiType::parse(piece).ok_or_else(|| {
                err(line_num, format!("unknown argument type: '{}'", piece.trim()))
            })?;
            args.push(arg);
        }
    }

    let ret_str = ret_part.trim();
    let ret = FfiType::parse(ret_str)
        .ok_or_else(|| err(line_num, format!("unknown return type: '{ret_str}'")))?;

    Ok(FfiSignature::new(name, args, ret))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fill_declaration() {
        let sig = parse_signature_line("fill_array: (ptr_mut<f64>, usize) -> void", 1).unwrap();
        assert_eq!(sig.name, "fill_array");
        assert_eq!(
            sig.args,
            vec![FfiType::PtrMut(Box::new(FfiType::F64)), FfiType::Usize]
        );
        assert_eq!(sig.ret, FfiType::Void);
        assert_eq!(sig.dim_params(), 1);
    }

    #[test]
    fn test_parse_nullary() {
        let sig = parse_signature_line("get_pi: () -> f64", 1).unwrap();
        assert_eq!(sig.name, "get_pi");
        assert!(sig.args.is_empty());
        assert_eq!(sig.ret, FfiType::F64);
    }

    #[test]
    fn test_parse_file_content() {
        let content = r#"
# Fill routines
fill_array: (ptr_mut<f64>, usize) -> void
fill_array_2d: (ptr_mut<f64>, usize, usize) -> void
"#;
        let file = SignatureFile::parse(content).unwrap();
        assert_eq!(file.signatures.len(), 2);
        assert!(file.contains("fill_array"));
        assert!(file.contains("fill_array_2d"));
        assert_eq!(file.get("fill_array_2d").unwrap().dim_params(), 2);
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        let e = SignatureFile::parse("\nfill_array (ptr_mut<f64>) -> void").unwrap_err();
        assert_eq!(e.line, 2);

        let e = SignatureFile::parse("fill_array: (banana) -> void").unwrap_err();
        assert!(e.message.contains("banana"));
    }

    #[test]
    fn test_check_fill() {
        let good = parse_signature_line("fill_array: (ptr_mut<f64>, usize) -> void", 1).unwrap();
        assert!(good.check_fill(1).is_ok());
        assert!(good.check_fill(2).is_err());

        let const_ptr = parse_signature_line("fill_array: (ptr<f64>, usize) -> void", 1).unwrap();
        assert!(const_ptr.check_fill(1).is_err());

        let wrong_ret = parse_signature_line("fill_array: (ptr_mut<f64>, usize) -> i32", 1).unwrap();
        assert!(wrong_ret.check_fill(1).is_err());
    }

    #[test]
    fn test_type_display_round_trips() {
        let t = FfiType::PtrMut(Box::new(FfiType::F64));
        assert_eq!(FfiType::parse(&t.to_string()), Some(t));
    }
}
