//! Native library loading and symbol lookup.

use libloading::{Library, Symbol};
use std::ffi::CString;
use std::path::Path;

use crate::error::FfiError;

/// Directory checked first when resolving a library by name.
const LIBRARY_PATH_VAR: &str = "SEQFILL_LIBRARY_PATH";

/// A loaded native shared object.
#[derive(Debug)]
pub struct NativeLibrary {
    /// The underlying library handle
    library: Library,
    /// Path it was resolved from (for error messages)
    path: String,
}

impl NativeLibrary {
    /// Load a shared object from an explicit path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FfiError> {
        let path = path.as_ref();
        let library = unsafe { Library::new(path) }.map_err(|e| {
            FfiError::NativeLoad(format!("failed to load '{}': {}", path.display(), e))
        })?;
        log::debug!("loaded native library from {}", path.display());
        Ok(Self {
            library,
            path: path.display().to_string(),
        })
    }

    /// Load a library by base name (no prefix, no extension).
    ///
    /// Resolution order: the directory named by `SEQFILL_LIBRARY_PATH`,
    /// the current directory, then the system loader's own search path.
    pub fn load_by_name(name: &str) -> Result<Self, FfiError> {
        let file_name = Self::platform_lib_name(name);

        if let Ok(dir) = std::env::var(LIBRARY_PATH_VAR) {
            let candidate = Path::new(&dir).join(&file_name);
            if candidate.exists() {
                return Self::load(candidate);
            }
            log::debug!("{file_name} not found under {LIBRARY_PATH_VAR}={dir}");
        }

        if Path::new(&file_name).exists() {
            return Self::load(&file_name);
        }

        let library = unsafe { Library::new(&file_name) }.map_err(|e| {
            FfiError::NativeLoad(format!(
                "failed to load library '{name}' (tried '{file_name}'): {e}"
            ))
        })?;
        log::debug!("loaded native library '{name}' via system search path");
        Ok(Self {
            library,
            path: file_name,
        })
    }

    /// Platform-specific shared-object filename for a base name.
    fn platform_lib_name(name: &str) -> String {
        #[cfg(target_os = "windows")]
        {
            format!("{name}.dll")
        }
        #[cfg(target_os = "macos")]
        {
            format!("lib{name}.dylib")
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            format!("lib{name}.so")
        }
    }

    /// Resolve a symbol as a typed function pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the symbol exists in the library and
    /// that `F` matches the function's actual ABI. A wrong `F` is not
    /// detectable here and makes any later call undefined behavior.
    pub unsafe fn get_function<F>(&self, name: &str) -> Result<Symbol<'_, F>, FfiError> {
        let c_name = CString::new(name)
            .map_err(|_| FfiError::NativeLoad(format!("invalid symbol name: {name}")))?;

        self.library.get(c_name.as_bytes_with_nul()).map_err(|e| {
            FfiError::NativeLoad(format!(
                "symbol '{}' not found in '{}': {}",
                name, self.path, e
            ))
        })
    }

    /// Path this library was resolved from.
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_lib_name() {
        let name = NativeLibrary::platform_lib_name("seqfill_native");
        #[cfg(target_os = "windows")]
        assert_eq!(name, "seqfill_native.dll");
        #[cfg(target_os = "macos")]
        assert_eq!(name, "libseqfill_native.dylib");
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        assert_eq!(name, "libseqfill_native.so");
    }

    #[test]
    fn test_load_missing_path_is_native_load_error() {
        let err = NativeLibrary::load("/nonexistent/libseqfill_nope.so").unwrap_err();
        assert!(matches!(err, FfiError::NativeLoad(_)));
    }
}
