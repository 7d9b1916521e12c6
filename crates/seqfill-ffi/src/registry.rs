//! Process-global registry of loaded libraries and their declared
//! signatures.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::error::FfiError;
use crate::library::NativeLibrary;
use crate::signature::{FfiSignature, SignatureFile};

/// Loaded libraries and their optional declaration files, keyed by the
/// base name used to load them.
#[derive(Default)]
pub struct LibraryRegistry {
    libraries: HashMap<String, NativeLibrary>,
    signatures: HashMap<String, SignatureFile>,
}

impl LibraryRegistry {
    pub fn get(&self, name: &str) -> Option<&NativeLibrary> {
        self.libraries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.libraries.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, library: NativeLibrary) {
        self.libraries.insert(name.into(), library);
    }

    pub fn signature_for(&self, lib: &str, func: &str) -> Option<&FfiSignature> {
        self.signatures.get(lib).and_then(|file| file.get(func))
    }

    pub fn set_signatures(&mut self, lib: impl Into<String>, file: SignatureFile) {
        self.signatures.insert(lib.into(), file);
    }
}

static REGISTRY: Lazy<Mutex<LibraryRegistry>> =
    Lazy::new(|| Mutex::new(LibraryRegistry::default()));

/// The process-wide registry instance.
pub fn global_registry() -> &'static Mutex<LibraryRegistry> {
    &REGISTRY
}

pub(crate) fn lock_registry() -> Result<MutexGuard<'static, LibraryRegistry>, FfiError> {
    global_registry()
        .lock()
        .map_err(|_| FfiError::NativeLoad("library registry lock poisoned".to_string()))
}

/// Ensure `name` is loaded, resolving the artifact by platform naming
/// rules on first use. Loading is idempotent.
pub fn load_library(name: &str) -> Result<(), FfiError> {
    let mut registry = lock_registry()?;
    if registry.contains(name) {
        return Ok(());
    }
    let library = NativeLibrary::load_by_name(name)?;
    log::debug!("registered native library '{}' from {}", name, library.path());
    registry.insert(name, library);
    Ok(())
}

/// Load `name` from an explicit artifact path, replacing any previously
/// registered library of that name.
pub fn load_library_from(name: &str, path: impl AsRef<Path>) -> Result<(), FfiError> {
    let library = NativeLibrary::load(path)?;
    let mut registry = lock_registry()?;
    registry.insert(name, library);
    Ok(())
}

/// Attach declared signatures to a library name.
pub fn register_signatures(name: &str, file: SignatureFile) -> Result<(), FfiError> {
    let mut registry = lock_registry()?;
    registry.set_signatures(name, file);
    Ok(())
}

/// Declared signature for `func` in `lib`, if one was registered.
pub fn get_function_signature(lib: &str, func: &str) -> Result<Option<FfiSignature>, FfiError> {
    let registry = lock_registry()?;
    Ok(registry.signature_for(lib, func).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::SignatureFile;

    #[test]
    fn test_registry_signatures() {
        let mut registry = LibraryRegistry::default();
        let file =
            SignatureFile::parse("fill_array: (ptr_mut<f64>, usize) -> void").unwrap();
        registry.set_signatures("testlib", file);

        assert!(registry.signature_for("testlib", "fill_array").is_some());
        assert!(registry.signature_for("testlib", "other").is_none());
        assert!(registry.signature_for("otherlib", "fill_array").is_none());
    }

    #[test]
    fn test_load_unknown_library_fails() {
        let err = load_library("seqfill_definitely_missing").unwrap_err();
        assert!(matches!(err, FfiError::NativeLoad(_)));
    }
}
