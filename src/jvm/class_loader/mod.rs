//! Locating class files and loading them into [`Class`]es.

use std::{
    collections::HashMap,
    ops::Deref,
    sync::{Arc, Mutex, OnceLock, RwLock},
};

use super::{
    class::Class,
    parsing::{self, ParsingOptions},
};

pub mod class_paths;

pub use class_paths::{DirectoryClassPath, MemoryClassPath};

#[cfg(feature = "jar")]
pub use class_paths::JarClassPath;

/// An error that can occur while loading a class.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The class could not be found.
    #[error("Class not found: {0}")]
    NotFound(String),
    /// Error occurred while parsing the class bytes.
    #[error("Error parsing class bytes: {0}")]
    Malformed(#[from] parsing::Error),
    /// Error occurred while reading the class bytes or locating the class file.
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    /// Other error occurred.
    #[error("Cause: {0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// A source of class files, e.g., a directory or a JAR file.
pub trait ClassPath {
    /// Reads the class file of the class with the given binary name.
    ///
    /// # Errors
    /// - [`Error::NotFound`] if the class path does not contain the class.
    /// - Other variants of [`Error`] if the class file exists but cannot be read.
    fn find_class_bytes(&self, binary_name: &str) -> Result<Vec<u8>, Error>;
}

impl<T> ClassPath for T
where
    T: Deref,
    <T as Deref>::Target: ClassPath,
{
    fn find_class_bytes(&self, binary_name: &str) -> Result<Vec<u8>, Error> {
        self.deref().find_class_bytes(binary_name)
    }
}

/// A class loader that searches a list of class paths in order.
#[derive(Debug)]
pub struct ClassLoader<P> {
    class_path: Vec<P>,
    options: ParsingOptions,
}

impl<P: ClassPath> ClassLoader<P> {
    /// Loads the class with the given binary name from the first class path containing it.
    ///
    /// # Errors
    /// See [`Error`].
    pub fn load_class(&self, binary_name: impl AsRef<str>) -> Result<Class, Error> {
        let binary_name = binary_name.as_ref();
        for class_path in &self.class_path {
            match class_path.find_class_bytes(binary_name) {
                Ok(bytes) => return Class::parse_with(&bytes, &self.options).map_err(Into::into),
                Err(Error::NotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Err(Error::NotFound(binary_name.to_owned()))
    }
}

impl<P> ClassLoader<P> {
    /// Creates a class loader with the given class paths and the default [`ParsingOptions`].
    #[must_use]
    pub fn new(class_path: impl Into<Vec<P>>) -> Self {
        Self::with_options(class_path, ParsingOptions::default())
    }

    /// Creates a class loader with the given class paths and parsing options.
    #[must_use]
    pub fn with_options(class_path: impl Into<Vec<P>>, options: ParsingOptions) -> Self {
        Self {
            class_path: class_path.into(),
            options,
        }
    }

    /// Converts this class loader into a [`CachingClassLoader`].
    #[must_use]
    pub fn into_cached(self) -> CachingClassLoader<P> {
        CachingClassLoader {
            class_loader: self,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

/// A class loader that parses each class at most once.
/// Loaded classes are shared as [`Arc`]s and stay cached until the loader is dropped.
/// Only loads of the same class wait on each other.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct CachingClassLoader<P> {
    class_loader: ClassLoader<P>,
    entries: RwLock<HashMap<String, Arc<CacheEntry>>>,
}

/// The cache slot of one binary name.
#[derive(Debug, Default)]
struct CacheEntry {
    class: OnceLock<Arc<Class>>,
    loading: Mutex<()>,
}

impl<P: ClassPath> CachingClassLoader<P> {
    /// Gets a class from the cache, or loads it and caches it if it is absent.
    /// A failed load is not cached.
    ///
    /// # Errors
    /// See [`Error`].
    pub fn load_class(&self, binary_name: impl AsRef<str>) -> Result<Arc<Class>, Error> {
        let binary_name = binary_name.as_ref();
        let entry = self.entry(binary_name);
        if let Some(class) = entry.class.get() {
            log::debug!("Class cache hit: {binary_name}");
            return Ok(Arc::clone(class));
        }

        // The guard protects no data, so a poisoned lock is still usable.
        let _loading = entry
            .loading
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        // Another thread may have loaded the class while this one was waiting.
        if let Some(class) = entry.class.get() {
            log::debug!("Class cache hit: {binary_name}");
            return Ok(Arc::clone(class));
        }
        log::debug!("Class cache miss: {binary_name}");
        let class = Arc::new(self.class_loader.load_class(binary_name)?);
        Ok(Arc::clone(entry.class.get_or_init(|| class)))
    }

    /// Gets the cache entry of `binary_name`, creating an empty one if it is absent.
    fn entry(&self, binary_name: &str) -> Arc<CacheEntry> {
        // The map is never left half-modified, so a poisoned lock still guards a consistent map.
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poison| poison.into_inner());
        if let Some(entry) = entries.get(binary_name) {
            return Arc::clone(entry);
        }
        drop(entries);
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poison| poison.into_inner());
        Arc::clone(entries.entry(binary_name.to_owned()).or_default())
    }

    /// Checks if a class has been loaded.
    #[must_use]
    pub fn is_loaded(&self, binary_name: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .get(binary_name)
            .is_some_and(|entry| entry.class.get().is_some())
    }

    /// Returns the number of cached classes.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .values()
            .filter(|entry| entry.class.get().is_some())
            .count()
    }
}
