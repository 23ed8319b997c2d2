//! Implementations of [`ClassPath`].

use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
};

#[cfg(feature = "jar")]
use std::{fs::File, io::Read};

use walkdir::WalkDir;
#[cfg(feature = "jar")]
use zip::{ZipArchive, result::ZipError};

use super::{ClassPath, Error};

/// A class path that searches for classes in a directory.
#[derive(Debug)]
pub struct DirectoryClassPath {
    directory: PathBuf,
}

impl DirectoryClassPath {
    /// Creates a new directory class path.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Lists the binary names of the classes in the directory, in lexicographical order.
    ///
    /// # Errors
    /// - [`Error::IO`] if the directory cannot be traversed.
    pub fn class_names(&self) -> Result<Vec<String>, Error> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.directory) {
            let entry = entry.map_err(io::Error::from)?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "class") {
                names.extend(binary_name_of(&self.directory, path));
            }
        }
        names.sort_unstable();
        Ok(names)
    }
}

fn binary_name_of(root: &Path, class_file: &Path) -> Option<String> {
    let relative = class_file.strip_prefix(root).ok()?.with_extension("");
    let segments: Option<Vec<&str>> = relative.iter().map(|it| it.to_str()).collect();
    Some(segments?.join("/"))
}

impl ClassPath for DirectoryClassPath {
    fn find_class_bytes(&self, binary_name: &str) -> Result<Vec<u8>, Error> {
        let class_file_path = self.directory.join(format!("{binary_name}.class"));
        match std::fs::read(class_file_path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(Error::NotFound(binary_name.to_owned()))
            }
            Err(err) => Err(Error::IO(err)),
        }
    }
}

/// A class path over class files held in memory, keyed by binary name.
#[derive(Debug, Default, Clone)]
pub struct MemoryClassPath {
    classes: HashMap<String, Vec<u8>>,
}

impl MemoryClassPath {
    /// Creates an empty class path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class file, replacing any previous one with the same name.
    pub fn insert(&mut self, binary_name: impl Into<String>, bytes: Vec<u8>) {
        self.classes.insert(binary_name.into(), bytes);
    }
}

impl ClassPath for MemoryClassPath {
    fn find_class_bytes(&self, binary_name: &str) -> Result<Vec<u8>, Error> {
        self.classes
            .get(binary_name)
            .cloned()
            .ok_or_else(|| Error::NotFound(binary_name.to_owned()))
    }
}

/// A class path that searches for classes in a JAR file.
#[derive(Debug)]
#[cfg(feature = "jar")]
pub struct JarClassPath {
    jar_file: PathBuf,
}

#[cfg(feature = "jar")]
impl JarClassPath {
    /// Creates a new JAR class path.
    pub fn new(jar_file: impl Into<PathBuf>) -> Self {
        Self {
            jar_file: jar_file.into(),
        }
    }
}

#[cfg(feature = "jar")]
impl ClassPath for JarClassPath {
    fn find_class_bytes(&self, binary_name: &str) -> Result<Vec<u8>, Error> {
        let jar_file = File::open(&self.jar_file)?;
        let mut jar_archive = ZipArchive::new(io::BufReader::new(jar_file)).map_err(|e| match e {
            ZipError::Io(io_err) => Error::IO(io_err),
            e => Error::Other(Box::new(e)),
        })?;
        let mut class_file = jar_archive
            .by_name(&format!("{binary_name}.class"))
            .map_err(|e| match e {
                ZipError::FileNotFound => Error::NotFound(binary_name.to_owned()),
                ZipError::Io(io_err) => Error::IO(io_err),
                e => Error::Other(Box::new(e)),
            })?;
        let mut bytes = Vec::new();
        class_file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}
