use std::{cell::Cell, fs, path::PathBuf};

use demitasse::jvm::class_loader::{
    ClassLoader, ClassPath, DirectoryClassPath, Error, MemoryClassPath,
};

mod common;

use common::ClassBytes;

fn memory_class_path() -> MemoryClassPath {
    let mut class_path = MemoryClassPath::new();
    for name in ["org/pkg/MyClass", "org/pkg/Other"] {
        class_path.insert(
            name,
            ClassBytes::new(name).super_class("java/lang/Object").build(),
        );
    }
    class_path
}

#[test]
fn load_class() {
    let class_path = memory_class_path();
    let class_loader = ClassLoader::new(vec![&class_path]);
    let class = class_loader.load_class("org/pkg/MyClass").unwrap();
    assert_eq!(class.binary_name().unwrap(), "org/pkg/MyClass");
}

#[test]
fn load_absent_class() {
    let class_path = memory_class_path();
    let class_loader = ClassLoader::new(vec![&class_path]);
    let class = class_loader.load_class("org/pkg/MyAbsentClass");
    assert!(matches!(class, Err(Error::NotFound(_))));
}

#[derive(Debug)]
struct CountingClassPath<'c> {
    inner: MemoryClassPath,
    counter: &'c Cell<usize>,
}

impl ClassPath for CountingClassPath<'_> {
    fn find_class_bytes(&self, binary_name: &str) -> Result<Vec<u8>, Error> {
        self.counter.set(self.counter.get() + 1);
        self.inner.find_class_bytes(binary_name)
    }
}

#[test]
fn caching_class_loader_load_once() {
    let counter = Cell::new(0);
    let class_path = CountingClassPath {
        inner: memory_class_path(),
        counter: &counter,
    };
    let class_loader = ClassLoader::new(vec![&class_path]).into_cached();
    for _ in 0..10 {
        let class = class_loader.load_class("org/pkg/MyClass").unwrap();
        assert_eq!(class.binary_name().unwrap(), "org/pkg/MyClass");
    }
    assert_eq!(counter.get(), 1);

    class_loader.load_class("org/pkg/Other").unwrap();
    assert_eq!(counter.get(), 2);
    assert_eq!(class_loader.loaded_count(), 2);
}

#[test]
fn caching_class_loader_retries_absent_classes() {
    let counter = Cell::new(0);
    let class_path = CountingClassPath {
        inner: memory_class_path(),
        counter: &counter,
    };
    let class_loader = ClassLoader::new(vec![&class_path]).into_cached();
    for _ in 0..3 {
        assert!(class_loader.load_class("org/pkg/Missing").is_err());
    }
    assert_eq!(counter.get(), 3);
}

struct TempDir(PathBuf);

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("demitasse-{name}-{}", std::process::id()));
        fs::create_dir_all(&path).unwrap();
        Self(path)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

#[test]
fn directory_class_path() {
    let dir = TempDir::new("classes");
    for name in ["org/pkg/A", "org/pkg/sub/B", "C"] {
        let file = dir.0.join(format!("{name}.class"));
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, ClassBytes::new(name).build()).unwrap();
    }
    fs::write(dir.0.join("README.txt"), "not a class").unwrap();

    let class_path = DirectoryClassPath::new(&dir.0);
    assert_eq!(
        class_path.class_names().unwrap(),
        ["C", "org/pkg/A", "org/pkg/sub/B"]
    );
    let class_loader = ClassLoader::new(vec![class_path]);
    let class = class_loader.load_class("org/pkg/sub/B").unwrap();
    assert_eq!(class.binary_name().unwrap(), "org/pkg/sub/B");
    assert!(matches!(
        class_loader.load_class("org/pkg/Z"),
        Err(Error::NotFound(_))
    ));
}
