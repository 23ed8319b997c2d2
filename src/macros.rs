/// Expands to a doc string linking to a section of the JVM Specification (Java SE 21).
macro_rules! see_jvm_spec {
    ($chapter:literal $(, $section:literal)* $(,)?) => {
        concat!(
            "See the [JVM Specification §",
            $chapter $(, ".", $section)*,
            "](https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-",
            $chapter,
            ".html#jvms-",
            $chapter $(, ".", $section)*,
            ") for more information."
        )
    };
}

/// Returns early with [`Error::MalformedClassFile`](crate::jvm::parsing::Error::MalformedClassFile).
macro_rules! malform {
    ($msg:literal) => {
        return Err($crate::jvm::parsing::Error::MalformedClassFile($msg))
    };
}

pub(crate) use malform;
pub(crate) use see_jvm_spec;
