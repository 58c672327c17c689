use std::path::PathBuf;

use lazy_regex::{lazy_regex, Lazy, Regex};

use super::Workspace;

static RE_PUBLIC_CLASS: Lazy<Regex> = lazy_regex!(r"public\s+class\s+(\w+)");

/// The name of the first `public class` in `code`.
///
/// ```
/// use assay_core::sandbox::extract_class_name;
///
/// assert_eq!(extract_class_name("public  class\nCounter {}"), Some("Counter"));
/// assert_eq!(extract_class_name("class Counter {}"), None);
/// ```
pub fn extract_class_name(code: &str) -> Option<&str> {
    RE_PUBLIC_CLASS
        .captures(code)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Writes `code` verbatim to `<name>.<ext>` inside the workspace.
pub fn materialize(ws: &Workspace, name: &str, ext: &str, code: &str) -> fsutil::Result<PathBuf> {
    let path = ws.path().join(format!("{}.{}", name, ext));
    fsutil::write(&path, code)?;
    Ok(path)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sandbox::ScratchRoot;

    #[test]
    fn first_public_class_wins() {
        let code = "class Helper {}\npublic class Main {}\npublic class Other {}";
        assert_eq!(extract_class_name(code), Some("Main"));
    }

    #[test]
    fn no_public_class() {
        assert_eq!(extract_class_name(""), None);
        assert_eq!(extract_class_name("public interface Shape {}"), None);
    }

    #[test]
    fn materialize_writes_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let root = ScratchRoot::ensure(tmp.path()).unwrap();
        let ws = Workspace::acquire(&root).unwrap();

        let code = "public class Counter {\r\n}\n";
        let path = materialize(&ws, "Counter", "java", code).unwrap();
        assert_eq!(path, ws.path().join("Counter.java"));
        assert_eq!(fsutil::read_to_string(&path).unwrap(), code);
    }
}
