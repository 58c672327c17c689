//! `#{name}` template interpolation for toolchain commands.
//!
//! `##` is an escaped `#`. Anything else is copied verbatim.

use std::{borrow::Cow, path::Path};

pub type Result = std::result::Result<String, InterpError>;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InterpError {
    #[error("Undefined variable '{0}' at column {1}")]
    UndefinedVar(String, usize),

    #[error("Unclosed brace (opened at column {0})")]
    UnclosedBrace(usize),
}

pub fn interp<'v, F>(fmt: &str, lookup: F) -> Result
where
    F: Fn(&str) -> Option<Cow<'v, str>>,
{
    let mut res = String::with_capacity(fmt.len() * 2);
    let mut chars = fmt.chars().enumerate().peekable();

    while let Some((col, c)) = chars.next() {
        if c != '#' {
            res.push(c);
            continue;
        }
        match chars.peek() {
            Some((_, '#')) => {
                chars.next();
                res.push('#');
            }
            Some((_, '{')) => {
                chars.next();
                let mut name = String::with_capacity(16);
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(InterpError::UnclosedBrace(col + 1));
                }
                let Some(value) = lookup(&name) else {
                    return Err(InterpError::UndefinedVar(name, col + 1));
                };
                res += &value;
            }
            _ => res.push('#'),
        }
    }

    Ok(res)
}

/// Variables describing one file, as seen from its own directory.
///
/// ```
/// use assay_core::str_interp::{interp, FileVars};
///
/// let vars = FileVars::new("/tmp/ws/Main.java");
/// let cmd = interp("javac #{fileName} && java #{fileStem}", |k| vars.get(k)).unwrap();
/// assert_eq!(cmd, "javac Main.java && java Main");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FileVars<'a> {
    path: &'a Path,
}

impl<'a> FileVars<'a> {
    pub fn new(path: &'a (impl AsRef<Path> + ?Sized)) -> Self {
        Self {
            path: path.as_ref(),
        }
    }

    pub fn get(&self, name: &str) -> Option<Cow<'a, str>> {
        let p = self.path;
        match name {
            "filePath" => Some(p.to_string_lossy()),
            "fileName" => p.file_name().map(|s| s.to_string_lossy()),
            "fileDir" => Some(
                p.parent()
                    .filter(|d| !d.as_os_str().is_empty())
                    .unwrap_or(Path::new("."))
                    .to_string_lossy(),
            ),
            "fileStem" => p.file_stem().map(|s| s.to_string_lossy()),
            "fileExt" => p.extension().map(|s| s.to_string_lossy()),
            _ => None,
        }
    }

    pub fn interp(&self, fmt: &str) -> Result {
        interp(fmt, |k| self.get(k))
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use maplit::hashmap;

    use super::*;

    fn with_map(fmt: &str, vars: &HashMap<&str, &str>) -> Result {
        interp(fmt, |k| vars.get(k).map(|v| Cow::Borrowed(*v)))
    }

    #[test]
    fn interp_ok() {
        let vars = hashmap! {
            "className" => "Main",
            "ext" => "java",
            "_#%!?" => "wooo",
        };

        assert_eq!(with_map("javac", &vars).unwrap(), "javac");
        assert_eq!(with_map("#{className}", &vars).unwrap(), "Main");
        assert_eq!(with_map("#{className}.#{ext}", &vars).unwrap(), "Main.java");
        assert_eq!(with_map("#{_#%!?}", &vars).unwrap(), "wooo");
        assert_eq!(with_map("java {className}", &vars).unwrap(), "java {className}");
        assert_eq!(with_map("a # {ext} b", &vars).unwrap(), "a # {ext} b");
        assert_eq!(with_map("##{ext}", &vars).unwrap(), "#{ext}");
        assert_eq!(with_map("###{ext}", &vars).unwrap(), "#java");
        assert_eq!(with_map("#", &vars).unwrap(), "#");
        assert_eq!(with_map("##", &vars).unwrap(), "#");
    }

    #[test]
    fn interp_ng() {
        let vars = hashmap! { "ext" => "java" };
        assert_eq!(
            with_map("javac #{fileName}", &vars).unwrap_err(),
            InterpError::UndefinedVar("fileName".to_owned(), 7)
        );
        assert_eq!(
            with_map("#{ext} #{oops", &vars).unwrap_err(),
            InterpError::UnclosedBrace(8)
        );
    }

    #[test]
    fn file_vars() {
        let vars = FileVars::new("/tmp/ws/HelloWorld.java");
        assert_eq!(vars.get("fileName").unwrap(), "HelloWorld.java");
        assert_eq!(vars.get("fileStem").unwrap(), "HelloWorld");
        assert_eq!(vars.get("fileExt").unwrap(), "java");
        assert_eq!(vars.get("fileDir").unwrap(), "/tmp/ws");
        assert_eq!(vars.get("filePath").unwrap(), "/tmp/ws/HelloWorld.java");
        assert_eq!(vars.get("nope"), None);

        let bare = FileVars::new("Main.java");
        assert_eq!(bare.get("fileDir").unwrap(), ".");
        assert_eq!(
            bare.interp("#{fileStem}.class").unwrap(),
            "Main.class"
        );
    }
}
