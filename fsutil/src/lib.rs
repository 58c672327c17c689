use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

pub mod error {
    use std::{io, path::PathBuf};

    pub type Result<T> = std::result::Result<T, self::Error>;

    type Msg = &'static str;

    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        #[error("{0} ({1}): {2}")]
        SingleIO(Msg, PathBuf, #[source] io::Error),

        #[error("Already exists: '{0}'")]
        AlreadyExists(PathBuf),
    }
}
pub use error::{Error, Result};

#[must_use]
pub fn mkdir_all(path: impl AsRef<Path>) -> Result<()> {
    let dir = path.as_ref();
    fs::create_dir_all(dir).map_err(|e| Error::SingleIO("Cannot create dir", dir.to_owned(), e))
}

/// Creates exactly one directory. Fails if `path` already exists,
/// so two callers can never end up owning the same directory.
#[must_use]
pub fn mkdir_new(path: impl AsRef<Path>) -> Result<()> {
    let dir = path.as_ref();
    fs::create_dir(dir).map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => Error::AlreadyExists(dir.to_owned()),
        _ => Error::SingleIO("Cannot create dir", dir.to_owned(), e),
    })
}

#[must_use]
pub fn write<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    fs::write(&filepath, contents)
        .map_err(|e| Error::SingleIO("Cannot write file", filepath.as_ref().to_owned(), e))
}

#[must_use]
pub fn write_with_mkdir<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    if let Some(dir) = filepath.as_ref().parent() {
        self::mkdir_all(dir)?;
    }
    self::write(filepath, contents)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    SkippedExisting,
}

/// Like [`write_with_mkdir`], but leaves an existing file untouched unless `overwrite` is set.
#[must_use]
pub fn write_with_mkdir_opt<P, C>(filepath: P, contents: C, overwrite: bool) -> Result<WriteOutcome>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    if !overwrite && filepath.as_ref().exists() {
        return Ok(WriteOutcome::SkippedExisting);
    }
    self::write_with_mkdir(filepath, contents)?;
    Ok(WriteOutcome::Written)
}

#[must_use]
pub fn read_to_string(filepath: impl AsRef<Path>) -> Result<String> {
    fs::read_to_string(&filepath)
        .map_err(|e| Error::SingleIO("Cannot read file", filepath.as_ref().to_owned(), e))
}

/// Removes `dir` recursively. A missing directory is not an error.
#[must_use]
pub fn remove_dir_all(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::SingleIO("Cannot remove dir", dir.to_owned(), e)),
    }
}

/// Walks from `start` up to the filesystem root and returns the first `<dir>/<filename>` that is a file.
pub fn find_file_in_ancestors(start: impl AsRef<Path>, filename: &str) -> Option<PathBuf> {
    start
        .as_ref()
        .ancestors()
        .map(|dir| dir.join(filename))
        .find(|path| path.is_file())
}
