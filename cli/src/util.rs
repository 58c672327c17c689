use std::{
    io::Write as _,
    path::{Path, PathBuf},
    process::exit,
};

use assay_core::style::ColorTheme as _;
use colored::Colorize as _;

pub fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|e| {
        eprintln!("Failed to get current dir: {}", e);
        exit(1);
    })
}

pub fn replace_homedir_to_tilde(path: impl Into<PathBuf>) -> PathBuf {
    let path = path.into();
    let Some(home_dir) = ::dirs::home_dir() else {
        return path
    };
    path.strip_prefix(home_dir)
        .map(|path| Path::new("~").join(path))
        .unwrap_or(path)
}

/// `RUST_LOG` controls the filter; `info` when unset.
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let level = record.level();
            writeln!(
                buf,
                "{} {}",
                format!("[{}]", level).color(level.color()).bold(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tilde() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(
            replace_homedir_to_tilde(home.join("work/Main.java")),
            Path::new("~/work/Main.java")
        );
        assert_eq!(
            replace_homedir_to_tilde("/definitely/elsewhere"),
            Path::new("/definitely/elsewhere")
        );
    }
}
