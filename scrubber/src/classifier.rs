use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::ScrubberConfig;
use crate::error::{FormatError, ScrubError};
use crate::role::{Role, RoleTokens};

/// An iperf log identified by its file name `<run>-<load>-<role>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    /// Groups all files of one trial, e.g. `run1`.
    pub run_id: String,
    /// Offered load as written in the file name, e.g. `150M`.
    pub load_label: String,
    /// Offered load without its unit, e.g. `150`.
    pub load_level: u64,
    pub role: Role,
    pub path: PathBuf,
}

/// Finds and names iperf logs for the configured roles.
#[derive(Debug, Clone)]
pub struct FileClassifier {
    tokens: RoleTokens,
    extension: String,
}

impl FileClassifier {
    pub fn new(tokens: RoleTokens, extension: String) -> Self {
        Self { tokens, extension }
    }

    pub fn from_config(config: &ScrubberConfig) -> Self {
        Self::new(config.role_tokens.clone(), config.extension.clone())
    }

    pub fn role_tokens(&self) -> &RoleTokens {
        &self.tokens
    }

    /// Lists the files of `dir` whose name ends with the suffix of `role`, sorted by name.
    ///
    /// No match is an empty list, a missing or unreadable directory is [`ScrubError::NotFound`].
    pub fn discover<P>(&self, dir: P, role: Role) -> Result<Vec<PathBuf>, ScrubError>
    where
        P: AsRef<Path>,
    {
        let dir = dir.as_ref();
        let metadata = std::fs::metadata(dir).map_err(|e| ScrubError::not_found(dir, e))?;
        if !metadata.is_dir() {
            return Err(ScrubError::not_found(
                dir,
                std::io::Error::other("not a directory"),
            ));
        }

        let suffix = format!("{}.{}", self.tokens.token(role), self.extension);
        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(
                        "Skipping unreadable entry {}: {e}",
                        e.path().unwrap_or(dir).display()
                    );
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.file_name().to_string_lossy().ends_with(&suffix) {
                files.push(entry.into_path());
            }
        }
        debug!(
            "Discovered {} files ending with '{suffix}' in {}",
            files.len(),
            dir.display()
        );

        Ok(files)
    }

    /// Parses every path into a [`LogFile`] and sorts them by ascending load level.
    ///
    /// The sort is stable, files with the same load keep their input order.
    pub fn order_by_load<I, P>(&self, paths: I) -> Result<Vec<LogFile>, FormatError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut files = paths
            .into_iter()
            .map(|path| self.parse(path))
            .collect::<Result<Vec<_>, _>>()?;
        files.sort_by_key(|file| file.load_level);
        Ok(files)
    }

    /// Discovers the files of `role` in `dir`, ordered by load.
    ///
    /// Unlike [`FileClassifier::order_by_load`], a badly named file is logged and skipped.
    pub fn classify<P>(&self, dir: P, role: Role) -> Result<Vec<LogFile>, ScrubError>
    where
        P: AsRef<Path>,
    {
        let mut files = Vec::new();
        for path in self.discover(dir, role)? {
            match self.parse(&path) {
                Ok(file) if file.role == role => files.push(file),
                Ok(file) => trace!(
                    "Skipping {}, it belongs to role {}",
                    path.display(),
                    self.tokens.token(file.role)
                ),
                Err(e) => warn!("Skipping {}: {e}", path.display()),
            }
        }
        files.sort_by_key(|file| file.load_level);
        Ok(files)
    }

    /// Parses the file name of `path` into a [`LogFile`].
    pub fn parse<P>(&self, path: P) -> Result<LogFile, FormatError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| FormatError::FileName {
                name: path.display().to_string(),
                reason: "not a valid UTF-8 file name",
            })?;
        let malformed = |reason| FormatError::FileName {
            name: name.to_string(),
            reason,
        };

        let stem = name
            .strip_suffix(self.extension.as_str())
            .and_then(|stem| stem.strip_suffix('.'))
            .ok_or_else(|| malformed("wrong extension"))?;
        let segments = stem.split('-').collect::<Vec<_>>();
        let [run_id, load_label, role] = segments.as_slice() else {
            return Err(malformed("expected three hyphen-delimited segments"));
        };
        if run_id.is_empty() {
            return Err(malformed("empty run identifier"));
        }
        let load_level =
            parse_load_level(load_label).ok_or_else(|| malformed("load is not an integer"))?;
        let role = self
            .tokens
            .parse(role)
            .ok_or_else(|| malformed("unknown role"))?;

        Ok(LogFile {
            run_id: run_id.to_string(),
            load_label: load_label.to_string(),
            load_level,
            role,
            path: path.to_path_buf(),
        })
    }

    /// File name of the log of `role` for a run and load label.
    pub fn file_name(&self, run_id: &str, load_label: &str, role: Role) -> String {
        format!(
            "{run_id}-{load_label}-{}.{}",
            self.tokens.token(role),
            self.extension
        )
    }
}

/// Parses a load label such as `150M` into `150`.
///
/// A single trailing unit letter is stripped, a bare number is accepted as is.
pub fn parse_load_level(label: &str) -> Option<u64> {
    let digits = match label.chars().last() {
        Some(unit) if unit.is_ascii_alphabetic() => &label[..label.len() - 1],
        _ => label,
    };
    digits.parse().ok()
}
