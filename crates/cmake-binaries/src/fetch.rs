use std::path::{Path, PathBuf};

use url::Url;

use crate::{Error, Result};

/// Turns a download URL into a complete local archive file.
///
/// The returned file keeps the archive's name, since extraction reads the
/// format from its extension.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<PathBuf>;
}

impl<F> Fetch for F
where
    F: Fn(&str) -> Result<PathBuf>,
{
    fn fetch(&self, url: &str) -> Result<PathBuf> {
        self(url)
    }
}

/// Resolves `file://` URLs and plain filesystem paths. Network schemes are
/// refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFetcher;

impl Fetch for LocalFetcher {
    fn fetch(&self, url: &str) -> Result<PathBuf> {
        let path = match Url::parse(url) {
            Ok(parsed) if parsed.scheme() == "file" => {
                parsed
                    .to_file_path()
                    .map_err(|()| Error::UnsupportedScheme {
                        url: url.to_string(),
                        scheme: "file".to_string(),
                    })?
            }
            // A single-letter scheme is a Windows drive letter.
            Ok(parsed) if parsed.scheme().len() > 1 => {
                return Err(Error::UnsupportedScheme {
                    url: url.to_string(),
                    scheme: parsed.scheme().to_string(),
                });
            }
            _ => PathBuf::from(url),
        };

        if !path.is_file() {
            return Err(Error::NotFound {
                url: url.to_string(),
                path,
            });
        }
        tracing::debug!(url, path = %path.display(), "resolved local archive");
        Ok(path)
    }
}

/// Always hands out the same archive, whatever URL is asked for.
#[derive(Debug, Clone)]
pub struct FixedArchive {
    path: PathBuf,
}

impl FixedArchive {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Fetch for FixedArchive {
    fn fetch(&self, url: &str) -> Result<PathBuf> {
        tracing::debug!(url, archive = %self.path.display(), "using provided archive");
        LocalFetcher.fetch(&self.path.to_string_lossy())
    }
}
