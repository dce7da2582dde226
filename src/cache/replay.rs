//! Response cache for saving and replaying web service calls
//!
//! Provides a `ResponseCache` that writes raw response bodies to files named
//! after the route and stop in the request URL, and reads them back when
//! running offline.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::params::{url_param, ROUTE_KEY, STOP_KEY};

/// Errors that can occur when reading or writing cached responses
#[derive(Debug, Error)]
pub enum CacheError {
    /// No saved response exists for the route/stop pair
    #[error("no data is available for rt={route}, stpid={stop} ({})", .path.display())]
    Missing {
        route: String,
        stop: String,
        path: PathBuf,
    },

    /// Reading or writing the cache file failed
    #[error("cache file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Manages saved responses in a directory
///
/// File names are derived from the `rt=` and `stpid=` URL parameters only, so
/// every URL for the same route and stop maps to the same file.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    /// Directory where response files are stored
    cache_dir: PathBuf,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseCache {
    /// Creates a cache rooted at the current working directory
    pub fn new() -> Self {
        Self {
            cache_dir: PathBuf::from("."),
        }
    }

    /// Creates a cache rooted at a custom directory
    pub fn with_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Returns the directory holding the response files
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the file name used for a route/stop pair
    ///
    /// ```
    /// use ctaweb::cache::ResponseCache;
    ///
    /// assert_eq!(
    ///     ResponseCache::file_name("20", "456"),
    ///     "cta-response-route-20-stopid-456.cta"
    /// );
    /// ```
    pub fn file_name(route: &str, stop: &str) -> String {
        format!("cta-response-route-{}-stopid-{}.cta", route, stop)
    }

    /// Returns the route and stop values used to key `url`
    ///
    /// Missing parameters come back as the `"-1"` sentinel.
    pub fn key_for_url(url: &str) -> (String, String) {
        (url_param(url, ROUTE_KEY), url_param(url, STOP_KEY))
    }

    /// Returns the full path of the response file for `url`
    pub fn path_for_url(&self, url: &str) -> PathBuf {
        let (route, stop) = Self::key_for_url(url);
        self.cache_dir.join(Self::file_name(&route, &stop))
    }

    /// Writes `body` verbatim to the response file for `url`
    ///
    /// Creates the cache directory if needed and overwrites any earlier save.
    pub fn save(&self, url: &str, body: &str) -> Result<PathBuf, CacheError> {
        let path = self.path_for_url(url);
        fs::create_dir_all(&self.cache_dir).map_err(|source| CacheError::Io {
            path: self.cache_dir.clone(),
            source,
        })?;
        fs::write(&path, body).map_err(|source| CacheError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Reads the saved response for `url`
    ///
    /// Lines are re-joined with `\n`, and the last line always gains one, so a
    /// body saved without a trailing newline comes back with one appended.
    pub fn replay(&self, url: &str) -> Result<String, CacheError> {
        let (route, stop) = Self::key_for_url(url);
        let path = self.cache_dir.join(Self::file_name(&route, &stop));

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CacheError::Missing { route, stop, path });
            }
            Err(source) => return Err(CacheError::Io { path, source }),
        };

        let mut bytes = Vec::new();
        for line in BufReader::new(file).split(b'\n') {
            let line = line.map_err(|source| CacheError::Io {
                path: path.clone(),
                source,
            })?;
            bytes.extend_from_slice(&line);
            bytes.push(b'\n');
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
