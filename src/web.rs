//! Web service call orchestration
//!
//! `WebCaller` performs one blocking call against the Bus Tracker service
//! using a caller-owned [`Transport`], or replays a saved response when
//! running offline.
//!
//! URL format:
//!
//! ```text
//! http://ctabustracker.com/bustime/api/v2/getpredictions?key=<key>&rt=20&stpid=456&format=json
//! ```

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::cache::{CacheError, ResponseCache};
use crate::transport::{Transport, TransportError};

/// How a `WebCaller` obtains responses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CallMode {
    /// Call the web service
    #[default]
    Live,
    /// Call the web service and save each successful response
    #[value(name = "save")]
    #[serde(rename = "save")]
    LiveAndSave,
    /// Replay saved responses without touching the network
    Offline,
}

impl fmt::Display for CallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallMode::Live => "live",
            CallMode::LiveAndSave => "save",
            CallMode::Offline => "offline",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during a web call
#[derive(Debug, Error)]
pub enum CallError {
    /// Configuring or performing the live request failed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// No saved response could be read in offline mode
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Performs web service calls in a fixed [`CallMode`]
#[derive(Debug, Clone, Default)]
pub struct WebCaller {
    mode: CallMode,
    cache: ResponseCache,
}

impl WebCaller {
    /// Creates a caller that stores and reads responses in the working directory
    pub fn new(mode: CallMode) -> Self {
        Self {
            mode,
            cache: ResponseCache::new(),
        }
    }

    /// Creates a caller with a custom response cache
    pub fn with_cache(mode: CallMode, cache: ResponseCache) -> Self {
        Self { mode, cache }
    }

    /// Returns the mode this caller runs in
    pub fn mode(&self) -> CallMode {
        self.mode
    }

    /// Returns the response cache used for saving and replay
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Calls the web service at `url`, storing the body in `response`.
    ///
    /// Returns `true` if the server responded (or a saved response was found
    /// offline). On `false`, `response` is left as it was.
    ///
    /// # Arguments
    /// * `transport` - Caller-owned handle, reset at the start of the call
    /// * `url` - Request URL including `rt=` and `stpid=` parameters
    /// * `response` - Receives the response body on success
    pub fn call<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        url: &str,
        response: &mut String,
    ) -> bool {
        match self.try_call(transport, url) {
            Ok(body) => {
                *response = body;
                true
            }
            Err(e) => {
                debug!(url, error = %e, "web call failed");
                false
            }
        }
    }

    /// Calls the web service at `url` and returns the response body.
    ///
    /// # Behavior
    /// - `Live`: reset, set URL, perform; chunks are appended in order
    /// - `LiveAndSave`: as `Live`, then writes the body to the cache; a failed
    ///   write is logged and does not fail the call
    /// - `Offline`: reads the saved response for the URL's route and stop; the
    ///   transport is not touched
    pub fn try_call<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        url: &str,
    ) -> Result<String, CallError> {
        if self.mode == CallMode::Offline {
            return self.replay(url);
        }

        let body = fetch(transport, url)?;

        if self.mode == CallMode::LiveAndSave {
            match self.cache.save(url, &body) {
                Ok(path) => debug!(path = %path.display(), "saved response"),
                Err(e) => warn!(error = %e, "failed to save response for offline use"),
            }
        }

        Ok(body)
    }

    fn replay(&self, url: &str) -> Result<String, CallError> {
        match self.cache.replay(url) {
            Ok(body) => {
                debug!(url, "replayed saved response");
                Ok(body)
            }
            Err(e) => {
                if let CacheError::Missing { route, stop, .. } = &e {
                    error!("running offline, but no saved response was found");
                    error!("called with rt={route},stpid={stop}");
                    error!("no data is available for this route/stop");
                } else {
                    error!(error = %e, "running offline, but the saved response could not be read");
                }
                Err(e.into())
            }
        }
    }
}

/// Resets the transport, points it at `url`, and collects the full body
fn fetch<T: Transport + ?Sized>(transport: &mut T, url: &str) -> Result<String, CallError> {
    transport.reset();
    transport.set_url(url)?;

    let mut bytes = Vec::new();
    transport.perform(&mut |chunk| bytes.extend_from_slice(chunk))?;

    debug!(url, len = bytes.len(), "received response");
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
