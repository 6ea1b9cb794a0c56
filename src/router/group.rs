//! Route groups: hierarchical path prefixes and middleware composition.
//!
//! A group is an ephemeral builder over the shared router. Child groups
//! join their suffix onto the parent's base path (always normalized to a
//! trailing separator) and prepend the parent's handler chain to their own,
//! so inherited middleware runs first on every route registered below.

use http::Method;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::error::ConfigError;
use crate::static_files::{content_type_for, StaticFiles};

use super::core::{handler, Handler, Router, MAX_CHAIN_LEN};

/// Builder for registering routes under a common path prefix and
/// middleware chain.
pub struct RouteGroup {
    base_path: String,
    handlers: Vec<Handler>,
    router: Arc<RwLock<Router>>,
}

impl RouteGroup {
    /// The root group at `/` with an empty middleware chain.
    pub fn root(router: Arc<RwLock<Router>>) -> Self {
        RouteGroup {
            base_path: "/".to_string(),
            handlers: Vec::new(),
            router,
        }
    }

    /// Create a child group under `suffix`, appending `middleware` to the
    /// inherited chain.
    pub fn group(&self, suffix: &str, middleware: Vec<Handler>) -> Result<RouteGroup, ConfigError> {
        Ok(RouteGroup {
            base_path: self.abs_path(suffix),
            handlers: self.merge(&middleware)?,
            router: Arc::clone(&self.router),
        })
    }

    pub fn get(&self, path: &str, handlers: Vec<Handler>) -> Result<(), ConfigError> {
        self.register(Method::GET, path, handlers)
    }

    pub fn post(&self, path: &str, handlers: Vec<Handler>) -> Result<(), ConfigError> {
        self.register(Method::POST, path, handlers)
    }

    pub fn put(&self, path: &str, handlers: Vec<Handler>) -> Result<(), ConfigError> {
        self.register(Method::PUT, path, handlers)
    }

    pub fn patch(&self, path: &str, handlers: Vec<Handler>) -> Result<(), ConfigError> {
        self.register(Method::PATCH, path, handlers)
    }

    pub fn delete(&self, path: &str, handlers: Vec<Handler>) -> Result<(), ConfigError> {
        self.register(Method::DELETE, path, handlers)
    }

    pub fn options(&self, path: &str, handlers: Vec<Handler>) -> Result<(), ConfigError> {
        self.register(Method::OPTIONS, path, handlers)
    }

    pub fn head(&self, path: &str, handlers: Vec<Handler>) -> Result<(), ConfigError> {
        self.register(Method::HEAD, path, handlers)
    }

    pub fn connect(&self, path: &str, handlers: Vec<Handler>) -> Result<(), ConfigError> {
        self.register(Method::CONNECT, path, handlers)
    }

    pub fn trace(&self, path: &str, handlers: Vec<Handler>) -> Result<(), ConfigError> {
        self.register(Method::TRACE, path, handlers)
    }

    /// Register the same merged chain under GET, POST, PUT, PATCH, HEAD,
    /// OPTIONS, DELETE, CONNECT and TRACE.
    ///
    /// Not transactional: methods registered before a failure stay
    /// registered (at-least-partial-effect).
    pub fn any(&self, path: &str, handlers: Vec<Handler>) -> Result<(), ConfigError> {
        let abs = self.abs_path(path);
        let merged = self.merge(&handlers)?;
        for method in [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::HEAD,
            Method::OPTIONS,
            Method::DELETE,
            Method::CONNECT,
            Method::TRACE,
        ] {
            self.router
                .write()
                .unwrap()
                .add_route(method, &abs, merged.clone())?;
        }
        Ok(())
    }

    /// Serve a single file under `url_path` (GET and HEAD).
    pub fn static_file(
        &self,
        url_path: &str,
        file_path: impl Into<PathBuf>,
    ) -> Result<(), ConfigError> {
        check_static_path(url_path)?;
        let file = file_path.into();
        let h = handler(move |ctx| {
            let is_head = ctx.method() == &Method::HEAD;
            match std::fs::read(&file) {
                Ok(bytes) => {
                    ctx.response.set_content_type(content_type_for(&file));
                    if is_head {
                        let _ = ctx.response.flush();
                    } else {
                        let _ = ctx.response.write(&bytes);
                    }
                }
                Err(_) => ctx.render_error(404, "file not found"),
            }
        });
        self.get(url_path, vec![Arc::clone(&h)])?;
        self.head(url_path, vec![h])
    }

    /// Serve a directory tree under `url_path` (GET and HEAD) via a
    /// catch-all route. Traversal outside the directory is rejected.
    pub fn static_dir(
        &self,
        url_path: &str,
        dir: impl Into<PathBuf>,
    ) -> Result<(), ConfigError> {
        check_static_path(url_path)?;
        let files = StaticFiles::new(dir.into());
        let h = handler(move |ctx| {
            let rel = ctx.param("filepath").unwrap_or("").to_string();
            let is_head = ctx.method() == &Method::HEAD;
            match files.load(&rel) {
                Ok((bytes, content_type)) => {
                    ctx.response.set_content_type(content_type);
                    if is_head {
                        let _ = ctx.response.flush();
                    } else {
                        let _ = ctx.response.write(&bytes);
                    }
                }
                Err(_) => ctx.render_error(404, "file not found"),
            }
        });
        let pattern = format!("{}/*filepath", url_path.trim_end_matches('/'));
        self.get(&pattern, vec![Arc::clone(&h)])?;
        self.head(&pattern, vec![h])
    }

    fn register(
        &self,
        method: Method,
        path: &str,
        handlers: Vec<Handler>,
    ) -> Result<(), ConfigError> {
        let abs = self.abs_path(path);
        let merged = self.merge(&handlers)?;
        self.router.write().unwrap().add_route(method, &abs, merged)
    }

    /// Join the group's base path with `suffix`, always normalized to a
    /// trailing separator so different spellings of the same logical
    /// prefix register identical effective paths.
    fn abs_path(&self, suffix: &str) -> String {
        let mut joined = if suffix.is_empty() {
            self.base_path.clone()
        } else {
            format!(
                "{}/{}",
                self.base_path.trim_end_matches('/'),
                suffix.trim_start_matches('/')
            )
        };
        if !joined.starts_with('/') {
            joined.insert(0, '/');
        }
        if !joined.ends_with('/') {
            joined.push('/');
        }
        joined
    }

    /// Inherited handlers first, own handlers after. The combined length
    /// must stay under [`MAX_CHAIN_LEN`].
    fn merge(&self, own: &[Handler]) -> Result<Vec<Handler>, ConfigError> {
        let len = self.handlers.len() + own.len();
        if len >= MAX_CHAIN_LEN {
            return Err(ConfigError::ChainTooLong {
                len,
                limit: MAX_CHAIN_LEN,
            });
        }
        let mut merged = Vec::with_capacity(len);
        merged.extend(self.handlers.iter().cloned());
        merged.extend(own.iter().cloned());
        Ok(merged)
    }
}

fn check_static_path(url_path: &str) -> Result<(), ConfigError> {
    if url_path.contains(':') || url_path.contains('*') {
        return Err(ConfigError::ReservedPathCharacters {
            path: url_path.to_string(),
        });
    }
    Ok(())
}
