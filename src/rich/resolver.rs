//! Image resolution for inline references
//!
//! Names map to URLs through a lookup owned by the resolver. Loads are cached
//! per URL as shared futures, so concurrent references to the same image
//! await one request. Failed loads are cached as `None` too.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use glam::Vec2;

use crate::error::Result;

/// A loaded image ready for placement
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHandle {
    pub url: String,
    /// Natural size in pixels
    pub size: Vec2,
}

/// Fetches images by URL (network, asset bundle, test double)
#[async_trait(?Send)]
pub trait ImageLoader {
    async fn load(&self, url: &str) -> Result<ImageHandle>;
}

type SharedLoad = Shared<LocalBoxFuture<'static, Option<ImageHandle>>>;

/// Name to image resolver with an owned, per-URL load cache
pub struct ImageResolver {
    urls: HashMap<String, String>,
    default_key: Option<String>,
    loader: Rc<dyn ImageLoader>,
    cache: RefCell<HashMap<String, SharedLoad>>,
}

impl ImageResolver {
    pub fn new(loader: Rc<dyn ImageLoader>) -> Self {
        Self {
            urls: HashMap::new(),
            default_key: None,
            loader,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Register a name (builder style)
    pub fn with_image(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.insert(name, url);
        self
    }

    /// Name tried when a reference cannot be resolved
    pub fn with_default_key(mut self, key: impl Into<String>) -> Self {
        self.default_key = Some(key.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.urls.insert(name.into(), url.into());
    }

    pub fn set_default_key(&mut self, key: Option<String>) {
        self.default_key = key;
    }

    pub fn default_key(&self) -> Option<&str> {
        self.default_key.as_deref()
    }

    pub fn url_for(&self, name: &str) -> Option<&str> {
        self.urls.get(name).map(String::as_str)
    }

    /// Number of distinct URLs requested so far
    pub fn cached_count(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Resolve one name. `None` for unknown names and failed loads.
    pub async fn resolve(&self, name: &str) -> Option<ImageHandle> {
        let url = self.urls.get(name)?;
        let load = self.shared_load(url);
        load.await
    }

    /// Existing in-flight or finished load for `url`, or a new one
    fn shared_load(&self, url: &str) -> SharedLoad {
        let mut cache = self.cache.borrow_mut();
        if let Some(load) = cache.get(url) {
            return load.clone();
        }

        let loader = Rc::clone(&self.loader);
        let owned = url.to_owned();
        let load = async move {
            match loader.load(&owned).await {
                Ok(handle) => Some(handle),
                Err(err) => {
                    log::warn!("{}", err);
                    None
                }
            }
        }
        .boxed_local()
        .shared();
        cache.insert(url.to_owned(), load.clone());
        load
    }
}
