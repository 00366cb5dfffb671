use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::ImageFile;

/// 封面预览资源的分配方（对应浏览器里的 object URL）
pub trait PreviewStore: Send + Sync {
    fn create(&self, image: &ImageFile) -> String;
    fn release(&self, url: &str);
}

/// 预览句柄，drop 时释放底层资源
pub struct PreviewHandle {
    url: String,
    store: Arc<dyn PreviewStore>,
}

impl PreviewHandle {
    pub fn create(store: Arc<dyn PreviewStore>, image: &ImageFile) -> Self {
        let url = store.create(image);
        debug!("创建预览: {}", url);
        Self { url, store }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        debug!("释放预览: {}", self.url);
        self.store.release(&self.url);
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewHandle").field("url", &self.url).finish()
    }
}

/// 内存里的 blob 登记表
#[derive(Debug, Default)]
pub struct ObjectUrlRegistry {
    entries: Mutex<HashMap<String, usize>>, // url -> 字节数
    released: Mutex<HashMap<String, usize>>, // url -> 释放次数
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries
            .lock()
            .map(|e| e.contains_key(url))
            .unwrap_or(false)
    }

    /// 该 url 被释放的次数，正常情况下至多为 1
    pub fn release_count(&self, url: &str) -> usize {
        self.released
            .lock()
            .map(|r| r.get(url).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl PreviewStore for ObjectUrlRegistry {
    fn create(&self, image: &ImageFile) -> String {
        let url = format!("blob:coursedesk/{}", Uuid::new_v4());
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(url.clone(), image.size());
        }
        url
    }

    fn release(&self, url: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            if entries.remove(url).is_none() {
                warn!("重复释放预览: {}", url);
            }
        }
        if let Ok(mut released) = self.released.lock() {
            *released.entry(url.to_string()).or_insert(0) += 1;
        }
    }
}
