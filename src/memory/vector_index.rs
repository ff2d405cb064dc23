use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;
use usearch::Index;
use usearch::ffi::{IndexOptions, MetricKind, ScalarKind};

const RESERVE_STEP: usize = 1000;

/// One usearch cosine index per namespace, persisted as `<dir>/<namespace>.usearch`.
///
/// All methods block; call them from `spawn_blocking`.
pub struct VectorIndex {
    dir: PathBuf,
    dimensions: usize,
    open: Mutex<HashMap<String, Arc<Mutex<Index>>>>,
}

fn file_stem(namespace: &str) -> String {
    namespace
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl VectorIndex {
    pub fn new(dir: &Path, dimensions: usize) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create index dir: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            dimensions,
            open: Mutex::new(HashMap::new()),
        })
    }

    fn path_for(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{}.usearch", file_stem(namespace)))
    }

    fn index_for(&self, namespace: &str, create: bool) -> Result<Option<Arc<Mutex<Index>>>> {
        let mut open = self
            .open
            .lock()
            .map_err(|e| anyhow::anyhow!("index map lock poisoned: {e}"))?;
        if let Some(index) = open.get(namespace) {
            return Ok(Some(index.clone()));
        }

        let path = self.path_for(namespace);
        if !path.exists() && !create {
            return Ok(None);
        }

        let options = IndexOptions {
            dimensions: self.dimensions,
            metric: MetricKind::Cos,
            quantization: ScalarKind::F16,
            ..Default::default()
        };
        let index = Index::new(&options).context("Failed to create usearch index")?;
        let path_str = path.to_str().context("Index path is not valid UTF-8")?;
        if path.exists() {
            index
                .load(path_str)
                .with_context(|| format!("Failed to load index for {}", namespace))?;
            info!("Loaded index {} ({} vectors)", namespace, index.size());
        } else {
            index
                .reserve(RESERVE_STEP)
                .context("Failed to reserve index")?;
        }

        let index = Arc::new(Mutex::new(index));
        open.insert(namespace.to_string(), index.clone());
        Ok(Some(index))
    }

    pub fn add(&self, namespace: &str, key: u64, vector: &[f32]) -> Result<()> {
        let index = self
            .index_for(namespace, true)?
            .context("Index missing after creation")?;
        let path = self.path_for(namespace);
        let path_str = path.to_str().context("Index path is not valid UTF-8")?;

        let idx = index
            .lock()
            .map_err(|e| anyhow::anyhow!("index lock poisoned: {e}"))?;
        if idx.size() + 1 >= idx.capacity() {
            idx.reserve(idx.capacity() + RESERVE_STEP)
                .map_err(|e| anyhow::anyhow!("{}", e))?;
        }
        idx.add(key, vector).map_err(|e| anyhow::anyhow!("{}", e))?;
        idx.save(path_str).map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(())
    }

    /// Keys of the `count` nearest vectors, closest first. Unknown namespaces are empty.
    pub fn search(&self, namespace: &str, vector: &[f32], count: usize) -> Result<Vec<u64>> {
        let Some(index) = self.index_for(namespace, false)? else {
            return Ok(Vec::new());
        };
        let idx = index
            .lock()
            .map_err(|e| anyhow::anyhow!("index lock poisoned: {e}"))?;
        if idx.size() == 0 {
            return Ok(Vec::new());
        }
        let matches = idx
            .search(vector, count)
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(matches.keys)
    }
}
