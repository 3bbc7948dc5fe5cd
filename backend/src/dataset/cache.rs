//! Process-lifetime memo of loaded tables, keyed by path
//!
//! There is no invalidation: a changed file on disk takes effect only after a
//! restart. Failed loads are not cached.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::{CropTable, PriceTable, RegionTable};
use crate::error::AppResult;

type Memo<T> = RwLock<HashMap<PathBuf, Arc<T>>>;

#[derive(Default)]
pub struct DatasetCache {
    crops: Memo<CropTable>,
    regions: Memo<RegionTable>,
    prices: Memo<PriceTable>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn crop_table(&self, path: impl AsRef<Path>) -> AppResult<Arc<CropTable>> {
        memoized(&self.crops, path.as_ref(), CropTable::load)
    }

    pub fn region_table(&self, path: impl AsRef<Path>) -> AppResult<Arc<RegionTable>> {
        memoized(&self.regions, path.as_ref(), RegionTable::load)
    }

    pub fn price_table(&self, path: impl AsRef<Path>) -> AppResult<Arc<PriceTable>> {
        memoized(&self.prices, path.as_ref(), PriceTable::load)
    }
}

fn memoized<T>(
    memo: &Memo<T>,
    path: &Path,
    load: impl FnOnce(&Path) -> AppResult<T>,
) -> AppResult<Arc<T>> {
    if let Some(hit) = memo
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .get(path)
    {
        return Ok(Arc::clone(hit));
    }

    let loaded = Arc::new(load(path)?);
    tracing::info!("Loaded dataset {}", path.display());

    let mut guard = memo.write().unwrap_or_else(|e| e.into_inner());
    // A concurrent first load may have won the race; keep its copy
    let entry = guard.entry(path.to_path_buf()).or_insert(loaded);
    Ok(Arc::clone(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn second_load_returns_same_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "N,P,K,temperature,humidity,label").unwrap();
        writeln!(file, "1,2,3,4,5,rice").unwrap();
        file.flush().unwrap();

        let cache = DatasetCache::new();
        let first = cache.crop_table(file.path()).unwrap();

        // Rewriting the file does not change what the cache serves
        writeln!(file, "6,7,8,9,10,maize").unwrap();
        file.flush().unwrap();

        let second = cache.crop_table(file.path()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn failed_load_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        let cache = DatasetCache::new();
        assert!(cache.price_table(&path).is_err());

        std::fs::write(&path, "crop,price\nrice,2000\n").unwrap();
        assert_eq!(cache.price_table(&path).unwrap().records.len(), 1);
    }
}
