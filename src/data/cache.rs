//! Local data caching
//!
//! Caches price history and option chains locally to reduce API calls and
//! enable offline analysis.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::MarketData;
use crate::core::{BSResult, OptionQuote, OptionType, PriceSeries};

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Cache directory
    pub cache_dir: PathBuf,
    /// Maximum age before refresh (in hours)
    pub max_age_hours: i64,
    /// Whether to use cache
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./data/cache"),
            max_age_hours: 12,
            enabled: true,
        }
    }
}

/// Data cache manager
pub struct DataCache {
    config: CacheConfig,
}

impl DataCache {
    pub fn new(config: CacheConfig) -> BSResult<Self> {
        // Create cache directory if needed
        if config.enabled && !config.cache_dir.exists() {
            fs::create_dir_all(&config.cache_dir)?;
        }

        Ok(Self { config })
    }

    /// Cache key for a symbol and data type
    fn cache_key(&self, symbol: &str, data_type: &str) -> PathBuf {
        self.config.cache_dir.join(format!("{}_{}.json", symbol, data_type))
    }

    fn history_type(start: NaiveDate, end: NaiveDate) -> String {
        format!("history_{}_{}", start, end)
    }

    fn chain_type(option_type: OptionType, expiry: NaiveDate) -> String {
        format!("{}_{}", option_type, expiry)
    }

    /// Check if cache is valid (exists and not expired)
    pub fn is_valid(&self, symbol: &str, data_type: &str) -> bool {
        if !self.config.enabled {
            return false;
        }

        let path = self.cache_key(symbol, data_type);
        if !path.exists() {
            return false;
        }

        // Check modification time
        if let Ok(metadata) = fs::metadata(&path) {
            if let Ok(modified) = metadata.modified() {
                let modified: DateTime<Utc> = modified.into();
                let age = Utc::now() - modified;
                return age < Duration::hours(self.config.max_age_hours);
            }
        }

        false
    }

    fn save<T: Serialize>(&self, symbol: &str, data_type: &str, value: &T) -> BSResult<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let path = self.cache_key(symbol, data_type);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)?;

        tracing::info!("Cached {} for {} at {:?}", data_type, symbol, path);
        Ok(())
    }

    fn load<T: DeserializeOwned>(&self, symbol: &str, data_type: &str) -> BSResult<Option<T>> {
        if !self.is_valid(symbol, data_type) {
            return Ok(None);
        }

        let path = self.cache_key(symbol, data_type);
        let json = fs::read_to_string(&path)?;
        let value: T = serde_json::from_str(&json)?;

        tracing::info!("Loaded {} for {} from cache", data_type, symbol);
        Ok(Some(value))
    }

    pub fn save_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        series: &PriceSeries,
    ) -> BSResult<()> {
        self.save(symbol, &Self::history_type(start, end), series)
    }

    pub fn load_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BSResult<Option<PriceSeries>> {
        self.load(symbol, &Self::history_type(start, end))
    }

    pub fn save_chain(
        &self,
        symbol: &str,
        option_type: OptionType,
        expiry: NaiveDate,
        quotes: &[OptionQuote],
    ) -> BSResult<()> {
        self.save(symbol, &Self::chain_type(option_type, expiry), &quotes)
    }

    pub fn load_chain(
        &self,
        symbol: &str,
        option_type: OptionType,
        expiry: NaiveDate,
    ) -> BSResult<Option<Vec<OptionQuote>>> {
        self.load(symbol, &Self::chain_type(option_type, expiry))
    }

    /// Remove cached history and chains for a symbol, returning the number
    /// of files deleted
    pub fn clear(&self, symbol: &str) -> BSResult<usize> {
        let prefix = format!("{}_", symbol);
        self.remove_where(|name| name.starts_with(&prefix))
    }

    /// Remove every cached entry. Files that are not cache entries stay.
    pub fn clear_all(&self) -> BSResult<usize> {
        self.remove_where(|_| true)
    }

    fn remove_where(&self, matches: impl Fn(&str) -> bool) -> BSResult<usize> {
        if !self.config.cache_dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in fs::read_dir(&self.config.cache_dir)? {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().to_string();

            if file_name.ends_with(".json") && matches(&file_name) {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// List symbols with cached price history
    pub fn list_cached(&self) -> BSResult<Vec<String>> {
        let mut symbols = Vec::new();

        if !self.config.cache_dir.exists() {
            return Ok(symbols);
        }

        for entry in fs::read_dir(&self.config.cache_dir)? {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().to_string();

            if let Some((symbol, _)) = file_name.split_once("_history_") {
                if !symbols.iter().any(|s| s == symbol) {
                    symbols.push(symbol.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

/// Cached data fetcher - combines cache with any live source
pub struct CachedFetcher<M> {
    cache: DataCache,
    inner: M,
}

impl<M: MarketData> CachedFetcher<M> {
    pub fn new(config: CacheConfig, inner: M) -> BSResult<Self> {
        Ok(Self {
            cache: DataCache::new(config)?,
            inner,
        })
    }

    /// Drop cached data for `symbol` so the next request refetches it
    pub fn invalidate(&self, symbol: &str) -> BSResult<usize> {
        self.cache.clear(symbol)
    }
}

impl<M: MarketData> MarketData for CachedFetcher<M> {
    fn price_history(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> BSResult<PriceSeries> {
        if let Some(series) = self.cache.load_history(ticker, start, end)? {
            return Ok(series);
        }

        tracing::info!("Fetching fresh history for {}", ticker);
        let series = self.inner.price_history(ticker, start, end)?;
        self.cache.save_history(ticker, start, end, &series)?;
        Ok(series)
    }

    fn option_chain(
        &self,
        ticker: &str,
        option_type: OptionType,
        expiry: NaiveDate,
    ) -> BSResult<Vec<OptionQuote>> {
        if let Some(quotes) = self.cache.load_chain(ticker, option_type, expiry)? {
            return Ok(quotes);
        }

        tracing::info!("Fetching fresh {} chain for {} {}", option_type, ticker, expiry);
        let quotes = self.inner.option_chain(ticker, option_type, expiry)?;
        self.cache.save_chain(ticker, option_type, expiry, &quotes)?;
        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OptionContract;
    use std::cell::Cell;
    use tempfile::tempdir;

    struct CountingSource {
        history_calls: Cell<usize>,
        chain_calls: Cell<usize>,
    }

    impl MarketData for CountingSource {
        fn price_history(&self, _: &str, start: NaiveDate, _: NaiveDate) -> BSResult<PriceSeries> {
            self.history_calls.set(self.history_calls.get() + 1);
            PriceSeries::from_pairs([(start, 100.0), (start + Duration::days(1), 101.0)])
        }

        fn option_chain(
            &self,
            ticker: &str,
            option_type: OptionType,
            expiry: NaiveDate,
        ) -> BSResult<Vec<OptionQuote>> {
            self.chain_calls.set(self.chain_calls.get() + 1);
            let contract = OptionContract::new(ticker, "TEST241220C00100000", 100.0, expiry, option_type);
            Ok(vec![OptionQuote::new(contract, 2.5, 0.3)])
        }
    }

    fn config(dir: &std::path::Path) -> CacheConfig {
        CacheConfig {
            cache_dir: dir.to_path_buf(),
            max_age_hours: 24,
            enabled: true,
        }
    }

    #[test]
    fn test_cache_operations() {
        let temp_dir = tempdir().unwrap();
        let cache = DataCache::new(config(temp_dir.path())).unwrap();

        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let series = PriceSeries::from_pairs([(start, 100.0), (end, 99.0)]).unwrap();

        // Save and load
        cache.save_history("TEST", start, end, &series).unwrap();
        assert!(cache.is_valid("TEST", "history_2024-01-02_2024-01-03"));

        let loaded = cache.load_history("TEST", start, end).unwrap();
        assert_eq!(loaded, Some(series));
        assert_eq!(cache.list_cached().unwrap(), vec!["TEST".to_string()]);

        // Clear
        assert_eq!(cache.clear("TEST").unwrap(), 1);
        assert!(cache.load_history("TEST", start, end).unwrap().is_none());
    }

    #[test]
    fn test_clear_all_keeps_other_files() {
        let temp_dir = tempdir().unwrap();
        let cache = DataCache::new(config(temp_dir.path())).unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let series = PriceSeries::from_pairs([(day, 100.0)]).unwrap();
        cache.save_history("AAPL", day, day, &series).unwrap();
        cache.save_history("MSFT", day, day, &series).unwrap();
        cache.save_chain("AAPL", OptionType::Put, day, &[]).unwrap();
        fs::write(temp_dir.path().join("README.txt"), "notes").unwrap();

        assert_eq!(cache.clear_all().unwrap(), 3);
        assert!(cache.list_cached().unwrap().is_empty());
        assert!(temp_dir.path().join("README.txt").exists());
        assert_eq!(cache.clear_all().unwrap(), 0);
    }

    #[test]
    fn test_disabled_cache() {
        let temp_dir = tempdir().unwrap();
        let mut cfg = config(temp_dir.path());
        cfg.enabled = false;
        let cache = DataCache::new(cfg).unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let series = PriceSeries::from_pairs([(day, 100.0)]).unwrap();
        cache.save_history("TEST", day, day, &series).unwrap();
        assert!(cache.load_history("TEST", day, day).unwrap().is_none());
    }

    #[test]
    fn test_cached_fetcher_hits_source_once() {
        let temp_dir = tempdir().unwrap();
        let source = CountingSource {
            history_calls: Cell::new(0),
            chain_calls: Cell::new(0),
        };
        let fetcher = CachedFetcher::new(config(temp_dir.path()), source).unwrap();

        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap();
        let expiry = NaiveDate::from_ymd_opt(2024, 12, 20).unwrap();

        for _ in 0..3 {
            assert_eq!(fetcher.price_history("TEST", start, end).unwrap().len(), 2);
            assert_eq!(fetcher.option_chain("TEST", OptionType::Call, expiry).unwrap().len(), 1);
        }
        assert_eq!(fetcher.inner.history_calls.get(), 1);
        assert_eq!(fetcher.inner.chain_calls.get(), 1);

        // Put chain is a separate entry
        fetcher.option_chain("TEST", OptionType::Put, expiry).unwrap();
        assert_eq!(fetcher.inner.chain_calls.get(), 2);

        assert_eq!(fetcher.invalidate("TEST").unwrap(), 3);
        fetcher.price_history("TEST", start, end).unwrap();
        assert_eq!(fetcher.inner.history_calls.get(), 2);
    }
}
