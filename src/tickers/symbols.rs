//! Symbol allow-list backed by on-disk copies of the symbol-master feeds.
//!
//! Each feed is cached as `<cache_dir>/<name>.txt`. A request checks every
//! file's modification time against the freshness window on its own, refetches
//! only the stale or missing ones, and unions the parsed symbol sets.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::clock::Clock;
use crate::config::{SymbolSourceConfig, SymbolsConfig};
use crate::error::{SymbolError, SymbolParseError};
use crate::tickers::fetcher::SymbolFetcher;

const FOOTER_PREFIX: &str = "File Creation Time";
const TEST_ISSUE_COLUMN: &str = "Test Issue";

/// The set of symbols a candidate must belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolAllowList {
    symbols: HashSet<String>,
}

impl SymbolAllowList {
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl FromIterator<String> for SymbolAllowList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            symbols: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for SymbolAllowList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}

impl Extend<String> for SymbolAllowList {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.symbols.extend(iter);
    }
}

/// Parse one pipe-delimited symbol master.
///
/// The first line is the header; `File Creation Time` footers and blank lines
/// are skipped. Rows marked `Y` under a `Test Issue` column are dropped. Any
/// data line without a pipe or with an empty first field rejects the file.
pub fn parse_symbol_master(contents: &str) -> Result<HashSet<String>, SymbolParseError> {
    let mut lines = contents
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (_, header) = lines.next().ok_or(SymbolParseError::Empty)?;
    let test_issue_idx = header
        .split('|')
        .position(|column| column.trim() == TEST_ISSUE_COLUMN);

    let mut symbols = HashSet::new();
    for (line_no, line) in lines {
        if line.starts_with(FOOTER_PREFIX) {
            continue;
        }
        if !line.contains('|') {
            return Err(SymbolParseError::MalformedLine {
                line: line_no,
                reason: "missing '|' delimiter",
            });
        }

        let fields: Vec<&str> = line.split('|').collect();
        let symbol = fields[0].trim();
        if symbol.is_empty() {
            return Err(SymbolParseError::MalformedLine {
                line: line_no,
                reason: "empty symbol field",
            });
        }

        let is_test_issue = test_issue_idx
            .and_then(|idx| fields.get(idx))
            .is_some_and(|flag| flag.trim() == "Y");
        if is_test_issue {
            continue;
        }

        symbols.insert(symbol.to_ascii_uppercase());
    }

    Ok(symbols)
}

/// Parsed contents of one cached file, keyed by the file's mtime.
struct ParsedSource {
    modified: SystemTime,
    symbols: HashSet<String>,
}

#[derive(Default)]
struct CacheState {
    parsed: HashMap<String, ParsedSource>,
    merged: Option<(Vec<SystemTime>, Arc<SymbolAllowList>)>,
}

pub struct SymbolCache {
    sources: Vec<SymbolSourceConfig>,
    cache_dir: PathBuf,
    ttl: chrono::Duration,
    fetcher: Arc<dyn SymbolFetcher>,
    clock: Arc<dyn Clock>,
    /// Held across the whole check-fetch-parse path so concurrent callers
    /// never download the same feed twice.
    state: Mutex<CacheState>,
}

impl SymbolCache {
    pub fn new(
        config: &SymbolsConfig,
        fetcher: Arc<dyn SymbolFetcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sources: config.sources.clone(),
            cache_dir: config.cache_dir.clone(),
            ttl: config.ttl(),
            fetcher,
            clock,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn cache_path(&self, source: &SymbolSourceConfig) -> PathBuf {
        self.cache_dir.join(format!("{}.txt", source.name))
    }

    /// Current allow-list, refreshing stale feeds first.
    ///
    /// A failed download is returned as-is. A feed that fails to parse
    /// contributes no symbols while the others still do.
    #[instrument(skip(self))]
    pub async fn allow_list(&self) -> Result<Arc<SymbolAllowList>, SymbolError> {
        let mut state = self.state.lock().await;
        let now = self.clock.now();

        let mut stamps = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let path = self.cache_path(source);
            let modified = self.ensure_fresh(source, &path, now).await?;

            let reusable = state
                .parsed
                .get(&source.name)
                .is_some_and(|parsed| parsed.modified == modified);
            if !reusable {
                let symbols = load_source(source, &path).await?;
                state
                    .parsed
                    .insert(source.name.clone(), ParsedSource { modified, symbols });
            }
            stamps.push(modified);
        }

        if let Some((cached_stamps, list)) = &state.merged {
            if *cached_stamps == stamps {
                return Ok(list.clone());
            }
        }

        let mut list = SymbolAllowList::default();
        for source in &self.sources {
            if let Some(parsed) = state.parsed.get(&source.name) {
                list.extend(parsed.symbols.iter().cloned());
            }
        }
        let list = Arc::new(list);
        info!(symbols = list.len(), "Symbol allow-list ready");
        state.merged = Some((stamps, list.clone()));

        Ok(list)
    }

    /// Make sure the cached file exists and is inside the freshness window.
    /// Returns the file's modification time after any refresh.
    async fn ensure_fresh(
        &self,
        source: &SymbolSourceConfig,
        path: &Path,
        now: DateTime<Utc>,
    ) -> Result<SystemTime, SymbolError> {
        if let Some(modified) = modified_time(path).await? {
            let age = now - DateTime::<Utc>::from(modified);
            if age <= self.ttl {
                debug!(source = %source.name, age_minutes = age.num_minutes(), "Symbol master fresh");
                return Ok(modified);
            }
            info!(source = %source.name, age_hours = age.num_hours(), "Symbol master stale");
        } else {
            info!(source = %source.name, "Symbol master not cached");
        }

        let contents = self.fetcher.fetch(source).await?;
        let stamp = SystemTime::from(now);
        write_cache_file(path.to_path_buf(), contents, stamp).await?;

        // Filesystems may round the stamp; key on what a later read will see.
        Ok(modified_time(path).await?.unwrap_or(stamp))
    }
}

async fn modified_time(path: &Path) -> Result<Option<SystemTime>, SymbolError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.modified().map(Some).map_err(|source| SymbolError::Io {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(SymbolError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write the feed and stamp the file with the clock's time, so freshness is
/// always judged against the same clock that wrote it.
async fn write_cache_file(
    path: PathBuf,
    contents: impl Into<Vec<u8>>,
    stamp: SystemTime,
) -> Result<(), SymbolError> {
    let target = path.clone();
    let contents = contents.into();
    tokio::task::spawn_blocking(move || -> io::Result<()> {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, contents)?;
        std::fs::File::options()
            .write(true)
            .open(&target)?
            .set_modified(stamp)
    })
    .await
    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    .and_then(|result| result)
    .map_err(|source| SymbolError::Io { path, source })
}

async fn load_source(
    source: &SymbolSourceConfig,
    path: &Path,
) -> Result<HashSet<String>, SymbolError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| SymbolError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let parsed = String::from_utf8(bytes)
        .map_err(|_| SymbolParseError::NotUtf8)
        .and_then(|contents| parse_symbol_master(&contents));

    match parsed {
        Ok(symbols) => {
            debug!(source = %source.name, symbols = symbols.len(), "Symbol master parsed");
            Ok(symbols)
        }
        Err(e) => {
            warn!(
                source = %source.name,
                path = %path.display(),
                error = %e,
                "Malformed symbol master, skipping its symbols"
            );
            Ok(HashSet::new())
        }
    }
}
