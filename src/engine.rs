pub mod store;
pub mod tokenizer;

use log::debug;
use serde::Serialize;
use std::fs::create_dir_all;
use std::path::Path;
use std::{error, fmt, io};

use store::RecordStore;
use tokenizer::tokenize;

const INDEX_FILE_NAME: &str = "gramdb.idx";
const LIBRARY_FILE_NAME: &str = "gramdb.lib";

const DEFAULT_BUCKET_COUNT: u32 = 100_000;
const DEFAULT_FREE_POOL_LEN: u32 = 10_000;

/// General engine error: IO from the stores, or a library record that can
/// no longer be decoded as UTF-8.
#[derive(Debug)]
pub enum EngineError {
    Io(io::Error),
    Corrupted(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Io(e) => write!(f, "IO error: {}", e),
            EngineError::Corrupted(s) => write!(f, "Corrupted data: {}", s),
        }
    }
}

impl error::Error for EngineError {}

impl From<io::Error> for EngineError {
    fn from(e: io::Error) -> Self {
        EngineError::Io(e)
    }
}

/// Store sizing for `Engine::create`.
pub struct EngineOptions {
    pub bucket_count: u32,
    pub free_pool_len: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            bucket_count: DEFAULT_BUCKET_COUNT,
            free_pool_len: DEFAULT_FREE_POOL_LEN,
        }
    }
}

/// One candidate match: the document and the character position its
/// occurrence starts at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hit {
    pub doc_id: u32,
    pub position: u32,
}

/// Full-text search engine over two record stores: `index` maps character
/// grams to flat `(doc_id, position)` postings, `library` maps decimal
/// document ids to their raw content.
pub struct Engine {
    index: RecordStore<u32>,
    library: RecordStore<u8>,
}

impl Engine {
    /// Create a fresh workspace (the directory is created if missing).
    pub fn create<P: AsRef<Path>>(workspace: P, opts: EngineOptions) -> Result<Self, EngineError> {
        let workspace = workspace.as_ref();
        create_dir_all(workspace)?;

        let index = RecordStore::create(
            workspace.join(INDEX_FILE_NAME),
            opts.bucket_count,
            opts.free_pool_len,
        )?;
        let library = RecordStore::create(
            workspace.join(LIBRARY_FILE_NAME),
            opts.bucket_count,
            opts.free_pool_len,
        )?;
        debug!("created workspace at {}", workspace.display());
        Ok(Self { index, library })
    }

    /// Open an existing workspace.
    pub fn open<P: AsRef<Path>>(workspace: P) -> Result<Self, EngineError> {
        let workspace = workspace.as_ref();
        let index = RecordStore::open(workspace.join(INDEX_FILE_NAME))?;
        let library = RecordStore::open(workspace.join(LIBRARY_FILE_NAME))?;
        Ok(Self { index, library })
    }

    /// Flush both store headers and close the workspace.
    pub fn close(self) -> Result<(), EngineError> {
        let Engine { index, library } = self;
        index.close()?;
        library.close()?;
        Ok(())
    }

    /// Index a document and store its content. No-op on empty content.
    ///
    /// Unigram and bigram postings carry independent position counters,
    /// both advancing one per emission; `search` depends on that.
    pub fn register_doc(&mut self, doc_id: u32, content: &str) -> Result<(), EngineError> {
        if content.is_empty() {
            return Ok(());
        }

        let grams = tokenize(content, true);
        for (position, unigram) in grams.unigrams.iter().enumerate() {
            self.index
                .append(unigram.as_bytes(), &[doc_id, position as u32])?;
        }
        for (position, bigram) in grams.bigrams.iter().enumerate() {
            self.index
                .append(bigram.as_bytes(), &[doc_id, position as u32])?;
        }

        self.library
            .set(doc_id.to_string().as_bytes(), content.as_bytes())?;
        Ok(())
    }

    /// Remove a document's content and scrub its postings from every gram
    /// of its text. Silent no-op for an unknown id.
    pub fn unregister_doc(&mut self, doc_id: u32) -> Result<(), EngineError> {
        let key = doc_id.to_string();
        let raw = match self.library.get(key.as_bytes())? {
            Some(raw) => raw,
            None => return Ok(()),
        };
        self.library.remove(key.as_bytes())?;

        let content = String::from_utf8(raw)
            .map_err(|_| EngineError::Corrupted(format!("document {} is not UTF-8", doc_id)))?;
        let grams = tokenize(&content, true);

        for gram in grams.unigrams.iter().chain(grams.bigrams.iter()) {
            let mut posting = match self.index.get(gram.as_bytes())? {
                Some(posting) => posting,
                None => continue,
            };

            // Postings for one document form a single contiguous run,
            // because registration appends them in one batch per key.
            let mut match_offset = 0;
            let mut match_len = 0;
            let mut i = 0;
            while i < posting.len() {
                if posting[i] == doc_id {
                    if match_len == 0 {
                        match_offset = i;
                    }
                    match_len += 2;
                } else if match_len > 0 {
                    break;
                }
                i += 2;
            }

            if match_len == 0 {
                continue;
            }
            if match_len == posting.len() {
                self.index.remove(gram.as_bytes())?;
            } else {
                posting.drain(match_offset..match_offset + match_len);
                self.index.set(gram.as_bytes(), &posting)?;
            }
        }
        Ok(())
    }

    /// The stored content of a document, or `None` if it is not registered.
    pub fn get_doc_content(&self, doc_id: u32) -> Result<Option<String>, EngineError> {
        match self.library.get(doc_id.to_string().as_bytes())? {
            Some(raw) => String::from_utf8(raw)
                .map(Some)
                .map_err(|_| EngineError::Corrupted(format!("document {} is not UTF-8", doc_id))),
            None => Ok(None),
        }
    }

    /// Positional phrase search: every start position at which all query
    /// grams line up, in first-gram posting order.
    pub fn search(&self, query: &str) -> Result<Vec<Hit>, EngineError> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let tokens = tokenize(query, false);
        let unigram_count = tokens.unigrams.len();
        if unigram_count == 0 {
            return Ok(Vec::new());
        }

        // The query decomposes into disjoint character pairs plus, at odd
        // length, a trailing solo character.
        let mut grams = tokens.bigrams;
        if unigram_count % 2 == 1 {
            grams.push(tokens.unigrams[unigram_count - 1]);
        }

        let mut hits = Vec::new();
        if let Some(posting) = self.index.get(grams[0].as_bytes())? {
            for pair in posting.chunks_exact(2) {
                hits.push(Hit {
                    doc_id: pair[0],
                    position: pair[1],
                });
            }
        }

        for (i, gram) in grams.iter().enumerate().skip(1) {
            if hits.is_empty() {
                break;
            }

            let posting = self.index.get(gram.as_bytes())?.unwrap_or_default();
            // Each earlier gram spans two characters, and indexed bigram
            // positions advance one per character.
            let offset_step = 2 * i as u32;
            hits.retain(|hit| {
                posting
                    .chunks_exact(2)
                    .any(|pair| pair[0] == hit.doc_id && pair[1] == hit.position + offset_step)
            });
        }

        Ok(hits)
    }
}
