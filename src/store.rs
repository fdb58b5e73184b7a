//! Flat-file record store keyed by code key.
//!
//! One record per line: `name{sep}key{sep}payload`. The payload is the last
//! field and may itself contain the separator; names may not. Blank lines are
//! ignored.

use std::{
    collections::HashSet,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use rand::Rng;
use tempfile::NamedTempFile;

use crate::common::{CodeError, CodeResult};

pub const DEFAULT_SEPARATOR: &str = ":___:";

/// Draws before key generation gives up.
pub const MAX_KEY_DRAWS: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub key: u64,
    pub payload: String,
}

#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    sep: String,
    keys: HashSet<u64>,
}

impl RecordStore {
    /// Opens the store at `path`, creating an empty file if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> CodeResult<Self> {
        Self::with_separator(path, DEFAULT_SEPARATOR)
    }

    pub fn with_separator<P: AsRef<Path>>(path: P, sep: &str) -> CodeResult<Self> {
        if sep.is_empty() || sep.contains('\n') {
            return Err(CodeError::InvalidField(format!("separator {sep:?}")));
        }

        let path = path.as_ref().to_path_buf();
        OpenOptions::new().create(true).append(true).open(&path)?;

        let mut store = Self { path, sep: sep.to_string(), keys: HashSet::new() };
        store.reload()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn separator(&self) -> &str {
        &self.sep
    }

    /// Re-reads the key registry from disk.
    pub fn reload(&mut self) -> CodeResult<()> {
        self.keys = self.records()?.into_iter().map(|r| r.key).collect();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: u64) -> bool {
        self.keys.contains(&key)
    }

    /// Every record in file order.
    pub fn records(&self) -> CodeResult<Vec<Record>> {
        let content = fs::read_to_string(&self.path)?;
        let mut res = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            res.push(self.parse(line, i + 1)?);
        }
        Ok(res)
    }

    /// Scans the file, so records appended by other writers since `open` are
    /// found. [`contains`](Self::contains) only knows the cached registry.
    pub fn lookup(&self, key: u64) -> CodeResult<Option<Record>> {
        Ok(self.records()?.into_iter().find(|r| r.key == key))
    }

    pub fn insert(&mut self, name: &str, key: u64, payload: &str) -> CodeResult<Record> {
        // The first separator on the line must be the one after the name
        let line_start = format!("{name}{}", self.sep);
        if line_start.find(&self.sep) != Some(name.len()) || name.contains('\n') {
            return Err(CodeError::InvalidField(format!("name {name:?}")));
        }
        if payload.contains('\n') {
            return Err(CodeError::InvalidField("payload spans several lines".into()));
        }
        if self.contains(key) {
            return Err(CodeError::DuplicateKey(key));
        }

        let rec = Record { name: name.to_string(), key, payload: payload.to_string() };
        // Hand-edited files may lack the final line break
        let dangling = fs::read(&self.path)?.last().is_some_and(|b| *b != b'\n');
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        if dangling {
            file.write_all(b"\n")?;
        }
        file.write_all(self.format(&rec).as_bytes())?;
        self.keys.insert(key);

        log::info!("Stored record {name:?} under key {key}");
        Ok(rec)
    }

    pub fn delete(&mut self, key: u64) -> CodeResult<Record> {
        let records = self.records()?;
        let Some(pos) = records.iter().position(|r| r.key == key) else {
            return Err(CodeError::RecordNotFound(key));
        };

        // Rewrite into a sibling file and swap it in, so a failed write leaves
        // the store untouched
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        for r in records.iter().filter(|r| r.key != key) {
            tmp.write_all(self.format(r).as_bytes())?;
        }
        tmp.persist(&self.path).map_err(|e| e.error)?;
        self.keys.remove(&key);

        log::info!("Deleted record under key {key}");
        Ok(records[pos].clone())
    }

    /// Draws a fresh non-zero key that is not registered yet and reserves it.
    pub fn generate_key<R: Rng>(&mut self, rng: &mut R) -> CodeResult<u64> {
        for _ in 0..MAX_KEY_DRAWS {
            let key = rng.random_range(1..=u64::MAX);
            if self.keys.insert(key) {
                return Ok(key);
            }
        }
        Err(CodeError::KeySpaceExhausted(MAX_KEY_DRAWS))
    }

    /// Generates a key and stores a record under it.
    pub fn create<R: Rng>(
        &mut self,
        name: &str,
        payload: &str,
        rng: &mut R,
    ) -> CodeResult<Record> {
        let key = self.generate_key(rng)?;
        // Release the reservation so insert can claim it
        self.keys.remove(&key);
        self.insert(name, key, payload)
    }

    fn format(&self, rec: &Record) -> String {
        format!("{}{sep}{}{sep}{}\n", rec.name, rec.key, rec.payload, sep = self.sep)
    }

    fn parse(&self, line: &str, line_no: usize) -> CodeResult<Record> {
        let mut fields = line.splitn(3, self.sep.as_str());
        let name = fields.next().unwrap_or_default();
        let key = fields.next().and_then(|k| k.trim().parse::<u64>().ok());
        let payload = fields.next().unwrap_or_default();

        let key = key.ok_or(CodeError::MalformedRecord { line: line_no })?;
        Ok(Record { name: name.to_string(), key, payload: payload.to_string() })
    }
}
