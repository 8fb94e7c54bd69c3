use crate::error::{Result, SearchError};
use crate::{DocId, Document, InvertedIndex, Term};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::{self, create_dir_all, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

/// Written last; its presence marks a complete save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
}

#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn index(&self) -> PathBuf { self.root.join("index.bin") }
    /// JSON rather than bincode: records carry arbitrary extra fields.
    pub fn docmap(&self) -> PathBuf { self.root.join("docmap.json") }
    pub fn term_frequencies(&self) -> PathBuf { self.root.join("term_frequencies.bin") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }

    fn all(&self) -> [PathBuf; 4] {
        [self.index(), self.docmap(), self.term_frequencies(), self.meta()]
    }
}

/// Write `bytes` next to `path` and rename it into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let mut f = File::create(&tmp)?;
    f.write_all(bytes)?;
    f.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn save_blob<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = bincode::serialize(value)?;
    write_atomic(path, &bytes)
}

fn load_blob<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let buf = fs::read(path)?;
    Ok(bincode::deserialize(&buf)?)
}

fn timestamp(at: time::OffsetDateTime) -> Result<String> {
    Ok(at.format(&time::format_description::well_known::Rfc3339)?)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    let json = serde_json::to_string_pretty(meta)?;
    write_atomic(&paths.meta(), json.as_bytes())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let buf = fs::read_to_string(paths.meta())?;
    Ok(serde_json::from_str(&buf)?)
}

/// Persist postings, document map and term frequencies, then the meta file.
///
/// A crash before the meta file lands leaves a state that [`load_index`]
/// reports as incomplete rather than serving.
pub fn save_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    // A stale meta file would vouch for blobs that are about to change.
    match fs::remove_file(paths.meta()) {
        Err(e) if e.kind() != ErrorKind::NotFound => return Err(e.into()),
        _ => {}
    }
    save_blob(&paths.index(), &index.postings)?;
    // Stored as a list so corpus order survives the round trip.
    let documents: Vec<&Document> = index.documents().collect();
    write_atomic(&paths.docmap(), &serde_json::to_vec(&documents)?)?;
    save_blob(&paths.term_frequencies(), &index.term_frequencies)?;

    let meta = MetaFile {
        num_docs: index.num_docs() as u32,
        num_terms: index.num_terms() as u32,
        created_at: timestamp(time::OffsetDateTime::now_utc())?,
        version: FORMAT_VERSION,
    };
    save_meta(paths, &meta)?;
    tracing::info!(root = %paths.root.display(), num_docs = meta.num_docs, num_terms = meta.num_terms, "saved index");
    Ok(())
}

pub fn load_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    let present: Vec<bool> = paths.all().iter().map(|p| p.is_file()).collect();
    if present.iter().all(|p| !p) {
        return Err(SearchError::IndexNotBuilt { root: paths.root.clone() });
    }
    if let Some(missing) = paths
        .all()
        .iter()
        .zip(&present)
        .filter(|(_, present)| !**present)
        .map(|(p, _)| p.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default())
        .reduce(|a, b| format!("{a}, {b}"))
    {
        return Err(SearchError::IncompleteIndex { root: paths.root.clone(), missing: format!("missing {missing}") });
    }

    let meta = load_meta(paths)?;
    let postings: HashMap<Term, BTreeSet<DocId>> = load_blob(&paths.index())?;
    let documents: Vec<Document> = serde_json::from_slice(&fs::read(paths.docmap())?)?;
    let order: Vec<DocId> = documents.iter().map(|d| d.id).collect();
    let docmap: BTreeMap<DocId, Document> = documents.into_iter().map(|d| (d.id, d)).collect();
    let term_frequencies: HashMap<DocId, HashMap<Term, u32>> = load_blob(&paths.term_frequencies())?;

    if meta.num_docs as usize != docmap.len() || meta.num_terms as usize != postings.len() {
        return Err(SearchError::IncompleteIndex {
            root: paths.root.clone(),
            missing: format!(
                "meta.json records {} docs / {} terms, blobs hold {} / {}",
                meta.num_docs,
                meta.num_terms,
                docmap.len(),
                postings.len()
            ),
        });
    }
    tracing::info!(root = %paths.root.display(), num_docs = meta.num_docs, created_at = %meta.created_at, "loaded index");
    Ok(InvertedIndex { postings, docmap, order, term_frequencies })
}
