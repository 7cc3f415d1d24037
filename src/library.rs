use crate::config::SchematicsConfig;
use crate::error::{ListError, LoadError};
use crate::nbt::{encode_fields, FieldMap, QuartzDecoder, TagDecoder};
use crate::schematic::{SchematicDocument, SchematicHeader, ROOT_NAME};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Named schematics stored as `<root>/<name>.<extension>`.
pub struct SchematicLibrary {
    root: PathBuf,
    extension: String,
    decoder: Box<dyn TagDecoder>,
}

/// One page of a listing. Entry numbers are 1-based positions in the full listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub number: u32,
    pub total_pages: u32,
    pub entries: Vec<(usize, String)>,
}

impl SchematicLibrary {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        SchematicLibrary {
            root: root.into(),
            extension: "schematic".to_string(),
            decoder: Box::new(QuartzDecoder),
        }
    }

    pub fn from_config(config: &SchematicsConfig) -> Self {
        SchematicLibrary::new(config.storage_root.clone()).with_extension(&config.extension)
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn with_decoder<D: TagDecoder + 'static>(mut self, decoder: D) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, self.extension))
    }

    /// Sorted names of every schematic in the storage root. A missing root is an empty library.
    pub fn names(&self) -> Result<Vec<String>, ListError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let matches_extension = path
                .extension()
                .and_then(|s| s.to_str())
                .map(|ext| ext == self.extension)
                .unwrap_or(false);
            if !matches_extension {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn page(&self, number: u32, per_page: usize) -> Result<Page, ListError> {
        paginate(&self.names()?, number, per_page)
    }

    /// Loads and fully validates a schematic.
    pub fn load(&self, name: &str) -> Result<SchematicDocument, LoadError> {
        let fields = self.read_fields(name)?;
        SchematicDocument::from_fields(name, &fields).map_err(|reason| LoadError::Invalid {
            name: name.to_string(),
            reason,
        })
    }

    /// Loads only the dimensions and level tag; block arrays are neither kept nor checked.
    pub fn load_header(&self, name: &str) -> Result<SchematicHeader, LoadError> {
        let fields = self.read_fields(name)?;
        SchematicHeader::from_fields(name, &fields).map_err(|reason| LoadError::Invalid {
            name: name.to_string(),
            reason,
        })
    }

    /// Writes `doc` under its own name, replacing any existing file.
    pub fn save(&self, doc: &SchematicDocument) -> Result<PathBuf, LoadError> {
        let name = doc.name();
        check_name(name)?;
        let bytes = encode_fields(&doc.to_fields(), ROOT_NAME).map_err(|source| {
            LoadError::CorruptFormat {
                name: name.to_string(),
                source,
            }
        })?;
        let io_err = |source: std::io::Error| LoadError::Io {
            name: name.to_string(),
            source,
        };
        std::fs::create_dir_all(&self.root).map_err(io_err)?;
        let path = self.path_for(name);
        std::fs::write(&path, bytes).map_err(io_err)?;
        debug!(schematic = name, path = %path.display(), "Saved schematic");
        Ok(path)
    }

    fn read_fields(&self, name: &str) -> Result<FieldMap, LoadError> {
        check_name(name)?;
        let path = self.path_for(name);
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(LoadError::NotFound {
                    name: name.to_string(),
                })
            }
            Err(source) => {
                return Err(LoadError::Io {
                    name: name.to_string(),
                    source,
                })
            }
        };
        debug!(schematic = name, bytes = data.len(), "Decoding schematic");
        self.decoder
            .decode(&data)
            .map_err(|source| LoadError::CorruptFormat {
                name: name.to_string(),
                source,
            })
    }
}

fn check_name(name: &str) -> Result<(), LoadError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(|c: char| c == '/' || c == '\\')
        || name.contains('\0');
    if bad {
        return Err(LoadError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Slices `names` into 1-based pages of `per_page` entries.
pub fn paginate(names: &[String], number: u32, per_page: usize) -> Result<Page, ListError> {
    if names.is_empty() {
        return Err(ListError::Empty);
    }
    let per_page = per_page.max(1);
    let total_pages = names.len().div_ceil(per_page) as u32;
    if number < 1 || number > total_pages {
        return Err(ListError::PageOutOfRange {
            requested: number,
            total: total_pages,
        });
    }

    let start = per_page * (number as usize - 1);
    let end = (start + per_page).min(names.len());
    let entries = names[start..end]
        .iter()
        .enumerate()
        .map(|(i, name)| (start + i + 1, name.clone()))
        .collect();

    Ok(Page {
        number,
        total_pages,
        entries,
    })
}
