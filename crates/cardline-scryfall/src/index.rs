//! In-memory card lookup keyed by Scryfall ID

use std::fs::File;
use std::io;
use std::path::Path;

use cardline_core::Error;
use cardline_core::progress::fmt_num;
use memmap2::Mmap;
use rustc_hash::FxHashMap;

use crate::card::CardRecord;

/// O(1) card lookup using `FxHashMap`.
///
/// Read-only once built; rebuilding is the only way to pick up a new mirror.
#[derive(Debug, Default)]
pub struct LookupIndex {
    cards: FxHashMap<String, CardRecord>,
}

impl LookupIndex {
    /// Load the mirror payload (a JSON array of cards) via mmap.
    ///
    /// A missing file is `MirrorNotFound`; an empty or unparsable one is
    /// `MirrorCorrupt`. Duplicate IDs keep the last record.
    pub fn build(path: &Path) -> Result<Self, Error> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::MirrorNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(Error::io(path, e)),
        };
        let len = file.metadata().map_err(|e| Error::io(path, e))?.len();
        if len == 0 {
            return Err(Error::MirrorCorrupt {
                path: path.to_path_buf(),
                message: "file is empty".into(),
            });
        }

        // SAFETY: the payload is only replaced by rename, never written in place,
        // so the mapped inode stays unchanged while we hold it.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::io(path, e))?;
        let records: Vec<CardRecord> =
            sonic_rs::from_slice(&mmap).map_err(|e| Error::MirrorCorrupt {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let index = Self::from_records(records);
        log::info!(
            "Indexed {} cards from {}",
            fmt_num(index.len()),
            path.display()
        );
        Ok(index)
    }

    pub fn from_records(records: impl IntoIterator<Item = CardRecord>) -> Self {
        let cards = records
            .into_iter()
            .map(|card| (card.id.clone(), card))
            .collect();
        Self { cards }
    }

    pub fn get(&self, id: &str) -> Option<&CardRecord> {
        self.cards.get(id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
