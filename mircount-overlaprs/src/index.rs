use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use fxhash::FxHashMap as HashMap;
use log::info;

use mircount_core::consts::{DEFAULT_FLANK, DEFAULT_NAME_KEY, HEADER_MARKER};
use mircount_core::models::parse_record;
use mircount_core::utils::{get_dynamic_reader, read_line_bytes};
use mircount_core::{AlignedRead, CountingError, CountingResult, Strand};

use crate::catalog::{FeatureCatalog, FeatureCounts};

///
/// One feature placed on the genome, as stored in the index.
///
/// `primary_start` is the 5'-most base of the feature's alignment: its first
/// base on the forward strand, its last base on the reverse strand.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
pub struct FeatureAnchor {
    pub feature: usize,
    pub primary_start: i64,
}

#[derive(Debug, Clone)]
pub struct IndexParams {
    /// Bases added to both ends of every feature before it is indexed.
    pub flank: i64,
    /// Key looked up when feature identifiers are `key=value;` annotations.
    pub name_key: String,
}

impl Default for IndexParams {
    fn default() -> Self {
        IndexParams {
            flank: DEFAULT_FLANK,
            name_key: DEFAULT_NAME_KEY.to_string(),
        }
    }
}

type PositionMap = HashMap<i64, Vec<FeatureAnchor>>;

#[derive(Debug, Default)]
pub(crate) struct StrandedPositions {
    forward: PositionMap,
    reverse: PositionMap,
}

impl StrandedPositions {
    pub(crate) fn get(&self, strand: Strand) -> &PositionMap {
        match strand {
            Strand::Forward => &self.forward,
            Strand::Reverse => &self.reverse,
        }
    }

    fn get_mut(&mut self, strand: Strand) -> &mut PositionMap {
        match strand {
            Strand::Forward => &mut self.forward,
            Strand::Reverse => &mut self.reverse,
        }
    }
}

///
/// Position-indexed lookup of features: contig -> strand -> position -> features.
///
/// Built once from a reference alignment listing and read-only afterwards, so a
/// single index can be shared between threads counting different samples.
///
#[derive(Debug)]
pub struct FeatureIndex {
    catalog: Arc<FeatureCatalog>,
    pub(crate) contigs: HashMap<String, StrandedPositions>,
}

impl FeatureIndex {
    ///
    /// Build the index from a reference alignment listing on disk.
    ///
    /// # Arguments
    /// - path: path to the listing, plain or gzipped
    /// - params: flank size and annotation key
    ///
    pub fn from_path(path: &Path, params: &IndexParams) -> CountingResult<Self> {
        let reader = get_dynamic_reader(path)?;
        let index = Self::from_reader(reader, params)?;

        info!(
            "Indexed {} features on {} contigs from {}",
            index.catalog.len(),
            index.contigs.len(),
            path.display()
        );

        Ok(index)
    }

    pub fn from_reader<R: BufRead>(mut reader: R, params: &IndexParams) -> CountingResult<Self> {
        let mut catalog = FeatureCatalog::default();
        let mut contigs: HashMap<String, StrandedPositions> = HashMap::default();

        let mut buf = Vec::new();
        let mut line_no = 0;
        while read_line_bytes(&mut reader, &mut buf)? {
            line_no += 1;

            if buf.is_empty() || buf[0] == HEADER_MARKER {
                continue;
            }

            let malformed = |reason: String| CountingError::MalformedInput {
                line: line_no,
                reason,
            };

            let record = parse_record(&buf).map_err(|e| malformed(e.to_string()))?;
            let read = AlignedRead::try_from(&record).map_err(|e| malformed(e.to_string()))?;

            let name = read
                .name
                .and_then(|field| extract_feature_name(field, &params.name_key))
                .ok_or_else(|| {
                    malformed(format!(
                        "no feature name ('{}=' annotation) in '{}'",
                        params.name_key,
                        read.name.unwrap_or("*")
                    ))
                })?;

            if read.start < 1 {
                return Err(malformed("missing start position".to_string()));
            }
            if read.len == 0 {
                return Err(malformed("missing sequence".to_string()));
            }

            let strand = Strand::from_listing_flag(read.flags);
            let primary_start = match strand {
                Strand::Forward => read.start,
                Strand::Reverse => read.end(),
            };

            let window_start = read.start.checked_sub(params.flank);
            let window_end = read
                .start
                .checked_add(read.len)
                .and_then(|end| end.checked_add(params.flank));
            let (Some(window_start), Some(window_end)) = (window_start, window_end) else {
                return Err(malformed(format!(
                    "window around start {} overflows with flank {}",
                    read.start, params.flank
                )));
            };

            let anchor = FeatureAnchor {
                feature: catalog.insert(name),
                primary_start,
            };

            let positions = contigs
                .entry(read.chr.to_string())
                .or_default()
                .get_mut(strand);
            for pos in window_start..window_end {
                positions.entry(pos).or_default().push(anchor);
            }
        }

        Ok(FeatureIndex {
            catalog: Arc::new(catalog),
            contigs,
        })
    }

    pub fn catalog(&self) -> &Arc<FeatureCatalog> {
        &self.catalog
    }

    ///
    /// Fresh, all-zero counts over every feature in the index.
    ///
    pub fn count_template(&self) -> FeatureCounts {
        FeatureCounts::zeroed(Arc::clone(&self.catalog))
    }

    /// Features indexed at a single position.
    pub fn at(&self, chr: &str, strand: Strand, pos: i64) -> Option<&[FeatureAnchor]> {
        self.contigs
            .get(chr)
            .and_then(|stranded| stranded.get(strand).get(&pos))
            .map(Vec::as_slice)
    }

    pub fn has_contig(&self, chr: &str) -> bool {
        self.contigs.contains_key(chr)
    }
}

///
/// Pull the feature name out of an identifier column.
///
/// Plain identifiers are used as they are. Identifiers holding annotations,
/// e.g. `ID=MIMAT0000062;Name=hsa-let-7a-5p`, must carry the `key=` entry.
///
fn extract_feature_name<'a>(field: &'a str, key: &str) -> Option<&'a str> {
    let name = if field.contains(';') || field.contains('=') {
        field
            .split(';')
            .filter_map(|entry| entry.trim().split_once('='))
            .find(|(k, _)| k.trim() == key)
            .map(|(_, v)| v.trim().trim_matches('"'))?
    } else {
        field
    };

    match name {
        "" | "*" => None,
        name => Some(name),
    }
}
