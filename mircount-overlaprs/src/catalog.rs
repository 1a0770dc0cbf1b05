use std::sync::Arc;

use fxhash::FxHashMap as HashMap;

///
/// Every known feature name, each with a stable integer id.
///
/// Ids are handed out in first-seen order. A name seen again (the same mature
/// microRNA at a second locus) keeps its first id.
///
#[derive(Debug, Default, Clone)]
pub struct FeatureCatalog {
    names: Vec<String>,
    lookup: HashMap<String, usize>,
}

impl FeatureCatalog {
    pub fn insert(&mut self, name: &str) -> usize {
        if let Some(id) = self.lookup.get(name) {
            return *id;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.lookup.insert(name.to_string(), id);
        id
    }

    pub fn id(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    pub fn name(&self, id: usize) -> &str {
        &self.names[id]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

///
/// Read counts for every feature in a catalog.
///
/// Created zeroed from the catalog, so features without reads are reported as
/// zero rather than left out.
///
#[derive(Debug, Clone)]
pub struct FeatureCounts {
    catalog: Arc<FeatureCatalog>,
    counts: Vec<u64>,
}

impl FeatureCounts {
    pub fn zeroed(catalog: Arc<FeatureCatalog>) -> Self {
        let counts = vec![0; catalog.len()];
        FeatureCounts { catalog, counts }
    }

    pub fn increment(&mut self, feature: usize) {
        self.counts[feature] += 1;
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.catalog.id(name).map(|id| self.counts[id])
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn catalog(&self) -> &Arc<FeatureCatalog> {
        &self.catalog
    }

    /// `(feature name, count)` pairs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.catalog
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.counts.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn catalog() -> Arc<FeatureCatalog> {
        let mut catalog = FeatureCatalog::default();
        catalog.insert("hsa-let-7a-5p");
        catalog.insert("hsa-miR-21-5p");
        catalog.insert("hsa-let-7a-5p");
        Arc::new(catalog)
    }

    #[rstest]
    fn test_duplicate_names_share_an_id(catalog: Arc<FeatureCatalog>) {
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.id("hsa-let-7a-5p"), Some(0));
        assert_eq!(catalog.id("hsa-miR-21-5p"), Some(1));
        assert_eq!(catalog.id("hsa-miR-155-5p"), None);
    }

    #[rstest]
    fn test_zeroed_counts_cover_every_feature(catalog: Arc<FeatureCatalog>) {
        let mut counts = FeatureCounts::zeroed(catalog);
        counts.increment(1);
        counts.increment(1);

        let got: Vec<(&str, u64)> = counts.iter().collect();
        assert_eq!(got, vec![("hsa-let-7a-5p", 0), ("hsa-miR-21-5p", 2)]);
        assert_eq!(counts.get("hsa-let-7a-5p"), Some(0));
        assert_eq!(counts.total(), 2);
    }
}
