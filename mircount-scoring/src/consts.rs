pub const DEFAULT_OUT_PREFIX: &str = "mircount";

// corner labels of written tables
pub const FEATURE_COLUMN: &str = "feature";
pub const OFFSET_COLUMN: &str = "offset";
pub const REFERENCE_COLUMN: &str = "reference";
pub const SAMPLE_COLUMN: &str = "sample";

pub const TOTAL_READS: &str = "Total Reads";
pub const ALIGNED_READS: &str = "Aligned Reads";
pub const PERCENT_ALIGNED: &str = "Percent Aligned Reads";

pub const PROGRESS_TEMPLATE: &str = "{spinner:.green} [{elapsed}] {bar:40.cyan/blue} {pos}/{len} {msg}";
