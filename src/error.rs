use thiserror::Error;

/// Rejected weight passed to [`WeightedSampler::add`](crate::WeightedSampler::add).
#[derive(Debug, Error)]
pub enum WeightError {
    #[error("weight must be positive and finite, got {0}")]
    NotPositive(f64),
    #[error("weights add up past the largest finite total")]
    Overflow,
}

/// Failure while loading a loot table definition.
#[derive(Debug, Error)]
pub enum LootTableError {
    #[error("cannot find the following loot table file: {0}")]
    NotFound(String),
    #[error("failed reading loot table \"{name}\": {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed parsing loot table \"{name}\": {source}")]
    Parse {
        name: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid loot table! cannot find global \"{setting}\" setting at: {table}")]
    MissingSetting { table: String, setting: &'static str },
    #[error("invalid loot table! \"Rolls\" must be a non-negative integer at: {0}")]
    InvalidRolls(String),
    #[error("invalid file format for loot table! cannot find \"Type\" setting at: {table}/{item}")]
    MissingType { table: String, item: String },
    #[error("invalid file format for loot table! \"Weight\" is not a positive integer at: {table}/{item}")]
    InvalidWeight { table: String, item: String },
    #[error("the required option \"{option}\" not found at: {table}/{item}")]
    MissingOption {
        table: String,
        item: String,
        option: &'static str,
    },
    #[error("cannot find a complex item with the key of {key} at: {table}/{item}")]
    UnknownComplexItem {
        table: String,
        item: String,
        key: String,
    },
    #[error("the option \"ID\" must be in the form of \"{{namespace}}:{{reference}}\", got \"{id}\" at: {table}/{item}")]
    MalformedExternalId {
        table: String,
        item: String,
        id: String,
    },
    #[error("enchantment level must be an integer \"X\" or ranged integers \"[X:Y]\" at: {table}/{item}.{enchantment}")]
    InvalidEnchantmentLevel {
        table: String,
        item: String,
        enchantment: String,
    },
    #[error(transparent)]
    Weight(#[from] WeightError),
}

/// Failure while turning a drawn loot item into concrete stacks.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no external item resolver registered for \"{namespace}\" (item \"{reference}\")")]
    UnknownNamespace { namespace: String, reference: String },
    #[error("external item \"{namespace}:{reference}\" could not be resolved: {reason}")]
    External {
        namespace: String,
        reference: String,
        reason: String,
    },
    #[error("loot table \"{0}\" is missing or failed to load")]
    MissingTable(String),
    #[error("loot table cycle detected: {}", .0.join(" -> "))]
    CyclicTable(Vec<String>),
    #[error("loot table \"{0}\" has no items to draw from")]
    EmptyTable(String),
    #[error("complex item snapshot is corrupt: {0}")]
    CorruptSnapshot(String),
}

/// Failure while decoding or encoding a persisted container tag.
#[derive(Debug, Error)]
pub enum TagError {
    #[error("malformed loot chest tag: {0}")]
    Json(#[from] serde_json::Error),
    #[error("loot chest tag version {found} is newer than the supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Failure while reading or writing configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("couldn't parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("couldn't serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Umbrella error for container population.
#[derive(Debug, Error)]
pub enum LootError {
    #[error("the structure named \"{0}\" was not found")]
    UnknownStructure(String),
    #[error("the loot table named \"{0}\" was not found or failed to load")]
    MissingTable(String),
    #[error(transparent)]
    Tag(#[from] TagError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Table(#[from] LootTableError),
}
