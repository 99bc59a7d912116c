//! Hierarchical configuration loading.
//!
//! Consolidates configuration from up to four tiers, lowest to highest:
//! 1. **Local file** - `<base_name>.yaml` / `.yml` in `~/etc/`, the project
//!    root or the current directory (the first match wins and the container
//!    tiers are skipped)
//! 2. **Config directory** - every file in `/code/config/`, in name order
//! 3. **Secrets directory** - every file in `/code/secrets/`, in name order
//! 4. **Environment** - variables starting with `CONFIG_` (or the
//!    `environment_prefix` set by an earlier tier)
//!
//! ## Merge Strategy
//! - Mappings merge key by key, sequences are extended, scalars are replaced
//! - YAML files are merged as documents; any other file is one value keyed
//!   by its file name
//! - Flat keys like `db__host` expand to `db.host` in every tier

pub mod delinearize;
pub mod document;
pub mod files;
pub mod loader;
pub mod merge;
pub mod value;

pub use delinearize::{KEY_DELIMITER, delinearize};
pub use document::{DEFAULT_ENV_PREFIX, Document, ENV_PREFIX_KEY};
pub use files::FileKind;
pub use loader::{ConfigPaths, Configuration, LoadMode, LoadedSource, SourceTier};
pub use merge::{check, merge, merge_all};
pub use value::{ConfigValue, Mapping};
