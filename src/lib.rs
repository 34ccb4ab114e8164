//! labelmaker: configurable node autolabels for node-graph compositors
//!
//! This crate renders the text label drawn on a node: its name, file,
//! channels, a readout of the attributes that matter for its class, its mix
//! and the user's note. Which attributes are shown is driven by layered JSON
//! configs (base, custom, personal), composed once per session.
//!
//! # Example
//!
//! ```
//! use labelmaker::{
//!     ComposedConfig, ConfigSource, DisplayRule, LabelRenderer, NodeSnapshot,
//!     RenderOptions, RuleMap, SnapshotHost,
//! };
//!
//! let mut rules = RuleMap::new();
//! rules.insert("Blur".into(), vec![DisplayRule::attribute("size").with_default(0.0)]);
//! let config = ComposedConfig::compose(vec![ConfigSource::from_rules("default", "base.json", rules)]);
//!
//! let node = NodeSnapshot::new("Blur", "Blur1").with_attribute("size", 4.0);
//! let label = LabelRenderer::new().render(&node, &config, RenderOptions::default(), &SnapshotHost::new());
//! assert_eq!(label, "Blur1\nsize 4.000");
//! ```
//!
//! # Sessions
//!
//! Hosts normally go through [`Session`], which reads preferences and the
//! environment, composes the config and registers itself as an autolabel:
//!
//! ```no_run
//! use labelmaker::{Session, labelmaker_preferences, paths};
//!
//! let prefs = labelmaker_preferences(paths::default_preferences_path())?;
//! let session = Session::from_env(prefs)?;
//! println!("{:?}", session.config().list_source_names());
//! # Ok::<(), labelmaker::LabelmakerError>(())
//! ```

mod classes;
mod composer;
mod config;
mod error;
mod host;
mod node;
mod renderer;
mod rule;
mod session;
mod value;

pub mod color;
pub mod paths;
pub mod prefs;
pub mod stage;

pub use classes::{ClassMappings, MenuEntry, find_ofx_class};
pub use composer::{ComposedConfig, ConfigSelection};
pub use config::{ConfigSource, RuleMap};
pub use error::{LabelmakerError, Result};
pub use host::{
    AutolabelFn, AutolabelHandle, AutolabelRegistry, LabelHost, SnapshotHost, TemplateError,
};
pub use node::{Indicators, Node, NodeFlags, NodeSnapshot};
pub use prefs::{
    PrefKnob, PrefValue, PreferenceStore, Preferences, knobs, labelmaker_preferences,
    labelmaker_preferences_in_memory,
};
pub use renderer::{LabelRenderer, RenderOptions};
pub use rule::{DisplayRule, RuleEntry, RuleTarget};
pub use session::Session;
pub use stage::{LabelPipeline, Stage};
pub use value::{AttrKind, AttrValue, Attribute};

/// JSON Schema of a config file.
#[cfg(feature = "jsonschema")]
pub fn config_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(std::collections::BTreeMap<String, Vec<RuleEntry>>)
}
