//! A running label maker: preferences, composed config and renderer.
//!
//! Replaces process-wide state with one explicit value. A host builds a
//! [`Session`] at startup, wraps it in an [`Arc`] and registers it as an
//! autolabel callback.

use std::sync::Arc;

use tracing::{debug, info};

use crate::composer::{ComposedConfig, ConfigSelection};
use crate::error::Result;
use crate::host::{AutolabelFn, AutolabelHandle, AutolabelRegistry, LabelHost};
use crate::node::Node;
use crate::prefs::{PreferenceStore, Preferences, knobs};
use crate::renderer::{LabelRenderer, RenderOptions};

#[derive(Debug)]
pub struct Session {
    prefs: Preferences,
    config: ComposedConfig,
    renderer: LabelRenderer,
}

impl Session {
    /// Composes the selected config sources and prepares a renderer.
    ///
    /// When the environment disables the base config, the matching preference
    /// is switched off and locked for the rest of the session. The stored
    /// preference is left as the user set it.
    pub fn start(mut prefs: Preferences, selection: ConfigSelection) -> Result<Self> {
        let config = ComposedConfig::load(&selection)?;

        if selection.base_locked {
            prefs.override_for_session(knobs::USE_BASE_CONFIG, false);
            prefs.set_enabled(knobs::USE_BASE_CONFIG, false);
            debug!("Base config locked off by environment");
        }

        info!(sources = ?config.list_source_names(), "Label maker session started");
        Ok(Self {
            prefs,
            config,
            renderer: LabelRenderer::new(),
        })
    }

    /// Reads the selection from the process environment, then starts.
    pub fn from_env(prefs: Preferences) -> Result<Self> {
        let selection = ConfigSelection::from_env(&prefs);
        Self::start(prefs, selection)
    }

    /// Render switches as currently set in preferences.
    pub fn options(&self) -> RenderOptions {
        RenderOptions {
            always_show_all: self.prefs.get_bool(knobs::ALWAYS_SHOW_ALL),
            colorize_disabled: self.prefs.get_bool(knobs::COLORIZE_DISABLE),
        }
    }

    pub fn render(&self, node: &dyn Node, host: &dyn LabelHost) -> String {
        self.renderer.render(node, &self.config, self.options(), host)
    }

    /// Installs this session's renderer as an autolabel callback.
    pub fn register(self: &Arc<Self>, registry: &mut dyn AutolabelRegistry) -> AutolabelHandle {
        let session = Arc::clone(self);
        let callback: AutolabelFn =
            Arc::new(move |node: &dyn Node, host: &dyn LabelHost| session.render(node, host));
        let handle = registry.add_autolabel(callback);
        debug!(handle = handle.0, "Registered autolabel");
        handle
    }

    /// Removes a callback installed by [`register`](Self::register).
    pub fn unregister(handle: AutolabelHandle, registry: &mut dyn AutolabelRegistry) -> bool {
        let removed = registry.remove_autolabel(handle);
        debug!(handle = handle.0, removed, "Unregistered autolabel");
        removed
    }

    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    pub fn prefs_mut(&mut self) -> &mut Preferences {
        &mut self.prefs
    }

    pub fn config(&self) -> &ComposedConfig {
        &self.config
    }

    /// Config access for editing sources; call
    /// [`ComposedConfig::recompose`] after edits.
    pub fn config_mut(&mut self) -> &mut ComposedConfig {
        &mut self.config
    }

    pub fn renderer(&self) -> &LabelRenderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut LabelRenderer {
        &mut self.renderer
    }
}

// ============================================================================
// Tests
// ============================================================================
