use serde::Deserialize;
use serde_json::Value;

/// Typed view over the configuration document, loaded once at startup.
/// Components receive only the fields they need.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "enable-colors")]
    pub enable_colors: bool,

    #[serde(rename = "indent-step")]
    pub indent_step: usize,

    #[serde(rename = "disable-config-editor")]
    pub disable_config_editor: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_colors: true,
            indent_step: 4,
            disable_config_editor: false,
        }
    }
}

impl Settings {
    /// Read the typed settings out of the document. Unknown keys are
    /// ignored; an undecodable document falls back to the defaults.
    pub fn from_document(data: &Value) -> Self {
        let mut settings: Settings = serde_json::from_value(data.clone()).unwrap_or_default();
        settings.indent_step = settings.indent_step.clamp(1, 16);
        settings
    }
}
