use std::time::Duration;

/// Default limit on nested `<struct>`/`<array>` containers.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Prefix written before each envelope when `xml_declaration` is set.
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\"?>";

/// Configuration for the envelope codec.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Maximum nesting depth of containers. Default: 128.
    pub max_depth: usize,
    /// Prefix every encoded envelope with an XML declaration. Default: false.
    pub xml_declaration: bool,
    /// Read timeout applied by stream constructors that support it.
    pub read_timeout: Option<Duration>,
    /// Write timeout applied by stream constructors that support it.
    pub write_timeout: Option<Duration>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            xml_declaration: false,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
