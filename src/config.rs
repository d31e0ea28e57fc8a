//! Tokenizer configuration. Immutable once the [`Tokenizer`](crate::tokenizer::Tokenizer)
//! is built from it, mirroring the construction-time flags of the original
//! `create_tokenizer` entry point.

#[cfg(feature = "jsonconf")]
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "jsonconf", derive(Deserialize))]
#[cfg_attr(feature = "jsonconf", serde(rename_all = "camelCase"))]
pub struct TokenizerConfig {
    pub delimiter: u8,
    /// `0` disables comment-line handling.
    pub comment: u8,
    pub quotechar: u8,
    pub fill_extra_cols: bool,
    pub strip_whitespace_lines: bool,
    pub strip_whitespace_fields: bool,
    pub use_fast_converter: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        TokenizerConfig::csv()
    }
}

impl TokenizerConfig {
    pub fn builder() -> TokenizerConfigBuilder {
        TokenizerConfigBuilder::new()
    }

    /// Comma-delimited, double-quote enclosed, `#` comments.
    pub fn csv() -> Self {
        TokenizerConfig {
            delimiter: b',',
            comment: b'#',
            quotechar: b'"',
            fill_extra_cols: false,
            strip_whitespace_lines: false,
            strip_whitespace_fields: false,
            use_fast_converter: true,
        }
    }

    /// Tab-delimited, double-quote enclosed, `#` comments.
    pub fn tsv() -> Self {
        TokenizerConfig {
            delimiter: b'\t',
            ..TokenizerConfig::csv()
        }
    }

    /// Whitespace-delimited, no quoting, `#` comments, stripping the
    /// surrounding whitespace on both lines and fields — the usual
    /// configuration for fixed-format scientific tables.
    pub fn whitespace_delimited() -> Self {
        TokenizerConfig {
            delimiter: b' ',
            comment: b'#',
            quotechar: b'"',
            fill_extra_cols: false,
            strip_whitespace_lines: true,
            strip_whitespace_fields: true,
            use_fast_converter: true,
        }
    }

    #[cfg(feature = "jsonconf")]
    pub fn from_json(json: &str) -> crate::errors::Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::errors::Error::Config { msg: e.to_string() })
    }
}

/// Every setter takes and returns `&mut Self` so calls can be chained.
pub struct TokenizerConfigBuilder {
    cfg: TokenizerConfig,
}

impl TokenizerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: TokenizerConfig::csv(),
        }
    }

    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.cfg.delimiter = delimiter;
        self
    }

    pub fn comment(&mut self, comment: u8) -> &mut Self {
        self.cfg.comment = comment;
        self
    }

    pub fn quotechar(&mut self, quotechar: u8) -> &mut Self {
        self.cfg.quotechar = quotechar;
        self
    }

    pub fn fill_extra_cols(&mut self, fill: bool) -> &mut Self {
        self.cfg.fill_extra_cols = fill;
        self
    }

    pub fn strip_whitespace_lines(&mut self, strip: bool) -> &mut Self {
        self.cfg.strip_whitespace_lines = strip;
        self
    }

    pub fn strip_whitespace_fields(&mut self, strip: bool) -> &mut Self {
        self.cfg.strip_whitespace_fields = strip;
        self
    }

    pub fn use_fast_converter(&mut self, use_fast: bool) -> &mut Self {
        self.cfg.use_fast_converter = use_fast;
        self
    }

    pub fn build(&self) -> TokenizerConfig {
        self.cfg.clone()
    }
}

impl Default for TokenizerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
