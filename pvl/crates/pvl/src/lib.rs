//! pvl - reading and writing Parameter Value Language labels.
//!
//! PVL is the attribute-label format used by NASA's Planetary Data
//! System and related planetary-science archives. This crate is the
//! public surface over the pipeline crates: it loads label text (or
//! whole product files with trailing binary data) into a [`Module`]
//! tree, and dumps a tree back to text that strictly conforms to a
//! chosen dialect.
//!
//! Loading defaults to the permissive Omni dialect, which reads
//! anything PVL, ODL, PDS3 or ISIS producers write — malformed legacy
//! labels included. Dumping defaults to the PDS3 label format.
//!
//! ```
//! let module = pvl::loads("foo = bar\nitems = (1, 2, 3)\nEND\n").unwrap();
//! assert_eq!(module.get("foo"), Some(&pvl::Value::symbol("bar")));
//!
//! let text = pvl::dumps(&module).unwrap();
//! assert_eq!(text, "FOO   = bar\nITEMS = (1, 2, 3)\nEND\n\n");
//! ```

use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

mod error;
mod source;

pub use error::PvlError;
pub use source::{decode_label_bytes, TextPolicy};

pub use pvl_enc::{EncodeConfig, EncodeError, Encoder};
pub use pvl_lex::{Dialect, Grammar, LexError, Lexer, Token, TokenKind};
pub use pvl_par::{
    BasedInteger, Block, BlockKind, DecodeError, Decoder, DefaultQuantityFactory, Module,
    ParseError, Parser, PvlDateTime, PvlTime, Quantity, QuantityFactory, RealParts, Value,
};
pub use pvl_util::{OrderedMultiMap, Span};

/// Options for the `load` family of functions.
///
/// The default reads with the Omni dialect, UTF-8 text with ASCII
/// fallback, and the standard quantity factory.
#[derive(Clone)]
pub struct LoadOptions {
    dialect: Dialect,
    text_policy: TextPolicy,
    quantity_factory: Option<Arc<dyn QuantityFactory>>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::Omni,
            text_policy: TextPolicy::default(),
            quantity_factory: None,
        }
    }
}

impl LoadOptions {
    /// Options with every default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse under a specific dialect instead of Omni.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// How to decode raw bytes into text.
    pub fn text_policy(mut self, policy: TextPolicy) -> Self {
        self.text_policy = policy;
        self
    }

    /// Build `value <units>` constructs through a custom factory.
    pub fn quantity_factory(mut self, factory: Arc<dyn QuantityFactory>) -> Self {
        self.quantity_factory = Some(factory);
        self
    }
}

impl std::fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadOptions")
            .field("dialect", &self.dialect)
            .field("text_policy", &self.text_policy)
            .field("quantity_factory", &self.quantity_factory.is_some())
            .finish()
    }
}

/// Parses label text under the Omni dialect.
pub fn loads(text: &str) -> Result<Module, PvlError> {
    loads_with(text, &LoadOptions::default())
}

/// Parses label text with explicit options.
pub fn loads_with(text: &str, options: &LoadOptions) -> Result<Module, PvlError> {
    let mut parser = Parser::new(text, options.dialect.grammar());
    if let Some(factory) = &options.quantity_factory {
        parser = parser.with_quantity_factory(factory.clone());
    }
    Ok(parser.parse()?)
}

/// Loads a label from a file, tolerating trailing binary data.
pub fn load(path: impl AsRef<Path>) -> Result<Module, PvlError> {
    load_with(path, &LoadOptions::default())
}

/// Loads a label from a file with explicit options.
pub fn load_with(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Module, PvlError> {
    let bytes = fs::read(path)?;
    load_bytes_with(&bytes, options)
}

/// Loads a label from an open reader, tolerating trailing binary data.
///
/// The reader is consumed to its end; nothing is closed that this
/// function did not open.
pub fn load_reader(reader: &mut impl Read) -> Result<Module, PvlError> {
    load_reader_with(reader, &LoadOptions::default())
}

/// Loads a label from an open reader with explicit options.
pub fn load_reader_with(
    reader: &mut impl Read,
    options: &LoadOptions,
) -> Result<Module, PvlError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    load_bytes_with(&bytes, options)
}

/// Loads a label from raw bytes, tolerating trailing binary data.
pub fn load_bytes(bytes: &[u8]) -> Result<Module, PvlError> {
    load_bytes_with(bytes, &LoadOptions::default())
}

/// Loads a label from raw bytes with explicit options.
pub fn load_bytes_with(bytes: &[u8], options: &LoadOptions) -> Result<Module, PvlError> {
    let text = decode_label_bytes(bytes, options.text_policy)?;
    loads_with(&text, options)
}

/// Writes the module as PDS3 label text.
pub fn dumps(module: &Module) -> Result<String, PvlError> {
    dumps_with(module, &Encoder::pds3())
}

/// Writes the module as text under an explicit encoder.
pub fn dumps_with(module: &Module, encoder: &Encoder) -> Result<String, PvlError> {
    Ok(encoder.encode(module)?)
}

/// Writes the module to a sink as PDS3 label text; returns the number
/// of bytes written.
pub fn dump(module: &Module, sink: &mut impl Write) -> Result<usize, PvlError> {
    dump_with(module, sink, &Encoder::pds3())
}

/// Writes the module to a sink under an explicit encoder; returns the
/// number of bytes written.
pub fn dump_with(
    module: &Module,
    sink: &mut impl Write,
    encoder: &Encoder,
) -> Result<usize, PvlError> {
    let text = encoder.encode(module)?;
    sink.write_all(text.as_bytes())?;
    Ok(text.len())
}
