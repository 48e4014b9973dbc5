//! JSON encoding matching the vendor service's canonical form.
//!
//! The update-check endpoint recomputes request signatures over its own JSON
//! encoding, which differs from `serde_json` defaults in two ways:
//!
//! - forward slashes are escaped as `\/`
//! - every non-ASCII character is escaped as `\uXXXX` (UTF-16 code units)
//!
//! Generated manifests use the same encoder with slashes left unescaped and a
//! four-space pretty layout.

use serde::Serialize;
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter, Serializer};
use std::io;

/// Encoding switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Indent nested values with four spaces, one member per line.
    pub pretty: bool,
    /// Emit `/` verbatim instead of `\/`.
    pub unescaped_slashes: bool,
}

impl EncodeOptions {
    /// Compact output, slashes escaped. Used for signed request material.
    pub const CANONICAL: Self = Self {
        pretty: false,
        unescaped_slashes: false,
    };

    /// Pretty output, slashes verbatim. Used for generated manifests.
    pub const MANIFEST: Self = Self {
        pretty: true,
        unescaped_slashes: true,
    };
}

/// Encode `value` with the given options.
pub fn encode<T>(value: &T, options: EncodeOptions) -> serde_json::Result<String>
where
    T: Serialize + ?Sized,
{
    let mut out = Vec::with_capacity(128);
    let formatter = CanonicalFormatter::new(options);
    let mut serializer = Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    // The formatter only ever writes ASCII or fragments of valid UTF-8 input.
    String::from_utf8(out).map_err(|e| serde_json::Error::io(io::Error::other(e)))
}

struct CanonicalFormatter {
    pretty: Option<PrettyFormatter<'static>>,
    escape_slashes: bool,
}

impl CanonicalFormatter {
    fn new(options: EncodeOptions) -> Self {
        Self {
            pretty: options.pretty.then(|| PrettyFormatter::with_indent(b"    ")),
            escape_slashes: !options.unescaped_slashes,
        }
    }
}

macro_rules! delegate_layout {
    ($($method:ident($($arg:ident: $ty:ty),*);)*) => {
        $(
            fn $method<W>(&mut self, writer: &mut W $(, $arg: $ty)*) -> io::Result<()>
            where
                W: ?Sized + io::Write,
            {
                match self.pretty.as_mut() {
                    Some(pretty) => pretty.$method(writer $(, $arg)*),
                    None => CompactFormatter.$method(writer $(, $arg)*),
                }
            }
        )*
    };
}

impl Formatter for CanonicalFormatter {
    delegate_layout! {
        begin_array();
        end_array();
        begin_array_value(first: bool);
        end_array_value();
        begin_object();
        end_object();
        begin_object_key(first: bool);
        end_object_key();
        begin_object_value();
        end_object_value();
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            let escape_slash = ch == '/' && self.escape_slashes;
            if !escape_slash && ch.is_ascii() {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..index])?;
            if escape_slash {
                writer.write_all(b"\\/")?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}
