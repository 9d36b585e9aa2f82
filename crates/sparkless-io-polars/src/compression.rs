//! Compression codecs for JSON files.
//!
//! `gzip` and `deflate` (zlib framing, as Hadoop's DeflateCodec writes it) are
//! supported; the other names JSON sources accept are rejected explicitly.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};

use sparkless_io_core::EngineError;

/// Codec applied to a whole file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    #[default]
    None,
    Gzip,
    Deflate,
}

impl Codec {
    /// Parse a `compression` option value.
    pub fn from_option(value: &str) -> Result<Self, EngineError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "uncompressed" | "" => Ok(Codec::None),
            "gzip" | "gz" => Ok(Codec::Gzip),
            "deflate" | "zlib" => Ok(Codec::Deflate),
            "bzip2" | "lz4" | "snappy" => Err(EngineError::User(format!(
                "compression codec '{value}' is not supported by the polars engine (use none, gzip or deflate)"
            ))),
            _ => Err(EngineError::User(format!(
                "unknown compression codec '{value}'"
            ))),
        }
    }

    /// Infer the codec from a file name's extension.
    pub fn from_file_name(name: &str) -> Result<Self, EngineError> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".gz") {
            Ok(Codec::Gzip)
        } else if lower.ends_with(".deflate") {
            Ok(Codec::Deflate)
        } else if lower.ends_with(".bz2") || lower.ends_with(".lz4") || lower.ends_with(".snappy")
        {
            Err(EngineError::User(format!(
                "'{name}' uses a compression codec the polars engine does not support"
            )))
        } else {
            Ok(Codec::None)
        }
    }

    /// File extension appended to generated part files.
    pub fn extension(&self) -> &'static str {
        match self {
            Codec::None => "",
            Codec::Gzip => ".gz",
            Codec::Deflate => ".deflate",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Codec::None => "none",
            Codec::Gzip => "gzip",
            Codec::Deflate => "deflate",
        }
    }

    pub fn decode(&self, data: &[u8]) -> Result<Vec<u8>, EngineError> {
        let mut buf = Vec::new();
        let read = match self {
            Codec::None => return Ok(data.to_vec()),
            Codec::Gzip => GzDecoder::new(data).read_to_end(&mut buf),
            Codec::Deflate => ZlibDecoder::new(data).read_to_end(&mut buf),
        };
        read.map_err(|e| EngineError::User(format!("{} decompression failed: {e}", self.name())))?;
        Ok(buf)
    }

    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>, EngineError> {
        match self {
            Codec::None => Ok(data.to_vec()),
            Codec::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(data)?;
                Ok(encoder.finish()?)
            }
            Codec::Deflate => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(data)?;
                Ok(encoder.finish()?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_names() {
        assert_eq!(Codec::from_option("GZIP").unwrap(), Codec::Gzip);
        assert_eq!(Codec::from_option("none").unwrap(), Codec::None);
        assert_eq!(Codec::from_option("deflate").unwrap(), Codec::Deflate);
        assert!(matches!(
            Codec::from_option("snappy"),
            Err(EngineError::User(m)) if m.contains("not supported")
        ));
        assert!(Codec::from_option("zstd-ish").is_err());
    }

    #[test]
    fn file_name_inference() {
        assert_eq!(Codec::from_file_name("part-00000.json.gz").unwrap(), Codec::Gzip);
        assert_eq!(Codec::from_file_name("a.json").unwrap(), Codec::None);
        assert!(Codec::from_file_name("a.json.bz2").is_err());
    }

    #[test]
    fn gzip_and_deflate_restore_input() {
        let input = b"{\"a\":1}\n{\"a\":2}\n";
        for codec in [Codec::Gzip, Codec::Deflate] {
            let packed = codec.encode(input).unwrap();
            assert_ne!(packed.as_slice(), input.as_slice());
            assert_eq!(codec.decode(&packed).unwrap(), input.to_vec());
        }
    }

    #[test]
    fn corrupt_gzip_is_user_error() {
        assert!(matches!(
            Codec::Gzip.decode(b"not gzip"),
            Err(EngineError::User(_))
        ));
    }
}
