use crate::codec::Utf8Transcoder;
use crate::RotateResult;
use async_compression::tokio::bufread::{GzipDecoder, ZstdDecoder};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, BufReader};
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;

/// Compression applied to a results file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Zstd,
}

impl Compression {
    /// Guess from the file name: `.gz` and `.zst` are recognised, anything else is plain.
    pub fn from_name(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        if name.ends_with(".gz") {
            Compression::Gzip
        } else if name.ends_with(".zst") {
            Compression::Zstd
        } else {
            Compression::None
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceMeta {
    pub compression: Compression,
    /// Character encoding of the file (defaults to UTF-8)
    pub charset: &'static encoding_rs::Encoding,
}

impl Default for SourceMeta {
    fn default() -> Self {
        Self {
            compression: Compression::None,
            charset: encoding_rs::UTF_8,
        }
    }
}

impl SourceMeta {
    pub fn for_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        Self {
            compression: Compression::from_name(name),
            ..Default::default()
        }
    }

    pub fn with_charset(mut self, charset: &'static encoding_rs::Encoding) -> Self {
        self.charset = charset;
        self
    }
}

/// Wrap a raw reader with decompression and, for non-UTF-8 sources, transcoding.
pub fn build_source_reader<R>(raw: R, meta: &SourceMeta) -> Box<dyn AsyncRead + Unpin + Send>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let buf = BufReader::new(raw);
    let decompressed: Box<dyn AsyncRead + Unpin + Send> = match meta.compression {
        Compression::Gzip => Box::new(GzipDecoder::new(buf)),
        Compression::Zstd => Box::new(ZstdDecoder::new(buf)),
        Compression::None => Box::new(buf),
    };

    if meta.charset == encoding_rs::UTF_8 {
        decompressed
    } else {
        let framed = FramedRead::new(decompressed, Utf8Transcoder::new(meta.charset));
        Box::new(StreamReader::new(framed))
    }
}

/// Open a results file on disk.
pub async fn source_from_path(
    path: &Path,
    meta: &SourceMeta,
) -> RotateResult<Box<dyn AsyncRead + Unpin + Send>> {
    let file = File::open(path).await?;
    tracing::debug!(path = %path.display(), compression = ?meta.compression, charset = meta.charset.name(), "opened input");
    Ok(build_source_reader(file, meta))
}
