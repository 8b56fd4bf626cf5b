use bytes::{Buf, BytesMut};
use encoding_rs::{Decoder as CharsetDecoder, Encoding};
use std::io;
use tokio_util::codec::Decoder;

/// Frames a byte stream in some legacy charset into UTF-8 chunks.
///
/// Benchmark exports from spreadsheet tools are often windows-1252; the CSV
/// reader only ever sees the UTF-8 side of this decoder.
pub struct Utf8Transcoder {
    decoder: CharsetDecoder,
}

impl Utf8Transcoder {
    pub fn new(charset: &'static Encoding) -> Self {
        Self {
            decoder: charset.new_decoder_without_bom_handling(),
        }
    }

    fn transcode(&mut self, src: &mut BytesMut, last: bool) -> Option<BytesMut> {
        let capacity = self
            .decoder
            .max_utf8_buffer_length(src.len())
            .unwrap_or_else(|| src.len() * 3);
        let mut out = vec![0u8; capacity];

        // `out` is sized for the whole input, so the decoder always drains `src`
        let (_result, read, written, _replaced) =
            self.decoder.decode_to_utf8(src, &mut out, last);
        src.advance(read);

        if written == 0 {
            None
        } else {
            out.truncate(written);
            Some(BytesMut::from(&out[..]))
        }
    }
}

impl Decoder for Utf8Transcoder {
    type Item = BytesMut;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        Ok(self.transcode(src, false))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if buf.is_empty() {
            return Ok(None);
        }
        let chunk = self.transcode(buf, true);
        buf.clear();
        Ok(chunk)
    }
}
