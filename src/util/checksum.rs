//! SHA1 / MD5 digests in the lowercase-hex sidecar form used throughout
//! maven2 repositories.

use md5::Context;
use sha1::{Digest, Sha1};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Incremental digest over a byte stream, so downloads can hash while
/// writing instead of re-reading the finished file.
pub struct ChecksumAccumulator {
    sha1: Sha1,
    md5: Context,
}

impl ChecksumAccumulator {
    pub fn new() -> ChecksumAccumulator {
        ChecksumAccumulator {
            sha1: Sha1::new(),
            md5: Context::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.sha1.update(data);
        self.md5.consume(data);
    }

    pub fn finalize(self) -> Checksums {
        let sha1: [u8; 20] = self.sha1.finalize().into();
        let md5: [u8; 16] = self.md5.compute().0;
        Checksums {
            sha1: hex::encode(sha1),
            md5: hex::encode(md5),
        }
    }
}

impl Default for ChecksumAccumulator {
    fn default() -> Self {
        ChecksumAccumulator::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksums {
    pub sha1: String,
    pub md5: String,
}

impl Checksums {
    pub fn of_bytes(data: &[u8]) -> Checksums {
        let mut accumulator = ChecksumAccumulator::new();
        accumulator.update(data);
        accumulator.finalize()
    }

    pub async fn of_file(path: &std::path::Path) -> anyhow::Result<Checksums> {
        let mut file = File::open(path).await?;
        let mut accumulator = ChecksumAccumulator::new();
        let mut buffer = vec![0u8; 64 * 1024];
        loop {
            let read = file.read(&mut buffer).await?;
            if read == 0 {
                break;
            }
            accumulator.update(&buffer[..read]);
        }
        Ok(accumulator.finalize())
    }
}

/// Extracts the hash from a checksum sidecar document. Some tools write
/// `<hex>  <filename>`; only the first token counts.
pub fn parse_sidecar(text: &str) -> Option<String> {
    text.split_whitespace()
        .next()
        .map(|token| token.to_ascii_lowercase())
}
