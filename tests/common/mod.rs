#![allow(dead_code)]

use futures::future::{BoxFuture, FutureExt};
use png_batch_optimizer::workspace::ItemSlot;
use png_batch_optimizer::{CompressionOutcome, Compressor, UploadItem};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

type Respond = Box<dyn Fn(&[u8]) -> CompressionOutcome + Send + Sync>;
type Delay = Box<dyn Fn(&[u8]) -> Duration + Send + Sync>;

/// In-process compressor that answers with a closure and records its calls
pub struct FakeCompressor {
    respond: Respond,
    delay: Option<Delay>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeCompressor {
    pub fn new(respond: impl Fn(&[u8]) -> CompressionOutcome + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Output of a fixed length, whatever the input
    pub fn fixed_output(len: usize) -> Self {
        Self::new(move |_| CompressionOutcome::Compressed(vec![0xAB; len]))
    }

    pub fn with_delay(mut self, delay: impl Fn(&[u8]) -> Duration + Send + Sync + 'static) -> Self {
        self.delay = Some(Box::new(delay));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Compressor for FakeCompressor {
    fn attempt<'a>(&'a self, input: &'a [u8], slot: &'a ItemSlot) -> BoxFuture<'a, CompressionOutcome> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            assert!(slot.dir().is_dir(), "item slot must exist before the attempt");
            if let Some(ref delay) = self.delay {
                tokio::time::sleep(delay(input)).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            (self.respond)(input)
        }
        .boxed()
    }
}

pub fn png(name: &str, len: usize) -> UploadItem {
    UploadItem::new(name, vec![0x89; len])
}

/// Write a shell script that fakes the compressor contract.
///
/// Run it as `sh <script>`: `$4` is the output path and `$5` the input path.
pub fn write_script(dir: &Path, body: &str) -> PathBuf {
    let script = dir.join("fake-compressor.sh");
    std::fs::write(&script, body).unwrap();
    script
}
