use std::{
    collections::HashMap,
    panic::AssertUnwindSafe,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
        mpsc,
    },
    time::Duration,
};

use anyhow::Context;

use crate::{
    assets::{bitmap::Bitmap, decode},
    foundation::error::{PosterError, PosterResult},
};

/// Where an image comes from.
#[derive(Clone, Debug)]
pub enum ImageSource {
    /// A file on disk (the static background asset, or a picked file).
    Path(PathBuf),
    /// An in-memory payload (drag-and-drop, stdin, tests).
    Bytes(Arc<[u8]>),
}

impl ImageSource {
    /// Build an in-memory source.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(Arc::from(bytes.into()))
    }

    fn read(&self) -> PosterResult<Arc<[u8]>> {
        match self {
            Self::Path(p) => {
                let bytes = std::fs::read(p)
                    .with_context(|| format!("failed to read image '{}'", p.display()))?;
                Ok(Arc::from(bytes))
            }
            Self::Bytes(b) => Ok(Arc::clone(b)),
        }
    }
}

/// Which bitmap a load request fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The fixed background template.
    Background,
    /// The user-supplied overlay photo.
    Overlay,
}

/// Monotonically increasing load request identifier, unique per loader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub(crate) u64);

impl RequestId {
    /// Access the raw counter value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Result of a single decode task.
#[derive(Debug)]
pub enum LoadResult {
    /// Decoded successfully.
    Ready(Bitmap),
    /// Reading or decoding failed.
    Failed(PosterError),
    /// The request was superseded before decoding finished.
    Cancelled,
}

/// A finished decode task, delivered back to the owning thread.
#[derive(Debug)]
pub struct LoadCompletion {
    /// Request that produced this completion.
    pub id: RequestId,
    /// Slot the request was issued for.
    pub slot: Slot,
    /// Decode result.
    pub result: LoadResult,
}

#[derive(Debug, Default)]
struct DecodeCounters {
    background: AtomicU64,
    overlay: AtomicU64,
}

impl DecodeCounters {
    fn for_slot(&self, slot: Slot) -> &AtomicU64 {
        match slot {
            Slot::Background => &self.background,
            Slot::Overlay => &self.overlay,
        }
    }
}

struct Latest {
    id: RequestId,
    cancel: Arc<AtomicBool>,
}

/// Asynchronous image decoder.
///
/// Decodes run on a dedicated rayon pool; completions are queued on a channel and drained by the
/// owner with [`ImageLoader::try_next`] or [`ImageLoader::wait_next`], so the owner's thread never
/// blocks on a decode. Issuing a request for a slot cancels the previous request for that slot.
pub struct ImageLoader {
    pool: rayon::ThreadPool,
    tx: mpsc::Sender<LoadCompletion>,
    rx: mpsc::Receiver<LoadCompletion>,
    next_id: u64,
    latest: HashMap<Slot, Latest>,
    outstanding: usize,
    canvas_size: u32,
    decodes: Arc<DecodeCounters>,
}

impl ImageLoader {
    /// Create a loader. `canvas_size` is the raster size for SVG backgrounds.
    pub fn new(threads: Option<usize>, canvas_size: u32) -> PosterResult<Self> {
        let pool = build_thread_pool(threads)?;
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            pool,
            tx,
            rx,
            next_id: 0,
            latest: HashMap::new(),
            outstanding: 0,
            canvas_size,
            decodes: Arc::new(DecodeCounters::default()),
        })
    }

    /// Start decoding `source` into `slot` and return the request id.
    pub fn load(&mut self, slot: Slot, source: ImageSource) -> RequestId {
        self.next_id += 1;
        let id = RequestId(self.next_id);
        let cancel = Arc::new(AtomicBool::new(false));

        if let Some(prev) = self.latest.insert(
            slot,
            Latest {
                id,
                cancel: Arc::clone(&cancel),
            },
        ) {
            prev.cancel.store(true, Ordering::Release);
            tracing::debug!(?slot, superseded = prev.id.0, by = id.0, "cancel load");
        }
        self.outstanding += 1;

        let tx = self.tx.clone();
        let decodes = Arc::clone(&self.decodes);
        let canvas_size = self.canvas_size;
        self.pool.spawn(move || {
            let result =
                contain_panic(|| run_decode(slot, &source, canvas_size, &cancel, &decodes));
            // The receiver only disappears when the loader is dropped; nobody is left to notify.
            let _ = tx.send(LoadCompletion { id, slot, result });
        });
        id
    }

    /// Whether `id` is the most recent request issued for `slot`.
    pub fn is_latest(&self, slot: Slot, id: RequestId) -> bool {
        self.latest.get(&slot).is_some_and(|l| l.id == id)
    }

    /// Number of issued requests whose completion has not been drained yet.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Pop one completion without blocking.
    pub fn try_next(&mut self) -> Option<LoadCompletion> {
        let c = self.rx.try_recv().ok()?;
        self.outstanding = self.outstanding.saturating_sub(1);
        Some(c)
    }

    /// Block up to `timeout` for the next completion.
    pub fn wait_next(&mut self, timeout: Duration) -> Option<LoadCompletion> {
        if self.outstanding == 0 {
            return None;
        }
        let c = self.rx.recv_timeout(timeout).ok()?;
        self.outstanding = self.outstanding.saturating_sub(1);
        Some(c)
    }

    /// Number of decodes actually performed for `slot` (cancelled requests excluded).
    pub fn decode_count(&self, slot: Slot) -> u64 {
        self.decodes.for_slot(slot).load(Ordering::Acquire)
    }

    #[cfg(test)]
    pub(crate) fn issue_id_for_test(&mut self, slot: Slot) -> RequestId {
        self.next_id += 1;
        let id = RequestId(self.next_id);
        self.latest.insert(
            slot,
            Latest {
                id,
                cancel: Arc::new(AtomicBool::new(false)),
            },
        );
        id
    }
}

fn run_decode(
    slot: Slot,
    source: &ImageSource,
    canvas_size: u32,
    cancel: &AtomicBool,
    decodes: &DecodeCounters,
) -> LoadResult {
    if cancel.load(Ordering::Acquire) {
        return LoadResult::Cancelled;
    }
    let bytes = match source.read() {
        Ok(b) => b,
        Err(e) => return LoadResult::Failed(e),
    };
    if cancel.load(Ordering::Acquire) {
        return LoadResult::Cancelled;
    }

    decodes.for_slot(slot).fetch_add(1, Ordering::AcqRel);
    let decoded = match slot {
        Slot::Background => decode::decode_background(&bytes, canvas_size),
        Slot::Overlay => decode::decode_image(&bytes),
    };
    match decoded {
        Ok(bitmap) => LoadResult::Ready(bitmap),
        Err(e) => LoadResult::Failed(e),
    }
}

// A decoder panic becomes a failed load; otherwise the completion would never arrive.
fn contain_panic(decode: impl FnOnce() -> LoadResult) -> LoadResult {
    std::panic::catch_unwind(AssertUnwindSafe(decode)).unwrap_or_else(|payload| {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::warn!(panic = %msg, "decoder panicked");
        LoadResult::Failed(PosterError::decode(format!("decoder panicked: {msg}")))
    })
}

fn build_thread_pool(threads: Option<usize>) -> PosterResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(PosterError::validation(
            "loader 'threads' must be >= 1 when set",
        ));
    }
    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("posterkit-decode-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    let pool = builder.build().context("build decode thread pool")?;
    Ok(pool)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
