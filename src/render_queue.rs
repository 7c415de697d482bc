//! Progressive rendering handoff between tile workers and a display loop.
//!
//! Workers push finished tiles through a [`RenderSink`]; a single consumer
//! polls the matching [`RenderQueue`] once per display tick and paints what
//! it finds. The channel is unbounded, so producers never wait on the
//! consumer. Arrival order follows completion order, not grid order.

use std::sync::mpsc;
use std::sync::Arc;

use crate::error::QueueError;
use crate::image::Image;
use crate::tiling::Tile;

/// A filtered region and where it belongs in the output.
///
/// The pixels are shared between the render queue and the assembler; neither
/// mutates them.
#[derive(Debug, Clone)]
pub struct TileResult {
    pub placement: Tile,
    pub image: Arc<Image>,
}

impl TileResult {
    pub fn new(placement: Tile, image: Image) -> Self {
        Self {
            placement,
            image: Arc::new(image),
        }
    }
}

/// One unit of work for the display loop.
#[derive(Debug, Clone)]
pub enum RenderItem {
    /// A single tile from tiled processing.
    Tile(TileResult),
    /// The whole output image from synchronous processing.
    FullFrame(TileResult),
}

impl RenderItem {
    pub fn result(&self) -> &TileResult {
        match self {
            RenderItem::Tile(result) | RenderItem::FullFrame(result) => result,
        }
    }

    pub fn placement(&self) -> Tile {
        self.result().placement
    }

    pub fn image(&self) -> &Image {
        &self.result().image
    }
}

/// Somewhere render items can be painted.
pub trait RenderSurface {
    fn paint(&mut self, placement: Tile, image: &Image);
}

/// An image can serve as the display canvas.
impl RenderSurface for Image {
    fn paint(&mut self, placement: Tile, image: &Image) {
        self.draw(image, placement.x, placement.y);
    }
}

/// Create a connected producer/consumer pair.
pub fn channel() -> (RenderSink, RenderQueue) {
    let (tx, rx) = mpsc::channel();
    (RenderSink { tx: Some(tx) }, RenderQueue { rx })
}

/// Producer handle. Cheap to clone; one per worker is fine.
#[derive(Debug, Clone)]
pub struct RenderSink {
    tx: Option<mpsc::Sender<RenderItem>>,
}

impl RenderSink {
    /// A sink with no display attached. Items are dropped on enqueue.
    pub fn discard() -> Self {
        Self { tx: None }
    }

    /// Hand an item to the display loop.
    ///
    /// Never blocks. Fails only once the [`RenderQueue`] has been dropped,
    /// which producers should treat as a cancellation signal.
    pub fn enqueue(&self, item: RenderItem) -> Result<(), QueueError> {
        match &self.tx {
            Some(tx) => tx.send(item).map_err(|_| QueueError::Disconnected),
            None => Ok(()),
        }
    }
}

/// Consumer handle, owned by the display loop.
#[derive(Debug)]
pub struct RenderQueue {
    rx: mpsc::Receiver<RenderItem>,
}

impl RenderQueue {
    /// Take the next item if one is waiting.
    pub fn try_dequeue_next(&self) -> Option<RenderItem> {
        self.rx.try_recv().ok()
    }

    /// One display tick: paint at most one item. Returns whether anything was painted.
    pub fn paint_next(&self, surface: &mut dyn RenderSurface) -> bool {
        match self.try_dequeue_next() {
            Some(item) => {
                surface.paint(item.placement(), item.image());
                true
            }
            None => false,
        }
    }

    /// Paint everything queued right now. Returns the number of items painted.
    pub fn paint_pending(&self, surface: &mut dyn RenderSurface) -> usize {
        let mut painted = 0;
        while self.paint_next(surface) {
            painted += 1;
        }
        painted
    }
}
