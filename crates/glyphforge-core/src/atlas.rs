//! Fixed-size atlas pages with a shelf bump allocator
//!
//! Slots are packed left-to-right along a shelf; when a slot does not fit the
//! rest of the shelf a new shelf opens below, and when it does not fit below
//! either, a fresh page is opened. Pages are never resized or repacked, so a
//! slot handed out once keeps its rectangle and pixels for the lifetime of
//! the atlas.

use crate::config::AtlasConfig;
use crate::error::{GlyphError, Result};

/// Identifies one page; equals its position in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

/// Pixel bounds of a slot inside its page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtlasRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl AtlasRect {
    pub const fn right(&self) -> u32 {
        self.x + self.width
    }

    pub const fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub const fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Where a glyph image lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtlasSlot {
    pub page: PageId,
    pub rect: AtlasRect,
}

/// One square page of pixel storage
#[derive(Debug)]
pub struct AtlasPage {
    id: PageId,
    size: u32,
    channels: u8,
    pixels: Vec<u8>,
    cursor_x: u32,
    cursor_y: u32,
    shelf_height: u32,
    slot_count: u32,
    dirty: bool,
}

impl AtlasPage {
    fn new(id: PageId, size: u32, channels: u8, padding: u32) -> Self {
        let len = size as usize * size as usize * channels as usize;
        Self {
            id,
            size,
            channels,
            pixels: vec![0; len],
            cursor_x: padding,
            cursor_y: padding,
            shelf_height: 0,
            slot_count: 0,
            dirty: false,
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    /// Edge length in pixels
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Bytes per pixel
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Row-major page contents, `size * size * channels` bytes
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn slot_count(&self) -> u32 {
        self.slot_count
    }

    /// Bump-allocate a `width` x `height` rectangle, or `None` when the page
    /// has no room left below its current shelf.
    fn allocate(&mut self, width: u32, height: u32, padding: u32) -> Option<AtlasRect> {
        let mut x = self.cursor_x;
        let mut y = self.cursor_y;

        if x + width + padding > self.size {
            // Open a new shelf below the current one
            x = padding;
            y = self.cursor_y + self.shelf_height + padding;
            if y + height + padding > self.size {
                return None;
            }
            self.cursor_y = y;
            self.shelf_height = 0;
        } else if y + height + padding > self.size {
            return None;
        }

        self.cursor_x = x + width + padding;
        self.shelf_height = self.shelf_height.max(height);
        self.slot_count += 1;

        Some(AtlasRect {
            x,
            y,
            width,
            height,
        })
    }

    /// Copy `src` into `rect`; callers check the length first
    fn write(&mut self, rect: &AtlasRect, src: &[u8]) {
        let channels = self.channels as usize;
        let row_len = rect.width as usize * channels;
        debug_assert_eq!(src.len(), row_len * rect.height as usize);
        if row_len == 0 {
            return;
        }
        let stride = self.size as usize * channels;
        for (row, chunk) in src.chunks_exact(row_len).take(rect.height as usize).enumerate() {
            let start = (rect.y as usize + row) * stride + rect.x as usize * channels;
            self.pixels[start..start + row_len].copy_from_slice(chunk);
        }
        self.dirty = true;
    }

    /// Copy a rectangle out of the page
    pub fn read(&self, rect: &AtlasRect) -> Vec<u8> {
        let channels = self.channels as usize;
        let row_len = rect.width as usize * channels;
        let stride = self.size as usize * channels;
        let mut out = Vec::with_capacity(row_len * rect.height as usize);
        for row in 0..rect.height as usize {
            let start = (rect.y as usize + row) * stride + rect.x as usize * channels;
            out.extend_from_slice(&self.pixels[start..start + row_len]);
        }
        out
    }
}

/// A growing set of fixed-size pages
#[derive(Debug)]
pub struct Atlas {
    config: AtlasConfig,
    channels: u8,
    pages: Vec<AtlasPage>,
}

impl Atlas {
    pub fn new(config: AtlasConfig, channels: u8) -> Self {
        Self {
            config,
            channels,
            pages: Vec::new(),
        }
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// `GlyphTooLarge` when a `width` x `height` image can never fit a page,
    /// whatever the pages already hold
    pub fn check_fits(&self, width: u32, height: u32) -> Result<()> {
        let AtlasConfig {
            page_size, padding, ..
        } = self.config;
        let limit = u64::from(page_size);
        let margin = 2 * u64::from(padding);
        if u64::from(width) + margin > limit || u64::from(height) + margin > limit {
            return Err(GlyphError::GlyphTooLarge {
                width,
                height,
                page_size,
            });
        }
        Ok(())
    }

    /// Reserve space for a `width` x `height` image.
    ///
    /// Only the newest page is considered; when it is full a new page is
    /// opened, up to `max_pages`.
    pub fn allocate(&mut self, width: u32, height: u32) -> Result<AtlasSlot> {
        self.check_fits(width, height)?;
        let AtlasConfig {
            page_size,
            max_pages,
            padding,
        } = self.config;

        if let Some(page) = self.pages.last_mut() {
            if let Some(rect) = page.allocate(width, height, padding) {
                return Ok(AtlasSlot {
                    page: page.id,
                    rect,
                });
            }
        }

        if self.pages.len() as u32 >= max_pages {
            return Err(GlyphError::AtlasExhausted {
                max_pages,
                page_size,
            });
        }

        let id = PageId(self.pages.len() as u32);
        log::debug!(
            "Atlas: opening page {} ({}x{}, {} channel(s))",
            id.0,
            page_size,
            page_size,
            self.channels
        );
        let mut page = AtlasPage::new(id, page_size, self.channels, padding);
        let rect = page
            .allocate(width, height, padding)
            .ok_or(GlyphError::GlyphTooLarge {
                width,
                height,
                page_size,
            })?;
        self.pages.push(page);

        Ok(AtlasSlot { page: id, rect })
    }

    /// Allocate a slot and copy `pixels` (row-major, top row first) into it.
    ///
    /// `pixels` must hold exactly `width * height * channels` bytes; a
    /// mismatched buffer is refused before any space is reserved.
    pub fn insert(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<AtlasSlot> {
        self.check_fits(width, height)?;
        let expected = width as usize * height as usize * self.channels as usize;
        if pixels.len() != expected {
            return Err(GlyphError::PixelBufferMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        let slot = self.allocate(width, height)?;
        if let Some(page) = self.pages.get_mut(slot.page.0 as usize) {
            page.write(&slot.rect, pixels);
        }
        Ok(slot)
    }

    pub fn page(&self, id: PageId) -> Option<&AtlasPage> {
        self.pages.get(id.0 as usize)
    }

    pub fn pages(&self) -> &[AtlasPage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn read_slot(&self, slot: &AtlasSlot) -> Option<Vec<u8>> {
        self.page(slot.page).map(|page| page.read(&slot.rect))
    }

    /// Pages written since the previous call, in id order
    pub fn take_dirty_pages(&mut self) -> Vec<PageId> {
        self.pages
            .iter_mut()
            .filter(|page| page.dirty)
            .map(|page| {
                page.dirty = false;
                page.id
            })
            .collect()
    }
}
