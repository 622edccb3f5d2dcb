//! Render worker: image decoding and PDF rasterisation
//!
//! One thread does all decoding, one job at a time. Interactive jobs (the
//! page being read) always go before background jobs (thumbnails).
//! File bytes are fetched through the `media:` resolver like every other
//! local resource.

use crate::AppError;
use crossbeam_channel::{select, unbounded, Receiver, Sender};
use image::{GenericImageView, ImageReader};
use pdfium_render::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// What to draw
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    Image(PathBuf),
    PdfPage { path: PathBuf, index: usize },
}

impl RenderTarget {
    pub fn path(&self) -> &Path {
        match self {
            RenderTarget::Image(p) => p,
            RenderTarget::PdfPage { path, .. } => path,
        }
    }
}

/// A target scaled to fit inside a `max_edge` square
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderRequest {
    pub target: RenderTarget,
    pub max_edge: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Interactive,
    Background,
}

/// Decoded RGBA8 pixels
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug)]
pub enum RenderEvent {
    Rendered {
        request: RenderRequest,
        result: Result<RenderedImage, AppError>,
    },
    PageCount {
        path: PathBuf,
        result: Result<usize, AppError>,
    },
}

enum Job {
    Render(RenderRequest, Sender<RenderEvent>),
    PageCount(PathBuf, Sender<RenderEvent>),
}

/// Cloneable submission handle
#[derive(Clone)]
pub struct RenderWorker {
    interactive: Sender<Job>,
    background: Sender<Job>,
}

impl RenderWorker {
    /// Spawn the worker thread
    pub fn spawn() -> Result<Self, AppError> {
        let (interactive, interactive_rx) = unbounded::<Job>();
        let (background, background_rx) = unbounded::<Job>();

        std::thread::Builder::new()
            .name("render-worker".into())
            .spawn(move || worker_loop(interactive_rx, background_rx))
            .map_err(|e| AppError::Init(format!("render worker: {}", e)))?;

        Ok(Self {
            interactive,
            background,
        })
    }

    fn queue(&self, priority: Priority) -> &Sender<Job> {
        match priority {
            Priority::Interactive => &self.interactive,
            Priority::Background => &self.background,
        }
    }

    /// Results arrive on `reply`
    pub fn render(
        &self,
        request: RenderRequest,
        priority: Priority,
        reply: &Sender<RenderEvent>,
    ) -> Result<(), AppError> {
        self.queue(priority)
            .send(Job::Render(request, reply.clone()))
            .map_err(|_| AppError::Worker("render worker stopped".into()))
    }

    pub fn page_count(&self, path: PathBuf, reply: &Sender<RenderEvent>) -> Result<(), AppError> {
        self.interactive
            .send(Job::PageCount(path, reply.clone()))
            .map_err(|_| AppError::Worker("render worker stopped".into()))
    }
}

fn next_job(interactive: &Receiver<Job>, background: &Receiver<Job>) -> Option<Job> {
    if let Ok(job) = interactive.try_recv() {
        return Some(job);
    }
    select! {
        recv(interactive) -> job => job.ok(),
        recv(background) -> job => job.ok(),
    }
}

fn worker_loop(interactive: Receiver<Job>, background: Receiver<Job>) {
    let pdfium = bind_pdfium();
    let mut documents = DocumentCache::default();

    while let Some(job) = next_job(&interactive, &background) {
        match job {
            Job::Render(request, reply) => {
                let result = match &request.target {
                    RenderTarget::Image(path) => decode_image(path, request.max_edge),
                    RenderTarget::PdfPage { path, index } => {
                        render_pdf_page(pdfium.as_ref(), &mut documents, path, *index, request.max_edge)
                    }
                };
                if let Err(e) = &result {
                    tracing::warn!(target = ?request.target, "Render failed: {}", e);
                }
                let _ = reply.send(RenderEvent::Rendered { request, result });
            }
            Job::PageCount(path, reply) => {
                let result = count_pages(pdfium.as_ref(), &mut documents, &path);
                if let Err(e) = &result {
                    tracing::warn!(path = %path.display(), "Could not open document: {}", e);
                }
                let _ = reply.send(RenderEvent::PageCount { path, result });
            }
        }
    }

    tracing::debug!("Render worker exiting");
}

fn bind_pdfium() -> Option<Pdfium> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));

    match Pdfium::bind_to_system_library()
        .or_else(|_| Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&exe_dir)))
    {
        Ok(bindings) => Some(Pdfium::new(bindings)),
        Err(e) => {
            tracing::warn!("Pdfium library not found, PDF support disabled: {}", e);
            None
        }
    }
}

fn pdf_unavailable() -> AppError {
    AppError::Document("PDF support unavailable".into())
}

/// Keeps the most recently opened document so page after page does not reparse it
#[derive(Default)]
struct DocumentCache<'p> {
    current: Option<(PathBuf, PdfDocument<'p>)>,
}

impl<'p> DocumentCache<'p> {
    fn open(&mut self, pdfium: &'p Pdfium, path: &Path) -> Result<&PdfDocument<'p>, AppError> {
        let cached = matches!(&self.current, Some((p, _)) if p == path);
        if !cached {
            self.current = None;
            let bytes = fetch_bytes(path)?;
            let doc = pdfium.load_pdf_from_byte_vec(bytes, None)?;
            tracing::debug!(path = %path.display(), pages = doc.pages().len(), "Document opened");
            self.current = Some((path.to_path_buf(), doc));
        }

        self.current
            .as_ref()
            .map(|(_, doc)| doc)
            .ok_or_else(|| AppError::Document(path.display().to_string()))
    }
}

fn fetch_bytes(path: &Path) -> Result<Vec<u8>, AppError> {
    let response = app_fs::fetch_media(&app_fs::encode_media_url(path));
    if response.is_ok() {
        Ok(response.body)
    } else {
        Err(AppError::FileNotFound(format!("{} ({})", path.display(), response.status)))
    }
}

fn decode_image(path: &Path, max_edge: u32) -> Result<RenderedImage, AppError> {
    let bytes = fetch_bytes(path)?;
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AppError::ImageDecode(e.to_string()))?
        .decode()?;

    let (w, h) = img.dimensions();
    let img = if max_edge > 0 && (w > max_edge || h > max_edge) {
        img.thumbnail(max_edge, max_edge)
    } else {
        img
    };

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(RenderedImage {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

fn count_pages<'p>(
    pdfium: Option<&'p Pdfium>,
    documents: &mut DocumentCache<'p>,
    path: &Path,
) -> Result<usize, AppError> {
    let pdfium = pdfium.ok_or_else(pdf_unavailable)?;
    let doc = documents.open(pdfium, path)?;
    Ok(doc.pages().len() as usize)
}

fn render_pdf_page<'p>(
    pdfium: Option<&'p Pdfium>,
    documents: &mut DocumentCache<'p>,
    path: &Path,
    index: usize,
    max_edge: u32,
) -> Result<RenderedImage, AppError> {
    let pdfium = pdfium.ok_or_else(pdf_unavailable)?;
    let doc = documents.open(pdfium, path)?;

    let index = u16::try_from(index).map_err(|_| AppError::Document(format!("page {} out of range", index)))?;
    let page = doc.pages().get(index)?;

    let edge = max_edge.max(1) as i32;
    let config = PdfRenderConfig::new()
        .set_target_width(edge)
        .set_maximum_height(edge);
    let bitmap = page.render_with_config(&config)?;

    Ok(RenderedImage {
        width: bitmap.width() as u32,
        height: bitmap.height() as u32,
        rgba: bitmap.as_rgba_bytes(),
    })
}
