//! Floor-plan import: raster images are embedded as-is, PDFs are
//! rasterized (first page only) before embedding.
//!
//! Only one import runs at a time. The importer claims a processing flag
//! on entry and an RAII guard clears it on every exit path, so a failed
//! decode never leaves the surface stuck in a busy state.

use std::future::Future;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, ImageReader};
use thiserror::Error;
use tracing::{debug, info};

pub const PDF_MAGIC: &[u8] = b"%PDF";
pub const SVG_MIME: &str = "image/svg+xml";

/// How far into a file to look for an `<svg` root element.
const SVG_SNIFF_LEN: usize = 1024;

/// PDF user-space units per inch.
const PDF_POINTS_PER_INCH: f64 = 72.0;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("another floor plan is still being processed")]
    Busy,

    #[error("'{name}' is neither an image nor a PDF")]
    Unsupported { name: String },

    #[error("could not decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("could not rasterize PDF: {message}")]
    Pdf { message: String },

    #[error("malformed data URL")]
    DataUrl,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ── FloorPlan ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Image,
    Pdf,
}

/// A decoded floor plan ready to be stored on a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloorPlan {
    pub data_url: String,
    pub mime: String,
    /// Pixel size; `None` for formats this build embeds without measuring
    /// (SVG, TIFF, AVIF, ...).
    pub dimensions: Option<(u32, u32)>,
    pub source: SourceKind,
}

impl FloorPlan {
    /// Inspect an embedded floor plan (as stored on a project).
    pub fn from_data_url(data_url: &str) -> Result<Self, ImportError> {
        let (mime, bytes) = parse_data_url(data_url)?;
        let dimensions = match image::guess_format(&bytes) {
            Ok(format) if format.reading_enabled() => Some(dimensions(&bytes, format)?),
            _ => None,
        };
        Ok(Self {
            data_url: data_url.to_owned(),
            mime,
            dimensions,
            source: SourceKind::Image,
        })
    }

    /// `1200x800`, or `unknown size`.
    pub fn size_label(&self) -> String {
        self.dimensions
            .map_or_else(|| "unknown size".to_owned(), |(w, h)| format!("{w}x{h}"))
    }
}

/// `data:<mime>;base64,<payload>` → (mime, bytes).
pub fn parse_data_url(data_url: &str) -> Result<(String, Vec<u8>), ImportError> {
    let rest = data_url.strip_prefix("data:").ok_or(ImportError::DataUrl)?;
    let (meta, payload) = rest.split_once(',').ok_or(ImportError::DataUrl)?;
    let mime = meta.strip_suffix(";base64").ok_or(ImportError::DataUrl)?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| ImportError::DataUrl)?;
    Ok((mime.to_owned(), bytes))
}

pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

fn dimensions(bytes: &[u8], format: ImageFormat) -> Result<(u32, u32), ImportError> {
    Ok(ImageReader::with_format(Cursor::new(bytes), format).into_dimensions()?)
}

// ── Rasterizer seam ─────────────────────────────────────────────────

/// Converts page 1 of a PDF into PNG bytes.
pub trait PdfRasterizer: Send + Sync {
    fn rasterize_first_page(
        &self,
        pdf: &[u8],
        scale: f64,
    ) -> impl Future<Output = Result<Vec<u8>, ImportError>> + Send;
}

/// Shells out to poppler's `pdftoppm` inside a scratch directory.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    program: PathBuf,
}

impl PdftoppmRasterizer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl PdfRasterizer for PdftoppmRasterizer {
    async fn rasterize_first_page(&self, pdf: &[u8], scale: f64) -> Result<Vec<u8>, ImportError> {
        let scratch = tempfile::tempdir()?;
        let input = scratch.path().join("input.pdf");
        let prefix = scratch.path().join("page");
        tokio::fs::write(&input, pdf).await?;

        let dpi = format!("{:.0}", PDF_POINTS_PER_INCH * scale);
        debug!(program = %self.program.display(), %dpi, "rasterizing PDF page 1");
        let output = tokio::process::Command::new(&self.program)
            .args(["-png", "-f", "1", "-l", "1", "-singlefile", "-r", &dpi])
            .arg(&input)
            .arg(&prefix)
            .output()
            .await
            .map_err(|e| ImportError::Pdf {
                message: format!("failed to run {}: {e}", self.program.display()),
            })?;

        if !output.status.success() {
            return Err(ImportError::Pdf {
                message: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(tokio::fs::read(prefix.with_extension("png")).await?)
    }
}

// ── Importer ────────────────────────────────────────────────────────

struct ProcessingGuard<'a>(&'a AtomicBool);

impl<'a> ProcessingGuard<'a> {
    fn claim(flag: &'a AtomicBool) -> Result<Self, ImportError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ImportError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct FloorPlanImporter<R> {
    rasterizer: R,
    pdf_scale: f64,
    processing: AtomicBool,
}

impl<R: PdfRasterizer> FloorPlanImporter<R> {
    pub fn new(rasterizer: R, pdf_scale: f64) -> Self {
        Self {
            rasterizer,
            pdf_scale,
            processing: AtomicBool::new(false),
        }
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub async fn import_file(&self, path: &Path) -> Result<FloorPlan, ImportError> {
        let _guard = ProcessingGuard::claim(&self.processing)?;
        let bytes = tokio::fs::read(path).await?;
        self.convert(&path.display().to_string(), &bytes).await
    }

    /// `name` only feeds the extension fallback and error messages.
    pub async fn import_bytes(&self, name: &str, bytes: &[u8]) -> Result<FloorPlan, ImportError> {
        let _guard = ProcessingGuard::claim(&self.processing)?;
        self.convert(name, bytes).await
    }

    async fn convert(&self, name: &str, bytes: &[u8]) -> Result<FloorPlan, ImportError> {
        let plan = match detect(name, bytes) {
            Some(Detected::Pdf) => {
                let png = self
                    .rasterizer
                    .rasterize_first_page(bytes, self.pdf_scale)
                    .await?;
                let dimensions = dimensions(&png, ImageFormat::Png)?;
                FloorPlan {
                    data_url: to_data_url(ImageFormat::Png.to_mime_type(), &png),
                    mime: ImageFormat::Png.to_mime_type().to_owned(),
                    dimensions: Some(dimensions),
                    source: SourceKind::Pdf,
                }
            }
            Some(Detected::Raster(format)) => {
                let dimensions = dimensions(bytes, format)?;
                FloorPlan {
                    data_url: to_data_url(format.to_mime_type(), bytes),
                    mime: format.to_mime_type().to_owned(),
                    dimensions: Some(dimensions),
                    source: SourceKind::Image,
                }
            }
            Some(Detected::Opaque(mime)) => FloorPlan {
                data_url: to_data_url(mime, bytes),
                mime: mime.to_owned(),
                dimensions: None,
                source: SourceKind::Image,
            },
            None => {
                return Err(ImportError::Unsupported {
                    name: name.to_owned(),
                });
            }
        };
        info!(name, mime = %plan.mime, size = %plan.size_label(), source = ?plan.source, "floor plan imported");
        Ok(plan)
    }
}

enum Detected {
    Pdf,
    /// Decodable here, so dimensions are known.
    Raster(ImageFormat),
    /// An image type embedded verbatim without measuring.
    Opaque(&'static str),
}

fn detect(name: &str, bytes: &[u8]) -> Option<Detected> {
    if bytes.starts_with(PDF_MAGIC) {
        return Some(Detected::Pdf);
    }
    if let Ok(format) = image::guess_format(bytes) {
        return Some(classify(format));
    }
    if looks_like_svg(bytes) {
        return Some(Detected::Opaque(SVG_MIME));
    }
    let ext = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)?;
    match ext.as_str() {
        "pdf" => Some(Detected::Pdf),
        "svg" | "svgz" => Some(Detected::Opaque(SVG_MIME)),
        _ => ImageFormat::from_extension(&ext).map(classify),
    }
}

fn classify(format: ImageFormat) -> Detected {
    if format.reading_enabled() {
        Detected::Raster(format)
    } else {
        Detected::Opaque(format.to_mime_type())
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(SVG_SNIFF_LEN)]);
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use image::{ImageBuffer, Rgb};

    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(width, height, Rgb([200, 200, 200]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    struct FakeRasterizer {
        page: Vec<u8>,
    }

    impl PdfRasterizer for FakeRasterizer {
        async fn rasterize_first_page(&self, pdf: &[u8], scale: f64) -> Result<Vec<u8>, ImportError> {
            assert!(pdf.starts_with(PDF_MAGIC));
            assert!((scale - 2.0).abs() < f64::EPSILON);
            Ok(self.page.clone())
        }
    }

    struct FailingRasterizer;

    impl PdfRasterizer for FailingRasterizer {
        async fn rasterize_first_page(&self, _: &[u8], _: f64) -> Result<Vec<u8>, ImportError> {
            Err(ImportError::Pdf {
                message: "broken xref".into(),
            })
        }
    }

    #[tokio::test]
    async fn image_is_embedded_verbatim() {
        let importer = FloorPlanImporter::new(FailingRasterizer, 2.0);
        let bytes = png_bytes(40, 30);
        let plan = importer.import_bytes("plan.png", &bytes).await.unwrap();
        assert_eq!(plan.dimensions, Some((40, 30)));
        assert_eq!(plan.mime, "image/png");
        assert_eq!(plan.source, SourceKind::Image);
        let (mime, back) = parse_data_url(&plan.data_url).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(back, bytes);
        assert!(!importer.is_processing());
    }

    #[tokio::test]
    async fn pdf_goes_through_rasterizer() {
        let importer = FloorPlanImporter::new(FakeRasterizer { page: png_bytes(120, 80) }, 2.0);
        let plan = importer
            .import_bytes("plan.pdf", b"%PDF-1.7\n...")
            .await
            .unwrap();
        assert_eq!(plan.source, SourceKind::Pdf);
        assert_eq!(plan.dimensions, Some((120, 80)));
        assert!(plan.data_url.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn failures_release_the_processing_flag() {
        let importer = FloorPlanImporter::new(FailingRasterizer, 2.0);
        let err = importer.import_bytes("plan.pdf", b"%PDF-1.4").await.unwrap_err();
        assert!(matches!(err, ImportError::Pdf { .. }));
        assert!(!importer.is_processing());

        let err = importer.import_bytes("notes.txt", b"hello").await.unwrap_err();
        assert!(matches!(err, ImportError::Unsupported { .. }));
        assert!(!importer.is_processing());

        let err = importer.import_bytes("fake.png", b"\x89PNG\r\n\x1a\nxx").await.unwrap_err();
        assert!(matches!(err, ImportError::Image(_)));
        assert!(!importer.is_processing());
    }

    #[tokio::test]
    async fn concurrent_import_is_rejected() {
        let importer = Arc::new(FloorPlanImporter::new(FailingRasterizer, 2.0));
        let guard = ProcessingGuard::claim(&importer.processing).unwrap();
        let err = importer.import_bytes("plan.png", &png_bytes(2, 2)).await.unwrap_err();
        assert!(matches!(err, ImportError::Busy));
        drop(guard);
        assert!(importer.import_bytes("plan.png", &png_bytes(2, 2)).await.is_ok());
    }

    #[tokio::test]
    async fn import_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tang1.png");
        std::fs::write(&path, png_bytes(8, 6)).unwrap();
        let importer = FloorPlanImporter::new(FailingRasterizer, 2.0);
        let plan = importer.import_file(&path).await.unwrap();
        assert_eq!(plan.dimensions, Some((8, 6)));
    }

    #[test]
    fn floor_plan_from_stored_data_url() {
        let url = to_data_url("image/png", &png_bytes(16, 9));
        let plan = FloorPlan::from_data_url(&url).unwrap();
        assert_eq!(plan.dimensions, Some((16, 9)));
        assert_eq!(plan.size_label(), "16x9");
        assert!(matches!(FloorPlan::from_data_url("nope"), Err(ImportError::DataUrl)));
    }

    #[tokio::test]
    async fn svg_plan_is_embedded_without_size() {
        let importer = FloorPlanImporter::new(FailingRasterizer, 2.0);
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="30"/>"#;
        let plan = importer.import_bytes("plan.svg", svg).await.unwrap();
        assert_eq!(plan.mime, SVG_MIME);
        assert_eq!(plan.dimensions, None);
        assert_eq!(plan.source, SourceKind::Image);
        let (mime, back) = parse_data_url(&plan.data_url).unwrap();
        assert_eq!(mime, SVG_MIME);
        assert_eq!(back, svg.to_vec());
        assert!(!importer.is_processing());

        let xml = b"\n<?xml version=\"1.0\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\"/>";
        let plan = importer.import_bytes("drawing", xml).await.unwrap();
        assert_eq!(plan.mime, SVG_MIME);
    }

    #[tokio::test]
    async fn unmeasured_raster_formats_are_embedded() {
        let importer = FloorPlanImporter::new(FailingRasterizer, 2.0);
        let plan = importer
            .import_bytes("plan.tiff", b"II*\0\x08\0\0\0")
            .await
            .unwrap();
        assert_eq!(plan.mime, "image/tiff");
        assert_eq!(plan.dimensions, None);

        let stored = FloorPlan::from_data_url(&plan.data_url).unwrap();
        assert_eq!(stored.mime, "image/tiff");
        assert_eq!(stored.size_label(), "unknown size");
    }
}
