use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use opl_core::{ImageSlot, Submission};

use super::fonts::{encode_win_ansi, Font};
use super::layout::wrap_text;
use super::photo::PreparedImage;
use crate::error::ReportError;

/// File name of every rendered report.
pub const REPORT_FILE_NAME: &str = "opl_report.pdf";

const MM: f32 = 72.0 / 25.4;
// A4 portrait in points
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
/// Horizontal padding inside a text cell.
const CELL_PADDING_MM: f32 = 1.0;
/// Extra space after each field block.
const FIELD_GAP_MM: f32 = 2.0;

/// Document styling for the report template.
#[derive(Debug, Clone)]
pub struct ReportStyle {
    pub title: String,
    /// Title font size in points.
    pub title_size: f32,
    /// Label and body font size in points.
    pub body_size: f32,
    /// Height of one text line in millimetres.
    pub line_height_mm: f32,
    /// Page margin in millimetres (left, right and top; the bottom margin is twice this).
    pub margin_mm: f32,
    /// Width photographs are drawn at, in millimetres.
    pub image_width_mm: f32,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            title: "One Point Lesson (OPL) Report".to_string(),
            title_size: 14.0,
            body_size: 12.0,
            line_height_mm: 10.0,
            margin_mm: 10.0,
            image_width_mm: 80.0,
        }
    }
}

/// A downloaded photograph to place in the report.
#[derive(Debug, Clone)]
pub struct ReportImage {
    pub slot: ImageSlot,
    pub path: PathBuf,
    /// Share link the image was downloaded from.
    pub source_url: String,
}

/// Summary of a written report.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub path: PathBuf,
    pub page_count: usize,
    /// Bold headings in the order they were drawn (field labels and image labels).
    pub headings: Vec<String>,
    pub images_embedded: usize,
}

#[derive(Debug, Clone, Copy)]
enum Align {
    Left,
    Center,
}

pub struct ReportRenderer {
    style: ReportStyle,
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new(ReportStyle::default())
    }
}

impl ReportRenderer {
    pub fn new(style: ReportStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &ReportStyle {
        &self.style
    }

    /// Render `submission` and `images` into `<dir>/opl_report.pdf`.
    ///
    /// Fields without a value are left out. Images are drawn in slot order
    /// (before, then after) regardless of their order in `images`.
    pub fn render(
        &self,
        submission: &Submission,
        images: &[ReportImage],
        dir: &Path,
    ) -> Result<RenderedReport, ReportError> {
        let _span = tracing::info_span!("report.render").entered();

        let style = &self.style;
        let line_height = style.line_height_mm * MM;
        let mut page = PageLayout::new(style.margin_mm * MM);
        let mut headings = Vec::new();

        page.text_line(
            Font::Bold,
            style.title_size,
            &encode_win_ansi(&style.title),
            Align::Center,
            line_height,
        );
        page.gap(line_height);

        let text_width = page.text_width();
        for (field, value) in submission.present_fields() {
            let label = format!("{}:", field.label());
            for line in wrap_text(Font::Bold, style.body_size, &label, text_width) {
                page.text_line(Font::Bold, style.body_size, &line, Align::Left, line_height);
            }
            for line in wrap_text(Font::Regular, style.body_size, value, text_width) {
                page.text_line(Font::Regular, style.body_size, &line, Align::Left, line_height);
            }
            // one empty line after the value, then the field gap
            page.gap(line_height + FIELD_GAP_MM * MM);
            headings.push(label);
        }

        let mut embedded = Vec::new();
        for slot in ImageSlot::ALL {
            let Some(image) = images.iter().find(|i| i.slot == slot) else {
                continue;
            };
            let prepared = PreparedImage::from_path(&image.path)?;
            let name = format!("Im{}", embedded.len() + 1);

            page.text_line(
                Font::Bold,
                style.body_size,
                &encode_win_ansi(slot.label()),
                Align::Left,
                line_height,
            );
            let width = style.image_width_mm * MM;
            page.image(&name, width, prepared.height_for_width(width));
            if slot == ImageSlot::Before {
                page.gap(line_height);
            }

            tracing::debug!(
                slot = %slot,
                width_px = prepared.width,
                height_px = prepared.height,
                "Embedding image in report"
            );
            headings.push(slot.label().to_string());
            embedded.push((name, prepared));
        }

        let page_count = page.pages.len();
        let mut doc = build_document(page.pages, &embedded)?;

        let path = dir.join(REPORT_FILE_NAME);
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| ReportError::Serialize(e.to_string()))?;
        std::fs::write(&path, buffer).map_err(|e| ReportError::WriteReport {
            path: path.clone(),
            source: e,
        })?;

        tracing::info!(
            path = %path.display(),
            page_count,
            fields = headings.len() - embedded.len(),
            images = embedded.len(),
            "Report generated"
        );

        Ok(RenderedReport {
            path,
            page_count,
            headings,
            images_embedded: embedded.len(),
        })
    }
}

/// Turns a submission and its fetched images into a report file in `dir`.
pub trait RenderReport: Send + Sync {
    fn render(
        &self,
        submission: &Submission,
        images: &[ReportImage],
        dir: &Path,
    ) -> Result<RenderedReport, ReportError>;
}

impl RenderReport for ReportRenderer {
    fn render(
        &self,
        submission: &Submission,
        images: &[ReportImage],
        dir: &Path,
    ) -> Result<RenderedReport, ReportError> {
        ReportRenderer::render(self, submission, images, dir)
    }
}

/// Top-down cursor over a sequence of A4 pages. `y` is measured from the top
/// edge of the current page.
struct PageLayout {
    pages: Vec<Vec<Operation>>,
    margin: f32,
    y: f32,
}

impl PageLayout {
    fn new(margin: f32) -> Self {
        Self {
            pages: vec![Vec::new()],
            margin,
            y: margin,
        }
    }

    fn text_width(&self) -> f32 {
        PAGE_WIDTH - 2.0 * self.margin - 2.0 * CELL_PADDING_MM * MM
    }

    fn page_break_at(&self) -> f32 {
        PAGE_HEIGHT - 2.0 * self.margin
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y + height > self.page_break_at() && self.y > self.margin {
            self.pages.push(Vec::new());
            self.y = self.margin;
        }
    }

    fn current(&mut self) -> &mut Vec<Operation> {
        // PageLayout::new always creates the first page
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn gap(&mut self, height: f32) {
        self.y += height;
    }

    fn text_line(&mut self, font: Font, size: f32, text: &[u8], align: Align, height: f32) {
        self.ensure_room(height);

        let x = match align {
            Align::Left => self.margin + CELL_PADDING_MM * MM,
            Align::Center => (PAGE_WIDTH - font.text_width(text, size)) / 2.0,
        };
        let baseline = self.y + height / 2.0 + 0.3 * size;
        let y = PAGE_HEIGHT - baseline;

        let ops = self.current();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![name(font.resource_name()), size.into()],
        ));
        ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(text.to_vec(), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));

        self.y += height;
    }

    fn image(&mut self, resource: &str, width: f32, height: f32) {
        let max_height = self.page_break_at() - self.margin;
        let (width, height) = if height > max_height {
            (width * max_height / height, max_height)
        } else {
            (width, height)
        };

        self.ensure_room(height);

        let x = self.margin;
        let y = PAGE_HEIGHT - self.y - height;
        let ops = self.current();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![
                width.into(),
                0.into(),
                0.into(),
                height.into(),
                x.into(),
                y.into(),
            ],
        ));
        ops.push(Operation::new("Do", vec![name(resource)]));
        ops.push(Operation::new("Q", vec![]));

        self.y += height;
    }
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

fn build_document(
    pages: Vec<Vec<Operation>>,
    images: &[(String, PreparedImage)],
) -> Result<Document, ReportError> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in Font::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), font_id);
    }

    let mut xobjects = Dictionary::new();
    for (resource, image) in images {
        let image_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            image.jpeg.clone(),
        );
        let image_id = doc.add_object(image_stream);
        xobjects.set(resource.as_str(), image_id);
    }

    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
        "XObject" => xobjects,
    });

    let mut page_ids: Vec<ObjectId> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| (*id).into()).collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    Ok(doc)
}
