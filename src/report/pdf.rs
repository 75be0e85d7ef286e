use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::RgbImage;
use log::{info, warn};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use thiserror::Error;

use crate::data::model::IIN_SUFFIX;

pub const MERGED_PDF_NAME: &str = "all_plots.pdf";

/// Pages are laid out at 100 pixels per inch.
const POINTS_PER_PIXEL: f32 = 72.0 / 100.0;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("no images to merge")]
    NoImages,
    #[error("decoding {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("encoding PDF content: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("writing PDF: {0}")]
    Io(#[from] std::io::Error),
}

/// What ended up in the merged document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub pages: usize,
    /// Images that could not be decoded by the fallback path.
    pub skipped: Vec<PathBuf>,
    /// Whether the primary merge failed and the fallback produced the file.
    pub used_fallback: bool,
}

/// Page order: plots without `_Iin` in their name first, then `_Iin` plots,
/// each group sorted by file name.
pub fn merge_order(images: &[PathBuf]) -> Vec<PathBuf> {
    let name = |p: &PathBuf| {
        p.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    let mut sorted = images.to_vec();
    sorted.sort_by_key(|p| (name(p).contains(IIN_SUFFIX), name(p)));
    sorted
}

/// Merge PNG plots into one multi-page PDF sized to the first image.
///
/// If the primary path fails, every image is decoded on its own, unreadable
/// ones are skipped, and the rest are resampled onto the first readable
/// image's canvas.
pub fn merge_plots_to_pdf(images: &[PathBuf], output: &Path) -> Result<MergeSummary, MergeError> {
    if images.is_empty() {
        return Err(MergeError::NoImages);
    }
    let ordered = merge_order(images);

    match merge_primary(&ordered, output) {
        Ok(pages) => {
            info!("Merged {pages} plots into {}", output.display());
            Ok(MergeSummary {
                pages,
                skipped: Vec::new(),
                used_fallback: false,
            })
        }
        Err(e) => {
            warn!("Primary PDF merge failed ({e}); retrying with resampled pages");
            let summary = merge_fallback(&ordered, output)?;
            info!(
                "Merged {} plots into {} ({} skipped)",
                summary.pages,
                output.display(),
                summary.skipped.len()
            );
            Ok(summary)
        }
    }
}

fn decode(path: &Path) -> Result<RgbImage, MergeError> {
    image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|source| MergeError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

fn merge_primary(ordered: &[PathBuf], output: &Path) -> Result<usize, MergeError> {
    let pages = ordered
        .iter()
        .map(|p| decode(p))
        .collect::<Result<Vec<_>, _>>()?;
    let size = pages[0].dimensions();
    write_pdf(&pages, size, output)?;
    Ok(pages.len())
}

fn merge_fallback(ordered: &[PathBuf], output: &Path) -> Result<MergeSummary, MergeError> {
    let mut skipped = Vec::new();
    let mut pages: Vec<RgbImage> = Vec::with_capacity(ordered.len());

    for path in ordered {
        match decode(path) {
            Ok(img) => pages.push(img),
            Err(e) => {
                warn!("{e}");
                skipped.push(path.clone());
            }
        }
    }
    let Some(first) = pages.first() else {
        return Err(MergeError::NoImages);
    };

    let (w, h) = first.dimensions();
    let pages: Vec<RgbImage> = pages
        .into_iter()
        .map(|img| {
            if img.dimensions() == (w, h) {
                img
            } else {
                imageops::resize(&img, w, h, FilterType::Triangle)
            }
        })
        .collect();

    write_pdf(&pages, (w, h), output)?;
    Ok(MergeSummary {
        pages: pages.len(),
        skipped,
        used_fallback: true,
    })
}

/// Write one page per image, each image stretched over a page of `size`
/// pixels.
fn write_pdf(pages: &[RgbImage], size: (u32, u32), output: &Path) -> Result<(), MergeError> {
    let page_w = size.0 as f32 * POINTS_PER_PIXEL;
    let page_h = size.1 as f32 * POINTS_PER_PIXEL;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());

    for img in pages {
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => img.width() as i64,
                "Height" => img.height() as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8_i64,
            },
            img.as_raw().clone(),
        ));

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(page_w),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(page_h),
                        Object::Integer(0),
                        Object::Integer(0),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page_w),
                Object::Real(page_h),
            ],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    doc.save(output)?;
    Ok(())
}
