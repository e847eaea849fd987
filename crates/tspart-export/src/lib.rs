//! tspart-export: Renderers for tours and samples (sans-IO).
//!
//! Turns a [`ProcessResult`](tspart_pipeline::ProcessResult) into
//! output bytes: SVG documents via the [`svg`] crate and raster images
//! via `tiny-skia`. Nothing here touches the filesystem.

pub mod raster;
pub mod svg;

pub use raster::{Canvas, RenderOptions, encode, render_line, render_scatter};
pub use svg::{SvgMetadata, build_path_data, to_scatter_svg, to_svg};

/// Errors that can occur while rendering or encoding output.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The output canvas cannot be created.
    #[error("invalid canvas: {0}")]
    Canvas(String),

    /// A render option is out of range.
    #[error("invalid render options: {0}")]
    Options(String),

    /// Raster encoding failed.
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}
