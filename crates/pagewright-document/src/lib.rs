// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagewright-document — Document assembly for Pagewright.
//
// Turns heterogeneous input files into one paginated PDF: source adapters
// normalise each input, the assembly engine lays out text, tables, and images
// or copies pages out of existing PDFs, and the conversion pipeline runs the
// whole thing as a single observable job.

pub mod assembly;
pub mod image;
pub mod pdf;
pub mod pipeline;
pub mod source;

// Re-export the primary structs so callers can use `pagewright_document::AssemblyEngine` etc.
pub use assembly::{AssembledOutput, AssemblyEngine};
pub use image::processor::ImageProcessor;
pub use pdf::reader::PdfReader;
pub use pdf::writer::PdfWriter;
pub use pipeline::{ConversionJob, ConversionPipeline, ConversionResult};
pub use source::{AdaptedSource, InputFile, PageSource, SourceAdapter, SourceKind};
