//! Planar YUV → luma + interleaved chroma.
//!
//! The vendor camera hands out three separate planes (Y, U, V), each with its
//! own row stride and pixel stride. Downstream consumers (remote viewers,
//! encoders) want a tightly packed luma buffer and a single interleaved
//! U,V,U,V,... chroma buffer at quarter resolution. [`transcode`] produces both
//! into a caller-owned [`CameraImageBuffer`] that is reused across frames.

use serde::{Deserialize, Serialize};

use crate::error::TranscodeRejection;

/// One plane of a planar image, borrowed from the vendor for the duration of
/// the access.
#[derive(Copy, Clone, Debug)]
pub struct ImagePlane<'a> {
    pub data: &'a [u8],
    /// Bytes between the starts of consecutive rows.
    pub row_stride: usize,
    /// Bytes between consecutive samples within a row.
    pub pixel_stride: usize,
}

impl<'a> ImagePlane<'a> {
    pub fn new(data: &'a [u8], row_stride: usize, pixel_stride: usize) -> Self {
        Self {
            data,
            row_stride,
            pixel_stride,
        }
    }
}

impl ImagePlane<'static> {
    pub const EMPTY: ImagePlane<'static> = ImagePlane {
        data: &[],
        row_stride: 0,
        pixel_stride: 0,
    };
}

/// A camera image as exposed by the vendor. `available == false` means the
/// vendor had nothing for this frame; the plane fields are then meaningless.
#[derive(Copy, Clone, Debug)]
pub struct CameraFrame<'a> {
    pub available: bool,
    pub width: usize,
    pub height: usize,
    pub y: ImagePlane<'a>,
    pub u: ImagePlane<'a>,
    pub v: ImagePlane<'a>,
}

impl CameraFrame<'static> {
    pub fn unavailable() -> Self {
        CameraFrame {
            available: false,
            width: 0,
            height: 0,
            y: ImagePlane::EMPTY,
            u: ImagePlane::EMPTY,
            v: ImagePlane::EMPTY,
        }
    }
}

/// Reusable output buffers. `luma` is `width * height` bytes; `chroma` holds
/// one U,V pair per quarter-resolution sample (`width * height / 4` pairs,
/// rounded down) when present.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraImageBuffer {
    pub width: usize,
    pub height: usize,
    luma: Vec<u8>,
    chroma: Vec<u8>,
    has_chroma: bool,
}

impl CameraImageBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn luma(&self) -> &[u8] {
        &self.luma
    }

    /// Interleaved U,V samples, or `None` when the last frame was luma-only.
    pub fn chroma(&self) -> Option<&[u8]> {
        if self.has_chroma {
            Some(&self.chroma)
        } else {
            None
        }
    }
}

/// Why chroma was left out of an otherwise successful transcode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChromaAbsence {
    /// The caller asked for luma only.
    LumaOnly,
    RowStride { row_stride: usize, width: usize },
    PixelStride { pixel_stride: usize },
    PlaneTooShort { len: usize, needed: usize },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChromaOutcome {
    Interleaved,
    Absent(ChromaAbsence),
}

/// Only two-byte chroma pixel strides (semi-planar sources) are supported.
const SUPPORTED_CHROMA_PIXEL_STRIDE: usize = 2;

/// Convert `frame` into `out`.
///
/// Rejections leave `out` untouched. On success luma is always populated and
/// chroma is either interleaved or explicitly marked absent. Buffers are only
/// reallocated when the required length changes.
pub fn transcode(
    frame: &CameraFrame<'_>,
    luma_only: bool,
    out: &mut CameraImageBuffer,
) -> Result<ChromaOutcome, TranscodeRejection> {
    if !frame.available {
        return Err(TranscodeRejection::Unavailable);
    }
    let (width, height) = (frame.width, frame.height);
    if frame.y.row_stride != width {
        return Err(TranscodeRejection::LumaStride {
            row_stride: frame.y.row_stride,
            width,
        });
    }
    let Some(luma_len) = width.checked_mul(height) else {
        return Err(TranscodeRejection::Dimensions { width, height });
    };
    if frame.y.data.len() < luma_len {
        return Err(TranscodeRejection::LumaTooShort {
            len: frame.y.data.len(),
            needed: luma_len,
        });
    }

    out.width = width;
    out.height = height;
    ensure_len(&mut out.luma, luma_len);
    out.luma.copy_from_slice(&frame.y.data[..luma_len]);

    let samples = luma_len / 4;
    let outcome = match chroma_absence(frame, samples, luma_only) {
        Some(absence) => ChromaOutcome::Absent(absence),
        None => {
            ensure_len(&mut out.chroma, samples * 2);
            interleave_chroma(&frame.u, &frame.v, &mut out.chroma);
            ChromaOutcome::Interleaved
        }
    };
    out.has_chroma = outcome == ChromaOutcome::Interleaved;
    Ok(outcome)
}

fn chroma_absence(
    frame: &CameraFrame<'_>,
    samples: usize,
    luma_only: bool,
) -> Option<ChromaAbsence> {
    if luma_only {
        return Some(ChromaAbsence::LumaOnly);
    }
    for plane in [&frame.u, &frame.v] {
        if plane.row_stride != frame.width {
            return Some(ChromaAbsence::RowStride {
                row_stride: plane.row_stride,
                width: frame.width,
            });
        }
        if plane.pixel_stride != SUPPORTED_CHROMA_PIXEL_STRIDE {
            return Some(ChromaAbsence::PixelStride {
                pixel_stride: plane.pixel_stride,
            });
        }
    }
    let needed = strided_len(samples, SUPPORTED_CHROMA_PIXEL_STRIDE);
    for plane in [&frame.u, &frame.v] {
        if plane.data.len() < needed {
            return Some(ChromaAbsence::PlaneTooShort {
                len: plane.data.len(),
                needed,
            });
        }
    }
    None
}

/// Bytes a plane must hold to yield `samples` samples `pixel_stride` apart.
/// The last sample needs no trailing padding.
#[inline]
fn strided_len(samples: usize, pixel_stride: usize) -> usize {
    if samples == 0 {
        0
    } else {
        (samples - 1) * pixel_stride + 1
    }
}

/// Write U,V pairs into `dst`, reading one sample from each plane every
/// `pixel_stride` bytes. Stops when `dst` is full.
fn interleave_chroma(u: &ImagePlane<'_>, v: &ImagePlane<'_>, dst: &mut [u8]) {
    let us = u.data.iter().step_by(u.pixel_stride.max(1));
    let vs = v.data.iter().step_by(v.pixel_stride.max(1));
    for (pair, (&cu, &cv)) in dst.chunks_exact_mut(2).zip(us.zip(vs)) {
        pair[0] = cu;
        pair[1] = cv;
    }
}

#[inline]
fn ensure_len(buf: &mut Vec<u8>, len: usize) {
    if buf.len() != len {
        *buf = vec![0; len];
    }
}
