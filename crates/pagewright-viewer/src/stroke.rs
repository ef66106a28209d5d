// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Freehand gesture capture.

use crate::annotation::{AnnotationId, InkStroke, NormalizedPoint, SurfaceSize};

/// Accumulates the points of one pointer-down .. pointer-up gesture.
///
/// Points are normalized against the surface size at the moment each one is
/// captured, so a zoom halfway through a gesture still lands on the page.
#[derive(Debug, Clone)]
pub struct StrokeBuilder {
    page: u32,
    color: [u8; 3],
    width: f32,
    points: Vec<NormalizedPoint>,
}

impl StrokeBuilder {
    pub fn begin(page: u32, color: [u8; 3], width: f32) -> Self {
        Self {
            page,
            color,
            width,
            points: Vec::new(),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn extend(&mut self, raw_x: f32, raw_y: f32, surface: SurfaceSize) {
        self.points
            .push(NormalizedPoint::from_surface(raw_x, raw_y, surface));
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Close the gesture. A gesture without points yields nothing.
    pub fn finish(self) -> Option<InkStroke> {
        if self.points.is_empty() {
            return None;
        }
        Some(InkStroke {
            id: AnnotationId::new(),
            page: self.page,
            points: self.points,
            color: self.color,
            width: self.width,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_are_normalized_at_capture_time() {
        let mut builder = StrokeBuilder::begin(3, [0, 0, 0], 2.0);
        builder.extend(100.0, 100.0, SurfaceSize::new(200.0, 400.0));
        // Surface doubled between two pointer moves.
        builder.extend(200.0, 200.0, SurfaceSize::new(400.0, 800.0));

        let stroke = builder.finish().unwrap();
        assert_eq!(stroke.page, 3);
        assert_eq!(
            stroke.points,
            vec![NormalizedPoint::new(50.0, 25.0), NormalizedPoint::new(50.0, 25.0)]
        );
    }

    #[test]
    fn empty_gesture_yields_no_stroke() {
        assert!(StrokeBuilder::begin(1, [0, 0, 0], 1.0).finish().is_none());
    }
}
