//! Page Layout for Exported Estimates
//!
//! A single portrait page with fixed margins. The snapshot is scaled to fit,
//! never split across pages.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    A4,
}

impl PageFormat {
    /// Portrait `(width, height)` in millimetres.
    pub fn size_mm(self) -> (f64, f64) {
        match self {
            Self::A4 => (210.0, 297.0),
        }
    }
}

/// Page settings for the exported document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpec {
    pub format: PageFormat,
    pub margin_mm: f64,
    /// Device pixel scale used when rasterizing the view.
    pub snapshot_scale: f64,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            format: PageFormat::A4,
            margin_mm: 10.0,
            snapshot_scale: 1.5,
        }
    }
}

/// Where the snapshot image lands on the page, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PageSpec {
    pub fn available_mm(&self) -> (f64, f64) {
        let (width, height) = self.format.size_mm();
        (width - self.margin_mm * 2.0, height - self.margin_mm * 2.0)
    }

    /// Fit a `raster_width` x `raster_height` image on the page.
    ///
    /// The image takes the full available width unless that makes it too
    /// tall, in which case it takes the full available height and is centered
    /// horizontally. It always starts at the top margin.
    pub fn place(&self, raster_width: u32, raster_height: u32) -> Placement {
        let (page_width, _) = self.format.size_mm();
        let (avail_width, avail_height) = self.available_mm();

        if raster_width == 0 || raster_height == 0 {
            return Placement { x: self.margin_mm, y: self.margin_mm, width: 0.0, height: 0.0 };
        }

        let aspect = raster_height as f64 / raster_width as f64;
        let (width, height) = if avail_width * aspect > avail_height {
            (avail_height / aspect, avail_height)
        } else {
            (avail_width, avail_width * aspect)
        };

        Placement {
            x: (page_width - width) / 2.0,
            y: self.margin_mm,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_short_snapshot_fills_width() {
        let placement = PageSpec::default().place(1900, 950);
        assert!(close(placement.width, 190.0));
        assert!(close(placement.height, 95.0));
        assert!(close(placement.x, 10.0));
        assert!(close(placement.y, 10.0));
    }

    #[test]
    fn test_tall_snapshot_fills_height_centered() {
        let placement = PageSpec::default().place(1000, 2770);
        assert!(close(placement.height, 277.0));
        assert!(close(placement.width, 100.0));
        assert!(close(placement.x, 55.0));
        assert!(close(placement.y, 10.0));
    }

    #[test]
    fn test_empty_snapshot() {
        let placement = PageSpec::default().place(0, 100);
        assert_eq!(placement.width, 0.0);
        assert_eq!(placement.height, 0.0);
    }
}
