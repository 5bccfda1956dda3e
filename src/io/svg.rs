//! SVG snapshots of a localization run.
//!
//! Renders the depth field as shaded cells with either the particle cloud
//! or the posterior mass overlaid, plus truth/estimate/target markers and
//! an uncertainty circle. Purely a consumer of core state; one SVG per
//! time step makes an audit trail of the filter converging.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use crate::bathymetry::BathymetricGrid;
use crate::core::{Estimate, Point2D};
use crate::localization::Particle;

/// SVG color scheme for visualization.
#[derive(Clone, Debug)]
pub struct SvgColorScheme {
    /// Particle dot color
    pub particle: &'static str,
    /// True position marker color
    pub truth: &'static str,
    /// Estimated position marker color
    pub estimate: &'static str,
    /// Target marker color
    pub target: &'static str,
    /// Posterior mass overlay color
    pub posterior: &'static str,
}

impl Default for SvgColorScheme {
    fn default() -> Self {
        Self {
            particle: "#2266CC",
            truth: "#111111",
            estimate: "#CC2222",
            target: "#882288",
            posterior: "#CC2222",
        }
    }
}

/// Configuration for SVG rendering.
#[derive(Clone, Debug)]
pub struct SvgConfig {
    /// Pixels per meter
    pub scale: f32,
    /// Padding around the map in pixels
    pub padding: f32,
    /// Pose marker radius in pixels
    pub marker_radius: f32,
    /// Particle dot radius in pixels
    pub particle_radius: f32,
    /// Color scheme
    pub colors: SvgColorScheme,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            scale: 4.0,
            padding: 20.0,
            marker_radius: 5.0,
            particle_radius: 1.0,
            colors: SvgColorScheme::default(),
        }
    }
}

/// SVG snapshot builder.
///
/// Draw order is the call order; draw the depth field first and markers
/// last.
pub struct SvgVisualizer {
    config: SvgConfig,
    body: String,
    origin: Point2D,
    extent_y: f32,
    width_px: f32,
    height_px: f32,
}

impl SvgVisualizer {
    /// Start a snapshot over the given field's extent.
    pub fn new(config: SvgConfig, field: &BathymetricGrid) -> Self {
        let bounds = field.bounds();
        let width_px = bounds.width() * config.scale + 2.0 * config.padding;
        let height_px = bounds.height() * config.scale + 2.0 * config.padding;
        Self {
            config,
            body: String::new(),
            origin: bounds.min,
            extent_y: bounds.height(),
            width_px,
            height_px,
        }
    }

    /// World position to pixel coordinates (y flipped: north is up).
    fn to_px(&self, p: Point2D) -> (f32, f32) {
        (
            self.config.padding + (p.x - self.origin.x) * self.config.scale,
            self.config.padding + (self.extent_y - (p.y - self.origin.y)) * self.config.scale,
        )
    }

    /// Draw the depth field as blue-shaded cells (deeper is darker).
    pub fn draw_depth_field(&mut self, field: &BathymetricGrid) {
        let (nx, ny) = field.dimensions();
        let deepest = (0..nx)
            .flat_map(|ix| (0..ny).map(move |iy| (ix, iy)))
            .map(|(ix, iy)| field.depth(ix, iy))
            .fold(f32::INFINITY, f32::min)
            .min(-1e-3);

        for ix in 0..nx - 1 {
            for iy in 0..ny - 1 {
                let mean_depth = (field.depth(ix, iy)
                    + field.depth(ix + 1, iy)
                    + field.depth(ix, iy + 1)
                    + field.depth(ix + 1, iy + 1))
                    / 4.0;
                // 0 at the surface, 1 at the deepest point.
                let t = (mean_depth / deepest).clamp(0.0, 1.0);
                let r = (200.0 - 170.0 * t) as u8;
                let g = (225.0 - 160.0 * t) as u8;
                let b = (255.0 - 120.0 * t) as u8;

                let (px, py) = self.to_px(field.node_position(ix, iy + 1));
                let w = (field.x_axis()[ix + 1] - field.x_axis()[ix]) * self.config.scale;
                let h = (field.y_axis()[iy + 1] - field.y_axis()[iy]) * self.config.scale;
                let _ = writeln!(
                    self.body,
                    r#"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="rgb({},{},{})"/>"#,
                    px, py, w, h, r, g, b
                );
            }
        }
    }

    /// Overlay the particle cloud.
    pub fn draw_particles(&mut self, particles: &[Particle]) {
        for p in particles {
            let (px, py) = self.to_px(p.position);
            let _ = writeln!(
                self.body,
                r#"  <circle cx="{:.1}" cy="{:.1}" r="{}" fill="{}" fill-opacity="0.5"/>"#,
                px, py, self.config.particle_radius, self.config.colors.particle
            );
        }
    }

    /// Overlay posterior mass (opacity proportional to cell mass).
    pub fn draw_posterior(&mut self, posterior: &[f64], field: &BathymetricGrid) {
        let (nx, ny) = field.dimensions();
        let peak = posterior.iter().cloned().fold(0.0, f64::max);
        if peak <= 0.0 {
            return;
        }

        for ix in 0..nx {
            for iy in 0..ny {
                let opacity = posterior[ix * ny + iy] / peak;
                if opacity < 0.01 {
                    continue;
                }
                let (px, py) = self.to_px(field.node_position(ix, iy));
                let _ = writeln!(
                    self.body,
                    r#"  <circle cx="{:.1}" cy="{:.1}" r="{}" fill="{}" fill-opacity="{:.2}"/>"#,
                    px,
                    py,
                    self.config.marker_radius * 0.6,
                    self.config.colors.posterior,
                    0.7 * opacity
                );
            }
        }
    }

    /// Draw a position marker.
    pub fn draw_marker(&mut self, position: Point2D, color: &str, label: Option<&str>) {
        let (px, py) = self.to_px(position);
        let _ = writeln!(
            self.body,
            r#"  <circle cx="{:.1}" cy="{:.1}" r="{}" fill="{}"/>"#,
            px, py, self.config.marker_radius, color
        );
        if let Some(label) = label {
            let _ = writeln!(
                self.body,
                r#"  <text x="{:.1}" y="{:.1}" font-size="11" fill="{}">{}</text>"#,
                px + self.config.marker_radius + 2.0,
                py,
                color,
                label
            );
        }
    }

    /// Draw an estimate: marker plus radial uncertainty circle.
    pub fn draw_estimate(&mut self, estimate: &Estimate) {
        let (px, py) = self.to_px(estimate.position);
        let _ = writeln!(
            self.body,
            r#"  <circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}" fill-opacity="0.15" stroke="{}" stroke-width="1"/>"#,
            px,
            py,
            estimate.spread * self.config.scale,
            self.config.colors.estimate,
            self.config.colors.estimate
        );
        let color = self.config.colors.estimate;
        self.draw_marker(estimate.position, color, Some("estimate"));
    }

    /// Finish the snapshot and return the SVG document.
    pub fn render(&self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"{:.0}\" \
             viewBox=\"0 0 {:.0} {:.0}\">\n<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n{}</svg>\n",
            self.width_px, self.height_px, self.width_px, self.height_px, self.body
        )
    }

    /// Render and write to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        fs::write(path, self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Point2D;
    use crate::sim::maps;

    #[test]
    fn test_render_contains_expected_elements() {
        let field = maps::constant_basin(4, 10.0, -10.0);
        let mut viz = SvgVisualizer::new(SvgConfig::default(), &field);
        viz.draw_depth_field(&field);
        viz.draw_particles(&[Particle::new(Point2D::new(5.0, 5.0))]);
        viz.draw_marker(Point2D::new(15.0, 15.0), "#111111", Some("truth"));
        viz.draw_estimate(&Estimate::new(Point2D::new(10.0, 10.0), 3.0));

        let svg = viz.render();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>\n"));
        assert!(svg.contains("<rect"));
        assert!(svg.contains("<circle"));
        assert!(svg.contains("truth"));
        assert!(svg.contains("estimate"));
    }

    #[test]
    fn test_y_axis_points_up() {
        let field = maps::constant_basin(4, 10.0, -10.0);
        let viz = SvgVisualizer::new(SvgConfig::default(), &field);
        let (_, py_low) = viz.to_px(Point2D::new(0.0, 0.0));
        let (_, py_high) = viz.to_px(Point2D::new(0.0, 30.0));
        assert!(py_high < py_low, "larger y must render higher on screen");
    }

    #[test]
    fn test_save_writes_file() {
        let field = maps::constant_basin(3, 10.0, -10.0);
        let mut viz = SvgVisualizer::new(SvgConfig::default(), &field);
        viz.draw_depth_field(&field);

        let path = std::env::temp_dir().join("bathynav_svg_test.svg");
        viz.save(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("</svg>"));
        let _ = std::fs::remove_file(&path);
    }
}
