//! Visualization utilities for ladder_planning
//!
//! Plots planar arm poses, circle obstacles and end-effector paths with gnuplot.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::arm_navigation::{CircleObstacle, LinkSegment};
use crate::common::{Path2D, Point2D, RoboticsError, RoboticsResult};

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00FF00";
    pub const BLUE: &str = "#0000FF";
    pub const GRAY: &str = "#808080";

    // Semantic colors
    pub const OBSTACLE: &str = BLACK;
    pub const PATH: &str = RED;
    pub const ARM: &str = GRAY;
    pub const JOINT: &str = BLUE;
}

/// Style for path rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::new(colors::PATH, "Path")
    }
}

/// Main visualizer struct
pub struct Visualizer {
    figure: Figure,
    title: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            figure: Figure::new(),
            title: String::new(),
            x_range: None,
            y_range: None,
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    /// Square view of +-`half_width` around the origin
    pub fn set_workspace(&mut self, half_width: f64) -> &mut Self {
        self.x_range = Some((-half_width, half_width));
        self.y_range = Some((-half_width, half_width));
        self
    }

    pub fn plot_path(&mut self, path: &Path2D, style: &PathStyle) -> &mut Self {
        self.figure.axes2d().lines(
            &path.x_coords(),
            &path.y_coords(),
            &[
                Caption(&style.caption),
                Color(&style.color),
                LineWidth(style.line_width),
            ],
        );
        self
    }

    /// Outline every obstacle as a polygon
    pub fn plot_obstacles(&mut self, obstacles: &[CircleObstacle]) -> &mut Self {
        const SIDES: usize = 36;
        for (i, obstacle) in obstacles.iter().enumerate() {
            let (x, y): (Vec<f64>, Vec<f64>) = (0..=SIDES)
                .map(|k| {
                    let a = 2.0 * std::f64::consts::PI * k as f64 / SIDES as f64;
                    (
                        obstacle.center.x + obstacle.radius * a.cos(),
                        obstacle.center.y + obstacle.radius * a.sin(),
                    )
                })
                .unzip();
            let caption = if i == 0 { "Obstacles" } else { "" };
            self.figure.axes2d().lines(
                &x,
                &y,
                &[Caption(caption), Color(colors::OBSTACLE), LineWidth(2.0)],
            );
        }
        self
    }

    /// Draw one arm pose as its links and joints
    pub fn plot_arm(&mut self, segments: &[LinkSegment], color: &str) -> &mut Self {
        let mut x = Vec::with_capacity(segments.len() + 1);
        let mut y = Vec::with_capacity(segments.len() + 1);
        if let Some(first) = segments.first() {
            x.push(first.start.x);
            y.push(first.start.y);
        }
        for s in segments {
            x.push(s.end.x);
            y.push(s.end.y);
        }
        let axes = self.figure.axes2d();
        axes.lines(&x, &y, &[Color(color), LineWidth(1.0)]);
        axes.points(&x, &y, &[Color(colors::JOINT), PointSymbol('O'), PointSize(0.5)]);
        self
    }

    pub fn plot_point(&mut self, point: Point2D, color: &str, caption: &str) -> &mut Self {
        self.figure.axes2d().points(
            &[point.x],
            &[point.y],
            &[Caption(caption), Color(color), PointSymbol('*'), PointSize(1.5)],
        );
        self
    }

    /// Save plot to PNG file
    pub fn save_png(&mut self, path: &str, width: u32, height: u32) -> RoboticsResult<()> {
        self.apply_settings();
        self.figure
            .save_to_png(path, width, height)
            .map_err(|e| RoboticsError::VisualizationError(e.to_string()))
    }

    fn apply_settings(&mut self) {
        let axes = self.figure.axes2d();

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label("X [m]", &[]);
        axes.set_y_label("Y [m]", &[]);

        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.y_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        axes.set_aspect_ratio(AutoOption::Fix(1.0));
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visualizer_workspace() {
        let mut vis = Visualizer::new();
        vis.set_workspace(2.5).set_title("Ladder");
        assert_eq!(vis.x_range, Some((-2.5, 2.5)));
        assert_eq!(vis.title, "Ladder");
    }

    #[test]
    fn test_path_style() {
        let style = PathStyle::new(colors::RED, "Test Path").with_line_width(3.0);
        assert_eq!(style.line_width, 3.0);
        assert_eq!(style.color, colors::RED);
    }
}
