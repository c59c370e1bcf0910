use std::fs;
use std::path::{Path, PathBuf};

use dora_core::error::{DoraError, Result};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::chart::{BarChart, parse_hex_color};

pub trait ChartRenderer {
    fn render(&mut self, canvas_id: &str, chart: &BarChart) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct SvgRenderer {
    out_dir: PathBuf,
    width: u32,
    height: u32,
}

impl SvgRenderer {
    pub fn new(out_dir: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            out_dir: out_dir.into(),
            width,
            height,
        }
    }

    pub fn canvas_path(&self, canvas_id: &str) -> PathBuf {
        self.out_dir.join(format!("{canvas_id}.svg"))
    }

    fn locate_canvas(&self, canvas_id: &str) -> Result<PathBuf> {
        if canvas_id.is_empty() || canvas_id.contains(['/', '\\']) {
            return Err(DoraError::Render(format!("invalid canvas id {canvas_id:?}")));
        }
        if !self.out_dir.is_dir() {
            return Err(DoraError::Render(format!(
                "canvas #{canvas_id} not found: {} is not a directory",
                self.out_dir.display()
            )));
        }
        Ok(self.canvas_path(canvas_id))
    }
}

impl ChartRenderer for SvgRenderer {
    fn render(&mut self, canvas_id: &str, chart: &BarChart) -> Result<()> {
        let path = self.locate_canvas(canvas_id)?;
        let svg = render_svg(chart, self.width, self.height)?;
        write_canvas(&path, &svg)
    }
}

fn write_canvas(path: &Path, svg: &str) -> Result<()> {
    fs::write(path, svg).map_err(|e| DoraError::Io(format!("write {}: {e}", path.display())))
}

pub fn render_svg(chart: &BarChart, width: u32, height: u32) -> Result<String> {
    let colors = chart
        .datasets
        .first()
        .map(|d| {
            d.background_color
                .iter()
                .map(|c| parse_hex_color(c).map(|(r, g, b)| RGBColor(r, g, b)))
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw_bar_chart(&root, chart, &colors).map_err(|e| DoraError::Render(e.to_string()))?;
        root.present()
            .map_err(|e| DoraError::Render(e.to_string()))?;
    }

    if chart.options.responsive {
        svg = make_responsive(&svg, width, height);
    }
    Ok(svg)
}

fn draw_bar_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &BarChart,
    colors: &[RGBColor],
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let Some(dataset) = chart.datasets.first() else {
        return Ok(());
    };
    let bars = dataset.bars();
    let categories = chart.labels.len().max(dataset.data.len()).max(1);
    let (y_min, y_max) = y_range(&bars, chart.options.y_begin_at_zero);

    let mut ctx = ChartBuilder::on(root)
        .caption(&dataset.label, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..categories as f64, y_min..y_max)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .draw()?;

    ctx.draw_series(bars.iter().map(|&(i, value)| {
        let color = colors.get(i % colors.len().max(1)).copied().unwrap_or(BLUE);
        let x = i as f64;
        Rectangle::new([(x + 0.15, 0.0), (x + 0.85, value)], color.filled())
    }))?;

    let label_style = TextStyle::from(("sans-serif", 14).into_font())
        .pos(Pos::new(HPos::Center, VPos::Top));
    for (i, label) in chart.labels.iter().enumerate() {
        let (px, py) = ctx.backend_coord(&(i as f64 + 0.5, y_min));
        root.draw(&Text::new(label.clone(), (px, py + 8), label_style.clone()))?;
    }

    Ok(())
}

const AXIS_LIMIT: f64 = 1e300;

fn y_range(bars: &[(usize, f64)], begin_at_zero: bool) -> (f64, f64) {
    let max = bars.iter().map(|b| b.1).fold(f64::NEG_INFINITY, f64::max);
    let min = bars.iter().map(|b| b.1).fold(f64::INFINITY, f64::min);
    if bars.is_empty() {
        return (0.0, 1.0);
    }

    let low = if begin_at_zero { min.min(0.0) } else { min };
    let high = if begin_at_zero { max.max(0.0) } else { max };
    let low = low.clamp(-AXIS_LIMIT, AXIS_LIMIT);
    let high = high.clamp(-AXIS_LIMIT, AXIS_LIMIT);
    let span = high - low;
    let pad = if span == 0.0 {
        (high.abs() * 0.1).max(1.0)
    } else {
        span * 0.1
    };
    let low = if begin_at_zero && low == 0.0 { 0.0 } else { low - pad };
    (low, high + pad)
}

fn make_responsive(svg: &str, width: u32, height: u32) -> String {
    let fixed = format!(r#"width="{width}" height="{height}""#);
    let mut out = svg.replacen(
        &fixed,
        r#"width="100%" height="100%" preserveAspectRatio="xMidYMid meet""#,
        1,
    );
    if !out.contains("viewBox") {
        out = out.replacen("<svg ", &format!(r#"<svg viewBox="0 0 {width} {height}" "#), 1);
    }
    out
}
