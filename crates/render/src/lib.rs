pub mod chart;
pub mod loader;
pub mod source;
pub mod svg;

pub use chart::BarChart;
pub use loader::{LoadState, RenderTarget, load_and_render};
pub use source::MetricsSource;
pub use svg::{ChartRenderer, SvgRenderer};
