mod cell_data;

use std::fmt;
use std::sync::Arc;

use log::warn;
use ndarray::ArrayD;

pub use self::cell_data::CellData;
use crate::error::PlotError;

/// Coordinate/value pairs of a scatter or line plot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScatterSeries {
    pub coords: Vec<f64>,
    pub values: Vec<f64>,
}

/// Maps the cells of a patch to a scatter series. Called once per
/// patch and frame in no particular order, so it must be pure.
#[derive(Clone)]
pub struct Reduction(Arc<dyn Fn(&CellData) -> ScatterSeries + Send + Sync>);

impl Reduction {
    pub fn new(f: impl Fn(&CellData) -> ScatterSeries + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reduction")
    }
}

/// A derived scalar field, computed per cell.
#[derive(Clone)]
pub struct CellFunction(Arc<dyn Fn(&CellData) -> ArrayD<f64> + Send + Sync>);

impl CellFunction {
    pub fn new(f: impl Fn(&CellData) -> ArrayD<f64> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for CellFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CellFunction")
    }
}

#[derive(Clone, Debug)]
pub enum PlotVariable {
    /// Component of the conserved quantities.
    Index(usize),
    Function(CellFunction),
}

impl PlotVariable {
    fn values(&self, cells: &CellData) -> Result<ArrayD<f64>, PlotError> {
        match self {
            PlotVariable::Index(index) => Ok(cells.component(*index)?.to_owned()),
            PlotVariable::Function(f) => Ok((f.0)(cells)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Limits {
    Auto,
    Range(f64, f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColorScale {
    pub colormap: String,
    /// Values outside `[min, max]` are clipped. `None` means the
    /// range of the data.
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub add_colorbar: bool,
}

impl ColorScale {
    pub fn new(colormap: &str, min: f64, max: f64) -> Self {
        Self {
            colormap: colormap.into(),
            min: Some(min),
            max: Some(max),
            add_colorbar: true,
        }
    }
}

#[derive(Clone, Debug)]
pub enum PlotType {
    /// Two dimensional pseudocolor plot of the variable.
    Colormap(ColorScale),
    /// The variable along a one dimensional domain.
    Line,
    /// A scatter plot of two dimensional data, reduced to coordinate
    /// and value pairs.
    Scatter(Reduction),
}

impl PlotType {
    pub fn name(&self) -> &'static str {
        match self {
            PlotType::Colormap(_) => "colormap",
            PlotType::Line => "line",
            PlotType::Scatter(_) => "scatter",
        }
    }
}

/// One flag per refinement level, starting at level 1. The last flag
/// also applies to all finer levels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelFlags(pub Vec<bool>);

impl LevelFlags {
    pub fn all(shown: bool) -> Self {
        Self(vec![shown])
    }

    pub fn shown_on(&self, level: usize) -> bool {
        match self.0.last() {
            None => false,
            Some(last) => *self.0.get(level.saturating_sub(1)).unwrap_or(last),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmrDisplay {
    pub patch_edges: LevelFlags,
    pub cell_edges: LevelFlags,
    pub data: LevelFlags,
}

impl Default for AmrDisplay {
    fn default() -> Self {
        Self {
            patch_edges: LevelFlags::all(false),
            cell_edges: LevelFlags::all(false),
            data: LevelFlags::all(true),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Style {
    pub color: Option<String>,
    pub marker: Option<String>,
}

/// What an item evaluates to on one patch.
#[derive(Clone, Debug, PartialEq)]
pub enum PlotData {
    Field(ArrayD<f64>),
    Series(ScatterSeries),
}

#[derive(Clone, Debug)]
pub struct PlotItemSpec {
    pub plot_type: PlotType,
    pub variable: PlotVariable,
    pub style: Style,
    pub show: bool,
    pub amr: AmrDisplay,
}

impl PlotItemSpec {
    pub fn new(plot_type: PlotType, variable: PlotVariable) -> Self {
        Self {
            plot_type,
            variable,
            style: Style::default(),
            show: true,
            amr: AmrDisplay::default(),
        }
    }

    pub fn with_style(mut self, color: &str, marker: &str) -> Self {
        self.style = Style {
            color: Some(color.into()),
            marker: Some(marker.into()),
        };
        self
    }

    pub fn with_amr(mut self, amr: AmrDisplay) -> Self {
        self.amr = amr;
        self
    }

    pub fn shown(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    /// Evaluates the item on the cells of one patch.
    pub fn evaluate(&self, cells: &CellData) -> Result<PlotData, PlotError> {
        let unsupported = || PlotError::UnsupportedDimension {
            plot_type: self.plot_type.name(),
            num_dim: cells.num_dim(),
        };
        match &self.plot_type {
            PlotType::Colormap(_) => {
                if cells.num_dim() != 2 {
                    return Err(unsupported());
                }
                Ok(PlotData::Field(self.variable.values(cells)?))
            }
            PlotType::Line => {
                if cells.num_dim() != 1 {
                    return Err(unsupported());
                }
                let values = self.variable.values(cells)?;
                Ok(PlotData::Series(ScatterSeries {
                    coords: cells.center(0).iter().copied().collect(),
                    values: values.iter().copied().collect(),
                }))
            }
            PlotType::Scatter(reduction) => {
                if cells.num_dim() < 2 {
                    return Err(unsupported());
                }
                let series = (reduction.0)(cells);
                if series.coords.len() != series.values.len() {
                    return Err(PlotError::LengthMismatch {
                        num_coords: series.coords.len(),
                        num_values: series.values.len(),
                    });
                }
                Ok(PlotData::Series(series))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection<T> {
    All,
    Only(Vec<T>),
}

impl<T: PartialEq> Selection<T> {
    pub fn contains(&self, item: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(items) => items.contains(item),
        }
    }
}

/// Drawn on top of the axes after all items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AxesDecoration {
    GaugeLocations {
        gauges: Selection<u64>,
        format: String,
        add_labels: bool,
    },
}

#[derive(Clone, Debug)]
pub struct AxesSpec {
    pub title: String,
    pub xlimits: Limits,
    pub ylimits: Limits,
    /// Keep an aspect ratio of 1.
    pub scaled: bool,
    pub decoration: Option<AxesDecoration>,
    pub items: Vec<PlotItemSpec>,
}

impl AxesSpec {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.into(),
            xlimits: Limits::Auto,
            ylimits: Limits::Auto,
            scaled: false,
            decoration: None,
            items: vec![],
        }
    }

    pub fn limits(mut self, xlimits: Limits, ylimits: Limits) -> Self {
        self.xlimits = xlimits;
        self.ylimits = ylimits;
        self
    }

    pub fn scaled(mut self, scaled: bool) -> Self {
        self.scaled = scaled;
        self
    }

    pub fn decoration(mut self, decoration: AxesDecoration) -> Self {
        self.decoration = Some(decoration);
        self
    }

    pub fn item(mut self, item: PlotItemSpec) -> Self {
        self.items.push(item);
        self
    }
}

#[derive(Clone, Debug)]
pub struct FigureSpec {
    pub number: usize,
    pub name: String,
    pub show: bool,
    pub axes: Vec<AxesSpec>,
}

impl FigureSpec {
    pub fn new(name: &str, number: usize) -> Self {
        Self {
            number,
            name: name.into(),
            show: true,
            axes: vec![],
        }
    }

    pub fn shown(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    pub fn axes(mut self, axes: AxesSpec) -> Self {
        self.axes.push(axes);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovieStyle {
    JsAnimation,
    Legacy,
}

/// Settings for printing the figures and assembling html and latex
/// reports from them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportSettings {
    pub print_figures: bool,
    pub print_format: String,
    pub frames: Selection<usize>,
    pub figures: Selection<usize>,
    pub html: bool,
    pub html_homelink: String,
    pub html_movie: MovieStyle,
    pub latex: bool,
    pub latex_figures_per_line: usize,
    pub latex_frames_per_line: usize,
    pub latex_make_pdf: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            print_figures: true,
            print_format: "png".into(),
            frames: Selection::All,
            figures: Selection::All,
            html: true,
            html_homelink: "../README.html".into(),
            html_movie: MovieStyle::JsAnimation,
            latex: true,
            latex_figures_per_line: 2,
            latex_frames_per_line: 1,
            latex_make_pdf: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PlotSpec {
    figures: Vec<FigureSpec>,
    report: ReportSettings,
}

impl PlotSpec {
    pub fn figures(&self) -> &[FigureSpec] {
        &self.figures
    }

    pub fn figure(&self, number: usize) -> Option<&FigureSpec> {
        self.figures.iter().find(|f| f.number == number)
    }

    /// Figures that are shown and selected for printing.
    pub fn printed_figures(&self) -> impl Iterator<Item = &FigureSpec> {
        self.figures
            .iter()
            .filter(move |f| f.show && self.report.figures.contains(&f.number))
    }

    pub fn report(&self) -> &ReportSettings {
        &self.report
    }
}

#[derive(Default)]
pub struct PlotSpecBuilder {
    figures: Vec<FigureSpec>,
    report: ReportSettings,
}

impl PlotSpecBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a figure. A figure with the same number is replaced but
    /// keeps its position.
    pub fn add_figure(&mut self, figure: FigureSpec) -> &mut Self {
        match self.figures.iter_mut().find(|f| f.number == figure.number) {
            Some(existing) => {
                warn!(
                    "Figure number {} is used twice, replacing '{}' with '{}'",
                    figure.number, existing.name, figure.name
                );
                *existing = figure;
            }
            None => self.figures.push(figure),
        }
        self
    }

    pub fn report(&mut self, report: ReportSettings) -> &mut Self {
        self.report = report;
        self
    }

    pub fn build(&self) -> PlotSpec {
        PlotSpec {
            figures: self.figures.clone(),
            report: self.report.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::ArrayD;
    use ndarray::IxDyn;

    use super::AxesSpec;
    use super::CellData;
    use super::CellFunction;
    use super::ColorScale;
    use super::FigureSpec;
    use super::LevelFlags;
    use super::PlotData;
    use super::PlotItemSpec;
    use super::PlotSpecBuilder;
    use super::PlotType;
    use super::PlotVariable;
    use super::Reduction;
    use super::ReportSettings;
    use super::ScatterSeries;
    use super::Selection;
    use crate::error::PlotError;

    fn patch_2d() -> CellData {
        let q = ArrayD::from_shape_fn(IxDyn(&[2, 3, 2]), |i| (i[0] * 100 + i[1] * 10 + i[2]) as f64);
        CellData::uniform(&[0.0, 0.0], &[3.0, 2.0], q).unwrap()
    }

    fn colormap(index: usize) -> PlotItemSpec {
        PlotItemSpec::new(
            PlotType::Colormap(ColorScale::new("blue_white_red", -1.0, 1.0)),
            PlotVariable::Index(index),
        )
    }

    #[test]
    fn level_flags_repeat_last_entry() {
        let flags = LevelFlags(vec![true, true, false]);
        assert!(flags.shown_on(1));
        assert!(flags.shown_on(2));
        assert!(!flags.shown_on(3));
        assert!(!flags.shown_on(7));
        assert!(LevelFlags(vec![true]).shown_on(5));
        assert!(!LevelFlags(vec![]).shown_on(1));
    }

    #[test]
    fn colormap_of_component() {
        let data = colormap(1).evaluate(&patch_2d()).unwrap();
        match data {
            PlotData::Field(field) => {
                assert_eq!(field.shape(), &[3, 2]);
                assert_eq!(field[[2, 1]], 121.0);
            }
            _ => panic!("expected a field"),
        }
    }

    #[test]
    fn variable_out_of_range() {
        assert_eq!(
            colormap(2).evaluate(&patch_2d()).unwrap_err(),
            PlotError::VariableOutOfRange {
                index: 2,
                num_eqn: 2
            }
        );
    }

    #[test]
    fn derived_variable() {
        let item = PlotItemSpec::new(
            PlotType::Colormap(ColorScale::new("yellow_red_blue", 0.0, 1.0)),
            PlotVariable::Function(CellFunction::new(|cells| {
                let x = cells.center(0);
                let y = cells.center(1);
                &x * &x + &y * &y
            })),
        );
        match item.evaluate(&patch_2d()).unwrap() {
            PlotData::Field(field) => assert_eq!(field[[0, 0]], 0.5),
            _ => panic!("expected a field"),
        }
    }

    #[test]
    fn scatter_lengths_must_agree() {
        let item = PlotItemSpec::new(
            PlotType::Scatter(Reduction::new(|cells| ScatterSeries {
                coords: cells.center(0).iter().copied().collect(),
                values: vec![1.0],
            })),
            PlotVariable::Index(0),
        );
        assert_eq!(
            item.evaluate(&patch_2d()).unwrap_err(),
            PlotError::LengthMismatch {
                num_coords: 6,
                num_values: 1
            }
        );
    }

    #[test]
    fn plot_type_must_fit_dimension() {
        let q = ArrayD::zeros(IxDyn(&[1, 5]));
        let line = CellData::uniform(&[0.0], &[1.0], q).unwrap();
        assert!(matches!(
            colormap(0).evaluate(&line),
            Err(PlotError::UnsupportedDimension { .. })
        ));
        let item = PlotItemSpec::new(PlotType::Line, PlotVariable::Index(0));
        match item.evaluate(&line).unwrap() {
            PlotData::Series(series) => {
                assert_eq!(series.coords.len(), 5);
                assert_eq!(series.values, vec![0.0; 5]);
            }
            _ => panic!("expected a series"),
        }
    }

    #[test]
    fn duplicate_figure_numbers_replace_in_place() {
        let mut builder = PlotSpecBuilder::new();
        builder
            .add_figure(FigureSpec::new("Pressure", 0))
            .add_figure(FigureSpec::new("Velocity", 2))
            .add_figure(FigureSpec::new("Density", 0).axes(AxesSpec::new("Density").item(colormap(0))));
        let spec = builder.build();
        let names: Vec<_> = spec.figures().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Density", "Velocity"]);
        assert_eq!(spec.figure(0).unwrap().axes[0].items.len(), 1);
    }

    #[test]
    fn printed_figures_follow_selection() {
        let mut builder = PlotSpecBuilder::new();
        builder
            .add_figure(FigureSpec::new("a", 0))
            .add_figure(FigureSpec::new("b", 1).shown(false))
            .add_figure(FigureSpec::new("c", 2))
            .report(ReportSettings {
                figures: Selection::Only(vec![1, 2]),
                ..Default::default()
            });
        let spec = builder.build();
        let printed: Vec<_> = spec.printed_figures().map(|f| f.number).collect();
        assert_eq!(printed, vec![2]);
    }
}
