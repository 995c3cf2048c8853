//! Ready-made configurations for acoustic waves in a pipe section,
//! driven by a transducer. Resolution and gauge placement are left
//! as choices.
use ndarray::Axis;
use serde_yaml::Mapping;
use serde_yaml::Value;

use crate::parameters::Gauge;
use crate::parameters::Override;
use crate::plot::AmrDisplay;
use crate::plot::AxesDecoration;
use crate::plot::AxesSpec;
use crate::plot::CellData;
use crate::plot::ColorScale;
use crate::plot::FigureSpec;
use crate::plot::LevelFlags;
use crate::plot::Limits;
use crate::plot::PlotItemSpec;
use crate::plot::PlotSpec;
use crate::plot::PlotSpecBuilder;
use crate::plot::PlotType;
use crate::plot::PlotVariable;
use crate::plot::Reduction;
use crate::plot::ReportSettings;
use crate::plot::ScatterSeries;
use crate::plot::Selection;
use crate::run_config::RunConfigBuilder;

/// Cells along the pipe axis. The cross section gets a quarter of
/// these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Coarse,
    Medium,
    Fine,
    Finest,
}

impl Resolution {
    pub fn num_cells_x(&self) -> usize {
        match self {
            Resolution::Coarse => 43,
            Resolution::Medium => 86,
            Resolution::Fine => 172,
            Resolution::Finest => 344,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GaugeLayout {
    None,
    /// Seven gauges equally spaced along the axis.
    AlongAxis,
    /// Four gauges, two on the axis and two off it.
    Scattered,
}

/// Gauges record for the whole run.
const GAUGE_T_END: f64 = 1e9;

impl GaugeLayout {
    pub fn gauges(&self) -> Vec<Gauge> {
        match self {
            GaugeLayout::None => vec![],
            GaugeLayout::AlongAxis => {
                let (start, end, num) = (0.12, 0.18, 7);
                (0..num)
                    .map(|j| {
                        let x = start + (end - start) * j as f64 / (num - 1) as f64;
                        Gauge::new(j, &[x, 0.0], 0.0, GAUGE_T_END)
                    })
                    .collect()
            }
            GaugeLayout::Scattered => vec![
                Gauge::new(1, &[0.15, 0.0], 0.0, GAUGE_T_END),
                Gauge::new(2, &[0.19, 0.0], 0.0, GAUGE_T_END),
                Gauge::new(3, &[0.15, 0.04], 0.0, GAUGE_T_END),
                Gauge::new(4, &[0.19, 0.02 * 2.0f64.sqrt()], 0.0, GAUGE_T_END),
            ],
        }
    }
}

fn mapping<const N: usize>(entries: [(&str, Value); N]) -> Value {
    let mut map = Mapping::new();
    for (key, value) in entries {
        map.insert(key.into(), value);
    }
    Value::Mapping(map)
}

fn set(builder: &mut RunConfigBuilder, section: &str, keys: &[&str], value: impl Into<Value>) {
    builder.add_override(Override::new(section, keys.iter().copied(), value));
}

/// Third order acoustics in a quarter of the pipe cross section with
/// three levels of refinement.
pub fn pipe_acoustics(resolution: Resolution, gauge_layout: GaugeLayout) -> RunConfigBuilder {
    let mut b = RunConfigBuilder::new();
    set(&mut b, "problem", &["params", "rho", "value"], 1000.0);
    set(&mut b, "problem", &["params", "rho", "description"], "density of medium");
    set(&mut b, "problem", &["params", "bulk", "value"], 2.202256e-3);
    set(&mut b, "problem", &["params", "bulk", "description"], "bulk modulus");

    set(&mut b, "grid", &["num_dim"], 2);
    set(&mut b, "grid", &["lower"], vec![0.08, 0.0]);
    set(
        &mut b,
        "grid",
        &["upper"],
        vec![
            Value::from(0.23),
            mapping([
                ("fraction_of_extent", Value::from(0.25)),
                ("dim", Value::from(0)),
            ]),
        ],
    );
    set(
        &mut b,
        "grid",
        &["num_cells"],
        vec![
            Value::from(resolution.num_cells_x() as u64),
            mapping([
                ("fraction_of_cells", Value::from(0.25)),
                ("dim", Value::from(0)),
            ]),
        ],
    );
    set(&mut b, "grid", &["num_eqn"], 3);
    set(&mut b, "grid", &["num_aux"], 0);

    set(&mut b, "time", &["t0"], 0.0);
    set(&mut b, "time", &["output_times", "style"], "equally_spaced");
    set(&mut b, "time", &["output_times", "num_output_times"], 10);
    set(&mut b, "time", &["output_times", "tfinal"], 50.0);
    set(&mut b, "time", &["output_times", "output_t0"], true);
    set(&mut b, "time", &["dt_variable"], true);
    set(&mut b, "time", &["dt_initial"], 1.5e-8);
    set(&mut b, "time", &["dt_max"], 1.0e99);
    set(&mut b, "time", &["cfl_desired"], 0.9);
    set(&mut b, "time", &["cfl_max"], 1.0);
    set(&mut b, "time", &["steps_max"], 50000);
    set(&mut b, "time", &["restart"], false);
    set(&mut b, "time", &["restart_file"], "fort.chk00006");

    set(&mut b, "output", &["output_format"], "ascii");
    set(&mut b, "output", &["output_q_components"], "all");
    set(&mut b, "output", &["output_aux_components"], "none");
    set(&mut b, "output", &["output_aux_onlyonce"], true);
    set(&mut b, "output", &["verbosity"], 1);

    set(&mut b, "method", &["order"], 3);
    set(&mut b, "method", &["dimensional_split"], "unsplit");
    set(&mut b, "method", &["transverse_waves"], 2);
    set(&mut b, "method", &["num_waves"], 2);
    set(&mut b, "method", &["limiter"], vec!["none", "none"]);
    set(&mut b, "method", &["use_fwaves"], false);
    set(&mut b, "method", &["source_split"], 1);

    set(&mut b, "boundary", &["num_ghost"], 2);
    set(&mut b, "boundary", &["bc_lower"], vec!["extrap", "wall"]);
    set(&mut b, "boundary", &["bc_upper"], vec!["extrap", "extrap"]);

    for (i, gauge) in gauge_layout.gauges().into_iter().enumerate() {
        let index = i.to_string();
        set(&mut b, "gauges", &["gauges", index.as_str(), "id"], gauge.id);
        set(&mut b, "gauges", &["gauges", index.as_str(), "location"], gauge.location);
        set(&mut b, "gauges", &["gauges", index.as_str(), "t_start"], gauge.t_start);
        set(&mut b, "gauges", &["gauges", index.as_str(), "t_end"], gauge.t_end);
    }

    set(&mut b, "checkpoint", &["schedule", "style"], "times");
    set(&mut b, "checkpoint", &["schedule", "times"], vec![20.0, 47.0]);

    set(&mut b, "amr", &["amr_levels_max"], 3);
    set(&mut b, "amr", &["refinement_ratios_x"], vec![8, 8]);
    set(&mut b, "amr", &["refinement_ratios_y"], vec![8, 8]);
    set(&mut b, "amr", &["refinement_ratios_t"], vec![8, 8]);
    set(&mut b, "amr", &["aux_type"], Vec::<Value>::new());
    set(&mut b, "amr", &["flag_richardson"], false);
    set(&mut b, "amr", &["flag_richardson_tol"], 1.0);
    set(&mut b, "amr", &["flag2refine"], true);
    set(&mut b, "amr", &["flag2refine_tol"], 5e-9);
    set(&mut b, "amr", &["regrid_interval"], 2);
    set(&mut b, "amr", &["regrid_buffer_width"], 3);
    set(&mut b, "amr", &["clustering_cutoff"], 0.7);
    set(&mut b, "amr", &["verbosity_regrid"], 0);
    b
}

/// Distance from the pipe axis against pressure, one point per cell.
fn pressure_vs_radius(cells: &CellData) -> ScatterSeries {
    let x = cells.center(0);
    let y = cells.center(1);
    let coords = x
        .iter()
        .zip(y.iter())
        .map(|(x, y)| (x * x + y * y).sqrt())
        .collect();
    let values = cells.q().index_axis(Axis(0), 0).iter().copied().collect();
    ScatterSeries { coords, values }
}

fn field_figure(name: &str, number: usize, variable: usize, min: f64, max: f64) -> FigureSpec {
    let amr = AmrDisplay {
        patch_edges: LevelFlags::all(false),
        cell_edges: LevelFlags::all(false),
        data: LevelFlags(vec![true, true, false]),
    };
    let gauge_locations = AxesDecoration::GaugeLocations {
        gauges: Selection::All,
        format: "ko".into(),
        add_labels: true,
    };
    FigureSpec::new(name, number).axes(
        AxesSpec::new(name)
            .scaled(true)
            .decoration(gauge_locations)
            .item(
                PlotItemSpec::new(
                    PlotType::Colormap(ColorScale::new("blue_white_red", min, max)),
                    PlotVariable::Index(variable),
                )
                .with_amr(amr),
            ),
    )
}

/// Pressure and horizontal velocity with the gauge locations, and a
/// hidden scatter plot of pressure against the distance from the axis.
pub fn pipe_acoustics_plots() -> PlotSpec {
    let mut builder = PlotSpecBuilder::new();
    builder
        .add_figure(field_figure("Pressure", 0, 0, -1.0e-6, 6.0e-6))
        .add_figure(field_figure("Horizontal Velocity", 2, 1, -3.0e-6, 4.0e-6))
        .add_figure(
            FigureSpec::new("scatter", 4).shown(false).axes(
                AxesSpec::new("Scatter plot")
                    .limits(Limits::Range(0.0, 1.5), Limits::Range(-2.0, 4.0))
                    .item(
                        PlotItemSpec::new(
                            PlotType::Scatter(Reduction::new(pressure_vs_radius)),
                            PlotVariable::Index(0),
                        )
                        .with_style("b", "o"),
                    ),
            ),
        )
        .report(ReportSettings::default());
    builder.build()
}

#[cfg(test)]
mod tests {
    use ndarray::ArrayD;
    use ndarray::IxDyn;

    use super::pipe_acoustics;
    use super::pipe_acoustics_plots;
    use crate::plot::CellData;
    use crate::plot::Limits;
    use crate::plot::PlotData;
    use crate::plot::PlotType;
    use super::GaugeLayout;
    use super::Resolution;
    use crate::parameters::CheckpointStyle;
    use crate::test_utils::assert_float_is_close;
    use crate::tokens::Limiter;
    use crate::tokens::SourceSplit;

    #[test]
    fn every_combination_builds() {
        for resolution in [
            Resolution::Coarse,
            Resolution::Medium,
            Resolution::Fine,
            Resolution::Finest,
        ] {
            for layout in [GaugeLayout::None, GaugeLayout::AlongAxis, GaugeLayout::Scattered] {
                let config = pipe_acoustics(resolution, layout).build().unwrap();
                assert_eq!(config.grid().num_cells[0], resolution.num_cells_x());
                assert_eq!(config.gauges().len(), layout.gauges().len());
            }
        }
    }

    #[test]
    fn cross_section_follows_resolution() {
        let config = pipe_acoustics(Resolution::Fine, GaugeLayout::None)
            .build()
            .unwrap();
        assert_eq!(config.grid().num_cells, vec![172, 43]);
        assert_float_is_close(config.grid().upper[1], 0.0375);
    }

    #[test]
    fn method_and_checkpoints() {
        let config = pipe_acoustics(Resolution::Medium, GaugeLayout::AlongAxis)
            .build()
            .unwrap();
        assert_eq!(config.method().order, 3);
        assert_eq!(config.method().limiter, vec![Limiter::None, Limiter::None]);
        assert_eq!(config.method().source_split, SourceSplit::Godunov);
        assert_eq!(
            config.checkpoint().schedule,
            CheckpointStyle::Times {
                times: vec![20.0, 47.0]
            }
        );
        assert_eq!(config.problem().params.keys().collect::<Vec<_>>(), vec!["rho", "bulk"]);
    }

    #[test]
    fn gauges_along_axis() {
        let gauges = GaugeLayout::AlongAxis.gauges();
        assert_eq!(gauges.len(), 7);
        assert_float_is_close(gauges[0].location[0], 0.12);
        assert_float_is_close(gauges[3].location[0], 0.15);
        assert_float_is_close(gauges[6].location[0], 0.18);
        assert_eq!(gauges[6].id, 6);
    }

    #[test]
    fn presets_accept_further_overrides() {
        let mut builder = pipe_acoustics(Resolution::Medium, GaugeLayout::None);
        builder.set("grid.num_cells.0", 344).unwrap();
        assert_eq!(builder.build().unwrap().grid().num_cells, vec![344, 86]);
    }

    #[test]
    fn plot_figures() {
        let plots = pipe_acoustics_plots();
        let numbers: Vec<_> = plots.figures().iter().map(|f| f.number).collect();
        assert_eq!(numbers, vec![0, 2, 4]);
        let printed: Vec<_> = plots.printed_figures().map(|f| f.name.as_str()).collect();
        assert_eq!(printed, vec!["Pressure", "Horizontal Velocity"]);
        let pressure = &plots.figure(0).unwrap().axes[0];
        assert!(pressure.scaled);
        assert!(pressure.decoration.is_some());
        let item = &pressure.items[0];
        assert!(item.amr.data.shown_on(2));
        assert!(!item.amr.data.shown_on(3));
        match &item.plot_type {
            PlotType::Colormap(scale) => {
                assert_eq!(scale.min, Some(-1.0e-6));
                assert_eq!(scale.max, Some(6.0e-6));
                assert!(scale.add_colorbar);
            }
            _ => panic!("expected a colormap"),
        }
        assert_eq!(plots.report().latex_figures_per_line, 2);
    }

    #[test]
    fn scatter_of_pressure_against_radius() {
        let plots = pipe_acoustics_plots();
        let axes = &plots.figure(4).unwrap().axes[0];
        assert_eq!(axes.xlimits, Limits::Range(0.0, 1.5));
        let q = ArrayD::from_shape_fn(IxDyn(&[3, 2, 1]), |i| (i[0] * 10 + i[1]) as f64);
        let cells = CellData::uniform(&[0.0, 0.0], &[12.0, 8.0], q).unwrap();
        match axes.items[0].evaluate(&cells).unwrap() {
            PlotData::Series(series) => {
                assert_float_is_close(series.coords[0], 5.0);
                assert_eq!(series.values, vec![0.0, 1.0]);
            }
            _ => panic!("expected a series"),
        }
    }
}
