use super::data_file::format_bool;
use super::data_file::format_string;
use super::data_file::DataFileWriter;
use crate::error::SerializationError;
use crate::parameters::CheckpointStyle;
use crate::parameters::OutputTimes;
use crate::parameters::ParamValue;
use crate::run_config::RunConfiguration;

pub const CLAW_FILE: &str = "claw.data";
pub const AMR_FILE: &str = "amr.data";
pub const GAUGES_FILE: &str = "gauges.data";
pub const REGIONS_FILE: &str = "regions.data";

fn check_len(
    writer: &DataFileWriter,
    field: &str,
    len: usize,
    expected: usize,
    coupled: &str,
) -> Result<(), SerializationError> {
    if len == expected {
        Ok(())
    } else {
        Err(writer.error(
            field,
            format!("has {} entries but {} requires {}", len, coupled, expected),
        ))
    }
}

pub fn claw(config: &RunConfiguration) -> Result<String, SerializationError> {
    let mut w = DataFileWriter::new(CLAW_FILE);
    let grid = &config.grid;
    let time = &config.time;
    let output = &config.output;
    let method = &config.method;
    let boundary = &config.boundary;

    check_len(&w, "lower", grid.lower.len(), grid.num_dim, "num_dim")?;
    check_len(&w, "upper", grid.upper.len(), grid.num_dim, "num_dim")?;
    check_len(&w, "num_cells", grid.num_cells.len(), grid.num_dim, "num_dim")?;
    w.int("num_dim", grid.num_dim);
    w.floats("lower", &grid.lower)?;
    w.floats("upper", &grid.upper)?;
    w.ints("num_cells", &grid.num_cells);
    w.blank();

    w.int("num_eqn", grid.num_eqn);
    w.int("num_waves", method.num_waves);
    w.int("num_aux", grid.num_aux);
    w.blank();

    w.float("t0", time.t0)?;
    w.blank();
    w.int("output_style", time.output_times.code());
    match &time.output_times {
        OutputTimes::EquallySpaced {
            num_output_times,
            tfinal,
            output_t0,
        } => {
            w.int("num_output_times", num_output_times);
            w.float("tfinal", *tfinal)?;
            w.bool("output_t0", *output_t0);
        }
        OutputTimes::ExplicitTimes { times } => {
            w.int("num_output_times", times.len());
            w.floats("output_times", times)?;
        }
        OutputTimes::StepInterval {
            output_step_interval,
            total_steps,
            output_t0,
        } => {
            w.int("output_step_interval", output_step_interval);
            w.int("total_steps", total_steps);
            w.bool("output_t0", *output_t0);
        }
    }
    w.blank();

    w.int("output_format", output.output_format.code());
    let q_flags = output.output_q_components.flags(grid.num_eqn);
    check_len(&w, "output_q_components", q_flags.len(), grid.num_eqn, "num_eqn")?;
    w.ints("output_q_components", q_flags.iter().map(|f| *f as u8));
    if grid.num_aux > 0 {
        let aux_flags = output.output_aux_components.flags(grid.num_aux);
        check_len(&w, "output_aux_components", aux_flags.len(), grid.num_aux, "num_aux")?;
        w.ints("output_aux_components", aux_flags.iter().map(|f| *f as u8));
        w.bool("output_aux_onlyonce", output.output_aux_onlyonce);
    }
    w.blank();

    w.float("dt_initial", time.dt_initial)?;
    w.float("dt_max", time.dt_max)?;
    w.float("cfl_max", time.cfl_max)?;
    w.float("cfl_desired", time.cfl_desired)?;
    w.int("steps_max", time.steps_max);
    w.blank();

    w.bool("dt_variable", time.dt_variable);
    w.int("order", method.order);
    w.int("dimensional_split", method.dimensional_split.code());
    w.int("transverse_waves", method.transverse_waves.code());
    w.int("verbosity", output.verbosity);
    w.int("source_split", method.source_split.code());
    if let Some(index) = grid.capacity_index {
        if index >= grid.num_aux {
            return Err(w.error(
                "capa_index",
                format!("index {} is outside of the {} aux variables", index, grid.num_aux),
            ));
        }
    }
    w.int("capa_index", grid.capacity_index.map_or(0, |index| index + 1));
    w.bool("use_fwaves", method.use_fwaves);
    check_len(&w, "limiter", method.limiter.len(), method.num_waves, "num_waves")?;
    w.ints("limiter", method.limiter.iter().map(|l| l.code()));
    w.blank();

    w.int("num_ghost", boundary.num_ghost);
    check_len(&w, "bc_lower", boundary.bc_lower.len(), grid.num_dim, "num_dim")?;
    check_len(&w, "bc_upper", boundary.bc_upper.len(), grid.num_dim, "num_dim")?;
    w.ints("bc_lower", boundary.bc_lower.iter().map(|bc| bc.code()));
    w.ints("bc_upper", boundary.bc_upper.iter().map(|bc| bc.code()));
    w.blank();

    w.bool("restart", time.restart);
    w.string("restart_file", &time.restart_file)?;
    w.int("checkpt_style", config.checkpoint.schedule.code());
    match &config.checkpoint.schedule {
        CheckpointStyle::None | CheckpointStyle::FinalOnly => {}
        CheckpointStyle::Times { times } => {
            w.int("num_checkpt_times", times.len());
            w.floats("checkpt_times", times)?;
        }
        CheckpointStyle::Interval { interval } => {
            w.int("checkpt_interval", interval);
        }
    }
    Ok(w.finish())
}

pub fn amr(config: &RunConfiguration) -> Result<String, SerializationError> {
    let mut w = DataFileWriter::new(AMR_FILE);
    let amr = &config.amr;
    let grid = &config.grid;
    w.int("amr_levels_max", amr.amr_levels_max);
    let expected = amr.amr_levels_max.saturating_sub(1);
    for (name, ratios) in amr.ratios(grid.num_dim) {
        check_len(&w, name, ratios.len(), expected, "amr_levels_max - 1")?;
        w.ints(name, ratios);
    }
    w.blank();

    check_len(&w, "aux_type", amr.aux_type.len(), grid.num_aux, "num_aux")?;
    w.strings("aux_type", amr.aux_type.iter().map(|a| a.token()))?;
    w.blank();

    w.bool("flag_richardson", amr.flag_richardson);
    w.float("flag_richardson_tol", amr.flag_richardson_tol)?;
    w.bool("flag2refine", amr.flag2refine);
    w.float("flag2refine_tol", amr.flag2refine_tol)?;
    w.int("regrid_interval", amr.regrid_interval);
    w.int("regrid_buffer_width", amr.regrid_buffer_width);
    w.float("clustering_cutoff", amr.clustering_cutoff)?;
    w.int("verbosity_regrid", amr.verbosity_regrid);
    w.blank();

    for (name, enabled) in amr.debug.entries() {
        w.bool(name, enabled);
    }
    Ok(w.finish())
}

pub fn gauges(config: &RunConfiguration) -> Result<String, SerializationError> {
    let mut w = DataFileWriter::new(GAUGES_FILE);
    w.int("num_gauges", config.gauges.len());
    for gauge in config.gauges.iter() {
        let field = format!("gauge {}", gauge.id);
        check_len(&w, &field, gauge.location.len(), config.grid.num_dim, "num_dim")?;
        let values: Vec<f64> = gauge
            .location
            .iter()
            .copied()
            .chain([gauge.t_start, gauge.t_end])
            .collect();
        w.row(&field, &[gauge.id], &values)?;
    }
    Ok(w.finish())
}

pub fn regions(config: &RunConfiguration) -> Result<String, SerializationError> {
    let mut w = DataFileWriter::new(REGIONS_FILE);
    w.int("num_regions", config.regions.len());
    for (i, region) in config.regions.iter().enumerate() {
        let field = format!("region {}", i);
        check_len(&w, &field, region.space_box.len(), config.grid.num_dim, "num_dim")?;
        let values: Vec<f64> = [region.t_start, region.t_end]
            .into_iter()
            .chain(region.space_box.iter().flatten().copied())
            .collect();
        w.row(
            &field,
            &[region.min_level as u64, region.max_level as u64],
            &values,
        )?;
    }
    Ok(w.finish())
}

pub fn problem(config: &RunConfiguration) -> Result<String, SerializationError> {
    let problem = &config.problem;
    let mut w = DataFileWriter::new(&problem.file);
    w.comment(&format!("Values of the '{}' record", problem.name))?;
    w.blank();
    for (name, param) in problem.params.iter() {
        let value = match &param.value {
            ParamValue::Bool(value) => format_bool(*value),
            ParamValue::Int(value) => value.to_string(),
            ParamValue::Float(value) => {
                if !value.is_finite() {
                    return Err(w.error(name, format!("{} is not a finite number", value)));
                }
                format!("{:?}", value)
            }
            ParamValue::String(value) => format_string(value),
        };
        let description = match &param.unit {
            Some(unit) => format!("{} [{}]", param.description, unit),
            None => param.description.clone(),
        };
        w.described(name, &value, description.trim())?;
    }
    Ok(w.finish())
}
