use derive_custom::run_parameters;
use serde::Deserialize;
use serde::Serialize;

use super::grid::Grid;
use crate::error::ValidationError;

/// Forces refinement between `min_level` and `max_level` inside
/// `space_box` during `[t_start, t_end]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Region {
    pub min_level: usize,
    pub max_level: usize,
    pub t_start: f64,
    pub t_end: f64,
    /// One `[x1, x2]` interval per dimension.
    pub space_box: Vec<[f64; 2]>,
}

#[run_parameters("regions")]
#[derive(Debug, Default, PartialEq)]
#[serde(default)]
pub struct RegionParameters {
    pub regions: Vec<Region>,
}

impl RegionParameters {
    pub fn validate(&self, grid: &Grid, amr_levels_max: usize) -> Result<(), ValidationError> {
        for (i, region) in self.regions.iter().enumerate() {
            let field = |name: &str| format!("regions.regions[{}].{}", i, name);
            if region.min_level < 1 || region.max_level > amr_levels_max {
                return Err(ValidationError::new(
                    field("min_level"),
                    format!(
                        "levels {}..{} are not within 1..{}",
                        region.min_level, region.max_level, amr_levels_max
                    ),
                ));
            }
            if region.min_level > region.max_level {
                return Err(ValidationError::new(
                    field("min_level"),
                    format!(
                        "min_level {} exceeds max_level {}",
                        region.min_level, region.max_level
                    ),
                ));
            }
            if region.t_start.is_nan() || region.t_end.is_nan() || region.t_start > region.t_end {
                return Err(ValidationError::new(
                    field("t_start"),
                    format!(
                        "time range [{}, {}] is empty",
                        region.t_start, region.t_end
                    ),
                ));
            }
            if region.space_box.len() != grid.num_dim {
                return Err(ValidationError::new(
                    field("space_box"),
                    format!(
                        "has {} intervals but num_dim is {}",
                        region.space_box.len(),
                        grid.num_dim
                    ),
                ));
            }
            for (d, [x1, x2]) in region.space_box.iter().enumerate() {
                if !x1.is_finite() || !x2.is_finite() || x1 >= x2 {
                    return Err(ValidationError::new(
                        format!("{}[{}]", field("space_box"), d),
                        format!("[{}, {}] is not a valid interval", x1, x2),
                    ));
                }
                if *x2 < grid.lower[d] || *x1 > grid.upper[d] {
                    return Err(ValidationError::new(
                        format!("{}[{}]", field("space_box"), d),
                        format!(
                            "[{}, {}] does not overlap the domain [{}, {}]",
                            x1, x2, grid.lower[d], grid.upper[d]
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Region;
    use super::RegionParameters;
    use crate::parameters::GridParameters;

    fn region(min_level: usize, max_level: usize, space_box: Vec<[f64; 2]>) -> RegionParameters {
        RegionParameters {
            regions: vec![Region {
                min_level,
                max_level,
                t_start: 0.0,
                t_end: 1e9,
                space_box,
            }],
        }
    }

    #[test]
    fn levels_must_lie_in_hierarchy() {
        let grid = GridParameters::default().resolve().unwrap();
        let boxed = vec![[0.2, 0.4], [0.0, 0.5]];
        assert!(region(1, 3, boxed.clone()).validate(&grid, 3).is_ok());
        assert!(region(0, 3, boxed.clone()).validate(&grid, 3).is_err());
        assert!(region(1, 4, boxed.clone()).validate(&grid, 3).is_err());
        assert_eq!(
            region(3, 2, boxed).validate(&grid, 3).unwrap_err().field,
            "regions.regions[0].min_level"
        );
    }

    #[test]
    fn box_must_overlap_domain() {
        let grid = GridParameters::default().resolve().unwrap();
        assert!(region(1, 1, vec![[0.5, 2.0], [-1.0, 0.1]])
            .validate(&grid, 1)
            .is_ok());
        assert_eq!(
            region(1, 1, vec![[0.5, 2.0], [1.5, 2.0]])
                .validate(&grid, 1)
                .unwrap_err()
                .field,
            "regions.regions[0].space_box[1]"
        );
    }

    #[test]
    fn inverted_time_range_is_rejected() {
        let grid = GridParameters::default().resolve().unwrap();
        let mut params = region(1, 1, vec![[0.2, 0.4], [0.0, 0.5]]);
        params.regions[0].t_start = 5.0;
        params.regions[0].t_end = 1.0;
        assert_eq!(
            params.validate(&grid, 1).unwrap_err().field,
            "regions.regions[0].t_start"
        );
    }

    #[test]
    fn empty_interval_is_rejected() {
        let grid = GridParameters::default().resolve().unwrap();
        for interval in [[0.4, 0.2], [0.3, 0.3]] {
            assert_eq!(
                region(1, 1, vec![interval, [0.0, 0.5]])
                    .validate(&grid, 1)
                    .unwrap_err()
                    .field,
                "regions.regions[0].space_box[0]"
            );
        }
    }

    #[test]
    fn read_from_yaml() {
        let params: RegionParameters = serde_yaml::from_str(
            "
regions:
  - min_level: 1
    max_level: 2
    t_start: 0.0
    t_end: 10.0
    space_box: [[0.1, 0.2], [0.0, 0.03]]
",
        )
        .unwrap();
        assert_eq!(params.regions[0].space_box[1], [0.0, 0.03]);
    }
}
