use std::collections::BTreeMap;
use std::io;

use csv::WriterBuilder;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::simulator::T;
use crate::PkodeError;

/// Sampled solution of a simulated model
///
/// `y` has one row per state, in state order, and one column per time in `t`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    t: Array1<T>,
    y: Array2<T>,
    state_names: Vec<String>,
    parameters: BTreeMap<String, T>,
}

impl Trajectory {
    pub(crate) fn new(
        t: Array1<T>,
        y: Array2<T>,
        state_names: Vec<String>,
        parameters: BTreeMap<String, T>,
    ) -> Self {
        debug_assert_eq!(y.nrows(), state_names.len());
        debug_assert_eq!(y.ncols(), t.len());
        Self {
            t,
            y,
            state_names,
            parameters,
        }
    }

    /// Sample times
    pub fn t(&self) -> &Array1<T> {
        &self.t
    }

    /// `(nstates, npoints)` state values
    pub fn y(&self) -> &Array2<T> {
        &self.y
    }

    pub fn state_names(&self) -> &[String] {
        &self.state_names
    }

    /// Parameter values the trajectory was computed with
    pub fn parameters(&self) -> &BTreeMap<String, T> {
        &self.parameters
    }

    pub fn npoints(&self) -> usize {
        self.t.len()
    }

    pub fn nstates(&self) -> usize {
        self.state_names.len()
    }

    /// Values of one state over time
    pub fn state(&self, name: &str) -> Option<ArrayView1<'_, T>> {
        self.state_names
            .iter()
            .position(|s| s == name)
            .map(|i| self.y.row(i))
    }

    /// State vector at the last sample
    pub fn final_state(&self) -> ArrayView1<'_, T> {
        self.y.column(self.t.len() - 1)
    }

    /// Write the trajectory as CSV: a `t` column followed by one column per
    /// state.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), PkodeError> {
        let mut out = WriterBuilder::new().has_headers(true).from_writer(writer);
        let mut header = Vec::with_capacity(self.nstates() + 1);
        header.push("t");
        header.extend(self.state_names.iter().map(String::as_str));
        out.write_record(&header)?;

        for (t, column) in self.t.iter().zip(self.y.axis_iter(Axis(1))) {
            let mut record = Vec::with_capacity(header.len());
            record.push(t.to_string());
            record.extend(column.iter().map(|v| v.to_string()));
            out.write_record(&record)?;
        }
        out.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, PkodeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Serialize)]
struct StateSeries<'a> {
    name: &'a str,
    values: Vec<T>,
}

// {"t": [...], "states": [{"name", "values"}, ...], "parameters": {...}}
impl Serialize for Trajectory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let states: Vec<StateSeries> = self
            .state_names
            .iter()
            .zip(self.y.axis_iter(Axis(0)))
            .map(|(name, row)| StateSeries {
                name,
                values: row.to_vec(),
            })
            .collect();
        let mut s = serializer.serialize_struct("Trajectory", 3)?;
        s.serialize_field("t", &self.t.to_vec())?;
        s.serialize_field("states", &states)?;
        s.serialize_field("parameters", &self.parameters)?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> Trajectory {
        Trajectory::new(
            array![0.0, 0.5, 1.0],
            array![[100.0, 60.0, 36.0], [0.0, 35.0, 52.5]],
            vec!["A".into(), "C".into()],
            BTreeMap::from([("ka".to_string(), 1.0), ("ke".to_string(), 0.2)]),
        )
    }

    #[test]
    fn state_lookup() {
        let traj = sample();
        assert_eq!(traj.state("C").unwrap().to_vec(), vec![0.0, 35.0, 52.5]);
        assert!(traj.state("B").is_none());
        assert_eq!(traj.final_state().to_vec(), vec![36.0, 52.5]);
        assert_eq!(traj.npoints(), 3);
        assert_eq!(traj.nstates(), 2);
    }

    #[test]
    fn csv_has_header_and_one_row_per_sample() {
        let mut buf = Vec::new();
        sample().write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["t,A,C", "0,100,0", "0.5,60,35", "1,36,52.5"]);
    }

    #[test]
    fn json_layout() {
        let value: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(value["t"], serde_json::json!([0.0, 0.5, 1.0]));
        assert_eq!(value["states"][1]["name"], "C");
        assert_eq!(value["states"][1]["values"][2], 52.5);
        assert_eq!(value["parameters"]["ke"], 0.2);
    }
}
