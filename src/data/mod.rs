//! Readers for abundance (shared) and group-to-class (design) files
//!
//! A shared file is whitespace-separated with a header row naming the
//! feature columns after three fixed leading columns (distance label,
//! group name, feature count); each data row carries one observation.
//! A design file maps each group name to its class label, one pair per
//! line. The two files combine into an [`SvmDataset`]: observations in
//! shared-file order, labels looked up through the design mapping.

use crate::core::{
    Feature, FeatureVector, LabeledObservation, LabeledObservationVector, Result, SvmDataset,
    SvmError,
};
use log::debug;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

/// Read a shared file and a design file into a validated dataset.
pub fn read_shared_and_design_files(
    shared_path: impl AsRef<Path>,
    design_path: impl AsRef<Path>,
) -> Result<SvmDataset> {
    let design = read_design_file(design_path.as_ref())?;
    let shared_path = shared_path.as_ref();
    let reader = BufReader::new(File::open(shared_path)?);
    let mut lines = reader.lines();

    let header = lines.next().transpose()?.ok_or_else(|| {
        SvmError::MalformedInput(format!("shared file '{}' is empty", shared_path.display()))
    })?;
    let feature_vector = parse_shared_header(&header)?;

    let mut labeled_observations = LabeledObservationVector::new();
    for (line_number, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (group, observation) =
            parse_shared_row(&line, feature_vector.len(), line_number + 2)?;
        let label = design.get(&group).ok_or_else(|| {
            SvmError::MalformedInput(format!(
                "group '{}' has no entry in the design file",
                group
            ))
        })?;
        labeled_observations.push(LabeledObservation::new(
            labeled_observations.len(),
            label.clone(),
            Arc::new(observation),
        ));
    }

    debug!(
        "read {} observations with {} features from '{}'",
        labeled_observations.len(),
        feature_vector.len(),
        shared_path.display()
    );
    SvmDataset::new(labeled_observations, feature_vector)
}

/// Read a design file into its group-to-class mapping.
pub fn read_design_file(path: impl AsRef<Path>) -> Result<HashMap<String, String>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut design = HashMap::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (group, class) = match (fields.next(), fields.next(), fields.next()) {
            (Some(group), Some(class), None) => (group, class),
            _ => {
                return Err(SvmError::MalformedInput(format!(
                    "design file '{}' line {}: expected 'group class'",
                    path.display(),
                    line_number + 1
                )))
            }
        };
        design.insert(group.to_string(), class.to_string());
    }
    if design.is_empty() {
        return Err(SvmError::MalformedInput(format!(
            "design file '{}' holds no group mappings",
            path.display()
        )));
    }
    Ok(design)
}

/// Header row: `label Group numOtus` then one name per feature column.
fn parse_shared_header(header: &str) -> Result<FeatureVector> {
    let fields: Vec<&str> = header.split_whitespace().collect();
    if fields.len() < 4
        || !fields[0].eq_ignore_ascii_case("label")
        || !fields[1].eq_ignore_ascii_case("group")
    {
        return Err(SvmError::MalformedInput(
            "shared file header must read 'label Group numOtus' followed by feature names"
                .to_string(),
        ));
    }
    Ok(fields[3..]
        .iter()
        .enumerate()
        .map(|(index, name)| Feature::new(index, *name))
        .collect())
}

/// Data row: distance label, group name, feature count, then the values.
fn parse_shared_row(
    line: &str,
    feature_count: usize,
    line_number: usize,
) -> Result<(String, Vec<f64>)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != feature_count + 3 {
        return Err(SvmError::MalformedInput(format!(
            "shared file line {}: expected {} columns, found {}",
            line_number,
            feature_count + 3,
            fields.len()
        )));
    }
    let group = fields[1].to_string();
    let declared: usize = fields[2].parse().map_err(|_| {
        SvmError::Parse(format!(
            "shared file line {}: feature count '{}' is not an integer",
            line_number, fields[2]
        ))
    })?;
    if declared != feature_count {
        return Err(SvmError::MalformedInput(format!(
            "shared file line {}: declares {} features, header has {}",
            line_number, declared, feature_count
        )));
    }
    let mut observation = Vec::with_capacity(feature_count);
    for value in &fields[3..] {
        observation.push(value.parse().map_err(|_| {
            SvmError::Parse(format!(
                "shared file line {}: '{}' is not a number",
                line_number, value
            ))
        })?);
    }
    Ok((group, observation))
}
