//! CLI command implementations

pub mod analyze;
pub mod channelize;
pub mod distill;
pub mod f0;
pub mod json_output;
pub mod morph;
pub mod resample;
pub mod synth;

use anyhow::{bail, Context, Result};

/// Parses a `T:V,T:V,...` list of envelope control points.
pub fn parse_points(text: &str) -> Result<Vec<(f64, f64)>> {
    let mut points = Vec::new();
    for item in text.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (time, value) = parse_pair(item)
            .with_context(|| format!("Invalid envelope point '{}' (expected T:V)", item))?;
        points.push((time, value));
    }
    if points.is_empty() {
        bail!("Envelope needs at least one T:V point");
    }
    Ok(points)
}

/// Parses a `LOW:HIGH` frequency range.
pub fn parse_range(text: &str) -> Result<(f64, f64)> {
    let (low, high) = parse_pair(text)
        .with_context(|| format!("Invalid range '{}' (expected LOW:HIGH)", text))?;
    if !low.is_finite() || !high.is_finite() || low >= high {
        bail!("Range lower bound {} must be below upper bound {}", low, high);
    }
    Ok((low, high))
}

fn parse_pair(text: &str) -> Result<(f64, f64)> {
    let (a, b) = text
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("missing ':'"))?;
    Ok((a.trim().parse()?, b.trim().parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_points() {
        assert_eq!(
            parse_points("0:0, 1.5:1,2:0.25").unwrap(),
            vec![(0.0, 0.0), (1.5, 1.0), (2.0, 0.25)]
        );
        assert!(parse_points("").is_err());
        assert!(parse_points("0:0,1").is_err());
        assert!(parse_points("a:b").is_err());
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("80:400").unwrap(), (80.0, 400.0));
        assert!(parse_range("400:80").is_err());
        assert!(parse_range("100").is_err());
    }
}
