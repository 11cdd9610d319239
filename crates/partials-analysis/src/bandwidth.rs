//! Bandwidth association.
//!
//! The spectrum is divided into overlapping triangular regions centred on
//! multiples of the region width. Each rejected noise peak spreads its energy
//! over the two regions it falls in, and each region hands its energy to
//! the retained peaks it covers in proportion to their share of the
//! region's sinusoidal energy. A breakpoint that absorbs noise energy gets
//! louder and noisier while its total energy is conserved.

use partials_model::Breakpoint;

use crate::peaks::RejectedPeak;

/// Distributes rejected-peak energy onto retained peaks.
#[derive(Debug, Clone)]
pub struct BandwidthAssociation {
    region_width: f64,
    noise: Vec<f64>,
    sinusoidal: Vec<f64>,
}

impl BandwidthAssociation {
    /// Creates an association with regions `region_width` Hz apart.
    pub fn new(region_width: f64) -> Self {
        Self {
            region_width,
            noise: Vec::new(),
            sinusoidal: Vec::new(),
        }
    }

    /// Region spacing in Hz.
    pub fn region_width(&self) -> f64 {
        self.region_width
    }

    /// The two regions covering `frequency` and their weights, which sum
    /// to one.
    fn regions(&self, frequency: f64) -> [(usize, f64); 2] {
        let position = (frequency / self.region_width).max(0.0);
        let lower = position.floor();
        let upper_weight = position - lower;
        let lower = lower as usize;
        [(lower, 1.0 - upper_weight), (lower + 1, upper_weight)]
    }

    fn accumulate(bins: &mut Vec<f64>, region: usize, value: f64) {
        if bins.len() <= region {
            bins.resize(region + 1, 0.0);
        }
        bins[region] += value;
    }

    /// Adds the energy of `rejected` to the noisiness of `retained`.
    pub fn associate(&mut self, retained: &mut [Breakpoint], rejected: &[RejectedPeak]) {
        if retained.is_empty() || rejected.is_empty() {
            return;
        }
        self.noise.clear();
        self.sinusoidal.clear();

        for r in rejected.iter().filter(|r| r.reason.is_noise()) {
            let energy = r.peak.amplitude * r.peak.amplitude;
            for (region, weight) in self.regions(r.peak.frequency) {
                Self::accumulate(&mut self.noise, region, weight * energy);
            }
        }
        for bp in retained.iter() {
            let energy = bp.sinusoidal_energy();
            for (region, weight) in self.regions(bp.frequency) {
                Self::accumulate(&mut self.sinusoidal, region, weight * energy);
            }
        }

        for bp in retained.iter_mut() {
            let energy = bp.sinusoidal_energy();
            let mut share = 0.0;
            for (region, weight) in self.regions(bp.frequency) {
                let total = self.sinusoidal.get(region).copied().unwrap_or(0.0);
                let noise = self.noise.get(region).copied().unwrap_or(0.0);
                if weight > 0.0 && total > 0.0 {
                    share += noise * weight * energy / total;
                }
            }
            if share > 0.0 {
                bp.add_noise_energy(share);
            }
        }
    }
}
