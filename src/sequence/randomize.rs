//! Random sound settings

use rand::seq::SliceRandom;
use rand::Rng;

use crate::synth::Waveform;

/// Highest random delay mix
const MAX_DELAY: f64 = 0.8;

/// Longest random reverb decay, seconds
const MAX_REVERB_DECAY: f64 = 8.0;

/// A randomly picked set of sound settings
///
/// Volume is deliberately absent: randomizing never changes loudness.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomSettings {
    pub waveform: Waveform,
    /// `None` when there were no scales to pick from
    pub scale: Option<String>,
    pub delay: f64,
    pub reverb_decay: f64,
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Pick a waveform, a scale from `scale_names`, a delay and a reverb decay
pub fn randomize<G: Rng>(rng: &mut G, scale_names: &[&str]) -> RandomSettings {
    let waveform = *Waveform::ALL.choose(rng).unwrap_or(&Waveform::Sine);
    let scale = scale_names.choose(rng).map(|name| name.to_string());

    RandomSettings {
        waveform,
        scale,
        delay: round_tenth(rng.gen::<f64>() * MAX_DELAY),
        reverb_decay: round_tenth(rng.gen::<f64>() * MAX_REVERB_DECAY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::SCALE_CATALOG;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn is_tenth(value: f64) -> bool {
        ((value * 10.0) - (value * 10.0).round()).abs() < 1e-9
    }

    #[test]
    fn test_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..1000 {
            let settings = randomize(&mut rng, SCALE_CATALOG);
            assert!((0.0..=0.8).contains(&settings.delay));
            assert!((0.0..=8.0).contains(&settings.reverb_decay));
            assert!(is_tenth(settings.delay));
            assert!(is_tenth(settings.reverb_decay));

            let scale = settings.scale.unwrap();
            assert!(SCALE_CATALOG.contains(&scale.as_str()));
        }
    }

    #[test]
    fn test_every_waveform_gets_picked() {
        let mut rng = StdRng::seed_from_u64(5);
        let seen: HashSet<_> = (0..200).map(|_| randomize(&mut rng, SCALE_CATALOG).waveform).collect();
        assert_eq!(seen.len(), Waveform::ALL.len());
    }

    #[test]
    fn test_seeded_picks_repeat() {
        let mut a = StdRng::seed_from_u64(12);
        let mut b = StdRng::seed_from_u64(12);
        assert_eq!(randomize(&mut a, SCALE_CATALOG), randomize(&mut b, SCALE_CATALOG));
    }

    #[test]
    fn test_no_scales_to_pick() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(randomize(&mut rng, &[]).scale, None);
    }
}
