//! Partials CLI - analysis, transformation and synthesis of sounds as
//! reassigned bandwidth-enhanced Partials.

use clap::Parser;
use std::process::ExitCode;

use partials_cli::commands::{analyze, channelize, distill, f0, morph, resample, synth};
use partials_cli::logging;

mod cli_args;

use cli_args::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Analyze {
            input,
            output,
            resolution,
            window_width,
            config,
            reference_f0,
            no_phase_correct,
            bw_region_width,
            json,
        } => analyze::run(&analyze::AnalyzeOptions {
            input,
            output,
            resolution,
            window_width,
            config,
            reference_f0,
            no_phase_correct,
            bw_region_width,
            json,
        }),
        Commands::Resample {
            input,
            output,
            interval,
            dense,
            no_phase_correct,
            json,
        } => resample::run(&resample::ResampleOptions {
            input,
            output,
            interval,
            dense,
            no_phase_correct,
            json,
        }),
        Commands::Channelize {
            input,
            output,
            reference,
            ref_label,
            samples,
            distill,
            json,
        } => channelize::run(&channelize::ChannelizeOptions {
            input,
            output,
            reference,
            reference_label: ref_label,
            samples,
            distill,
            json,
        }),
        Commands::Distill {
            input,
            output,
            fade_time,
            gap_time,
            json,
        } => distill::run(&distill::DistillOptions {
            input,
            output,
            fade_time,
            gap_time,
            json,
        }),
        Commands::Morph {
            source,
            target,
            output,
            function,
            amp_shape,
            min_gap,
            source_reference,
            target_reference,
            json,
        } => morph::run(&morph::MorphOptions {
            source,
            target,
            output,
            function,
            amp_shape,
            min_gap,
            source_reference,
            target_reference,
            json,
        }),
        Commands::Synth {
            input,
            output,
            sample_rate,
            seed,
            fade_time,
            json,
        } => synth::run(&synth::SynthOptions {
            input,
            output,
            sample_rate,
            seed,
            fade_time,
            json,
        }),
        Commands::F0 {
            input,
            fmin,
            fmax,
            resolution,
            json,
        } => f0::run(&f0::F0Options {
            input,
            fmin,
            fmax,
            resolution,
            json,
        }),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cli_parses_analyze() {
        let cli = Cli::try_parse_from([
            "partials",
            "analyze",
            "--input",
            "in.wav",
            "--output",
            "out.json",
            "--resolution",
            "80",
            "--reference-f0",
            "100:300",
            "--no-phase-correct",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze {
                input,
                resolution,
                reference_f0,
                no_phase_correct,
                window_width,
                ..
            } => {
                assert_eq!(input, PathBuf::from("in.wav"));
                assert_eq!(resolution, Some(80.0));
                assert_eq!(reference_f0.as_deref(), Some("100:300"));
                assert!(no_phase_correct);
                assert_eq!(window_width, None);
            }
            _ => panic!("expected analyze command"),
        }
    }

    #[test]
    fn test_cli_parses_morph_and_verbose() {
        let cli = Cli::try_parse_from([
            "partials", "morph", "-s", "a.json", "-t", "b.json", "-o", "c.json", "-f", "0:0,1:1",
            "--source-reference", "1", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Morph {
                function,
                source_reference,
                target_reference,
                ..
            } => {
                assert_eq!(function, "0:0,1:1");
                assert_eq!(source_reference, Some(1));
                assert_eq!(target_reference, None);
            }
            _ => panic!("expected morph command"),
        }
    }

    #[test]
    fn test_cli_synth_defaults() {
        let cli =
            Cli::try_parse_from(["partials", "synth", "-i", "p.json", "-o", "p.wav"]).unwrap();
        match cli.command {
            Commands::Synth {
                sample_rate,
                seed,
                fade_time,
                ..
            } => {
                assert_eq!(sample_rate, 44100);
                assert_eq!(seed, 0);
                assert_eq!(fade_time, None);
            }
            _ => panic!("expected synth command"),
        }
    }

    #[test]
    fn test_cli_parses_channelize() {
        let cli = Cli::try_parse_from([
            "partials",
            "channelize",
            "-i",
            "a.json",
            "-o",
            "b.json",
            "--reference",
            "150:250",
            "--distill",
        ])
        .unwrap();
        match cli.command {
            Commands::Channelize {
                reference,
                ref_label,
                samples,
                distill,
                ..
            } => {
                assert_eq!(reference, "150:250");
                assert_eq!(ref_label, 1);
                assert_eq!(samples, None);
                assert!(distill);
            }
            _ => panic!("expected channelize command"),
        }
        assert!(Cli::try_parse_from(["partials", "channelize", "-i", "a", "-o", "b"]).is_err());
    }

    #[test]
    fn test_cli_parses_distill() {
        let cli = Cli::try_parse_from([
            "partials", "distill", "-i", "a.json", "-o", "b.json", "--fade-time", "0.002",
        ])
        .unwrap();
        match cli.command {
            Commands::Distill {
                fade_time,
                gap_time,
                ..
            } => {
                assert_eq!(fade_time, Some(0.002));
                assert_eq!(gap_time, None);
            }
            _ => panic!("expected distill command"),
        }
    }

    #[test]
    fn test_cli_requires_resample_interval() {
        assert!(Cli::try_parse_from(["partials", "resample", "-i", "a", "-o", "b"]).is_err());
    }
}
